use std::fmt;

use nix::sys::{signal::Signal, wait::WaitStatus};

/// Exit status of a child that could not find the program to exec.
pub const EXEC_NOT_FOUND: i32 = 127;

/// Exit status of a child whose exec failed for any other reason.
pub const EXEC_FAILED: i32 = 126;

/// Status code recorded for a pipeline whose last stage was killed by a signal.
pub const ABNORMAL_TERMINATION: i32 = -1;

/// How the last stage of a pipeline ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Exited(i32),
    Signaled(Signal),
}

impl ExecutionResult {
    pub(crate) fn from_wait(status: WaitStatus) -> Option<Self> {
        match status {
            WaitStatus::Exited(_, code) => Some(Self::Exited(code)),
            WaitStatus::Signaled(_, signal, _) => Some(Self::Signaled(signal)),
            _ => None,
        }
    }

    pub fn code(&self) -> i32 {
        match self {
            Self::Exited(code) => *code,
            Self::Signaled(_) => ABNORMAL_TERMINATION,
        }
    }

    pub fn success(&self) -> bool {
        matches!(self, Self::Exited(0))
    }
}

impl fmt::Display for ExecutionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited(code) => write!(f, "exited with {code}"),
            Self::Signaled(signal) => write!(f, "killed by {}", signal.as_str()),
        }
    }
}

#[cfg(test)]
mod tests {
    use nix::unistd::Pid;

    use super::*;

    #[test]
    fn exited_keeps_program_code() {
        let status = WaitStatus::Exited(Pid::from_raw(10), 3);
        let result = ExecutionResult::from_wait(status).unwrap();
        assert_eq!(result, ExecutionResult::Exited(3));
        assert_eq!(result.code(), 3);
        assert!(!result.success());
    }

    #[test]
    fn signaled_maps_to_abnormal_code() {
        let status = WaitStatus::Signaled(Pid::from_raw(10), Signal::SIGKILL, false);
        let result = ExecutionResult::from_wait(status).unwrap();
        assert_eq!(result.code(), ABNORMAL_TERMINATION);
        assert_eq!(result.to_string(), "killed by SIGKILL");
    }

    #[test]
    fn still_alive_is_not_a_result() {
        assert_eq!(ExecutionResult::from_wait(WaitStatus::StillAlive), None);
    }
}
