use std::io::{self, Write};

use crate::{
    builtins::{classify, BuiltinCommand, BuiltinOutcome},
    cmd::execute::Executor,
    parse::parse_command_list,
    process::{status::ExecutionResult, Boundary},
};

/// Status recorded when a line fails to parse or a pipeline cannot start.
pub const FAILURE_STATUS: i32 = 1;

/// What the caller should do after a line was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Continue,
    CloseConnection,
    StopServer,
}

/// Per-session state: one per client connection, or one for the local shell.
#[derive(Debug, Default)]
pub struct State {
    pub last_status: i32,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and runs one line.
    ///
    /// Diagnostics and built-in output go to `out`. Program output goes
    /// wherever `boundary` points, or to the inherited stdio without one.
    /// Only a failed write to `out` is returned as an error.
    pub fn dispatch<E>(
        &mut self,
        line: &str,
        executor: &mut E,
        boundary: Option<Boundary<'_>>,
        out: &mut dyn Write,
    ) -> io::Result<Outcome>
    where
        E: Executor + ?Sized,
    {
        let commands = match parse_command_list(line) {
            Ok(commands) => commands,
            Err(err) => {
                if err.is_warning() {
                    debug!(%err, "nothing to run");
                } else {
                    warn!(%err, line, "rejected command line");
                    self.last_status = FAILURE_STATUS;
                }
                writeln!(out, "{err}")?;
                return Ok(Outcome::Continue);
            }
        };

        trace!(%commands, "parsed command list");

        if let [command] = commands.as_slice() {
            if let Some(builtin) = classify(command) {
                debug!(builtin = builtin.name(), "running builtin");

                return Ok(match builtin.execute(command.args(), self.last_status, out)? {
                    BuiltinOutcome::Status(code) => {
                        self.last_status = code;
                        Outcome::Continue
                    }
                    BuiltinOutcome::CloseConnection => Outcome::CloseConnection,
                    BuiltinOutcome::StopServer => Outcome::StopServer,
                });
            }
        }

        // anything still buffered must land before the children write
        out.flush()?;

        match executor.run(&commands, boundary) {
            Ok(result) => {
                if let ExecutionResult::Signaled(signal) = result {
                    warn!(?signal, %commands, "last stage terminated abnormally");
                }
                self.last_status = result.code();
            }
            Err(err) => {
                error!(%err, %commands, "failed to run pipeline");
                self.last_status = FAILURE_STATUS;
                writeln!(out, "error: {err}")?;
            }
        }

        Ok(Outcome::Continue)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use nix::sys::signal::Signal;

    use super::*;
    use crate::{
        cmd::{command_list::CommandList, execute::ExecError},
        limits::MAX_STAGES,
        process::status::ABNORMAL_TERMINATION,
    };

    /// Records what it was asked to run instead of spawning anything.
    #[derive(Debug)]
    pub(crate) struct CountingExecutor {
        pub runs: Vec<String>,
        pub result: ExecutionResult,
    }

    impl CountingExecutor {
        pub(crate) fn returning(result: ExecutionResult) -> Self {
            Self {
                runs: Vec::new(),
                result,
            }
        }
    }

    impl Executor for CountingExecutor {
        fn run(
            &mut self,
            commands: &CommandList,
            _boundary: Option<Boundary<'_>>,
        ) -> Result<ExecutionResult, ExecError> {
            self.runs.push(commands.to_string());
            Ok(self.result)
        }
    }

    struct FailingExecutor;

    impl Executor for FailingExecutor {
        fn run(
            &mut self,
            _commands: &CommandList,
            _boundary: Option<Boundary<'_>>,
        ) -> Result<ExecutionResult, ExecError> {
            Err(ExecError::ResourceExhausted {
                resource: "pipe",
                source: nix::errno::Errno::EMFILE,
            })
        }
    }

    fn dispatch(
        state: &mut State,
        executor: &mut CountingExecutor,
        line: &str,
    ) -> (Outcome, String) {
        let mut out = Vec::new();
        let outcome = state.dispatch(line, executor, None, &mut out).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    #[test]
    fn too_many_stages_spawns_nothing() {
        let mut state = State::new();
        let mut executor = CountingExecutor::returning(ExecutionResult::Exited(0));
        let line = vec!["cat"; MAX_STAGES + 1].join(" | ");

        let (outcome, out) = dispatch(&mut state, &mut executor, &line);

        assert_eq!(outcome, Outcome::Continue);
        assert!(executor.runs.is_empty());
        assert_eq!(out, format!("error: piping limited to {MAX_STAGES} commands\n"));
        assert_eq!(state.last_status, FAILURE_STATUS);
    }

    #[test]
    fn empty_line_warns_without_touching_status() {
        let mut state = State { last_status: 42 };
        let mut executor = CountingExecutor::returning(ExecutionResult::Exited(0));

        let (outcome, out) = dispatch(&mut state, &mut executor, "   ");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(out, "warning: no commands provided\n");
        assert_eq!(state.last_status, 42);
        assert!(executor.runs.is_empty());
    }

    #[test]
    fn pipeline_status_is_recorded() {
        let mut state = State::new();
        let mut executor = CountingExecutor::returning(ExecutionResult::Exited(3));

        let (outcome, out) = dispatch(&mut state, &mut executor, "ls | wc -l");

        assert_eq!(outcome, Outcome::Continue);
        assert!(out.is_empty());
        assert_eq!(executor.runs, ["ls | wc -l"]);
        assert_eq!(state.last_status, 3);

        let (_, out) = dispatch(&mut state, &mut executor, "rc");
        assert_eq!(out, "3\n");
        assert_eq!(state.last_status, 0);
    }

    #[test]
    fn signaled_pipeline_records_abnormal_status() {
        let mut state = State::new();
        let mut executor =
            CountingExecutor::returning(ExecutionResult::Signaled(Signal::SIGSEGV));

        dispatch(&mut state, &mut executor, "crashy");

        assert_eq!(state.last_status, ABNORMAL_TERMINATION);
    }

    #[test]
    fn lone_builtins_short_circuit() {
        let mut state = State::new();
        let mut executor = CountingExecutor::returning(ExecutionResult::Exited(0));

        assert_eq!(
            dispatch(&mut state, &mut executor, "exit").0,
            Outcome::CloseConnection
        );
        assert_eq!(
            dispatch(&mut state, &mut executor, "  stop-server ").0,
            Outcome::StopServer
        );
        assert!(executor.runs.is_empty());
    }

    #[test]
    fn builtins_inside_pipelines_are_programs() {
        let mut state = State::new();
        let mut executor = CountingExecutor::returning(ExecutionResult::Exited(0));

        let (outcome, _) = dispatch(&mut state, &mut executor, "exit | cat");

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(executor.runs, ["exit | cat"]);
    }

    #[test]
    fn executor_failure_is_reported_and_session_continues() {
        let mut state = State::new();
        let mut out = Vec::new();

        let outcome = state
            .dispatch("ls | wc", &mut FailingExecutor, None, &mut out)
            .unwrap();

        assert_eq!(outcome, Outcome::Continue);
        assert_eq!(state.last_status, FAILURE_STATUS);
        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("error: failed to create pipe"), "{out}");
    }
}
