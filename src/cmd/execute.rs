use std::ffi::NulError;

use nix::{
    errno::Errno,
    sys::{
        signal::{kill, Signal},
        wait::waitpid,
    },
    unistd::{fork, ForkResult, Pid},
};
use thiserror::Error;

use super::command_list::CommandList;
use crate::process::{
    child::{self, retry, Stage},
    pipe::Pipes,
    status::ExecutionResult,
    Boundary,
};

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to create {resource}: {source}")]
    ResourceExhausted {
        resource: &'static str,
        #[source]
        source: Errno,
    },
    #[error("argument contains a NUL byte")]
    InvalidArgument(#[from] NulError),
    #[error("failed to wait for the last stage: {0}")]
    Wait(#[source] Errno),
}

/// Runs a parsed pipeline to completion.
pub trait Executor {
    fn run(
        &mut self,
        commands: &CommandList,
        boundary: Option<Boundary<'_>>,
    ) -> Result<ExecutionResult, ExecError>;
}

/// Forks one process per stage and joins them with pipes, the way a local
/// shell would.
#[derive(Debug, Default, Clone, Copy)]
pub struct ForkExecutor;

impl Executor for ForkExecutor {
    fn run(
        &mut self,
        commands: &CommandList,
        boundary: Option<Boundary<'_>>,
    ) -> Result<ExecutionResult, ExecError> {
        let stages = commands
            .iter()
            .map(Stage::prepare)
            .collect::<Result<Vec<_>, _>>()?;

        let pipes = Pipes::open(stages.len() - 1).map_err(|source| {
            ExecError::ResourceExhausted {
                resource: "pipe",
                source,
            }
        })?;

        debug!(stages = stages.len(), pipes = pipes.len(), "spawning pipeline");

        let mut children = Vec::with_capacity(stages.len());

        for (index, stage) in stages.iter().enumerate() {
            let io = pipes.wiring(index, boundary);

            // SAFETY: the child only duplicates and closes descriptors before
            // exec or _exit; everything it needs was allocated above
            match unsafe { fork() } {
                Ok(ForkResult::Child) => child::exec(stage, io, &pipes),
                Ok(ForkResult::Parent { child }) => {
                    trace!(stage = index, pid = child.as_raw(), "forked stage");
                    children.push(child);
                }
                Err(source) => {
                    error!(stage = index, %source, "fork failed, aborting pipeline");
                    drop(pipes);
                    abandon(&children);
                    return Err(ExecError::ResourceExhausted {
                        resource: "process",
                        source,
                    });
                }
            }
        }

        // the parent holds no pipe end past this point, so every reader sees
        // end-of-stream once its writer exits
        drop(pipes);

        let last = children.len() - 1;
        let mut terminal = Err(Errno::ECHILD);

        for (index, pid) in children.into_iter().enumerate() {
            let status = wait_for(pid);
            match &status {
                Ok(result) => trace!(stage = index, pid = pid.as_raw(), %result, "stage finished"),
                Err(err) => warn!(stage = index, pid = pid.as_raw(), %err, "failed to reap stage"),
            }
            if index == last {
                terminal = status;
            }
        }

        let result = terminal.map_err(ExecError::Wait)?;
        debug!(%result, "pipeline finished");
        Ok(result)
    }
}

/// Blocks until `pid` terminates.
fn wait_for(pid: Pid) -> nix::Result<ExecutionResult> {
    loop {
        if let Some(result) = ExecutionResult::from_wait(retry(|| waitpid(pid, None))?) {
            return Ok(result);
        }
    }
}

/// Kills and reaps stages that were started before the pipeline failed.
fn abandon(children: &[Pid]) {
    for &pid in children {
        let _ = kill(pid, Signal::SIGKILL);
        let _ = wait_for(pid);
    }
}
