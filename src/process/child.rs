use std::{
    ffi::{c_char, CString, NulError},
    os::fd::RawFd,
    ptr,
};

use nix::{
    errno::Errno,
    fcntl::{fcntl, FcntlArg, FdFlag},
    libc::{self, STDERR_FILENO, STDIN_FILENO, STDOUT_FILENO},
    sys::signal::{signal, SigHandler, Signal},
    unistd::{close, dup2, write},
};

use super::{
    pipe::Pipes,
    status::{EXEC_FAILED, EXEC_NOT_FOUND},
};
use crate::cmd::command_list::Command;

const WIRING_FAILED: &[u8] = b"rsh: failed to redirect stage descriptors\n";

/// A command converted ahead of `fork`. Everything the child touches lives
/// here, so nothing is allocated or freed between `fork` and `exec`.
#[derive(Debug)]
pub struct Stage {
    argv: Vec<CString>,
    /// Null-terminated pointers into `argv`, as `execvp` wants them.
    argv_ptrs: Vec<*const c_char>,
    not_found: Vec<u8>,
    failed: Vec<u8>,
}

impl Stage {
    pub fn prepare(command: &Command) -> Result<Self, NulError> {
        let argv = command
            .argv()
            .iter()
            .map(|arg| CString::new(arg.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        // the CString buffers are on the heap and stay put when `argv` moves
        let argv_ptrs = argv
            .iter()
            .map(|arg| arg.as_ptr())
            .chain(std::iter::once(ptr::null()))
            .collect();

        Ok(Self {
            argv,
            argv_ptrs,
            not_found: format!("rsh: {}: command not found\n", command.program()).into_bytes(),
            failed: format!("rsh: {}: cannot execute\n", command.program()).into_bytes(),
        })
    }
}

/// Descriptors to install on the stdio slots of a stage. `None` keeps the
/// slot inherited from the coordinating process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageIo {
    pub stdin: Option<RawFd>,
    pub stdout: Option<RawFd>,
    pub stderr: Option<RawFd>,
}

impl StageIo {
    fn apply(&self) -> nix::Result<()> {
        if let Some(fd) = self.stdin {
            redirect(fd, STDIN_FILENO)?;
        }
        if let Some(fd) = self.stdout {
            redirect(fd, STDOUT_FILENO)?;
        }
        if let Some(fd) = self.stderr {
            redirect(fd, STDERR_FILENO)?;
        }
        Ok(())
    }
}

fn redirect(fd: RawFd, slot: RawFd) -> nix::Result<()> {
    if fd == slot {
        // dup2 onto itself keeps close-on-exec set
        fcntl(fd, FcntlArg::F_SETFD(FdFlag::empty()))?;
        return Ok(());
    }
    retry(|| dup2(fd, slot)).map(drop)
}

/// Retries a syscall interrupted by a signal.
pub(crate) fn retry<T, F>(mut f: F) -> nix::Result<T>
where
    F: FnMut() -> nix::Result<T>,
{
    loop {
        match f() {
            Err(Errno::EINTR) => continue,
            result => return result,
        }
    }
}

/// Runs in the forked child: installs `io`, closes every pipe end and
/// replaces the process image. Never returns into the caller's control flow.
///
/// `pipes` is the parent's copy; its descriptors are closed here but the
/// vector itself is left alone, since the child never unwinds.
pub fn exec(stage: &Stage, io: StageIo, pipes: &Pipes) -> ! {
    let wired = io.apply();
    for fd in pipes.raw_fds() {
        let _ = close(fd);
    }

    if wired.is_err() {
        report(WIRING_FAILED);
        terminate(EXEC_FAILED);
    }

    // the runtime ignores SIGPIPE, and an ignored signal survives exec
    // SAFETY: SIG_DFL installs no handler; sigaction is async-signal-safe
    let _ = unsafe { signal(Signal::SIGPIPE, SigHandler::SigDfl) };

    // SAFETY: argv_ptrs is null-terminated and points into stage.argv,
    // which outlives this call
    unsafe { libc::execvp(stage.argv[0].as_ptr(), stage.argv_ptrs.as_ptr()) };

    if Errno::last() == Errno::ENOENT {
        report(&stage.not_found);
        terminate(EXEC_NOT_FOUND)
    } else {
        report(&stage.failed);
        terminate(EXEC_FAILED)
    }
}

fn report(message: &[u8]) {
    let _ = write(STDERR_FILENO, message);
}

fn terminate(status: i32) -> ! {
    // SAFETY: _exit skips atexit handlers and stdio flushing, which must not
    // run in a child forked from a multithreaded process
    unsafe { nix::libc::_exit(status) }
}
