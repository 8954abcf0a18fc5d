use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use nix::{
    fcntl::{fcntl, FcntlArg, OFlag},
    libc::STDERR_FILENO,
    unistd::pipe2,
};

use super::{child::StageIo, Boundary};

/// Both ends of one OS pipe. Each end is closed when dropped.
#[derive(Debug)]
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    pub fn new() -> nix::Result<Self> {
        // close-on-exec so pipes of one connection never leak into the
        // children of another; dup2 clears the flag on the stdio slots
        let (read, write) = pipe2(OFlag::O_CLOEXEC)?;

        // SAFETY: pipe2 just opened both descriptors and nothing else owns them
        let (read, write) = unsafe { (OwnedFd::from_raw_fd(read), OwnedFd::from_raw_fd(write)) };

        Ok(Self {
            read: above_stdio(read)?,
            write: above_stdio(write)?,
        })
    }
}

/// Moves `fd` off the stdio slots. When the coordinator runs with a closed
/// stdin, stdout or stderr, a pipe end lands there and a child's dup2 onto
/// that slot would clobber it.
fn above_stdio(fd: OwnedFd) -> nix::Result<OwnedFd> {
    if fd.as_raw_fd() > STDERR_FILENO {
        return Ok(fd);
    }

    let moved = fcntl(fd.as_raw_fd(), FcntlArg::F_DUPFD_CLOEXEC(STDERR_FILENO + 1))?;
    // SAFETY: F_DUPFD_CLOEXEC returned a fresh descriptor nothing else owns
    Ok(unsafe { OwnedFd::from_raw_fd(moved) })
}

/// The pipes joining adjacent stages: pipe `i` carries the stdout of stage
/// `i` to the stdin of stage `i + 1`.
#[derive(Debug)]
pub struct Pipes(Vec<Pipe>);

impl Pipes {
    /// Opens `count` pipes. If one fails, the ones already opened are closed.
    pub fn open(count: usize) -> nix::Result<Self> {
        let mut pipes = Vec::with_capacity(count);
        for _ in 0..count {
            pipes.push(Pipe::new()?);
        }
        Ok(Self(pipes))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Every pipe end, without giving up ownership.
    pub(crate) fn raw_fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.0
            .iter()
            .flat_map(|pipe| [pipe.read.as_raw_fd(), pipe.write.as_raw_fd()])
    }

    /// Which descriptors `stage` should see on its stdio slots.
    ///
    /// `stage` must be below `self.len() + 1`.
    pub fn wiring(&self, stage: usize, boundary: Option<Boundary<'_>>) -> StageIo {
        let last = stage == self.0.len();

        let stdin = if stage == 0 {
            boundary.and_then(|b| b.input).map(|fd| fd.as_raw_fd())
        } else {
            Some(self.0[stage - 1].read.as_raw_fd())
        };

        let (stdout, stderr) = if last {
            let output = boundary.and_then(|b| b.output).map(|fd| fd.as_raw_fd());
            (output, output)
        } else {
            (Some(self.0[stage].write.as_raw_fd()), None)
        };

        StageIo {
            stdin,
            stdout,
            stderr,
        }
    }
}
