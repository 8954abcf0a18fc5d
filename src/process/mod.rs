use std::os::fd::BorrowedFd;

pub mod child;
pub mod pipe;
pub mod status;

/// Descriptors that stand in for the terminal at the two open ends of a
/// pipeline: stdin of the first stage, stdout and stderr of the last.
///
/// Both are borrowed; the executor never closes them.
#[derive(Debug, Clone, Copy, Default)]
pub struct Boundary<'fd> {
    pub input: Option<BorrowedFd<'fd>>,
    pub output: Option<BorrowedFd<'fd>>,
}

impl<'fd> Boundary<'fd> {
    pub fn new(input: Option<BorrowedFd<'fd>>, output: Option<BorrowedFd<'fd>>) -> Self {
        Self { input, output }
    }

    /// Network mode: the client socket feeds the first stage and receives
    /// everything the last stage writes.
    pub fn socket(fd: BorrowedFd<'fd>) -> Self {
        Self {
            input: Some(fd),
            output: Some(fd),
        }
    }
}
