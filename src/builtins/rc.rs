use std::io::{self, Write};

use super::{BuiltinCommand, BuiltinOutcome};

/// Prints the status of the previous command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Rc;

impl BuiltinCommand for Rc {
    fn name(&self) -> &'static str {
        "rc"
    }

    fn execute(
        &self,
        _args: &[String],
        last_status: i32,
        out: &mut dyn Write,
    ) -> io::Result<BuiltinOutcome> {
        writeln!(out, "{last_status}")?;
        Ok(BuiltinOutcome::Status(0))
    }
}
