use std::io::{self, Write};

use super::{BuiltinCommand, BuiltinOutcome};

/// Changes the working directory of the whole process. Without an argument
/// it does nothing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Cd;

impl BuiltinCommand for Cd {
    fn name(&self) -> &'static str {
        "cd"
    }

    fn execute(
        &self,
        args: &[String],
        _last_status: i32,
        out: &mut dyn Write,
    ) -> io::Result<BuiltinOutcome> {
        trace!("executing cd builtin: {args:?}");

        let path = match args {
            [] => return Ok(BuiltinOutcome::Status(0)),
            [path] => path,
            _ => {
                writeln!(out, "cd: too many arguments")?;
                return Ok(BuiltinOutcome::Status(1));
            }
        };

        match std::env::set_current_dir(path) {
            Ok(()) => {
                debug!(dir = %path, "changed directory");
                Ok(BuiltinOutcome::Status(0))
            }
            Err(err) => {
                error!("failed to cd: {}", err);
                writeln!(out, "cd: {path}: {err}")?;
                Ok(BuiltinOutcome::Status(1))
            }
        }
    }
}
