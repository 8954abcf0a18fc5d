use std::io::{self, Write};

use super::{BuiltinCommand, BuiltinOutcome};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Exit;

impl BuiltinCommand for Exit {
    fn name(&self) -> &'static str {
        "exit"
    }

    fn execute(
        &self,
        _args: &[String],
        _last_status: i32,
        _out: &mut dyn Write,
    ) -> io::Result<BuiltinOutcome> {
        trace!("executing exit builtin");
        Ok(BuiltinOutcome::CloseConnection)
    }
}
