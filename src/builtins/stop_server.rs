use std::io::{self, Write};

use super::{BuiltinCommand, BuiltinOutcome};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StopServer;

impl BuiltinCommand for StopServer {
    fn name(&self) -> &'static str {
        "stop-server"
    }

    fn execute(
        &self,
        _args: &[String],
        _last_status: i32,
        _out: &mut dyn Write,
    ) -> io::Result<BuiltinOutcome> {
        trace!("executing stop-server builtin");
        Ok(BuiltinOutcome::StopServer)
    }
}
