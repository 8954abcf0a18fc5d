use std::io::{self, Write};

use enum_dispatch::enum_dispatch;
use strum::{EnumIter, IntoEnumIterator};

use crate::cmd::command_list::Command;

pub mod cd;
pub mod exit;
pub mod rc;
pub mod stop_server;

/// What the session should do after a built-in ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuiltinOutcome {
    Status(i32),
    CloseConnection,
    StopServer,
}

#[enum_dispatch]
pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    fn execute(
        &self,
        args: &[String],
        last_status: i32,
        out: &mut dyn Write,
    ) -> io::Result<BuiltinOutcome>;
}

#[enum_dispatch(BuiltinCommand)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter)]
pub enum Builtin {
    Exit(exit::Exit),
    ChangeDirectory(cd::Cd),
    StopServer(stop_server::StopServer),
    ReturnCode(rc::Rc),
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        Self::iter().find(|cmd| cmd.name() == name)
    }
}

/// `None` means the command is an external program.
pub fn classify(command: &Command) -> Option<Builtin> {
    Builtin::from_name(command.program())
}
