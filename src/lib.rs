#[macro_use]
extern crate tracing;

pub mod builtins;
pub mod cmd;
pub mod config;
pub mod limits;
pub mod local;
pub mod logging;
pub mod net;
pub mod parse;
pub mod prelude;
pub mod process;
pub mod state;
