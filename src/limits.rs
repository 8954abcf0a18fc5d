//! Fixed limits and wire constants shared by the server, the local shell and
//! the client.

use std::net::{IpAddr, Ipv4Addr};

/// Maximum number of stages in one pipeline.
pub const MAX_STAGES: usize = 8;

/// Maximum number of arguments in one command, program name included.
pub const MAX_ARGS: usize = 8;

/// Maximum length in bytes of a single request sent over the network.
pub const MAX_REQUEST: usize = 64 * 1024;

/// Sent by the server after every response.
pub const EOF_BYTE: u8 = 0x04;

/// Sent by the client after every request. The server also accepts `\n`.
pub const REQUEST_TERMINATOR: u8 = 0x00;

pub const DEFAULT_INTERFACE: IpAddr = IpAddr::V4(Ipv4Addr::UNSPECIFIED);
pub const DEFAULT_PORT: u16 = 1234;
pub const DEFAULT_CONNECT: &str = "127.0.0.1:1234";

pub const PROMPT: &str = "rsh> ";
