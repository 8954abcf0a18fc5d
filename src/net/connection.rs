use std::{
    io::{self, Read, Write},
    os::fd::AsFd,
};

use thiserror::Error;

use super::framing::{read_request, send_eof, send_message, RequestError};
use crate::{
    cmd::execute::Executor,
    process::Boundary,
    state::{Outcome, State},
};

pub const CLIENT_EXITED: &str = "client exited: getting next connection...\n";
pub const STOP_REQUESTED: &str = "client requested server to stop, stopping...\n";

/// How a connection came to an end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEnd {
    Disconnected,
    Exited,
    StopRequested,
}

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("communication with client failed: {0}")]
    Io(#[from] io::Error),
}

/// Serves requests from one client until it leaves.
///
/// The socket doubles as stdin of the first stage and stdout/stderr of the
/// last one, so it has to be in blocking mode.
pub fn serve<S, E>(stream: &S, executor: &mut E) -> Result<ConnectionEnd, ConnectionError>
where
    S: AsFd,
    for<'s> &'s S: Read + Write,
    E: Executor + ?Sized,
{
    let mut state = State::new();
    let mut reader = stream;
    let mut writer = stream;

    loop {
        let line = match read_request(&mut reader) {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(ConnectionEnd::Disconnected),
            Err(RequestError::Io(err)) => return Err(err.into()),
            Err(err) => {
                warn!(%err, "discarding request");
                send_message(&mut writer, &format!("{err}\n"))?;
                continue;
            }
        };

        info!(request = %line, "executing request");

        let boundary = Boundary::socket(stream.as_fd());

        match state.dispatch(&line, executor, Some(boundary), &mut writer)? {
            Outcome::Continue => send_eof(&mut writer)?,
            Outcome::CloseConnection => {
                send_message(&mut writer, CLIENT_EXITED)?;
                return Ok(ConnectionEnd::Exited);
            }
            Outcome::StopServer => {
                send_message(&mut writer, STOP_REQUESTED)?;
                return Ok(ConnectionEnd::StopRequested);
            }
        }

        debug!(status = state.last_status, "request finished");
    }
}
