//! Request and response framing on the client socket.
//!
//! Requests end with [`REQUEST_TERMINATOR`] (or a newline). Every response
//! ends with exactly one [`EOF_BYTE`].

use std::io::{self, Read, Write};

use thiserror::Error;

use crate::limits::{EOF_BYTE, MAX_REQUEST, REQUEST_TERMINATOR};

#[derive(Debug, Error)]
pub enum RequestError {
    #[error("error: request exceeds {} bytes", MAX_REQUEST)]
    TooLong,
    #[error("error: request is not valid UTF-8")]
    NotUtf8,
    #[error("failed to read request: {0}")]
    Io(#[from] io::Error),
}

pub fn send_eof<W: Write + ?Sized>(writer: &mut W) -> io::Result<()> {
    writer.write_all(&[EOF_BYTE])?;
    writer.flush()
}

pub fn send_message<W: Write + ?Sized>(writer: &mut W, message: &str) -> io::Result<()> {
    writer.write_all(message.as_bytes())?;
    send_eof(writer)
}

/// Reads the next request, or `None` once the peer has closed the
/// connection.
///
/// Reads one byte at a time: anything after the terminator belongs to the
/// next request or to the stdin of the pipeline about to run.
pub fn read_request<R: Read + ?Sized>(reader: &mut R) -> Result<Option<String>, RequestError> {
    let mut buf = Vec::new();
    let mut overflow = false;
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte) {
            Ok(0) if buf.is_empty() && !overflow => return Ok(None),
            Ok(0) => break,
            Ok(_) => match byte[0] {
                REQUEST_TERMINATOR | b'\n' => break,
                b if buf.len() < MAX_REQUEST => buf.push(b),
                _ => overflow = true,
            },
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        }
    }

    if overflow {
        return Err(RequestError::TooLong);
    }

    if buf.last() == Some(&b'\r') {
        buf.pop();
    }

    String::from_utf8(buf)
        .map(Some)
        .map_err(|_| RequestError::NotUtf8)
}
