use std::io;

use rsh::{
    builtins::{classify, Builtin},
    limits::{EOF_BYTE, PROMPT, REQUEST_TERMINATOR},
    parse::parse_command_list,
};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("server closed the connection before finishing its response")]
    ServerClosed,
}

/// Whether the server hangs up after answering `line`.
fn ends_session(line: &str) -> bool {
    match parse_command_list(line) {
        Ok(commands) => match commands.as_slice() {
            [command] => matches!(
                classify(command),
                Some(Builtin::Exit(_) | Builtin::StopServer(_))
            ),
            _ => false,
        },
        Err(_) => false,
    }
}

/// Prompts on `output`, forwards each line of `input` to the server and
/// relays the response, until the session is closed from either side.
pub async fn run<S, I, O>(stream: &mut S, input: &mut I, output: &mut O) -> Result<(), ClientError>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut line = String::new();

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        line.clear();
        if input.read_line(&mut line).await? == 0 {
            debug!("end of input");
            output.write_all(b"\n").await?;
            output.flush().await?;
            return Ok(());
        }

        let request = line.trim();
        trace!(request, "sending request");

        stream.write_all(request.as_bytes()).await?;
        stream.write_all(&[REQUEST_TERMINATOR]).await?;
        stream.flush().await?;

        relay_response(stream, output).await?;

        if ends_session(request) {
            debug!(request, "session closed");
            return Ok(());
        }
    }
}

/// Copies response bytes to `output` up to the end-of-response marker.
async fn relay_response<S, O>(stream: &mut S, output: &mut O) -> Result<(), ClientError>
where
    S: AsyncRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let mut buf = [0u8; 1024];

    loop {
        let len = stream.read(&mut buf).await?;
        if len == 0 {
            return Err(ClientError::ServerClosed);
        }

        let chunk = &buf[..len];
        match chunk.iter().position(|&b| b == EOF_BYTE) {
            Some(end) => {
                output.write_all(&chunk[..end]).await?;
                output.flush().await?;
                return Ok(());
            }
            None => output.write_all(chunk).await?,
        }
        output.flush().await?;
    }
}
