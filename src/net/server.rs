use std::{io, net::SocketAddr};

use tokio::{
    net::{TcpListener, TcpSocket, TcpStream},
    select,
    task::JoinHandle,
};

use super::connection::{self, ConnectionEnd};
use crate::{cmd::execute::ForkExecutor, config::ServerConfig, prelude::*};

const BACKLOG: u32 = 5;

pub struct Server {
    listener: TcpListener,
    threaded: bool,
}

impl Server {
    pub async fn bind(config: &ServerConfig) -> io::Result<Self> {
        let addr = SocketAddr::new(config.interface, config.port);

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()?
        } else {
            TcpSocket::new_v6()?
        };
        socket.set_reuseaddr(true)?;
        socket.bind(addr)?;
        let listener = socket.listen(BACKLOG)?;

        info!(addr = %listener.local_addr()?, threaded = config.threaded, "server listening");

        Ok(Self {
            listener,
            threaded: config.threaded,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts clients until one of them sends `stop-server`.
    ///
    /// Unless the server is threaded, the next client is only accepted once
    /// the current one has left. When threaded, this returns as soon as the
    /// stop is requested; other clients keep their sessions until they leave
    /// or the runtime is shut down.
    pub async fn run(self) -> io::Result<()> {
        let (stop_tx, mut stop_rx) = unbounded_channel::<()>();

        loop {
            select! {
                biased;

                Some(()) = stop_rx.recv() => {
                    info!("stopping server");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = match accepted {
                        Ok(accepted) => accepted,
                        Err(err) => {
                            error!(%err, "failed to accept connection");
                            continue;
                        }
                    };

                    info!(%peer, "client connected");

                    let handle = match spawn_connection(stream, peer, stop_tx.clone()) {
                        Ok(handle) => handle,
                        Err(err) => {
                            error!(%peer, %err, "failed to prepare client socket");
                            continue;
                        }
                    };

                    if !self.threaded {
                        if let Err(err) = handle.await {
                            error!(%peer, %err, "connection task failed");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn spawn_connection(
    stream: TcpStream,
    peer: SocketAddr,
    stop: Sender<()>,
) -> io::Result<JoinHandle<()>> {
    // children inherit the socket as stdio, so it must block
    let stream = stream.into_std()?;
    stream.set_nonblocking(false)?;

    Ok(tokio::task::spawn_blocking(move || {
        let span = info_span!("connection", %peer);
        let _enter = span.enter();

        match connection::serve(&stream, &mut ForkExecutor) {
            Ok(ConnectionEnd::StopRequested) => {
                info!("client requested server stop");
                let _ = stop.send(());
            }
            Ok(end) => info!(?end, "client disconnected"),
            Err(err) => warn!(%err, "connection closed"),
        }
    }))
}
