use std::{net::IpAddr, path::PathBuf, time::Duration};

use clap::{Parser, Subcommand};
use color_eyre::Result;
use rsh::{config::Config, local, logging, net::server::Server};

#[macro_use]
extern crate tracing;

/// How long clients still connected to a threaded server get after
/// `stop-server` before the process exits under them.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// TOML configuration file.
    #[arg(long, env = "RSH_CONFIG")]
    config: Option<PathBuf>,

    /// Runs a local shell on this terminal when omitted.
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Subcommand)]
enum Mode {
    /// Accept clients over TCP and run their pipelines.
    Serve {
        #[arg(short, long)]
        interface: Option<IpAddr>,
        #[arg(short, long)]
        port: Option<u16>,
        /// Serve several clients at once.
        #[arg(short = 'x', long)]
        threaded: bool,
    },
}

fn main() -> Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let result = runtime.block_on(run());

    // blocking workers of other connections would keep a plain drop waiting
    // until their clients leave
    runtime.shutdown_timeout(SHUTDOWN_GRACE);

    result
}

async fn run() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;

    match cli.mode {
        None => {
            let _guard = logging::init(&config.log, "warn");
            color_eyre::install()?;

            trace!("starting local shell");
            let status = tokio::task::spawn_blocking(local::run).await??;
            debug!(status, "local shell finished");
        }
        Some(Mode::Serve {
            interface,
            port,
            threaded,
        }) => {
            if let Some(interface) = interface {
                config.server.interface = interface;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            config.server.threaded |= threaded;

            let _guard = logging::init(&config.log, "info");
            color_eyre::install()?;

            Server::bind(&config.server).await?.run().await?;
            info!("server stopped");
        }
    }

    Ok(())
}
