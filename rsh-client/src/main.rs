use color_eyre::Result;
use clap::Parser;
use rsh::limits::DEFAULT_CONNECT;
use tokio::{
    io::{self, BufReader},
    net::TcpStream,
};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[macro_use]
extern crate tracing;

mod session;

#[derive(Debug, Parser)]
#[command(version, about = "Interactive client for an rsh server.")]
struct Cli {
    /// Server address as host:port.
    #[arg(default_value = DEFAULT_CONNECT, env = "RSH_CONNECT")]
    addr: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    color_eyre::install()?;

    let cli = Cli::parse();

    let mut stream = TcpStream::connect(&cli.addr).await?;
    info!(addr = %cli.addr, "connected");

    let mut input = BufReader::new(io::stdin());
    let mut output = io::stdout();

    session::run(&mut stream, &mut input, &mut output).await?;

    Ok(())
}
