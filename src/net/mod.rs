pub mod connection;
pub mod framing;
pub mod server;
