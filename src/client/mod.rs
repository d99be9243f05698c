//! Client session layer over a [`Transport`](crate::transport::Transport)

pub mod config;
pub mod session;

pub use config::ClientConfig;
pub use session::DsmClient;
