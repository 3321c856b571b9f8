//! Core Module
//!
//! Configuration, shared state, and HTTP server assembly.

pub mod config;
pub mod server;
pub mod state;

pub use config::{Config, DefaultSide};
pub use server::Server;
pub use state::ServerState;
