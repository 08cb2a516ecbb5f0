//! Server configuration, shared state and the HTTP listener
//!
//! - [`Config`] - environment-driven settings
//! - [`ServerState`] - handles shared by every handler
//! - [`Server`] - binds and serves the router
//! - [`ServerError`] - startup failures

pub mod config;
pub mod error;
pub mod server;
pub mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::Server;
pub use state::ServerState;
