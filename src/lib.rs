//! Local static file server for development.
//!
//! Serves a directory over HTTP/1.1, adds permissive CORS headers and disables
//! caching on every response, and answers preflight requests directly.

pub mod cli;
pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;

pub use config::Config;
pub use error::ServeError;
pub use server::{start, Server};
