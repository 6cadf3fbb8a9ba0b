//! Request handler module
//!
//! Dispatches requests by method and serves files from the configured root.
//! The development headers are applied to whatever the dispatch produced.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
