//! HTTP protocol layer module
//!
//! Response builders, header decoration and content metadata, decoupled from
//! how requests are routed to files.

pub mod cache;
pub mod cors;
pub mod head;
pub mod mime;
pub mod response;

// Re-export commonly used items
pub use cors::decorate;
pub use response::{
    build_304_response, build_400_response, build_404_response, build_501_response,
    build_options_response, build_redirect_response,
};
