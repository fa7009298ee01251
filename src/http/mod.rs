//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from how files are located.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used builders
pub use response::{
    build_304_response, build_404_response, build_405_response, build_500_response,
    build_fallback_response, build_file_response, build_options_response,
};
