//! # brotli-guard
//!
//! Library half of the `brotli-guard` binary, exposed for testing.

pub mod cli;

// Re-export brotli_guard_core for convenience
pub use brotli_guard_core;
