//! # brotli-guard-core
//!
//! Runtime availability guard for optional Brotli support.
//!
//! The reusable part is capability probing with a cached result: a
//! [`CapabilityProbe`] asks a [`LoaderResolver`] for a dependency once,
//! records [`ProbeResult::Missing`], [`ProbeResult::FailedToLoad`] or
//! [`ProbeResult::Available`], and answers every later query from that
//! record. The [`brotli`] module applies it to the `brotli` crate, which is
//! only compiled in with the `brotli` feature.
//!
//! ```text
//! ┌──────────────────┐  resolve("brotli")  ┌──────────────────┐
//! │ CapabilityProbe  │ ──────────────────► │ LoaderRegistry   │
//! │  (cached result) │ ◄────────────────── │  (constructors)  │
//! └──────────────────┘   NativeLoader      └──────────────────┘
//! ```

pub mod brotli;
pub mod error;
pub mod loader;
pub mod probe;
pub mod report;
pub mod resolver;

pub use error::{CapabilityError, Cause, UnreportedCause, cause_from, error_chain};
pub use loader::{FixedLoader, NativeLoader};
pub use probe::{Capability, CapabilityProbe, ProbeResult};
pub use report::{ProbeReport, ProbeStatus};
pub use resolver::{LoaderConstructor, LoaderRegistry, LoaderResolver};
