//! # Brotli Module
//!
//! The Brotli capability and its process-wide probe.
//!
//! Brotli support is an optional dependency: it is only part of the build
//! when the `brotli` cargo feature is enabled. When it is, the registry can
//! resolve a [`BrotliLoader`], which brings the encoder up by running a
//! small round trip. When it isn't, the dependency resolves as missing.
//!
//! ```ignore
//! use brotli_guard_core::brotli;
//!
//! if brotli::is_available() {
//!     // offer "br" in Content-Encoding negotiation
//! }
//! brotli::ensure_available()?;
//! ```

use crate::error::{CapabilityError, Cause};
use crate::probe::{Capability, CapabilityProbe};
use crate::resolver::LoaderRegistry;
use std::sync::OnceLock;

/// The Brotli capability.
pub const BROTLI: Capability = Capability::new("Brotli", "brotli");

static PROBE: OnceLock<CapabilityProbe> = OnceLock::new();

/// The process-wide Brotli probe, resolved against the built-in registry on
/// first access.
pub fn probe() -> &'static CapabilityProbe {
    PROBE.get_or_init(|| CapabilityProbe::initialize(BROTLI, &LoaderRegistry::builtin()))
}

/// True when Brotli is compiled in and its self-check passed.
pub fn is_available() -> bool {
    probe().is_available()
}

/// Fail when Brotli is missing from the build or failed to initialize.
pub fn ensure_available() -> Result<(), CapabilityError> {
    probe().ensure_available()
}

/// Why Brotli failed to initialize, if it did.
pub fn cause() -> Option<&'static Cause> {
    probe().cause()
}

#[cfg(feature = "brotli")]
pub(crate) fn register(registry: &mut LoaderRegistry) {
    use std::sync::Arc;
    registry.register(BROTLI.dependency, || Arc::new(loader::BrotliLoader::load()));
}

#[cfg(not(feature = "brotli"))]
pub(crate) fn register(_registry: &mut LoaderRegistry) {}

#[cfg(feature = "brotli")]
pub use loader::{BrotliLoadError, BrotliLoader};

// =============================================================================
// BROTLI LOADER
// =============================================================================

#[cfg(feature = "brotli")]
mod loader {
    use crate::error::{Cause, cause_from};
    use crate::loader::NativeLoader;
    use std::io::{self, Read, Write};
    use thiserror::Error;

    const BUFFER_SIZE: usize = 4096;
    const QUALITY: u32 = 5;
    const LG_WINDOW: u32 = 22;

    const SELF_CHECK_PAYLOAD: &[u8] =
        b"brotli-guard self-check: the quick brown fox jumps over the lazy dog. \
          the quick brown fox jumps over the lazy dog.";

    /// Why the Brotli encoder failed its self-check.
    #[derive(Debug, Error)]
    pub enum BrotliLoadError {
        #[error("brotli self-check failed")]
        Io(#[from] io::Error),

        #[error("brotli round trip produced {actual} bytes, expected {expected}")]
        Mismatch { expected: usize, actual: usize },
    }

    /// Loader for the `brotli` crate.
    #[derive(Debug, Clone)]
    pub struct BrotliLoader {
        cause: Option<Cause>,
    }

    impl BrotliLoader {
        /// Initialize the encoder and decoder and record the outcome.
        #[must_use]
        pub fn load() -> Self {
            let cause = self_check().err().map(cause_from);
            Self { cause }
        }
    }

    impl NativeLoader for BrotliLoader {
        fn unavailability_cause(&self) -> Option<Cause> {
            self.cause.clone()
        }
    }

    fn self_check() -> Result<(), BrotliLoadError> {
        let mut encoder =
            ::brotli::CompressorWriter::new(Vec::new(), BUFFER_SIZE, QUALITY, LG_WINDOW);
        encoder.write_all(SELF_CHECK_PAYLOAD)?;
        encoder.flush()?;
        let compressed = encoder.into_inner();

        let mut decoded = Vec::with_capacity(SELF_CHECK_PAYLOAD.len());
        ::brotli::Decompressor::new(compressed.as_slice(), BUFFER_SIZE)
            .read_to_end(&mut decoded)?;

        if decoded != SELF_CHECK_PAYLOAD {
            return Err(BrotliLoadError::Mismatch {
                expected: SELF_CHECK_PAYLOAD.len(),
                actual: decoded.len(),
            });
        }
        Ok(())
    }

}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_probe_is_initialized_once() {
        let first: *const CapabilityProbe = probe();
        let second: *const CapabilityProbe = probe();
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn global_probe_matches_build() {
        assert_eq!(is_available(), cfg!(feature = "brotli"));
        assert_eq!(ensure_available().is_ok(), cfg!(feature = "brotli"));
        assert!(cause().is_none());
    }

    #[cfg(not(feature = "brotli"))]
    #[test]
    fn without_feature_dependency_is_missing() {
        assert!(ensure_available().is_err_and(|e| e.is_not_found()));
    }

    #[test]
    fn global_probe_reports_brotli() {
        let report = probe().report();
        assert_eq!(report.feature, "Brotli");
        assert_eq!(report.dependency, "brotli");
    }
}
