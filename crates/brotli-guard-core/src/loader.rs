//! # Loader Module
//!
//! The seam between a probe and the thing that actually brings a native
//! resource up. A probe treats its loader as opaque and only reacts to the
//! availability and cause it reports.

use crate::error::Cause;

// =============================================================================
// NATIVE LOADER TRAIT
// =============================================================================

/// A loaded (or failed-to-load) underlying resource.
///
/// Implementations do their initialization when constructed; these methods
/// only report the outcome.
pub trait NativeLoader: Send + Sync {
    /// Whether the resource initialized and can be used.
    fn is_available(&self) -> bool {
        self.unavailability_cause().is_none()
    }

    /// Why the resource is unavailable, if it is.
    fn unavailability_cause(&self) -> Option<Cause>;

    /// Fail with the unavailability cause.
    fn ensure_availability(&self) -> Result<(), Cause> {
        match self.unavailability_cause() {
            Some(cause) => Err(cause),
            None => Ok(()),
        }
    }
}

// =============================================================================
// FIXED LOADER
// =============================================================================

/// A loader whose outcome was decided before it was registered.
#[derive(Debug, Clone, Default)]
pub struct FixedLoader {
    cause: Option<Cause>,
}

impl FixedLoader {
    /// A loader that reports success.
    #[must_use]
    pub fn available() -> Self {
        Self { cause: None }
    }

    /// A loader that reports `cause` on every query.
    #[must_use]
    pub fn failed(cause: Cause) -> Self {
        Self { cause: Some(cause) }
    }
}

impl NativeLoader for FixedLoader {
    fn unavailability_cause(&self) -> Option<Cause> {
        self.cause.clone()
    }
}

// =============================================================================
// TESTS
// =============================================================================
