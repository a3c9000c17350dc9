//! # Error Module
//!
//! The two ways a capability can be unavailable, and the opaque cause type
//! that explains the second one.

use std::sync::Arc;
use thiserror::Error;

/// Opaque failure value reported by a loader.
///
/// Shared through an `Arc` so the exact value a loader produced is the one
/// callers receive. Compare identities with [`Arc::ptr_eq`].
pub type Cause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Wrap any error into a [`Cause`].
pub fn cause_from<E>(error: E) -> Cause
where
    E: std::error::Error + Send + Sync + 'static,
{
    Arc::new(error)
}

// =============================================================================
// CAPABILITY ERROR
// =============================================================================

/// Errors surfaced by `ensure_available`.
#[derive(Debug, Clone, Error)]
pub enum CapabilityError {
    /// The supporting module is not part of this build.
    #[error("{dependency} not found; {feature} support is unavailable")]
    DependencyNotFound {
        dependency: String,
        feature: String,
    },

    /// The supporting module is present but its resource failed to initialize.
    #[error("failed to load {dependency}; {feature} support is unavailable")]
    DependencyLoadFailed {
        dependency: String,
        feature: String,
        #[source]
        cause: Cause,
    },
}

impl CapabilityError {
    /// The loader's original cause, if this is a load failure.
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Self::DependencyNotFound { .. } => None,
            Self::DependencyLoadFailed { cause, .. } => Some(cause),
        }
    }

    /// The dependency identifier this error refers to.
    pub fn dependency(&self) -> &str {
        match self {
            Self::DependencyNotFound { dependency, .. }
            | Self::DependencyLoadFailed { dependency, .. } => dependency,
        }
    }

    /// Whether the dependency was absent (as opposed to present but broken).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DependencyNotFound { .. })
    }
}

/// Recorded when a loader says it is unavailable but gives no reason.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("loader for {dependency} reported unavailable without a cause")]
pub struct UnreportedCause {
    pub dependency: String,
}

/// Collect the messages of an error and its sources, outermost first.
///
/// One entry per link. Each message is the link's own `Display`, so a cause
/// shows up once even when it is also returned from `source()`.
pub fn error_chain(error: &(dyn std::error::Error + 'static)) -> Vec<String> {
    let mut chain = vec![error.to_string()];
    let mut current = error.source();
    while let Some(source) = current {
        chain.push(source.to_string());
        current = source.source();
    }
    chain
}

// =============================================================================
// TESTS
// =============================================================================
