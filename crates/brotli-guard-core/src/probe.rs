//! # Probe Module
//!
//! One-shot capability probing with a cached result.
//!
//! A [`CapabilityProbe`] resolves its dependency exactly once, when it is
//! constructed, and records the outcome as a [`ProbeResult`]. Every query
//! afterwards is a read of that value. Nothing is re-probed, so a failed
//! probe stays failed for as long as the probe lives.

use crate::error::{CapabilityError, Cause, UnreportedCause, cause_from, error_chain};
use crate::loader::NativeLoader;
use crate::report::{ProbeReport, ProbeStatus};
use crate::resolver::LoaderResolver;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// CAPABILITY
// =============================================================================

/// What a probe is checking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
    /// Human label used in messages, e.g. "Brotli".
    pub feature: &'static str,
    /// Identifier handed to the resolver, e.g. "brotli".
    pub dependency: &'static str,
}

impl Capability {
    #[must_use]
    pub const fn new(feature: &'static str, dependency: &'static str) -> Self {
        Self {
            feature,
            dependency,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.feature, self.dependency)
    }
}

// =============================================================================
// PROBE RESULT
// =============================================================================

/// Outcome of a probe.
#[derive(Debug, Clone)]
pub enum ProbeResult {
    /// The dependency could not be located.
    Missing,
    /// The dependency was located but its resource failed to initialize.
    FailedToLoad(Cause),
    /// The dependency was located and initialized.
    Available,
}

impl ProbeResult {
    #[must_use]
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Self::FailedToLoad(cause) => Some(cause),
            Self::Missing | Self::Available => None,
        }
    }

    #[must_use]
    pub fn status(&self) -> ProbeStatus {
        match self {
            Self::Missing => ProbeStatus::Missing,
            Self::FailedToLoad(_) => ProbeStatus::FailedToLoad,
            Self::Available => ProbeStatus::Available,
        }
    }
}

// =============================================================================
// CAPABILITY PROBE
// =============================================================================

/// A capability checked once and cached.
///
/// Construct it once and share it by reference. All queries take `&self`
/// and never mutate, so a probe can be read from any number of threads.
#[derive(Debug, Clone)]
pub struct CapabilityProbe {
    capability: Capability,
    result: ProbeResult,
}

impl CapabilityProbe {
    /// Resolve `capability` through `resolver` and record the outcome.
    ///
    /// Never fails: a missing or broken dependency is recorded and logged at
    /// `warn`, once, here.
    pub fn initialize<R>(capability: Capability, resolver: &R) -> Self
    where
        R: LoaderResolver + ?Sized,
    {
        let result = match resolver.resolve(capability.dependency) {
            None => {
                tracing::warn!(
                    dependency = capability.dependency,
                    "{} not found; {} support will be unavailable",
                    capability.dependency,
                    capability.feature
                );
                ProbeResult::Missing
            }
            Some(loader) => match loader_failure(capability, loader.as_ref()) {
                Some(cause) => {
                    tracing::warn!(
                        dependency = capability.dependency,
                        "failed to load {}; {} support will be unavailable",
                        capability.dependency,
                        capability.feature
                    );
                    for (depth, message) in error_chain(&*cause).iter().enumerate() {
                        tracing::warn!(
                            dependency = capability.dependency,
                            depth,
                            "cause: {message}"
                        );
                    }
                    ProbeResult::FailedToLoad(cause)
                }
                None => {
                    tracing::debug!(
                        dependency = capability.dependency,
                        "{} support available",
                        capability.feature
                    );
                    ProbeResult::Available
                }
            },
        };

        Self { capability, result }
    }

    /// Wrap an outcome that was computed elsewhere. Does not log.
    #[must_use]
    pub fn from_result(capability: Capability, result: ProbeResult) -> Self {
        Self { capability, result }
    }

    /// True iff the dependency is present and initialized.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.result.is_available()
    }

    /// Fail unless the dependency is present and initialized.
    ///
    /// A load failure carries the loader's original cause, not a copy.
    pub fn ensure_available(&self) -> Result<(), CapabilityError> {
        match &self.result {
            ProbeResult::Available => Ok(()),
            ProbeResult::Missing => Err(CapabilityError::DependencyNotFound {
                dependency: self.capability.dependency.to_string(),
                feature: self.capability.feature.to_string(),
            }),
            ProbeResult::FailedToLoad(cause) => Err(CapabilityError::DependencyLoadFailed {
                dependency: self.capability.dependency.to_string(),
                feature: self.capability.feature.to_string(),
                cause: Arc::clone(cause),
            }),
        }
    }

    /// The recorded load failure, if any.
    #[must_use]
    pub fn cause(&self) -> Option<&Cause> {
        self.result.cause()
    }

    #[must_use]
    pub fn result(&self) -> &ProbeResult {
        &self.result
    }

    #[must_use]
    pub fn capability(&self) -> Capability {
        self.capability
    }

    /// Serializable snapshot of this probe.
    #[must_use]
    pub fn report(&self) -> ProbeReport {
        ProbeReport::from_probe(self)
    }
}

/// Ask a freshly resolved loader why it is unavailable.
///
/// A loader that claims to be unavailable without a cause is still treated
/// as failed.
fn loader_failure(capability: Capability, loader: &dyn NativeLoader) -> Option<Cause> {
    if let Some(cause) = loader.unavailability_cause() {
        return Some(cause);
    }
    if loader.is_available() {
        return None;
    }
    match loader.ensure_availability() {
        Err(cause) => Some(cause),
        Ok(()) => Some(cause_from(UnreportedCause {
            dependency: capability.dependency.to_string(),
        })),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::FixedLoader;
    use crate::resolver::LoaderRegistry;
    use proptest::prelude::*;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    const TEST_CAP: Capability = Capability::new("Brotli", "brotli");

    fn probe_with(loader: FixedLoader) -> CapabilityProbe {
        let registry = LoaderRegistry::new().with("brotli", move || Arc::new(loader.clone()));
        CapabilityProbe::initialize(TEST_CAP, &registry)
    }

    /// Says it is unavailable but never says why.
    struct SilentLoader;

    impl NativeLoader for SilentLoader {
        fn is_available(&self) -> bool {
            false
        }

        fn unavailability_cause(&self) -> Option<Cause> {
            None
        }
    }

    /// Only gives its cause when asked to ensure availability.
    struct DeferredLoader(Cause);

    impl NativeLoader for DeferredLoader {
        fn is_available(&self) -> bool {
            false
        }

        fn unavailability_cause(&self) -> Option<Cause> {
            None
        }

        fn ensure_availability(&self) -> Result<(), Cause> {
            Err(Arc::clone(&self.0))
        }
    }

    /// Counts `warn` events seen by the current thread's subscriber.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn missing_dependency() {
        let probe = CapabilityProbe::initialize(TEST_CAP, &LoaderRegistry::new());

        assert!(!probe.is_available());
        assert!(probe.cause().is_none());
        assert!(matches!(probe.result(), ProbeResult::Missing));
        assert!(matches!(
            probe.ensure_available(),
            Err(CapabilityError::DependencyNotFound { .. })
        ));
    }

    #[test]
    fn available_dependency() {
        let probe = probe_with(FixedLoader::available());

        assert!(probe.is_available());
        assert!(probe.ensure_available().is_ok());
        assert!(probe.cause().is_none());
    }

    #[test]
    fn failed_dependency_surfaces_exact_cause() {
        let cause = cause_from(io::Error::other("libbrotlidec: wrong ELF class"));
        let probe = probe_with(FixedLoader::failed(Arc::clone(&cause)));

        assert!(!probe.is_available());
        assert!(probe.cause().is_some_and(|c| Arc::ptr_eq(c, &cause)));

        let err = probe.ensure_available().err();
        let surfaced = err.as_ref().and_then(|e| e.cause());
        assert!(surfaced.is_some_and(|c| Arc::ptr_eq(c, &cause)));
        assert!(err.is_some_and(|e| !e.is_not_found()));
    }

    #[test]
    fn silent_loader_is_not_available() {
        let registry = LoaderRegistry::new().with("brotli", || Arc::new(SilentLoader));
        let probe = CapabilityProbe::initialize(TEST_CAP, &registry);

        assert!(!probe.is_available());
        let message = probe.cause().map(|c| c.to_string());
        assert_eq!(
            message.as_deref(),
            Some("loader for brotli reported unavailable without a cause")
        );
    }

    #[test]
    fn deferred_cause_is_kept() {
        let cause = cause_from(io::Error::other("engine refused to start"));
        let loader_cause = Arc::clone(&cause);
        let registry = LoaderRegistry::new().with("brotli", move || {
            Arc::new(DeferredLoader(Arc::clone(&loader_cause)))
        });
        let probe = CapabilityProbe::initialize(TEST_CAP, &registry);

        assert!(!probe.is_available());
        assert!(probe.cause().is_some_and(|c| Arc::ptr_eq(c, &cause)));
        let err = probe.ensure_available().err();
        let surfaced = err.as_ref().and_then(|e| e.cause());
        assert!(surfaced.is_some_and(|c| Arc::ptr_eq(c, &cause)));
    }

    #[test]
    fn warns_once_at_initialize() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));

        tracing::subscriber::with_default(subscriber, || {
            let missing = CapabilityProbe::initialize(TEST_CAP, &LoaderRegistry::new());
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            // Header plus one line for the single link in the cause chain.
            let cause = cause_from(io::Error::other("wrong ELF class"));
            let failed = probe_with(FixedLoader::failed(cause));
            assert_eq!(warnings.load(Ordering::SeqCst), 3);

            for _ in 0..100 {
                for probe in [&missing, &failed] {
                    assert!(!probe.is_available());
                    assert!(probe.ensure_available().is_err());
                    let has_cause = probe.cause().is_some();
                    assert_eq!(probe.report().cause.is_some(), has_cause);
                }
            }
            assert_eq!(warnings.load(Ordering::SeqCst), 3);
        });
    }

    #[test]
    fn loader_resolved_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = LoaderRegistry::new().with("brotli", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Arc::new(FixedLoader::available()) as Arc<dyn NativeLoader>
        });

        let probe = CapabilityProbe::initialize(TEST_CAP, &registry);
        for _ in 0..10 {
            assert!(probe.is_available());
            assert!(probe.ensure_available().is_ok());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn concurrent_readers_see_same_result() {
        let cause = cause_from(io::Error::other("unsupported platform"));
        let probe = probe_with(FixedLoader::failed(Arc::clone(&cause)));

        std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    scope.spawn(|| {
                        (0..1000).all(|_| {
                            !probe.is_available()
                                && probe.cause().is_some_and(|c| Arc::ptr_eq(c, &cause))
                        })
                    })
                })
                .collect();

            for handle in handles {
                assert!(matches!(handle.join(), Ok(true)));
            }
        });

        assert!(probe.cause().is_some_and(|c| Arc::ptr_eq(c, &cause)));
    }

    #[test]
    fn from_result_does_not_resolve() {
        let probe = CapabilityProbe::from_result(TEST_CAP, ProbeResult::Available);
        assert!(probe.is_available());
        assert_eq!(probe.capability(), TEST_CAP);
    }

    #[test]
    fn capability_display() {
        assert_eq!(TEST_CAP.to_string(), "Brotli (brotli)");
    }

    proptest! {
        #[test]
        fn cause_text_is_preserved(message in ".{0,64}") {
            let cause = cause_from(io::Error::other(message.clone()));
            let probe = probe_with(FixedLoader::failed(Arc::clone(&cause)));

            let err = probe.ensure_available().err();
            let text = err.as_ref().and_then(|e| e.cause()).map(|c| c.to_string());
            prop_assert_eq!(text, Some(message));
            let surfaced = err.as_ref().and_then(|e| e.cause());
            prop_assert!(surfaced.is_some_and(|c| Arc::ptr_eq(c, &cause)));
        }

        #[test]
        fn queries_are_idempotent(outcome in 0u8..3, calls in 1usize..50) {
            let probe = match outcome {
                0 => CapabilityProbe::initialize(TEST_CAP, &LoaderRegistry::new()),
                1 => probe_with(FixedLoader::available()),
                _ => probe_with(FixedLoader::failed(cause_from(io::Error::other("boom")))),
            };
            let first_available = probe.is_available();
            let first_cause = probe.cause().cloned();
            let first_status = probe.result().status();

            for _ in 0..calls {
                prop_assert_eq!(probe.is_available(), first_available);
                prop_assert_eq!(probe.ensure_available().is_ok(), first_available);
                prop_assert_eq!(probe.result().status(), first_status);
                let same_cause = match (probe.cause(), first_cause.as_ref()) {
                    (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                    (None, None) => true,
                    _ => false,
                };
                prop_assert!(same_cause);
            }
        }
    }
}
