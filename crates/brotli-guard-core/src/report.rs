//! # Report Module
//!
//! Serializable snapshot of a probe, for logs, CLIs and health endpoints.
//!
//! A report is derived from a probe and owns plain strings, so it can be
//! shipped anywhere without dragging the cause's `Arc` along.

use crate::error::error_chain;
use crate::probe::CapabilityProbe;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three probe outcomes, without the cause payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeStatus {
    Available,
    Missing,
    FailedToLoad,
}

impl fmt::Display for ProbeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeStatus::Available => write!(f, "available"),
            ProbeStatus::Missing => write!(f, "missing"),
            ProbeStatus::FailedToLoad => write!(f, "failed_to_load"),
        }
    }
}

/// Snapshot of a probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeReport {
    /// Human label, e.g. "Brotli".
    pub feature: String,
    /// Identifier that was resolved, e.g. "brotli".
    pub dependency: String,
    /// Outcome of the probe.
    pub status: ProbeStatus,
    /// Top-level cause message (load failures only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    /// Cause followed by its sources, outermost first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cause_chain: Vec<String>,
}

impl ProbeReport {
    /// Build a report from a probe.
    #[must_use]
    pub fn from_probe(probe: &CapabilityProbe) -> Self {
        let capability = probe.capability();
        let cause_chain = probe
            .cause()
            .map(|cause| error_chain(&**cause))
            .unwrap_or_default();

        Self {
            feature: capability.feature.to_string(),
            dependency: capability.dependency.to_string(),
            status: probe.result().status(),
            cause: cause_chain.first().cloned(),
            cause_chain,
        }
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == ProbeStatus::Available
    }

    /// Format as plain text.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut output = String::new();

        output.push_str("┌─────────────────────────────────────┐\n");
        output.push_str(&format!("│ CAPABILITY: {}\n", self.feature));
        output.push_str("├─────────────────────────────────────┤\n");
        output.push_str(&format!("│ dependency: {}\n", self.dependency));
        output.push_str(&format!("│ status:     {}\n", self.status));

        if !self.cause_chain.is_empty() {
            output.push_str("├─────────────────────────────────────┤\n");
            output.push_str("│ CAUSE\n");
            for (depth, message) in self.cause_chain.iter().enumerate() {
                if depth == 0 {
                    output.push_str(&format!("│ - {}\n", message));
                } else {
                    output.push_str(&format!("│   caused by: {}\n", message));
                }
            }
        }

        output.push_str("└─────────────────────────────────────┘\n");

        output
    }
}

// =============================================================================
// TESTS
// =============================================================================
