//! Shared types for phase progress tracking.

use serde::{Deserialize, Serialize};

/// One phase of a multi-phase operation, with its share of the
/// overall progress bar.
///
/// Weights across all phases of one operation are expected to sum to
/// 1.0; [`PhaseTracker::new`](crate::PhaseTracker::new) normalizes
/// them so the aggregate formula can rely on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDescriptor {
    /// Stable identifier reported by the collaborator (e.g.
    /// `"download"`, `"process"`).
    pub id: String,
    /// Fraction of the overall bar this phase accounts for.
    pub weight: f64,
}

impl PhaseDescriptor {
    /// Create a phase descriptor.
    pub fn new(id: impl Into<String>, weight: f64) -> Self {
        Self {
            id: id.into(),
            weight,
        }
    }
}

/// Sub-progress detail for the current phase, e.g. `3 / 7 models` or
/// `1_200_000 / 5_000_000 bytes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDetail {
    /// Units completed so far.
    pub current: u64,
    /// Total units expected.
    pub total: u64,
    /// Human-readable unit label.
    pub unit: String,
}

/// Read-only progress view derived from a
/// [`PhaseTracker`](crate::PhaseTracker).
///
/// Durations are fractional seconds for JSON compatibility, since
/// `std::time::Duration` does not implement serde traits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    /// Weighted overall percentage in `[0, 100]`.
    pub overall_percent: f64,
    /// Identifier of the phase currently reporting, if any.
    pub current_phase: Option<String>,
    /// Sub-progress detail for the current phase, if reported.
    pub detail: Option<PhaseDetail>,
    /// Seconds since the operation started (or was last reset).
    pub elapsed_seconds: f64,
    /// Estimated seconds remaining; `None` while overall progress
    /// is zero.
    pub eta_seconds: Option<f64>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = ProgressSnapshot {
            overall_percent: 42.5,
            current_phase: Some("process".to_owned()),
            detail: Some(PhaseDetail {
                current: 3,
                total: 7,
                unit: "steps".to_owned(),
            }),
            elapsed_seconds: 1.25,
            eta_seconds: Some(1.69),
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: ProgressSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, snapshot);
    }
}
