//! Weighted multi-phase progress tracking.
//!
//! A [`PhaseTracker`] owns the progress state of one long-running
//! operation made of several independently-reporting phases. Each
//! phase carries a fixed weight; the tracker folds per-phase local
//! percentages into a single overall percentage plus an elapsed /
//! remaining-time estimate.
//!
//! Timestamps come from the `web-time` crate, which uses
//! `performance.now()` on WASM and `std::time::Instant` on native.

use std::time::Duration;

use web_time::Instant;

use crate::types::{PhaseDescriptor, PhaseDetail, ProgressSnapshot};

/// Guard against division by a vanishing overall percentage in the
/// ETA formula.
const OVERALL_EPSILON: f64 = 1e-9;

/// Lifecycle of one phase inside the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PhaseStatus {
    /// Not started and not yet skipped over.
    Pending,
    /// The phase currently accepting updates.
    Current,
    /// Contributes its full weight to the overall percentage.
    Complete,
}

/// Progress state for one multi-phase operation.
///
/// Owned by whichever component runs the operation and discarded when
/// the operation ends or is reset. The aggregate percentage is
/// monotonic only as long as the collaborator reports monotonic local
/// percentages: the tracker deliberately does not clamp against
/// regression, so a misbehaving collaborator visibly regresses the
/// bar instead of having its bug hidden.
#[derive(Debug, Clone)]
pub struct PhaseTracker {
    phases: Vec<PhaseDescriptor>,
    status: Vec<PhaseStatus>,
    /// Local percentage of the current phase, in `[0, 100]`.
    local_percent: f64,
    detail: Option<PhaseDetail>,
    started_at: Instant,
}

impl PhaseTracker {
    /// Create a tracker over the given phases, in declaration order.
    ///
    /// Weights are normalized to sum to 1.0 when their sum is
    /// positive; non-positive sums leave the weights untouched (every
    /// phase then contributes nothing, which still yields a valid,
    /// permanently-zero tracker rather than a panic).
    #[must_use]
    pub fn new(mut phases: Vec<PhaseDescriptor>) -> Self {
        let sum: f64 = phases.iter().map(|p| p.weight).sum();
        if sum > 0.0 {
            for phase in &mut phases {
                phase.weight /= sum;
            }
        }
        let status = vec![PhaseStatus::Pending; phases.len()];
        Self {
            phases,
            status,
            local_percent: 0.0,
            detail: None,
            started_at: Instant::now(),
        }
    }

    /// Mark the named phase as current.
    ///
    /// Phases before it in declaration order that were never
    /// explicitly started are treated as already complete — skipped,
    /// not double counted. At most one phase is ever current: a
    /// previously current phase later in declaration order is demoted
    /// back to pending, so the shared local percentage can never
    /// count under two weights at once. Unknown identifiers are
    /// ignored.
    pub fn start(&mut self, phase_id: &str) {
        let Some(index) = self.index_of(phase_id) else {
            return;
        };
        for (i, status) in self.status.iter_mut().enumerate() {
            if i < index {
                *status = PhaseStatus::Complete;
            } else if *status == PhaseStatus::Current {
                *status = PhaseStatus::Pending;
            }
        }
        self.status[index] = PhaseStatus::Current;
        self.local_percent = 0.0;
        self.detail = None;
    }

    /// Update the current phase's local percentage and optional
    /// detail.
    ///
    /// Calls naming any phase other than the current one are ignored;
    /// this guards against out-of-order delivery from an asynchronous
    /// collaborator. The local percentage is clamped to `[0, 100]`.
    pub fn update(&mut self, phase_id: &str, local_percent: f64, detail: Option<PhaseDetail>) {
        let Some(index) = self.index_of(phase_id) else {
            return;
        };
        if self.status[index] != PhaseStatus::Current {
            return;
        }
        self.local_percent = local_percent.clamp(0.0, 100.0);
        self.detail = detail;
    }

    /// Mark the named phase as complete.
    ///
    /// When it was the current phase (or no phase was current), the
    /// next pending phase in declaration order becomes current, so a
    /// collaborator may report `update` for the successor without an
    /// explicit `start`.
    pub fn complete_phase(&mut self, phase_id: &str) {
        let Some(index) = self.index_of(phase_id) else {
            return;
        };
        let was_current = self.status[index] == PhaseStatus::Current;
        self.status[index] = PhaseStatus::Complete;

        if was_current || !self.status.contains(&PhaseStatus::Current) {
            self.local_percent = 0.0;
            self.detail = None;
            if let Some(next) = self.status.iter().position(|s| *s == PhaseStatus::Pending) {
                self.status[next] = PhaseStatus::Current;
            }
        }
    }

    /// Mark every phase as complete, driving the overall percentage
    /// to 100.
    pub fn complete_all(&mut self) {
        for status in &mut self.status {
            *status = PhaseStatus::Complete;
        }
        self.local_percent = 0.0;
        self.detail = None;
    }

    /// Return every phase to pending and restart the clock.
    pub fn reset(&mut self) {
        for status in &mut self.status {
            *status = PhaseStatus::Pending;
        }
        self.local_percent = 0.0;
        self.detail = None;
        self.started_at = Instant::now();
    }

    /// [`reset`](Self::reset) followed by [`start`](Self::start).
    pub fn reset_and_start(&mut self, phase_id: &str) {
        self.reset();
        self.start(phase_id);
    }

    /// Weighted overall percentage, clamped to `[0, 100]`.
    ///
    /// `overall = sum(weight_i * 100 for completed i)
    ///          + weight_current * local_percent_current`.
    #[must_use]
    pub fn overall_percent(&self) -> f64 {
        let mut overall = 0.0;
        for (phase, status) in self.phases.iter().zip(&self.status) {
            match status {
                PhaseStatus::Complete => overall += phase.weight * 100.0,
                PhaseStatus::Current => overall += phase.weight * self.local_percent,
                PhaseStatus::Pending => {}
            }
        }
        overall.clamp(0.0, 100.0)
    }

    /// Identifier of the current phase, if any.
    #[must_use]
    pub fn current_phase(&self) -> Option<&str> {
        self.status
            .iter()
            .position(|s| *s == PhaseStatus::Current)
            .map(|i| self.phases[i].id.as_str())
    }

    /// Whether the named phase has completed.
    ///
    /// Unknown identifiers report `false`.
    #[must_use]
    pub fn is_phase_complete(&self, phase_id: &str) -> bool {
        self.index_of(phase_id)
            .is_some_and(|i| self.status[i] == PhaseStatus::Complete)
    }

    /// Whether every phase has completed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        !self.status.is_empty() && self.status.iter().all(|s| *s == PhaseStatus::Complete)
    }

    /// Wall-clock time since construction or the last reset.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Estimated time remaining, extrapolated from elapsed time:
    /// `remaining = elapsed * (100 - overall) / overall`.
    ///
    /// Undefined (`None`) while the overall percentage is zero —
    /// there is nothing to extrapolate from yet.
    #[must_use]
    pub fn eta(&self) -> Option<Duration> {
        let overall = self.overall_percent();
        if overall <= 0.0 {
            return None;
        }
        let remaining =
            self.elapsed().as_secs_f64() * (100.0 - overall) / overall.max(OVERALL_EPSILON);
        Duration::try_from_secs_f64(remaining).ok()
    }

    /// Derive a read-only snapshot for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            overall_percent: self.overall_percent(),
            current_phase: self.current_phase().map(str::to_owned),
            detail: self.detail.clone(),
            elapsed_seconds: self.elapsed().as_secs_f64(),
            eta_seconds: self.eta().map(|d| d.as_secs_f64()),
        }
    }

    fn index_of(&self, phase_id: &str) -> Option<usize> {
        self.phases.iter().position(|p| p.id == phase_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_phase() -> PhaseTracker {
        PhaseTracker::new(vec![
            PhaseDescriptor::new("a", 0.3),
            PhaseDescriptor::new("b", 0.7),
        ])
    }

    #[test]
    fn starts_at_zero() {
        let tracker = two_phase();
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
        assert_eq!(tracker.current_phase(), None);
        assert!(!tracker.is_finished());
    }

    #[test]
    fn complete_then_update_adds_weighted_shares() {
        // completePhase(a) + update(b, 50) must yield 0.3*100 + 0.7*50.
        let mut tracker = two_phase();
        tracker.complete_phase("a");
        tracker.update("b", 50.0, None);
        assert!((tracker.overall_percent() - 65.0).abs() < 1e-9);
    }

    #[test]
    fn start_skips_never_started_predecessors() {
        let mut tracker = two_phase();
        tracker.start("b");
        assert_eq!(tracker.current_phase(), Some("b"));
        // "a" counts as complete: 30 + 0.7 * 0.
        assert!((tracker.overall_percent() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn restarting_an_earlier_phase_demotes_the_current_one() {
        // Only one phase may be current: going back to "a" must not
        // leave "b" current as well, or a single local percentage
        // would count under both weights.
        let mut tracker = two_phase();
        tracker.complete_phase("a");
        tracker.update("b", 50.0, None);
        assert!((tracker.overall_percent() - 65.0).abs() < 1e-9);

        tracker.start("a");
        assert_eq!(tracker.current_phase(), Some("a"));
        tracker.update("a", 50.0, None);
        // 0.3 * 50 only; "b" is pending again and contributes nothing.
        assert!((tracker.overall_percent() - 15.0).abs() < 1e-9);
        tracker.update("b", 50.0, None);
        assert!((tracker.overall_percent() - 15.0).abs() < 1e-9);
    }

    #[test]
    fn phase_completion_is_queryable() {
        let mut tracker = two_phase();
        assert!(!tracker.is_phase_complete("a"));
        // Starting "b" marks its never-started predecessor complete.
        tracker.start("b");
        assert!(tracker.is_phase_complete("a"));
        assert!(!tracker.is_phase_complete("b"));
        assert!(!tracker.is_phase_complete("nope"));
    }

    #[test]
    fn update_on_non_current_phase_is_ignored() {
        let mut tracker = two_phase();
        tracker.start("a");
        tracker.update("b", 90.0, None);
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
        // A stale update for a completed phase is also ignored.
        tracker.complete_phase("a");
        tracker.update("a", 10.0, None);
        assert!((tracker.overall_percent() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_phase_ids_are_ignored() {
        let mut tracker = two_phase();
        tracker.start("nope");
        tracker.update("nope", 50.0, None);
        tracker.complete_phase("nope");
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn complete_all_reaches_one_hundred() {
        let mut tracker = two_phase();
        tracker.complete_all();
        assert!((tracker.overall_percent() - 100.0).abs() < f64::EPSILON);
        assert!(tracker.is_finished());
        assert_eq!(tracker.current_phase(), None);
    }

    #[test]
    fn local_percent_is_clamped() {
        let mut tracker = two_phase();
        tracker.start("a");
        tracker.update("a", 250.0, None);
        assert!((tracker.overall_percent() - 30.0).abs() < 1e-9);
        tracker.update("a", -50.0, None);
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn aggregate_may_regress_with_collaborator() {
        // Regression is deliberately surfaced, not clamped away.
        let mut tracker = two_phase();
        tracker.start("a");
        tracker.update("a", 80.0, None);
        let before = tracker.overall_percent();
        tracker.update("a", 20.0, None);
        assert!(tracker.overall_percent() < before);
    }

    #[test]
    fn weights_are_normalized() {
        let mut tracker = PhaseTracker::new(vec![
            PhaseDescriptor::new("a", 3.0),
            PhaseDescriptor::new("b", 7.0),
        ]);
        tracker.complete_phase("a");
        assert!((tracker.overall_percent() - 30.0).abs() < 1e-9);
    }

    #[test]
    fn reset_returns_to_pending() {
        let mut tracker = two_phase();
        tracker.complete_all();
        tracker.reset();
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
        assert!(!tracker.is_finished());
        assert_eq!(tracker.current_phase(), None);
    }

    #[test]
    fn reset_and_start_marks_phase_current() {
        let mut tracker = two_phase();
        tracker.complete_all();
        tracker.reset_and_start("a");
        assert_eq!(tracker.current_phase(), Some("a"));
        assert!((tracker.overall_percent() - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn eta_is_undefined_at_zero_progress() {
        let tracker = two_phase();
        assert_eq!(tracker.eta(), None);
    }

    #[test]
    fn eta_appears_once_progress_is_nonzero() {
        let mut tracker = two_phase();
        tracker.start("a");
        tracker.update("a", 50.0, None);
        // 15% overall; remaining should be finite and non-negative.
        let eta = tracker.eta();
        assert!(eta.is_some());
    }

    #[test]
    fn eta_is_zero_when_finished() {
        let mut tracker = two_phase();
        tracker.complete_all();
        let eta = tracker.eta().map(|d| d.as_secs_f64());
        assert_eq!(eta, Some(0.0));
    }

    #[test]
    fn detail_is_reported_for_current_phase_only() {
        let mut tracker = two_phase();
        tracker.start("a");
        tracker.update(
            "a",
            10.0,
            Some(PhaseDetail {
                current: 1,
                total: 10,
                unit: "steps".to_owned(),
            }),
        );
        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.current_phase.as_deref(), Some("a"));
        assert_eq!(snapshot.detail.as_ref().map(|d| d.current), Some(1));

        tracker.complete_phase("a");
        assert_eq!(tracker.snapshot().detail, None);
    }

    #[test]
    fn single_phase_operation_behaves() {
        let mut tracker = PhaseTracker::new(vec![PhaseDescriptor::new("only", 1.0)]);
        tracker.start("only");
        tracker.update("only", 40.0, None);
        assert!((tracker.overall_percent() - 40.0).abs() < 1e-9);
        tracker.complete_phase("only");
        assert!(tracker.is_finished());
    }
}
