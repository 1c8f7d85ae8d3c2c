//! Read-only session state for the presentation layer.

use kirinuki_mask::RgbaImage;
use kirinuki_progress::ProgressSnapshot;

use crate::controller::SessionPhase;
use crate::error::SessionError;
use crate::prompt::PointPrompt;

/// Everything the presentation layer may observe about a session.
///
/// Borrowed from the controller — the presentation layer holds no
/// mutable copy, only this read reference, refreshed after every
/// operation or event delivery.
#[derive(Debug)]
pub struct SessionSnapshot<'a> {
    /// Current interaction phase.
    pub phase: SessionPhase,
    /// Committed prompts in insertion order. Empty while hovering.
    pub prompts: &'a [PointPrompt],
    /// The feathered cutout preview, if a decode has produced one.
    pub preview: Option<&'a RgbaImage>,
    /// Encode progress, present while an encode is running or once it
    /// has finished (100%).
    pub progress: Option<ProgressSnapshot>,
    /// The blocking error, present only in the failed phase.
    pub error: Option<&'a SessionError>,
    /// Whether an explicit retry can recover the session.
    pub can_retry: bool,
}
