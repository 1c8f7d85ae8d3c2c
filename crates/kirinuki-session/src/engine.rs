//! The boundary to the background inference process.
//!
//! The segmentation model is an opaque collaborator reached through a
//! two-stage protocol: one expensive `submit` (encode) per image,
//! then many cheap `decode` calls per user interaction. The
//! controller's logic and tests never depend on the actual inference
//! implementation — a test double can simulate latency and failure
//! without any model present.
//!
//! Every call is a non-blocking message send. Responses arrive later
//! as [`EngineEvent`]s delivered to
//! [`SessionController::handle_event`](crate::SessionController::handle_event),
//! tagged with the generation passed at send time so responses for a
//! disposed or superseded session are dropped on arrival.

use kirinuki_mask::MaskResult;

use crate::prompt::PointPrompt;

/// Encode sub-phases reported by the engine.
///
/// `Download` fires only when the engine must fetch model weights
/// first; a warm engine goes straight to `Process`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodePhase {
    /// Fetching model weights.
    Download,
    /// Running the encode computation.
    Process,
}

impl EncodePhase {
    /// Stable identifier used for progress-phase bookkeeping.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Process => "process",
        }
    }

    /// Unit label for sub-progress detail.
    #[must_use]
    pub const fn unit(self) -> &'static str {
        match self {
            Self::Download => "bytes",
            Self::Process => "steps",
        }
    }
}

/// Asynchronous responses from the background inference process.
///
/// Mask payloads are plain in-memory buffers rather than serialized
/// messages; transports that need serialization handle the raster
/// data out of band.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Encode sub-progress. Zero or more of these may arrive between
    /// `submit` and `Ready`.
    Progress {
        /// Which encode sub-phase is reporting.
        phase: EncodePhase,
        /// Units completed so far.
        current: u64,
        /// Total units expected.
        total: u64,
    },
    /// The image is encoded; decodes may begin.
    Ready,
    /// The encode failed. Recoverable only via an explicit retry.
    EncodeFailed {
        /// Human-readable failure description.
        message: String,
    },
    /// Response to one decode call.
    Decoded(MaskResult),
    /// A decode failed. Treated as a no-op by the session.
    DecodeFailed {
        /// Human-readable failure description.
        message: String,
    },
}

/// Narrow interface to the background inference process.
///
/// Implementations forward each call to the real process (worker,
/// child process, remote service) and deliver its responses back as
/// [`EngineEvent`]s tagged with the same `generation`. `dispose` is
/// idempotent — safe to call on an already-disposed instance.
pub trait InferenceEngine {
    /// Send an image for one-time encoding.
    fn submit(&mut self, generation: u64, image_bytes: &[u8]);

    /// Query the encoded image with a sequence of point prompts.
    fn decode(&mut self, generation: u64, prompts: &[PointPrompt]);

    /// Tear the process down. Any outstanding work is abandoned.
    fn dispose(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_ids_are_stable() {
        assert_eq!(EncodePhase::Download.id(), "download");
        assert_eq!(EncodePhase::Process.id(), "process");
    }
}
