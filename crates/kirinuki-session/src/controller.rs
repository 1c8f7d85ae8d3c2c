//! The segmentation session state machine.
//!
//! A [`SessionController`] owns one interactive segmentation session:
//! it drives the background inference process through the two-stage
//! encode/decode protocol, coalesces overlapping decode requests so
//! rapid pointer input never piles up work, and turns each decode
//! response into a feathered cutout preview.
//!
//! The controller never blocks. Every operation returns immediately;
//! "waiting" is modeled entirely through the single `in_flight` and
//! `pending` request slots rather than queued continuations, which is
//! what makes the latest-wins coalescing policy structurally
//! enforceable — there is only one slot for "the next thing to do".
//! Engine responses are delivered by the embedder through
//! [`handle_event`](SessionController::handle_event), tagged with the
//! generation captured at send time; responses for a superseded or
//! disposed session are dropped on arrival.

use kirinuki_mask::{MaskResult, RgbaImage, composite_cutout, feather_mask};
use kirinuki_progress::{PhaseDescriptor, PhaseDetail, PhaseTracker};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::engine::{EncodePhase, EngineEvent, InferenceEngine};
use crate::error::SessionError;
use crate::prompt::{PointPrompt, PromptLabel};
use crate::snapshot::SessionSnapshot;

/// Interaction phase of a segmentation session.
///
/// `Idle -> Encoding -> Hover <-> Refining`, with `Refining -> Hover`
/// on explicit clear, `Encoding -> Failed` on encode error (retryable)
/// and `* -> Idle` on disposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionPhase {
    /// No image submitted.
    Idle,
    /// The engine is encoding the submitted image.
    Encoding,
    /// Encoded; single-point hover previews are live, no committed
    /// prompts.
    Hover,
    /// At least one committed prompt; clicks refine the selection.
    Refining,
    /// The encode failed; recoverable via [`SessionController::retry`].
    Failed,
}

/// One decode request: the prompt sequence to send plus whether its
/// result should be persisted (`commit`) or only shown (`hover`).
#[derive(Debug, Clone)]
struct DecodeRequest {
    prompts: Vec<PointPrompt>,
    commit: bool,
}

impl DecodeRequest {
    fn final_point(&self) -> Option<PointPrompt> {
        self.prompts.last().copied()
    }
}

/// Controller for one interactive point-prompt segmentation session.
///
/// Exclusively owns the session state, the current [`MaskResult`],
/// and the background engine instance. The presentation layer only
/// ever sees the [`SessionSnapshot`] read view.
pub struct SessionController<E: InferenceEngine> {
    engine: E,
    config: SessionConfig,
    /// Monotonically increasing id; bumped on every submit and on
    /// disposal so late engine events identify themselves as stale.
    generation: u64,
    phase: SessionPhase,
    /// Committed prompts in insertion order. Empty while hovering.
    prompts: Vec<PointPrompt>,
    last_result: Option<MaskResult>,
    /// The single outstanding decode, if any.
    in_flight: Option<DecodeRequest>,
    /// The single superseding decode waiting for `in_flight` to
    /// finish. Overwritten, never queued.
    pending: Option<DecodeRequest>,
    /// Final point of the most recent request whose response was
    /// received; used only to suppress redundant decodes.
    last_decoded: Option<PointPrompt>,
    /// Raw bytes of the submitted image, retained for retry.
    image_bytes: Option<Vec<u8>>,
    /// Decoded source pixels, retained for compositing.
    source: Option<RgbaImage>,
    preview: Option<RgbaImage>,
    progress: Option<PhaseTracker>,
    error: Option<SessionError>,
    disposed: bool,
}

impl<E: InferenceEngine> SessionController<E> {
    /// Create an idle controller owning the given engine.
    pub fn new(engine: E, config: SessionConfig) -> Self {
        Self {
            engine,
            config,
            generation: 0,
            phase: SessionPhase::Idle,
            prompts: Vec::new(),
            last_result: None,
            in_flight: None,
            pending: None,
            last_decoded: None,
            image_bytes: None,
            source: None,
            preview: None,
            progress: None,
            error: None,
            disposed: false,
        }
    }

    /// Submit an image for encoding.
    ///
    /// Clears all prior prompts and results, invalidates outstanding
    /// engine responses, and starts the encode with a fresh progress
    /// tracker. Failure to decode the image bytes moves the session
    /// straight to [`SessionPhase::Failed`] without touching the
    /// engine.
    pub fn submit_image(&mut self, image_bytes: Vec<u8>) {
        if self.disposed {
            return;
        }
        self.start_encode(image_bytes);
    }

    /// Re-run the encode with the retained image after a failure.
    ///
    /// No-op outside [`SessionPhase::Failed`].
    pub fn retry(&mut self) {
        if self.disposed || self.phase != SessionPhase::Failed {
            return;
        }
        if let Some(bytes) = self.image_bytes.clone() {
            self.start_encode(bytes);
        }
    }

    /// Pointer moved to `(x, y)` (normalized coordinates).
    ///
    /// In [`SessionPhase::Hover`] this requests an ephemeral
    /// single-point preview; the prompt is never appended to the
    /// committed sequence. Ignored in every other phase, including
    /// [`SessionPhase::Refining`].
    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if self.disposed || self.phase != SessionPhase::Hover {
            return;
        }
        let prompt = PointPrompt::new(x, y, PromptLabel::Positive);
        self.dispatch(DecodeRequest {
            prompts: vec![prompt],
            commit: false,
        });
    }

    /// Pointer pressed at `(x, y)` (normalized coordinates).
    ///
    /// The first press leaves hover mode: the committed sequence is
    /// replaced by this single point and the session starts refining.
    /// Further presses append to the sequence — the label chosen by
    /// the interaction modality (primary action positive, secondary
    /// negative). Either way, the full accumulated sequence is
    /// decoded with commit semantics.
    pub fn pointer_down(&mut self, x: f64, y: f64, label: PromptLabel) {
        if self.disposed {
            return;
        }
        let prompt = PointPrompt::new(x, y, label);
        match self.phase {
            SessionPhase::Hover => {
                self.phase = SessionPhase::Refining;
                self.prompts = vec![prompt];
            }
            SessionPhase::Refining => self.prompts.push(prompt),
            SessionPhase::Idle | SessionPhase::Encoding | SessionPhase::Failed => return,
        }
        self.dispatch(DecodeRequest {
            prompts: self.prompts.clone(),
            commit: true,
        });
    }

    /// Drop all prompts and results and return to hover mode.
    ///
    /// The encoded image is preserved — no re-encode. Both request
    /// slots are emptied; a decode response still on the wire finds
    /// no matching in-flight slot and is ignored.
    pub fn clear(&mut self) {
        if self.disposed
            || !matches!(self.phase, SessionPhase::Hover | SessionPhase::Refining)
        {
            return;
        }
        self.phase = SessionPhase::Hover;
        self.prompts.clear();
        self.last_result = None;
        self.preview = None;
        self.in_flight = None;
        self.pending = None;
        self.last_decoded = None;
    }

    /// Tear down the engine and invalidate the controller.
    ///
    /// In-flight and pending requests are abandoned; their eventual
    /// responses carry a stale generation and are discarded. All
    /// further operations are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.engine.dispose();
        self.disposed = true;
        self.generation += 1;
        self.phase = SessionPhase::Idle;
        self.prompts.clear();
        self.last_result = None;
        self.in_flight = None;
        self.pending = None;
        self.last_decoded = None;
        self.image_bytes = None;
        self.source = None;
        self.preview = None;
        self.progress = None;
        self.error = None;
    }

    /// Deliver an engine response.
    ///
    /// `generation` must be the value the engine received with the
    /// originating call; events from an invalidated generation are
    /// dropped here, silently.
    pub fn handle_event(&mut self, generation: u64, event: EngineEvent) {
        if generation != self.generation {
            debug!("dropping stale engine event (generation {generation} != {})", self.generation);
            return;
        }
        match event {
            EngineEvent::Progress {
                phase,
                current,
                total,
            } => self.on_progress(phase, current, total),
            EngineEvent::Ready => self.on_ready(),
            EngineEvent::EncodeFailed { message } => self.on_encode_failed(message),
            EngineEvent::Decoded(result) => self.on_decoded(&result),
            EngineEvent::DecodeFailed { message } => self.on_decode_failed(&message),
        }
    }

    /// Read-only state for the presentation layer.
    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            phase: self.phase,
            prompts: &self.prompts,
            preview: self.preview.as_ref(),
            progress: self.progress.as_ref().map(PhaseTracker::snapshot),
            error: self.error.as_ref(),
            can_retry: self.phase == SessionPhase::Failed && self.image_bytes.is_some(),
        }
    }

    /// Current interaction phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The committed mask result from the most recent commit-mode
    /// decode, if any. Hover previews never land here.
    #[must_use]
    pub const fn last_result(&self) -> Option<&MaskResult> {
        self.last_result.as_ref()
    }

    /// The generation id current engine calls are tagged with.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The owned engine, for embedders that need to pump it.
    #[must_use]
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// Mutable access to the owned engine.
    pub const fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    fn start_encode(&mut self, image_bytes: Vec<u8>) {
        // Invalidate any outstanding responses before anything else.
        self.generation += 1;
        self.phase = SessionPhase::Encoding;
        self.prompts.clear();
        self.last_result = None;
        self.in_flight = None;
        self.pending = None;
        self.last_decoded = None;
        self.preview = None;
        self.error = None;
        self.progress = None;

        match image::load_from_memory(&image_bytes) {
            Ok(decoded) => self.source = Some(decoded.into_rgba8()),
            Err(err) => {
                self.source = None;
                self.image_bytes = Some(image_bytes);
                self.error = Some(SessionError::ImageDecode(err.to_string()));
                self.phase = SessionPhase::Failed;
                return;
            }
        }

        self.progress = Some(PhaseTracker::new(vec![
            PhaseDescriptor::new(EncodePhase::Download.id(), self.config.download_weight),
            PhaseDescriptor::new(EncodePhase::Process.id(), 1.0 - self.config.download_weight),
        ]));

        self.engine.submit(self.generation, &image_bytes);
        self.image_bytes = Some(image_bytes);
    }

    /// Single-flight, latest-wins decode dispatch.
    ///
    /// With a request already in flight the new one overwrites the
    /// pending slot — older intermediate positions are deliberately
    /// lost, bounding outstanding work to one in-flight plus one
    /// waiting request regardless of pointer event rate.
    fn dispatch(&mut self, request: DecodeRequest) {
        if self.in_flight.is_some() {
            self.pending = Some(request);
            return;
        }
        self.send(request);
    }

    fn send(&mut self, request: DecodeRequest) {
        self.engine.decode(self.generation, &request.prompts);
        self.in_flight = Some(request);
    }

    fn on_progress(&mut self, phase: EncodePhase, current: u64, total: u64) {
        let Some(tracker) = self.progress.as_mut() else {
            return;
        };
        // Late or duplicate reports for a phase that already finished
        // must not wind the bar back by re-starting it.
        if tracker.is_phase_complete(phase.id()) {
            debug!("progress for completed phase {}; ignoring", phase.id());
            return;
        }
        if tracker.current_phase() != Some(phase.id()) {
            tracker.start(phase.id());
        }
        #[allow(clippy::cast_precision_loss)]
        let percent = if total > 0 {
            current as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        tracker.update(
            phase.id(),
            percent,
            Some(PhaseDetail {
                current,
                total,
                unit: phase.unit().to_owned(),
            }),
        );
    }

    fn on_ready(&mut self) {
        if self.phase != SessionPhase::Encoding {
            return;
        }
        if let Some(tracker) = self.progress.as_mut() {
            tracker.complete_all();
        }
        self.phase = SessionPhase::Hover;
    }

    fn on_encode_failed(&mut self, message: String) {
        if self.phase != SessionPhase::Encoding {
            return;
        }
        self.progress = None;
        self.error = Some(SessionError::Encode(message));
        self.phase = SessionPhase::Failed;
    }

    fn on_decoded(&mut self, result: &MaskResult) {
        let Some(done) = self.in_flight.take() else {
            debug!("decode response with no request in flight; ignoring");
            return;
        };
        self.last_decoded = done.final_point();

        // An invalid result is a per-interaction failure: logged,
        // prior preview retained, refinement state untouched.
        if let Some(preview) = self.render_preview(result) {
            self.preview = Some(preview);
            if done.commit {
                self.last_result = Some(result.clone());
            }
        }

        self.flush_pending();
    }

    fn on_decode_failed(&mut self, message: &str) {
        warn!("decode failed: {message}");
        if self.in_flight.take().is_none() {
            return;
        }
        self.flush_pending();
    }

    /// Feather and composite the best candidate into a preview.
    ///
    /// Returns `None` (after logging) when the result is unusable:
    /// no candidates, or dimensions that do not match the source.
    fn render_preview(&self, result: &MaskResult) -> Option<RgbaImage> {
        let source = self.source.as_ref()?;
        if (result.width(), result.height()) != source.dimensions() {
            warn!(
                "mask result is {}x{} but source is {}x{}; dropping",
                result.width(),
                result.height(),
                source.width(),
                source.height(),
            );
            return None;
        }
        let Some((_, mask)) = result.best_plane_image() else {
            warn!("decode returned no mask candidates; dropping");
            return None;
        };
        let alpha = feather_mask(&mask, self.config.feather_radius);
        match composite_cutout(source, &alpha) {
            Ok(cutout) => Some(cutout),
            Err(err) => {
                warn!("compositing failed: {err}");
                None
            }
        }
    }

    /// Issue the pending request unless it targets the position that
    /// was just decoded.
    ///
    /// The equality check compares only the most recent point's
    /// normalized coordinates against the last decoded point, so a
    /// pointer that briefly left and returned to the same pixel does
    /// not trigger a no-op decode.
    fn flush_pending(&mut self) {
        let Some(next) = self.pending.take() else {
            return;
        };
        let redundant = match (next.final_point(), self.last_decoded) {
            (Some(point), Some(last)) => point.same_position(&last),
            _ => false,
        };
        if redundant {
            debug!("dropping pending decode at the position just decoded");
            return;
        }
        self.send(next);
    }
}
