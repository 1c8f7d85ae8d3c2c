//! kirinuki-session: Interactive point-prompt segmentation sessions.
//!
//! The [`SessionController`] owns one segmentation interaction: it
//! submits an image to a background inference process for a one-time
//! encode, then turns pointer input into cheap point-prompt decodes —
//! hover previews while exploring, committed refinements once the
//! user starts clicking. Rapid pointer input is coalesced through a
//! single-flight, latest-wins dispatch so the UI stays responsive no
//! matter how fast events arrive.
//!
//! The inference process itself sits behind the narrow
//! [`InferenceEngine`] trait and answers through [`EngineEvent`]s;
//! nothing in this crate depends on a real model. Mask post-processing
//! comes from `kirinuki-mask`, encode progress aggregation from
//! `kirinuki-progress`.

pub mod config;
pub mod controller;
pub mod engine;
pub mod error;
pub mod prompt;
pub mod snapshot;

pub use config::SessionConfig;
pub use controller::{SessionController, SessionPhase};
pub use engine::{EncodePhase, EngineEvent, InferenceEngine};
pub use error::SessionError;
pub use prompt::{PointPrompt, PromptLabel};
pub use snapshot::SessionSnapshot;

/// Re-export the mask result type that [`EngineEvent::Decoded`]
/// carries, so engine implementations need not depend on
/// `kirinuki-mask` directly.
pub use kirinuki_mask::MaskResult;
