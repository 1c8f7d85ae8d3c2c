//! Session failure taxonomy.
//!
//! Only encode-stage failures are actionable by the user (via retry)
//! and therefore reach the presentation layer. Decode failures are
//! swallowed — the prior preview stays visible — and stale responses
//! are silently dropped; neither appears here.

/// An error that blocks the session until the user retries or loads a
/// new image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The selected image could not be decoded into pixels.
    #[error("failed to decode image: {0}")]
    ImageDecode(String),

    /// The background inference process failed to encode the image
    /// (model or network problem before any interaction is possible).
    #[error("encode failed: {0}")]
    Encode(String),
}
