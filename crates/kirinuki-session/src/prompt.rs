//! Point prompts: normalized coordinates plus an inclusion label.

use serde::{Deserialize, Serialize};

/// Whether a prompt marks its point as part of the object or as
/// background to exclude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PromptLabel {
    /// The point belongs to the object being cut out.
    Positive,
    /// The point belongs to the background.
    Negative,
}

/// A single point prompt.
///
/// Coordinates are normalized to `[0, 1]` of the image dimensions, so
/// the engine protocol is resolution independent. Prompts are
/// immutable once created; a session holds them in insertion order,
/// which is also the order to replay when reconstructing an
/// interaction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPrompt {
    /// Horizontal position as a fraction of image width.
    pub x: f64,
    /// Vertical position as a fraction of image height.
    pub y: f64,
    /// Inclusion or exclusion.
    pub label: PromptLabel,
}

impl PointPrompt {
    /// Create a prompt, clamping coordinates into `[0, 1]`.
    #[must_use]
    pub fn new(x: f64, y: f64, label: PromptLabel) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            label,
        }
    }

    /// Exact normalized-coordinate equality, ignoring the label.
    ///
    /// Used to suppress redundant decodes when the pointer returns to
    /// the position that was just decoded.
    #[must_use]
    pub fn same_position(&self, other: &Self) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_clamped() {
        let prompt = PointPrompt::new(-0.5, 1.5, PromptLabel::Positive);
        assert!((prompt.x - 0.0).abs() < f64::EPSILON);
        assert!((prompt.y - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn same_position_ignores_label() {
        let a = PointPrompt::new(0.5, 0.5, PromptLabel::Positive);
        let b = PointPrompt::new(0.5, 0.5, PromptLabel::Negative);
        let c = PointPrompt::new(0.5, 0.25, PromptLabel::Positive);
        assert!(a.same_position(&b));
        assert!(!a.same_position(&c));
    }

    #[test]
    fn serializes_with_camel_case_label() {
        let prompt = PointPrompt::new(0.25, 0.75, PromptLabel::Negative);
        let json = serde_json::to_string(&prompt).unwrap();
        assert_eq!(json, r#"{"x":0.25,"y":0.75,"label":"negative"}"#);
    }
}
