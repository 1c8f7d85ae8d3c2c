//! Session configuration with tunable parameters.

use serde::{Deserialize, Serialize};

/// Configuration for a segmentation session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Share of the encode progress bar attributed to the model
    /// download phase; the remainder goes to the compute phase. Both
    /// weights are normalized by the progress tracker, so this is a
    /// fraction in `[0, 1]`.
    pub download_weight: f64,

    /// Feather radius in pixels for the cutout preview boundary.
    pub feather_radius: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            download_weight: 0.3,
            feather_radius: kirinuki_mask::DEFAULT_RADIUS,
        }
    }
}
