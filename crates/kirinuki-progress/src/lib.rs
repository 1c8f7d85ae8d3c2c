//! kirinuki-progress: Weighted multi-phase progress aggregation.
//!
//! Every long-running tool in the app (segmentation encode, media
//! conversion, model downloads) is made of several
//! independently-progressing sub-operations. This crate folds them
//! into one monotonic percentage with an elapsed/remaining-time
//! estimate: declare the phases once with fixed weights, then feed
//! per-phase local percentages into a [`PhaseTracker`] as the
//! collaborator reports them.
//!
//! The tracker is pure state — no threads, no channels, no I/O. It is
//! owned per active operation and discarded when the operation ends.

pub mod tracker;
pub mod types;

pub use tracker::PhaseTracker;
pub use types::{PhaseDescriptor, PhaseDetail, ProgressSnapshot};
