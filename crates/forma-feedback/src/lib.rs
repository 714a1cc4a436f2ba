//! FORMA Feedback - cue arbitration
//!
//! Raw feedback events arrive at camera cadence; a user can absorb one
//! cue every few seconds. The arbiter sits between the analysis
//! pipeline and the delivery channels and decides which single cue, if
//! any, goes out on each poll.

pub mod arbiter;

pub use arbiter::{ArbiterConfig, ArbiterStats, FeedbackArbiter};
