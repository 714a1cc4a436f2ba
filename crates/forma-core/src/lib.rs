//! FORMA Core - Fundamental types for motion analysis
//!
//! This crate defines the types shared across the FORMA pipeline:
//! - Identifiers (SessionId, ExerciseId, FrameSeq)
//! - Time primitives (FrameTime)
//! - Landmarks and pose frames
//! - Joints and the landmark-triple table
//! - Angle, score, and violation metrics
//! - Feedback events
//! - Error taxonomy

pub mod error;
pub mod feedback;
pub mod id;
pub mod joint;
pub mod landmark;
pub mod metrics;
pub mod time;

pub use error::*;
pub use feedback::*;
pub use id::*;
pub use joint::*;
pub use landmark::*;
pub use metrics::*;
pub use time::*;
