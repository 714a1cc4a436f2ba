//! Error taxonomy for the FORMA core
//!
//! Nothing here is fatal to the process. Every condition degrades to a
//! reduced-functionality mode: rejected frames pause counting, a missing
//! template drops to rep-counting-only, invalid angles reuse the last
//! valid frame. The engine absorbs these at the frame boundary and
//! reports them as explicit status, never as panics.

use thiserror::Error;

use crate::{ExerciseId, JointName};

/// Core FORMA errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Frame has too few points or too many low-visibility points.
    /// Recoverable: pause counting, request repositioning.
    #[error("incomplete landmarks: {detected} detected, {low_visibility} below visibility threshold")]
    IncompleteLandmarks {
        detected: usize,
        low_visibility: usize,
    },

    /// No template for the requested exercise.
    /// Recoverable: degrade to rep-counting-only mode.
    #[error("template not found: {0}")]
    TemplateNotFound(ExerciseId),

    /// Angle computation produced an out-of-range or non-finite value.
    /// Recoverable: skip the frame, reuse the last valid angle.
    #[error("invalid angle for {joint}: {degrees}")]
    InvalidAngle { joint: JointName, degrees: f32 },

    /// Angle data has been unavailable past the tolerated window.
    /// Recoverable: surfaced to the user via the feedback channel.
    #[error("tracking degraded for {seconds:.1}s")]
    TrackingDegraded { seconds: f32 },

    /// A phase exceeded its maximum duration without advancing.
    /// Recoverable: flagged, does not force a transition.
    #[error("stalled in phase '{phase}' for {seconds:.1}s")]
    StalledPhase { phase: String, seconds: f32 },

    /// A template failed validation at load time.
    #[error("invalid template '{name}': {reason}")]
    InvalidTemplate { name: String, reason: String },
}

/// Result type for FORMA core operations
pub type CoreResult<T> = Result<T, CoreError>;
