//! FORMA Session - workout lifecycle above the analysis pipeline
//!
//! Owns the session clock (the only place time can pause), the
//! per-set and whole-session counters, periodic snapshot persistence,
//! and the privacy-safe summary produced at the end. No landmark or
//! frame data ever crosses into this layer's persisted artifacts.

pub mod clock;
pub mod session;
pub mod summary;

pub use clock::SessionClock;
pub use session::{
    SessionConfig, SessionError, SessionSnapshot, SessionState, SetRecord, WorkoutSession,
};
pub use summary::SessionSummary;
