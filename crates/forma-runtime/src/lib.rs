//! FORMA Runtime - the async shell around the synchronous core
//!
//! Everything below this crate is synchronous and deterministic. The
//! runtime owns the tokio loop: a fixed-cadence tick drives the
//! pipeline and the feedback arbiter, a command channel carries frames
//! and lifecycle requests, and delivery/persistence collaborators are
//! reached through the sink traits.

pub mod driver;
pub mod sinks;

pub use driver::{Command, RuntimeConfig, SessionDriver, SessionHandle};
pub use sinks::{DeliveryRouter, HapticSink, SnapshotSink, VisualSink, VoiceSink};
