//! FORMA Engine - the per-frame analysis pipeline
//!
//! Ingestor -> Angle Calculator -> Phase Tracker -> {Form Score,
//! Violations} -> Rep Validator. One producer (camera cadence) feeds a
//! single-consumer pipeline that must finish well inside the inter-frame
//! interval; frames that arrive faster than it can drain are coalesced
//! to the most recent, never queued.
//!
//! Error policy: landmark and angle faults are absorbed at the frame
//! boundary and reported as explicit status on the frame's report, so
//! every downstream consumer has a total function to call.

pub mod angles;
pub mod ingest;
pub mod machine;
pub mod pipeline;
pub mod reps;

pub use angles::{AngleCalculator, AngleReading};
pub use ingest::{FrameIngestor, FrameRejection, IngestStats};
pub use machine::{
    CycleRecord, FrameReport, PhaseState, PhaseTracker, PhaseVisit, ScoringConfig, Transition,
};
pub use pipeline::{AnalysisPipeline, FrameOutcome, FrameOutput, PipelineMode};
pub use reps::{PartialReason, RepOutcome, RepValidator, RepetitionState};
