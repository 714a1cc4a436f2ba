//! Repetition counting and validation
//!
//! A completed cycle from the phase tracker becomes a rep. It counts
//! as valid only when the full range of motion was achieved (every
//! phase visited in order within bounds) and the cycle's mean form
//! score clears the quality gate; anything else is recorded as a
//! partial rep, never silently dropped.

use forma_core::FrameTime;
use tracing::{debug, info};

use crate::machine::CycleRecord;

/// Minimum mean cycle score for a rep to count as valid
pub const QUALITY_GATE: f32 = 70.0;

/// Why a rep was recorded as partial rather than valid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PartialReason {
    /// Not every phase was visited in order for its minimum duration
    MissedPhases,
    /// A joint left its declared band during the cycle
    OutOfBounds,
    /// Mean form score fell below the quality gate
    LowFormScore,
}

impl std::fmt::Display for PartialReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PartialReason::MissedPhases => write!(f, "incomplete range of motion"),
            PartialReason::OutOfBounds => write!(f, "form broke out of the safe range"),
            PartialReason::LowFormScore => write!(f, "form score below the quality gate"),
        }
    }
}

/// Verdict on one completed cycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RepOutcome {
    Valid,
    Partial(PartialReason),
}

/// Running rep counters for the current set
///
/// Invariant: `valid + partial == total()` at all times.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RepetitionState {
    pub valid: u32,
    pub partial: u32,
}

impl RepetitionState {
    #[inline]
    pub fn total(&self) -> u32 {
        self.valid + self.partial
    }
}

/// Classifies completed cycles and keeps the set's counters
#[derive(Debug)]
pub struct RepValidator {
    state: RepetitionState,
    score_gated: bool,
}

impl RepValidator {
    pub fn new() -> Self {
        RepValidator {
            state: RepetitionState::default(),
            score_gated: true,
        }
    }

    /// Validator for degraded rep counting. No real template backs the
    /// mean cycle score, so the quality gate does not apply; range of
    /// motion and bounds still decide valid vs partial.
    pub fn counting_only() -> Self {
        RepValidator {
            state: RepetitionState::default(),
            score_gated: false,
        }
    }

    #[inline]
    pub fn state(&self) -> RepetitionState {
        self.state
    }

    /// Classify a cycle and update the counters
    pub fn apply(&mut self, cycle: &CycleRecord, now: FrameTime) -> RepOutcome {
        let outcome = self.classify(cycle);
        match outcome {
            RepOutcome::Valid => {
                self.state.valid += 1;
                info!(
                    valid = self.state.valid,
                    total = self.state.total(),
                    mean_score = cycle.mean_score,
                    at = ?now,
                    "valid rep"
                );
            }
            RepOutcome::Partial(reason) => {
                self.state.partial += 1;
                debug!(
                    partial = self.state.partial,
                    total = self.state.total(),
                    %reason,
                    "partial rep"
                );
            }
        }
        outcome
    }

    /// Reset the counters for a new set
    pub fn reset(&mut self) {
        self.state = RepetitionState::default();
    }

    fn classify(&self, cycle: &CycleRecord) -> RepOutcome {
        if !cycle.visited_in_order {
            return RepOutcome::Partial(PartialReason::MissedPhases);
        }
        if !cycle.in_bounds {
            return RepOutcome::Partial(PartialReason::OutOfBounds);
        }
        if self.score_gated && cycle.mean_score < QUALITY_GATE {
            return RepOutcome::Partial(PartialReason::LowFormScore);
        }
        RepOutcome::Valid
    }
}
