//! Workout session state and persistence
//!
//! A session is one user working one exercise through one or more
//! sets. It consumes pipeline frame outputs, keeps the counters the
//! pipeline has already validated, and snapshots itself on a fixed
//! cadence so a crash loses at most one autosave interval of
//! progress. Snapshots hold counters and scores only - no landmarks,
//! no frames.

use std::time::Duration;

use forma_core::{ExerciseId, FrameTime, SessionId};
use forma_engine::{FrameOutput, RepetitionState};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::clock::SessionClock;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("cannot {action} a {state:?} session")]
    InvalidState {
        state: SessionState,
        action: &'static str,
    },
    #[error("snapshot codec: {0}")]
    Codec(#[from] serde_json::Error),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    Active,
    Paused,
    Completed,
    Aborted,
}

#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    /// Snapshot cadence while active
    pub autosave_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            autosave_interval: Duration::from_secs(30),
        }
    }
}

/// Counters for one finished set
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SetRecord {
    pub index: u32,
    pub valid: u32,
    pub partial: u32,
}

/// Durable form of a session: counters and scores, never frames
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: u64,
    pub exercise_id: u64,
    pub elapsed_micros: u64,
    pub paused_micros: u64,
    pub state: SessionState,
    pub current_set: u32,
    pub valid: u32,
    pub partial: u32,
    pub completed_sets: Vec<SetRecord>,
    pub rep_scores: Vec<f32>,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<String, SessionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One user, one exercise, one or more sets
#[derive(Clone, Debug)]
pub struct WorkoutSession {
    id: SessionId,
    exercise: ExerciseId,
    config: SessionConfig,
    clock: SessionClock,
    state: SessionState,
    current_set: u32,
    reps: RepetitionState,
    completed_sets: Vec<SetRecord>,
    /// Mean form score of each counted rep, in order
    rep_scores: Vec<f32>,
    last_autosave: FrameTime,
}

impl WorkoutSession {
    pub fn new(id: SessionId, exercise: ExerciseId) -> Self {
        Self::with_config(id, exercise, SessionConfig::default())
    }

    pub fn with_config(id: SessionId, exercise: ExerciseId, config: SessionConfig) -> Self {
        info!(%id, %exercise, "session started");
        WorkoutSession {
            id,
            exercise,
            config,
            clock: SessionClock::new(),
            state: SessionState::Active,
            current_set: 1,
            reps: RepetitionState::default(),
            completed_sets: Vec::new(),
            rep_scores: Vec::new(),
            last_autosave: FrameTime::ZERO,
        }
    }

    #[inline]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[inline]
    pub fn exercise(&self) -> ExerciseId {
        self.exercise
    }

    #[inline]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[inline]
    pub fn now(&self) -> FrameTime {
        self.clock.now()
    }

    #[inline]
    pub fn current_set(&self) -> u32 {
        self.current_set
    }

    /// Counters for the set in progress
    #[inline]
    pub fn reps(&self) -> RepetitionState {
        self.reps
    }

    #[inline]
    pub fn completed_sets(&self) -> &[SetRecord] {
        &self.completed_sets
    }

    /// Whole-session totals including the set in progress
    pub fn totals(&self) -> RepetitionState {
        self.completed_sets.iter().fold(self.reps, |acc, set| {
            RepetitionState {
                valid: acc.valid + set.valid,
                partial: acc.partial + set.partial,
            }
        })
    }

    /// Mean form score across every counted rep, if any were scored
    pub fn average_form_score(&self) -> Option<f32> {
        if self.rep_scores.is_empty() {
            return None;
        }
        Some(self.rep_scores.iter().sum::<f32>() / self.rep_scores.len() as f32)
    }

    #[inline]
    pub fn paused_total(&self) -> Duration {
        self.clock.paused_total()
    }

    /// Feed elapsed wall time into the session clock
    pub fn advance(&mut self, elapsed: Duration) {
        self.clock.advance(elapsed);
    }

    /// Fold one pipeline output into the session
    pub fn record_frame(&mut self, output: &FrameOutput) {
        if self.state != SessionState::Active {
            return;
        }
        self.reps = output.rep_state;
        if output.rep_outcome.is_some() {
            if let (Some(cycle), Some(_)) = (&output.report.completed_cycle, &output.score) {
                self.rep_scores.push(cycle.mean_score);
            }
        }
    }

    /// Close the set in progress and open the next one
    ///
    /// The caller is responsible for resetting the pipeline's rep
    /// counters alongside this.
    pub fn finish_set(&mut self) -> SetRecord {
        let record = SetRecord {
            index: self.current_set,
            valid: self.reps.valid,
            partial: self.reps.partial,
        };
        debug!(set = record.index, valid = record.valid, partial = record.partial, "set finished");
        self.completed_sets.push(record);
        self.current_set += 1;
        self.reps = RepetitionState::default();
        record
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Active => {
                self.clock.pause();
                self.state = SessionState::Paused;
                info!(id = %self.id, "session paused");
                Ok(())
            }
            state => Err(SessionError::InvalidState {
                state,
                action: "pause",
            }),
        }
    }

    pub fn resume(&mut self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Paused => {
                self.clock.resume();
                self.state = SessionState::Active;
                info!(id = %self.id, "session resumed");
                Ok(())
            }
            state => Err(SessionError::InvalidState {
                state,
                action: "resume",
            }),
        }
    }

    pub fn complete(&mut self) {
        info!(id = %self.id, totals = ?self.totals(), "session completed");
        self.clock.resume();
        self.state = SessionState::Completed;
    }

    pub fn abort(&mut self) {
        info!(id = %self.id, "session aborted");
        self.state = SessionState::Aborted;
    }

    /// Time for a periodic snapshot?
    pub fn needs_autosave(&self) -> bool {
        self.state == SessionState::Active
            && self.clock.now().since(self.last_autosave) >= self.config.autosave_interval
    }

    /// Record that a snapshot was persisted at the current time
    pub fn mark_saved(&mut self) {
        self.last_autosave = self.clock.now();
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.id.0,
            exercise_id: self.exercise.0,
            elapsed_micros: self.clock.now().as_micros(),
            paused_micros: self.clock.paused_total().as_micros() as u64,
            state: self.state,
            current_set: self.current_set,
            valid: self.reps.valid,
            partial: self.reps.partial,
            completed_sets: self.completed_sets.clone(),
            rep_scores: self.rep_scores.clone(),
        }
    }

    /// Rebuild a session from its snapshot
    pub fn restore(snapshot: SessionSnapshot, config: SessionConfig) -> Self {
        let now = FrameTime::from_micros(snapshot.elapsed_micros);
        WorkoutSession {
            id: SessionId::new(snapshot.session_id),
            exercise: ExerciseId::new(snapshot.exercise_id),
            config,
            clock: SessionClock::restore(
                now,
                snapshot.state == SessionState::Paused,
                Duration::from_micros(snapshot.paused_micros),
            ),
            state: snapshot.state,
            current_set: snapshot.current_set,
            reps: RepetitionState {
                valid: snapshot.valid,
                partial: snapshot.partial,
            },
            completed_sets: snapshot.completed_sets,
            rep_scores: snapshot.rep_scores,
            last_autosave: now,
        }
    }
}
