//! The session driver
//!
//! One driver runs one workout session: a fixed-cadence tick (about
//! 15 Hz, matching the camera) drains the pipeline's frame slot and
//! polls the arbiter, while a bounded command channel carries raw
//! frames and lifecycle requests from the host. Commands win the
//! select so a fresh frame is always staged before the tick that
//! would analyze it.

use std::sync::Arc;
use std::time::Duration;

use forma_core::{ExerciseId, Landmark, SessionId};
use forma_engine::{AnalysisPipeline, PipelineMode, ScoringConfig};
use forma_feedback::{ArbiterConfig, FeedbackArbiter};
use forma_session::{SessionConfig, SessionState, SessionSummary, WorkoutSession};
use forma_templates::TemplateStore;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::sinks::{DeliveryRouter, SnapshotSink};

#[derive(Clone, Copy, Debug)]
pub struct RuntimeConfig {
    /// Pipeline/arbiter cadence; 66ms tracks a 15 fps camera
    pub tick_interval: Duration,
    pub scoring: ScoringConfig,
    pub arbiter: ArbiterConfig,
    pub session: SessionConfig,
    /// Command channel depth; frames beyond it apply backpressure
    pub command_buffer: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        RuntimeConfig {
            tick_interval: Duration::from_millis(66),
            scoring: ScoringConfig::default(),
            arbiter: ArbiterConfig::default(),
            session: SessionConfig::default(),
            command_buffer: 32,
        }
    }
}

/// Host requests to a running session
#[derive(Debug)]
pub enum Command {
    /// One raw camera observation
    Frame(Vec<Landmark>),
    Pause,
    Resume,
    /// Close the current set and open the next
    FinishSet,
    /// End the session normally
    Complete,
    /// Cancel the session; at most one urgent cue is still delivered
    Abort,
}

/// Cloneable sender half for the host
#[derive(Clone)]
pub struct SessionHandle {
    tx: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Send a command; false means the driver has already stopped
    pub async fn send(&self, command: Command) -> bool {
        self.tx.send(command).await.is_ok()
    }

    pub async fn frame(&self, landmarks: Vec<Landmark>) -> bool {
        self.send(Command::Frame(landmarks)).await
    }
}

/// Owns one session end to end; consumed by `run`
pub struct SessionDriver {
    config: RuntimeConfig,
    pipeline: AnalysisPipeline,
    session: WorkoutSession,
    arbiter: FeedbackArbiter,
    router: DeliveryRouter,
    snapshots: Arc<dyn SnapshotSink>,
    commands: mpsc::Receiver<Command>,
}

impl SessionDriver {
    pub fn new(
        store: &TemplateStore,
        session_id: SessionId,
        exercise: ExerciseId,
        config: RuntimeConfig,
        router: DeliveryRouter,
        snapshots: Arc<dyn SnapshotSink>,
    ) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::channel(config.command_buffer);
        let pipeline = AnalysisPipeline::for_exercise(store, exercise, config.scoring);
        let session = WorkoutSession::with_config(session_id, exercise, config.session);
        let driver = SessionDriver {
            config,
            pipeline,
            session,
            arbiter: FeedbackArbiter::new(config.arbiter),
            router,
            snapshots,
            commands: rx,
        };
        (driver, SessionHandle { tx })
    }

    #[inline]
    pub fn mode(&self) -> PipelineMode {
        self.pipeline.mode()
    }

    /// Drive the session until it completes or aborts
    pub async fn run(mut self) -> SessionSummary {
        info!(id = %self.session.id(), exercise = %self.session.exercise(), "driver running");
        let mut ticker = tokio::time::interval(self.config.tick_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                command = self.commands.recv() => {
                    match command {
                        Some(command) => {
                            if !self.on_command(command) {
                                break;
                            }
                        }
                        // Host dropped every handle: treat as abort.
                        None => {
                            self.on_command(Command::Abort);
                            break;
                        }
                    }
                }
                _ = ticker.tick() => self.on_tick(),
            }
        }

        SessionSummary::build(&self.session, self.pipeline.template())
    }

    /// One cadence step: advance the clock, analyze the staged frame,
    /// poll the arbiter, autosave on schedule
    fn on_tick(&mut self) {
        self.session.advance(self.config.tick_interval);
        if self.session.state() != SessionState::Active {
            return;
        }
        let now = self.session.now();

        if let Some(output) = self.pipeline.tick() {
            for event in &output.feedback {
                self.arbiter.offer(event.clone());
            }
            self.session.record_frame(&output);
        }

        if let Some(event) = self.arbiter.poll(now) {
            self.router.deliver(&event);
        }

        if self.session.needs_autosave() {
            self.snapshots.persist(&self.session.snapshot());
            self.session.mark_saved();
            debug!(at = ?now, "session autosaved");
        }
    }

    /// Apply one command; false ends the session
    fn on_command(&mut self, command: Command) -> bool {
        match command {
            Command::Frame(landmarks) => {
                if self.session.state() == SessionState::Active {
                    if let Err(rejection) = self.pipeline.submit(landmarks, self.session.now()) {
                        self.router.guide(&rejection.guidance);
                    }
                }
                true
            }
            Command::Pause => {
                if let Err(err) = self.session.pause() {
                    warn!(%err, "pause ignored");
                }
                true
            }
            Command::Resume => {
                if let Err(err) = self.session.resume() {
                    warn!(%err, "resume ignored");
                }
                true
            }
            Command::FinishSet => {
                let record = self.session.finish_set();
                self.pipeline.reset_set();
                info!(set = record.index, valid = record.valid, "set closed");
                true
            }
            Command::Complete => {
                self.session.complete();
                false
            }
            Command::Abort => {
                self.session.abort();
                self.pipeline.abort();
                if let Some(event) = self.arbiter.flush_for_abort(self.session.now()) {
                    self.router.deliver(&event);
                }
                false
            }
        }
    }
}
