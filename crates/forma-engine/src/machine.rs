//! Phase & form state machine
//!
//! States are the ordered phases of the active template plus an implicit
//! `Idle` initial state and an `Aborted` terminal state. The tracker
//! advances on angle evidence: phase i -> i+1 when the next phase's
//! declared ranges are all entered and the current phase has run at
//! least its minimum duration. Exceeding the maximum duration flags a
//! stall but never forces a transition.
//!
//! Every frame also yields a `FormScore`: per-joint 100 minus a linear
//! penalty on deviation from the phase ideal, with safety-threshold
//! breaches scaled by risk level, aggregated as the importance-weighted
//! mean. Invalid or unavailable angles never poison the score - the
//! previous valid joint score is carried forward, and carrying on past
//! five seconds raises a tracking-degraded condition.

use std::collections::BTreeMap;
use std::time::Duration;

use forma_core::{
    AngleSample, FormScore, FormViolation, FrameSeq, FrameTime, JointAngle, JointName, Severity,
};
use forma_templates::ExerciseTemplate;
use tracing::{debug, info, warn};

use crate::angles::AngleReading;

/// Tunables for the score-from-deviation curve
#[derive(Clone, Copy, Debug)]
pub struct ScoringConfig {
    /// Points deducted per degree of deviation from the phase ideal
    pub penalty_per_degree: f32,
    /// How long a carried-forward joint score stays usable
    pub carry_forward_limit: Duration,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        ScoringConfig {
            penalty_per_degree: 2.0,
            carry_forward_limit: Duration::from_secs(5),
        }
    }
}

/// Tracker state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseState {
    /// Between attempts, at the resting posture
    Idle,
    /// In the template's phase at this index
    Active(usize),
    /// Session cancelled; the tracker emits nothing further
    Aborted,
}

/// A phase change observed on a frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: String,
    pub to: String,
}

/// One completed stay in a phase during a cycle
#[derive(Clone, Debug)]
pub struct PhaseVisit {
    pub phase: String,
    pub entered_at: FrameTime,
    pub exited_at: FrameTime,
    /// Stayed past the phase's maximum duration
    pub overran: bool,
    /// Declared joint angles stayed inside the phase bounds throughout
    pub in_bounds: bool,
}

impl PhaseVisit {
    #[inline]
    pub fn duration(&self) -> Duration {
        self.exited_at.since(self.entered_at)
    }
}

/// One full Idle -> phases -> Idle traversal
#[derive(Clone, Debug)]
pub struct CycleRecord {
    pub visits: Vec<PhaseVisit>,
    pub started_at: FrameTime,
    pub completed_at: FrameTime,
    /// Mean overall form score across the cycle's frames
    pub mean_score: f32,
    /// Every declared phase visited in order, each meeting its minimum
    /// duration
    pub visited_in_order: bool,
    /// No declared joint left its band during any visit
    pub in_bounds: bool,
}

/// Per-frame output of the tracker
#[derive(Clone, Debug)]
pub struct FrameReport {
    pub seq: FrameSeq,
    pub timestamp: FrameTime,
    pub state: PhaseState,
    /// Name of the active phase, if any
    pub phase_name: Option<String>,
    pub transition: Option<Transition>,
    /// One sample per key joint; unavailable joints are flagged, never
    /// guessed
    pub samples: Vec<AngleSample>,
    pub score: FormScore,
    pub stalled: bool,
    pub tracking_degraded: bool,
    /// Present on the frame that closed a full cycle
    pub completed_cycle: Option<CycleRecord>,
}

#[derive(Clone, Copy, Debug)]
struct CarriedJoint {
    score: f32,
    at: FrameTime,
}

/// The phase & form state machine for one exercise
#[derive(Debug)]
pub struct PhaseTracker {
    template: ExerciseTemplate,
    config: ScoringConfig,
    state: PhaseState,
    entered_at: FrameTime,
    cycle_started: FrameTime,
    visits: Vec<PhaseVisit>,
    current_in_bounds: bool,
    current_overran: bool,
    stall_flagged: bool,
    score_sum: f64,
    score_frames: u64,
    carried: BTreeMap<JointName, CarriedJoint>,
    unavailable_since: BTreeMap<JointName, FrameTime>,
    degraded_reported: bool,
}

impl PhaseTracker {
    pub fn new(template: ExerciseTemplate, config: ScoringConfig) -> Self {
        PhaseTracker {
            template,
            config,
            state: PhaseState::Idle,
            entered_at: FrameTime::ZERO,
            cycle_started: FrameTime::ZERO,
            visits: Vec::new(),
            current_in_bounds: true,
            current_overran: false,
            stall_flagged: false,
            score_sum: 0.0,
            score_frames: 0,
            carried: BTreeMap::new(),
            unavailable_since: BTreeMap::new(),
            degraded_reported: false,
        }
    }

    #[inline]
    pub fn state(&self) -> PhaseState {
        self.state
    }

    #[inline]
    pub fn template(&self) -> &ExerciseTemplate {
        &self.template
    }

    /// Enter the terminal state; in-flight cycle data is discarded
    pub fn abort(&mut self) {
        info!(exercise = %self.template.name, "phase tracker aborted");
        self.state = PhaseState::Aborted;
        self.visits.clear();
    }

    /// Process one frame's readings; total - never fails
    pub fn observe(
        &mut self,
        readings: &[AngleReading],
        seq: FrameSeq,
        now: FrameTime,
    ) -> FrameReport {
        if self.state == PhaseState::Aborted {
            return FrameReport {
                seq,
                timestamp: now,
                state: PhaseState::Aborted,
                phase_name: None,
                transition: None,
                samples: Vec::new(),
                score: FormScore::perfect(now),
                stalled: false,
                tracking_degraded: false,
                completed_cycle: None,
            };
        }

        let mut violations: Vec<FormViolation> = Vec::new();

        // Availability bookkeeping and the working angle map.
        let mut angles: BTreeMap<JointName, f32> = BTreeMap::new();
        for reading in readings {
            match reading.degrees {
                Some(degrees) => {
                    angles.insert(reading.joint, degrees);
                    self.unavailable_since.remove(&reading.joint);
                }
                None => {
                    self.unavailable_since.entry(reading.joint).or_insert(now);
                }
            }
        }
        let tracking_degraded = self.check_tracking(now, &mut violations);

        // Transitions.
        let mut transition = None;
        let mut completed_cycle = None;
        match self.state {
            PhaseState::Idle => {
                if !self.template.at_rest(&angles)
                    && self
                        .template
                        .phases
                        .first()
                        .map(|p| p.matched_by(&angles))
                        .unwrap_or(false)
                {
                    self.cycle_started = now;
                    self.visits.clear();
                    self.score_sum = 0.0;
                    self.score_frames = 0;
                    self.enter_phase(0, now);
                    transition = Some(Transition {
                        from: "idle".to_string(),
                        to: self.template.phases[0].name.clone(),
                    });
                }
            }
            PhaseState::Active(i) => {
                let elapsed = now.since(self.entered_at);
                if self.template.at_rest(&angles) {
                    let from = self.template.phases[i].name.clone();
                    self.close_visit(i, now);
                    completed_cycle = self.finish_cycle(now);
                    self.state = PhaseState::Idle;
                    transition = Some(Transition {
                        from,
                        to: "idle".to_string(),
                    });
                } else if let Some(next) = self.template.phases.get(i + 1) {
                    if next.matched_by(&angles) && elapsed >= self.template.phases[i].min_duration
                    {
                        let from = self.template.phases[i].name.clone();
                        let to = next.name.clone();
                        self.close_visit(i, now);
                        self.enter_phase(i + 1, now);
                        transition = Some(Transition { from, to });
                    } else {
                        self.check_stall(i, elapsed, &mut violations);
                    }
                } else {
                    self.check_stall(i, elapsed, &mut violations);
                }
            }
            PhaseState::Aborted => unreachable!("handled above"),
        }

        // Score against the (possibly just entered) phase.
        let mut samples = Vec::with_capacity(readings.len());
        let mut stalled = false;
        let score = match self.state {
            PhaseState::Active(i) => {
                stalled = self.stall_flagged;
                let mut per_joint: BTreeMap<JointName, f32> = BTreeMap::new();
                self.score_phase(i, readings, now, &mut per_joint, &mut samples, &mut violations);
                let score = FormScore::new(
                    per_joint,
                    &self.template.joint_weights,
                    violations,
                    now,
                );
                self.score_sum += score.overall as f64;
                self.score_frames += 1;
                score
            }
            _ => {
                for reading in readings {
                    samples.push(match reading.degrees {
                        Some(degrees) => JointAngle::new(reading.joint, degrees, true, 0.0)
                            .map(AngleSample::Available)
                            .unwrap_or(AngleSample::Unavailable(reading.joint)),
                        None => AngleSample::Unavailable(reading.joint),
                    });
                }
                FormScore {
                    overall: 100.0,
                    per_joint: BTreeMap::new(),
                    violations,
                    timestamp: now,
                }
            }
        };

        FrameReport {
            seq,
            timestamp: now,
            state: self.state,
            phase_name: match self.state {
                PhaseState::Active(i) => Some(self.template.phases[i].name.clone()),
                _ => None,
            },
            transition,
            samples,
            score,
            stalled,
            tracking_degraded,
            completed_cycle,
        }
    }

    fn score_phase(
        &mut self,
        i: usize,
        readings: &[AngleReading],
        now: FrameTime,
        per_joint: &mut BTreeMap<JointName, f32>,
        samples: &mut Vec<AngleSample>,
        violations: &mut Vec<FormViolation>,
    ) {
        // Split borrow: the phase is read-only while carried state mutates.
        let phase = self.template.phases[i].clone();
        for reading in readings {
            let joint = reading.joint;
            let Some(range) = phase.joint_ranges.get(&joint) else {
                // Key joint not monitored during this phase.
                samples.push(match reading.degrees {
                    Some(degrees) => JointAngle::new(joint, degrees, true, 0.0)
                        .map(AngleSample::Available)
                        .unwrap_or(AngleSample::Unavailable(joint)),
                    None => AngleSample::Unavailable(joint),
                });
                continue;
            };

            match reading.degrees {
                Some(degrees) => {
                    let deviation = range.deviation(degrees);
                    let within = range.contains(degrees);
                    if !within {
                        self.current_in_bounds = false;
                    }

                    let mut penalty = self.config.penalty_per_degree * deviation.abs();
                    if let Some(threshold) = self.template.threshold(joint) {
                        if deviation.abs() > threshold.max_deviation {
                            penalty *= threshold.risk.penalty_factor();
                            violations.push(self.breach_violation(joint, deviation, threshold.risk));
                        }
                    }

                    let joint_score = (100.0 - penalty).clamp(0.0, 100.0);
                    per_joint.insert(joint, joint_score);
                    self.carried.insert(
                        joint,
                        CarriedJoint {
                            score: joint_score,
                            at: now,
                        },
                    );
                    samples.push(
                        JointAngle::new(joint, degrees, within, deviation)
                            .map(AngleSample::Available)
                            .unwrap_or(AngleSample::Unavailable(joint)),
                    );
                }
                None => {
                    samples.push(AngleSample::Unavailable(joint));
                    if let Some(carried) = self.carried.get(&joint) {
                        if now.since(carried.at) <= self.config.carry_forward_limit {
                            per_joint.insert(joint, carried.score);
                        }
                    }
                }
            }
        }
    }

    fn breach_violation(
        &self,
        joint: JointName,
        deviation: f32,
        risk: Severity,
    ) -> FormViolation {
        let part = joint.body_part();
        let hint = if deviation > 0.0 {
            format!("ease off - don't open your {part} that far")
        } else {
            format!("don't let your {part} collapse - open it back up")
        };
        FormViolation::new(
            joint,
            risk,
            format!("{part} is {:.0} degrees off the target position", deviation.abs()),
            hint,
        )
    }

    fn check_stall(&mut self, i: usize, elapsed: Duration, violations: &mut Vec<FormViolation>) {
        let phase = &self.template.phases[i];
        if elapsed > phase.max_duration {
            self.current_overran = true;
            if !self.stall_flagged {
                self.stall_flagged = true;
                warn!(
                    phase = %phase.name,
                    elapsed_s = elapsed.as_secs_f32(),
                    "phase stalled past its maximum duration"
                );
                let joint = phase
                    .joint_ranges
                    .keys()
                    .next()
                    .copied()
                    .unwrap_or(JointName::Spine);
                violations.push(FormViolation::new(
                    joint,
                    Severity::Medium,
                    format!("stuck in the {} position", phase.name),
                    format!("keep the movement going through the {}", phase.name),
                ));
            }
        }
    }

    fn check_tracking(&mut self, now: FrameTime, violations: &mut Vec<FormViolation>) -> bool {
        let degraded_joint = self
            .unavailable_since
            .iter()
            .find(|(_, since)| now.since(**since) > self.config.carry_forward_limit)
            .map(|(joint, _)| *joint);

        match degraded_joint {
            Some(joint) => {
                if !self.degraded_reported {
                    self.degraded_reported = true;
                    warn!(joint = %joint, "tracking degraded");
                    violations.push(FormViolation::new(
                        joint,
                        Severity::Medium,
                        format!("lost reliable tracking of your {}", joint.body_part()),
                        format!("adjust so your {} stays in view", joint.body_part()),
                    ));
                }
                true
            }
            None => {
                self.degraded_reported = false;
                false
            }
        }
    }

    fn enter_phase(&mut self, i: usize, now: FrameTime) {
        debug!(phase = %self.template.phases[i].name, "entered phase");
        self.state = PhaseState::Active(i);
        self.entered_at = now;
        self.current_in_bounds = true;
        self.current_overran = false;
        self.stall_flagged = false;
    }

    fn close_visit(&mut self, i: usize, now: FrameTime) {
        let phase = &self.template.phases[i];
        let elapsed = now.since(self.entered_at);
        self.visits.push(PhaseVisit {
            phase: phase.name.clone(),
            entered_at: self.entered_at,
            exited_at: now,
            overran: self.current_overran || elapsed > phase.max_duration,
            in_bounds: self.current_in_bounds,
        });
    }

    fn finish_cycle(&mut self, now: FrameTime) -> Option<CycleRecord> {
        let visits = std::mem::take(&mut self.visits);
        if visits.is_empty() {
            return None;
        }

        let mean_score = if self.score_frames > 0 {
            (self.score_sum / self.score_frames as f64) as f32
        } else {
            100.0
        };
        self.score_sum = 0.0;
        self.score_frames = 0;

        let visited_in_order = visits.len() == self.template.phases.len()
            && visits
                .iter()
                .zip(self.template.phases.iter())
                .all(|(visit, phase)| {
                    visit.phase == phase.name && visit.duration() >= phase.min_duration
                });
        let in_bounds = visits.iter().all(|v| v.in_bounds);

        debug!(
            visits = visits.len(),
            mean_score,
            visited_in_order,
            in_bounds,
            "cycle completed"
        );

        Some(CycleRecord {
            visits,
            started_at: self.cycle_started,
            completed_at: now,
            mean_score,
            visited_in_order,
            in_bounds,
        })
    }
}
