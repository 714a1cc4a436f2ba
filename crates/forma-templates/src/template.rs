//! Exercise template schema
//!
//! Templates are immutable and versioned: loaded once per session, never
//! mutated by the core. Validation happens at insert time so the state
//! machine can assume every referenced joint is computable and every
//! range is sane.

use std::collections::BTreeMap;
use std::time::Duration;

use forma_core::{CoreError, CoreResult, ExerciseId, JointName, Severity};

/// Inclusive angle band with an ideal value, degrees
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleRange {
    pub min: f32,
    pub max: f32,
    pub ideal: f32,
}

impl AngleRange {
    pub fn new(min: f32, max: f32, ideal: f32) -> Self {
        AngleRange { min, max, ideal }
    }

    #[inline]
    pub fn contains(&self, degrees: f32) -> bool {
        degrees >= self.min && degrees <= self.max
    }

    /// Signed deviation from the ideal angle
    #[inline]
    pub fn deviation(&self, degrees: f32) -> f32 {
        degrees - self.ideal
    }

    fn validate(&self, name: &str, joint: JointName) -> CoreResult<()> {
        let ok = self.min >= 0.0
            && self.max <= 180.0
            && self.min < self.max
            && self.ideal >= self.min
            && self.ideal <= self.max;
        if ok {
            Ok(())
        } else {
            Err(CoreError::InvalidTemplate {
                name: name.to_string(),
                reason: format!("bad angle range for {joint}: {self:?}"),
            })
        }
    }
}

/// One named sub-interval of an exercise's motion
#[derive(Clone, Debug)]
pub struct ExercisePhase {
    pub name: String,
    pub min_duration: Duration,
    pub max_duration: Duration,
    /// Required angle band per monitored joint while in this phase
    pub joint_ranges: BTreeMap<JointName, AngleRange>,
}

impl ExercisePhase {
    pub fn new(name: impl Into<String>, min_duration: Duration, max_duration: Duration) -> Self {
        ExercisePhase {
            name: name.into(),
            min_duration,
            max_duration,
            joint_ranges: BTreeMap::new(),
        }
    }

    pub fn with_joint(mut self, joint: JointName, range: AngleRange) -> Self {
        self.joint_ranges.insert(joint, range);
        self
    }

    /// Are all supplied angles inside this phase's declared bands?
    ///
    /// Joints without a measurement do not satisfy the check - entering a
    /// phase requires evidence, not absence of it.
    pub fn matched_by(&self, angles: &BTreeMap<JointName, f32>) -> bool {
        self.joint_ranges.iter().all(|(joint, range)| {
            angles
                .get(joint)
                .map(|deg| range.contains(*deg))
                .unwrap_or(false)
        })
    }
}

/// A safety constraint: deviation past `max_deviation` from the active
/// phase's ideal is a violation at the given risk level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SafetyThreshold {
    pub joint: JointName,
    pub max_deviation: f32,
    pub risk: Severity,
}

impl SafetyThreshold {
    pub fn new(joint: JointName, max_deviation: f32, risk: Severity) -> Self {
        SafetyThreshold {
            joint,
            max_deviation,
            risk,
        }
    }
}

/// Primary muscle groups targeted by an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MuscleGroup {
    Quadriceps,
    Hamstrings,
    Glutes,
    Calves,
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Core,
}

impl std::fmt::Display for MuscleGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            MuscleGroup::Quadriceps => "quadriceps",
            MuscleGroup::Hamstrings => "hamstrings",
            MuscleGroup::Glutes => "glutes",
            MuscleGroup::Calves => "calves",
            MuscleGroup::Chest => "chest",
            MuscleGroup::Back => "back",
            MuscleGroup::Shoulders => "shoulders",
            MuscleGroup::Biceps => "biceps",
            MuscleGroup::Triceps => "triceps",
            MuscleGroup::Core => "core",
        };
        f.write_str(label)
    }
}

/// Equipment needed for an exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Equipment {
    Bodyweight,
    Barbell,
    Dumbbell,
    Kettlebell,
    Band,
    Machine,
}

/// Difficulty rating
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Immutable, versioned exercise definition
#[derive(Clone, Debug)]
pub struct ExerciseTemplate {
    pub id: ExerciseId,
    pub name: String,
    pub version: u16,
    pub muscle_groups: Vec<MuscleGroup>,
    pub equipment: Equipment,
    pub difficulty: Difficulty,
    /// Joints the state machine monitors for this exercise
    pub key_joints: Vec<JointName>,
    /// Resting posture band per key joint; re-entering it ends an attempt
    pub rest: BTreeMap<JointName, AngleRange>,
    /// Ordered motion phases
    pub phases: Vec<ExercisePhase>,
    pub thresholds: Vec<SafetyThreshold>,
    /// Importance weight per joint for the overall score (default 1.0)
    pub joint_weights: BTreeMap<JointName, f32>,
}

impl ExerciseTemplate {
    pub fn new(id: ExerciseId, name: impl Into<String>) -> Self {
        ExerciseTemplate {
            id,
            name: name.into(),
            version: 1,
            muscle_groups: Vec::new(),
            equipment: Equipment::Bodyweight,
            difficulty: Difficulty::Beginner,
            key_joints: Vec::new(),
            rest: BTreeMap::new(),
            phases: Vec::new(),
            thresholds: Vec::new(),
            joint_weights: BTreeMap::new(),
        }
    }

    /// Importance weight for a joint (1.0 when unspecified)
    #[inline]
    pub fn weight(&self, joint: JointName) -> f32 {
        self.joint_weights.get(&joint).copied().unwrap_or(1.0)
    }

    /// Safety threshold declared for a joint, if any
    pub fn threshold(&self, joint: JointName) -> Option<&SafetyThreshold> {
        self.thresholds.iter().find(|t| t.joint == joint)
    }

    /// Are all supplied angles inside the resting posture band?
    pub fn at_rest(&self, angles: &BTreeMap<JointName, f32>) -> bool {
        !self.rest.is_empty()
            && self.rest.iter().all(|(joint, range)| {
                angles
                    .get(joint)
                    .map(|deg| range.contains(*deg))
                    .unwrap_or(false)
            })
    }

    /// Validate the template against the schema invariants
    ///
    /// Every joint a phase or threshold references must be a key joint
    /// (and therefore computable - `JointName` only names joints with a
    /// three-point construction). Ranges and durations must be coherent.
    pub fn validate(&self) -> CoreResult<()> {
        let fail = |reason: String| {
            Err(CoreError::InvalidTemplate {
                name: self.name.clone(),
                reason,
            })
        };

        if self.phases.is_empty() {
            return fail("no phases declared".into());
        }
        if self.key_joints.is_empty() {
            return fail("no key joints declared".into());
        }

        for phase in &self.phases {
            if phase.min_duration > phase.max_duration {
                return fail(format!("phase '{}' has min > max duration", phase.name));
            }
            if phase.joint_ranges.is_empty() {
                return fail(format!("phase '{}' declares no joint ranges", phase.name));
            }
            for (joint, range) in &phase.joint_ranges {
                if !self.key_joints.contains(joint) {
                    return fail(format!(
                        "phase '{}' references non-key joint {joint}",
                        phase.name
                    ));
                }
                range.validate(&self.name, *joint)?;
            }
        }

        for threshold in &self.thresholds {
            if !self.key_joints.contains(&threshold.joint) {
                return fail(format!(
                    "threshold references non-key joint {}",
                    threshold.joint
                ));
            }
            if threshold.max_deviation <= 0.0 {
                return fail(format!(
                    "threshold for {} has non-positive deviation",
                    threshold.joint
                ));
            }
        }

        for (joint, range) in &self.rest {
            if !self.key_joints.contains(joint) {
                return fail(format!("rest band references non-key joint {joint}"));
            }
            range.validate(&self.name, *joint)?;
        }

        Ok(())
    }
}
