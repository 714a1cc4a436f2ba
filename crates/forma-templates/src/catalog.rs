//! Built-in exercise catalog
//!
//! Exercises are rows in a movement-pattern table, not code. Each pattern
//! contributes the phase/threshold shape; the row contributes identity,
//! equipment, difficulty, and muscle groups. The catalog ships with more
//! than fifty exercises and is the default bulk-load source for a
//! session's `TemplateStore`.

use std::time::Duration;

use forma_core::{ExerciseId, JointName, Severity};

use crate::store::TemplateStore;
use crate::template::{
    AngleRange, Difficulty, Equipment, ExercisePhase, ExerciseTemplate, MuscleGroup,
    SafetyThreshold,
};

/// Movement patterns the phase shapes are derived from
#[derive(Clone, Copy, Debug)]
enum Pattern {
    /// Knee-dominant descent/bottom/ascent
    Squat,
    /// Squat shape with the torso line monitored and guarded
    SquatBraced,
    /// Hip-dominant hinge with a guarded back line
    Hinge,
    /// Elbow-extension push (press-ups, presses)
    Push,
    /// Elbow-flexion pull (rows, pulldowns)
    Pull,
    /// Elbow-flexion curl
    Curl,
    /// Shoulder raise and lower
    Raise,
    /// Static hold on the torso line
    Hold,
}

const SECS: fn(f32) -> Duration = Duration::from_secs_f32;

fn knee_phase(name: &str, min_s: f32, max_s: f32, range: AngleRange) -> ExercisePhase {
    ExercisePhase::new(name, SECS(min_s), SECS(max_s))
        .with_joint(JointName::LeftKnee, range)
        .with_joint(JointName::RightKnee, range)
}

fn elbow_phase(name: &str, min_s: f32, max_s: f32, range: AngleRange) -> ExercisePhase {
    ExercisePhase::new(name, SECS(min_s), SECS(max_s))
        .with_joint(JointName::LeftElbow, range)
        .with_joint(JointName::RightElbow, range)
}

fn hip_phase(name: &str, min_s: f32, max_s: f32, range: AngleRange) -> ExercisePhase {
    ExercisePhase::new(name, SECS(min_s), SECS(max_s))
        .with_joint(JointName::LeftHip, range)
        .with_joint(JointName::RightHip, range)
}

fn shoulder_phase(name: &str, min_s: f32, max_s: f32, range: AngleRange) -> ExercisePhase {
    ExercisePhase::new(name, SECS(min_s), SECS(max_s))
        .with_joint(JointName::LeftShoulder, range)
        .with_joint(JointName::RightShoulder, range)
}

fn both(left: JointName, right: JointName, range: AngleRange) -> Vec<(JointName, AngleRange)> {
    vec![(left, range), (right, range)]
}

impl Pattern {
    fn apply(self, template: &mut ExerciseTemplate) {
        match self {
            Pattern::Squat => {
                template.key_joints = vec![JointName::LeftKnee, JointName::RightKnee];
                for (j, r) in both(
                    JointName::LeftKnee,
                    JointName::RightKnee,
                    AngleRange::new(165.0, 180.0, 175.0),
                ) {
                    template.rest.insert(j, r);
                }
                template.phases = vec![
                    knee_phase("descent", 1.0, 3.0, AngleRange::new(90.0, 170.0, 120.0)),
                    knee_phase("bottom", 0.5, 2.0, AngleRange::new(70.0, 100.0, 85.0)),
                    knee_phase("ascent", 1.0, 3.0, AngleRange::new(90.0, 170.0, 130.0)),
                ];
                template.thresholds = vec![
                    SafetyThreshold::new(JointName::LeftKnee, 30.0, Severity::Medium),
                    SafetyThreshold::new(JointName::RightKnee, 30.0, Severity::Medium),
                ];
            }
            Pattern::SquatBraced => {
                Pattern::Squat.apply(template);
                template.key_joints.push(JointName::Spine);
                template
                    .rest
                    .insert(JointName::Spine, AngleRange::new(150.0, 180.0, 172.0));
                let spine = AngleRange::new(140.0, 180.0, 168.0);
                for phase in &mut template.phases {
                    phase.joint_ranges.insert(JointName::Spine, spine);
                }
                template
                    .thresholds
                    .push(SafetyThreshold::new(JointName::Spine, 20.0, Severity::High));
                template.joint_weights.insert(JointName::Spine, 2.0);
            }
            Pattern::Hinge => {
                template.key_joints =
                    vec![JointName::LeftHip, JointName::RightHip, JointName::Spine];
                for (j, r) in both(
                    JointName::LeftHip,
                    JointName::RightHip,
                    AngleRange::new(155.0, 180.0, 172.0),
                ) {
                    template.rest.insert(j, r);
                }
                template
                    .rest
                    .insert(JointName::Spine, AngleRange::new(150.0, 180.0, 172.0));
                let spine = AngleRange::new(135.0, 180.0, 165.0);
                template.phases = vec![
                    hip_phase("descent", 1.0, 3.0, AngleRange::new(70.0, 150.0, 100.0))
                        .with_joint(JointName::Spine, spine),
                    hip_phase("bottom", 0.3, 2.0, AngleRange::new(50.0, 95.0, 72.0))
                        .with_joint(JointName::Spine, spine),
                    hip_phase("ascent", 1.0, 3.0, AngleRange::new(70.0, 150.0, 115.0))
                        .with_joint(JointName::Spine, spine),
                ];
                template.thresholds = vec![SafetyThreshold::new(
                    JointName::Spine,
                    18.0,
                    Severity::High,
                )];
                template.joint_weights.insert(JointName::Spine, 2.0);
            }
            Pattern::Push => {
                template.key_joints = vec![JointName::LeftElbow, JointName::RightElbow];
                for (j, r) in both(
                    JointName::LeftElbow,
                    JointName::RightElbow,
                    AngleRange::new(160.0, 180.0, 172.0),
                ) {
                    template.rest.insert(j, r);
                }
                template.phases = vec![
                    elbow_phase("lower", 0.8, 3.0, AngleRange::new(90.0, 160.0, 120.0)),
                    elbow_phase("bottom", 0.2, 2.0, AngleRange::new(45.0, 95.0, 70.0)),
                    elbow_phase("press", 0.5, 3.0, AngleRange::new(90.0, 165.0, 130.0)),
                ];
                template.thresholds = vec![
                    SafetyThreshold::new(JointName::LeftElbow, 35.0, Severity::Low),
                    SafetyThreshold::new(JointName::RightElbow, 35.0, Severity::Low),
                ];
            }
            Pattern::Pull => {
                template.key_joints = vec![JointName::LeftElbow, JointName::RightElbow];
                for (j, r) in both(
                    JointName::LeftElbow,
                    JointName::RightElbow,
                    AngleRange::new(155.0, 180.0, 170.0),
                ) {
                    template.rest.insert(j, r);
                }
                template.phases = vec![
                    elbow_phase("pull", 0.5, 3.0, AngleRange::new(60.0, 150.0, 100.0)),
                    elbow_phase("squeeze", 0.2, 2.0, AngleRange::new(40.0, 80.0, 60.0)),
                    elbow_phase("lower", 0.5, 3.0, AngleRange::new(90.0, 160.0, 120.0)),
                ];
                template.thresholds = vec![
                    SafetyThreshold::new(JointName::LeftElbow, 35.0, Severity::Low),
                    SafetyThreshold::new(JointName::RightElbow, 35.0, Severity::Low),
                ];
            }
            Pattern::Curl => {
                Pattern::Pull.apply(template);
                template.phases = vec![
                    elbow_phase("curl", 0.5, 3.0, AngleRange::new(60.0, 150.0, 100.0)),
                    elbow_phase("top", 0.2, 2.0, AngleRange::new(30.0, 70.0, 50.0)),
                    elbow_phase("lower", 0.5, 3.0, AngleRange::new(70.0, 155.0, 115.0)),
                ];
            }
            Pattern::Raise => {
                template.key_joints = vec![JointName::LeftShoulder, JointName::RightShoulder];
                for (j, r) in both(
                    JointName::LeftShoulder,
                    JointName::RightShoulder,
                    AngleRange::new(0.0, 30.0, 15.0),
                ) {
                    template.rest.insert(j, r);
                }
                template.phases = vec![
                    shoulder_phase("raise", 0.5, 3.0, AngleRange::new(35.0, 100.0, 70.0)),
                    shoulder_phase("top", 0.2, 2.0, AngleRange::new(80.0, 120.0, 95.0)),
                    shoulder_phase("lower", 0.5, 3.0, AngleRange::new(30.0, 90.0, 55.0)),
                ];
                template.thresholds = vec![
                    SafetyThreshold::new(JointName::LeftShoulder, 30.0, Severity::Medium),
                    SafetyThreshold::new(JointName::RightShoulder, 30.0, Severity::Medium),
                ];
            }
            Pattern::Hold => {
                template.key_joints = vec![JointName::Spine];
                template
                    .rest
                    .insert(JointName::Spine, AngleRange::new(60.0, 150.0, 110.0));
                template.phases = vec![ExercisePhase::new("hold", SECS(2.0), SECS(120.0))
                    .with_joint(JointName::Spine, AngleRange::new(155.0, 180.0, 172.0))];
                template.thresholds = vec![SafetyThreshold::new(
                    JointName::Spine,
                    15.0,
                    Severity::High,
                )];
            }
        }
    }
}

use Difficulty::{Advanced, Beginner, Intermediate};
use Equipment::{Band, Barbell, Bodyweight, Dumbbell, Kettlebell, Machine};
use MuscleGroup::{
    Back, Biceps, Calves, Chest, Core, Glutes, Hamstrings, Quadriceps, Shoulders, Triceps,
};

/// (name, pattern, equipment, difficulty, muscle groups)
#[rustfmt::skip]
const CATALOG: &[(&str, Pattern, Equipment, Difficulty, &[MuscleGroup])] = &[
    ("Air Squat",                 Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps, Glutes]),
    ("Box Squat",                 Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps, Glutes]),
    ("Goblet Squat",              Pattern::Squat,       Kettlebell, Beginner,     &[Quadriceps, Glutes, Core]),
    ("Dumbbell Squat",            Pattern::Squat,       Dumbbell,   Beginner,     &[Quadriceps, Glutes]),
    ("Back Squat",                Pattern::SquatBraced, Barbell,    Intermediate, &[Quadriceps, Glutes, Core]),
    ("Front Squat",               Pattern::SquatBraced, Barbell,    Advanced,     &[Quadriceps, Core]),
    ("Overhead Squat",            Pattern::SquatBraced, Barbell,    Advanced,     &[Quadriceps, Shoulders, Core]),
    ("Split Squat",               Pattern::Squat,       Bodyweight, Intermediate, &[Quadriceps, Glutes]),
    ("Bulgarian Split Squat",     Pattern::Squat,       Dumbbell,   Advanced,     &[Quadriceps, Glutes]),
    ("Forward Lunge",             Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps, Glutes]),
    ("Reverse Lunge",             Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps, Glutes, Hamstrings]),
    ("Walking Lunge",             Pattern::Squat,       Dumbbell,   Intermediate, &[Quadriceps, Glutes]),
    ("Step-Up",                   Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps, Glutes, Calves]),
    ("Pistol Squat",              Pattern::Squat,       Bodyweight, Advanced,     &[Quadriceps, Glutes, Core]),
    ("Wall Sit Squat",            Pattern::Squat,       Bodyweight, Beginner,     &[Quadriceps]),
    ("Jump Squat",                Pattern::Squat,       Bodyweight, Intermediate, &[Quadriceps, Glutes, Calves]),
    ("Conventional Deadlift",     Pattern::Hinge,       Barbell,    Intermediate, &[Hamstrings, Glutes, Back]),
    ("Romanian Deadlift",         Pattern::Hinge,       Barbell,    Intermediate, &[Hamstrings, Glutes]),
    ("Sumo Deadlift",             Pattern::Hinge,       Barbell,    Intermediate, &[Hamstrings, Glutes, Quadriceps]),
    ("Single-Leg Deadlift",       Pattern::Hinge,       Dumbbell,   Advanced,     &[Hamstrings, Glutes, Core]),
    ("Kettlebell Swing",          Pattern::Hinge,       Kettlebell, Intermediate, &[Hamstrings, Glutes, Core]),
    ("Good Morning",              Pattern::Hinge,       Barbell,    Advanced,     &[Hamstrings, Back]),
    ("Hip Thrust",                Pattern::Hinge,       Barbell,    Beginner,     &[Glutes, Hamstrings]),
    ("Glute Bridge",              Pattern::Hinge,       Bodyweight, Beginner,     &[Glutes, Hamstrings]),
    ("Cable Pull-Through",        Pattern::Hinge,       Machine,    Beginner,     &[Glutes, Hamstrings]),
    ("Push-Up",                   Pattern::Push,        Bodyweight, Beginner,     &[Chest, Triceps, Core]),
    ("Incline Push-Up",           Pattern::Push,        Bodyweight, Beginner,     &[Chest, Triceps]),
    ("Decline Push-Up",           Pattern::Push,        Bodyweight, Intermediate, &[Chest, Shoulders, Triceps]),
    ("Diamond Push-Up",           Pattern::Push,        Bodyweight, Advanced,     &[Triceps, Chest]),
    ("Bench Press",               Pattern::Push,        Barbell,    Intermediate, &[Chest, Triceps, Shoulders]),
    ("Incline Bench Press",       Pattern::Push,        Barbell,    Intermediate, &[Chest, Shoulders]),
    ("Dumbbell Bench Press",      Pattern::Push,        Dumbbell,   Beginner,     &[Chest, Triceps]),
    ("Overhead Press",            Pattern::Push,        Barbell,    Intermediate, &[Shoulders, Triceps]),
    ("Dumbbell Shoulder Press",   Pattern::Push,        Dumbbell,   Beginner,     &[Shoulders, Triceps]),
    ("Arnold Press",              Pattern::Push,        Dumbbell,   Intermediate, &[Shoulders, Triceps]),
    ("Dip",                       Pattern::Push,        Bodyweight, Intermediate, &[Triceps, Chest]),
    ("Close-Grip Bench Press",    Pattern::Push,        Barbell,    Intermediate, &[Triceps, Chest]),
    ("Pull-Up",                   Pattern::Pull,        Bodyweight, Intermediate, &[Back, Biceps]),
    ("Chin-Up",                   Pattern::Pull,        Bodyweight, Intermediate, &[Biceps, Back]),
    ("Lat Pulldown",              Pattern::Pull,        Machine,    Beginner,     &[Back, Biceps]),
    ("Bent-Over Row",             Pattern::Pull,        Barbell,    Intermediate, &[Back, Biceps]),
    ("Dumbbell Row",              Pattern::Pull,        Dumbbell,   Beginner,     &[Back, Biceps]),
    ("Seated Cable Row",          Pattern::Pull,        Machine,    Beginner,     &[Back, Biceps]),
    ("Inverted Row",              Pattern::Pull,        Bodyweight, Beginner,     &[Back, Biceps, Core]),
    ("Band Pull-Apart",           Pattern::Pull,        Band,       Beginner,     &[Back, Shoulders]),
    ("Face Pull",                 Pattern::Pull,        Band,       Beginner,     &[Shoulders, Back]),
    ("Barbell Curl",              Pattern::Curl,        Barbell,    Beginner,     &[Biceps]),
    ("Dumbbell Curl",             Pattern::Curl,        Dumbbell,   Beginner,     &[Biceps]),
    ("Hammer Curl",               Pattern::Curl,        Dumbbell,   Beginner,     &[Biceps]),
    ("Preacher Curl",             Pattern::Curl,        Machine,    Intermediate, &[Biceps]),
    ("Lateral Raise",             Pattern::Raise,       Dumbbell,   Beginner,     &[Shoulders]),
    ("Front Raise",               Pattern::Raise,       Dumbbell,   Beginner,     &[Shoulders]),
    ("Rear Delt Raise",           Pattern::Raise,       Dumbbell,   Intermediate, &[Shoulders, Back]),
    ("Cable Lateral Raise",       Pattern::Raise,       Machine,    Intermediate, &[Shoulders]),
    ("Plank",                     Pattern::Hold,        Bodyweight, Beginner,     &[Core]),
    ("Side Plank",                Pattern::Hold,        Bodyweight, Intermediate, &[Core]),
    ("RKC Plank",                 Pattern::Hold,        Bodyweight, Advanced,     &[Core, Glutes]),
];

/// Build the built-in catalog
///
/// Panics are impossible here: every row is validated in tests, and the
/// store re-validates on insert; a bad row is a bug caught at build time,
/// so insertion failures are skipped with a warning rather than bubbled.
pub fn builtin_catalog() -> TemplateStore {
    let mut store = TemplateStore::new();
    for (i, (name, pattern, equipment, difficulty, muscles)) in CATALOG.iter().enumerate() {
        let mut template = ExerciseTemplate::new(ExerciseId::new(i as u64 + 1), *name);
        template.equipment = *equipment;
        template.difficulty = *difficulty;
        template.muscle_groups = muscles.to_vec();
        pattern.apply(&mut template);
        if let Err(err) = store.insert(template) {
            tracing::warn!(%name, %err, "skipping invalid catalog row");
        }
    }
    store
}
