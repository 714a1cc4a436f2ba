//! Whole-pipeline scenarios: scripted squat trajectories through the
//! real catalog template, asserting on counters, scores, and feedback
//! ordering.

use std::time::Duration;

use forma_core::{
    CoreError, ExerciseId, FeedbackChannel, FeedbackEvent, FeedbackPriority, FrameTime, JointName,
    SessionId,
};
use forma_engine::{
    AnalysisPipeline, FrameOutcome, FrameOutput, PartialReason, PipelineMode, RepOutcome,
    ScoringConfig,
};
use forma_feedback::{ArbiterConfig, FeedbackArbiter};
use forma_session::{SessionConfig, SessionSnapshot, WorkoutSession};
use forma_templates::builtin_catalog;
use forma_test::{degrade_visibility, knee_frame, SquatScript};

const AIR_SQUAT: ExerciseId = ExerciseId(1);

fn squat_pipeline() -> AnalysisPipeline {
    let store = builtin_catalog();
    AnalysisPipeline::for_exercise(&store, AIR_SQUAT, ScoringConfig::default())
}

fn run_script(pipeline: &mut AnalysisPipeline, script: &SquatScript) -> Vec<FrameOutput> {
    let mut outputs = Vec::new();
    for (theta, millis) in &script.steps {
        match pipeline.process(knee_frame(*theta), FrameTime::from_millis(*millis)) {
            FrameOutcome::Analyzed(output) => outputs.push(output),
            FrameOutcome::Rejected(rejection) => panic!("unexpected rejection: {rejection:?}"),
        }
    }
    outputs
}

#[test]
fn test_full_traversal_counts_one_valid_rep() {
    let mut pipeline = squat_pipeline();
    let outputs = run_script(&mut pipeline, &SquatScript::full_cycle());

    let last = outputs.last().unwrap();
    assert_eq!(last.rep_outcome, Some(RepOutcome::Valid));
    assert_eq!(pipeline.rep_state().valid, 1);
    assert_eq!(pipeline.rep_state().partial, 0);

    let cycle = last.report.completed_cycle.as_ref().unwrap();
    assert!(cycle.mean_score >= 70.0, "mean {}", cycle.mean_score);
    assert_eq!(cycle.visits.len(), 3);
}

#[test]
fn test_skipped_bottom_counts_one_partial_rep() {
    let mut pipeline = squat_pipeline();
    let outputs = run_script(&mut pipeline, &SquatScript::skipped_bottom());

    let last = outputs.last().unwrap();
    assert_eq!(
        last.rep_outcome,
        Some(RepOutcome::Partial(PartialReason::MissedPhases))
    );
    assert_eq!(pipeline.rep_state().valid, 0);
    assert_eq!(pipeline.rep_state().partial, 1);
}

#[test]
fn test_out_of_bounds_excursion_invalidates_the_rep() {
    let mut pipeline = squat_pipeline();
    // Dips to 85 degrees while still inside the descent phase's first
    // second, below descent's 90 degree floor, then recovers into a
    // clean traversal.
    let script = SquatScript {
        steps: vec![
            (172.0, 0),
            (150.0, 66),
            (85.0, 500),
            (110.0, 900),
            (95.0, 1300),
            (85.0, 1500),
            (85.0, 1800),
            (110.0, 2100),
            (130.0, 2500),
            (150.0, 2900),
            (174.0, 3200),
        ],
    };
    run_script(&mut pipeline, &script);

    assert_eq!(pipeline.rep_state().valid, 0);
    assert_eq!(pipeline.rep_state().partial, 1);
}

#[test]
fn test_attempt_counters_always_reconcile() {
    let mut pipeline = squat_pipeline();
    run_script(&mut pipeline, &SquatScript::repeated(3));

    let state = pipeline.rep_state();
    assert_eq!(state.valid, 3);
    assert_eq!(state.valid + state.partial, state.total());
}

#[test]
fn test_nine_low_visibility_points_reject_the_frame() {
    let mut pipeline = squat_pipeline();
    let degraded = degrade_visibility(knee_frame(120.0), 9);

    match pipeline.process(degraded, FrameTime::from_millis(66)) {
        FrameOutcome::Rejected(rejection) => {
            assert!(matches!(
                rejection.error,
                CoreError::IncompleteLandmarks {
                    low_visibility: 9,
                    ..
                }
            ));
            assert_eq!(rejection.guidance.low_visibility, 9);
        }
        FrameOutcome::Analyzed(_) => panic!("frame must not reach the angle stage"),
    }
    // Never staged, never analyzed.
    assert_eq!(pipeline.ingest_stats().accepted, 0);
}

#[test]
fn test_eight_low_visibility_points_pass_the_gate() {
    let mut pipeline = squat_pipeline();
    let degraded = degrade_visibility(knee_frame(120.0), 8);

    assert!(matches!(
        pipeline.process(degraded, FrameTime::from_millis(66)),
        FrameOutcome::Analyzed(_)
    ));
}

#[test]
fn test_spine_cue_preempts_and_elbow_waits_out_the_interval() {
    let arbiter = FeedbackArbiter::new(ArbiterConfig::default());

    // Two violations land within one second of each other.
    arbiter.offer(FeedbackEvent::new(
        FeedbackChannel::Voice,
        FeedbackPriority::Low,
        "left elbow: soften the lockout",
        JointName::LeftElbow,
        FrameTime::from_millis(200),
    ));
    arbiter.offer(FeedbackEvent::new(
        FeedbackChannel::Voice,
        FeedbackPriority::High,
        "spine: keep your chest up",
        JointName::Spine,
        FrameTime::from_millis(700),
    ));

    let first = arbiter.poll(FrameTime::from_millis(750)).unwrap();
    assert_eq!(first.target, JointName::Spine);

    // Inside the 3s window only the elbow cue remains, and it waits.
    assert!(arbiter.poll(FrameTime::from_millis(1000)).is_none());
    assert!(arbiter.poll(FrameTime::from_millis(3700)).is_none());

    let second = arbiter.poll(FrameTime::from_millis(3800)).unwrap();
    assert_eq!(second.target, JointName::LeftElbow);
    assert!(second.timestamp + Duration::from_secs(3) <= FrameTime::from_millis(3800));
}

#[test]
fn test_session_snapshot_restores_counters_without_drift() {
    let mut pipeline = squat_pipeline();
    let mut session = WorkoutSession::new(SessionId::new(5), AIR_SQUAT);

    for output in run_script(&mut pipeline, &SquatScript::full_cycle()) {
        session.record_frame(&output);
    }
    session.advance(Duration::from_secs(4));
    session.pause().unwrap();

    let snapshot = session.snapshot();
    let json = snapshot.to_json().unwrap();
    let restored = WorkoutSession::restore(
        SessionSnapshot::from_json(&json).unwrap(),
        SessionConfig::default(),
    );

    assert_eq!(restored.now(), session.now());
    assert_eq!(restored.totals(), session.totals());
    assert_eq!(restored.state(), session.state());
    assert_eq!(restored.totals().valid, 1);
}

#[test]
fn test_pipeline_tolerates_landmark_jitter() {
    use rand::{rngs::StdRng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let mut pipeline = squat_pipeline();
    for (theta, millis) in &SquatScript::full_cycle().steps {
        let frame = forma_test::jittered_knee_frame(*theta, 0.002, &mut rng);
        match pipeline.process(frame, FrameTime::from_millis(*millis)) {
            FrameOutcome::Analyzed(_) => {}
            FrameOutcome::Rejected(rejection) => panic!("jitter caused rejection: {rejection:?}"),
        }
    }
    assert_eq!(pipeline.rep_state().valid, 1);
}

#[test]
fn test_unknown_exercise_still_counts_movement() {
    let store = builtin_catalog();
    let mut pipeline =
        AnalysisPipeline::for_exercise(&store, ExerciseId::new(4040), ScoringConfig::default());
    assert_eq!(pipeline.mode(), PipelineMode::RepCountOnly);

    let outputs = run_script(&mut pipeline, &SquatScript::full_cycle());
    assert!(outputs.iter().all(|o| o.score.is_none()));
    // With no real template there is no form judgement to fail: a full
    // movement cycle counts as a valid rep, not a partial one.
    assert_eq!(outputs.last().unwrap().rep_outcome, Some(RepOutcome::Valid));
    assert_eq!(
        pipeline.rep_state(),
        forma_engine::RepetitionState { valid: 1, partial: 0 }
    );
}
