//! End-to-end per-frame analysis
//!
//! Ties the stages together: ingest gate -> angle calculation -> phase
//! tracking and scoring -> rep validation -> feedback emission. One
//! pipeline instance serves one exercise within a session.
//!
//! If the requested template cannot be found the pipeline does not
//! fail the session: it degrades to rep counting against a generic
//! single-phase movement template and reports no form scores.

use std::time::Duration;

use forma_core::{
    CoreError, ExerciseId, FeedbackChannel, FeedbackEvent, FeedbackPriority, FormScore, FrameTime,
    JointName, Landmark,
};
use forma_templates::{AngleRange, ExercisePhase, ExerciseTemplate, TemplateStore};
use tracing::{info, warn};

use crate::angles::AngleCalculator;
use crate::ingest::{FrameIngestor, FrameRejection, IngestStats};
use crate::machine::{FrameReport, PhaseState, PhaseTracker, ScoringConfig};
use crate::reps::{RepOutcome, RepValidator, RepetitionState};

/// What the pipeline can deliver for the active exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineMode {
    /// Full form scoring against a known template
    FormAnalysis,
    /// Template unavailable; movement cycles are counted, form is not
    /// scored
    RepCountOnly,
}

/// Everything produced for one analyzed frame
#[derive(Clone, Debug)]
pub struct FrameOutput {
    pub report: FrameReport,
    /// Absent in `RepCountOnly` mode
    pub score: Option<FormScore>,
    /// Present on the frame that closed a rep
    pub rep_outcome: Option<RepOutcome>,
    pub rep_state: RepetitionState,
    /// Raw cues for the feedback arbiter, unthrottled
    pub feedback: Vec<FeedbackEvent>,
}

/// Result of pushing one raw observation through the pipeline
#[derive(Clone, Debug)]
pub enum FrameOutcome {
    /// Frame failed the ingest gate; carries positioning guidance
    Rejected(FrameRejection),
    Analyzed(FrameOutput),
}

/// Per-exercise analysis pipeline
#[derive(Debug)]
pub struct AnalysisPipeline {
    calculator: AngleCalculator,
    ingestor: FrameIngestor,
    tracker: PhaseTracker,
    validator: RepValidator,
    mode: PipelineMode,
}

impl AnalysisPipeline {
    /// Build a pipeline for an exercise, degrading to rep counting if
    /// the template is not in the store
    pub fn for_exercise(
        store: &TemplateStore,
        exercise: ExerciseId,
        config: ScoringConfig,
    ) -> Self {
        let (template, mode) = match store.get(exercise) {
            Ok(template) => {
                info!(exercise = %template.name, "pipeline ready");
                (template.clone(), PipelineMode::FormAnalysis)
            }
            Err(CoreError::TemplateNotFound(id)) => {
                warn!(%id, "template not found; rep counting only");
                (fallback_template(exercise), PipelineMode::RepCountOnly)
            }
            Err(err) => {
                warn!(%err, "template unusable; rep counting only");
                (fallback_template(exercise), PipelineMode::RepCountOnly)
            }
        };
        let validator = match mode {
            PipelineMode::FormAnalysis => RepValidator::new(),
            PipelineMode::RepCountOnly => RepValidator::counting_only(),
        };
        AnalysisPipeline {
            calculator: AngleCalculator::new(),
            ingestor: FrameIngestor::new(),
            tracker: PhaseTracker::new(template, config),
            validator,
            mode,
        }
    }

    #[inline]
    pub fn mode(&self) -> PipelineMode {
        self.mode
    }

    #[inline]
    pub fn template(&self) -> &ExerciseTemplate {
        self.tracker.template()
    }

    #[inline]
    pub fn rep_state(&self) -> RepetitionState {
        self.validator.state()
    }

    #[inline]
    pub fn ingest_stats(&self) -> IngestStats {
        self.ingestor.stats()
    }

    /// Stage one raw observation; rejects incomplete or low-visibility
    /// frames
    pub fn submit(
        &mut self,
        landmarks: Vec<Landmark>,
        timestamp: FrameTime,
    ) -> Result<(), FrameRejection> {
        self.ingestor.submit(landmarks, timestamp)
    }

    /// Analyze the staged frame, if any
    pub fn tick(&mut self) -> Option<FrameOutput> {
        let frame = self.ingestor.take()?;
        let key_joints = self.tracker.template().key_joints.clone();
        let readings = self.calculator.measure(&frame, &key_joints);
        let report = self.tracker.observe(&readings, frame.seq, frame.timestamp);

        let rep_outcome = report
            .completed_cycle
            .as_ref()
            .map(|cycle| self.validator.apply(cycle, frame.timestamp));
        let rep_state = self.validator.state();

        let mut feedback = Vec::new();
        if self.mode == PipelineMode::FormAnalysis {
            for violation in &report.score.violations {
                let voice = FeedbackEvent::from_violation(violation, frame.timestamp);
                if voice.priority == FeedbackPriority::High {
                    // Safety breaches also pulse the joint directly.
                    feedback.push(FeedbackEvent::new(
                        FeedbackChannel::Haptic,
                        FeedbackPriority::High,
                        voice.message.clone(),
                        voice.target,
                        frame.timestamp,
                    ));
                }
                feedback.push(voice);
            }
        }
        if rep_outcome == Some(RepOutcome::Valid) {
            let target = key_joints.first().copied().unwrap_or(JointName::Spine);
            let message = format!("rep {} - good", rep_state.valid);
            feedback.push(FeedbackEvent::new(
                FeedbackChannel::Visual,
                FeedbackPriority::Low,
                message.clone(),
                target,
                frame.timestamp,
            ));
            feedback.push(FeedbackEvent::new(
                FeedbackChannel::Voice,
                FeedbackPriority::Low,
                message,
                target,
                frame.timestamp,
            ));
        }

        let score = match self.mode {
            PipelineMode::FormAnalysis => Some(report.score.clone()),
            PipelineMode::RepCountOnly => None,
        };

        Some(FrameOutput {
            report,
            score,
            rep_outcome,
            rep_state,
            feedback,
        })
    }

    /// Stage and analyze in one step
    pub fn process(&mut self, landmarks: Vec<Landmark>, timestamp: FrameTime) -> FrameOutcome {
        match self.submit(landmarks, timestamp) {
            Err(rejection) => FrameOutcome::Rejected(rejection),
            Ok(()) => match self.tick() {
                Some(output) => FrameOutcome::Analyzed(output),
                // submit staged a frame, so tick always drains one
                None => unreachable!("staged frame missing"),
            },
        }
    }

    #[inline]
    pub fn is_aborted(&self) -> bool {
        self.tracker.state() == PhaseState::Aborted
    }

    /// Cancel the session's analysis: the in-flight cycle is discarded
    /// and no further frames are scored
    pub fn abort(&mut self) {
        self.ingestor.clear();
        self.tracker.abort();
    }

    /// Start a new set with fresh rep counters
    pub fn reset_set(&mut self) {
        self.validator.reset();
    }
}

/// Generic single-phase movement template used when the requested one
/// is missing. Counts knee-driven cycles; carries no safety thresholds
/// because there is no exercise context to judge against.
fn fallback_template(id: ExerciseId) -> ExerciseTemplate {
    let mut template = ExerciseTemplate::new(id, "generic movement");
    template.key_joints = vec![JointName::LeftKnee, JointName::RightKnee];
    template
        .rest
        .insert(JointName::LeftKnee, AngleRange::new(161.0, 180.0, 172.0));
    template
        .rest
        .insert(JointName::RightKnee, AngleRange::new(161.0, 180.0, 172.0));
    template.phases = vec![ExercisePhase::new(
        "movement",
        Duration::from_millis(400),
        Duration::from_secs(10),
    )
    .with_joint(JointName::LeftKnee, AngleRange::new(40.0, 160.0, 100.0))
    .with_joint(JointName::RightKnee, AngleRange::new(40.0, 160.0, 100.0))];
    template
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::{Severity, LANDMARK_COUNT};
    use forma_templates::SafetyThreshold;

    /// Landmarks with both knees bent to `theta` degrees; every point
    /// is well above the visibility threshold.
    fn frame_with_knees(theta_deg: f32) -> Vec<Landmark> {
        let mut points: Vec<Landmark> = (0..LANDMARK_COUNT as u8)
            .map(|i| Landmark::new(i, 0.5 + i as f32 * 0.001, 0.2, 0.0, 0.95))
            .collect();

        let theta = theta_deg.to_radians();
        for (hip, knee, ankle, x) in [(23u8, 25u8, 27u8, 0.4f32), (24, 26, 28, 0.6)] {
            let ky = 0.55;
            points[hip as usize] = Landmark::new(hip, x, ky - 0.2, 0.0, 0.95);
            points[knee as usize] = Landmark::new(knee, x, ky, 0.0, 0.95);
            points[ankle as usize] = Landmark::new(
                ankle,
                x + 0.2 * theta.sin(),
                ky - 0.2 * theta.cos(),
                0.0,
                0.95,
            );
        }
        points
    }

    fn squat_store() -> TemplateStore {
        let mut template = ExerciseTemplate::new(ExerciseId::new(7), "pipeline squat");
        template.key_joints = vec![JointName::LeftKnee, JointName::RightKnee];
        for joint in [JointName::LeftKnee, JointName::RightKnee] {
            template.rest.insert(joint, AngleRange::new(165.0, 180.0, 175.0));
        }
        template.phases = vec![
            ExercisePhase::new("descent", Duration::from_millis(400), Duration::from_secs(3))
                .with_joint(JointName::LeftKnee, AngleRange::new(90.0, 170.0, 120.0))
                .with_joint(JointName::RightKnee, AngleRange::new(90.0, 170.0, 120.0)),
            ExercisePhase::new("bottom", Duration::from_millis(300), Duration::from_secs(2))
                .with_joint(JointName::LeftKnee, AngleRange::new(70.0, 100.0, 85.0))
                .with_joint(JointName::RightKnee, AngleRange::new(70.0, 100.0, 85.0)),
            ExercisePhase::new("ascent", Duration::from_millis(400), Duration::from_secs(3))
                .with_joint(JointName::LeftKnee, AngleRange::new(90.0, 170.0, 130.0))
                .with_joint(JointName::RightKnee, AngleRange::new(90.0, 170.0, 130.0)),
        ];
        template.thresholds = vec![
            SafetyThreshold::new(JointName::LeftKnee, 45.0, Severity::Medium),
            SafetyThreshold::new(JointName::RightKnee, 45.0, Severity::Medium),
        ];

        let mut store = TemplateStore::new();
        store.insert(template).unwrap();
        store
    }

    fn run(pipeline: &mut AnalysisPipeline, frames: &[(f32, u64)]) -> Vec<FrameOutput> {
        let mut outputs = Vec::new();
        for (theta, millis) in frames {
            match pipeline.process(frame_with_knees(*theta), FrameTime::from_millis(*millis)) {
                FrameOutcome::Analyzed(output) => outputs.push(output),
                FrameOutcome::Rejected(rejection) => {
                    panic!("unexpected rejection: {:?}", rejection)
                }
            }
        }
        outputs
    }

    // Standing -> bottom -> standing at a deliberate pace.
    const CYCLE: &[(f32, u64)] = &[
        (172.0, 0),
        (140.0, 200),
        (125.0, 400),
        (115.0, 600),
        (90.0, 800),
        (85.0, 1000),
        (85.0, 1200),
        (110.0, 1400),
        (130.0, 1650),
        (150.0, 1900),
        (174.0, 2300),
    ];

    #[test]
    fn test_full_cycle_counts_a_valid_rep() {
        let store = squat_store();
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(7), ScoringConfig::default());
        assert_eq!(pipeline.mode(), PipelineMode::FormAnalysis);

        let outputs = run(&mut pipeline, CYCLE);
        let last = outputs.last().unwrap();
        assert_eq!(last.rep_outcome, Some(RepOutcome::Valid));
        assert_eq!(last.rep_state, RepetitionState { valid: 1, partial: 0 });
        assert!(last
            .feedback
            .iter()
            .any(|event| event.message.starts_with("rep 1")));
        // Confirmation goes out on screen as well as voice.
        assert!(last
            .feedback
            .iter()
            .any(|event| event.channel == FeedbackChannel::Visual));
    }

    #[test]
    fn test_high_severity_breach_adds_a_haptic_companion() {
        let mut template = ExerciseTemplate::new(ExerciseId::new(8), "strict squat");
        template.key_joints = vec![JointName::LeftKnee, JointName::RightKnee];
        for joint in [JointName::LeftKnee, JointName::RightKnee] {
            template.rest.insert(joint, AngleRange::new(165.0, 180.0, 175.0));
        }
        template.phases = vec![ExercisePhase::new(
            "descent",
            Duration::from_millis(400),
            Duration::from_secs(3),
        )
        .with_joint(JointName::LeftKnee, AngleRange::new(60.0, 170.0, 120.0))
        .with_joint(JointName::RightKnee, AngleRange::new(60.0, 170.0, 120.0))];
        template.thresholds =
            vec![SafetyThreshold::new(JointName::LeftKnee, 25.0, Severity::High)];
        let mut store = TemplateStore::new();
        store.insert(template).unwrap();

        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(8), ScoringConfig::default());
        run(&mut pipeline, &[(172.0, 0), (140.0, 200)]);
        let outputs = run(&mut pipeline, &[(85.0, 400)]);

        let feedback = &outputs.last().unwrap().feedback;
        let haptic = feedback
            .iter()
            .find(|e| e.channel == FeedbackChannel::Haptic)
            .unwrap();
        assert_eq!(haptic.priority, FeedbackPriority::High);
        assert_eq!(haptic.target, JointName::LeftKnee);
        assert!(feedback
            .iter()
            .any(|e| e.channel == FeedbackChannel::Voice && e.target == JointName::LeftKnee));
    }

    #[test]
    fn test_missing_template_degrades_to_rep_counting() {
        let store = squat_store();
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(999), ScoringConfig::default());
        assert_eq!(pipeline.mode(), PipelineMode::RepCountOnly);

        let outputs = run(&mut pipeline, CYCLE);
        // Cycles are still counted, but no form score is reported.
        assert!(outputs.iter().all(|o| o.score.is_none()));
        assert_eq!(outputs.last().unwrap().rep_state.total(), 1);
    }

    #[test]
    fn test_rep_counting_mode_skips_the_quality_gate() {
        let store = squat_store();
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(999), ScoringConfig::default());
        assert_eq!(pipeline.mode(), PipelineMode::RepCountOnly);

        // The generic fallback template carries arbitrary ideals, so a
        // clean full cycle must not be demoted for its score.
        let outputs = run(&mut pipeline, CYCLE);
        let last = outputs.last().unwrap();
        assert_eq!(last.rep_outcome, Some(RepOutcome::Valid));
        assert_eq!(last.rep_state, RepetitionState { valid: 1, partial: 0 });
    }

    #[test]
    fn test_incomplete_frame_is_rejected_with_guidance() {
        let store = squat_store();
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(7), ScoringConfig::default());

        let mut points = frame_with_knees(120.0);
        points.truncate(20);
        match pipeline.process(points, FrameTime::from_millis(50)) {
            FrameOutcome::Rejected(rejection) => {
                assert_eq!(rejection.guidance.missing, 13);
            }
            FrameOutcome::Analyzed(_) => panic!("short frame must be rejected"),
        }
    }

    #[test]
    fn test_abort_stops_counting() {
        let store = squat_store();
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId::new(7), ScoringConfig::default());

        run(&mut pipeline, &CYCLE[..6]);
        pipeline.abort();
        assert!(pipeline.is_aborted());

        let outputs = run(&mut pipeline, &CYCLE[6..]);
        assert_eq!(outputs.last().unwrap().rep_state.total(), 0);
    }
}
