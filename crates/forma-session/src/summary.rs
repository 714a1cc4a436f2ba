//! End-of-session summary
//!
//! The summary is the only session artifact meant to leave the device,
//! so it is aggregate-only by construction: counters, scores, and
//! catalog metadata. It cannot carry landmarks because its fields
//! cannot hold them.

use serde::{Deserialize, Serialize};

use forma_templates::ExerciseTemplate;

use crate::session::WorkoutSession;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub exercise_id: u64,
    pub exercise_name: String,
    pub muscle_groups: Vec<String>,
    pub sets: u32,
    pub valid_reps: u32,
    pub partial_reps: u32,
    pub total_reps: u32,
    /// Absent when the session ran in rep-count-only mode
    pub average_form_score: Option<f32>,
    pub duration_seconds: f64,
    pub paused_seconds: f64,
}

impl SessionSummary {
    /// Summarize a session against the template it ran
    pub fn build(session: &WorkoutSession, template: &ExerciseTemplate) -> Self {
        let totals = session.totals();
        // Sets completed, plus the in-progress one if it saw any reps.
        let open_set = u32::from(session.reps().total() > 0);
        SessionSummary {
            exercise_id: session.exercise().0,
            exercise_name: template.name.clone(),
            muscle_groups: template
                .muscle_groups
                .iter()
                .map(|group| group.to_string())
                .collect(),
            sets: session.completed_sets().len() as u32 + open_set,
            valid_reps: totals.valid,
            partial_reps: totals.partial,
            total_reps: totals.total(),
            average_form_score: session.average_form_score(),
            duration_seconds: session.now().as_secs_f64(),
            paused_seconds: session.paused_total().as_secs_f64(),
        }
    }
}
