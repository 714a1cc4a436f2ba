//! FORMA Templates - exercise catalog as polymorphic data
//!
//! Every exercise is a uniform data record (ordered phases + safety
//! thresholds) interpreted generically by one state machine. There are no
//! per-exercise code paths: adding an exercise means adding a record.

pub mod catalog;
pub mod store;
pub mod template;

pub use catalog::builtin_catalog;
pub use store::{TemplateFilter, TemplateStore};
pub use template::{
    AngleRange, Difficulty, Equipment, ExercisePhase, ExerciseTemplate, MuscleGroup,
    SafetyThreshold,
};
