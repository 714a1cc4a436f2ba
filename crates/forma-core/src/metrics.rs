//! Angle, score, and violation metrics
//!
//! Numeric contracts enforced here: joint angles live in [0,180] degrees,
//! form scores in [0,100]. Construction is the validation boundary - a
//! `JointAngle` or `FormScore` that exists is in range.

use std::collections::BTreeMap;

use crate::{CoreError, CoreResult, FrameTime, JointName};

/// Severity of a safety-threshold breach, drives feedback ordering
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Multiplicative penalty factor applied to safety breaches
    #[inline]
    pub fn penalty_factor(self) -> f32 {
        match self {
            Severity::Low => 1.2,
            Severity::Medium => 1.5,
            Severity::High => 2.0,
        }
    }
}

/// One joint's measured angle for a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct JointAngle {
    pub joint: JointName,
    /// Angle at the vertex, degrees in [0,180]
    pub degrees: f32,
    /// Within the active phase's declared range
    pub within_safe_range: bool,
    /// Signed deviation from the active phase's ideal angle
    pub deviation: f32,
}

impl JointAngle {
    /// Build a joint angle, rejecting out-of-range or non-finite values
    pub fn new(
        joint: JointName,
        degrees: f32,
        within_safe_range: bool,
        deviation: f32,
    ) -> CoreResult<Self> {
        if !degrees.is_finite() || !(0.0..=180.0).contains(&degrees) {
            return Err(CoreError::InvalidAngle { joint, degrees });
        }
        Ok(JointAngle {
            joint,
            degrees,
            within_safe_range,
            deviation,
        })
    }
}

/// Result of computing one joint's angle for a frame
///
/// `Unavailable` means a required landmark was below the visibility
/// threshold; downstream scoring carries the last valid value forward
/// rather than trusting low-confidence coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AngleSample {
    Available(JointAngle),
    Unavailable(JointName),
}

impl AngleSample {
    #[inline]
    pub fn joint(&self) -> JointName {
        match self {
            AngleSample::Available(a) => a.joint,
            AngleSample::Unavailable(j) => *j,
        }
    }

    #[inline]
    pub fn angle(&self) -> Option<&JointAngle> {
        match self {
            AngleSample::Available(a) => Some(a),
            AngleSample::Unavailable(_) => None,
        }
    }
}

/// A form fault detected on a frame
#[derive(Clone, Debug, PartialEq)]
pub struct FormViolation {
    pub joint: JointName,
    pub severity: Severity,
    /// Human-readable description, names the body part
    pub message: String,
    /// Correction hint for the feedback channel
    pub hint: String,
}

impl FormViolation {
    pub fn new(
        joint: JointName,
        severity: Severity,
        message: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        FormViolation {
            joint,
            severity,
            message: message.into(),
            hint: hint.into(),
        }
    }
}

/// Per-frame form quality score
#[derive(Clone, Debug)]
pub struct FormScore {
    /// Aggregate quality in [0,100]
    pub overall: f32,
    /// Per-joint scores in [0,100], ordered by joint for stable iteration
    pub per_joint: BTreeMap<JointName, f32>,
    /// Violations detected on this frame, in detection order
    pub violations: Vec<FormViolation>,
    /// Frame timestamp this score was computed for
    pub timestamp: FrameTime,
}

impl FormScore {
    /// Build a score, clamping every value into [0,100]
    pub fn new(
        per_joint: BTreeMap<JointName, f32>,
        weights: &BTreeMap<JointName, f32>,
        violations: Vec<FormViolation>,
        timestamp: FrameTime,
    ) -> Self {
        let per_joint: BTreeMap<JointName, f32> = per_joint
            .into_iter()
            .map(|(j, s)| (j, s.clamp(0.0, 100.0)))
            .collect();

        let mut weighted = 0.0f32;
        let mut total_weight = 0.0f32;
        for (joint, score) in &per_joint {
            let w = weights.get(joint).copied().unwrap_or(1.0).max(0.0);
            weighted += score * w;
            total_weight += w;
        }
        let overall = if total_weight > 0.0 {
            (weighted / total_weight).clamp(0.0, 100.0)
        } else {
            100.0
        };

        FormScore {
            overall,
            per_joint,
            violations,
            timestamp,
        }
    }

    /// A perfect score with no joints scored (e.g. idle frames)
    pub fn perfect(timestamp: FrameTime) -> Self {
        FormScore {
            overall: 100.0,
            per_joint: BTreeMap::new(),
            violations: Vec::new(),
            timestamp,
        }
    }

    /// Highest violation severity on this frame, if any
    pub fn worst_severity(&self) -> Option<Severity> {
        self.violations.iter().map(|v| v.severity).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_joint_angle_rejects_out_of_range() {
        assert!(JointAngle::new(JointName::LeftKnee, 181.0, true, 0.0).is_err());
        assert!(JointAngle::new(JointName::LeftKnee, -0.1, true, 0.0).is_err());
        assert!(JointAngle::new(JointName::LeftKnee, f32::NAN, true, 0.0).is_err());
        assert!(JointAngle::new(JointName::LeftKnee, 180.0, true, 0.0).is_ok());
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert!(Severity::High.penalty_factor() > Severity::Low.penalty_factor());
    }

    #[test]
    fn test_form_score_weighted_mean() {
        let mut per_joint = BTreeMap::new();
        per_joint.insert(JointName::LeftKnee, 100.0);
        per_joint.insert(JointName::Spine, 50.0);

        let mut weights = BTreeMap::new();
        weights.insert(JointName::LeftKnee, 1.0);
        weights.insert(JointName::Spine, 3.0);

        let score = FormScore::new(per_joint, &weights, Vec::new(), FrameTime::ZERO);
        // (100*1 + 50*3) / 4 = 62.5
        assert!((score.overall - 62.5).abs() < 0.01);
    }

    proptest! {
        #[test]
        fn prop_form_score_always_in_range(
            scores in proptest::collection::vec(-1000.0f32..2000.0, 0..8)
        ) {
            let per_joint: BTreeMap<JointName, f32> = JointName::all()
                .iter()
                .zip(scores.iter())
                .map(|(j, s)| (*j, *s))
                .collect();
            let weights = BTreeMap::new();
            let score = FormScore::new(per_joint, &weights, Vec::new(), FrameTime::ZERO);
            prop_assert!((0.0..=100.0).contains(&score.overall));
            for s in score.per_joint.values() {
                prop_assert!((0.0..=100.0).contains(s));
            }
        }
    }
}
