//! Feedback events
//!
//! A `FeedbackEvent` is ephemeral: it is consumed once delivered or
//! superseded by a newer event for the same joint and channel. The
//! arbiter that orders and throttles these lives in `forma-feedback`.

use crate::{FormViolation, FrameTime, JointName, Severity};

/// Delivery channel for a feedback event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeedbackChannel {
    Voice,
    Haptic,
    Visual,
}

/// Delivery priority, derived from violation severity
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedbackPriority {
    Low,
    Medium,
    High,
}

impl From<Severity> for FeedbackPriority {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Low => FeedbackPriority::Low,
            Severity::Medium => FeedbackPriority::Medium,
            Severity::High => FeedbackPriority::High,
        }
    }
}

/// One feedback cue bound for a delivery collaborator
#[derive(Clone, Debug, PartialEq)]
pub struct FeedbackEvent {
    pub channel: FeedbackChannel,
    pub priority: FeedbackPriority,
    /// Spoken/displayed message; voice cues name the body part
    pub message: String,
    /// The joint that triggered the cue
    pub target: JointName,
    pub timestamp: FrameTime,
}

impl FeedbackEvent {
    pub fn new(
        channel: FeedbackChannel,
        priority: FeedbackPriority,
        message: impl Into<String>,
        target: JointName,
        timestamp: FrameTime,
    ) -> Self {
        FeedbackEvent {
            channel,
            priority,
            message: message.into(),
            target,
            timestamp,
        }
    }

    /// Build a voice cue from a violation. The message always names the
    /// body part so the delivered cue is actionable.
    pub fn from_violation(violation: &FormViolation, timestamp: FrameTime) -> Self {
        FeedbackEvent {
            channel: FeedbackChannel::Voice,
            priority: violation.severity.into(),
            message: format!("{}: {}", violation.joint.body_part(), violation.hint),
            target: violation.joint,
            timestamp,
        }
    }
}

/// Side-channel guidance emitted when a frame is rejected
///
/// Not routed through the arbiter: the UI collaborator uses it to coach
/// the user back into the camera frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositioningGuidance {
    /// Landmarks the model did not detect at all
    pub missing: usize,
    /// Landmarks detected but below the visibility threshold
    pub low_visibility: usize,
    pub timestamp: FrameTime,
}

impl PositioningGuidance {
    /// Guidance message for display or speech
    pub fn message(&self) -> String {
        if self.missing > 0 {
            "Move back so your whole body is in frame".to_string()
        } else {
            "Adjust your position or lighting for better tracking".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_cue_names_body_part() {
        let violation = FormViolation::new(
            JointName::Spine,
            Severity::High,
            "back rounding under load",
            "keep your chest up",
        );
        let event = FeedbackEvent::from_violation(&violation, FrameTime::ZERO);

        assert_eq!(event.channel, FeedbackChannel::Voice);
        assert_eq!(event.priority, FeedbackPriority::High);
        assert!(event.message.contains("spine"));
    }

    #[test]
    fn test_priority_from_severity() {
        assert_eq!(
            FeedbackPriority::from(Severity::High),
            FeedbackPriority::High
        );
        assert!(FeedbackPriority::High > FeedbackPriority::Low);
    }
}
