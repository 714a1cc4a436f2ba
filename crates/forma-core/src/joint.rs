//! Joints and the landmark-triple table
//!
//! Every joint this core can score is defined by a three-point
//! construction: (point A, vertex, point B) in the 33-landmark model
//! layout. Templates may only reference joints listed here; the template
//! store validates that at load time.

use std::fmt;

/// Named joints with a computable three-point angle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JointName {
    LeftElbow,
    RightElbow,
    LeftShoulder,
    RightShoulder,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
    /// Shoulder-hip-ankle alignment, used as the back/torso line
    Spine,
}

/// (point A, vertex, point B) landmark indices for a joint
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LandmarkTriple {
    pub a: u8,
    pub vertex: u8,
    pub b: u8,
}

impl JointName {
    /// All computable joints
    pub fn all() -> &'static [JointName] {
        &[
            JointName::LeftElbow,
            JointName::RightElbow,
            JointName::LeftShoulder,
            JointName::RightShoulder,
            JointName::LeftHip,
            JointName::RightHip,
            JointName::LeftKnee,
            JointName::RightKnee,
            JointName::LeftAnkle,
            JointName::RightAnkle,
            JointName::Spine,
        ]
    }

    /// The three-point construction for this joint
    ///
    /// Indices follow the common 33-landmark pose model: shoulders 11/12,
    /// elbows 13/14, wrists 15/16, hips 23/24, knees 25/26, ankles 27/28,
    /// foot index 31/32.
    pub fn triple(self) -> LandmarkTriple {
        let (a, vertex, b) = match self {
            JointName::LeftElbow => (11, 13, 15),
            JointName::RightElbow => (12, 14, 16),
            JointName::LeftShoulder => (13, 11, 23),
            JointName::RightShoulder => (14, 12, 24),
            JointName::LeftHip => (11, 23, 25),
            JointName::RightHip => (12, 24, 26),
            JointName::LeftKnee => (23, 25, 27),
            JointName::RightKnee => (24, 26, 28),
            JointName::LeftAnkle => (25, 27, 31),
            JointName::RightAnkle => (26, 28, 32),
            JointName::Spine => (11, 23, 27),
        };
        LandmarkTriple { a, vertex, b }
    }

    /// Human-readable body part, used verbatim in voice cues
    pub fn body_part(self) -> &'static str {
        match self {
            JointName::LeftElbow => "left elbow",
            JointName::RightElbow => "right elbow",
            JointName::LeftShoulder => "left shoulder",
            JointName::RightShoulder => "right shoulder",
            JointName::LeftHip => "left hip",
            JointName::RightHip => "right hip",
            JointName::LeftKnee => "left knee",
            JointName::RightKnee => "right knee",
            JointName::LeftAnkle => "left ankle",
            JointName::RightAnkle => "right ankle",
            JointName::Spine => "spine",
        }
    }
}

impl fmt::Display for JointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.body_part())
    }
}
