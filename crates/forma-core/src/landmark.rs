//! Landmarks and pose frames
//!
//! A `PoseFrame` is one observation from the pose-estimation collaborator:
//! exactly 33 landmarks in model order, a monotonic timestamp, and a
//! sequence id. Frames are immutable once constructed.

use crate::{CoreError, CoreResult, FrameSeq, FrameTime};

/// Number of landmarks per frame (full-body model layout)
pub const LANDMARK_COUNT: usize = 33;

/// Visibility below this is treated as "not reliably seen"
pub const VISIBILITY_THRESHOLD: f32 = 0.5;

/// Maximum low-visibility landmarks before a frame is rejected
pub const MAX_LOW_VISIBILITY: usize = 8;

/// One tracked body point
///
/// `x`/`y` are normalized to [0,1] image space, `z` is relative depth.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    /// Landmark index (0..=32 in model order)
    pub index: u8,
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// Visibility confidence in [0,1]
    pub visibility: f32,
}

impl Landmark {
    pub fn new(index: u8, x: f32, y: f32, z: f32, visibility: f32) -> Self {
        Landmark {
            index,
            x,
            y,
            z,
            visibility,
        }
    }

    /// Is this landmark reliably visible?
    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visibility >= VISIBILITY_THRESHOLD
    }
}

/// One complete pose observation
#[derive(Clone, Debug)]
pub struct PoseFrame {
    landmarks: Vec<Landmark>,
    /// Monotonically increasing capture timestamp
    pub timestamp: FrameTime,
    /// Per-session sequence id
    pub seq: FrameSeq,
}

impl PoseFrame {
    /// Build a frame, enforcing the 33-landmark contract
    pub fn new(
        landmarks: Vec<Landmark>,
        timestamp: FrameTime,
        seq: FrameSeq,
    ) -> CoreResult<Self> {
        if landmarks.len() != LANDMARK_COUNT {
            return Err(CoreError::IncompleteLandmarks {
                detected: landmarks.len(),
                low_visibility: 0,
            });
        }
        Ok(PoseFrame {
            landmarks,
            timestamp,
            seq,
        })
    }

    /// Get a landmark by model index
    #[inline]
    pub fn landmark(&self, index: u8) -> Option<&Landmark> {
        self.landmarks.get(index as usize)
    }

    /// All landmarks in model order
    #[inline]
    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    /// Count of landmarks below the visibility threshold
    pub fn low_visibility_count(&self) -> usize {
        self.landmarks.iter().filter(|l| !l.is_visible()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_frame(visibility: f32) -> Vec<Landmark> {
        (0..LANDMARK_COUNT)
            .map(|i| Landmark::new(i as u8, 0.5, 0.5, 0.0, visibility))
            .collect()
    }

    #[test]
    fn test_frame_requires_33_landmarks() {
        let short = full_frame(1.0)[..30].to_vec();
        let err = PoseFrame::new(short, FrameTime::ZERO, FrameSeq::ZERO);
        assert!(matches!(
            err,
            Err(CoreError::IncompleteLandmarks { detected: 30, .. })
        ));
    }

    #[test]
    fn test_low_visibility_count() {
        let mut landmarks = full_frame(0.9);
        for lm in landmarks.iter_mut().take(9) {
            lm.visibility = 0.2;
        }
        let frame = PoseFrame::new(landmarks, FrameTime::ZERO, FrameSeq::ZERO).unwrap();
        assert_eq!(frame.low_visibility_count(), 9);
    }
}
