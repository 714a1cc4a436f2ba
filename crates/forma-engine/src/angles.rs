//! Joint angle calculator
//!
//! Pure geometry: the angle at a joint is the angle at the vertex of its
//! landmark triple, computed from the vector dot product and clamped to
//! [0,180] degrees. The output set of readings is always exactly the set
//! of requested joints - a joint whose landmarks are not reliably
//! visible yields `degrees: None` rather than a degenerate angle from
//! low-confidence coordinates.

use forma_core::{JointName, Landmark, PoseFrame};

/// One joint's raw measurement for a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AngleReading {
    pub joint: JointName,
    /// Degrees in [0,180], or `None` when the joint is unavailable
    pub degrees: Option<f32>,
}

/// Stateless three-point angle calculator
#[derive(Clone, Copy, Debug, Default)]
pub struct AngleCalculator;

impl AngleCalculator {
    pub fn new() -> Self {
        AngleCalculator
    }

    /// Measure every requested joint on a frame
    ///
    /// Completeness: the result has one reading per requested joint, in
    /// request order, no extras and no omissions.
    pub fn measure(&self, frame: &PoseFrame, joints: &[JointName]) -> Vec<AngleReading> {
        joints
            .iter()
            .map(|&joint| AngleReading {
                joint,
                degrees: self.measure_joint(frame, joint),
            })
            .collect()
    }

    fn measure_joint(&self, frame: &PoseFrame, joint: JointName) -> Option<f32> {
        let triple = joint.triple();
        let a = frame.landmark(triple.a)?;
        let vertex = frame.landmark(triple.vertex)?;
        let b = frame.landmark(triple.b)?;

        if !a.is_visible() || !vertex.is_visible() || !b.is_visible() {
            return None;
        }
        three_point_angle(a, vertex, b)
    }
}

/// Angle at `vertex` between `a` and `b`, degrees clamped to [0,180]
///
/// Returns `None` for degenerate geometry (coincident points), which
/// downstream treats the same as an unavailable joint.
pub fn three_point_angle(a: &Landmark, vertex: &Landmark, b: &Landmark) -> Option<f32> {
    let v1 = (a.x - vertex.x, a.y - vertex.y, a.z - vertex.z);
    let v2 = (b.x - vertex.x, b.y - vertex.y, b.z - vertex.z);

    let dot = v1.0 * v2.0 + v1.1 * v2.1 + v1.2 * v2.2;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1 + v1.2 * v1.2).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1 + v2.2 * v2.2).sqrt();

    if mag1 < 1e-4 || mag2 < 1e-4 {
        return None;
    }

    let cos = (dot / (mag1 * mag2)).clamp(-1.0, 1.0);
    let degrees = cos.acos().to_degrees().clamp(0.0, 180.0);
    degrees.is_finite().then_some(degrees)
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::{FrameSeq, FrameTime, LANDMARK_COUNT};
    use proptest::prelude::*;

    fn lm(index: u8, x: f32, y: f32) -> Landmark {
        Landmark::new(index, x, y, 0.0, 0.95)
    }

    fn frame_with(points: &[(u8, f32, f32)]) -> PoseFrame {
        let mut landmarks: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| lm(i as u8, 0.5, 0.5))
            .collect();
        for &(index, x, y) in points {
            landmarks[index as usize] = lm(index, x, y);
        }
        PoseFrame::new(landmarks, FrameTime::ZERO, FrameSeq::ZERO).unwrap()
    }

    #[test]
    fn test_straight_line_is_180() {
        let a = lm(0, 0.0, 0.0);
        let v = lm(1, 0.5, 0.0);
        let b = lm(2, 1.0, 0.0);
        let angle = three_point_angle(&a, &v, &b).unwrap();
        assert!((angle - 180.0).abs() < 0.5);
    }

    #[test]
    fn test_right_angle_is_90() {
        let a = lm(0, 0.0, 0.0);
        let v = lm(1, 0.5, 0.0);
        let b = lm(2, 0.5, 0.5);
        let angle = three_point_angle(&a, &v, &b).unwrap();
        assert!((angle - 90.0).abs() < 0.5);
    }

    #[test]
    fn test_degenerate_geometry_is_none() {
        let a = lm(0, 0.5, 0.5);
        let v = lm(1, 0.5, 0.5);
        let b = lm(2, 1.0, 1.0);
        assert_eq!(three_point_angle(&a, &v, &b), None);
    }

    #[test]
    fn test_completeness_over_requested_joints() {
        // Left knee: hip 23, knee 25, ankle 27 in a straight vertical line.
        let frame = frame_with(&[(23, 0.5, 0.3), (25, 0.5, 0.5), (27, 0.5, 0.7)]);
        let joints = [JointName::LeftKnee, JointName::RightKnee];
        let readings = AngleCalculator::new().measure(&frame, &joints);

        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].joint, JointName::LeftKnee);
        assert!((readings[0].degrees.unwrap() - 180.0).abs() < 0.5);
    }

    #[test]
    fn test_low_visibility_joint_is_unavailable() {
        let mut landmarks: Vec<Landmark> = (0..LANDMARK_COUNT)
            .map(|i| lm(i as u8, 0.4 + i as f32 * 0.01, 0.5))
            .collect();
        landmarks[25].visibility = 0.2; // left knee vertex

        let frame = PoseFrame::new(landmarks, FrameTime::ZERO, FrameSeq::ZERO).unwrap();
        let readings =
            AngleCalculator::new().measure(&frame, &[JointName::LeftKnee, JointName::LeftElbow]);

        assert_eq!(readings[0].degrees, None);
        assert!(readings[1].degrees.is_some());
    }

    proptest! {
        #[test]
        fn prop_angle_always_in_range(
            ax in -1.0f32..2.0, ay in -1.0f32..2.0,
            vx in -1.0f32..2.0, vy in -1.0f32..2.0,
            bx in -1.0f32..2.0, by in -1.0f32..2.0,
        ) {
            let a = lm(0, ax, ay);
            let v = lm(1, vx, vy);
            let b = lm(2, bx, by);
            if let Some(angle) = three_point_angle(&a, &v, &b) {
                prop_assert!((0.0..=180.0).contains(&angle));
            }
        }
    }
}
