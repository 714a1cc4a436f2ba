//! Frame synthesis from target joint angles
//!
//! A frame is 33 landmarks with every visibility at 0.95. For a target
//! knee angle theta, the hip sits directly above the knee and the ankle
//! is placed at theta from the hip-knee line, so the three-point angle
//! at the knee measures back exactly theta (up to float rounding).
//! Both legs are placed symmetrically.

use forma_core::{Landmark, LANDMARK_COUNT};
use rand::Rng;

/// A 33-point frame with both knees bent to `theta_deg`
pub fn knee_frame(theta_deg: f32) -> Vec<Landmark> {
    let mut points: Vec<Landmark> = (0..LANDMARK_COUNT as u8)
        .map(|i| Landmark::new(i, 0.5 + i as f32 * 0.001, 0.2, 0.0, 0.95))
        .collect();

    let theta = theta_deg.to_radians();
    for (hip, knee, ankle, x) in [(23u8, 25u8, 27u8, 0.4f32), (24, 26, 28, 0.6)] {
        let knee_y = 0.55;
        points[hip as usize] = Landmark::new(hip, x, knee_y - 0.2, 0.0, 0.95);
        points[knee as usize] = Landmark::new(knee, x, knee_y, 0.0, 0.95);
        points[ankle as usize] = Landmark::new(
            ankle,
            x + 0.2 * theta.sin(),
            knee_y - 0.2 * theta.cos(),
            0.0,
            0.95,
        );
    }
    points
}

/// `knee_frame` with uniform positional jitter on every landmark
///
/// Real pose models wobble a little frame to frame; `amplitude` is the
/// half-width of the jitter in normalized image space. 0.002 keeps the
/// induced angle error under a degree at these limb lengths.
pub fn jittered_knee_frame<R: Rng>(theta_deg: f32, amplitude: f32, rng: &mut R) -> Vec<Landmark> {
    knee_frame(theta_deg)
        .into_iter()
        .map(|p| {
            Landmark::new(
                p.index,
                p.x + rng.gen_range(-amplitude..=amplitude),
                p.y + rng.gen_range(-amplitude..=amplitude),
                p.z + rng.gen_range(-amplitude..=amplitude),
                p.visibility,
            )
        })
        .collect()
}

/// Drop the first `count` landmarks below the visibility threshold
pub fn degrade_visibility(mut points: Vec<Landmark>, count: usize) -> Vec<Landmark> {
    for point in points.iter_mut().take(count) {
        *point = Landmark::new(point.index, point.x, point.y, point.z, 0.2);
    }
    points
}

/// A timed knee-angle trajectory, one entry per camera frame
#[derive(Clone, Debug)]
pub struct SquatScript {
    /// (knee angle in degrees, timestamp in milliseconds)
    pub steps: Vec<(f32, u64)>,
}

impl SquatScript {
    /// Full traversal: standing -> descent -> bottom -> ascent ->
    /// standing, paced to meet the catalog squat's phase minimums
    pub fn full_cycle() -> Self {
        SquatScript {
            steps: vec![
                (172.0, 0),
                (150.0, 66),
                (145.0, 400),
                (130.0, 700),
                (115.0, 1000),
                (95.0, 1300),
                (85.0, 1500),
                (85.0, 1700),
                (88.0, 1900),
                (110.0, 2100),
                (125.0, 2500),
                (140.0, 2900),
                (155.0, 3200),
                (174.0, 3500),
            ],
        }
    }

    /// Descends partway and comes straight back up, never reaching
    /// the bottom phase's angle band
    pub fn skipped_bottom() -> Self {
        SquatScript {
            steps: vec![
                (172.0, 0),
                (155.0, 66),
                (135.0, 400),
                (120.0, 800),
                (115.0, 1100),
                (125.0, 1400),
                (140.0, 1700),
                (160.0, 2000),
                (174.0, 2300),
            ],
        }
    }

    /// Concatenate `reps` full cycles, shifting timestamps
    pub fn repeated(reps: usize) -> Self {
        let one = Self::full_cycle();
        let span = one.steps.last().map(|(_, t)| t + 200).unwrap_or(0);
        let steps = (0..reps)
            .flat_map(|i| {
                one.steps
                    .iter()
                    .map(move |(theta, t)| (*theta, t + i as u64 * span))
            })
            .collect();
        SquatScript { steps }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forma_core::VISIBILITY_THRESHOLD;
    use forma_engine::angles::three_point_angle;

    #[test]
    fn test_knee_frame_measures_back_the_target_angle() {
        for target in [30.0f32, 90.0, 120.0, 170.0] {
            let points = knee_frame(target);
            let angle = three_point_angle(&points[23], &points[25], &points[27])
                .expect("non-degenerate geometry");
            assert!(
                (angle - target).abs() < 0.1,
                "target {target} measured {angle}"
            );
        }
    }

    #[test]
    fn test_frames_are_complete_and_visible() {
        let points = knee_frame(120.0);
        assert_eq!(points.len(), 33);
        assert!(points.iter().all(|p| p.visibility > VISIBILITY_THRESHOLD));
    }

    #[test]
    fn test_degrade_visibility_hits_exactly_count() {
        let points = degrade_visibility(knee_frame(120.0), 9);
        let low = points
            .iter()
            .filter(|p| p.visibility < VISIBILITY_THRESHOLD)
            .count();
        assert_eq!(low, 9);
    }
}
