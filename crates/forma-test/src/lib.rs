//! FORMA Test - simulated pose input for scenario and bench coverage
//!
//! Real landmark streams are noisy and non-reproducible; the simulator
//! builds geometrically exact 33-point frames from target joint angles
//! so scenario tests can assert on counters and scores precisely.

pub mod simulator;

pub use simulator::{degrade_visibility, jittered_knee_frame, knee_frame, SquatScript};
