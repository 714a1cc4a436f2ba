//! Identity types for the FORMA pipeline
//!
//! All identifiers are 64-bit: cheap to copy, cheap to hash, and wide
//! enough for any realistic catalog or session history.

use std::fmt;

/// Workout session identity
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SessionId(pub u64);

impl SessionId {
    pub const ZERO: SessionId = SessionId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        SessionId(id)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session({:016x})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Exercise template identity - unique within the catalog
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ExerciseId(pub u64);

impl ExerciseId {
    pub const ZERO: ExerciseId = ExerciseId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        ExerciseId(id)
    }
}

impl fmt::Debug for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Exercise({})", self.0)
    }
}

impl fmt::Display for ExerciseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-session frame sequence number - strictly increasing per camera tick
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct FrameSeq(pub u64);

impl FrameSeq {
    pub const ZERO: FrameSeq = FrameSeq(0);

    #[inline]
    pub fn new(seq: u64) -> Self {
        FrameSeq(seq)
    }

    #[inline]
    pub fn next(self) -> Self {
        FrameSeq(self.0 + 1)
    }
}

impl fmt::Debug for FrameSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Frame({})", self.0)
    }
}
