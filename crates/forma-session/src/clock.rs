//! The pausable session clock
//!
//! Everything below the session layer runs on monotonic `FrameTime`.
//! This clock is where pause exists: while paused, wall time flows
//! into `paused_total` and session time stands still, so a
//! pause/resume pair is invisible to the analysis core. Stale frames
//! arriving during a pause are the caller's problem - the driver stops
//! feeding the pipeline while paused.

use std::time::Duration;

use forma_core::FrameTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionClock {
    now: FrameTime,
    paused: bool,
    paused_total: Duration,
}

impl Default for SessionClock {
    fn default() -> Self {
        SessionClock::new()
    }
}

impl SessionClock {
    pub fn new() -> Self {
        SessionClock {
            now: FrameTime::ZERO,
            paused: false,
            paused_total: Duration::ZERO,
        }
    }

    /// Current session time; frozen while paused
    #[inline]
    pub fn now(&self) -> FrameTime {
        self.now
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Total wall time spent paused so far
    #[inline]
    pub fn paused_total(&self) -> Duration {
        self.paused_total
    }

    /// Feed elapsed wall time into the clock
    pub fn advance(&mut self, elapsed: Duration) {
        if self.paused {
            self.paused_total += elapsed;
        } else {
            self.now = self.now.saturating_add(elapsed);
        }
    }

    /// Freeze session time; idempotent
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Unfreeze session time; idempotent
    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub(crate) fn restore(now: FrameTime, paused: bool, paused_total: Duration) -> Self {
        SessionClock {
            now,
            paused,
            paused_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_moves_session_time() {
        let mut clock = SessionClock::new();
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now(), FrameTime::from_millis(250));
    }

    #[test]
    fn test_pause_resume_is_identity_on_session_time() {
        let mut clock = SessionClock::new();
        clock.advance(Duration::from_secs(10));
        let before = clock.now();

        clock.pause();
        clock.advance(Duration::from_secs(90));
        clock.resume();

        assert_eq!(clock.now(), before);
        assert_eq!(clock.paused_total(), Duration::from_secs(90));

        clock.advance(Duration::from_secs(1));
        assert_eq!(clock.now(), before + Duration::from_secs(1));
    }

    #[test]
    fn test_pause_is_idempotent() {
        let mut clock = SessionClock::new();
        clock.pause();
        clock.pause();
        clock.advance(Duration::from_secs(5));
        clock.resume();
        clock.resume();
        assert_eq!(clock.now(), FrameTime::ZERO);
        assert_eq!(clock.paused_total(), Duration::from_secs(5));
    }
}
