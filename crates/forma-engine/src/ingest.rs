//! Landmark frame ingestor
//!
//! Validates and normalizes one observation per camera tick. A rejected
//! frame never reaches the angle stage; instead a `PositioningGuidance`
//! side-channel value tells the UI collaborator how to coach the user
//! back into view. Accepted frames land in a single pending slot:
//! drop-oldest, never an unbounded queue.

use forma_core::{
    CoreError, FrameSeq, FrameTime, Landmark, PoseFrame, PositioningGuidance, LANDMARK_COUNT,
    MAX_LOW_VISIBILITY,
};
use tracing::{debug, trace};

/// A frame the ingestor refused to forward
#[derive(Clone, Debug)]
pub struct FrameRejection {
    pub error: CoreError,
    pub guidance: PositioningGuidance,
}

/// Ingest counters, useful for session diagnostics
#[derive(Clone, Copy, Debug, Default)]
pub struct IngestStats {
    pub accepted: u64,
    pub rejected: u64,
    /// Accepted frames that replaced an undrained pending frame
    pub coalesced: u64,
}

/// Single-slot frame ingestor
#[derive(Debug, Default)]
pub struct FrameIngestor {
    next_seq: FrameSeq,
    pending: Option<PoseFrame>,
    stats: IngestStats,
}

impl FrameIngestor {
    pub fn new() -> Self {
        FrameIngestor::default()
    }

    /// Validate one raw observation and stage it for processing
    ///
    /// Rejects frames with fewer than 33 detected points or more than
    /// 8 points below the visibility threshold.
    pub fn submit(
        &mut self,
        landmarks: Vec<Landmark>,
        timestamp: FrameTime,
    ) -> Result<(), FrameRejection> {
        let detected = landmarks.len();
        if detected < LANDMARK_COUNT {
            self.stats.rejected += 1;
            debug!(detected, "frame rejected: missing landmarks");
            return Err(FrameRejection {
                error: CoreError::IncompleteLandmarks {
                    detected,
                    low_visibility: 0,
                },
                guidance: PositioningGuidance {
                    missing: LANDMARK_COUNT - detected,
                    low_visibility: 0,
                    timestamp,
                },
            });
        }

        let frame = PoseFrame::new(landmarks, timestamp, self.next_seq).map_err(|error| {
            FrameRejection {
                error,
                guidance: PositioningGuidance {
                    missing: 0,
                    low_visibility: 0,
                    timestamp,
                },
            }
        })?;

        let low_visibility = frame.low_visibility_count();
        if low_visibility > MAX_LOW_VISIBILITY {
            self.stats.rejected += 1;
            debug!(low_visibility, "frame rejected: low visibility");
            return Err(FrameRejection {
                error: CoreError::IncompleteLandmarks {
                    detected,
                    low_visibility,
                },
                guidance: PositioningGuidance {
                    missing: 0,
                    low_visibility,
                    timestamp,
                },
            });
        }

        self.next_seq = self.next_seq.next();
        self.stats.accepted += 1;
        if self.pending.replace(frame).is_some() {
            // Consumer fell behind; keep only the newest observation.
            self.stats.coalesced += 1;
            trace!("pending frame coalesced");
        }
        Ok(())
    }

    /// Drain the pending frame, if any
    pub fn take(&mut self) -> Option<PoseFrame> {
        self.pending.take()
    }

    /// Discard any staged frame (session abort)
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }
}
