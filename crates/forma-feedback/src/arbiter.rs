//! The feedback arbiter
//!
//! Ordering: highest priority first; within a priority, the most recent
//! event wins. A newer event for a joint supersedes any older pending
//! event for that joint on the same channel - stale coaching is worse
//! than no coaching.
//!
//! Throttling: at most one cue per minimum interval, except that a
//! high-priority cue (a safety breach) is delivered immediately and
//! resets the interval. Haptic cues are gated solely by the haptics
//! switch and are otherwise arbitrated like any other channel.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use forma_core::{FeedbackChannel, FeedbackEvent, FeedbackPriority, FrameTime, JointName};
use parking_lot::Mutex;
use tracing::{debug, trace};

/// Arbiter tunables
#[derive(Clone, Copy, Debug)]
pub struct ArbiterConfig {
    /// Minimum spacing between delivered cues (high priority exempt)
    pub min_interval: Duration,
    /// Master switch for the haptic channel
    pub haptics_enabled: bool,
    /// Pending cues older than this are dropped, not delivered
    pub stale_after: Duration,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        ArbiterConfig {
            min_interval: Duration::from_secs(3),
            haptics_enabled: true,
            stale_after: Duration::from_secs(10),
        }
    }
}

/// Counters for observability and tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArbiterStats {
    pub offered: u64,
    pub delivered: u64,
    pub superseded: u64,
    pub expired: u64,
    pub throttled: u64,
    pub haptics_suppressed: u64,
}

struct PendingEvent {
    event: FeedbackEvent,
    seq: u64,
}

impl PartialEq for PendingEvent {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PendingEvent {}

impl PartialOrd for PendingEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingEvent {
    // Max-heap: priority first, then recency (seq grows over time).
    fn cmp(&self, other: &Self) -> Ordering {
        self.event
            .priority
            .cmp(&other.event.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Default)]
struct Inner {
    queue: BinaryHeap<PendingEvent>,
    /// Seq of the newest pending event per joint and channel; older
    /// seqs are superseded and skipped on poll. Scoped by channel so a
    /// haptic companion does not cancel the voice cue it rides with.
    latest_for_joint: HashMap<(JointName, FeedbackChannel), u64>,
    next_seq: u64,
    last_delivery: Option<FrameTime>,
    stats: ArbiterStats,
}

/// Decides which single cue goes out on each poll
///
/// Shared between the analysis task (offering) and the delivery task
/// (polling), hence the internal lock.
pub struct FeedbackArbiter {
    config: ArbiterConfig,
    inner: Mutex<Inner>,
}

impl FeedbackArbiter {
    pub fn new(config: ArbiterConfig) -> Self {
        FeedbackArbiter {
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> ArbiterConfig {
        self.config
    }

    pub fn stats(&self) -> ArbiterStats {
        self.inner.lock().stats
    }

    /// Queue a cue for arbitration
    pub fn offer(&self, event: FeedbackEvent) {
        let mut inner = self.inner.lock();
        inner.stats.offered += 1;

        if event.channel == FeedbackChannel::Haptic && !self.config.haptics_enabled {
            inner.stats.haptics_suppressed += 1;
            trace!(joint = %event.target, "haptic cue suppressed");
            return;
        }

        let seq = inner.next_seq;
        inner.next_seq += 1;
        let key = (event.target, event.channel);
        if inner.latest_for_joint.insert(key, seq).is_some() {
            // The older entry stays queued and is skipped on poll.
            inner.stats.superseded += 1;
        }
        inner.queue.push(PendingEvent { event, seq });
    }

    /// Pick the cue to deliver now, if the interval allows one
    pub fn poll(&self, now: FrameTime) -> Option<FeedbackEvent> {
        let mut inner = self.inner.lock();

        while let Some(pending) = inner.queue.pop() {
            let key = (pending.event.target, pending.event.channel);
            if inner.latest_for_joint.get(&key) != Some(&pending.seq) {
                continue; // superseded
            }
            if now.since(pending.event.timestamp) > self.config.stale_after {
                inner.stats.expired += 1;
                inner.latest_for_joint.remove(&key);
                continue;
            }

            let interval_open = match inner.last_delivery {
                Some(last) => now.since(last) >= self.config.min_interval,
                None => true,
            };
            if pending.event.priority < FeedbackPriority::High && !interval_open {
                // Put it back; a later poll may deliver it.
                inner.stats.throttled += 1;
                inner.queue.push(pending);
                return None;
            }

            inner.latest_for_joint.remove(&key);
            inner.stats.delivered += 1;
            // Monotonic even if the caller's clock jitters backwards.
            inner.last_delivery = Some(inner.last_delivery.map_or(now, |last| last.max(now)));
            debug!(
                joint = %pending.event.target,
                priority = ?pending.event.priority,
                "cue delivered"
            );
            return Some(pending.event);
        }
        None
    }

    /// Session abort: deliver at most one pending high-priority cue,
    /// then drop everything else
    pub fn flush_for_abort(&self, now: FrameTime) -> Option<FeedbackEvent> {
        let mut inner = self.inner.lock();
        let drained = std::mem::take(&mut inner.queue);
        let latest = std::mem::take(&mut inner.latest_for_joint);

        let urgent = drained
            .into_sorted_vec()
            .into_iter()
            .rev() // highest priority, most recent first
            .find(|p| {
                latest.get(&(p.event.target, p.event.channel)) == Some(&p.seq)
                    && p.event.priority == FeedbackPriority::High
                    && now.since(p.event.timestamp) <= self.config.stale_after
            });

        match urgent {
            Some(pending) => {
                inner.stats.delivered += 1;
                inner.last_delivery = Some(now);
                debug!(joint = %pending.event.target, "urgent cue flushed on abort");
                Some(pending.event)
            }
            None => None,
        }
    }

    /// Drop all pending cues
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.queue.clear();
        inner.latest_for_joint.clear();
    }
}
