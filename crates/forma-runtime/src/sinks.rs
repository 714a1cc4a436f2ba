//! Delivery and persistence seams
//!
//! The core never talks to speakers, motors, screens, or disks
//! directly. Host integrations implement these traits; the driver
//! routes each delivered cue to the sink matching its channel.

use std::sync::Arc;

use forma_core::{FeedbackChannel, FeedbackEvent, JointName, PositioningGuidance};
use forma_session::SessionSnapshot;
use tracing::debug;

/// Spoken cues
pub trait VoiceSink: Send + Sync {
    fn speak(&self, message: &str);
}

/// Vibration cues
pub trait HapticSink: Send + Sync {
    fn pulse(&self, target: JointName);
}

/// On-screen cues and positioning guidance
pub trait VisualSink: Send + Sync {
    fn show(&self, event: &FeedbackEvent);
    fn guide(&self, guidance: &PositioningGuidance);
}

/// Periodic session snapshots
pub trait SnapshotSink: Send + Sync {
    fn persist(&self, snapshot: &SessionSnapshot);
}

/// Routes one delivered cue to the sink for its channel
#[derive(Clone)]
pub struct DeliveryRouter {
    voice: Arc<dyn VoiceSink>,
    haptic: Arc<dyn HapticSink>,
    visual: Arc<dyn VisualSink>,
}

impl DeliveryRouter {
    pub fn new(
        voice: Arc<dyn VoiceSink>,
        haptic: Arc<dyn HapticSink>,
        visual: Arc<dyn VisualSink>,
    ) -> Self {
        DeliveryRouter {
            voice,
            haptic,
            visual,
        }
    }

    pub fn deliver(&self, event: &FeedbackEvent) {
        debug!(channel = ?event.channel, target = %event.target, "delivering cue");
        match event.channel {
            FeedbackChannel::Voice => self.voice.speak(&event.message),
            FeedbackChannel::Haptic => self.haptic.pulse(event.target),
            FeedbackChannel::Visual => self.visual.show(event),
        }
    }

    pub fn guide(&self, guidance: &PositioningGuidance) {
        self.visual.guide(guidance);
    }
}

/// Discards everything; for hosts wiring up channels incrementally
pub struct NullSink;

impl VoiceSink for NullSink {
    fn speak(&self, _message: &str) {}
}

impl HapticSink for NullSink {
    fn pulse(&self, _target: JointName) {}
}

impl VisualSink for NullSink {
    fn show(&self, _event: &FeedbackEvent) {}
    fn guide(&self, _guidance: &PositioningGuidance) {}
}

impl SnapshotSink for NullSink {
    fn persist(&self, _snapshot: &SessionSnapshot) {}
}
