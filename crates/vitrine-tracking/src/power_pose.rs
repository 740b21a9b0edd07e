//! Power pose - right hand raised clearly above the head

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{Joint, VitrineError, VitrineResult};

use crate::JointSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerPoseConfig {
    /// How far (m) the right hand must be above the head
    pub offset: f32,

    /// Require `Tracked` head and hand; inferred joints are not trusted
    pub strict_tracking: bool,
}

impl Default for PowerPoseConfig {
    fn default() -> Self {
        Self {
            offset: 0.15,
            strict_tracking: true,
        }
    }
}

impl PowerPoseConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        if !self.offset.is_finite() {
            return Err(VitrineError::NonFinite {
                name: "power_pose.offset",
            });
        }
        Ok(())
    }
}

/// Power pose detector with edge reporting
#[derive(Debug)]
pub struct PowerPoseDetector {
    config: PowerPoseConfig,
    last: bool,
}

impl PowerPoseDetector {
    pub fn new(config: PowerPoseConfig) -> Self {
        Self {
            config,
            last: false,
        }
    }

    /// Level signal for a joint set
    pub fn evaluate(&self, joints: &JointSet) -> bool {
        let strict = self.config.strict_tracking;
        match (
            joints.accepted(Joint::Head, strict),
            joints.accepted(Joint::HandRight, strict),
        ) {
            (Some(head), Some(hand)) => hand.y > head.y + self.config.offset,
            _ => false,
        }
    }

    /// Update with this frame's level; returns the new value on a transition
    pub fn update(&mut self, active: bool) -> Option<bool> {
        if active == self.last {
            return None;
        }
        self.last = active;
        debug!(active, "power pose changed");
        Some(active)
    }

    pub fn is_active(&self) -> bool {
        self.last
    }
}

impl Default for PowerPoseDetector {
    fn default() -> Self {
        Self::new(PowerPoseConfig::default())
    }
}
