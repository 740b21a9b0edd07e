//! Head turn latch - turning the head one way switches on, the other way off

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{ensure_positive, Joint, VitrineError, VitrineResult};
use vitrine_tracking::JointSet;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadTurnConfig {
    /// Horizontal head offset from spine-shoulder (m) that changes nothing
    pub dead_zone: f32,

    /// Offset beyond which the latch flips
    pub threshold: f32,
}

impl Default for HeadTurnConfig {
    fn default() -> Self {
        Self {
            dead_zone: 0.05,
            threshold: 0.12,
        }
    }
}

impl HeadTurnConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("head_turn.threshold", self.threshold)?;
        if !(self.dead_zone < self.threshold) {
            return Err(VitrineError::ThresholdOrder {
                name: "head_turn dead_zone/threshold",
                lower: self.dead_zone,
                upper: self.threshold,
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct HeadTurnLatch {
    config: HeadTurnConfig,
    on: bool,
}

impl HeadTurnLatch {
    pub fn new(config: HeadTurnConfig) -> Self {
        Self { config, on: false }
    }

    /// Returns the new latch value on the frame it flips
    pub fn update(&mut self, joints: &JointSet) -> Option<bool> {
        let head = joints.position(Joint::Head);
        let spine_shoulder = joints.position(Joint::SpineShoulder);
        if !head.is_finite() || !spine_shoulder.is_finite() {
            return None;
        }

        let dx = head.x - spine_shoulder.x;
        if dx.abs() < self.config.dead_zone {
            return None;
        }

        let next = if dx > self.config.threshold {
            true
        } else if dx < -self.config.threshold {
            false
        } else {
            self.on
        };

        if next == self.on {
            return None;
        }
        self.on = next;
        debug!(on = next, dx, "head turn latch");
        Some(next)
    }

    pub fn is_on(&self) -> bool {
        self.on
    }

    /// Force the latch off; returns `Some(false)` if it was on
    pub fn switch_off(&mut self) -> Option<bool> {
        if !self.on {
            return None;
        }
        self.on = false;
        debug!("head turn latch cleared");
        Some(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Vec3;

    fn head_at(dx: f32) -> JointSet {
        JointSet::from_tracked(&[
            (Joint::SpineShoulder, Vec3::new(0.0, 1.45, 2.0)),
            (Joint::Head, Vec3::new(dx, 1.65, 2.0)),
        ])
    }

    #[test]
    fn test_latch_flips_both_ways() {
        let mut latch = HeadTurnLatch::default();
        assert_eq!(latch.update(&head_at(0.15)), Some(true));
        assert_eq!(latch.update(&head_at(0.15)), None);
        assert!(latch.is_on());

        // Back to centre keeps the latch
        assert_eq!(latch.update(&head_at(0.0)), None);
        assert!(latch.is_on());

        assert_eq!(latch.update(&head_at(-0.15)), Some(false));
        assert!(!latch.is_on());
    }

    #[test]
    fn test_between_dead_zone_and_threshold() {
        let mut latch = HeadTurnLatch::default();
        assert_eq!(latch.update(&head_at(0.08)), None);
        assert!(!latch.is_on());
    }

    #[test]
    fn test_missing_joints() {
        let mut latch = HeadTurnLatch::default();
        assert_eq!(latch.update(&JointSet::default()), None);
    }

    #[test]
    fn test_switch_off() {
        let mut latch = HeadTurnLatch::default();
        assert_eq!(latch.switch_off(), None);
        latch.update(&head_at(0.15));
        assert_eq!(latch.switch_off(), Some(false));
        assert!(!latch.is_on());
    }

    #[test]
    fn test_config_order() {
        let config = HeadTurnConfig {
            dead_zone: 0.2,
            threshold: 0.1,
        };
        assert!(config.validate().is_err());
    }
}
