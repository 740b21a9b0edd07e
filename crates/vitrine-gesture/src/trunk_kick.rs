//! Trunk kick - a knee lift held long enough fires exactly one trigger
//!
//! Three guards keep a single kick from firing twice:
//! - hold: the lift must persist for `hold_time`
//! - cooldown: after firing, the lift signal is ignored entirely
//! - hysteresis: re-arming needs the knee to drop below `release_delta`,
//!   which sits strictly under `lift_delta`
//!
//! Missing or untrusted joints only zero the hold timer. They never count as
//! a release, and they never cancel a running cooldown.
//!
//! `TrunkLatch` turns the triggers into the trunk's open/closed state.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{ensure_positive, elapsed, Joint, VitrineError, VitrineResult};
use vitrine_tracking::JointSet;

/// Minimum cooldown, however low the configured value
pub const MIN_KICK_COOLDOWN: f32 = 0.05;

/// Which leg performs the kick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KickSide {
    Left,
    #[default]
    Right,
}

impl KickSide {
    fn joints(self) -> (Joint, Joint) {
        match self {
            KickSide::Left => (Joint::KneeLeft, Joint::HipLeft),
            KickSide::Right => (Joint::KneeRight, Joint::HipRight),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrunkKickConfig {
    pub side: KickSide,

    /// Seconds the lift must be held
    pub hold_time: f32,

    /// Seconds the detector ignores input after firing
    pub cooldown: f32,

    /// Knee height above hip (m) that counts as a lift
    pub lift_delta: f32,

    /// Knee height above hip (m) below which the detector re-arms
    pub release_delta: f32,

    /// Require `Tracked` knee and hip; inferred joints are not trusted
    pub strict_tracking: bool,

    /// Each kick flips the trunk; when false a kick only ever opens it
    pub toggle_mode: bool,
}

impl Default for TrunkKickConfig {
    fn default() -> Self {
        Self {
            side: KickSide::Right,
            hold_time: 0.25,
            cooldown: 1.2,
            lift_delta: 0.14,
            release_delta: 0.08,
            strict_tracking: true,
            toggle_mode: true,
        }
    }
}

impl TrunkKickConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("trunk_kick.hold_time", self.hold_time)?;
        if !self.cooldown.is_finite() {
            return Err(VitrineError::NonFinite {
                name: "trunk_kick.cooldown",
            });
        }
        if !(self.release_delta < self.lift_delta) {
            return Err(VitrineError::ThresholdOrder {
                name: "trunk_kick release/lift",
                lower: self.release_delta,
                upper: self.lift_delta,
            });
        }
        Ok(())
    }
}

/// Observable phase of the detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum KickPhase {
    /// Ready; accumulating hold time while lifted
    #[default]
    Armed,
    /// Fired recently; input ignored
    Cooldown,
    /// Cooldown over, waiting for the knee to drop below the release line
    AwaitingRelease,
}

/// Debounced knee-lift detector
#[derive(Debug)]
pub struct TrunkKickDetector {
    config: TrunkKickConfig,
    hold_timer: f32,
    cooldown_timer: f32,
    armed: bool,
}

impl TrunkKickDetector {
    pub fn new(config: TrunkKickConfig) -> Self {
        Self {
            config,
            hold_timer: 0.0,
            cooldown_timer: 0.0,
            armed: true,
        }
    }

    /// Advance one frame; true on the single frame the kick fires
    pub fn update(&mut self, joints: &JointSet, has_subject: bool, dt: f32) -> bool {
        if !has_subject {
            self.reset();
            return false;
        }

        if self.cooldown_timer > 0.0 {
            self.cooldown_timer -= dt;
            self.hold_timer = 0.0;
            return false;
        }

        let (knee_joint, hip_joint) = self.config.side.joints();
        let strict = self.config.strict_tracking;
        let (Some(knee), Some(hip)) = (
            joints.accepted(knee_joint, strict),
            joints.accepted(hip_joint, strict),
        ) else {
            self.hold_timer = 0.0;
            return false;
        };

        let delta = knee.y - hip.y;

        if !self.armed {
            if delta < self.config.release_delta {
                debug!(delta, "trunk kick re-armed");
                self.armed = true;
            }
            self.hold_timer = 0.0;
            return false;
        }

        if delta <= self.config.lift_delta {
            self.hold_timer = 0.0;
            return false;
        }

        self.hold_timer += dt;
        if !elapsed(self.hold_timer, self.config.hold_time) {
            return false;
        }

        debug!(delta, held = self.hold_timer, "trunk kick fired");
        self.cooldown_timer = self.config.cooldown.max(MIN_KICK_COOLDOWN);
        self.hold_timer = 0.0;
        self.armed = false;
        true
    }

    pub fn phase(&self) -> KickPhase {
        if self.cooldown_timer > 0.0 {
            KickPhase::Cooldown
        } else if self.armed {
            KickPhase::Armed
        } else {
            KickPhase::AwaitingRelease
        }
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn hold_timer(&self) -> f32 {
        self.hold_timer
    }

    pub fn cooldown_timer(&self) -> f32 {
        self.cooldown_timer
    }

    /// Back to armed with all timers cleared
    pub fn reset(&mut self) {
        self.hold_timer = 0.0;
        self.cooldown_timer = 0.0;
        self.armed = true;
    }
}

impl Default for TrunkKickDetector {
    fn default() -> Self {
        Self::new(TrunkKickConfig::default())
    }
}

/// Open/closed state of the trunk, driven by kicks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrunkLatch {
    toggle_mode: bool,
    open: bool,
}

impl TrunkLatch {
    /// Starts closed
    pub fn new(toggle_mode: bool) -> Self {
        Self {
            toggle_mode,
            open: false,
        }
    }

    /// Apply this frame's kick; returns the new state when it changes
    pub fn update(&mut self, kicked: bool) -> Option<bool> {
        if !kicked {
            return None;
        }
        let next = if self.toggle_mode { !self.open } else { true };
        self.set(next)
    }

    /// Close the trunk; returns `Some(false)` if it was open
    pub fn close(&mut self) -> Option<bool> {
        self.set(false)
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn set(&mut self, open: bool) -> Option<bool> {
        if open == self.open {
            return None;
        }
        self.open = open;
        debug!(open, "trunk");
        Some(open)
    }
}

impl Default for TrunkLatch {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::{TrackingState, Vec3};

    const DT: f32 = 1.0 / 60.0;

    fn legs(knee_above_hip: f32, state: TrackingState) -> JointSet {
        let mut joints = JointSet::default();
        joints.set(Joint::HipRight, Vec3::new(0.1, 0.9, 2.0), state);
        joints.set(
            Joint::KneeRight,
            Vec3::new(0.1, 0.9 + knee_above_hip, 1.8),
            state,
        );
        joints
    }

    fn run(detector: &mut TrunkKickDetector, joints: &JointSet, frames: usize) -> usize {
        (0..frames)
            .filter(|_| detector.update(joints, true, DT))
            .count()
    }

    #[test]
    fn test_fires_after_hold() {
        let mut detector = TrunkKickDetector::default();
        let lifted = legs(0.20, TrackingState::Tracked);

        // 0.25 s at 60 fps = 15 frames
        for _ in 0..14 {
            assert!(!detector.update(&lifted, true, DT));
        }
        assert!(detector.update(&lifted, true, DT));
        assert_eq!(detector.phase(), KickPhase::Cooldown);
    }

    #[test]
    fn test_short_lift_does_not_fire() {
        let mut detector = TrunkKickDetector::default();
        assert_eq!(run(&mut detector, &legs(0.20, TrackingState::Tracked), 10), 0);
        assert_eq!(run(&mut detector, &legs(0.0, TrackingState::Tracked), 1), 0);
        assert_eq!(detector.hold_timer(), 0.0);
    }

    #[test]
    fn test_long_hold_fires_once() {
        let mut detector = TrunkKickDetector::default();
        let lifted = legs(0.20, TrackingState::Tracked);

        // Ten times the hold duration, never dropping below release
        let frames = (10.0 * 0.25 / DT) as usize;
        assert_eq!(run(&mut detector, &lifted, frames), 1);
        assert_eq!(detector.phase(), KickPhase::AwaitingRelease);
    }

    #[test]
    fn test_oscillation_between_thresholds_does_not_rearm() {
        let mut detector = TrunkKickDetector::default();
        assert_eq!(run(&mut detector, &legs(0.20, TrackingState::Tracked), 100), 1);

        // Wobble between release (0.08) and lift (0.14)
        for i in 0..200 {
            let delta = if i % 2 == 0 { 0.10 } else { 0.16 };
            assert!(!detector.update(&legs(delta, TrackingState::Tracked), true, DT));
        }
        assert!(!detector.is_armed());
    }

    #[test]
    fn test_release_rearms_for_second_kick() {
        let mut detector = TrunkKickDetector::default();
        let lifted = legs(0.20, TrackingState::Tracked);
        let down = legs(0.0, TrackingState::Tracked);

        assert_eq!(run(&mut detector, &lifted, 100), 1);
        assert_eq!(run(&mut detector, &down, 5), 0);
        assert!(detector.is_armed());
        assert_eq!(run(&mut detector, &lifted, 20), 1);
    }

    #[test]
    fn test_release_ignored_during_cooldown() {
        let mut detector = TrunkKickDetector::default();
        assert_eq!(run(&mut detector, &legs(0.20, TrackingState::Tracked), 15), 1);

        // Knee drops straight away, but the cooldown is still running
        run(&mut detector, &legs(0.0, TrackingState::Tracked), 10);
        assert!(!detector.is_armed());
        assert_eq!(detector.phase(), KickPhase::Cooldown);
    }

    #[test]
    fn test_untrusted_joints_do_not_release() {
        let mut detector = TrunkKickDetector::default();
        assert_eq!(run(&mut detector, &legs(0.20, TrackingState::Tracked), 100), 1);

        // Inferred joints under strict tracking: no data, no re-arm
        run(&mut detector, &legs(0.0, TrackingState::Inferred), 30);
        assert!(!detector.is_armed());

        // Fully missing joints behave the same
        run(&mut detector, &JointSet::default(), 30);
        assert!(!detector.is_armed());
    }

    #[test]
    fn test_untrusted_joints_zero_hold() {
        let mut detector = TrunkKickDetector::default();
        run(&mut detector, &legs(0.20, TrackingState::Tracked), 10);
        run(&mut detector, &legs(0.20, TrackingState::Inferred), 1);
        assert_eq!(detector.hold_timer(), 0.0);
        assert!(detector.is_armed());
    }

    #[test]
    fn test_lenient_tracking_accepts_inferred() {
        let mut detector = TrunkKickDetector::new(TrunkKickConfig {
            strict_tracking: false,
            ..TrunkKickConfig::default()
        });
        assert_eq!(run(&mut detector, &legs(0.20, TrackingState::Inferred), 20), 1);
    }

    #[test]
    fn test_subject_loss_resets() {
        let mut detector = TrunkKickDetector::default();
        run(&mut detector, &legs(0.20, TrackingState::Tracked), 20);
        assert!(!detector.update(&JointSet::default(), false, DT));

        assert!(detector.is_armed());
        assert_eq!(detector.cooldown_timer(), 0.0);
        assert_eq!(detector.phase(), KickPhase::Armed);
    }

    #[test]
    fn test_trunk_toggles_on_each_kick() {
        let mut trunk = TrunkLatch::default();
        assert_eq!(trunk.update(false), None);
        assert_eq!(trunk.update(true), Some(true));
        assert!(trunk.is_open());
        assert_eq!(trunk.update(true), Some(false));
        assert!(!trunk.is_open());
    }

    #[test]
    fn test_trunk_open_only_mode() {
        let mut trunk = TrunkLatch::new(false);
        assert_eq!(trunk.update(true), Some(true));
        assert_eq!(trunk.update(true), None);
        assert!(trunk.is_open());

        assert_eq!(trunk.close(), Some(false));
        assert_eq!(trunk.close(), None);
    }

    #[test]
    fn test_config_rejects_inverted_hysteresis() {
        let config = TrunkKickConfig {
            release_delta: 0.14,
            lift_delta: 0.14,
            ..TrunkKickConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VitrineError::ThresholdOrder { .. })
        ));
    }
}
