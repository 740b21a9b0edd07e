//! Zoom lock - continuous mapping from hand distance to a bounded output
//!
//! ```text
//!   Idle ──(Zoom intent + entry pose)──► Locking ──(hold elapsed)──► Locked
//!    ▲                                      │                           │
//!    └──────────(pose dropped)──────────────┘                           │
//!    └──────────────────(pose absent longer than grace)─────────────────┘
//! ```
//!
//! At lock time a baseline output and a baseline hand distance are captured.
//! While locked, hands together maps to the baseline and hands fully apart
//! maps to the far end of the output range. Near the hands-together end a
//! return assist pulls the target onto the baseline so noisy input still
//! lands exactly where the gesture started.
//!
//! The output value is held while idle; only the lock state is reset.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use vitrine_core::{
    elapsed, ensure_positive, ensure_range, inverse_lerp, Joint, VitrineError, VitrineResult,
};
use vitrine_filter::Damped;
use vitrine_tracking::JointSet;

use crate::Intent;

/// Closed interval `[min, max]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f32,
    pub max: f32,
}

impl ValueRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }

    /// Position of `value` inside the range, clamped to [0, 1]
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        inverse_lerp(self.min, self.max, self.clamp(value))
    }

    pub fn validate(&self, name: &'static str) -> VitrineResult<()> {
        ensure_range(name, self.min, self.max)
    }
}

/// How far the participant stands from the sensor; picks the output range
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum DistanceProfile {
    /// About 1 m
    Near,
    /// About 2 m
    Mid,
    /// About 3 m
    #[default]
    Far,
    Custom(ValueRange),
}

impl DistanceProfile {
    pub fn range(&self) -> ValueRange {
        match self {
            DistanceProfile::Near => ValueRange::new(1.3, 3.2),
            DistanceProfile::Mid => ValueRange::new(1.6, 4.0),
            DistanceProfile::Far => ValueRange::new(1.8, 4.8),
            DistanceProfile::Custom(range) => *range,
        }
    }
}

/// Which output value becomes the baseline when the lock engages
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BaselineMode {
    /// Whatever the output currently is
    CurrentOutput,
    /// The top of the output range, so closing the hands always returns there
    #[default]
    RangeMax,
    /// A fixed value, clamped into the output range
    Fixed(f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub profile: DistanceProfile,
    pub baseline: BaselineMode,

    // Entry pose (meters, relative to spine-mid; "in front" is towards the sensor)
    pub entry_above_spine_mid: f32,
    pub entry_in_front_of_spine_mid: f32,
    pub entry_min_hands_distance: f32,

    /// Seconds the entry pose must be held before locking
    pub lock_hold_time: f32,

    /// Seconds the pose may be absent while locked
    pub lost_pose_grace: f32,

    /// Expected hand distance span of a person (meters)
    pub human_range: ValueRange,

    /// Exponent applied to the normalized hand distance
    pub response_power: f32,

    pub hands_smooth_time: f32,
    pub output_smooth_time: f32,

    /// Scales how much of the output range the hands can cover
    pub range_multiplier: f32,

    /// Normalized distance below which the return assist kicks in
    pub return_assist_zone: f32,
    pub return_assist_strength: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            profile: DistanceProfile::Far,
            baseline: BaselineMode::RangeMax,
            entry_above_spine_mid: 0.04,
            entry_in_front_of_spine_mid: 0.06,
            entry_min_hands_distance: 0.20,
            lock_hold_time: 1.2,
            lost_pose_grace: 0.25,
            human_range: ValueRange::new(0.22, 0.75),
            response_power: 1.35,
            hands_smooth_time: 0.16,
            output_smooth_time: 0.18,
            range_multiplier: 1.0,
            return_assist_zone: 0.12,
            return_assist_strength: 10.0,
        }
    }
}

impl ZoomConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        self.profile.range().validate("zoom.output_range")?;
        self.human_range.validate("zoom.human_range")?;
        ensure_positive("zoom.entry_min_hands_distance", self.entry_min_hands_distance)?;
        ensure_positive("zoom.lock_hold_time", self.lock_hold_time)?;
        ensure_positive("zoom.lost_pose_grace", self.lost_pose_grace)?;
        ensure_positive("zoom.response_power", self.response_power)?;
        ensure_positive("zoom.hands_smooth_time", self.hands_smooth_time)?;
        ensure_positive("zoom.output_smooth_time", self.output_smooth_time)?;
        ensure_positive("zoom.return_assist_zone", self.return_assist_zone)?;
        if !self.range_multiplier.is_finite() {
            return Err(VitrineError::NonFinite {
                name: "zoom.range_multiplier",
            });
        }
        if !self.return_assist_strength.is_finite() {
            return Err(VitrineError::NonFinite {
                name: "zoom.return_assist_strength",
            });
        }
        if let BaselineMode::Fixed(value) = self.baseline {
            if !value.is_finite() {
                return Err(VitrineError::NonFinite {
                    name: "zoom.baseline",
                });
            }
        }
        Ok(())
    }
}

/// Observable state of the lock
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ZoomPhase {
    #[default]
    Idle,
    Locking,
    Locked,
}

/// Zoom lock state machine and output mapper
#[derive(Debug)]
pub struct ZoomLock {
    config: ZoomConfig,
    range: ValueRange,
    locked: bool,
    lock_timer: f32,
    lost_pose_timer: f32,
    /// NaN until the first entry-pose frame
    hands: Damped,
    output: Damped,
    baseline_output: f32,
    baseline_hands: f32,
}

impl ZoomLock {
    pub fn new(config: ZoomConfig) -> Self {
        let range = config.profile.range();
        Self {
            config,
            range,
            locked: false,
            lock_timer: 0.0,
            lost_pose_timer: 0.0,
            hands: Damped::new(f32::NAN),
            output: Damped::new(range.max),
            baseline_output: 0.0,
            baseline_hands: 0.0,
        }
    }

    /// Advance one frame and return the output value
    pub fn update(&mut self, intent: Intent, joints: &JointSet, has_subject: bool, dt: f32) -> f32 {
        if !has_subject {
            self.reset();
            return self.output.value;
        }

        if intent != Intent::Zoom {
            if self.locked {
                self.lose_pose(dt);
            } else {
                self.lock_timer = 0.0;
                self.lost_pose_timer = 0.0;
                self.hands.velocity = 0.0;
            }
            return self.output.value;
        }

        let Some(hands_distance) = self.entry_pose(joints) else {
            self.reset();
            return self.output.value;
        };

        if !self.locked {
            match hands_distance {
                Some(distance) => self.accumulate_lock(distance, dt),
                None => {
                    self.lock_timer = 0.0;
                    self.lost_pose_timer = 0.0;
                    self.hands.velocity = 0.0;
                }
            }
            return self.output.value;
        }

        match hands_distance {
            Some(distance) => {
                self.lost_pose_timer = 0.0;
                self.map(distance, dt)
            }
            None => {
                self.lose_pose(dt);
                self.output.value
            }
        }
    }

    pub fn phase(&self) -> ZoomPhase {
        if self.locked {
            ZoomPhase::Locked
        } else if self.lock_timer > 0.0 {
            ZoomPhase::Locking
        } else {
            ZoomPhase::Idle
        }
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Current output value
    pub fn value(&self) -> f32 {
        self.output.value
    }

    pub fn range(&self) -> ValueRange {
        self.range
    }

    /// Baseline `(output, hands distance)` captured at lock time
    pub fn baseline(&self) -> Option<(f32, f32)> {
        self.locked
            .then_some((self.baseline_output, self.baseline_hands))
    }

    /// Jump the output to a value (clamped into range) with no motion
    pub fn force_output(&mut self, value: f32) {
        self.output.snap(self.range.clamp(value));
    }

    /// Unlock and clear every timer and filter. The output value is kept.
    pub fn reset(&mut self) {
        if self.locked {
            debug!(output = self.output.value, "zoom unlocked");
        }
        self.locked = false;
        self.lock_timer = 0.0;
        self.lost_pose_timer = 0.0;
        self.hands = Damped::new(f32::NAN);
        self.output.velocity = 0.0;
        self.baseline_output = 0.0;
        self.baseline_hands = 0.0;
    }

    /// `None` when the joints are unusable, `Some(None)` when the pose is not
    /// held, `Some(Some(distance))` when it is.
    fn entry_pose(&self, joints: &JointSet) -> Option<Option<f32>> {
        let hand_l = joints.position(Joint::HandLeft);
        let hand_r = joints.position(Joint::HandRight);
        let spine_mid = joints.position(Joint::SpineMid);
        if !(hand_l.is_finite() && hand_r.is_finite() && spine_mid.is_finite()) {
            return None;
        }

        let c = &self.config;
        let distance = hand_l.distance(&hand_r);
        let above = spine_mid.y + c.entry_above_spine_mid;
        let front = spine_mid.z - c.entry_in_front_of_spine_mid;

        let held = hand_l.y > above
            && hand_r.y > above
            && hand_l.z < front
            && hand_r.z < front
            && distance >= c.entry_min_hands_distance;

        Some(held.then_some(distance))
    }

    fn accumulate_lock(&mut self, distance: f32, dt: f32) {
        self.lock_timer += dt;
        self.filter_hands(distance, dt);

        if !elapsed(self.lock_timer, self.config.lock_hold_time) {
            return;
        }

        self.locked = true;
        self.lost_pose_timer = 0.0;
        self.baseline_output = match self.config.baseline {
            BaselineMode::CurrentOutput => self.range.clamp(self.output.value),
            BaselineMode::RangeMax => self.range.max,
            BaselineMode::Fixed(value) => self.range.clamp(value),
        };
        self.baseline_hands = self.config.human_range.clamp(self.hands.value);
        self.output.snap(self.baseline_output);

        debug!(
            baseline = self.baseline_output,
            hands = self.baseline_hands,
            "zoom locked"
        );
    }

    fn lose_pose(&mut self, dt: f32) {
        self.lost_pose_timer += dt;
        if elapsed(self.lost_pose_timer, self.config.lost_pose_grace) {
            self.reset();
        }
    }

    fn filter_hands(&mut self, distance: f32, dt: f32) -> f32 {
        if !self.hands.value.is_finite() {
            self.hands.snap(distance);
            return distance;
        }
        self.hands
            .step(distance, self.config.hands_smooth_time, None, dt)
    }

    fn map(&mut self, distance: f32, dt: f32) -> f32 {
        let filtered = self.filter_hands(distance, dt);
        let c = &self.config;

        let t = c
            .human_range
            .normalize(filtered)
            .powf(c.response_power)
            .clamp(0.0, 1.0);

        let full_range = ((self.baseline_output - self.range.min) * c.range_multiplier).max(0.0);
        let mut target = self.range.clamp(self.baseline_output - t * full_range);

        if t < c.return_assist_zone {
            let pull = 1.0 - inverse_lerp(0.0, c.return_assist_zone, t);
            let blend = (dt * c.return_assist_strength * pull).clamp(0.0, 1.0);
            target += (self.baseline_output - target) * blend;
        }

        let value = self
            .output
            .step(target, c.output_smooth_time, None, dt);
        let value = self.range.clamp(value);
        self.output.value = value;

        trace!(hands = distance, filtered, t, target, output = value, "zoom mapping");
        value
    }
}

impl Default for ZoomLock {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Vec3;

    const DT: f32 = 1.0 / 60.0;

    /// Hands raised in front of the chest, `spread` meters apart
    fn pose(spread: f32) -> JointSet {
        JointSet::from_tracked(&[
            (Joint::SpineMid, Vec3::new(0.0, 1.15, 2.0)),
            (Joint::HandLeft, Vec3::new(-spread / 2.0, 1.40, 1.70)),
            (Joint::HandRight, Vec3::new(spread / 2.0, 1.40, 1.70)),
        ])
    }

    fn hands_down() -> JointSet {
        JointSet::from_tracked(&[
            (Joint::SpineMid, Vec3::new(0.0, 1.15, 2.0)),
            (Joint::HandLeft, Vec3::new(-0.2, 0.9, 2.0)),
            (Joint::HandRight, Vec3::new(0.2, 0.9, 2.0)),
        ])
    }

    fn run(zoom: &mut ZoomLock, intent: Intent, joints: &JointSet, frames: usize) -> f32 {
        let mut value = zoom.value();
        for _ in 0..frames {
            value = zoom.update(intent, joints, true, DT);
        }
        value
    }

    /// 1.2 s at 60 fps
    const HOLD_FRAMES: usize = 72;

    #[test]
    fn test_locks_after_exact_hold() {
        let mut zoom = ZoomLock::default();
        let joints = pose(0.4);

        run(&mut zoom, Intent::Zoom, &joints, HOLD_FRAMES - 1);
        assert_eq!(zoom.phase(), ZoomPhase::Locking);

        run(&mut zoom, Intent::Zoom, &joints, 1);
        assert_eq!(zoom.phase(), ZoomPhase::Locked);

        let (baseline, hands) = zoom.baseline().unwrap();
        assert_eq!(baseline, 4.8);
        assert!((hands - 0.4).abs() < 1e-4);
    }

    #[test]
    fn test_idle_without_zoom_intent() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Rotate, &pose(0.4), 200);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);
        assert_eq!(zoom.value(), 4.8);
    }

    #[test]
    fn test_interrupted_hold_starts_over() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES - 10);
        run(&mut zoom, Intent::None, &hands_down(), 1);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);

        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES - 1);
        assert!(!zoom.is_locked());
    }

    #[test]
    fn test_hands_apart_zooms_in_and_together_returns() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);
        assert!(zoom.is_locked());

        // Fully apart: the far end of the range
        let opened = run(&mut zoom, Intent::Zoom, &pose(0.80), 180);
        assert!((opened - 1.8).abs() < 0.01, "opened = {opened}");

        // Hands back together: the baseline
        let closed = run(&mut zoom, Intent::Zoom, &pose(0.22), 180);
        assert!((closed - 4.8).abs() < 0.01, "closed = {closed}");
        assert!(zoom.is_locked());
    }

    #[test]
    fn test_output_stays_in_range() {
        let mut zoom = ZoomLock::new(ZoomConfig {
            range_multiplier: 3.0,
            ..ZoomConfig::default()
        });
        run(&mut zoom, Intent::Zoom, &pose(0.3), HOLD_FRAMES);
        for i in 0..300 {
            let spread = if i % 20 < 10 { 0.21 } else { 1.5 };
            let v = zoom.update(Intent::Zoom, &pose(spread), true, DT);
            assert!((1.8..=4.8).contains(&v), "v = {v}");
        }
    }

    #[test]
    fn test_brief_occlusion_keeps_lock() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);

        // 10 frames < 0.25 s
        run(&mut zoom, Intent::None, &hands_down(), 10);
        assert!(zoom.is_locked());

        run(&mut zoom, Intent::Zoom, &pose(0.4), 1);
        assert!(zoom.is_locked());
    }

    #[test]
    fn test_grace_expiry_requires_full_hold_again() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);
        run(&mut zoom, Intent::Zoom, &pose(0.8), 60);
        let held_value = zoom.value();

        // 20 frames > 0.25 s
        run(&mut zoom, Intent::None, &hands_down(), 20);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);
        assert_eq!(zoom.value(), held_value);

        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES - 1);
        assert_eq!(zoom.phase(), ZoomPhase::Locking);
        run(&mut zoom, Intent::Zoom, &pose(0.4), 1);
        assert_eq!(zoom.phase(), ZoomPhase::Locked);
    }

    #[test]
    fn test_pose_lost_under_zoom_intent_uses_grace() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);

        // Hands too close for the entry pose
        run(&mut zoom, Intent::Zoom, &pose(0.1), 10);
        assert!(zoom.is_locked());
        run(&mut zoom, Intent::Zoom, &pose(0.1), 10);
        assert!(!zoom.is_locked());
    }

    #[test]
    fn test_hands_behind_torso_never_lock() {
        let mut zoom = ZoomLock::default();
        let behind = JointSet::from_tracked(&[
            (Joint::SpineMid, Vec3::new(0.0, 1.15, 2.0)),
            (Joint::HandLeft, Vec3::new(-0.2, 1.40, 2.30)),
            (Joint::HandRight, Vec3::new(0.2, 1.40, 2.30)),
        ]);
        run(&mut zoom, Intent::Zoom, &behind, HOLD_FRAMES * 2);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);
    }

    #[test]
    fn test_subject_loss_resets_immediately() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);
        zoom.update(Intent::None, &JointSet::default(), false, DT);
        assert_eq!(zoom.phase(), ZoomPhase::Idle);
        assert_eq!(zoom.baseline(), None);
    }

    #[test]
    fn test_missing_hands_reset() {
        let mut zoom = ZoomLock::default();
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);
        zoom.update(Intent::Zoom, &JointSet::default(), true, DT);
        assert!(!zoom.is_locked());
    }

    #[test]
    fn test_current_output_baseline() {
        let mut zoom = ZoomLock::new(ZoomConfig {
            baseline: BaselineMode::CurrentOutput,
            profile: DistanceProfile::Mid,
            ..ZoomConfig::default()
        });
        zoom.force_output(3.0);
        run(&mut zoom, Intent::Zoom, &pose(0.4), HOLD_FRAMES);
        assert_eq!(zoom.baseline().map(|(b, _)| b), Some(3.0));
    }

    #[test]
    fn test_force_output_clamps() {
        let mut zoom = ZoomLock::default();
        zoom.force_output(100.0);
        assert_eq!(zoom.value(), 4.8);
        zoom.force_output(-1.0);
        assert_eq!(zoom.value(), 1.8);
    }

    #[test]
    fn test_profiles() {
        assert_eq!(DistanceProfile::Near.range(), ValueRange::new(1.3, 3.2));
        assert_eq!(DistanceProfile::Mid.range(), ValueRange::new(1.6, 4.0));
        assert_eq!(DistanceProfile::default().range(), ValueRange::new(1.8, 4.8));
    }

    #[test]
    fn test_config_rejects_inverted_human_range() {
        let config = ZoomConfig {
            human_range: ValueRange::new(0.8, 0.2),
            ..ZoomConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(VitrineError::InvalidRange { .. })
        ));
    }
}
