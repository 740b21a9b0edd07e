//! Rotation driver - arm openness to a smoothed yaw velocity
//!
//! Opening the left arm turns one way, the right arm the other; both open
//! cancel out. Outside the rotate intent the velocity eases back to zero
//! through the same filter, so a turn never stops dead.
//! `return_home` additionally eases the yaw back to `initial_yaw`.

use serde::{Deserialize, Serialize};
use vitrine_core::{
    ensure_positive, ensure_range, inverse_lerp, Joint, VitrineError, VitrineResult,
};
use vitrine_filter::Damped;
use vitrine_tracking::JointSet;

use crate::{Arbitration, Intent};

/// Below this the raw arm signal counts as zero
const RAW_EPSILON: f32 = 0.001;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RotationConfig {
    /// Degrees per second at full reach
    pub speed: f32,
    pub sensitivity: f32,

    /// Sideways hand offset from its shoulder ignored as noise (meters)
    pub arm_dead_zone: f32,

    /// Sideways offset that produces full speed (meters)
    pub full_reach: f32,

    /// A hand must be above the shoulder average plus this (negative = below)
    pub hand_above_shoulder: f32,

    pub smooth_time: f32,

    /// Cap on the change of yaw velocity (degrees per second)
    pub max_velocity: f32,

    /// Flip the turn direction
    pub invert: bool,

    /// Velocities below this do not move the yaw
    pub stop_threshold: f32,

    /// Yaw (degrees) at start and the one `return_home` eases back to
    pub initial_yaw: f32,

    /// Per-second blend rate of `return_home`
    pub home_rate: f32,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            speed: 44.0,
            sensitivity: 1.2,
            arm_dead_zone: 0.07,
            full_reach: 0.35,
            hand_above_shoulder: -0.03,
            smooth_time: 0.10,
            max_velocity: 150.0,
            invert: true,
            stop_threshold: 0.01,
            initial_yaw: 0.0,
            home_rate: 3.5,
        }
    }
}

impl RotationConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("rotation.speed", self.speed)?;
        ensure_positive("rotation.sensitivity", self.sensitivity)?;
        ensure_positive("rotation.smooth_time", self.smooth_time)?;
        ensure_positive("rotation.max_velocity", self.max_velocity)?;
        ensure_positive("rotation.home_rate", self.home_rate)?;
        if !self.initial_yaw.is_finite() {
            return Err(VitrineError::NonFinite {
                name: "rotation.initial_yaw",
            });
        }
        ensure_range("rotation.arm_reach", self.arm_dead_zone, self.full_reach)?;
        Ok(())
    }
}

/// Published rotation state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RotationOutput {
    /// Degrees per second
    pub yaw_velocity: f32,
    /// Accumulated yaw in degrees
    pub yaw: f32,
}

#[derive(Debug)]
pub struct RotationDriver {
    config: RotationConfig,
    velocity: Damped,
    yaw: f32,
}

impl RotationDriver {
    pub fn new(config: RotationConfig) -> Self {
        let yaw = config.initial_yaw;
        Self {
            config,
            velocity: Damped::default(),
            yaw,
        }
    }

    pub fn update(&mut self, arbitration: &Arbitration, joints: &JointSet, dt: f32) -> RotationOutput {
        let target = if arbitration.intent == Intent::Rotate && !arbitration.color_requested() {
            self.target_velocity(joints)
        } else {
            0.0
        };
        self.advance(target, dt)
    }

    /// Ease to a stop; used while nobody is tracked
    pub fn settle(&mut self, dt: f32) -> RotationOutput {
        self.advance(0.0, dt)
    }

    /// Stop turning and ease the yaw back to its initial value
    pub fn return_home(&mut self, dt: f32) -> RotationOutput {
        let c = &self.config;
        self.velocity
            .step(0.0, c.smooth_time, Some(c.max_velocity), dt);

        let blend = (dt * c.home_rate).clamp(0.0, 1.0);
        self.yaw += (c.initial_yaw - self.yaw) * blend;
        self.output()
    }

    pub fn output(&self) -> RotationOutput {
        RotationOutput {
            yaw_velocity: self.velocity.value,
            yaw: self.yaw,
        }
    }

    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
        self.velocity.snap(0.0);
    }

    fn advance(&mut self, target: f32, dt: f32) -> RotationOutput {
        let c = &self.config;
        let velocity = self
            .velocity
            .step(target, c.smooth_time, Some(c.max_velocity), dt);

        if velocity.abs() >= c.stop_threshold {
            self.yaw += velocity * dt;
        }
        self.output()
    }

    /// Signed degrees per second the arms currently ask for
    fn target_velocity(&self, joints: &JointSet) -> f32 {
        let hand_l = joints.position(Joint::HandLeft);
        let hand_r = joints.position(Joint::HandRight);
        let shoulder_l = joints.position(Joint::ShoulderLeft);
        let shoulder_r = joints.position(Joint::ShoulderRight);
        if ![hand_l, hand_r, shoulder_l, shoulder_r]
            .iter()
            .all(|p| p.is_finite())
        {
            return 0.0;
        }

        let c = &self.config;
        let band = 0.5 * (shoulder_l.y + shoulder_r.y) + c.hand_above_shoulder;
        if hand_l.y <= band && hand_r.y <= band {
            return 0.0;
        }

        let left_open = hand_l.x - shoulder_l.x;
        let right_open = hand_r.x - shoulder_r.x;

        let mut raw = 0.0;
        if left_open < -c.arm_dead_zone {
            raw -= inverse_lerp(-c.arm_dead_zone, -c.full_reach, left_open);
        }
        if right_open > c.arm_dead_zone {
            raw += inverse_lerp(c.arm_dead_zone, c.full_reach, right_open);
        }
        if c.invert {
            raw = -raw;
        }

        if raw.abs() > RAW_EPSILON {
            raw * c.speed * c.sensitivity
        } else {
            0.0
        }
    }
}

impl Default for RotationDriver {
    fn default() -> Self {
        Self::new(RotationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::Vec3;

    const DT: f32 = 1.0 / 60.0;

    fn arms(left_x: f32, right_x: f32) -> JointSet {
        JointSet::from_tracked(&[
            (Joint::ShoulderLeft, Vec3::new(-0.18, 1.42, 2.0)),
            (Joint::ShoulderRight, Vec3::new(0.18, 1.42, 2.0)),
            (Joint::HandLeft, Vec3::new(left_x, 1.40, 2.0)),
            (Joint::HandRight, Vec3::new(right_x, 1.40, 2.0)),
        ])
    }

    fn rotating() -> Arbitration {
        Arbitration {
            intent: Intent::Rotate,
            ..Arbitration::default()
        }
    }

    fn run(driver: &mut RotationDriver, arbitration: &Arbitration, joints: &JointSet, frames: usize) -> RotationOutput {
        let mut out = driver.output();
        for _ in 0..frames {
            out = driver.update(arbitration, joints, DT);
        }
        out
    }

    #[test]
    fn test_right_arm_full_reach() {
        let mut driver = RotationDriver::new(RotationConfig {
            invert: false,
            ..RotationConfig::default()
        });
        // 0.18 + 0.40: beyond full reach
        let out = run(&mut driver, &rotating(), &arms(-0.18, 0.58), 120);
        assert!((out.yaw_velocity - 44.0 * 1.2).abs() < 0.1);
        assert!(out.yaw > 0.0);
    }

    #[test]
    fn test_inverted_by_default() {
        let mut driver = RotationDriver::default();
        let out = run(&mut driver, &rotating(), &arms(-0.18, 0.58), 120);
        assert!(out.yaw_velocity < 0.0);
    }

    #[test]
    fn test_both_arms_cancel() {
        let mut driver = RotationDriver::default();
        let out = run(&mut driver, &rotating(), &arms(-0.58, 0.58), 60);
        assert_eq!(out.yaw_velocity, 0.0);
        assert_eq!(out.yaw, 0.0);
    }

    #[test]
    fn test_dead_zone() {
        let mut driver = RotationDriver::default();
        let out = run(&mut driver, &rotating(), &arms(-0.18, 0.24), 60);
        assert_eq!(out.yaw_velocity, 0.0);
    }

    #[test]
    fn test_hands_low_do_not_rotate() {
        let mut driver = RotationDriver::default();
        let joints = JointSet::from_tracked(&[
            (Joint::ShoulderLeft, Vec3::new(-0.18, 1.42, 2.0)),
            (Joint::ShoulderRight, Vec3::new(0.18, 1.42, 2.0)),
            (Joint::HandLeft, Vec3::new(-0.2, 0.9, 2.0)),
            (Joint::HandRight, Vec3::new(0.6, 0.9, 2.0)),
        ]);
        let out = run(&mut driver, &rotating(), &joints, 60);
        assert_eq!(out.yaw_velocity, 0.0);
    }

    #[test]
    fn test_eases_to_zero_outside_intent() {
        let mut driver = RotationDriver::default();
        let joints = arms(-0.18, 0.58);
        run(&mut driver, &rotating(), &joints, 60);
        let spinning = driver.output().yaw_velocity.abs();

        let out = driver.update(&Arbitration::default(), &joints, DT);
        assert!(out.yaw_velocity.abs() < spinning);
        assert!(out.yaw_velocity.abs() > 0.0);

        let out = run(&mut driver, &Arbitration::default(), &joints, 120);
        assert!(out.yaw_velocity.abs() < 0.01);
    }

    #[test]
    fn test_shadowed_color_stops_rotation() {
        let mut driver = RotationDriver::default();
        let arbitration = Arbitration {
            color_shadowed: true,
            ..rotating()
        };
        let out = run(&mut driver, &arbitration, &arms(-0.18, 0.58), 60);
        assert_eq!(out.yaw_velocity, 0.0);
    }

    #[test]
    fn test_settle() {
        let mut driver = RotationDriver::default();
        run(&mut driver, &rotating(), &arms(-0.18, 0.58), 60);
        for _ in 0..120 {
            driver.settle(DT);
        }
        assert!(driver.output().yaw_velocity.abs() < 0.01);
    }

    #[test]
    fn test_return_home() {
        let mut driver = RotationDriver::default();
        run(&mut driver, &rotating(), &arms(-0.18, 0.58), 60);
        let turned = driver.output().yaw;
        assert!(turned.abs() > 1.0);

        let out = driver.return_home(DT);
        assert!(out.yaw.abs() < turned.abs());

        for _ in 0..300 {
            driver.return_home(DT);
        }
        let out = driver.output();
        assert!(out.yaw.abs() < 1e-3);
        assert!(out.yaw_velocity.abs() < 0.01);
    }

    #[test]
    fn test_starts_at_initial_yaw() {
        let driver = RotationDriver::new(RotationConfig {
            initial_yaw: 90.0,
            ..RotationConfig::default()
        });
        assert_eq!(driver.output().yaw, 90.0);
    }
}
