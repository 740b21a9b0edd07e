//! Per-joint 3D smoothing
//!
//! `FilterState` is a plain value: the stabilizer owns one per joint slot and
//! threads it through `JointFilter::update`, which has no hidden state.

use serde::{Deserialize, Serialize};
use vitrine_core::{ensure_positive, JointGroup, VitrineResult, Vec3};

use crate::damp::{decay, MIN_SMOOTH_TIME};

/// Smoothed position plus the spring's velocity for one joint slot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterState {
    pub position: Vec3,
    pub velocity: Vec3,
}

impl FilterState {
    /// A slot that has never received a finite target
    pub const UNSEEDED: FilterState = FilterState {
        position: Vec3::NAN,
        velocity: Vec3::ZERO,
    };

    /// At rest at `position`
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
        }
    }

    pub fn is_seeded(&self) -> bool {
        self.position.is_finite()
    }
}

impl Default for FilterState {
    fn default() -> Self {
        Self::UNSEEDED
    }
}

/// Critically damped smoothing towards a target position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointFilter {
    /// Approximate time (seconds) to close the gap to a new target
    pub time_constant: f32,

    /// Optional cap on joint speed (m/s)
    pub max_speed: Option<f32>,
}

impl JointFilter {
    pub fn new(time_constant: f32) -> Self {
        Self {
            time_constant,
            max_speed: None,
        }
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = Some(max_speed);
        self
    }

    /// Advance one frame towards `target`.
    ///
    /// A target with any non-finite coordinate is ignored: the state comes
    /// back untouched, velocity included. An unseeded state adopts the first
    /// finite target directly.
    pub fn update(&self, state: FilterState, target: Vec3, dt: f32) -> FilterState {
        if !target.is_finite() {
            return state;
        }
        if !state.is_seeded() {
            return FilterState::at(target);
        }
        if dt <= 0.0 {
            return state;
        }

        let smooth_time = self.time_constant.max(MIN_SMOOTH_TIME);
        let omega = 2.0 / smooth_time;
        let exp = decay(omega * dt);

        let mut change = state.position - target;
        if let Some(max_speed) = self.max_speed {
            change = change.clamp_length(max_speed * smooth_time);
        }
        let clamped_target = state.position - change;

        let temp = (state.velocity + change * omega) * dt;
        let mut velocity = (state.velocity - temp * omega) * exp;
        let mut position = clamped_target + (change + temp) * exp;

        // Overshoot guard
        let to_target = target - state.position;
        let past_target = position - target;
        if to_target.dot(&past_target) > 0.0 {
            position = target;
            velocity = Vec3::ZERO;
        }

        FilterState { position, velocity }
    }
}

/// Time constants per anatomical group.
///
/// Head and torso move slowly and jitter visibly, so they get more smoothing;
/// hands carry the gestures and need the least latency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingProfile {
    pub head: f32,
    pub torso: f32,
    pub arms: f32,
    pub legs: f32,

    /// Optional joint speed cap applied to every group (m/s)
    pub max_speed: Option<f32>,
}

impl Default for SmoothingProfile {
    fn default() -> Self {
        Self {
            head: 0.08,
            torso: 0.07,
            arms: 0.05,
            legs: 0.06,
            max_speed: None,
        }
    }
}

impl SmoothingProfile {
    /// Tighter constants for a subject standing close to the sensor,
    /// where jitter is smaller in absolute terms.
    pub fn responsive() -> Self {
        Self {
            head: 0.05,
            torso: 0.045,
            arms: 0.03,
            legs: 0.04,
            max_speed: None,
        }
    }

    pub fn time_constant(&self, group: JointGroup) -> f32 {
        match group {
            JointGroup::Head => self.head,
            JointGroup::Torso => self.torso,
            JointGroup::Arm => self.arms,
            JointGroup::Leg => self.legs,
        }
    }

    pub fn filter_for(&self, group: JointGroup) -> JointFilter {
        let filter = JointFilter::new(self.time_constant(group));
        match self.max_speed {
            Some(speed) => filter.with_max_speed(speed),
            None => filter,
        }
    }

    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("smoothing.head", self.head)?;
        ensure_positive("smoothing.torso", self.torso)?;
        ensure_positive("smoothing.arms", self.arms)?;
        ensure_positive("smoothing.legs", self.legs)?;
        if let Some(speed) = self.max_speed {
            ensure_positive("smoothing.max_speed", speed)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn settled(at: Vec3) -> FilterState {
        FilterState::at(at)
    }

    #[test]
    fn test_unseeded_adopts_first_target() {
        let filter = JointFilter::new(0.05);
        let target = Vec3::new(0.1, 1.2, 2.0);
        let state = filter.update(FilterState::UNSEEDED, target, DT);
        assert_eq!(state.position, target);
        assert_eq!(state.velocity, Vec3::ZERO);
    }

    #[test]
    fn test_converges_at_steady_state() {
        let filter = JointFilter::new(0.08);
        let target = Vec3::new(0.5, 1.0, -0.3);
        let mut state = settled(Vec3::ZERO);

        for _ in 0..120 {
            state = filter.update(state, target, DT);
        }

        assert!(state.position.distance(&target) < 1e-3);
        assert!(state.velocity.length() < 1e-2);
    }

    #[test]
    fn test_nan_target_is_noop() {
        let filter = JointFilter::new(0.05);
        let mut state = settled(Vec3::ZERO);
        for _ in 0..5 {
            state = filter.update(state, Vec3::new(1.0, 1.0, 1.0), DT);
        }

        let before = state;
        for _ in 0..30 {
            state = filter.update(state, Vec3::new(f32::NAN, 1.0, 1.0), DT);
        }

        assert_eq!(state, before);
    }

    #[test]
    fn test_max_speed_limits_step() {
        let filter = JointFilter::new(0.1).with_max_speed(1.0);
        let state = filter.update(settled(Vec3::ZERO), Vec3::new(10.0, 0.0, 0.0), DT);
        assert!(state.position.x < 0.1);
    }

    #[test]
    fn test_profile_groups() {
        let profile = SmoothingProfile::default();
        assert_eq!(profile.time_constant(JointGroup::Head), 0.08);
        assert_eq!(profile.time_constant(JointGroup::Arm), 0.05);
        assert!(profile.validate().is_ok());

        let bad = SmoothingProfile {
            legs: 0.0,
            ..SmoothingProfile::default()
        };
        assert!(bad.validate().is_err());
    }

    proptest! {
        #[test]
        fn prop_nan_streak_preserves_state(
            x in -2.0f32..2.0,
            y in -2.0f32..2.0,
            z in 0.5f32..4.5,
            streak in 1usize..50,
            axis in 0usize..3,
        ) {
            let filter = JointFilter::new(0.06);
            let mut state = settled(Vec3::ZERO);
            for _ in 0..10 {
                state = filter.update(state, Vec3::new(x, y, z), DT);
            }

            let before = state;
            let mut bad = Vec3::new(x, y, z);
            match axis {
                0 => bad.x = f32::NAN,
                1 => bad.y = f32::NAN,
                _ => bad.z = f32::NAN,
            }
            for _ in 0..streak {
                state = filter.update(state, bad, DT);
            }

            prop_assert_eq!(state, before);
        }
    }
}
