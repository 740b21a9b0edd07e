//! Noisy sensor simulation
//!
//! Degrades clean synthetic skeletons the way a depth sensor does:
//! - Positional jitter
//! - Joints dropping to `NotTracked`
//! - Joints demoted to `Inferred`
//! - NaN positions reported as `Tracked`

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vitrine_core::{JointSample, Skeleton, TrackingState, Vec3};

/// Sensor noise configuration
#[derive(Clone, Debug)]
pub struct NoiseConfig {
    /// Uniform jitter amplitude per axis (meters)
    pub jitter: f32,
    /// Probability a joint is reported `NotTracked`
    pub dropout_prob: f64,
    /// Probability a tracked joint is demoted to `Inferred`
    pub inferred_prob: f64,
    /// Probability a joint position is NaN
    pub nan_prob: f64,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        NoiseConfig::mild()
    }
}

impl NoiseConfig {
    /// Clean signal
    pub fn none() -> Self {
        NoiseConfig {
            jitter: 0.0,
            dropout_prob: 0.0,
            inferred_prob: 0.0,
            nan_prob: 0.0,
        }
    }

    /// Jitter only; every joint keeps its state
    pub fn mild() -> Self {
        NoiseConfig {
            jitter: 0.01,
            dropout_prob: 0.0,
            inferred_prob: 0.0,
            nan_prob: 0.0,
        }
    }

    /// Bad lighting, partial occlusion
    pub fn harsh() -> Self {
        NoiseConfig {
            jitter: 0.04,
            dropout_prob: 0.05,
            inferred_prob: 0.10,
            nan_prob: 0.02,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct NoiseStats {
    pub joints_seen: u64,
    pub dropouts: u64,
    pub inferred: u64,
    pub nans: u64,
}

/// Seeded noisy sensor
pub struct NoisySensor {
    config: NoiseConfig,
    rng: StdRng,
    stats: NoiseStats,
}

impl NoisySensor {
    pub fn new(config: NoiseConfig, seed: u64) -> Self {
        NoisySensor {
            config,
            rng: StdRng::seed_from_u64(seed),
            stats: NoiseStats::default(),
        }
    }

    /// A degraded copy of `skeleton`
    pub fn observe(&mut self, skeleton: &Skeleton) -> Skeleton {
        let mut observed = skeleton.clone();
        for sample in observed.joints.iter_mut() {
            if sample.state == TrackingState::NotTracked {
                continue;
            }
            self.stats.joints_seen += 1;
            *sample = self.corrupt(*sample);
        }
        observed
    }

    pub fn stats(&self) -> &NoiseStats {
        &self.stats
    }

    fn corrupt(&mut self, sample: JointSample) -> JointSample {
        if self.rng.gen::<f64>() < self.config.nan_prob {
            self.stats.nans += 1;
            return JointSample::new(Vec3::NAN, sample.state);
        }
        if self.rng.gen::<f64>() < self.config.dropout_prob {
            self.stats.dropouts += 1;
            return JointSample::new(sample.position, TrackingState::NotTracked);
        }

        let mut state = sample.state;
        if state == TrackingState::Tracked && self.rng.gen::<f64>() < self.config.inferred_prob {
            self.stats.inferred += 1;
            state = TrackingState::Inferred;
        }

        JointSample::new(sample.position + self.jitter(), state)
    }

    fn jitter(&mut self) -> Vec3 {
        let amplitude = self.config.jitter;
        if amplitude <= 0.0 {
            return Vec3::ZERO;
        }
        Vec3::new(
            self.rng.gen_range(-amplitude..=amplitude),
            self.rng.gen_range(-amplitude..=amplitude),
            self.rng.gen_range(-amplitude..=amplitude),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SkeletonBuilder;
    use vitrine_core::Joint;

    #[test]
    fn test_clean_sensor_is_identity() {
        let skeleton = SkeletonBuilder::standing(1).build();
        let mut sensor = NoisySensor::new(NoiseConfig::none(), 1);
        assert_eq!(sensor.observe(&skeleton), skeleton);
    }

    #[test]
    fn test_same_seed_same_noise() {
        let skeleton = SkeletonBuilder::standing(1).build();
        let mut a = NoisySensor::new(NoiseConfig::harsh(), 42);
        let mut b = NoisySensor::new(NoiseConfig::harsh(), 42);
        for _ in 0..20 {
            let left = a.observe(&skeleton);
            let right = b.observe(&skeleton);
            for joint in Joint::ALL {
                assert_eq!(left.joint(joint).state, right.joint(joint).state);
            }
        }
    }

    #[test]
    fn test_jitter_stays_in_amplitude() {
        let skeleton = SkeletonBuilder::standing(1).build();
        let mut sensor = NoisySensor::new(NoiseConfig::mild(), 7);
        for _ in 0..50 {
            let observed = sensor.observe(&skeleton);
            for joint in Joint::ALL {
                let d = observed.joint(joint).position - skeleton.joint(joint).position;
                assert!(d.x.abs() <= 0.01 + 1e-6);
                assert!(d.y.abs() <= 0.01 + 1e-6);
            }
        }
    }

    #[test]
    fn test_harsh_noise_counts() {
        let skeleton = SkeletonBuilder::standing(1).build();
        let mut sensor = NoisySensor::new(NoiseConfig::harsh(), 3);
        for _ in 0..500 {
            sensor.observe(&skeleton);
        }
        let stats = sensor.stats();
        assert_eq!(stats.joints_seen, 500 * 20);
        assert!(stats.dropouts > 0);
        assert!(stats.nans > 0);
        assert!(stats.inferred > 0);
    }
}
