//! Color cycle - one palette step per raised-hand request

use serde::{Deserialize, Serialize};
use tracing::debug;
use vitrine_core::{elapsed, ensure_positive, VitrineError, VitrineResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorConfig {
    /// Number of palette entries to cycle through
    pub palette_size: usize,

    /// Minimum seconds between two steps
    pub cooldown: f32,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            palette_size: 4,
            cooldown: 1.0,
        }
    }
}

impl ColorConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        if self.palette_size == 0 {
            return Err(VitrineError::NonPositive {
                name: "color.palette_size",
                value: 0.0,
            });
        }
        ensure_positive("color.cooldown", self.cooldown)
    }
}

/// Edge-triggered palette stepper.
///
/// A request that arrives during the cooldown is consumed: keeping the hand
/// up does not fire later once the cooldown runs out.
#[derive(Debug)]
pub struct ColorCycle {
    config: ColorConfig,
    index: usize,
    since_step: f32,
    was_requested: bool,
}

impl ColorCycle {
    pub fn new(config: ColorConfig) -> Self {
        let since_step = config.cooldown;
        Self {
            config,
            index: 0,
            since_step,
            was_requested: false,
        }
    }

    /// Returns the new palette index on the frame it changes
    pub fn update(&mut self, requested: bool, dt: f32) -> Option<usize> {
        self.since_step += dt;

        let rising = requested && !self.was_requested;
        self.was_requested = requested;

        if !rising || !elapsed(self.since_step, self.config.cooldown) {
            return None;
        }

        self.index = (self.index + 1) % self.config.palette_size.max(1);
        self.since_step = 0.0;
        debug!(index = self.index, "color step");
        Some(self.index)
    }

    pub fn index(&self) -> usize {
        self.index
    }
}

impl Default for ColorCycle {
    fn default() -> Self {
        Self::new(ColorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_rising_edge_steps_once() {
        let mut cycle = ColorCycle::default();
        assert_eq!(cycle.update(true, DT), Some(1));
        for _ in 0..120 {
            assert_eq!(cycle.update(true, DT), None);
        }
    }

    #[test]
    fn test_cooldown_swallows_request() {
        let mut cycle = ColorCycle::default();
        assert_eq!(cycle.update(true, DT), Some(1));
        cycle.update(false, DT);

        // Second raise within the cooldown
        assert_eq!(cycle.update(true, DT), None);
        for _ in 0..90 {
            assert_eq!(cycle.update(true, DT), None);
        }

        cycle.update(false, DT);
        assert_eq!(cycle.update(true, DT), Some(2));
    }

    #[test]
    fn test_wraps_around_palette() {
        let mut cycle = ColorCycle::new(ColorConfig {
            palette_size: 2,
            cooldown: 0.1,
        });
        let mut steps = Vec::new();
        for _ in 0..3 {
            steps.extend(cycle.update(true, 0.2));
            cycle.update(false, 0.2);
        }
        assert_eq!(steps, vec![1, 0, 1]);
    }

    #[test]
    fn test_empty_palette_rejected() {
        let config = ColorConfig {
            palette_size: 0,
            ..ColorConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
