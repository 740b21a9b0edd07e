//! Scripted sessions at a fixed frame step

use vitrine_core::{Skeleton, VitrineResult};
use vitrine_gesture::Intent;
use vitrine_runtime::{Engine, EngineConfig, EngineSnapshot};

use crate::noise::{NoiseConfig, NoisySensor};

/// Default frame step (60 fps)
pub const FRAME_DT: f32 = 1.0 / 60.0;

/// What happened during one scripted segment
#[derive(Debug, Clone, Default)]
pub struct SegmentReport {
    pub frames: usize,
    pub subject_frames: usize,
    pub power_pose_events: Vec<bool>,
    pub trunk_kicks: usize,
    pub trunk_events: Vec<bool>,
    pub color_steps: Vec<usize>,
    pub headlight_events: Vec<bool>,
    pub intents: Vec<Intent>,
    /// Snapshot after the last frame of the segment
    pub last: EngineSnapshot,
}

impl SegmentReport {
    fn record(&mut self, snapshot: &EngineSnapshot) {
        self.frames += 1;
        if snapshot.has_subject {
            self.subject_frames += 1;
        }
        self.power_pose_events.extend(snapshot.power_pose_changed);
        if snapshot.trunk_kick_triggered {
            self.trunk_kicks += 1;
        }
        self.trunk_events.extend(snapshot.trunk_changed);
        self.color_steps.extend(snapshot.color_step);
        self.headlight_events.extend(snapshot.headlights_changed);
        self.intents.push(snapshot.intent);
        self.last = snapshot.clone();
    }

    /// Frames whose intent was `intent`
    pub fn count(&self, intent: Intent) -> usize {
        self.intents.iter().filter(|i| **i == intent).count()
    }
}

/// Drives an engine through scripted segments
pub struct Scenario {
    engine: Engine,
    sensor: Option<NoisySensor>,
    dt: f32,
}

impl Scenario {
    pub fn new(config: EngineConfig) -> VitrineResult<Self> {
        Ok(Scenario {
            engine: Engine::new(config)?,
            sensor: None,
            dt: FRAME_DT,
        })
    }

    /// Pass every body through a seeded noisy sensor
    pub fn with_noise(mut self, noise: NoiseConfig, seed: u64) -> Self {
        self.sensor = Some(NoisySensor::new(noise, seed));
        self
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Run `frames` frames with the same bodies in view
    pub fn frames(&mut self, bodies: &[Skeleton], frames: usize) -> SegmentReport {
        let mut report = SegmentReport::default();
        for _ in 0..frames {
            let observed: Vec<Skeleton> = match self.sensor.as_mut() {
                Some(sensor) => bodies.iter().map(|b| sensor.observe(b)).collect(),
                None => bodies.to_vec(),
            };
            let snapshot = self.engine.tick(&observed, self.dt);
            report.record(snapshot);
        }
        report
    }

    /// Hold the same bodies for `seconds` of wall time
    pub fn hold(&mut self, bodies: &[Skeleton], seconds: f32) -> SegmentReport {
        let frames = (seconds / self.dt).round() as usize;
        self.frames(bodies, frames)
    }

    /// Nobody in view for `seconds`
    pub fn empty(&mut self, seconds: f32) -> SegmentReport {
        self.hold(&[], seconds)
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn snapshot(&self) -> &EngineSnapshot {
        self.engine.snapshot()
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Scenario {
            engine: Engine::default(),
            sensor: None,
            dt: FRAME_DT,
        }
    }
}
