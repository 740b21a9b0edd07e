//! vitrine Engine - per-frame pipeline implementation

use std::path::Path;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use vitrine_core::{ensure_positive, FrameDelta, Skeleton, SubjectId, VitrineError, VitrineResult};
use vitrine_filter::SmoothingProfile;
use vitrine_gesture::{
    Arbitration, Candidates, ColorConfig, ColorCycle, HeadTurnConfig, HeadTurnLatch, Intent,
    IntentArbitrator, IntentConfig, KickPhase, RotationConfig, RotationDriver, RotationOutput,
    TrunkKickConfig, TrunkKickDetector, TrunkLatch, ZoomConfig, ZoomLock, ZoomPhase,
};
use vitrine_tracking::{JointSet, StabilizerConfig, TrackingStabilizer};

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub stabilizer: StabilizerConfig,
    pub intent: IntentConfig,
    pub trunk_kick: TrunkKickConfig,
    pub zoom: ZoomConfig,
    pub rotation: RotationConfig,
    pub color: ColorConfig,
    pub head_turn: HeadTurnConfig,

    /// Largest frame delta (seconds) fed to the timers; longer frames are clamped
    pub max_frame_delta: f32,

    /// Once the subject is dropped: headlights off, trunk closed, yaw eased home.
    /// Zoom is held either way
    pub reset_on_subject_lost: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            stabilizer: StabilizerConfig::default(),
            intent: IntentConfig::default(),
            trunk_kick: TrunkKickConfig::default(),
            zoom: ZoomConfig::default(),
            rotation: RotationConfig::default(),
            color: ColorConfig::default(),
            head_turn: HeadTurnConfig::default(),
            max_frame_delta: 0.25,
            reset_on_subject_lost: true,
        }
    }
}

impl EngineConfig {
    /// Shorter smoothing everywhere, for a participant standing close
    pub fn responsive() -> Self {
        let mut config = Self::default();
        config.stabilizer.smoothing = SmoothingProfile::responsive();
        config
    }

    pub fn validate(&self) -> VitrineResult<()> {
        self.stabilizer.validate()?;
        self.intent.validate()?;
        self.trunk_kick.validate()?;
        self.zoom.validate()?;
        self.rotation.validate()?;
        self.color.validate()?;
        self.head_turn.validate()?;
        ensure_positive("max_frame_delta", self.max_frame_delta)?;
        Ok(())
    }

    /// Parse a (possibly partial) JSON document; missing fields keep defaults
    pub fn from_json_str(json: &str) -> VitrineResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| VitrineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> VitrineResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// Everything the presentation layer reads after a tick
#[derive(Debug, Clone, Default, Serialize)]
pub struct EngineSnapshot {
    /// Ticks since the engine was created
    pub frame: u64,

    pub has_subject: bool,
    pub subject_id: Option<SubjectId>,
    pub joints: JointSet,

    pub is_power_pose: bool,
    /// New power-pose value, only on the frame it changed
    pub power_pose_changed: Option<bool>,

    pub intent: Intent,
    pub candidates: Candidates,

    /// True for exactly one frame per kick
    pub trunk_kick_triggered: bool,
    pub trunk_kick_phase: KickPhase,
    pub trunk_open: bool,
    /// New trunk state, only on the frame it changed
    pub trunk_changed: Option<bool>,

    pub zoom_value: f32,
    pub zoom_phase: ZoomPhase,

    pub rotation: RotationOutput,

    /// New palette index, only on the frame it changed
    pub color_step: Option<usize>,
    pub color_index: usize,

    pub headlights_on: bool,
    /// New headlight value, only on the frame it changed
    pub headlights_changed: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct EngineStats {
    pub ticks: u64,
    pub subject_frames: u64,
    pub rejected_deltas: u64,
    pub clamped_deltas: u64,
    pub trunk_kicks: u64,
    pub color_steps: u64,
    pub last_tick_duration: Duration,
}

/// Gesture engine - owns every filter and state machine exclusively
#[derive(Debug)]
pub struct Engine {
    config: EngineConfig,
    stabilizer: TrackingStabilizer,
    arbitrator: IntentArbitrator,
    trunk_kick: TrunkKickDetector,
    trunk: TrunkLatch,
    zoom: ZoomLock,
    rotation: RotationDriver,
    color: ColorCycle,
    head_turn: HeadTurnLatch,
    snapshot: EngineSnapshot,
    stats: EngineStats,
}

impl Engine {
    /// Validate the configuration and build an engine
    pub fn new(config: EngineConfig) -> VitrineResult<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let zoom = ZoomLock::new(config.zoom.clone());
        let snapshot = EngineSnapshot {
            zoom_value: zoom.value(),
            ..EngineSnapshot::default()
        };
        Self {
            stabilizer: TrackingStabilizer::new(config.stabilizer.clone()),
            arbitrator: IntentArbitrator::new(config.intent.clone()),
            trunk_kick: TrunkKickDetector::new(config.trunk_kick.clone()),
            trunk: TrunkLatch::new(config.trunk_kick.toggle_mode),
            zoom,
            rotation: RotationDriver::new(config.rotation.clone()),
            color: ColorCycle::new(config.color.clone()),
            head_turn: HeadTurnLatch::new(config.head_turn.clone()),
            snapshot,
            stats: EngineStats::default(),
            config,
        }
    }

    /// Run one frame and publish the snapshot
    pub fn tick(&mut self, candidates: &[Skeleton], dt: f32) -> &EngineSnapshot {
        let start = Instant::now();
        self.stats.ticks += 1;

        // Stage 1: Sanitize the frame delta
        let dt = self.frame_delta(dt);

        // Stage 2-3: Subject, smoothing, power pose
        let tracking = self.stabilizer.update(candidates, dt);
        let has_subject = tracking.has_subject;
        let joints = self.stabilizer.joints();
        if has_subject {
            self.stats.subject_frames += 1;
        }

        // Stage 4: Intent
        let arbitration = if has_subject {
            self.arbitrator.arbitrate(joints)
        } else {
            Arbitration::default()
        };

        // Past the selector's grace, not just absent this frame
        let subject_lost = !has_subject && self.stabilizer.selector().active_subject().is_none();
        let reset = subject_lost && self.config.reset_on_subject_lost;

        // Stage 5: Trunk kick
        let kicked = self.trunk_kick.update(joints, has_subject, dt);
        if kicked {
            self.stats.trunk_kicks += 1;
        }
        let trunk_changed = if reset {
            self.trunk.close()
        } else {
            self.trunk.update(kicked)
        };

        // Stage 6: Zoom
        let zoom_value = self.zoom.update(arbitration.intent, joints, has_subject, dt);

        // Stage 7: Rotation, color, headlights
        let rotation = if has_subject {
            self.rotation.update(&arbitration, joints, dt)
        } else if reset {
            self.rotation.return_home(dt)
        } else {
            self.rotation.settle(dt)
        };

        let color_step = self
            .color
            .update(has_subject && arbitration.color_requested(), dt);
        if color_step.is_some() {
            self.stats.color_steps += 1;
        }

        let headlights_changed = if has_subject {
            self.head_turn.update(joints)
        } else if reset {
            self.head_turn.switch_off()
        } else {
            None
        };

        // Stage 8: Publish
        self.snapshot = EngineSnapshot {
            frame: self.stats.ticks,
            has_subject,
            subject_id: tracking.subject_id,
            joints: joints.clone(),
            is_power_pose: tracking.is_power_pose,
            power_pose_changed: tracking.power_pose_changed,
            intent: arbitration.intent,
            candidates: arbitration.candidates,
            trunk_kick_triggered: kicked,
            trunk_kick_phase: self.trunk_kick.phase(),
            trunk_open: self.trunk.is_open(),
            trunk_changed,
            zoom_value,
            zoom_phase: self.zoom.phase(),
            rotation,
            color_step,
            color_index: self.color.index(),
            headlights_on: self.head_turn.is_on(),
            headlights_changed,
        };

        self.stats.last_tick_duration = start.elapsed();
        &self.snapshot
    }

    /// Last published snapshot
    pub fn snapshot(&self) -> &EngineSnapshot {
        &self.snapshot
    }

    pub fn stats(&self) -> &EngineStats {
        &self.stats
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stabilizer(&self) -> &TrackingStabilizer {
        &self.stabilizer
    }

    pub fn zoom(&self) -> &ZoomLock {
        &self.zoom
    }

    /// Drop all state, keeping configuration and statistics
    pub fn reset(&mut self) {
        debug!("engine reset");
        let stats = std::mem::take(&mut self.stats);
        *self = Self::build(self.config.clone());
        self.stats = stats;
    }

    fn frame_delta(&mut self, dt: f32) -> f32 {
        match FrameDelta::sanitize(dt, self.config.max_frame_delta) {
            FrameDelta::Accepted(dt) => dt,
            FrameDelta::Rejected => {
                self.stats.rejected_deltas += 1;
                debug!(dt, "frame delta rejected");
                0.0
            }
            FrameDelta::Clamped { given, used } => {
                self.stats.clamped_deltas += 1;
                warn!(given, used, "frame delta clamped");
                used
            }
        }
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}
