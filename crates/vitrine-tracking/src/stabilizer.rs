//! Tracking stabilizer - raw skeleton in, smoothed joint set out
//!
//! Owns one `FilterState` per joint slot. While no subject is selected the
//! published positions stay frozen at their last smoothed values, so visuals
//! resume from where they were instead of snapping in from the origin.

use serde::{Deserialize, Serialize};
use vitrine_core::{Joint, Skeleton, SubjectId, TrackingState, VitrineResult, JOINT_COUNT};
use vitrine_filter::{FilterState, JointFilter, SmoothingProfile};

use crate::{find_present, JointSet, PowerPoseConfig, PowerPoseDetector, SelectorConfig, SubjectSelector};

/// Stabilizer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilizerConfig {
    pub selector: SelectorConfig,
    pub smoothing: SmoothingProfile,
    pub power_pose: PowerPoseConfig,
}

impl StabilizerConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        self.selector.validate()?;
        self.smoothing.validate()?;
        self.power_pose.validate()?;
        Ok(())
    }
}

/// What the stabilizer publishes each frame besides the joint set
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TrackingFrame {
    pub has_subject: bool,
    pub subject_id: Option<SubjectId>,
    pub is_power_pose: bool,
    /// New power-pose value, only on the frame it changed
    pub power_pose_changed: Option<bool>,
}

/// Subject selection plus per-joint smoothing
#[derive(Debug)]
pub struct TrackingStabilizer {
    selector: SubjectSelector,
    filters: [JointFilter; JOINT_COUNT],
    states: [FilterState; JOINT_COUNT],
    joints: JointSet,
    power_pose: PowerPoseDetector,
}

impl TrackingStabilizer {
    pub fn new(config: StabilizerConfig) -> Self {
        let filters = Joint::ALL.map(|joint| config.smoothing.filter_for(joint.group()));
        Self {
            selector: SubjectSelector::new(config.selector),
            filters,
            states: [FilterState::UNSEEDED; JOINT_COUNT],
            joints: JointSet::default(),
            power_pose: PowerPoseDetector::new(config.power_pose),
        }
    }

    /// Process one frame of candidates
    pub fn update(&mut self, candidates: &[Skeleton], dt: f32) -> TrackingFrame {
        let subject = self
            .selector
            .select(candidates, dt)
            .and_then(|id| find_present(candidates, id));

        let Some(skeleton) = subject else {
            self.joints.mark_untracked();
            return TrackingFrame {
                has_subject: false,
                subject_id: None,
                is_power_pose: false,
                power_pose_changed: self.power_pose.update(false),
            };
        };

        self.absorb(skeleton, dt);

        let level = self.power_pose.evaluate(&self.joints);
        TrackingFrame {
            has_subject: true,
            subject_id: Some(skeleton.subject_id),
            is_power_pose: level,
            power_pose_changed: self.power_pose.update(level),
        }
    }

    /// Smoothed joint set (read-only view)
    pub fn joints(&self) -> &JointSet {
        &self.joints
    }

    /// Filter state of one slot
    pub fn filter_state(&self, joint: Joint) -> FilterState {
        self.states[joint.index()]
    }

    pub fn selector(&self) -> &SubjectSelector {
        &self.selector
    }

    fn absorb(&mut self, skeleton: &Skeleton, dt: f32) {
        for joint in Joint::ALL {
            let slot = joint.index();
            let sample = skeleton.joint(joint);

            let state = match sample.usable_position() {
                Some(target) if target.is_finite() => {
                    self.states[slot] = self.filters[slot].update(self.states[slot], target, dt);
                    sample.state
                }
                _ => TrackingState::NotTracked,
            };

            self.joints.set(joint, self.states[slot].position, state);
        }
    }
}

impl Default for TrackingStabilizer {
    fn default() -> Self {
        Self::new(StabilizerConfig::default())
    }
}
