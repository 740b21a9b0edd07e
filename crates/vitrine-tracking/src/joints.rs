//! Published joint set - the read-only view every gesture consumes

use serde::Serialize;
use vitrine_core::{Joint, TrackingState, Vec3, JOINT_COUNT};

/// Smoothed position and latest tracking state for every joint slot.
///
/// Positions of slots that have never been observed are NaN. Positions of
/// slots that are not currently tracked hold their last smoothed value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JointSet {
    pub positions: [Vec3; JOINT_COUNT],
    pub states: [TrackingState; JOINT_COUNT],
}

impl Default for JointSet {
    fn default() -> Self {
        Self {
            positions: [Vec3::NAN; JOINT_COUNT],
            states: [TrackingState::NotTracked; JOINT_COUNT],
        }
    }
}

impl JointSet {
    #[inline]
    pub fn position(&self, joint: Joint) -> Vec3 {
        self.positions[joint.index()]
    }

    #[inline]
    pub fn state(&self, joint: Joint) -> TrackingState {
        self.states[joint.index()]
    }

    pub fn set(&mut self, joint: Joint, position: Vec3, state: TrackingState) {
        self.positions[joint.index()] = position;
        self.states[joint.index()] = state;
    }

    /// Position, if the joint passes the tracking gate and is finite
    pub fn accepted(&self, joint: Joint, strict: bool) -> Option<Vec3> {
        let position = self.position(joint);
        if self.state(joint).accepted(strict) && position.is_finite() {
            Some(position)
        } else {
            None
        }
    }

    /// True when every listed joint has a finite position
    pub fn all_finite(&self, joints: &[Joint]) -> bool {
        joints.iter().all(|j| self.position(*j).is_finite())
    }

    /// Mark every slot as not tracked, keeping positions frozen
    pub fn mark_untracked(&mut self) {
        self.states = [TrackingState::NotTracked; JOINT_COUNT];
    }

    /// Build a set directly from positions, all `Tracked`
    pub fn from_tracked(joints: &[(Joint, Vec3)]) -> Self {
        let mut set = JointSet::default();
        for (joint, position) in joints {
            set.set(*joint, *position, TrackingState::Tracked);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unobserved() {
        let set = JointSet::default();
        assert!(!set.position(Joint::Head).is_finite());
        assert_eq!(set.state(Joint::Head), TrackingState::NotTracked);
        assert!(set.accepted(Joint::Head, false).is_none());
    }

    #[test]
    fn test_accepted_gate() {
        let mut set = JointSet::default();
        set.set(Joint::KneeRight, Vec3::new(0.1, 0.5, 2.0), TrackingState::Inferred);

        assert!(set.accepted(Joint::KneeRight, true).is_none());
        assert!(set.accepted(Joint::KneeRight, false).is_some());
    }

    #[test]
    fn test_mark_untracked_keeps_positions() {
        let mut set = JointSet::from_tracked(&[(Joint::Head, Vec3::new(0.0, 1.7, 2.0))]);
        set.mark_untracked();

        assert_eq!(set.position(Joint::Head), Vec3::new(0.0, 1.7, 2.0));
        assert_eq!(set.state(Joint::Head), TrackingState::NotTracked);
    }
}
