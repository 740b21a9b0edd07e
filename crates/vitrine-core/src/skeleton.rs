//! Skeleton snapshots as reported by the depth sensor
//!
//! One `Skeleton` is one candidate body for one frame. The joint set is a
//! closed enumeration, so joints are stored in a fixed array indexed by
//! `Joint as usize` rather than a map.

use serde::{Deserialize, Serialize};

use crate::{SubjectId, Vec3};

/// Number of joint slots in a skeleton
pub const JOINT_COUNT: usize = 20;

/// Joint slot identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Joint {
    // Head and torso
    Head,
    SpineBase,
    SpineMid,
    SpineShoulder,

    // Arms
    ShoulderLeft,
    ShoulderRight,
    ElbowLeft,
    ElbowRight,
    WristLeft,
    WristRight,
    HandLeft,
    HandRight,

    // Legs
    HipLeft,
    HipRight,
    KneeLeft,
    KneeRight,
    AnkleLeft,
    AnkleRight,
    FootLeft,
    FootRight,
}

impl Joint {
    /// All joints in slot order
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Head,
        Joint::SpineBase,
        Joint::SpineMid,
        Joint::SpineShoulder,
        Joint::ShoulderLeft,
        Joint::ShoulderRight,
        Joint::ElbowLeft,
        Joint::ElbowRight,
        Joint::WristLeft,
        Joint::WristRight,
        Joint::HandLeft,
        Joint::HandRight,
        Joint::HipLeft,
        Joint::HipRight,
        Joint::KneeLeft,
        Joint::KneeRight,
        Joint::AnkleLeft,
        Joint::AnkleRight,
        Joint::FootLeft,
        Joint::FootRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Anatomical group, used to pick a smoothing time constant
    pub fn group(self) -> JointGroup {
        match self {
            Joint::Head => JointGroup::Head,
            Joint::SpineBase
            | Joint::SpineMid
            | Joint::SpineShoulder
            | Joint::ShoulderLeft
            | Joint::ShoulderRight => JointGroup::Torso,
            Joint::ElbowLeft
            | Joint::ElbowRight
            | Joint::WristLeft
            | Joint::WristRight
            | Joint::HandLeft
            | Joint::HandRight => JointGroup::Arm,
            Joint::HipLeft
            | Joint::HipRight
            | Joint::KneeLeft
            | Joint::KneeRight
            | Joint::AnkleLeft
            | Joint::AnkleRight
            | Joint::FootLeft
            | Joint::FootRight => JointGroup::Leg,
        }
    }
}

/// Anatomical grouping of joints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JointGroup {
    Head,
    Torso,
    Arm,
    Leg,
}

/// Sensor confidence for one joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TrackingState {
    /// Directly observed
    Tracked,
    /// Estimated from neighbouring joints
    Inferred,
    /// No usable data; the position must not be read
    #[default]
    NotTracked,
}

impl TrackingState {
    /// Accepted under a gate that may or may not admit inferred joints
    #[inline]
    pub fn accepted(self, strict: bool) -> bool {
        match self {
            TrackingState::Tracked => true,
            TrackingState::Inferred => !strict,
            TrackingState::NotTracked => false,
        }
    }
}

/// One joint reading
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointSample {
    pub position: Vec3,
    pub state: TrackingState,
}

impl JointSample {
    pub fn new(position: Vec3, state: TrackingState) -> Self {
        Self { position, state }
    }

    pub fn tracked(position: Vec3) -> Self {
        Self::new(position, TrackingState::Tracked)
    }

    pub fn inferred(position: Vec3) -> Self {
        Self::new(position, TrackingState::Inferred)
    }

    /// Position, if the sample may be consumed at all
    #[inline]
    pub fn usable_position(&self) -> Option<Vec3> {
        match self.state {
            TrackingState::NotTracked => None,
            _ => Some(self.position),
        }
    }
}

/// One candidate body for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skeleton {
    /// Sensor tracking id, stable while the body stays in view
    pub subject_id: SubjectId,

    /// Body-level tracking flag from the sensor
    pub is_tracked: bool,

    /// Joint samples indexed by `Joint`
    pub joints: [JointSample; JOINT_COUNT],
}

impl Skeleton {
    /// A tracked body with every joint `NotTracked`
    pub fn new(subject_id: SubjectId) -> Self {
        Self {
            subject_id,
            is_tracked: true,
            joints: [JointSample::default(); JOINT_COUNT],
        }
    }

    pub fn joint(&self, joint: Joint) -> &JointSample {
        &self.joints[joint.index()]
    }

    pub fn set_joint(&mut self, joint: Joint, sample: JointSample) {
        self.joints[joint.index()] = sample;
    }

    /// Builder-style joint assignment
    pub fn with_joint(mut self, joint: Joint, sample: JointSample) -> Self {
        self.set_joint(joint, sample);
        self
    }

    /// Count of joints in `Tracked` state (inferred joints do not count)
    pub fn tracked_joint_count(&self) -> usize {
        self.joints
            .iter()
            .filter(|s| s.state == TrackingState::Tracked)
            .count()
    }
}
