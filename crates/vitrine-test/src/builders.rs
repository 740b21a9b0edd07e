//! Synthetic skeletons
//!
//! Sensor space, meters. The body stands 2 m from the sensor; hands pushed
//! "in front" of the body, towards the sensor, have a smaller z.

use vitrine_core::{Joint, JointSample, Skeleton, SubjectId, TrackingState, Vec3};

/// Body depth of the neutral pose
pub const BODY_DEPTH: f32 = 2.0;

/// Neutral standing pose, arms relaxed at the sides
const NEUTRAL: [(Joint, f32, f32); 20] = [
    (Joint::Head, 0.0, 1.65),
    (Joint::SpineBase, 0.0, 0.95),
    (Joint::SpineMid, 0.0, 1.15),
    (Joint::SpineShoulder, 0.0, 1.45),
    (Joint::ShoulderLeft, -0.18, 1.42),
    (Joint::ShoulderRight, 0.18, 1.42),
    (Joint::ElbowLeft, -0.22, 1.15),
    (Joint::ElbowRight, 0.22, 1.15),
    (Joint::WristLeft, -0.21, 0.95),
    (Joint::WristRight, 0.21, 0.95),
    (Joint::HandLeft, -0.20, 0.90),
    (Joint::HandRight, 0.20, 0.90),
    (Joint::HipLeft, -0.10, 0.92),
    (Joint::HipRight, 0.10, 0.92),
    (Joint::KneeLeft, -0.11, 0.50),
    (Joint::KneeRight, 0.11, 0.50),
    (Joint::AnkleLeft, -0.11, 0.10),
    (Joint::AnkleRight, 0.11, 0.10),
    (Joint::FootLeft, -0.11, 0.04),
    (Joint::FootRight, 0.11, 0.04),
];

/// Fluent builder for one candidate body
#[derive(Debug, Clone)]
pub struct SkeletonBuilder {
    skeleton: Skeleton,
    shift: f32,
}

impl SkeletonBuilder {
    /// A body with no joints reported
    pub fn empty(id: u64) -> Self {
        Self {
            skeleton: Skeleton::new(SubjectId::new(id)),
            shift: 0.0,
        }
    }

    /// Every joint tracked in the neutral pose
    pub fn standing(id: u64) -> Self {
        let mut builder = Self::empty(id);
        for (joint, x, y) in NEUTRAL {
            builder = builder.at(joint, x, y, BODY_DEPTH);
        }
        builder
    }

    /// Move the whole body sideways; applies to joints set afterwards too
    pub fn shifted(mut self, dx: f32) -> Self {
        for sample in self.skeleton.joints.iter_mut() {
            sample.position.x += dx;
        }
        self.shift += dx;
        self
    }

    /// Place a joint (tracked), relative to the body's sideways shift
    pub fn at(mut self, joint: Joint, x: f32, y: f32, z: f32) -> Self {
        self.skeleton.set_joint(
            joint,
            JointSample::tracked(Vec3::new(x + self.shift, y, z)),
        );
        self
    }

    pub fn state(mut self, joint: Joint, state: TrackingState) -> Self {
        let position = self.skeleton.joint(joint).position;
        self.skeleton.set_joint(joint, JointSample::new(position, state));
        self
    }

    pub fn inferred(self, joint: Joint) -> Self {
        self.state(joint, TrackingState::Inferred)
    }

    pub fn missing(self, joint: Joint) -> Self {
        self.state(joint, TrackingState::NotTracked)
    }

    /// Report the joint as tracked but with a NaN position
    pub fn glitch(mut self, joint: Joint) -> Self {
        self.skeleton
            .set_joint(joint, JointSample::tracked(Vec3::NAN));
        self
    }

    /// Drop tracking of the last `count` joints (legs first)
    pub fn degraded(mut self, count: usize) -> Self {
        for joint in Joint::ALL.iter().rev().take(count) {
            self = self.missing(*joint);
        }
        self
    }

    /// Body-level tracking flag cleared
    pub fn untracked(mut self) -> Self {
        self.skeleton.is_tracked = false;
        self
    }

    /// Right hand straight up, well above the head
    pub fn power_pose(self) -> Self {
        self.at(Joint::HandRight, 0.18, 2.00, BODY_DEPTH)
    }

    /// Both hands raised in front of the chest, `spread` meters apart
    pub fn zoom_pose(self, spread: f32) -> Self {
        let half = spread / 2.0;
        self.at(Joint::HandLeft, -half, 1.55, BODY_DEPTH - 0.30)
            .at(Joint::HandRight, half, 1.55, BODY_DEPTH - 0.30)
    }

    /// Right arm stretched out sideways at shoulder height
    pub fn rotate_right(self) -> Self {
        self.at(Joint::HandRight, 0.70, 1.40, BODY_DEPTH)
    }

    /// Left arm stretched out sideways at shoulder height
    pub fn rotate_left(self) -> Self {
        self.at(Joint::HandLeft, -0.70, 1.40, BODY_DEPTH)
    }

    /// Left hand over the head, right hand kept low
    pub fn color_pose(self) -> Self {
        self.at(Joint::HandLeft, -0.10, 1.90, BODY_DEPTH)
            .at(Joint::HandRight, 0.15, 0.85, BODY_DEPTH)
    }

    /// Right knee raised `height` meters above the right hip
    pub fn knee_lift(self, height: f32) -> Self {
        self.at(Joint::KneeRight, 0.11, 0.92 + height, BODY_DEPTH - 0.25)
    }

    /// Head offset sideways from the spine-shoulder
    pub fn head_turn(self, dx: f32) -> Self {
        self.at(Joint::Head, dx, 1.65, BODY_DEPTH)
    }

    pub fn build(self) -> Skeleton {
        self.skeleton
    }
}
