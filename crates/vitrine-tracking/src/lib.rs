//! vitrine Tracking - from candidate skeletons to one stable subject
//!
//! The sensor reports every body it sees, every frame, with noisy and
//! intermittently missing joints. This crate:
//! - picks one subject and sticks to it (`SubjectSelector`)
//! - smooths each joint slot independently (`TrackingStabilizer`)
//! - publishes the smoothed `JointSet` and the power-pose signal

pub mod joints;
pub mod selector;
pub mod power_pose;
pub mod stabilizer;

pub use joints::*;
pub use selector::*;
pub use power_pose::*;
pub use stabilizer::*;
