//! vitrine Core - Fundamental types and primitives
//!
//! This crate defines the types shared by every layer of the gesture engine:
//! - Identifiers (SubjectId)
//! - Geometry (Vec3, sensor space, meters)
//! - Skeleton data (Joint slots, tracking states, samples)
//! - Frame time helpers
//! - Configuration errors

pub mod id;
pub mod vector;
pub mod skeleton;
pub mod time;
pub mod error;

pub use id::*;
pub use vector::*;
pub use skeleton::*;
pub use time::*;
pub use error::*;
