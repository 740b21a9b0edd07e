//! vitrine Test Harness - synthetic bodies and scripted sessions
//!
//! This crate provides:
//! - Skeleton builders with canned installation poses
//! - A noisy sensor (jitter, dropouts, inferred joints, NaN glitches)
//! - Scenario driving at a fixed frame step
//! - End-to-end behaviour tests of the whole engine

pub mod builders;
pub mod noise;
pub mod scenario;
pub mod integration;

pub use builders::*;
pub use noise::*;
pub use scenario::*;
