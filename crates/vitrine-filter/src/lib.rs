//! vitrine Filter - smoothing of noisy sensor signals
//!
//! Every smoothed signal in the engine goes through the same critically
//! damped spring: a position chases its target with an explicit velocity
//! term, parameterised by a time constant instead of a cutoff frequency.
//!
//! - `damp`: scalar form, used for hand distance, zoom output and yaw speed
//! - `joint`: 3D form with `FilterState` as a plain value, one per joint slot

pub mod damp;
pub mod joint;

pub use damp::*;
pub use joint::*;
