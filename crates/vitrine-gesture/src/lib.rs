//! vitrine Gesture - interpreting the stabilized skeleton
//!
//! Gestures here are NOT classified by a model. Each one is a geometric
//! predicate over smoothed joints, wrapped in whatever timing it needs:
//!
//! - `intent`: zoom / rotate / color candidates resolved by fixed priority,
//!   recomputed from scratch every frame
//! - `trunk_kick`: hold + cooldown + hysteresis, fires for exactly one frame
//! - `zoom`: entry pose held until a baseline locks, then hand distance
//!   drives a bounded output
//! - `rotation`, `color`, `head_turn`: the consumers of the other intents

pub mod intent;
pub mod trunk_kick;
pub mod zoom;
pub mod rotation;
pub mod color;
pub mod head_turn;

pub use intent::*;
pub use trunk_kick::*;
pub use zoom::*;
pub use rotation::*;
pub use color::*;
pub use head_turn::*;
