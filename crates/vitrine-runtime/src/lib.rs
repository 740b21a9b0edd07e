//! vitrine Runtime - the frame-driven engine
//!
//! One `Engine::tick(candidates, dt)` per rendered frame runs, in order:
//! 1. Sanitize the frame delta
//! 2. Select the subject and smooth its joints
//! 3. Evaluate power pose
//! 4. Arbitrate the intent
//! 5. Trunk kick
//! 6. Zoom lock
//! 7. Rotation, color cycle and head-turn latch
//! 8. Publish the snapshot
//!
//! Nothing blocks and nothing runs in the background; every timer advances
//! only by the `dt` handed to `tick`.

pub mod engine;
pub mod telemetry;

pub use engine::*;
pub use telemetry::*;
