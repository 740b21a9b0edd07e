//! End-to-end Integration Test Suite
//!
//! Whole-engine behaviour driven by scripted bodies:
//! - Power-pose edges
//! - Subject loss, grace and stickiness
//! - Trunk kick debouncing and the trunk latch
//! - Zoom lock round trip, also from raw camera-space frames
//! - Color cycling and the rotation/color policy
//! - Reset of the outputs once the subject is lost
//! - Robustness under sensor noise

use vitrine_core::Skeleton;

use crate::builders::SkeletonBuilder;

/// The scripted session used by the replay demo and the smoke test:
/// walk in, raise a hand, kick, zoom, walk out.
pub fn demo_session() -> Vec<(Vec<Skeleton>, f32)> {
    let standing = SkeletonBuilder::standing(1);
    vec![
        (vec![], 0.5),
        (vec![standing.clone().build()], 1.0),
        (vec![standing.clone().power_pose().build()], 1.0),
        (vec![standing.clone().build()], 0.5),
        (vec![standing.clone().knee_lift(0.25).build()], 0.6),
        (vec![standing.clone().build()], 0.5),
        (vec![standing.clone().color_pose().build()], 0.5),
        (vec![standing.clone().build()], 0.5),
        (vec![standing.clone().zoom_pose(0.40).build()], 1.5),
        (vec![standing.clone().zoom_pose(0.75).build()], 2.0),
        (vec![standing.clone().zoom_pose(0.22).build()], 2.0),
        (vec![standing.clone().rotate_right().build()], 1.5),
        (vec![standing.clone().head_turn(0.15).build()], 0.5),
        (vec![standing.build()], 0.5),
        (vec![], 1.0),
    ]
}
