//! Intent arbitration - at most one interaction intent per frame
//!
//! Three poses can look alike from the sensor's point of view (two hands up
//! in front, arms spread, one hand over the head). Each gets an independent
//! candidate predicate and a fixed priority decides: Zoom > Rotate > Color.
//! The zoom pose is the most deliberate, color the easiest to hit by accident.

use serde::{Deserialize, Serialize};
use vitrine_core::{ensure_positive, Joint, VitrineResult};
use vitrine_tracking::JointSet;

/// The single active intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Intent {
    #[default]
    None,
    Zoom,
    Rotate,
    Color,
}

/// Thresholds for the three candidate poses (meters)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IntentConfig {
    /// Extra height for "hand above head"
    pub hand_above_head_margin: f32,

    /// Zoom: both hands above spine-shoulder by this much
    pub hand_above_spine_shoulder_margin: f32,

    /// Zoom: both hands closer to the sensor than spine-mid by this much
    pub hands_in_front_margin: f32,

    /// Zoom: minimum distance between the hands
    pub zoom_min_hands_distance: f32,

    /// Rotate: a hand must be above (shoulder average - band)
    pub rotation_band: f32,

    /// Rotate: sideways hand offset from its shoulder before an arm is open
    pub arm_dead_zone: f32,

    /// Color: additionally require the right hand down low
    pub color_dedicated_pose: bool,

    /// Color: right hand below spine-mid + offset (negative = below)
    pub color_right_hand_offset: f32,

    /// A winning rotate candidate also suppresses a color request
    pub rotation_blocks_color: bool,
}

impl Default for IntentConfig {
    fn default() -> Self {
        Self {
            hand_above_head_margin: 0.0,
            hand_above_spine_shoulder_margin: 0.04,
            hands_in_front_margin: 0.06,
            zoom_min_hands_distance: 0.20,
            rotation_band: 0.05,
            arm_dead_zone: 0.05,
            color_dedicated_pose: true,
            color_right_hand_offset: -0.05,
            rotation_blocks_color: true,
        }
    }
}

impl IntentConfig {
    pub fn validate(&self) -> VitrineResult<()> {
        ensure_positive("intent.zoom_min_hands_distance", self.zoom_min_hands_distance)?;
        ensure_positive("intent.arm_dead_zone", self.arm_dead_zone)?;
        Ok(())
    }
}

/// Raw candidate predicates before priority resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Candidates {
    pub zoom: bool,
    pub rotate: bool,
    pub color: bool,
}

/// Fixed-priority resolution: Zoom > Rotate > Color
pub fn resolve(candidates: Candidates) -> Intent {
    if candidates.zoom {
        Intent::Zoom
    } else if candidates.rotate {
        Intent::Rotate
    } else if candidates.color {
        Intent::Color
    } else {
        Intent::None
    }
}

/// Result of one arbitration pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Arbitration {
    pub intent: Intent,
    pub candidates: Candidates,
    pub left_hand_above_head: bool,
    pub right_hand_above_head: bool,

    /// Color was requested while Rotate won and rotation does not block color
    pub color_shadowed: bool,
}

impl Arbitration {
    /// Whether a color change may be requested this frame
    pub fn color_requested(&self) -> bool {
        self.intent == Intent::Color || self.color_shadowed
    }
}

/// Joints that must all be finite before any candidate is evaluated
const REQUIRED: [Joint; 7] = [
    Joint::Head,
    Joint::HandLeft,
    Joint::HandRight,
    Joint::ShoulderLeft,
    Joint::ShoulderRight,
    Joint::SpineMid,
    Joint::SpineShoulder,
];

/// Stateless intent arbitrator
#[derive(Debug, Clone, Default)]
pub struct IntentArbitrator {
    config: IntentConfig,
}

impl IntentArbitrator {
    pub fn new(config: IntentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &IntentConfig {
        &self.config
    }

    /// Evaluate candidates for a joint set and resolve them
    pub fn arbitrate(&self, joints: &JointSet) -> Arbitration {
        if !joints.all_finite(&REQUIRED) {
            return Arbitration::default();
        }

        let c = &self.config;
        let head = joints.position(Joint::Head);
        let hand_l = joints.position(Joint::HandLeft);
        let hand_r = joints.position(Joint::HandRight);
        let shoulder_l = joints.position(Joint::ShoulderLeft);
        let shoulder_r = joints.position(Joint::ShoulderRight);
        let spine_mid = joints.position(Joint::SpineMid);
        let spine_shoulder = joints.position(Joint::SpineShoulder);

        let left_hand_above_head = hand_l.y > head.y + c.hand_above_head_margin;
        let right_hand_above_head = hand_r.y > head.y + c.hand_above_head_margin;

        // Zoom: both hands raised in front of the chest, spread apart
        let chest = spine_shoulder.y + c.hand_above_spine_shoulder_margin;
        let front = spine_mid.z - c.hands_in_front_margin;
        let zoom = hand_l.y > chest
            && hand_r.y > chest
            && hand_l.z < front
            && hand_r.z < front
            && hand_l.distance(&hand_r) >= c.zoom_min_hands_distance;

        // Rotate: a hand near shoulder height with that side's arm open
        let band = 0.5 * (shoulder_l.y + shoulder_r.y) - c.rotation_band;
        let in_band = hand_l.y > band || hand_r.y > band;
        let arms_open = (hand_r.x - shoulder_r.x) > c.arm_dead_zone
            || (hand_l.x - shoulder_l.x) < -c.arm_dead_zone;
        let rotate = in_band && arms_open;

        // Color: left hand over the head, right hand kept low
        let color = if c.color_dedicated_pose {
            left_hand_above_head && hand_r.y < spine_mid.y + c.color_right_hand_offset
        } else {
            left_hand_above_head
        };

        let candidates = Candidates {
            zoom,
            rotate,
            color,
        };
        let intent = resolve(candidates);

        Arbitration {
            intent,
            candidates,
            left_hand_above_head,
            right_hand_above_head,
            color_shadowed: intent == Intent::Rotate && color && !c.rotation_blocks_color,
        }
    }
}
