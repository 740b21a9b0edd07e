//! Frame time primitives
//!
//! All timers in the engine are plain `f32` second accumulators advanced by
//! the caller-supplied frame delta. There is no clock of our own.

/// Tolerance when comparing an accumulated timer against a duration.
///
/// Summing a fixed frame step (1/60 s) N times drifts by a few ulps, which
/// would otherwise make "held for exactly N frames" land one frame late.
pub const TIMER_EPSILON: f32 = 1e-4;

/// Has `timer` reached `duration`?
#[inline]
pub fn elapsed(timer: f32, duration: f32) -> bool {
    timer + TIMER_EPSILON >= duration
}

/// Outcome of frame delta sanitising
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameDelta {
    /// Delta accepted as given
    Accepted(f32),
    /// Delta was NaN, infinite or negative and has been replaced by zero
    Rejected,
    /// Delta exceeded the allowed maximum and was clamped to it
    Clamped { given: f32, used: f32 },
}

impl FrameDelta {
    /// Classify a raw frame delta against an upper bound
    pub fn sanitize(dt: f32, max_dt: f32) -> Self {
        if !dt.is_finite() || dt < 0.0 {
            FrameDelta::Rejected
        } else if dt > max_dt {
            FrameDelta::Clamped {
                given: dt,
                used: max_dt,
            }
        } else {
            FrameDelta::Accepted(dt)
        }
    }

    /// The delta to advance timers by
    #[inline]
    pub fn seconds(self) -> f32 {
        match self {
            FrameDelta::Accepted(dt) => dt,
            FrameDelta::Rejected => 0.0,
            FrameDelta::Clamped { used, .. } => used,
        }
    }
}

/// Inverse of linear interpolation, clamped to [0, 1]
#[inline]
pub fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
