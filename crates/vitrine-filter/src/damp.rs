//! Scalar critically-damped smoothing

/// Smallest time constant accepted; shorter values are raised to this.
pub const MIN_SMOOTH_TIME: f32 = 0.0001;

/// Cubic approximation of `exp(-x)` that stays stable for large steps
#[inline]
pub(crate) fn decay(x: f32) -> f32 {
    1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x)
}

/// Move `current` towards `target` like a critically damped spring.
///
/// - `velocity`: carried between calls, owned by the caller
/// - `smooth_time`: approximate time to reach the target
/// - `max_speed`: optional cap on the rate of change (units per second)
///
/// Never overshoots the target. A non-positive `dt` leaves everything as is.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    max_speed: Option<f32>,
    dt: f32,
) -> f32 {
    if dt <= 0.0 {
        return current;
    }

    let smooth_time = smooth_time.max(MIN_SMOOTH_TIME);
    let omega = 2.0 / smooth_time;
    let exp = decay(omega * dt);

    let mut change = current - target;
    if let Some(max_speed) = max_speed {
        let max_change = max_speed * smooth_time;
        change = change.clamp(-max_change, max_change);
    }
    let clamped_target = current - change;

    let temp = (*velocity + omega * change) * dt;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = clamped_target + (change + temp) * exp;

    // Overshoot guard
    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = 0.0;
    }

    output
}

/// A scalar signal with its own damping velocity
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Damped {
    pub value: f32,
    pub velocity: f32,
}

impl Damped {
    pub fn new(value: f32) -> Self {
        Self {
            value,
            velocity: 0.0,
        }
    }

    /// Advance towards `target` and return the new value
    pub fn step(&mut self, target: f32, smooth_time: f32, max_speed: Option<f32>, dt: f32) -> f32 {
        self.value = smooth_damp(
            self.value,
            target,
            &mut self.velocity,
            smooth_time,
            max_speed,
            dt,
        );
        self.value
    }

    /// Jump to a value and forget any motion
    pub fn snap(&mut self, value: f32) {
        self.value = value;
        self.velocity = 0.0;
    }
}
