use glam::Vec3;

/// `sin(omega)` threshold below which joint directions are blended linearly instead of
/// spherically.
pub(crate) const SPHERICAL_BLEND_MIN_SIN: f32 = 0.1;

/// Arithmetic mean of `points`, or zero for an empty slice.
pub(crate) fn centroid(points: &[Vec3]) -> Vec3 {
    if points.is_empty() {
        return Vec3::ZERO;
    }
    points.iter().copied().sum::<Vec3>() / points.len() as f32
}

/// Finite-difference velocity of the sample at `index` out of `count` consecutive samples.
///
/// Forward difference everywhere except the last sample, which uses a backward difference. A
/// single sample has no neighbour and yields zero.
pub(crate) fn velocity_at(count: usize, index: usize, sample: impl Fn(usize) -> Vec3) -> Vec3 {
    if index + 1 < count {
        sample(index + 1) - sample(index)
    } else if index > 0 {
        sample(index) - sample(index - 1)
    } else {
        Vec3::ZERO
    }
}

/// `3x² - 2x³` after clamping `x` to `[0, 1]`.
pub(crate) fn smooth_step(x: f32) -> f32 {
    let x = if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) };
    3.0 * x * x - 2.0 * x * x * x
}

/// Replaces NaN and infinities with zero.
pub(crate) fn finite_or_zero(x: f32) -> f32 {
    if x.is_finite() { x } else { 0.0 }
}

/// `numerator / denominator`, or zero when the denominator is zero or the quotient is not finite.
pub(crate) fn div_or_zero(numerator: f32, denominator: f32) -> f32 {
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(numerator / denominator)
}

/// Signed parametric distance of `point` from `tail` along the bone `head -> tail`, in bone
/// lengths. `1` at the head, `0` at the tail, negative past the tail.
pub(crate) fn distance_from_tail(point: Vec3, head: Vec3, tail: Vec3) -> f32 {
    let bone = tail - head;
    let length = bone.length();
    if length == 0.0 {
        return 0.0;
    }
    let axis = bone / length;
    let projected = head + (point - head).dot(axis) * axis;
    let to_tail = tail - projected;
    let distance = to_tail.length() / length;
    if to_tail.dot(bone) < 0.0 {
        -distance
    } else {
        distance
    }
}

/// Blends two unit directions with weights `w0`/`w1`.
///
/// Spherical interpolation is used when the directions are far enough apart for `sin(omega)` to be
/// well conditioned, plain linear blending otherwise.
pub(crate) fn blend_directions(d0: Vec3, d1: Vec3, w0: f32, w1: f32, omega: f32) -> Vec3 {
    let sin_omega = omega.sin();
    if sin_omega > SPHERICAL_BLEND_MIN_SIN {
        d0 * ((w0 * omega).sin() / sin_omega) + d1 * ((w1 * omega).sin() / sin_omega)
    } else {
        d0 * w0 + d1 * w1
    }
}

/// Angle between two unit directions. The dot product is clamped so rounding never produces NaN.
pub(crate) fn angle_between(d0: Vec3, d1: Vec3) -> f32 {
    d0.dot(d1).clamp(-1.0, 1.0).acos()
}
