use crate::DeltaField;

/// Quartic kernel `(1 - x²)²` sampled at `2n + 1` evenly spaced taps.
///
/// Taps sit at `k / (n + 1)` for `k` in `-n..=n`, so every tap is strictly inside `(-1, 1)` and
/// carries a nonzero weight.
pub fn quartic_kernel(half_width: usize) -> Vec<f32> {
    let n = half_width as i64;
    (-n..=n)
        .map(|k| {
            let x = k as f32 / (n + 1) as f32;
            let s = 1.0 - x * x;
            s * s
        })
        .collect()
}

/// Windowed weighted average of `field` over `±half_width` frames.
///
/// Window taps falling outside the field's range reuse the nearest boundary frame, so the window
/// never shrinks at the ends. `half_width == 0` returns the field unchanged.
pub fn temporal_smooth(field: &DeltaField, half_width: usize) -> DeltaField {
    if half_width == 0 || field.is_empty() {
        return field.clone();
    }

    let range = field.range();
    let kernel = quartic_kernel(half_width);
    let weight_sum: f32 = kernel.iter().sum();
    let vertex_count = field.vertex_count();
    let last = range.len() - 1;

    let mut frames = Vec::with_capacity(range.len());
    for index in 0..range.len() {
        let mut smoothed = vec![0.0f32; vertex_count];
        for (tap, &weight) in kernel.iter().enumerate() {
            let sample = (index + tap).saturating_sub(half_width).min(last);
            for (out, &value) in smoothed.iter_mut().zip(field.frame_at(sample)) {
                *out += weight * value;
            }
        }
        for value in &mut smoothed {
            *value /= weight_sum;
        }
        frames.push(smoothed);
    }

    DeltaField::from_frames(range, frames)
}
