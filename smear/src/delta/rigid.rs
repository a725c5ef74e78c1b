use crate::geometry::{centroid, div_or_zero, velocity_at};
use crate::{AnimationSamples, DeltaField};
use glam::Vec3;

/// Deltas treating the whole mesh as one rigid body moving with its centroid.
///
/// Each vertex's offset from the centroid is projected on the centroid's direction of motion,
/// then every frame is divided by its largest signed value. Only the positive side is bounded by
/// `1`; vertices trailing further than the leading vertex leads fall below `-1`.
pub fn rigid_deltas(samples: &AnimationSamples) -> DeltaField {
    let range = samples.range();
    let frame_count = samples.frame_count();
    let centroids: Vec<Vec3> = (0..frame_count)
        .map(|index| centroid(samples.positions_at(index)))
        .collect();

    let mut frames = Vec::with_capacity(frame_count);
    for (index, frame) in range.frames().enumerate() {
        log::debug!("computing rigid deltas for frame {frame}");
        let center = centroids[index];
        let velocity = velocity_at(frame_count, index, |k| centroids[k]);
        if velocity == Vec3::ZERO {
            log::trace!("frame {frame}: centroid is not moving");
        }
        frames.push(rigid_frame_deltas(
            samples.positions_at(index),
            center,
            velocity.normalize_or_zero(),
        ));
    }

    DeltaField::from_frames(range, frames)
}

/// Projects `positions` around `center` on `direction` and divides by the largest signed result.
pub(crate) fn rigid_frame_deltas(positions: &[Vec3], center: Vec3, direction: Vec3) -> Vec<f32> {
    let mut deltas: Vec<f32> = positions
        .iter()
        .map(|&p| (p - center).dot(direction))
        .collect();
    let max_delta = deltas.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    for delta in &mut deltas {
        *delta = div_or_zero(*delta, max_delta);
    }
    deltas
}
