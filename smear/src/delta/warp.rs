use crate::DeltaField;
use crate::geometry::finite_or_zero;

/// Bias curve on `[-1, 1]`: fixes `-1` and `1`, pushes values toward `1` for positive `bias` and
/// toward `-1` for negative `bias`. `bias == 0` is the identity.
pub fn warp(x: f32, bias: f32) -> f32 {
    let denominator = -(-bias).exp() * (x - 1.0) + x + 1.0;
    finite_or_zero(2.0 * (x + 1.0) / denominator - 1.0)
}

impl DeltaField {
    /// Applies [`warp`] to every value.
    pub fn warp(&self, bias: f32) -> DeltaField {
        let frames = self
            .iter()
            .map(|(_, values)| values.iter().map(|&x| warp(x, bias)).collect())
            .collect();
        DeltaField::from_frames(self.range(), frames)
    }
}
