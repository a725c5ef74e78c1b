use crate::{
    AnimationSamples, DeltaField, Error, FrameRange, Rig, SampleProvider, resolve_representatives,
    ribbon_deltas, rigid_deltas, temporal_smooth,
};

/// Default temporal smoothing half-width, in frames.
pub const DEFAULT_SMOOTH_WINDOW: usize = 2;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct BakeSettings {
    /// Ignore the skeleton and treat the whole mesh as one rigid body.
    pub full_body: bool,
    /// Half-width of the temporal smoothing window. `0` disables smoothing.
    pub smooth_window: usize,
    /// Measure motion in the camera's space instead of world space. Used when sampling.
    pub camera_pov: bool,
}

impl Default for BakeSettings {
    fn default() -> Self {
        Self {
            full_body: false,
            smooth_window: DEFAULT_SMOOTH_WINDOW,
            camera_pov: false,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum BakeMode {
    Rigid,
    Ribbon,
}

impl BakeMode {
    pub fn select(rig: Option<&Rig>, settings: &BakeSettings) -> Self {
        match rig {
            Some(_) if !settings.full_body => Self::Ribbon,
            _ => Self::Rigid,
        }
    }
}

/// Bakes the smoothed smear delta field for `samples`.
///
/// Skinned meshes use the per-bone ribbon computer unless `full_body` is set; everything else
/// uses the rigid centroid computer. Both feed the same temporal smoothing pass.
pub fn bake(
    samples: &AnimationSamples,
    rig: Option<&Rig>,
    settings: &BakeSettings,
) -> Result<DeltaField, Error> {
    let range = samples.range();
    if range.is_empty() {
        log::debug!("empty frame range, nothing to bake");
        return Ok(DeltaField::from_frames(range, Vec::new()));
    }

    let mode = BakeMode::select(rig, settings);
    log::info!(
        "baking {mode:?} deltas for frames {}..={} ({} vertices)",
        range.start,
        range.end,
        samples.vertex_count()
    );

    let raw = match (mode, rig) {
        (BakeMode::Ribbon, Some(rig)) => ribbon_deltas(samples, rig)?,
        _ => rigid_deltas(samples),
    };

    Ok(temporal_smooth(&raw, settings.smooth_window))
}

/// Samples `range` from `provider` and bakes it.
///
/// `discarded` lists pruned bones (see [`crate::discard_descendants`]); their joints are replaced
/// by their nearest kept ancestor's before any delta is computed. Ignored without a rig.
pub fn bake_from_provider<P: SampleProvider + ?Sized>(
    provider: &P,
    range: FrameRange,
    rig: Option<&Rig>,
    discarded: &[usize],
    settings: &BakeSettings,
) -> Result<DeltaField, Error> {
    let representatives = match rig {
        Some(rig) => Some(resolve_representatives(&rig.hierarchy, discarded)?),
        None => None,
    };
    let samples = AnimationSamples::collect(
        provider,
        range,
        representatives.as_deref(),
        settings.camera_pov,
    )?;
    bake(&samples, rig, settings)
}
