use crate::geometry::{
    angle_between, blend_directions, distance_from_tail, div_or_zero, finite_or_zero, smooth_step,
    velocity_at,
};
use crate::{AnimationSamples, BoneHierarchy, DeltaField, Error, JointSample, Rig, VertexGroup};
use glam::Vec3;
use std::collections::HashMap;

/// One end of a bone seen as a joint: the joint below a bone is keyed by its parent (or `Root`),
/// the joint above it by the bone itself.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum JointKey {
    Root,
    Bone(usize),
}

impl JointKey {
    fn parent_of(hierarchy: &BoneHierarchy, bone: usize) -> Self {
        match hierarchy.parent(bone) {
            Some(parent) => Self::Bone(parent),
            None => Self::Root,
        }
    }
}

/// Largest ribbon delta magnitude gathered at each joint during one frame.
#[derive(Clone, Debug, Default)]
pub(crate) struct JointMax {
    values: HashMap<JointKey, f32>,
}

impl JointMax {
    /// Bones keeping their own transform add their magnitude to the joint.
    pub(crate) fn accumulate_sum(&mut self, key: JointKey, value: f32) {
        *self.values.entry(key).or_insert(0.0) += value;
    }

    /// Bones collapsed onto an ancestor by pruning only raise the joint's maximum.
    pub(crate) fn accumulate_max(&mut self, key: JointKey, value: f32) {
        self.values
            .entry(key)
            .and_modify(|v| *v = v.max(value))
            .or_insert(value);
    }

    pub(crate) fn get(&self, key: JointKey) -> f32 {
        self.values.get(&key).copied().unwrap_or(0.0)
    }
}

/// Per-vertex phase one results for a single bone, in vertex group order.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct BoneRibbon {
    pub(crate) deltas: Vec<f32>,
    pub(crate) colinear: Vec<f32>,
    pub(crate) w0: Vec<f32>,
    pub(crate) w1: Vec<f32>,
}

impl BoneRibbon {
    pub(crate) fn max_abs_delta(&self) -> f32 {
        self.deltas.iter().fold(0.0f32, |m, d| m.max(d.abs()))
    }
}

/// Measures how far each vertex of `group` sits across the bone's direction of motion.
///
/// The head and tail velocities are blended per vertex according to where the vertex projects on
/// the bone, the blend is flattened onto the plane orthogonal to the bone axis, and the vertex's
/// offset from the head is measured along that ribbon normal. A zero-length bone measures 0 for
/// every vertex.
pub(crate) fn bone_ribbon(
    positions: &[Vec3],
    group: &VertexGroup,
    joint: &JointSample,
    head_velocity: Vec3,
    tail_velocity: Vec3,
) -> BoneRibbon {
    let (head_direction, head_still) = unit_or_zero(head_velocity);
    let (tail_direction, tail_still) = unit_or_zero(tail_velocity);
    let omega = if head_still || tail_still {
        0.0
    } else {
        angle_between(head_direction, tail_direction)
    };

    let segment = joint.tail - joint.head;
    let bone_length = segment.length();

    let mut ribbon = BoneRibbon {
        deltas: Vec::with_capacity(group.len()),
        colinear: Vec::with_capacity(group.len()),
        w0: Vec::with_capacity(group.len()),
        w1: Vec::with_capacity(group.len()),
    };

    for &vertex in &group.vertices {
        let position = positions[vertex];
        let w0 = smooth_step(distance_from_tail(position, joint.head, joint.tail));
        let w1 = 1.0 - w0;
        ribbon.w0.push(w0);
        ribbon.w1.push(w1);

        // A zero-length bone has no axis to measure across.
        if bone_length == 0.0 {
            ribbon.deltas.push(0.0);
            ribbon.colinear.push(0.0);
            continue;
        }
        let axis = segment / bone_length;

        let blended = blend_directions(head_direction, tail_direction, w0, w1, omega);
        let along_axis = blended.dot(axis);
        let normal = (blended - along_axis * axis).normalize_or_zero();

        ribbon
            .deltas
            .push(finite_or_zero((position - joint.head).dot(normal)));
        ribbon
            .colinear
            .push(finite_or_zero(1.0 - along_axis * along_axis));
    }

    ribbon
}

fn unit_or_zero(v: Vec3) -> (Vec3, bool) {
    let length = v.length();
    if length == 0.0 {
        (v, true)
    } else {
        (v / length, false)
    }
}

/// Shared inputs of the skeletal computer for every frame of a bake.
pub(crate) struct RibbonContext<'a> {
    samples: &'a AnimationSamples,
    hierarchy: &'a BoneHierarchy,
    groups: Vec<VertexGroup>,
    /// Number of children of each bone that have a vertex group.
    grouped_children: Vec<usize>,
}

impl<'a> RibbonContext<'a> {
    pub(crate) fn new(samples: &'a AnimationSamples, rig: &'a Rig) -> Result<Self, Error> {
        let hierarchy = &rig.hierarchy;
        let bone_count = hierarchy.len();

        if !samples.range().is_empty() && samples.bone_count() != bone_count {
            return Err(Error::JointCountMismatch {
                frame: samples.range().start,
                expected: bone_count,
                actual: samples.bone_count(),
            });
        }
        if rig.skin.vertex_count() != samples.vertex_count() {
            return Err(Error::SkinVertexCountMismatch {
                expected: samples.vertex_count(),
                actual: rig.skin.vertex_count(),
            });
        }
        for index in 0..samples.frame_count() {
            if let Some(joint) = samples
                .joints_at(index)
                .iter()
                .find(|joint| joint.representative >= bone_count)
            {
                return Err(Error::UnknownBone {
                    bone: joint.representative,
                    bone_count,
                });
            }
        }

        let groups = rig.skin.groups(bone_count)?;
        let grouped_children = (0..bone_count)
            .map(|bone| {
                hierarchy
                    .children(bone)
                    .iter()
                    .filter(|&&child| !groups[child].is_empty())
                    .count()
            })
            .collect();

        Ok(Self {
            samples,
            hierarchy,
            groups,
            grouped_children,
        })
    }

    fn joint_velocities(&self, index: usize, bone: usize) -> (Vec3, Vec3) {
        let count = self.samples.frame_count();
        let head = velocity_at(count, index, |k| self.samples.joints_at(k)[bone].head);
        let tail = velocity_at(count, index, |k| self.samples.joints_at(k)[bone].tail);
        (head, tail)
    }
}

/// Phase one output for one frame. `bones[b]` is `None` for bones without vertices and for bones
/// that did not move.
#[derive(Clone, Debug, Default)]
pub(crate) struct FrameRibbons {
    pub(crate) bones: Vec<Option<BoneRibbon>>,
    pub(crate) joint_max: JointMax,
}

/// Raw ribbon deltas of every bone and the per-joint maxima for frame `index`.
///
/// Bones are visited in index order, which fixes the accumulation order of [`JointMax`].
pub(crate) fn ribbon_phase_one(context: &RibbonContext<'_>, index: usize) -> FrameRibbons {
    let positions = context.samples.positions_at(index);
    let joints = context.samples.joints_at(index);
    let mut out = FrameRibbons {
        bones: Vec::with_capacity(context.groups.len()),
        joint_max: JointMax::default(),
    };

    for (bone, group) in context.groups.iter().enumerate() {
        if group.is_empty() {
            out.bones.push(None);
            continue;
        }

        let (head_velocity, tail_velocity) = context.joint_velocities(index, bone);
        if head_velocity == Vec3::ZERO && tail_velocity == Vec3::ZERO {
            log::debug!("bone {bone} is still at frame index {index}");
            out.bones.push(None);
            continue;
        }

        let joint = &joints[bone];
        let ribbon = bone_ribbon(positions, group, joint, head_velocity, tail_velocity);
        let max_delta = ribbon.max_abs_delta();

        let representative = joint.representative;
        if representative == bone {
            let parent_key = JointKey::parent_of(context.hierarchy, bone);
            out.joint_max.accumulate_sum(parent_key, max_delta);
            out.joint_max
                .accumulate_sum(JointKey::Bone(bone), max_delta);
        } else {
            let parent_key = JointKey::parent_of(context.hierarchy, representative);
            out.joint_max.accumulate_max(parent_key, max_delta);
            out.joint_max
                .accumulate_max(JointKey::Bone(representative), max_delta);
        }

        out.bones.push(Some(ribbon));
    }

    out
}

/// Joint maxima normalizing `bone` at its parent end and child end.
pub(crate) fn joint_normalizers(
    context: &RibbonContext<'_>,
    joints: &[JointSample],
    joint_max: &JointMax,
    bone: usize,
) -> (f32, f32) {
    let hierarchy = context.hierarchy;
    let parent_end = |bone: usize| match hierarchy.parent(bone) {
        Some(parent) => {
            joint_max.get(JointKey::Bone(parent)) / (hierarchy.children(parent).len() + 1) as f32
        }
        None => joint_max.get(JointKey::Root),
    };

    let representative = joints[bone].representative;
    if representative != bone {
        return (
            parent_end(representative),
            joint_max.get(JointKey::Bone(representative)),
        );
    }

    let children = hierarchy.children(bone);
    let children_pruned = children
        .iter()
        .all(|&child| joints[child].representative != child);
    let child_end = if children_pruned {
        joint_max.get(JointKey::Bone(bone))
    } else {
        joint_max.get(JointKey::Bone(bone)) / (context.grouped_children[bone] + 1) as f32
    };

    (parent_end(bone), child_end)
}

/// Normalizes and accumulates phase one results into one delta per vertex for frame `index`.
pub(crate) fn ribbon_phase_two(
    context: &RibbonContext<'_>,
    index: usize,
    ribbons: &FrameRibbons,
) -> Vec<f32> {
    let joints = context.samples.joints_at(index);
    let mut deltas = vec![0.0f32; context.samples.vertex_count()];

    for (bone, ribbon) in ribbons.bones.iter().enumerate() {
        let Some(ribbon) = ribbon else {
            continue;
        };
        let group = &context.groups[bone];
        let (max_parent, max_child) = joint_normalizers(context, joints, &ribbons.joint_max, bone);

        for (i, &vertex) in group.vertices.iter().enumerate() {
            let denominator = ribbon.w0[i] * max_parent + ribbon.w1[i] * max_child;
            if denominator == 0.0 {
                log::trace!("bone {bone}, vertex {vertex}: zero denominator");
            }
            let normalized = div_or_zero(ribbon.deltas[i], denominator);
            deltas[vertex] += finite_or_zero(ribbon.colinear[i] * group.weights[i] * normalized);
        }
    }

    deltas
}

/// Deltas of a skinned mesh measured per bone across each bone's motion.
///
/// Every frame runs in two phases: first each moving bone's raw deltas and the per-joint maxima
/// are gathered for all bones, then each vertex accumulates its skin-weighted deltas normalized
/// by the maxima at the two joints of each influencing bone. Vertices outside every group get 0.
pub fn ribbon_deltas(samples: &AnimationSamples, rig: &Rig) -> Result<DeltaField, Error> {
    let context = RibbonContext::new(samples, rig)?;
    let range = samples.range();

    let mut frames = Vec::with_capacity(samples.frame_count());
    for (index, frame) in range.frames().enumerate() {
        log::debug!("computing ribbon deltas for frame {frame}");
        let ribbons = ribbon_phase_one(&context, index);
        frames.push(ribbon_phase_two(&context, index, &ribbons));
    }

    Ok(DeltaField::from_frames(range, frames))
}
