use crate::Error;
use std::collections::HashMap;

/// Inclusive range of integer frames. `start > end` is the empty range.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct FrameRange {
    pub start: i32,
    pub end: i32,
}

impl FrameRange {
    pub const fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    pub const fn empty() -> Self {
        Self { start: 0, end: -1 }
    }

    /// Smallest range covering every keyframe of every list (eg. mesh, armature and camera
    /// keyframes). Empty when no list has a keyframe.
    pub fn from_keyframes<I, L>(lists: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: IntoIterator<Item = i32>,
    {
        let mut bounds: Option<(i32, i32)> = None;
        for frame in lists.into_iter().flatten() {
            bounds = Some(match bounds {
                Some((start, end)) => (start.min(frame), end.max(frame)),
                None => (frame, frame),
            });
        }
        match bounds {
            Some((start, end)) => Self::new(start, end),
            None => Self::empty(),
        }
    }

    pub fn is_empty(self) -> bool {
        self.start > self.end
    }

    pub fn len(self) -> usize {
        if self.is_empty() {
            0
        } else {
            (i64::from(self.end) - i64::from(self.start)) as usize + 1
        }
    }

    pub fn contains(self, frame: i32) -> bool {
        frame >= self.start && frame <= self.end
    }

    pub fn frames(self) -> impl Iterator<Item = i32> {
        self.start..=self.end
    }

    /// Dense index of `frame`, ie. `frame - start`.
    pub fn index_of(self, frame: i32) -> Option<usize> {
        if self.contains(frame) {
            Some((i64::from(frame) - i64::from(self.start)) as usize)
        } else {
            None
        }
    }

    /// Clamps `frame` to the nearest boundary frame. The empty range returns `frame` unchanged.
    pub fn clamp(self, frame: i32) -> i32 {
        if self.is_empty() {
            frame
        } else {
            frame.clamp(self.start, self.end)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BoneData {
    pub name: String,
    pub parent: Option<usize>,
}

/// Bones in index order plus the derived child lists. Construction rejects dangling parents and
/// cycles.
#[derive(Clone, Debug)]
pub struct BoneHierarchy {
    bones: Vec<BoneData>,
    children: Vec<Vec<usize>>,
    roots: Vec<usize>,
    name_index: HashMap<String, usize>,
}

impl BoneHierarchy {
    pub fn new(bones: Vec<BoneData>) -> Result<Self, Error> {
        let bone_count = bones.len();
        let mut children = vec![Vec::new(); bone_count];
        let mut roots = Vec::new();
        for (index, bone) in bones.iter().enumerate() {
            match bone.parent {
                Some(parent) if parent >= bone_count => {
                    return Err(Error::UnknownBoneParent {
                        bone: index,
                        parent,
                    });
                }
                Some(parent) => children[parent].push(index),
                None => roots.push(index),
            }
        }

        for start in 0..bone_count {
            let mut current = start;
            let mut steps = 0usize;
            while let Some(parent) = bones[current].parent {
                steps += 1;
                if parent == start || steps > bone_count {
                    return Err(Error::HierarchyCycle { bone: start });
                }
                current = parent;
            }
        }

        let mut name_index = HashMap::with_capacity(bone_count);
        for (index, bone) in bones.iter().enumerate() {
            name_index.entry(bone.name.clone()).or_insert(index);
        }

        Ok(Self {
            bones,
            children,
            roots,
            name_index,
        })
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    pub fn bones(&self) -> &[BoneData] {
        &self.bones
    }

    pub fn bone(&self, bone: usize) -> Option<&BoneData> {
        self.bones.get(bone)
    }

    pub fn parent(&self, bone: usize) -> Option<usize> {
        self.bones.get(bone).and_then(|b| b.parent)
    }

    pub fn children(&self, bone: usize) -> &[usize] {
        self.children.get(bone).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    /// Every bone below `bone`, depth first, not including `bone` itself.
    pub fn descendants(&self, bone: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut stack: Vec<usize> = self.children(bone).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoneWeight {
    pub bone: usize,
    pub weight: f32,
}

/// Vertices influenced by one bone, in ascending vertex order, with their weights.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VertexGroup {
    pub vertices: Vec<usize>,
    pub weights: Vec<f32>,
}

impl VertexGroup {
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }
}

/// Skin weights per vertex. Weights are used as given; they are never renormalized.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SkinWeights {
    vertices: Vec<Vec<BoneWeight>>,
}

impl SkinWeights {
    pub fn new(vertices: Vec<Vec<BoneWeight>>) -> Self {
        Self { vertices }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertex(&self, vertex: usize) -> &[BoneWeight] {
        self.vertices.get(vertex).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Inverts the per-vertex lists into one [`VertexGroup`] per bone.
    pub fn groups(&self, bone_count: usize) -> Result<Vec<VertexGroup>, Error> {
        let mut groups = vec![VertexGroup::default(); bone_count];
        for (vertex, influences) in self.vertices.iter().enumerate() {
            for influence in influences {
                let group = groups.get_mut(influence.bone).ok_or(Error::UnknownBone {
                    bone: influence.bone,
                    bone_count,
                })?;
                group.vertices.push(vertex);
                group.weights.push(influence.weight);
            }
        }
        Ok(groups)
    }
}

/// Skeleton side of a bake: the bone tree and how the mesh is bound to it.
#[derive(Clone, Debug)]
pub struct Rig {
    pub hierarchy: BoneHierarchy,
    pub skin: SkinWeights,
}

impl Rig {
    pub fn new(hierarchy: BoneHierarchy, skin: SkinWeights) -> Self {
        Self { hierarchy, skin }
    }
}

/// Baked smear deltas: one scalar per vertex for every frame of `range`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeltaField {
    range: FrameRange,
    frames: Vec<Vec<f32>>,
}

impl DeltaField {
    pub fn new(range: FrameRange, frames: Vec<Vec<f32>>) -> Result<Self, Error> {
        if frames.len() != range.len() {
            return Err(Error::FrameCountMismatch {
                start: range.start,
                end: range.end,
                expected: range.len(),
                actual: frames.len(),
            });
        }
        let expected = frames.first().map(Vec::len).unwrap_or(0);
        for (frame, values) in range.frames().zip(&frames) {
            if values.len() != expected {
                return Err(Error::VertexCountMismatch {
                    frame,
                    expected,
                    actual: values.len(),
                });
            }
        }
        Ok(Self { range, frames })
    }

    pub(crate) fn from_frames(range: FrameRange, frames: Vec<Vec<f32>>) -> Self {
        debug_assert_eq!(frames.len(), range.len());
        Self { range, frames }
    }

    pub fn empty() -> Self {
        Self {
            range: FrameRange::empty(),
            frames: Vec::new(),
        }
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.frames.first().map(Vec::len).unwrap_or(0)
    }

    pub fn get(&self, frame: i32) -> Option<&[f32]> {
        let index = self.range.index_of(frame)?;
        self.frames.get(index).map(Vec::as_slice)
    }

    pub(crate) fn frame_at(&self, index: usize) -> &[f32] {
        &self.frames[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, &[f32])> {
        self.range
            .frames()
            .zip(self.frames.iter().map(Vec::as_slice))
    }

    pub fn into_frames(self) -> Vec<Vec<f32>> {
        self.frames
    }

    /// Name of the per-frame point attribute the effect system reads, eg. `delta_12`.
    pub fn attribute_name(frame: i32) -> String {
        format!("delta_{frame}")
    }
}
