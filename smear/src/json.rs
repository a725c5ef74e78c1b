//! JSON bake documents: sampled animation in, delta attributes out.

use crate::{
    BakeSettings, BoneData, BoneHierarchy, BonePose, BoneWeight, CameraView, DEFAULT_SMOOTH_WINDOW,
    DeltaField, Error, FrameRange, Rig, SampleProvider, SkinWeights, bake_from_provider,
    discard_descendants,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Deserialize)]
struct Root {
    #[serde(default)]
    frames: Option<FramesDef>,
    #[serde(default)]
    keyframes: Vec<Vec<i32>>,
    #[serde(default)]
    settings: SettingsDef,
    #[serde(default)]
    bones: Vec<BoneDef>,
    #[serde(default)]
    prune: Vec<String>,
    #[serde(default)]
    weights: Vec<Vec<WeightDef>>,
    #[serde(default)]
    samples: Vec<SampleDef>,
}

#[derive(Debug, Deserialize)]
struct FramesDef {
    start: i32,
    end: i32,
}

fn default_smooth_window() -> usize {
    DEFAULT_SMOOTH_WINDOW
}

#[derive(Debug, Deserialize)]
struct SettingsDef {
    #[serde(default, rename = "fullBody")]
    full_body: bool,
    #[serde(default = "default_smooth_window", rename = "smoothWindow")]
    smooth_window: usize,
    #[serde(default, rename = "cameraPov")]
    camera_pov: bool,
}

impl Default for SettingsDef {
    fn default() -> Self {
        Self {
            full_body: false,
            smooth_window: default_smooth_window(),
            camera_pov: false,
        }
    }
}

#[derive(Debug, Deserialize)]
struct BoneDef {
    name: String,
    #[serde(default)]
    parent: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WeightDef {
    bone: String,
    weight: f32,
}

#[derive(Debug, Deserialize)]
struct PoseDef {
    head: [f32; 3],
    tail: [f32; 3],
}

#[derive(Debug, Deserialize)]
struct CameraDef {
    #[serde(default)]
    location: [f32; 3],
    #[serde(default)]
    rotation: [f32; 3],
}

#[derive(Debug, Deserialize)]
struct SampleDef {
    vertices: Vec<[f32; 3]>,
    #[serde(default)]
    bones: HashMap<String, PoseDef>,
    #[serde(default)]
    camera: Option<CameraDef>,
}

#[derive(Clone, Debug)]
struct DocumentFrame {
    positions: Vec<Vec3>,
    poses: Vec<BonePose>,
    camera: Option<CameraView>,
}

/// A parsed bake request: pre-sampled frames, the optional rig and the bake settings.
#[derive(Clone, Debug)]
pub struct BakeDocument {
    pub range: FrameRange,
    pub settings: BakeSettings,
    pub rig: Option<Rig>,
    /// Bones discarded by pruning, already expanded to every pruned descendant.
    pub discarded: Vec<usize>,
    frames: Vec<DocumentFrame>,
}

impl BakeDocument {
    pub fn from_json_str(input: &str) -> Result<Self, Error> {
        let root: Root = serde_json::from_str(input).map_err(|e| Error::JsonParse {
            message: e.to_string(),
        })?;

        let range = match root.frames {
            Some(frames) => FrameRange::new(frames.start, frames.end),
            None if !root.keyframes.is_empty() => FrameRange::from_keyframes(root.keyframes),
            None if root.samples.is_empty() => FrameRange::empty(),
            None => FrameRange::new(0, root.samples.len() as i32 - 1),
        };
        if root.samples.len() != range.len() {
            return Err(Error::FrameCountMismatch {
                start: range.start,
                end: range.end,
                expected: range.len(),
                actual: root.samples.len(),
            });
        }

        let settings = BakeSettings {
            full_body: root.settings.full_body,
            smooth_window: root.settings.smooth_window,
            camera_pov: root.settings.camera_pov,
        };

        let mut bone_index = HashMap::<String, usize>::new();
        for (index, bone) in root.bones.iter().enumerate() {
            bone_index.entry(bone.name.clone()).or_insert(index);
        }
        let mut bones = Vec::with_capacity(root.bones.len());
        for bone in &root.bones {
            let parent = match bone.parent.as_deref() {
                Some(parent) => match bone_index.get(parent) {
                    Some(&index) => Some(index),
                    None => {
                        return Err(Error::JsonUnknownBoneParent {
                            bone: bone.name.clone(),
                            parent: parent.to_string(),
                        });
                    }
                },
                None => None,
            };
            bones.push(BoneData {
                name: bone.name.clone(),
                parent,
            });
        }

        let vertex_count = root.samples.first().map(|s| s.vertices.len()).unwrap_or(0);

        let (rig, discarded) = if bones.is_empty() {
            (None, Vec::new())
        } else {
            let hierarchy = BoneHierarchy::new(bones)?;
            let skin = parse_weights(root.weights, &bone_index, vertex_count);

            let mut selected = Vec::with_capacity(root.prune.len());
            for name in &root.prune {
                let bone = bone_index
                    .get(name)
                    .copied()
                    .ok_or_else(|| Error::JsonUnknownBone {
                        context: "prune".to_string(),
                        bone: name.clone(),
                    })?;
                selected.push(bone);
            }
            let discarded = discard_descendants(&hierarchy, &selected);
            (Some(Rig::new(hierarchy, skin)), discarded)
        };

        let mut frames = Vec::with_capacity(root.samples.len());
        for (sample_index, sample) in root.samples.into_iter().enumerate() {
            let poses = match &rig {
                Some(rig) => {
                    let mut poses = Vec::with_capacity(rig.hierarchy.len());
                    for bone in rig.hierarchy.bones() {
                        let pose = sample.bones.get(&bone.name).ok_or_else(|| {
                            Error::JsonMissingBonePose {
                                sample: sample_index,
                                bone: bone.name.clone(),
                            }
                        })?;
                        poses.push(BonePose::new(
                            Vec3::from_array(pose.head),
                            Vec3::from_array(pose.tail),
                        ));
                    }
                    poses
                }
                None => Vec::new(),
            };

            frames.push(DocumentFrame {
                positions: sample.vertices.into_iter().map(Vec3::from_array).collect(),
                poses,
                camera: sample.camera.map(|c| {
                    CameraView::new(Vec3::from_array(c.location), Vec3::from_array(c.rotation))
                }),
            });
        }

        Ok(Self {
            range,
            settings,
            rig,
            discarded,
            frames,
        })
    }

    /// Bakes the document with its own settings.
    pub fn bake(&self) -> Result<DeltaField, Error> {
        bake_from_provider(
            self,
            self.range,
            self.rig.as_ref(),
            &self.discarded,
            &self.settings,
        )
    }

    fn frame(&self, frame: i32) -> Option<&DocumentFrame> {
        self.frames.get(self.range.index_of(frame)?)
    }
}

impl SampleProvider for BakeDocument {
    fn vertex_positions(&self, frame: i32) -> Vec<Vec3> {
        self.frame(frame)
            .map(|f| f.positions.clone())
            .unwrap_or_default()
    }

    fn bone_poses(&self, frame: i32) -> Vec<BonePose> {
        self.frame(frame)
            .map(|f| f.poses.clone())
            .unwrap_or_default()
    }

    fn camera_view(&self, frame: i32) -> Option<CameraView> {
        self.frame(frame).and_then(|f| f.camera)
    }
}

fn parse_weights(
    weights: Vec<Vec<WeightDef>>,
    bone_index: &HashMap<String, usize>,
    vertex_count: usize,
) -> SkinWeights {
    if weights.is_empty() {
        return SkinWeights::new(vec![Vec::new(); vertex_count]);
    }

    let vertices = weights
        .into_iter()
        .enumerate()
        .map(|(vertex, influences)| {
            influences
                .into_iter()
                .filter_map(|w| match bone_index.get(&w.bone) {
                    Some(&bone) => Some(BoneWeight {
                        bone,
                        weight: w.weight,
                    }),
                    None => {
                        log::warn!(
                            "vertex {vertex}: skipping weight for '{}', not a bone",
                            w.bone
                        );
                        None
                    }
                })
                .collect()
        })
        .collect();
    SkinWeights::new(vertices)
}

#[derive(Debug, Serialize)]
struct DeltaFieldDef<'a> {
    #[serde(rename = "firstFrame")]
    first_frame: i32,
    #[serde(rename = "lastFrame")]
    last_frame: i32,
    attributes: BTreeMap<String, &'a [f32]>,
}

/// Serializes `field` as `{"firstFrame", "lastFrame", "attributes": {"delta_N": [...]}}`.
pub fn delta_field_to_json_string(field: &DeltaField) -> Result<String, Error> {
    let range = field.range();
    let def = DeltaFieldDef {
        first_frame: range.start,
        last_frame: range.end,
        attributes: field
            .iter()
            .map(|(frame, values)| (DeltaField::attribute_name(frame), values))
            .collect(),
    };
    serde_json::to_string(&def).map_err(|e| Error::JsonWrite {
        message: e.to_string(),
    })
}
