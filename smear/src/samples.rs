use crate::{CameraView, Error, FrameRange};
use glam::Vec3;

/// World-space head and tail of one bone at one frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BonePose {
    pub head: Vec3,
    pub tail: Vec3,
}

impl BonePose {
    pub fn new(head: Vec3, tail: Vec3) -> Self {
        Self { head, tail }
    }
}

/// Joint positions used for a bone at one frame.
///
/// `head`/`tail` are the transform of `representative`, which is the bone itself unless it was
/// discarded by pruning, in which case it is its nearest kept ancestor.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct JointSample {
    pub head: Vec3,
    pub tail: Vec3,
    pub representative: usize,
}

/// Source of per-frame animation data, typically a host application evaluating its scene.
pub trait SampleProvider {
    /// World-space vertex positions at `frame`. Must return the same count for every frame.
    fn vertex_positions(&self, frame: i32) -> Vec<Vec3>;

    /// Pose of every bone at `frame`, indexed like the bone hierarchy. Empty without a skeleton.
    fn bone_poses(&self, _frame: i32) -> Vec<BonePose> {
        Vec::new()
    }

    fn camera_view(&self, _frame: i32) -> Option<CameraView> {
        None
    }
}

/// Fully materialized samples for a frame range, stored densely by `frame - range.start`.
#[derive(Clone, Debug)]
pub struct AnimationSamples {
    range: FrameRange,
    positions: Vec<Vec<Vec3>>,
    joints: Vec<Vec<JointSample>>,
}

impl AnimationSamples {
    /// `joints` may be empty for a mesh without a skeleton; otherwise it needs one entry per
    /// frame with the same bone count throughout.
    pub fn new(
        range: FrameRange,
        positions: Vec<Vec<Vec3>>,
        joints: Vec<Vec<JointSample>>,
    ) -> Result<Self, Error> {
        let frame_count = range.len();
        if positions.len() != frame_count {
            return Err(Error::FrameCountMismatch {
                start: range.start,
                end: range.end,
                expected: frame_count,
                actual: positions.len(),
            });
        }
        if !joints.is_empty() && joints.len() != frame_count {
            return Err(Error::FrameCountMismatch {
                start: range.start,
                end: range.end,
                expected: frame_count,
                actual: joints.len(),
            });
        }

        let vertex_count = positions.first().map(Vec::len).unwrap_or(0);
        for (frame, frame_positions) in range.frames().zip(&positions) {
            if frame_positions.len() != vertex_count {
                return Err(Error::VertexCountMismatch {
                    frame,
                    expected: vertex_count,
                    actual: frame_positions.len(),
                });
            }
        }

        let bone_count = joints.first().map(Vec::len).unwrap_or(0);
        for (frame, frame_joints) in range.frames().zip(&joints) {
            if frame_joints.len() != bone_count {
                return Err(Error::JointCountMismatch {
                    frame,
                    expected: bone_count,
                    actual: frame_joints.len(),
                });
            }
        }

        Ok(Self {
            range,
            positions,
            joints,
        })
    }

    /// Samples every frame of `range` from `provider` before anything is differenced.
    ///
    /// With `representatives`, each bone's joints are taken from its representative's pose.
    /// Without, every bone represents itself. When `camera_pov` is set and the provider reports a
    /// camera for a frame, positions and joints are converted to that camera's space.
    pub fn collect<P: SampleProvider + ?Sized>(
        provider: &P,
        range: FrameRange,
        representatives: Option<&[usize]>,
        camera_pov: bool,
    ) -> Result<Self, Error> {
        let mut positions = Vec::with_capacity(range.len());
        let mut joints = Vec::with_capacity(range.len());

        for frame in range.frames() {
            log::trace!("sampling frame {frame}");
            let mut frame_positions = provider.vertex_positions(frame);
            let poses = provider.bone_poses(frame);

            let mut frame_joints = match representatives {
                Some(representatives) => {
                    if representatives.len() != poses.len() {
                        return Err(Error::RepresentativeCountMismatch {
                            expected: poses.len(),
                            actual: representatives.len(),
                        });
                    }
                    let mut out = Vec::with_capacity(representatives.len());
                    for &representative in representatives {
                        let pose = poses.get(representative).ok_or(Error::UnknownBone {
                            bone: representative,
                            bone_count: poses.len(),
                        })?;
                        out.push(JointSample {
                            head: pose.head,
                            tail: pose.tail,
                            representative,
                        });
                    }
                    out
                }
                None => poses
                    .iter()
                    .enumerate()
                    .map(|(bone, pose)| JointSample {
                        head: pose.head,
                        tail: pose.tail,
                        representative: bone,
                    })
                    .collect(),
            };

            if camera_pov {
                if let Some(view) = provider.camera_view(frame) {
                    view.points_to_camera_space(&mut frame_positions);
                    for joint in &mut frame_joints {
                        joint.head = view.to_camera_space(joint.head);
                        joint.tail = view.to_camera_space(joint.tail);
                    }
                }
            }

            positions.push(frame_positions);
            if !frame_joints.is_empty() {
                joints.push(frame_joints);
            }
        }

        if !joints.is_empty() && joints.len() != positions.len() {
            return Err(Error::InvalidValue {
                message: "provider returned bone poses for only some frames".to_string(),
            });
        }

        Self::new(range, positions, joints)
    }

    pub fn range(&self) -> FrameRange {
        self.range
    }

    pub fn frame_count(&self) -> usize {
        self.positions.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.first().map(Vec::len).unwrap_or(0)
    }

    pub fn bone_count(&self) -> usize {
        self.joints.first().map(Vec::len).unwrap_or(0)
    }

    pub fn has_joints(&self) -> bool {
        !self.joints.is_empty()
    }

    pub fn positions(&self, frame: i32) -> Option<&[Vec3]> {
        let index = self.range.index_of(frame)?;
        self.positions.get(index).map(Vec::as_slice)
    }

    pub fn joints(&self, frame: i32) -> Option<&[JointSample]> {
        let index = self.range.index_of(frame)?;
        self.joints.get(index).map(Vec::as_slice)
    }

    pub(crate) fn positions_at(&self, index: usize) -> &[Vec3] {
        &self.positions[index]
    }

    /// Empty for samples without a skeleton.
    pub(crate) fn joints_at(&self, index: usize) -> &[JointSample] {
        self.joints.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every frame's positions back to back in frame order.
    pub fn aggregated_positions(&self) -> Vec<Vec3> {
        self.positions.iter().flatten().copied().collect()
    }
}
