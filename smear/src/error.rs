use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    #[error("unknown bone index {bone} (skeleton has {bone_count} bones)")]
    UnknownBone { bone: usize, bone_count: usize },

    #[error("bone {bone} has parent {parent} which does not exist")]
    UnknownBoneParent { bone: usize, parent: usize },

    #[error("bone hierarchy contains a cycle through bone {bone}")]
    HierarchyCycle { bone: usize },

    #[error("discarded bone {bone} has no kept ancestor")]
    NoKeptAncestor { bone: usize },

    #[error("expected {expected} sampled frames for range {start}..={end}, got {actual}")]
    FrameCountMismatch {
        start: i32,
        end: i32,
        expected: usize,
        actual: usize,
    },

    #[error("frame {frame} has {actual} vertices, expected {expected}")]
    VertexCountMismatch {
        frame: i32,
        expected: usize,
        actual: usize,
    },

    #[error("frame {frame} has {actual} joint samples, expected {expected}")]
    JointCountMismatch {
        frame: i32,
        expected: usize,
        actual: usize,
    },

    #[error("skin weights cover {actual} vertices, mesh has {expected}")]
    SkinVertexCountMismatch { expected: usize, actual: usize },

    #[error("representative list has {actual} entries, skeleton has {expected} bones")]
    RepresentativeCountMismatch { expected: usize, actual: usize },

    #[cfg(feature = "json")]
    #[error("failed to parse bake JSON: {message}")]
    JsonParse { message: String },

    #[cfg(feature = "json")]
    #[error("failed to write bake JSON: {message}")]
    JsonWrite { message: String },

    #[cfg(feature = "json")]
    #[error("unknown parent bone '{parent}' for bone '{bone}'")]
    JsonUnknownBoneParent { bone: String, parent: String },

    #[cfg(feature = "json")]
    #[error("unknown bone '{bone}' referenced by {context}")]
    JsonUnknownBone { context: String, bone: String },

    #[cfg(feature = "json")]
    #[error("missing pose for bone '{bone}' in sample {sample}")]
    JsonMissingBonePose { sample: usize, bone: String },
}
