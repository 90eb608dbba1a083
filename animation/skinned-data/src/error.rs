use thiserror::Error;

/// Error types for skeleton construction and clip queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SkinnedError {
    /// The requested clip name is not registered on the skeleton
    #[error("Clip not found: '{0}'")]
    ClipNotFound(String),

    /// A bone in a clip has no keyframes
    #[error("Empty bone timeline: clip '{clip}', bone {bone} has no keyframes")]
    EmptyBoneTimeline { clip: String, bone: usize },

    /// Keyframe times of a bone are not in ascending order
    #[error(
        "Unsorted bone timeline: clip '{clip}', bone {bone}, keyframe {index} is earlier than its predecessor"
    )]
    UnsortedBoneTimeline {
        clip: String,
        bone: usize,
        index: usize,
    },

    /// A keyframe time is NaN or infinite
    #[error("Non-finite keyframe time: clip '{clip}', bone {bone}, keyframe {index}")]
    NonFiniteKeyframeTime {
        clip: String,
        bone: usize,
        index: usize,
    },

    /// Parent indices, offsets, or clip track counts do not describe a valid skeleton
    #[error("Malformed hierarchy: {0}")]
    MalformedHierarchy(String),
}

/// Result type using SkinnedError
pub type Result<T> = std::result::Result<T, SkinnedError>;
