//! Skeletal animation evaluation for skinned meshes
//!
//! A [`SkinnedData`] holds a bone hierarchy, each bone's inverse bind-pose
//! offset, and a set of named [`AnimationClip`]s. Querying a clip at a time
//! produces one skinning matrix per bone, ready to be uploaded for
//! linear-blend skinning.
//!
//! Matrices use the row-vector convention: a point is transformed as
//! `p * M`, so `A * B` applies `A` first.
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use std::f32::consts::FRAC_PI_2;
//! use skinned_data::{AnimationClip, BoneAnimation, Keyframe, Mat4, Quat, SkinnedData, Vec3};
//!
//! let root = BoneAnimation::new(vec![Keyframe::new(
//!     0.0,
//!     Vec3::ZERO,
//!     Vec3::ONE,
//!     Quat::from_axis_angle(Vec3::Y, FRAC_PI_2),
//! )]);
//! let child = BoneAnimation::new(vec![Keyframe::new(
//!     0.0,
//!     Vec3::new(1.0, 0.0, 0.0),
//!     Vec3::ONE,
//!     Quat::IDENTITY,
//! )]);
//!
//! let mut clips = HashMap::new();
//! clips.insert("Turn".to_string(), AnimationClip::new(vec![root, child]));
//!
//! let offsets = vec![Mat4::IDENTITY, Mat4::from_translation(Vec3::new(-1.0, 0.0, 0.0))];
//! let skeleton = SkinnedData::new(vec![-1, 0], offsets, clips)?;
//!
//! let transforms = skeleton.final_transforms("Turn", 0.0)?;
//! let child_pos = transforms[1].transform_point(Vec3::new(1.0, 0.0, 0.0));
//! assert!(child_pos.distance(&Vec3::new(0.0, 0.0, -1.0)) < 1e-5);
//! # Ok::<(), skinned_data::SkinnedError>(())
//! ```

pub mod clip;
pub mod error;
pub mod instance;
pub mod keyframe;
pub mod matrix;
pub mod parallel;
pub mod skinned;
pub mod types;

pub use clip::AnimationClip;
pub use error::{Result, SkinnedError};
pub use instance::SkinnedModelInstance;
pub use keyframe::{BoneAnimation, Keyframe, TimelineFault, find_bracket};
pub use matrix::Mat4;
pub use skinned::{MAX_BONES, SkinnedData};
pub use types::{Lerp, Quat, Vec3};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
