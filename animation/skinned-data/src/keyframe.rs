//! Keyframes and per-bone timelines

use crate::matrix::Mat4;
use crate::types::{Lerp, Quat, Vec3};

/// One sampled pose on a bone timeline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Keyframe {
    /// Sample time in seconds
    pub time: f32,
    /// Translation relative to the parent bone
    pub translation: Vec3,
    /// Scale along the bone's local axes
    pub scale: Vec3,
    /// Rotation relative to the parent bone
    pub rotation: Quat,
}

impl Keyframe {
    /// Create a keyframe
    pub const fn new(time: f32, translation: Vec3, scale: Vec3, rotation: Quat) -> Self {
        Self {
            time,
            translation,
            scale,
            rotation,
        }
    }

    /// Keyframe at `time` with no transform
    pub const fn identity(time: f32) -> Self {
        Self::new(time, Vec3::ZERO, Vec3::ONE, Quat::IDENTITY)
    }

    /// Affine transform of this pose: scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

impl Default for Keyframe {
    fn default() -> Self {
        Self::identity(0.0)
    }
}

/// Ordered keyframe timeline for a single bone
///
/// A timeline is only guaranteed to be non-empty and time-ascending once it
/// has been accepted by [`crate::SkinnedData::new`] or [`BoneAnimation::check`].
/// An empty timeline evaluates to the identity transform.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoneAnimation {
    keyframes: Vec<Keyframe>,
}

/// Reason a timeline violates its invariants
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineFault {
    /// No keyframes at all
    Empty,
    /// Keyframe `index` is earlier than keyframe `index - 1`
    Unsorted { index: usize },
    /// Keyframe `index` has a NaN or infinite time
    NonFiniteTime { index: usize },
}

impl BoneAnimation {
    /// Create a timeline from keyframes in time order
    pub fn new(keyframes: Vec<Keyframe>) -> Self {
        Self { keyframes }
    }

    /// Keyframes of this timeline
    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    /// Number of keyframes
    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Check if the timeline has no keyframes
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    /// Verify the timeline is non-empty, finite and time-ascending
    pub fn check(&self) -> Result<(), TimelineFault> {
        if self.keyframes.is_empty() {
            return Err(TimelineFault::Empty);
        }
        if let Some(index) = self.keyframes.iter().position(|k| !k.time.is_finite()) {
            return Err(TimelineFault::NonFiniteTime { index });
        }
        match self
            .keyframes
            .windows(2)
            .position(|pair| pair[1].time < pair[0].time)
        {
            Some(i) => Err(TimelineFault::Unsorted { index: i + 1 }),
            None => Ok(()),
        }
    }

    /// Time of the first keyframe
    pub fn start_time(&self) -> f32 {
        self.keyframes.first().map_or(0.0, |k| k.time)
    }

    /// Time of the last keyframe
    pub fn end_time(&self) -> f32 {
        self.keyframes.last().map_or(0.0, |k| k.time)
    }

    /// Local transform of the bone at time `t`
    ///
    /// Times outside the timeline clamp to the first or last pose. A time
    /// equal to a keyframe's time reproduces that keyframe exactly. A NaN
    /// time evaluates to the first pose.
    pub fn interpolate(&self, t: f32) -> Mat4 {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return Mat4::IDENTITY;
        };

        if t.is_nan() || t <= first.time {
            return first.to_matrix();
        }
        if t >= last.time {
            return last.to_matrix();
        }

        // first.time < t < last.time, so 1 <= next < len
        let next = find_bracket(&self.keyframes, t);
        let k0 = &self.keyframes[next - 1];
        let k1 = &self.keyframes[next];

        if t == k1.time {
            return k1.to_matrix();
        }

        let frac = (t - k0.time) / (k1.time - k0.time);

        let scale = k0.scale.lerp(&k1.scale, frac);
        let translation = k0.translation.lerp(&k1.translation, frac);
        let rotation = k0.rotation.slerp(&k1.rotation, frac);

        Mat4::from_scale_rotation_translation(scale, rotation, translation)
    }
}

impl From<Vec<Keyframe>> for BoneAnimation {
    fn from(keyframes: Vec<Keyframe>) -> Self {
        Self::new(keyframes)
    }
}

/// Index of the later keyframe of the earliest pair bracketing `time`
///
/// This is the first keyframe whose time is not earlier than `time`. For a
/// time strictly inside the timeline the pair is `(index - 1, index)`, and
/// when `time` lands exactly on a keyframe the earlier of the two candidate
/// pairs is chosen.
pub fn find_bracket(keyframes: &[Keyframe], time: f32) -> usize {
    keyframes.partition_point(|k| k.time < time)
}
