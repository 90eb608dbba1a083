//! Animation clips: one timeline per bone for a single named action

use crate::keyframe::BoneAnimation;
use crate::matrix::Mat4;

/// A dense, per-bone set of timelines describing one action (e.g. "Walk")
///
/// Timelines are indexed by bone index, in the same order as the skeleton
/// the clip belongs to.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnimationClip {
    bone_animations: Vec<BoneAnimation>,
}

impl AnimationClip {
    /// Create a clip from per-bone timelines
    pub fn new(bone_animations: Vec<BoneAnimation>) -> Self {
        Self { bone_animations }
    }

    /// Per-bone timelines
    pub fn bone_animations(&self) -> &[BoneAnimation] {
        &self.bone_animations
    }

    /// Number of bone timelines
    pub fn bone_count(&self) -> usize {
        self.bone_animations.len()
    }

    /// Earliest start time over all bones
    pub fn clip_start_time(&self) -> f32 {
        self.bone_animations
            .iter()
            .map(BoneAnimation::start_time)
            .reduce(f32::min)
            .unwrap_or(0.0)
    }

    /// Latest end time over all bones
    pub fn clip_end_time(&self) -> f32 {
        self.bone_animations
            .iter()
            .map(BoneAnimation::end_time)
            .reduce(f32::max)
            .unwrap_or(0.0)
    }

    /// Length of the clip's time span
    pub fn duration(&self) -> f32 {
        self.clip_end_time() - self.clip_start_time()
    }

    /// Write each bone's local (to-parent) transform at time `t` into `out`
    ///
    /// `out` must hold at least [`bone_count`](Self::bone_count) matrices;
    /// extra entries are left untouched.
    pub fn interpolate(&self, t: f32, out: &mut [Mat4]) {
        debug_assert!(out.len() >= self.bone_animations.len());
        for (slot, animation) in out.iter_mut().zip(&self.bone_animations) {
            *slot = animation.interpolate(t);
        }
    }
}

impl From<Vec<BoneAnimation>> for AnimationClip {
    fn from(bone_animations: Vec<BoneAnimation>) -> Self {
        Self::new(bone_animations)
    }
}
