//! Skeleton data: bone hierarchy, bind-pose offsets, and named clips
//!
//! [`SkinnedData`] is built once at load time and is read-only afterwards.
//! Every structural check happens in [`SkinnedData::new`], so a constructed
//! value can be queried every frame without any failure mode other than an
//! unknown clip name.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::clip::AnimationClip;
use crate::error::{Result, SkinnedError};
use crate::keyframe::TimelineFault;
use crate::matrix::Mat4;

/// Maximum number of bones a skinning shader accepts per skeleton
pub const MAX_BONES: usize = 96;

/// Immutable skeleton shared by every animated instance of a model
#[derive(Debug, Clone)]
pub struct SkinnedData {
    /// Parent index per bone; the root holds itself or a negative sentinel
    parents: Vec<i32>,
    /// Inverse bind-pose transform per bone
    offsets: Vec<Mat4>,
    /// Named actions available on this skeleton
    clips: HashMap<String, Arc<AnimationClip>>,
}

impl SkinnedData {
    /// Build a skeleton from a parent-index hierarchy, bone offsets, and clips
    ///
    /// # Arguments
    /// * `parents` - Parent bone index for each bone. Bone 0 is the root and
    ///   holds `0` or a negative value; every other bone must name a parent
    ///   with a strictly smaller index.
    /// * `offsets` - Inverse bind-pose matrix for each bone
    /// * `clips` - Named clips, each with exactly one timeline per bone
    pub fn new(
        parents: Vec<i32>,
        offsets: Vec<Mat4>,
        clips: HashMap<String, AnimationClip>,
    ) -> Result<Self> {
        validate_hierarchy(&parents)?;

        if offsets.len() != parents.len() {
            return Err(SkinnedError::MalformedHierarchy(format!(
                "{} bone offsets for {} bones",
                offsets.len(),
                parents.len()
            )));
        }

        let mut names: Vec<&String> = clips.keys().collect();
        names.sort();
        for name in names {
            validate_clip(name, &clips[name], parents.len())?;
        }

        debug!(
            "Built skinned data: {} bones, {} clips",
            parents.len(),
            clips.len()
        );

        Ok(Self {
            parents,
            offsets,
            clips: clips
                .into_iter()
                .map(|(name, clip)| (name, Arc::new(clip)))
                .collect(),
        })
    }

    /// Number of bones
    pub fn bone_count(&self) -> usize {
        self.parents.len()
    }

    /// Raw parent indices, as passed to [`new`](Self::new)
    pub fn parents(&self) -> &[i32] {
        &self.parents
    }

    /// Parent of `bone`, or `None` for the root and out-of-range bones
    pub fn parent_of(&self, bone: usize) -> Option<usize> {
        if bone == 0 || bone >= self.parents.len() {
            return None;
        }
        Some(self.parents[bone] as usize)
    }

    /// Direct children of `bone`, in ascending order
    pub fn children_of(&self, bone: usize) -> Vec<usize> {
        (1..self.parents.len())
            .filter(|&i| self.parents[i] as usize == bone)
            .collect()
    }

    /// Inverse bind-pose matrices
    pub fn offsets(&self) -> &[Mat4] {
        &self.offsets
    }

    /// Number of registered clips
    pub fn clip_count(&self) -> usize {
        self.clips.len()
    }

    /// Clip names in lexical order
    pub fn clip_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.clips.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Clips paired with their names, in lexical name order
    pub fn clips(&self) -> Vec<(&str, &AnimationClip)> {
        let mut clips: Vec<(&str, &AnimationClip)> = self
            .clips
            .iter()
            .map(|(name, clip)| (name.as_str(), clip.as_ref()))
            .collect();
        clips.sort_unstable_by_key(|&(name, _)| name);
        clips
    }

    /// Look up a clip by name
    pub fn clip(&self, name: &str) -> Option<&AnimationClip> {
        self.clips.get(name).map(Arc::as_ref)
    }

    /// Check whether a clip is registered
    pub fn has_clip(&self, name: &str) -> bool {
        self.clips.contains_key(name)
    }

    /// Start time of the named clip
    pub fn clip_start_time(&self, name: &str) -> Result<f32> {
        Ok(self.clip_handle(name)?.clip_start_time())
    }

    /// End time of the named clip
    pub fn clip_end_time(&self, name: &str) -> Result<f32> {
        Ok(self.clip_handle(name)?.clip_end_time())
    }

    /// Final skinning matrices for every bone of the named clip at time `t`
    ///
    /// Entry `i` maps a model-space vertex into bone `i`'s bind space and then
    /// through the bone's animated pose back to model space.
    pub fn final_transforms(&self, clip_name: &str, t: f32) -> Result<Vec<Mat4>> {
        let mut out = Vec::with_capacity(self.bone_count());
        self.final_transforms_into(clip_name, t, &mut out)?;
        Ok(out)
    }

    /// Like [`final_transforms`](Self::final_transforms), writing into a caller-owned buffer
    ///
    /// The buffer is resized to [`bone_count`](Self::bone_count).
    pub fn final_transforms_into(&self, clip_name: &str, t: f32, out: &mut Vec<Mat4>) -> Result<()> {
        let clip = self
            .clips
            .get(clip_name)
            .ok_or_else(|| SkinnedError::ClipNotFound(clip_name.to_string()))?;
        self.evaluate(clip, t, out);
        Ok(())
    }

    /// Shared handle to a clip, for instances that outlive the lookup
    pub(crate) fn clip_handle(&self, name: &str) -> Result<Arc<AnimationClip>> {
        self.clips
            .get(name)
            .cloned()
            .ok_or_else(|| SkinnedError::ClipNotFound(name.to_string()))
    }

    /// Evaluate a clip that belongs to this skeleton
    pub(crate) fn evaluate(&self, clip: &AnimationClip, t: f32, out: &mut Vec<Mat4>) {
        let count = self.bone_count();
        out.clear();
        out.resize(count, Mat4::IDENTITY);

        // Local to-parent transforms
        clip.interpolate(t, out);

        // Compose to root in place; parents precede children
        for i in 1..count {
            let parent = self.parents[i] as usize;
            out[i] = out[i] * out[parent];
        }

        for (transform, offset) in out.iter_mut().zip(&self.offsets) {
            *transform = *offset * *transform;
        }

        trace!("Evaluated {} bones at t={}", count, t);
    }
}

/// Check the topological parent order
fn validate_hierarchy(parents: &[i32]) -> Result<()> {
    if parents.is_empty() {
        return Err(SkinnedError::MalformedHierarchy(
            "skeleton has no bones".to_string(),
        ));
    }

    if parents[0] > 0 {
        return Err(SkinnedError::MalformedHierarchy(format!(
            "root bone has parent {}",
            parents[0]
        )));
    }

    for (bone, &parent) in parents.iter().enumerate().skip(1) {
        if parent < 0 || parent as usize >= bone {
            return Err(SkinnedError::MalformedHierarchy(format!(
                "bone {} has parent {}, expected an index in 0..{}",
                bone, parent, bone
            )));
        }
    }

    Ok(())
}

/// Check that a clip covers every bone with a usable timeline
fn validate_clip(name: &str, clip: &AnimationClip, bone_count: usize) -> Result<()> {
    if clip.bone_count() != bone_count {
        return Err(SkinnedError::MalformedHierarchy(format!(
            "clip '{}' has {} bone timelines, skeleton has {} bones",
            name,
            clip.bone_count(),
            bone_count
        )));
    }

    for (bone, animation) in clip.bone_animations().iter().enumerate() {
        match animation.check() {
            Ok(()) => {}
            Err(TimelineFault::Empty) => {
                return Err(SkinnedError::EmptyBoneTimeline {
                    clip: name.to_string(),
                    bone,
                });
            }
            Err(TimelineFault::Unsorted { index }) => {
                return Err(SkinnedError::UnsortedBoneTimeline {
                    clip: name.to_string(),
                    bone,
                    index,
                });
            }
            Err(TimelineFault::NonFiniteTime { index }) => {
                return Err(SkinnedError::NonFiniteKeyframeTime {
                    clip: name.to_string(),
                    bone,
                    index,
                });
            }
        }
    }

    Ok(())
}
