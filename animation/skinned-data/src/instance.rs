//! Per-character playback state

use std::sync::Arc;

use log::debug;

use crate::clip::AnimationClip;
use crate::error::Result;
use crate::matrix::Mat4;
use crate::skinned::SkinnedData;

/// Looping playback of one clip on a shared skeleton
///
/// Each instance owns its time cursor and output buffer, so instances built
/// from the same [`SkinnedData`] can be advanced on different threads.
#[derive(Debug, Clone)]
pub struct SkinnedModelInstance {
    skinned_data: Arc<SkinnedData>,
    clip_name: String,
    clip: Arc<AnimationClip>,
    /// Current playback time in seconds
    time_pos: f32,
    final_transforms: Vec<Mat4>,
}

impl SkinnedModelInstance {
    /// Start playing `clip_name` from time zero
    ///
    /// Fails with [`crate::SkinnedError::ClipNotFound`] if the skeleton has
    /// no such clip. The final transforms are populated for time zero.
    pub fn new(skinned_data: Arc<SkinnedData>, clip_name: &str) -> Result<Self> {
        let clip = skinned_data.clip_handle(clip_name)?;
        let mut instance = Self {
            final_transforms: Vec::with_capacity(skinned_data.bone_count()),
            skinned_data,
            clip_name: clip_name.to_string(),
            clip,
            time_pos: 0.0,
        };
        instance.refresh();
        Ok(instance)
    }

    /// Advance playback by `dt` seconds and recompute the final transforms
    ///
    /// Once the time passes the clip's end it wraps back to zero.
    pub fn update(&mut self, dt: f32) {
        self.time_pos += dt;
        if self.time_pos > self.clip.clip_end_time() {
            self.time_pos = 0.0;
        }
        self.refresh();
    }

    /// Switch to another clip and rewind to zero
    pub fn set_clip(&mut self, clip_name: &str) -> Result<()> {
        self.clip = self.skinned_data.clip_handle(clip_name)?;
        self.clip_name = clip_name.to_string();
        self.time_pos = 0.0;
        self.refresh();
        debug!("Switched instance to clip '{}'", clip_name);
        Ok(())
    }

    /// Name of the clip being played
    pub fn clip_name(&self) -> &str {
        &self.clip_name
    }

    /// Current playback time
    pub fn time_pos(&self) -> f32 {
        self.time_pos
    }

    /// Skinning matrices for the current time
    pub fn final_transforms(&self) -> &[Mat4] {
        &self.final_transforms
    }

    /// Shared skeleton this instance animates
    pub fn skinned_data(&self) -> &Arc<SkinnedData> {
        &self.skinned_data
    }

    fn refresh(&mut self) {
        self.skinned_data
            .evaluate(&self.clip, self.time_pos, &mut self.final_transforms);
    }
}
