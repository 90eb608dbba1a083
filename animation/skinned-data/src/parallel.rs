// parallel.rs - Batch playback updates across many instances

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::Result;
use crate::instance::SkinnedModelInstance;
use crate::matrix::Mat4;
use crate::skinned::SkinnedData;

/// Advance every instance by `dt` seconds, one rayon task per instance
#[cfg(feature = "parallel")]
pub fn update_instances(instances: &mut [SkinnedModelInstance], dt: f32) {
    instances.par_iter_mut().for_each(|instance| instance.update(dt));
}

/// Advance every instance by `dt` seconds
#[cfg(not(feature = "parallel"))]
pub fn update_instances(instances: &mut [SkinnedModelInstance], dt: f32) {
    for instance in instances {
        instance.update(dt);
    }
}

/// Evaluate one clip at several times against the same skeleton
///
/// Results are returned in the order of `times`.
#[cfg(feature = "parallel")]
pub fn sample_clip(data: &SkinnedData, clip_name: &str, times: &[f32]) -> Result<Vec<Vec<Mat4>>> {
    times
        .par_iter()
        .map(|&t| data.final_transforms(clip_name, t))
        .collect()
}

/// Evaluate one clip at several times against the same skeleton
///
/// Results are returned in the order of `times`.
#[cfg(not(feature = "parallel"))]
pub fn sample_clip(data: &SkinnedData, clip_name: &str, times: &[f32]) -> Result<Vec<Vec<Mat4>>> {
    times
        .iter()
        .map(|&t| data.final_transforms(clip_name, t))
        .collect()
}
