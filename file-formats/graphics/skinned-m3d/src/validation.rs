//! Validation functions for M3D models

use log::warn;
use skinned_data::MAX_BONES;

use crate::error::{M3dError, Result};
use crate::types::M3dModel;

/// Tolerance used when checking unit quantities
const UNIT_TOLERANCE: f32 = 1e-3;

/// Validates cross-references between the sections of a model
///
/// Structural problems are errors. Blend weights that do not sum to one and
/// rotations that are not unit quaternions are only logged.
pub fn validate_m3d_model(model: &M3dModel) -> Result<()> {
    validate_triangles(model)?;
    validate_subsets(model)?;
    validate_blend_data(model)?;
    check_keyframe_rotations(model);
    Ok(())
}

/// Validates that triangles reference existing vertices
fn validate_triangles(model: &M3dModel) -> Result<()> {
    if model.indices.len() % 3 != 0 {
        return Err(M3dError::ValidationError(format!(
            "Index count {} is not a multiple of 3",
            model.indices.len()
        )));
    }

    let vertex_count = model.vertices.len();
    if let Some((i, &index)) = model
        .indices
        .iter()
        .enumerate()
        .find(|&(_, &index)| index as usize >= vertex_count)
    {
        return Err(M3dError::ValidationError(format!(
            "Triangle {} references vertex {} (vertex count: {})",
            i / 3,
            index,
            vertex_count
        )));
    }

    Ok(())
}

/// Validates that subsets cover existing vertices and faces
fn validate_subsets(model: &M3dModel) -> Result<()> {
    if model.subsets.len() != model.materials.len() {
        return Err(M3dError::ValidationError(format!(
            "{} subsets for {} materials",
            model.subsets.len(),
            model.materials.len()
        )));
    }

    let vertex_count = model.vertices.len();
    let face_count = model.indices.len() / 3;

    for subset in &model.subsets {
        if subset.vertex_start + subset.vertex_count > vertex_count {
            return Err(M3dError::ValidationError(format!(
                "Subset {} vertex range {}..{} exceeds vertex count {}",
                subset.id,
                subset.vertex_start,
                subset.vertex_start + subset.vertex_count,
                vertex_count
            )));
        }
        if subset.face_start + subset.face_count > face_count {
            return Err(M3dError::ValidationError(format!(
                "Subset {} face range {}..{} exceeds triangle count {}",
                subset.id,
                subset.face_start,
                subset.face_start + subset.face_count,
                face_count
            )));
        }
    }

    Ok(())
}

/// Validates that blend data matches the skeleton
fn validate_blend_data(model: &M3dModel) -> Result<()> {
    let bone_count = model
        .skinned_data
        .as_ref()
        .map_or(0, |skeleton| skeleton.bone_count());

    if bone_count > MAX_BONES {
        return Err(M3dError::TooManyBones {
            count: bone_count,
            max: MAX_BONES,
        });
    }

    for (i, vertex) in model.vertices.iter().enumerate() {
        match (&vertex.blend, bone_count) {
            (None, 0) => {}
            (Some(_), 0) => {
                return Err(M3dError::ValidationError(format!(
                    "Vertex {i} has blend data but the model has no bones"
                )));
            }
            (None, _) => {
                return Err(M3dError::ValidationError(format!(
                    "Vertex {i} has no blend data"
                )));
            }
            (Some(blend), _) => {
                if let Some(&bone) = blend
                    .indices
                    .iter()
                    .find(|&&bone| bone as usize >= bone_count)
                {
                    return Err(M3dError::ValidationError(format!(
                        "Vertex {} references bone {} (bone count: {})",
                        i, bone, bone_count
                    )));
                }

                let sum: f32 = blend.weights.iter().sum();
                if (sum - 1.0).abs() > UNIT_TOLERANCE {
                    warn!("Vertex {i} blend weights sum to {sum}");
                }
            }
        }
    }

    Ok(())
}

/// Logs keyframe rotations that are not unit quaternions
fn check_keyframe_rotations(model: &M3dModel) {
    let Some(skeleton) = &model.skinned_data else {
        return;
    };

    for name in skeleton.clip_names() {
        let Some(clip) = skeleton.clip(name) else {
            continue;
        };
        for (bone, track) in clip.bone_animations().iter().enumerate() {
            if let Some(key) = track
                .keyframes()
                .iter()
                .find(|key| !key.rotation.is_normalized(UNIT_TOLERANCE))
            {
                warn!(
                    "Clip '{}', bone {}: rotation at t={} is not normalized",
                    name, bone, key.time
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{M3dHeader, Material, Subset, Vertex, VertexBlend};
    use skinned_data::{AnimationClip, BoneAnimation, Keyframe, Mat4, SkinnedData};
    use std::collections::HashMap;

    fn quad(skinned: bool) -> M3dModel {
        let blend = skinned.then_some(VertexBlend {
            weights: [1.0, 0.0, 0.0, 0.0],
            indices: [0, 0, 0, 0],
        });
        let vertices = (0..4)
            .map(|_| Vertex {
                blend,
                ..Vertex::default()
            })
            .collect();

        let skinned_data = skinned.then(|| {
            let mut clips = HashMap::new();
            clips.insert(
                "Idle".to_string(),
                AnimationClip::new(vec![BoneAnimation::new(vec![Keyframe::identity(0.0)])]),
            );
            SkinnedData::new(vec![-1], vec![Mat4::IDENTITY], clips).unwrap()
        });

        M3dModel {
            header: M3dHeader::default(),
            materials: vec![Material::default()],
            subsets: vec![Subset {
                id: 0,
                vertex_start: 0,
                vertex_count: 4,
                face_start: 0,
                face_count: 2,
            }],
            vertices,
            indices: vec![0, 1, 2, 0, 2, 3],
            skinned_data,
        }
    }

    #[test]
    fn test_valid_models() {
        assert!(validate_m3d_model(&quad(false)).is_ok());
        assert!(validate_m3d_model(&quad(true)).is_ok());
    }

    #[test]
    fn test_triangle_out_of_range() {
        let mut model = quad(false);
        model.indices[4] = 4;
        assert!(matches!(
            validate_m3d_model(&model),
            Err(M3dError::ValidationError(_))
        ));
    }

    #[test]
    fn test_partial_triangle() {
        let mut model = quad(false);
        model.indices.push(0);
        assert!(validate_m3d_model(&model).is_err());
    }

    #[test]
    fn test_subset_out_of_range() {
        let mut model = quad(false);
        model.subsets[0].face_count = 3;
        assert!(validate_m3d_model(&model).is_err());

        let mut model = quad(false);
        model.subsets[0].vertex_start = 1;
        assert!(validate_m3d_model(&model).is_err());
    }

    #[test]
    fn test_subset_material_mismatch() {
        let mut model = quad(false);
        model.materials.push(Material::default());
        assert!(validate_m3d_model(&model).is_err());
    }

    #[test]
    fn test_blend_index_out_of_range() {
        let mut model = quad(true);
        if let Some(blend) = model.vertices[3].blend.as_mut() {
            blend.indices[1] = 1;
        }
        let err = validate_m3d_model(&model).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: Vertex 3 references bone 1 (bone count: 1)"
        );
    }

    #[test]
    fn test_blend_presence_must_match_skeleton() {
        let mut model = quad(true);
        model.vertices[0].blend = None;
        assert!(validate_m3d_model(&model).is_err());

        let mut model = quad(false);
        model.vertices[0].blend = Some(VertexBlend::default());
        assert!(validate_m3d_model(&model).is_err());
    }
}
