//! Integration tests for reading and writing skinned M3D models

use pretty_assertions::assert_eq;
use skinned_data::{SkinnedError, Vec3};
use skinned_m3d::{M3dError, M3dModel, M3dParser};
use tempfile::TempDir;
use test_case::test_case;

const TWO_BONE_ARM: &str = "\
***************m3d-File-Header***************
#Materials 1
#Vertices 3
#Triangles 1
#Bones 2
#AnimationClips 2

***************Materials*********************
Name: skin
Diffuse: 1 0.9 0.8
Fresnel0: 0.02 0.02 0.02
Roughness: 0.6
AlphaClip: 0
MaterialTypeName: Skinned
DiffuseMap: skin.dds
NormalMap: skin_nmap.dds

***************SubsetTable*******************
SubsetID: 0 VertexStart: 0 VertexCount: 3 FaceStart: 0 FaceCount: 1

***************Vertices**********************
Position: 0 0 0
Tangent: 1 0 0 1
Normal: 0 1 0
Tex-Coords: 0 0
BlendWeights: 1 0 0 0
BlendIndices: 0 0 0 0

Position: 1 0 0
Tangent: 1 0 0 1
Normal: 0 1 0
Tex-Coords: 1 0
BlendWeights: 1 0 0 0
BlendIndices: 1 0 0 0

Position: 0.5 1 0
Tangent: 1 0 0 1
Normal: 0 0 1
Tex-Coords: 0.5 1
BlendWeights: 0.5 0.5 0 0
BlendIndices: 0 1 0 0

***************Triangles*********************
0 1 2

***************BoneOffsets*******************
BoneOffset0 1 0 0 0 0 1 0 0 0 0 1 0 0 0 0 1
BoneOffset1 1 0 0 0 0 1 0 0 0 0 1 0 -1 0 0 1

***************BoneHierarchy*****************
ParentIndexOfBone0: -1
ParentIndexOfBone1: 0

***************AnimationClips****************
AnimationClip Turn
{
	Bone0 #Keyframes: 1
	{
		Time: 0 Pos: 0 0 0 Scale: 1 1 1 Quat: 0 0.70710677 0 0.70710677
	}

	Bone1 #Keyframes: 1
	{
		Time: 0 Pos: 1 0 0 Scale: 1 1 1 Quat: 0 0 0 1
	}
}

AnimationClip Idle
{
	Bone0 #Keyframes: 2
	{
		Time: 0 Pos: 0 0 0 Scale: 1 1 1 Quat: 0 0 0 1
		Time: 1.5 Pos: 0 0.5 0 Scale: 1 1 1 Quat: 0 0 0 1
	}

	Bone1 #Keyframes: 1
	{
		Time: 0 Pos: 1 0 0 Scale: 1 1 1 Quat: 0 0 0 1
	}
}
";

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn test_load_skinned_model() {
    init_logger();
    let model: M3dModel = TWO_BONE_ARM.parse().unwrap();

    assert_eq!(model.header.bone_count, 2);
    assert_eq!(model.header.clip_count, 2);
    assert!(model.is_skinned());

    let blend = model.vertices[2].blend.unwrap();
    assert_eq!(blend.weights, [0.5, 0.5, 0.0, 0.0]);
    assert_eq!(blend.indices, [0, 1, 0, 0]);

    let skeleton = model.skinned_data.as_ref().unwrap();
    assert_eq!(skeleton.bone_count(), 2);
    assert_eq!(skeleton.parents(), &[-1, 0]);
    assert_eq!(skeleton.clip_names(), vec!["Idle", "Turn"]);
    assert_eq!(skeleton.clip_end_time("Idle").unwrap(), 1.5);
}

#[test]
fn test_loaded_skeleton_evaluates() {
    let model: M3dModel = TWO_BONE_ARM.parse().unwrap();
    let skeleton = model.skinned_data.unwrap();

    let transforms = skeleton.final_transforms("Turn", 0.0).unwrap();
    let child = transforms[1].transform_point(Vec3::new(1.0, 0.0, 0.0));
    assert!(child.distance(&Vec3::new(0.0, 0.0, -1.0)) < 1e-5);

    let transforms = skeleton.final_transforms("Idle", 0.75).unwrap();
    let lifted = transforms[1].transform_point(Vec3::new(1.0, 0.0, 0.0));
    assert!(lifted.distance(&Vec3::new(1.0, 0.25, 0.0)) < 1e-5);
}

#[test]
fn test_save_and_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("arm.m3d");

    let model: M3dModel = TWO_BONE_ARM.parse().unwrap();
    model.save(&path).unwrap();
    let reloaded = M3dModel::load(&path).unwrap();

    assert_eq!(reloaded.header, model.header);
    assert_eq!(reloaded.vertices, model.vertices);
    assert_eq!(reloaded.subsets, model.subsets);

    let before = model.skinned_data.unwrap();
    let after = reloaded.skinned_data.unwrap();
    assert_eq!(after.parents(), before.parents());
    assert_eq!(after.offsets(), before.offsets());
    for name in before.clip_names() {
        assert_eq!(after.clip(name), before.clip(name));
    }
}

#[test]
fn test_load_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = M3dModel::load(temp_dir.path().join("missing.m3d"));
    assert!(matches!(result, Err(M3dError::Io(_))));
}

#[test]
fn test_forward_parent_is_skeleton_error() {
    let broken = TWO_BONE_ARM
        .replace("ParentIndexOfBone0: -1", "ParentIndexOfBone0: 0")
        .replace("ParentIndexOfBone1: 0", "ParentIndexOfBone1: 5");
    let err = broken.parse::<M3dModel>().unwrap_err();
    assert!(matches!(
        err,
        M3dError::Skinned(SkinnedError::MalformedHierarchy(_))
    ));
}

#[test]
fn test_unsorted_keyframes_rejected() {
    let broken = TWO_BONE_ARM.replace("Time: 1.5", "Time: -1.5");
    let err = broken.parse::<M3dModel>().unwrap_err();
    assert!(matches!(
        err,
        M3dError::Skinned(SkinnedError::UnsortedBoneTimeline { bone: 0, index: 1, .. })
    ));
}

#[test]
fn test_duplicate_clip_name() {
    let broken = TWO_BONE_ARM.replace("AnimationClip Idle", "AnimationClip Turn");
    assert!(matches!(
        broken.parse::<M3dModel>(),
        Err(M3dError::ValidationError(_))
    ));
}

#[test_case("BlendIndices: 1 0 0 0", "BlendIndices: 2 0 0 0" ; "blend index past bone count")]
#[test_case("0 1 2", "0 1 3" ; "triangle index past vertex count")]
#[test_case("FaceCount: 1", "FaceCount: 2" ; "subset past triangle count")]
fn test_validation_failures(from: &str, to: &str) {
    let broken = TWO_BONE_ARM.replacen(from, to, 1);
    assert!(matches!(
        broken.parse::<M3dModel>(),
        Err(M3dError::ValidationError(_))
    ));

    let model = M3dParser::without_validation()
        .parse(&mut broken.as_bytes())
        .unwrap();
    assert_eq!(model.header.bone_count, 2);
}

#[test]
fn test_missing_bone_label() {
    let broken = TWO_BONE_ARM.replacen("BoneOffset1", "BoneOffset2", 1);
    let err = broken.parse::<M3dModel>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "Line 48: expected 'BoneOffset1', found 'BoneOffset2'"
    );
}

#[test]
fn test_nan_keyframe_time_rejected() {
    let broken = TWO_BONE_ARM.replace("Time: 1.5", "Time: NaN");
    let err = broken.parse::<M3dModel>().unwrap_err();
    assert!(matches!(
        err,
        M3dError::Skinned(SkinnedError::NonFiniteKeyframeTime { bone: 0, index: 1, .. })
    ));
}

#[test]
fn test_nan_query_time_on_loaded_skeleton() {
    let model: M3dModel = TWO_BONE_ARM.parse().unwrap();
    let skeleton = model.skinned_data.unwrap();

    let transforms = skeleton.final_transforms("Idle", f32::NAN).unwrap();
    assert_eq!(transforms, skeleton.final_transforms("Idle", 0.0).unwrap());
}

#[test_case("#Keyframes: 1", "#Keyframes: 18446744073709551615" ; "keyframe count")]
#[test_case("#AnimationClips 2", "#AnimationClips 18446744073709551615" ; "clip count")]
#[test_case("#Triangles 1", "#Triangles 18446744073709551615" ; "triangle count")]
fn test_oversized_count_is_error(from: &str, to: &str) {
    let broken = TWO_BONE_ARM.replacen(from, to, 1);
    assert!(broken.parse::<M3dModel>().is_err());
}

#[test]
fn test_triangle_count_overflow_message() {
    let broken = TWO_BONE_ARM.replacen("#Triangles 1", &format!("#Triangles {}", usize::MAX), 1);
    assert!(matches!(
        broken.parse::<M3dModel>(),
        Err(M3dError::ValidationError(message)) if message.contains("triangle count")
    ));
}

#[test]
fn test_trailing_data_is_ignored() {
    init_logger();
    let padded = format!("{TWO_BONE_ARM}\nAnimationClip Extra\n");
    let model: M3dModel = padded.parse().unwrap();
    assert_eq!(model.header.clip_count, 2);
    assert_eq!(model.skinned_data.unwrap().clip_count(), 2);
}
