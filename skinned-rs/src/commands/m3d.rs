//! M3D model command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Subcommand, ValueEnum};
use log::info;
use skinned_data::{Mat4, SkinnedData, SkinnedModelInstance};
use skinned_m3d::M3dModel;

use crate::utils::{
    NodeType, TreeNode, TreeOptions, add_table_row, bone_tree, create_table, format_matrix_row,
    format_time_range, format_vec3, render_tree,
};

#[derive(Subcommand)]
pub enum M3dCommands {
    /// Display information about an M3D model
    Info {
        /// Path to the M3D file
        file: PathBuf,

        /// Show materials and subsets
        #[arg(short, long)]
        detailed: bool,
    },

    /// Validate an M3D model
    Validate {
        /// Path to the M3D file
        file: PathBuf,
    },

    /// Display the bone hierarchy and clips as a tree
    Tree {
        /// Path to the M3D file
        file: PathBuf,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,
    },

    /// Print the final skinning matrices of a clip at a given time
    Pose {
        /// Path to the M3D file
        file: PathBuf,

        /// Clip name
        #[arg(short, long)]
        clip: String,

        /// Time in seconds
        #[arg(short, long, default_value = "0.0", allow_negative_numbers = true)]
        time: f32,

        /// Only print this bone
        #[arg(short, long)]
        bone: Option<usize>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: PoseFormat,
    },

    /// Play a clip and print a bone's animated position each frame
    Play {
        /// Path to the M3D file
        file: PathBuf,

        /// Clip name
        #[arg(short, long)]
        clip: String,

        /// Seconds per frame
        #[arg(long, default_value = "0.016")]
        dt: f32,

        /// Number of frames to advance
        #[arg(long, default_value = "60")]
        frames: usize,

        /// Bone to track
        #[arg(short, long, default_value = "0")]
        bone: usize,
    },
}

/// Output format for poses
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum PoseFormat {
    Table,
    Json,
}

pub fn execute(cmd: M3dCommands) -> Result<()> {
    match cmd {
        M3dCommands::Info { file, detailed } => handle_info(&file, detailed),
        M3dCommands::Validate { file } => handle_validate(&file),
        M3dCommands::Tree {
            file,
            depth,
            no_color,
        } => handle_tree(&file, depth, no_color),
        M3dCommands::Pose {
            file,
            clip,
            time,
            bone,
            format,
        } => handle_pose(&file, &clip, time, bone, format),
        M3dCommands::Play {
            file,
            clip,
            dt,
            frames,
            bone,
        } => handle_play(&file, &clip, dt, frames, bone),
    }
}

fn load_model(path: &Path) -> Result<M3dModel> {
    info!("Loading M3D model: {}", path.display());
    M3dModel::load(path).with_context(|| format!("Failed to load M3D model from {}", path.display()))
}

fn load_skeleton(path: &Path) -> Result<SkinnedData> {
    load_model(path)?
        .skinned_data
        .with_context(|| format!("{} is a static mesh without bones", path.display()))
}

fn check_bone(skeleton: &SkinnedData, bone: usize) -> Result<()> {
    if bone >= skeleton.bone_count() {
        bail!(
            "Bone {} out of range (model has {} bones)",
            bone,
            skeleton.bone_count()
        );
    }
    Ok(())
}

fn handle_info(path: &Path, detailed: bool) -> Result<()> {
    let model = load_model(path)?;

    println!("=== M3D Model Information ===");
    println!("File: {}", path.display());
    println!("Materials: {}", model.materials.len());
    println!("Vertices: {}", model.vertices.len());
    println!("Triangles: {}", model.indices.len() / 3);

    match &model.skinned_data {
        Some(skeleton) => {
            println!("Bones: {}", skeleton.bone_count());
            println!("Animation clips: {}", skeleton.clip_count());

            if skeleton.clip_count() > 0 {
                println!("\n=== Animation Clips ===");
                let mut table = create_table(vec!["Clip", "Start", "End", "Duration"]);
                for name in skeleton.clip_names() {
                    let start = skeleton.clip_start_time(name)?;
                    let end = skeleton.clip_end_time(name)?;
                    add_table_row(
                        &mut table,
                        vec![
                            name.to_string(),
                            format!("{start:.3}"),
                            format!("{end:.3}"),
                            format!("{:.3}", end - start),
                        ],
                    );
                }
                table.printstd();
            }
        }
        None => println!("Bones: 0 (static mesh)"),
    }

    if detailed {
        println!("\n=== Materials ===");
        let mut table = create_table(vec!["Name", "Type", "Roughness", "Alpha Clip", "Diffuse Map"]);
        for material in &model.materials {
            add_table_row(
                &mut table,
                vec![
                    material.name.clone(),
                    material.material_type_name.clone(),
                    format!("{:.2}", material.roughness),
                    if material.alpha_clip { "✓" } else { "✗" }.to_string(),
                    material.diffuse_map_name.clone(),
                ],
            );
        }
        table.printstd();

        println!("\n=== Subsets ===");
        let mut table = create_table(vec!["ID", "Vertices", "Faces"]);
        for subset in &model.subsets {
            add_table_row(
                &mut table,
                vec![
                    subset.id.to_string(),
                    format!(
                        "{}..{}",
                        subset.vertex_start,
                        subset.vertex_start + subset.vertex_count
                    ),
                    format!(
                        "{}..{}",
                        subset.face_start,
                        subset.face_start + subset.face_count
                    ),
                ],
            );
        }
        table.printstd();
    }

    Ok(())
}

fn handle_validate(path: &Path) -> Result<()> {
    let model = load_model(path)?;

    let bones = model
        .skinned_data
        .as_ref()
        .map_or(0, SkinnedData::bone_count);
    println!("✓ Model is valid");
    println!(
        "  {} vertices, {} triangles, {} bones",
        model.vertices.len(),
        model.indices.len() / 3,
        bones
    );
    Ok(())
}

fn handle_tree(path: &Path, depth: Option<usize>, no_color: bool) -> Result<()> {
    let model = load_model(path)?;

    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().to_string());
    let mut root = TreeNode::new(name, NodeType::Root)
        .with_metadata("vertices", &model.vertices.len().to_string())
        .with_metadata("triangles", &(model.indices.len() / 3).to_string());

    let mut materials = TreeNode::new("Materials".to_string(), NodeType::Header);
    for material in &model.materials {
        materials = materials.add_child(
            TreeNode::new(material.name.clone(), NodeType::Material)
                .with_metadata("type", &material.material_type_name),
        );
    }
    root = root.add_child(materials);

    if let Some(skeleton) = &model.skinned_data {
        let bones = TreeNode::new("Skeleton".to_string(), NodeType::Header)
            .with_metadata("bones", &skeleton.bone_count().to_string())
            .add_child(bone_tree(skeleton, 0));
        root = root.add_child(bones);

        let mut clips = TreeNode::new("Animation Clips".to_string(), NodeType::Header);
        for name in skeleton.clip_names() {
            let range = format_time_range(
                skeleton.clip_start_time(name)?,
                skeleton.clip_end_time(name)?,
            );
            clips = clips.add_child(
                TreeNode::new(name.to_string(), NodeType::Clip).with_metadata("range", &range),
            );
        }
        root = root.add_child(clips);
    }

    let options = TreeOptions {
        max_depth: depth,
        no_color,
        ..TreeOptions::default()
    };
    print!("{}", render_tree(&root, &options));
    Ok(())
}

fn handle_pose(
    path: &Path,
    clip: &str,
    time: f32,
    bone: Option<usize>,
    format: PoseFormat,
) -> Result<()> {
    let skeleton = load_skeleton(path)?;
    if let Some(bone) = bone {
        check_bone(&skeleton, bone)?;
    }

    let transforms = skeleton
        .final_transforms(clip, time)
        .with_context(|| format!("Failed to evaluate clip '{clip}'"))?;

    let selected: Vec<(usize, &Mat4)> = transforms
        .iter()
        .enumerate()
        .filter(|(i, _)| bone.is_none_or(|b| b == *i))
        .collect();

    match format {
        PoseFormat::Table => {
            println!("Clip '{}' at t={:.3}", clip, time);
            let mut table = create_table(vec!["Bone", "Row", "Values"]);
            for (i, matrix) in selected {
                for row in 0..4 {
                    let label = if row == 0 { i.to_string() } else { String::new() };
                    add_table_row(
                        &mut table,
                        vec![label, row.to_string(), format_matrix_row(matrix, row)],
                    );
                }
            }
            table.printstd();
        }
        PoseFormat::Json => print_pose_json(clip, time, &selected)?,
    }

    Ok(())
}

#[cfg(feature = "serde")]
fn print_pose_json(clip: &str, time: f32, selected: &[(usize, &Mat4)]) -> Result<()> {
    #[derive(serde::Serialize)]
    struct BonePose {
        bone: usize,
        rows: [[f32; 4]; 4],
    }

    #[derive(serde::Serialize)]
    struct PoseReport<'a> {
        clip: &'a str,
        time: f32,
        bones: Vec<BonePose>,
    }

    let bones = selected
        .iter()
        .map(|&(bone, matrix)| BonePose {
            bone,
            rows: std::array::from_fn(|row| std::array::from_fn(|col| matrix.get(row, col))),
        })
        .collect();

    let report = PoseReport { clip, time, bones };
    println!(
        "{}",
        serde_json::to_string_pretty(&report).context("Failed to serialize pose")?
    );
    Ok(())
}

#[cfg(not(feature = "serde"))]
fn print_pose_json(_clip: &str, _time: f32, _selected: &[(usize, &Mat4)]) -> Result<()> {
    bail!("JSON output requires the 'serde' feature")
}

fn handle_play(path: &Path, clip: &str, dt: f32, frames: usize, bone: usize) -> Result<()> {
    if !(dt.is_finite() && dt > 0.0) {
        bail!("Frame time must be a positive number of seconds, got {dt}");
    }

    let skeleton = Arc::new(load_skeleton(path)?);
    check_bone(&skeleton, bone)?;

    // Bind-pose origin of the bone in model space
    let origin = skeleton.offsets()[bone]
        .inverse_affine()
        .with_context(|| format!("Offset matrix of bone {bone} is not invertible"))?
        .translation();

    let mut instance = SkinnedModelInstance::new(Arc::clone(&skeleton), clip)
        .with_context(|| format!("Failed to start clip '{clip}'"))?;

    println!(
        "Playing '{}' ({}) tracking bone {}",
        clip,
        format_time_range(
            skeleton.clip_start_time(clip)?,
            skeleton.clip_end_time(clip)?
        ),
        bone
    );

    for frame in 0..frames {
        instance.update(dt);
        let position = instance.final_transforms()[bone].transform_point(origin);
        println!(
            "frame {:>4}  t={:.3}  {}",
            frame + 1,
            instance.time_pos(),
            format_vec3(position)
        );
    }

    Ok(())
}
