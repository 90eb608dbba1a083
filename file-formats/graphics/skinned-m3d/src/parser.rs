//! Reader and writer for M3D text models
//!
//! An M3D file is a sequence of whitespace-separated tokens grouped into
//! sections, each introduced by a star-padded banner such as
//! `***************Vertices**********************`. Values are preceded by
//! a label token (`Position:`, `Roughness:` and so on), which the reader
//! checks so that a malformed file is reported at the line where it first
//! diverges.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::str::FromStr;

use log::{debug, warn};
use skinned_data::{AnimationClip, BoneAnimation, Keyframe, MAX_BONES, Mat4, Quat, SkinnedData, Vec3};

use crate::error::{M3dError, Result};
use crate::types::{M3dHeader, M3dModel, MAX_BONE_INFLUENCES, Material, Subset, Vertex, VertexBlend};
use crate::validation::validate_m3d_model;

const BANNER_WIDTH: usize = 45;

/// Section names in file order
const HEADER: &str = "m3d-File-Header";
const MATERIALS: &str = "Materials";
const SUBSETS: &str = "SubsetTable";
const VERTICES: &str = "Vertices";
const TRIANGLES: &str = "Triangles";
const BONE_OFFSETS: &str = "BoneOffsets";
const BONE_HIERARCHY: &str = "BoneHierarchy";
const ANIMATION_CLIPS: &str = "AnimationClips";

/// Reader and writer for M3D files
///
/// # Examples
///
/// ```rust,no_run
/// use std::fs::File;
/// use std::io::BufReader;
/// use skinned_m3d::M3dParser;
///
/// let file = File::open("soldier.m3d").unwrap();
/// let mut reader = BufReader::new(file);
/// let model = M3dParser::new().parse(&mut reader).unwrap();
/// println!("{} vertices", model.vertices.len());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct M3dParser {
    /// Skip cross-section validation after reading
    skip_validation: bool,
}

impl M3dParser {
    /// Creates a parser that validates every model it reads
    pub fn new() -> Self {
        Self {
            skip_validation: false,
        }
    }

    /// Creates a parser that only checks syntax and skeleton structure
    ///
    /// Index ranges of triangles, subsets, and blend data are not checked.
    pub fn without_validation() -> Self {
        Self {
            skip_validation: true,
        }
    }

    /// Parses an M3D model from a reader
    pub fn parse<R: Read>(&self, reader: &mut R) -> Result<M3dModel> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        let mut tokens = Tokens::new(&text);

        tokens.banner(HEADER)?;
        let header = M3dHeader {
            material_count: tokens.labeled("#Materials")?,
            vertex_count: tokens.labeled("#Vertices")?,
            triangle_count: tokens.labeled("#Triangles")?,
            bone_count: tokens.labeled("#Bones")?,
            clip_count: tokens.labeled("#AnimationClips")?,
        };

        debug!(
            "M3D header: {} materials, {} vertices, {} triangles, {} bones, {} clips",
            header.material_count,
            header.vertex_count,
            header.triangle_count,
            header.bone_count,
            header.clip_count
        );

        if header.bone_count > MAX_BONES {
            return Err(M3dError::TooManyBones {
                count: header.bone_count,
                max: MAX_BONES,
            });
        }
        if header.bone_count == 0 && header.clip_count > 0 {
            return Err(M3dError::ValidationError(format!(
                "{} animation clips declared for a model without bones",
                header.clip_count
            )));
        }

        tokens.banner(MATERIALS)?;
        let materials = (0..header.material_count)
            .map(|_| read_material(&mut tokens))
            .collect::<Result<Vec<_>>>()?;

        tokens.banner(SUBSETS)?;
        let subsets = (0..header.material_count)
            .map(|_| read_subset(&mut tokens))
            .collect::<Result<Vec<_>>>()?;

        tokens.banner(VERTICES)?;
        let skinned = header.bone_count > 0;
        let vertices = (0..header.vertex_count)
            .map(|_| read_vertex(&mut tokens, skinned))
            .collect::<Result<Vec<_>>>()?;

        tokens.banner(TRIANGLES)?;
        let index_count = header.triangle_count.checked_mul(3).ok_or_else(|| {
            M3dError::ValidationError(format!(
                "triangle count {} is out of range",
                header.triangle_count
            ))
        })?;
        let indices = (0..index_count)
            .map(|_| tokens.number("triangle index"))
            .collect::<Result<Vec<u32>>>()?;

        tokens.banner(BONE_OFFSETS)?;
        let mut offsets = Vec::with_capacity(header.bone_count);
        for bone in 0..header.bone_count {
            tokens.expect(&format!("BoneOffset{bone}"))?;
            offsets.push(Mat4::from_rows_array(tokens.floats("bone offset")?));
        }

        tokens.banner(BONE_HIERARCHY)?;
        let mut parents = Vec::with_capacity(header.bone_count);
        for bone in 0..header.bone_count {
            parents.push(tokens.labeled(&format!("ParentIndexOfBone{bone}:"))?);
        }

        tokens.banner(ANIMATION_CLIPS)?;
        let mut clips = HashMap::new();
        for _ in 0..header.clip_count {
            let (name, clip) = read_clip(&mut tokens, header.bone_count)?;
            if clips.insert(name.clone(), clip).is_some() {
                return Err(M3dError::ValidationError(format!(
                    "duplicate animation clip '{name}'"
                )));
            }
        }

        if let Some((line, token)) = tokens.peek() {
            warn!("Ignoring trailing data at line {line}: '{token}'");
        }

        let skinned_data = if skinned {
            Some(SkinnedData::new(parents, offsets, clips)?)
        } else {
            None
        };

        let model = M3dModel {
            header,
            materials,
            subsets,
            vertices,
            indices,
            skinned_data,
        };

        if !self.skip_validation {
            validate_m3d_model(&model)?;
        }

        Ok(model)
    }

    /// Writes an M3D model to a writer
    ///
    /// Header counts are taken from the model's contents, not from
    /// `model.header`.
    pub fn write<W: Write>(&self, writer: &mut W, model: &M3dModel) -> Result<()> {
        let skeleton = model.skinned_data.as_ref();
        let bone_count = skeleton.map_or(0, SkinnedData::bone_count);
        let clips = skeleton.map_or_else(Vec::new, SkinnedData::clips);

        writeln!(writer, "{}", banner(HEADER))?;
        writeln!(writer, "#Materials {}", model.materials.len())?;
        writeln!(writer, "#Vertices {}", model.vertices.len())?;
        writeln!(writer, "#Triangles {}", model.indices.len() / 3)?;
        writeln!(writer, "#Bones {}", bone_count)?;
        writeln!(writer, "#AnimationClips {}", clips.len())?;
        writeln!(writer)?;

        writeln!(writer, "{}", banner(MATERIALS))?;
        for material in &model.materials {
            let [r, g, b] = material.diffuse_albedo;
            let [fr, fg, fb] = material.fresnel_r0;
            writeln!(writer, "Name: {}", material.name)?;
            writeln!(writer, "Diffuse: {r} {g} {b}")?;
            writeln!(writer, "Fresnel0: {fr} {fg} {fb}")?;
            writeln!(writer, "Roughness: {}", material.roughness)?;
            writeln!(writer, "AlphaClip: {}", u8::from(material.alpha_clip))?;
            writeln!(writer, "MaterialTypeName: {}", material.material_type_name)?;
            writeln!(writer, "DiffuseMap: {}", material.diffuse_map_name)?;
            writeln!(writer, "NormalMap: {}", material.normal_map_name)?;
            writeln!(writer)?;
        }

        writeln!(writer, "{}", banner(SUBSETS))?;
        for subset in &model.subsets {
            writeln!(
                writer,
                "SubsetID: {} VertexStart: {} VertexCount: {} FaceStart: {} FaceCount: {}",
                subset.id,
                subset.vertex_start,
                subset.vertex_count,
                subset.face_start,
                subset.face_count
            )?;
        }
        writeln!(writer)?;

        writeln!(writer, "{}", banner(VERTICES))?;
        for vertex in &model.vertices {
            let p = vertex.position;
            let [tx, ty, tz, tw] = vertex.tangent;
            let n = vertex.normal;
            let [u, v] = vertex.tex_coords;
            writeln!(writer, "Position: {} {} {}", p.x, p.y, p.z)?;
            writeln!(writer, "Tangent: {tx} {ty} {tz} {tw}")?;
            writeln!(writer, "Normal: {} {} {}", n.x, n.y, n.z)?;
            writeln!(writer, "Tex-Coords: {u} {v}")?;
            if bone_count > 0 {
                let blend = vertex.blend.unwrap_or_default();
                let [w0, w1, w2, w3] = blend.weights;
                let [i0, i1, i2, i3] = blend.indices;
                writeln!(writer, "BlendWeights: {w0} {w1} {w2} {w3}")?;
                writeln!(writer, "BlendIndices: {i0} {i1} {i2} {i3}")?;
            }
            writeln!(writer)?;
        }

        writeln!(writer, "{}", banner(TRIANGLES))?;
        for [a, b, c] in model.triangles() {
            writeln!(writer, "{a} {b} {c}")?;
        }
        writeln!(writer)?;

        writeln!(writer, "{}", banner(BONE_OFFSETS))?;
        if let Some(skeleton) = skeleton {
            for (bone, offset) in skeleton.offsets().iter().enumerate() {
                write!(writer, "BoneOffset{bone}")?;
                for value in offset.as_array() {
                    write!(writer, " {value}")?;
                }
                writeln!(writer)?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "{}", banner(BONE_HIERARCHY))?;
        if let Some(skeleton) = skeleton {
            for (bone, parent) in skeleton.parents().iter().enumerate() {
                writeln!(writer, "ParentIndexOfBone{bone}: {parent}")?;
            }
        }
        writeln!(writer)?;

        writeln!(writer, "{}", banner(ANIMATION_CLIPS))?;
        for (name, clip) in &clips {
            write_clip(writer, name, clip)?;
        }

        writer.flush()?;
        Ok(())
    }
}

fn banner(name: &str) -> String {
    let stars = BANNER_WIDTH.saturating_sub(name.len() + 15).max(3);
    format!("{}{}{}", "*".repeat(15), name, "*".repeat(stars))
}

fn read_material(tokens: &mut Tokens<'_>) -> Result<Material> {
    Ok(Material {
        name: tokens.labeled_string("Name:")?,
        diffuse_albedo: tokens.labeled_floats("Diffuse:")?,
        fresnel_r0: tokens.labeled_floats("Fresnel0:")?,
        roughness: tokens.labeled("Roughness:")?,
        alpha_clip: tokens.labeled_flag("AlphaClip:")?,
        material_type_name: tokens.labeled_string("MaterialTypeName:")?,
        diffuse_map_name: tokens.labeled_string("DiffuseMap:")?,
        normal_map_name: tokens.labeled_string("NormalMap:")?,
    })
}

fn read_subset(tokens: &mut Tokens<'_>) -> Result<Subset> {
    Ok(Subset {
        id: tokens.labeled("SubsetID:")?,
        vertex_start: tokens.labeled("VertexStart:")?,
        vertex_count: tokens.labeled("VertexCount:")?,
        face_start: tokens.labeled("FaceStart:")?,
        face_count: tokens.labeled("FaceCount:")?,
    })
}

fn read_vertex(tokens: &mut Tokens<'_>, skinned: bool) -> Result<Vertex> {
    let [px, py, pz] = tokens.labeled_floats("Position:")?;
    let tangent = tokens.labeled_floats("Tangent:")?;
    let [nx, ny, nz] = tokens.labeled_floats("Normal:")?;
    let tex_coords = tokens.labeled_floats("Tex-Coords:")?;

    let blend = if skinned {
        let weights = tokens.labeled_floats("BlendWeights:")?;
        tokens.expect("BlendIndices:")?;
        let mut indices = [0u8; MAX_BONE_INFLUENCES];
        for index in &mut indices {
            *index = tokens.number("blend index")?;
        }
        Some(VertexBlend { weights, indices })
    } else {
        None
    };

    Ok(Vertex {
        position: Vec3::new(px, py, pz),
        tangent,
        normal: Vec3::new(nx, ny, nz),
        tex_coords,
        blend,
    })
}

fn read_clip(tokens: &mut Tokens<'_>, bone_count: usize) -> Result<(String, AnimationClip)> {
    let name = tokens.labeled_string("AnimationClip")?;
    tokens.expect("{")?;

    let mut tracks = Vec::with_capacity(bone_count);
    for bone in 0..bone_count {
        tokens.expect(&format!("Bone{bone}"))?;
        let count: usize = tokens.labeled("#Keyframes:")?;
        tokens.expect("{")?;

        let mut keyframes = Vec::new();
        for _ in 0..count {
            let time = tokens.labeled("Time:")?;
            let [tx, ty, tz] = tokens.labeled_floats("Pos:")?;
            let [sx, sy, sz] = tokens.labeled_floats("Scale:")?;
            let [qx, qy, qz, qw] = tokens.labeled_floats("Quat:")?;
            keyframes.push(Keyframe::new(
                time,
                Vec3::new(tx, ty, tz),
                Vec3::new(sx, sy, sz),
                Quat::new(qx, qy, qz, qw),
            ));
        }

        tokens.expect("}")?;
        tracks.push(BoneAnimation::new(keyframes));
    }

    tokens.expect("}")?;
    debug!("Read clip '{}' for {} bones", name, bone_count);
    Ok((name, AnimationClip::new(tracks)))
}

fn write_clip<W: Write>(writer: &mut W, name: &str, clip: &AnimationClip) -> Result<()> {
    writeln!(writer, "AnimationClip {name}")?;
    writeln!(writer, "{{")?;
    for (bone, track) in clip.bone_animations().iter().enumerate() {
        writeln!(writer, "\tBone{bone} #Keyframes: {}", track.len())?;
        writeln!(writer, "\t{{")?;
        for key in track.keyframes() {
            let (p, s, q) = (key.translation, key.scale, key.rotation);
            writeln!(
                writer,
                "\t\tTime: {} Pos: {} {} {} Scale: {} {} {} Quat: {} {} {} {}",
                key.time, p.x, p.y, p.z, s.x, s.y, s.z, q.x, q.y, q.z, q.w
            )?;
        }
        writeln!(writer, "\t}}")?;
        writeln!(writer)?;
    }
    writeln!(writer, "}}")?;
    writeln!(writer)?;
    Ok(())
}

/// Whitespace tokens with 1-based line numbers
struct Tokens<'a> {
    tokens: Vec<(usize, &'a str)>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = text
            .lines()
            .enumerate()
            .flat_map(|(i, line)| line.split_whitespace().map(move |t| (i + 1, t)))
            .collect();
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<(usize, &'a str)> {
        self.tokens.get(self.pos).copied()
    }

    fn next(&mut self, expected: &str) -> Result<(usize, &'a str)> {
        let token = self.peek().ok_or_else(|| M3dError::UnexpectedEof {
            expected: expected.to_string(),
        })?;
        self.pos += 1;
        Ok(token)
    }

    fn expect(&mut self, label: &str) -> Result<()> {
        let (line, token) = self.next(label)?;
        if token != label {
            return Err(M3dError::UnexpectedToken {
                line,
                expected: label.to_string(),
                found: token.to_string(),
            });
        }
        Ok(())
    }

    /// Section banners match on their name, whatever the star padding
    fn banner(&mut self, name: &str) -> Result<()> {
        let expected = banner(name);
        let (line, token) = self.next(&expected)?;
        if !token.starts_with('*') || token.trim_matches('*') != name {
            return Err(M3dError::UnexpectedToken {
                line,
                expected,
                found: token.to_string(),
            });
        }
        Ok(())
    }

    fn number<T: FromStr>(&mut self, what: &str) -> Result<T> {
        let (line, token) = self.next(what)?;
        token.parse().map_err(|_| M3dError::InvalidNumber {
            line,
            token: token.to_string(),
        })
    }

    fn floats<const N: usize>(&mut self, what: &str) -> Result<[f32; N]> {
        let mut values = [0.0; N];
        for value in &mut values {
            *value = self.number(what)?;
        }
        Ok(values)
    }

    fn labeled<T: FromStr>(&mut self, label: &str) -> Result<T> {
        self.expect(label)?;
        self.number(label)
    }

    fn labeled_floats<const N: usize>(&mut self, label: &str) -> Result<[f32; N]> {
        self.expect(label)?;
        self.floats(label)
    }

    fn labeled_string(&mut self, label: &str) -> Result<String> {
        self.expect(label)?;
        let (_, token) = self.next(label)?;
        Ok(token.to_string())
    }

    fn labeled_flag(&mut self, label: &str) -> Result<bool> {
        self.expect(label)?;
        let (line, token) = self.next(label)?;
        match token {
            "0" => Ok(false),
            "1" => Ok(true),
            _ => Err(M3dError::UnexpectedToken {
                line,
                expected: "0 or 1".to_string(),
                found: token.to_string(),
            }),
        }
    }
}
