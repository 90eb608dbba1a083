//! Data structures for M3D models

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::str::FromStr;

use skinned_data::{SkinnedData, Vec3};

use crate::error::{M3dError, Result};
use crate::parser::M3dParser;

/// Section counts from the file header
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct M3dHeader {
    /// Number of materials, which is also the number of subsets
    pub material_count: usize,
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of triangles
    pub triangle_count: usize,
    /// Number of bones; zero for a static mesh
    pub bone_count: usize,
    /// Number of animation clips
    pub clip_count: usize,
}

/// Surface description for one subset
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    pub name: String,
    pub diffuse_albedo: [f32; 3],
    pub fresnel_r0: [f32; 3],
    pub roughness: f32,
    /// Whether texels below an alpha threshold are discarded
    pub alpha_clip: bool,
    pub material_type_name: String,
    pub diffuse_map_name: String,
    pub normal_map_name: String,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            diffuse_albedo: [1.0, 1.0, 1.0],
            fresnel_r0: [0.01, 0.01, 0.01],
            roughness: 0.5,
            alpha_clip: false,
            material_type_name: "Skinned".to_string(),
            diffuse_map_name: "default_diffuse.dds".to_string(),
            normal_map_name: "default_nmap.dds".to_string(),
        }
    }
}

/// Range of vertices and triangles drawn with one material
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Subset {
    pub id: u32,
    pub vertex_start: usize,
    pub vertex_count: usize,
    pub face_start: usize,
    pub face_count: usize,
}

/// Maximum number of bones that may influence a single vertex
pub const MAX_BONE_INFLUENCES: usize = 4;

/// Bone influences on one vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexBlend {
    pub weights: [f32; MAX_BONE_INFLUENCES],
    pub indices: [u8; MAX_BONE_INFLUENCES],
}

/// One mesh vertex
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vertex {
    pub position: Vec3,
    /// Tangent with handedness in `w`
    pub tangent: [f32; 4],
    pub normal: Vec3,
    pub tex_coords: [f32; 2],
    /// Present exactly when the model has bones
    pub blend: Option<VertexBlend>,
}

/// A loaded M3D model
#[derive(Debug, Clone)]
pub struct M3dModel {
    pub header: M3dHeader,
    pub materials: Vec<Material>,
    pub subsets: Vec<Subset>,
    pub vertices: Vec<Vertex>,
    /// Triangle list, three indices per triangle
    pub indices: Vec<u32>,
    /// Skeleton and clips; `None` for a static mesh
    pub skinned_data: Option<SkinnedData>,
}

impl M3dModel {
    /// Load a model from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        M3dParser::new().parse(&mut reader)
    }

    /// Save the model to a file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);
        M3dParser::new().write(&mut writer, self)
    }

    /// Check whether the model carries a skeleton
    pub fn is_skinned(&self) -> bool {
        self.skinned_data.is_some()
    }

    /// Triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [tri[0], tri[1], tri[2]])
    }
}

impl FromStr for M3dModel {
    type Err = M3dError;

    fn from_str(s: &str) -> Result<Self> {
        M3dParser::new().parse(&mut s.as_bytes())
    }
}
