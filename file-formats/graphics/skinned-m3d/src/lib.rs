//! Reader and writer for M3D text models.
//!
//! An M3D file describes a mesh (materials, subsets, vertices, triangles)
//! and, for skinned meshes, a skeleton with named animation clips. The
//! skeleton is returned as a [`skinned_data::SkinnedData`], ready for
//! evaluation.
//!
//! # Examples
//!
//! ```no_run
//! use skinned_m3d::M3dModel;
//!
//! let model = M3dModel::load("soldier.m3d")?;
//! if let Some(skeleton) = &model.skinned_data {
//!     let transforms = skeleton.final_transforms("Take1", 0.5)?;
//!     println!("{} skinning matrices", transforms.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod parser;
pub mod types;
pub mod validation;

pub use error::{M3dError, Result};
pub use parser::M3dParser;
pub use types::{M3dHeader, M3dModel, MAX_BONE_INFLUENCES, Material, Subset, Vertex, VertexBlend};
pub use validation::validate_m3d_model;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
