//! Mesh building: Bezier generator, primitive generators, transform chains
//! and the per-model mesh cache.

pub mod bezier;
mod cache;
pub mod primitives;
pub mod transform;

pub use bezier::{
    generate, generate_from_patch_set, generate_patch_set_with_normal, generate_with_normal,
    resolve_patches, BezierModel, DEFAULT_NORMAL,
};
pub use cache::MeshCache;
pub use transform::{chain_matrix, flatten_world, op_matrix, PlacedModel};

use std::path::{Path, PathBuf};

use shared::{ModelSource, PatchParseError, PatchSet};

use crate::geometry::GeometryError;
use crate::viewport::mesh::MeshData;

/// Colour for models that do not declare one
pub const DEFAULT_COLOR: [f32; 3] = [0.72, 0.74, 0.78];

/// Failure to turn a model source into a mesh
#[derive(Debug)]
pub enum BuildError {
    Geometry(GeometryError),
    Parse {
        path: PathBuf,
        source: PatchParseError,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl std::fmt::Display for BuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildError::Geometry(e) => write!(f, "{}", e),
            BuildError::Parse { path, source } => {
                write!(f, "Failed to parse {}: {}", path.display(), source)
            }
            BuildError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for BuildError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BuildError::Geometry(e) => Some(e),
            BuildError::Parse { source, .. } => Some(source),
            BuildError::Io { source, .. } => Some(source),
        }
    }
}

impl From<GeometryError> for BuildError {
    fn from(e: GeometryError) -> Self {
        BuildError::Geometry(e)
    }
}

/// Largest tessellation the generator accepts
pub const MAX_TESSELLATION: u32 = crate::geometry::MAX_RESOLUTION as u32 - 1;

/// Samples per patch side for a tessellation level (segments per side).
/// Levels above `MAX_TESSELLATION` map past the generator's limit and are rejected there.
pub fn tessellation_resolution(tessellation: u32) -> usize {
    (tessellation as usize).saturating_add(1)
}

/// Read and parse a `.patch` file
pub fn load_patch_file(path: &Path) -> Result<PatchSet, BuildError> {
    let text = std::fs::read_to_string(path).map_err(|source| BuildError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    shared::parse_patch_set(&text).map_err(|source| BuildError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build the local-space mesh of a model source.
///
/// Relative patch file paths are resolved against `base_dir` when given.
pub fn build_model_mesh(
    source: &ModelSource,
    color: [f32; 3],
    base_dir: Option<&Path>,
) -> Result<MeshData, BuildError> {
    let mesh = match source {
        ModelSource::Plane { length, divisions } => primitives::plane(*length, *divisions, color)?,
        ModelSource::Box { length, divisions } => primitives::cube(*length, *divisions, color)?,
        ModelSource::Cone {
            radius,
            height,
            slices,
            stacks,
        } => primitives::cone(*radius, *height, *slices, *stacks, color)?,
        ModelSource::Sphere {
            radius,
            slices,
            stacks,
        } => primitives::sphere(*radius, *slices, *stacks, color)?,
        ModelSource::BezierFile { path, tessellation } => {
            let path = match base_dir {
                Some(dir) if Path::new(path).is_relative() => dir.join(path),
                _ => PathBuf::from(path),
            };
            let set = load_patch_file(&path)?;
            generate_from_patch_set(&set, tessellation_resolution(*tessellation))?.to_mesh(color)
        }
        ModelSource::BezierPatches {
            patch_set,
            tessellation,
        } => generate_from_patch_set(patch_set, tessellation_resolution(*tessellation))?
            .to_mesh(color),
    };
    Ok(mesh)
}
