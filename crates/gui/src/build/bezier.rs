//! Bezier surface generator: control patches in, vertex grid out.

use glam::Vec3;
use shared::PatchSet;

use crate::geometry::surface::check_resolution;
use crate::geometry::{evaluate_surface, ControlPatch, GeometryError, GeometryResult};
use crate::viewport::mesh::MeshData;

/// Normal used where a patch has no well-defined tangent plane
pub const DEFAULT_NORMAL: Vec3 = Vec3::Y;

/// Evaluated Bezier surface.
///
/// All arrays share one layout: patches in input order, each a
/// `resolution × resolution` grid stored row by row (v outer, u inner).
#[derive(Debug, Clone, PartialEq)]
pub struct BezierModel {
    pub vertices: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub tex_coords: Vec<[f32; 2]>,
    /// Offset of each patch's first sample in the flat arrays
    pub patch_boundaries: Vec<usize>,
    pub resolution: usize,
}

impl BezierModel {
    pub fn patch_count(&self) -> usize {
        self.patch_boundaries.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Samples of patch `index`
    pub fn patch_vertices(&self, index: usize) -> &[Vec3] {
        let start = self.patch_boundaries[index];
        &self.vertices[start..start + self.resolution * self.resolution]
    }

    /// Triangulate every patch grid: two triangles per cell, no stitching between patches.
    pub fn to_mesh(&self, color: [f32; 3]) -> MeshData {
        let res = self.resolution as u32;
        let cells = (self.resolution - 1) * (self.resolution - 1);
        let mut mesh = MeshData {
            vertices: Vec::with_capacity(self.vertices.len() * 9),
            indices: Vec::with_capacity(self.patch_count() * cells * 6),
        };

        for (p, n) in self.vertices.iter().zip(&self.normals) {
            mesh.push_vertex(*p, *n, color);
        }

        for &start in &self.patch_boundaries {
            let base = start as u32;
            for v in 0..res - 1 {
                for u in 0..res - 1 {
                    let i0 = base + v * res + u;
                    let i1 = i0 + 1;
                    let i2 = i0 + res;
                    let i3 = i2 + 1;
                    mesh.push_triangle(i0, i1, i3);
                    mesh.push_triangle(i0, i3, i2);
                }
            }
        }

        mesh
    }
}

/// Generate a surface with the default normal (+Y).
pub fn generate<P: AsRef<[Vec3]>>(patches: &[P], resolution: usize) -> GeometryResult<BezierModel> {
    generate_with_normal(patches, resolution, DEFAULT_NORMAL)
}

/// Generate a surface from lists of 16 control points.
///
/// Everything is validated before any evaluation: an empty list, a patch
/// without exactly 16 points, a non-finite point, a resolution outside
/// `2..=MAX_RESOLUTION` or a vertex count past the `u32` index range all
/// return `InvalidPatchData`.
pub fn generate_with_normal<P: AsRef<[Vec3]>>(
    patches: &[P],
    resolution: usize,
    default_normal: Vec3,
) -> GeometryResult<BezierModel> {
    let total = check_inputs(patches.len(), resolution)?;

    let control = patches
        .iter()
        .enumerate()
        .map(|(i, points)| {
            ControlPatch::try_from(points.as_ref()).map_err(|e| match e {
                GeometryError::InvalidPatchData(msg) => {
                    GeometryError::InvalidPatchData(format!("patch {}: {}", i, msg))
                }
                other => other,
            })
        })
        .collect::<GeometryResult<Vec<_>>>()?;

    build_model(&control, resolution, total, default_normal)
}

/// Resolve the index table of a patch file into control patches
pub fn resolve_patches(set: &PatchSet) -> GeometryResult<Vec<ControlPatch>> {
    set.patches
        .iter()
        .enumerate()
        .map(|(i, indices)| {
            let points = indices
                .iter()
                .map(|&idx| {
                    set.control_points
                        .get(idx)
                        .map(|&p| Vec3::from_array(p))
                        .ok_or_else(|| {
                            GeometryError::InvalidPatchData(format!(
                                "patch {} references control point {} but only {} exist",
                                i,
                                idx,
                                set.control_points.len()
                            ))
                        })
                })
                .collect::<GeometryResult<Vec<_>>>()?;
            ControlPatch::try_from(points.as_slice())
        })
        .collect()
}

/// Generate a surface straight from a parsed `.patch` file
pub fn generate_from_patch_set(set: &PatchSet, resolution: usize) -> GeometryResult<BezierModel> {
    generate_patch_set_with_normal(set, resolution, DEFAULT_NORMAL)
}

pub fn generate_patch_set_with_normal(
    set: &PatchSet,
    resolution: usize,
    default_normal: Vec3,
) -> GeometryResult<BezierModel> {
    let total = check_inputs(set.patch_count(), resolution)?;
    let control = resolve_patches(set)?;
    build_model(&control, resolution, total, default_normal)
}

/// Validate the sizes and return the total vertex count
fn check_inputs(patch_count: usize, resolution: usize) -> GeometryResult<usize> {
    if patch_count == 0 {
        return Err(GeometryError::InvalidPatchData(
            "no patches to generate".into(),
        ));
    }
    check_resolution("resolution", resolution)?;
    resolution
        .checked_mul(resolution)
        .and_then(|per_patch| per_patch.checked_mul(patch_count))
        .filter(|&total| total <= u32::MAX as usize)
        .ok_or_else(|| {
            GeometryError::InvalidPatchData(format!(
                "{} patches at resolution {} exceed the mesh index range",
                patch_count, resolution
            ))
        })
}

fn build_model(
    patches: &[ControlPatch],
    resolution: usize,
    total: usize,
    default_normal: Vec3,
) -> GeometryResult<BezierModel> {
    let grids = evaluate_surface(patches, resolution, default_normal)?;

    let mut model = BezierModel {
        vertices: Vec::with_capacity(total),
        normals: Vec::with_capacity(total),
        tex_coords: Vec::with_capacity(total),
        patch_boundaries: Vec::with_capacity(patches.len()),
        resolution,
    };

    for grid in grids {
        model.patch_boundaries.push(model.vertices.len());
        for sample in grid.samples {
            model.vertices.push(sample.point);
            model.normals.push(sample.normal);
            model.tex_coords.push(sample.uv);
        }
    }

    tracing::debug!(
        patches = patches.len(),
        resolution,
        vertices = model.vertices.len(),
        "Generated Bezier surface"
    );

    Ok(model)
}
