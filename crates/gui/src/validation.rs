//! Structural checks on generated meshes.
//!
//! Used by tests and by the harness to make sure generator output can be
//! handed to the renderer as is.

use std::fmt;

use crate::viewport::bounds::Aabb;
use crate::viewport::mesh::{MeshData, VERTEX_STRIDE};

/// Allowed deviation of a normal's length from 1
const NORMAL_TOLERANCE: f32 = 0.1;

/// A defect found in a mesh
#[derive(Debug, Clone, PartialEq)]
pub enum MeshIssue {
    /// Vertex buffer length is not a whole number of vertices
    PartialVertex { floats: usize },
    /// Index buffer length is not a whole number of triangles
    PartialTriangle { indices: usize },
    /// Indices referring past the last vertex (first few only)
    IndexOutOfRange { vertex_count: usize, indices: Vec<u32> },
    /// NaN or infinity in the vertex buffer
    NonFinite { vertex: usize },
    /// Normal far from unit length
    BadNormal { vertex: usize, length: f32 },
    /// Colour channel outside 0..=1
    ColorOutOfRange { vertex: usize },
}

impl fmt::Display for MeshIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshIssue::PartialVertex { floats } => {
                write!(f, "{} floats is not a multiple of {}", floats, VERTEX_STRIDE)
            }
            MeshIssue::PartialTriangle { indices } => {
                write!(f, "{} indices is not a multiple of 3", indices)
            }
            MeshIssue::IndexOutOfRange {
                vertex_count,
                indices,
            } => write!(f, "indices {:?} out of range for {} vertices", indices, vertex_count),
            MeshIssue::NonFinite { vertex } => write!(f, "vertex {} is not finite", vertex),
            MeshIssue::BadNormal { vertex, length } => {
                write!(f, "normal of vertex {} has length {}", vertex, length)
            }
            MeshIssue::ColorOutOfRange { vertex } => {
                write!(f, "colour of vertex {} is outside 0..=1", vertex)
            }
        }
    }
}

/// Read-only view over a mesh with integrity checks
pub struct MeshValidator<'a> {
    mesh: &'a MeshData,
}

impl<'a> MeshValidator<'a> {
    pub fn new(mesh: &'a MeshData) -> Self {
        Self { mesh }
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh.vertex_count()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.triangle_count()
    }

    fn out_of_range(&self) -> Vec<u32> {
        let count = self.vertex_count() as u32;
        self.mesh
            .indices
            .iter()
            .copied()
            .filter(|&i| i >= count)
            .take(5)
            .collect()
    }

    /// Triangles whose area is below `epsilon` (collapsed patch rows, poles)
    pub fn degenerate_triangle_count(&self, epsilon: f32) -> usize {
        if !self.out_of_range().is_empty() {
            return 0;
        }
        self.mesh
            .triangles()
            .filter(|[a, b, c]| (*b - *a).cross(*c - *a).length() * 0.5 < epsilon)
            .count()
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_mesh(self.mesh)
    }

    /// Extent along X, Y and Z; zero for an empty mesh
    pub fn dimensions(&self) -> [f32; 3] {
        if self.vertex_count() == 0 {
            [0.0; 3]
        } else {
            self.bounds().size().to_array()
        }
    }

    pub fn dimensions_match(&self, expected: [f32; 3], tolerance: f32) -> bool {
        self.dimensions()
            .iter()
            .zip(expected)
            .all(|(d, e)| (d - e).abs() < tolerance)
    }

    /// Every defect found; empty when the mesh can be rendered as is.
    /// Per-vertex checks stop at the first offending vertex.
    pub fn validate_all(&self) -> Vec<MeshIssue> {
        let mut issues = Vec::new();
        let floats = self.mesh.vertices.len();
        if floats % VERTEX_STRIDE != 0 {
            issues.push(MeshIssue::PartialVertex { floats });
        }
        let indices = self.mesh.indices.len();
        if indices % 3 != 0 {
            issues.push(MeshIssue::PartialTriangle { indices });
        }
        let bad = self.out_of_range();
        if !bad.is_empty() {
            issues.push(MeshIssue::IndexOutOfRange {
                vertex_count: self.vertex_count(),
                indices: bad,
            });
        }

        let vertices = self.mesh.vertices.chunks_exact(VERTEX_STRIDE).enumerate();
        if let Some((vertex, _)) = vertices
            .clone()
            .find(|(_, v)| v.iter().any(|x| !x.is_finite()))
        {
            issues.push(MeshIssue::NonFinite { vertex });
        }
        let normal_length = |v: &[f32]| (v[3] * v[3] + v[4] * v[4] + v[5] * v[5]).sqrt();
        if let Some((vertex, v)) = vertices
            .clone()
            .find(|(_, v)| (normal_length(*v) - 1.0).abs() > NORMAL_TOLERANCE)
        {
            issues.push(MeshIssue::BadNormal {
                vertex,
                length: normal_length(v),
            });
        }
        if let Some((vertex, _)) = vertices
            .clone()
            .find(|(_, v)| v[6..9].iter().any(|c| !(0.0..=1.0).contains(c)))
        {
            issues.push(MeshIssue::ColorOutOfRange { vertex });
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn quad() -> MeshData {
        let mut mesh = MeshData::default();
        let grey = [0.5, 0.5, 0.5];
        let a = mesh.push_vertex(Vec3::ZERO, Vec3::Y, grey);
        let b = mesh.push_vertex(Vec3::X, Vec3::Y, grey);
        let c = mesh.push_vertex(Vec3::new(1.0, 0.0, 1.0), Vec3::Y, grey);
        let d = mesh.push_vertex(Vec3::Z, Vec3::Y, grey);
        mesh.push_triangle(a, c, b);
        mesh.push_triangle(a, d, c);
        mesh
    }

    #[test]
    fn test_quad_is_clean() {
        let mesh = quad();
        let v = MeshValidator::new(&mesh);
        assert_eq!(v.vertex_count(), 4);
        assert_eq!(v.triangle_count(), 2);
        assert!(v.validate_all().is_empty());
        assert!(v.dimensions_match([1.0, 0.0, 1.0], 1e-6));
        assert!(!v.dimensions_match([2.0, 0.0, 1.0], 1e-6));
        assert_eq!(v.degenerate_triangle_count(1e-6), 0);
    }

    #[test]
    fn test_truncated_buffers() {
        let mut mesh = quad();
        mesh.vertices.pop();
        mesh.indices.pop();
        let issues = MeshValidator::new(&mesh).validate_all();
        assert!(issues.contains(&MeshIssue::PartialVertex { floats: 35 }));
        assert!(issues.contains(&MeshIssue::PartialTriangle { indices: 5 }));
    }

    #[test]
    fn test_index_past_end() {
        let mut mesh = quad();
        mesh.push_triangle(0, 1, 9);
        let v = MeshValidator::new(&mesh);
        assert_eq!(
            v.validate_all(),
            vec![MeshIssue::IndexOutOfRange {
                vertex_count: 4,
                indices: vec![9],
            }]
        );
        // Degenerate count is not attempted on a broken index buffer
        assert_eq!(v.degenerate_triangle_count(1.0), 0);
    }

    #[test]
    fn test_bad_normal_and_colour_reported_once() {
        let mut mesh = quad();
        mesh.set_color([1.5, 0.0, 0.0]);
        // Normal of vertex 2 scaled to length 3
        mesh.vertices[2 * VERTEX_STRIDE + 4] = 3.0;
        let issues = MeshValidator::new(&mesh).validate_all();
        assert_eq!(issues.len(), 2);
        assert!(matches!(issues[0], MeshIssue::BadNormal { vertex: 2, .. }));
        assert_eq!(issues[1], MeshIssue::ColorOutOfRange { vertex: 0 });
        assert!(issues[0].to_string().contains("length 3"));
    }

    #[test]
    fn test_nan_position() {
        let mut mesh = quad();
        mesh.vertices[VERTEX_STRIDE] = f32::NAN;
        let issues = MeshValidator::new(&mesh).validate_all();
        assert_eq!(issues, vec![MeshIssue::NonFinite { vertex: 1 }]);
    }

    #[test]
    fn test_collapsed_triangle_counted() {
        let mut mesh = quad();
        mesh.push_triangle(0, 0, 1);
        assert_eq!(MeshValidator::new(&mesh).degenerate_triangle_count(1e-6), 1);
    }

    #[test]
    fn test_empty_mesh() {
        let mesh = MeshData::default();
        let v = MeshValidator::new(&mesh);
        assert_eq!(v.dimensions(), [0.0; 3]);
        assert!(v.validate_all().is_empty());
    }
}
