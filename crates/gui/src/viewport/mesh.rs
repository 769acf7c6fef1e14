use glam::{Mat4, Vec3};

/// Floats per triangle-mesh vertex
pub const VERTEX_STRIDE: usize = 9;
/// Floats per line vertex
pub const LINE_VERTEX_STRIDE: usize = 7;

/// CPU-side mesh data: interleaved [pos.x, pos.y, pos.z, norm.x, norm.y, norm.z, r, g, b]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// 9 floats per vertex: position(3) + normal(3) + color(3)
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn position(&self, index: usize) -> Vec3 {
        let base = index * VERTEX_STRIDE;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn normal(&self, index: usize) -> Vec3 {
        let base = index * VERTEX_STRIDE + 3;
        Vec3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn color(&self, index: usize) -> [f32; 3] {
        let base = index * VERTEX_STRIDE + 6;
        [
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        ]
    }

    /// Append a vertex, returning its index
    pub fn push_vertex(&mut self, position: Vec3, normal: Vec3, color: [f32; 3]) -> u32 {
        let index = self.vertex_count() as u32;
        push_vert(&mut self.vertices, position, normal, color);
        index
    }

    pub fn push_triangle(&mut self, a: u32, b: u32, c: u32) {
        self.indices.extend_from_slice(&[a, b, c]);
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &MeshData) {
        let offset = self.vertex_count() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }

    /// Copy with positions transformed by `matrix` and normals by its inverse transpose
    pub fn transformed(&self, matrix: &Mat4) -> MeshData {
        let normal_matrix = matrix.inverse().transpose();
        let mut vertices = Vec::with_capacity(self.vertices.len());
        for i in 0..self.vertex_count() {
            let p = matrix.transform_point3(self.position(i));
            let n = normal_matrix
                .transform_vector3(self.normal(i))
                .normalize_or_zero();
            push_vert(&mut vertices, p, n, self.color(i));
        }
        MeshData {
            vertices,
            indices: self.indices.clone(),
        }
    }

    /// Overwrite every vertex colour
    pub fn set_color(&mut self, color: [f32; 3]) {
        for chunk in self.vertices.chunks_exact_mut(VERTEX_STRIDE) {
            chunk[6..9].copy_from_slice(&color);
        }
    }

    /// Triangle corner positions, in index order
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|tri| {
            [
                self.position(tri[0] as usize),
                self.position(tri[1] as usize),
                self.position(tri[2] as usize),
            ]
        })
    }
}

/// Lines mesh: interleaved [pos.x, pos.y, pos.z, r, g, b, a], two vertices per segment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineMeshData {
    /// 7 floats per vertex: position(3) + color(4)
    pub vertices: Vec<f32>,
}

impl LineMeshData {
    pub fn segment_count(&self) -> usize {
        self.vertices.len() / (LINE_VERTEX_STRIDE * 2)
    }

    /// Segment endpoints and the colour of its first vertex
    pub fn segments(&self) -> impl Iterator<Item = (Vec3, Vec3, [f32; 4])> + '_ {
        self.vertices
            .chunks_exact(LINE_VERTEX_STRIDE * 2)
            .map(|s| {
                (
                    Vec3::new(s[0], s[1], s[2]),
                    Vec3::new(s[7], s[8], s[9]),
                    [s[3], s[4], s[5], s[6]],
                )
            })
    }

    pub fn push_segment(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        push_line_vert(&mut self.vertices, a, color);
        push_line_vert(&mut self.vertices, b, color);
    }
}

// ── Grid, axes and paths ─────────────────────────────────────

pub fn grid(range: i32, cell_size: f32, opacity: f32) -> LineMeshData {
    let mut lines = LineMeshData::default();
    let grid_color = [0.25_f32, 0.25, 0.25, opacity];
    let origin_color_x = [0.5_f32, 0.2, 0.2, opacity * 0.7];
    let origin_color_z = [0.2_f32, 0.2, 0.5, opacity * 0.7];

    let extent = range as f32 * cell_size;

    for i in -range..=range {
        let f = i as f32 * cell_size;
        let along_z = if i == 0 { origin_color_z } else { grid_color };
        lines.push_segment(
            Vec3::new(f, 0.0, -extent),
            Vec3::new(f, 0.0, extent),
            along_z,
        );

        let along_x = if i == 0 { origin_color_x } else { grid_color };
        lines.push_segment(
            Vec3::new(-extent, 0.0, f),
            Vec3::new(extent, 0.0, f),
            along_x,
        );
    }

    lines
}

pub fn axes(length: f32) -> LineMeshData {
    let mut lines = LineMeshData::default();
    lines.push_segment(Vec3::ZERO, Vec3::X * length, [0.9, 0.2, 0.2, 1.0]);
    lines.push_segment(Vec3::ZERO, Vec3::Y * length, [0.2, 0.8, 0.2, 1.0]);
    lines.push_segment(Vec3::ZERO, Vec3::Z * length, [0.2, 0.3, 0.9, 1.0]);
    lines
}

/// Open polyline through `points` (closed paths repeat the first point at the end)
pub fn polyline(points: &[Vec3], color: [f32; 4]) -> LineMeshData {
    let mut lines = LineMeshData::default();
    for pair in points.windows(2) {
        lines.push_segment(pair[0], pair[1], color);
    }
    lines
}

// ── Helpers ──────────────────────────────────────────────────

fn push_vert(v: &mut Vec<f32>, p: Vec3, n: Vec3, c: [f32; 3]) {
    v.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, c[0], c[1], c[2]]);
}

fn push_line_vert(v: &mut Vec<f32>, p: Vec3, c: [f32; 4]) {
    v.extend_from_slice(&[p.x, p.y, p.z, c[0], c[1], c[2], c[3]]);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        let mut mesh = MeshData::default();
        let a = mesh.push_vertex(Vec3::ZERO, Vec3::Z, [1.0, 0.0, 0.0]);
        let b = mesh.push_vertex(Vec3::X, Vec3::Z, [1.0, 0.0, 0.0]);
        let c = mesh.push_vertex(Vec3::Y, Vec3::Z, [1.0, 0.0, 0.0]);
        mesh.push_triangle(a, b, c);
        mesh
    }

    #[test]
    fn test_append_offsets_indices() {
        let mut mesh = triangle();
        mesh.append(&triangle());
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.indices, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_transformed_moves_positions_keeps_unit_normals() {
        let mesh = triangle();
        let m =
            Mat4::from_translation(Vec3::new(0.0, 2.0, 0.0)) * Mat4::from_scale(Vec3::splat(3.0));
        let moved = mesh.transformed(&m);
        assert!((moved.position(1) - Vec3::new(3.0, 2.0, 0.0)).length() < 1e-5);
        assert!((moved.normal(0).length() - 1.0).abs() < 1e-5);
        assert_eq!(moved.indices, mesh.indices);
    }

    #[test]
    fn test_set_color() {
        let mut mesh = triangle();
        mesh.set_color([0.1, 0.2, 0.3]);
        assert_eq!(mesh.color(2), [0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_grid_and_axes_segments() {
        assert_eq!(grid(2, 1.0, 0.5).segment_count(), 10);
        let axes = axes(2.0);
        assert_eq!(axes.segment_count(), 3);
        let (_, end, _) = axes.segments().nth(1).unwrap();
        assert_eq!(end, Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_polyline() {
        let pts = [Vec3::ZERO, Vec3::X, Vec3::Y];
        assert_eq!(polyline(&pts, [1.0; 4]).segment_count(), 2);
        assert_eq!(polyline(&pts[..1], [1.0; 4]).segment_count(), 0);
    }
}
