//! Cubic curve evaluation: `P(t) = T(t) · M · P` with `T(t) = [t³, t², t, 1]`.
//!
//! The parameter is not clamped. Values of `t` outside `[0, 1]` extrapolate
//! the cubic polynomial past the end control points; callers that want a
//! closed interval clamp before calling.

use glam::Vec3;

use super::{GeometryError, GeometryResult};

/// Constant 4×4 blending matrix, stored as rows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasisMatrix(pub [[f32; 4]; 4]);

impl BasisMatrix {
    pub const BEZIER: BasisMatrix = BasisMatrix([
        [-1.0, 3.0, -3.0, 1.0],
        [3.0, -6.0, 3.0, 0.0],
        [-3.0, 3.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
    ]);

    pub const CATMULL_ROM: BasisMatrix = BasisMatrix([
        [-0.5, 1.5, -1.5, 0.5],
        [1.0, -2.5, 2.0, -0.5],
        [-0.5, 0.0, 0.5, 0.0],
        [0.0, 1.0, 0.0, 0.0],
    ]);

    /// Row vector times matrix: the weight of each control point
    fn blend(&self, row: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        let mut weights = [0.0; 4];
        for (j, w) in weights.iter_mut().enumerate() {
            *w = row[0] * m[0][j] + row[1] * m[1][j] + row[2] * m[2][j] + row[3] * m[3][j];
        }
        weights
    }
}

fn combine(weights: &[f32; 4], points: &[Vec3; 4]) -> Vec3 {
    points[0] * weights[0]
        + points[1] * weights[1]
        + points[2] * weights[2]
        + points[3] * weights[3]
}

/// Evaluate a cubic curve and its derivative at `t`.
///
/// Returns `(point, derivative)`.
pub fn evaluate_point(t: f32, basis: &BasisMatrix, points: &[Vec3; 4]) -> (Vec3, Vec3) {
    let t2 = t * t;
    let t3 = t2 * t;
    let weights = basis.blend([t3, t2, t, 1.0]);
    let d_weights = basis.blend([3.0 * t2, 2.0 * t, 1.0, 0.0]);
    (combine(&weights, points), combine(&d_weights, points))
}

/// Four control points bound to a basis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Curve {
    pub points: [Vec3; 4],
    pub basis: BasisMatrix,
}

impl Curve {
    pub fn bezier(points: [Vec3; 4]) -> Self {
        Self {
            points,
            basis: BasisMatrix::BEZIER,
        }
    }

    pub fn catmull_rom(points: [Vec3; 4]) -> Self {
        Self {
            points,
            basis: BasisMatrix::CATMULL_ROM,
        }
    }

    pub fn point(&self, t: f32) -> Vec3 {
        evaluate_point(t, &self.basis, &self.points).0
    }

    pub fn derivative(&self, t: f32) -> Vec3 {
        evaluate_point(t, &self.basis, &self.points).1
    }
}

/// Polyline through a curve with `segments + 1` evenly spaced samples
pub fn sample_curve(basis: &BasisMatrix, points: &[Vec3; 4], segments: usize) -> Vec<Vec3> {
    let segments = segments.max(1);
    (0..=segments)
        .map(|i| evaluate_point(i as f32 / segments as f32, basis, points).0)
        .collect()
}

/// Closed Catmull-Rom loop through a list of points.
///
/// Used by animated translations: a global fraction in `[0, 1)` walks the
/// whole loop once, passing through every point.
#[derive(Debug, Clone, PartialEq)]
pub struct CatmullRomLoop {
    points: Vec<Vec3>,
}

impl CatmullRomLoop {
    /// Minimum number of points for a Catmull-Rom segment
    pub const MIN_POINTS: usize = 4;

    pub fn new(points: Vec<Vec3>) -> GeometryResult<Self> {
        if points.len() < Self::MIN_POINTS {
            return Err(GeometryError::InvalidCurve(format!(
                "Catmull-Rom loop needs at least {} points, got {}",
                Self::MIN_POINTS,
                points.len()
            )));
        }
        if points.iter().any(|p| !p.is_finite()) {
            return Err(GeometryError::InvalidCurve(
                "Catmull-Rom loop has non-finite points".into(),
            ));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    /// Point and tangent at a global loop fraction (wraps around)
    pub fn position_at(&self, fraction: f32) -> (Vec3, Vec3) {
        let n = self.points.len();
        let global = fraction.rem_euclid(1.0) * n as f32;
        let segment = global.floor();
        let t = global - segment;
        let index = (segment as usize) % n;

        evaluate_point(t, &BasisMatrix::CATMULL_ROM, &self.segment(index))
    }

    /// Four control points of segment `index` (from point `index` to `index + 1`)
    fn segment(&self, index: usize) -> [Vec3; 4] {
        let n = self.points.len();
        [
            self.points[(index + n - 1) % n],
            self.points[index % n],
            self.points[(index + 1) % n],
            self.points[(index + 2) % n],
        ]
    }

    /// Closed polyline through the loop, for drawing the path.
    ///
    /// At least `samples` segments in total, split evenly over the loop
    /// segments; the last point repeats the first.
    pub fn polyline(&self, samples: usize) -> Vec<Vec3> {
        let n = self.points.len();
        let per_segment = samples.div_ceil(n).max(1);
        let mut out = Vec::with_capacity(n * per_segment + 1);
        for index in 0..n {
            let pts = sample_curve(&BasisMatrix::CATMULL_ROM, &self.segment(index), per_segment);
            out.extend_from_slice(&pts[..per_segment]);
        }
        out.push(self.points[0]);
        out
    }
}
