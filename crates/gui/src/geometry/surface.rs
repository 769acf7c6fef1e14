//! Bicubic Bezier patch evaluation.
//!
//! A patch is 16 control points in row-major order. Row `i` (`points[4i..4i + 4]`)
//! is a cubic in `v`; the four row curves evaluated at `v` give the control
//! points of a cubic in `u`. So the corners map as
//! `(u, v) = (0, 0) → p0`, `(0, 1) → p3`, `(1, 0) → p12`, `(1, 1) → p15`.

use glam::Vec3;

use super::curve::{evaluate_point, BasisMatrix};
use super::{GeometryError, GeometryResult};

/// Control points in a Bezier patch
pub const PATCH_POINTS: usize = 16;

/// Largest accepted samples per patch side
pub const MAX_RESOLUTION: usize = 1025;

/// Squared cross-product length below which a normal is considered degenerate
const DEGENERATE_EPSILON: f32 = 1e-12;

/// 4×4 grid of control points. Always exactly 16 finite points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlPatch {
    points: [Vec3; PATCH_POINTS],
}

impl ControlPatch {
    pub fn new(points: [Vec3; PATCH_POINTS]) -> GeometryResult<Self> {
        if let Some(i) = points.iter().position(|p| !p.is_finite()) {
            return Err(GeometryError::InvalidPatchData(format!(
                "control point {} is not finite",
                i
            )));
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Vec3; PATCH_POINTS] {
        &self.points
    }

    /// Control points of row `i` (0..4)
    pub fn row(&self, i: usize) -> [Vec3; 4] {
        let base = i * 4;
        [
            self.points[base],
            self.points[base + 1],
            self.points[base + 2],
            self.points[base + 3],
        ]
    }

    /// Corner control points in `(u, v)` order (0,0), (0,1), (1,0), (1,1)
    pub fn corners(&self) -> [Vec3; 4] {
        [self.points[0], self.points[3], self.points[12], self.points[15]]
    }
}

impl TryFrom<&[Vec3]> for ControlPatch {
    type Error = GeometryError;

    fn try_from(points: &[Vec3]) -> Result<Self, Self::Error> {
        let array: [Vec3; PATCH_POINTS] = points.try_into().map_err(|_| {
            GeometryError::InvalidPatchData(format!(
                "a patch needs exactly {} control points, got {}",
                PATCH_POINTS,
                points.len()
            ))
        })?;
        Self::new(array)
    }
}

/// One evaluated point of a surface
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    pub point: Vec3,
    pub normal: Vec3,
    /// Parametric (u, v), also used as texture coordinates
    pub uv: [f32; 2],
}

/// Samples of one patch, stored row by row: index = `v_index * resolution_u + u_index`
#[derive(Debug, Clone, PartialEq)]
pub struct PatchGrid {
    pub resolution_u: usize,
    pub resolution_v: usize,
    pub samples: Vec<SurfaceSample>,
}

impl PatchGrid {
    pub fn sample(&self, u_index: usize, v_index: usize) -> &SurfaceSample {
        &self.samples[v_index * self.resolution_u + u_index]
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub(crate) fn check_resolution(name: &str, resolution: usize) -> GeometryResult<()> {
    if resolution < 2 {
        return Err(GeometryError::InvalidPatchData(format!(
            "{} must be at least 2, got {}",
            name, resolution
        )));
    }
    if resolution > MAX_RESOLUTION {
        return Err(GeometryError::InvalidPatchData(format!(
            "{} must be at most {}, got {}",
            name, MAX_RESOLUTION, resolution
        )));
    }
    Ok(())
}

fn parameter(index: usize, resolution: usize) -> f32 {
    index as f32 / (resolution - 1) as f32
}

fn surface_normal(du: Vec3, dv: Vec3, default_normal: Vec3) -> Vec3 {
    let n = du.cross(dv);
    if n.is_finite() && n.length_squared() > DEGENERATE_EPSILON {
        n.normalize()
    } else {
        default_normal
    }
}

/// Evaluate a patch on a `resolution_u × resolution_v` grid.
///
/// Normals are `normalize(∂P/∂u × ∂P/∂v)`; where that vanishes (collapsed
/// rows, poles) `default_normal` is used instead.
pub fn evaluate_patch(
    patch: &ControlPatch,
    resolution_u: usize,
    resolution_v: usize,
    default_normal: Vec3,
) -> GeometryResult<PatchGrid> {
    check_resolution("resolution_u", resolution_u)?;
    check_resolution("resolution_v", resolution_v)?;

    let count = resolution_u.checked_mul(resolution_v).ok_or_else(|| {
        GeometryError::InvalidPatchData(format!(
            "{}×{} samples overflow",
            resolution_u, resolution_v
        ))
    })?;

    let basis = &BasisMatrix::BEZIER;
    let mut samples = Vec::with_capacity(count);

    for vi in 0..resolution_v {
        let v = parameter(vi, resolution_v);

        // Reduce each row curve at v: intermediate control points and their v-derivatives
        let mut points = [Vec3::ZERO; 4];
        let mut v_tangents = [Vec3::ZERO; 4];
        for i in 0..4 {
            let (p, d) = evaluate_point(v, basis, &patch.row(i));
            points[i] = p;
            v_tangents[i] = d;
        }

        for ui in 0..resolution_u {
            let u = parameter(ui, resolution_u);
            let (point, du) = evaluate_point(u, basis, &points);
            let (dv, _) = evaluate_point(u, basis, &v_tangents);
            samples.push(SurfaceSample {
                point,
                normal: surface_normal(du, dv, default_normal),
                uv: [u, v],
            });
        }
    }

    Ok(PatchGrid {
        resolution_u,
        resolution_v,
        samples,
    })
}

/// Evaluate every patch at `resolution × resolution`, keeping patch order.
///
/// Patches are independent: nothing is stitched along shared edges.
pub fn evaluate_surface(
    patches: &[ControlPatch],
    resolution: usize,
    default_normal: Vec3,
) -> GeometryResult<Vec<PatchGrid>> {
    check_resolution("resolution", resolution)?;

    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        patches
            .par_iter()
            .map(|patch| evaluate_patch(patch, resolution, resolution, default_normal))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        patches
            .iter()
            .map(|patch| evaluate_patch(patch, resolution, resolution, default_normal))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wavy_patch() -> ControlPatch {
        let mut points = [Vec3::ZERO; PATCH_POINTS];
        for r in 0..4 {
            for c in 0..4 {
                let z = ((r * 3 + c * 5) % 4) as f32 * 0.5;
                points[r * 4 + c] = Vec3::new(c as f32, r as f32, z);
            }
        }
        ControlPatch::new(points).unwrap()
    }

    fn flat_patch() -> ControlPatch {
        let mut points = [Vec3::ZERO; PATCH_POINTS];
        for r in 0..4 {
            for c in 0..4 {
                points[r * 4 + c] = Vec3::new(c as f32, r as f32, 0.0);
            }
        }
        ControlPatch::new(points).unwrap()
    }

    #[test]
    fn test_corners_reproduce_control_points() {
        let patch = wavy_patch();
        let grid = evaluate_patch(&patch, 7, 5, Vec3::Y).unwrap();
        let [c00, c01, c10, c11] = patch.corners();
        assert!((grid.sample(0, 0).point - c00).length() < 1e-6);
        assert!((grid.sample(0, 4).point - c01).length() < 1e-5);
        assert!((grid.sample(6, 0).point - c10).length() < 1e-5);
        assert!((grid.sample(6, 4).point - c11).length() < 1e-5);
    }

    #[test]
    fn test_grid_size_and_uv() {
        let grid = evaluate_patch(&wavy_patch(), 4, 3, Vec3::Y).unwrap();
        assert_eq!(grid.len(), 12);
        assert_eq!(grid.sample(3, 2).uv, [1.0, 1.0]);
        assert_eq!(grid.sample(0, 1).uv, [0.0, 0.5]);
    }

    #[test]
    fn test_flat_patch_normals_are_unit_and_perpendicular() {
        let grid = evaluate_patch(&flat_patch(), 5, 5, Vec3::Y).unwrap();
        for s in &grid.samples {
            assert!((s.normal.length() - 1.0).abs() < 1e-5);
            assert!((s.normal.z.abs() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_degenerate_patch_uses_default_normal() {
        let patch = ControlPatch::new([Vec3::new(1.0, 2.0, 3.0); PATCH_POINTS]).unwrap();
        let fallback = Vec3::new(0.0, 0.0, 1.0);
        let grid = evaluate_patch(&patch, 3, 3, fallback).unwrap();
        for s in &grid.samples {
            assert_eq!(s.normal, fallback);
            assert!(!s.normal.is_nan());
        }
    }

    #[test]
    fn test_resolution_below_two_rejected() {
        let err = evaluate_patch(&flat_patch(), 1, 4, Vec3::Y).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPatchData(_)));
        let err = evaluate_surface(&[flat_patch()], 0, Vec3::Y).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPatchData(_)));
    }

    #[test]
    fn test_resolution_above_maximum_rejected() {
        assert!(evaluate_patch(&flat_patch(), MAX_RESOLUTION, 2, Vec3::Y).is_ok());
        let err = evaluate_patch(&flat_patch(), 2, MAX_RESOLUTION + 1, Vec3::Y).unwrap_err();
        assert!(matches!(err, GeometryError::InvalidPatchData(msg) if msg.contains("at most")));
        assert!(evaluate_surface(&[flat_patch()], usize::MAX, Vec3::Y).is_err());
    }

    #[test]
    fn test_try_from_wrong_count() {
        let points = vec![Vec3::ZERO; 15];
        assert!(ControlPatch::try_from(points.as_slice()).is_err());
        let points = vec![Vec3::ZERO; 17];
        assert!(ControlPatch::try_from(points.as_slice()).is_err());
        let points = vec![Vec3::ZERO; 16];
        assert!(ControlPatch::try_from(points.as_slice()).is_ok());
    }

    #[test]
    fn test_non_finite_point_rejected() {
        let mut points = [Vec3::ZERO; PATCH_POINTS];
        points[7] = Vec3::new(f32::NAN, 0.0, 0.0);
        assert!(ControlPatch::new(points).is_err());
    }

    #[test]
    fn test_surface_keeps_patch_order() {
        let grids = evaluate_surface(&[flat_patch(), wavy_patch()], 3, Vec3::Y).unwrap();
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[0], evaluate_patch(&flat_patch(), 3, 3, Vec3::Y).unwrap());
        assert_eq!(grids[1], evaluate_patch(&wavy_patch(), 3, 3, Vec3::Y).unwrap());
    }
}
