//! Cubic curve and bicubic patch evaluation.
//!
//! Everything in here is pure: no shared state, safe to call from any thread.

pub mod curve;
pub mod surface;

pub use curve::{evaluate_point, sample_curve, BasisMatrix, CatmullRomLoop, Curve};
pub use surface::{
    evaluate_patch, evaluate_surface, ControlPatch, PatchGrid, SurfaceSample, MAX_RESOLUTION,
    PATCH_POINTS,
};

/// Errors raised by geometry generation
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// Wrong control point count, non-finite coordinates or resolution out of range
    InvalidPatchData(String),
    /// Not enough points to build the requested curve
    InvalidCurve(String),
    /// Primitive parameters out of range (radius ≤ 0, zero divisions, ...)
    InvalidPrimitive(String),
    /// Zero rotation axis, non-positive animation time
    InvalidTransform(String),
}

impl std::fmt::Display for GeometryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeometryError::InvalidPatchData(msg) => write!(f, "Invalid patch data: {}", msg),
            GeometryError::InvalidCurve(msg) => write!(f, "Invalid curve: {}", msg),
            GeometryError::InvalidPrimitive(msg) => write!(f, "Invalid primitive: {}", msg),
            GeometryError::InvalidTransform(msg) => write!(f, "Invalid transform: {}", msg),
        }
    }
}

impl std::error::Error for GeometryError {}

pub type GeometryResult<T> = Result<T, GeometryError>;
