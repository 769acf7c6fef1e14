//! Display helper functions for models and transforms

use shared::{ModelEntry, ModelSource, TransformOp};

/// First 8 characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// Name shown in the scene tree
pub fn model_display_name(model: &ModelEntry) -> String {
    match &model.name {
        Some(name) => name.clone(),
        None => format!("{} ({})", model_kind_label(&model.source), short_id(&model.id)),
    }
}

pub fn model_kind_label(source: &ModelSource) -> &'static str {
    match source {
        ModelSource::Plane { .. } => "Plane",
        ModelSource::Box { .. } => "Box",
        ModelSource::Cone { .. } => "Cone",
        ModelSource::Sphere { .. } => "Sphere",
        ModelSource::BezierFile { .. } => "Bezier file",
        ModelSource::BezierPatches { .. } => "Bezier patches",
    }
}

/// One-line parameter summary
pub fn source_summary(source: &ModelSource) -> String {
    match source {
        ModelSource::Plane { length, divisions } | ModelSource::Box { length, divisions } => {
            format!("length {}, {} divisions", length, divisions)
        }
        ModelSource::Cone {
            radius,
            height,
            slices,
            stacks,
        } => format!("r {}, h {}, {}×{}", radius, height, slices, stacks),
        ModelSource::Sphere {
            radius,
            slices,
            stacks,
        } => format!("r {}, {}×{}", radius, slices, stacks),
        ModelSource::BezierFile { path, tessellation } => {
            format!("{} @ {}", path, tessellation)
        }
        ModelSource::BezierPatches {
            patch_set,
            tessellation,
        } => format!("{} patches @ {}", patch_set.patch_count(), tessellation),
    }
}

pub fn transform_summary(op: &TransformOp) -> String {
    match op {
        TransformOp::Translate { x, y, z } => format!("Translate ({}, {}, {})", x, y, z),
        TransformOp::Rotate { angle, x, y, z } => {
            format!("Rotate {}° about ({}, {}, {})", angle, x, y, z)
        }
        TransformOp::Scale { x, y, z } => format!("Scale ({}, {}, {})", x, y, z),
        TransformOp::AnimatedTranslate {
            time,
            align,
            points,
        } => format!(
            "Path of {} points, {}s{}",
            points.len(),
            time,
            if *align { ", aligned" } else { "" }
        ),
        TransformOp::AnimatedRotate { time, x, y, z } => {
            format!("Spin about ({}, {}, {}) every {}s", x, y, z, time)
        }
    }
}
