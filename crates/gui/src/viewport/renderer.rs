//! Wireframe rendering through the egui painter

use egui::{Color32, Painter, Rect, Stroke};
use glam::Vec3;

use super::mesh::{self, LineMeshData};
use super::projection::Projector;
use crate::build::MeshCache;
use crate::camera::CameraState;
use crate::state::settings::{AppSettings, AxisSettings};

/// Direction the flat shading is lit from
const LIGHT_DIR: Vec3 = Vec3::new(0.4, 0.8, 0.45);
/// Samples drawn per animation loop
const PATH_SAMPLES: usize = 96;

fn color32(c: [f32; 4]) -> Color32 {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color32::from_rgba_unmultiplied(byte(c[0]), byte(c[1]), byte(c[2]), byte(c[3]))
}

/// Paint the viewport: background, grid, axes, model wireframes and paths
pub fn paint_viewport(
    painter: &Painter,
    rect: Rect,
    camera: &CameraState,
    cache: &MeshCache,
    settings: &AppSettings,
    time_secs: f32,
) {
    let [r, g, b] = settings.viewport.background_color;
    painter.rect_filled(rect, 0.0, Color32::from_rgb(r, g, b));

    let projector = Projector::new(camera, rect);

    if settings.grid.visible {
        let grid = mesh::grid(settings.grid.range, settings.grid.size, settings.grid.opacity);
        draw_lines(painter, &projector, &grid, 0.5);
    }

    draw_models(painter, &projector, cache, settings, time_secs);

    if settings.viewport.show_paths {
        draw_paths(painter, &projector, cache, time_secs);
    }

    if settings.axes.visible {
        draw_axes(painter, &projector, &settings.axes);
    }
}

fn draw_lines(painter: &Painter, projector: &Projector, lines: &LineMeshData, width: f32) {
    for (a, b, color) in lines.segments() {
        if let Some(points) = projector.segment(a, b) {
            painter.line_segment(points, Stroke::new(width, color32(color)));
        }
    }
}

fn draw_axes(painter: &Painter, projector: &Projector, settings: &AxisSettings) {
    let lines = mesh::axes(settings.length);
    draw_lines(painter, projector, &lines, settings.thickness);
    if !settings.show_labels {
        return;
    }
    for (_, end, color) in lines.segments() {
        let label = if end.x != 0.0 {
            "X"
        } else if end.y != 0.0 {
            "Y"
        } else {
            "Z"
        };
        if let Some(pos) = projector.point(end) {
            painter.text(
                pos,
                egui::Align2::LEFT_BOTTOM,
                label,
                egui::FontId::monospace(11.0),
                color32(color),
            );
        }
    }
}

fn draw_models(
    painter: &Painter,
    projector: &Projector,
    cache: &MeshCache,
    settings: &AppSettings,
    time_secs: f32,
) {
    let light = LIGHT_DIR.normalize();
    for (placed, mesh, matrix) in cache.instances(time_secs) {
        if mesh.is_empty() {
            continue;
        }
        let base = placed.model.color.unwrap_or(settings.generator.color);
        for local in mesh.triangles() {
            let tri = local.map(|p| matrix.transform_point3(p));
            match projector.is_front_facing(&tri) {
                Some(false) if !settings.viewport.show_back_faces => continue,
                _ => {}
            }
            let normal = (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalize_or_zero();
            let shade = 0.45 + 0.55 * normal.dot(light).abs();
            let color = color32([base[0] * shade, base[1] * shade, base[2] * shade, 1.0]);
            let stroke = Stroke::new(0.8, color);
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                if let Some(points) = projector.segment(a, b) {
                    painter.line_segment(points, stroke);
                }
            }
        }
    }
}

fn draw_paths(painter: &Painter, projector: &Projector, cache: &MeshCache, time_secs: f32) {
    let color = [0.95, 0.75, 0.25, 0.6];
    for placed in cache.placed().iter().filter(|p| p.is_animated()) {
        let Ok(paths) = placed.animation_paths(time_secs, PATH_SAMPLES) else {
            continue;
        };
        for path in paths {
            draw_lines(painter, projector, &mesh::polyline(&path, color), 1.0);
        }
    }
}
