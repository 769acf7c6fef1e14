//! Generator panel - create primitives and Bezier models

use egui::Ui;
use glam::Vec3;
use shared::ModelEntry;

use crate::camera::CameraSwitch;
use crate::state::{AppState, GeneratorKind};

pub fn show(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Generator");
    ui.separator();

    let form = &mut state.generator;
    egui::ComboBox::from_label("Kind")
        .selected_text(form.kind.label())
        .show_ui(ui, |ui| {
            for kind in GeneratorKind::ALL {
                ui.selectable_value(&mut form.kind, kind, kind.label());
            }
        });
    ui.add_space(4.0);

    egui::Grid::new("generator_params")
        .num_columns(2)
        .spacing([8.0, 4.0])
        .show(ui, |ui| match form.kind {
            GeneratorKind::Plane | GeneratorKind::Box => {
                ui.label("Length:");
                ui.add(egui::DragValue::new(&mut form.length).speed(0.05).range(0.01..=1000.0));
                ui.end_row();
                ui.label("Divisions:");
                ui.add(egui::DragValue::new(&mut form.divisions).range(1..=256));
                ui.end_row();
            }
            GeneratorKind::Cone | GeneratorKind::Sphere => {
                ui.label("Radius:");
                ui.add(egui::DragValue::new(&mut form.radius).speed(0.05).range(0.01..=1000.0));
                ui.end_row();
                if form.kind == GeneratorKind::Cone {
                    ui.label("Height:");
                    ui.add(egui::DragValue::new(&mut form.height).speed(0.05).range(0.01..=1000.0));
                    ui.end_row();
                }
                ui.label("Slices:");
                ui.add(egui::DragValue::new(&mut form.slices).range(3..=512));
                ui.end_row();
                ui.label("Stacks:");
                ui.add(egui::DragValue::new(&mut form.stacks).range(1..=512));
                ui.end_row();
            }
            GeneratorKind::BezierFile => {
                ui.label("Patch file:");
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut form.patch_path).desired_width(140.0));
                    if ui.small_button("…").on_hover_text("Browse").clicked() {
                        if let Some(path) = rfd::FileDialog::new()
                            .add_filter("Bezier patches", &["patch"])
                            .pick_file()
                        {
                            form.patch_path = path.display().to_string();
                        }
                    }
                });
                ui.end_row();
                ui.label("Tessellation:");
                ui.add(egui::DragValue::new(&mut form.tessellation).range(1..=128));
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    if ui.button("Add to scene").clicked() {
        match state.generator.to_source() {
            Ok(source) => {
                let mut entry = ModelEntry::new(source);
                if state.generator.kind == GeneratorKind::BezierFile {
                    entry.name = std::path::Path::new(state.generator.patch_path.trim())
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned());
                }
                let kind = entry.source.kind();
                let id = state.scene.add_model(entry, Vec::new());
                tracing::info!(id = %id, kind, "Model added");
                state.set_status(format!("Added {kind}"));
            }
            Err(e) => state.set_status(e),
        }
    }
}

fn vec3_label(v: Vec3) -> String {
    format!("({:.2}, {:.2}, {:.2})", v.x, v.y, v.z)
}

/// Read-only view of the active camera
pub fn camera_info(ui: &mut Ui, camera: &CameraSwitch) {
    let state = camera.state();
    egui::CollapsingHeader::new("Camera")
        .id_salt("camera_info")
        .default_open(true)
        .show(ui, |ui| {
            egui::Grid::new("camera_props")
                .num_columns(2)
                .spacing([8.0, 4.0])
                .show(ui, |ui| {
                    ui.label("Profile:");
                    ui.label(camera.current_profile().label());
                    ui.end_row();
                    ui.label("Eye:");
                    ui.monospace(vec3_label(state.eye));
                    ui.end_row();
                    ui.label("Center:");
                    ui.monospace(vec3_label(state.center));
                    ui.end_row();
                    ui.label("Up:");
                    ui.monospace(vec3_label(state.up));
                    ui.end_row();
                    ui.label("Viewport:");
                    ui.monospace(format!("{}×{}", state.width, state.height));
                    ui.end_row();
                    ui.label("FOV:");
                    ui.monospace(format!("{:.1}°", state.projection.fov));
                    ui.end_row();
                });
            let details = camera.active().describe();
            if !details.is_null() {
                ui.add_space(4.0);
                let text = serde_json::to_string_pretty(&details).unwrap_or_default();
                ui.monospace(text);
            }
        });
}
