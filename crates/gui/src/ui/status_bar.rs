use egui::Ui;

use crate::build::MeshCache;
use crate::camera::CameraSwitch;
use crate::state::AppState;

pub fn show(
    ui: &mut Ui,
    state: &AppState,
    camera: &CameraSwitch,
    cache: &MeshCache,
    time_secs: f32,
) {
    ui.horizontal(|ui| {
        ui.weak(format!("Camera: {}", camera.current_profile().label()));
        ui.separator();

        let eye = camera.state().eye;
        ui.weak(format!("Eye: ({:.1}, {:.1}, {:.1})", eye.x, eye.y, eye.z));
        ui.separator();

        ui.weak(format!("Models: {}", state.scene.model_count()));

        let errors = cache.errors().len();
        if errors > 0 {
            ui.separator();
            ui.colored_label(
                egui::Color32::from_rgb(230, 110, 100),
                format!("Errors: {errors}"),
            );
        }

        ui.separator();
        ui.weak(format!("t = {:.1}s", time_secs));

        if let Some(status) = &state.status {
            ui.separator();
            ui.label(status);
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            match state.scene.source_path() {
                Some(path) => ui.weak(path.display().to_string()),
                None => ui.weak("untitled"),
            };
        });
    });
}
