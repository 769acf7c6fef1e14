//! 3D viewport panel with software wireframe rendering

mod projection;
mod renderer;
pub use cg_engine_lib::viewport::mesh;

use egui::Ui;

use crate::build::MeshCache;
use crate::camera::{CameraSwitch, InputResponse};
use crate::state::AppState;

/// 3D viewport panel
pub struct ViewportPanel {
    cache: MeshCache,
    /// Last viewport size passed to the camera
    size: Option<(u32, u32)>,
    /// Number of build errors already reported
    reported_errors: usize,
}

impl ViewportPanel {
    pub fn new() -> Self {
        Self {
            cache: MeshCache::new(),
            size: None,
            reported_errors: 0,
        }
    }

    pub fn cache(&self) -> &MeshCache {
        &self.cache
    }

    /// Claim the remaining space and report size changes to the camera
    pub fn allocate(
        &mut self,
        ui: &mut Ui,
        camera: &mut CameraSwitch,
    ) -> (egui::Response, InputResponse) {
        let (rect, response) =
            ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
        let size = (rect.width().round() as u32, rect.height().round() as u32);
        let mut reshape = InputResponse::default();
        if self.size != Some(size) {
            self.size = Some(size);
            reshape = camera.on_reshape(size.0, size.1);
        }
        (response, reshape)
    }

    /// Rebuild meshes if the scene changed, then draw
    pub fn paint(
        &mut self,
        ui: &Ui,
        response: &egui::Response,
        state: &mut AppState,
        camera: &CameraSwitch,
        time_secs: f32,
    ) {
        let scene = &state.scene;
        if self.cache.ensure(&scene.world, scene.base_dir(), scene.version()) {
            let errors = self.cache.errors().len();
            if errors > 0 && errors != self.reported_errors {
                state.set_status(format!("{} model(s) failed to build", errors));
            }
            self.reported_errors = errors;
        }

        let rect = response.rect;
        if !ui.is_rect_visible(rect) {
            return;
        }
        renderer::paint_viewport(
            &ui.painter_at(rect),
            rect,
            camera.state(),
            &self.cache,
            &state.settings,
            time_secs,
        );
    }
}
