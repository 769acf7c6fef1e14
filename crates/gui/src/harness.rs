//! Headless harness: camera switch, scene and mesh cache without a window.
//!
//! Drives the same library code the viewer uses. Tests and scripts feed it
//! input events and inspect the resulting camera and meshes.

use std::path::Path;

use glam::Vec3;
use serde_json::json;
use shared::{ModelEntry, ModelId, ModelSource, PatchSet, TransformOp, World};

use crate::build::{
    self, generate_patch_set_with_normal, generate_with_normal, tessellation_resolution,
    BezierModel, BuildError, MeshCache,
};
use crate::camera::{
    ButtonState, CameraError, CameraState, CameraSwitch, InputResponse, Key, MouseButton,
    ProfileId,
};
use crate::state::scene::{model_display_name, SceneState};
use crate::state::settings::AppSettings;
use crate::validation::MeshValidator;
use crate::viewport::bounds::Aabb;
use crate::viewport::mesh::MeshData;

/// Headless harness: owns settings, the camera switch, the scene and a mesh cache
pub struct TestHarness {
    pub settings: AppSettings,
    pub camera: CameraSwitch,
    pub scene: SceneState,
    cache: MeshCache,
    /// Animation clock advanced by ticks
    time_secs: f32,
}

impl TestHarness {
    /// Harness with default settings (the settings file is not read)
    pub fn new() -> Self {
        Self::with_settings(AppSettings::default())
    }

    pub fn with_settings(settings: AppSettings) -> Self {
        let settings = settings.sanitized();
        let camera = CameraSwitch::new(CameraState::default(), &settings.camera);
        Self {
            settings,
            camera,
            scene: SceneState::default(),
            cache: MeshCache::new(),
            time_secs: 0.0,
        }
    }

    // ── Camera ────────────────────────────────────────────────

    pub fn camera_state(&self) -> &CameraState {
        self.camera.state()
    }

    pub fn current_profile(&self) -> ProfileId {
        self.camera.current_profile()
    }

    pub fn change_profile(&mut self, id: ProfileId) {
        self.camera.change_profile(id);
    }

    pub fn change_profile_named(&mut self, name: &str) -> Result<(), CameraError> {
        self.camera.change_profile_named(name)
    }

    pub fn key_down(&mut self, key: Key) -> InputResponse {
        self.camera.on_key_down(key)
    }

    pub fn key_up(&mut self, key: Key) -> InputResponse {
        self.camera.on_key_up(key)
    }

    /// Press and release a key
    pub fn key_press(&mut self, key: Key) -> InputResponse {
        let down = self.camera.on_key_down(key);
        down.merge(self.camera.on_key_up(key))
    }

    pub fn mouse_move(&mut self, x: f32, y: f32) -> InputResponse {
        self.camera.on_mouse_move(x, y)
    }

    pub fn mouse_button(
        &mut self,
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
    ) -> InputResponse {
        self.camera.on_mouse_button(button, state, x, y)
    }

    /// Left-button drag from `from` to `to` in one move
    pub fn drag(&mut self, from: [f32; 2], to: [f32; 2]) -> InputResponse {
        let press = self.mouse_button(MouseButton::Left, ButtonState::Pressed, from[0], from[1]);
        let moved = self.mouse_move(to[0], to[1]);
        let release = self.mouse_button(MouseButton::Left, ButtonState::Released, to[0], to[1]);
        press.merge(moved).merge(release)
    }

    pub fn reshape(&mut self, width: u32, height: u32) -> InputResponse {
        self.camera.on_reshape(width, height)
    }

    /// Advance the camera and the animation clock by `elapsed_ms`
    pub fn tick(&mut self, elapsed_ms: f32) -> InputResponse {
        self.time_secs += elapsed_ms / 1000.0;
        self.camera.on_timer_tick(elapsed_ms)
    }

    pub fn time_secs(&self) -> f32 {
        self.time_secs
    }

    // ── Scene ─────────────────────────────────────────────────

    /// Replace the world and move the camera to its declared setup
    pub fn load_world(&mut self, world: World) {
        let state = CameraState::from_setup(&world.camera);
        self.scene.replace_world(world, None);
        self.camera.reset_state(state);
        self.time_secs = 0.0;
    }

    pub fn load_world_json(&mut self, json: &str) -> Result<(), String> {
        let world: World =
            serde_json::from_str(json).map_err(|e| format!("JSON parse error: {e}"))?;
        self.load_world(world);
        Ok(())
    }

    pub fn export_world_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(&self.scene.world).map_err(|e| e.to_string())
    }

    /// Add a model in its own top-level group
    pub fn add_model(&mut self, source: ModelSource, transforms: Vec<TransformOp>) -> ModelId {
        self.scene.add_model(ModelEntry::new(source), transforms)
    }

    pub fn remove_model(&mut self, id: &str) -> bool {
        self.scene.remove_model(id)
    }

    pub fn hide(&mut self, id: &str) -> bool {
        self.scene.set_visible(id, false)
    }

    pub fn show(&mut self, id: &str) -> bool {
        self.scene.set_visible(id, true)
    }

    /// Remove every model; the camera stays where it is
    pub fn clear(&mut self) {
        self.scene.clear();
        self.time_secs = 0.0;
    }

    pub fn model_count(&self) -> usize {
        self.scene.model_count()
    }

    // ── Generator ─────────────────────────────────────────────

    /// Run the Bezier generator on explicit control patches
    pub fn generate_bezier(
        &self,
        patches: &[Vec<Vec3>],
        tessellation: u32,
    ) -> Result<BezierModel, BuildError> {
        Ok(generate_with_normal(
            patches,
            tessellation_resolution(tessellation),
            self.default_normal(),
        )?)
    }

    /// Run the Bezier generator on an indexed patch table
    pub fn generate_patch_set(
        &self,
        set: &PatchSet,
        tessellation: u32,
    ) -> Result<BezierModel, BuildError> {
        Ok(generate_patch_set_with_normal(
            set,
            tessellation_resolution(tessellation),
            self.default_normal(),
        )?)
    }

    /// Read a `.patch` file (relative to the world directory) and generate it
    pub fn generate_patch_file(
        &self,
        path: &Path,
        tessellation: u32,
    ) -> Result<BezierModel, BuildError> {
        let path = match self.scene.base_dir() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        };
        let set = build::load_patch_file(&path)?;
        self.generate_patch_set(&set, tessellation)
    }

    fn default_normal(&self) -> Vec3 {
        let normal = Vec3::from_array(self.settings.generator.default_normal).normalize_or_zero();
        if normal == Vec3::ZERO {
            build::DEFAULT_NORMAL
        } else {
            normal
        }
    }

    // ── Build + inspection ────────────────────────────────────

    /// Bring the mesh cache up to date with the scene
    pub fn build(&mut self) -> bool {
        self.cache
            .ensure(&self.scene.world, self.scene.base_dir(), self.scene.version())
    }

    pub fn mesh_of(&self, id: &str) -> Option<&MeshData> {
        self.cache.mesh(id)
    }

    pub fn visible_mesh_count(&self) -> usize {
        self.cache.meshes().len()
    }

    pub fn validate_mesh(&self, id: &str) -> Option<MeshValidator<'_>> {
        self.cache.mesh(id).map(MeshValidator::new)
    }

    pub fn errors(&self) -> &std::collections::HashMap<ModelId, String> {
        self.cache.errors()
    }

    pub fn rebuild_count(&self) -> u64 {
        self.cache.rebuild_count()
    }

    /// World-space bounds of the built scene at the current animation time
    pub fn world_bounds(&self) -> Aabb {
        self.cache.world_bounds(self.time_secs)
    }

    /// Camera placement, active profile and its private state as JSON
    pub fn inspect_camera(&self) -> serde_json::Value {
        let state = self.camera.state();
        json!({
            "profile": self.camera.current_profile().name(),
            "profile_changed": self.camera.profile_has_changed(),
            "eye": state.eye.to_array(),
            "center": state.center.to_array(),
            "up": state.up.to_array(),
            "direction": state.direction().to_array(),
            "viewport": [state.width, state.height],
            "fov": state.projection.fov,
            "grabs_pointer": self.camera.active().grabs_pointer(),
            "profile_state": self.camera.active().describe(),
        })
    }

    /// Models, visibility and built mesh sizes as JSON. Builds first.
    pub fn inspect_scene(&mut self) -> serde_json::Value {
        self.build();
        let models: Vec<serde_json::Value> = self
            .cache
            .placed()
            .iter()
            .map(|placed| {
                let mesh = self.cache.mesh(placed.id());
                json!({
                    "id": placed.id(),
                    "name": model_display_name(&placed.model),
                    "kind": placed.model.source.kind(),
                    "visible": placed.model.visible,
                    "animated": placed.is_animated(),
                    "vertex_count": mesh.map_or(0, MeshData::vertex_count),
                    "triangle_count": mesh.map_or(0, MeshData::triangle_count),
                    "error": self.cache.errors().get(placed.id()),
                })
            })
            .collect();
        json!({
            "model_count": self.scene.model_count(),
            "version": self.scene.version(),
            "time": self.time_secs,
            "models": models,
        })
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_patch() -> Vec<Vec3> {
        let mut points = Vec::new();
        for r in 0..4 {
            for c in 0..4 {
                points.push(Vec3::new(c as f32, 0.0, r as f32));
            }
        }
        points
    }

    #[test]
    fn test_new_harness_empty() {
        let h = TestHarness::new();
        assert_eq!(h.model_count(), 0);
        assert_eq!(h.current_profile(), ProfileId::Explorer);
        assert!(!h.camera.profile_has_changed());
    }

    #[test]
    fn test_add_and_build() {
        let mut h = TestHarness::new();
        let id = h.add_model(
            ModelSource::Box {
                length: 1.0,
                divisions: 2,
            },
            vec![],
        );
        assert!(h.build());
        assert_eq!(h.visible_mesh_count(), 1);
        let v = h.validate_mesh(&id).unwrap();
        assert!(v.validate_all().is_empty());
        assert!(!h.build());
    }

    #[test]
    fn test_hide_show() {
        let mut h = TestHarness::new();
        let id = h.add_model(
            ModelSource::Sphere {
                radius: 1.0,
                slices: 8,
                stacks: 6,
            },
            vec![],
        );
        h.build();
        assert!(h.mesh_of(&id).is_some());

        h.hide(&id);
        h.build();
        assert!(h.mesh_of(&id).is_none());

        h.show(&id);
        h.build();
        assert!(h.mesh_of(&id).is_some());
    }

    #[test]
    fn test_tick_advances_clock() {
        let mut h = TestHarness::new();
        h.tick(250.0);
        h.tick(250.0);
        assert!((h.time_secs() - 0.5).abs() < 1e-6);
        h.clear();
        assert_eq!(h.time_secs(), 0.0);
    }

    #[test]
    fn test_generate_bezier_uses_tessellation() {
        let h = TestHarness::new();
        let model = h.generate_bezier(&[flat_patch()], 4).unwrap();
        assert_eq!(model.resolution, 5);
        assert_eq!(model.vertex_count(), 25);
    }

    #[test]
    fn test_load_world_moves_camera() {
        let mut h = TestHarness::new();
        h.load_world_json(
            r#"{"camera": {"position": [0, 0, 20], "look_at": [0, 0, 0], "up": [0, 1, 0]}}"#,
        )
        .unwrap();
        assert!((h.camera_state().eye - Vec3::new(0.0, 0.0, 20.0)).length() < 1e-4);
        assert_eq!(h.inspect_camera()["profile_state"]["radius"], 20.0);
    }

    #[test]
    fn test_drag_in_explorer_moves_eye() {
        let mut h = TestHarness::new();
        let eye = h.camera_state().eye;
        let response = h.drag([100.0, 100.0], [140.0, 100.0]);
        assert!(response.redisplay);
        assert!(h.camera_state().eye.distance(eye) > 1e-3);
    }
}
