//! First-person camera: keys move the eye, the mouse turns the view.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::bindings::{KeyBindings, Motion};
use super::{ButtonState, CameraProfile, CameraState, InputResponse, Key, MouseButton, ProfileId};

/// Pitch limit in degrees, keeps the view off the up vector
pub const MAX_PITCH: f32 = 89.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FpsSettings {
    /// World units per millisecond
    pub speed: f32,
    /// Degrees per pixel of pointer motion
    pub sensitivity: f32,
    /// Keep the pointer at the viewport centre
    pub warp_pointer: bool,
    pub bindings: BTreeMap<Motion, String>,
}

impl Default for FpsSettings {
    fn default() -> Self {
        Self {
            speed: 0.01,
            sensitivity: 0.2,
            warp_pointer: true,
            bindings: KeyBindings::default_table(),
        }
    }
}

impl FpsSettings {
    pub fn sanitized(&self) -> FpsSettings {
        let defaults = FpsSettings::default();
        let bindings = match KeyBindings::from_table(&self.bindings) {
            Ok(_) => self.bindings.clone(),
            Err(e) => {
                tracing::warn!("{}, using default bindings", e);
                defaults.bindings
            }
        };
        FpsSettings {
            speed: positive_or(self.speed, defaults.speed),
            sensitivity: positive_or(self.sensitivity, defaults.sensitivity),
            warp_pointer: self.warp_pointer,
            bindings,
        }
    }
}

pub(crate) fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

pub struct FpsCamera {
    speed: f32,
    sensitivity: f32,
    warp_pointer: bool,
    bindings: KeyBindings,
    /// Degrees, 0 looks down −Z, positive turns towards +X
    yaw: f32,
    /// Degrees, positive looks down
    pitch: f32,
    active: BTreeSet<Motion>,
    last_pointer: Option<[f32; 2]>,
}

impl FpsCamera {
    pub fn new(settings: &FpsSettings) -> Self {
        let settings = settings.sanitized();
        let bindings = KeyBindings::from_table(&settings.bindings).unwrap_or_default();
        Self {
            speed: settings.speed,
            sensitivity: settings.sensitivity,
            warp_pointer: settings.warp_pointer,
            bindings,
            yaw: 0.0,
            pitch: 0.0,
            active: BTreeSet::new(),
            last_pointer: None,
        }
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn is_active(&self, motion: Motion) -> bool {
        self.active.contains(&motion)
    }

    /// Unit view direction from yaw and pitch
    pub fn forward(&self) -> Vec3 {
        let (sy, cy) = self.yaw.to_radians().sin_cos();
        let (sp, cp) = self.pitch.to_radians().sin_cos();
        Vec3::new(cp * sy, -sp, -cp * cy)
    }

    fn look(&self, state: &mut CameraState) {
        state.center = state.eye + self.forward();
    }

    fn velocity(&self, state: &CameraState) -> Vec3 {
        let forward = self.forward();
        let up = state.up;
        let right = forward.cross(up).normalize_or_zero();
        self.active
            .iter()
            .map(|motion| match motion {
                Motion::Forward => forward,
                Motion::Backward => -forward,
                Motion::Right => right,
                Motion::Left => -right,
                Motion::Up => up,
                Motion::Down => -up,
            })
            .sum()
    }
}

impl CameraProfile for FpsCamera {
    fn id(&self) -> ProfileId {
        ProfileId::Fps
    }

    fn init(&mut self, state: &mut CameraState) {
        let d = state.direction();
        self.pitch = (-d.y.clamp(-1.0, 1.0)).asin().to_degrees().clamp(-MAX_PITCH, MAX_PITCH);
        self.yaw = d.x.atan2(-d.z).to_degrees();
        self.active.clear();
        self.last_pointer = None;
    }

    fn teardown(&mut self, _state: &mut CameraState) {
        self.active.clear();
        self.last_pointer = None;
    }

    fn on_timer_tick(&mut self, state: &mut CameraState, elapsed_ms: f32) -> InputResponse {
        if self.active.is_empty() || elapsed_ms <= 0.0 {
            return InputResponse::default();
        }
        let step = self.velocity(state) * self.speed * elapsed_ms;
        if step == Vec3::ZERO {
            return InputResponse::default();
        }
        state.eye += step;
        self.look(state);
        InputResponse::redisplay()
    }

    fn on_key_down(&mut self, _state: &mut CameraState, key: Key) -> InputResponse {
        if let Some(motion) = self.bindings.motion_for(key) {
            self.active.insert(motion);
        }
        InputResponse::default()
    }

    fn on_key_up(&mut self, _state: &mut CameraState, key: Key) -> InputResponse {
        if let Some(motion) = self.bindings.motion_for(key) {
            self.active.remove(&motion);
        }
        InputResponse::default()
    }

    fn on_mouse_move(&mut self, state: &mut CameraState, x: f32, y: f32) -> InputResponse {
        let mut response = InputResponse::default();

        if let Some([lx, ly]) = self.last_pointer {
            let dx = x - lx;
            let dy = y - ly;
            if dx != 0.0 || dy != 0.0 {
                self.yaw = (self.yaw + dx * self.sensitivity).rem_euclid(360.0);
                self.pitch = (self.pitch + dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
                self.look(state);
                response.redisplay = true;
            }
        }

        if self.warp_pointer {
            let centre = state.viewport_center();
            response.warp_pointer = Some(centre);
            self.last_pointer = Some(centre);
        } else {
            self.last_pointer = Some([x, y]);
        }
        response
    }

    fn on_mouse_button(
        &mut self,
        _state: &mut CameraState,
        _button: MouseButton,
        _button_state: ButtonState,
        _x: f32,
        _y: f32,
    ) -> InputResponse {
        InputResponse::default()
    }

    fn on_reshape(&mut self, state: &mut CameraState, width: u32, height: u32) -> InputResponse {
        state.set_viewport(width, height);
        self.last_pointer = None;
        InputResponse::redisplay()
    }

    fn grabs_pointer(&self) -> bool {
        self.warp_pointer
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "yaw": self.yaw,
            "pitch": self.pitch,
            "active": self.active.iter().collect::<Vec<_>>(),
            "speed": self.speed,
            "sensitivity": self.sensitivity,
            "warp_pointer": self.warp_pointer,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::CameraSetup;

    fn looking_down_neg_z() -> CameraState {
        CameraState::from_setup(&CameraSetup {
            position: [0.0, 0.0, 5.0],
            look_at: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            projection: Default::default(),
        })
    }

    fn camera(warp: bool) -> FpsCamera {
        FpsCamera::new(&FpsSettings {
            warp_pointer: warp,
            ..FpsSettings::default()
        })
    }

    #[test]
    fn test_init_derives_orientation() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        assert!(cam.yaw().abs() < 1e-4);
        assert!(cam.pitch().abs() < 1e-4);
        assert!((cam.forward() - Vec3::NEG_Z).length() < 1e-5);

        state.center = state.eye + Vec3::new(1.0, -1.0, 0.0);
        cam.init(&mut state);
        assert!((cam.yaw() - 90.0).abs() < 1e-3);
        assert!((cam.pitch() - 45.0).abs() < 1e-3);
        assert!((cam.forward() - state.direction()).length() < 1e-5);
    }

    #[test]
    fn test_forward_tick_moves_speed_times_elapsed() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        let start = state.eye;
        let dir = state.direction();

        cam.on_key_down(&mut state, Key::Char('w'));
        let response = cam.on_timer_tick(&mut state, 16.0);
        assert!(response.redisplay);

        let expected = start + dir * (0.01 * 16.0);
        assert!((state.eye - expected).length() < 1e-5);
        assert!((state.center - (state.eye + dir)).length() < 1e-5);
    }

    #[test]
    fn test_key_up_stops_motion_and_case_insensitive() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        cam.on_key_down(&mut state, Key::Char('D'));
        assert!(cam.is_active(Motion::Right));
        cam.on_timer_tick(&mut state, 100.0);
        assert!((state.eye.x - 1.0).abs() < 1e-5);

        cam.on_key_up(&mut state, Key::Char('d'));
        let before = state.eye;
        assert!(!cam.on_timer_tick(&mut state, 100.0).redisplay);
        assert_eq!(state.eye, before);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        cam.on_key_down(&mut state, Key::Char('e'));
        cam.on_key_down(&mut state, Key::Char('q'));
        let before = state.eye;
        cam.on_timer_tick(&mut state, 50.0);
        assert_eq!(state.eye, before);
    }

    #[test]
    fn test_pitch_clamped_under_large_deltas() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        cam.on_mouse_move(&mut state, 0.0, 0.0);
        for i in 1..50 {
            cam.on_mouse_move(&mut state, 0.0, i as f32 * 10_000.0);
            assert!(cam.pitch() <= MAX_PITCH && cam.pitch() < 90.0);
        }
        for i in 1..50 {
            cam.on_mouse_move(&mut state, 0.0, -(i as f32) * 1.0e6);
            assert!(cam.pitch() >= -MAX_PITCH);
        }
        assert!(state.direction().is_finite());
    }

    #[test]
    fn test_mouse_deltas_in_degrees_per_pixel() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        cam.on_mouse_move(&mut state, 100.0, 100.0);
        let response = cam.on_mouse_move(&mut state, 110.0, 105.0);
        assert!(response.redisplay);
        assert!(response.warp_pointer.is_none());
        assert!((cam.yaw() - 2.0).abs() < 1e-4);
        assert!((cam.pitch() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_warp_recenters_pointer() {
        let mut state = looking_down_neg_z();
        state.set_viewport(800, 600);
        let mut cam = camera(true);
        cam.init(&mut state);

        let first = cam.on_mouse_move(&mut state, 10.0, 10.0);
        assert_eq!(first.warp_pointer, Some([400.0, 300.0]));
        assert!(!first.redisplay);

        // Next delta is measured from the centre
        let second = cam.on_mouse_move(&mut state, 405.0, 300.0);
        assert_eq!(second.warp_pointer, Some([400.0, 300.0]));
        assert!((cam.yaw() - 1.0).abs() < 1e-4);
        assert!(cam.grabs_pointer());
    }

    #[test]
    fn test_invalid_bindings_fall_back_to_defaults() {
        let mut settings = FpsSettings::default();
        settings.bindings.insert(Motion::Down, "w".into());
        settings.speed = -3.0;
        let clean = settings.sanitized();
        assert_eq!(clean.bindings, KeyBindings::default_table());
        assert_eq!(clean.speed, FpsSettings::default().speed);

        let mut state = looking_down_neg_z();
        let mut cam = FpsCamera::new(&settings);
        cam.init(&mut state);
        cam.on_key_down(&mut state, Key::Char('q'));
        assert!(cam.is_active(Motion::Down));
    }

    #[test]
    fn test_init_clears_motion_flags() {
        let mut state = looking_down_neg_z();
        let mut cam = camera(false);
        cam.init(&mut state);
        cam.on_key_down(&mut state, Key::Char('w'));
        cam.init(&mut state);
        assert!(!cam.is_active(Motion::Forward));
    }
}
