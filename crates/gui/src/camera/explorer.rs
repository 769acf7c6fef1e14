//! Orbit camera around the look-at point.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::fps::positive_or;
use super::{ButtonState, CameraProfile, CameraState, InputResponse, Key, MouseButton, ProfileId};

/// Elevation limit in degrees
pub const MAX_ELEVATION: f32 = 89.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorerSettings {
    /// Degrees per pixel of drag
    pub sensitivity: f32,
    /// Degrees per arrow key press
    pub key_step: f32,
    /// Radius change per wheel notch or +/- press
    pub zoom_step: f32,
    pub min_radius: f32,
    pub max_radius: f32,
}

impl Default for ExplorerSettings {
    fn default() -> Self {
        Self {
            sensitivity: 0.5,
            key_step: 5.0,
            zoom_step: 0.5,
            min_radius: 1.0,
            max_radius: 500.0,
        }
    }
}

impl ExplorerSettings {
    /// Positive steps and `0 < min_radius <= max_radius`
    pub fn sanitized(&self) -> ExplorerSettings {
        let defaults = ExplorerSettings::default();
        let min_radius = positive_or(self.min_radius, defaults.min_radius);
        let max_radius = positive_or(self.max_radius, defaults.max_radius).max(min_radius);
        ExplorerSettings {
            sensitivity: positive_or(self.sensitivity, defaults.sensitivity),
            key_step: positive_or(self.key_step, defaults.key_step),
            zoom_step: positive_or(self.zoom_step, defaults.zoom_step),
            min_radius,
            max_radius,
        }
    }
}

pub struct ExplorerCamera {
    settings: ExplorerSettings,
    /// Degrees around +Y, 0 puts the eye on +Z of the center
    azimuth: f32,
    /// Degrees above the XZ plane
    elevation: f32,
    radius: f32,
    dragging: bool,
    last_pointer: Option<[f32; 2]>,
}

impl ExplorerCamera {
    pub fn new(settings: &ExplorerSettings) -> Self {
        let settings = settings.sanitized();
        let radius = settings.min_radius.max(5.0).min(settings.max_radius);
        Self {
            settings,
            azimuth: 0.0,
            elevation: 0.0,
            radius,
            dragging: false,
            last_pointer: None,
        }
    }

    pub fn azimuth(&self) -> f32 {
        self.azimuth
    }

    pub fn elevation(&self) -> f32 {
        self.elevation
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Offset of the eye from the center
    fn offset(&self) -> Vec3 {
        let (sa, ca) = self.azimuth.to_radians().sin_cos();
        let (se, ce) = self.elevation.to_radians().sin_cos();
        Vec3::new(ce * sa, se, ce * ca) * self.radius
    }

    fn place(&self, state: &mut CameraState) {
        state.eye = state.center + self.offset();
    }

    fn rotate(
        &mut self,
        state: &mut CameraState,
        d_azimuth: f32,
        d_elevation: f32,
    ) -> InputResponse {
        self.azimuth = (self.azimuth + d_azimuth).rem_euclid(360.0);
        self.elevation = (self.elevation + d_elevation).clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.place(state);
        InputResponse::redisplay()
    }

    /// Change the radius by `delta`, clamped to the configured range
    fn zoom(&mut self, state: &mut CameraState, delta: f32) -> InputResponse {
        self.radius =
            (self.radius + delta).clamp(self.settings.min_radius, self.settings.max_radius);
        self.place(state);
        InputResponse::redisplay()
    }
}

impl CameraProfile for ExplorerCamera {
    fn id(&self) -> ProfileId {
        ProfileId::Explorer
    }

    fn init(&mut self, state: &mut CameraState) {
        let offset = state.eye - state.center;
        let length = offset.length();
        if length.is_finite() && length > 1e-6 {
            let dir = offset / length;
            self.elevation = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
            self.azimuth = dir.x.atan2(dir.z).to_degrees().rem_euclid(360.0);
        } else {
            self.elevation = 0.0;
            self.azimuth = 0.0;
        }
        self.elevation = self.elevation.clamp(-MAX_ELEVATION, MAX_ELEVATION);
        self.radius = if length.is_finite() { length } else { self.radius };
        self.radius = self.radius.clamp(self.settings.min_radius, self.settings.max_radius);
        self.dragging = false;
        self.last_pointer = None;
        self.place(state);
    }

    fn teardown(&mut self, _state: &mut CameraState) {
        self.dragging = false;
        self.last_pointer = None;
    }

    fn on_timer_tick(&mut self, _state: &mut CameraState, _elapsed_ms: f32) -> InputResponse {
        InputResponse::default()
    }

    fn on_key_down(&mut self, state: &mut CameraState, key: Key) -> InputResponse {
        let step = self.settings.key_step;
        match key.normalized() {
            Key::Up => self.rotate(state, 0.0, step),
            Key::Down => self.rotate(state, 0.0, -step),
            Key::Left => self.rotate(state, -step, 0.0),
            Key::Right => self.rotate(state, step, 0.0),
            Key::Char('+') | Key::Char('=') | Key::PageUp => {
                self.zoom(state, -self.settings.zoom_step)
            }
            Key::Char('-') | Key::PageDown => self.zoom(state, self.settings.zoom_step),
            _ => InputResponse::default(),
        }
    }

    fn on_key_up(&mut self, _state: &mut CameraState, _key: Key) -> InputResponse {
        InputResponse::default()
    }

    fn on_mouse_move(&mut self, state: &mut CameraState, x: f32, y: f32) -> InputResponse {
        if !self.dragging {
            return InputResponse::default();
        }
        let response = match self.last_pointer {
            Some([lx, ly]) => {
                let s = self.settings.sensitivity;
                self.rotate(state, -(x - lx) * s, (y - ly) * s)
            }
            None => InputResponse::default(),
        };
        self.last_pointer = Some([x, y]);
        response
    }

    fn on_mouse_button(
        &mut self,
        state: &mut CameraState,
        button: MouseButton,
        button_state: ButtonState,
        x: f32,
        y: f32,
    ) -> InputResponse {
        match (button, button_state) {
            (MouseButton::Left, ButtonState::Pressed) => {
                self.dragging = true;
                self.last_pointer = Some([x, y]);
                InputResponse::default()
            }
            (MouseButton::Left, ButtonState::Released) => {
                self.dragging = false;
                self.last_pointer = None;
                InputResponse::default()
            }
            (MouseButton::WheelUp, ButtonState::Pressed) => {
                self.zoom(state, -self.settings.zoom_step)
            }
            (MouseButton::WheelDown, ButtonState::Pressed) => {
                self.zoom(state, self.settings.zoom_step)
            }
            _ => InputResponse::default(),
        }
    }

    fn describe(&self) -> serde_json::Value {
        serde_json::json!({
            "azimuth": self.azimuth,
            "elevation": self.elevation,
            "radius": self.radius,
            "dragging": self.dragging,
            "min_radius": self.settings.min_radius,
            "max_radius": self.settings.max_radius,
        })
    }
}
