//! Camera state and switchable camera profiles.
//!
//! `CameraSwitch` owns the single `CameraState` and a registry holding one
//! instance of every profile. Input events go to the switch, which forwards
//! them to the active profile together with `&mut CameraState`.

pub mod bindings;
pub mod explorer;
pub mod fps;
pub mod switch;

pub use bindings::{KeyBindings, Motion};
pub use explorer::{ExplorerCamera, ExplorerSettings};
pub use fps::{FpsCamera, FpsSettings};
pub use switch::CameraSwitch;

use std::fmt;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use shared::{CameraSetup, Projection};

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum CameraError {
    /// Index or name does not denote a registered profile
    UnknownProfile(String),
    /// Key binding table is not a one-to-one map of parseable keys
    InvalidBinding(String),
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::UnknownProfile(what) => write!(f, "Unknown camera profile: {}", what),
            CameraError::InvalidBinding(msg) => write!(f, "Invalid key binding: {}", msg),
        }
    }
}

impl std::error::Error for CameraError {}

// ============================================================================
// Profile identifiers
// ============================================================================

/// Number of registered profiles
pub const NPROFILES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileId {
    #[default]
    Explorer,
    Fps,
}

impl ProfileId {
    pub const ALL: [ProfileId; NPROFILES] = [ProfileId::Explorer, ProfileId::Fps];

    pub fn index(self) -> usize {
        match self {
            ProfileId::Explorer => 0,
            ProfileId::Fps => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ProfileId::Explorer => "explorer",
            ProfileId::Fps => "fps",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProfileId::Explorer => "Explorer",
            ProfileId::Fps => "First person",
        }
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<usize> for ProfileId {
    type Error = CameraError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        ProfileId::ALL
            .get(index)
            .copied()
            .ok_or_else(|| CameraError::UnknownProfile(format!("index {}", index)))
    }
}

impl FromStr for ProfileId {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ProfileId::ALL
            .iter()
            .copied()
            .find(|id| id.name() == wanted)
            .ok_or_else(|| CameraError::UnknownProfile(format!("'{}'", s)))
    }
}

// ============================================================================
// Input events
// ============================================================================

/// Keyboard key as seen by camera profiles. Characters are stored lowercase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Key {
    Char(char),
    Up,
    Down,
    Left,
    Right,
    PageUp,
    PageDown,
    Home,
    End,
    Escape,
}

impl Key {
    /// Character key, case-folded
    pub fn char(c: char) -> Key {
        Key::Char(c.to_ascii_lowercase())
    }

    /// Same key with character case folded
    pub fn normalized(self) -> Key {
        match self {
            Key::Char(c) => Key::char(c),
            other => other,
        }
    }
}

const SPECIAL_KEYS: [(Key, &str); 9] = [
    (Key::Up, "up"),
    (Key::Down, "down"),
    (Key::Left, "left"),
    (Key::Right, "right"),
    (Key::PageUp, "page_up"),
    (Key::PageDown, "page_down"),
    (Key::Home, "home"),
    (Key::End, "end"),
    (Key::Escape, "escape"),
];

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            other => {
                let name = SPECIAL_KEYS
                    .iter()
                    .find(|(k, _)| k == other)
                    .map(|(_, n)| *n)
                    .unwrap_or("?");
                f.write_str(name)
            }
        }
    }
}

impl FromStr for Key {
    type Err = CameraError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_whitespace() {
                return Ok(Key::char(c));
            }
        }
        let wanted = s.trim().to_ascii_lowercase();
        SPECIAL_KEYS
            .iter()
            .find(|(_, name)| *name == wanted)
            .map(|(k, _)| *k)
            .ok_or_else(|| CameraError::InvalidBinding(format!("unknown key '{}'", s)))
    }
}

impl TryFrom<String> for Key {
    type Error = CameraError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.to_string()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    WheelUp,
    WheelDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonState {
    Pressed,
    Released,
}

/// What the event loop should do after a handler ran
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InputResponse {
    /// The camera moved; redraw the frame
    pub redisplay: bool,
    /// Move the pointer to this window position
    pub warp_pointer: Option<[f32; 2]>,
}

impl InputResponse {
    pub fn redisplay() -> Self {
        Self {
            redisplay: true,
            warp_pointer: None,
        }
    }

    /// Combine two responses; the later warp wins
    pub fn merge(self, other: InputResponse) -> InputResponse {
        InputResponse {
            redisplay: self.redisplay || other.redisplay,
            warp_pointer: other.warp_pointer.or(self.warp_pointer),
        }
    }
}

// ============================================================================
// Camera state
// ============================================================================

/// View parameters shared by all profiles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub eye: Vec3,
    /// Look-at point
    pub center: Vec3,
    pub up: Vec3,
    pub projection: Projection,
    pub width: u32,
    pub height: u32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self::from_setup(&CameraSetup::default())
    }
}

impl CameraState {
    pub fn from_setup(setup: &CameraSetup) -> Self {
        let up = Vec3::from_array(setup.up).normalize_or_zero();
        Self {
            eye: Vec3::from_array(setup.position),
            center: Vec3::from_array(setup.look_at),
            up: if up == Vec3::ZERO { Vec3::Y } else { up },
            projection: setup.projection,
            width: 800,
            height: 600,
        }
    }

    /// Store the viewport size; a zero height is treated as 1
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height.max(1);
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// Window position of the viewport centre
    pub fn viewport_center(&self) -> [f32; 2] {
        [self.width as f32 * 0.5, self.height as f32 * 0.5]
    }

    /// Unit vector from eye to center (−Z when they coincide)
    pub fn direction(&self) -> Vec3 {
        let d = (self.center - self.eye).normalize_or_zero();
        if d == Vec3::ZERO {
            Vec3::NEG_Z
        } else {
            d
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.center, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh_gl(
            self.projection.fov.to_radians(),
            self.aspect(),
            self.projection.near,
            self.projection.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

// ============================================================================
// Profile trait
// ============================================================================

/// A camera behaviour: interprets input and moves the shared camera state.
///
/// Handlers never block and never do I/O.
pub trait CameraProfile {
    fn id(&self) -> ProfileId;

    /// Called when the profile becomes active. Derives private state from `state`.
    fn init(&mut self, state: &mut CameraState);

    /// Called when another profile takes over
    fn teardown(&mut self, _state: &mut CameraState) {}

    fn on_timer_tick(&mut self, state: &mut CameraState, elapsed_ms: f32) -> InputResponse;

    fn on_key_down(&mut self, state: &mut CameraState, key: Key) -> InputResponse;

    fn on_key_up(&mut self, state: &mut CameraState, key: Key) -> InputResponse;

    fn on_mouse_move(&mut self, state: &mut CameraState, x: f32, y: f32) -> InputResponse;

    fn on_mouse_button(
        &mut self,
        state: &mut CameraState,
        button: MouseButton,
        button_state: ButtonState,
        x: f32,
        y: f32,
    ) -> InputResponse;

    fn on_reshape(&mut self, state: &mut CameraState, width: u32, height: u32) -> InputResponse {
        state.set_viewport(width, height);
        InputResponse::redisplay()
    }

    /// The profile captures the pointer (hidden cursor, warped to the centre)
    fn grabs_pointer(&self) -> bool {
        false
    }

    /// Profile-private state for inspection
    fn describe(&self) -> serde_json::Value {
        serde_json::Value::Null
    }
}

/// Settings for both profiles and the startup profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CameraSettings {
    pub default_profile: ProfileId,
    pub fps: FpsSettings,
    pub explorer: ExplorerSettings,
}

impl CameraSettings {
    /// Copy with every numeric parameter forced into its valid range
    pub fn sanitized(&self) -> CameraSettings {
        CameraSettings {
            default_profile: self.default_profile,
            fps: self.fps.sanitized(),
            explorer: self.explorer.sanitized(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_id_from_index_and_name() {
        assert_eq!(ProfileId::try_from(0).unwrap(), ProfileId::Explorer);
        assert_eq!(ProfileId::try_from(1).unwrap(), ProfileId::Fps);
        assert!(matches!(
            ProfileId::try_from(NPROFILES),
            Err(CameraError::UnknownProfile(_))
        ));
        assert_eq!("FPS".parse::<ProfileId>().unwrap(), ProfileId::Fps);
        assert!("orbit".parse::<ProfileId>().is_err());
        for id in ProfileId::ALL {
            assert_eq!(ProfileId::try_from(id.index()).unwrap(), id);
        }
    }

    #[test]
    fn test_key_parse_and_display() {
        assert_eq!("W".parse::<Key>().unwrap(), Key::Char('w'));
        assert_eq!("page_up".parse::<Key>().unwrap(), Key::PageUp);
        assert_eq!(Key::Left.to_string(), "left");
        assert_eq!(Key::Char('q').to_string(), "q");
        assert!("shift".parse::<Key>().is_err());
        assert!(" ".parse::<Key>().is_err());
        assert_eq!(Key::Char('E').normalized(), Key::Char('e'));
    }

    #[test]
    fn test_key_serde_as_string() {
        let json = serde_json::to_string(&Key::PageDown).unwrap();
        assert_eq!(json, r#""page_down""#);
        let key: Key = serde_json::from_str(r#""A""#).unwrap();
        assert_eq!(key, Key::Char('a'));
    }

    #[test]
    fn test_reshape_zero_height() {
        let mut state = CameraState::default();
        state.set_viewport(640, 0);
        assert_eq!(state.height, 1);
        assert_eq!(state.aspect(), 640.0);
        assert_eq!(state.viewport_center(), [320.0, 0.5]);
    }

    #[test]
    fn test_state_from_setup() {
        let state = CameraState::from_setup(&CameraSetup {
            position: [0.0, 0.0, 10.0],
            look_at: [0.0, 0.0, 0.0],
            up: [0.0, 2.0, 0.0],
            projection: Projection::default(),
        });
        assert_eq!(state.up, Vec3::Y);
        assert_eq!(state.direction(), Vec3::NEG_Z);
        let p = state.view_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-5);
    }

    #[test]
    fn test_response_merge() {
        let a = InputResponse {
            redisplay: false,
            warp_pointer: Some([1.0, 1.0]),
        };
        let merged = a.merge(InputResponse::redisplay());
        assert!(merged.redisplay);
        assert_eq!(merged.warp_pointer, Some([1.0, 1.0]));
    }
}
