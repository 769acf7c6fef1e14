//! Profile registry and switching.

use super::{
    ButtonState, CameraError, CameraProfile, CameraSettings, CameraState, ExplorerCamera,
    FpsCamera, InputResponse, Key, MouseButton, ProfileId, NPROFILES,
};

/// Owns the camera state and one instance of every profile.
///
/// Across a profile change the eye, center, up vector, projection and
/// viewport persist; the incoming profile re-derives its own orientation from
/// them in `init`, and motion flags, pointer tracking and drag state start
/// cleared.
pub struct CameraSwitch {
    state: CameraState,
    /// Indexed by `ProfileId::index`
    profiles: Vec<Box<dyn CameraProfile>>,
    current: ProfileId,
    changed: bool,
}

impl CameraSwitch {
    pub fn new(state: CameraState, settings: &CameraSettings) -> Self {
        let settings = settings.sanitized();
        let mut profiles: Vec<Box<dyn CameraProfile>> = Vec::with_capacity(NPROFILES);
        for id in ProfileId::ALL {
            let profile: Box<dyn CameraProfile> = match id {
                ProfileId::Explorer => Box::new(ExplorerCamera::new(&settings.explorer)),
                ProfileId::Fps => Box::new(FpsCamera::new(&settings.fps)),
            };
            profiles.push(profile);
        }

        let mut switch = Self {
            state,
            profiles,
            current: settings.default_profile,
            changed: false,
        };
        let current = switch.current;
        switch.profiles[current.index()].init(&mut switch.state);
        switch
    }

    pub fn state(&self) -> &CameraState {
        &self.state
    }

    pub fn current_profile(&self) -> ProfileId {
        self.current
    }

    /// Profile instance registered under `id`
    pub fn load_profile(&self, id: ProfileId) -> &dyn CameraProfile {
        self.profiles[id.index()].as_ref()
    }

    pub fn active(&self) -> &dyn CameraProfile {
        self.load_profile(self.current)
    }

    /// Make `id` the active profile.
    ///
    /// The outgoing profile is torn down and the incoming one initialised,
    /// even when both are the same.
    pub fn change_profile(&mut self, id: ProfileId) {
        let outgoing = self.current;
        self.profiles[outgoing.index()].teardown(&mut self.state);
        self.profiles[id.index()].init(&mut self.state);
        self.current = id;
        self.changed = true;
        tracing::info!(from = %outgoing, to = %id, "Camera profile changed");
    }

    /// Change profile by registry index. Unknown indices leave everything untouched.
    pub fn change_profile_index(&mut self, index: usize) -> Result<(), CameraError> {
        let id = ProfileId::try_from(index)?;
        self.change_profile(id);
        Ok(())
    }

    /// Change profile by name ("fps", "explorer")
    pub fn change_profile_named(&mut self, name: &str) -> Result<(), CameraError> {
        let id: ProfileId = name.parse()?;
        self.change_profile(id);
        Ok(())
    }

    /// Cycle to the next registered profile
    pub fn next_profile(&mut self) {
        let next = ProfileId::ALL[(self.current.index() + 1) % NPROFILES];
        self.change_profile(next);
    }

    pub fn profile_has_changed(&self) -> bool {
        self.changed
    }

    pub fn acknowledge_profile_change(&mut self) {
        self.changed = false;
    }

    /// Replace the camera placement and re-initialise the active profile
    pub fn reset_state(&mut self, state: CameraState) {
        let (width, height) = (self.state.width, self.state.height);
        self.state = state;
        self.state.set_viewport(width, height);
        self.profiles[self.current.index()].init(&mut self.state);
    }

    /// Rebuild both profiles from new settings, keeping the camera placement
    pub fn apply_settings(&mut self, settings: &CameraSettings) {
        let rebuilt = CameraSwitch::new(self.state, settings);
        self.profiles = rebuilt.profiles;
        self.profiles[self.current.index()].init(&mut self.state);
    }

    fn active_mut(&mut self) -> (&mut dyn CameraProfile, &mut CameraState) {
        (self.profiles[self.current.index()].as_mut(), &mut self.state)
    }

    // ── Dispatch ─────────────────────────────────────────────

    pub fn on_timer_tick(&mut self, elapsed_ms: f32) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_timer_tick(state, elapsed_ms)
    }

    pub fn on_key_down(&mut self, key: Key) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_key_down(state, key)
    }

    pub fn on_key_up(&mut self, key: Key) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_key_up(state, key)
    }

    pub fn on_mouse_move(&mut self, x: f32, y: f32) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_mouse_move(state, x, y)
    }

    pub fn on_mouse_button(
        &mut self,
        button: MouseButton,
        button_state: ButtonState,
        x: f32,
        y: f32,
    ) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_mouse_button(state, button, button_state, x, y)
    }

    pub fn on_reshape(&mut self, width: u32, height: u32) -> InputResponse {
        let (profile, state) = self.active_mut();
        profile.on_reshape(state, width, height)
    }
}
