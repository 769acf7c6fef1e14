//! Main application module

mod input;
mod menus;
mod styles;

use std::path::PathBuf;

use eframe::egui;

use crate::camera::{CameraState, CameraSwitch, ProfileId};
use crate::state::scene::SceneState;
use crate::state::AppState;
use crate::ui::{generator_panel, scene_tree, status_bar};
use crate::viewport::ViewportPanel;

/// Command line overrides
#[derive(Debug, Default)]
pub struct StartupOptions {
    pub world: Option<PathBuf>,
    pub patches: Vec<PathBuf>,
    pub profile: Option<ProfileId>,
}

/// Main application
pub struct CgApp {
    state: AppState,
    camera: CameraSwitch,
    viewport: ViewportPanel,
    /// Animation clock in seconds
    time_secs: f32,
    paused: bool,
    /// Pointer capture has been applied for the current profile
    cursor_synced: bool,
    last_font_size: f32,
    /// Last autosaved scene version
    last_saved_version: u64,
}

impl CgApp {
    pub fn new(cc: &eframe::CreationContext<'_>, options: StartupOptions) -> Self {
        let mut state = AppState::default();
        if let Some(profile) = options.profile {
            state.settings.camera.default_profile = profile;
        }

        // CLI world takes priority, then autosave
        match &options.world {
            Some(path) => {
                if let Err(e) = state.scene.open(path) {
                    tracing::error!("{}", e);
                    state.set_status(e.to_string());
                }
            }
            None => {
                if let Some(world) = SceneState::load_autosave() {
                    state.scene.replace_world(world, None);
                    tracing::info!("Loaded autosave world");
                }
            }
        }
        for path in &options.patches {
            let tessellation = state.settings.generator.tessellation;
            state.scene.add_patch_file(path, tessellation);
            tracing::info!(path = %path.display(), "Added patch file");
        }

        styles::configure_styles(&cc.egui_ctx, state.settings.ui.font_size);

        let camera = CameraSwitch::new(
            CameraState::from_setup(&state.scene.world.camera),
            &state.settings.camera,
        );

        let last_font_size = state.settings.ui.font_size;
        let last_saved_version = state.scene.version();

        Self {
            state,
            camera,
            viewport: ViewportPanel::new(),
            time_secs: 0.0,
            paused: false,
            cursor_synced: false,
            last_font_size,
            last_saved_version,
        }
    }

    /// Put the camera back where the world declares it
    fn reset_camera(&mut self) {
        self.camera
            .reset_state(CameraState::from_setup(&self.state.scene.world.camera));
    }

    /// Show or capture the pointer when the active profile changed
    fn sync_cursor(&mut self, ctx: &egui::Context) {
        if self.cursor_synced && !self.camera.profile_has_changed() {
            return;
        }
        let grab = self.camera.active().grabs_pointer();
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorVisible(!grab));
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorGrab(if grab {
            egui::CursorGrab::Confined
        } else {
            egui::CursorGrab::None
        }));
        self.camera.acknowledge_profile_change();
        self.cursor_synced = true;
    }
}

impl eframe::App for CgApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.state.settings.ui.font_size != self.last_font_size {
            styles::apply_font_size(ctx, self.state.settings.ui.font_size);
            self.last_font_size = self.state.settings.ui.font_size;
        }

        // Autosave world if changed
        let current_version = self.state.scene.version();
        if current_version != self.last_saved_version {
            self.state.scene.autosave();
            self.last_saved_version = current_version;
        }

        let dt_ms = ctx.input(|i| i.stable_dt) * 1000.0;
        if !self.paused {
            self.time_secs += dt_ms / 1000.0;
        }

        // ── Menu bar ──────────────────────────────────────────
        let mut action = menus::MenuAction::None;
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                action = action.or(menus::file_menu(ui, &mut self.state));
                action = action.or(menus::view_menu(
                    ui,
                    &mut self.state,
                    &mut self.camera,
                    &mut self.paused,
                ));
                menus::settings_menu(ui, &mut self.state);
            });
        });
        match action {
            menus::MenuAction::None => {}
            menus::MenuAction::ResetCamera | menus::MenuAction::WorldLoaded => {
                self.reset_camera();
                self.time_secs = 0.0;
            }
            menus::MenuAction::Quit => ctx.send_viewport_cmd(egui::ViewportCommand::Close),
        }

        let tessellation = self.state.settings.generator.tessellation;
        if menus::settings_window(ctx, &mut self.state) {
            self.camera.apply_settings(&self.state.settings.camera);
            let new_tessellation = self.state.settings.generator.tessellation;
            if new_tessellation != tessellation {
                self.state.scene.set_tessellation(new_tessellation);
            }
        }

        // ── Status bar ───────────────────────────────────────
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(22.0)
            .frame(
                egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::symmetric(8, 2)),
            )
            .show(ctx, |ui| {
                status_bar::show(
                    ui,
                    &self.state,
                    &self.camera,
                    self.viewport.cache(),
                    self.time_secs,
                );
            });

        // ── Left panel: scene tree ───────────────────────────
        if self.state.panels.scene_tree {
            egui::SidePanel::left("scene_tree")
                .default_width(230.0)
                .width_range(160.0..=400.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    scene_tree::show(ui, &mut self.state, self.viewport.cache());
                });
        }

        // ── Right panel: generator ───────────────────────────
        if self.state.panels.generator {
            egui::SidePanel::right("generator")
                .default_width(260.0)
                .width_range(200.0..=420.0)
                .resizable(true)
                .frame(
                    egui::Frame::side_top_panel(&ctx.style()).inner_margin(egui::Margin::same(6)),
                )
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        generator_panel::show(ui, &mut self.state);
                        if self.state.panels.camera_info {
                            ui.separator();
                            generator_panel::camera_info(ui, &self.camera);
                        }
                    });
                });
        }

        // ── Central panel: 3D viewport ───────────────────────
        let mut redisplay = false;
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (response, reshape) = self.viewport.allocate(ui, &mut self.camera);
                let input = input::dispatch(ctx, &response, &mut self.camera, dt_ms);
                redisplay = reshape.merge(input).redisplay;
                self.viewport
                    .paint(ui, &response, &mut self.state, &self.camera, self.time_secs);
            });

        self.sync_cursor(ctx);

        let animated = !self.paused
            && self
                .viewport
                .cache()
                .placed()
                .iter()
                .any(|p| p.is_animated());
        if redisplay || animated || self.camera.current_profile() == ProfileId::Fps {
            ctx.request_repaint();
        }
    }
}
