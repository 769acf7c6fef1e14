//! Application menu bar and settings window

use eframe::egui;

use crate::camera::{CameraSwitch, KeyBindings, Motion, ProfileId};
use crate::state::settings::AppSettings;
use crate::state::AppState;

/// Something the app must do after the menus ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    None,
    /// A new world replaced the scene
    WorldLoaded,
    ResetCamera,
    Quit,
}

impl MenuAction {
    /// First action that is not `None`
    pub fn or(self, other: MenuAction) -> MenuAction {
        if self == MenuAction::None {
            other
        } else {
            self
        }
    }
}

/// Show the file menu
pub fn file_menu(ui: &mut egui::Ui, state: &mut AppState) -> MenuAction {
    let mut action = MenuAction::None;
    ui.menu_button("File", |ui| {
        if ui.button("New").clicked() {
            state.scene.replace_world(shared::World::default(), None);
            action = MenuAction::WorldLoaded;
            ui.close_menu();
        }
        if ui.button("Open world…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Open world")
                .add_filter("World", &["json"])
                .pick_file()
            {
                match state.scene.open(&path) {
                    Ok(()) => {
                        state.set_status(format!("Opened {}", path.display()));
                        action = MenuAction::WorldLoaded;
                    }
                    Err(e) => {
                        tracing::error!("{}", e);
                        state.set_status(e.to_string());
                    }
                }
            }
        }
        if ui.button("Add patch file…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Add Bezier patch file")
                .add_filter("Patch", &["patch"])
                .pick_file()
            {
                let tessellation = state.settings.generator.tessellation;
                state.scene.add_patch_file(&path, tessellation);
                tracing::info!(path = %path.display(), "Added patch file");
            }
        }
        if ui.button("Save world as…").clicked() {
            ui.close_menu();
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Save world")
                .add_filter("World", &["json"])
                .set_file_name("world.json")
                .save_file()
            {
                match state.scene.save_as(&path) {
                    Ok(()) => {
                        tracing::info!("Saved world to {}", path.display());
                        state.set_status(format!("Saved {}", path.display()));
                    }
                    Err(e) => {
                        tracing::error!("{}", e);
                        state.set_status(e.to_string());
                    }
                }
            }
        }
        ui.separator();
        if ui.button("Quit").clicked() {
            action = MenuAction::Quit;
            ui.close_menu();
        }
    });
    action
}

/// Show the view menu
pub fn view_menu(
    ui: &mut egui::Ui,
    state: &mut AppState,
    camera: &mut CameraSwitch,
    paused: &mut bool,
) -> MenuAction {
    let mut action = MenuAction::None;
    ui.menu_button("View", |ui| {
        ui.label("Camera");
        let current = camera.current_profile();
        for id in ProfileId::ALL {
            if ui.radio(current == id, id.label()).clicked() {
                camera.change_profile(id);
                ui.close_menu();
            }
        }
        if ui.button("Reset camera").clicked() {
            action = MenuAction::ResetCamera;
            ui.close_menu();
        }
        ui.separator();
        ui.checkbox(&mut state.settings.grid.visible, "Grid");
        ui.checkbox(&mut state.settings.axes.visible, "Axes");
        ui.checkbox(&mut state.settings.viewport.show_paths, "Animation paths");
        ui.checkbox(&mut state.settings.viewport.show_back_faces, "Back faces");
        ui.checkbox(paused, "Pause animation");
        ui.separator();
        ui.checkbox(&mut state.panels.scene_tree, "Scene tree");
        ui.checkbox(&mut state.panels.generator, "Generator");
        ui.checkbox(&mut state.panels.camera_info, "Camera info");
    });
    action
}

/// Show the settings menu
pub fn settings_menu(ui: &mut egui::Ui, state: &mut AppState) {
    ui.menu_button("Settings", |ui| {
        if ui.button("Preferences…").clicked() {
            state.show_settings_window = true;
            ui.close_menu();
        }
    });
}

/// Show the settings window. Returns true when settings were applied.
pub fn settings_window(ctx: &egui::Context, state: &mut AppState) -> bool {
    let mut open = state.show_settings_window;
    let mut applied = false;
    egui::Window::new("Settings")
        .open(&mut open)
        .resizable(true)
        .default_width(400.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                show_camera_settings(ui, &mut state.settings);
                show_bindings(ui, &mut state.settings);
                show_generator_settings(ui, &mut state.settings);
                show_grid_settings(ui, &mut state.settings);
                show_axes_settings(ui, &mut state.settings);
                show_viewport_settings(ui, &mut state.settings);
                show_ui_settings(ui, &mut state.settings);
                applied = show_settings_buttons(ui, state);
            });
        });
    state.show_settings_window = open && state.show_settings_window;
    applied
}

fn show_camera_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    let camera = &mut settings.camera;
    ui.heading("Camera");
    ui.horizontal(|ui| {
        ui.label("Startup profile");
        egui::ComboBox::from_id_salt("startup_profile")
            .selected_text(camera.default_profile.label())
            .show_ui(ui, |ui| {
                for id in ProfileId::ALL {
                    ui.selectable_value(&mut camera.default_profile, id, id.label());
                }
            });
    });

    ui.label("First person");
    ui.horizontal(|ui| {
        ui.label("Speed");
        ui.add(
            egui::DragValue::new(&mut camera.fps.speed)
                .speed(0.001)
                .range(0.001..=1.0)
                .suffix(" /ms"),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Mouse sensitivity");
        ui.add(
            egui::DragValue::new(&mut camera.fps.sensitivity)
                .speed(0.01)
                .range(0.01..=5.0)
                .suffix("°/px"),
        );
    });
    ui.checkbox(&mut camera.fps.warp_pointer, "Capture pointer");

    ui.label("Explorer");
    ui.horizontal(|ui| {
        ui.label("Drag sensitivity");
        ui.add(
            egui::DragValue::new(&mut camera.explorer.sensitivity)
                .speed(0.01)
                .range(0.01..=5.0)
                .suffix("°/px"),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Zoom step");
        ui.add(
            egui::DragValue::new(&mut camera.explorer.zoom_step)
                .speed(0.05)
                .range(0.01..=50.0),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Radius");
        ui.add(
            egui::DragValue::new(&mut camera.explorer.min_radius)
                .speed(0.1)
                .range(0.01..=1000.0),
        );
        ui.label("to");
        ui.add(
            egui::DragValue::new(&mut camera.explorer.max_radius)
                .speed(1.0)
                .range(0.01..=10000.0),
        );
    });
    ui.add_space(10.0);
}

fn show_bindings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    let bindings = &mut settings.camera.fps.bindings;
    ui.heading("Movement keys");
    egui::Grid::new("bindings_grid").num_columns(2).show(ui, |ui| {
        for motion in Motion::ALL {
            ui.label(motion.label());
            let mut key = bindings.get(&motion).cloned().unwrap_or_default();
            if ui
                .add(egui::TextEdit::singleline(&mut key).desired_width(80.0))
                .changed()
            {
                if key.trim().is_empty() {
                    bindings.remove(&motion);
                } else {
                    bindings.insert(motion, key.trim().to_string());
                }
            }
            ui.end_row();
        }
    });
    if let Err(e) = KeyBindings::from_table(bindings) {
        ui.colored_label(egui::Color32::from_rgb(230, 120, 60), e.to_string());
    }
    ui.add_space(10.0);
}

fn show_generator_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Generator");
    ui.horizontal(|ui| {
        ui.label("Tessellation");
        ui.add(
            egui::DragValue::new(&mut settings.generator.tessellation)
                .speed(1)
                .range(1..=64),
        );
    });
    ui.horizontal(|ui| {
        ui.label("Model colour");
        ui.color_edit_button_rgb(&mut settings.generator.color);
    });
    ui.add_space(10.0);
}

fn show_grid_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Grid");
    ui.checkbox(&mut settings.grid.visible, "Visible");

    ui.horizontal(|ui| {
        ui.label("Cell size");
        ui.add(
            egui::DragValue::new(&mut settings.grid.size)
                .speed(0.1)
                .range(0.1..=100.0),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Range");
        ui.add(
            egui::DragValue::new(&mut settings.grid.range)
                .speed(1)
                .range(1..=200),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Opacity");
        ui.add(egui::Slider::new(&mut settings.grid.opacity, 0.0..=1.0));
    });
    ui.add_space(10.0);
}

fn show_axes_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Axes");
    ui.checkbox(&mut settings.axes.visible, "Visible");
    ui.checkbox(&mut settings.axes.show_labels, "Labels");

    ui.horizontal(|ui| {
        ui.label("Length");
        ui.add(
            egui::DragValue::new(&mut settings.axes.length)
                .speed(0.1)
                .range(0.1..=100.0),
        );
    });

    ui.horizontal(|ui| {
        ui.label("Thickness");
        ui.add(
            egui::DragValue::new(&mut settings.axes.thickness)
                .speed(0.1)
                .range(0.5..=5.0),
        );
    });
    ui.add_space(10.0);
}

fn show_viewport_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Viewport");
    ui.horizontal(|ui| {
        ui.label("Background");
        let [r, g, b] = settings.viewport.background_color;
        let mut color = egui::Color32::from_rgb(r, g, b);
        if ui.color_edit_button_srgba(&mut color).changed() {
            settings.viewport.background_color = [color.r(), color.g(), color.b()];
        }
    });
    ui.checkbox(&mut settings.viewport.show_back_faces, "Draw back faces");
    ui.checkbox(&mut settings.viewport.show_paths, "Draw animation paths");
    ui.add_space(10.0);
}

fn show_ui_settings(ui: &mut egui::Ui, settings: &mut AppSettings) {
    ui.heading("Interface");
    ui.horizontal(|ui| {
        ui.label("Font size");
        ui.add(
            egui::DragValue::new(&mut settings.ui.font_size)
                .speed(0.5)
                .range(8.0..=24.0)
                .suffix(" pt"),
        );
    });
    ui.add_space(10.0);
}

fn show_settings_buttons(ui: &mut egui::Ui, state: &mut AppState) -> bool {
    let mut applied = false;
    ui.separator();
    ui.horizontal(|ui| {
        if ui.button("Apply").clicked() {
            state.settings = state.settings.sanitized();
            state.settings.save();
            applied = true;
        }
        if ui.button("Reset").clicked() {
            state.settings = AppSettings::default();
            applied = true;
        }
        if ui.button("Close").clicked() {
            state.show_settings_window = false;
        }
    });
    applied
}
