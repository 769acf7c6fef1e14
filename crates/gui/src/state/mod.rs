pub mod scene;
pub mod settings;

pub use scene::{model_display_name, short_id, SceneError, SceneState};
pub use settings::AppSettings;

use shared::ModelSource;

/// Panel visibility flags
pub struct PanelVisibility {
    pub scene_tree: bool,
    pub generator: bool,
    pub camera_info: bool,
}

impl Default for PanelVisibility {
    fn default() -> Self {
        Self {
            scene_tree: true,
            generator: true,
            camera_info: false,
        }
    }
}

/// Model kinds offered by the generator panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Plane,
    Box,
    Cone,
    Sphere,
    BezierFile,
}

impl GeneratorKind {
    pub const ALL: [GeneratorKind; 5] = [
        GeneratorKind::Plane,
        GeneratorKind::Box,
        GeneratorKind::Cone,
        GeneratorKind::Sphere,
        GeneratorKind::BezierFile,
    ];

    pub fn label(self) -> &'static str {
        match self {
            GeneratorKind::Plane => "Plane",
            GeneratorKind::Box => "Box",
            GeneratorKind::Cone => "Cone",
            GeneratorKind::Sphere => "Sphere",
            GeneratorKind::BezierFile => "Bezier patch file",
        }
    }
}

/// Inputs of the generator panel
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorForm {
    pub kind: GeneratorKind,
    pub length: f32,
    pub divisions: u32,
    pub radius: f32,
    pub height: f32,
    pub slices: u32,
    pub stacks: u32,
    /// `.patch` file to read
    pub patch_path: String,
    pub tessellation: u32,
}

impl GeneratorForm {
    pub fn new(settings: &AppSettings) -> Self {
        Self {
            kind: GeneratorKind::Sphere,
            length: 2.0,
            divisions: 4,
            radius: 1.0,
            height: 2.0,
            slices: 16,
            stacks: 16,
            patch_path: String::new(),
            tessellation: settings.generator.tessellation,
        }
    }

    /// Model source described by the form, or a reason it is incomplete
    pub fn to_source(&self) -> Result<ModelSource, String> {
        let source = match self.kind {
            GeneratorKind::Plane => ModelSource::Plane {
                length: self.length,
                divisions: self.divisions,
            },
            GeneratorKind::Box => ModelSource::Box {
                length: self.length,
                divisions: self.divisions,
            },
            GeneratorKind::Cone => ModelSource::Cone {
                radius: self.radius,
                height: self.height,
                slices: self.slices,
                stacks: self.stacks,
            },
            GeneratorKind::Sphere => ModelSource::Sphere {
                radius: self.radius,
                slices: self.slices,
                stacks: self.stacks,
            },
            GeneratorKind::BezierFile => {
                let path = self.patch_path.trim();
                if path.is_empty() {
                    return Err("No patch file selected".into());
                }
                ModelSource::BezierFile {
                    path: path.to_string(),
                    tessellation: self.tessellation,
                }
            }
        };
        Ok(source)
    }
}

/// Combined application state
pub struct AppState {
    pub scene: SceneState,
    pub panels: PanelVisibility,
    pub settings: AppSettings,
    pub generator: GeneratorForm,
    /// Show settings window
    pub show_settings_window: bool,
    /// Last message for the status bar
    pub status: Option<String>,
}

impl AppState {
    pub fn new(settings: AppSettings) -> Self {
        Self {
            scene: SceneState::default(),
            panels: PanelVisibility::default(),
            generator: GeneratorForm::new(&settings),
            settings,
            show_settings_window: false,
            status: None,
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(AppSettings::load())
    }
}
