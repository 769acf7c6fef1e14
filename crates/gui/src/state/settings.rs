//! Application settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::build::MAX_TESSELLATION;
use crate::camera::CameraSettings;

const SETTINGS_FILE: &str = "settings.json";

/// Platform directories of the application
pub fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "cg-engine", "cg-engine")
}

/// Bezier generator defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// Segments per patch side for new Bezier models
    pub tessellation: u32,
    /// Normal used where a patch surface degenerates
    pub default_normal: [f32; 3],
    /// Colour of generated models
    pub color: [f32; 3],
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            tessellation: shared::DEFAULT_TESSELLATION,
            default_normal: [0.0, 1.0, 0.0],
            color: crate::build::DEFAULT_COLOR,
        }
    }
}

/// Grid display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridSettings {
    pub visible: bool,
    /// Cell size in world units
    pub size: f32,
    /// Number of grid lines in each direction from origin
    pub range: i32,
    /// Grid line opacity (0.0 - 1.0)
    pub opacity: f32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            visible: true,
            size: 1.0,
            range: 10,
            opacity: 0.6,
        }
    }
}

/// Axis display settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AxisSettings {
    pub visible: bool,
    pub length: f32,
    /// Line thickness in points
    pub thickness: f32,
    /// Show axis labels (X, Y, Z)
    pub show_labels: bool,
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            visible: true,
            length: 2.0,
            thickness: 2.0,
            show_labels: true,
        }
    }
}

/// Viewport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    /// Background color RGB
    pub background_color: [u8; 3],
    /// Draw back-facing triangles too
    pub show_back_faces: bool,
    /// Draw the loops of animated translations
    pub show_paths: bool,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            background_color: [30, 30, 35],
            show_back_faces: false,
            show_paths: true,
        }
    }
}

/// UI settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// Font size in points
    pub font_size: f32,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self { font_size: 14.0 }
    }
}

/// All application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub camera: CameraSettings,
    pub generator: GeneratorSettings,
    pub grid: GridSettings,
    pub axes: AxisSettings,
    pub viewport: ViewportSettings,
    pub ui: UiSettings,
}

impl AppSettings {
    /// Settings file under the platform config directory
    pub fn default_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(SETTINGS_FILE))
    }

    /// Load settings from the config directory, or return defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(settings) => {
                    tracing::info!(path = %path.display(), "Loaded settings");
                    settings
                }
                Err(e) => {
                    tracing::warn!("Ignoring settings file: {}", e);
                    Self::default()
                }
            },
            _ => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| format!("{}: {}", path.display(), e))?;
        let settings: AppSettings =
            serde_json::from_str(&json).map_err(|e| format!("{}: {}", path.display(), e))?;
        Ok(settings.sanitized())
    }

    /// Save settings to the config directory
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            return;
        };
        if let Err(e) = self.save_to(&path) {
            tracing::warn!("Failed to save settings: {}", e);
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| format!("{}: {}", dir.display(), e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, json).map_err(|e| format!("{}: {}", path.display(), e))
    }

    /// Copy with out-of-range values replaced
    pub fn sanitized(&self) -> Self {
        let mut clean = self.clone();
        clean.camera = self.camera.sanitized();
        if clean.generator.tessellation == 0 {
            clean.generator.tessellation = GeneratorSettings::default().tessellation;
        }
        clean.generator.tessellation = clean.generator.tessellation.min(MAX_TESSELLATION);
        if clean.grid.size <= 0.0 || !clean.grid.size.is_finite() {
            clean.grid.size = GridSettings::default().size;
        }
        clean.grid.range = clean.grid.range.clamp(1, 200);
        clean.ui.font_size = clean.ui.font_size.clamp(8.0, 32.0);
        clean
    }
}
