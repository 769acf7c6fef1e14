//! World files and autosave

use std::path::{Path, PathBuf};

use shared::World;

use super::{SceneError, SceneState};

/// Read a world description from JSON
pub fn load_world(path: &Path) -> Result<World, SceneError> {
    let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| SceneError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_world(world: &World, path: &Path) -> Result<(), SceneError> {
    let io_err = |source| SceneError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let json = serde_json::to_string_pretty(world).map_err(|source| SceneError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(io_err)
}

impl SceneState {
    /// Load a world file, replacing the current scene
    pub fn open(&mut self, path: &Path) -> Result<(), SceneError> {
        let world = load_world(path)?;
        tracing::info!(
            path = %path.display(),
            models = world.model_count(),
            "Opened world"
        );
        self.replace_world(world, Some(path.to_path_buf()));
        Ok(())
    }

    /// Write the world back to `path` and remember it as the source
    pub fn save_as(&mut self, path: &Path) -> Result<(), SceneError> {
        save_world(&self.world, path)?;
        self.source_path = Some(path.to_path_buf());
        Ok(())
    }

    fn autosave_path() -> Option<PathBuf> {
        crate::state::settings::project_dirs().map(|dirs| dirs.data_dir().join("autosave.json"))
    }

    /// Save the world to the autosave file
    pub fn autosave(&self) {
        let Some(path) = Self::autosave_path() else {
            return;
        };
        if let Err(e) = save_world(&self.world, &path) {
            tracing::warn!("Autosave failed: {}", e);
        }
    }

    /// World from the autosave file, if there is a readable one
    pub fn load_autosave() -> Option<World> {
        let path = Self::autosave_path()?;
        if !path.exists() {
            return None;
        }
        match load_world(&path) {
            Ok(world) => Some(world),
            Err(e) => {
                tracing::warn!("Ignoring autosave: {}", e);
                None
            }
        }
    }
}
