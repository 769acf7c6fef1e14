//! Scene state management
//!
//! `SceneState` owns the loaded world and a version counter that the mesh
//! cache uses for invalidation.

mod display;
mod persistence;

pub use display::{
    model_display_name, model_kind_label, short_id, source_summary, transform_summary,
};
pub use persistence::{load_world, save_world};

use std::path::{Path, PathBuf};

use shared::{Group, ModelEntry, ModelId, ModelSource, TransformOp, World};

/// Failure to read or write a world file
#[derive(Debug)]
pub enum SceneError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl std::fmt::Display for SceneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SceneError::Io { path, source } => write!(f, "{}: {}", path.display(), source),
            SceneError::Json { path, source } => {
                write!(f, "{}: invalid world file: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for SceneError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SceneError::Io { source, .. } => Some(source),
            SceneError::Json { source, .. } => Some(source),
        }
    }
}

/// The current world plus where it came from
#[derive(Default)]
pub struct SceneState {
    pub world: World,
    /// World file the scene was loaded from
    source_path: Option<PathBuf>,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl SceneState {
    pub fn new(world: World) -> Self {
        Self {
            world,
            source_path: None,
            version: 0,
        }
    }

    /// Current scene version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn notify_mutated(&mut self) {
        self.version += 1;
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// Directory relative patch paths resolve against
    pub fn base_dir(&self) -> Option<&Path> {
        self.source_path.as_deref().and_then(Path::parent)
    }

    /// Replace the whole world
    pub fn replace_world(&mut self, world: World, source_path: Option<PathBuf>) {
        self.world = world;
        self.source_path = source_path;
        self.notify_mutated();
    }

    /// Remove every model and group, keeping the camera setup
    pub fn clear(&mut self) {
        self.world.groups.clear();
        self.notify_mutated();
    }

    pub fn model_count(&self) -> usize {
        self.world.model_count()
    }

    pub fn get_model(&self, id: &str) -> Option<&ModelEntry> {
        self.world.find_model(id)
    }

    /// Add a model in a new top-level group with the given transforms
    pub fn add_model(&mut self, model: ModelEntry, transforms: Vec<TransformOp>) -> ModelId {
        let id = model.id.clone();
        self.world.groups.push(Group {
            transforms,
            models: vec![model],
            groups: Vec::new(),
        });
        self.notify_mutated();
        id
    }

    /// Add a Bezier model read from a `.patch` file
    pub fn add_patch_file(&mut self, path: &Path, tessellation: u32) -> ModelId {
        let mut model = ModelEntry::new(ModelSource::BezierFile {
            path: path.to_string_lossy().into_owned(),
            tessellation,
        });
        model.name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned());
        self.add_model(model, Vec::new())
    }

    pub fn remove_model(&mut self, id: &str) -> bool {
        let removed = self.world.remove_model(id);
        if removed {
            self.notify_mutated();
        }
        removed
    }

    /// Show or hide a model. Returns false if it does not exist.
    pub fn set_visible(&mut self, id: &str, visible: bool) -> bool {
        let Some(model) = self.world.find_model_mut(id) else {
            return false;
        };
        if model.visible != visible {
            model.visible = visible;
            self.notify_mutated();
        }
        true
    }

    /// Change the tessellation of every Bezier model
    pub fn set_tessellation(&mut self, tessellation: u32) {
        fn visit(groups: &mut [Group], tessellation: u32) -> bool {
            let mut changed = false;
            for group in groups {
                for model in &mut group.models {
                    match &mut model.source {
                        ModelSource::BezierFile { tessellation: t, .. }
                        | ModelSource::BezierPatches { tessellation: t, .. }
                            if *t != tessellation =>
                        {
                            *t = tessellation;
                            changed = true;
                        }
                        _ => {}
                    }
                }
                changed |= visit(&mut group.groups, tessellation);
            }
            changed
        }
        if visit(&mut self.world.groups, tessellation) {
            self.notify_mutated();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> ModelEntry {
        ModelEntry::new(ModelSource::Sphere {
            radius: 1.0,
            slices: 8,
            stacks: 8,
        })
    }

    #[test]
    fn test_add_and_remove_bump_version() {
        let mut scene = SceneState::default();
        let v0 = scene.version();
        let id = scene.add_model(sphere(), vec![]);
        assert!(scene.version() > v0);
        assert_eq!(scene.model_count(), 1);

        let v1 = scene.version();
        assert!(scene.remove_model(&id));
        assert!(scene.version() > v1);
        let v2 = scene.version();
        assert!(!scene.remove_model(&id));
        assert_eq!(scene.version(), v2);
    }

    #[test]
    fn test_set_visible_only_bumps_on_change() {
        let mut scene = SceneState::default();
        let id = scene.add_model(sphere(), vec![]);
        let v = scene.version();
        assert!(scene.set_visible(&id, true));
        assert_eq!(scene.version(), v);
        assert!(scene.set_visible(&id, false));
        assert_eq!(scene.version(), v + 1);
        assert!(!scene.set_visible("missing", false));
    }

    #[test]
    fn test_patch_file_model_named_after_file() {
        let mut scene = SceneState::default();
        let id = scene.add_patch_file(Path::new("/models/teapot.patch"), 8);
        let model = scene.get_model(&id).unwrap();
        assert_eq!(model.name.as_deref(), Some("teapot"));
        assert!(matches!(
            model.source,
            ModelSource::BezierFile { tessellation: 8, .. }
        ));
    }

    #[test]
    fn test_set_tessellation_updates_bezier_models() {
        let mut scene = SceneState::default();
        let id = scene.add_patch_file(Path::new("a.patch"), 4);
        scene.add_model(sphere(), vec![]);
        let v = scene.version();
        scene.set_tessellation(12);
        assert_eq!(scene.version(), v + 1);
        assert!(matches!(
            scene.get_model(&id).unwrap().source,
            ModelSource::BezierFile { tessellation: 12, .. }
        ));
        scene.set_tessellation(12);
        assert_eq!(scene.version(), v + 1);
    }

    #[test]
    fn test_base_dir_from_source_path() {
        let mut scene = SceneState::default();
        assert!(scene.base_dir().is_none());
        scene.replace_world(World::default(), Some(PathBuf::from("/worlds/solar.json")));
        assert_eq!(scene.base_dir(), Some(Path::new("/worlds")));
    }
}
