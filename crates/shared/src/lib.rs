//! Data model shared between the engine library, the viewer and scripts.
//!
//! Everything here is plain serde data: world descriptions, model sources and
//! raw Bezier patch tables. Geometry evaluation lives in the engine crate.

pub mod patch;

use serde::{Deserialize, Serialize};

pub use patch::{parse_patch_set, PatchParseError};

/// Unique identifier of a model in the world
pub type ModelId = String;

fn new_model_id() -> ModelId {
    uuid::Uuid::new_v4().to_string()
}

/// Segments per patch side when a Bezier model does not specify one
pub const DEFAULT_TESSELLATION: u32 = 10;

fn default_tessellation() -> u32 {
    DEFAULT_TESSELLATION
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Bezier patch data
// ============================================================================

/// Raw Bezier patch table: every patch lists 16 indices into `control_points`.
///
/// This is exactly what a `.patch` file holds; resolving the indices into
/// control patches is done by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PatchSet {
    pub patches: Vec<Vec<usize>>,
    pub control_points: Vec<[f32; 3]>,
}

impl PatchSet {
    pub fn patch_count(&self) -> usize {
        self.patches.len()
    }
}

// ============================================================================
// Model sources
// ============================================================================

/// Where a model's geometry comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ModelSource {
    /// Square plane on XZ, centred on the origin
    Plane { length: f32, divisions: u32 },
    /// Axis-aligned cube centred on the origin
    Box { length: f32, divisions: u32 },
    /// Cone standing on the XZ plane, apex up
    Cone {
        radius: f32,
        height: f32,
        slices: u32,
        stacks: u32,
    },
    Sphere { radius: f32, slices: u32, stacks: u32 },
    /// Bezier surface read from a `.patch` file
    BezierFile {
        path: String,
        #[serde(default = "default_tessellation")]
        tessellation: u32,
    },
    /// Bezier surface given inline
    BezierPatches {
        patch_set: PatchSet,
        #[serde(default = "default_tessellation")]
        tessellation: u32,
    },
}

impl ModelSource {
    /// Short label used by the scene tree and logs
    pub fn kind(&self) -> &'static str {
        match self {
            ModelSource::Plane { .. } => "plane",
            ModelSource::Box { .. } => "box",
            ModelSource::Cone { .. } => "cone",
            ModelSource::Sphere { .. } => "sphere",
            ModelSource::BezierFile { .. } | ModelSource::BezierPatches { .. } => "bezier",
        }
    }
}

/// A model placed inside a group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    #[serde(default = "new_model_id")]
    pub id: ModelId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source: ModelSource,
    /// RGB in 0..=1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<[f32; 3]>,
    #[serde(default = "default_true")]
    pub visible: bool,
}

impl ModelEntry {
    pub fn new(source: ModelSource) -> Self {
        Self {
            id: new_model_id(),
            name: None,
            source,
            color: None,
            visible: true,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{} ({})", self.source.kind(), self.id),
        }
    }
}

// ============================================================================
// Transforms and groups
// ============================================================================

/// One step of a group's transform chain, applied in declaration order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransformOp {
    Translate { x: f32, y: f32, z: f32 },
    /// Rotation by `angle` degrees around (x, y, z)
    Rotate { angle: f32, x: f32, y: f32, z: f32 },
    Scale { x: f32, y: f32, z: f32 },
    /// Closed Catmull-Rom loop through `points`, one lap every `time` seconds
    AnimatedTranslate {
        time: f32,
        #[serde(default)]
        align: bool,
        points: Vec<[f32; 3]>,
    },
    /// Full turn around (x, y, z) every `time` seconds
    AnimatedRotate { time: f32, x: f32, y: f32, z: f32 },
}

impl TransformOp {
    pub fn is_animated(&self) -> bool {
        matches!(
            self,
            TransformOp::AnimatedTranslate { .. } | TransformOp::AnimatedRotate { .. }
        )
    }
}

/// Group of models and nested groups sharing a transform chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Group {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transforms: Vec<TransformOp>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<ModelEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<Group>,
}

impl Group {
    /// Number of models in this group and all nested groups
    pub fn model_count(&self) -> usize {
        self.models.len() + self.groups.iter().map(Group::model_count).sum::<usize>()
    }
}

// ============================================================================
// Camera setup and world
// ============================================================================

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: 45.0,
            near: 1.0,
            far: 1000.0,
        }
    }
}

/// Initial camera placement declared by a world
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraSetup {
    pub position: [f32; 3],
    pub look_at: [f32; 3],
    pub up: [f32; 3],
    #[serde(default)]
    pub projection: Projection,
}

impl Default for CameraSetup {
    fn default() -> Self {
        Self {
            position: [5.0, 5.0, 5.0],
            look_at: [0.0, 0.0, 0.0],
            up: [0.0, 1.0, 0.0],
            projection: Projection::default(),
        }
    }
}

/// Complete world description: a camera and a forest of groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct World {
    #[serde(default)]
    pub camera: CameraSetup,
    #[serde(default)]
    pub groups: Vec<Group>,
}

impl World {
    pub fn model_count(&self) -> usize {
        self.groups.iter().map(Group::model_count).sum()
    }

    /// Find a model anywhere in the world
    pub fn find_model(&self, id: &str) -> Option<&ModelEntry> {
        fn find<'a>(groups: &'a [Group], id: &str) -> Option<&'a ModelEntry> {
            for group in groups {
                if let Some(model) = group.models.iter().find(|m| m.id == id) {
                    return Some(model);
                }
                if let Some(model) = find(&group.groups, id) {
                    return Some(model);
                }
            }
            None
        }
        find(&self.groups, id)
    }

    /// Find a model anywhere in the world (mutable)
    pub fn find_model_mut(&mut self, id: &str) -> Option<&mut ModelEntry> {
        fn find<'a>(groups: &'a mut [Group], id: &str) -> Option<&'a mut ModelEntry> {
            for group in groups {
                if let Some(model) = group.models.iter_mut().find(|m| m.id == id) {
                    return Some(model);
                }
                if let Some(model) = find(&mut group.groups, id) {
                    return Some(model);
                }
            }
            None
        }
        find(&mut self.groups, id)
    }

    /// Remove a model anywhere in the world. Returns true if it existed.
    pub fn remove_model(&mut self, id: &str) -> bool {
        fn remove(groups: &mut [Group], id: &str) -> bool {
            for group in groups {
                if let Some(pos) = group.models.iter().position(|m| m.id == id) {
                    group.models.remove(pos);
                    return true;
                }
                if remove(&mut group.groups, id) {
                    return true;
                }
            }
            false
        }
        remove(&mut self.groups, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_source_tagged_json() {
        let src = ModelSource::Sphere {
            radius: 1.0,
            slices: 10,
            stacks: 10,
        };
        let json = serde_json::to_string(&src).unwrap();
        assert!(json.contains(r#""type":"sphere""#));
        let back: ModelSource = serde_json::from_str(&json).unwrap();
        assert_eq!(back, src);
    }

    #[test]
    fn test_bezier_file_default_tessellation() {
        let src: ModelSource =
            serde_json::from_str(r#"{"type": "bezier_file", "path": "teapot.patch"}"#).unwrap();
        assert_eq!(
            src,
            ModelSource::BezierFile {
                path: "teapot.patch".into(),
                tessellation: 10
            }
        );
    }

    #[test]
    fn test_model_entry_gets_unique_id() {
        let json = r#"{"source": {"type": "plane", "length": 2.0, "divisions": 2}}"#;
        let a: ModelEntry = serde_json::from_str(json).unwrap();
        let b: ModelEntry = serde_json::from_str(json).unwrap();
        assert_ne!(a.id, b.id);
        assert!(a.visible);
    }

    #[test]
    fn test_transform_op_json() {
        let op: TransformOp = serde_json::from_str(
            r#"{"type": "animated_translate", "time": 10, "points": [[0,0,0],[1,0,0],[1,0,1],[0,0,1]]}"#,
        )
        .unwrap();
        assert!(op.is_animated());
        match op {
            TransformOp::AnimatedTranslate { align, points, .. } => {
                assert!(!align);
                assert_eq!(points.len(), 4);
            }
            _ => panic!("Expected AnimatedTranslate"),
        }
    }

    #[test]
    fn test_world_defaults() {
        let world: World = serde_json::from_str("{}").unwrap();
        assert_eq!(world.camera, CameraSetup::default());
        assert_eq!(world.model_count(), 0);
    }

    fn nested_world() -> World {
        World {
            camera: CameraSetup::default(),
            groups: vec![Group {
                transforms: vec![],
                models: vec![ModelEntry {
                    id: "outer".into(),
                    name: None,
                    source: ModelSource::Plane {
                        length: 1.0,
                        divisions: 1,
                    },
                    color: None,
                    visible: true,
                }],
                groups: vec![Group {
                    transforms: vec![TransformOp::Translate {
                        x: 1.0,
                        y: 0.0,
                        z: 0.0,
                    }],
                    models: vec![ModelEntry {
                        id: "inner".into(),
                        name: Some("Inner".into()),
                        source: ModelSource::Box {
                            length: 1.0,
                            divisions: 1,
                        },
                        color: None,
                        visible: true,
                    }],
                    groups: vec![],
                }],
            }],
        }
    }

    #[test]
    fn test_world_find_and_remove_nested() {
        let mut world = nested_world();
        assert_eq!(world.model_count(), 2);
        assert_eq!(
            world.find_model("inner").map(|m| m.display_name()),
            Some("Inner".to_string())
        );

        world.find_model_mut("outer").unwrap().visible = false;
        assert!(!world.find_model("outer").unwrap().visible);

        assert!(world.remove_model("inner"));
        assert!(!world.remove_model("inner"));
        assert_eq!(world.model_count(), 1);
    }
}
