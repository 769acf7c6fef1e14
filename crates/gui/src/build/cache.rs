//! Per-model mesh cache

use std::collections::HashMap;
use std::path::Path;

use glam::Mat4;
use shared::{ModelId, World};

use super::transform::{flatten_world, PlacedModel};
use super::{build_model_mesh, DEFAULT_COLOR};
use crate::viewport::bounds::Aabb;
use crate::viewport::mesh::MeshData;

/// Local-space meshes of every visible model, rebuilt when the scene version changes
pub struct MeshCache {
    placed: Vec<PlacedModel>,
    meshes: HashMap<ModelId, MeshData>,
    bounds: HashMap<ModelId, Aabb>,
    errors: HashMap<ModelId, String>,
    version: u64,
    rebuild_count: u64,
}

impl Default for MeshCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MeshCache {
    pub fn new() -> Self {
        Self {
            placed: Vec::new(),
            meshes: HashMap::new(),
            bounds: HashMap::new(),
            errors: HashMap::new(),
            version: u64::MAX, // force first rebuild
            rebuild_count: 0,
        }
    }

    pub fn is_valid(&self, scene_version: u64) -> bool {
        self.version == scene_version
    }

    /// Rebuild every mesh. Per-model failures, including invalid transform
    /// chains, are recorded, not returned.
    pub fn rebuild(&mut self, world: &World, base_dir: Option<&Path>, version: u64) {
        self.placed = flatten_world(world);
        self.meshes.clear();
        self.bounds.clear();
        self.errors.clear();

        for placed in &self.placed {
            let model = &placed.model;
            if !model.visible {
                continue;
            }
            // Transform validity does not depend on time
            if let Err(e) = placed.matrix_at(0.0) {
                tracing::warn!(model = %model.id, "Invalid transform chain: {}", e);
                self.errors.insert(model.id.clone(), e.to_string());
                continue;
            }
            let color = model.color.unwrap_or(DEFAULT_COLOR);
            match build_model_mesh(&model.source, color, base_dir) {
                Ok(mesh) => {
                    self.bounds.insert(model.id.clone(), Aabb::from_mesh(&mesh));
                    self.meshes.insert(model.id.clone(), mesh);
                }
                Err(e) => {
                    tracing::warn!(model = %model.id, "Failed to build model: {}", e);
                    self.errors.insert(model.id.clone(), e.to_string());
                }
            }
        }

        self.version = version;
        self.rebuild_count += 1;
        tracing::debug!(
            version,
            meshes = self.meshes.len(),
            errors = self.errors.len(),
            "Mesh cache rebuilt"
        );
    }

    /// Rebuild only if `version` differs from the cached one. Returns true if rebuilt.
    pub fn ensure(&mut self, world: &World, base_dir: Option<&Path>, version: u64) -> bool {
        if self.is_valid(version) {
            return false;
        }
        self.rebuild(world, base_dir, version);
        true
    }

    pub fn placed(&self) -> &[PlacedModel] {
        &self.placed
    }

    pub fn mesh(&self, id: &str) -> Option<&MeshData> {
        self.meshes.get(id)
    }

    pub fn meshes(&self) -> &HashMap<ModelId, MeshData> {
        &self.meshes
    }

    pub fn errors(&self) -> &HashMap<ModelId, String> {
        &self.errors
    }

    pub fn rebuild_count(&self) -> u64 {
        self.rebuild_count
    }

    /// Visible meshes with their world matrix at `time_secs`.
    ///
    /// Models with an invalid transform chain have no mesh, so never appear.
    pub fn instances(&self, time_secs: f32) -> Vec<(&PlacedModel, &MeshData, Mat4)> {
        self.placed
            .iter()
            .filter_map(|placed| {
                let mesh = self.meshes.get(placed.id())?;
                let matrix = placed.matrix_at(time_secs).ok()?;
                Some((placed, mesh, matrix))
            })
            .collect()
    }

    /// World-space bounds of everything visible at `time_secs`
    pub fn world_bounds(&self, time_secs: f32) -> Aabb {
        self.instances(time_secs)
            .into_iter()
            .filter_map(|(placed, _, matrix)| {
                self.bounds
                    .get(placed.id())
                    .map(|aabb| aabb.transformed(&matrix))
            })
            .fold(Aabb::EMPTY, |acc, b| acc.union(&b))
    }
}
