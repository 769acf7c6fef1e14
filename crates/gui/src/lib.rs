// Library crate: everything testable without a window (geometry, camera
// profiles, scene, harness). The eframe app, panels and painter live in the
// binary crate.

pub mod build;
pub mod camera;
pub mod command;
pub mod geometry;
pub mod harness;
pub mod state;
pub mod validation;

/// Mesh and bounds types shared with the binary's viewport.
/// Projection and painting stay in the binary crate.
pub mod viewport {
    pub mod bounds;
    pub mod mesh;
}
