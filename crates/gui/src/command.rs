//! JSON command protocol for scripted sessions.
//!
//! Each command is a JSON object tagged by `command`. Scripts are one command
//! per line; blank lines and lines starting with `#` are skipped.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use shared::{ModelEntry, ModelSource, PatchSet, TransformOp, World};

use crate::build::BezierModel;
use crate::camera::{ButtonState, InputResponse, Key, MouseButton, ProfileId};
use crate::harness::TestHarness;

fn one() -> u32 {
    1
}

fn default_tessellation() -> u32 {
    shared::DEFAULT_TESSELLATION
}

/// A command understood by the harness
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ScriptCommand {
    /// Switch camera profile by name or registry index
    ChangeProfile {
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        index: Option<usize>,
    },
    /// Clear the profile-changed flag
    AcknowledgeProfileChange,
    KeyDown {
        key: Key,
    },
    KeyUp {
        key: Key,
    },
    MouseMove {
        x: f32,
        y: f32,
    },
    MouseButton {
        button: MouseButton,
        state: ButtonState,
        x: f32,
        y: f32,
    },
    Reshape {
        width: u32,
        height: u32,
    },
    /// Advance time by `ms`, `count` times
    Tick {
        ms: f32,
        #[serde(default = "one")]
        count: u32,
    },
    /// Run the Bezier generator on exactly one of: inline patches, an indexed
    /// patch table, or a `.patch` file
    GenerateBezier {
        #[serde(default)]
        patches: Option<Vec<Vec<[f32; 3]>>>,
        #[serde(default)]
        patch_set: Option<PatchSet>,
        #[serde(default)]
        path: Option<String>,
        #[serde(default = "default_tessellation")]
        tessellation: u32,
        /// Also place the result in the scene
        #[serde(default)]
        add_to_scene: bool,
    },
    AddModel {
        source: ModelSource,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        transforms: Vec<TransformOp>,
    },
    RemoveModel {
        id: String,
    },
    SetVisible {
        id: String,
        visible: bool,
    },
    LoadWorld {
        world: World,
    },
    /// Remove every model
    Clear,
    InspectCamera,
    InspectScene,
}

/// Response from executing a command.
#[derive(Debug, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl CommandResponse {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
            data: None,
        }
    }

    fn ok_with_data(data: serde_json::Value) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(msg.into()),
            data: None,
        }
    }
}

fn input_data(response: InputResponse) -> serde_json::Value {
    serde_json::json!({
        "redisplay": response.redisplay,
        "warp_pointer": response.warp_pointer,
    })
}

fn model_summary(model: &BezierModel) -> serde_json::Value {
    serde_json::json!({
        "patch_count": model.patch_count(),
        "resolution": model.resolution,
        "vertex_count": model.vertex_count(),
        "first_vertex": model.vertices.first().map(|v| v.to_array()),
        "last_vertex": model.vertices.last().map(|v| v.to_array()),
        "last_tex_coord": model.tex_coords.last(),
    })
}

/// Execute a single command on the harness.
pub fn execute_command(harness: &mut TestHarness, cmd: ScriptCommand) -> CommandResponse {
    match cmd {
        ScriptCommand::ChangeProfile { name, index } => {
            let result = match (name, index) {
                (Some(name), None) => harness.camera.change_profile_named(&name),
                (None, Some(index)) => harness.camera.change_profile_index(index),
                _ => {
                    return CommandResponse::err(
                        "change_profile needs exactly one of name or index",
                    )
                }
            };
            match result {
                Ok(()) => CommandResponse::ok_with_data(serde_json::json!({
                    "profile": harness.current_profile().name(),
                })),
                Err(e) => CommandResponse::err(e.to_string()),
            }
        }

        ScriptCommand::AcknowledgeProfileChange => {
            harness.camera.acknowledge_profile_change();
            CommandResponse::ok()
        }

        ScriptCommand::KeyDown { key } => {
            CommandResponse::ok_with_data(input_data(harness.key_down(key)))
        }

        ScriptCommand::KeyUp { key } => {
            CommandResponse::ok_with_data(input_data(harness.key_up(key)))
        }

        ScriptCommand::MouseMove { x, y } => {
            CommandResponse::ok_with_data(input_data(harness.mouse_move(x, y)))
        }

        ScriptCommand::MouseButton {
            button,
            state,
            x,
            y,
        } => CommandResponse::ok_with_data(input_data(harness.mouse_button(button, state, x, y))),

        ScriptCommand::Reshape { width, height } => {
            CommandResponse::ok_with_data(input_data(harness.reshape(width, height)))
        }

        ScriptCommand::Tick { ms, count } => {
            if !ms.is_finite() || ms < 0.0 {
                return CommandResponse::err(format!(
                    "tick needs a non-negative duration, got {}",
                    ms
                ));
            }
            let response = (0..count).fold(InputResponse::default(), |acc, _| {
                acc.merge(harness.tick(ms))
            });
            CommandResponse::ok_with_data(input_data(response))
        }

        ScriptCommand::GenerateBezier {
            patches,
            patch_set,
            path,
            tessellation,
            add_to_scene,
        } => generate_bezier(harness, patches, patch_set, path, tessellation, add_to_scene),

        ScriptCommand::AddModel {
            source,
            name,
            transforms,
        } => {
            let mut model = ModelEntry::new(source);
            model.name = name;
            let id = harness.scene.add_model(model, transforms);
            CommandResponse::ok_with_data(serde_json::json!({ "id": id }))
        }

        ScriptCommand::RemoveModel { id } => {
            let removed = harness.remove_model(&id);
            CommandResponse::ok_with_data(serde_json::json!({ "removed": removed }))
        }

        ScriptCommand::SetVisible { id, visible } => {
            if harness.scene.set_visible(&id, visible) {
                CommandResponse::ok()
            } else {
                CommandResponse::err(format!("No model with id {}", id))
            }
        }

        ScriptCommand::LoadWorld { world } => {
            harness.load_world(world);
            CommandResponse::ok_with_data(serde_json::json!({
                "model_count": harness.model_count(),
            }))
        }

        ScriptCommand::Clear => {
            harness.clear();
            CommandResponse::ok()
        }

        ScriptCommand::InspectCamera => CommandResponse::ok_with_data(harness.inspect_camera()),

        ScriptCommand::InspectScene => CommandResponse::ok_with_data(harness.inspect_scene()),
    }
}

fn generate_bezier(
    harness: &mut TestHarness,
    patches: Option<Vec<Vec<[f32; 3]>>>,
    patch_set: Option<PatchSet>,
    path: Option<String>,
    tessellation: u32,
    add_to_scene: bool,
) -> CommandResponse {
    let (result, source) = match (patches, patch_set, path) {
        (Some(patches), None, None) => {
            let points: Vec<Vec<Vec3>> = patches
                .iter()
                .map(|patch| patch.iter().map(|&p| Vec3::from_array(p)).collect())
                .collect();
            // Inline patches are stored as an indexed table with no sharing
            let mut table = PatchSet::default();
            for patch in &patches {
                let start = table.control_points.len();
                table.patches.push((start..start + patch.len()).collect());
                table.control_points.extend_from_slice(patch);
            }
            (
                harness.generate_bezier(&points, tessellation),
                ModelSource::BezierPatches {
                    patch_set: table,
                    tessellation,
                },
            )
        }
        (None, Some(set), None) => (
            harness.generate_patch_set(&set, tessellation),
            ModelSource::BezierPatches {
                patch_set: set,
                tessellation,
            },
        ),
        (None, None, Some(path)) => (
            harness.generate_patch_file(Path::new(&path), tessellation),
            ModelSource::BezierFile { path, tessellation },
        ),
        _ => {
            return CommandResponse::err(
                "generate_bezier needs exactly one of patches, patch_set or path",
            )
        }
    };

    let model = match result {
        Ok(model) => model,
        Err(e) => return CommandResponse::err(e.to_string()),
    };
    let mut data = model_summary(&model);
    if add_to_scene {
        let id = harness.add_model(source, Vec::new());
        data["id"] = serde_json::Value::String(id);
    }
    CommandResponse::ok_with_data(data)
}

/// Parse and execute a single JSON command string.
pub fn execute_json(harness: &mut TestHarness, json: &str) -> Result<CommandResponse, String> {
    let cmd: ScriptCommand =
        serde_json::from_str(json).map_err(|e| format!("Invalid command JSON: {e}"))?;
    Ok(execute_command(harness, cmd))
}

/// Parse and execute multiple JSON commands (array).
pub fn execute_json_batch(
    harness: &mut TestHarness,
    json: &str,
) -> Result<Vec<CommandResponse>, String> {
    let cmds: Vec<ScriptCommand> =
        serde_json::from_str(json).map_err(|e| format!("Invalid commands JSON: {e}"))?;
    Ok(cmds
        .into_iter()
        .map(|cmd| execute_command(harness, cmd))
        .collect())
}

/// Run a newline-delimited script. Every command line yields one response;
/// a line that fails to parse yields a failed response and the script goes on.
pub fn run_script(harness: &mut TestHarness, script: &str) -> Vec<CommandResponse> {
    script
        .lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(number, line)| match execute_json(harness, line) {
            Ok(response) => response,
            Err(e) => CommandResponse::err(format!("line {}: {}", number + 1, e)),
        })
        .collect()
}

/// Profile names accepted by `change_profile`
pub fn profile_names() -> Vec<&'static str> {
    ProfileId::ALL.iter().map(|id| id.name()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serde_change_profile() {
        let cmd: ScriptCommand =
            serde_json::from_str(r#"{"command": "change_profile", "name": "fps"}"#).unwrap();
        match cmd {
            ScriptCommand::ChangeProfile { name, index } => {
                assert_eq!(name.as_deref(), Some("fps"));
                assert!(index.is_none());
            }
            _ => panic!("Expected ChangeProfile"),
        }
    }

    #[test]
    fn test_command_serde_keys() {
        let cmd: ScriptCommand =
            serde_json::from_str(r#"{"command": "key_down", "key": "W"}"#).unwrap();
        assert!(matches!(cmd, ScriptCommand::KeyDown { key: Key::Char('w') }));
        let cmd: ScriptCommand =
            serde_json::from_str(r#"{"command": "key_up", "key": "page_up"}"#).unwrap();
        assert!(matches!(cmd, ScriptCommand::KeyUp { key: Key::PageUp }));
        let unknown = r#"{"command": "key_up", "key": "f13"}"#;
        assert!(serde_json::from_str::<ScriptCommand>(unknown).is_err());
    }

    #[test]
    fn test_command_serde_tick_default_count() {
        let cmd: ScriptCommand = serde_json::from_str(r#"{"command": "tick", "ms": 16}"#).unwrap();
        assert!(matches!(cmd, ScriptCommand::Tick { count: 1, .. }));
    }

    #[test]
    fn test_execute_change_profile() {
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h, r#"{"command": "change_profile", "index": 1}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.data.unwrap()["profile"], "fps");
        assert_eq!(h.current_profile(), ProfileId::Fps);
    }

    #[test]
    fn test_execute_unknown_profile() {
        let mut h = TestHarness::new();
        let resp =
            execute_json(&mut h, r#"{"command": "change_profile", "name": "orbit"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Unknown camera profile"));
        assert_eq!(h.current_profile(), ProfileId::Explorer);
        assert!(!h.camera.profile_has_changed());

        let resp = execute_json(&mut h, r#"{"command": "change_profile"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_execute_generate_inline_patch() {
        let mut points = Vec::new();
        for r in 0..4 {
            for c in 0..4 {
                points.push([c as f32, 0.0, r as f32]);
            }
        }
        let json = serde_json::json!({
            "command": "generate_bezier",
            "patches": [points],
            "tessellation": 3,
            "add_to_scene": true,
        })
        .to_string();

        let mut h = TestHarness::new();
        let resp = execute_json(&mut h, &json).unwrap();
        assert!(resp.success, "{:?}", resp.error);
        let data = resp.data.unwrap();
        assert_eq!(data["vertex_count"], 16);
        assert_eq!(data["first_vertex"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(data["last_vertex"], serde_json::json!([3.0, 0.0, 3.0]));
        assert_eq!(h.model_count(), 1);
    }

    #[test]
    fn test_execute_generate_rejects_short_patch() {
        let json = serde_json::json!({
            "command": "generate_bezier",
            "patches": [vec![[0.0, 0.0, 0.0]; 15]],
        })
        .to_string();
        let mut h = TestHarness::new();
        let resp = execute_json(&mut h, &json).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("Invalid patch data"));
        assert_eq!(h.model_count(), 0);
    }

    #[test]
    fn test_execute_invalid_json() {
        let mut h = TestHarness::new();
        assert!(execute_json(&mut h, "not valid json").is_err());
    }

    #[test]
    fn test_run_script_skips_comments() {
        let mut h = TestHarness::new();
        let script = r#"
# switch and walk
{"command": "change_profile", "name": "fps"}

{"command": "bogus"}
{"command": "inspect_camera"}
"#;
        let responses = run_script(&mut h, script);
        assert_eq!(responses.len(), 3);
        assert!(responses[0].success);
        assert!(!responses[1].success);
        assert!(responses[1].error.as_ref().unwrap().starts_with("line 5:"));
        assert_eq!(responses[2].data.as_ref().unwrap()["profile"], "fps");
    }

    #[test]
    fn test_profile_names() {
        assert_eq!(profile_names(), vec!["explorer", "fps"]);
    }
}
