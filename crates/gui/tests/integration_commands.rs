//! Integration tests for the ScriptCommand JSON protocol.
//!
//! Tests the full command pipeline: JSON string -> parse -> execute -> response.

use cg_engine_lib::camera::ProfileId;
use cg_engine_lib::command::{execute_json, execute_json_batch, profile_names, run_script};
use cg_engine_lib::harness::TestHarness;

const FLAT_PATCH: &str = "[[0,0,0],[1,0,0],[2,0,0],[3,0,0],\
                           [0,0,1],[1,0,1],[2,0,1],[3,0,1],\
                           [0,0,2],[1,0,2],[2,0,2],[3,0,2],\
                           [0,0,3],[1,0,3],[2,0,3],[3,0,3]]";

#[test]
fn test_command_change_profile_by_name_and_index() {
    let mut h = TestHarness::new();

    let resp = execute_json(&mut h, r#"{"command": "change_profile", "name": "fps"}"#).unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["profile"], "fps");
    assert_eq!(h.current_profile(), ProfileId::Fps);

    let resp = execute_json(&mut h, r#"{"command": "change_profile", "index": 0}"#).unwrap();
    assert!(resp.success);
    assert_eq!(h.current_profile(), ProfileId::Explorer);
}

#[test]
fn test_command_unknown_profile_fails() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "change_profile", "index": 9}"#).unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("Unknown camera profile"));
    assert_eq!(h.current_profile(), ProfileId::Explorer);

    // Both selectors at once is rejected too
    let resp = execute_json(
        &mut h,
        r#"{"command": "change_profile", "name": "fps", "index": 1}"#,
    )
    .unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_fps_walk() {
    let mut h = TestHarness::new();
    let json = r#"[
        {"command": "change_profile", "name": "fps"},
        {"command": "acknowledge_profile_change"},
        {"command": "key_down", "key": "w"},
        {"command": "tick", "ms": 16, "count": 10},
        {"command": "key_up", "key": "w"},
        {"command": "inspect_camera"}
    ]"#;
    let before = h.camera_state().eye;
    let results = execute_json_batch(&mut h, json).unwrap();
    assert_eq!(results.len(), 6);
    assert!(results.iter().all(|r| r.success));
    assert_eq!(results[3].data.as_ref().unwrap()["redisplay"], true);

    let camera = results[5].data.as_ref().unwrap();
    assert_eq!(camera["profile"], "fps");
    assert_eq!(camera["profile_changed"], false);
    let moved = (h.camera_state().eye - before).length();
    let expected = h.settings.camera.fps.speed * 160.0;
    assert!((moved - expected).abs() < 1e-3, "moved {}", moved);
}

#[test]
fn test_command_explorer_wheel_zoom() {
    let mut h = TestHarness::new();
    let resp = execute_json(
        &mut h,
        r#"{"command": "mouse_button", "button": "wheel_down", "state": "pressed", "x": 0, "y": 0}"#,
    )
    .unwrap();
    assert!(resp.success);
    assert_eq!(resp.data.unwrap()["redisplay"], true);
}

#[test]
fn test_command_negative_tick_rejected() {
    let mut h = TestHarness::new();
    let resp = execute_json(&mut h, r#"{"command": "tick", "ms": -5}"#).unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_generate_inline_patch() {
    let mut h = TestHarness::new();
    let json = format!(
        r#"{{"command": "generate_bezier", "patches": [{}], "tessellation": 3}}"#,
        FLAT_PATCH
    );
    let resp = execute_json(&mut h, &json).unwrap();
    assert!(resp.success, "{:?}", resp.error);
    let data = resp.data.unwrap();
    assert_eq!(data["patch_count"], 1);
    assert_eq!(data["resolution"], 4);
    assert_eq!(data["vertex_count"], 16);
    assert_eq!(data["first_vertex"], serde_json::json!([0.0, 0.0, 0.0]));
    assert_eq!(data["last_tex_coord"], serde_json::json!([1.0, 1.0]));
    assert!(data.get("id").is_none());
    assert_eq!(h.model_count(), 0);
}

#[test]
fn test_command_generate_and_add_to_scene() {
    let mut h = TestHarness::new();
    let json = format!(
        r#"{{"command": "generate_bezier", "patches": [{}], "add_to_scene": true}}"#,
        FLAT_PATCH
    );
    let resp = execute_json(&mut h, &json).unwrap();
    assert!(resp.success);
    let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();
    assert_eq!(h.model_count(), 1);

    h.build();
    let mesh = h.mesh_of(&id).unwrap();
    // Default tessellation of 10 gives 11×11 samples
    assert_eq!(mesh.vertex_count(), 121);
}

#[test]
fn test_command_generate_rejects_bad_input() {
    let mut h = TestHarness::new();

    // 15 points
    let resp = execute_json(
        &mut h,
        r#"{"command": "generate_bezier", "patches": [[[0,0,0],[1,0,0],[2,0,0],[3,0,0],[0,0,1],[1,0,1],[2,0,1],[3,0,1],[0,0,2],[1,0,2],[2,0,2],[3,0,2],[0,0,3],[1,0,3],[2,0,3]]]}"#,
    )
    .unwrap();
    assert!(!resp.success);
    assert!(resp.error.unwrap().contains("patch"));

    // No source at all
    let resp = execute_json(&mut h, r#"{"command": "generate_bezier"}"#).unwrap();
    assert!(!resp.success);

    // Tessellation 0 is a resolution of 1
    let json = format!(
        r#"{{"command": "generate_bezier", "patches": [{}], "tessellation": 0}}"#,
        FLAT_PATCH
    );
    let resp = execute_json(&mut h, &json).unwrap();
    assert!(!resp.success);
}

#[test]
fn test_command_generate_huge_tessellation_is_error() {
    let mut h = TestHarness::new();
    for tessellation in [u32::MAX, 5000] {
        let json = format!(
            r#"{{"command": "generate_bezier", "patches": [{}], "tessellation": {}}}"#,
            FLAT_PATCH, tessellation
        );
        let resp = execute_json(&mut h, &json).unwrap();
        assert!(!resp.success);
        assert!(resp.error.unwrap().contains("at most"));
    }
    assert_eq!(h.model_count(), 0);
}

#[test]
fn test_command_add_hide_remove_model() {
    let mut h = TestHarness::new();
    let resp = execute_json(
        &mut h,
        r#"{"command": "add_model", "name": "ball", "source": {"type": "sphere", "radius": 1.0, "slices": 10, "stacks": 6}, "transforms": [{"type": "translate", "x": 0, "y": 2, "z": 0}]}"#,
    )
    .unwrap();
    assert!(resp.success);
    let id = resp.data.unwrap()["id"].as_str().unwrap().to_string();

    let scene = execute_json(&mut h, r#"{"command": "inspect_scene"}"#)
        .unwrap()
        .data
        .unwrap();
    assert_eq!(scene["models"][0]["name"], "ball");
    assert_eq!(scene["models"][0]["visible"], true);

    let hide = format!(r#"{{"command": "set_visible", "id": "{}", "visible": false}}"#, id);
    assert!(execute_json(&mut h, &hide).unwrap().success);
    let missing = r#"{"command": "set_visible", "id": "nope", "visible": false}"#;
    assert!(!execute_json(&mut h, missing).unwrap().success);

    let remove = format!(r#"{{"command": "remove_model", "id": "{}"}}"#, id);
    let resp = execute_json(&mut h, &remove).unwrap();
    assert_eq!(resp.data.unwrap()["removed"], true);
    assert_eq!(h.model_count(), 0);
}

#[test]
fn test_command_load_world_and_clear() {
    let mut h = TestHarness::new();
    let json = r#"{"command": "load_world", "world": {
        "camera": {"position": [0, 0, 8], "look_at": [0, 0, 0], "up": [0, 1, 0]},
        "groups": [
            {"transforms": [{"type": "animated_rotate", "time": 10, "x": 0, "y": 1, "z": 0}],
             "models": [{"source": {"type": "box", "length": 1, "divisions": 2}}],
             "groups": [{"models": [{"source": {"type": "plane", "length": 4, "divisions": 1}}]}]}
        ]
    }}"#;
    let resp = execute_json(&mut h, json).unwrap();
    assert!(resp.success, "{:?}", resp.error);
    assert_eq!(resp.data.unwrap()["model_count"], 2);
    assert_eq!(h.camera_state().eye.z, 8.0);

    let scene = h.inspect_scene();
    let models = scene["models"].as_array().unwrap();
    assert!(models.iter().all(|m| m["animated"] == true));

    assert!(execute_json(&mut h, r#"{"command": "clear"}"#).unwrap().success);
    assert_eq!(h.model_count(), 0);
}

#[test]
fn test_invalid_json_is_error() {
    let mut h = TestHarness::new();
    assert!(execute_json(&mut h, r#"{"command": "fly_to_moon"}"#).is_err());
    assert!(execute_json_batch(&mut h, "not json").is_err());
}

#[test]
fn test_run_script_skips_comments_and_reports_bad_lines() {
    let mut h = TestHarness::new();
    let script = r#"
# orbit a little, then walk
{"command": "reshape", "width": 640, "height": 480}

{"command": "mouse_button", "button": "left", "state": "pressed", "x": 10, "y": 10}
{"command": "mouse_move", "x": 30, "y": 10}
this is not json
{"command": "change_profile", "name": "fps"}
"#;
    let results = run_script(&mut h, script);
    assert_eq!(results.len(), 5);
    assert!(results[0].success);
    assert_eq!(results[2].data.as_ref().unwrap()["redisplay"], true);
    assert!(!results[3].success);
    assert!(results[3].error.as_ref().unwrap().starts_with("line 7:"));
    assert!(results[4].success);
    assert_eq!(h.current_profile(), ProfileId::Fps);
    assert_eq!(h.camera_state().width, 640);
}

#[test]
fn test_profile_names_cover_registry() {
    assert_eq!(profile_names(), vec!["explorer", "fps"]);
}
