//! Translation of egui input into camera events

use eframe::egui;

use crate::camera::{ButtonState, CameraSwitch, InputResponse, Key, MouseButton, ProfileId};

/// Feed this frame's input to the camera switch, then tick it.
///
/// Pointer events are taken when they fall inside the viewport or while the
/// active profile has captured the pointer. Keys are ignored while a text
/// field has focus. A warp request moves the OS cursor.
pub fn dispatch(
    ctx: &egui::Context,
    response: &egui::Response,
    camera: &mut CameraSwitch,
    elapsed_ms: f32,
) -> InputResponse {
    let rect = response.rect;
    let keyboard = ctx.memory(|m| m.focused().is_none());
    let events = ctx.input(|i| i.events.clone());
    let mut out = InputResponse::default();

    for event in &events {
        match event {
            egui::Event::Key { key, pressed, .. } if keyboard => {
                if *pressed && handle_shortcut(camera, *key) {
                    out.redisplay = true;
                    continue;
                }
                if let Some(key) = translate_key(*key) {
                    let r = if *pressed {
                        camera.on_key_down(key)
                    } else {
                        camera.on_key_up(key)
                    };
                    out = out.merge(r);
                }
            }
            egui::Event::PointerMoved(pos)
                if camera.active().grabs_pointer() || rect.contains(*pos) =>
            {
                let local = *pos - rect.min;
                out = out.merge(camera.on_mouse_move(local.x, local.y));
            }
            egui::Event::PointerButton {
                pos,
                button,
                pressed,
                ..
            } if rect.contains(*pos) || !*pressed => {
                let Some(button) = translate_button(*button) else {
                    continue;
                };
                let state = if *pressed {
                    ButtonState::Pressed
                } else {
                    ButtonState::Released
                };
                let local = *pos - rect.min;
                out = out.merge(camera.on_mouse_button(button, state, local.x, local.y));
            }
            egui::Event::MouseWheel { delta, .. } if response.hovered() && delta.y != 0.0 => {
                let button = if delta.y > 0.0 {
                    MouseButton::WheelUp
                } else {
                    MouseButton::WheelDown
                };
                let [x, y] = ctx
                    .pointer_hover_pos()
                    .map(|p| [p.x - rect.min.x, p.y - rect.min.y])
                    .unwrap_or([0.0, 0.0]);
                out = out.merge(camera.on_mouse_button(button, ButtonState::Pressed, x, y));
            }
            _ => {}
        }
    }

    out = out.merge(camera.on_timer_tick(elapsed_ms));

    if let Some([x, y]) = out.warp_pointer {
        ctx.send_viewport_cmd(egui::ViewportCommand::CursorPosition(
            rect.min + egui::vec2(x, y),
        ));
    }
    out
}

/// Application keys that never reach the profiles. Tab cycles the profile,
/// Escape leaves first-person mode.
fn handle_shortcut(camera: &mut CameraSwitch, key: egui::Key) -> bool {
    match key {
        egui::Key::Tab => {
            camera.next_profile();
            true
        }
        egui::Key::Escape if camera.current_profile() == ProfileId::Fps => {
            camera.change_profile(ProfileId::Explorer);
            true
        }
        _ => false,
    }
}

fn translate_key(key: egui::Key) -> Option<Key> {
    let special = match key {
        egui::Key::ArrowUp => Key::Up,
        egui::Key::ArrowDown => Key::Down,
        egui::Key::ArrowLeft => Key::Left,
        egui::Key::ArrowRight => Key::Right,
        egui::Key::PageUp => Key::PageUp,
        egui::Key::PageDown => Key::PageDown,
        egui::Key::Home => Key::Home,
        egui::Key::End => Key::End,
        egui::Key::Escape => Key::Escape,
        other => {
            // Letters, digits and punctuation have a one-character symbol
            let mut chars = other.symbol_or_name().chars();
            return match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_graphic() => Some(Key::char(c)),
                _ => None,
            };
        }
    };
    Some(special)
}

fn translate_button(button: egui::PointerButton) -> Option<MouseButton> {
    match button {
        egui::PointerButton::Primary => Some(MouseButton::Left),
        egui::PointerButton::Middle => Some(MouseButton::Middle),
        egui::PointerButton::Secondary => Some(MouseButton::Right),
        _ => None,
    }
}
