//! Scene tree panel - groups, their transform chains and models

use egui::Ui;
use shared::{Group, ModelId};

use crate::build::MeshCache;
use crate::state::scene::{
    model_display_name, model_kind_label, short_id, source_summary, transform_summary,
};
use crate::state::AppState;

/// Edits requested while drawing the tree, applied afterwards
enum TreeAction {
    SetVisible(ModelId, bool),
    Remove(ModelId),
}

pub fn show(ui: &mut Ui, state: &mut AppState, cache: &MeshCache) {
    ui.horizontal(|ui| {
        ui.heading("Scene");
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.weak(format!("({})", state.scene.model_count()));
        });
    });
    ui.separator();

    if state.scene.world.groups.is_empty() {
        ui.add_space(20.0);
        ui.vertical_centered(|ui| {
            ui.weak("Empty world");
            ui.weak("Open a world or add a model");
        });
        return;
    }

    let mut actions = Vec::new();
    egui::ScrollArea::vertical()
        .id_salt("scene_tree_scroll")
        .show(ui, |ui| {
            for (index, group) in state.scene.world.groups.iter().enumerate() {
                show_group(ui, group, &format!("{index}"), cache, &mut actions);
            }
        });

    for action in actions {
        match action {
            TreeAction::SetVisible(id, visible) => {
                state.scene.set_visible(&id, visible);
            }
            TreeAction::Remove(id) => {
                if state.scene.remove_model(&id) {
                    state.set_status(format!("Removed model {}", short_id(&id)));
                }
            }
        }
    }
}

fn show_group(
    ui: &mut Ui,
    group: &Group,
    path: &str,
    cache: &MeshCache,
    actions: &mut Vec<TreeAction>,
) {
    let animated = group.transforms.iter().any(|op| op.is_animated());
    let title = format!(
        "Group {path}{}  [{}]",
        if animated { " ~" } else { "" },
        group.model_count()
    );
    egui::CollapsingHeader::new(title)
        .id_salt(("group", path))
        .default_open(true)
        .show(ui, |ui| {
            for op in &group.transforms {
                ui.weak(transform_summary(op));
            }
            for model in &group.models {
                show_model(ui, model, cache, actions);
            }
            for (index, child) in group.groups.iter().enumerate() {
                show_group(ui, child, &format!("{path}.{index}"), cache, actions);
            }
        });
}

fn show_model(
    ui: &mut Ui,
    model: &shared::ModelEntry,
    cache: &MeshCache,
    actions: &mut Vec<TreeAction>,
) {
    let error = cache.errors().get(&model.id);
    let color = if error.is_some() {
        egui::Color32::from_rgb(230, 110, 100)
    } else if !model.visible {
        egui::Color32::from_rgb(100, 100, 100)
    } else {
        egui::Color32::from_rgb(200, 200, 200)
    };

    ui.horizontal(|ui| {
        let mut visible = model.visible;
        if ui.checkbox(&mut visible, "").on_hover_text("Visible").changed() {
            actions.push(TreeAction::SetVisible(model.id.clone(), visible));
        }
        let label = ui.colored_label(color, model_display_name(model));
        let mut hover = format!(
            "{}\n{}\nid: {}",
            model_kind_label(&model.source),
            source_summary(&model.source),
            model.id
        );
        if let Some(mesh) = cache.mesh(&model.id) {
            hover.push_str(&format!(
                "\n{} vertices, {} triangles",
                mesh.vertex_count(),
                mesh.triangle_count()
            ));
        }
        if let Some(error) = error {
            hover.push_str(&format!("\nerror: {error}"));
        }
        label.on_hover_text(hover).context_menu(|ui| {
            if ui.button("Remove").clicked() {
                actions.push(TreeAction::Remove(model.id.clone()));
                ui.close_menu();
            }
        });
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if ui.small_button("🗑").on_hover_text("Remove").clicked() {
                actions.push(TreeAction::Remove(model.id.clone()));
            }
        });
    });
}
