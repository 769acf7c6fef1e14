pub mod generator_panel;
pub mod scene_tree;
pub mod status_bar;
