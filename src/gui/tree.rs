//! Body selection tree panel.
//!
//! Lists the known bodies hierarchically: roots at the top level,
//! children indented under their parents in order of orbital distance.
//! Selecting a row asks the app to centre the view on that body.

use eframe::egui;

use crate::core::system::SystemMap;

/// Action triggered by interacting with the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeAction {
    /// Centre the view on this body and mark it selected
    Focus(u64),
}

/// Renders the hierarchical body list.
pub struct TreeRenderer<'a> {
    map: &'a SystemMap,
    selected: Option<u64>,
}

impl<'a> TreeRenderer<'a> {
    pub fn new(map: &'a SystemMap, selected: Option<u64>) -> Self {
        Self { map, selected }
    }

    /// Render the tree, returning an action if a row was clicked.
    pub fn render(&self, ui: &mut egui::Ui) -> Option<TreeAction> {
        if self.map.is_empty() {
            ui.label("No bodies scanned yet.");
            return None;
        }

        let mut action = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for id in self.map.top_level() {
                self.render_node(ui, id, &mut action);
            }
        });
        action
    }

    fn render_node(&self, ui: &mut egui::Ui, id: u64, action: &mut Option<TreeAction>) {
        let Some(body) = self.map.body(id) else {
            return;
        };

        let text = format!(
            "{} — {} ({:.1} ls)",
            body.name,
            body.kind.label(),
            body.distance_ls
        );
        let response = ui
            .selectable_label(self.selected == Some(id), text)
            .on_hover_text(body.detail_text());
        if response.clicked() {
            *action = Some(TreeAction::Focus(id));
        }

        let children = self.map.children_of(id);
        if !children.is_empty() {
            let child_ids: Vec<u64> = children.iter().map(|c| c.id).collect();
            ui.indent(id, |ui| {
                for child in child_ids {
                    self.render_node(ui, child, action);
                }
            });
        }
    }
}
