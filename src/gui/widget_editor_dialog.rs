use crate::dashboard::catalog::{default_catalog, CatalogEntry};
use crate::dashboard::error::DashboardError;
use crate::dashboard::layout::LayoutStore;
use crate::dashboard::widget_id::WidgetId;
use eframe::egui;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorTab {
    #[default]
    Custom,
    Catalog,
    Deleted,
}

/// What the dialog did to the layout, for the host to report.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorOutcome {
    Created(WidgetId),
    Updated(WidgetId),
    Restored { id: WidgetId, index: usize },
    Rejected(DashboardError),
}

/// Create, edit, add-from-catalog and restore dialog.
pub struct WidgetEditorDialog {
    pub open: bool,
    tab: EditorTab,
    editing: Option<WidgetId>,
    name: String,
    widget_type: String,
    permanent: bool,
    error: Option<String>,
    catalog: Vec<CatalogEntry>,
}

impl Default for WidgetEditorDialog {
    fn default() -> Self {
        Self {
            open: false,
            tab: EditorTab::Custom,
            editing: None,
            name: String::new(),
            widget_type: String::new(),
            permanent: false,
            error: None,
            catalog: default_catalog(),
        }
    }
}

impl WidgetEditorDialog {
    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    pub fn editing(&self) -> Option<&WidgetId> {
        self.editing.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn open_create(&mut self) {
        self.editing = None;
        self.set_fields("", "", false);
        self.tab = EditorTab::Custom;
        self.error = None;
        self.open = true;
    }

    /// Open prefilled with the stored metadata of `id`. Returns `false` when
    /// `id` has no custom metadata.
    pub fn open_edit(&mut self, id: &WidgetId, store: &LayoutStore) -> bool {
        let Some(custom) = store.custom_widget(id) else {
            return false;
        };
        let (name, widget_type, permanent) =
            (custom.name.clone(), custom.widget_type.clone(), custom.is_permanent);
        self.set_fields(&name, &widget_type, permanent);
        self.editing = Some(id.clone());
        self.tab = EditorTab::Custom;
        self.error = None;
        self.open = true;
        true
    }

    pub fn open_recover(&mut self) {
        self.editing = None;
        self.tab = EditorTab::Deleted;
        self.error = None;
        self.open = true;
    }

    pub fn set_fields(&mut self, name: &str, widget_type: &str, permanent: bool) {
        self.name = name.to_string();
        self.widget_type = widget_type.to_string();
        self.permanent = permanent;
    }

    /// Create or update from the form fields. Rejections keep the dialog
    /// open with the message shown inline.
    pub fn submit(&mut self, store: &mut LayoutStore) -> EditorOutcome {
        let result = match &self.editing {
            Some(id) => store
                .edit_custom_widget(id, &self.name, &self.widget_type, self.permanent)
                .map(|()| EditorOutcome::Updated(id.clone())),
            None => store
                .create_custom_widget(&self.name, &self.widget_type, self.permanent)
                .map(EditorOutcome::Created),
        };
        self.finish(result)
    }

    pub fn add_from_catalog(
        &mut self,
        store: &mut LayoutStore,
        entry: &CatalogEntry,
    ) -> EditorOutcome {
        let result = store.create_from_catalog(entry).map(EditorOutcome::Created);
        self.finish(result)
    }

    pub fn restore(&mut self, store: &mut LayoutStore, id: &WidgetId) -> EditorOutcome {
        let outcome = match store.recover(id) {
            Ok(index) => EditorOutcome::Restored {
                id: id.clone(),
                index,
            },
            Err(e) => EditorOutcome::Rejected(e),
        };
        if store.ledger().is_empty() {
            self.open = false;
        }
        outcome
    }

    fn finish(&mut self, result: Result<EditorOutcome, DashboardError>) -> EditorOutcome {
        match result {
            Ok(outcome) => {
                self.error = None;
                self.editing = None;
                self.open = false;
                outcome
            }
            Err(e) => {
                self.error = Some(e.to_string());
                EditorOutcome::Rejected(e)
            }
        }
    }

    pub fn ui(&mut self, ctx: &egui::Context, store: &mut LayoutStore) -> Option<EditorOutcome> {
        if !self.open {
            return None;
        }
        let title = if self.editing.is_some() {
            "Edit Widget"
        } else {
            "Add Widget"
        };
        let mut outcome = None;
        let mut open = self.open;
        egui::Window::new(title)
            .open(&mut open)
            .resizable(true)
            .collapsible(false)
            .show(ctx, |ui| {
                if self.editing.is_none() {
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut self.tab, EditorTab::Custom, "Custom");
                        ui.selectable_value(&mut self.tab, EditorTab::Catalog, "Catalog");
                        let deleted = format!("Deleted ({})", store.ledger().len());
                        ui.selectable_value(&mut self.tab, EditorTab::Deleted, deleted);
                    });
                    ui.separator();
                }
                if let Some(err) = &self.error {
                    ui.colored_label(egui::Color32::RED, err);
                }
                outcome = match self.tab {
                    EditorTab::Custom => self.custom_ui(ui, store),
                    EditorTab::Catalog => self.catalog_ui(ui, store),
                    EditorTab::Deleted => self.deleted_ui(ui, store),
                };
            });
        self.open = self.open && open;
        outcome
    }

    fn custom_ui(&mut self, ui: &mut egui::Ui, store: &mut LayoutStore) -> Option<EditorOutcome> {
        egui::Grid::new("widget_editor_fields")
            .num_columns(2)
            .show(ui, |ui| {
                ui.label("Name");
                ui.text_edit_singleline(&mut self.name);
                ui.end_row();
                ui.label("Type");
                ui.text_edit_singleline(&mut self.widget_type);
                ui.end_row();
            });
        ui.checkbox(&mut self.permanent, "Permanent (cannot be deleted)");
        let label = if self.editing.is_some() { "Save" } else { "Create" };
        let mut outcome = None;
        ui.horizontal(|ui| {
            if ui.button(label).clicked() {
                outcome = Some(self.submit(store));
            }
            if ui.button("Cancel").clicked() {
                self.open = false;
            }
        });
        outcome
    }

    fn catalog_ui(&mut self, ui: &mut egui::Ui, store: &mut LayoutStore) -> Option<EditorOutcome> {
        let mut picked = None;
        egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
            for entry in &self.catalog {
                let present = entry.built_in && store.contains(&WidgetId::new(entry.id.as_str()));
                ui.horizontal(|ui| {
                    ui.vertical(|ui| {
                        ui.strong(&entry.name);
                        ui.small(&entry.description);
                    });
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let text = if present { "Added" } else { "Add" };
                        if ui.add_enabled(!present, egui::Button::new(text)).clicked() {
                            picked = Some(entry.clone());
                        }
                    });
                });
                ui.separator();
            }
        });
        picked.map(|entry| self.add_from_catalog(store, &entry))
    }

    fn deleted_ui(&mut self, ui: &mut egui::Ui, store: &mut LayoutStore) -> Option<EditorOutcome> {
        if store.ledger().is_empty() {
            ui.weak("Nothing to restore.");
            return None;
        }
        let mut picked = None;
        egui::Grid::new("widget_editor_deleted")
            .num_columns(4)
            .striped(true)
            .show(ui, |ui| {
                for (id, entry) in store.ledger().entries() {
                    ui.label(&entry.name);
                    ui.weak(&entry.widget_type);
                    ui.label(format!("#{}", entry.original_position + 1));
                    if ui.button("Restore").clicked() {
                        picked = Some(id.clone());
                    }
                    ui.end_row();
                }
            });
        picked.map(|id| self.restore(store, &id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn store() -> LayoutStore {
        LayoutStore::hydrate(Box::new(MemoryStore::new()))
    }

    #[test]
    fn blank_fields_keep_dialog_open_with_message() {
        let mut store = store();
        let mut dialog = WidgetEditorDialog::default();
        dialog.open_create();
        dialog.set_fields("  ", "Pipeline", false);
        let outcome = dialog.submit(&mut store);
        assert!(matches!(
            outcome,
            EditorOutcome::Rejected(DashboardError::Validation(_))
        ));
        assert!(dialog.open);
        assert!(dialog.error().is_some());
        assert_eq!(store.order().len(), 3);
    }

    #[test]
    fn edit_prefills_and_updates_in_place() {
        let mut store = store();
        let id = store.create_custom_widget("Goals", "Targets", false).unwrap();
        let mut dialog = WidgetEditorDialog::default();
        assert!(dialog.open_edit(&id, &store));
        dialog.set_fields("Quarterly goals", "Targets", true);
        assert_eq!(dialog.submit(&mut store), EditorOutcome::Updated(id.clone()));
        assert!(!dialog.open);
        assert_eq!(store.custom_widget(&id).unwrap().name, "Quarterly goals");
        assert!(store.is_permanent(&id));
    }

    #[test]
    fn built_ins_cannot_be_opened_for_edit() {
        let store = store();
        let mut dialog = WidgetEditorDialog::default();
        assert!(!dialog.open_edit(&WidgetId::from("leads"), &store));
        assert!(!dialog.open);
    }

    #[test]
    fn restore_closes_when_ledger_empties() {
        let mut store = store();
        store.soft_delete(&WidgetId::from("leads")).unwrap();
        let mut dialog = WidgetEditorDialog::default();
        dialog.open_recover();
        let outcome = dialog.restore(&mut store, &WidgetId::from("leads"));
        assert_eq!(
            outcome,
            EditorOutcome::Restored {
                id: WidgetId::from("leads"),
                index: 1
            }
        );
        assert!(!dialog.open);
    }
}
