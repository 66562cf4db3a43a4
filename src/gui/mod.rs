mod widget_editor_dialog;

pub use widget_editor_dialog::{EditorOutcome, EditorTab, WidgetEditorDialog};

use crate::crm::api::RecordApi;
use crate::dashboard::data_cache::{DashboardDataCache, DataKind};
use crate::dashboard::{Dashboard, DashboardContext, DashboardEvent, LayoutStore, WidgetRegistry};
use crate::settings::Settings;
use crate::storage::KeyValueStore;
use eframe::egui;
use egui_toast::{Toast, ToastKind, ToastOptions, Toasts};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

pub struct CrmDashboardApp {
    dashboard: Dashboard,
    data: Arc<DashboardDataCache>,
    api: Option<Arc<dyn RecordApi>>,
    editor: WidgetEditorDialog,
    toasts: Toasts,
    pub enable_toasts: bool,
    toast_duration: f32,
    refresh_interval: Duration,
    confirm_reset: bool,
    reported_persist_error: Option<String>,
}

impl CrmDashboardApp {
    /// Build the app over a layout store and, when reachable, the record API.
    pub fn new(
        settings: &Settings,
        store: Box<dyn KeyValueStore>,
        api: Option<Arc<dyn RecordApi>>,
    ) -> Self {
        let layout = LayoutStore::hydrate(store);
        let warnings = layout.warnings().to_vec();
        let mut app = Self {
            dashboard: Dashboard::new(layout, WidgetRegistry::with_defaults()),
            data: Arc::new(DashboardDataCache::new()),
            api,
            editor: WidgetEditorDialog::default(),
            toasts: Toasts::new().anchor(egui::Align2::RIGHT_TOP, [10.0, 10.0]),
            enable_toasts: settings.enable_toasts,
            toast_duration: settings.toast_duration,
            refresh_interval: settings.refresh_interval(),
            confirm_reset: false,
            reported_persist_error: None,
        };
        for warning in warnings {
            app.notify(ToastKind::Warning, warning);
        }
        if app.api.is_none() {
            app.notify(ToastKind::Warning, "CRM API unavailable; dashboard data disabled");
        }
        app
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    fn notify(&mut self, kind: ToastKind, text: impl Into<String>) {
        let text = text.into();
        match kind {
            ToastKind::Error => tracing::error!("{text}"),
            ToastKind::Warning => tracing::warn!("{text}"),
            _ => tracing::info!("{text}"),
        }
        if self.enable_toasts {
            self.toasts.add(Toast {
                text: text.into(),
                kind,
                options: ToastOptions::default().duration_in_seconds(self.toast_duration as f64),
            });
        }
    }

    fn refresh(&mut self, ctx: &egui::Context) {
        let Some(api) = &self.api else {
            return;
        };
        let repaint = ctx.clone();
        self.data.spawn_refresh(
            Arc::clone(api),
            Some(Arc::new(move || repaint.request_repaint())),
        );
    }

    fn handle_event(&mut self, ctx: &egui::Context, event: DashboardEvent) {
        match event {
            DashboardEvent::EditRequested(id) => {
                if !self.editor.open_edit(&id, self.dashboard.store()) {
                    self.notify(ToastKind::Warning, format!("Widget '{id}' no longer exists"));
                }
            }
            DashboardEvent::Deleted { name, .. } => {
                self.notify(
                    ToastKind::Info,
                    format!("Removed '{name}'. Restore it from Add widget > Deleted."),
                );
            }
            DashboardEvent::Removed(id) => {
                self.notify(ToastKind::Info, format!("Deleted widget '{id}'"));
            }
            DashboardEvent::Reordered { .. } => {}
            DashboardEvent::Rejected(e) => self.notify(ToastKind::Warning, e.to_string()),
            DashboardEvent::Info(text) => self.notify(ToastKind::Info, text),
            DashboardEvent::RefreshRequested => self.refresh(ctx),
        }
    }

    fn handle_editor_outcome(&mut self, outcome: EditorOutcome) {
        match outcome {
            EditorOutcome::Created(id) => self.notify(ToastKind::Success, format!("Added '{id}'")),
            EditorOutcome::Updated(id) => self.notify(ToastKind::Success, format!("Saved '{id}'")),
            EditorOutcome::Restored { id, index } => {
                let text = format!("Restored '{id}' at position {}", index + 1);
                self.notify(ToastKind::Success, text)
            }
            EditorOutcome::Rejected(e) => self.notify(ToastKind::Warning, e.to_string()),
        }
    }

    fn report_persist_error(&mut self) {
        let current = self.dashboard.store().last_persist_error().map(str::to_string);
        if current != self.reported_persist_error {
            if let Some(err) = &current {
                self.notify(ToastKind::Error, format!("Failed to save layout: {err}"));
            }
            self.reported_persist_error = current;
        }
    }

    fn toolbar(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        ui.horizontal(|ui| {
            ui.heading("Dashboard");
            ui.separator();
            let mut reorder = self.dashboard.reorder_mode();
            if ui.checkbox(&mut reorder, "Reorder").changed() {
                self.dashboard.set_reorder_mode(reorder);
            }
            if ui.button("Add widget").clicked() {
                self.editor.open_create();
            }
            let deleted = self.dashboard.store().ledger().len();
            if deleted > 0 && ui.button(format!("Deleted ({deleted})")).clicked() {
                self.editor.open_recover();
            }
            let loading = DataKind::ALL.iter().any(|k| self.data.is_loading(*k));
            if ui
                .add_enabled(self.api.is_some() && !loading, egui::Button::new("Refresh"))
                .clicked()
            {
                self.refresh(ctx);
            }
            if loading {
                ui.spinner();
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Reset layout").clicked() {
                    self.confirm_reset = true;
                }
            });
        });
    }

    fn reset_dialog(&mut self, ctx: &egui::Context) {
        if !self.confirm_reset {
            return;
        }
        let mut open = true;
        let mut reset = false;
        let mut close = false;
        egui::Window::new("Reset layout")
            .collapsible(false)
            .resizable(false)
            .open(&mut open)
            .show(ctx, |ui| {
                ui.label("Restore the default widgets? Deleted widgets can no longer be restored.");
                ui.horizontal(|ui| {
                    reset = ui.button("Reset").clicked();
                    close = ui.button("Cancel").clicked();
                });
            });
        if reset {
            self.dashboard.store_mut().reset_to_default();
            self.notify(ToastKind::Info, "Dashboard layout reset");
        }
        self.confirm_reset = open && !reset && !close;
    }
}

impl eframe::App for CrmDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.enable_toasts {
            self.toasts.show(ctx);
        }
        if self.api.is_some() && self.data.refresh_due(self.refresh_interval) {
            self.refresh(ctx);
        }
        ctx.request_repaint_after(self.refresh_interval);

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui, ctx));

        let snapshot = self.data.snapshot();
        let loading: HashSet<DataKind> = DataKind::ALL
            .into_iter()
            .filter(|k| self.data.is_loading(*k))
            .collect();
        let dash_ctx = DashboardContext {
            data: snapshot.as_ref(),
            loading: &loading,
        };
        let events = egui::CentralPanel::default()
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false; 2])
                    .show(ui, |ui| self.dashboard.ui(ui, &dash_ctx))
                    .inner
            })
            .inner;
        for event in events {
            self.handle_event(ctx, event);
        }

        if let Some(outcome) = self.editor.ui(ctx, self.dashboard.store_mut()) {
            self.handle_editor_outcome(outcome);
        }
        self.reset_dialog(ctx);
        self.report_persist_error();
    }
}
