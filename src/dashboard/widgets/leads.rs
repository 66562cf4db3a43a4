use super::{error_with_retry, RecordListPanel, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::data_cache::DataKind;
use crate::dashboard::resize::PanelKey;
use eframe::egui;

/// Leads created since local midnight.
pub struct LeadsWidget {
    panel: RecordListPanel,
}

impl LeadsWidget {
    pub fn new() -> Self {
        Self {
            panel: RecordListPanel::new(PanelKey::LeadsList, PanelKey::LeadsDetail),
        }
    }
}

impl Default for LeadsWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for LeadsWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let leads = ctx.data.todays_leads.as_slice();
        let mut action = None;
        if let Some(err) = ctx.data.error(DataKind::TodaysLeads) {
            action = error_with_retry(ui, &format!("Could not load leads: {err}"));
            if leads.is_empty() {
                return action;
            }
        }
        if leads.is_empty() && ctx.is_loading(DataKind::TodaysLeads) {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading leads...");
            });
            return None;
        }
        ui.small(format!("{} new today", leads.len()));
        self.panel.show(ui, leads, "No leads created today.");
        action
    }

    fn teardown(&mut self) {
        self.panel.teardown();
    }
}
