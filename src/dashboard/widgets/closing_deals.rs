use super::{error_with_retry, RecordListPanel, Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::data_cache::DataKind;
use crate::dashboard::resize::PanelKey;
use eframe::egui;

/// Open deals in a late pipeline stage.
pub struct ClosingDealsWidget {
    panel: RecordListPanel,
}

impl ClosingDealsWidget {
    pub fn new() -> Self {
        Self {
            panel: RecordListPanel::new(PanelKey::DealsList, PanelKey::DealsDetail),
        }
    }
}

impl Default for ClosingDealsWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl Widget for ClosingDealsWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        let deals = ctx.data.closing_deals.as_slice();
        let mut action = None;
        if let Some(err) = ctx.data.error(DataKind::Deals) {
            action = error_with_retry(ui, &format!("Could not load deals: {err}"));
            if deals.is_empty() {
                return action;
            }
        }
        if deals.is_empty() && ctx.is_loading(DataKind::Deals) {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Loading deals...");
            });
            return None;
        }
        let total: f64 = deals.iter().filter_map(|d| d.amount).sum();
        ui.small(format!("{} closing · {total:.2} total", deals.len()));
        self.panel.show(ui, deals, "No deals are closing.");
        action
    }

    fn teardown(&mut self) {
        self.panel.teardown();
    }
}
