use super::{Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;

/// Panel for a user-defined widget. Only its metadata is shown.
pub struct CustomWidgetPanel {
    name: String,
    widget_type: String,
    permanent: bool,
}

impl CustomWidgetPanel {
    pub fn new(name: &str, widget_type: &str, permanent: bool) -> Self {
        Self {
            name: name.to_string(),
            widget_type: widget_type.to_string(),
            permanent,
        }
    }
}

impl Widget for CustomWidgetPanel {
    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        ui.horizontal(|ui| {
            ui.label(&self.name);
            if self.permanent {
                ui.label(egui::RichText::new("Permanent").small().strong());
            }
        });
        ui.weak(format!("Type: {}", self.widget_type));
        None
    }
}
