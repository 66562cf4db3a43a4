use super::{Widget, WidgetAction};
use crate::dashboard::dashboard::DashboardContext;
use eframe::egui;

/// Built-in panel without a data source yet. Shows a short description.
pub struct PlaceholderWidget {
    lines: &'static [&'static str],
}

impl PlaceholderWidget {
    pub fn tasks() -> Self {
        Self {
            lines: &["Follow-ups and calls due today appear here."],
        }
    }

    pub fn reports() -> Self {
        Self {
            lines: &["Saved reports for the sales team."],
        }
    }

    pub fn activities() -> Self {
        Self {
            lines: &["Recent emails, calls and meetings."],
        }
    }

    pub fn charts() -> Self {
        Self {
            lines: &["Revenue and win-rate charts."],
        }
    }
}

impl Widget for PlaceholderWidget {
    fn render(&mut self, ui: &mut egui::Ui, _ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        for line in self.lines {
            ui.weak(*line);
        }
        None
    }
}
