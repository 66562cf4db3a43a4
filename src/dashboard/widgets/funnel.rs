use super::{error_with_retry, Widget, WidgetAction};
use crate::crm::records::StageCount;
use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::data_cache::DataKind;
use eframe::egui;

const BAR_HEIGHT: f32 = 18.0;

#[derive(Debug, Clone, PartialEq)]
pub struct FunnelRow {
    pub stage: String,
    pub count: u64,
    pub total_amount: Option<f64>,
    /// Share of the widest stage, in `0.0..=1.0`.
    pub fraction: f32,
}

/// Scale each stage against the largest count. Empty stages are kept so the
/// funnel shape stays stable between refreshes.
pub fn funnel_rows(counts: &[StageCount]) -> Vec<FunnelRow> {
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);
    counts
        .iter()
        .map(|c| FunnelRow {
            stage: c.stage.clone(),
            count: c.count,
            total_amount: c.total_amount,
            fraction: if max == 0 {
                0.0
            } else {
                c.count as f32 / max as f32
            },
        })
        .collect()
}

/// Deals per pipeline stage drawn as horizontal bars.
#[derive(Default)]
pub struct FunnelWidget;

impl FunnelWidget {
    pub fn new() -> Self {
        Self
    }
}

impl Widget for FunnelWidget {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction> {
        if let Some(err) = ctx.data.error(DataKind::StageCounts) {
            return error_with_retry(ui, &format!("Could not load the funnel: {err}"));
        }
        let rows = funnel_rows(&ctx.data.stage_counts);
        if rows.is_empty() {
            if ctx.is_loading(DataKind::StageCounts) {
                ui.spinner();
            } else {
                ui.weak("No deals in the pipeline.");
            }
            return None;
        }
        let fill = ui.visuals().selection.bg_fill;
        for row in rows {
            ui.horizontal(|ui| {
                ui.add_sized([110.0, BAR_HEIGHT], egui::Label::new(&row.stage).truncate(true));
                let width = (ui.available_width() - 60.0).max(0.0);
                let (rect, _) =
                    ui.allocate_exact_size(egui::vec2(width, BAR_HEIGHT), egui::Sense::hover());
                let bar = egui::Rect::from_min_size(
                    rect.min,
                    egui::vec2(width * row.fraction, BAR_HEIGHT),
                );
                ui.painter().rect_filled(bar, 2.0, fill);
                let resp = ui.label(row.count.to_string());
                if let Some(total) = row.total_amount {
                    resp.on_hover_text(format!("{total:.2}"));
                }
            });
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(name: &str, count: u64) -> StageCount {
        StageCount {
            stage: name.into(),
            count,
            total_amount: None,
        }
    }

    #[test]
    fn rows_scale_against_widest_stage() {
        let rows = funnel_rows(&[stage("Prospecting", 8), stage("Proposal", 2), stage("Won", 0)]);
        let fractions: Vec<f32> = rows.iter().map(|r| r.fraction).collect();
        assert_eq!(fractions, vec![1.0, 0.25, 0.0]);
    }

    #[test]
    fn all_empty_stages_have_zero_width() {
        let rows = funnel_rows(&[stage("Prospecting", 0)]);
        assert_eq!(rows[0].fraction, 0.0);
    }
}
