use crate::crm::pagination::Paginator;
use crate::crm::records::{Deal, Lead};
use crate::dashboard::resize::{PanelKey, ResizeController};
use eframe::egui;

const PAGE_SIDEBAR_WIDTH: f32 = 44.0;
const GRIP_HEIGHT: f32 = 6.0;

/// A record that can be listed and shown in the detail bar.
pub trait ListRecord {
    fn record_id(&self) -> i64;
    fn title(&self) -> String;
    fn subtitle(&self) -> String;
    fn detail_rows(&self) -> Vec<(&'static str, String)>;
}

fn or_dash(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.to_string(),
        _ => "-".into(),
    }
}

impl ListRecord for Lead {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        self.display_name()
    }

    fn subtitle(&self) -> String {
        match &self.company {
            Some(company) if !company.is_empty() => format!("{company} · {}", self.status),
            _ => self.status.clone(),
        }
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.display_name()),
            ("Company", or_dash(self.company.as_deref())),
            ("Email", or_dash(self.email.as_deref())),
            ("Phone", or_dash(self.phone.as_deref())),
            ("Status", or_dash(Some(self.status.as_str()))),
            ("Source", or_dash(self.source.as_deref())),
            (
                "Created",
                self.created_at
                    .with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string(),
            ),
        ]
    }
}

impl ListRecord for Deal {
    fn record_id(&self) -> i64 {
        self.id
    }

    fn title(&self) -> String {
        if self.name.is_empty() {
            format!("Deal #{}", self.id)
        } else {
            self.name.clone()
        }
    }

    fn subtitle(&self) -> String {
        match self.amount {
            Some(amount) => format!("{} · {amount:.2}", self.stage),
            None => self.stage.clone(),
        }
    }

    fn detail_rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("Name", self.title()),
            ("Account", or_dash(self.account_name.as_deref())),
            ("Stage", or_dash(Some(self.stage.as_str()))),
            (
                "Amount",
                self.amount.map(|a| format!("{a:.2}")).unwrap_or_else(|| "-".into()),
            ),
            (
                "Probability",
                self.probability
                    .map(|p| format!("{p}%"))
                    .unwrap_or_else(|| "-".into()),
            ),
            (
                "Close date",
                self.close_date
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "-".into()),
            ),
        ]
    }
}

/// Paginated list with a read-only detail bar for the selected record.
/// Both areas have their own resize grip.
pub struct RecordListPanel {
    paginator: Paginator,
    selected: Option<i64>,
    list: ResizeController,
    detail: ResizeController,
}

impl RecordListPanel {
    pub fn new(list: PanelKey, detail: PanelKey) -> Self {
        Self {
            paginator: Paginator::default(),
            selected: None,
            list: ResizeController::new(list),
            detail: ResizeController::new(detail),
        }
    }

    pub fn paginator(&self) -> &Paginator {
        &self.paginator
    }

    pub fn paginator_mut(&mut self) -> &mut Paginator {
        &mut self.paginator
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Bind the detail bar to `id`, replacing any previous binding.
    pub fn select(&mut self, id: i64) {
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn list_resize(&mut self) -> &mut ResizeController {
        &mut self.list
    }

    pub fn detail_resize(&mut self) -> &mut ResizeController {
        &mut self.detail
    }

    /// Keep cursor and selection valid for the current items.
    pub fn sync<T: ListRecord>(&mut self, items: &[T]) {
        self.paginator.clamp(items.len());
        if let Some(id) = self.selected {
            if !items.iter().any(|r| r.record_id() == id) {
                self.selected = None;
            }
        }
    }

    pub fn selected_record<'a, T: ListRecord>(&self, items: &'a [T]) -> Option<&'a T> {
        let id = self.selected?;
        items.iter().find(|r| r.record_id() == id)
    }

    pub fn teardown(&mut self) {
        self.list.pointer_up();
        self.detail.pointer_up();
    }

    pub fn show<T: ListRecord>(&mut self, ui: &mut egui::Ui, items: &[T], empty_text: &str) {
        self.sync(items);
        let len = items.len();
        let paginator = self.paginator;
        let multi_page = paginator.has_multiple_pages(len);
        let list_height = self.list.height() as f32;
        let mut clicked = None;
        let mut jump = None;

        ui.horizontal_top(|ui| {
            let width = if multi_page {
                (ui.available_width() - PAGE_SIDEBAR_WIDTH).max(0.0)
            } else {
                ui.available_width()
            };
            ui.allocate_ui(egui::vec2(width, list_height), |ui| {
                ui.set_min_height(list_height);
                ui.vertical(|ui| {
                    if items.is_empty() {
                        ui.weak(empty_text);
                        return;
                    }
                    for record in paginator.items(items) {
                        let id = record.record_id();
                        let resp = ui.selectable_label(self.selected == Some(id), record.title());
                        ui.small(record.subtitle());
                        if resp.clicked() {
                            clicked = Some(id);
                        }
                        ui.add_space(4.0);
                    }
                });
            });
            if multi_page {
                ui.vertical(|ui| {
                    for page in 0..paginator.page_count(len) {
                        let label = (page + 1).to_string();
                        if ui.selectable_label(page == paginator.page(), label).clicked() {
                            jump = Some(page);
                        }
                    }
                });
            }
        });

        if multi_page {
            ui.horizontal(|ui| {
                if ui
                    .add_enabled(paginator.has_prev(), egui::Button::new("◀ Prev"))
                    .clicked()
                {
                    self.paginator.prev();
                }
                ui.label(format!(
                    "Page {} of {}",
                    paginator.page() + 1,
                    paginator.page_count(len)
                ));
                if ui
                    .add_enabled(paginator.has_next(len), egui::Button::new("Next ▶"))
                    .clicked()
                {
                    self.paginator.next(len);
                }
            });
        }
        if let Some(page) = jump {
            self.paginator.jump(page, len);
        }
        if let Some(id) = clicked {
            self.select(id);
        }

        resize_grip(ui, &mut self.list);

        let Some(record) = self.selected_record(items) else {
            return;
        };
        let rows = record.detail_rows();
        let title = record.title();
        resize_grip(ui, &mut self.detail);
        let detail_height = self.detail.height() as f32;
        let mut close = false;
        egui::Frame::group(ui.style()).show(ui, |ui| {
            ui.set_min_height(detail_height);
            ui.horizontal(|ui| {
                ui.strong(title);
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    close = ui.small_button("✕").clicked();
                });
            });
            egui::ScrollArea::vertical()
                .max_height(detail_height)
                .auto_shrink([false; 2])
                .show(ui, |ui| {
                    egui::Grid::new(ui.id().with("detail-grid"))
                        .num_columns(2)
                        .show(ui, |ui| {
                            for (label, value) in rows {
                                ui.weak(label);
                                ui.label(value);
                                ui.end_row();
                            }
                        });
                });
        });
        if close {
            self.clear_selection();
        }
    }
}

/// Horizontal grip that feeds pointer positions to `controller`.
fn resize_grip(ui: &mut egui::Ui, controller: &mut ResizeController) {
    let (rect, response) = ui.allocate_exact_size(
        egui::vec2(ui.available_width(), GRIP_HEIGHT),
        egui::Sense::drag(),
    );
    let response = response.on_hover_cursor(egui::CursorIcon::ResizeVertical);
    let stroke = if controller.is_resizing() || response.hovered() {
        ui.visuals().selection.stroke
    } else {
        ui.visuals().widgets.noninteractive.bg_stroke
    };
    ui.painter().hline(rect.x_range(), rect.center().y, stroke);

    if response.drag_started() {
        if let Some(pos) = response.interact_pointer_pos() {
            controller.pointer_down(pos.y);
        }
    }
    if controller.is_resizing() && ui.input(|i| i.key_pressed(egui::Key::Escape)) {
        controller.cancel();
    }
    if controller.is_resizing() {
        if let Some(pos) = ui.ctx().pointer_latest_pos() {
            controller.pointer_move(pos.y);
        }
        if ui.input(|i| i.pointer.any_released()) {
            controller.pointer_up();
        }
    }
}
