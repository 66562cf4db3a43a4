use crate::dashboard::data_cache::{DashboardDataSnapshot, DataKind};
use crate::dashboard::drag::DragReorderController;
use crate::dashboard::error::DashboardError;
use crate::dashboard::layout::{LayoutStore, WidgetDescriptor};
use crate::dashboard::widget_id::WidgetId;
use crate::dashboard::widgets::{resolve_widget, Widget, WidgetAction, WidgetRegistry};
use eframe::egui;
use std::collections::{HashMap, HashSet};

const MIN_CARD_WIDTH: f32 = 360.0;
const MAX_COLUMNS: usize = 3;

/// Context shared with widgets at render time.
pub struct DashboardContext<'a> {
    pub data: &'a DashboardDataSnapshot,
    pub loading: &'a HashSet<DataKind>,
}

impl DashboardContext<'_> {
    pub fn is_loading(&self, kind: DataKind) -> bool {
        self.loading.contains(&kind)
    }
}

/// Outcomes of user interaction the host surfaces as toasts or dialogs.
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    EditRequested(WidgetId),
    Deleted { id: WidgetId, name: String },
    Removed(WidgetId),
    Reordered { from: WidgetId, to: WidgetId },
    Rejected(DashboardError),
    Info(String),
    RefreshRequested,
}

enum CardCommand {
    Edit(WidgetId),
    Delete(WidgetId),
    Remove(WidgetId),
    DragStart(WidgetId),
    Widget(WidgetAction),
}

struct SlotRuntime {
    descriptor: WidgetDescriptor,
    widget: Box<dyn Widget>,
}

/// The widget grid: layout store, drag controller and live widget instances.
pub struct Dashboard {
    store: LayoutStore,
    drag: DragReorderController,
    registry: WidgetRegistry,
    runtime: HashMap<WidgetId, SlotRuntime>,
}

impl Dashboard {
    pub fn new(store: LayoutStore, registry: WidgetRegistry) -> Self {
        let mut dashboard = Self {
            store,
            drag: DragReorderController::new(),
            registry,
            runtime: HashMap::new(),
        };
        dashboard.sync_runtime();
        dashboard
    }

    pub fn store(&self) -> &LayoutStore {
        &self.store
    }

    /// Mutable access to the layout. Widget instances catch up on the next
    /// frame.
    pub fn store_mut(&mut self) -> &mut LayoutStore {
        &mut self.store
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    pub fn drag(&self) -> &DragReorderController {
        &self.drag
    }

    pub fn reorder_mode(&self) -> bool {
        self.drag.reorder_mode()
    }

    pub fn set_reorder_mode(&mut self, enabled: bool) {
        self.drag.set_reorder_mode(enabled);
    }

    /// Ids with a live widget instance, in display order.
    pub fn rendered_ids(&self) -> Vec<WidgetId> {
        self.store
            .order()
            .iter()
            .filter(|id| self.runtime.contains_key(*id))
            .cloned()
            .collect()
    }

    pub fn request_edit(&self, id: &WidgetId) -> DashboardEvent {
        if id.built_in().is_some() {
            return DashboardEvent::Info(format!(
                "'{}' is a built-in widget and cannot be edited",
                self.title(id)
            ));
        }
        DashboardEvent::EditRequested(id.clone())
    }

    pub fn request_delete(&mut self, id: &WidgetId) -> DashboardEvent {
        match self.store.soft_delete(id) {
            Ok(entry) => {
                self.sync_runtime();
                DashboardEvent::Deleted {
                    id: id.clone(),
                    name: entry.name,
                }
            }
            Err(e) => DashboardEvent::Rejected(e),
        }
    }

    pub fn request_remove(&mut self, id: &WidgetId) -> DashboardEvent {
        match self.store.delete_custom_widget(id) {
            Ok(()) => {
                self.sync_runtime();
                DashboardEvent::Removed(id.clone())
            }
            Err(e) => DashboardEvent::Rejected(e),
        }
    }

    pub fn begin_drag(&mut self, id: &WidgetId) -> bool {
        self.store.contains(id) && self.drag.drag_start(id)
    }

    pub fn hover(&mut self, id: &WidgetId) {
        if self.drag.hovered() != Some(id) {
            self.drag.drag_enter(id);
        }
    }

    /// Finish the active drag over `target`, or abort it when there is none.
    pub fn drop_on(&mut self, target: Option<&WidgetId>) -> Option<DashboardEvent> {
        let Some(target) = target else {
            self.drag.drag_end();
            return None;
        };
        let request = self.drag.drop_on(target)?;
        if !self.store.reorder(&request.from, &request.to) {
            return None;
        }
        Some(DashboardEvent::Reordered {
            from: request.from,
            to: request.to,
        })
    }

    fn title(&self, id: &WidgetId) -> String {
        match self.runtime.get(id).map(|slot| &slot.descriptor) {
            Some(WidgetDescriptor::BuiltIn(kind)) => kind.name().to_string(),
            Some(WidgetDescriptor::UserDefined { name, .. }) => name.clone(),
            None => id
                .built_in()
                .map(|kind| kind.name().to_string())
                .unwrap_or_else(|| id.to_string()),
        }
    }

    /// Bring widget instances in line with the layout. Instances whose id
    /// left the layout, or whose metadata changed, are torn down.
    fn sync_runtime(&mut self) {
        let mut next = HashMap::new();
        for id in self.store.order() {
            let Some(descriptor) = resolve_widget(id, &self.store, &self.registry) else {
                continue;
            };
            let slot = match self.runtime.remove(id) {
                Some(slot) if slot.descriptor == descriptor => Some(slot),
                previous => {
                    if let Some(mut stale) = previous {
                        stale.widget.teardown();
                    }
                    self.registry
                        .create(&descriptor)
                        .map(|widget| SlotRuntime { descriptor, widget })
                }
            };
            if let Some(slot) = slot {
                next.insert(id.clone(), slot);
            }
        }
        for (id, mut slot) in self.runtime.drain() {
            tracing::debug!(widget = %id, "widget torn down");
            slot.widget.teardown();
        }
        self.runtime = next;
        if let Some(dragged) = self.drag.dragged() {
            if !self.store.contains(dragged) {
                self.drag.drag_end();
            }
        }
    }

    pub fn ui(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Vec<DashboardEvent> {
        self.sync_runtime();
        let ids = self.rendered_ids();
        if ids.is_empty() {
            ui.weak("No widgets on the dashboard. Use \"Add widget\" to add one.");
            return Vec::new();
        }

        let cols = ((ui.available_width() / MIN_CARD_WIDTH).floor() as usize).clamp(1, MAX_COLUMNS);
        let reorder_mode = self.drag.reorder_mode();
        let mut commands = Vec::new();
        let mut rects = Vec::with_capacity(ids.len());

        for row in ids.chunks(cols) {
            ui.columns(cols, |columns| {
                for (col, id) in row.iter().enumerate() {
                    let Some(slot) = self.runtime.get_mut(id) else {
                        continue;
                    };
                    let card = CardState {
                        id,
                        permanent: self.store.is_permanent(id),
                        reorder_mode,
                        dragged: self.drag.dragged() == Some(id),
                        hovered: self.drag.hovered() == Some(id),
                    };
                    let rect = render_card(&mut columns[col], slot, &card, ctx, &mut commands);
                    rects.push((id.clone(), rect));
                }
            });
            ui.add_space(8.0);
        }

        let mut events = Vec::new();
        if self.drag.is_dragging() {
            let pointer = ui.ctx().pointer_latest_pos();
            let over = pointer.and_then(|pos| {
                rects
                    .iter()
                    .find(|(_, rect)| rect.contains(pos))
                    .map(|(id, _)| id.clone())
            });
            if let Some(id) = &over {
                self.hover(id);
            }
            if ui.input(|i| i.pointer.any_released()) {
                events.extend(self.drop_on(over.as_ref()));
            }
        }

        for command in commands {
            match command {
                CardCommand::Edit(id) => events.push(self.request_edit(&id)),
                CardCommand::Delete(id) => events.push(self.request_delete(&id)),
                CardCommand::Remove(id) => events.push(self.request_remove(&id)),
                CardCommand::DragStart(id) => {
                    self.begin_drag(&id);
                }
                CardCommand::Widget(WidgetAction::Refresh) => {
                    events.push(DashboardEvent::RefreshRequested)
                }
            }
        }
        events
    }

    /// Release gestures held by the drag controller and every widget.
    pub fn teardown(&mut self) {
        self.drag.drag_end();
        for slot in self.runtime.values_mut() {
            slot.widget.teardown();
        }
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        self.teardown();
    }
}

struct CardState<'a> {
    id: &'a WidgetId,
    permanent: bool,
    reorder_mode: bool,
    dragged: bool,
    hovered: bool,
}

fn render_card(
    ui: &mut egui::Ui,
    slot: &mut SlotRuntime,
    card: &CardState<'_>,
    ctx: &DashboardContext<'_>,
    commands: &mut Vec<CardCommand>,
) -> egui::Rect {
    let mut frame = egui::Frame::group(ui.style());
    if card.hovered {
        frame = frame.stroke(ui.visuals().selection.stroke);
    } else if card.dragged {
        frame = frame.fill(ui.visuals().faint_bg_color);
    }
    let (title, user_defined) = match &slot.descriptor {
        WidgetDescriptor::BuiltIn(kind) => (kind.name().to_string(), false),
        WidgetDescriptor::UserDefined { name, .. } => (name.clone(), true),
    };

    let response = frame.show(ui, |ui| {
        ui.set_width(ui.available_width());
        ui.horizontal(|ui| {
            if card.reorder_mode {
                let handle = ui
                    .add(egui::Label::new("☰").sense(egui::Sense::drag()))
                    .on_hover_cursor(egui::CursorIcon::Grab);
                if handle.drag_started() {
                    commands.push(CardCommand::DragStart(card.id.clone()));
                }
            }
            ui.heading(&title);
            if card.reorder_mode {
                return;
            }
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.menu_button("⋮", |ui| {
                    if ui.button("Edit").clicked() {
                        commands.push(CardCommand::Edit(card.id.clone()));
                        ui.close_menu();
                    }
                    if !card.permanent {
                        if ui.button("Delete").clicked() {
                            commands.push(CardCommand::Delete(card.id.clone()));
                            ui.close_menu();
                        }
                        if user_defined && ui.button("Delete permanently").clicked() {
                            commands.push(CardCommand::Remove(card.id.clone()));
                            ui.close_menu();
                        }
                    }
                });
            });
        });
        ui.separator();
        if let Some(action) = slot.widget.render(ui, ctx) {
            commands.push(CardCommand::Widget(action));
        }
    });
    response.response.rect
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::widget_id::BuiltInWidget;
    use crate::dashboard::widgets::WidgetFactory;
    use crate::storage::MemoryStore;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEARDOWNS: AtomicUsize = AtomicUsize::new(0);

    struct CountingWidget;

    impl Widget for CountingWidget {
        fn render(
            &mut self,
            ui: &mut egui::Ui,
            _ctx: &DashboardContext<'_>,
        ) -> Option<WidgetAction> {
            ui.label("counting");
            None
        }

        fn teardown(&mut self) {
            TEARDOWNS.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(
            LayoutStore::hydrate(Box::new(MemoryStore::new())),
            WidgetRegistry::with_defaults(),
        )
    }

    fn id(s: &str) -> WidgetId {
        WidgetId::from(s)
    }

    fn order(d: &Dashboard) -> Vec<&str> {
        d.store().order().iter().map(WidgetId::as_str).collect()
    }

    fn render(d: &mut Dashboard) -> Vec<DashboardEvent> {
        let data = DashboardDataSnapshot::default();
        let loading = HashSet::new();
        let ctx = DashboardContext {
            data: &data,
            loading: &loading,
        };
        let mut events = Vec::new();
        egui::__run_test_ui(|ui| {
            events = d.ui(ui, &ctx);
        });
        events
    }

    #[test]
    fn renders_seeded_layout_in_order() {
        let mut d = dashboard();
        assert!(render(&mut d).is_empty());
        assert_eq!(d.rendered_ids(), vec![id("funnel"), id("leads"), id("tasks")]);
    }

    #[test]
    fn ids_without_metadata_draw_nothing() {
        let mut store = LayoutStore::hydrate(Box::new(MemoryStore::new()));
        let custom = store.create_custom_widget("Goals", "Targets", false).unwrap();
        let mut d = Dashboard::new(store, WidgetRegistry::with_defaults());
        d.store_mut().delete_custom_widget(&custom).unwrap();
        render(&mut d);
        assert!(!d.rendered_ids().contains(&custom));
    }

    #[test]
    fn drop_on_other_card_reorders() {
        let mut d = dashboard();
        d.set_reorder_mode(true);
        assert!(d.begin_drag(&id("tasks")));
        d.hover(&id("funnel"));
        let event = d.drop_on(Some(&id("funnel")));
        assert_eq!(
            event,
            Some(DashboardEvent::Reordered {
                from: id("tasks"),
                to: id("funnel")
            })
        );
        assert_eq!(order(&d), vec!["tasks", "funnel", "leads"]);
    }

    #[test]
    fn drag_requires_reorder_mode_and_aborts_without_target() {
        let mut d = dashboard();
        assert!(!d.begin_drag(&id("leads")));
        d.set_reorder_mode(true);
        assert!(d.begin_drag(&id("leads")));
        assert_eq!(d.drop_on(None), None);
        assert!(!d.drag().is_dragging());
        assert_eq!(order(&d), vec!["funnel", "leads", "tasks"]);
    }

    #[test]
    fn editing_built_in_is_informational() {
        let d = dashboard();
        assert!(matches!(d.request_edit(&id("leads")), DashboardEvent::Info(_)));
    }

    #[test]
    fn permanent_widget_delete_is_rejected() {
        let mut d = dashboard();
        let pinned = d
            .store_mut()
            .create_custom_widget("Weekly Pipeline", "Pipeline tracking", true)
            .unwrap();
        let event = d.request_delete(&pinned);
        assert_eq!(
            event,
            DashboardEvent::Rejected(DashboardError::PermanentWidget(pinned.clone()))
        );
        assert!(d.store().contains(&pinned));
    }

    #[test]
    fn deleted_widget_is_torn_down() {
        let mut registry = WidgetRegistry::with_defaults();
        registry.register(BuiltInWidget::Tasks, WidgetFactory::new(|| CountingWidget));
        let mut d = Dashboard::new(LayoutStore::hydrate(Box::new(MemoryStore::new())), registry);
        render(&mut d);
        let before = TEARDOWNS.load(Ordering::SeqCst);
        let event = d.request_delete(&id("tasks"));
        assert!(matches!(event, DashboardEvent::Deleted { .. }));
        assert_eq!(TEARDOWNS.load(Ordering::SeqCst), before + 1);
        assert!(!d.rendered_ids().contains(&id("tasks")));
    }
}
