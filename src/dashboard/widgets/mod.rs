use crate::dashboard::dashboard::DashboardContext;
use crate::dashboard::layout::{LayoutStore, WidgetDescriptor};
use crate::dashboard::widget_id::{BuiltInWidget, WidgetId};
use eframe::egui;
use std::collections::HashMap;
use std::sync::Arc;

mod closing_deals;
mod custom;
mod funnel;
mod leads;
mod placeholder;
mod record_list;

pub use closing_deals::ClosingDealsWidget;
pub use custom::CustomWidgetPanel;
pub use funnel::{funnel_rows, FunnelRow, FunnelWidget};
pub use leads::LeadsWidget;
pub use placeholder::PlaceholderWidget;
pub use record_list::{ListRecord, RecordListPanel};

/// Requests a widget hands back to the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetAction {
    Refresh,
}

/// Widget trait implemented by all dashboard panels.
pub trait Widget: Send {
    fn render(&mut self, ui: &mut egui::Ui, ctx: &DashboardContext<'_>) -> Option<WidgetAction>;

    /// Release any in-flight pointer gesture. Called before the widget is
    /// dropped from the dashboard.
    fn teardown(&mut self) {}
}

/// Builds fresh instances of one built-in widget.
#[derive(Clone)]
pub struct WidgetFactory {
    ctor: Arc<dyn Fn() -> Box<dyn Widget> + Send + Sync>,
}

impl WidgetFactory {
    pub fn new<T: Widget + 'static>(build: fn() -> T) -> Self {
        Self {
            ctor: Arc::new(move || Box::new(build()) as Box<dyn Widget>),
        }
    }

    pub fn create(&self) -> Box<dyn Widget> {
        (self.ctor)()
    }
}

#[derive(Clone, Default)]
pub struct WidgetRegistry {
    map: HashMap<BuiltInWidget, WidgetFactory>,
}

impl WidgetRegistry {
    pub fn with_defaults() -> Self {
        let mut reg = Self::default();
        reg.register(BuiltInWidget::Funnel, WidgetFactory::new(FunnelWidget::new));
        reg.register(BuiltInWidget::Leads, WidgetFactory::new(LeadsWidget::new));
        reg.register(
            BuiltInWidget::ClosingDeals,
            WidgetFactory::new(ClosingDealsWidget::new),
        );
        reg.register(BuiltInWidget::Tasks, WidgetFactory::new(PlaceholderWidget::tasks));
        reg.register(
            BuiltInWidget::Reports,
            WidgetFactory::new(PlaceholderWidget::reports),
        );
        reg.register(
            BuiltInWidget::Activities,
            WidgetFactory::new(PlaceholderWidget::activities),
        );
        reg.register(BuiltInWidget::Charts, WidgetFactory::new(PlaceholderWidget::charts));
        reg
    }

    pub fn register(&mut self, kind: BuiltInWidget, factory: WidgetFactory) {
        self.map.insert(kind, factory);
    }

    pub fn contains(&self, kind: BuiltInWidget) -> bool {
        self.map.contains_key(&kind)
    }

    /// Instantiate the panel for a resolved descriptor.
    pub fn create(&self, descriptor: &WidgetDescriptor) -> Option<Box<dyn Widget>> {
        match descriptor {
            WidgetDescriptor::BuiltIn(kind) => self.map.get(kind).map(|f| f.create()),
            WidgetDescriptor::UserDefined {
                name,
                widget_type,
                permanent,
                ..
            } => Some(Box::new(CustomWidgetPanel::new(name, widget_type, *permanent))),
        }
    }
}

/// Decide what, if anything, to draw for `id`.
///
/// Built-in literals resolve through the registry; `custom-*` and
/// `permanent-*` ids resolve through the stored metadata. Anything else,
/// including a user-defined id whose metadata is gone, draws nothing.
pub fn resolve_widget(
    id: &WidgetId,
    store: &LayoutStore,
    registry: &WidgetRegistry,
) -> Option<WidgetDescriptor> {
    let descriptor = store.descriptor(id)?;
    match &descriptor {
        WidgetDescriptor::BuiltIn(kind) if !registry.contains(*kind) => None,
        _ => Some(descriptor),
    }
}

pub(crate) fn error_with_retry(ui: &mut egui::Ui, message: &str) -> Option<WidgetAction> {
    ui.colored_label(egui::Color32::from_rgb(200, 64, 64), message);
    ui.button("Retry").clicked().then_some(WidgetAction::Refresh)
}
