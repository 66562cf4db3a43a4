pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod data_cache;
pub mod drag;
pub mod error;
pub mod layout;
pub mod ledger;
pub mod resize;
pub mod widget_id;
pub mod widgets;

pub use catalog::{default_catalog, CatalogEntry};
pub use dashboard::{Dashboard, DashboardContext, DashboardEvent};
pub use data_cache::{DashboardDataCache, DashboardDataSnapshot, DataKind};
pub use error::{DashboardError, DashboardResult};
pub use layout::{LayoutStore, SharedLayoutStore, WidgetDescriptor};
pub use widget_id::{BuiltInWidget, WidgetId};
pub use widgets::{WidgetAction, WidgetFactory, WidgetRegistry};
