use crate::dashboard::widget_id::WidgetId;

/// Rejected layout requests. The layout is left untouched whenever one of
/// these is returned; the text is what the user sees.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DashboardError {
    #[error("{0}")]
    Validation(String),
    #[error("Widget '{0}' is already on the dashboard")]
    DuplicateWidget(WidgetId),
    #[error("Built-in widget '{0}' cannot be edited")]
    NotEditable(WidgetId),
    #[error("Widget '{0}' is permanent and cannot be deleted")]
    PermanentWidget(WidgetId),
    #[error("Widget '{0}' is not on the dashboard")]
    NotInLayout(WidgetId),
    #[error("Widget '{0}' has no deleted entry to restore")]
    NotDeleted(WidgetId),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
