use serde::{Deserialize, Serialize};
use std::fmt;

pub const CUSTOM_PREFIX: &str = "custom-";
pub const PERMANENT_PREFIX: &str = "permanent-";

/// Identifier of one dashboard panel, persisted verbatim in the order list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WidgetId(String);

/// Namespace of an id, derived from its text alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetNamespace {
    BuiltIn(BuiltInWidget),
    Custom,
    Permanent,
    Unknown,
}

impl WidgetId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generated id for a user-defined widget.
    pub fn generated(permanent: bool, timestamp_ms: i64) -> Self {
        let prefix = if permanent {
            PERMANENT_PREFIX
        } else {
            CUSTOM_PREFIX
        };
        Self(format!("{prefix}{timestamp_ms}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn namespace(&self) -> WidgetNamespace {
        if self.0.starts_with(CUSTOM_PREFIX) {
            WidgetNamespace::Custom
        } else if self.0.starts_with(PERMANENT_PREFIX) {
            WidgetNamespace::Permanent
        } else if let Some(kind) = BuiltInWidget::from_id(&self.0) {
            WidgetNamespace::BuiltIn(kind)
        } else {
            WidgetNamespace::Unknown
        }
    }

    /// True for `custom-*` and `permanent-*` ids, which live in the custom widget map.
    pub fn is_user_defined(&self) -> bool {
        matches!(
            self.namespace(),
            WidgetNamespace::Custom | WidgetNamespace::Permanent
        )
    }

    pub fn built_in(&self) -> Option<BuiltInWidget> {
        match self.namespace() {
            WidgetNamespace::BuiltIn(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Display for WidgetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WidgetId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<BuiltInWidget> for WidgetId {
    fn from(value: BuiltInWidget) -> Self {
        Self::new(value.id())
    }
}

/// Widgets shipped with fixed rendering logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltInWidget {
    Funnel,
    Leads,
    Tasks,
    Reports,
    Activities,
    Charts,
    ClosingDeals,
}

impl BuiltInWidget {
    pub const ALL: [BuiltInWidget; 7] = [
        BuiltInWidget::Funnel,
        BuiltInWidget::Leads,
        BuiltInWidget::Tasks,
        BuiltInWidget::Reports,
        BuiltInWidget::Activities,
        BuiltInWidget::Charts,
        BuiltInWidget::ClosingDeals,
    ];

    pub fn id(self) -> &'static str {
        match self {
            BuiltInWidget::Funnel => "funnel",
            BuiltInWidget::Leads => "leads",
            BuiltInWidget::Tasks => "tasks",
            BuiltInWidget::Reports => "reports",
            BuiltInWidget::Activities => "activities",
            BuiltInWidget::Charts => "charts",
            BuiltInWidget::ClosingDeals => "closing-deals",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }

    /// Display name shown in headers, the catalog and the recovery list.
    pub fn name(self) -> &'static str {
        match self {
            BuiltInWidget::Funnel => "Sales Funnel",
            BuiltInWidget::Leads => "Today's Leads",
            BuiltInWidget::Tasks => "Tasks",
            BuiltInWidget::Reports => "Reports",
            BuiltInWidget::Activities => "Recent Activities",
            BuiltInWidget::Charts => "Charts",
            BuiltInWidget::ClosingDeals => "Closing Deals",
        }
    }

    pub fn widget_type(self) -> &'static str {
        match self {
            BuiltInWidget::Funnel => "Deals by stage",
            BuiltInWidget::Leads => "Lead list",
            BuiltInWidget::Tasks => "Task list",
            BuiltInWidget::Reports => "Report summary",
            BuiltInWidget::Activities => "Activity feed",
            BuiltInWidget::Charts => "Chart panel",
            BuiltInWidget::ClosingDeals => "Deal list",
        }
    }
}
