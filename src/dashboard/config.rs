use crate::dashboard::widget_id::{BuiltInWidget, WidgetId};
use crate::storage::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

pub const ORDER_KEY: &str = "dashboard-component-order";
pub const CUSTOM_WIDGETS_KEY: &str = "dashboard-custom-components";

/// Layout seeded on first run.
pub const DEFAULT_ORDER: [BuiltInWidget; 3] = [
    BuiltInWidget::Funnel,
    BuiltInWidget::Leads,
    BuiltInWidget::Tasks,
];

/// Ids of widgets removed from the product. Stored layouts are migrated by
/// dropping them.
pub const RETIRED_WIDGET_IDS: [&str; 2] = ["pipeline-summary", "quick-actions"];

pub fn default_order() -> Vec<WidgetId> {
    DEFAULT_ORDER.iter().map(|kind| WidgetId::from(*kind)).collect()
}

/// Metadata of a user-defined widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomWidget {
    pub name: String,
    #[serde(rename = "type")]
    pub widget_type: String,
    #[serde(rename = "isPermanent", default)]
    pub is_permanent: bool,
}

impl CustomWidget {
    pub fn new(name: &str, widget_type: &str, is_permanent: bool) -> Self {
        Self {
            name: name.trim().to_string(),
            widget_type: widget_type.trim().to_string(),
            is_permanent,
        }
    }
}

/// Sorted so that saving the same map twice yields identical bytes.
pub type CustomWidgetMap = BTreeMap<WidgetId, CustomWidget>;

/// The durable part of the dashboard: widget order plus custom widget metadata.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PersistedLayout {
    pub order: Vec<WidgetId>,
    pub custom: CustomWidgetMap,
}

/// Result of reading the layout from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedLayout {
    pub layout: PersistedLayout,
    /// Set when the stored copy differs from `layout` and must be rewritten.
    pub needs_write: bool,
    pub warnings: Vec<String>,
}

impl PersistedLayout {
    pub fn seeded() -> Self {
        Self {
            order: default_order(),
            custom: CustomWidgetMap::new(),
        }
    }

    /// Read both persisted values. Never fails: unreadable or unparsable data
    /// falls back to the default seed and is reported through `warnings`.
    pub fn load(store: &dyn KeyValueStore) -> LoadedLayout {
        let mut warnings = Vec::new();
        let mut needs_write = false;

        let custom = match store.get(CUSTOM_WIDGETS_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<CustomWidgetMap>(&text) {
                Ok(map) => map,
                Err(e) => {
                    warnings.push(format!("custom widgets could not be parsed: {e}"));
                    needs_write = true;
                    CustomWidgetMap::new()
                }
            },
            Ok(None) => CustomWidgetMap::new(),
            Err(e) => {
                tracing::error!(error = %e, "failed to read custom widgets");
                warnings.push(format!("custom widgets could not be read: {e}"));
                CustomWidgetMap::new()
            }
        };

        let order = match store.get(ORDER_KEY) {
            Ok(Some(text)) => match serde_json::from_str::<Vec<WidgetId>>(&text) {
                Ok(order) => order,
                Err(e) => {
                    warnings.push(format!("widget order could not be parsed, using defaults: {e}"));
                    needs_write = true;
                    default_order()
                }
            },
            Ok(None) => {
                needs_write = true;
                default_order()
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to read widget order");
                warnings.push(format!("widget order could not be read, using defaults: {e}"));
                default_order()
            }
        };

        let mut layout = Self { order, custom };
        let sanitize_warnings = layout.sanitize();
        if !sanitize_warnings.is_empty() {
            needs_write = true;
        }
        warnings.extend(sanitize_warnings);
        for w in &warnings {
            tracing::warn!("{w}");
        }
        LoadedLayout {
            layout,
            needs_write,
            warnings,
        }
    }

    /// Rewrite both values in full.
    pub fn save(&self, store: &mut dyn KeyValueStore) -> anyhow::Result<()> {
        store.set(ORDER_KEY, &self.order_json()?)?;
        store.set(CUSTOM_WIDGETS_KEY, &self.custom_json()?)?;
        Ok(())
    }

    pub fn order_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.order)?)
    }

    pub fn custom_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&self.custom)?)
    }

    /// Drop retired, unknown and repeated ids and custom entries outside the
    /// user-defined namespaces. Returns one warning per change.
    pub fn sanitize(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();
        self.migrate_retired_widgets(&mut warnings);

        self.custom.retain(|id, _| {
            if id.is_user_defined() {
                return true;
            }
            warnings.push(format!(
                "custom widget entry '{id}' has no custom namespace and was dropped"
            ));
            false
        });

        let mut seen = HashSet::new();
        let custom = &self.custom;
        self.order.retain(|id| {
            let known = id.built_in().is_some() || custom.contains_key(id);
            if !known {
                warnings.push(format!("unknown dashboard widget '{id}' dropped"));
                return false;
            }
            if !seen.insert(id.clone()) {
                warnings.push(format!("duplicate dashboard widget '{id}' dropped"));
                return false;
            }
            true
        });
        warnings
    }

    fn migrate_retired_widgets(&mut self, warnings: &mut Vec<String>) {
        self.order.retain(|id| {
            if RETIRED_WIDGET_IDS.contains(&id.as_str()) {
                warnings.push(format!("retired dashboard widget '{id}' removed"));
                false
            } else {
                true
            }
        });
    }
}
