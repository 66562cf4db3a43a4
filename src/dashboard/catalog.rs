use crate::dashboard::widget_id::BuiltInWidget;

/// One entry of the "add widget" catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub built_in: bool,
}

impl CatalogEntry {
    pub fn built_in(kind: BuiltInWidget) -> Self {
        Self {
            id: kind.id().to_string(),
            name: kind.name().to_string(),
            description: kind.widget_type().to_string(),
            built_in: true,
        }
    }

    pub fn template(id: &str, name: &str, description: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            built_in: false,
        }
    }
}

pub fn default_catalog() -> Vec<CatalogEntry> {
    let mut entries: Vec<CatalogEntry> = BuiltInWidget::ALL
        .into_iter()
        .map(CatalogEntry::built_in)
        .collect();
    entries.push(CatalogEntry::template(
        "revenue-forecast",
        "Revenue Forecast",
        "Projected revenue by month",
    ));
    entries.push(CatalogEntry::template(
        "team-performance",
        "Team Performance",
        "Won deals per owner",
    ));
    entries.push(CatalogEntry::template(
        "support-queue",
        "Support Queue",
        "Open customer tickets",
    ));
    entries
}
