use crate::dashboard::widget_id::WidgetId;
use std::collections::HashMap;

/// What is remembered about a removed widget so it can be put back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedWidget {
    pub name: String,
    pub widget_type: String,
    pub original_position: usize,
}

/// Session-scoped record of soft-deleted widgets.
#[derive(Debug, Default, Clone)]
pub struct DeletionLedger {
    entries: HashMap<WidgetId, DeletedWidget>,
}

impl DeletionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, id: WidgetId, entry: DeletedWidget) {
        self.entries.insert(id, entry);
    }

    pub fn take(&mut self, id: &WidgetId) -> Option<DeletedWidget> {
        self.entries.remove(id)
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries ordered by their original position, for the recovery list.
    pub fn entries(&self) -> Vec<(&WidgetId, &DeletedWidget)> {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_by(|a, b| {
            a.1.original_position
                .cmp(&b.1.original_position)
                .then_with(|| a.0.cmp(b.0))
        });
        entries
    }
}
