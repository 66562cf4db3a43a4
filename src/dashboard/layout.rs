use crate::dashboard::catalog::CatalogEntry;
use crate::dashboard::config::{default_order, CustomWidget, CustomWidgetMap, PersistedLayout};
use crate::dashboard::error::{DashboardError, DashboardResult};
use crate::dashboard::ledger::{DeletedWidget, DeletionLedger};
use crate::dashboard::widget_id::{BuiltInWidget, WidgetId};
use crate::storage::KeyValueStore;
use std::sync::{Arc, Mutex, MutexGuard};

/// Built-in widgets exempt from deletion. Intentionally empty.
pub const PERMANENT_BUILT_INS: [BuiltInWidget; 0] = [];

fn system_clock() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Resolved view of a widget id: either a shipped widget or user metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetDescriptor {
    BuiltIn(BuiltInWidget),
    UserDefined {
        id: WidgetId,
        name: String,
        widget_type: String,
        permanent: bool,
    },
}

/// Owner of the widget order and custom widget metadata.
///
/// Every successful mutation is written through to the backing store before
/// the call returns. Write failures are logged and remembered in
/// [`LayoutStore::last_persist_error`]; the in-memory change is kept.
pub struct LayoutStore {
    layout: PersistedLayout,
    ledger: DeletionLedger,
    store: Box<dyn KeyValueStore>,
    clock: fn() -> i64,
    warnings: Vec<String>,
    last_persist_error: Option<String>,
}

impl LayoutStore {
    pub fn hydrate(store: Box<dyn KeyValueStore>) -> Self {
        let loaded = PersistedLayout::load(store.as_ref());
        let mut this = Self {
            layout: loaded.layout,
            ledger: DeletionLedger::new(),
            store,
            clock: system_clock,
            warnings: loaded.warnings,
            last_persist_error: None,
        };
        if loaded.needs_write {
            this.persist();
        }
        tracing::info!(widgets = this.layout.order.len(), "dashboard layout hydrated");
        this
    }

    /// Replace the timestamp source used for generated ids.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn order(&self) -> &[WidgetId] {
        &self.layout.order
    }

    pub fn custom_widgets(&self) -> &CustomWidgetMap {
        &self.layout.custom
    }

    pub fn custom_widget(&self, id: &WidgetId) -> Option<&CustomWidget> {
        self.layout.custom.get(id)
    }

    pub fn ledger(&self) -> &DeletionLedger {
        &self.ledger
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.layout.order.contains(id)
    }

    pub fn position(&self, id: &WidgetId) -> Option<usize> {
        self.layout.order.iter().position(|w| w == id)
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn last_persist_error(&self) -> Option<&str> {
        self.last_persist_error.as_deref()
    }

    pub fn backing_store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    pub fn descriptor(&self, id: &WidgetId) -> Option<WidgetDescriptor> {
        if id.is_user_defined() {
            let custom = self.layout.custom.get(id)?;
            return Some(WidgetDescriptor::UserDefined {
                id: id.clone(),
                name: custom.name.clone(),
                widget_type: custom.widget_type.clone(),
                permanent: self.is_permanent(id),
            });
        }
        id.built_in().map(WidgetDescriptor::BuiltIn)
    }

    /// Permanence comes from the stored flag; the `permanent-` prefix alone
    /// does not make a widget permanent.
    pub fn is_permanent(&self, id: &WidgetId) -> bool {
        if let Some(kind) = id.built_in() {
            return PERMANENT_BUILT_INS.contains(&kind);
        }
        id.is_user_defined()
            && self
                .layout
                .custom
                .get(id)
                .map(|c| c.is_permanent)
                .unwrap_or(false)
    }

    pub fn create_custom_widget(
        &mut self,
        name: &str,
        widget_type: &str,
        is_permanent: bool,
    ) -> DashboardResult<WidgetId> {
        validate_fields(name, widget_type)?;
        let id = self.next_generated_id(is_permanent);
        self.layout
            .custom
            .insert(id.clone(), CustomWidget::new(name, widget_type, is_permanent));
        self.layout.order.push(id.clone());
        tracing::info!(widget = %id, permanent = is_permanent, "custom widget created");
        self.persist();
        Ok(id)
    }

    pub fn create_from_catalog(&mut self, entry: &CatalogEntry) -> DashboardResult<WidgetId> {
        if !entry.built_in {
            return self.create_custom_widget(&entry.name, &entry.description, false);
        }
        let id = WidgetId::new(entry.id.as_str());
        if id.built_in().is_none() {
            return Err(DashboardError::Validation(format!(
                "'{}' is not a built-in widget",
                entry.id
            )));
        }
        if self.contains(&id) {
            tracing::warn!(widget = %id, "duplicate widget add rejected");
            return Err(DashboardError::DuplicateWidget(id));
        }
        // Re-adding a soft-deleted built-in supersedes its pending restore.
        self.ledger.take(&id);
        self.layout.order.push(id.clone());
        tracing::info!(widget = %id, "catalog widget added");
        self.persist();
        Ok(id)
    }

    pub fn edit_custom_widget(
        &mut self,
        id: &WidgetId,
        name: &str,
        widget_type: &str,
        is_permanent: bool,
    ) -> DashboardResult<()> {
        if id.built_in().is_some() {
            return Err(DashboardError::NotEditable(id.clone()));
        }
        validate_fields(name, widget_type)?;
        let Some(entry) = self.layout.custom.get_mut(id) else {
            return Err(DashboardError::NotInLayout(id.clone()));
        };
        *entry = CustomWidget::new(name, widget_type, is_permanent);
        tracing::info!(widget = %id, "custom widget edited");
        self.persist();
        Ok(())
    }

    /// Move `from` to the index `to` occupies before the move.
    ///
    /// Returns `false` without touching the layout when the ids are equal or
    /// either one is absent.
    pub fn reorder(&mut self, from: &WidgetId, to: &WidgetId) -> bool {
        if from == to {
            return false;
        }
        let (Some(from_idx), Some(to_idx)) = (self.position(from), self.position(to)) else {
            return false;
        };
        let moved = self.layout.order.remove(from_idx);
        self.layout.order.insert(to_idx, moved);
        tracing::info!(widget = %from, from = from_idx, to = to_idx, "widget reordered");
        self.persist();
        true
    }

    /// Remove a widget from the layout, remembering where it was.
    pub fn soft_delete(&mut self, id: &WidgetId) -> DashboardResult<DeletedWidget> {
        let Some(position) = self.position(id) else {
            return Err(DashboardError::NotInLayout(id.clone()));
        };
        if self.is_permanent(id) {
            return Err(DashboardError::PermanentWidget(id.clone()));
        }
        let (name, widget_type) = self.display_fields(id);
        let entry = DeletedWidget {
            name,
            widget_type,
            original_position: position,
        };
        self.layout.order.remove(position);
        self.ledger.record(id.clone(), entry.clone());
        tracing::info!(widget = %id, position, "widget soft-deleted");
        self.persist();
        Ok(entry)
    }

    /// Put a soft-deleted widget back at its remembered index, clamped to the
    /// current length. Returns the index it was inserted at.
    pub fn recover(&mut self, id: &WidgetId) -> DashboardResult<usize> {
        let Some(entry) = self.ledger.take(id) else {
            return Err(DashboardError::NotDeleted(id.clone()));
        };
        let index = entry.original_position.min(self.layout.order.len());
        self.layout.order.insert(index, id.clone());
        tracing::info!(widget = %id, index, "widget recovered");
        self.persist();
        Ok(index)
    }

    /// Remove a non-permanent user-defined widget and its metadata for good.
    pub fn delete_custom_widget(&mut self, id: &WidgetId) -> DashboardResult<()> {
        if !id.is_user_defined() {
            return Err(DashboardError::NotEditable(id.clone()));
        }
        if self.is_permanent(id) {
            return Err(DashboardError::PermanentWidget(id.clone()));
        }
        if self.layout.custom.remove(id).is_none() {
            return Err(DashboardError::NotInLayout(id.clone()));
        }
        self.layout.order.retain(|w| w != id);
        self.ledger.take(id);
        tracing::info!(widget = %id, "custom widget deleted");
        self.persist();
        Ok(())
    }

    /// Restore the seeded order. Custom metadata is kept; pending restores are dropped.
    pub fn reset_to_default(&mut self) {
        self.layout.order = default_order();
        self.ledger.clear();
        tracing::info!("dashboard layout reset");
        self.persist();
    }

    pub fn into_shared(self) -> SharedLayoutStore {
        SharedLayoutStore {
            inner: Arc::new(Mutex::new(self)),
        }
    }

    fn display_fields(&self, id: &WidgetId) -> (String, String) {
        if let Some(custom) = self.layout.custom.get(id) {
            return (custom.name.clone(), custom.widget_type.clone());
        }
        match id.built_in() {
            Some(kind) => (kind.name().to_string(), kind.widget_type().to_string()),
            None => (id.to_string(), String::new()),
        }
    }

    fn next_generated_id(&self, permanent: bool) -> WidgetId {
        let mut ts = (self.clock)();
        loop {
            let id = WidgetId::generated(permanent, ts);
            let taken = self.layout.custom.contains_key(&id)
                || self.layout.order.contains(&id)
                || self.ledger.contains(&id);
            if !taken {
                return id;
            }
            ts += 1;
        }
    }

    fn persist(&mut self) {
        match self.layout.save(self.store.as_mut()) {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::error!(error = %e, "failed to persist dashboard layout");
                self.last_persist_error = Some(e.to_string());
            }
        }
    }
}

fn validate_fields(name: &str, widget_type: &str) -> DashboardResult<()> {
    if name.trim().is_empty() || widget_type.trim().is_empty() {
        return Err(DashboardError::Validation(
            "Please fill in both the widget name and type".into(),
        ));
    }
    Ok(())
}

/// Layout store behind a single-writer lock, for callers on several threads.
/// Each closure runs to completion before the next one starts, so mutations
/// apply in lock-acquisition order and never interleave.
#[derive(Clone)]
pub struct SharedLayoutStore {
    inner: Arc<Mutex<LayoutStore>>,
}

impl SharedLayoutStore {
    pub fn update<R>(&self, f: impl FnOnce(&mut LayoutStore) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    pub fn read<R>(&self, f: impl FnOnce(&LayoutStore) -> R) -> R {
        let guard = self.lock();
        f(&*guard)
    }

    fn lock(&self) -> MutexGuard<'_, LayoutStore> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
