use crate::crm::api::RecordApi;
use crate::crm::filters::{closing_deals, todays_leads_cutoff};
use crate::crm::records::{Deal, Lead, StageCount};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// Domain data shown by the dashboard widgets. Cheap to clone.
#[derive(Clone, Default)]
pub struct DashboardDataSnapshot {
    pub todays_leads: Arc<Vec<Lead>>,
    pub deals: Arc<Vec<Deal>>,
    pub closing_deals: Arc<Vec<Deal>>,
    pub stage_counts: Arc<Vec<StageCount>>,
    pub errors: HashMap<DataKind, String>,
}

impl DashboardDataSnapshot {
    fn with_todays_leads(&self, leads: Vec<Lead>) -> Self {
        Self {
            todays_leads: Arc::new(leads),
            ..self.clone()
        }
    }

    fn with_deals(&self, deals: Vec<Deal>) -> Self {
        Self {
            closing_deals: Arc::new(closing_deals(&deals)),
            deals: Arc::new(deals),
            ..self.clone()
        }
    }

    fn with_stage_counts(&self, counts: Vec<StageCount>) -> Self {
        Self {
            stage_counts: Arc::new(counts),
            ..self.clone()
        }
    }

    pub fn error(&self, kind: DataKind) -> Option<&str> {
        self.errors.get(&kind).map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataKind {
    TodaysLeads,
    Deals,
    StageCounts,
}

impl DataKind {
    pub const ALL: [DataKind; 3] = [DataKind::TodaysLeads, DataKind::Deals, DataKind::StageCounts];
}

/// Ticket handed to a fetch. Only the most recently issued ticket of a kind
/// may write its result, so a slow response cannot overwrite a newer one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestToken {
    kind: DataKind,
    generation: u64,
}

impl RequestToken {
    pub fn kind(&self) -> DataKind {
        self.kind
    }
}

struct DashboardDataState {
    snapshot: Arc<DashboardDataSnapshot>,
    issued: HashMap<DataKind, u64>,
    applied: HashMap<DataKind, u64>,
    last_refresh: Option<Instant>,
}

pub struct DashboardDataCache {
    state: Mutex<DashboardDataState>,
}

impl Default for DashboardDataCache {
    fn default() -> Self {
        Self::new()
    }
}

impl DashboardDataCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(DashboardDataState {
                snapshot: Arc::new(DashboardDataSnapshot::default()),
                issued: HashMap::new(),
                applied: HashMap::new(),
                last_refresh: None,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardDataState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> Arc<DashboardDataSnapshot> {
        Arc::clone(&self.lock().snapshot)
    }

    pub fn begin(&self, kind: DataKind) -> RequestToken {
        let mut state = self.lock();
        let generation = state.issued.entry(kind).or_insert(0);
        *generation += 1;
        RequestToken {
            kind,
            generation: *generation,
        }
    }

    pub fn is_loading(&self, kind: DataKind) -> bool {
        let state = self.lock();
        let issued = state.issued.get(&kind).copied().unwrap_or(0);
        issued > state.applied.get(&kind).copied().unwrap_or(0)
    }

    pub fn apply_todays_leads(
        &self,
        token: RequestToken,
        result: Result<Vec<Lead>, String>,
    ) -> bool {
        self.apply(token, result, DashboardDataSnapshot::with_todays_leads)
    }

    pub fn apply_deals(&self, token: RequestToken, result: Result<Vec<Deal>, String>) -> bool {
        self.apply(token, result, DashboardDataSnapshot::with_deals)
    }

    pub fn apply_stage_counts(
        &self,
        token: RequestToken,
        result: Result<Vec<StageCount>, String>,
    ) -> bool {
        self.apply(token, result, DashboardDataSnapshot::with_stage_counts)
    }

    fn apply<T>(
        &self,
        token: RequestToken,
        result: Result<T, String>,
        update: fn(&DashboardDataSnapshot, T) -> DashboardDataSnapshot,
    ) -> bool {
        let mut state = self.lock();
        if state.issued.get(&token.kind).copied() != Some(token.generation) {
            tracing::debug!(
                kind = ?token.kind,
                generation = token.generation,
                "stale response discarded"
            );
            return false;
        }
        let next = match result {
            Ok(value) => {
                let mut next = update(&state.snapshot, value);
                next.errors.remove(&token.kind);
                next
            }
            Err(message) => {
                tracing::warn!(kind = ?token.kind, %message, "dashboard data fetch failed");
                let mut next = (*state.snapshot).clone();
                next.errors.insert(token.kind, message);
                next
            }
        };
        state.snapshot = Arc::new(next);
        state.applied.insert(token.kind, token.generation);
        true
    }

    pub fn refresh_due(&self, interval: Duration) -> bool {
        match self.lock().last_refresh {
            Some(at) => at.elapsed() >= interval,
            None => true,
        }
    }

    /// Fetch every data kind on background threads. `on_update` runs after
    /// each applied result, typically to request a repaint.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        api: Arc<dyn RecordApi>,
        on_update: Option<Arc<dyn Fn() + Send + Sync>>,
    ) {
        self.lock().last_refresh = Some(Instant::now());
        for kind in DataKind::ALL {
            let token = self.begin(kind);
            let cache = Arc::clone(self);
            let api = Arc::clone(&api);
            let on_update = on_update.clone();
            std::thread::spawn(move || {
                let applied = match kind {
                    DataKind::TodaysLeads => cache.apply_todays_leads(
                        token,
                        api.leads_since(todays_leads_cutoff())
                            .map_err(|e| e.to_string()),
                    ),
                    DataKind::Deals => {
                        cache.apply_deals(token, api.deals().map_err(|e| e.to_string()))
                    }
                    DataKind::StageCounts => cache.apply_stage_counts(
                        token,
                        api.deals_by_stage().map_err(|e| e.to_string()),
                    ),
                };
                if applied {
                    if let Some(cb) = &on_update {
                        cb();
                    }
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deal(id: i64, stage: &str) -> Deal {
        Deal {
            id,
            name: format!("Deal {id}"),
            stage: stage.into(),
            amount: None,
            probability: None,
            account_name: None,
            close_date: None,
        }
    }

    #[test]
    fn stale_response_is_discarded() {
        let cache = DashboardDataCache::new();
        let old = cache.begin(DataKind::Deals);
        let new = cache.begin(DataKind::Deals);
        assert!(cache.apply_deals(new, Ok(vec![deal(2, "Negotiation")])));
        assert!(!cache.apply_deals(old, Ok(vec![deal(1, "Proposal")])));
        let snap = cache.snapshot();
        assert_eq!(snap.deals.len(), 1);
        assert_eq!(snap.deals[0].id, 2);
    }

    #[test]
    fn deals_update_derives_closing_list() {
        let cache = DashboardDataCache::new();
        let token = cache.begin(DataKind::Deals);
        cache.apply_deals(
            token,
            Ok(vec![deal(1, "Closed Won"), deal(2, "Negotiation"), deal(3, "Close")]),
        );
        let ids: Vec<i64> = cache.snapshot().closing_deals.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn errors_are_kept_per_kind_and_cleared_on_success() {
        let cache = DashboardDataCache::new();
        let t = cache.begin(DataKind::StageCounts);
        assert!(cache.is_loading(DataKind::StageCounts));
        cache.apply_stage_counts(t, Err("offline".into()));
        assert!(!cache.is_loading(DataKind::StageCounts));
        assert_eq!(cache.snapshot().error(DataKind::StageCounts), Some("offline"));
        assert_eq!(cache.snapshot().error(DataKind::Deals), None);

        let t = cache.begin(DataKind::StageCounts);
        cache.apply_stage_counts(t, Ok(Vec::new()));
        assert_eq!(cache.snapshot().error(DataKind::StageCounts), None);
    }

    #[test]
    fn refresh_is_due_before_first_fetch() {
        let cache = DashboardDataCache::new();
        assert!(cache.refresh_due(Duration::from_secs(60)));
    }
}
