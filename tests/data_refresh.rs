use chrono::{DateTime, Utc};
use crm_dashboard::crm::api::{ApiError, RecordApi};
use crm_dashboard::crm::records::{Deal, Lead, StageCount};
use crm_dashboard::dashboard::{DashboardDataCache, DataKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

struct FakeApi {
    fail_stages: bool,
}

fn deal(id: i64, stage: &str) -> Deal {
    Deal {
        id,
        name: format!("Deal {id}"),
        stage: stage.into(),
        amount: Some(250.0),
        probability: Some(60),
        account_name: Some("Acme".into()),
        close_date: None,
    }
}

impl RecordApi for FakeApi {
    fn leads_since(&self, since: DateTime<Utc>) -> Result<Vec<Lead>, ApiError> {
        Ok(vec![Lead {
            id: 1,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            company: None,
            email: None,
            phone: None,
            status: "new".into(),
            source: None,
            created_at: since,
        }])
    }

    fn deals(&self) -> Result<Vec<Deal>, ApiError> {
        Ok(vec![deal(1, "Negotiation"), deal(2, "Closed Won"), deal(3, "Proposal")])
    }

    fn deals_by_stage(&self) -> Result<Vec<StageCount>, ApiError> {
        if self.fail_stages {
            return Err(ApiError::Status {
                status: 503,
                message: "Service Unavailable".into(),
            });
        }
        Ok(vec![StageCount {
            stage: "Negotiation".into(),
            count: 1,
            total_amount: Some(250.0),
        }])
    }
}

fn wait_idle(cache: &DashboardDataCache) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while DataKind::ALL.iter().any(|k| cache.is_loading(*k)) {
        assert!(Instant::now() < deadline, "refresh did not finish");
        std::thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn background_refresh_fills_every_kind() {
    let cache = Arc::new(DashboardDataCache::new());
    let updates = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&updates);
    cache.spawn_refresh(
        Arc::new(FakeApi { fail_stages: false }),
        Some(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    );
    wait_idle(&cache);
    let deadline = Instant::now() + Duration::from_secs(5);
    while updates.load(Ordering::SeqCst) < 3 {
        assert!(Instant::now() < deadline, "update callbacks did not run");
        std::thread::sleep(Duration::from_millis(10));
    }

    let snap = cache.snapshot();
    assert_eq!(snap.todays_leads.len(), 1);
    assert_eq!(snap.deals.len(), 3);
    let closing: Vec<i64> = snap.closing_deals.iter().map(|d| d.id).collect();
    assert_eq!(closing, vec![1, 3]);
    assert_eq!(snap.stage_counts.len(), 1);
    assert_eq!(updates.load(Ordering::SeqCst), 3);
    assert!(!cache.refresh_due(Duration::from_secs(60)));
}

#[test]
fn failed_kind_reports_error_without_touching_others() {
    let cache = Arc::new(DashboardDataCache::new());
    cache.spawn_refresh(Arc::new(FakeApi { fail_stages: true }), None);
    wait_idle(&cache);

    let snap = cache.snapshot();
    assert_eq!(snap.error(DataKind::StageCounts), Some("Service Unavailable"));
    assert_eq!(snap.error(DataKind::Deals), None);
    assert_eq!(snap.deals.len(), 3);
}
