use crm_dashboard::dashboard::catalog::CatalogEntry;
use crm_dashboard::dashboard::config::{CUSTOM_WIDGETS_KEY, ORDER_KEY};
use crm_dashboard::dashboard::{BuiltInWidget, DashboardError, LayoutStore, WidgetId};
use crm_dashboard::storage::{KeyValueStore, MemoryStore};
use std::collections::HashSet;

fn clock() -> i64 {
    1_760_000_000_000
}

fn seeded() -> LayoutStore {
    LayoutStore::hydrate(Box::new(MemoryStore::new())).with_clock(clock)
}

fn order(store: &LayoutStore) -> Vec<&str> {
    store.order().iter().map(WidgetId::as_str).collect()
}

fn charts() -> CatalogEntry {
    CatalogEntry::built_in(BuiltInWidget::Charts)
}

#[test]
fn catalog_add_appends_then_rejects_duplicate() {
    let mut store = seeded();
    assert_eq!(order(&store), ["funnel", "leads", "tasks"]);

    store.create_from_catalog(&charts()).unwrap();
    assert_eq!(order(&store), ["funnel", "leads", "tasks", "charts"]);

    let err = store.create_from_catalog(&charts()).unwrap_err();
    assert_eq!(err, DashboardError::DuplicateWidget(WidgetId::from("charts")));
    assert_eq!(order(&store), ["funnel", "leads", "tasks", "charts"]);
}

#[test]
fn permanent_custom_widget_is_appended_and_permanent() {
    let mut store = seeded();
    let id = store
        .create_custom_widget("Weekly Pipeline", "Pipeline tracking", true)
        .unwrap();
    assert_eq!(id.as_str(), "permanent-1760000000000");
    assert_eq!(store.position(&id), Some(3));
    assert!(store.is_permanent(&id));
    assert!(store.custom_widgets().get(&id).unwrap().is_permanent);
}

#[test]
fn non_built_in_catalog_entry_becomes_custom_widget() {
    let mut store = seeded();
    let entry = CatalogEntry::template("revenue-forecast", "Revenue Forecast", "Forecast");
    let id = store.create_from_catalog(&entry).unwrap();
    assert!(id.as_str().starts_with("custom-"));
    let custom = store.custom_widget(&id).unwrap();
    assert_eq!(custom.name, "Revenue Forecast");
    assert_eq!(custom.widget_type, "Forecast");
}

#[test]
fn recover_inserts_at_clamped_original_position() {
    let mut store = seeded();
    let deleted = store.soft_delete(&WidgetId::from("leads")).unwrap();
    assert_eq!(deleted.original_position, 1);
    assert_eq!(deleted.name, "Today's Leads");

    store.create_from_catalog(&charts()).unwrap();
    assert_eq!(order(&store), ["funnel", "tasks", "charts"]);

    assert_eq!(store.recover(&WidgetId::from("leads")).unwrap(), 1);
    assert_eq!(order(&store), ["funnel", "leads", "tasks", "charts"]);
}

#[test]
fn recover_past_the_end_clamps_to_length() {
    let mut store = seeded();
    store.soft_delete(&WidgetId::from("tasks")).unwrap();
    store.soft_delete(&WidgetId::from("leads")).unwrap();
    store.soft_delete(&WidgetId::from("funnel")).unwrap();
    assert_eq!(store.recover(&WidgetId::from("tasks")).unwrap(), 0);
    assert_eq!(order(&store), ["tasks"]);
}

#[test]
fn delete_then_recover_restores_original_order() {
    let mut store = seeded();
    store.create_custom_widget("Goals", "Targets", false).unwrap();
    let before: Vec<WidgetId> = store.order().to_vec();
    for id in before.clone() {
        store.soft_delete(&id).unwrap();
        store.recover(&id).unwrap();
        assert_eq!(store.order(), before.as_slice());
    }
}

#[test]
fn widget_is_never_both_live_and_deleted() {
    let mut store = seeded();
    let leads = WidgetId::from("leads");
    store.soft_delete(&leads).unwrap();
    assert!(!store.contains(&leads));
    assert!(store.ledger().contains(&leads));
    assert!(matches!(
        store.soft_delete(&leads),
        Err(DashboardError::NotInLayout(_))
    ));
    store.recover(&leads).unwrap();
    assert!(store.contains(&leads));
    assert!(!store.ledger().contains(&leads));
}

#[test]
fn operation_sequences_keep_order_integrity() {
    let mut store = seeded();
    let kinds = BuiltInWidget::ALL;
    for step in 0..200usize {
        let order = store.order().to_vec();
        match step % 6 {
            0 => {
                let entry = CatalogEntry::built_in(kinds[step % kinds.len()]);
                let _ = store.create_from_catalog(&entry);
            }
            1 => {
                let _ = store.create_custom_widget(&format!("W{step}"), "t", step % 4 == 1);
            }
            2 if !order.is_empty() => {
                let _ = store.soft_delete(&order[step % order.len()]);
            }
            3 => {
                let deleted: Vec<WidgetId> =
                    store.ledger().entries().into_iter().map(|(id, _)| id.clone()).collect();
                if let Some(id) = deleted.get(step % deleted.len().max(1)) {
                    store.recover(id).unwrap();
                }
            }
            4 if order.len() > 1 => {
                store.reorder(&order[step % order.len()], &order[(step / 2) % order.len()]);
            }
            _ => {}
        }

        let ids = store.order();
        let unique: HashSet<&WidgetId> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len(), "duplicate id after step {step}");
        for id in ids {
            assert!(
                id.built_in().is_some() || store.custom_widgets().contains_key(id),
                "dangling id {id} after step {step}"
            );
            assert!(!store.ledger().contains(id));
        }
    }
}

#[test]
fn rehydrating_persisted_state_is_byte_identical() {
    let mut store = seeded();
    store.create_custom_widget("Weekly Pipeline", "Pipeline tracking", true).unwrap();
    store.create_custom_widget("Scratch", "Notes", false).unwrap();
    store.reorder(&WidgetId::from("tasks"), &WidgetId::from("funnel"));

    let backing = store.backing_store();
    let order_json = backing.get(ORDER_KEY).unwrap().unwrap();
    let custom_json = backing.get(CUSTOM_WIDGETS_KEY).unwrap().unwrap();

    let copy = MemoryStore::new()
        .with_value(ORDER_KEY, &order_json)
        .with_value(CUSTOM_WIDGETS_KEY, &custom_json);
    let mut rehydrated = LayoutStore::hydrate(Box::new(copy));
    assert!(rehydrated.warnings().is_empty());
    rehydrated.reorder(&WidgetId::from("leads"), &WidgetId::from("leads"));
    rehydrated.create_from_catalog(&charts()).unwrap();
    rehydrated.soft_delete(&WidgetId::from("charts")).unwrap();

    let backing = rehydrated.backing_store();
    assert_eq!(backing.get(ORDER_KEY).unwrap().unwrap(), order_json);
    assert_eq!(backing.get(CUSTOM_WIDGETS_KEY).unwrap().unwrap(), custom_json);
}

#[test]
fn persisted_values_use_the_documented_shape() {
    let mut store = seeded();
    store.create_custom_widget("Weekly Pipeline", "Pipeline tracking", true).unwrap();
    let backing = store.backing_store();
    assert_eq!(
        backing.get(ORDER_KEY).unwrap().unwrap(),
        r#"["funnel","leads","tasks","permanent-1760000000000"]"#
    );
    assert_eq!(
        backing.get(CUSTOM_WIDGETS_KEY).unwrap().unwrap(),
        r#"{"permanent-1760000000000":{"name":"Weekly Pipeline","type":"Pipeline tracking","isPermanent":true}}"#
    );
}
