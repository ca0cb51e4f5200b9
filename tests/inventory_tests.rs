//! Stock store behaviour against the in-memory table and feed.

mod common;

use std::time::Duration;

use chrono::Utc;
use megacopy::domain::{ProductId, ReconcilePolicy, StockChange, StockEntry};
use megacopy::error::StockError;
use megacopy::infrastructure::config::inventory::InventoryConfig;
use tokio::sync::broadcast;
use tokio::time::timeout;

use common::{fixture, fixture_with};

async fn next_change(rx: &mut broadcast::Receiver<StockEntry>) -> StockEntry {
    timeout(Duration::from_secs(1), rx.recv())
        .await
        .expect("change within a second")
        .expect("change channel open")
}

#[tokio::test]
async fn update_decrement_and_refuse() {
    let f = fixture([("p1", 0)]);
    let p1 = ProductId::new("p1");

    f.store.update_stock(&p1, 5).await.unwrap();
    assert_eq!(f.store.get_stock(&p1), 5);

    assert!(f.store.decrement_stock(&p1, 3).await);
    assert_eq!(f.store.get_stock(&p1), 2);
    assert_eq!(f.table.stock(&p1), Some(2));

    let writes = f.table.write_count();
    assert!(!f.store.decrement_stock(&p1, 10).await);
    assert_eq!(f.store.get_stock(&p1), 2);
    assert_eq!(f.table.write_count(), writes, "refusal must not touch the table");
}

#[tokio::test]
async fn decrement_of_unknown_product_is_refused() {
    let f = fixture([("p1", 9)]);
    // never loaded, so the cache reports 0
    assert!(!f.store.decrement_one(&ProductId::new("p1")).await);
    assert_eq!(f.table.write_count(), 0);
    assert_eq!(f.table.stock(&ProductId::new("p1")), Some(9));
}

#[tokio::test]
async fn load_overwrites_cached_value() {
    let f = fixture([("p1", 4)]);
    let p1 = ProductId::new("p1");

    f.store.load_stock(&p1).await;
    assert_eq!(f.store.get_stock(&p1), 4);

    f.table.set_stock(&p1, 11);
    f.store.load_stock(&p1).await;
    assert_eq!(f.store.get_stock(&p1), 11);
}

#[tokio::test]
async fn load_of_missing_product_reports_not_found() {
    let f = fixture([("other", 1)]);
    let err = f.store.try_load_stock(&ProductId::new("ghost")).await.unwrap_err();
    assert!(matches!(err.as_stock(), Some(StockError::NotFound(_))));
}

#[tokio::test]
async fn pushed_updates_reach_the_cache() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");
    f.store.load_stock(&p1).await;

    let mut changes = f.store.changes();
    let subscription = f.store.subscribe_to_stock_updates(&p1).unwrap();
    assert!(subscription.is_active());
    assert_eq!(f.feed.active_subscriptions(&p1), 1);

    assert_eq!(f.feed.push(StockChange::new("p1", 42)), 1);
    let entry = next_change(&mut changes).await;

    assert_eq!(entry.quantity, 42);
    assert_eq!(f.store.get_stock(&p1), 42);

    subscription.unsubscribe();
}

#[tokio::test]
async fn unsubscribe_stops_updates() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");
    f.store.load_stock(&p1).await;

    let subscription = f.store.subscribe_to_stock_updates(&p1).unwrap();
    subscription.unsubscribe();

    assert_eq!(f.feed.active_subscriptions(&p1), 0);
    assert_eq!(f.feed.push(StockChange::new("p1", 42)), 0);
    assert_eq!(f.store.get_stock(&p1), 3);
}

#[tokio::test]
async fn dropping_subscription_closes_feed() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");

    drop(f.store.subscribe_to_stock_updates(&p1).unwrap());

    assert_eq!(f.feed.active_subscriptions(&p1), 0);
}

#[tokio::test]
async fn held_subscription_keeps_updates_flowing() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");
    let mut changes = f.store.changes();

    let _held = f.store.subscribe_to_stock_updates(&p1).unwrap();
    tokio::task::yield_now().await;

    assert_eq!(f.feed.active_subscriptions(&p1), 1);
    f.feed.push(StockChange::new("p1", 8));
    assert_eq!(next_change(&mut changes).await.quantity, 8);
}

#[tokio::test]
async fn discarded_subscription_closes_at_once() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");

    let _ = f.store.subscribe_to_stock_updates(&p1).unwrap();

    assert_eq!(f.feed.active_subscriptions(&p1), 0);
    assert_eq!(f.feed.push(StockChange::new("p1", 8)), 0);
}

#[tokio::test]
async fn subscriptions_are_scoped_to_one_product() {
    let f = fixture([("p1", 1), ("p2", 2)]);
    let p1 = ProductId::new("p1");
    let p2 = ProductId::new("p2");
    f.store.load_stock(&p1).await;
    f.store.load_stock(&p2).await;

    let mut changes = f.store.changes();
    let _sub = f.store.subscribe_to_stock_updates(&p1).unwrap();

    assert_eq!(f.feed.push(StockChange::new("p2", 50)), 0);
    f.feed.push(StockChange::new("p1", 10));
    next_change(&mut changes).await;

    assert_eq!(f.store.get_stock(&p1), 10);
    assert_eq!(f.store.get_stock(&p2), 2);
}

#[tokio::test]
async fn arrival_order_lets_stale_echo_win() {
    let f = fixture([("p1", 0)]);
    let p1 = ProductId::new("p1");
    let before_write = Utc::now();
    f.store.update_stock(&p1, 5).await.unwrap();

    let mut changes = f.store.changes();
    let _sub = f.store.subscribe_to_stock_updates(&p1).unwrap();
    f.feed
        .push(StockChange::new("p1", 9).at(before_write - chrono::Duration::seconds(10)));
    next_change(&mut changes).await;

    assert_eq!(f.store.get_stock(&p1), 9);
}

#[tokio::test]
async fn newest_policy_keeps_local_write_over_stale_echo() {
    let config = InventoryConfig {
        reconcile: ReconcilePolicy::Newest,
        ..InventoryConfig::default()
    };
    let f = fixture_with([("p1", 0)], &config);
    let p1 = ProductId::new("p1");
    let before_write = Utc::now();
    f.store.update_stock(&p1, 5).await.unwrap();

    let mut changes = f.store.changes();
    let _sub = f.store.subscribe_to_stock_updates(&p1).unwrap();
    f.feed
        .push(StockChange::new("p1", 9).at(before_write - chrono::Duration::seconds(10)));
    f.feed
        .push(StockChange::new("p1", 4).at(Utc::now() + chrono::Duration::seconds(10)));

    // only the fresh change is applied and broadcast
    assert_eq!(next_change(&mut changes).await.quantity, 4);
    assert_eq!(f.store.get_stock(&p1), 4);
}

#[tokio::test]
async fn concurrent_reservations_never_oversell() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");
    f.store.load_stock(&p1).await;

    let mut tasks = Vec::new();
    for _ in 0..5 {
        let store = f.store.clone();
        let id = p1.clone();
        tasks.push(tokio::spawn(async move { store.reserve_stock(&id, 1).await }));
    }

    let mut sold = 0;
    for task in tasks {
        if task.await.unwrap().is_ok() {
            sold += 1;
        }
    }

    assert_eq!(sold, 3);
    assert_eq!(f.table.stock(&p1), Some(0));
}

#[tokio::test]
async fn reserve_reports_backend_failure() {
    let f = fixture([("p1", 3)]);
    let p1 = ProductId::new("p1");
    f.store.load_stock(&p1).await;
    f.table.fail_writes(true);

    let err = f.store.reserve_stock(&p1, 1).await.unwrap_err();
    assert!(matches!(err, StockError::RemoteWrite { .. }));
    assert_eq!(f.store.get_stock(&p1), 3);
}
