#![cfg(feature = "storage-rocksdb")]

mod common;

use common::{card_details, money, percent_offer};
use ragamart::domain::order::{CustomerRef, Order};
use ragamart::domain::payment::{Payment, PaymentMethod};
use ragamart::domain::ports::{OfferStore, OrderFilter, OrderStore, PaymentStore};
use ragamart::error::CommerceError;
use ragamart::infrastructure::rocksdb::RocksDbStore;
use tempfile::tempdir;
use uuid::Uuid;

fn completed_payment(user: Uuid, course: Uuid) -> Payment {
    Payment::completed(
        course,
        user,
        money(1000),
        money(0),
        None,
        money(100),
        money(180),
        money(1280),
        PaymentMethod::CreditCard,
        card_details(),
    )
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db");

    let offer_id;
    let order_id;
    {
        let store = RocksDbStore::open(&db_path).unwrap();
        let offer = percent_offer("SAVE10", 10, Some(3));
        offer_id = offer.id;
        OfferStore::put(&store, offer).await.unwrap();

        let order = Order::new(
            CustomerRef::User(Uuid::new_v4()),
            vec![],
            money(550),
            "12 Raga Lane, Chennai".to_string(),
            Some("upi".to_string()),
            None,
        );
        order_id = order.id;
        store.insert(order).await.unwrap();

        assert!(store.increment_usage_if_available(offer_id).await.unwrap());
    }

    // Second open against the same path recovers everything
    let store = RocksDbStore::open(&db_path).unwrap();
    let offer = OfferStore::get(&store, offer_id).await.unwrap().unwrap();
    assert_eq!(offer.coupon_code, "SAVE10");
    assert_eq!(offer.used_count, 1);

    let order = OrderStore::get(&store, order_id).await.unwrap().unwrap();
    assert_eq!(order.total, money(550));

    let all = OrderStore::find(&store, &OrderFilter::default()).await.unwrap();
    assert_eq!(all.len(), 1);
}

#[tokio::test]
async fn test_completed_payment_uniqueness_is_durable() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db");
    let user = Uuid::new_v4();
    let course = Uuid::new_v4();

    {
        let store = RocksDbStore::open(&db_path).unwrap();
        store
            .insert_unique(completed_payment(user, course))
            .await
            .unwrap();
    }

    // The guard holds across restarts
    let store = RocksDbStore::open(&db_path).unwrap();
    let err = store
        .insert_unique(completed_payment(user, course))
        .await
        .unwrap_err();
    assert!(matches!(err, CommerceError::Conflict(_)));
    assert!(store.has_completed(user, course).await.unwrap());
}

#[tokio::test]
async fn test_usage_cap_enforced_after_reopen() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("db");

    let offer = percent_offer("LAST1", 10, Some(1));
    let offer_id = offer.id;
    {
        let store = RocksDbStore::open(&db_path).unwrap();
        OfferStore::put(&store, offer).await.unwrap();
        assert!(store.increment_usage_if_available(offer_id).await.unwrap());
    }

    let store = RocksDbStore::open(&db_path).unwrap();
    assert!(!store.increment_usage_if_available(offer_id).await.unwrap());
}
