use crate::domain::catalog::{Course, Instrument};
use crate::domain::notification::Notification;
use crate::domain::offer::Offer;
use crate::domain::order::Order;
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{
    CourseStore, InstrumentStore, NotificationStore, OfferStore, OrderFilter, OrderStore,
    PaymentFilter, PaymentStore,
};
use crate::error::{CommerceError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family per collection.
pub const CF_OFFERS: &str = "offers";
pub const CF_INSTRUMENTS: &str = "instruments";
pub const CF_COURSES: &str = "courses";
pub const CF_ORDERS: &str = "orders";
pub const CF_PAYMENTS: &str = "payments";
pub const CF_NOTIFICATIONS: &str = "notifications";

const ALL_CFS: [&str; 6] = [
    CF_OFFERS,
    CF_INSTRUMENTS,
    CF_COURSES,
    CF_ORDERS,
    CF_PAYMENTS,
    CF_NOTIFICATIONS,
];

/// Persistent store over RocksDB, one column family per collection with
/// serde_json values keyed by entity id.
///
/// `Clone` shares the underlying `Arc<DB>`. Read-modify-write operations
/// (conditional usage increment, unique payment insert) serialize through
/// `write_guard`, standing in for the storage-layer constraint a SQL unique
/// index would provide.
#[derive(Clone)]
pub struct RocksDbStore {
    db: Arc<DB>,
    write_guard: Arc<Mutex<()>>,
}

impl RocksDbStore {
    /// Opens or creates the database, ensuring every column family exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors: Vec<ColumnFamilyDescriptor> = ALL_CFS
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)
            .map_err(|e| CommerceError::Storage(e.to_string()))?;

        Ok(Self {
            db: Arc::new(db),
            write_guard: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CommerceError::Storage(format!("{name} column family not found")))
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: Uuid, value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db
            .put_cf(cf, key.as_bytes(), bytes)
            .map_err(|e| CommerceError::Storage(e.to_string()))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: Uuid) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        let found = self
            .db
            .get_cf(cf, key.as_bytes())
            .map_err(|e| CommerceError::Storage(e.to_string()))?;
        match found {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn scan_json<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, bytes) = item.map_err(|e| CommerceError::Storage(e.to_string()))?;
            values.push(serde_json::from_slice(&bytes)?);
        }
        Ok(values)
    }
}

#[async_trait]
impl OfferStore for RocksDbStore {
    async fn put(&self, offer: Offer) -> Result<()> {
        self.put_json(CF_OFFERS, offer.id, &offer)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Offer>> {
        self.get_json(CF_OFFERS, id)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Offer>> {
        let offers: Vec<Offer> = self.scan_json(CF_OFFERS)?;
        Ok(offers.into_iter().find(|o| o.coupon_code == code))
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Offer>> {
        let offers: Vec<Offer> = self.scan_json(CF_OFFERS)?;
        Ok(offers
            .into_iter()
            .find(|o| o.is_active && o.coupon_code == code))
    }

    async fn all(&self) -> Result<Vec<Offer>> {
        self.scan_json(CF_OFFERS)
    }

    async fn increment_usage_if_available(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_guard.lock().await;
        let Some(mut offer) = self.get_json::<Offer>(CF_OFFERS, id)? else {
            return Ok(false);
        };
        if !offer.has_usage_left() {
            return Ok(false);
        }
        offer.used_count += 1;
        self.put_json(CF_OFFERS, id, &offer)?;
        Ok(true)
    }
}

#[async_trait]
impl InstrumentStore for RocksDbStore {
    async fn put(&self, instrument: Instrument) -> Result<()> {
        self.put_json(CF_INSTRUMENTS, instrument.id, &instrument)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Instrument>> {
        self.get_json(CF_INSTRUMENTS, id)
    }

    async fn all(&self) -> Result<Vec<Instrument>> {
        self.scan_json(CF_INSTRUMENTS)
    }
}

#[async_trait]
impl CourseStore for RocksDbStore {
    async fn put(&self, course: Course) -> Result<()> {
        self.put_json(CF_COURSES, course.id, &course)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Course>> {
        self.get_json(CF_COURSES, id)
    }
}

#[async_trait]
impl OrderStore for RocksDbStore {
    async fn insert(&self, order: Order) -> Result<()> {
        self.put_json(CF_ORDERS, order.id, &order)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        self.get_json(CF_ORDERS, id)
    }

    async fn update(&self, order: Order) -> Result<()> {
        self.put_json(CF_ORDERS, order.id, &order)
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders: Vec<Order> = self.scan_json(CF_ORDERS)?;
        Ok(orders.into_iter().filter(|o| filter.matches(o)).collect())
    }
}

#[async_trait]
impl PaymentStore for RocksDbStore {
    async fn insert_unique(&self, payment: Payment) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        if payment.status == PaymentStatus::Completed {
            let existing: Vec<Payment> = self.scan_json(CF_PAYMENTS)?;
            let duplicate = existing.iter().any(|p| {
                p.user_id == payment.user_id
                    && p.course_id == payment.course_id
                    && p.status == PaymentStatus::Completed
            });
            if duplicate {
                return Err(CommerceError::conflict(
                    "Course already purchased by this user.",
                ));
            }
        }
        self.put_json(CF_PAYMENTS, payment.id, &payment)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        self.get_json(CF_PAYMENTS, id)
    }

    async fn update(&self, payment: Payment) -> Result<()> {
        self.put_json(CF_PAYMENTS, payment.id, &payment)
    }

    async fn has_completed(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let payments: Vec<Payment> = self.scan_json(CF_PAYMENTS)?;
        Ok(payments.iter().any(|p| {
            p.user_id == user_id && p.course_id == course_id && p.status == PaymentStatus::Completed
        }))
    }

    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let payments: Vec<Payment> = self.scan_json(CF_PAYMENTS)?;
        Ok(payments.into_iter().filter(|p| filter.matches(p)).collect())
    }
}

#[async_trait]
impl NotificationStore for RocksDbStore {
    async fn insert_if_absent(&self, notification: Notification) -> Result<bool> {
        let _guard = self.write_guard.lock().await;
        let existing: Vec<Notification> = self.scan_json(CF_NOTIFICATIONS)?;
        let exists = existing.iter().any(|n| {
            n.user_id == notification.user_id
                && n.live_class_id == notification.live_class_id
                && n.title == notification.title
                && n.batch_id == notification.batch_id
        });
        if exists {
            return Ok(false);
        }
        self.put_json(CF_NOTIFICATIONS, notification.id, &notification)?;
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>> {
        self.get_json(CF_NOTIFICATIONS, id)
    }

    async fn update(&self, notification: Notification) -> Result<()> {
        self.put_json(CF_NOTIFICATIONS, notification.id, &notification)
    }

    async fn for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications: Vec<Notification> = self.scan_json(CF_NOTIFICATIONS)?;
        Ok(notifications
            .into_iter()
            .filter(|n| n.user_id == user_id)
            .collect())
    }
}
