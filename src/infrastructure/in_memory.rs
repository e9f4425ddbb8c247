use crate::domain::catalog::{Course, Instrument};
use crate::domain::notification::Notification;
use crate::domain::offer::Offer;
use crate::domain::order::{CustomerRef, Order};
use crate::domain::payment::{Payment, PaymentStatus};
use crate::domain::ports::{
    CourseStore, CustomerDirectory, InstrumentStore, NotificationStore, OfferStore, OrderFilter,
    OrderStore, PaymentFilter, PaymentStore,
};
use crate::error::{CommerceError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory offer store.
///
/// The write lock doubles as the guard that makes the conditional usage
/// increment atomic with respect to concurrent redemptions.
#[derive(Default, Clone)]
pub struct InMemoryOfferStore {
    offers: Arc<RwLock<HashMap<Uuid, Offer>>>,
}

impl InMemoryOfferStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OfferStore for InMemoryOfferStore {
    async fn put(&self, offer: Offer) -> Result<()> {
        let mut offers = self.offers.write().await;
        offers.insert(offer.id, offer);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers.get(&id).cloned())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers.values().find(|o| o.coupon_code == code).cloned())
    }

    async fn find_active_by_code(&self, code: &str) -> Result<Option<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers
            .values()
            .find(|o| o.is_active && o.coupon_code == code)
            .cloned())
    }

    async fn all(&self) -> Result<Vec<Offer>> {
        let offers = self.offers.read().await;
        Ok(offers.values().cloned().collect())
    }

    async fn increment_usage_if_available(&self, id: Uuid) -> Result<bool> {
        let mut offers = self.offers.write().await;
        let Some(offer) = offers.get_mut(&id) else {
            return Ok(false);
        };
        if !offer.has_usage_left() {
            return Ok(false);
        }
        offer.used_count += 1;
        Ok(true)
    }
}

#[derive(Default, Clone)]
pub struct InMemoryInstrumentStore {
    instruments: Arc<RwLock<HashMap<Uuid, Instrument>>>,
}

impl InMemoryInstrumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InstrumentStore for InMemoryInstrumentStore {
    async fn put(&self, instrument: Instrument) -> Result<()> {
        let mut instruments = self.instruments.write().await;
        instruments.insert(instrument.id, instrument);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Instrument>> {
        let instruments = self.instruments.read().await;
        Ok(instruments.get(&id).cloned())
    }

    async fn all(&self) -> Result<Vec<Instrument>> {
        let instruments = self.instruments.read().await;
        Ok(instruments.values().cloned().collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryCourseStore {
    courses: Arc<RwLock<HashMap<Uuid, Course>>>,
}

impl InMemoryCourseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn put(&self, course: Course) -> Result<()> {
        let mut courses = self.courses.write().await;
        courses.insert(course.id, course);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(&id).cloned())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryOrderStore {
    orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl InMemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for InMemoryOrderStore {
    async fn insert(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.get(&id).cloned())
    }

    async fn update(&self, order: Order) -> Result<()> {
        let mut orders = self.orders.write().await;
        orders.insert(order.id, order);
        Ok(())
    }

    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders
            .values()
            .filter(|o| filter.matches(o))
            .cloned()
            .collect())
    }
}

/// In-memory payment store. `insert_unique` holds the write lock across the
/// duplicate check and the insert, which closes the concurrent
/// double-purchase window.
#[derive(Default, Clone)]
pub struct InMemoryPaymentStore {
    payments: Arc<RwLock<HashMap<Uuid, Payment>>>,
}

impl InMemoryPaymentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PaymentStore for InMemoryPaymentStore {
    async fn insert_unique(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        let duplicate = payment.status == PaymentStatus::Completed
            && payments.values().any(|p| {
                p.user_id == payment.user_id
                    && p.course_id == payment.course_id
                    && p.status == PaymentStatus::Completed
            });
        if duplicate {
            return Err(CommerceError::conflict(
                "Course already purchased by this user.",
            ));
        }
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments.get(&id).cloned())
    }

    async fn update(&self, payment: Payment) -> Result<()> {
        let mut payments = self.payments.write().await;
        payments.insert(payment.id, payment);
        Ok(())
    }

    async fn has_completed(&self, user_id: Uuid, course_id: Uuid) -> Result<bool> {
        let payments = self.payments.read().await;
        Ok(payments.values().any(|p| {
            p.user_id == user_id && p.course_id == course_id && p.status == PaymentStatus::Completed
        }))
    }

    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>> {
        let payments = self.payments.read().await;
        Ok(payments
            .values()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryNotificationStore {
    notifications: Arc<RwLock<HashMap<Uuid, Notification>>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert_if_absent(&self, notification: Notification) -> Result<bool> {
        let mut notifications = self.notifications.write().await;
        let exists = notifications.values().any(|n| {
            n.user_id == notification.user_id
                && n.live_class_id == notification.live_class_id
                && n.title == notification.title
                && n.batch_id == notification.batch_id
        });
        if exists {
            return Ok(false);
        }
        notifications.insert(notification.id, notification);
        Ok(true)
    }

    async fn get(&self, id: Uuid) -> Result<Option<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications.get(&id).cloned())
    }

    async fn update(&self, notification: Notification) -> Result<()> {
        let mut notifications = self.notifications.write().await;
        notifications.insert(notification.id, notification);
        Ok(())
    }

    async fn for_user(&self, user_id: Uuid) -> Result<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// In-memory user/teacher directory: existence checks plus push-token
/// bookkeeping. Seeded through the `add_*` helpers.
#[derive(Default, Clone)]
pub struct InMemoryCustomerDirectory {
    users: Arc<RwLock<HashMap<Uuid, Option<String>>>>,
    teachers: Arc<RwLock<HashMap<Uuid, Option<String>>>>,
}

impl InMemoryCustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_user(&self, id: Uuid, push_token: Option<String>) {
        self.users.write().await.insert(id, push_token);
    }

    pub async fn add_teacher(&self, id: Uuid, push_token: Option<String>) {
        self.teachers.write().await.insert(id, push_token);
    }
}

#[async_trait]
impl CustomerDirectory for InMemoryCustomerDirectory {
    async fn exists(&self, customer: &CustomerRef) -> Result<bool> {
        match customer {
            CustomerRef::User(id) => Ok(self.users.read().await.contains_key(id)),
            CustomerRef::Teacher(id) => Ok(self.teachers.read().await.contains_key(id)),
        }
    }

    async fn student_tokens(&self, students: &[Uuid]) -> Result<Vec<String>> {
        let users = self.users.read().await;
        let mut tokens = Vec::new();
        for id in students {
            if let Some(Some(token)) = users.get(id) {
                if !tokens.contains(token) {
                    tokens.push(token.clone());
                }
            }
        }
        Ok(tokens)
    }

    async fn teacher_token(&self, teacher: Uuid) -> Result<Option<String>> {
        let teachers = self.teachers.read().await;
        Ok(teachers.get(&teacher).cloned().flatten())
    }

    async fn remove_token(&self, token: &str) -> Result<()> {
        let mut users = self.users.write().await;
        for stored in users.values_mut() {
            if stored.as_deref() == Some(token) {
                *stored = None;
            }
        }
        drop(users);
        let mut teachers = self.teachers.write().await;
        for stored in teachers.values_mut() {
            if stored.as_deref() == Some(token) {
                *stored = None;
            }
        }
        Ok(())
    }
}
