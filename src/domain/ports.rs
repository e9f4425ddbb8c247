use crate::domain::catalog::{Course, Instrument};
use crate::domain::notification::{Notification, PushMessage, SendOutcome};
use crate::domain::offer::Offer;
use crate::domain::order::{CustomerRef, Order, OrderStatus};
use crate::domain::payment::{Payment, PaymentMethod, PaymentStatus};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

pub type OfferStoreRef = Arc<dyn OfferStore>;
pub type InstrumentStoreRef = Arc<dyn InstrumentStore>;
pub type CourseStoreRef = Arc<dyn CourseStore>;
pub type OrderStoreRef = Arc<dyn OrderStore>;
pub type PaymentStoreRef = Arc<dyn PaymentStore>;
pub type NotificationStoreRef = Arc<dyn NotificationStore>;
pub type CustomerDirectoryRef = Arc<dyn CustomerDirectory>;
pub type PushGatewayRef = Arc<dyn PushGateway>;

#[async_trait]
pub trait OfferStore: Send + Sync {
    async fn put(&self, offer: Offer) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Offer>>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Offer>>;
    /// Active offers only; the lookup the coupon evaluator uses.
    async fn find_active_by_code(&self, code: &str) -> Result<Option<Offer>>;
    async fn all(&self) -> Result<Vec<Offer>>;
    /// Atomically increments `used_count` when the usage cap still has
    /// headroom. Returns whether the increment happened.
    async fn increment_usage_if_available(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait InstrumentStore: Send + Sync {
    async fn put(&self, instrument: Instrument) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Instrument>>;
    async fn all(&self) -> Result<Vec<Instrument>>;
}

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn put(&self, course: Course) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Course>>;
}

/// Filter for order listings and statistics. All fields are conjunctive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub customer: Option<CustomerRef>,
    pub status: Option<OrderStatus>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_until: Option<DateTime<Utc>>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(customer) = self.customer {
            if order.customer != customer {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        if let Some(from) = self.created_from {
            if order.created_at < from {
                return false;
            }
        }
        if let Some(until) = self.created_until {
            if order.created_at > until {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, order: Order) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Order>>;
    async fn update(&self, order: Order) -> Result<()>;
    async fn find(&self, filter: &OrderFilter) -> Result<Vec<Order>>;
}

/// Filter for payment listings and reports. All fields are conjunctive.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PaymentFilter {
    pub user_id: Option<Uuid>,
    pub status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub paid_from: Option<DateTime<Utc>>,
    pub paid_until: Option<DateTime<Utc>>,
}

impl PaymentFilter {
    pub fn matches(&self, payment: &Payment) -> bool {
        if let Some(user_id) = self.user_id {
            if payment.user_id != user_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if payment.status != status {
                return false;
            }
        }
        if let Some(method) = self.payment_method {
            if payment.payment_method != method {
                return false;
            }
        }
        if let Some(from) = self.paid_from {
            if payment.payment_date < from {
                return false;
            }
        }
        if let Some(until) = self.paid_until {
            if payment.payment_date > until {
                return false;
            }
        }
        true
    }
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Inserts the payment, rejecting with a conflict when a completed
    /// payment already exists for the same (user, course) pair. The
    /// uniqueness check and the insert happen under one store-level guard.
    async fn insert_unique(&self, payment: Payment) -> Result<()>;
    async fn get(&self, id: Uuid) -> Result<Option<Payment>>;
    async fn update(&self, payment: Payment) -> Result<()>;
    async fn has_completed(&self, user_id: Uuid, course_id: Uuid) -> Result<bool>;
    async fn find(&self, filter: &PaymentFilter) -> Result<Vec<Payment>>;
}

#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Inserts unless a row with the same (user, liveClass, title, batch)
    /// already exists. Returns whether a row was inserted.
    async fn insert_if_absent(&self, notification: Notification) -> Result<bool>;
    async fn get(&self, id: Uuid) -> Result<Option<Notification>>;
    async fn update(&self, notification: Notification) -> Result<()>;
    async fn for_user(&self, user_id: Uuid) -> Result<Vec<Notification>>;
}

/// Directory of users and teachers: existence checks for order customers and
/// push-token bookkeeping for the fan-out.
#[async_trait]
pub trait CustomerDirectory: Send + Sync {
    async fn exists(&self, customer: &CustomerRef) -> Result<bool>;
    /// Distinct push tokens for the given students.
    async fn student_tokens(&self, students: &[Uuid]) -> Result<Vec<String>>;
    async fn teacher_token(&self, teacher: Uuid) -> Result<Option<String>>;
    /// Scrubs the token from both the user and the teacher collections.
    async fn remove_token(&self, token: &str) -> Result<()>;
}

/// External push gateway. One call delivers at most one chunk of messages;
/// per-message outcomes come back positionally.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn send_batch(&self, batch: &[PushMessage]) -> Result<Vec<SendOutcome>>;
}
