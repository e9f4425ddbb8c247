use crate::domain::ids;
use crate::domain::money::Money;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tagged customer reference: an order belongs to either a user or a teacher.
///
/// Replaces the string-tag (`customer` + `customerModel`) pair of the wire
/// format with a variant that forces exhaustive matching at lookup sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "customerType", content = "customerId")]
pub enum CustomerRef {
    User(Uuid),
    Teacher(Uuid),
}

impl CustomerRef {
    /// Builds a reference from the wire's `customer` + `customerModel` pair.
    pub fn from_parts(id: Option<Uuid>, model: Option<&str>) -> Result<Self, String> {
        match (id, model) {
            (Some(id), Some("User")) => Ok(Self::User(id)),
            (Some(id), Some("Teacher")) => Ok(Self::Teacher(id)),
            (Some(_), Some(other)) => Err(format!(
                "customerModel must be \"User\" or \"Teacher\", got \"{other}\""
            )),
            _ => Err("customer and customerModel are required".to_string()),
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Self::User(id) | Self::Teacher(id) => *id,
        }
    }

    pub fn model(&self) -> &'static str {
        match self {
            Self::User(_) => "User",
            Self::Teacher(_) => "Teacher",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Processing,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

/// One priced line of an order. Catalog fields are denormalized at creation
/// time as an immutable snapshot; later catalog edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub instrument: Uuid,
    pub quantity: u32,
    pub price: Money,
    pub instrument_name: String,
    pub instrument_description: String,
    pub instrument_image: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub gst: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub discount: Money,
}

impl OrderLine {
    /// `price*quantity + gst + tax + deliveryFee - discount`.
    pub fn line_total(&self) -> Money {
        self.price * self.quantity + self.gst + self.tax + self.delivery_fee - self.discount
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusChange {
    pub status: OrderStatus,
    pub at: DateTime<Utc>,
    pub by: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub order_number: String,
    #[serde(flatten)]
    pub customer: CustomerRef,
    pub items: Vec<OrderLine>,
    pub total: Money,
    pub status: OrderStatus,
    pub address: String,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
    pub status_history: Vec<StatusChange>,
    pub is_active: bool,
    pub cancelled_at: Option<DateTime<Utc>>,
    pub cancelled_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        customer: CustomerRef,
        items: Vec<OrderLine>,
        total: Money,
        address: String,
        payment_method: Option<String>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            order_number: ids::order_number(),
            customer,
            items,
            total,
            status: OrderStatus::Processing,
            address,
            payment_method,
            notes,
            tracking_number: None,
            estimated_delivery: None,
            status_history: vec![StatusChange {
                status: OrderStatus::Processing,
                at: now,
                by: None,
            }],
            is_active: true,
            cancelled_at: None,
            cancelled_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of all line totals.
    pub fn calculated_total(&self) -> Money {
        self.items.iter().map(OrderLine::line_total).sum()
    }

    /// Applies a status change, appending to the history only when the status
    /// actually differs. Returns whether anything changed.
    pub fn set_status(&mut self, status: OrderStatus, actor: Option<String>) -> bool {
        if self.status == status {
            return false;
        }
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            at: Utc::now(),
            by: actor,
        });
        self.updated_at = Utc::now();
        true
    }

    /// Soft delete: the order row is retained, never purged.
    pub fn cancel(&mut self, actor: Option<String>) {
        self.set_status(OrderStatus::Cancelled, actor.clone());
        self.is_active = false;
        self.cancelled_at = Some(Utc::now());
        self.cancelled_by = actor;
        self.updated_at = Utc::now();
    }
}
