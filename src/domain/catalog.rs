use crate::domain::money::Money;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shop catalog item. The per-line charges (`gst`, `tax`, `delivery_fee`,
/// `discount`) are flat amounts applied once per order line, not per unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub image: Option<String>,
    pub category: String,
    pub subcategory: Option<String>,
    pub price: Money,
    pub gst: Money,
    pub tax: Money,
    pub delivery_fee: Money,
    pub discount: Money,
    pub in_stock: bool,
    pub is_active: bool,
}

/// An e-learning course; the payment pipeline prices single-course purchases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub name: String,
    pub price: Money,
    pub instructor: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub parent: Option<Uuid>,
}
