use crate::application::{Page, SortOrder, paginate};
use crate::domain::money::Money;
use crate::domain::order::{CustomerRef, Order, OrderLine, OrderStatus};
use crate::domain::ports::{CustomerDirectoryRef, InstrumentStoreRef, OrderFilter, OrderStoreRef};
use crate::error::{CommerceError, Result};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

/// Checkout request as it arrives on the wire. The customer reference still
/// carries the `customer` + `customerModel` pair; the pipeline converts it to
/// a [`CustomerRef`] during structural validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrderRequest {
    pub customer: Option<Uuid>,
    pub customer_model: Option<String>,
    pub items: Vec<NewOrderItem>,
    pub total: Option<Money>,
    pub address: Option<String>,
    pub payment_method: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewOrderItem {
    pub instrument: Option<Uuid>,
    pub quantity: Option<i64>,
    pub price: Option<Money>,
}

/// Partial update for an existing order. Only present fields are applied; a
/// status change is recorded in the history with `updated_by` as the actor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub updated_by: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct OrderListQuery {
    pub filter: OrderFilter,
    pub page: u64,
    pub limit: u64,
    pub sort_by: Option<String>,
    pub sort_order: SortOrder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBucket {
    pub status: OrderStatus,
    pub count: u64,
    pub total: Money,
    pub average: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    pub year: i32,
    pub month: u32,
    pub count: u64,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    pub category: String,
    pub quantity: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerTypeBucket {
    pub customer_type: String,
    pub count: u64,
    pub total: Money,
}

/// Aggregates recomputed per request from the stored orders; there is no
/// materialized aggregate store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub by_status: Vec<StatusBucket>,
    pub monthly_trend: Vec<MonthlyBucket>,
    pub top_categories: Vec<CategoryBucket>,
    pub by_customer_type: Vec<CustomerTypeBucket>,
}

/// The order pricing pipeline and the order read/update paths.
pub struct CheckoutService {
    orders: OrderStoreRef,
    instruments: InstrumentStoreRef,
    customers: CustomerDirectoryRef,
}

impl CheckoutService {
    pub fn new(
        orders: OrderStoreRef,
        instruments: InstrumentStoreRef,
        customers: CustomerDirectoryRef,
    ) -> Self {
        Self {
            orders,
            instruments,
            customers,
        }
    }

    /// Runs the full pricing pipeline; nothing persists unless every step
    /// passes.
    pub async fn create_order(&self, req: NewOrderRequest) -> Result<Order> {
        // Steps 1-2: structural and per-item validation, all violations
        // collected before failing.
        let mut errors = Vec::new();

        let customer = match CustomerRef::from_parts(req.customer, req.customer_model.as_deref()) {
            Ok(customer) => Some(customer),
            Err(message) => {
                errors.push(message);
                None
            }
        };

        if req.items.is_empty() {
            errors.push("At least one item is required".to_string());
        }
        match req.total {
            Some(total) if total.is_positive() => {}
            Some(_) => errors.push("total must be greater than zero".to_string()),
            None => errors.push("total is required".to_string()),
        }
        let address = req
            .address
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());
        if address.is_none() {
            errors.push("address is required".to_string());
        }

        for (idx, item) in req.items.iter().enumerate() {
            let position = idx + 1;
            if item.instrument.is_none() {
                errors.push(format!("Item {position}: instrument id is required"));
            }
            if let Some(quantity) = item.quantity {
                if quantity <= 0 {
                    errors.push(format!(
                        "Item {position}: quantity must be a positive integer"
                    ));
                }
            }
            if let Some(price) = item.price {
                if price.is_negative() {
                    errors.push(format!("Item {position}: price must not be negative"));
                }
            }
        }

        if !errors.is_empty() {
            return Err(CommerceError::Validation(errors));
        }
        let (Some(customer), Some(provided_total), Some(address)) =
            (customer, req.total, address)
        else {
            // All three were checked above.
            return Err(CommerceError::validation("invalid order request"));
        };

        // Step 3: polymorphic customer lookup, exactly one directory per
        // variant.
        if !self.customers.exists(&customer).await? {
            return Err(CommerceError::not_found(match customer {
                CustomerRef::User(_) => "User not found",
                CustomerRef::Teacher(_) => "Teacher not found",
            }));
        }

        // Step 4: enrichment, snapshotting catalog fields onto each line.
        let mut lines = Vec::with_capacity(req.items.len());
        let mut item_errors = Vec::new();
        for (idx, item) in req.items.iter().enumerate() {
            let position = idx + 1;
            let Some(instrument_id) = item.instrument else {
                continue;
            };
            match self.instruments.get(instrument_id).await? {
                None => item_errors.push(format!(
                    "Item {position}: instrument {instrument_id} not found"
                )),
                Some(instrument) if !instrument.is_active => item_errors.push(format!(
                    "Item {position}: instrument \"{}\" is no longer available",
                    instrument.name
                )),
                Some(instrument) if !instrument.in_stock => item_errors.push(format!(
                    "Item {position}: instrument \"{}\" is out of stock",
                    instrument.name
                )),
                Some(instrument) => {
                    lines.push(OrderLine {
                        instrument: instrument.id,
                        quantity: item.quantity.unwrap_or(1) as u32,
                        price: item.price.unwrap_or(instrument.price),
                        instrument_name: instrument.name,
                        instrument_description: instrument.description,
                        instrument_image: instrument.image,
                        category: instrument.category,
                        subcategory: instrument.subcategory,
                        gst: instrument.gst,
                        tax: instrument.tax,
                        delivery_fee: instrument.delivery_fee,
                        discount: instrument.discount,
                    });
                }
            }
        }
        if !item_errors.is_empty() {
            return Err(CommerceError::Validation(item_errors));
        }

        // Step 5: reconcile the claimed total against the line-item sum.
        let calculated: Money = lines.iter().map(OrderLine::line_total).sum();
        if !calculated.reconciles_with(provided_total) {
            return Err(CommerceError::conflict(format!(
                "Order total mismatch: calculated {calculated}, provided {provided_total}"
            )));
        }

        // Step 6: persist.
        let order = Order::new(
            customer,
            lines,
            provided_total,
            address.to_string(),
            req.payment_method,
            req.notes,
        );
        self.orders.insert(order.clone()).await?;
        info!(order_number = %order.order_number, total = %order.total, "order created");
        Ok(order)
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| CommerceError::not_found("Order not found"))
    }

    pub async fn update_order(&self, id: Uuid, patch: OrderPatch) -> Result<Order> {
        let mut order = self.get_order(id).await?;

        if let Some(status) = patch.status {
            order.set_status(status, patch.updated_by.clone());
        }
        if let Some(address) = patch.address {
            order.address = address;
            order.updated_at = Utc::now();
        }
        if let Some(notes) = patch.notes {
            order.notes = Some(notes);
            order.updated_at = Utc::now();
        }
        if let Some(payment_method) = patch.payment_method {
            order.payment_method = Some(payment_method);
            order.updated_at = Utc::now();
        }
        if let Some(tracking_number) = patch.tracking_number {
            order.tracking_number = Some(tracking_number);
            order.updated_at = Utc::now();
        }
        if let Some(estimated_delivery) = patch.estimated_delivery {
            order.estimated_delivery = Some(estimated_delivery);
            order.updated_at = Utc::now();
        }

        self.orders.update(order.clone()).await?;
        Ok(order)
    }

    /// Soft-cancels the order; the record is retained.
    pub async fn cancel_order(&self, id: Uuid, actor: Option<String>) -> Result<Order> {
        let mut order = self.get_order(id).await?;
        order.cancel(actor);
        self.orders.update(order.clone()).await?;
        info!(order_number = %order.order_number, "order cancelled");
        Ok(order)
    }

    pub async fn list_orders(&self, query: OrderListQuery) -> Result<Page<Order>> {
        let mut orders = self.orders.find(&query.filter).await?;

        let sort_by = query.sort_by.as_deref().unwrap_or("createdAt");
        orders.sort_by(|a, b| {
            let ordering = match sort_by {
                "total" => a.total.cmp(&b.total),
                "orderNumber" => a.order_number.cmp(&b.order_number),
                "updatedAt" => a.updated_at.cmp(&b.updated_at),
                _ => a.created_at.cmp(&b.created_at),
            };
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(paginate(orders, query.page, query.limit))
    }

    /// Status/monthly/category/customer-type breakdowns over the filtered
    /// order set.
    pub async fn order_stats(
        &self,
        created_from: Option<DateTime<Utc>>,
        created_until: Option<DateTime<Utc>>,
    ) -> Result<OrderStats> {
        let filter = OrderFilter {
            created_from,
            created_until,
            ..OrderFilter::default()
        };
        let orders = self.orders.find(&filter).await?;

        let mut by_status: HashMap<OrderStatus, (u64, Money)> = HashMap::new();
        let mut by_customer_type: HashMap<&'static str, (u64, Money)> = HashMap::new();
        let mut by_category: HashMap<String, u64> = HashMap::new();
        for order in &orders {
            let status = by_status.entry(order.status).or_insert((0, Money::ZERO));
            status.0 += 1;
            status.1 += order.total;

            let customer_type = by_customer_type
                .entry(order.customer.model())
                .or_insert((0, Money::ZERO));
            customer_type.0 += 1;
            customer_type.1 += order.total;

            for line in &order.items {
                *by_category.entry(line.category.clone()).or_insert(0) += u64::from(line.quantity);
            }
        }

        const STATUS_ORDER: [OrderStatus; 6] = [
            OrderStatus::Processing,
            OrderStatus::Confirmed,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
            OrderStatus::Refunded,
        ];
        let by_status = STATUS_ORDER
            .into_iter()
            .filter_map(|status| {
                by_status.get(&status).map(|(count, total)| StatusBucket {
                    status,
                    count: *count,
                    total: *total,
                    average: Money::new((total.value() / Decimal::from(*count)).round_dp(2)),
                })
            })
            .collect();

        let monthly_trend = monthly_trend(&orders, Utc::now());

        let mut top_categories: Vec<CategoryBucket> = by_category
            .into_iter()
            .map(|(category, quantity)| CategoryBucket { category, quantity })
            .collect();
        top_categories.sort_by(|a, b| {
            b.quantity
                .cmp(&a.quantity)
                .then_with(|| a.category.cmp(&b.category))
        });
        top_categories.truncate(10);

        let mut by_customer_type: Vec<CustomerTypeBucket> = by_customer_type
            .into_iter()
            .map(|(customer_type, (count, total))| CustomerTypeBucket {
                customer_type: customer_type.to_string(),
                count,
                total,
            })
            .collect();
        by_customer_type.sort_by(|a, b| a.customer_type.cmp(&b.customer_type));

        Ok(OrderStats {
            by_status,
            monthly_trend,
            top_categories,
            by_customer_type,
        })
    }
}

/// Zero-filled buckets for the most recent 12 calendar months, oldest first.
fn monthly_trend(orders: &[Order], now: DateTime<Utc>) -> Vec<MonthlyBucket> {
    let mut months = Vec::with_capacity(12);
    let (mut year, mut month) = (now.year(), now.month());
    for _ in 0..12 {
        months.push((year, month));
        if month == 1 {
            year -= 1;
            month = 12;
        } else {
            month -= 1;
        }
    }
    months.reverse();

    months
        .into_iter()
        .map(|(year, month)| {
            let mut bucket = MonthlyBucket {
                year,
                month,
                count: 0,
                total: Money::ZERO,
            };
            for order in orders {
                if order.created_at.year() == year && order.created_at.month() == month {
                    bucket.count += 1;
                    bucket.total += order.total;
                }
            }
            bucket
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn order_at(ts: DateTime<Utc>, total: Money) -> Order {
        let mut order = Order::new(
            CustomerRef::User(Uuid::new_v4()),
            vec![],
            total,
            "12 Raga Lane".to_string(),
            None,
            None,
        );
        order.created_at = ts;
        order
    }

    #[test]
    fn test_monthly_trend_covers_twelve_months() {
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let orders = vec![
            order_at(
                Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap(),
                Money::new(dec!(100)),
            ),
            order_at(
                Utc.with_ymd_and_hms(2026, 2, 10, 0, 0, 0).unwrap(),
                Money::new(dec!(200)),
            ),
            // Outside the window, must not appear
            order_at(
                Utc.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap(),
                Money::new(dec!(999)),
            ),
        ];

        let trend = monthly_trend(&orders, now);
        assert_eq!(trend.len(), 12);
        assert_eq!((trend[0].year, trend[0].month), (2025, 4));
        assert_eq!((trend[11].year, trend[11].month), (2026, 3));
        assert_eq!(trend[11].count, 1);
        assert_eq!(trend[11].total, Money::new(dec!(100)));
        assert_eq!(trend[10].total, Money::new(dec!(200)));
        let window_total: u64 = trend.iter().map(|b| b.count).sum();
        assert_eq!(window_total, 2);
    }

    #[test]
    fn test_monthly_trend_wraps_year_boundary() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 0, 0, 0).unwrap();
        let trend = monthly_trend(&[], now);
        assert_eq!((trend[0].year, trend[0].month), (2025, 2));
        assert_eq!((trend[11].year, trend[11].month), (2026, 1));
    }
}
