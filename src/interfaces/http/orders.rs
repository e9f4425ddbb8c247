use super::AppState;
use super::error::ApiError;
use crate::application::checkout::{NewOrderRequest, OrderListQuery, OrderPatch};
use crate::application::{Page, SortOrder};
use crate::domain::order::{CustomerRef, Order, OrderStatus};
use crate::domain::ports::OrderFilter;
use crate::error::CommerceError;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize)]
struct OrderEnvelope {
    success: bool,
    data: Order,
}

#[derive(Serialize)]
struct PageEnvelope<T> {
    success: bool,
    #[serde(flatten)]
    page: Page<T>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewOrderRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.checkout.create_order(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(OrderEnvelope {
            success: true,
            data: order,
        }),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListParams {
    customer: Option<Uuid>,
    customer_type: Option<String>,
    status: Option<OrderStatus>,
    page: Option<u64>,
    limit: Option<u64>,
    sort_by: Option<String>,
    sort_order: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, ApiError> {
    let customer = if params.customer.is_some() || params.customer_type.is_some() {
        let customer = CustomerRef::from_parts(params.customer, params.customer_type.as_deref())
            .map_err(CommerceError::validation)?;
        Some(customer)
    } else {
        None
    };

    let query = OrderListQuery {
        filter: OrderFilter {
            customer,
            status: params.status,
            created_from: params.start_date,
            created_until: params.end_date,
        },
        page: params.page.unwrap_or(1),
        limit: params.limit.unwrap_or(10),
        sort_by: params.sort_by,
        sort_order: match params.sort_order.as_deref() {
            Some("asc") => SortOrder::Asc,
            _ => SortOrder::Desc,
        },
    };
    let page = state.checkout.list_orders(query).await?;
    Ok(Json(PageEnvelope {
        success: true,
        page,
    }))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.checkout.get_order(id).await?;
    Ok(Json(OrderEnvelope {
        success: true,
        data: order,
    }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<OrderPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.checkout.update_order(id, patch).await?;
    Ok(Json(OrderEnvelope {
        success: true,
        data: order,
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancelParams {
    cancelled_by: Option<String>,
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<CancelParams>,
) -> Result<impl IntoResponse, ApiError> {
    let order = state.checkout.cancel_order(id, params.cancelled_by).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Order cancelled successfully",
        "data": order,
    })))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsParams {
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
}

pub async fn stats(
    State(state): State<AppState>,
    Query(params): Query<StatsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state
        .checkout
        .order_stats(params.start_date, params.end_date)
        .await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": stats,
    })))
}
