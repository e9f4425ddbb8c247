use super::AppState;
use super::error::ApiError;
use crate::application::payments::{PaymentAmendment, PaymentReportQuery, ProcessPaymentRequest};
use crate::domain::payment::PaymentStatus;
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BreakdownBody {
    coupon_code: Option<String>,
}

pub async fn breakdown(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    body: Option<Json<BreakdownBody>>,
) -> Result<impl IntoResponse, ApiError> {
    let coupon_code = body.and_then(|Json(body)| body.coupon_code);
    let breakdown = state
        .payments
        .calculate_breakdown(course_id, coupon_code.as_deref())
        .await?;
    Ok(Json(json!({ "success": true, "data": breakdown })))
}

pub async fn process(
    State(state): State<AppState>,
    Json(req): Json<ProcessPaymentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.payments.process_payment(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Payment processed successfully",
            "data": payment.masked(),
        })),
    ))
}

pub async fn all(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let payments = state.payments.all_payments().await?;
    Ok(Json(json!({ "success": true, "data": payments })))
}

pub async fn history(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let payments = state.payments.payment_history(user_id).await?;
    let masked: Vec<_> = payments.into_iter().map(|p| p.masked()).collect();
    Ok(Json(json!({ "success": true, "data": masked })))
}

pub async fn purchased(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let courses = state.payments.purchased_courses(user_id).await?;
    Ok(Json(json!({ "success": true, "data": courses })))
}

pub async fn report(
    State(state): State<AppState>,
    Query(query): Query<PaymentReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = state.payments.payment_report(query).await?;
    Ok(Json(json!({ "success": true, "data": report })))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    status: PaymentStatus,
}

pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<StatusBody>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.payments.update_status(id, body.status).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment status updated successfully",
        "data": payment.masked(),
    })))
}

pub async fn update_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(amendment): Json<PaymentAmendment>,
) -> Result<impl IntoResponse, ApiError> {
    let payment = state.payments.update_details(id, amendment).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Payment updated successfully",
        "data": payment.masked(),
    })))
}
