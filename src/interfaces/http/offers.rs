use super::AppState;
use super::error::ApiError;
use crate::application::offers::{NewOfferRequest, OfferPatch};
use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use uuid::Uuid;

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<NewOfferRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state.offers.create_offer(req).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": offer })),
    ))
}

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let offers = state.offers.list_offers().await?;
    Ok(Json(json!({ "success": true, "data": offers })))
}

pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state.offers.get_offer(id).await?;
    Ok(Json(json!({ "success": true, "data": offer })))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<OfferPatch>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state.offers.update_offer(id, patch).await?;
    Ok(Json(json!({ "success": true, "data": offer })))
}

pub async fn deactivate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = state.offers.deactivate_offer(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Offer deactivated successfully",
        "data": offer,
    })))
}
