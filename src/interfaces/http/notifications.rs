use super::AppState;
use super::error::ApiError;
use crate::application::Page;
use crate::domain::notification::{LiveClass, Notification};
use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

pub async fn live_class(
    State(state): State<AppState>,
    Json(live_class): Json<LiveClass>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state.notifications.notify_live_class(&live_class).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "message": "Notifications dispatched",
            "data": summary,
        })),
    ))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedParams {
    page: Option<u64>,
    limit: Option<u64>,
}

#[derive(Serialize)]
struct FeedEnvelope {
    success: bool,
    #[serde(flatten)]
    page: Page<Notification>,
}

pub async fn for_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<FeedParams>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .notifications
        .user_notifications(user_id, params.page.unwrap_or(1), params.limit.unwrap_or(10))
        .await?;
    Ok(Json(FeedEnvelope {
        success: true,
        page,
    }))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let notification = state.notifications.mark_read(id).await?;
    Ok(Json(json!({ "success": true, "data": notification })))
}
