use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::categories::repo;
use crate::error::ApiError;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/vendors/:vendor_id/categories",
            get(get_vendor_categories).post(add_categories),
        )
        .route(
            "/vendors/:vendor_id/categories/:label_id",
            axum::routing::delete(remove_category),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VendorLabelRequest {
    pub label_ids: Vec<i64>,
}

#[instrument(skip(state))]
pub async fn get_vendor_categories(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
) -> Result<Json<Vec<i64>>, ApiError> {
    Ok(Json(repo::find_label_ids(&state.db, vendor_id).await?))
}

#[instrument(skip(state, payload))]
pub async fn add_categories(
    State(state): State<AppState>,
    Path(vendor_id): Path<Uuid>,
    payload: Result<Json<VendorLabelRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let Json(request) = payload?;
    repo::add_labels(&state.db, vendor_id, &request.label_ids).await?;
    info!(vendor_id = %vendor_id, labels = request.label_ids.len(), "vendor categories added");
    Ok(StatusCode::OK)
}

#[instrument(skip(state))]
pub async fn remove_category(
    State(state): State<AppState>,
    Path((vendor_id, label_id)): Path<(Uuid, i64)>,
) -> Result<StatusCode, ApiError> {
    repo::remove_label(&state.db, vendor_id, label_id).await?;
    info!(vendor_id = %vendor_id, label_id, "vendor category removed");
    Ok(StatusCode::OK)
}
