use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;
use crate::vendors::dto::{PagedResponse, SaveVendorRequest};
use crate::vendors::repo::{self, Vendor};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/vendor", post(create_vendor).get(list_vendors))
        .route(
            "/vendor/:id",
            get(get_vendor).patch(update_vendor).delete(delete_vendor),
        )
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn vendor_from_request(id: Uuid, request: SaveVendorRequest) -> Vendor {
    Vendor {
        id,
        vendor_name: request.vendor_name,
        point_person: request.point_person,
        email: request.email,
        location: request.location,
        miles: request.miles,
        products: request.products,
        is_active: true,
        is_farmer: request.is_farmer,
        is_produce: request.is_produce,
        woman_owned: request.woman_owned,
        bipoc_owned: request.bipoc_owned,
        veteran_owned: request.veteran_owned,
    }
}

#[instrument(skip(state, payload))]
pub async fn create_vendor(
    State(state): State<AppState>,
    payload: Result<Json<SaveVendorRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vendor>), ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let vendor = vendor_from_request(Uuid::new_v4(), request);
    repo::insert(&state.db, &vendor).await?;
    info!(vendor_id = %vendor.id, vendor = %vendor.vendor_name, "vendor created");
    Ok((StatusCode::CREATED, Json(vendor)))
}

#[instrument(skip(state))]
pub async fn list_vendors(
    State(state): State<AppState>,
    Query(params): Query<PageParams>,
) -> Result<Json<PagedResponse<Vendor>>, ApiError> {
    let data = repo::find_active_paged(&state.db, params.page, params.size).await?;
    let total = repo::count_active(&state.db).await?;
    Ok(Json(PagedResponse::new(data, params.page, params.size, total)))
}

#[instrument(skip(state))]
pub async fn get_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vendor>, ApiError> {
    let vendor = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(vendor))
}

#[instrument(skip(state, payload))]
pub async fn update_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: Result<Json<SaveVendorRequest>, JsonRejection>,
) -> Result<Json<Vendor>, ApiError> {
    let Json(request) = payload?;
    request.validate()?;
    let vendor = vendor_from_request(id, request);
    repo::update(&state.db, &vendor).await?;
    // Re-read rather than trusting the affected-row count: MySQL reports zero
    // rows for updates that change nothing.
    let vendor = repo::find_by_id(&state.db, id)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(vendor_id = %id, "vendor updated");
    Ok(Json(vendor))
}

#[instrument(skip(state))]
pub async fn delete_vendor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    repo::soft_delete(&state.db, id).await?;
    info!(vendor_id = %id, "vendor deactivated");
    Ok(StatusCode::NO_CONTENT)
}
