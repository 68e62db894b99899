use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::{ApiJson, ApiResult, AppState, ListParams, PaginatedResponse};
use crate::domain::aggregates::{Customer, IdentificationForm};
use crate::CheckoutError;

pub async fn list_customers(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<PaginatedResponse<Customer>>> {
    let page = p.page();
    let (data, total) = s.store.list_customers(&page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

pub async fn create_customer(State(s): State<AppState>, ApiJson(r): ApiJson<IdentificationForm>) -> ApiResult<(StatusCode, Json<Customer>)> {
    let customer = Customer::identify(r)?;
    Ok((StatusCode::CREATED, Json(s.store.insert_customer(&customer).await?)))
}

pub async fn delete_customer(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !s.store.delete_customer(id).await? { return Err(CheckoutError::NotFound("Cliente").into()); }
    Ok(StatusCode::NO_CONTENT)
}
