//! Sales records, masked card records and the brand lookup used by the card form.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiError, ApiJson, ApiResult, AppState, ListParams, PaginatedResponse};
use crate::domain::aggregates::{CardCapture, SaleView};
use crate::domain::value_objects::format::format_card_number;
use crate::domain::value_objects::{CardBrand, PaymentStatus};
use crate::CheckoutError;

pub async fn list_sales(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<PaginatedResponse<SaleView>>> {
    let page = p.page();
    let (sales, total) = s.store.list_sales(&page).await?;
    let customers = s.store.all_customers().await?;
    let products = s.store.all_products().await?;
    Ok(Json(PaginatedResponse { data: SaleView::join(sales, &customers, &products), total, page: page.page }))
}

pub async fn get_sale(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<SaleView>> {
    let sale = s.store.sale(id).await?.ok_or(CheckoutError::NotFound("Venda"))?;
    let customers = s.store.all_customers().await?;
    let products = s.store.all_products().await?;
    SaleView::join(vec![sale], &customers, &products)
        .pop()
        .map(Json)
        .ok_or_else(|| CheckoutError::NotFound("Venda").into())
}

#[derive(Debug, Deserialize)] pub struct StatusUpdate { pub status: String }

pub async fn update_sale_status(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<StatusUpdate>) -> ApiResult<Json<SaleView>> {
    let status = PaymentStatus::parse(&r.status)
        .ok_or_else(|| ApiError::bad_request(format!("Status inválido: '{}'. Use analyzing, approved ou rejected", r.status)))?;
    let mut sale = s.store.sale(id).await?.ok_or(CheckoutError::NotFound("Venda"))?;
    if sale.set_status(status) {
        let events = sale.take_events();
        sale = s.store.update_sale_status(id, status).await?.ok_or(CheckoutError::NotFound("Venda"))?;
        events.iter().for_each(|e| e.trace());
    }
    let customers = s.store.all_customers().await?;
    let products = s.store.all_products().await?;
    let mut views = SaleView::join(vec![sale], &customers, &products);
    views.pop().map(Json).ok_or_else(|| CheckoutError::NotFound("Venda").into())
}

pub async fn delete_sale(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !s.store.delete_sale(id).await? { return Err(CheckoutError::NotFound("Venda").into()); }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_card_captures(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<PaginatedResponse<CardCapture>>> {
    let page = p.page();
    let (data, total) = s.store.list_card_captures(&page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

pub async fn delete_card_capture(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !s.store.delete_card_capture(id).await? { return Err(CheckoutError::NotFound("Cartão").into()); }
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)] pub struct BrandQuery { pub numero: Option<String> }
#[derive(Debug, Serialize)] pub struct BrandResponse { pub bandeira: CardBrand, pub numero_formatado: String }

/// Live brand lookup while the shopper types; the number is neither stored nor logged.
pub async fn detect_brand(Query(q): Query<BrandQuery>) -> Json<BrandResponse> {
    let numero = q.numero.unwrap_or_default();
    Json(BrandResponse { bandeira: CardBrand::detect(&numero), numero_formatado: format_card_number(&numero) })
}
