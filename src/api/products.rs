//! Product admin plus the per-product testimonials and PIX copy.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use super::{ApiJson, ApiResult, AppState, ListParams, PaginatedResponse};
use crate::domain::aggregates::{
    pix_copy, PixMessage, PixMessageInput, PixSection, PixSectionInput, Product, ProductInput, Testimonial,
    TestimonialInput,
};
use crate::CheckoutError;

async fn load(s: &AppState, id: Uuid) -> ApiResult<Product> {
    Ok(s.store.product(id).await?.ok_or(CheckoutError::NotFound("Produto"))?)
}

async fn ensure_slug_free(s: &AppState, p: &Product) -> ApiResult<()> {
    match s.store.product_by_slug(&p.slug).await? {
        Some(other) if other.id != p.id => Err(CheckoutError::slug_taken(&p.slug).into()),
        _ => Ok(()),
    }
}

pub async fn list_products(State(s): State<AppState>, Query(p): Query<ListParams>) -> ApiResult<Json<PaginatedResponse<Product>>> {
    let page = p.page();
    let (data, total) = s.store.list_products(&page).await?;
    Ok(Json(PaginatedResponse { data, total, page: page.page }))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Product>> {
    Ok(Json(load(&s, id).await?))
}

pub async fn create_product(State(s): State<AppState>, ApiJson(r): ApiJson<ProductInput>) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = Product::create(r)?;
    ensure_slug_free(&s, &product).await?;
    let saved = s.store.insert_product(&product).await?;
    tracing::info!(product_id = %saved.id, slug = %saved.slug, "product created");
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn update_product(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<ProductInput>) -> ApiResult<Json<Product>> {
    let mut product = load(&s, id).await?;
    product.apply(r)?;
    ensure_slug_free(&s, &product).await?;
    let saved = s.store.update_product(&product).await?.ok_or(CheckoutError::NotFound("Produto"))?;
    Ok(Json(saved))
}

pub async fn delete_product(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !s.store.delete_product(id).await? { return Err(CheckoutError::NotFound("Produto").into()); }
    tracing::info!(product_id = %id, "product deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_testimonials(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<Testimonial>>> {
    Ok(Json(s.store.testimonials_for(id).await?))
}

pub async fn create_testimonial(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<TestimonialInput>) -> ApiResult<(StatusCode, Json<Testimonial>)> {
    let product = load(&s, id).await?;
    let testimonial = Testimonial::create(product.id, r)?;
    Ok((StatusCode::CREATED, Json(s.store.insert_testimonial(&testimonial).await?)))
}

pub async fn update_testimonial(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<TestimonialInput>) -> ApiResult<Json<Testimonial>> {
    let mut testimonial = s.store.testimonial(id).await?.ok_or(CheckoutError::NotFound("Depoimento"))?;
    testimonial.apply(r)?;
    let saved = s.store.update_testimonial(&testimonial).await?.ok_or(CheckoutError::NotFound("Depoimento"))?;
    Ok(Json(saved))
}

pub async fn delete_testimonial(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<StatusCode> {
    if !s.store.delete_testimonial(id).await? { return Err(CheckoutError::NotFound("Depoimento").into()); }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_pix_messages(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<PixMessage>>> {
    Ok(Json(s.store.pix_messages_for(id).await?))
}

pub async fn put_pix_messages(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<Vec<PixMessageInput>>) -> ApiResult<Json<Vec<PixMessage>>> {
    let product = load(&s, id).await?;
    let messages = pix_copy::message_set(product.id, r)?;
    Ok(Json(s.store.replace_pix_messages(product.id, &messages).await?))
}

pub async fn get_pix_sections(State(s): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Vec<PixSection>>> {
    Ok(Json(s.store.pix_sections_for(id).await?))
}

pub async fn put_pix_sections(State(s): State<AppState>, Path(id): Path<Uuid>, ApiJson(r): ApiJson<Vec<PixSectionInput>>) -> ApiResult<Json<Vec<PixSection>>> {
    let product = load(&s, id).await?;
    let sections = pix_copy::section_set(product.id, r)?;
    Ok(Json(s.store.replace_pix_sections(product.id, &sections).await?))
}
