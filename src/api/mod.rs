//! HTTP surface: storefront routes, admin API and the `save-config` function.

pub mod customers;
pub mod dashboard;
pub mod error;
pub mod products;
pub mod sales;
pub mod settings;
pub mod storefront;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::domain::aggregates::CheckoutConfig;
use crate::store::{Page, Store};
pub use error::{ApiError, ApiJson};

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Clone)]
pub struct AppState { pub store: Arc<dyn Store> }

impl AppState {
    pub fn new(store: Arc<dyn Store>) -> Self { Self { store } }

    /// Latest saved config, or the defaults before anything was saved.
    pub async fn checkout_config(&self) -> crate::Result<CheckoutConfig> {
        Ok(self.store.latest_config().await?.map(|c| c.dados.0).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)] pub struct ListParams { pub page: Option<u32>, pub per_page: Option<u32>, pub search: Option<String> }
#[derive(Debug, Serialize)] pub struct PaginatedResponse<T> { pub data: Vec<T>, pub total: i64, pub page: u32 }

impl ListParams {
    pub fn page(self) -> Page { Page::new(self.page, self.per_page, self.search) }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/checkout/:slug", get(storefront::checkout_page))
        .route("/checkout/:slug/pix", post(storefront::pay_with_pix))
        .route("/checkout/:slug/cartao", post(storefront::pay_with_card))
        .route("/payment-status/:slug", get(storefront::payment_status_default))
        .route("/payment-status/:slug/:status", get(storefront::payment_status))
        .route("/functions/v1/save-config", post(settings::save_config))
        .route("/api/v1/config", get(settings::get_config).put(settings::save_config))
        .route("/api/v1/produtos", get(products::list_products).post(products::create_product))
        .route("/api/v1/produtos/:id", get(products::get_product).put(products::update_product).delete(products::delete_product))
        .route("/api/v1/produtos/:id/depoimentos", get(products::list_testimonials).post(products::create_testimonial))
        .route("/api/v1/depoimentos/:id", put(products::update_testimonial).delete(products::delete_testimonial))
        .route("/api/v1/produtos/:id/pix-mensagens", get(products::get_pix_messages).put(products::put_pix_messages))
        .route("/api/v1/produtos/:id/pix-secoes", get(products::get_pix_sections).put(products::put_pix_sections))
        .route("/api/v1/clientes", get(customers::list_customers).post(customers::create_customer))
        .route("/api/v1/clientes/:id", delete(customers::delete_customer))
        .route("/api/v1/vendas", get(sales::list_sales))
        .route("/api/v1/vendas/:id", get(sales::get_sale).delete(sales::delete_sale))
        .route("/api/v1/vendas/:id/status", put(sales::update_sale_status))
        .route("/api/v1/cartoes", get(sales::list_card_captures))
        .route("/api/v1/cartoes/:id", delete(sales::delete_card_capture))
        .route("/api/v1/bandeira", get(sales::detect_brand))
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health(State(s): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    match s.store.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "healthy", "service": "pix-checkout"}))),
        Err(e) => {
            tracing::warn!(error = %e, "health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, Json(serde_json::json!({"status": "unhealthy", "service": "pix-checkout"})))
        }
    }
}
