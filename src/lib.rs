//! PIX Checkout - configurable checkout storefront
//!
//! Merchants shape a payment page for each product; shoppers identify
//! themselves, pay by PIX or card and land on a status page.
//!
//! ## Features
//! - Product catalog with PIX receiving data and banners
//! - Checkout configuration (colors, texts, timers, visitor counter, status panels)
//! - Identification, PIX and card payment flows
//! - Customers, sales and masked card records for the admin
//! - Dashboard aggregates

pub mod api;
pub mod config;
pub mod domain;
pub mod store;

use thiserror::Error;

// =============================================================================
// Error Types
// =============================================================================

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("{0} não encontrado")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Configuração inválida: {0}")]
    InvalidConfig(String),

    #[error("Erro de armazenamento: {0}")]
    Storage(String),
}

impl From<sqlx::Error> for CheckoutError {
    fn from(e: sqlx::Error) -> Self { CheckoutError::Storage(e.to_string()) }
}

impl From<validator::ValidationErrors> for CheckoutError {
    fn from(e: validator::ValidationErrors) -> Self { CheckoutError::Validation(e.to_string()) }
}

impl CheckoutError {
    pub fn slug_taken(slug: &str) -> Self { CheckoutError::Validation(format!("O slug '{}' já está em uso", slug)) }
}

pub type Result<T> = std::result::Result<T, CheckoutError>;
