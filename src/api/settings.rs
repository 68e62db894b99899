//! Checkout configuration endpoints, including the `save-config` function.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use super::{ApiJson, ApiResult, AppState};
use crate::domain::aggregates::{CheckoutConfig, StoredConfig};
use crate::domain::events::DomainEvent;

#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    /// `None` until a config has been saved.
    pub id: Option<Uuid>,
    pub dados: CheckoutConfig,
    pub updated_at: Option<DateTime<Utc>>,
}

pub async fn get_config(State(s): State<AppState>) -> ApiResult<Json<ConfigResponse>> {
    let response = match s.store.latest_config().await? {
        Some(c) => ConfigResponse { id: Some(c.id), dados: c.dados.0, updated_at: Some(c.updated_at) },
        None => ConfigResponse { id: None, dados: CheckoutConfig::default(), updated_at: None },
    };
    Ok(Json(response))
}

/// Validates the required fields, expands the payload to the full config and upserts it.
pub async fn save_config(State(s): State<AppState>, ApiJson(payload): ApiJson<Value>) -> ApiResult<Json<StoredConfig>> {
    let config = StoredConfig::from_payload(&payload)?;
    let saved = s.store.upsert_config(&config).await?;
    DomainEvent::ConfigSaved { config_id: saved.id }.trace();
    Ok(Json(saved))
}
