use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

use super::{ApiResult, AppState};
use crate::domain::dashboard::{DashboardSummary, Totals, DEFAULT_DAYS};

#[derive(Debug, Deserialize)] pub struct DashboardParams { pub dias: Option<u32> }

pub async fn dashboard(State(s): State<AppState>, Query(p): Query<DashboardParams>) -> ApiResult<Json<DashboardSummary>> {
    let sales = s.store.all_sales().await?;
    let products = s.store.all_products().await?;
    let totals = Totals {
        clientes: u64::try_from(s.store.count_customers().await?).unwrap_or(0),
        cartoes: u64::try_from(s.store.count_card_captures().await?).unwrap_or(0),
    };
    let today = Utc::now().date_naive();
    Ok(Json(DashboardSummary::build(&sales, &products, totals, today, p.dias.unwrap_or(DEFAULT_DAYS))))
}
