use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;
use tracing::error;

use crate::error::AppError;
use crate::models::{AccountMetric, Period, RiskSummary, TimeSeriesPoint};
use crate::AppState;

#[derive(Deserialize)]
pub struct AccountsQuery {
    pub period: Option<Period>,
}

pub async fn list_accounts(
    State(state): State<AppState>,
    Query(params): Query<AccountsQuery>,
) -> Result<Json<Vec<AccountMetric>>, StatusCode> {
    let period = params.period.unwrap_or(Period::Weekly);
    state
        .account_metrics
        .get_accounts(period)
        .await
        .map(Json)
        .map_err(internal_error)
}

pub async fn account_history(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<TimeSeriesPoint>>, StatusCode> {
    state
        .history
        .get_history(&account_id)
        .await
        .map(Json)
        .map_err(internal_error)
}

pub async fn risk_summary(
    State(state): State<AppState>,
) -> Result<Json<RiskSummary>, StatusCode> {
    state
        .account_metrics
        .get_risk_summary()
        .await
        .map(Json)
        .map_err(internal_error)
}

fn internal_error(err: AppError) -> StatusCode {
    error!("Request failed: {}", err);
    StatusCode::INTERNAL_SERVER_ERROR
}
