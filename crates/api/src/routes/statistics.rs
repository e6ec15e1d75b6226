//! Statistics endpoint handlers.
//!
//! Reads return a zero-valued aggregate (never an error) for ledgers that
//! have no statistics row yet.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use domain::models::statistics::{GiftStatistics, StatisticsSummary};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::LedgerService;

/// Condensed statistics: totals, top gift, date-span metrics.
///
/// GET /api/v1/ledgers/:ledger_id/statistics/summary
pub async fn get_summary_statistics(
    State(state): State<AppState>,
    Path(ledger_id): Path<Uuid>,
) -> Result<Json<StatisticsSummary>, ApiError> {
    let service = LedgerService::new(state.pool.clone());
    let summary = service.summary_statistics(ledger_id).await?;
    Ok(Json(summary))
}

/// Full statistics including category and bucket breakdowns.
///
/// GET /api/v1/ledgers/:ledger_id/statistics
pub async fn get_full_statistics(
    State(state): State<AppState>,
    Path(ledger_id): Path<Uuid>,
) -> Result<Json<GiftStatistics>, ApiError> {
    let service = LedgerService::new(state.pool.clone());
    let stats = service.full_statistics(ledger_id).await?;
    Ok(Json(stats))
}

/// Rebuild the ledger's statistics from its records (drift repair).
///
/// POST /api/v1/ledgers/:ledger_id/statistics/recompute
pub async fn recompute_statistics(
    State(state): State<AppState>,
    Path(ledger_id): Path<Uuid>,
) -> Result<Json<GiftStatistics>, ApiError> {
    let service = LedgerService::new(state.pool.clone());
    let stats = service.recompute_statistics(ledger_id).await?;
    Ok(Json(stats))
}
