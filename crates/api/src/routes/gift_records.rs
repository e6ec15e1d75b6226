//! Gift record endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;
use validator::Validate;

use domain::models::gift_record::{
    CreateGiftRecordRequest, GiftCategory, GiftChannel, GiftRecord, ListGiftRecordsQuery,
    UpdateAckRequest, UpdateGiftRecordRequest,
};
use domain::models::statistics::GiftStatistics;
use persistence::repositories::{GiftRecordFilter, GiftRecordUpdate, NewGiftRecord};
use shared::pagination::{Page, PageParams};

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::LedgerService;

/// Response for record mutations: the record plus the statistics that were
/// updated in the same transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRecordMutationResponse {
    pub record: GiftRecord,
    pub statistics: GiftStatistics,
}

/// Response for record deletion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGiftRecordResponse {
    pub deleted: bool,
    pub statistics: GiftStatistics,
}

/// Create a new gift record.
///
/// POST /api/v1/ledgers/:ledger_id/records
pub async fn create_gift_record(
    State(state): State<AppState>,
    Path(ledger_id): Path<Uuid>,
    Json(request): Json<CreateGiftRecordRequest>,
) -> Result<(StatusCode, Json<GiftRecordMutationResponse>), ApiError> {
    request.validate()?;

    let service = LedgerService::new(state.pool.clone());
    let (record, statistics) = service
        .create_record(ledger_id, new_record_fields(request))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(GiftRecordMutationResponse { record, statistics }),
    ))
}

/// List gift records with optional filters, newest gift date first.
///
/// GET /api/v1/ledgers/:ledger_id/records
pub async fn list_gift_records(
    State(state): State<AppState>,
    Path(ledger_id): Path<Uuid>,
    Query(query): Query<ListGiftRecordsQuery>,
) -> Result<Json<Page<GiftRecord>>, ApiError> {
    let params = PageParams::new(query.page, query.size);
    let filter = parse_filter(&query);

    let service = LedgerService::new(state.pool.clone());
    let page = service.list_records(ledger_id, filter, params).await?;
    Ok(Json(page))
}

/// Get a single gift record.
///
/// GET /api/v1/ledgers/:ledger_id/records/:record_id
pub async fn get_gift_record(
    State(state): State<AppState>,
    Path((ledger_id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<GiftRecord>, ApiError> {
    let service = LedgerService::new(state.pool.clone());
    let record = service.get_record(ledger_id, record_id).await?;
    Ok(Json(record))
}

/// Replace a gift record's fields.
///
/// PUT /api/v1/ledgers/:ledger_id/records/:record_id
pub async fn update_gift_record(
    State(state): State<AppState>,
    Path((ledger_id, record_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateGiftRecordRequest>,
) -> Result<Json<GiftRecordMutationResponse>, ApiError> {
    request.validate()?;

    let service = LedgerService::new(state.pool.clone());
    let (record, statistics) = service
        .update_record(ledger_id, record_id, update_record_fields(request))
        .await?;

    Ok(Json(GiftRecordMutationResponse { record, statistics }))
}

/// Update only the acknowledgment state of a record.
///
/// PATCH /api/v1/ledgers/:ledger_id/records/:record_id/ack
pub async fn update_ack_status(
    State(state): State<AppState>,
    Path((ledger_id, record_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateAckRequest>,
) -> Result<Json<GiftRecordMutationResponse>, ApiError> {
    request.validate()?;

    let service = LedgerService::new(state.pool.clone());
    let (record, statistics) = service
        .update_ack(
            ledger_id,
            record_id,
            request.acknowledged,
            request.ack_date,
            request.ack_by,
        )
        .await?;

    Ok(Json(GiftRecordMutationResponse { record, statistics }))
}

/// Delete a gift record.
///
/// DELETE /api/v1/ledgers/:ledger_id/records/:record_id
pub async fn delete_gift_record(
    State(state): State<AppState>,
    Path((ledger_id, record_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<DeleteGiftRecordResponse>, ApiError> {
    let service = LedgerService::new(state.pool.clone());
    let statistics = service.delete_record(ledger_id, record_id).await?;

    Ok(Json(DeleteGiftRecordResponse {
        deleted: true,
        statistics,
    }))
}

fn new_record_fields(request: CreateGiftRecordRequest) -> NewGiftRecord {
    NewGiftRecord {
        donor_name: request.donor_name,
        amount: request.amount,
        category: request.category,
        channel: request.channel,
        contact: request.contact,
        address: request.address,
        note: request.note,
        gift_date: request.gift_date,
        acknowledged: request.acknowledged,
        ack_date: request.ack_date,
        ack_by: request.ack_by,
    }
}

fn update_record_fields(request: UpdateGiftRecordRequest) -> GiftRecordUpdate {
    GiftRecordUpdate {
        donor_name: request.donor_name,
        amount: request.amount,
        category: request.category,
        channel: request.channel,
        contact: request.contact,
        address: request.address,
        note: request.note,
        gift_date: request.gift_date,
        acknowledged: request.acknowledged,
        ack_date: request.ack_date,
        ack_by: request.ack_by,
    }
}

/// Build the repository filter from raw query values.
///
/// Unrecognized category/channel strings degrade to "no filter" with a
/// warning instead of a 400; callers depend on this leniency.
fn parse_filter(query: &ListGiftRecordsQuery) -> GiftRecordFilter {
    let category = query.category.as_deref().and_then(|raw| {
        let parsed = GiftCategory::parse(raw);
        if parsed.is_none() {
            warn!(value = raw, "Ignoring unrecognized category filter");
        }
        parsed
    });

    let channel = query.channel.as_deref().and_then(|raw| {
        let parsed = GiftChannel::parse(raw);
        if parsed.is_none() {
            warn!(value = raw, "Ignoring unrecognized channel filter");
        }
        parsed
    });

    GiftRecordFilter {
        name_contains: query.name.clone().filter(|s| !s.trim().is_empty()),
        category,
        channel,
        date_from: query.date_from,
        date_to: query.date_to,
        acknowledged: query.acknowledged,
    }
}
