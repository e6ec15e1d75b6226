//! Ledger unit-of-work service.
//!
//! Every record mutation and its statistics update run in one database
//! transaction: the record write, a row lock on the ledger's aggregate, the
//! pure aggregation step, and the aggregate write commit or roll back
//! together. The aggregate row lock serializes concurrent mutations per
//! ledger; ledgers do not contend with each other.

use sqlx::{PgPool, Postgres, Transaction};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use domain::models::gift_record::GiftRecord;
use domain::models::statistics::{GiftStatistics, StatisticsSummary};
use domain::services::aggregation;
use persistence::repositories::{
    GiftRecordFilter, GiftRecordRepository, GiftRecordUpdate, NewGiftRecord, StatisticsRepository,
};
use shared::pagination::{Page, PageParams};

use crate::middleware::metrics::{record_gift_created, record_statistics_recomputed};

/// Errors surfaced by the ledger service.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// The combined record+statistics transaction could not complete.
    #[error("Mutation failed: {0}")]
    Mutation(#[from] sqlx::Error),
}

fn record_not_found() -> LedgerError {
    LedgerError::NotFound("Gift record not found".into())
}

/// Orchestrates gift-record mutations and keeps the per-ledger statistics
/// aggregate consistent with them.
#[derive(Clone)]
pub struct LedgerService {
    records: GiftRecordRepository,
    statistics: StatisticsRepository,
    pool: PgPool,
}

impl LedgerService {
    pub fn new(pool: PgPool) -> Self {
        Self {
            records: GiftRecordRepository::new(pool.clone()),
            statistics: StatisticsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Persist a new gift record and fold it into the ledger's statistics.
    pub async fn create_record(
        &self,
        ledger_id: Uuid,
        new: NewGiftRecord,
    ) -> Result<(GiftRecord, GiftStatistics), LedgerError> {
        // The engine's arithmetic is defined for non-negative amounts only;
        // request validation should already have rejected this.
        if new.amount < 0 {
            return Err(LedgerError::Validation("Amount must be non-negative".into()));
        }

        let mut tx = self.pool.begin().await?;

        let record: GiftRecord = self.records.create(&mut tx, ledger_id, &new).await?.into();
        let current: GiftStatistics = self.statistics.lock_or_init(&mut tx, ledger_id).await?.into();
        let updated = aggregation::apply_create(current, &record);
        let stored: GiftStatistics = self.statistics.upsert(&mut tx, &updated).await?.into();

        tx.commit().await?;
        record_gift_created(record.amount);

        info!(
            ledger_id = %ledger_id,
            record_id = %record.id,
            amount = record.amount,
            category = %record.category,
            "Gift record created"
        );
        Ok((record, stored))
    }

    /// Replace a record's fields and apply the before/after delta to the
    /// ledger's statistics.
    pub async fn update_record(
        &self,
        ledger_id: Uuid,
        id: Uuid,
        update: GiftRecordUpdate,
    ) -> Result<(GiftRecord, GiftStatistics), LedgerError> {
        if update.amount < 0 {
            return Err(LedgerError::Validation("Amount must be non-negative".into()));
        }

        let mut tx = self.pool.begin().await?;

        let old: GiftRecord = self
            .records
            .find_by_id_for_update(&mut tx, ledger_id, id)
            .await?
            .ok_or_else(record_not_found)?
            .into();
        let new_record: GiftRecord = self
            .records
            .update(&mut tx, ledger_id, id, &update)
            .await?
            .ok_or_else(record_not_found)?
            .into();

        let records = self.fetch_ledger_records(&mut tx, ledger_id).await?;
        let current: GiftStatistics = self.statistics.lock_or_init(&mut tx, ledger_id).await?.into();
        let updated = aggregation::apply_update(current, &old, &new_record, &records);
        let stored: GiftStatistics = self.statistics.upsert(&mut tx, &updated).await?.into();

        tx.commit().await?;

        info!(
            ledger_id = %ledger_id,
            record_id = %id,
            amount_before = old.amount,
            amount_after = new_record.amount,
            "Gift record updated"
        );
        Ok((new_record, stored))
    }

    /// Restricted-field update of the acknowledgment state. Acknowledgment
    /// metadata is cleared when the flag goes back to false.
    pub async fn update_ack(
        &self,
        ledger_id: Uuid,
        id: Uuid,
        acknowledged: bool,
        ack_date: Option<chrono::NaiveDate>,
        ack_by: Option<String>,
    ) -> Result<(GiftRecord, GiftStatistics), LedgerError> {
        let mut tx = self.pool.begin().await?;

        let old: GiftRecord = self
            .records
            .find_by_id_for_update(&mut tx, ledger_id, id)
            .await?
            .ok_or_else(record_not_found)?
            .into();

        let (ack_date, ack_by) = if acknowledged {
            (ack_date, ack_by)
        } else {
            (None, None)
        };
        let new_record: GiftRecord = self
            .records
            .update_ack(&mut tx, ledger_id, id, acknowledged, ack_date, ack_by.as_deref())
            .await?
            .ok_or_else(record_not_found)?
            .into();

        let records = self.fetch_ledger_records(&mut tx, ledger_id).await?;
        let current: GiftStatistics = self.statistics.lock_or_init(&mut tx, ledger_id).await?.into();
        let updated = aggregation::apply_update(current, &old, &new_record, &records);
        let stored: GiftStatistics = self.statistics.upsert(&mut tx, &updated).await?.into();

        tx.commit().await?;

        info!(
            ledger_id = %ledger_id,
            record_id = %id,
            acknowledged = acknowledged,
            "Acknowledgment state updated"
        );
        Ok((new_record, stored))
    }

    /// Hard-delete a record and subtract it from the ledger's statistics.
    pub async fn delete_record(
        &self,
        ledger_id: Uuid,
        id: Uuid,
    ) -> Result<GiftStatistics, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let old: GiftRecord = self
            .records
            .find_by_id_for_update(&mut tx, ledger_id, id)
            .await?
            .ok_or_else(record_not_found)?
            .into();
        let removed = self.records.delete(&mut tx, ledger_id, id).await?;
        if removed == 0 {
            return Err(record_not_found());
        }

        let remaining = self.fetch_ledger_records(&mut tx, ledger_id).await?;
        let current: GiftStatistics = self.statistics.lock_or_init(&mut tx, ledger_id).await?.into();
        let updated = aggregation::apply_delete(current, &old, &remaining);
        let stored: GiftStatistics = self.statistics.upsert(&mut tx, &updated).await?.into();

        tx.commit().await?;

        info!(
            ledger_id = %ledger_id,
            record_id = %id,
            amount = old.amount,
            "Gift record deleted"
        );
        Ok(stored)
    }

    /// Rebuild the ledger's statistics from its records, overwriting the
    /// stored aggregate. Used for initial backfill and drift repair; the
    /// previous aggregate's values are never read.
    pub async fn recompute_statistics(
        &self,
        ledger_id: Uuid,
    ) -> Result<GiftStatistics, LedgerError> {
        let mut tx = self.pool.begin().await?;

        let records = self.fetch_ledger_records(&mut tx, ledger_id).await?;
        // Lock only; the rebuilt aggregate replaces every column.
        self.statistics.lock_or_init(&mut tx, ledger_id).await?;
        let rebuilt = aggregation::recompute(ledger_id, &records);
        let stored: GiftStatistics = self.statistics.upsert(&mut tx, &rebuilt).await?.into();

        tx.commit().await?;
        record_statistics_recomputed();

        info!(
            ledger_id = %ledger_id,
            records = records.len(),
            "Ledger statistics recomputed"
        );
        Ok(stored)
    }

    /// Fetch a single record.
    pub async fn get_record(&self, ledger_id: Uuid, id: Uuid) -> Result<GiftRecord, LedgerError> {
        self.records
            .find_by_id(ledger_id, id)
            .await?
            .map(Into::into)
            .ok_or_else(record_not_found)
    }

    /// Filtered, paged record listing.
    pub async fn list_records(
        &self,
        ledger_id: Uuid,
        filter: GiftRecordFilter,
        params: PageParams,
    ) -> Result<Page<GiftRecord>, LedgerError> {
        let entities = self
            .records
            .find_filtered(ledger_id, &filter, params.limit(), params.offset())
            .await?;
        let total = self.records.count_filtered(ledger_id, &filter).await?;
        let items: Vec<GiftRecord> = entities.into_iter().map(Into::into).collect();
        Ok(Page::new(items, params, total))
    }

    /// Condensed statistics; zero-valued when no aggregate row exists yet.
    pub async fn summary_statistics(
        &self,
        ledger_id: Uuid,
    ) -> Result<StatisticsSummary, LedgerError> {
        let stats = self.full_statistics(ledger_id).await?;
        Ok(StatisticsSummary::from(&stats))
    }

    /// Full statistics; zero-valued when no aggregate row exists yet.
    pub async fn full_statistics(&self, ledger_id: Uuid) -> Result<GiftStatistics, LedgerError> {
        Ok(self
            .statistics
            .find_by_ledger(ledger_id)
            .await?
            .map(Into::into)
            .unwrap_or_else(|| GiftStatistics::zeroed(ledger_id)))
    }

    async fn fetch_ledger_records(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
    ) -> Result<Vec<GiftRecord>, sqlx::Error> {
        Ok(self
            .records
            .find_all_by_ledger_tx(tx, ledger_id)
            .await?
            .into_iter()
            .map(Into::into)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    // Note: LedgerService tests require a database connection and are
    // covered by integration tests; the aggregation arithmetic itself is
    // unit-tested in the domain crate.
}
