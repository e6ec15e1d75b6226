//! Gift record repository for database operations.
//!
//! Mutating methods run against a caller-owned transaction so the record
//! write and the statistics write commit or roll back together.

use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::gift_record::{GiftCategory, GiftChannel};

use crate::entities::GiftRecordEntity;
use crate::metrics::QueryTimer;

const RECORD_COLUMNS: &str = "id, ledger_id, donor_name, amount, category, channel, contact, \
     address, note, gift_date, acknowledged, ack_date, ack_by, created_at, updated_at";

/// Field set for inserting a new gift record.
#[derive(Debug, Clone)]
pub struct NewGiftRecord {
    pub donor_name: String,
    pub amount: i64,
    pub category: GiftCategory,
    pub channel: GiftChannel,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub gift_date: NaiveDate,
    pub acknowledged: bool,
    pub ack_date: Option<NaiveDate>,
    pub ack_by: Option<String>,
}

/// Full replacement field set for updating a gift record.
#[derive(Debug, Clone)]
pub struct GiftRecordUpdate {
    pub donor_name: String,
    pub amount: i64,
    pub category: GiftCategory,
    pub channel: GiftChannel,
    pub contact: Option<String>,
    pub address: Option<String>,
    pub note: Option<String>,
    pub gift_date: NaiveDate,
    pub acknowledged: bool,
    pub ack_date: Option<NaiveDate>,
    pub ack_by: Option<String>,
}

/// Optional filters for the record listing query.
///
/// `None` fields mean "no filter". Category/channel strings that fail to
/// parse never reach this struct; the API layer drops them with a warning.
#[derive(Debug, Clone, Default)]
pub struct GiftRecordFilter {
    pub name_contains: Option<String>,
    pub category: Option<GiftCategory>,
    pub channel: Option<GiftChannel>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub acknowledged: Option<bool>,
}

/// Repository for gift-record database operations.
#[derive(Clone)]
pub struct GiftRecordRepository {
    pool: PgPool,
}

impl GiftRecordRepository {
    /// Creates a new GiftRecordRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Insert a new gift record within the caller's transaction.
    pub async fn create(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        record: &NewGiftRecord,
    ) -> Result<GiftRecordEntity, sqlx::Error> {
        let timer = QueryTimer::new("create_gift_record");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            INSERT INTO gift_records
                (ledger_id, donor_name, amount, category, channel, contact, address, note,
                 gift_date, acknowledged, ack_date, ack_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(ledger_id)
        .bind(&record.donor_name)
        .bind(record.amount)
        .bind(record.category.as_str())
        .bind(record.channel.as_str())
        .bind(&record.contact)
        .bind(&record.address)
        .bind(&record.note)
        .bind(record.gift_date)
        .bind(record.acknowledged)
        .bind(record.ack_date)
        .bind(&record.ack_by)
        .fetch_one(&mut **tx)
        .await;
        timer.record();
        result
    }

    /// Replace all mutable fields of a record within the caller's
    /// transaction. Returns `None` when the record does not exist in the
    /// given ledger.
    pub async fn update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        id: Uuid,
        update: &GiftRecordUpdate,
    ) -> Result<Option<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_gift_record");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            UPDATE gift_records
            SET donor_name = $3,
                amount = $4,
                category = $5,
                channel = $6,
                contact = $7,
                address = $8,
                note = $9,
                gift_date = $10,
                acknowledged = $11,
                ack_date = $12,
                ack_by = $13,
                updated_at = NOW()
            WHERE id = $1 AND ledger_id = $2
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(ledger_id)
        .bind(&update.donor_name)
        .bind(update.amount)
        .bind(update.category.as_str())
        .bind(update.channel.as_str())
        .bind(&update.contact)
        .bind(&update.address)
        .bind(&update.note)
        .bind(update.gift_date)
        .bind(update.acknowledged)
        .bind(update.ack_date)
        .bind(&update.ack_by)
        .fetch_optional(&mut **tx)
        .await;
        timer.record();
        result
    }

    /// Update only the acknowledgment fields of a record.
    pub async fn update_ack(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        id: Uuid,
        acknowledged: bool,
        ack_date: Option<NaiveDate>,
        ack_by: Option<&str>,
    ) -> Result<Option<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("update_gift_record_ack");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            UPDATE gift_records
            SET acknowledged = $3,
                ack_date = $4,
                ack_by = $5,
                updated_at = NOW()
            WHERE id = $1 AND ledger_id = $2
            RETURNING {RECORD_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(ledger_id)
        .bind(acknowledged)
        .bind(ack_date)
        .bind(ack_by)
        .fetch_optional(&mut **tx)
        .await;
        timer.record();
        result
    }

    /// Hard-delete a record within the caller's transaction. Returns the
    /// number of rows removed (0 or 1).
    pub async fn delete(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("delete_gift_record");
        let result = sqlx::query(
            r#"
            DELETE FROM gift_records
            WHERE id = $1 AND ledger_id = $2
            "#,
        )
        .bind(id)
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;
        timer.record();
        Ok(result.rows_affected())
    }

    /// Find a record by ID within its ledger.
    pub async fn find_by_id(
        &self,
        ledger_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_gift_record_by_id");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM gift_records
            WHERE id = $1 AND ledger_id = $2
            "#
        ))
        .bind(id)
        .bind(ledger_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Locked before-snapshot of a record inside a mutation's unit of work.
    ///
    /// Takes `FOR UPDATE` on the row: the delta math in the aggregation
    /// engine needs the snapshot to stay the row's true previous state
    /// until the transaction commits.
    pub async fn find_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
        id: Uuid,
    ) -> Result<Option<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_gift_record_for_update");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM gift_records
            WHERE id = $1 AND ledger_id = $2
            FOR UPDATE
            "#
        ))
        .bind(id)
        .bind(ledger_id)
        .fetch_optional(&mut **tx)
        .await;
        timer.record();
        result
    }

    /// All records of a ledger, inside the caller's transaction. Feeds the
    /// top-gift rescan and the full statistics recompute.
    pub async fn find_all_by_ledger_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
    ) -> Result<Vec<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_all_gift_records_by_ledger");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM gift_records
            WHERE ledger_id = $1
            ORDER BY gift_date DESC, created_at DESC
            "#
        ))
        .bind(ledger_id)
        .fetch_all(&mut **tx)
        .await;
        timer.record();
        result
    }

    /// Filtered, paged listing ordered by gift date descending, then
    /// creation time descending.
    pub async fn find_filtered(
        &self,
        ledger_id: Uuid,
        filter: &GiftRecordFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<GiftRecordEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_gift_records_filtered");
        let result = sqlx::query_as::<_, GiftRecordEntity>(&format!(
            r#"
            SELECT {RECORD_COLUMNS}
            FROM gift_records
            WHERE ledger_id = $1
              AND ($2::text IS NULL OR donor_name ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL OR channel = $4)
              AND ($5::date IS NULL OR gift_date >= $5)
              AND ($6::date IS NULL OR gift_date <= $6)
              AND ($7::boolean IS NULL OR acknowledged = $7)
            ORDER BY gift_date DESC, created_at DESC
            LIMIT $8 OFFSET $9
            "#
        ))
        .bind(ledger_id)
        .bind(&filter.name_contains)
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.channel.map(|c| c.as_str()))
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.acknowledged)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Total row count for the same filter set, for the page envelope.
    pub async fn count_filtered(
        &self,
        ledger_id: Uuid,
        filter: &GiftRecordFilter,
    ) -> Result<i64, sqlx::Error> {
        let timer = QueryTimer::new("count_gift_records_filtered");
        let result = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM gift_records
            WHERE ledger_id = $1
              AND ($2::text IS NULL OR donor_name ILIKE '%' || $2 || '%')
              AND ($3::text IS NULL OR category = $3)
              AND ($4::text IS NULL OR channel = $4)
              AND ($5::date IS NULL OR gift_date >= $5)
              AND ($6::date IS NULL OR gift_date <= $6)
              AND ($7::boolean IS NULL OR acknowledged = $7)
            "#,
        )
        .bind(ledger_id)
        .bind(&filter.name_contains)
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.channel.map(|c| c.as_str()))
        .bind(filter.date_from)
        .bind(filter.date_to)
        .bind(filter.acknowledged)
        .fetch_one(&self.pool)
        .await;
        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: GiftRecordRepository tests require a database connection and are
    // covered by integration tests.
}
