//! Statistics repository for database operations.
//!
//! One aggregate row exists per ledger (`UNIQUE (ledger_id)`). Mutations
//! lock that row for the duration of their transaction so concurrent writes
//! against the same ledger serialize; different ledgers are independent.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use domain::models::gift_record::GiftCategory;
use domain::models::statistics::{AmountBucket, GiftStatistics};

use crate::entities::GiftStatisticsEntity;
use crate::metrics::QueryTimer;

const STATISTICS_COLUMNS: &str = "id, ledger_id, total_amount, total_count, pending_ack_count, \
     family_amount, family_count, relative_amount, relative_count, \
     friend_amount, friend_count, colleague_amount, colleague_count, \
     acquaintance_amount, acquaintance_count, other_amount, other_count, \
     bucket_under_30k, bucket_30k_to_50k, bucket_50k_to_100k, \
     bucket_100k_to_200k, bucket_200k_to_500k, bucket_over_500k, \
     top_record_id, top_donor_name, top_amount, \
     first_gift_date, last_gift_date, day_span, daily_average, \
     created_at, updated_at";

/// Repository for per-ledger statistics rows.
#[derive(Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    /// Creates a new StatisticsRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find the aggregate row for a ledger, if one exists yet.
    pub async fn find_by_ledger(
        &self,
        ledger_id: Uuid,
    ) -> Result<Option<GiftStatisticsEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_statistics_by_ledger");
        let result = sqlx::query_as::<_, GiftStatisticsEntity>(&format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM gift_statistics
            WHERE ledger_id = $1
            "#
        ))
        .bind(ledger_id)
        .fetch_optional(&self.pool)
        .await;
        timer.record();
        result
    }

    /// Ensure the aggregate row exists, then lock it for the transaction.
    ///
    /// The insert-if-absent step makes the subsequent `FOR UPDATE` reliable
    /// even for a ledger's very first mutation: without it, two concurrent
    /// first mutations would both see an absent row and race their writes.
    pub async fn lock_or_init(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        ledger_id: Uuid,
    ) -> Result<GiftStatisticsEntity, sqlx::Error> {
        let timer = QueryTimer::new("lock_or_init_statistics");

        sqlx::query(
            r#"
            INSERT INTO gift_statistics (ledger_id)
            VALUES ($1)
            ON CONFLICT (ledger_id) DO NOTHING
            "#,
        )
        .bind(ledger_id)
        .execute(&mut **tx)
        .await?;

        let result = sqlx::query_as::<_, GiftStatisticsEntity>(&format!(
            r#"
            SELECT {STATISTICS_COLUMNS}
            FROM gift_statistics
            WHERE ledger_id = $1
            FOR UPDATE
            "#
        ))
        .bind(ledger_id)
        .fetch_one(&mut **tx)
        .await;

        timer.record();
        result
    }

    /// Write the aggregate value, replacing every statistics column.
    pub async fn upsert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        stats: &GiftStatistics,
    ) -> Result<GiftStatisticsEntity, sqlx::Error> {
        let timer = QueryTimer::new("upsert_statistics");

        let family = stats.category_stat(GiftCategory::Family);
        let relative = stats.category_stat(GiftCategory::Relative);
        let friend = stats.category_stat(GiftCategory::Friend);
        let colleague = stats.category_stat(GiftCategory::Colleague);
        let acquaintance = stats.category_stat(GiftCategory::Acquaintance);
        let other = stats.category_stat(GiftCategory::Other);

        let result = sqlx::query_as::<_, GiftStatisticsEntity>(&format!(
            r#"
            INSERT INTO gift_statistics
                (ledger_id, total_amount, total_count, pending_ack_count,
                 family_amount, family_count, relative_amount, relative_count,
                 friend_amount, friend_count, colleague_amount, colleague_count,
                 acquaintance_amount, acquaintance_count, other_amount, other_count,
                 bucket_under_30k, bucket_30k_to_50k, bucket_50k_to_100k,
                 bucket_100k_to_200k, bucket_200k_to_500k, bucket_over_500k,
                 top_record_id, top_donor_name, top_amount,
                 first_gift_date, last_gift_date, day_span, daily_average)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                    $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26,
                    $27, $28, $29)
            ON CONFLICT (ledger_id) DO UPDATE SET
                total_amount = EXCLUDED.total_amount,
                total_count = EXCLUDED.total_count,
                pending_ack_count = EXCLUDED.pending_ack_count,
                family_amount = EXCLUDED.family_amount,
                family_count = EXCLUDED.family_count,
                relative_amount = EXCLUDED.relative_amount,
                relative_count = EXCLUDED.relative_count,
                friend_amount = EXCLUDED.friend_amount,
                friend_count = EXCLUDED.friend_count,
                colleague_amount = EXCLUDED.colleague_amount,
                colleague_count = EXCLUDED.colleague_count,
                acquaintance_amount = EXCLUDED.acquaintance_amount,
                acquaintance_count = EXCLUDED.acquaintance_count,
                other_amount = EXCLUDED.other_amount,
                other_count = EXCLUDED.other_count,
                bucket_under_30k = EXCLUDED.bucket_under_30k,
                bucket_30k_to_50k = EXCLUDED.bucket_30k_to_50k,
                bucket_50k_to_100k = EXCLUDED.bucket_50k_to_100k,
                bucket_100k_to_200k = EXCLUDED.bucket_100k_to_200k,
                bucket_200k_to_500k = EXCLUDED.bucket_200k_to_500k,
                bucket_over_500k = EXCLUDED.bucket_over_500k,
                top_record_id = EXCLUDED.top_record_id,
                top_donor_name = EXCLUDED.top_donor_name,
                top_amount = EXCLUDED.top_amount,
                first_gift_date = EXCLUDED.first_gift_date,
                last_gift_date = EXCLUDED.last_gift_date,
                day_span = EXCLUDED.day_span,
                daily_average = EXCLUDED.daily_average,
                updated_at = NOW()
            RETURNING {STATISTICS_COLUMNS}
            "#
        ))
        .bind(stats.ledger_id)
        .bind(stats.total_amount)
        .bind(stats.total_count)
        .bind(stats.pending_ack_count)
        .bind(family.amount)
        .bind(family.count)
        .bind(relative.amount)
        .bind(relative.count)
        .bind(friend.amount)
        .bind(friend.count)
        .bind(colleague.amount)
        .bind(colleague.count)
        .bind(acquaintance.amount)
        .bind(acquaintance.count)
        .bind(other.amount)
        .bind(other.count)
        .bind(stats.bucket_count(AmountBucket::Under30k))
        .bind(stats.bucket_count(AmountBucket::From30kTo50k))
        .bind(stats.bucket_count(AmountBucket::From50kTo100k))
        .bind(stats.bucket_count(AmountBucket::From100kTo200k))
        .bind(stats.bucket_count(AmountBucket::From200kTo500k))
        .bind(stats.bucket_count(AmountBucket::Over500k))
        .bind(stats.top_gift.as_ref().map(|t| t.record_id))
        .bind(stats.top_gift.as_ref().map(|t| t.donor_name.clone()))
        .bind(stats.top_gift.as_ref().map(|t| t.amount))
        .bind(stats.first_gift_date)
        .bind(stats.last_gift_date)
        .bind(stats.day_span)
        .bind(stats.daily_average)
        .fetch_one(&mut **tx)
        .await;

        timer.record();
        result
    }
}

#[cfg(test)]
mod tests {
    // Note: StatisticsRepository tests require a database connection and are
    // covered by integration tests.
}
