//! Gift statistics entity (database row mapping).
//!
//! The aggregate is stored as one flat row per ledger; the per-category and
//! per-bucket breakdowns live in dedicated columns and are folded into the
//! domain value's maps on conversion.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::gift_record::GiftCategory;
use domain::models::statistics::{AmountBucket, CategoryStat, GiftStatistics, TopGift};

/// Database row mapping for the gift_statistics table.
#[derive(Debug, Clone, FromRow)]
pub struct GiftStatisticsEntity {
    pub id: i64,
    pub ledger_id: Uuid,
    pub total_amount: i64,
    pub total_count: i64,
    pub pending_ack_count: i64,

    pub family_amount: i64,
    pub family_count: i64,
    pub relative_amount: i64,
    pub relative_count: i64,
    pub friend_amount: i64,
    pub friend_count: i64,
    pub colleague_amount: i64,
    pub colleague_count: i64,
    pub acquaintance_amount: i64,
    pub acquaintance_count: i64,
    pub other_amount: i64,
    pub other_count: i64,

    pub bucket_under_30k: i64,
    pub bucket_30k_to_50k: i64,
    pub bucket_50k_to_100k: i64,
    pub bucket_100k_to_200k: i64,
    pub bucket_200k_to_500k: i64,
    pub bucket_over_500k: i64,

    pub top_record_id: Option<Uuid>,
    pub top_donor_name: Option<String>,
    pub top_amount: Option<i64>,

    pub first_gift_date: Option<NaiveDate>,
    pub last_gift_date: Option<NaiveDate>,
    pub day_span: i64,
    pub daily_average: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<GiftStatisticsEntity> for GiftStatistics {
    fn from(entity: GiftStatisticsEntity) -> Self {
        let mut by_category = BTreeMap::new();
        by_category.insert(
            GiftCategory::Family,
            CategoryStat { amount: entity.family_amount, count: entity.family_count },
        );
        by_category.insert(
            GiftCategory::Relative,
            CategoryStat { amount: entity.relative_amount, count: entity.relative_count },
        );
        by_category.insert(
            GiftCategory::Friend,
            CategoryStat { amount: entity.friend_amount, count: entity.friend_count },
        );
        by_category.insert(
            GiftCategory::Colleague,
            CategoryStat { amount: entity.colleague_amount, count: entity.colleague_count },
        );
        by_category.insert(
            GiftCategory::Acquaintance,
            CategoryStat { amount: entity.acquaintance_amount, count: entity.acquaintance_count },
        );
        by_category.insert(
            GiftCategory::Other,
            CategoryStat { amount: entity.other_amount, count: entity.other_count },
        );

        let mut by_bucket = BTreeMap::new();
        by_bucket.insert(AmountBucket::Under30k, entity.bucket_under_30k);
        by_bucket.insert(AmountBucket::From30kTo50k, entity.bucket_30k_to_50k);
        by_bucket.insert(AmountBucket::From50kTo100k, entity.bucket_50k_to_100k);
        by_bucket.insert(AmountBucket::From100kTo200k, entity.bucket_100k_to_200k);
        by_bucket.insert(AmountBucket::From200kTo500k, entity.bucket_200k_to_500k);
        by_bucket.insert(AmountBucket::Over500k, entity.bucket_over_500k);

        // A top gift is present only when the whole pointer survived; a
        // partially null pointer means the ledger is empty.
        let top_gift = match (entity.top_record_id, entity.top_donor_name, entity.top_amount) {
            (Some(record_id), Some(donor_name), Some(amount)) => Some(TopGift {
                record_id,
                donor_name,
                amount,
            }),
            _ => None,
        };

        Self {
            ledger_id: entity.ledger_id,
            total_amount: entity.total_amount,
            total_count: entity.total_count,
            pending_ack_count: entity.pending_ack_count,
            by_category,
            by_bucket,
            top_gift,
            first_gift_date: entity.first_gift_date,
            last_gift_date: entity.last_gift_date,
            day_span: entity.day_span,
            daily_average: entity.daily_average,
        }
    }
}
