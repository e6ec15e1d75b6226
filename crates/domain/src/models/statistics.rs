//! Per-ledger gift statistics aggregate.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::gift_record::GiftCategory;

/// Fixed amount-range histogram bucket.
///
/// The six buckets partition `[0, ∞)` without gaps or overlaps. Boundary
/// values classify as: 30_000 → `30k_to_50k`, 50_000 → `50k_to_100k`,
/// 100_000 → `100k_to_200k`, 200_000 and 500_000 → `200k_to_500k`,
/// 500_001 → `over_500k`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum AmountBucket {
    #[serde(rename = "under_30k")]
    Under30k,
    #[serde(rename = "30k_to_50k")]
    From30kTo50k,
    #[serde(rename = "50k_to_100k")]
    From50kTo100k,
    #[serde(rename = "100k_to_200k")]
    From100kTo200k,
    #[serde(rename = "200k_to_500k")]
    From200kTo500k,
    #[serde(rename = "over_500k")]
    Over500k,
}

impl AmountBucket {
    /// All buckets, in ascending range order.
    pub const ALL: [AmountBucket; 6] = [
        AmountBucket::Under30k,
        AmountBucket::From30kTo50k,
        AmountBucket::From50kTo100k,
        AmountBucket::From100kTo200k,
        AmountBucket::From200kTo500k,
        AmountBucket::Over500k,
    ];

    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountBucket::Under30k => "under_30k",
            AmountBucket::From30kTo50k => "30k_to_50k",
            AmountBucket::From50kTo100k => "50k_to_100k",
            AmountBucket::From100kTo200k => "100k_to_200k",
            AmountBucket::From200kTo500k => "200k_to_500k",
            AmountBucket::Over500k => "over_500k",
        }
    }

    /// Classifies an amount into its histogram bucket.
    ///
    /// Pure and total over valid amounts; negative amounts return `None`
    /// and the aggregation engine treats them as a no-op.
    pub fn classify(amount: i64) -> Option<AmountBucket> {
        if amount < 0 {
            return None;
        }
        Some(match amount {
            a if a < 30_000 => AmountBucket::Under30k,
            a if a < 50_000 => AmountBucket::From30kTo50k,
            a if a < 100_000 => AmountBucket::From50kTo100k,
            a if a < 200_000 => AmountBucket::From100kTo200k,
            a if a <= 500_000 => AmountBucket::From200kTo500k,
            _ => AmountBucket::Over500k,
        })
    }
}

impl std::fmt::Display for AmountBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Pointer to the single largest gift in a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TopGift {
    pub record_id: Uuid,
    pub donor_name: String,
    pub amount: i64,
}

/// Amount and count accumulated for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct CategoryStat {
    pub amount: i64,
    pub count: i64,
}

/// Denormalized statistics for one ledger. At most one aggregate exists per
/// ledger; it is created zero-valued on the first mutation and replaced as a
/// whole value on every subsequent one.
///
/// The per-category and per-bucket maps are always fully keyed: every
/// category and bucket has an entry, zeroed when empty. Invariants after a
/// full recompute: `total_amount == Σ category amount`, `total_count ==
/// Σ category count == Σ bucket count`, and the top gift's amount is the
/// maximum over the ledger's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GiftStatistics {
    pub ledger_id: Uuid,
    pub total_amount: i64,
    pub total_count: i64,
    /// Records whose thank-you contact has not happened yet.
    pub pending_ack_count: i64,
    pub by_category: BTreeMap<GiftCategory, CategoryStat>,
    pub by_bucket: BTreeMap<AmountBucket, i64>,
    pub top_gift: Option<TopGift>,
    pub first_gift_date: Option<NaiveDate>,
    pub last_gift_date: Option<NaiveDate>,
    /// Inclusive day span: `last - first + 1`, zero while no records exist.
    pub day_span: i64,
    /// `total_amount / day_span`, zero while the span is zero.
    pub daily_average: f64,
}

impl GiftStatistics {
    /// Zero-valued aggregate for a ledger with no recorded gifts.
    pub fn zeroed(ledger_id: Uuid) -> Self {
        Self {
            ledger_id,
            total_amount: 0,
            total_count: 0,
            pending_ack_count: 0,
            by_category: GiftCategory::ALL
                .iter()
                .map(|c| (*c, CategoryStat::default()))
                .collect(),
            by_bucket: AmountBucket::ALL.iter().map(|b| (*b, 0)).collect(),
            top_gift: None,
            first_gift_date: None,
            last_gift_date: None,
            day_span: 0,
            daily_average: 0.0,
        }
    }

    /// Stat for one category; zero when the map has no entry.
    pub fn category_stat(&self, category: GiftCategory) -> CategoryStat {
        self.by_category.get(&category).copied().unwrap_or_default()
    }

    /// Count for one histogram bucket; zero when the map has no entry.
    pub fn bucket_count(&self, bucket: AmountBucket) -> i64 {
        self.by_bucket.get(&bucket).copied().unwrap_or(0)
    }
}

/// Condensed statistics view returned by the summary endpoint.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct StatisticsSummary {
    pub ledger_id: Uuid,
    pub total_amount: i64,
    pub total_count: i64,
    pub pending_ack_count: i64,
    pub top_gift: Option<TopGift>,
    pub first_gift_date: Option<NaiveDate>,
    pub last_gift_date: Option<NaiveDate>,
    pub day_span: i64,
    pub daily_average: f64,
}

impl From<&GiftStatistics> for StatisticsSummary {
    fn from(stats: &GiftStatistics) -> Self {
        Self {
            ledger_id: stats.ledger_id,
            total_amount: stats.total_amount,
            total_count: stats.total_count,
            pending_ack_count: stats.pending_ack_count,
            top_gift: stats.top_gift.clone(),
            first_gift_date: stats.first_gift_date,
            last_gift_date: stats.last_gift_date,
            day_span: stats.day_span,
            daily_average: stats.daily_average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_interior_values() {
        assert_eq!(AmountBucket::classify(0), Some(AmountBucket::Under30k));
        assert_eq!(AmountBucket::classify(29_999), Some(AmountBucket::Under30k));
        assert_eq!(AmountBucket::classify(40_000), Some(AmountBucket::From30kTo50k));
        assert_eq!(AmountBucket::classify(70_000), Some(AmountBucket::From50kTo100k));
        assert_eq!(AmountBucket::classify(150_000), Some(AmountBucket::From100kTo200k));
        assert_eq!(AmountBucket::classify(300_000), Some(AmountBucket::From200kTo500k));
        assert_eq!(AmountBucket::classify(1_000_000), Some(AmountBucket::Over500k));
    }

    #[test]
    fn test_classify_exact_boundaries() {
        assert_eq!(AmountBucket::classify(30_000), Some(AmountBucket::From30kTo50k));
        assert_eq!(AmountBucket::classify(50_000), Some(AmountBucket::From50kTo100k));
        assert_eq!(AmountBucket::classify(100_000), Some(AmountBucket::From100kTo200k));
        assert_eq!(AmountBucket::classify(200_000), Some(AmountBucket::From200kTo500k));
        // 500_000 is inclusive on the 200k-500k side.
        assert_eq!(AmountBucket::classify(500_000), Some(AmountBucket::From200kTo500k));
        assert_eq!(AmountBucket::classify(500_001), Some(AmountBucket::Over500k));
    }

    #[test]
    fn test_classify_negative_is_none() {
        assert_eq!(AmountBucket::classify(-1), None);
        assert_eq!(AmountBucket::classify(i64::MIN), None);
    }

    #[test]
    fn test_bucket_serde_names() {
        let json = serde_json::to_string(&AmountBucket::From30kTo50k).unwrap();
        assert_eq!(json, "\"30k_to_50k\"");
        let bucket: AmountBucket = serde_json::from_str("\"over_500k\"").unwrap();
        assert_eq!(bucket, AmountBucket::Over500k);
    }

    #[test]
    fn test_zeroed_is_fully_keyed() {
        let stats = GiftStatistics::zeroed(Uuid::new_v4());
        assert_eq!(stats.by_category.len(), 6);
        assert_eq!(stats.by_bucket.len(), 6);
        assert_eq!(stats.total_amount, 0);
        assert!(stats.top_gift.is_none());
        assert_eq!(stats.day_span, 0);
        assert_eq!(stats.daily_average, 0.0);
    }

    #[test]
    fn test_category_stat_accessor_defaults() {
        let mut stats = GiftStatistics::zeroed(Uuid::new_v4());
        stats.by_category.remove(&GiftCategory::Friend);
        let stat = stats.category_stat(GiftCategory::Friend);
        assert_eq!(stat.amount, 0);
        assert_eq!(stat.count, 0);
    }

    #[test]
    fn test_statistics_serializes_map_keys_as_names() {
        let stats = GiftStatistics::zeroed(Uuid::new_v4());
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"family\""));
        assert!(json.contains("\"under_30k\""));
        assert!(json.contains("\"pending_ack_count\":0"));
    }

    #[test]
    fn test_summary_from_statistics() {
        let mut stats = GiftStatistics::zeroed(Uuid::new_v4());
        stats.total_amount = 120_000;
        stats.total_count = 3;
        let summary = StatisticsSummary::from(&stats);
        assert_eq!(summary.total_amount, 120_000);
        assert_eq!(summary.total_count, 3);
        assert!(summary.top_gift.is_none());
    }
}
