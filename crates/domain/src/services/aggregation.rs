//! Aggregation engine for per-ledger gift statistics.
//!
//! Every operation is a pure function `(GiftStatistics, event) ->
//! GiftStatistics`: the caller loads the stored aggregate (or starts from a
//! zero-valued one), applies the mutation's effect, and persists the result
//! in the same transaction as the record write. `recompute` is the
//! full-overwrite counterpart used for initial backfill and drift repair;
//! for any record set it must agree with the incremental path, except for
//! the documented date-span behavior of `apply_delete`.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use crate::models::gift_record::GiftRecord;
use crate::models::statistics::{AmountBucket, GiftStatistics, TopGift};

/// Scans a ledger's records for the single highest-amount gift.
///
/// Ties keep the first record found. An arbitrary update or delete can
/// promote any record to the maximum, so the engine rescans rather than
/// maintaining an order-statistic structure; ledgers are guest-list sized.
pub fn top_gift(records: &[GiftRecord]) -> Option<TopGift> {
    let mut best: Option<&GiftRecord> = None;
    for record in records {
        match best {
            None => best = Some(record),
            Some(current) if record.amount > current.amount => best = Some(record),
            _ => {}
        }
    }
    best.map(|record| TopGift {
        record_id: record.id,
        donor_name: record.donor_name.clone(),
        amount: record.amount,
    })
}

/// Rebuilds the aggregate from scratch over the full record set.
///
/// Never reads the previous aggregate; calling it twice in succession
/// yields identical output.
pub fn recompute(ledger_id: Uuid, records: &[GiftRecord]) -> GiftStatistics {
    let mut stats = GiftStatistics::zeroed(ledger_id);

    for record in records {
        stats.total_amount += record.amount;
        stats.total_count += 1;
        if !record.acknowledged {
            stats.pending_ack_count += 1;
        }

        let category = stats.by_category.entry(record.category).or_default();
        category.amount += record.amount;
        category.count += 1;

        if let Some(bucket) = AmountBucket::classify(record.amount) {
            *stats.by_bucket.entry(bucket).or_insert(0) += 1;
        }

        stats.first_gift_date = Some(match stats.first_gift_date {
            Some(first) => first.min(record.gift_date),
            None => record.gift_date,
        });
        stats.last_gift_date = Some(match stats.last_gift_date {
            Some(last) => last.max(record.gift_date),
            None => record.gift_date,
        });
    }

    stats.top_gift = top_gift(records);
    refresh_date_metrics(&mut stats);

    debug!(
        ledger_id = %ledger_id,
        records = records.len(),
        total_amount = stats.total_amount,
        "Recomputed ledger statistics"
    );
    stats
}

/// Applies the effect of a newly created record.
pub fn apply_create(mut stats: GiftStatistics, record: &GiftRecord) -> GiftStatistics {
    stats.total_amount += record.amount;
    stats.total_count += 1;
    if !record.acknowledged {
        stats.pending_ack_count += 1;
    }

    let category = stats.by_category.entry(record.category).or_default();
    category.amount += record.amount;
    category.count += 1;

    if let Some(bucket) = AmountBucket::classify(record.amount) {
        *stats.by_bucket.entry(bucket).or_insert(0) += 1;
    }

    let replaces_top = match &stats.top_gift {
        None => true,
        Some(top) => record.amount > top.amount,
    };
    if replaces_top {
        stats.top_gift = Some(TopGift {
            record_id: record.id,
            donor_name: record.donor_name.clone(),
            amount: record.amount,
        });
    }

    extend_date_span(&mut stats, record.gift_date);
    stats
}

/// Applies the effect of an update, given before/after snapshots and the
/// post-update record set of the ledger (for the top-gift rescan).
pub fn apply_update(
    mut stats: GiftStatistics,
    old: &GiftRecord,
    new: &GiftRecord,
    records: &[GiftRecord],
) -> GiftStatistics {
    let delta = new.amount - old.amount;
    stats.total_amount += delta;

    // Pending-ack count moves only on a flag transition, so repeated
    // toggles and unrelated edits cannot double-count.
    match (old.acknowledged, new.acknowledged) {
        (true, false) => stats.pending_ack_count += 1,
        (false, true) => stats.pending_ack_count -= 1,
        _ => {}
    }

    if old.category == new.category {
        stats.by_category.entry(old.category).or_default().amount += delta;
    } else {
        // Full move between categories, not a delta.
        let from = stats.by_category.entry(old.category).or_default();
        from.amount -= old.amount;
        from.count -= 1;
        let to = stats.by_category.entry(new.category).or_default();
        to.amount += new.amount;
        to.count += 1;
    }

    // Remove-then-add, even when both amounts resolve to the same bucket;
    // the same-bucket case is an intentional net no-op.
    if let Some(bucket) = AmountBucket::classify(old.amount) {
        *stats.by_bucket.entry(bucket).or_insert(0) -= 1;
    }
    if let Some(bucket) = AmountBucket::classify(new.amount) {
        *stats.by_bucket.entry(bucket).or_insert(0) += 1;
    }

    // A local delta cannot confirm the new maximum after an arbitrary edit.
    stats.top_gift = top_gift(records);

    extend_date_span(&mut stats, new.gift_date);
    stats
}

/// Applies the effect of a deletion, given the removed record and the
/// remaining record set of the ledger.
///
/// Date-span fields (`first/last_gift_date`, `day_span`, `daily_average`)
/// are left untouched on delete; `recompute` repairs them.
pub fn apply_delete(
    mut stats: GiftStatistics,
    record: &GiftRecord,
    remaining: &[GiftRecord],
) -> GiftStatistics {
    stats.total_amount -= record.amount;
    stats.total_count -= 1;
    if !record.acknowledged {
        stats.pending_ack_count -= 1;
    }

    let category = stats.by_category.entry(record.category).or_default();
    category.amount -= record.amount;
    category.count -= 1;

    if let Some(bucket) = AmountBucket::classify(record.amount) {
        *stats.by_bucket.entry(bucket).or_insert(0) -= 1;
    }

    stats.top_gift = top_gift(remaining);
    stats
}

/// Widens the date span to cover `date` and refreshes the derived metrics.
/// The span never shrinks here, even if the edited record used to be the
/// boundary.
fn extend_date_span(stats: &mut GiftStatistics, date: NaiveDate) {
    stats.first_gift_date = Some(stats.first_gift_date.map_or(date, |first| first.min(date)));
    stats.last_gift_date = Some(stats.last_gift_date.map_or(date, |last| last.max(date)));
    refresh_date_metrics(stats);
}

fn refresh_date_metrics(stats: &mut GiftStatistics) {
    stats.day_span = match (stats.first_gift_date, stats.last_gift_date) {
        (Some(first), Some(last)) => (last - first).num_days() + 1,
        _ => 0,
    };
    stats.daily_average = if stats.day_span > 0 {
        stats.total_amount as f64 / stats.day_span as f64
    } else {
        0.0
    };
}
