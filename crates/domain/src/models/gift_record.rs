//! Gift record domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Relationship category of the gift giver. Closed set of six values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GiftCategory {
    Family,
    Relative,
    Friend,
    Colleague,
    Acquaintance,
    Other,
}

impl GiftCategory {
    /// All categories, in a fixed order used for breakdown maps.
    pub const ALL: [GiftCategory; 6] = [
        GiftCategory::Family,
        GiftCategory::Relative,
        GiftCategory::Friend,
        GiftCategory::Colleague,
        GiftCategory::Acquaintance,
        GiftCategory::Other,
    ];

    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftCategory::Family => "family",
            GiftCategory::Relative => "relative",
            GiftCategory::Friend => "friend",
            GiftCategory::Colleague => "colleague",
            GiftCategory::Acquaintance => "acquaintance",
            GiftCategory::Other => "other",
        }
    }

    /// Parses from a string representation, case-insensitively.
    ///
    /// Returns `None` for unrecognized values; list-filter callers treat
    /// that as "no filter" rather than an error.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "family" => Some(GiftCategory::Family),
            "relative" => Some(GiftCategory::Relative),
            "friend" => Some(GiftCategory::Friend),
            "colleague" => Some(GiftCategory::Colleague),
            "acquaintance" => Some(GiftCategory::Acquaintance),
            "other" => Some(GiftCategory::Other),
            _ => None,
        }
    }
}

impl From<&str> for GiftCategory {
    /// Lenient conversion for database round-trips; unknown values map to
    /// `Other`. The gift_records table constrains the column to the six
    /// known values, so the fallback is unreachable in practice.
    fn from(s: &str) -> Self {
        GiftCategory::parse(s).unwrap_or(GiftCategory::Other)
    }
}

impl std::fmt::Display for GiftCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How the gift was handed over.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GiftChannel {
    Cash,
    Transfer,
}

impl GiftChannel {
    /// Converts to database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GiftChannel::Cash => "cash",
            GiftChannel::Transfer => "transfer",
        }
    }

    /// Parses from a string representation, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cash" => Some(GiftChannel::Cash),
            "transfer" => Some(GiftChannel::Transfer),
            _ => None,
        }
    }
}

impl From<&str> for GiftChannel {
    fn from(s: &str) -> Self {
        GiftChannel::parse(s).unwrap_or(GiftChannel::Cash)
    }
}

impl std::fmt::Display for GiftChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single monetary gift entry, owned exclusively by its ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GiftRecord {
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub donor_name: String,
    /// Whole currency units, non-negative.
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_acknowledged() -> bool {
    false
}

/// Request payload for creating a gift record.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateGiftRecordRequest {
    #[validate(custom(function = "shared::validation::validate_donor_name"))]
    pub donor_name: String,

    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: i64,

    pub category: GiftCategory,
    pub channel: GiftChannel,

    #[validate(length(max = 200, message = "Contact must be at most 200 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,

    #[validate(custom(function = "shared::validation::validate_gift_date"))]
    pub gift_date: NaiveDate,

    #[serde(default = "default_acknowledged")]
    pub acknowledged: bool,

    pub ack_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Acknowledger name must be at most 200 characters"))]
    pub ack_by: Option<String>,
}

/// Request payload for a full update of a gift record.
///
/// All mutable fields are replaced; the ledger id and record id are taken
/// from the path and never change.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGiftRecordRequest {
    #[validate(custom(function = "shared::validation::validate_donor_name"))]
    pub donor_name: String,

    #[validate(custom(function = "shared::validation::validate_amount"))]
    pub amount: i64,

    pub category: GiftCategory,
    pub channel: GiftChannel,

    #[validate(length(max = 200, message = "Contact must be at most 200 characters"))]
    pub contact: Option<String>,

    #[validate(length(max = 200, message = "Address must be at most 200 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 1000, message = "Note must be at most 1000 characters"))]
    pub note: Option<String>,

    #[validate(custom(function = "shared::validation::validate_gift_date"))]
    pub gift_date: NaiveDate,

    #[serde(default = "default_acknowledged")]
    pub acknowledged: bool,

    pub ack_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Acknowledger name must be at most 200 characters"))]
    pub ack_by: Option<String>,
}

/// Request payload for the restricted acknowledgment-only update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAckRequest {
    pub acknowledged: bool,

    pub ack_date: Option<NaiveDate>,

    #[validate(length(max = 200, message = "Acknowledger name must be at most 200 characters"))]
    pub ack_by: Option<String>,
}

/// Query parameters for the filtered record listing.
///
/// `category` and `channel` arrive as raw strings: unrecognized values are
/// ignored (treated as "no filter"), not rejected.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListGiftRecordsQuery {
    /// Donor name substring match.
    pub name: Option<String>,
    pub category: Option<String>,
    pub channel: Option<String>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub acknowledged: Option<bool>,
    pub page: Option<i64>,
    pub size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_as_str_roundtrip() {
        for category in GiftCategory::ALL {
            assert_eq!(GiftCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_category_parse_case_insensitive() {
        assert_eq!(GiftCategory::parse("FAMILY"), Some(GiftCategory::Family));
        assert_eq!(GiftCategory::parse("Friend"), Some(GiftCategory::Friend));
    }

    #[test]
    fn test_category_parse_unknown() {
        assert_eq!(GiftCategory::parse("sibling"), None);
        assert_eq!(GiftCategory::parse(""), None);
    }

    #[test]
    fn test_category_from_str_falls_back_to_other() {
        assert_eq!(GiftCategory::from("sibling"), GiftCategory::Other);
        assert_eq!(GiftCategory::from("family"), GiftCategory::Family);
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!(GiftChannel::parse("cash"), Some(GiftChannel::Cash));
        assert_eq!(GiftChannel::parse("TRANSFER"), Some(GiftChannel::Transfer));
        assert_eq!(GiftChannel::parse("card"), None);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(GiftCategory::Acquaintance.to_string(), "acquaintance");
        assert_eq!(GiftChannel::Transfer.to_string(), "transfer");
    }

    #[test]
    fn test_create_request_deserialize_defaults() {
        let json = r#"{
            "donorName": "Kim Minsoo",
            "amount": 50000,
            "category": "friend",
            "channel": "cash",
            "giftDate": "2026-05-16"
        }"#;
        let req: CreateGiftRecordRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.donor_name, "Kim Minsoo");
        assert_eq!(req.amount, 50_000);
        assert_eq!(req.category, GiftCategory::Friend);
        assert!(!req.acknowledged);
        assert!(req.ack_date.is_none());
    }

    #[test]
    fn test_create_request_validates_amount() {
        let json = r#"{
            "donorName": "Kim Minsoo",
            "amount": -100,
            "category": "friend",
            "channel": "cash",
            "giftDate": "2026-05-16"
        }"#;
        let req: CreateGiftRecordRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_blank_donor() {
        let json = r#"{
            "donorName": "   ",
            "amount": 10000,
            "category": "other",
            "channel": "transfer",
            "giftDate": "2026-05-16"
        }"#;
        let req: CreateGiftRecordRequest = serde_json::from_str(json).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_ack_request_deserialize() {
        let json = r#"{"acknowledged": true, "ackDate": "2026-05-20", "ackBy": "groom"}"#;
        let req: UpdateAckRequest = serde_json::from_str(json).unwrap();
        assert!(req.acknowledged);
        assert_eq!(req.ack_by.as_deref(), Some("groom"));
    }

    #[test]
    fn test_list_query_deserialize_partial() {
        let query: ListGiftRecordsQuery =
            serde_json::from_str(r#"{"category": "no-such-category", "page": 2}"#).unwrap();
        assert_eq!(query.category.as_deref(), Some("no-such-category"));
        assert_eq!(query.page, Some(2));
        assert!(query.name.is_none());
    }
}
