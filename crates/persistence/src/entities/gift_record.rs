//! Gift record entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use domain::models::gift_record::{GiftCategory, GiftChannel, GiftRecord};

/// Database row mapping for the gift_records table.
#[derive(Debug, Clone, FromRow)]
pub struct GiftRecordEntity {
    pub id: Uuid,
    pub ledger_id: Uuid,
    pub donor_name: String,
    pub amount: i64,
    pub category: String,
    pub channel: String,
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

impl From<GiftRecordEntity> for GiftRecord {
    fn from(entity: GiftRecordEntity) -> Self {
        Self {
            id: entity.id,
            ledger_id: entity.ledger_id,
            donor_name: entity.donor_name,
            amount: entity.amount,
            category: GiftCategory::from(entity.category.as_str()),
            channel: GiftChannel::from(entity.channel.as_str()),
            contact: entity.contact,
            address: entity.address,
            note: entity.note,
            gift_date: entity.gift_date,
            acknowledged: entity.acknowledged,
            ack_date: entity.ack_date,
            ack_by: entity.ack_by,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
