//! Repository implementations for database operations.

pub mod gift_record;
pub mod statistics;

pub use gift_record::{GiftRecordFilter, GiftRecordRepository, GiftRecordUpdate, NewGiftRecord};
pub use statistics::StatisticsRepository;
