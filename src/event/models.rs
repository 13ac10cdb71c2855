use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Database model for the events table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize, PartialEq)]
pub struct EventModel {
    pub id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Validated fields for creating or updating an event
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub name: String,
    pub date: NaiveDate,
}
