use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::models::{EventModel, NewEvent};
use crate::shared::AppError;

/// Request payload for creating or updating an event.
/// Fields are optional so a missing one is reported as a 400, not a decode failure.
#[derive(Debug, Deserialize)]
pub struct EventRequest {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
}

impl TryFrom<EventRequest> for NewEvent {
    type Error = AppError;

    fn try_from(request: EventRequest) -> Result<Self, Self::Error> {
        let name = request
            .name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());

        match (name, request.date) {
            (Some(name), Some(date)) => Ok(NewEvent { name, date }),
            _ => Err(AppError::Validation(
                "Event name and date are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct EventResponse {
    pub event_id: i64,
    pub name: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl From<EventModel> for EventResponse {
    fn from(event: EventModel) -> Self {
        Self {
            event_id: event.id,
            name: event.name,
            date: event.date,
            created_at: event.created_at,
        }
    }
}
