use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    models::NewEvent,
    repository::EventRepository,
    types::{EventRequest, EventResponse},
};
use crate::shared::AppError;

/// Service for handling event business logic
pub struct EventService {
    repository: Arc<dyn EventRepository + Send + Sync>,
}

impl EventService {
    pub fn new(repository: Arc<dyn EventRepository + Send + Sync>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self))]
    pub async fn list_events(&self) -> Result<Vec<EventResponse>, AppError> {
        let events = self.repository.list_events().await?;
        Ok(events.into_iter().map(EventResponse::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get_event(&self, event_id: i64) -> Result<EventResponse, AppError> {
        self.repository
            .get_event(event_id)
            .await?
            .map(EventResponse::from)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    #[instrument(skip(self, request))]
    pub async fn create_event(&self, request: EventRequest) -> Result<EventResponse, AppError> {
        let new_event = NewEvent::try_from(request)?;
        let event = self.repository.create_event(&new_event).await?;

        info!(event_id = event.id, name = %event.name, "Event created");
        Ok(event.into())
    }

    #[instrument(skip(self, request))]
    pub async fn update_event(
        &self,
        event_id: i64,
        request: EventRequest,
    ) -> Result<EventResponse, AppError> {
        let new_event = NewEvent::try_from(request)?;
        self.repository
            .update_event(event_id, &new_event)
            .await?
            .map(EventResponse::from)
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    #[instrument(skip(self))]
    pub async fn delete_event(&self, event_id: i64) -> Result<(), AppError> {
        if self.repository.get_event(event_id).await?.is_none() {
            return Err(AppError::NotFound("Event not found".to_string()));
        }
        self.repository.delete_event(event_id).await?;

        info!(event_id, "Event deleted");
        Ok(())
    }
}
