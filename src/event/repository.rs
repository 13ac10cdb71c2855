use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use super::models::{EventModel, NewEvent};
use crate::shared::{database_error, AppError};

/// Trait for event repository operations
#[async_trait]
pub trait EventRepository {
    async fn create_event(&self, event: &NewEvent) -> Result<EventModel, AppError>;
    async fn get_event(&self, event_id: i64) -> Result<Option<EventModel>, AppError>;
    /// All events, most recent date first
    async fn list_events(&self) -> Result<Vec<EventModel>, AppError>;
    async fn update_event(
        &self,
        event_id: i64,
        event: &NewEvent,
    ) -> Result<Option<EventModel>, AppError>;
    async fn delete_event(&self, event_id: i64) -> Result<bool, AppError>;
}

#[derive(Default)]
struct EventStore {
    next_id: i64,
    events: BTreeMap<i64, EventModel>,
}

/// In-memory implementation of EventRepository for development and testing
#[derive(Default)]
pub struct InMemoryEventRepository {
    store: RwLock<EventStore>,
}

impl InMemoryEventRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventRepository for InMemoryEventRepository {
    #[instrument(skip(self, event))]
    async fn create_event(&self, event: &NewEvent) -> Result<EventModel, AppError> {
        let mut store = self.store.write().await;
        store.next_id += 1;

        let model = EventModel {
            id: store.next_id,
            name: event.name.clone(),
            date: event.date,
            created_at: Utc::now(),
        };
        store.events.insert(model.id, model.clone());

        debug!(event_id = model.id, name = %model.name, "Event created in memory");
        Ok(model)
    }

    async fn get_event(&self, event_id: i64) -> Result<Option<EventModel>, AppError> {
        Ok(self.store.read().await.events.get(&event_id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<EventModel>, AppError> {
        let store = self.store.read().await;
        let mut events: Vec<EventModel> = store.events.values().cloned().collect();
        events.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(events)
    }

    #[instrument(skip(self, event))]
    async fn update_event(
        &self,
        event_id: i64,
        event: &NewEvent,
    ) -> Result<Option<EventModel>, AppError> {
        let mut store = self.store.write().await;
        Ok(store.events.get_mut(&event_id).map(|existing| {
            existing.name = event.name.clone();
            existing.date = event.date;
            existing.clone()
        }))
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, event_id: i64) -> Result<bool, AppError> {
        Ok(self.store.write().await.events.remove(&event_id).is_some())
    }
}

/// PostgreSQL implementation of event repository
pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for PostgresEventRepository {
    #[instrument(skip(self, event))]
    async fn create_event(&self, event: &NewEvent) -> Result<EventModel, AppError> {
        debug!(name = %event.name, "Creating event in database");

        sqlx::query_as::<_, EventModel>(
            "INSERT INTO events (name, date) VALUES ($1, $2) RETURNING id, name, date, created_at",
        )
        .bind(&event.name)
        .bind(event.date)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error("create event"))
    }

    #[instrument(skip(self))]
    async fn get_event(&self, event_id: i64) -> Result<Option<EventModel>, AppError> {
        sqlx::query_as::<_, EventModel>(
            "SELECT id, name, date, created_at FROM events WHERE id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("get event"))
    }

    #[instrument(skip(self))]
    async fn list_events(&self) -> Result<Vec<EventModel>, AppError> {
        sqlx::query_as::<_, EventModel>(
            "SELECT id, name, date, created_at FROM events ORDER BY date DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(database_error("list events"))
    }

    #[instrument(skip(self, event))]
    async fn update_event(
        &self,
        event_id: i64,
        event: &NewEvent,
    ) -> Result<Option<EventModel>, AppError> {
        sqlx::query_as::<_, EventModel>(
            "UPDATE events SET name = $2, date = $3 WHERE id = $1 \
             RETURNING id, name, date, created_at",
        )
        .bind(event_id)
        .bind(&event.name)
        .bind(event.date)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error("update event"))
    }

    #[instrument(skip(self))]
    async fn delete_event(&self, event_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(event_id)
            .execute(&self.pool)
            .await
            .map_err(database_error("delete event"))?;
        Ok(result.rows_affected() > 0)
    }
}
