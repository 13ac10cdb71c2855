use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
};
use serde_json::{json, Value};
use tower::ServiceExt; // for `oneshot`

use super::setup::TestSetup;

// ============================================================================
// Action Helpers
// ============================================================================

/// Status and decoded JSON body of one call (`Value::Null` for an empty body)
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestSetup {
    /// Sends a request through the full router
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<String>,
    ) -> ApiResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);

        ApiResponse { status, body }
    }

    pub async fn get(&self, uri: &str) -> ApiResponse {
        self.send(Method::GET, uri, None, None).await
    }

    pub async fn admin_post(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::POST, uri, Some(&self.admin_token), Some(body.to_string()))
            .await
    }

    pub async fn admin_put(&self, uri: &str, body: Value) -> ApiResponse {
        self.send(Method::PUT, uri, Some(&self.admin_token), Some(body.to_string()))
            .await
    }

    pub async fn admin_delete(&self, uri: &str) -> ApiResponse {
        self.send(Method::DELETE, uri, Some(&self.admin_token), None)
            .await
    }

    // ============================================================================
    // Convenience Action Methods
    // ============================================================================

    pub async fn create_event(&self, name: &str, date: &str) -> i64 {
        let response = self
            .admin_post("/api/event", json!({ "name": name, "date": date }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["event_id"].as_i64().unwrap()
    }

    pub async fn create_player(&self, gamertag: &str) -> i64 {
        let response = self
            .admin_post("/api/player", json!({ "gamertag": gamertag }))
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["player_id"].as_i64().unwrap()
    }

    pub async fn create_song(&self, title: &str) -> i64 {
        let response = self.admin_post("/api/song", json!({ "title": title })).await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["song_id"].as_i64().unwrap()
    }

    pub async fn create_chart(&self, song_id: i64, mode: &str, difficulty: i32) -> i64 {
        let response = self
            .admin_post(
                &format!("/api/song/{}/charts", song_id),
                json!({ "mode": mode, "difficulty": difficulty }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["chart_id"].as_i64().unwrap()
    }

    pub async fn enter_player(&self, event_id: i64, player_id: i64, seed: i32) -> i64 {
        let response = self
            .admin_post(
                "/api/eventPlayer",
                json!({ "event_id": event_id, "player_id": player_id, "seed": seed }),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
        response.body["event_player_id"].as_i64().unwrap()
    }
}
