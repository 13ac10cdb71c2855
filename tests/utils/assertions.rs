//! Test assertion helpers - fluent API for verifying responses
#![allow(dead_code)] // Test utilities may not all be used in every test

use axum::http::StatusCode;
use serde_json::Value;

use super::actions::ApiResponse;

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct ResponseAssertion<'a> {
    response: &'a ApiResponse,
}

impl<'a> ResponseAssertion<'a> {
    pub fn of(response: &'a ApiResponse) -> Self {
        Self { response }
    }

    pub fn has_status(self, expected: StatusCode) -> Self {
        assert_eq!(
            self.response.status, expected,
            "unexpected status, body: {}",
            self.response.body
        );
        self
    }

    /// The error body's message mentions every fragment
    pub fn message_mentions(self, fragments: &[&str]) -> Self {
        let message = self.response.body["message"]
            .as_str()
            .unwrap_or_else(|| panic!("no message in {}", self.response.body));
        for fragment in fragments {
            assert!(
                message.contains(fragment),
                "message {:?} should mention {:?}",
                message,
                fragment
            );
        }
        self
    }

    pub fn body(self) -> &'a Value {
        &self.response.body
    }
}

/// W-L-D triple for one player in a match view's `player_stats`
pub fn stat_of(view: &Value, player_id: i64) -> (i64, i64, i64) {
    let stat = view["player_stats"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["player_id"] == player_id)
        .unwrap_or_else(|| panic!("no stats for player {}", player_id));
    (
        stat["wins"].as_i64().unwrap(),
        stat["losses"].as_i64().unwrap(),
        stat["draws"].as_i64().unwrap(),
    )
}

/// Player ids flagged as song winners on one song of a match view
pub fn song_winners(view: &Value, song_index: usize) -> Vec<i64> {
    view["songs"][song_index]["player_scores"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["win"] == true)
        .map(|s| s["player_id"].as_i64().unwrap())
        .collect()
}
