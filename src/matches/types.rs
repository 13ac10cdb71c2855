use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::scoring::PlayerId;

/// Request payload for creating or replacing a match.
///
/// Exactly one reporting mode may be used: per-song `songs`, aggregate
/// `player_stats`, or neither (participants only, via `player_ids`).
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchWriteRequest {
    pub event_id: i64,
    pub player_ids: Option<Vec<PlayerId>>,
    pub songs: Option<Vec<SongScoresInput>>,
    pub winner_id: Option<PlayerId>,
    pub player_stats: Option<Vec<PlayerStatInput>>,
    pub round: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SongScoresInput {
    pub song_id: i64,
    pub chart_id: Option<i64>,
    pub song_order: Option<i32>,
    pub player_scores: Vec<PlayerScoreInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerScoreInput {
    pub player_id: PlayerId,
    /// Number, numeric string, empty string or null; parsed during validation
    pub score: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerStatInput {
    pub player_id: PlayerId,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

/// Nested match document returned by every match endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchView {
    pub match_id: i64,
    pub event_id: i64,
    pub round: Option<String>,
    pub created_at: DateTime<Utc>,
    pub players: Vec<PlayerSummary>,
    pub winner: Option<PlayerSummary>,
    pub songs: Vec<MatchSongView>,
    pub player_stats: Vec<PlayerStatView>,
    pub event: Option<EventSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerSummary {
    pub player_id: PlayerId,
    pub gamertag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MatchSongView {
    pub song_id: i64,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub chart_id: Option<i64>,
    pub chart_mode: Option<String>,
    pub chart_difficulty: Option<i32>,
    pub chart_display: Option<String>,
    pub song_order: Option<i32>,
    pub player_scores: Vec<PlayerScoreView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerScoreView {
    pub player_id: PlayerId,
    pub player_gamertag: Option<String>,
    pub score: Option<i64>,
    pub win: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerStatView {
    pub player_id: PlayerId,
    pub gamertag: Option<String>,
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EventSummary {
    pub event_id: i64,
    pub name: String,
    pub date: NaiveDate,
}

/// A player's history across all matches they took part in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayerRecordResponse {
    pub player_id: PlayerId,
    pub matches_played: u32,
    /// Based on the declared match winner; matches without one count as draws
    pub match_record: RecordTotals,
    /// Sum of the stored per-match W-L-D rows
    pub song_record: RecordTotals,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RecordTotals {
    pub wins: i64,
    pub losses: i64,
    pub draws: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_song_mode_request() {
        let json = r#"{
            "event_id": 1,
            "songs": [
                { "song_id": 4, "chart_id": 9, "player_scores": [
                    { "player_id": 1, "score": 95000 },
                    { "player_id": 2, "score": "94000" },
                    { "player_id": 3 }
                ]}
            ],
            "winner_id": 1,
            "round": "Winners Finals"
        }"#;

        let request: MatchWriteRequest = serde_json::from_str(json).unwrap();
        let songs = request.songs.unwrap();
        assert_eq!(songs[0].player_scores.len(), 3);
        assert!(songs[0].player_scores[2].score.is_none());
        assert_eq!(request.round.as_deref(), Some("Winners Finals"));
    }

    #[test]
    fn rejects_unknown_fields() {
        let json = r#"{ "event_id": 1, "player_ids": [1, 2], "bracket": "top8" }"#;
        let result: Result<MatchWriteRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_negative_stats() {
        let json = r#"{ "event_id": 1, "player_stats": [
            { "player_id": 1, "wins": -1, "losses": 0, "draws": 0 }
        ]}"#;
        let result: Result<MatchWriteRequest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
