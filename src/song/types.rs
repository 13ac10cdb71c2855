use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{ChartModel, NewChart, NewSong, SongModel};
use crate::shared::AppError;

#[derive(Debug, Deserialize)]
pub struct SongRequest {
    pub title: Option<String>,
    pub artist: Option<String>,
}

impl TryFrom<SongRequest> for NewSong {
    type Error = AppError;

    fn try_from(request: SongRequest) -> Result<Self, Self::Error> {
        let title = clean(request.title)
            .ok_or_else(|| AppError::Validation("Song title is required".to_string()))?;

        Ok(NewSong {
            title,
            artist: clean(request.artist),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ChartRequest {
    pub mode: Option<String>,
    pub difficulty: Option<i32>,
}

impl TryFrom<ChartRequest> for NewChart {
    type Error = AppError;

    fn try_from(request: ChartRequest) -> Result<Self, Self::Error> {
        let mode = clean(request.mode);
        match (mode, request.difficulty) {
            (Some(_), Some(difficulty)) if difficulty < 1 => Err(AppError::Validation(
                "Chart difficulty must be positive".to_string(),
            )),
            (Some(mode), Some(difficulty)) => Ok(NewChart { mode, difficulty }),
            _ => Err(AppError::Validation(
                "Chart mode and difficulty are required".to_string(),
            )),
        }
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SongResponse {
    pub song_id: i64,
    pub title: String,
    pub artist: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<SongModel> for SongResponse {
    fn from(song: SongModel) -> Self {
        Self {
            song_id: song.id,
            title: song.title,
            artist: song.artist,
            created_at: song.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChartResponse {
    pub chart_id: i64,
    pub song_id: i64,
    pub mode: String,
    pub difficulty: i32,
    pub display_name: String,
}

impl From<ChartModel> for ChartResponse {
    fn from(chart: ChartModel) -> Self {
        Self {
            display_name: chart.display_name(),
            chart_id: chart.id,
            song_id: chart.song_id,
            mode: chart.mode,
            difficulty: chart.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_request_validation() {
        let ok = ChartRequest {
            mode: Some(" Hard ".to_string()),
            difficulty: Some(17),
        };
        assert_eq!(
            NewChart::try_from(ok).unwrap(),
            NewChart {
                mode: "Hard".to_string(),
                difficulty: 17,
            }
        );

        let missing = ChartRequest {
            mode: None,
            difficulty: Some(3),
        };
        assert!(NewChart::try_from(missing).is_err());

        let zero = ChartRequest {
            mode: Some("Easy".to_string()),
            difficulty: Some(0),
        };
        assert!(NewChart::try_from(zero).is_err());
    }

    #[test]
    fn chart_response_carries_display_name() {
        let response = ChartResponse::from(ChartModel {
            id: 3,
            song_id: 1,
            mode: "Wild".to_string(),
            difficulty: 24,
        });
        assert_eq!(response.display_name, "Wild 24");
    }

    #[test]
    fn song_request_requires_title() {
        let request: SongRequest = serde_json::from_str(r#"{"artist": "Konami"}"#).unwrap();
        assert!(matches!(
            NewSong::try_from(request),
            Err(AppError::Validation(msg)) if msg == "Song title is required"
        ));
    }
}
