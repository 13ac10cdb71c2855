use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, instrument};

use super::{
    errors::ScoringError,
    models::{NewMatch, NewPlayerScore},
    scoring::{
        compute_wld, determine_song_winner, scored_song_count, PlayerId, ScoreEntry, WinLossDraw,
        MAX_SCORE, MIN_SCORE,
    },
    types::{MatchWriteRequest, PlayerStatInput, SongScoresInput},
};

/// How a match write reports its outcome
#[derive(Debug, Clone)]
pub enum MatchReport {
    /// Per-song scores; W-L-D is derived and cross-checked
    Songs(Vec<SongScoresInput>),
    /// Aggregate W-L-D supplied directly and trusted as-is
    Stats(Vec<PlayerStatInput>),
    /// Only the participant list; everyone's W-L-D is zero
    ParticipantsOnly,
}

impl MatchReport {
    pub fn from_parts(
        songs: Option<Vec<SongScoresInput>>,
        stats: Option<Vec<PlayerStatInput>>,
    ) -> Result<Self, ScoringError> {
        let songs = songs.filter(|songs| !songs.is_empty());
        let stats = stats.filter(|stats| !stats.is_empty());

        match (songs, stats) {
            (Some(_), Some(_)) => Err(ScoringError::AmbiguousReport),
            (Some(songs), None) => Ok(MatchReport::Songs(songs)),
            (None, Some(stats)) => Ok(MatchReport::Stats(stats)),
            (None, None) => Ok(MatchReport::ParticipantsOnly),
        }
    }
}

/// Parses a submitted score. Accepts JSON integers and integer strings; null,
/// a missing value, or a blank string mean "no score".
pub fn parse_score(
    song_id: i64,
    player_id: PlayerId,
    value: Option<&Value>,
) -> Result<Option<i64>, ScoringError> {
    let invalid = |value: &Value| ScoringError::InvalidScore {
        song_id,
        player_id,
        value: value.to_string(),
    };

    let score = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number
            .as_i64()
            .ok_or_else(|| invalid(&Value::Number(number.clone())))?,
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<i64>()
            .map_err(|_| invalid(&Value::String(text.clone())))?,
        Some(other) => return Err(invalid(other)),
    };

    if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
        return Err(ScoringError::ScoreOutOfRange {
            song_id,
            player_id,
            score,
        });
    }

    Ok(Some(score))
}

fn require_two_players(players: &BTreeSet<PlayerId>) -> Result<(), ScoringError> {
    if players.len() < 2 {
        return Err(ScoringError::TooFewParticipants {
            found: players.len(),
        });
    }
    Ok(())
}

/// Validates a match write and computes everything that gets stored: song win
/// flags, participant list and per-player W-L-D. Nothing is persisted when
/// this returns an error.
#[instrument(skip(request), fields(event_id = request.event_id))]
pub fn validate_match_request(
    request: MatchWriteRequest,
    created_by: Option<i64>,
) -> Result<NewMatch, ScoringError> {
    let MatchWriteRequest {
        event_id,
        player_ids,
        songs,
        winner_id,
        player_stats,
        round,
    } = request;

    let listed_players: BTreeSet<PlayerId> = player_ids.unwrap_or_default().into_iter().collect();
    let round = round
        .map(|round| round.trim().to_string())
        .filter(|round| !round.is_empty());

    let (participants, scores, stats) = match MatchReport::from_parts(songs, player_stats)? {
        MatchReport::Songs(songs) => songs_report(songs, listed_players)?,
        MatchReport::Stats(stats) => stats_report(stats, listed_players)?,
        MatchReport::ParticipantsOnly => {
            require_two_players(&listed_players)?;
            let stats = listed_players
                .iter()
                .map(|player_id| (*player_id, WinLossDraw::default()))
                .collect();
            (listed_players, Vec::new(), stats)
        }
    };

    debug!(
        participants = participants.len(),
        score_rows = scores.len(),
        "Match write validated"
    );

    Ok(NewMatch {
        event_id,
        round,
        winner_id,
        created_by,
        participants: participants.into_iter().collect(),
        scores,
        stats,
    })
}

type ValidatedReport = (
    BTreeSet<PlayerId>,
    Vec<NewPlayerScore>,
    Vec<(PlayerId, WinLossDraw)>,
);

fn songs_report(
    songs: Vec<SongScoresInput>,
    listed_players: BTreeSet<PlayerId>,
) -> Result<ValidatedReport, ScoringError> {
    let mut song_entries: Vec<Vec<ScoreEntry>> = Vec::with_capacity(songs.len());

    for song in &songs {
        if song.player_scores.is_empty() {
            return Err(ScoringError::EmptySong {
                song_id: song.song_id,
            });
        }

        let mut seen = BTreeSet::new();
        let mut entries = Vec::with_capacity(song.player_scores.len());
        for player_score in &song.player_scores {
            if !seen.insert(player_score.player_id) {
                return Err(ScoringError::DuplicateSongEntry {
                    song_id: song.song_id,
                    player_id: player_score.player_id,
                });
            }
            let score = parse_score(
                song.song_id,
                player_score.player_id,
                player_score.score.as_ref(),
            )?;
            entries.push(ScoreEntry::new(player_score.player_id, score));
        }
        song_entries.push(entries);
    }

    let song_players: BTreeSet<PlayerId> = song_entries
        .iter()
        .flatten()
        .map(|entry| entry.player_id)
        .collect();
    require_two_players(&song_players)?;

    // Listed players who never appear on a song fail the total check below
    let participants: BTreeSet<PlayerId> = song_players.union(&listed_players).copied().collect();

    let tally = compute_wld(&song_entries, &participants);
    let expected = scored_song_count(&song_entries) as u32;
    for (player_id, record) in &tally {
        if record.total() != expected {
            return Err(ScoringError::TotalMismatch {
                player_id: *player_id,
                expected,
                actual: record.total(),
            });
        }
    }

    // Each (song_order, song_id) pair is one song slot in the view
    let mut slots = BTreeSet::new();
    let mut scores = Vec::new();
    for (index, (song, entries)) in songs.iter().zip(&song_entries).enumerate() {
        let song_order = song.song_order.unwrap_or(index as i32 + 1);
        if !slots.insert((song_order, song.song_id)) {
            return Err(ScoringError::DuplicateSongSlot {
                song_id: song.song_id,
                song_order,
            });
        }

        let winner = determine_song_winner(entries);
        scores.extend(entries.iter().map(|entry| NewPlayerScore {
            song_id: song.song_id,
            chart_id: song.chart_id,
            song_order,
            player_id: entry.player_id,
            score: entry.score,
            win: winner == Some(entry.player_id),
        }));
    }

    Ok((participants, scores, tally.into_iter().collect()))
}

fn stats_report(
    stats: Vec<PlayerStatInput>,
    listed_players: BTreeSet<PlayerId>,
) -> Result<ValidatedReport, ScoringError> {
    let mut reported: BTreeMap<PlayerId, WinLossDraw> = BTreeMap::new();
    for stat in &stats {
        let record = WinLossDraw::new(stat.wins, stat.losses, stat.draws);
        if reported.insert(stat.player_id, record).is_some() {
            return Err(ScoringError::DuplicateStat {
                player_id: stat.player_id,
            });
        }
    }

    let participants: BTreeSet<PlayerId> = listed_players
        .into_iter()
        .chain(reported.keys().copied())
        .collect();
    require_two_players(&participants)?;

    let stats = participants
        .iter()
        .map(|player_id| {
            let record = reported.get(player_id).copied().unwrap_or_default();
            (*player_id, record)
        })
        .collect();

    Ok((participants, Vec::new(), stats))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matches::types::PlayerScoreInput;
    use serde_json::json;

    fn score(player_id: PlayerId, value: Value) -> PlayerScoreInput {
        PlayerScoreInput {
            player_id,
            score: Some(value),
        }
    }

    fn song(song_id: i64, scores: Vec<PlayerScoreInput>) -> SongScoresInput {
        SongScoresInput {
            song_id,
            chart_id: None,
            song_order: None,
            player_scores: scores,
        }
    }

    fn request() -> MatchWriteRequest {
        MatchWriteRequest {
            event_id: 1,
            player_ids: None,
            songs: None,
            winner_id: None,
            player_stats: None,
            round: None,
        }
    }

    #[test]
    fn derives_stats_and_win_flags_from_songs() {
        let request = MatchWriteRequest {
            songs: Some(vec![
                song(10, vec![score(1, json!(10)), score(2, json!(20))]),
                song(11, vec![score(1, json!(30)), score(2, json!("30"))]),
            ]),
            winner_id: Some(2),
            round: Some("  Grand Finals ".to_string()),
            ..request()
        };

        let new_match = validate_match_request(request, Some(5)).unwrap();

        assert_eq!(new_match.participants, vec![1, 2]);
        assert_eq!(new_match.round.as_deref(), Some("Grand Finals"));
        assert_eq!(new_match.created_by, Some(5));
        assert_eq!(
            new_match.stats,
            vec![(1, WinLossDraw::new(0, 1, 1)), (2, WinLossDraw::new(1, 0, 1))]
        );

        let wins: Vec<(i64, PlayerId, bool, i32)> = new_match
            .scores
            .iter()
            .map(|s| (s.song_id, s.player_id, s.win, s.song_order))
            .collect();
        assert_eq!(
            wins,
            vec![
                (10, 1, false, 1),
                (10, 2, true, 1),
                (11, 1, false, 2),
                (11, 2, false, 2),
            ]
        );
    }

    #[test]
    fn single_player_from_songs_is_rejected() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![1, 2]),
            songs: Some(vec![song(10, vec![score(1, json!(500))])]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(result, Err(ScoringError::TooFewParticipants { found: 1 }));
    }

    #[test]
    fn participants_only_needs_two_players() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![3, 3]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(result, Err(ScoringError::TooFewParticipants { found: 1 }));
    }

    #[test]
    fn participants_only_defaults_to_zero_stats() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![4, 3]),
            winner_id: Some(3),
            ..request()
        };

        let new_match = validate_match_request(request, None).unwrap();
        assert_eq!(new_match.participants, vec![3, 4]);
        assert!(new_match.scores.is_empty());
        assert!(new_match
            .stats
            .iter()
            .all(|(_, record)| *record == WinLossDraw::default()));
    }

    #[test]
    fn explicit_stats_are_trusted() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![1, 2, 3]),
            player_stats: Some(vec![
                PlayerStatInput {
                    player_id: 1,
                    wins: 3,
                    losses: 0,
                    draws: 0,
                },
                PlayerStatInput {
                    player_id: 2,
                    wins: 0,
                    losses: 7,
                    draws: 1,
                },
            ]),
            ..request()
        };

        let new_match = validate_match_request(request, None).unwrap();
        assert_eq!(
            new_match.stats,
            vec![
                (1, WinLossDraw::new(3, 0, 0)),
                (2, WinLossDraw::new(0, 7, 1)),
                (3, WinLossDraw::default()),
            ]
        );
    }

    #[test]
    fn songs_and_stats_together_are_rejected() {
        let request = MatchWriteRequest {
            songs: Some(vec![song(10, vec![score(1, json!(1)), score(2, json!(2))])]),
            player_stats: Some(vec![PlayerStatInput {
                player_id: 1,
                wins: 1,
                losses: 0,
                draws: 0,
            }]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(result, Err(ScoringError::AmbiguousReport));
    }

    #[test]
    fn player_missing_a_scored_song_fails_the_total_check() {
        let request = MatchWriteRequest {
            songs: Some(vec![
                song(10, vec![score(1, json!(90)), score(2, Value::Null)]),
                song(11, vec![score(1, json!(10)), score(2, json!(20))]),
            ]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(
            result,
            Err(ScoringError::TotalMismatch {
                player_id: 2,
                expected: 2,
                actual: 1,
            })
        );
    }

    #[test]
    fn listed_player_without_songs_fails_the_total_check() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![1, 2, 9]),
            songs: Some(vec![song(10, vec![score(1, json!(1)), score(2, json!(2))])]),
            ..request()
        };

        let error = validate_match_request(request, None).unwrap_err();
        assert_eq!(
            error,
            ScoringError::TotalMismatch {
                player_id: 9,
                expected: 1,
                actual: 0,
            }
        );
        assert!(error.to_string().contains("player 9"));
    }

    #[test]
    fn duplicate_player_on_a_song_is_rejected() {
        let request = MatchWriteRequest {
            songs: Some(vec![song(
                10,
                vec![score(1, json!(1)), score(2, json!(2)), score(1, json!(3))],
            )]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(
            result,
            Err(ScoringError::DuplicateSongEntry {
                song_id: 10,
                player_id: 1,
            })
        );
    }

    #[test]
    fn default_order_colliding_with_explicit_order_is_rejected() {
        let mut first = song(10, vec![score(1, json!(100)), score(2, json!(80))]);
        first.song_order = Some(2);
        let second = song(10, vec![score(1, json!(10)), score(2, json!(90))]);
        let request = MatchWriteRequest {
            songs: Some(vec![first, second]),
            ..request()
        };

        let result = validate_match_request(request, None);
        assert_eq!(
            result,
            Err(ScoringError::DuplicateSongSlot {
                song_id: 10,
                song_order: 2,
            })
        );
    }

    #[test]
    fn same_song_replayed_in_another_slot_is_accepted() {
        let request = MatchWriteRequest {
            songs: Some(vec![
                song(10, vec![score(1, json!(100)), score(2, json!(80))]),
                song(10, vec![score(1, json!(10)), score(2, json!(90))]),
            ]),
            ..request()
        };

        let new_match = validate_match_request(request, None).unwrap();
        assert_eq!(
            new_match.stats,
            vec![(1, WinLossDraw::new(1, 1, 0)), (2, WinLossDraw::new(1, 1, 0))]
        );
        let orders: BTreeSet<i32> = new_match.scores.iter().map(|s| s.song_order).collect();
        assert_eq!(orders, BTreeSet::from([1, 2]));
    }

    #[test]
    fn explicit_song_order_is_kept() {
        let mut first = song(10, vec![score(1, json!(1)), score(2, json!(2))]);
        first.song_order = Some(7);
        let request = MatchWriteRequest {
            songs: Some(vec![first]),
            ..request()
        };

        let new_match = validate_match_request(request, None).unwrap();
        assert!(new_match.scores.iter().all(|s| s.song_order == 7));
    }

    #[test]
    fn parses_and_bounds_scores() {
        assert_eq!(parse_score(1, 1, None), Ok(None));
        assert_eq!(parse_score(1, 1, Some(&Value::Null)), Ok(None));
        assert_eq!(parse_score(1, 1, Some(&json!(" "))), Ok(None));
        assert_eq!(parse_score(1, 1, Some(&json!(0))), Ok(Some(0)));
        assert_eq!(parse_score(1, 1, Some(&json!(100000))), Ok(Some(100_000)));
        assert_eq!(parse_score(1, 1, Some(&json!(" 4200 "))), Ok(Some(4200)));

        assert!(matches!(
            parse_score(1, 1, Some(&json!(100001))),
            Err(ScoringError::ScoreOutOfRange { score: 100001, .. })
        ));
        assert!(matches!(
            parse_score(1, 1, Some(&json!(-1))),
            Err(ScoringError::ScoreOutOfRange { score: -1, .. })
        ));
        assert!(matches!(
            parse_score(1, 1, Some(&json!(95.5))),
            Err(ScoringError::InvalidScore { .. })
        ));
        assert!(matches!(
            parse_score(1, 1, Some(&json!("abc"))),
            Err(ScoringError::InvalidScore { .. })
        ));
        assert!(matches!(
            parse_score(1, 1, Some(&json!(true))),
            Err(ScoringError::InvalidScore { .. })
        ));
    }

    #[test]
    fn empty_song_list_falls_back_to_participants() {
        let request = MatchWriteRequest {
            player_ids: Some(vec![1, 2]),
            songs: Some(vec![]),
            ..request()
        };

        let new_match = validate_match_request(request, None).unwrap();
        assert_eq!(new_match.participants, vec![1, 2]);
        assert!(new_match.scores.is_empty());
    }
}
