use std::collections::{BTreeMap, HashMap};

use super::{
    models::{MatchModel, MatchPlayerStatModel, PlayerScoreModel},
    scoring::PlayerId,
    types::{
        EventSummary, MatchSongView, MatchView, PlayerScoreView, PlayerStatView, PlayerSummary,
    },
};
use crate::event::models::EventModel;
use crate::player::models::PlayerModel;
use crate::song::models::{ChartModel, SongModel};

/// Raw rows loaded for one match
#[derive(Debug, Clone)]
pub struct MatchViewParts {
    pub match_row: MatchModel,
    pub players: Vec<PlayerModel>,
    pub scores: Vec<PlayerScoreModel>,
    pub songs: HashMap<i64, SongModel>,
    pub charts: HashMap<i64, ChartModel>,
    pub stats: Vec<MatchPlayerStatModel>,
    pub event: Option<EventModel>,
    /// Direct lookup of the declared winner, used when they are not a participant
    pub winner_fallback: Option<PlayerModel>,
}

/// Returns the declared winner id when it cannot be resolved from the participant list
pub fn winner_needing_lookup(match_row: &MatchModel, players: &[PlayerModel]) -> Option<PlayerId> {
    let winner_id = match_row.winner_id?;
    if players.iter().any(|player| player.id == winner_id) {
        None
    } else {
        Some(winner_id)
    }
}

fn summary(player: &PlayerModel) -> PlayerSummary {
    PlayerSummary {
        player_id: player.id,
        gamertag: player.gamertag.clone(),
    }
}

/// Song slots sort by explicit order first, falling back to song id for rows without one
fn slot_key(score: &PlayerScoreModel) -> (bool, i32, i64) {
    (
        score.song_order.is_none(),
        score.song_order.unwrap_or_default(),
        score.song_id,
    )
}

/// Reshapes stored rows into the nested match document. Stats are taken as
/// stored; nothing is recomputed on read.
pub fn assemble_match_view(parts: MatchViewParts) -> MatchView {
    let MatchViewParts {
        match_row,
        mut players,
        scores,
        songs,
        charts,
        stats,
        event,
        winner_fallback,
    } = parts;

    players.sort_by_key(|player| player.id);

    let gamertags: HashMap<PlayerId, &str> = players
        .iter()
        .chain(winner_fallback.iter())
        .map(|player| (player.id, player.gamertag.as_str()))
        .collect();
    let gamertag = |player_id: PlayerId| gamertags.get(&player_id).map(|tag| tag.to_string());

    let winner = match_row.winner_id.and_then(|winner_id| {
        players
            .iter()
            .find(|player| player.id == winner_id)
            .or(winner_fallback.as_ref().filter(|player| player.id == winner_id))
            .map(summary)
    });

    let mut slots: BTreeMap<(bool, i32, i64), Vec<&PlayerScoreModel>> = BTreeMap::new();
    for score in &scores {
        slots.entry(slot_key(score)).or_default().push(score);
    }

    let song_views = slots
        .into_values()
        .map(|mut rows| {
            rows.sort_by_key(|row| row.player_id);
            let first = rows[0];
            let song = songs.get(&first.song_id);
            let chart = first.chart_id.and_then(|chart_id| charts.get(&chart_id));

            MatchSongView {
                song_id: first.song_id,
                title: song.map(|song| song.title.clone()),
                artist: song.and_then(|song| song.artist.clone()),
                chart_id: first.chart_id,
                chart_mode: chart.map(|chart| chart.mode.clone()),
                chart_difficulty: chart.map(|chart| chart.difficulty),
                chart_display: chart.map(ChartModel::display_name),
                song_order: first.song_order,
                player_scores: rows
                    .iter()
                    .map(|row| PlayerScoreView {
                        player_id: row.player_id,
                        player_gamertag: gamertag(row.player_id),
                        score: row.score,
                        win: row.win,
                    })
                    .collect(),
            }
        })
        .collect();

    let mut player_stats: Vec<PlayerStatView> = stats
        .iter()
        .map(|stat| PlayerStatView {
            player_id: stat.player_id,
            gamertag: gamertag(stat.player_id),
            wins: stat.wins,
            losses: stat.losses,
            draws: stat.draws,
        })
        .collect();
    player_stats.sort_by_key(|stat| stat.player_id);

    MatchView {
        match_id: match_row.id,
        event_id: match_row.event_id,
        round: match_row.round.clone(),
        created_at: match_row.created_at,
        players: players.iter().map(summary).collect(),
        winner,
        songs: song_views,
        player_stats,
        event: event.map(|event| EventSummary {
            event_id: event.id,
            name: event.name,
            date: event.date,
        }),
    }
}
