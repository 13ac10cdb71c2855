//! Song-level winner detection and per-match win/loss/draw tallies.
//!
//! Everything here is pure and order-independent: shuffling the entries of a
//! song, or the songs of a match, never changes the result.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub type PlayerId = i64;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 100_000;

/// One player's submission for one song. `score: None` means the player did
/// not post a score and is ignored for that song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreEntry {
    pub player_id: PlayerId,
    pub score: Option<i64>,
}

impl ScoreEntry {
    pub fn new(player_id: PlayerId, score: Option<i64>) -> Self {
        Self { player_id, score }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinLossDraw {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl WinLossDraw {
    pub fn new(wins: u32, losses: u32, draws: u32) -> Self {
        Self {
            wins,
            losses,
            draws,
        }
    }

    pub fn total(&self) -> u32 {
        self.wins + self.losses + self.draws
    }
}

fn valid_scores(entries: &[ScoreEntry]) -> impl Iterator<Item = (PlayerId, i64)> + '_ {
    entries
        .iter()
        .filter_map(|entry| entry.score.map(|score| (entry.player_id, score)))
}

/// Returns the single player holding the strictly highest score, or `None`
/// when nobody scored or the top score is shared.
pub fn determine_song_winner(entries: &[ScoreEntry]) -> Option<PlayerId> {
    let max = valid_scores(entries).map(|(_, score)| score).max()?;

    let mut leaders = valid_scores(entries).filter(|(_, score)| *score == max);
    let (leader, _) = leaders.next()?;

    match leaders.next() {
        Some(_) => None,
        None => Some(leader),
    }
}

/// Number of songs with at least one posted score. This is the total every
/// participant's W+L+D has to reach.
pub fn scored_song_count<S: AsRef<[ScoreEntry]>>(songs: &[S]) -> usize {
    songs
        .iter()
        .filter(|song| valid_scores(song.as_ref()).next().is_some())
        .count()
}

/// Tallies wins, losses and draws for every participant across `songs`.
///
/// Per song, with unposted scores removed:
/// - nobody scored: the song is skipped
/// - every scorer on the same value (including a lone scorer): draw for each
/// - a unique top score: win for its holder, loss for everyone else
/// - a shared top score: draw for each holder, loss for everyone below
///
/// Every participant appears in the result even with an all-zero record.
pub fn compute_wld<S: AsRef<[ScoreEntry]>>(
    songs: &[S],
    participants: &BTreeSet<PlayerId>,
) -> BTreeMap<PlayerId, WinLossDraw> {
    let mut tally: BTreeMap<PlayerId, WinLossDraw> = participants
        .iter()
        .map(|player_id| (*player_id, WinLossDraw::default()))
        .collect();

    for song in songs {
        let entries = song.as_ref();

        let Some(max) = valid_scores(entries).map(|(_, score)| score).max() else {
            continue;
        };
        let min = valid_scores(entries)
            .map(|(_, score)| score)
            .min()
            .unwrap_or(max);
        let leaders = valid_scores(entries)
            .filter(|(_, score)| *score == max)
            .count();

        for (player_id, score) in valid_scores(entries) {
            let record = tally.entry(player_id).or_default();

            if max == min {
                record.draws += 1;
            } else if score == max && leaders == 1 {
                record.wins += 1;
            } else if score == max {
                record.draws += 1;
            } else {
                record.losses += 1;
            }
        }
    }

    tally
}
