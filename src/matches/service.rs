use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::{
    assembler::{assemble_match_view, winner_needing_lookup, MatchViewParts},
    models::{MatchModel, NewMatch},
    repository::MatchRepository,
    scoring::PlayerId,
    types::{MatchView, MatchWriteRequest, PlayerRecordResponse, RecordTotals},
    validation::validate_match_request,
};
use crate::event::repository::EventRepository;
use crate::player::repository::PlayerRepository;
use crate::shared::{AppError, AppState};
use crate::song::repository::SongRepository;

/// Service for match writes, reads and per-player records
pub struct MatchService {
    repository: Arc<dyn MatchRepository + Send + Sync>,
    event_repository: Arc<dyn EventRepository + Send + Sync>,
    player_repository: Arc<dyn PlayerRepository + Send + Sync>,
    song_repository: Arc<dyn SongRepository + Send + Sync>,
}

impl MatchService {
    pub fn new(
        repository: Arc<dyn MatchRepository + Send + Sync>,
        event_repository: Arc<dyn EventRepository + Send + Sync>,
        player_repository: Arc<dyn PlayerRepository + Send + Sync>,
        song_repository: Arc<dyn SongRepository + Send + Sync>,
    ) -> Self {
        Self {
            repository,
            event_repository,
            player_repository,
            song_repository,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.match_repository),
            Arc::clone(&state.event_repository),
            Arc::clone(&state.player_repository),
            Arc::clone(&state.song_repository),
        )
    }

    /// Validates and stores a new match, returning the assembled view
    #[instrument(skip(self, request), fields(event_id = request.event_id))]
    pub async fn create_match(
        &self,
        request: MatchWriteRequest,
        created_by: Option<i64>,
    ) -> Result<MatchView, AppError> {
        let new_match = validate_match_request(request, created_by)?;
        self.ensure_references(&new_match).await?;

        let model = self.repository.create_match(&new_match).await?;
        info!(match_id = model.id, "Match created");

        self.build_view(model).await
    }

    /// Replaces a match and all of its child rows
    #[instrument(skip(self, request))]
    pub async fn update_match(
        &self,
        match_id: i64,
        request: MatchWriteRequest,
    ) -> Result<MatchView, AppError> {
        let existing = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

        let new_match = validate_match_request(request, existing.created_by)?;
        self.ensure_references(&new_match).await?;

        let model = self
            .repository
            .replace_match(match_id, &new_match)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;
        info!(match_id, "Match replaced");

        self.build_view(model).await
    }

    #[instrument(skip(self))]
    pub async fn get_match(&self, match_id: i64) -> Result<MatchView, AppError> {
        let model = self
            .repository
            .get_match(match_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Match not found".to_string()))?;

        self.build_view(model).await
    }

    #[instrument(skip(self))]
    pub async fn list_matches_by_event(&self, event_id: i64) -> Result<Vec<MatchView>, AppError> {
        let matches = self.repository.list_matches_by_event(event_id).await?;
        debug!(match_count = matches.len(), "Matches loaded for event");

        let mut views = Vec::with_capacity(matches.len());
        for model in matches {
            views.push(self.build_view(model).await?);
        }
        Ok(views)
    }

    #[instrument(skip(self))]
    pub async fn delete_match(&self, match_id: i64) -> Result<(), AppError> {
        if self.repository.get_match(match_id).await?.is_none() {
            return Err(AppError::NotFound("Match not found".to_string()));
        }
        self.repository.delete_match(match_id).await?;
        info!(match_id, "Match deleted");
        Ok(())
    }

    /// Match record from declared winners plus summed song-level W-L-D
    #[instrument(skip(self))]
    pub async fn player_record(
        &self,
        player_id: PlayerId,
    ) -> Result<PlayerRecordResponse, AppError> {
        if self.player_repository.get_player(player_id).await?.is_none() {
            return Err(AppError::NotFound("Player not found".to_string()));
        }

        let matches = self.repository.list_matches_by_player(player_id).await?;
        let mut match_record = RecordTotals::default();
        for model in &matches {
            match model.winner_id {
                Some(winner_id) if winner_id == player_id => match_record.wins += 1,
                Some(_) => match_record.losses += 1,
                None => match_record.draws += 1,
            }
        }

        let song_record = self
            .repository
            .get_stats_by_player(player_id)
            .await?
            .iter()
            .fold(RecordTotals::default(), |mut totals, stat| {
                totals.wins += stat.wins;
                totals.losses += stat.losses;
                totals.draws += stat.draws;
                totals
            });

        Ok(PlayerRecordResponse {
            player_id,
            matches_played: matches.len() as u32,
            match_record,
            song_record,
        })
    }

    /// Every id a match write points at must exist before anything is written
    async fn ensure_references(&self, new_match: &NewMatch) -> Result<(), AppError> {
        if self
            .event_repository
            .get_event(new_match.event_id)
            .await?
            .is_none()
        {
            warn!(event_id = new_match.event_id, "Match references unknown event");
            return Err(AppError::NotFound("Event not found".to_string()));
        }

        let mut player_ids: BTreeSet<PlayerId> = new_match.participants.iter().copied().collect();
        player_ids.extend(new_match.winner_id);
        let ids: Vec<PlayerId> = player_ids.iter().copied().collect();
        let found: BTreeSet<PlayerId> = self
            .player_repository
            .get_players_by_ids(&ids)
            .await?
            .iter()
            .map(|player| player.id)
            .collect();
        if let Some(missing) = player_ids.difference(&found).next() {
            warn!(player_id = missing, "Match references unknown player");
            return Err(AppError::NotFound(format!("Player {} not found", missing)));
        }

        let mut checked_songs = BTreeSet::new();
        for score in &new_match.scores {
            if checked_songs.insert(score.song_id)
                && self.song_repository.get_song(score.song_id).await?.is_none()
            {
                return Err(AppError::NotFound(format!("Song {} not found", score.song_id)));
            }
        }

        let mut checked_charts = BTreeSet::new();
        for score in &new_match.scores {
            let Some(chart_id) = score.chart_id else {
                continue;
            };
            if !checked_charts.insert((chart_id, score.song_id)) {
                continue;
            }
            let chart = self
                .song_repository
                .get_chart(chart_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Chart {} not found", chart_id)))?;
            if chart.song_id != score.song_id {
                return Err(AppError::Validation(format!(
                    "Chart {} does not belong to song {}",
                    chart_id, score.song_id
                )));
            }
        }

        Ok(())
    }

    /// Loads every row a match view needs and hands them to the assembler
    async fn build_view(&self, model: MatchModel) -> Result<MatchView, AppError> {
        let participant_ids = self.repository.get_participant_ids(model.id).await?;
        let players = self
            .player_repository
            .get_players_by_ids(&participant_ids)
            .await?;

        let scores = self.repository.get_scores(model.id).await?;
        let song_ids: Vec<i64> = scores
            .iter()
            .map(|score| score.song_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let chart_ids: Vec<i64> = scores
            .iter()
            .filter_map(|score| score.chart_id)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let songs: HashMap<i64, _> = self
            .song_repository
            .get_songs_by_ids(&song_ids)
            .await?
            .into_iter()
            .map(|song| (song.id, song))
            .collect();
        let charts: HashMap<i64, _> = self
            .song_repository
            .get_charts_by_ids(&chart_ids)
            .await?
            .into_iter()
            .map(|chart| (chart.id, chart))
            .collect();

        let stats = self.repository.get_stats(model.id).await?;
        let event = self.event_repository.get_event(model.event_id).await?;

        let winner_fallback = match winner_needing_lookup(&model, &players) {
            Some(winner_id) => {
                debug!(
                    match_id = model.id,
                    winner_id,
                    "Winner not among participants, looking up directly"
                );
                self.player_repository.get_player(winner_id).await?
            }
            None => None,
        };

        Ok(assemble_match_view(MatchViewParts {
            match_row: model,
            players,
            scores,
            songs,
            charts,
            stats,
            event,
            winner_fallback,
        }))
    }
}
