use super::{AppState, GameSession};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened when a player asked for the next round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum NextRound {
    Started { round: RoundStart },
    GameOver,
    /// Too few named players were left, so the game was reset
    ReturnedToLobby,
}

impl GameSession {
    fn clear_round(&mut self) {
        self.current_poster = None;
        self.captions.clear();
        self.votes.clear();
        self.winning_author = None;
        self.players.reset_round_flags();
        self.clock.clear();
    }

    /// Start the next round from the lobby or from round results. An empty
    /// poster pool ends the game.
    pub fn start_round(&mut self, now: DateTime<Utc>) -> GameResult<RoundStart> {
        match self.phase {
            GamePhase::Lobby | GamePhase::RoundResults => {}
            actual => {
                return Err(GameError::WrongPhase {
                    expected: GamePhase::RoundResults,
                    actual,
                })
            }
        }
        if self.round_no >= self.config.max_rounds {
            self.finish_game();
            return Err(GameError::WrongPhase {
                expected: GamePhase::RoundResults,
                actual: GamePhase::GameOver,
            });
        }

        self.clear_round();

        let draw = match self.posters.draw(&mut self.rng) {
            Ok(draw) => draw,
            Err(e) => {
                tracing::error!("No posters loaded at all, cannot start round");
                self.finish_game();
                return Err(e);
            }
        };
        if draw.recycled {
            tracing::warn!("All posters used in this game, reusing posters");
        }

        self.current_poster = Some(draw.poster.clone());
        self.round_no += 1;
        self.phase = GamePhase::Writing;
        let deadline = self.clock.arm(now, self.config.writing_seconds);

        tracing::info!(
            round = self.round_no,
            poster = %draw.poster,
            %deadline,
            "Round started"
        );

        Ok(RoundStart {
            round_no: self.round_no,
            poster: draw.poster,
            deadline,
            recycled_posters: draw.recycled,
        })
    }

    /// Lobby -> first round, requested by a named player
    pub fn start_game(&mut self, requester: &str, now: DateTime<Utc>) -> GameResult<RoundStart> {
        self.expect_phase(GamePhase::Lobby)?;
        self.players.require_named(requester)?;

        let have = self.players.named_count();
        if have < self.config.min_players {
            return Err(GameError::NotEnoughPlayers {
                needed: self.config.min_players,
                have,
            });
        }
        // Stay in the lobby rather than ending a game that never began
        if self.posters.is_empty() {
            return Err(GameError::NoPosters);
        }

        self.start_round(now)
    }

    /// Move on from round results: end the game at the round limit, reset
    /// when too few players remain, otherwise start the next round.
    pub fn next_round(&mut self, requester: &str, now: DateTime<Utc>) -> GameResult<NextRound> {
        self.expect_phase(GamePhase::RoundResults)?;
        self.players.require_named(requester)?;

        if self.conclude_if_final() {
            return Ok(NextRound::GameOver);
        }

        for id in self.players.prune_unnamed() {
            tracing::info!("Removing inactive player: {}", id);
        }

        let have = self.players.named_count();
        if have < self.config.min_players {
            tracing::info!(have, "Not enough players to continue, returning to lobby");
            self.reset();
            return Ok(NextRound::ReturnedToLobby);
        }

        self.start_round(now).map(|round| NextRound::Started { round })
    }

    /// RoundResults -> GameOver once the round limit is reached
    pub(crate) fn conclude_if_final(&mut self) -> bool {
        if self.phase == GamePhase::RoundResults && self.round_no >= self.config.max_rounds {
            self.finish_game();
            return true;
        }
        self.phase == GamePhase::GameOver
    }
}

impl AppState {
    /// Load posters from the asset store if none are known yet
    async fn ensure_posters(&self) {
        if !self.session.read().await.posters.is_empty() {
            return;
        }
        let assets = self.assets.clone();
        match tokio::task::spawn_blocking(move || assets.list_posters()).await {
            Ok(Ok(posters)) if !posters.is_empty() => {
                let mut session = self.session.write().await;
                if session.posters.is_empty() {
                    tracing::info!("Loaded {} posters", posters.len());
                    session.posters.load(posters);
                }
            }
            Ok(Ok(_)) => tracing::warn!("Still no posters available"),
            Ok(Err(e)) => tracing::warn!("Failed to list posters: {}", e),
            Err(e) => tracing::error!("Poster listing task failed: {}", e),
        }
    }

    pub async fn start_game(&self, requester: &str) -> GameResult<RoundStart> {
        self.ensure_posters().await;
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.start_game(requester, now)
    }

    pub async fn next_round(&self, requester: &str) -> GameResult<NextRound> {
        self.ensure_posters().await;
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.next_round(requester, now)
    }
}
