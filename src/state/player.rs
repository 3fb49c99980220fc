use super::AppState;
use crate::error::{GameError, GameResult};
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// Everyone who has made contact with the game this session
#[derive(Debug, Clone, Default)]
pub struct PlayerRegistry {
    players: HashMap<PlayerId, Player>,
}

impl PlayerRegistry {
    pub fn get(&self, id: &str) -> Option<&Player> {
        self.players.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Player> {
        self.players.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Add an unnamed player, or return the existing one
    pub fn register(&mut self, id: PlayerId) -> &Player {
        self.players
            .entry(id.clone())
            .or_insert_with(|| Player::new(id))
    }

    pub fn set_name(&mut self, id: &str, name: &str) -> GameResult<&Player> {
        let name = name.trim();
        if name.is_empty() {
            return Err(GameError::EmptyName);
        }
        let player = self.players.get_mut(id).ok_or(GameError::UnknownPlayer)?;
        player.display_name = Some(name.to_string());
        Ok(player)
    }

    pub fn is_named(&self, id: &str) -> bool {
        self.players.get(id).is_some_and(Player::is_named)
    }

    /// The player if they may take part in a round
    pub fn require_named(&self, id: &str) -> GameResult<&Player> {
        let player = self.players.get(id).ok_or(GameError::UnknownPlayer)?;
        if !player.is_named() {
            return Err(GameError::Unnamed);
        }
        Ok(player)
    }

    pub fn named_ids(&self) -> HashSet<PlayerId> {
        self.players
            .values()
            .filter(|p| p.is_named())
            .map(|p| p.id.clone())
            .collect()
    }

    pub fn named_count(&self) -> usize {
        self.players.values().filter(|p| p.is_named()).count()
    }

    pub fn reset_round_flags(&mut self) {
        for player in self.players.values_mut() {
            player.submitted_this_round = false;
            player.voted_this_round = false;
        }
    }

    pub fn clear_voted(&mut self) {
        for player in self.players.values_mut() {
            player.voted_this_round = false;
        }
    }

    /// Drop everyone who never picked a name. Returns the removed ids.
    pub fn prune_unnamed(&mut self) -> Vec<PlayerId> {
        let removed: Vec<PlayerId> = self
            .players
            .values()
            .filter(|p| !p.is_named())
            .map(|p| p.id.clone())
            .collect();
        for id in &removed {
            self.players.remove(id);
        }
        removed
    }

    pub fn award(&mut self, id: &str, points: u32) {
        if let Some(player) = self.players.get_mut(id) {
            player.score += points;
        }
    }

    pub fn clear(&mut self) {
        self.players.clear();
    }

    /// All players ordered by name, unnamed last
    pub fn list(&self) -> Vec<Player> {
        let mut players: Vec<Player> = self.players.values().cloned().collect();
        players.sort_by(|a, b| match (&a.display_name, &b.display_name) {
            (Some(x), Some(y)) => x.cmp(y).then_with(|| a.id.cmp(&b.id)),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.id.cmp(&b.id),
        });
        players
    }

    /// Named players by score, highest first
    pub fn standings(&self) -> Vec<Standing> {
        let mut standings: Vec<Standing> = self
            .players
            .values()
            .filter_map(|p| {
                p.display_name.as_ref().map(|name| Standing {
                    id: p.id.clone(),
                    display_name: name.clone(),
                    score: p.score,
                })
            })
            .collect();
        standings.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.display_name.cmp(&b.display_name))
        });
        standings
    }
}

impl AppState {
    /// Join the game. A known id is returned as-is; new players may only
    /// join while the game sits in the lobby.
    pub async fn join(&self, requested_id: Option<PlayerId>) -> GameResult<Player> {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);

        let requested_id = requested_id.filter(|id| !id.trim().is_empty());
        if let Some(player) = requested_id.as_deref().and_then(|id| session.players.get(id)) {
            return Ok(player.clone());
        }

        if session.phase != GamePhase::Lobby {
            tracing::info!(phase = %session.phase, "Join refused, game in progress");
            return Err(GameError::GameInProgress);
        }

        let id = requested_id.unwrap_or_else(|| ulid::Ulid::new().to_string());
        let player = session.players.register(id).clone();
        tracing::info!("Player {} joined the lobby", player.id);
        Ok(player)
    }

    /// Set a display name. Names are only chosen in the lobby.
    pub async fn set_name(&self, player_id: &str, name: &str) -> GameResult<Player> {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.expect_phase(GamePhase::Lobby)?;

        let player = session.players.set_name(player_id, name)?.clone();
        tracing::info!(
            "Player {} is now called {:?}",
            player.id,
            player.display_name
        );
        Ok(player)
    }

    /// Player list for the lobby and wait screens, read under the same
    /// lock as the phase it belongs to
    pub async fn list_players(&self) -> Roster {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        Roster {
            phase: session.phase,
            players: session.players.list(),
        }
    }
}
