use super::{AppState, GameSession};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;

impl GameSession {
    /// Named authors with a non-empty caption
    fn submitted_authors(&self) -> Vec<PlayerId> {
        let mut authors: Vec<PlayerId> = self
            .captions
            .iter()
            .filter(|(id, caption)| self.players.is_named(id) && !caption.is_empty())
            .map(|(id, _)| id.clone())
            .collect();
        authors.sort();
        authors
    }

    /// Every named player who submitted has voted (or been skipped).
    /// Players who never submitted don't hold up the round.
    pub fn all_voted(&self) -> bool {
        self.submitted_authors().iter().all(|id| {
            self.players
                .get(id)
                .is_some_and(|player| player.voted_this_round)
        })
    }

    fn is_valid_target(&self, voter_id: &str, target_id: &str) -> bool {
        target_id != voter_id
            && self.players.is_named(target_id)
            && self
                .captions
                .get(target_id)
                .is_some_and(|caption| !caption.is_empty())
    }

    fn close_voting_if_complete(&mut self) {
        if self.phase == GamePhase::Voting && self.all_voted() {
            tracing::info!("All relevant players voted early, tallying results");
            self.close_voting();
        }
    }

    /// Captions this voter may choose from, in shuffled order. A voter who
    /// submitted but has nobody else to vote for is marked as voted.
    pub fn ballot(&mut self, voter_id: &str) -> GameResult<Ballot> {
        let before = self.phase;
        self.expect_phase(GamePhase::Voting)?;
        let voter = self.players.require_named(voter_id)?;
        if voter.voted_this_round {
            return Err(GameError::AlreadyVoted);
        }

        let mut authors: Vec<PlayerId> = self
            .submitted_authors()
            .into_iter()
            .filter(|author| author != voter_id)
            .collect();
        authors.shuffle(&mut self.rng);

        let mut auto_skipped = false;
        if authors.is_empty() && self.captions.contains_key(voter_id) {
            tracing::info!(
                "Player {} submitted but had no one else to vote for, auto-marking as voted",
                voter_id
            );
            if let Some(voter) = self.players.get_mut(voter_id) {
                voter.voted_this_round = true;
            }
            auto_skipped = true;
            self.close_voting_if_complete();
        }

        let authors = authors
            .into_iter()
            .filter_map(|author_id| {
                self.captions.get(&author_id).map(|caption| BallotEntry {
                    caption: caption.clone(),
                    author_id,
                })
            })
            .collect();

        Ok(Ballot {
            authors,
            auto_skipped,
            outcome: ActionOutcome::new(before, self.phase),
        })
    }

    /// Record a vote. The last outstanding vote closes voting at once.
    pub fn submit_vote(
        &mut self,
        voter_id: &str,
        target_id: &str,
        now: DateTime<Utc>,
    ) -> GameResult<ActionOutcome> {
        let before = self.phase;
        self.expect_phase(GamePhase::Voting)?;
        let voter = self.players.require_named(voter_id)?;
        if voter.voted_this_round {
            return Err(GameError::AlreadyVoted);
        }
        if self.clock.is_expired(now) {
            self.reconcile_deadline(now);
            return Err(GameError::DeadlinePassed);
        }
        if !self.is_valid_target(voter_id, target_id) {
            tracing::info!("Invalid vote from {} for {}", voter_id, target_id);
            return Err(GameError::InvalidTarget);
        }

        self.votes
            .insert(voter_id.to_string(), target_id.to_string());
        if let Some(voter) = self.players.get_mut(voter_id) {
            voter.voted_this_round = true;
        }
        tracing::info!(round = self.round_no, "Player {} voted", voter_id);

        self.close_voting_if_complete();
        Ok(ActionOutcome::new(before, self.phase))
    }
}

impl AppState {
    pub async fn ballot(&self, voter_id: &str) -> GameResult<Ballot> {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.ballot(voter_id)
    }

    /// Cast a vote. Like caption submission, a vote after the deadline is
    /// reported as `DeadlinePassed` before the phase advances.
    pub async fn submit_vote(&self, voter_id: &str, target_id: &str) -> GameResult<ActionOutcome> {
        let now = self.clock.now();
        self.session
            .write()
            .await
            .submit_vote(voter_id, target_id, now)
    }
}
