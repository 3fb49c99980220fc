use super::{tally, AppState, GameSession};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};

impl GameSession {
    pub(crate) fn expect_phase(&self, expected: GamePhase) -> GameResult<()> {
        if self.phase != expected {
            return Err(GameError::WrongPhase {
                expected,
                actual: self.phase,
            });
        }
        Ok(())
    }

    /// Advance the phase if its deadline has passed. Returns the new phase
    /// when a transition happened. Calling it again right away is a no-op
    /// because the transition re-arms or clears the deadline.
    pub fn reconcile_deadline(&mut self, now: DateTime<Utc>) -> Option<GamePhase> {
        if !self.phase.is_timed() || !self.clock.is_expired(now) {
            return None;
        }

        tracing::info!(phase = %self.phase, "Phase timer expired, advancing");
        match self.phase {
            GamePhase::Writing => self.open_voting(now),
            GamePhase::Voting => self.close_voting(),
            _ => return None,
        }
        Some(self.phase)
    }

    /// Writing -> Voting, with a fresh deadline and cleared vote flags
    pub(crate) fn open_voting(&mut self, now: DateTime<Utc>) {
        self.phase = GamePhase::Voting;
        let deadline = self.clock.arm(now, self.config.voting_seconds);
        self.players.clear_voted();
        tracing::info!(
            round = self.round_no,
            %deadline,
            "Voting opened for {} captions",
            self.captions.len()
        );
    }

    /// Voting -> RoundResults: tally votes and award points
    pub(crate) fn close_voting(&mut self) {
        let named = self.players.named_ids();
        let outcome = tally::tally(&self.captions, &self.votes, &named, &mut self.rng);

        for (author, count) in &outcome.counts {
            self.players.award(author, *count);
        }
        self.winning_author = outcome.winner;
        self.phase = GamePhase::RoundResults;
        self.clock.clear();

        let winner_name = self
            .winning_author
            .as_deref()
            .and_then(|id| self.players.get(id))
            .and_then(|p| p.display_name.clone())
            .unwrap_or_else(|| "None".to_string());
        let winning_votes = self
            .winning_author
            .as_ref()
            .and_then(|id| outcome.counts.get(id))
            .copied()
            .unwrap_or(0);
        tracing::info!(
            round = self.round_no,
            "Votes tallied. Round winner: {} with {} votes",
            winner_name,
            winning_votes
        );
    }

    /// Terminal transition; nothing runs against a deadline afterwards
    pub(crate) fn finish_game(&mut self) {
        self.phase = GamePhase::GameOver;
        self.clock.clear();
        tracing::info!(round = self.round_no, "Game over");
    }

    /// Back to an empty lobby. Known posters survive, everything else goes.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Lobby;
        self.round_no = 0;
        self.current_poster = None;
        self.captions.clear();
        self.votes.clear();
        self.winning_author = None;
        self.clock.clear();
        self.posters.reset_used();
        self.players.clear();
    }

    pub fn status(&self, now: DateTime<Utc>) -> StatusView {
        StatusView {
            phase: self.phase,
            round_no: self.round_no,
            max_rounds: self.config.max_rounds,
            deadline: self.clock.deadline(),
            server_now: now,
            seconds_remaining: self.clock.seconds_remaining(now),
        }
    }
}

impl AppState {
    /// Apply any pending deadline expiry. Safe to call from many requests
    /// at once; the write lock makes check-then-transition atomic.
    pub async fn reconcile(&self) -> Option<GamePhase> {
        let now = self.clock.now();
        self.session.write().await.reconcile_deadline(now)
    }

    /// Status poll: reconcile, then report phase and timer
    pub async fn status(&self) -> StatusView {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.status(now)
    }

    pub async fn phase(&self) -> GamePhase {
        self.session.read().await.phase
    }

    /// Return to the lobby from any phase, dropping all players
    pub async fn reset(&self) {
        self.session.write().await.reset();
        tracing::info!("Game state has been reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_new_game_is_in_lobby() {
        let (state, _clock) = state_with_posters(&["a.png"]);
        let status = state.status().await;
        assert_eq!(status.phase, GamePhase::Lobby);
        assert_eq!(status.round_no, 0);
        assert_eq!(status.max_rounds, 5);
        assert!(status.deadline.is_none());
    }

    #[tokio::test]
    async fn test_deadline_advances_writing_to_voting() {
        let (state, clock, ids) = writing_game(&["Alice", "Bob", "Cara"]).await;
        state
            .submit_caption(&ids[0], "ONLY ME", "")
            .await
            .unwrap();

        // Not yet expired
        clock.advance(Duration::seconds(30));
        assert_eq!(state.reconcile().await, None);

        clock.advance(Duration::seconds(1));
        assert_eq!(state.reconcile().await, Some(GamePhase::Voting));

        let status = state.status().await;
        assert_eq!(status.phase, GamePhase::Voting);
        assert_eq!(status.seconds_remaining, Some(30));
    }

    #[tokio::test]
    async fn test_reconcile_is_idempotent() {
        let (state, clock, _ids) = writing_game(&["Alice", "Bob"]).await;
        clock.advance(Duration::seconds(45));

        assert_eq!(state.reconcile().await, Some(GamePhase::Voting));
        assert_eq!(state.reconcile().await, None);
        assert_eq!(state.phase().await, GamePhase::Voting);
    }

    #[tokio::test]
    async fn test_voting_deadline_tallies() {
        let (state, clock, ids) = writing_game(&["Alice", "Bob", "Cara"]).await;
        state.submit_caption(&ids[0], "A", "").await.unwrap();
        state.submit_caption(&ids[1], "B", "").await.unwrap();
        clock.advance(Duration::seconds(31));
        state.reconcile().await;

        state.submit_vote(&ids[2], &ids[0]).await.unwrap();
        clock.advance(Duration::seconds(31));
        assert_eq!(state.reconcile().await, Some(GamePhase::RoundResults));

        let session = state.session.read().await;
        assert_eq!(session.winning_author.as_deref(), Some(ids[0].as_str()));
        assert_eq!(session.players.get(&ids[0]).unwrap().score, 1);
        assert!(session.clock.deadline().is_none());
    }

    #[tokio::test]
    async fn test_reconcile_ignores_untimed_phases() {
        let (state, clock) = state_with_posters(&["a.png"]);
        clock.advance(Duration::hours(1));
        assert_eq!(state.reconcile().await, None);
        assert_eq!(state.phase().await, GamePhase::Lobby);
    }

    #[tokio::test]
    async fn test_reset_clears_everything() {
        let (state, _clock, ids) = writing_game(&["Alice", "Bob"]).await;
        state.submit_caption(&ids[0], "HELLO", "").await.unwrap();
        state.reset().await;

        let session = state.session.read().await;
        assert_eq!(session.phase, GamePhase::Lobby);
        assert_eq!(session.round_no, 0);
        assert!(session.players.is_empty());
        assert!(session.captions.is_empty());
        assert!(session.current_poster.is_none());
        assert!(session.posters.used().is_empty());
        assert!(!session.posters.is_empty());
    }
}
