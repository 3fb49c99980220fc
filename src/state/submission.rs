use super::{AppState, GameSession};
use crate::error::{GameError, GameResult};
use crate::types::*;
use chrono::{DateTime, Utc};

impl GameSession {
    /// Every named player has a non-empty caption in
    pub fn all_submitted(&self) -> bool {
        let named = self.players.named_ids();
        !named.is_empty()
            && named
                .iter()
                .all(|id| self.captions.get(id).is_some_and(|c| !c.is_empty()))
    }

    /// Store a caption. When it is the last one outstanding, voting opens
    /// immediately instead of waiting out the writing timer.
    pub fn submit_caption(
        &mut self,
        player_id: &str,
        caption: Caption,
        now: DateTime<Utc>,
    ) -> GameResult<ActionOutcome> {
        let before = self.phase;
        self.expect_phase(GamePhase::Writing)?;
        let player = self.players.require_named(player_id)?;
        if player.submitted_this_round {
            return Err(GameError::AlreadySubmitted);
        }
        if self.clock.is_expired(now) {
            self.reconcile_deadline(now);
            return Err(GameError::DeadlinePassed);
        }
        if caption.is_empty() {
            return Err(GameError::EmptySubmission);
        }

        self.captions.insert(player_id.to_string(), caption);
        if let Some(player) = self.players.get_mut(player_id) {
            player.submitted_this_round = true;
        }
        tracing::info!(round = self.round_no, "Player {} submitted caption", player_id);

        if self.all_submitted() {
            tracing::info!("All named players submitted early, moving to voting");
            self.open_voting(now);
        }
        Ok(ActionOutcome::new(before, self.phase))
    }

    pub fn caption(&self, author_id: &str) -> Option<&Caption> {
        self.captions.get(author_id)
    }
}

impl AppState {
    /// Submit a caption for the current round.
    ///
    /// No reconcile up front: a submission after the writing deadline gets
    /// `DeadlinePassed`, and the phase advances as part of that rejection.
    pub async fn submit_caption(
        &self,
        player_id: &str,
        line1: &str,
        line2: &str,
    ) -> GameResult<ActionOutcome> {
        let now = self.clock.now();
        let caption = Caption::from_input(line1, line2);
        self.session
            .write()
            .await
            .submit_caption(player_id, caption, now)
    }

    /// The current poster and an author's caption, for rendering
    pub async fn caption_for_render(&self, author_id: &str) -> GameResult<(PosterId, Caption)> {
        let session = self.session.read().await;
        let caption = session
            .caption(author_id)
            .cloned()
            .ok_or(GameError::CaptionNotFound)?;
        let poster = session
            .current_poster
            .clone()
            .ok_or(GameError::NoPosterSelected)?;
        Ok((poster, caption))
    }
}
