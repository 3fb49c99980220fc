use super::{tally, AppState, GameSession};
use crate::error::{GameError, GameResult};
use crate::types::*;

impl GameSession {
    /// Results of the round just tallied. Viewing the results of the final
    /// round ends the game.
    pub fn round_results(&mut self) -> GameResult<RoundResults> {
        match self.phase {
            GamePhase::RoundResults | GamePhase::GameOver => {}
            actual => {
                return Err(GameError::WrongPhase {
                    expected: GamePhase::RoundResults,
                    actual,
                })
            }
        }
        let is_game_over = self.conclude_if_final();

        let named = self.players.named_ids();
        let counts = tally::count_votes(&self.captions, &self.votes, &named);

        let mut entries: Vec<ResultEntry> = self
            .captions
            .iter()
            .filter(|(_, caption)| !caption.is_empty())
            .filter_map(|(author_id, caption)| {
                let name = self.players.get(author_id)?.display_name.clone()?;
                Some(ResultEntry {
                    author_id: author_id.clone(),
                    author_name: name,
                    caption: caption.clone(),
                    votes: counts.get(author_id).copied().unwrap_or(0),
                    is_winner: self.winning_author.as_ref() == Some(author_id),
                })
            })
            .collect();
        entries.sort_by(|a, b| {
            b.votes
                .cmp(&a.votes)
                .then_with(|| a.author_name.cmp(&b.author_name))
        });

        Ok(RoundResults {
            round_no: self.round_no,
            poster: self.current_poster.clone(),
            winner: self.winning_author.clone(),
            entries,
            standings: self.players.standings(),
            is_game_over,
        })
    }

    /// Final scoreboard, available once the game is over
    pub fn final_standings(&self) -> GameResult<Vec<Standing>> {
        self.expect_phase(GamePhase::GameOver)?;
        Ok(self.players.standings())
    }
}

impl AppState {
    pub async fn round_results(&self) -> GameResult<RoundResults> {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.round_results()
    }

    pub async fn final_standings(&self) -> GameResult<Vec<Standing>> {
        let now = self.clock.now();
        let mut session = self.session.write().await;
        session.reconcile_deadline(now);
        session.final_standings()
    }
}
