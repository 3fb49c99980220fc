mod game;
mod player;
mod posters;
mod round;
mod score;
mod submission;
pub mod tally;
mod vote;

pub use player::PlayerRegistry;
pub use posters::{PosterDraw, PosterPool};
pub use round::NextRound;

use crate::assets::AssetStore;
use crate::clock::{Clock, PhaseClock, SystemClock};
use crate::render::RenderConfig;
use crate::types::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// The one running game. Every read-then-write happens while holding the
/// `AppState::session` write lock, so each operation below is atomic.
#[derive(Debug)]
pub struct GameSession {
    pub config: GameConfig,
    pub phase: GamePhase,
    pub round_no: u32,
    pub current_poster: Option<PosterId>,
    /// Author -> caption, cleared every round
    pub captions: HashMap<PlayerId, Caption>,
    /// Voter -> author, cleared every round
    pub votes: HashMap<PlayerId, PlayerId>,
    pub winning_author: Option<PlayerId>,
    pub clock: PhaseClock,
    pub posters: PosterPool,
    pub players: PlayerRegistry,
    rng: StdRng,
}

impl GameSession {
    pub fn new(config: GameConfig, rng: StdRng) -> Self {
        Self {
            config,
            phase: GamePhase::Lobby,
            round_no: 0,
            current_poster: None,
            captions: HashMap::new(),
            votes: HashMap::new(),
            winning_author: None,
            clock: PhaseClock::default(),
            posters: PosterPool::default(),
            players: PlayerRegistry::default(),
            rng,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<GameSession>>,
    pub clock: Arc<dyn Clock>,
    pub assets: Arc<dyn AssetStore>,
    pub render_config: Arc<RenderConfig>,
}

impl AppState {
    pub fn new(config: GameConfig, assets: Arc<dyn AssetStore>) -> Self {
        Self::with_parts(config, assets, Arc::new(SystemClock), StdRng::from_os_rng())
    }

    /// Deterministic randomness, for tests and replays
    pub fn with_seed(config: GameConfig, assets: Arc<dyn AssetStore>, seed: u64) -> Self {
        Self::with_parts(
            config,
            assets,
            Arc::new(SystemClock),
            StdRng::seed_from_u64(seed),
        )
    }

    pub fn with_parts(
        config: GameConfig,
        assets: Arc<dyn AssetStore>,
        clock: Arc<dyn Clock>,
        rng: StdRng,
    ) -> Self {
        Self {
            session: Arc::new(RwLock::new(GameSession::new(config, rng))),
            clock,
            assets,
            render_config: Arc::new(RenderConfig::default()),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_render_config(mut self, config: RenderConfig) -> Self {
        self.render_config = Arc::new(config);
        self
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::clock::ManualClock;

    /// State with a manual clock, a seeded rng and `posters` in the asset store
    pub fn state_with_posters(posters: &[&str]) -> (AppState, Arc<ManualClock>) {
        let mut assets = MemoryAssets::default();
        for poster in posters {
            assets.add_poster(poster, Vec::new());
        }
        let clock = Arc::new(ManualClock::default());
        let state = AppState::with_seed(GameConfig::default(), Arc::new(assets), 7)
            .with_clock(clock.clone());
        (state, clock)
    }

    /// Join and name each player, returning their ids in order
    pub async fn named_players(state: &AppState, names: &[&str]) -> Vec<PlayerId> {
        let mut ids = Vec::new();
        for name in names {
            let player = state.join(None).await.unwrap();
            state.set_name(&player.id, name).await.unwrap();
            ids.push(player.id);
        }
        ids
    }

    /// Lobby -> Writing with the given named players
    pub async fn writing_game(names: &[&str]) -> (AppState, Arc<ManualClock>, Vec<PlayerId>) {
        let (state, clock) = state_with_posters(&["a.png", "b.png"]);
        let ids = named_players(&state, names).await;
        state.start_game(&ids[0]).await.unwrap();
        (state, clock, ids)
    }
}
