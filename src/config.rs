//! Process configuration read from the environment (and `.env`).

use crate::render::RenderConfig;
use crate::types::GameConfig;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Read `key` and parse it, falling back to `default` when the variable is
/// missing, blank or malformed.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("Ignoring invalid {}={:?}", key, raw);
            default
        }),
        _ => default,
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    /// Root holding `posters/` and `fonts/`
    pub asset_dir: PathBuf,
    pub game: GameConfig,
    pub render: RenderConfig,
    /// How often the background watcher checks deadlines; `None` disables it
    pub deadline_tick: Option<Duration>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = GameConfig::default();
        let game = GameConfig {
            writing_seconds: env_parse("WRITING_TIME_SECONDS", defaults.writing_seconds),
            voting_seconds: env_parse("VOTING_TIME_SECONDS", defaults.voting_seconds),
            max_rounds: env_parse("MAX_ROUNDS", defaults.max_rounds).max(1),
            min_players: env_parse("MIN_PLAYERS", defaults.min_players).max(1),
        };

        let bind_addr = env_parse("BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 5000)));
        let asset_dir = std::env::var("ASSET_DIR")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("static"));

        let tick_ms: u64 = env_parse("DEADLINE_TICK_MS", 0);
        let deadline_tick = (tick_ms > 0).then(|| Duration::from_millis(tick_ms));

        tracing::info!(
            %bind_addr,
            asset_dir = %asset_dir.display(),
            writing_seconds = game.writing_seconds,
            voting_seconds = game.voting_seconds,
            max_rounds = game.max_rounds,
            min_players = game.min_players,
            "Config loaded"
        );

        Self {
            bind_addr,
            asset_dir,
            game,
            render: RenderConfig::from_env(),
            deadline_tick,
        }
    }
}
