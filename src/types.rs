use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque ID types
pub type PlayerId = String;
pub type PosterId = String;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Lobby,
    Writing,
    Voting,
    RoundResults,
    GameOver,
}

impl GamePhase {
    /// Phases that run against a deadline
    pub fn is_timed(self) -> bool {
        matches!(self, GamePhase::Writing | GamePhase::Voting)
    }
}

impl std::fmt::Display for GamePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GamePhase::Lobby => "lobby",
            GamePhase::Writing => "writing",
            GamePhase::Voting => "voting",
            GamePhase::RoundResults => "round_results",
            GamePhase::GameOver => "game_over",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub writing_seconds: u32,
    pub voting_seconds: u32,
    pub max_rounds: u32,
    pub min_players: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            writing_seconds: 30,
            voting_seconds: 30,
            max_rounds: 5,
            min_players: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Player {
    pub id: PlayerId,
    /// `None` until the player picks a name; unnamed players sit out rounds
    pub display_name: Option<String>,
    pub score: u32,
    pub submitted_this_round: bool,
    pub voted_this_round: bool,
}

impl Player {
    pub fn new(id: PlayerId) -> Self {
        Self {
            id,
            display_name: None,
            score: 0,
            submitted_this_round: false,
            voted_this_round: false,
        }
    }

    pub fn is_named(&self) -> bool {
        self.display_name.is_some()
    }
}

/// A two-line caption. Blank lines are stored as `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Caption {
    pub line1: Option<String>,
    pub line2: Option<String>,
}

impl Caption {
    /// Build a caption from raw form input, trimming both lines
    pub fn from_input(line1: &str, line2: &str) -> Self {
        fn clean(s: &str) -> Option<String> {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Self {
            line1: clean(line1),
            line2: clean(line2),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.line1.is_none() && self.line2.is_none()
    }

    pub fn title(&self) -> &str {
        self.line1.as_deref().unwrap_or("")
    }

    pub fn body(&self) -> &str {
        self.line2.as_deref().unwrap_or("")
    }
}

/// Snapshot returned to status polls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusView {
    pub phase: GamePhase,
    pub round_no: u32,
    pub max_rounds: u32,
    pub deadline: Option<DateTime<Utc>>,
    pub server_now: DateTime<Utc>,
    pub seconds_remaining: Option<i64>,
}

/// Result of an accepted action
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionOutcome {
    pub phase: GamePhase,
    pub phase_changed: bool,
}

impl ActionOutcome {
    pub fn new(before: GamePhase, after: GamePhase) -> Self {
        Self {
            phase: after,
            phase_changed: before != after,
        }
    }
}

/// Details of a freshly started round
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundStart {
    pub round_no: u32,
    pub poster: PosterId,
    pub deadline: DateTime<Utc>,
    /// True when the pool ran dry and used posters were put back
    pub recycled_posters: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ballot {
    pub authors: Vec<BallotEntry>,
    /// Set when the voter had nobody to vote for and was skipped
    pub auto_skipped: bool,
    pub outcome: ActionOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BallotEntry {
    pub author_id: PlayerId,
    pub caption: Caption,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultEntry {
    pub author_id: PlayerId,
    pub author_name: String,
    pub caption: Caption,
    pub votes: u32,
    pub is_winner: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Standing {
    pub id: PlayerId,
    pub display_name: String,
    pub score: u32,
}

/// Players together with the phase they were listed in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Roster {
    pub phase: GamePhase,
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RoundResults {
    pub round_no: u32,
    pub poster: Option<PosterId>,
    pub winner: Option<PlayerId>,
    pub entries: Vec<ResultEntry>,
    pub standings: Vec<Standing>,
    pub is_game_over: bool,
}
