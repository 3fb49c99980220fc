use crate::types::GamePhase;

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;

/// Rejections produced by the round lifecycle. None of these change state
/// except `NoPosters` raised while starting a follow-up round.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Player is not part of this game")]
    UnknownPlayer,

    #[error("Set a name before taking part")]
    Unnamed,

    #[error("Action needs phase {expected}, game is in {actual}")]
    WrongPhase {
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("Time is up for this phase")]
    DeadlinePassed,

    #[error("Caption already submitted this round")]
    AlreadySubmitted,

    #[error("Vote already cast this round")]
    AlreadyVoted,

    #[error("That caption cannot be voted for")]
    InvalidTarget,

    #[error("Enter at least one line for your caption")]
    EmptySubmission,

    #[error("Name cannot be empty")]
    EmptyName,

    #[error("Need at least {needed} named players, have {have}")]
    NotEnoughPlayers { needed: usize, have: usize },

    #[error("A game is currently in progress")]
    GameInProgress,

    #[error("No posters available")]
    NoPosters,

    #[error("Caption not found")]
    CaptionNotFound,

    #[error("No poster set for this round")]
    NoPosterSelected,
}

impl GameError {
    /// Stable machine-readable code for clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::UnknownPlayer => "UNKNOWN_PLAYER",
            GameError::Unnamed => "UNNAMED",
            GameError::WrongPhase { .. } => "WRONG_PHASE",
            GameError::DeadlinePassed => "DEADLINE_PASSED",
            GameError::AlreadySubmitted => "ALREADY_SUBMITTED",
            GameError::AlreadyVoted => "ALREADY_VOTED",
            GameError::InvalidTarget => "INVALID_TARGET",
            GameError::EmptySubmission => "EMPTY_SUBMISSION",
            GameError::EmptyName => "EMPTY_NAME",
            GameError::NotEnoughPlayers { .. } => "NOT_ENOUGH_PLAYERS",
            GameError::GameInProgress => "GAME_IN_PROGRESS",
            GameError::NoPosters => "NO_POSTERS",
            GameError::CaptionNotFound => "CAPTION_NOT_FOUND",
            GameError::NoPosterSelected => "NO_POSTER_SELECTED",
        }
    }
}

/// Errors raised by an asset store
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("Asset not found: {0}")]
    NotFound(String),

    #[error("Invalid asset id: {0}")]
    InvalidId(String),

    #[error("Asset I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Hard failures of the caption compositor. Everything else degrades.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Source image not found: {0}")]
    SourceImageNotFound(String),

    #[error("Could not decode source image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("No usable font")]
    NoUsableFont,

    #[error("Could not encode rendered image: {0}")]
    Encode(String),
}
