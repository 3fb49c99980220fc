//! JSON bodies exchanged over the HTTP API.

use crate::error::GameError;
use crate::types::*;
use serde::{Deserialize, Serialize};

/// Header carrying the caller's player id
pub const PLAYER_ID_HEADER: &str = "x-player-id";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinResponse {
    pub player_id: PlayerId,
    pub player: Player,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptionRequest {
    #[serde(default)]
    pub line1: String,
    #[serde(default)]
    pub line2: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteRequest {
    pub target: PlayerId,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsResponse {
    pub standings: Vec<Standing>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: String,
    pub msg: String,
}

impl From<&GameError> for ErrorBody {
    fn from(err: &GameError) -> Self {
        Self {
            code: err.code().to_string(),
            msg: err.to_string(),
        }
    }
}
