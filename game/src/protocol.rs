//! The JSON bodies exchanged with the room service.
//!
//! These mirror the wire format loosely: every field the server may omit has a
//! default, so that a partial body still decodes and the poller can decide for
//! itself whether the result is usable.
use serde::{Deserialize, Serialize};

use crate::model::{RoomStatus, Token};

/// The body of `GET /api/room/{code}/status/`.
///
/// The same resource serves both the lobby and the game view; each reads the
/// fields it needs.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct StatusResponse {
    #[serde(default)]
    pub room_status: Option<RoomStatus>,
    #[serde(default)]
    pub players: Vec<PlayerStatus>,
    #[serde(default)]
    pub table_cards: Vec<Token>,
    #[serde(default)]
    pub your_turn: bool,
    #[serde(default)]
    pub current_user: Option<String>,
    #[serde(default)]
    pub winner_username: Option<String>,
    #[serde(default)]
    pub redirect: bool,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct PlayerStatus {
    pub username: String,
    #[serde(default)]
    pub hand: Vec<Token>,
    #[serde(default)]
    pub is_turn: bool,
    #[serde(default)]
    pub has_won: bool,
}

/// How a swap request names the two cards involved.
///
/// Which one a deployment expects is fixed by its server; the client is told
/// explicitly and never guesses.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapIdentity {
    /// `{"hand_index": 1, "table_index": 0}`
    Index,
    /// `{"hand_card": "O", "table_card": "D"}`
    Token,
}

impl Default for SwapIdentity {
    fn default() -> Self {
        SwapIdentity::Index
    }
}

/// The body of `POST /api/room/{code}/swap/`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum SwapRequest {
    ByIndex {
        hand_index: usize,
        table_index: usize,
    },
    ByToken {
        hand_card: Token,
        table_card: Token,
    },
}

/// The body the server sends along with a rejected request.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

/// Every state-changing request the client may send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Swap(SwapRequest),
    TimeoutNotice,
    StartGame,
    ExitRoom,
    ResetRoom,
}

impl Mutation {
    /// Whether a failure of this request is only worth a log line.
    pub fn is_best_effort(&self) -> bool {
        matches!(
            self,
            Mutation::TimeoutNotice | Mutation::ExitRoom | Mutation::ResetRoom
        )
    }
}
