use std::fmt;

use serde::{Deserialize, Serialize};

/// The short code identifying a room on the server.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RoomCode(pub String);

impl fmt::Display for RoomCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Username(pub String);

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The face of a card, exactly as the server prints it.
///
/// Tokens are not unique: a hand may well hold two `O`s. Anything that needs
/// to point at one particular card uses its index within the zone instead.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Token(pub String);

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(s: &str) -> Self {
        Token(s.into())
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Player {
    pub username: Username,
    pub hand: Vec<Token>,
    pub is_turn: bool,
    pub has_won: bool,
}

/// The normalized state of a running game, as of one poll.
///
/// Snapshots are never patched: each successful poll builds a new one and the
/// previous is dropped. Construction guarantees that the local player is
/// present in `players`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub(crate) players: Vec<Player>,
    pub(crate) table: Vec<Token>,
    pub(crate) me: usize,
    pub(crate) turn_holder: Option<usize>,
    pub(crate) your_turn: bool,
    pub(crate) winner: Option<Username>,
}

impl Snapshot {
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn me(&self) -> &Player {
        &self.players[self.me]
    }

    pub fn hand(&self) -> &[Token] {
        &self.me().hand
    }

    pub fn table(&self) -> &[Token] {
        &self.table
    }

    /// The player currently holding the turn, if there is one.
    pub fn turn_holder(&self) -> Option<&Player> {
        self.turn_holder.map(|i| &self.players[i])
    }

    /// Whether the server allows the local player to act.
    pub fn your_turn(&self) -> bool {
        self.your_turn
    }

    /// Whether the local player has won, by either their own flag or the
    /// room-wide winner field.
    pub fn has_won(&self) -> bool {
        self.me().has_won || self.winner.as_ref() == Some(&self.me().username)
    }

    /// Another player's win, if the room reports one.
    pub fn rival_winner(&self) -> Option<&Username> {
        self.winner
            .as_ref()
            .filter(|w| *w != &self.me().username)
    }

    /// Whether the local player may act right now.
    pub fn may_act(&self) -> bool {
        self.your_turn && !self.has_won() && self.turn_holder.is_some()
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
    Reset,
    #[serde(other)]
    Unknown,
}

impl Default for RoomStatus {
    fn default() -> Self {
        RoomStatus::Waiting
    }
}

/// The normalized state of a room before its game starts.
///
/// Ownership is positional: whoever is listed first owns the room.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Lobby {
    pub status: RoomStatus,
    pub players: Vec<Username>,
    pub current_user: Username,
}

impl Lobby {
    pub fn owner(&self) -> Option<&Username> {
        self.players.first()
    }

    pub fn is_owner(&self) -> bool {
        self.owner() == Some(&self.current_user)
    }
}
