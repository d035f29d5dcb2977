//! Turning status responses into snapshots.
//!
//! Fetches are numbered as they are issued. Responses can arrive in any order
//! (a slow request may be overtaken by a later one), so a response is only
//! applied if it is newer than everything applied before it.
use log::{debug, warn};

use crate::error::{RemoteError, SnapshotError};
use crate::model::{Lobby, Player, RoomStatus, Snapshot, Username};
use crate::protocol::StatusResponse;
use crate::route::Route;

/// Identifies one status fetch.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ticket(u64);

/// The verdict on one status response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Polled<T> {
    /// A usable, newer state.
    Fresh(T),
    /// The server wants the client somewhere else.
    Redirect(Route),
    /// The room is gone.
    Gone,
    /// The poll failed in a way the next one may not; keep what we have.
    Failed,
    /// Overtaken by a response that was already applied.
    Stale,
}

/// Something that can be built out of a status response.
pub trait Normalize: Sized {
    fn normalize(status: StatusResponse) -> Result<Self, SnapshotError>;
}

#[derive(Debug, Default)]
pub struct Poller {
    issued: u64,
    applied: Option<Ticket>,
}

impl Poller {
    pub fn new() -> Self {
        Poller::default()
    }

    /// Number a new fetch.
    pub fn issue(&mut self) -> Ticket {
        self.issued += 1;
        Ticket(self.issued)
    }

    /// Classify the response to the fetch numbered `ticket`.
    pub fn accept<T: Normalize>(
        &mut self,
        ticket: Ticket,
        result: Result<StatusResponse, RemoteError>,
    ) -> Polled<T> {
        // A vanished room stays vanished, however old the answer.
        if let Err(RemoteError::NotFound) = result {
            return Polled::Gone;
        }
        if self.applied.map_or(false, |last| ticket <= last) {
            debug!("dropping status response {:?}, already applied {:?}", ticket, self.applied);
            return Polled::Stale;
        }
        let status = match result {
            Ok(status) => status,
            Err(e) => {
                warn!("status poll failed, keeping current state: {}", e);
                return Polled::Failed;
            }
        };
        if status.redirect {
            self.applied = Some(ticket);
            let route = status
                .redirect_url
                .as_deref()
                .map(Route::parse)
                .unwrap_or(Route::Home);
            return Polled::Redirect(route);
        }
        match T::normalize(status) {
            Ok(t) => {
                self.applied = Some(ticket);
                Polled::Fresh(t)
            }
            Err(e) => {
                warn!("malformed status, keeping current state: {}", e);
                Polled::Failed
            }
        }
    }
}

fn current_user(status: &StatusResponse) -> Result<Username, SnapshotError> {
    status
        .current_user
        .clone()
        .map(Username)
        .ok_or(SnapshotError::MissingCurrentUser)
}

impl Normalize for Snapshot {
    fn normalize(status: StatusResponse) -> Result<Self, SnapshotError> {
        let current_user = current_user(&status)?;
        let players: Vec<Player> = status
            .players
            .into_iter()
            .map(|p| Player {
                username: Username(p.username),
                hand: p.hand,
                is_turn: p.is_turn,
                has_won: p.has_won,
            })
            .collect();
        let me = players
            .iter()
            .position(|p| p.username == current_user)
            .ok_or_else(|| SnapshotError::UnknownCurrentUser {
                username: current_user.0.clone(),
            })?;
        let turn_holder = players.iter().position(|p| p.is_turn);
        Ok(Snapshot {
            players,
            table: status.table_cards,
            me,
            turn_holder,
            your_turn: status.your_turn,
            winner: status.winner_username.map(Username),
        })
    }
}

impl Normalize for Lobby {
    fn normalize(status: StatusResponse) -> Result<Self, SnapshotError> {
        let current_user = current_user(&status)?;
        Ok(Lobby {
            status: status.room_status.unwrap_or(RoomStatus::Waiting),
            players: status
                .players
                .into_iter()
                .map(|p| Username(p.username))
                .collect(),
            current_user,
        })
    }
}
