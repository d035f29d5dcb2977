//! What the host feeds into a session, and what a session asks of the host.
//!
//! Sessions never touch the network, the clock or the screen themselves. The
//! host turns every callback (poll schedule, timer, click, finished request)
//! into an `Event`, hands it to the session, and carries out the `Command`s
//! that come back, in order.
use std::time::Duration;

use crate::clock::{Countdown, TimerId};
use crate::error::RemoteError;
use crate::model::Username;
use crate::poller::Ticket;
use crate::protocol::{Mutation, StatusResponse};
use crate::route::Route;
use crate::selection::{ViewItem, ZoneKind};

/// Every possible kind of thing that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// The regular poll schedule fired.
    PollDue,
    /// A status fetch finished.
    Polled {
        ticket: Ticket,
        result: Result<StatusResponse, RemoteError>,
    },
    /// The player did something.
    Input(Input),
    /// A mutating request finished.
    Completed {
        mutation: Mutation,
        result: Result<(), RemoteError>,
    },
    /// A timer requested by the session went off.
    Timer(Timer),
}

/// Every possible kind of command a session may give the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Fetch the room status; report back with `Event::Polled`.
    Fetch(Ticket),
    /// Send a mutating request; report back with `Event::Completed`.
    Send(Mutation),
    /// Start ticking once per time unit with `Timer::Tick(id)`, replacing any
    /// ticker already running.
    StartTicker(TimerId),
    /// Stop the ticker, if it is the one named.
    StopTicker(TimerId),
    /// Deliver `Event::Timer(timer)` once, after a delay.
    Schedule { after: Duration, timer: Timer },
    Render(Screen),
    /// Show a one-off announcement.
    Announce(Banner),
    /// Show an error to the player.
    Alert(String),
    /// Leave this session for another view.
    Navigate(Route),
}

/// What the player can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Pick(ZoneKind, usize),
    Swap,
    Start,
    Exit,
}

/// Timers a session may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    /// One time unit of the turn countdown passed.
    Tick(TimerId),
    /// The grace period for a room without a turn holder is over.
    Grace(u64),
    /// Time to leave a finished game.
    Leave { reset: bool },
}

// Auxillary macro for converting inner events into their outermost
// counterparts.

macro_rules! derive_from {
    ($to:ident, $ty:ident, $r:ident) => {
        impl From<$r> for $to {
            fn from(r: $r) -> Self {
                $to::$ty(r)
            }
        }
    };
}

derive_from!(Event, Input, Input);
derive_from!(Event, Timer, Timer);
derive_from!(Screen, Table, TableView);
derive_from!(Screen, Lobby, LobbyView);

/// Everything a surface needs to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Table(TableView),
    Lobby(LobbyView),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableView {
    pub hand: Vec<ViewItem>,
    pub table: Vec<ViewItem>,
    /// Whose turn it is; `None` when nobody holds it.
    pub turn: Option<Username>,
    pub countdown: Countdown,
    pub swap_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyView {
    pub players: Vec<LobbyEntry>,
    pub start_enabled: bool,
    pub host_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyEntry {
    pub username: Username,
    pub owner: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    YouWon,
    Winner(Username),
}

impl Banner {
    pub fn text(&self) -> String {
        match self {
            Banner::YouWon => "Congratulations! You won the game!".into(),
            Banner::Winner(name) => format!("{} has won the game!", name),
        }
    }
}

/// A phase of the client, driven by events.
pub trait Reconciler {
    fn handle(&mut self, event: Event) -> Vec<Command>;
}
