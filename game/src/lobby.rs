//! The waiting room, before a game starts.
use log::{debug, info, warn};

use crate::error::RemoteError;
use crate::event::{Command, Event, Input, LobbyEntry, LobbyView, Reconciler};
use crate::model::{Lobby, RoomCode, RoomStatus};
use crate::poller::{Polled, Poller};
use crate::protocol::Mutation;
use crate::route::Route;

/// Players needed before the owner may start.
pub const MIN_PLAYERS: usize = 3;

const NEED_PLAYERS: &str =
    "You need at least three players to start playing. Waiting for other players to join...";

pub struct LobbySession {
    room: RoomCode,
    poller: Poller,
    lobby: Option<Lobby>,
    starting: bool,
    // Set once we navigate away; nothing is processed afterwards.
    left: bool,
}

impl LobbySession {
    pub fn new(room: RoomCode) -> Self {
        LobbySession {
            room,
            poller: Poller::new(),
            lobby: None,
            starting: false,
            left: false,
        }
    }

    pub fn lobby(&self) -> Option<&Lobby> {
        self.lobby.as_ref()
    }

    pub fn start_enabled(&self) -> bool {
        !self.starting
            && self
                .lobby
                .as_ref()
                .map_or(false, |l| l.is_owner() && l.players.len() >= MIN_PLAYERS)
    }

    fn view(&self) -> Command {
        let (players, host_message) = match &self.lobby {
            Some(lobby) => {
                let players = lobby
                    .players
                    .iter()
                    .enumerate()
                    .map(|(i, username)| LobbyEntry {
                        username: username.clone(),
                        owner: i == 0,
                    })
                    .collect();
                let host_message = if lobby.is_owner() && lobby.players.len() < MIN_PLAYERS {
                    Some(NEED_PLAYERS.to_string())
                } else {
                    None
                };
                (players, host_message)
            }
            None => (vec![], None),
        };
        Command::Render(
            LobbyView {
                players,
                start_enabled: self.start_enabled(),
                host_message,
            }
            .into(),
        )
    }

    fn leave(&mut self, route: Route, out: &mut Vec<Command>) {
        info!("leaving lobby of room {} for {}", self.room, route);
        self.left = true;
        out.push(Command::Navigate(route));
    }
}

impl Reconciler for LobbySession {
    fn handle(&mut self, event: Event) -> Vec<Command> {
        let mut out = Vec::new();
        if self.left {
            debug!("lobby already left, ignoring {:?}", event);
            return out;
        }
        match event {
            Event::PollDue => out.push(Command::Fetch(self.poller.issue())),
            Event::Polled { ticket, result } => match self.poller.accept::<Lobby>(ticket, result) {
                Polled::Fresh(lobby) => {
                    let playing = lobby.status == RoomStatus::Playing;
                    self.lobby = Some(lobby);
                    out.push(self.view());
                    if playing {
                        self.leave(Route::Game(self.room.clone()), &mut out);
                    }
                }
                Polled::Redirect(route) => self.leave(route, &mut out),
                Polled::Gone => self.leave(Route::Home, &mut out),
                Polled::Failed | Polled::Stale => {}
            },
            Event::Input(Input::Start) => {
                if self.start_enabled() {
                    self.starting = true;
                    out.push(self.view());
                    out.push(Command::Send(Mutation::StartGame));
                } else {
                    debug!("start is not enabled");
                }
            }
            Event::Input(Input::Exit) => {
                out.push(Command::Send(Mutation::ExitRoom));
                self.leave(Route::Home, &mut out);
            }
            Event::Input(input) => debug!("{:?} means nothing in the lobby", input),
            Event::Completed {
                mutation: Mutation::StartGame,
                result,
            } => {
                self.starting = false;
                match result {
                    Ok(()) => self.leave(Route::Game(self.room.clone()), &mut out),
                    Err(RemoteError::NotFound) => self.leave(Route::Home, &mut out),
                    Err(e) => {
                        warn!("while starting game: {}", e);
                        out.push(Command::Alert("Failed to start game.".into()));
                        out.push(self.view());
                    }
                }
            }
            Event::Completed {
                mutation,
                result: Err(e),
            } => warn!("{:?} failed: {}", mutation, e),
            Event::Completed { .. } | Event::Timer(_) => {}
        }
        out
    }
}
