#![warn(rust_2018_idioms)]

//! Client-side reconciliation for the CODE card game.
//!
//! Nothing in here performs I/O. Each phase of the client (the lobby, the
//! game table) is a [`Reconciler`](event::Reconciler): the host feeds it
//! events and executes the commands it answers with.

pub mod clock;
pub mod error;
pub mod event;
pub mod lobby;
pub mod model;
pub mod poller;
pub mod protocol;
pub mod route;
pub mod selection;
pub mod session;

pub use event::{Command, Event, Reconciler};
pub use lobby::LobbySession;
pub use session::{Session, Settings};
