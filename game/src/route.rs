//! Where the client can be, and where it sends its requests.
use std::fmt;

use crate::model::RoomCode;
use crate::protocol::Mutation;

/// A view the client can navigate to.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub enum Route {
    /// The application root. Reaching it ends the client.
    Home,
    /// The waiting room of a room.
    Lobby(RoomCode),
    /// The table of a running game.
    Game(RoomCode),
    /// Anything this client doesn't render.
    Elsewhere(String),
}

impl Route {
    /// Interpret a redirect target sent by the server.
    ///
    /// Both bare paths and absolute URLs are accepted; only the path part is
    /// considered.
    pub fn parse(target: &str) -> Route {
        let path = match target.find("://") {
            Some(scheme_end) => {
                let rest = &target[scheme_end + 3..];
                match rest.find('/') {
                    Some(i) => &rest[i..],
                    None => "/",
                }
            }
            None => target,
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["join", code] => Route::Lobby(RoomCode((*code).into())),
            ["game", code] => Route::Game(RoomCode((*code).into())),
            _ => Route::Elsewhere(target.into()),
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Lobby(code) => format!("/join/{}/", code),
            Route::Game(code) => format!("/game/{}/", code),
            Route::Elsewhere(target) => target.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// The path of the room status resource.
pub fn status_path(code: &RoomCode) -> String {
    format!("/api/room/{}/status/", code)
}

/// The HTTP method and path a mutation is sent to.
pub fn mutation_endpoint(code: &RoomCode, mutation: &Mutation) -> (Method, String) {
    match mutation {
        Mutation::Swap(_) => (Method::Post, format!("/api/room/{}/swap/", code)),
        Mutation::TimeoutNotice => (Method::Post, format!("/api/room/{}/timeout/", code)),
        Mutation::StartGame => (Method::Post, format!("/api/room/{}/start/", code)),
        Mutation::ExitRoom => (Method::Post, format!("/api/room/{}/exit/", code)),
        Mutation::ResetRoom => (Method::Get, format!("/api/endgame/{}/", code)),
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
}
