use std::default::Default;
use std::env;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use codeswap_game::model::RoomCode;
use codeswap_game::route::Route;

pub fn load() -> Result<Settings, ConfigError> {
    let env = env::var(RUN_MODE_ENV).unwrap_or_else(|_| "development".into());
    Config::builder()
        .add_source(File::with_name(DEFAULT_CFG_PATH).required(false))
        .add_source(File::with_name(&format!("config/{}", env)).required(false))
        .add_source(File::with_name(LOCAL_CFG_PATH).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

const DEFAULT_CFG_PATH: &str = "config/default";
const LOCAL_CFG_PATH: &str = "config/local";
const RUN_MODE_ENV: &str = "CODESWAP_CLIENT_RUN_MODE";
const ENV_PREFIX: &str = "codeswap_client";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub logging: Logging,
    pub runtime: Runtime,
    pub remote: Remote,
    pub session: Session,
    pub polling: Polling,
    pub game: codeswap_game::Settings,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Logging {
    pub level: String,
}

impl Default for Logging {
    fn default() -> Self {
        Logging {
            level: "info".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Runtime {
    /// Run on a thread pool instead of the current thread. The client itself
    /// never needs more than one thread.
    pub threaded: bool,
    pub worker_threads: usize,
    pub thread_name: String,
}

impl Default for Runtime {
    fn default() -> Self {
        Runtime {
            threaded: false,
            worker_threads: num_cpus::get_physical(),
            thread_name: "codeswap-worker".into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Remote {
    pub base_url: String,
    /// The cookie the CSRF token is read from.
    pub csrf_cookie: String,
    /// Cookies to start the jar with, in `Set-Cookie` form, e.g. a session
    /// cookie obtained by logging in through the browser.
    pub cookies: Vec<String>,
}

impl Default for Remote {
    fn default() -> Self {
        Remote {
            base_url: "http://127.0.0.1:8000".into(),
            csrf_cookie: "csrftoken".into(),
            cookies: vec![],
        }
    }
}

/// Which view the client opens first.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entry {
    Lobby,
    Game,
}

impl Entry {
    pub fn route(self, room: RoomCode) -> Route {
        match self {
            Entry::Lobby => Route::Lobby(room),
            Entry::Game => Route::Game(room),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Session {
    pub room: String,
    pub entry: Entry,
}

impl Default for Session {
    fn default() -> Self {
        Session {
            room: String::new(),
            entry: Entry::Lobby,
        }
    }
}

impl Session {
    pub fn room_code(&self) -> Option<RoomCode> {
        let room = self.room.trim();
        if room.is_empty() {
            None
        } else {
            Some(RoomCode(room.to_uppercase()))
        }
    }
}

#[derive(Debug, Copy, Clone, Deserialize)]
#[serde(default)]
pub struct Polling {
    /// Status poll period at the game table.
    pub game_ms: u64,
    /// Status poll period in the lobby.
    pub lobby_ms: u64,
    /// Length of one countdown tick.
    pub tick_ms: u64,
    /// How long to wait for best-effort requests before exiting.
    pub settle_ms: u64,
}

impl Default for Polling {
    fn default() -> Self {
        Polling {
            game_ms: 6500,
            lobby_ms: 3000,
            tick_ms: 1000,
            settle_ms: 2000,
        }
    }
}

impl Polling {
    pub fn game(&self) -> Duration {
        Duration::from_millis(self.game_ms)
    }

    pub fn lobby(&self) -> Duration {
        Duration::from_millis(self.lobby_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
