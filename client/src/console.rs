//! A plain terminal surface: frames go to stdout, commands come from stdin.
use log::{debug, warn};
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use codeswap_game::event::{Banner, Input, LobbyView, Screen, TableView};
use codeswap_game::selection::{ViewItem, ZoneKind};

/// Where the client shows what is going on.
pub trait Surface {
    fn render(&mut self, screen: &Screen);
    fn announce(&mut self, banner: &Banner);
    fn alert(&mut self, message: &str);
}

#[derive(Debug, Default)]
pub struct Console {
    frames: usize,
}

impl Console {
    fn table(&self, view: &TableView) {
        match &view.turn {
            Some(name) => println!("Turn: {:<16} time: {}", name, view.countdown),
            None => println!("no current turn"),
        }
        println!("hand:  {}", zone(&view.hand));
        println!("table: {}", zone(&view.table));
        if view.swap_enabled {
            println!("(type `swap` to exchange the picked cards)");
        }
    }

    fn lobby(&self, view: &LobbyView) {
        println!("players:");
        for entry in &view.players {
            if entry.owner {
                println!("  {} (Owner)", entry.username);
            } else {
                println!("  {}", entry.username);
            }
        }
        if let Some(message) = &view.host_message {
            println!("{}", message);
        }
        if view.start_enabled {
            println!("(type `start` to begin)");
        }
    }
}

fn zone(items: &[ViewItem]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if item.selected {
                format!("{}:[{}]", i, item.token)
            } else if item.selectable {
                format!("{}:{}", i, item.token)
            } else {
                format!("{}:({})", i, item.token)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl Surface for Console {
    fn render(&mut self, screen: &Screen) {
        self.frames += 1;
        println!("---- {} ----", self.frames);
        match screen {
            Screen::Table(view) => self.table(view),
            Screen::Lobby(view) => self.lobby(view),
        }
    }

    fn announce(&mut self, banner: &Banner) {
        println!("*** {} ***", banner.text());
    }

    fn alert(&mut self, message: &str) {
        println!("!!! {}", message);
    }
}

/// Parse a line typed by the player.
///
/// `h <i>`/`hand <i>` and `t <i>`/`table <i>` pick a card, `s`/`swap`
/// submits, `start` starts the game, and `exit`/`q` leaves.
pub fn parse_input(line: &str) -> Option<Input> {
    let mut words = line.split_whitespace();
    let verb = words.next()?.to_lowercase();
    let index = words.next().and_then(|w| w.parse::<usize>().ok());
    if words.next().is_some() {
        return None;
    }
    match (verb.as_str(), index) {
        ("h", Some(i)) | ("hand", Some(i)) => Some(Input::Pick(ZoneKind::Hand, i)),
        ("t", Some(i)) | ("table", Some(i)) => Some(Input::Pick(ZoneKind::Table, i)),
        ("s", None) | ("swap", None) => Some(Input::Swap),
        ("start", None) => Some(Input::Start),
        ("exit", None) | ("q", None) => Some(Input::Exit),
        _ => None,
    }
}

/// Forward stdin lines as inputs until stdin closes or nobody listens.
pub fn spawn_stdin(input_tx: mpsc::UnboundedSender<Input>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(io::stdin()).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => match parse_input(&line) {
                    Some(input) => {
                        if input_tx.send(input).is_err() {
                            break;
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => println!("?? {}", line.trim()),
                },
                Ok(None) => {
                    debug!("stdin closed");
                    break;
                }
                Err(e) => {
                    warn!("while reading stdin: {}", e);
                    break;
                }
            }
        }
    })
}
