use futures::future;
use log::{debug, error, info, warn};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant, Interval, MissedTickBehavior};

use codeswap_game::clock::TimerId;
use codeswap_game::event::{Command, Event, Input, Reconciler, Timer};
use codeswap_game::model::RoomCode;
use codeswap_game::route::Route;
use codeswap_game::{LobbySession, Session};

use crate::console::Surface;
use crate::remote::{Remote, SetupError};
use crate::settings::{self, Settings};

/// Execute the entire life-cycle of the client: move between the lobby and
/// the game table of one room until the room sends us elsewhere or a
/// shutdown is signalled.
pub async fn run<S: Surface>(
    settings: &Settings,
    room: RoomCode,
    surface: &mut S,
    input_rx: mpsc::UnboundedReceiver<Input>,
    shutdown_rx: watch::Receiver<bool>,
) -> Result<Stats, SetupError> {
    let remote = Remote::new(&settings.remote)?;
    let mut driver = Driver {
        remote,
        surface,
        input_rx,
        shutdown_rx,
        polling: settings.polling,
        stats: Stats::default(),
        errands: vec![],
    };

    let mut route = settings.session.entry.route(room);
    loop {
        driver.stats.trail.push(route.clone());
        if *driver.shutdown_rx.borrow() {
            info!("shutdown requested");
            break;
        }
        let next = match &route {
            Route::Lobby(code) => {
                info!("joining lobby of room {}", code);
                let every = driver.polling.lobby();
                driver.drive(code, LobbySession::new(code.clone()), every).await
            }
            Route::Game(code) => {
                info!("sitting down at the table of room {}", code);
                let every = driver.polling.game();
                driver.drive(code, Session::new(code.clone(), settings.game), every).await
            }
            Route::Home | Route::Elsewhere(_) => {
                info!("leaving for {}", route);
                break;
            }
        };
        match next {
            Some(next) => route = next,
            None => {
                info!("shutdown requested");
                break;
            }
        }
    }

    driver.settle().await;
    Ok(driver.stats)
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Status requests issued.
    pub polls: usize,
    /// Mutating requests issued.
    pub requests: usize,
    /// Every view visited, in order.
    pub trail: Vec<Route>,
}

struct Driver<'a, S> {
    remote: Remote,
    surface: &'a mut S,
    input_rx: mpsc::UnboundedReceiver<Input>,
    shutdown_rx: watch::Receiver<bool>,
    polling: settings::Polling,
    stats: Stats,
    // Requests whose outcome nobody waits for, but which should still reach
    // the server before we exit.
    errands: Vec<JoinHandle<()>>,
}

impl<S: Surface> Driver<'_, S> {
    /// Feed one phase with events until it navigates away. Returns `None`
    /// on shutdown.
    async fn drive<R: Reconciler>(
        &mut self,
        room: &RoomCode,
        mut phase: R,
        every: Duration,
    ) -> Option<Route> {
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut polls = time::interval(every);
        polls.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut ticker: Option<(TimerId, Interval)> = None;

        loop {
            let event = tokio::select! {
                _ = self.shutdown_rx.changed() => return None,
                _ = polls.tick() => Event::PollDue,
                Some(event) = event_rx.recv() => event,
                Some(input) = self.input_rx.recv() => Event::Input(input),
                timer = next_tick(&mut ticker) => Event::Timer(Timer::Tick(timer)),
            };
            for command in phase.handle(event) {
                if let Some(route) = self.execute(room, command, &event_tx, &mut ticker) {
                    return Some(route);
                }
            }
        }
    }

    fn execute(
        &mut self,
        room: &RoomCode,
        command: Command,
        event_tx: &mpsc::UnboundedSender<Event>,
        ticker: &mut Option<(TimerId, Interval)>,
    ) -> Option<Route> {
        match command {
            Command::Fetch(ticket) => {
                self.stats.polls += 1;
                let remote = self.remote.clone();
                let room = room.clone();
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    let result = remote.status(&room).await;
                    event_tx
                        .send(Event::Polled { ticket, result })
                        .map_err(|_| debug!("{:?} answered after we left", ticket))
                        .ok();
                });
            }
            Command::Send(mutation) => {
                self.stats.requests += 1;
                let best_effort = mutation.is_best_effort();
                let remote = self.remote.clone();
                let room = room.clone();
                let event_tx = event_tx.clone();
                let handle = tokio::spawn(async move {
                    let result = remote.send(&room, &mutation).await;
                    if let Err(e) = &result {
                        debug!("{:?} failed: {}", mutation, e);
                    }
                    event_tx.send(Event::Completed { mutation, result }).ok();
                });
                if best_effort {
                    self.errands.retain(|h| !h.is_finished());
                    self.errands.push(handle);
                }
            }
            Command::StartTicker(timer) => {
                let period = self.polling.tick();
                let mut interval = time::interval_at(Instant::now() + period, period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
                *ticker = Some((timer, interval));
            }
            Command::StopTicker(timer) => {
                if ticker.as_ref().map_or(false, |(live, _)| *live == timer) {
                    *ticker = None;
                }
            }
            Command::Schedule { after, timer } => {
                let event_tx = event_tx.clone();
                tokio::spawn(async move {
                    time::sleep(after).await;
                    event_tx.send(timer.into()).ok();
                });
            }
            Command::Render(screen) => self.surface.render(&screen),
            Command::Announce(banner) => self.surface.announce(&banner),
            Command::Alert(message) => self.surface.alert(&message),
            Command::Navigate(route) => return Some(route),
        }
        None
    }

    /// Give outstanding best-effort requests a moment to reach the server.
    async fn settle(&mut self) {
        let errands: Vec<_> = self.errands.drain(..).collect();
        if errands.is_empty() {
            return;
        }
        info!("waiting for {} outstanding request(s)", errands.len());
        match time::timeout(self.polling.settle(), future::join_all(errands)).await {
            Ok(results) => {
                for result in results {
                    if let Err(e) = result {
                        error!("request task: {}", e);
                    }
                }
            }
            Err(_) => warn!("gave up on outstanding requests"),
        }
    }
}

async fn next_tick(ticker: &mut Option<(TimerId, Interval)>) -> TimerId {
    match ticker {
        Some((timer, interval)) => {
            interval.tick().await;
            *timer
        }
        None => future::pending().await,
    }
}
