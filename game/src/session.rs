//! The game-phase session: one per visit to a game table.
use std::default::Default;
use std::time::Duration;

use log::{debug, info, warn};
use serde::Deserialize;

use crate::clock::{Change, Countdown, Tick, TimerId, TurnClock};
use crate::error::RemoteError;
use crate::event::{Banner, Command, Event, Input, Reconciler, TableView, Timer};
use crate::model::{RoomCode, Snapshot, Username};
use crate::poller::{Polled, Poller, Ticket};
use crate::protocol::{Mutation, StatusResponse, SwapIdentity};
use crate::route::Route;
use crate::selection::{Selection, ZoneKind};
use Phase::*;

#[derive(Copy, Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Length of a turn, in ticks.
    pub turn_ticks: u32,
    /// How long a finished game stays on screen, and how long a room may go
    /// without a turn holder, in milliseconds.
    pub grace_ms: u64,
    pub swap_identity: SwapIdentity,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            turn_ticks: 6,
            grace_ms: 3000,
            swap_identity: SwapIdentity::Index,
        }
    }
}

impl Settings {
    pub fn grace(&self) -> Duration {
        Duration::from_millis(self.grace_ms)
    }
}

/// How a game session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost(Username),
    Redirected(Route),
    /// The room disappeared from under us.
    Gone,
    /// Nobody held the turn for the whole grace period.
    Abandoned,
}

// Where the session stands with respect to the game.
enum Phase {
    // Playing normally, or still waiting for the first snapshot.
    Playing,
    // The latest snapshot had nobody holding the turn. If grace `epoch` runs
    // out before that changes, the room is considered dead.
    Orphaned { epoch: u64 },
    // Terminal. Only the scheduled departure is still acted upon.
    Finished(Outcome),
}

pub struct Session {
    settings: Settings,
    room: RoomCode,
    poller: Poller,
    snapshot: Option<Snapshot>,
    selection: Selection,
    clock: TurnClock,
    phase: Phase,
    graces: u64,
}

impl Session {
    pub fn new(room: RoomCode, settings: Settings) -> Self {
        Session {
            settings,
            room,
            poller: Poller::new(),
            snapshot: None,
            selection: Selection::new(),
            clock: TurnClock::new(settings.turn_ticks),
            phase: Playing,
            graces: 0,
        }
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.phase {
            Finished(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn countdown(&self) -> Countdown {
        self.clock.countdown()
    }

    pub fn live_timer(&self) -> Option<TimerId> {
        self.clock.live_timer()
    }

    fn fetch(&mut self) -> Command {
        Command::Fetch(self.poller.issue())
    }

    fn render(&self) -> Command {
        let turn = self
            .snapshot
            .as_ref()
            .and_then(|s| s.turn_holder())
            .map(|p| p.username.clone());
        Command::Render(
            TableView {
                hand: self.selection.view(ZoneKind::Hand),
                table: self.selection.view(ZoneKind::Table),
                turn,
                countdown: self.clock.countdown(),
                swap_enabled: self.selection.can_swap(),
            }
            .into(),
        )
    }

    // Enter a terminal state: no more input, no more countdown.
    fn finish(&mut self, outcome: Outcome, out: &mut Vec<Command>) {
        info!("game in room {} is over for us: {:?}", self.room, outcome);
        self.selection.lock();
        if let Some(timer) = self.clock.disarm() {
            out.push(Command::StopTicker(timer));
        }
        self.phase = Finished(outcome);
    }

    fn polled(
        &mut self,
        ticket: Ticket,
        result: Result<StatusResponse, RemoteError>,
        out: &mut Vec<Command>,
    ) {
        match self.poller.accept::<Snapshot>(ticket, result) {
            Polled::Fresh(snapshot) => self.apply(snapshot, out),
            Polled::Redirect(route) => {
                self.finish(Outcome::Redirected(route.clone()), out);
                out.push(Command::Navigate(route));
            }
            Polled::Gone => {
                self.finish(Outcome::Gone, out);
                out.push(Command::Navigate(Route::Home));
            }
            Polled::Failed | Polled::Stale => {}
        }
    }

    fn apply(&mut self, snapshot: Snapshot, out: &mut Vec<Command>) {
        self.selection.reconcile(&snapshot);

        if snapshot.has_won() {
            self.snapshot = Some(snapshot);
            self.finish(Outcome::Won, out);
            out.push(Command::Announce(Banner::YouWon));
            out.push(self.render());
            out.push(Command::Schedule {
                after: self.settings.grace(),
                timer: Timer::Leave { reset: false },
            });
            return;
        }
        if let Some(winner) = snapshot.rival_winner().cloned() {
            self.snapshot = Some(snapshot);
            self.finish(Outcome::Lost(winner.clone()), out);
            out.push(Command::Announce(Banner::Winner(winner)));
            out.push(self.render());
            out.push(Command::Schedule {
                after: self.settings.grace(),
                timer: Timer::Leave { reset: true },
            });
            return;
        }

        let orphaned = matches!(self.phase, Orphaned { .. });
        match (snapshot.turn_holder().is_some(), orphaned) {
            (true, _) => self.phase = Playing,
            (false, true) => {}
            (false, false) => {
                self.graces += 1;
                warn!("nobody holds the turn in room {}", self.room);
                self.phase = Orphaned { epoch: self.graces };
                out.push(Command::Schedule {
                    after: self.settings.grace(),
                    timer: Timer::Grace(self.graces),
                });
            }
        }

        let change = self.clock.reconcile(snapshot.may_act());
        self.snapshot = Some(snapshot);
        out.push(self.render());
        match change {
            Change::Armed(timer) => out.push(Command::StartTicker(timer)),
            Change::Cancelled(timer) => out.push(Command::StopTicker(timer)),
            Change::Unchanged => {}
        }
    }

    fn pick(&mut self, zone: ZoneKind, index: usize, out: &mut Vec<Command>) {
        if self.selection.click(zone, index) {
            out.push(self.render());
        } else {
            debug!("ignoring pick of {:?} card {}", zone, index);
        }
    }

    fn submit(&mut self, out: &mut Vec<Command>) {
        match self.selection.begin_swap(self.settings.swap_identity) {
            Some(request) => {
                out.push(self.render());
                out.push(Command::Send(Mutation::Swap(request)));
            }
            None => debug!("swap is not enabled"),
        }
    }

    fn completed(
        &mut self,
        mutation: Mutation,
        result: Result<(), RemoteError>,
        out: &mut Vec<Command>,
    ) {
        match (mutation, result) {
            (Mutation::Swap(_), Ok(())) => {
                self.selection.swap_accepted();
                // The turn is spent; nothing left to time out until the next poll.
                if let Some(timer) = self.clock.disarm() {
                    out.push(Command::StopTicker(timer));
                }
                out.push(self.render());
                out.push(self.fetch());
            }
            (Mutation::Swap(_), Err(RemoteError::NotFound)) => {
                self.finish(Outcome::Gone, out);
                out.push(Command::Navigate(Route::Home));
            }
            (Mutation::Swap(_), Err(RemoteError::Rejected { message, .. })) => {
                self.selection.swap_rejected();
                out.push(Command::Alert(format!("Swap failed: {}", message)));
                out.push(self.render());
            }
            (Mutation::Swap(_), Err(e)) => {
                warn!("while sending swap: {}", e);
                self.selection.swap_rejected();
                out.push(Command::Alert("Error sending swap request.".into()));
                out.push(self.render());
            }
            (Mutation::TimeoutNotice, result) => {
                if let Err(e) = result {
                    warn!("failed to notify server about timeout: {}", e);
                }
                out.push(self.fetch());
            }
            (mutation, Err(e)) => warn!("{:?} failed: {}", mutation, e),
            (mutation, Ok(())) => debug!("{:?} done", mutation),
        }
    }

    fn tick(&mut self, timer: TimerId, out: &mut Vec<Command>) {
        match self.clock.tick(timer) {
            Tick::Ignored => debug!("tick from dead timer {:?}", timer),
            Tick::Running(_) => out.push(self.render()),
            Tick::Expired => {
                info!("turn timed out");
                self.selection.expire();
                out.push(Command::StopTicker(timer));
                out.push(self.render());
                out.push(Command::Send(Mutation::TimeoutNotice));
            }
        }
    }

    fn grace_over(&mut self, epoch: u64, out: &mut Vec<Command>) {
        match self.phase {
            Orphaned { epoch: current } if current == epoch => {
                self.finish(Outcome::Abandoned, out);
                out.push(Command::Send(Mutation::ResetRoom));
                out.push(Command::Navigate(Route::Lobby(self.room.clone())));
            }
            _ => debug!("grace {} no longer applies", epoch),
        }
    }

    // Once finished, only the departure matters; late polls must not bring a
    // finished game back to life.
    fn handle_finished(&mut self, event: Event, out: &mut Vec<Command>) {
        match event {
            Event::Timer(Timer::Leave { reset }) => {
                if reset {
                    out.push(Command::Send(Mutation::ResetRoom));
                }
                out.push(Command::Navigate(Route::Lobby(self.room.clone())));
            }
            Event::Completed {
                mutation,
                result: Err(e),
            } => warn!("{:?} failed: {}", mutation, e),
            event => debug!("game is over, ignoring {:?}", event),
        }
    }
}

impl Reconciler for Session {
    fn handle(&mut self, event: Event) -> Vec<Command> {
        let mut out = Vec::new();
        if let Finished(_) = self.phase {
            self.handle_finished(event, &mut out);
            return out;
        }
        match event {
            Event::PollDue => out.push(self.fetch()),
            Event::Polled { ticket, result } => self.polled(ticket, result, &mut out),
            Event::Input(Input::Pick(zone, index)) => self.pick(zone, index, &mut out),
            Event::Input(Input::Swap) => self.submit(&mut out),
            Event::Input(input) => debug!("{:?} means nothing at the table", input),
            Event::Completed { mutation, result } => self.completed(mutation, result, &mut out),
            Event::Timer(Timer::Tick(timer)) => self.tick(timer, &mut out),
            Event::Timer(Timer::Grace(epoch)) => self.grace_over(epoch, &mut out),
            Event::Timer(Timer::Leave { .. }) => debug!("not leaving a game that isn't over"),
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Screen;
    use crate::poller::fixtures::game;
    use crate::protocol::SwapRequest;

    fn session() -> Session {
        Session::new(RoomCode("Q1".into()), Settings::default())
    }

    fn poll(session: &mut Session, status: StatusResponse) -> Vec<Command> {
        poll_result(session, Ok(status))
    }

    fn poll_result(
        session: &mut Session,
        result: Result<StatusResponse, RemoteError>,
    ) -> Vec<Command> {
        let ticket = match session.handle(Event::PollDue).as_slice() {
            [Command::Fetch(ticket)] => *ticket,
            other => panic!("expected a fetch, got {:?}", other),
        };
        session.handle(Event::Polled { ticket, result })
    }

    fn last_view(commands: &[Command]) -> &TableView {
        commands
            .iter()
            .rev()
            .find_map(|c| match c {
                Command::Render(Screen::Table(view)) => Some(view),
                _ => None,
            })
            .expect("a table render")
    }

    fn started_ticker(commands: &[Command]) -> Option<TimerId> {
        commands.iter().find_map(|c| match c {
            Command::StartTicker(timer) => Some(*timer),
            _ => None,
        })
    }

    fn pick_both(session: &mut Session) {
        session.handle(Input::Pick(ZoneKind::Hand, 1).into());
        session.handle(Input::Pick(ZoneKind::Table, 2).into());
    }

    #[test]
    fn my_turn_renders_then_arms() {
        let mut s = session();
        let out = poll(&mut s, game(Some("alice")));
        assert!(matches!(out[0], Command::Render(_)));
        assert!(matches!(out[1], Command::StartTicker(_)));
        assert_eq!(last_view(&out).countdown, Countdown::Remaining(6));
        assert_eq!(last_view(&out).turn, Some(Username("alice".into())));
    }

    #[test]
    fn off_turn_clicks_change_nothing() {
        let mut s = session();
        poll(&mut s, game(Some("bob")));
        assert!(s.handle(Input::Pick(ZoneKind::Hand, 0).into()).is_empty());
        assert!(s.handle(Input::Pick(ZoneKind::Table, 0).into()).is_empty());
        assert_eq!(s.selection().picked(ZoneKind::Hand), None);
        assert!(s.handle(Input::Swap.into()).is_empty());
    }

    #[test]
    fn swap_control_follows_picks_and_turn() {
        let mut s = session();
        poll(&mut s, game(Some("alice")));
        let out = s.handle(Input::Pick(ZoneKind::Hand, 1).into());
        assert!(!last_view(&out).swap_enabled);
        let out = s.handle(Input::Pick(ZoneKind::Table, 2).into());
        assert!(last_view(&out).swap_enabled);
        let out = poll(&mut s, game(Some("bob")));
        assert!(!last_view(&out).swap_enabled);
    }

    #[test]
    fn turn_passing_stops_the_ticker() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        let out = poll(&mut s, game(Some("bob")));
        assert!(out.contains(&Command::StopTicker(timer)));
        assert_eq!(s.live_timer(), None);
        assert_eq!(last_view(&out).countdown, Countdown::Idle);
    }

    #[test]
    fn repeated_turn_polls_do_not_restart_the_countdown() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        s.handle(Timer::Tick(timer).into());
        let out = poll(&mut s, game(Some("alice")));
        assert_eq!(started_ticker(&out), None);
        assert_eq!(s.countdown(), Countdown::Remaining(5));
        assert_eq!(s.live_timer(), Some(timer));
    }

    // Scenario A.
    #[test]
    fn expiry_disables_notifies_and_repolls() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        pick_both(&mut s);
        for _ in 0..5 {
            s.handle(Timer::Tick(timer).into());
        }
        let out = s.handle(Timer::Tick(timer).into());
        assert!(!last_view(&out).swap_enabled);
        assert_eq!(last_view(&out).countdown, Countdown::Expired);
        assert!(out.contains(&Command::StopTicker(timer)));
        assert_eq!(out.last(), Some(&Command::Send(Mutation::TimeoutNotice)));

        let out = s.handle(Event::Completed {
            mutation: Mutation::TimeoutNotice,
            result: Ok(()),
        });
        assert!(matches!(out.as_slice(), [Command::Fetch(_)]));
    }

    #[test]
    fn failed_timeout_notice_still_repolls() {
        let mut s = session();
        poll(&mut s, game(Some("alice")));
        let out = s.handle(Event::Completed {
            mutation: Mutation::TimeoutNotice,
            result: Err(RemoteError::Transient {
                reason: "connection reset".into(),
            }),
        });
        assert!(matches!(out.as_slice(), [Command::Fetch(_)]));
    }

    #[test]
    fn stale_ticks_do_not_count() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        poll(&mut s, game(Some("bob")));
        let again = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        assert_ne!(timer, again);
        assert!(s.handle(Timer::Tick(timer).into()).is_empty());
        assert_eq!(s.countdown(), Countdown::Remaining(6));
    }

    #[test]
    fn swap_sends_once_and_repolls_on_success() {
        let mut s = session();
        poll(&mut s, game(Some("alice")));
        pick_both(&mut s);
        let out = s.handle(Input::Swap.into());
        assert!(!last_view(&out).swap_enabled);
        assert_eq!(
            out.last(),
            Some(&Command::Send(Mutation::Swap(SwapRequest::ByIndex {
                hand_index: 1,
                table_index: 2
            })))
        );
        // Double click while in flight.
        assert!(s.handle(Input::Swap.into()).is_empty());

        let out = s.handle(Event::Completed {
            mutation: Mutation::Swap(SwapRequest::ByIndex {
                hand_index: 1,
                table_index: 2,
            }),
            result: Ok(()),
        });
        assert!(!last_view(&out).swap_enabled);
        assert!(matches!(out.last(), Some(Command::Fetch(_))));
        assert_eq!(s.selection().picked(ZoneKind::Hand), None);
        assert_eq!(s.selection().picked(ZoneKind::Table), None);
    }

    // Scenario B.
    #[test]
    fn rejected_swap_alerts_and_keeps_picks() {
        let mut s = session();
        poll(&mut s, game(Some("alice")));
        pick_both(&mut s);
        let request = match s.handle(Input::Swap.into()).pop() {
            Some(Command::Send(mutation)) => mutation,
            other => panic!("unexpected {:?}", other),
        };
        let out = s.handle(Event::Completed {
            mutation: request,
            result: Err(RemoteError::Rejected {
                status: 400,
                message: "card not on table".into(),
            }),
        });
        assert_eq!(out[0], Command::Alert("Swap failed: card not on table".into()));
        assert!(last_view(&out).swap_enabled);
        assert_eq!(s.selection().picked(ZoneKind::Hand).unwrap().index, 1);
        assert_eq!(s.selection().picked(ZoneKind::Table).unwrap().index, 2);
    }

    fn send_swap(session: &mut Session) -> Mutation {
        match session.handle(Input::Swap.into()).pop() {
            Some(Command::Send(mutation)) => mutation,
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unreachable_server_alerts_and_keeps_picks() {
        let mut s = session();
        poll(&mut s, game(Some("alice")));
        pick_both(&mut s);
        let request = send_swap(&mut s);
        let out = s.handle(Event::Completed {
            mutation: request,
            result: Err(RemoteError::Transient {
                reason: "connection reset".into(),
            }),
        });
        assert_eq!(out[0], Command::Alert("Error sending swap request.".into()));
        assert!(last_view(&out).swap_enabled);
        assert!(!s.selection().is_submitting());
        assert_eq!(s.selection().picked(ZoneKind::Hand).unwrap().index, 1);
        assert_eq!(s.selection().picked(ZoneKind::Table).unwrap().index, 2);
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn swap_into_vanished_room_goes_home() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        pick_both(&mut s);
        let request = send_swap(&mut s);
        let out = s.handle(Event::Completed {
            mutation: request,
            result: Err(RemoteError::NotFound),
        });
        assert_eq!(
            out,
            vec![Command::StopTicker(timer), Command::Navigate(Route::Home)]
        );
        assert_eq!(s.outcome(), Some(&Outcome::Gone));
        assert_eq!(s.selection().picked(ZoneKind::Hand), None);
        assert!(s.handle(Event::PollDue).is_empty());
    }

    #[test]
    fn accepted_swap_cannot_time_out() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        for _ in 0..5 {
            s.handle(Timer::Tick(timer).into());
        }
        assert_eq!(s.countdown(), Countdown::Remaining(1));
        pick_both(&mut s);
        let request = send_swap(&mut s);
        let out = s.handle(Event::Completed {
            mutation: request,
            result: Ok(()),
        });
        assert!(out.contains(&Command::StopTicker(timer)));
        assert!(matches!(out.last(), Some(Command::Fetch(_))));
        assert_eq!(s.live_timer(), None);

        // The last tick was already on its way when the swap landed.
        let out = s.handle(Timer::Tick(timer).into());
        assert!(out.is_empty());
        assert_eq!(s.countdown(), Countdown::Idle);
    }

    // Scenario C.
    #[test]
    fn local_win_is_announced_once() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        let mut won = game(Some("alice"));
        won.players[0].has_won = true;

        let out = poll(&mut s, won.clone());
        let banners = out.iter().filter(|c| matches!(c, Command::Announce(_))).count();
        assert_eq!(banners, 1);
        assert!(out.contains(&Command::Announce(Banner::YouWon)));
        assert!(out.contains(&Command::StopTicker(timer)));
        assert!(!last_view(&out).swap_enabled);
        let leaves = out
            .iter()
            .filter(|c| matches!(c, Command::Schedule { timer: Timer::Leave { .. }, .. }))
            .count();
        assert_eq!(leaves, 1);
        assert_eq!(s.outcome(), Some(&Outcome::Won));

        // Later polls change nothing and schedule nothing.
        assert!(s.handle(Event::PollDue).is_empty());
        assert!(poll_terminal(&mut s, won).is_empty());
        assert!(s.handle(Input::Pick(ZoneKind::Hand, 0).into()).is_empty());

        let out = s.handle(Timer::Leave { reset: false }.into());
        assert_eq!(out, vec![Command::Navigate(Route::Lobby(RoomCode("Q1".into())))]);
    }

    // After a terminal transition PollDue no longer yields a ticket, so feed a
    // response for a made-up newer ticket straight in.
    fn poll_terminal(s: &mut Session, status: StatusResponse) -> Vec<Command> {
        let mut poller = Poller::new();
        for _ in 0..10 {
            poller.issue();
        }
        s.handle(Event::Polled {
            ticket: poller.issue(),
            result: Ok(status),
        })
    }

    #[test]
    fn rival_win_announces_and_resets_on_departure() {
        let mut s = session();
        poll(&mut s, game(Some("bob")));
        let mut lost = game(None);
        lost.players[1].has_won = true;
        lost.winner_username = Some("bob".into());
        let out = poll(&mut s, lost);
        assert!(out.contains(&Command::Announce(Banner::Winner(Username("bob".into())))));
        // No grace timer for the missing turn holder once the game is over.
        assert!(!out
            .iter()
            .any(|c| matches!(c, Command::Schedule { timer: Timer::Grace(_), .. })));
        let out = s.handle(Timer::Leave { reset: true }.into());
        assert_eq!(
            out,
            vec![
                Command::Send(Mutation::ResetRoom),
                Command::Navigate(Route::Lobby(RoomCode("Q1".into())))
            ]
        );
    }

    // A winner still flagged with the turn must not get a countdown.
    #[test]
    fn local_win_with_turn_flag_never_arms() {
        let mut s = session();
        let mut won = game(Some("alice"));
        won.players[0].has_won = true;
        let out = poll(&mut s, won);
        assert_eq!(started_ticker(&out), None);
        assert_eq!(s.live_timer(), None);
    }

    // Scenario D.
    #[test]
    fn not_found_goes_home_and_stops() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        let out = poll_result(&mut s, Err(RemoteError::NotFound));
        assert_eq!(
            out,
            vec![Command::StopTicker(timer), Command::Navigate(Route::Home)]
        );
        assert!(s.handle(Event::PollDue).is_empty());
    }

    #[test]
    fn transient_failures_keep_state() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        pick_both(&mut s);
        let out = poll_result(
            &mut s,
            Err(RemoteError::Transient {
                reason: "502 Bad Gateway".into(),
            }),
        );
        assert!(out.is_empty());
        assert_eq!(s.live_timer(), Some(timer));
        assert!(s.selection().can_swap());
    }

    #[test]
    fn redirect_cancels_and_navigates() {
        let mut s = session();
        let timer = started_ticker(&poll(&mut s, game(Some("alice")))).unwrap();
        let mut status = game(Some("alice"));
        status.redirect = true;
        status.redirect_url = Some("/join/Q1/".into());
        let out = poll(&mut s, status);
        assert_eq!(
            out,
            vec![
                Command::StopTicker(timer),
                Command::Navigate(Route::Lobby(RoomCode("Q1".into())))
            ]
        );
    }

    #[test]
    fn no_turn_holder_never_arms_and_shows_nobody() {
        let mut s = session();
        let mut status = game(None);
        // The server still claims it is our turn.
        status.your_turn = true;
        let out = poll(&mut s, status);
        assert_eq!(started_ticker(&out), None);
        let view = last_view(&out);
        assert_eq!(view.turn, None);
        assert!(!matches!(view.countdown, Countdown::Remaining(_)));
        assert!(out
            .iter()
            .any(|c| matches!(c, Command::Schedule { timer: Timer::Grace(_), .. })));
    }

    #[test]
    fn abandoned_room_is_reset_and_left() {
        let mut s = session();
        let out = poll(&mut s, game(None));
        let epoch = out
            .iter()
            .find_map(|c| match c {
                Command::Schedule {
                    timer: Timer::Grace(epoch),
                    ..
                } => Some(*epoch),
                _ => None,
            })
            .unwrap();
        // A second orphaned poll doesn't start another grace period.
        let out = poll(&mut s, game(None));
        assert!(!out.iter().any(|c| matches!(c, Command::Schedule { .. })));

        let out = s.handle(Timer::Grace(epoch).into());
        assert_eq!(
            out,
            vec![
                Command::Send(Mutation::ResetRoom),
                Command::Navigate(Route::Lobby(RoomCode("Q1".into())))
            ]
        );
        assert_eq!(s.outcome(), Some(&Outcome::Abandoned));
    }

    #[test]
    fn turn_holder_returning_cancels_grace() {
        let mut s = session();
        let out = poll(&mut s, game(None));
        let epoch = out
            .iter()
            .find_map(|c| match c {
                Command::Schedule {
                    timer: Timer::Grace(epoch),
                    ..
                } => Some(*epoch),
                _ => None,
            })
            .unwrap();
        poll(&mut s, game(Some("bob")));
        assert!(s.handle(Timer::Grace(epoch).into()).is_empty());
        assert_eq!(s.outcome(), None);
    }

    #[test]
    fn token_identity_is_honoured() {
        let settings = Settings {
            swap_identity: SwapIdentity::Token,
            ..Settings::default()
        };
        let mut s = Session::new(RoomCode("Q1".into()), settings);
        poll(&mut s, game(Some("alice")));
        pick_both(&mut s);
        let out = s.handle(Input::Swap.into());
        assert_eq!(
            out.last(),
            Some(&Command::Send(Mutation::Swap(SwapRequest::ByToken {
                hand_card: "O".into(),
                table_card: "D".into()
            })))
        );
    }
}
