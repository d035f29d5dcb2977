//! The per-turn countdown.
use std::fmt;

use log::debug;

/// Names one arming of the clock. Ticks carry the id of the timer that
/// produced them, so a tick from a cancelled timer can be recognized.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum State {
    Disarmed,
    Armed { remaining: u32, timer: TimerId },
}

/// What the countdown shows.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Countdown {
    Idle,
    Remaining(u32),
    Expired,
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Idle => f.write_str("-"),
            Countdown::Remaining(n) => write!(f, "{}", n),
            Countdown::Expired => f.write_str("Time UP!"),
        }
    }
}

/// The effect of one tick.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Tick {
    /// The tick came from a timer that is no longer live.
    Ignored,
    Running(u32),
    /// The turn ran out; the clock is now disarmed.
    Expired,
}

/// What reconciling the clock with a snapshot did to the live timer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Change {
    Armed(TimerId),
    Cancelled(TimerId),
    Unchanged,
}

#[derive(Debug)]
pub struct TurnClock {
    ticks: u32,
    state: State,
    next_id: u64,
    expired: bool,
}

impl TurnClock {
    /// A disarmed clock counting down from `ticks` once armed.
    pub fn new(ticks: u32) -> Self {
        TurnClock {
            ticks,
            state: State::Disarmed,
            next_id: 0,
            expired: false,
        }
    }

    /// Start a fresh countdown, replacing any live one.
    pub fn arm(&mut self) -> TimerId {
        self.next_id += 1;
        let timer = TimerId(self.next_id);
        self.state = State::Armed {
            remaining: self.ticks,
            timer,
        };
        self.expired = false;
        debug!("turn clock armed with {} ticks ({:?})", self.ticks, timer);
        timer
    }

    /// Stop the countdown, returning the handle that has to be cancelled.
    pub fn disarm(&mut self) -> Option<TimerId> {
        let live = self.live_timer();
        self.state = State::Disarmed;
        self.expired = false;
        if let Some(timer) = live {
            debug!("turn clock disarmed ({:?})", timer);
        }
        live
    }

    /// Arm when the player may act and the clock isn't running yet; disarm
    /// when they may not.
    pub fn reconcile(&mut self, may_act: bool) -> Change {
        match (may_act, self.state) {
            (true, State::Disarmed) => Change::Armed(self.arm()),
            (true, State::Armed { .. }) => Change::Unchanged,
            (false, _) => match self.disarm() {
                Some(timer) => Change::Cancelled(timer),
                None => Change::Unchanged,
            },
        }
    }

    pub fn tick(&mut self, timer: TimerId) -> Tick {
        match self.state {
            State::Armed {
                remaining,
                timer: live,
            } if live == timer => {
                let remaining = remaining.saturating_sub(1);
                if remaining == 0 {
                    self.state = State::Disarmed;
                    self.expired = true;
                    Tick::Expired
                } else {
                    self.state = State::Armed { remaining, timer };
                    Tick::Running(remaining)
                }
            }
            _ => Tick::Ignored,
        }
    }

    pub fn live_timer(&self) -> Option<TimerId> {
        match self.state {
            State::Armed { timer, .. } => Some(timer),
            State::Disarmed => None,
        }
    }

    pub fn countdown(&self) -> Countdown {
        match self.state {
            State::Armed { remaining, .. } => Countdown::Remaining(remaining),
            State::Disarmed if self.expired => Countdown::Expired,
            State::Disarmed => Countdown::Idle,
        }
    }
}
