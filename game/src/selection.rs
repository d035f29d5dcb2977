//! The two card zones and what the player has picked in them.
use log::debug;

use crate::model::{Snapshot, Token};
use crate::protocol::{SwapIdentity, SwapRequest};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ZoneKind {
    Hand,
    Table,
}

/// A card the player has picked, pinned to its position in the zone.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Picked {
    pub token: Token,
    pub index: usize,
}

/// One card as it should be shown.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ViewItem {
    pub token: Token,
    pub selectable: bool,
    pub selected: bool,
}

#[derive(Debug, Default)]
struct Zone {
    cards: Vec<Token>,
    picked: Option<Picked>,
}

impl Zone {
    // Returns whether the zone had to be rebuilt.
    fn reconcile(&mut self, cards: &[Token]) -> bool {
        if self.cards.as_slice() == cards {
            return false;
        }
        self.cards = cards.to_vec();
        self.picked = None;
        true
    }

    fn pick(&mut self, index: usize) -> bool {
        match self.cards.get(index) {
            Some(token) => {
                self.picked = Some(Picked {
                    token: token.clone(),
                    index,
                });
                true
            }
            None => false,
        }
    }

    fn view(&self, selectable: bool) -> Vec<ViewItem> {
        self.cards
            .iter()
            .enumerate()
            .map(|(i, token)| ViewItem {
                token: token.clone(),
                selectable,
                selected: self.picked.as_ref().map_or(false, |p| p.index == i),
            })
            .collect()
    }
}

/// Selection state for the hand and table zones, together with the gates
/// deciding whether input is accepted at all.
#[derive(Debug, Default)]
pub struct Selection {
    hand: Zone,
    table: Zone,
    your_turn: bool,
    has_won: bool,
    // A swap request is on the wire.
    submitting: bool,
    // The countdown ran out on the current snapshot.
    expired: bool,
    // The session reached a terminal state.
    locked: bool,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Bring both zones and the turn gates in line with a fresh snapshot.
    ///
    /// A zone whose cards are unchanged keeps its pick: the indices still
    /// point at the same cards. A zone whose cards changed in any way drops
    /// it, since a stale index could name a different card.
    pub fn reconcile(&mut self, snapshot: &Snapshot) {
        if self.hand.reconcile(snapshot.hand()) {
            debug!("hand changed, selection cleared");
        }
        if self.table.reconcile(snapshot.table()) {
            debug!("table changed, selection cleared");
        }
        self.your_turn = snapshot.your_turn();
        self.has_won = snapshot.has_won();
        self.expired = false;
    }

    /// Whether clicks are accepted right now.
    pub fn accepts_input(&self) -> bool {
        self.your_turn && !self.has_won && !self.locked && !self.expired
    }

    /// Pick a card. Returns whether anything changed.
    pub fn click(&mut self, zone: ZoneKind, index: usize) -> bool {
        if !self.accepts_input() {
            return false;
        }
        match zone {
            ZoneKind::Hand => self.hand.pick(index),
            ZoneKind::Table => self.table.pick(index),
        }
    }

    pub fn picked(&self, zone: ZoneKind) -> Option<&Picked> {
        match zone {
            ZoneKind::Hand => self.hand.picked.as_ref(),
            ZoneKind::Table => self.table.picked.as_ref(),
        }
    }

    /// Whether the swap control is enabled.
    pub fn can_swap(&self) -> bool {
        self.hand.picked.is_some()
            && self.table.picked.is_some()
            && self.accepts_input()
            && !self.submitting
    }

    /// Disable the control and build the request for the current picks.
    ///
    /// Returns `None`, changing nothing, if the swap is not enabled.
    pub fn begin_swap(&mut self, identity: SwapIdentity) -> Option<SwapRequest> {
        if !self.can_swap() {
            return None;
        }
        let hand = self.hand.picked.as_ref()?;
        let table = self.table.picked.as_ref()?;
        let request = match identity {
            SwapIdentity::Index => SwapRequest::ByIndex {
                hand_index: hand.index,
                table_index: table.index,
            },
            SwapIdentity::Token => SwapRequest::ByToken {
                hand_card: hand.token.clone(),
                table_card: table.token.clone(),
            },
        };
        self.submitting = true;
        Some(request)
    }

    /// The server took the swap.
    pub fn swap_accepted(&mut self) {
        self.submitting = false;
        self.clear();
    }

    /// The server refused the swap; the picks stay so the player may retry.
    pub fn swap_rejected(&mut self) {
        self.submitting = false;
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// The countdown ran out. Input stays off until the next snapshot.
    pub fn expire(&mut self) {
        self.expired = true;
    }

    /// Stop accepting input for good and forget the picks.
    pub fn lock(&mut self) {
        self.locked = true;
        self.clear();
    }

    pub fn clear(&mut self) {
        self.hand.picked = None;
        self.table.picked = None;
    }

    pub fn view(&self, zone: ZoneKind) -> Vec<ViewItem> {
        let selectable = self.accepts_input();
        match zone {
            ZoneKind::Hand => self.hand.view(selectable),
            ZoneKind::Table => self.table.view(selectable),
        }
    }
}
