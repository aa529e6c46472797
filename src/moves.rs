//! Move representation and move execution.
//
//! A `Move` is a value describing an intended relocation: the acting card,
//! the card it lands on (if any), and the source and destination piles. It
//! is produced by the analyzer and applied to a board with `Move::apply`,
//! which re-checks that the move still fits the board before touching it.

use core::fmt;

use log::debug;
use serde::Serialize;

use crate::board::Board;
use crate::card::{card_is_center_target, Card};
use crate::error::{Error, IllegalMoveReason, Result};
use crate::pile::{PileId, PileKind};

/// Which kind of destination a move heads for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum MoveKind {
    /// Onto the card's foundation.
    Win,
    /// Onto a tableau pile.
    Center,
}

/// A single proposed relocation.
///
/// - `target`: the card the acting card lands on. `None` for a King moving
///   to an empty pile and for an Ace moving to its empty foundation.
/// - `from` / `to`: source and destination piles at the time the move was
///   produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Move {
    pub kind: MoveKind,
    pub card: Card,
    pub target: Option<Card>,
    pub from: PileId,
    pub to: PileId,
}

impl Move {
    pub fn new(kind: MoveKind, card: Card, target: Option<Card>, from: PileId, to: PileId) -> Self {
        Move {
            kind,
            card,
            target,
            from,
            to,
        }
    }

    /// Apply this move to the given board, mutating it in place.
    ///
    /// From a center pile the acting card moves together with every card
    /// above it, keeping their order; from any other pile only the acting
    /// card moves. Moved cards arrive face up. If the source is a center
    /// pile whose new top card is face down, that card is turned face up.
    ///
    /// The move is checked against the board first; an `IllegalMove` error
    /// leaves the board exactly as it was.
    pub fn apply(&self, board: &mut Board) -> Result<()> {
        let idx = self.check(board)?;

        let moved = match self.from.kind() {
            PileKind::Center | PileKind::Win => board.split_off(self.from, idx),
            PileKind::Cycle => vec![board.remove_at(self.from, idx)],
        };
        for &card in &moved {
            board.place(self.to, card, false);
        }

        if self.from.kind() == PileKind::Center {
            if let Some(top) = board.pile(self.from).top() {
                if board.state(top).facedown {
                    board.set_facedown(top, false);
                    debug!("{} exposed and flipped in pile {}", top, self.from);
                }
            }
        }
        board.refresh(self.from);
        board.refresh(self.to);

        debug!("applied {} ({} card(s))", self, moved.len());
        Ok(())
    }

    /// Validate the move against `board` and return the acting card's
    /// position in its source pile.
    fn check(&self, board: &Board) -> Result<usize> {
        use IllegalMoveReason::*;

        let illegal = |reason| Error::IllegalMove { mv: *self, reason };

        if self.from == self.to {
            return Err(illegal(SamePile));
        }
        if board.pile_of(self.card) != self.from {
            return Err(illegal(NotInSourcePile));
        }
        let src = board.pile(self.from);
        let idx = src.position(self.card).ok_or_else(|| illegal(NotInSourcePile))?;
        let is_top = idx + 1 == src.len();

        match self.from.kind() {
            PileKind::Center if board.state(self.card).facedown => return Err(illegal(FacedownCard)),
            PileKind::Win if !is_top => return Err(illegal(BuriedCard)),
            _ => {}
        }

        let dst = board.pile(self.to);
        if let Some(target) = self.target {
            if dst.top() != Some(target) {
                return Err(illegal(TargetNotExposed));
            }
        }

        match self.kind {
            MoveKind::Win => {
                if self.to != PileId::win(self.card.suit()) {
                    return Err(illegal(WrongDestination));
                }
                if self.from.kind() == PileKind::Center && !is_top {
                    return Err(illegal(BuriedCard));
                }
                if dst.len() != self.card.rank() as usize {
                    return Err(illegal(OutOfSequence));
                }
            }
            MoveKind::Center => {
                if self.to.kind() != PileKind::Center {
                    return Err(illegal(WrongDestination));
                }
                match self.target {
                    None if !dst.is_empty() => return Err(illegal(DestinationNotEmpty)),
                    None if !self.card.is_king() => return Err(illegal(OutOfSequence)),
                    Some(target) if !card_is_center_target(self.card, target) => {
                        return Err(illegal(OutOfSequence));
                    }
                    _ => {}
                }
            }
        }
        Ok(idx)
    }

    /// Long human-readable form, e.g.
    /// `"Ace of Spades: Pile 1 -> Win (Spades)"`.
    pub fn describe(&self) -> String {
        match self.target {
            Some(target) => format!(
                "{}: {} -> {} onto {}",
                self.card.label(),
                self.from.qualified_name(),
                self.to.qualified_name(),
                target.label()
            ),
            None => format!(
                "{}: {} -> {}",
                self.card.label(),
                self.from.qualified_name(),
                self.to.qualified_name()
            ),
        }
    }
}

impl fmt::Display for Move {
    /// Compact form: `"S9 (1) => H10 (2)"`, or `"S13 (4) => Blank (3)"`
    /// when there is no target card.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) => ", self.card, self.from)?;
        match self.target {
            Some(target) => write!(f, "{} ({})", target, self.to),
            None => write!(f, "Blank ({})", self.to),
        }
    }
}

// ----- Tests -----
