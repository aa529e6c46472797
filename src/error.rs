//! Crate-wide error type.
//!
//! Two very different kinds of failure flow through here:
//!   - `Invariant`: the board itself is corrupt (wrong card count, broken
//!     back-references, runaway recursion, ambiguous lookups). Analysis
//!     aborts instead of returning a partial move map.
//!   - everything else: bad input (deal lists, snapshots) or a stale move
//!     handed to the executor.
//!
//! A *missing* target card is not an error at all; the analyzer reports it
//! as "no move".

use core::fmt;

use crate::card::Card;
use crate::moves::{Move, MoveKind};
use crate::pile::PileId;

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The board violates a structural invariant.
    Invariant(Invariant),
    /// A move does not fit the current board (usually a stale move).
    IllegalMove { mv: Move, reason: IllegalMoveReason },
    /// A fixed deal or deal number does not describe a 52-card permutation.
    InvalidDeal(String),
    /// A board snapshot could not be parsed.
    Parse { line: usize, message: String },
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Invariant {
    /// Total cards across all piles is not 52.
    CardCount { found: usize },
    /// The same card appears more than once across the piles.
    DuplicateCard { card: Card },
    /// A card's pile back-reference disagrees with where it actually sits.
    MisplacedCard { card: Card, recorded: PileId, actual: PileId },
    /// A positional or visibility flag disagrees with the pile layout.
    FlagMismatch { card: Card, flag: &'static str },
    /// A center pile has a face-down card above a face-up one, or a
    /// face-down top card.
    BrokenColumn { pile: PileId },
    /// A foundation is not an Ace-up, same-suit run.
    BrokenFoundation { pile: PileId },
    /// A target lookup that must be unique matched several cards.
    AmbiguousTarget { card: Card, kind: MoveKind, matches: usize },
    /// More active analyzer frames than there are cards.
    RecursionLimit { limit: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IllegalMoveReason {
    NotInSourcePile,
    FacedownCard,
    BuriedCard,
    SamePile,
    TargetNotExposed,
    DestinationNotEmpty,
    WrongDestination,
    OutOfSequence,
}

impl From<Invariant> for Error {
    fn from(v: Invariant) -> Self {
        Error::Invariant(v)
    }
}

// ===== Display implementations =====

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Invariant(e) => write!(f, "board invariant violated: {}", e),
            Error::IllegalMove { mv, reason } => write!(f, "illegal move {}: {}", mv, reason),
            Error::InvalidDeal(msg) => write!(f, "invalid deal: {}", msg),
            Error::Parse { line, message } => write!(f, "line {}: {}", line, message),
        }
    }
}

impl fmt::Display for Invariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Invariant::CardCount { found } => write!(f, "expected 52 cards, found {}", found),
            Invariant::DuplicateCard { card } => write!(f, "card {} appears more than once", card),
            Invariant::MisplacedCard { card, recorded, actual } => write!(
                f,
                "card {} is recorded in pile {} but sits in pile {}",
                card, recorded, actual
            ),
            Invariant::FlagMismatch { card, flag } => {
                write!(f, "card {} has an inconsistent {} flag", card, flag)
            }
            Invariant::BrokenColumn { pile } => {
                write!(f, "pile {} is not a face-down prefix under a face-up run", pile)
            }
            Invariant::BrokenFoundation { pile } => {
                write!(f, "pile {} is not an Ace-up same-suit run", pile)
            }
            Invariant::AmbiguousTarget { card, kind, matches } => write!(
                f,
                "{:?} target lookup for {} matched {} cards",
                kind, card, matches
            ),
            Invariant::RecursionLimit { limit } => {
                write!(f, "analysis exceeded {} active frames", limit)
            }
        }
    }
}

impl fmt::Display for IllegalMoveReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IllegalMoveReason::NotInSourcePile => "card is not in the source pile",
            IllegalMoveReason::FacedownCard => "card is face down",
            IllegalMoveReason::BuriedCard => "card is not on top of its pile",
            IllegalMoveReason::SamePile => "source and destination are the same pile",
            IllegalMoveReason::TargetNotExposed => "target is not the top of the destination",
            IllegalMoveReason::DestinationNotEmpty => "destination pile is not empty",
            IllegalMoveReason::WrongDestination => "destination pile cannot take this kind of move",
            IllegalMoveReason::OutOfSequence => "card does not continue the destination run",
        };
        f.write_str(s)
    }
}

impl std::error::Error for Error {}
