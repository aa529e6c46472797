//! Pile identities and the ordered card container.
//!
//! The board has exactly thirteen piles, so a pile is addressed by a small
//! `PileId` key rather than a pointer. Cards refer to their pile by key and
//! piles hold card identities, which keeps the card/pile relation acyclic.

use core::fmt;

use serde::{Serialize, Serializer};

use crate::card::{Card, Suit};

/// Number of center (tableau) piles.
pub const NUM_CENTER: usize = 7;
/// Total number of piles on the board.
pub const NUM_PILES: usize = 2 + NUM_CENTER + 4;

/// What role a pile plays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PileKind {
    /// Draw / discard stock.
    Cycle,
    /// Tableau column.
    Center,
    /// Foundation.
    Win,
}

/// Arena key for a pile, in print order: draw, discard, 1..7, winS, winH,
/// winC, winD.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PileId(u8);

const FIRST_CENTER: u8 = 2;
const FIRST_WIN: u8 = FIRST_CENTER + NUM_CENTER as u8;

impl PileId {
    pub const DRAW: PileId = PileId(0);
    pub const DISCARD: PileId = PileId(1);

    /// Every pile in print order (cycle, then center 1..7, then win S/H/C/D).
    pub const ALL: [PileId; NUM_PILES] = [
        PileId(0),
        PileId(1),
        PileId(2),
        PileId(3),
        PileId(4),
        PileId(5),
        PileId(6),
        PileId(7),
        PileId(8),
        PileId(9),
        PileId(10),
        PileId(11),
        PileId(12),
    ];

    /// Center pile `n`, with `n` in 1..=7.
    ///
    /// # Panics
    ///
    /// Panics if `n` is out of range.
    pub fn center(n: usize) -> PileId {
        assert!((1..=NUM_CENTER).contains(&n), "invalid center pile {n}");
        PileId(FIRST_CENTER + n as u8 - 1)
    }

    /// Foundation for `suit`.
    pub fn win(suit: Suit) -> PileId {
        PileId(FIRST_WIN + suit.index() as u8)
    }

    /// Arena slot of this pile.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    pub fn kind(self) -> PileKind {
        if self.0 < FIRST_CENTER {
            PileKind::Cycle
        } else if self.0 < FIRST_WIN {
            PileKind::Center
        } else {
            PileKind::Win
        }
    }

    /// 1-based column number for center piles.
    pub fn center_number(self) -> Option<usize> {
        match self.kind() {
            PileKind::Center => Some((self.0 - FIRST_CENTER) as usize + 1),
            _ => None,
        }
    }

    /// Suit of a foundation pile.
    pub fn win_suit(self) -> Option<Suit> {
        match self.kind() {
            PileKind::Win => Suit::try_from_index(self.0 - FIRST_WIN),
            _ => None,
        }
    }

    /// Machine key: `draw`, `discard`, `1`..`7`, `winS`..`winD`.
    pub fn name(self) -> String {
        match self.kind() {
            PileKind::Cycle if self == PileId::DRAW => "draw".to_string(),
            PileKind::Cycle => "discard".to_string(),
            PileKind::Center => format!("{}", self.center_number().unwrap_or(0)),
            PileKind::Win => format!("win{}", self.win_suit().map_or('?', Suit::initial)),
        }
    }

    /// Human name: `Draw`, `Pile 3`, `Win (Spades)`.
    pub fn qualified_name(self) -> String {
        match self.kind() {
            PileKind::Cycle if self == PileId::DRAW => "Draw".to_string(),
            PileKind::Cycle => "Discard".to_string(),
            PileKind::Center => format!("Pile {}", self.center_number().unwrap_or(0)),
            PileKind::Win => format!("Win ({})", self.win_suit().map_or("?", Suit::name)),
        }
    }

    /// Case-insensitive lookup of a machine key.
    pub fn from_name(name: &str) -> Option<PileId> {
        let lower = name.trim().to_ascii_lowercase();
        match lower.as_str() {
            "draw" => return Some(PileId::DRAW),
            "discard" => return Some(PileId::DISCARD),
            _ => {}
        }
        if let Some(rest) = lower.strip_prefix("win") {
            let mut chars = rest.chars();
            let suit = Suit::from_initial(chars.next()?)?;
            return chars.next().is_none().then(|| PileId::win(suit));
        }
        let n: usize = lower.parse().ok()?;
        (1..=NUM_CENTER).contains(&n).then(|| PileId::center(n))
    }
}

impl fmt::Display for PileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl Serialize for PileId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// An ordered stack of cards. Index 0 is the bottom; the last card is the
/// accessible top.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Pile {
    id: PileId,
    pub(crate) cards: Vec<Card>,
}

impl Pile {
    pub fn new(id: PileId) -> Self {
        Pile { id, cards: Vec::new() }
    }

    #[inline]
    pub fn id(&self) -> PileId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> PileKind {
        self.id.kind()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn top(&self) -> Option<Card> {
        self.cards.last().copied()
    }

    pub fn bottom(&self) -> Option<Card> {
        self.cards.first().copied()
    }

    pub fn at(&self, idx: usize) -> Option<Card> {
        self.cards.get(idx).copied()
    }

    /// Position of `card` counted from the bottom.
    pub fn position(&self, card: Card) -> Option<usize> {
        self.cards.iter().position(|&c| c == card)
    }

    /// Bottom-to-top iteration.
    pub fn iter(&self) -> impl Iterator<Item = Card> + '_ {
        self.cards.iter().copied()
    }

    pub fn as_slice(&self) -> &[Card] {
        &self.cards
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Rank;

    #[test]
    fn pile_ids_cover_print_order() {
        let names: Vec<String> = PileId::ALL.iter().map(|p| p.name()).collect();
        assert_eq!(
            names,
            [
                "draw", "discard", "1", "2", "3", "4", "5", "6", "7", "winS", "winH", "winC",
                "winD"
            ]
        );
        for (i, id) in PileId::ALL.iter().enumerate() {
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn kinds_and_qualified_names() {
        assert_eq!(PileId::DRAW.kind(), PileKind::Cycle);
        assert_eq!(PileId::DISCARD.qualified_name(), "Discard");
        assert_eq!(PileId::center(3).kind(), PileKind::Center);
        assert_eq!(PileId::center(3).qualified_name(), "Pile 3");
        assert_eq!(PileId::center(7).center_number(), Some(7));
        assert_eq!(PileId::win(Suit::Clubs).kind(), PileKind::Win);
        assert_eq!(PileId::win(Suit::Clubs).qualified_name(), "Win (Clubs)");
        assert_eq!(PileId::win(Suit::Hearts).win_suit(), Some(Suit::Hearts));
    }

    #[test]
    fn from_name_is_case_insensitive() {
        assert_eq!(PileId::from_name("Draw"), Some(PileId::DRAW));
        assert_eq!(PileId::from_name("DISCARD"), Some(PileId::DISCARD));
        assert_eq!(PileId::from_name("WinD"), Some(PileId::win(Suit::Diamonds)));
        assert_eq!(PileId::from_name("4"), Some(PileId::center(4)));
        assert_eq!(PileId::from_name("8"), None);
        assert_eq!(PileId::from_name("winX"), None);
        assert_eq!(PileId::from_name("winSS"), None);
    }

    #[test]
    fn pile_top_bottom_and_position() {
        let mut pile = Pile::new(PileId::center(1));
        assert!(pile.is_empty());
        assert_eq!(pile.top(), None);

        let a = Card::new(Suit::Spades, Rank::Nine);
        let b = Card::new(Suit::Hearts, Rank::Eight);
        pile.cards.push(a);
        pile.cards.push(b);

        assert_eq!(pile.bottom(), Some(a));
        assert_eq!(pile.top(), Some(b));
        assert_eq!(pile.position(b), Some(1));
        assert_eq!(pile.at(2), None);
        assert_eq!(pile.len(), 2);
    }
}
