//! Card, Suit, and Rank types for a standard 52-card deck.
//!
//! - `Card` is a compact 1-byte identity (0..=51). It carries no positional
//!   or visibility state; that lives in the board's card arena.
//! - `Suit` and `Rank` are the static catalogs, including the display
//!   metadata (icons, keys, face illustrations) used by front ends.

use core::fmt;
use core::str::FromStr;

use serde::{Serialize, Serializer};

/// Number of suits in a standard deck.
pub const NUM_SUITS: u8 = 4;
/// Number of ranks in a standard deck.
pub const NUM_RANKS: u8 = 13;
/// Number of cards in a standard deck.
pub const CARDS_PER_DECK: u8 = NUM_SUITS * NUM_RANKS;

/// A playing card identified compactly by an index in 0..=51.
///
/// The mapping is:
/// ```text
/// index = suit.index() * 13 + (rank.value() - 1)
/// ```
/// Two cards compare equal iff they have the same suit and rank; whether a
/// card is face down is board state, not identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
pub struct Card(pub u8);

/// The two suit colours.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Color {
    Black,
    Red,
}

/// The four suits, in the index order used for foundations and the
/// visited matrix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Suit {
    Spades = 0,
    Hearts = 1,
    Clubs = 2,
    Diamonds = 3,
}

/// The thirteen ranks. Ace is low.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord)]
#[repr(u8)]
pub enum Rank {
    Ace = 0,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King, // 12
}

impl Card {
    /// Create a new card from a suit and rank.
    #[inline]
    pub fn new(suit: Suit, rank: Rank) -> Self {
        Card(suit as u8 * NUM_RANKS + rank as u8)
    }

    /// Create a card from a raw index in 0..=51.
    ///
    /// # Panics
    ///
    /// Panics in debug builds if `index >= 52`.
    #[inline]
    pub fn from_index(index: u8) -> Self {
        debug_assert!(index < CARDS_PER_DECK);
        Card(index)
    }

    /// Build a card from a `(suit index 0..=3, rank value 1..=13)` pair,
    /// the format used by fixed deal inputs.
    pub fn from_pair(suit_index: u8, rank_value: u8) -> Option<Self> {
        let suit = Suit::try_from_index(suit_index)?;
        let rank = Rank::try_from_value(rank_value)?;
        Some(Card::new(suit, rank))
    }

    /// Return the raw 0..=51 index of this card.
    #[inline]
    pub fn index(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn suit(self) -> Suit {
        Suit::from_u8(self.0 / NUM_RANKS)
    }

    #[inline]
    pub fn rank(self) -> Rank {
        Rank::from_u8(self.0 % NUM_RANKS)
    }

    /// Rank value in 1..=13 (Ace=1, King=13).
    #[inline]
    pub fn value(self) -> u8 {
        self.rank().value()
    }

    #[inline]
    pub fn color(self) -> Color {
        self.suit().color()
    }

    #[inline]
    pub fn is_ace(self) -> bool {
        self.rank() == Rank::Ace
    }

    #[inline]
    pub fn is_king(self) -> bool {
        self.rank() == Rank::King
    }

    /// Identity string like `"S1"`, `"H13"`, `"D10"`.
    pub fn id(self) -> String {
        format!("{}{}", self.suit().initial(), self.value())
    }

    /// Identity string with visibility applied: face-down cards are
    /// wrapped in brackets, e.g. `"[H13]"`.
    pub fn display_id(self, facedown: bool) -> String {
        if facedown {
            format!("[{}]", self.id())
        } else {
            self.id()
        }
    }

    /// Long form such as `"Queen of Hearts"`.
    pub fn label(self) -> String {
        format!("{} of {}", self.rank().name(), self.suit().name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.suit().initial(), self.value())
    }
}

impl Serialize for Card {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Error returned when a card id such as `"S14"` or `"X3"` cannot be parsed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseCardError(pub String);

impl fmt::Display for ParseCardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid card id {:?}", self.0)
    }
}

impl std::error::Error for ParseCardError {}

impl FromStr for Card {
    type Err = ParseCardError;

    /// Accepts `"S1"`, `"h13"` and the face-down form `"[D7]"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseCardError(s.to_string());
        let t = s.trim();
        let t = t
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
            .unwrap_or(t);

        let mut chars = t.chars();
        let initial = chars.next().ok_or_else(err)?;
        let suit = Suit::from_initial(initial).ok_or_else(err)?;
        let value: u8 = chars.as_str().parse().map_err(|_| err())?;
        let rank = Rank::try_from_value(value).ok_or_else(err)?;
        Ok(Card::new(suit, rank))
    }
}

impl Suit {
    /// All suits in index order.
    pub const ALL: [Suit; NUM_SUITS as usize] = [
        Suit::Spades,
        Suit::Hearts,
        Suit::Clubs,
        Suit::Diamonds,
    ];

    /// Construct a suit from a small integer 0..=3.
    ///
    /// # Panics
    ///
    /// Panics if `v >= 4`.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match Suit::try_from_index(v) {
            Some(s) => s,
            None => panic!("invalid suit: {v}"),
        }
    }

    pub fn try_from_index(v: u8) -> Option<Self> {
        Suit::ALL.get(v as usize).copied()
    }

    /// Case-insensitive lookup by initial (`'S'`, `'h'`, ...).
    pub fn from_initial(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'S' => Some(Suit::Spades),
            'H' => Some(Suit::Hearts),
            'C' => Some(Suit::Clubs),
            'D' => Some(Suit::Diamonds),
            _ => None,
        }
    }

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            Suit::Spades => "Spades",
            Suit::Hearts => "Hearts",
            Suit::Clubs => "Clubs",
            Suit::Diamonds => "Diamonds",
        }
    }

    /// Single-character representation: 'S', 'H', 'C', or 'D'.
    #[inline]
    pub fn initial(self) -> char {
        match self {
            Suit::Spades => 'S',
            Suit::Hearts => 'H',
            Suit::Clubs => 'C',
            Suit::Diamonds => 'D',
        }
    }

    #[inline]
    pub fn color(self) -> Color {
        match self {
            Suit::Hearts | Suit::Diamonds => Color::Red,
            Suit::Spades | Suit::Clubs => Color::Black,
        }
    }

    /// Path of the suit icon shipped with graphical front ends.
    pub fn icon(self) -> &'static str {
        match self {
            Suit::Spades => "./assets/icons/spades.svg",
            Suit::Hearts => "./assets/icons/hearts.svg",
            Suit::Clubs => "./assets/icons/clubs.svg",
            Suit::Diamonds => "./assets/icons/diamonds.svg",
        }
    }
}

impl Rank {
    /// All ranks in a fixed, reproducible order (Ace..King).
    pub const ALL: [Rank; NUM_RANKS as usize] = [
        Rank::Ace,
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
    ];

    /// Construct a rank from a small integer 0..=12.
    ///
    /// # Panics
    ///
    /// Panics if `v >= 13`.
    #[inline]
    pub fn from_u8(v: u8) -> Self {
        match Rank::ALL.get(v as usize) {
            Some(&r) => r,
            None => panic!("invalid rank: {v}"),
        }
    }

    /// Lookup by rank value 1..=13.
    pub fn try_from_value(value: u8) -> Option<Self> {
        if value == 0 {
            return None;
        }
        Rank::ALL.get(value as usize - 1).copied()
    }

    /// Rank value in 1..=13 (Ace=1, King=13).
    #[inline]
    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn name(self) -> &'static str {
        match self {
            Rank::Ace => "Ace",
            Rank::Two => "Two",
            Rank::Three => "Three",
            Rank::Four => "Four",
            Rank::Five => "Five",
            Rank::Six => "Six",
            Rank::Seven => "Seven",
            Rank::Eight => "Eight",
            Rank::Nine => "Nine",
            Rank::Ten => "Ten",
            Rank::Jack => "Jack",
            Rank::Queen => "Queen",
            Rank::King => "King",
        }
    }

    /// Short display key: `A`, `2`..`10`, `J`, `Q`, `K`.
    pub fn key(self) -> &'static str {
        const KEYS: [&str; NUM_RANKS as usize] = [
            "A", "2", "3", "4", "5", "6", "7", "8", "9", "10", "J", "Q", "K",
        ];
        KEYS[self as usize]
    }

    #[inline]
    pub fn is_face(self) -> bool {
        matches!(self, Rank::Jack | Rank::Queen | Rank::King)
    }

    /// Illustration for face ranks; `None` for pip ranks.
    pub fn illustration(self) -> Option<&'static str> {
        match self {
            Rank::Jack => Some("./assets/images/jack.svg"),
            Rank::Queen => Some("./assets/images/queen.svg"),
            Rank::King => Some("./assets/images/king.svg"),
            _ => None,
        }
    }
}

/// Can `card` be placed on `target` in a center pile?
///
/// True when the colours differ and `target` is exactly one rank higher.
/// Kings never have a center target card; they only go to empty piles.
#[inline]
pub fn card_is_center_target(card: Card, target: Card) -> bool {
    !card.is_king() && card.color() != target.color() && card.value() + 1 == target.value()
}

/// Is `target` the foundation predecessor of `card`?
///
/// Same suit, exactly one rank lower. Aces have no predecessor.
#[inline]
pub fn card_is_win_target(card: Card, target: Card) -> bool {
    !card.is_ace() && card.suit() == target.suit() && target.value() + 1 == card.value()
}

/// Generate a standard 52-card deck in a fixed order.
///
/// Suits follow `Suit::ALL` order, and ranks follow `Rank::ALL` order, so
/// position `i` holds `Card(i)`.
pub fn standard_deck() -> [Card; CARDS_PER_DECK as usize] {
    let mut cards = [Card(0); CARDS_PER_DECK as usize];
    let mut i = 0usize;
    for &suit in Suit::ALL.iter() {
        for &rank in Rank::ALL.iter() {
            cards[i] = Card::new(suit, rank);
            i += 1;
        }
    }
    cards
}
