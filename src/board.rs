//! The board: thirteen piles plus a per-card state arena.
//!
//! Piles store card identities bottom-to-top; each card's entry in the
//! arena stores the key of the pile holding it and its flags. Only the
//! move executor and the constructors in this module mutate a board; the
//! analyzer sees it through `&Board`.

use crate::card::{standard_deck, Card, Rank, Suit, CARDS_PER_DECK};
use crate::error::{Error, Invariant, Result};
use crate::pile::{Pile, PileId, PileKind, NUM_CENTER, NUM_PILES};

/// Local convenience: our deck length as `usize`.
pub const DECK_LEN: usize = CARDS_PER_DECK as usize;

/// An ordered 52-card deck, in dealing order.
pub type Deck = [Card; DECK_LEN];

/// Where a card is and what can be seen of it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CardState {
    /// Pile currently holding the card.
    pub pile: PileId,
    pub facedown: bool,
    /// The card directly beneath it in a center pile is face down.
    pub facedown_below: bool,
    /// Topmost card of its pile.
    pub nothing_above: bool,
    /// Bottommost card of its pile.
    pub nothing_below: bool,
}

impl Default for CardState {
    fn default() -> Self {
        CardState {
            pile: PileId::DRAW,
            facedown: false,
            facedown_below: false,
            nothing_above: false,
            nothing_below: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    piles: [Pile; NUM_PILES],
    states: [CardState; DECK_LEN],
}

impl Board {
    /// A board with every pile empty. Not valid until 52 cards are placed.
    pub(crate) fn empty() -> Self {
        Board {
            piles: core::array::from_fn(|i| Pile::new(PileId::ALL[i])),
            states: [CardState::default(); DECK_LEN],
        }
    }

    /// Deal a deck column by column: one card to pile 1, two to pile 2, ...
    /// seven to pile 7, all face down except each column's top card. The
    /// remaining 24 cards go face down to the draw pile, in deck order.
    pub fn deal(deck: &Deck) -> Result<Board> {
        let mut board = Board::empty();
        let mut next = deck.iter().copied();

        for n in 1..=NUM_CENTER {
            let pile = PileId::center(n);
            for i in 0..n {
                if let Some(card) = next.next() {
                    board.place(pile, card, i + 1 != n);
                }
            }
        }
        for card in next {
            board.place(PileId::DRAW, card, true);
        }

        board.refresh_all();
        board.validate()?;
        Ok(board)
    }

    // ----- Read access -----

    #[inline]
    pub fn pile(&self, id: PileId) -> &Pile {
        &self.piles[id.index()]
    }

    /// All piles in print order.
    pub fn piles(&self) -> &[Pile] {
        &self.piles
    }

    /// `draw`, `discard`.
    pub fn cycle(&self) -> &[Pile] {
        &self.piles[0..2]
    }

    /// Center piles `1`..`7`.
    pub fn center(&self) -> &[Pile] {
        &self.piles[2..2 + NUM_CENTER]
    }

    /// Foundations in `Suit::ALL` order.
    pub fn win(&self) -> &[Pile] {
        &self.piles[2 + NUM_CENTER..]
    }

    #[inline]
    pub fn state(&self, card: Card) -> &CardState {
        &self.states[card.index() as usize]
    }

    #[inline]
    pub fn pile_of(&self, card: Card) -> PileId {
        self.state(card).pile
    }

    /// The card resting directly on `card` in its own pile.
    pub fn card_above(&self, card: Card) -> Option<Card> {
        let pile = self.pile(self.pile_of(card));
        let idx = pile.position(card)?;
        pile.at(idx + 1)
    }

    /// Every card, pile by pile in print order, bottom to top.
    pub fn cards(&self) -> Vec<Card> {
        self.piles.iter().flat_map(|p| p.iter()).collect()
    }

    pub fn card_count(&self) -> usize {
        self.piles.iter().map(Pile::len).sum()
    }

    /// All four foundations complete.
    pub fn is_won(&self) -> bool {
        self.win().iter().all(|p| p.len() == Rank::ALL.len())
    }

    /// Number of face-down cards still in the center piles.
    pub fn hidden_count(&self) -> usize {
        self.center()
            .iter()
            .flat_map(|p| p.iter())
            .filter(|&c| self.state(c).facedown)
            .count()
    }

    /// `(suit index, rank value)` pairs for every card in print order.
    pub fn to_pairs(&self) -> Vec<(u8, u8)> {
        self.cards()
            .into_iter()
            .map(|c| (c.suit().index() as u8, c.value()))
            .collect()
    }

    // ----- Mutation (crate-internal) -----

    /// Append `card` to `pile` and point its back-reference there. Flags
    /// are left for `refresh` to recompute.
    pub(crate) fn place(&mut self, pile: PileId, card: Card, facedown: bool) {
        self.piles[pile.index()].cards.push(card);
        let st = &mut self.states[card.index() as usize];
        st.pile = pile;
        st.facedown = facedown;
    }

    /// Remove and return every card from position `idx` to the top.
    pub(crate) fn split_off(&mut self, pile: PileId, idx: usize) -> Vec<Card> {
        self.piles[pile.index()].cards.split_off(idx)
    }

    /// Remove the single card at position `idx`.
    pub(crate) fn remove_at(&mut self, pile: PileId, idx: usize) -> Card {
        self.piles[pile.index()].cards.remove(idx)
    }

    pub(crate) fn set_facedown(&mut self, card: Card, facedown: bool) {
        self.states[card.index() as usize].facedown = facedown;
    }

    /// Recompute positional flags for every card of `pile`.
    pub(crate) fn refresh(&mut self, pile: PileId) {
        let is_center = pile.kind() == PileKind::Center;
        let cards = &self.piles[pile.index()].cards;
        let last = cards.len().saturating_sub(1);

        for (i, &card) in cards.iter().enumerate() {
            let below_facedown = i > 0 && self.states[cards[i - 1].index() as usize].facedown;
            let st = &mut self.states[card.index() as usize];
            st.nothing_below = i == 0;
            st.nothing_above = i == last;
            st.facedown_below = is_center && below_facedown;
        }
    }

    pub(crate) fn refresh_all(&mut self) {
        for id in PileId::ALL {
            self.refresh(id);
        }
    }

    // ----- Invariants -----

    /// Check every structural invariant of the board.
    ///
    /// - exactly 52 cards, none in two piles
    /// - each card's back-reference names the pile it sits in
    /// - positional flags agree with pile order
    /// - center piles: face-down prefix, face-up suffix, face-up top
    /// - foundations: Ace-up, same-suit, face-up runs
    pub fn validate(&self) -> Result<()> {
        let found = self.card_count();
        if found != DECK_LEN {
            return Err(Invariant::CardCount { found }.into());
        }

        let mut seen = [false; DECK_LEN];
        for pile in &self.piles {
            for card in pile.iter() {
                let slot = &mut seen[card.index() as usize];
                if *slot {
                    return Err(Invariant::DuplicateCard { card }.into());
                }
                *slot = true;
            }
        }

        for pile in &self.piles {
            self.validate_pile(pile)?;
        }
        Ok(())
    }

    fn validate_pile(&self, pile: &Pile) -> Result<()> {
        let id = pile.id();
        let last = pile.len().saturating_sub(1);

        for (i, card) in pile.iter().enumerate() {
            let st = self.state(card);
            if st.pile != id {
                return Err(Invariant::MisplacedCard {
                    card,
                    recorded: st.pile,
                    actual: id,
                }
                .into());
            }
            let below_facedown = i > 0
                && pile.at(i - 1).is_some_and(|b| self.state(b).facedown)
                && id.kind() == PileKind::Center;
            let flag = if st.nothing_below != (i == 0) {
                Some("nothing_below")
            } else if st.nothing_above != (i == last) {
                Some("nothing_above")
            } else if st.facedown_below != below_facedown {
                Some("facedown_below")
            } else {
                None
            };
            if let Some(flag) = flag {
                return Err(Invariant::FlagMismatch { card, flag }.into());
            }
        }

        match id.kind() {
            PileKind::Center => {
                let mut faceup_seen = false;
                for card in pile.iter() {
                    let facedown = self.state(card).facedown;
                    if faceup_seen && facedown {
                        return Err(Invariant::BrokenColumn { pile: id }.into());
                    }
                    faceup_seen |= !facedown;
                }
                if pile.top().is_some_and(|top| self.state(top).facedown) {
                    return Err(Invariant::BrokenColumn { pile: id }.into());
                }
            }
            PileKind::Win => {
                let suit = id.win_suit().unwrap_or(Suit::Spades);
                for (i, card) in pile.iter().enumerate() {
                    let in_order = Rank::ALL.get(i).is_some_and(|&rank| card == Card::new(suit, rank));
                    if !in_order || self.state(card).facedown {
                        return Err(Invariant::BrokenFoundation { pile: id }.into());
                    }
                }
            }
            PileKind::Cycle => {}
        }
        Ok(())
    }

    // ----- Text snapshot -----

    /// One line per pile, `"{Name}: {ids}\n"`, face-down cards bracketed.
    ///
    /// Example:
    ///   Draw: [S9] [H2]
    ///   1: D11
    ///   2: [S11] C7
    pub fn render(&self) -> String {
        let mut s = String::new();
        for pile in &self.piles {
            let ids: Vec<String> = pile
                .iter()
                .map(|c| c.display_id(self.state(c).facedown))
                .collect();
            s.push_str(&capitalize(&pile.id().name()));
            s.push_str(": ");
            s.push_str(&ids.join(" "));
            s.push('\n');
        }
        s
    }

    /// Read a snapshot in the `render` format back into a board.
    ///
    /// Lines without a `:` (such as a game title) are skipped. Pile names
    /// are case-insensitive; piles that are not mentioned stay empty.
    pub fn parse(text: &str) -> Result<Board> {
        let mut board = Board::empty();

        for (lineno, line) in text.lines().enumerate() {
            let Some((name, rest)) = line.split_once(':') else {
                continue;
            };
            let parse_err = |message: String| Error::Parse {
                line: lineno + 1,
                message,
            };
            let pile = PileId::from_name(name)
                .ok_or_else(|| parse_err(format!("unknown pile {:?}", name.trim())))?;
            if !board.pile(pile).is_empty() {
                return Err(parse_err(format!("pile {} listed twice", pile)));
            }
            for token in rest.split_whitespace() {
                let card: Card = token.parse().map_err(|e| parse_err(format!("{e}")))?;
                board.place(pile, card, token.starts_with('['));
            }
        }

        board.refresh_all();
        board.validate()?;
        Ok(board)
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

/// Builder for hand-made positions.
///
/// Draw cards are placed face down, discard and foundation cards face up,
/// and center cards with the visibility given per card.
#[derive(Clone, Debug, Default)]
pub struct Layout {
    draw: Vec<Card>,
    discard: Vec<Card>,
    center: [Vec<(Card, bool)>; NUM_CENTER],
    win: [Vec<Card>; 4],
}

impl Layout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set column `n` (1..=7), bottom to top, as `(card, facedown)` pairs.
    pub fn with_column(mut self, n: usize, cards: &[(Card, bool)]) -> Self {
        self.center[n - 1] = cards.to_vec();
        self
    }

    /// Fill the foundation of `suit` from Ace up to and including `upto`.
    pub fn with_foundation(mut self, suit: Suit, upto: Rank) -> Self {
        self.win[suit.index()] = (0..=upto as u8)
            .map(|r| Card::new(suit, Rank::from_u8(r)))
            .collect();
        self
    }

    pub fn with_draw(mut self, cards: &[Card]) -> Self {
        self.draw = cards.to_vec();
        self
    }

    pub fn with_discard(mut self, cards: &[Card]) -> Self {
        self.discard = cards.to_vec();
        self
    }

    /// Put every card not mentioned so far face down at the bottom of
    /// column `n`, in deck order.
    pub fn bury_remaining(mut self, n: usize) -> Self {
        let mut used = [false; DECK_LEN];
        let mentioned = self
            .draw
            .iter()
            .chain(self.discard.iter())
            .chain(self.center.iter().flatten().map(|(c, _)| c))
            .chain(self.win.iter().flatten());
        for c in mentioned {
            used[c.index() as usize] = true;
        }

        let mut column: Vec<(Card, bool)> = standard_deck()
            .into_iter()
            .filter(|c| !used[c.index() as usize])
            .map(|c| (c, true))
            .collect();
        column.extend(self.center[n - 1].drain(..));
        self.center[n - 1] = column;
        self
    }

    pub fn build(self) -> Result<Board> {
        let mut board = Board::empty();
        for card in self.draw {
            board.place(PileId::DRAW, card, true);
        }
        for card in self.discard {
            board.place(PileId::DISCARD, card, false);
        }
        for (i, column) in self.center.into_iter().enumerate() {
            for (card, facedown) in column {
                board.place(PileId::center(i + 1), card, facedown);
            }
        }
        for (suit, run) in Suit::ALL.into_iter().zip(self.win) {
            for card in run {
                board.place(PileId::win(suit), card, false);
            }
        }
        board.refresh_all();
        board.validate()?;
        Ok(board)
    }
}
