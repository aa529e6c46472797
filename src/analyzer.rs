//! Move-feasibility analysis for a board snapshot.
//!
//! For every card it reaches, the analyzer decides whether the card has a
//! move toward its foundation ("win") or onto another tableau pile
//! ("center"). Mobility is recursive: a card buried in a pile can only move
//! if the card resting on it can move, and a destination card that is not
//! exposed is only usable if it can itself be moved. These dependencies
//! form a graph that may contain cycles (two buried cards blocking each
//! other), so the traversal combines
//!
//!   - a per-card memo table (each card is evaluated at most once per run),
//!   - an in-progress stack of the cards on the current dependency path;
//!     a card met again on its own path counts as immobile for that lookup.
//!
//! All traversal state lives in a `Traversal` value created per run and
//! passed to every recursive call. The board is only read.

use std::collections::BTreeMap;

use log::{debug, trace};
use serde::Serialize;

use crate::board::{Board, DECK_LEN};
use crate::card::{card_is_center_target, card_is_win_target, Card, NUM_RANKS, NUM_SUITS};
use crate::error::{Invariant, Result};
use crate::moves::{Move, MoveKind};
use crate::pile::{PileId, PileKind};
use crate::stats::AnalysisStats;

// ----- Configuration -----

/// Which cards the outer loop starts from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum EntryPoints {
    /// Face-up center cards that sit on a face-down card or on the table.
    /// Moving one of these reveals a card or empties a column.
    #[default]
    Critical,
    /// Every card of the card list, in order.
    All,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnalysisConfig {
    pub entry: EntryPoints,
    /// Maximum number of nested card evaluations. A well-formed board never
    /// needs more than one frame per card.
    pub max_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            entry: EntryPoints::Critical,
            max_depth: DECK_LEN,
        }
    }
}

// ----- Result -----

/// Outcome of one analysis run.
///
/// `moves` holds an entry for every card the traversal evaluated, including
/// cards reached only as dependencies; an empty list means "no move".
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Analysis {
    pub moves: BTreeMap<Card, Vec<Move>>,
    /// Entry cards, in the order they were analyzed.
    pub critical: Vec<Card>,
    pub stats: AnalysisStats,
}

impl Analysis {
    /// Candidate moves for `card`; empty if it has none or was never
    /// evaluated.
    pub fn moves_for(&self, card: Card) -> &[Move] {
        self.moves.get(&card).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cards with at least one candidate move.
    pub fn movable(&self) -> impl Iterator<Item = (Card, &[Move])> + '_ {
        self.moves
            .iter()
            .filter(|(_, moves)| !moves.is_empty())
            .map(|(&card, moves)| (card, moves.as_slice()))
    }

    pub fn move_count(&self) -> usize {
        self.moves.values().map(Vec::len).sum()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

// ----- Traversal state -----

/// Restriction applied to a lookup result. Memo entries always hold the
/// full move set; the restriction only filters what the caller sees.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wanted {
    Both,
    Win,
    Center,
}

impl Wanted {
    fn keeps(self, kind: MoveKind) -> bool {
        match self {
            Wanted::Both => true,
            Wanted::Win => kind == MoveKind::Win,
            Wanted::Center => kind == MoveKind::Center,
        }
    }
}

struct Traversal {
    visited: [[bool; NUM_RANKS as usize]; NUM_SUITS as usize],
    in_progress: Vec<Card>,
    possible: BTreeMap<Card, Vec<Move>>,
    depth: usize,
    stats: AnalysisStats,
}

impl Traversal {
    fn new() -> Self {
        Traversal {
            visited: [[false; NUM_RANKS as usize]; NUM_SUITS as usize],
            in_progress: Vec::new(),
            possible: BTreeMap::new(),
            depth: 0,
            stats: AnalysisStats::default(),
        }
    }

    fn is_visited(&self, card: Card) -> bool {
        self.visited[card.suit().index()][card.rank() as usize]
    }

    fn visit(&mut self, card: Card) {
        self.visited[card.suit().index()][card.rank() as usize] = true;
        self.possible.insert(card, Vec::new());
    }

    fn cached(&self, card: Card, wanted: Wanted) -> Vec<Move> {
        self.possible
            .get(&card)
            .into_iter()
            .flatten()
            .filter(|mv| wanted.keeps(mv.kind))
            .copied()
            .collect()
    }

    fn enter(&mut self, limit: usize) -> Result<()> {
        self.depth += 1;
        if self.depth > limit {
            return Err(Invariant::RecursionLimit { limit }.into());
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }
}

// ----- Analyzer -----

/// Computes candidate moves for a board snapshot.
///
/// `cards` is the population searched for entry points and for move
/// targets; normally `board.cards()`.
pub struct MoveAnalyzer<'a> {
    board: &'a Board,
    cards: &'a [Card],
    config: AnalysisConfig,
}

/// Analyze `board` with the default configuration.
pub fn analyze(board: &Board, cards: &[Card]) -> Result<Analysis> {
    MoveAnalyzer::new(board, cards).analyze()
}

/// Face-up center card lying on a face-down card or at the bottom of its
/// pile.
pub fn is_critical(board: &Board, card: Card) -> bool {
    let st = board.state(card);
    st.pile.kind() == PileKind::Center && !st.facedown && (st.facedown_below || st.nothing_below)
}

impl<'a> MoveAnalyzer<'a> {
    pub fn new(board: &'a Board, cards: &'a [Card]) -> Self {
        MoveAnalyzer {
            board,
            cards,
            config: AnalysisConfig::default(),
        }
    }

    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn critical_cards(&self) -> Vec<Card> {
        self.cards
            .iter()
            .copied()
            .filter(|&c| is_critical(self.board, c))
            .collect()
    }

    /// Run one analysis pass.
    ///
    /// Fails without a partial result if the board breaks a structural
    /// invariant, if a target lookup is ambiguous, or if evaluation nests
    /// deeper than `max_depth`.
    pub fn analyze(&self) -> Result<Analysis> {
        self.board.validate()?;

        let entries = match self.config.entry {
            EntryPoints::Critical => self.critical_cards(),
            EntryPoints::All => self.cards.to_vec(),
        };

        let mut cx = Traversal::new();
        for &card in &entries {
            self.moves_for(card, Wanted::Both, &mut cx)?;
        }

        let analysis = Analysis {
            moves: cx.possible,
            critical: entries,
            stats: cx.stats,
        };
        debug!(
            "analysis: {} entry card(s), {} evaluated, {} movable, {} move(s), {} cycle break(s)",
            analysis.critical.len(),
            analysis.stats.cards_evaluated,
            analysis.movable().count(),
            analysis.move_count(),
            analysis.stats.cycle_breaks
        );
        Ok(analysis)
    }

    fn moves_for(&self, card: Card, wanted: Wanted, cx: &mut Traversal) -> Result<Vec<Move>> {
        if cx.in_progress.contains(&card) {
            cx.stats.record_cycle_break();
            trace!("{} is already on the dependency path", card);
            return Ok(Vec::new());
        }
        if cx.is_visited(card) {
            cx.stats.record_memo_hit();
            return Ok(cx.cached(card, wanted));
        }
        cx.visit(card);

        cx.enter(self.config.max_depth)?;
        let moves = self.evaluate(card, cx)?;
        cx.stats.record_evaluation(cx.depth);
        cx.leave();

        trace!("{} -> {} move(s)", card, moves.len());
        cx.possible.insert(card, moves);
        Ok(cx.cached(card, wanted))
    }

    fn evaluate(&self, card: Card, cx: &mut Traversal) -> Result<Vec<Move>> {
        let st = self.board.state(card);
        if st.pile.kind() == PileKind::Center && st.facedown {
            return Ok(Vec::new());
        }
        if !self.is_free(card, cx)? {
            return Ok(Vec::new());
        }

        let mut moves = Vec::new();
        moves.extend(self.win_move(card, cx)?);
        moves.extend(self.center_moves(card, cx)?);
        Ok(moves)
    }

    /// Top of its pile, in a cycle pile, or sitting under a card that can
    /// itself move.
    fn is_free(&self, card: Card, cx: &mut Traversal) -> Result<bool> {
        let st = self.board.state(card);
        if st.pile.kind() == PileKind::Cycle || st.nothing_above {
            return Ok(true);
        }
        match self.board.card_above(card) {
            Some(above) => Ok(!self.moves_for(above, Wanted::Both, cx)?.is_empty()),
            None => Ok(true),
        }
    }

    /// Evaluate `dependency` with `card` pushed on the dependency path.
    fn depends_on(
        &self,
        card: Card,
        dependency: Card,
        wanted: Wanted,
        cx: &mut Traversal,
    ) -> Result<bool> {
        cx.in_progress.push(card);
        let result = self.moves_for(dependency, wanted, cx);
        cx.in_progress.pop();
        Ok(!result?.is_empty())
    }

    fn win_move(&self, card: Card, cx: &mut Traversal) -> Result<Option<Move>> {
        let from = self.board.pile_of(card);
        let home = PileId::win(card.suit());
        if from == home {
            return Ok(None);
        }
        if card.is_ace() {
            return Ok(Some(Move::new(MoveKind::Win, card, None, from, home)));
        }

        let Some(&pred) = self.targets(card, MoveKind::Win, cx)?.first() else {
            return Ok(None);
        };
        let mv = Move::new(MoveKind::Win, card, Some(pred), from, home);
        if self.board.pile_of(pred) == home {
            return Ok(Some(mv));
        }
        let reachable = self.depends_on(card, pred, Wanted::Win, cx)?;
        Ok(reachable.then_some(mv))
    }

    fn center_moves(&self, card: Card, cx: &mut Traversal) -> Result<Vec<Move>> {
        if card.is_king() {
            return self.king_moves(card, cx);
        }

        let from = self.board.pile_of(card);
        let mut moves = Vec::new();
        for target in self.targets(card, MoveKind::Center, cx)? {
            let st = self.board.state(target);
            if st.pile == from {
                continue;
            }
            let mv = Move::new(MoveKind::Center, card, Some(target), from, st.pile);
            let exposed = st.nothing_above && st.pile.kind() == PileKind::Center;
            if exposed || self.depends_on(card, target, Wanted::Center, cx)? {
                moves.push(mv);
            }
        }
        Ok(moves)
    }

    /// Kings go to an empty center pile, or to one whose bottom card can
    /// leave.
    fn king_moves(&self, card: Card, cx: &mut Traversal) -> Result<Vec<Move>> {
        let from = self.board.pile_of(card);
        let mut moves = Vec::new();
        for pile in self.board.center() {
            if pile.id() == from {
                continue;
            }
            let mv = Move::new(MoveKind::Center, card, None, from, pile.id());
            match pile.bottom() {
                None => moves.push(mv),
                Some(bottom) => {
                    if self.depends_on(card, bottom, Wanted::Both, cx)? {
                        moves.push(mv);
                    }
                }
            }
        }
        Ok(moves)
    }

    /// Cards of the card list that `card` could be placed on.
    ///
    /// A win lookup expects exactly one predecessor. The same card listed
    /// twice is an invariant breach; no match at all just means no move.
    fn targets(&self, card: Card, kind: MoveKind, cx: &mut Traversal) -> Result<Vec<Card>> {
        let fits = |target: Card| match kind {
            MoveKind::Win => card_is_win_target(card, target),
            MoveKind::Center => card_is_center_target(card, target),
        };
        let mut found: Vec<Card> = self.cards.iter().copied().filter(|&t| fits(t)).collect();

        if found.is_empty() {
            cx.stats.record_missing_target();
            debug!("no {:?} target for {} in the card list", kind, card);
            return Ok(found);
        }
        let ambiguous = |matches| Invariant::AmbiguousTarget { card, kind, matches };
        if kind == MoveKind::Win && found.len() > 1 {
            return Err(ambiguous(found.len()).into());
        }
        found.sort();
        if found.windows(2).any(|w| w[0] == w[1]) {
            return Err(ambiguous(found.len()).into());
        }
        Ok(found)
    }
}

// ----- Tests -----

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;
    use crate::card::{standard_deck, Rank, Suit};
    use crate::error::Error;

    fn c(suit: Suit, rank: Rank) -> Card {
        Card::new(suit, rank)
    }

    fn run(board: &Board) -> Analysis {
        analyze(board, &board.cards()).unwrap()
    }

    #[test]
    fn ace_on_top_of_pile_one_goes_home() {
        let board = Board::deal(&standard_deck()).unwrap();
        let analysis = run(&board);
        let s1 = c(Suit::Spades, Rank::Ace);

        assert!(analysis.critical.contains(&s1));
        let win: Vec<&Move> = analysis
            .moves_for(s1)
            .iter()
            .filter(|m| m.kind == MoveKind::Win)
            .collect();
        assert_eq!(win.len(), 1);
        assert_eq!(win[0].to, PileId::win(Suit::Spades));
        assert_eq!(win[0].from, PileId::center(1));
        assert_eq!(win[0].target, None);
    }

    #[test]
    fn king_moves_to_every_empty_column() {
        let kh = c(Suit::Hearts, Rank::King);
        let board = Layout::new()
            .with_column(1, &[(kh, false)])
            .with_column(7, &[(c(Suit::Clubs, Rank::Two), false)])
            .bury_remaining(7)
            .build()
            .unwrap();
        let analysis = run(&board);

        let moves = analysis.moves_for(kh);
        let dests: Vec<PileId> = moves.iter().map(|m| m.to).collect();
        assert_eq!(dests, (2..=6).map(PileId::center).collect::<Vec<_>>());
        assert!(moves.iter().all(|m| m.kind == MoveKind::Center && m.target.is_none()));
    }

    #[test]
    fn mutually_blocking_cards_have_no_moves() {
        let s2 = c(Suit::Spades, Rank::Two);
        let s3 = c(Suit::Spades, Rank::Three);
        let h2 = c(Suit::Hearts, Rank::Two);
        let h3 = c(Suit::Hearts, Rank::Three);
        let kd = c(Suit::Diamonds, Rank::King);
        // 2S waits for 3H to leave; 3H needs 2H home, which waits for 3S,
        // which needs 2S home.
        let board = Layout::new()
            .with_foundation(Suit::Spades, Rank::Ace)
            .with_foundation(Suit::Hearts, Rank::Ace)
            .with_column(1, &[(s2, false), (h3, false)])
            .with_column(2, &[(h2, false), (s3, false)])
            .with_column(7, &[(kd, false)])
            .bury_remaining(7)
            .build()
            .unwrap();

        let analysis = run(&board);
        for card in [s2, h3, h2, s3] {
            assert!(analysis.moves.contains_key(&card), "{card} not evaluated");
            assert!(analysis.moves_for(card).is_empty(), "{card} should be stuck");
        }
        assert!(analysis.stats.memo_hits > 0);

        // The King can still use the four empty columns.
        assert_eq!(analysis.moves_for(kd).len(), 4);
    }

    #[test]
    fn missing_predecessor_means_no_win_move() {
        let s1 = c(Suit::Spades, Rank::Ace);
        let s2 = c(Suit::Spades, Rank::Two);
        let board = Layout::new()
            .with_foundation(Suit::Spades, Rank::Ace)
            .with_column(1, &[(s2, false)])
            .with_column(7, &[(c(Suit::Diamonds, Rank::King), false)])
            .bury_remaining(7)
            .build()
            .unwrap();

        let full = run(&board);
        let win: Vec<&Move> = full
            .moves_for(s2)
            .iter()
            .filter(|m| m.kind == MoveKind::Win)
            .collect();
        assert_eq!(win.len(), 1);
        assert_eq!(win[0].target, Some(s1));

        let without_ace: Vec<Card> = board.cards().into_iter().filter(|&c| c != s1).collect();
        let partial = analyze(&board, &without_ace).unwrap();
        assert!(partial.moves_for(s2).iter().all(|m| m.kind != MoveKind::Win));
        assert!(partial.stats.missing_targets >= 1);
    }

    #[test]
    fn targets_in_own_pile_are_not_offered() {
        let s9 = c(Suit::Spades, Rank::Nine);
        let h10 = c(Suit::Hearts, Rank::Ten);
        let cj = c(Suit::Clubs, Rank::Jack);
        // A snapshot may hold a face-up run out of sequence: H10 sits
        // exposed on S9 and can leave for CJ, which frees S9.
        let board = Layout::new()
            .with_column(1, &[(s9, false), (h10, false)])
            .with_column(3, &[(cj, false)])
            .with_column(7, &[(c(Suit::Diamonds, Rank::King), false)])
            .bury_remaining(7)
            .build()
            .unwrap();
        let analysis = run(&board);

        let h10_moves = analysis.moves_for(h10);
        assert_eq!(h10_moves.len(), 1);
        assert_eq!(h10_moves[0].target, Some(cj));
        assert!(analysis.moves.contains_key(&s9));
        assert!(analysis.moves_for(s9).iter().all(|m| m.to != m.from));
        assert!(analysis.moves_for(s9).is_empty());
    }

    #[test]
    fn duplicate_predecessor_is_fatal() {
        let s1 = c(Suit::Spades, Rank::Ace);
        let s2 = c(Suit::Spades, Rank::Two);
        let board = Layout::new()
            .with_foundation(Suit::Spades, Rank::Ace)
            .with_column(1, &[(s2, false)])
            .with_column(7, &[(c(Suit::Diamonds, Rank::King), false)])
            .bury_remaining(7)
            .build()
            .unwrap();

        let mut cards = board.cards();
        cards.push(s1);
        let err = analyze(&board, &cards).unwrap_err();
        assert_eq!(
            err,
            Error::Invariant(Invariant::AmbiguousTarget {
                card: s2,
                kind: MoveKind::Win,
                matches: 2
            })
        );
    }

    #[test]
    fn depth_limit_aborts_analysis() {
        let board = Board::deal(&standard_deck()).unwrap();
        let cards = board.cards();
        // S1's center targets include D2 in the draw pile, one level down.
        let config = AnalysisConfig {
            max_depth: 1,
            ..AnalysisConfig::default()
        };
        let err = MoveAnalyzer::new(&board, &cards)
            .with_config(config)
            .analyze()
            .unwrap_err();
        assert_eq!(err, Error::Invariant(Invariant::RecursionLimit { limit: 1 }));
    }

    #[test]
    fn corrupt_board_is_rejected_before_analysis() {
        let mut board = Board::deal(&standard_deck()).unwrap();
        let s3 = c(Suit::Spades, Rank::Three);
        board.set_facedown(s3, true);
        assert!(matches!(
            analyze(&board, &board.cards()),
            Err(Error::Invariant(Invariant::BrokenColumn { .. }))
        ));
    }

    #[test]
    fn analysis_is_repeatable_and_read_only() {
        let board = Board::deal(&standard_deck()).unwrap();
        let before = board.clone();
        let first = run(&board);
        let second = run(&board);
        assert_eq!(first, second);
        assert_eq!(board, before);
    }

    #[test]
    fn critical_cards_of_standard_deal_are_column_tops() {
        let board = Board::deal(&standard_deck()).unwrap();
        let cards = board.cards();
        let critical = MoveAnalyzer::new(&board, &cards).critical_cards();
        let tops: Vec<Card> = board.center().iter().filter_map(|p| p.top()).collect();
        assert_eq!(critical, tops);
    }

    #[test]
    fn all_entry_points_cover_draw_aces() {
        let board = Board::deal(&standard_deck()).unwrap();
        let cards = board.cards();
        let config = AnalysisConfig {
            entry: EntryPoints::All,
            ..AnalysisConfig::default()
        };
        let analysis = MoveAnalyzer::new(&board, &cards).with_config(config).analyze().unwrap();
        assert_eq!(analysis.moves.len(), DECK_LEN);

        // Every Ace not yet home is free here: column tops or stock cards.
        for suit in Suit::ALL {
            let ace = c(suit, Rank::Ace);
            let st = board.state(ace);
            if st.pile.kind() == PileKind::Cycle || st.nothing_above {
                assert!(
                    analysis.moves_for(ace).iter().any(|m| m.kind == MoveKind::Win),
                    "{ace} lacks a win move"
                );
            }
        }
        for (card, moves) in analysis.movable() {
            let st = board.state(card);
            assert!(!(st.pile.kind() == PileKind::Center && st.facedown));
            assert!(moves.iter().all(|m| m.card == card && m.from == st.pile));
        }
    }

    #[test]
    fn json_output_is_keyed_by_card_id() {
        let board = Board::deal(&standard_deck()).unwrap();
        let json = run(&board).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let s1 = &value["moves"]["S1"];
        assert!(s1.is_array());
        assert_eq!(s1[0]["kind"], "Win");
        assert_eq!(s1[0]["to"], "winS");
        assert!(value["stats"]["cards_evaluated"].as_u64().unwrap() > 0);
    }
}
