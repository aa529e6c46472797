//! Game-level state: a board plus the moves that produced it.
//
//! `Game` wraps the turn cycle: analyze the current board, pick a move,
//! apply it, analyze again. It keeps
//!   - the initial deck (when the game was dealt rather than loaded from a
//!     snapshot),
//!   - the moves applied so far,
//!   - the current board (derivable from deck + moves, cached here),
//!   - a 64-bit hash of the current board for cheap change and loop checks.

use std::collections::HashSet;

use log::{debug, info, warn};

use crate::analyzer::{Analysis, AnalysisConfig, MoveAnalyzer};
use crate::board::{Board, Deck};
use crate::chains::move_chains;
use crate::error::Result;
use crate::moves::Move;

/// Why `Game::play` stopped.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum TerminationReason {
    /// Every card reached its foundation.
    Won,
    /// No chain applied to the current board, or every applicable chain
    /// led back to a position already played.
    NoMoves,
    /// The configured number of turns was used up.
    TurnLimit,
}

/// 64-bit FNV-1a parameters.
const FNV_OFFSET_BASIS: u64 = 0xcbf29ce484222325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01B3;

#[inline]
fn fnv1a_mix_byte(mut h: u64, byte: u8) -> u64 {
    h ^= byte as u64;
    h = h.wrapping_mul(FNV_PRIME);
    h
}

/// Hash of the full board: every pile in print order, its length, and each
/// card with its visibility.
///
/// Deterministic for a given board; collisions are possible in theory but
/// not a concern at the scale of one game.
pub fn hash_board64(board: &Board) -> u64 {
    let mut h = FNV_OFFSET_BASIS;
    for pile in board.piles() {
        // Pile index doubles as a domain separator.
        h = fnv1a_mix_byte(h, 0xC0 | pile.id().index() as u8);
        h = fnv1a_mix_byte(h, pile.len() as u8);
        for card in pile.iter() {
            let hidden = if board.state(card).facedown { 0x80 } else { 0 };
            h = fnv1a_mix_byte(h, card.index() | hidden);
        }
    }
    h
}

#[derive(Clone, Debug)]
pub struct Game {
    pub name: String,
    /// Deck the board was dealt from; `None` for games loaded from a
    /// board snapshot.
    pub initial_deck: Option<Deck>,
    pub board: Board,
    /// Moves applied since the deal, in order.
    pub moves: Vec<Move>,
    pub board_hash: u64,
    /// Completed turns. A turn applies one chain, which may hold several
    /// moves.
    pub turn: usize,
}

impl Game {
    /// Deal `deck` into a fresh game.
    pub fn new(name: impl Into<String>, deck: Deck) -> Result<Self> {
        let board = Board::deal(&deck)?;
        let mut game = Game::from_board(name, board);
        game.initial_deck = Some(deck);
        Ok(game)
    }

    /// Start from a board snapshot.
    pub fn from_board(name: impl Into<String>, board: Board) -> Self {
        let board_hash = hash_board64(&board);
        Game {
            name: name.into(),
            initial_deck: None,
            board,
            moves: Vec::new(),
            board_hash,
            turn: 0,
        }
    }

    /// Rebuild a game from its deck and move history by replaying every
    /// move. Fails if any move no longer fits.
    pub fn from_parts(name: impl Into<String>, deck: Deck, moves: Vec<Move>) -> Result<Self> {
        let mut game = Game::new(name, deck)?;
        for mv in moves {
            game.apply_move(mv)?;
        }
        Ok(game)
    }

    /// Analyze the current board. The board is not modified.
    pub fn analyze(&self, config: AnalysisConfig) -> Result<Analysis> {
        let cards = self.board.cards();
        MoveAnalyzer::new(&self.board, &cards).with_config(config).analyze()
    }

    /// Apply one move and record it. On error nothing changes.
    pub fn apply_move(&mut self, mv: Move) -> Result<()> {
        mv.apply(&mut self.board)?;
        self.moves.push(mv);
        self.board_hash = hash_board64(&self.board);
        Ok(())
    }

    /// Greedy play: each turn, analyze and apply the first move chain that
    /// fits the board and does not return to an earlier position.
    ///
    /// Stops when the game is won, nothing applies, or `turn_limit` turns
    /// have been played.
    pub fn play(&mut self, turn_limit: usize, config: AnalysisConfig) -> Result<TerminationReason> {
        let mut seen: HashSet<u64> = HashSet::new();
        seen.insert(self.board_hash);

        loop {
            if self.board.is_won() {
                info!("{}: won after {} turn(s)", self.name, self.turn);
                return Ok(TerminationReason::Won);
            }
            if self.turn >= turn_limit {
                info!("{}: stopped at the turn limit ({})", self.name, turn_limit);
                return Ok(TerminationReason::TurnLimit);
            }

            let analysis = self.analyze(config)?;
            let chains = move_chains(&analysis, &self.board);

            let mut played = false;
            for chain in &chains {
                let mut trial = self.board.clone();
                if let Err(e) = chain.apply(&mut trial) {
                    debug!("chain {} rejected: {}", chain, e);
                    continue;
                }
                let hash = hash_board64(&trial);
                if !seen.insert(hash) {
                    warn!("chain {} repeats an earlier position; skipped", chain);
                    continue;
                }

                self.board = trial;
                self.board_hash = hash;
                self.moves.extend(chain.moves.iter().copied());
                self.turn += 1;
                info!("turn {}: {}", self.turn, chain);
                played = true;
                break;
            }

            if !played {
                info!("{}: no applicable move after {} turn(s)", self.name, self.turn);
                return Ok(TerminationReason::NoMoves);
            }
        }
    }

    /// Replay the move history from the initial deck.
    ///
    /// Returns `None` for snapshot games, which have no deck to replay.
    pub fn replay(&self) -> Option<Result<Board>> {
        self.initial_deck.map(|deck| replay_moves(&deck, &self.moves))
    }

    /// Title line followed by the board print.
    pub fn render(&self) -> String {
        format!("{}\n{}", self.name, self.board.render())
    }
}

fn replay_moves(deck: &Deck, moves: &[Move]) -> Result<Board> {
    let mut board = Board::deal(deck)?;
    for mv in moves {
        mv.apply(&mut board)?;
    }
    Ok(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Layout;
    use crate::card::{standard_deck, Card, Rank, Suit};
    use crate::deal::{deck_from_pairs, GAME_ONE};
    use crate::moves::MoveKind;
    use crate::pile::PileId;

    fn s1_home() -> Move {
        Move::new(
            MoveKind::Win,
            Card::new(Suit::Spades, Rank::Ace),
            None,
            PileId::center(1),
            PileId::win(Suit::Spades),
        )
    }

    #[test]
    fn new_game_hash_matches_board() {
        let game = Game::new("Game 1", standard_deck()).unwrap();
        assert_eq!(game.board_hash, hash_board64(&game.board));
        assert!(game.moves.is_empty());
        assert_eq!(game.turn, 0);
    }

    #[test]
    fn hash_tracks_visibility_and_position() {
        let a = Board::deal(&standard_deck()).unwrap();
        let b = Board::deal(&standard_deck()).unwrap();
        assert_eq!(hash_board64(&a), hash_board64(&b));

        let mut c = a.clone();
        s1_home().apply(&mut c).unwrap();
        assert_ne!(hash_board64(&a), hash_board64(&c));
    }

    #[test]
    fn apply_move_records_history() {
        let mut game = Game::new("Game 1", standard_deck()).unwrap();
        let before = game.board_hash;
        game.apply_move(s1_home()).unwrap();
        assert_eq!(game.moves, vec![s1_home()]);
        assert_ne!(game.board_hash, before);

        // Applying the same move again is stale and leaves the game alone.
        let snapshot = game.board.clone();
        assert!(game.apply_move(s1_home()).is_err());
        assert_eq!(game.moves.len(), 1);
        assert_eq!(game.board, snapshot);
    }

    #[test]
    fn from_parts_replays_moves() {
        let game = Game::from_parts("Game 1", standard_deck(), vec![s1_home()]).unwrap();
        let mut expected = Board::deal(&standard_deck()).unwrap();
        s1_home().apply(&mut expected).unwrap();
        assert_eq!(game.board, expected);
        assert_eq!(game.replay().unwrap().unwrap(), expected);
    }

    #[test]
    fn analysis_leaves_board_untouched() {
        let deck = deck_from_pairs(&GAME_ONE).unwrap();
        let game = Game::new("Game 1", deck).unwrap();
        let first = game.analyze(AnalysisConfig::default()).unwrap();
        assert_eq!(hash_board64(&game.board), game.board_hash);
        assert_eq!(game.analyze(AnalysisConfig::default()).unwrap(), first);
    }

    #[test]
    fn play_finishes_a_nearly_won_board() {
        let mut layout = Layout::new();
        for (i, suit) in Suit::ALL.into_iter().enumerate() {
            layout = layout
                .with_foundation(suit, Rank::Queen)
                .with_column(i + 1, &[(Card::new(suit, Rank::King), false)]);
        }
        let mut game = Game::from_board("endgame", layout.build().unwrap());

        let reason = game.play(10, AnalysisConfig::default()).unwrap();
        assert_eq!(reason, TerminationReason::Won);
        assert_eq!(game.turn, 4);
        assert!(game.moves.iter().all(|m| m.kind == MoveKind::Win));
        assert!(game.replay().is_none());
    }

    #[test]
    fn play_respects_turn_limit_and_keeps_cards() {
        let deck = deck_from_pairs(&GAME_ONE).unwrap();
        let mut game = Game::new("Game 1", deck).unwrap();
        let reason = game.play(3, AnalysisConfig::default()).unwrap();

        assert!(game.turn <= 3);
        if reason == TerminationReason::TurnLimit {
            assert_eq!(game.turn, 3);
        }
        assert!(game.moves.len() >= game.turn);
        game.board.validate().unwrap();
        assert_eq!(game.replay().unwrap().unwrap(), game.board);
    }
}
