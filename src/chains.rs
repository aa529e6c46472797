//! Expansion of analyzer results into ordered move sequences.
//!
//! The analyzer accepts a move onto a buried or out-of-play target when the
//! target can itself move. A chain spells that out: first the moves that
//! bring the target into play, then the card's own move, aimed at the pile
//! where the target ended up.

use core::fmt;

use serde::Serialize;

use crate::analyzer::Analysis;
use crate::board::Board;
use crate::card::Card;
use crate::error::Result;
use crate::moves::{Move, MoveKind};
use crate::pile::{PileId, PileKind};

/// Moves to apply in order. The last move belongs to the entry card.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MoveChain {
    pub moves: Vec<Move>,
}

impl MoveChain {
    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn last(&self) -> Option<&Move> {
        self.moves.last()
    }

    /// Apply every move of the chain to `board`, stopping at the first one
    /// that does not fit.
    pub fn apply(&self, board: &mut Board) -> Result<()> {
        for mv in &self.moves {
            mv.apply(board)?;
        }
        Ok(())
    }
}

impl fmt::Display for MoveChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, mv) in self.moves.iter().enumerate() {
            if i > 0 {
                f.write_str(" ; ")?;
            }
            write!(f, "{}", mv)?;
        }
        Ok(())
    }
}

/// Chains for every candidate move of every entry card, in entry order.
pub fn move_chains(analysis: &Analysis, board: &Board) -> Vec<MoveChain> {
    let mut chains = Vec::new();
    let mut path = Vec::new();
    for &card in &analysis.critical {
        for mv in analysis.moves_for(card) {
            path.push(card);
            chains.extend(
                expand(analysis, board, mv, &mut path)
                    .into_iter()
                    .map(|moves| MoveChain { moves }),
            );
            path.pop();
        }
    }
    chains
}

/// What must move out of the way before `mv` can be applied, and which of
/// its moves are relevant.
fn dependency(board: &Board, mv: &Move) -> Option<(Card, Option<MoveKind>)> {
    match (mv.kind, mv.target) {
        (MoveKind::Win, None) => None,
        (MoveKind::Win, Some(pred)) => {
            (board.pile_of(pred) != PileId::win(pred.suit())).then_some((pred, Some(MoveKind::Win)))
        }
        (MoveKind::Center, None) => board.pile(mv.to).bottom().map(|bottom| (bottom, None)),
        (MoveKind::Center, Some(target)) => {
            let st = board.state(target);
            let exposed = st.nothing_above && st.pile.kind() == PileKind::Center;
            (!exposed).then_some((target, Some(MoveKind::Center)))
        }
    }
}

fn expand(
    analysis: &Analysis,
    board: &Board,
    mv: &Move,
    path: &mut Vec<Card>,
) -> Vec<Vec<Move>> {
    let Some((dep, kind)) = dependency(board, mv) else {
        return vec![vec![*mv]];
    };
    if path.contains(&dep) {
        return Vec::new();
    }

    let mut out = Vec::new();
    path.push(dep);
    for dep_mv in analysis.moves_for(dep) {
        if kind.is_some_and(|k| k != dep_mv.kind) {
            continue;
        }
        for mut chain in expand(analysis, board, dep_mv, path) {
            let Some(freed) = chain.last().copied() else {
                continue;
            };
            let mut last = *mv;
            if mv.target.is_some() {
                last.to = freed.to;
            }
            chain.push(last);
            out.push(chain);
        }
    }
    path.pop();
    out
}
