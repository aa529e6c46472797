//! Human-readable rendering of boards and analysis results.
//!
//! `Board::render` is the canonical one-line-per-pile print. The helpers
//! here add a column grid view of the tableau (face-down cards as `XX`) and
//! text reports for analyzer output, move chains and statistics. All
//! functions return `String`; the `print_*` wrappers write to stdout.

use crate::analyzer::Analysis;
use crate::board::Board;
use crate::card::Card;
use crate::chains::MoveChain;
use crate::moves::Move;
use crate::pile::PileId;
use crate::stats::AnalysisStats;

/// Card as shown in the grid: `XX` when face down, otherwise its id.
pub fn format_card_visible(card: Card, facedown: bool) -> String {
    if facedown {
        "XX".to_string()
    } else {
        card.id()
    }
}

/// Render the seven center piles as top-justified columns.
///
/// Example:
///   1    2    3    4    5    6    7
///   S1   XX   XX   XX   XX   XX   XX
///        S3   XX   XX   XX   XX   XX
///             S6   XX   ...
pub fn render_columns(board: &Board) -> String {
    let columns = board.center();
    let height = columns.iter().map(|p| p.len()).max().unwrap_or(0);

    let mut s = String::new();
    for pile in columns {
        s.push_str(&format!("{:<5}", pile.id().name()));
    }
    s = s.trim_end().to_string();
    s.push('\n');

    for row in 0..height {
        let mut line = String::new();
        for pile in columns {
            let cell = pile
                .at(row)
                .map(|c| format_card_visible(c, board.state(c).facedown))
                .unwrap_or_default();
            line.push_str(&format!("{:<5}", cell));
        }
        s.push_str(line.trim_end());
        s.push('\n');
    }
    s
}

/// Stock, waste and foundation tops on one line.
///
/// Example:
///   Draw: 24 card(s)  Discard: --  Win: [S1] [  ] [  ] [  ]
pub fn render_summary_line(board: &Board) -> String {
    let discard = board
        .pile(PileId::DISCARD)
        .top()
        .map_or_else(|| "--".to_string(), Card::id);
    let mut s = format!(
        "Draw: {} card(s)  Discard: {}  Win:",
        board.pile(PileId::DRAW).len(),
        discard
    );
    for pile in board.win() {
        match pile.top() {
            Some(top) => s.push_str(&format!(" [{}]", top)),
            None => s.push_str(" [  ]"),
        }
    }
    s
}

pub fn format_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One line per evaluated card that has moves, preceded by the entry
/// cards.
///
/// Example:
///   Critical: S1 S3 S6 S10 H2 H8 C2
///   S1: S1 (1) => Blank (winS), S1 (1) => H2 (5)
///   2 of 7 entry card(s) movable, 3 move(s)
pub fn render_analysis(analysis: &Analysis) -> String {
    let critical: Vec<String> = analysis.critical.iter().map(|c| c.id()).collect();
    let mut s = format!("Critical: {}\n", critical.join(" "));

    for (card, moves) in analysis.movable() {
        s.push_str(&format!("{}: {}\n", card, format_moves(moves)));
    }

    let movable_entries = analysis
        .critical
        .iter()
        .filter(|&&c| !analysis.moves_for(c).is_empty())
        .count();
    s.push_str(&format!(
        "{} of {} entry card(s) movable, {} move(s)\n",
        movable_entries,
        analysis.critical.len(),
        analysis.move_count()
    ));
    s
}

pub fn render_chains(chains: &[MoveChain]) -> String {
    let mut s = String::new();
    for (i, chain) in chains.iter().enumerate() {
        s.push_str(&format!("{:>3}: {}\n", i + 1, chain));
    }
    if chains.is_empty() {
        s.push_str("no move chains\n");
    }
    s
}

pub fn render_stats(stats: &AnalysisStats) -> String {
    format!(
        "evaluated {} card(s), {} memo hit(s) ({:.0}%), {} cycle break(s), {} missing target(s), depth {}",
        stats.cards_evaluated,
        stats.memo_hits,
        stats.memo_hit_rate() * 100.0,
        stats.cycle_breaks,
        stats.missing_targets,
        stats.max_depth
    )
}

pub fn print_board(board: &Board) {
    print!("{}", board.render());
}

pub fn print_analysis(analysis: &Analysis) {
    print!("{}", render_analysis(analysis));
}
