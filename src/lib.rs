pub mod card;
pub mod pile;
pub mod board;
pub mod moves;
pub mod analyzer;
pub mod chains;
pub mod deal;
pub mod display;
pub mod stats;
pub mod game;
pub mod error;
pub mod logging;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::Parser;
use log::info;
use serde_json::json;

pub use crate::analyzer::{Analysis, AnalysisConfig, EntryPoints, MoveAnalyzer, analyze};
pub use crate::board::{Board, Deck, Layout};
pub use crate::card::{Card, Rank, Suit};
pub use crate::error::{Error, IllegalMoveReason, Invariant, Result};
pub use crate::moves::{Move, MoveKind};
pub use crate::pile::{PileId, PileKind};

use crate::chains::move_chains;
use crate::game::{Game, TerminationReason};

/// Command-line surface of the `klondike_turn` binary.
///
/// Exactly one board source may be given; without one the first fixed
/// deal is used.
#[derive(Parser, Debug)]
#[command(
    name = "klondike_turn",
    version,
    about = "Analyze which Klondike cards can move on a given board"
)]
pub struct Cli {
    /// Built-in fixed deal: game-one or game-two.
    #[arg(long, group = "source")]
    pub fixture: Option<String>,

    /// JSON file holding 52 [suit, rank] pairs in dealing order.
    #[arg(long, group = "source")]
    pub pairs: Option<PathBuf>,

    /// Shuffle with this seed (PCG64).
    #[arg(long, group = "source")]
    pub seed: Option<u64>,

    /// Deal by number, 0 .. 52!-1 (0 is the unshuffled deck).
    #[arg(long, group = "source")]
    pub deal_number: Option<String>,

    /// Board snapshot in the print format ("Draw: [C3] ...").
    #[arg(long, group = "source")]
    pub board: Option<PathBuf>,

    /// Analyze every card instead of only the critical ones.
    #[arg(long)]
    pub all: bool,

    /// Also list move chains for the critical cards.
    #[arg(long)]
    pub chains: bool,

    /// Print a JSON document instead of text.
    #[arg(long)]
    pub json: bool,

    /// Play up to this many greedy turns before the final analysis.
    #[arg(long, default_value_t = 0)]
    pub turns: usize,

    /// Title printed above the board.
    #[arg(long, default_value = "Game 1")]
    pub name: String,

    /// More log output on stderr (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only log errors.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Entry point for the `klondike_turn` binary.
///
/// Builds one game from the chosen source, optionally plays `--turns`
/// greedy turns, then prints the board and one analysis pass.
///
/// Example:
///   cargo run -- --fixture game-two --chains -v
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    install_logger(&cli)?;
    run_with(&cli)
}

/// Install the stderr logger at the level picked by `-v` / `-q`.
pub fn install_logger(cli: &Cli) -> anyhow::Result<()> {
    logging::init(logging::level_from_verbosity(cli.verbose, cli.quiet))
        .map_err(|e| anyhow::anyhow!("installing logger: {e}"))
}

/// Build the game described by the board-source flags.
pub fn load_game(cli: &Cli) -> anyhow::Result<Game> {
    if let Some(path) = &cli.board {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading board snapshot {}", path.display()))?;
        let board = Board::parse(&text)
            .with_context(|| format!("parsing board snapshot {}", path.display()))?;
        return Ok(Game::from_board(cli.name.clone(), board));
    }

    let deck = if let Some(path) = &cli.pairs {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading deal pairs {}", path.display()))?;
        deal::parse_pairs_json(&text).with_context(|| format!("in {}", path.display()))?
    } else if let Some(seed) = cli.seed {
        deal::shuffled_deck(seed)
    } else if let Some(number) = &cli.deal_number {
        let n = deal::parse_deal_number(number)?;
        deal::deck_from_deal_number(&n)?
    } else {
        let name = cli.fixture.as_deref().unwrap_or("game-one");
        let Some(pairs) = deal::fixture(name) else {
            bail!("unknown fixture {:?} (expected game-one or game-two)", name);
        };
        deal::deck_from_pairs(pairs)?
    };
    Ok(Game::new(cli.name.clone(), deck)?)
}

/// Everything after argument parsing and logger setup.
pub fn run_with(cli: &Cli) -> anyhow::Result<()> {
    let mut game = load_game(cli)?;
    let config = AnalysisConfig {
        entry: if cli.all {
            EntryPoints::All
        } else {
            EntryPoints::Critical
        },
        ..AnalysisConfig::default()
    };

    let termination = if cli.turns > 0 {
        Some(game.play(cli.turns, config).context("playing turns")?)
    } else {
        None
    };

    let before = game.board_hash;
    let analysis = game.analyze(config).context("analyzing board")?;
    debug_assert_eq!(before, game::hash_board64(&game.board));
    info!("{}", display::render_stats(&analysis.stats));

    let chains = if cli.chains {
        move_chains(&analysis, &game.board)
    } else {
        Vec::new()
    };

    if cli.json {
        let doc = json!({
            "name": game.name,
            "deal_number": game.initial_deck.as_ref().map(|d| deal::deal_number(d).to_string()),
            "board": game.board.render().lines().collect::<Vec<_>>(),
            "pairs": game.board.to_pairs(),
            "turns": game.turn,
            "termination": termination.map(|t| format!("{:?}", t)),
            "moves_played": game.moves,
            "analysis": analysis,
            "chains": chains,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", game.name);
    if let Some(deck) = &game.initial_deck {
        println!("Deal number: {}", deal::deal_number(deck));
    }
    println!();
    display::print_board(&game.board);
    println!();
    print!("{}", display::render_columns(&game.board));
    println!("{}", display::render_summary_line(&game.board));
    println!();

    if let Some(reason) = termination {
        let verdict = match reason {
            TerminationReason::Won => "won",
            TerminationReason::NoMoves => "stuck",
            TerminationReason::TurnLimit => "turn limit reached",
        };
        println!("Played {} turn(s), {} move(s): {}", game.turn, game.moves.len(), verdict);
        println!();
    }

    display::print_analysis(&analysis);
    if cli.chains {
        println!();
        println!("Move chains:");
        print!("{}", display::render_chains(&chains));
    }
    println!();
    println!("{}", display::render_stats(&analysis.stats));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["klondike_turn"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn default_source_is_first_fixture() {
        let game = load_game(&cli(&[])).unwrap();
        let expected = deal::deck_from_pairs(&deal::GAME_ONE).unwrap();
        assert_eq!(game.initial_deck, Some(expected));
        assert_eq!(game.name, "Game 1");
    }

    #[test]
    fn sources_are_mutually_exclusive() {
        let argv = ["klondike_turn", "--seed", "3", "--fixture", "game-two"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn deal_number_zero_deals_standard_order() {
        let game = load_game(&cli(&["--deal-number", "0"])).unwrap();
        assert_eq!(game.initial_deck, Some(card::standard_deck()));
    }

    #[test]
    fn unknown_fixture_is_an_error() {
        let err = load_game(&cli(&["--fixture", "game-nine"])).unwrap_err();
        assert!(err.to_string().contains("unknown fixture"));
    }

    #[test]
    fn second_logger_install_is_reported() {
        let parsed = cli(&["-q"]);
        // Only the first install in a process can succeed.
        let _ = install_logger(&parsed);
        let err = install_logger(&parsed).unwrap_err();
        assert!(err.to_string().starts_with("installing logger: "));
    }

    #[test]
    fn verbosity_flags_count() {
        let parsed = cli(&["-vv", "--all", "--turns", "5"]);
        assert_eq!(parsed.verbose, 2);
        assert!(parsed.all);
        assert_eq!(parsed.turns, 5);
    }
}
