//! mnk: command-line front end for the move engine
//!
//! ## Usage
//!
//! - `mnk best [FILE] --side x` - Read a board (rows of `.`/`X`/`O`) and print the move
//! - `mnk selfplay --rows 9 --cols 9` - Engine plays both sides, prints the final board
//!
//! Set `RUST_LOG=debug` to see per-iteration search output.

use std::io::Read;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::info;

use mnk::rules::has_won;
use mnk::{Board, EngineConfig, MoveEngine, Pos, RuleConfig, SearchLimits, Stone};

/// Move engine for M×N,K connection games
#[derive(Parser)]
#[command(name = "mnk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stones in a row needed to win (default: derived from the board)
    #[arg(short = 'k', long, global = true)]
    win_length: Option<usize>,

    /// An exact-K run capped at both ends does not win
    #[arg(long, global = true)]
    block_double_open_ends: bool,

    /// Per-move time limit in milliseconds
    #[arg(long, global = true)]
    time_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the best move for a board read from FILE or stdin
    Best {
        /// Board file; stdin when omitted
        file: Option<PathBuf>,
        /// Side to move
        #[arg(short, long, value_enum, default_value_t = Side::X)]
        side: Side,
    },
    /// Let the engine play both sides from an empty board
    Selfplay {
        #[arg(long, default_value_t = 9)]
        rows: usize,
        #[arg(long, default_value_t = 9)]
        cols: usize,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Side {
    X,
    O,
}

impl From<Side> for Stone {
    fn from(side: Side) -> Self {
        match side {
            Side::X => Stone::Black,
            Side::O => Stone::White,
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(ms) = cli.time_ms {
        config.search.time_limit_ms = ms;
    }
    let engine = MoveEngine::from_engine_config(&config).context("invalid search configuration")?;

    match cli.command {
        Commands::Best { ref file, side } => {
            let text = match file {
                Some(path) => std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?,
                None => {
                    let mut text = String::new();
                    std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
                    text
                }
            };
            let board: Board = text.parse().context("parsing board")?;
            let rules = rules_for(&cli, &config, &board);
            run_best(&engine, &board, side.into(), &rules)
        }
        Commands::Selfplay { rows, cols } => {
            let board = Board::new(rows, cols)?;
            let rules = rules_for(&cli, &config, &board);
            run_selfplay(&engine, board, &rules)
        }
    }
}

/// Command-line K wins over the config file, which wins over the board default.
fn rules_for(cli: &Cli, config: &EngineConfig, board: &Board) -> RuleConfig {
    let base = if cli.config.is_some() {
        config.rules
    } else {
        RuleConfig::for_board(board.rows(), board.cols())
    };
    RuleConfig::new(
        cli.win_length.unwrap_or(base.win_length),
        cli.block_double_open_ends || base.block_double_open_ends,
    )
}

fn run_best(engine: &MoveEngine, board: &Board, side: Stone, rules: &RuleConfig) -> Result<()> {
    let result = engine.get_best_move_with_limits(board, side, rules, &SearchLimits::none())?;
    let (row, col) = Pos::coords(result.best_move);
    println!("{row} {col}");
    info!(
        "{:?}: score {}, depth {}, {} nodes, {}ms",
        result.search_type, result.score, result.depth, result.nodes, result.time_ms
    );
    Ok(())
}

fn run_selfplay(engine: &MoveEngine, board: Board, rules: &RuleConfig) -> Result<()> {
    const BLACK: &str = "selfplay-black";
    const WHITE: &str = "selfplay-white";

    let start = Instant::now();
    engine.initialize_session(BLACK, board.clone(), Stone::Black, *rules)?;
    engine.initialize_session(WHITE, board, Stone::White, *rules)?;

    let session_of = |side: Stone| if side == Stone::Black { BLACK } else { WHITE };
    let mut side = Stone::Black;
    let mut last: Option<Pos> = None;
    let mut winner = None;
    while let Some(pos) = engine.get_move(session_of(side), last, side)? {
        info!("{} plays {pos}", side.symbol());
        if has_won(&engine.session_board(session_of(side))?, pos, side, rules) {
            winner = Some(side);
            break;
        }
        last = Some(pos);
        side = side.opponent();
    }

    // The side that moved last (or found the board full) holds every stone
    println!("{}", engine.session_board(session_of(side))?);
    match winner {
        Some(stone) => println!("{} wins", stone.symbol()),
        None => println!("draw"),
    }
    info!("selfplay finished in {}ms", start.elapsed().as_millis());

    engine.end_session(BLACK)?;
    engine.end_session(WHITE)?;
    Ok(())
}
