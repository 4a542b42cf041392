//! Thin command-line front end for Corax: parse a FEN and a search budget,
//! run `find_best_move`, and print the result. Process-level plumbing only —
//! the engine crate knows nothing about argument parsing or stdout.

use std::path::PathBuf;
use std::time::Duration;

use chess::board::Board;
use clap::Parser;
use colored::Colorize;
use engine::{find_best_move, NoBook, OpeningBook, PolyglotBook, Position};

const DEFAULT_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

#[derive(Parser)]
#[command(author, version, about = "Search a position and print the best move Corax finds.", long_about = None)]
struct Cli {
    /// Start from a FEN string
    #[arg(short, long, default_value = DEFAULT_FEN)]
    fen: String,

    /// Maximum search depth, in ply
    #[arg(short, long, value_name = "DEPTH", default_value = "8")]
    depth: u8,

    /// Time budget for the whole search, in seconds
    #[arg(short, long, value_name = "SECONDS")]
    time: Option<f64>,

    /// Path to a Polyglot opening book generated by this crate
    #[arg(short, long, value_name = "PATH")]
    book: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let board: Board = cli.fen.parse()?;
    let mut position = Position::new(board);

    let book: Box<dyn OpeningBook> = match &cli.book {
        Some(path) => match PolyglotBook::load(path) {
            Ok(book) => Box::new(book),
            Err(err) => {
                eprintln!("[warning] {err}, continuing without an opening book");
                Box::new(NoBook)
            }
        },
        None => Box::new(NoBook),
    };

    let time_limit = cli.time.map(Duration::from_secs_f64);

    match find_best_move(&mut position, cli.depth, time_limit, book.as_ref()) {
        Some(mv) => println!("{} {mv}", "bestmove".green()),
        None => println!("{} (none)", "bestmove".green()),
    }

    Ok(())
}
