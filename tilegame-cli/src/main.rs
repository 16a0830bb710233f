//! Terminal tile game
//!
//! Plays on stdin/stdout, one command per line. Progress is written to a
//! checksummed save file after every move, so quitting (or Ctrl-C) never
//! loses more than the move in flight.

mod console;
mod render;
mod save_file;
mod stats;

use std::io::{self, BufRead};
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tilegame_core::Session;

use crate::console::{BellNotifier, Command, StdinConfirmer, HELP};
use crate::render::TextRenderer;
use crate::save_file::FileStore;
use crate::stats::PlayStats;

/// Play the sliding tile game in the terminal
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Board rows
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
    rows: u8,

    /// Board columns
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(1..=16))]
    columns: u8,

    /// Directory holding save files
    #[arg(long, default_value = "data")]
    save_dir: PathBuf,

    /// Seed for tile spawning (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Answer yes to every prompt
    #[arg(long, short = 'y')]
    yes: bool,

    /// Log filter, written to stderr
    #[arg(long, default_value = "warn")]
    log: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(args.log.clone()))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    // Progress is saved after each move, so an interrupt can exit at once
    ctrlc::set_handler(|| {
        println!("\n\nInterrupted, progress is saved.");
        std::process::exit(130);
    })?;

    let rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let store = FileStore::new(args.save_dir.clone());
    let mut confirmer = StdinConfirmer::new(args.yes);
    let mut session = Session::new(args.rows.into(), args.columns.into(), store, rng)
        .with_renderer(TextRenderer::default())
        .with_notifier(BellNotifier);

    println!("{}", HELP);
    let restored = session.start(&mut confirmer);
    info!(restored, save_dir = %args.save_dir.display(), "session started");

    let mut stats = PlayStats::new();
    let stdin = io::stdin();
    let mut line = String::new();

    loop {
        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        match Command::parse(&line) {
            Some(Command::Move(direction)) => {
                let result = session.move_tiles(direction);
                stats.record(&result, session.grid().max_tile());
                if result.game_over {
                    session.reset_game();
                }
            }
            Some(Command::Reset) => {
                session.reset_confirm(&mut confirmer);
            }
            Some(Command::Help) => println!("{}", HELP),
            Some(Command::Quit) => break,
            None => println!("Unknown command {:?}, ? for help", line.trim()),
        }
    }

    println!();
    stats.print_summary();
    Ok(())
}
