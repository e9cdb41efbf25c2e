use clap::Parser;
use minesweeper_kb::*;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Autonomous bot: probes proven-safe cells and guesses only when it must.
#[derive(Parser, Debug)]
#[command(name = "minesweeper-bot", version)]
struct Config {
    /// Number of columns
    #[arg(long, default_value_t = 8)]
    width: usize,

    /// Number of rows
    #[arg(long, default_value_t = 8)]
    height: usize,

    /// Number of hazards on the board
    #[arg(long, default_value_t = 8)]
    hazards: usize,

    /// Seed for hazard placement and guesses
    #[arg(long)]
    seed: Option<u64>,

    /// Pause between moves, in milliseconds
    #[arg(long, default_value_t = 250)]
    delay_ms: u64,

    /// Cross-check every conclusion with a SAT solver after each move
    #[arg(long)]
    audit: bool,

    /// Print the final report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    // RUST_LOG=debug shows every observation and inference round.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = Config::parse();
    let mut session = Session::new(config.width, config.height, config.hazards, config.seed)?;

    tracing::info!(
        width = config.width,
        height = config.height,
        hazards = config.hazards,
        seed = ?config.seed,
        "starting game"
    );
    if !config.json {
        println!("--- Autonomous Minesweeper Bot ---");
        println!("Strategy: probe proven-safe cells, guess randomly otherwise.");
        print!("{}", session.game().render(false));
    }

    let mut move_count = 0;
    while !session.is_finished() {
        move_count += 1;

        // --- 1. Let the agent pick and probe a cell ---
        let turn = session.step()?;

        // --- 2. Print the move and the board ---
        if !config.json {
            println!("\n--- Move #{} ---", move_count);
            match turn {
                Turn::Deduced { cell, count } => {
                    println!("Logic found a guaranteed safe cell: {cell} shows {count}.")
                }
                Turn::Guessed { cell, count } => {
                    println!("No safe cell known. Guessed {cell}, it shows {count}.")
                }
                Turn::Detonated { cell } => println!("Guessed {cell} and hit a hazard."),
                Turn::Stuck => println!("No valid moves left for the bot to make."),
            }
            print!("{}", session.game().render(false));
        }

        // --- 3. Optionally cross-check the knowledge base ---
        if config.audit {
            let agent = session.agent();
            let verified = audit(
                agent.width(),
                agent.height(),
                agent.observations(),
                agent.knowledge(),
            )?;
            tracing::debug!(verified, "audit passed");
        }

        // --- 4. Stop or pause ---
        if turn == Turn::Stuck {
            break;
        }
        if config.delay_ms > 0 {
            thread::sleep(Duration::from_millis(config.delay_ms));
        }
    }

    let report = session.report();
    if config.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n--- Game Over ---");
    print!("{}", session.game().render(true));
    match report.outcome {
        GameState::Won => println!("Result: The bot won!"),
        GameState::Lost => println!("Result: The bot hit a hazard and lost."),
        GameState::Playing => println!("Result: The game ended unexpectedly."),
    }
    println!(
        "{} moves ({} deduced, {} guessed), {}/{} hazards identified.",
        report.moves,
        report.deduced_moves,
        report.guesses,
        report.hazards_identified,
        report.hazards
    );
    Ok(())
}
