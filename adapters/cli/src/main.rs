#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Bunny Hop levels headlessly.

mod manifest;
mod presenter;

use std::{path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use bunny_hop_core::{GameState, Instruction};
use bunny_hop_session::{GameSession, SessionConfig};
use bunny_hop_world::{build_grid, default_levels, Level, LevelGeometry};
use clap::{Args, Parser, Subcommand};
use manifest::Manifest;
use presenter::TracePresenter;
use tracing::info;

/// Headless driver for Bunny Hop levels.
#[derive(Parser)]
#[command(name = "bunny-hop")]
#[command(about = "Plays Bunny Hop programs against a simulated clock", long_about = None)]
#[command(version)]
struct Cli {
    /// TOML manifest providing configuration and levels
    #[arg(long, global = true)]
    manifest: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the available levels
    Levels,

    /// Author a program on a level and play it to completion
    Play(PlayArgs),
}

#[derive(Args)]
struct PlayArgs {
    /// Zero-based level index
    #[arg(long, default_value_t = 0)]
    level: usize,

    /// Program written with F (forward), L (turn left) and R (turn right)
    #[arg(long)]
    program: String,

    /// Simulated milliseconds advanced per frame
    #[arg(long, default_value_t = 100)]
    frame_ms: u64,

    /// Simulated milliseconds after which playback is abandoned
    #[arg(long, default_value_t = 20_000)]
    max_ms: u64,
}

/// Entry point for the Bunny Hop command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (config, levels) = match &cli.manifest {
        Some(path) => Manifest::load(path)?.into_parts(),
        None => (SessionConfig::default(), default_levels()),
    };

    match cli.command {
        Command::Levels => list_levels(&config, &levels),
        Command::Play(args) => play(config, levels, &args),
    }
}

fn list_levels(config: &SessionConfig, levels: &[Level]) -> Result<()> {
    let grid = build_grid(config.world.grid.half_extent, config.world.grid.step);
    for (index, level) in levels.iter().enumerate() {
        let geometry = LevelGeometry::resolve(&grid, level, config.world.path_convention);
        let (start, goal) = (geometry.start(), geometry.goal());
        println!(
            "level {index}: facing {:?}, start ({:.2}, {:.2}), goal ({:.2}, {:.2}), {} platforms, {} danger cells",
            level.facing,
            start.x(),
            start.z(),
            goal.x(),
            goal.z(),
            geometry.path().len(),
            geometry.danger().len(),
        );
    }
    Ok(())
}

fn play(config: SessionConfig, levels: Vec<Level>, args: &PlayArgs) -> Result<()> {
    let program = parse_program(&args.program)?;
    if args.frame_ms == 0 {
        bail!("--frame-ms must be positive");
    }

    let mut session = GameSession::new(levels, config, TracePresenter::default());
    session
        .select_level(args.level)
        .with_context(|| format!("cannot select level {}", args.level))?;
    for (position, instruction) in program.into_iter().enumerate() {
        let _ = session
            .add_instruction(instruction)
            .with_context(|| format!("instruction {} was not accepted", position + 1))?;
    }
    let _ = session.primary_action();

    let frame = Duration::from_millis(args.frame_ms);
    let limit = Duration::from_millis(args.max_ms);
    while !session.state().is_terminal() && session.now() < limit {
        session.advance_time(frame);
    }
    if session.state().is_terminal() {
        // Let delayed feedback land before reporting.
        session.advance_time(Duration::from_millis(1_000));
    }

    let state = session.state();
    info!(?state, elapsed_ms = session.now().as_millis() as u64, "playback finished");
    let button = session
        .presenter()
        .last_feedback()
        .map_or("none", |(_, affordance)| affordance.label());
    println!("level {}: {}", args.level, outcome(state));
    println!("button: {button}");
    Ok(())
}

fn parse_program(text: &str) -> Result<Vec<Instruction>> {
    text.chars()
        .filter(|symbol| !symbol.is_whitespace())
        .map(|symbol| {
            Instruction::from_symbol(symbol)
                .with_context(|| format!("unknown instruction symbol `{symbol}`"))
        })
        .collect()
}

fn outcome(state: GameState) -> &'static str {
    match state {
        GameState::Idle => "idle",
        GameState::Running => "still running",
        GameState::Complete => "complete",
        GameState::Failed => "failed",
        GameState::Unresolved => "unresolved",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn programs_parse_case_insensitively() {
        assert_eq!(
            parse_program("Ff l R").unwrap(),
            vec![
                Instruction::Forward,
                Instruction::Forward,
                Instruction::TurnLeft,
                Instruction::TurnRight,
            ]
        );
    }

    #[test]
    fn unknown_symbols_are_reported() {
        let error = parse_program("FX").unwrap_err();

        assert!(error.to_string().contains('X'));
    }
}
