//! Headless session driver: loads an airport and a scenario, replays a
//! command script against the engine, and prints the radio traffic and
//! the final score.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tracon_airspace::Airport;
use tracon_core::commands::CommandRequest;
use tracon_core::state::RadarSnapshot;
use tracon_sim::{interpreter, Scenario, SimulationEngine};

#[derive(Parser)]
#[command(name = "tracon")]
#[command(about = "Run a terminal-area traffic session headless", long_about = None)]
struct Args {
    /// Airport JSON document
    #[arg(long)]
    airport: PathBuf,

    /// Scenario JSON document
    #[arg(long)]
    scenario: PathBuf,

    /// Command script: lines of "<secs> <callsign> <instructions...>"
    #[arg(long)]
    script: Option<PathBuf>,

    /// RNG seed; the same seed replays the same session
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Number of ticks to run
    #[arg(long, default_value = "1800")]
    ticks: u64,

    /// Seconds of simulated time per tick
    #[arg(long, default_value = "1")]
    dt: f64,

    /// Print the traffic picture every N ticks
    #[arg(long)]
    radar_every: Option<u64>,
}

/// One script line, queued when the session clock reaches it.
struct ScriptedCommand {
    at_secs: f64,
    request: CommandRequest,
}

fn load_script(path: &Path) -> Result<Vec<ScriptedCommand>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let mut commands = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let (at, rest) = line
            .split_once(char::is_whitespace)
            .with_context(|| format!("script line {}: expected \"<secs> <command>\"", index + 1))?;
        let at_secs: f64 = at
            .parse()
            .with_context(|| format!("script line {}: bad time {at:?}", index + 1))?;
        let request = interpreter::parse_command_line(rest)
            .with_context(|| format!("script line {}: no instructions in {rest:?}", index + 1))?;
        commands.push(ScriptedCommand { at_secs, request });
    }
    commands.sort_by(|a, b| a.at_secs.total_cmp(&b.at_secs));
    Ok(commands)
}

fn clock(secs: f64) -> String {
    let total = secs.max(0.0).round() as u64;
    format!("{:02}:{:02}:{:02}", total / 3600, (total / 60) % 60, total % 60)
}

fn report(snapshot: &RadarSnapshot, dt: f64, radar_every: Option<u64>) {
    for transmission in &snapshot.transmissions {
        let mark = if transmission.warning { '!' } else { ' ' };
        println!(
            "{} {mark} {}",
            clock(transmission.tick as f64 * dt),
            transmission.log
        );
    }
    for event in &snapshot.score_events {
        tracing::info!(?event, tick = snapshot.time.tick, "scored");
    }
    if radar_every.is_some_and(|every| every > 0 && snapshot.time.tick % every == 0) {
        println!("{} radar contacts: {}", clock(snapshot.time.elapsed_secs), snapshot.aircraft.len());
        for aircraft in &snapshot.aircraft {
            println!(
                "  {:<8} {:<9} {:>5.0} ft {:>3.0} kt hdg {:>3.0}",
                aircraft.callsign,
                format!("{:?}", aircraft.mode),
                aircraft.altitude,
                aircraft.speed,
                aircraft.heading.to_degrees().rem_euclid(360.0),
            );
        }
    }
}

fn print_summary(snapshot: &RadarSnapshot) {
    let score = &snapshot.score.state;
    println!();
    println!("---- session over after {} ----", clock(snapshot.time.elapsed_secs));
    println!(
        "arrivals {}  departures {}  failed arrivals {}  failed departures {}",
        score.arrivals, score.departures, score.failed_arrivals, score.failed_departures
    );
    println!(
        "warnings {}  terrain hits {}  aborted landings {}  aborted taxis {}",
        score.warnings, score.hits, score.aborted_landings, score.aborted_taxis
    );
    println!(
        "violations {}  restricted entries {}  windy landings {}  windy takeoffs {}",
        score.violations, score.restrictions, score.windy_landing, score.windy_takeoff
    );
    println!("score {:+.1}", snapshot.score.total);
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let args = Args::parse();
    if args.dt <= 0.0 {
        anyhow::bail!("--dt must be positive");
    }

    let airport = Airport::from_file(&args.airport)
        .with_context(|| format!("loading airport {}", args.airport.display()))?;
    let scenario_text = fs::read_to_string(&args.scenario)
        .with_context(|| format!("reading scenario {}", args.scenario.display()))?;
    let scenario = Scenario::from_json(&scenario_text)
        .with_context(|| format!("parsing scenario {}", args.scenario.display()))?;
    let script = match &args.script {
        Some(path) => load_script(path)?,
        None => Vec::new(),
    };

    println!(
        "{} ({}), seed {}, {} ticks at {}s",
        airport.icao, airport.name, args.seed, args.ticks, args.dt
    );
    let mut engine = SimulationEngine::new(airport, &scenario, args.seed);

    let mut next = 0;
    let mut last = None;
    for _ in 0..args.ticks {
        while next < script.len() && script[next].at_secs <= engine.time().elapsed_secs {
            engine.queue_command(script[next].request.clone());
            next += 1;
        }
        let snapshot = engine.tick(args.dt);
        report(&snapshot, args.dt, args.radar_every);
        last = Some(snapshot);
    }

    if let Some(snapshot) = &last {
        print_summary(snapshot);
    }
    Ok(())
}
