//! Headless CLI: run one full match on the built-in arena and print the
//! round-by-round story plus the final score.

use breach_core::commands::MatchCommand;
use breach_core::enums::MatchPhase;
use breach_core::events::MatchEvent;
use breach_core::map::MapDef;
use breach_sim::engine::{MatchEngine, SimConfig};

/// Tick ceiling: far beyond any realistic match, guards a stalled sim.
const MAX_TICKS: u64 = 400_000;

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let json_out = args.iter().any(|a| a == "--json");
    let seed = args
        .iter()
        .find_map(|a| a.parse::<u64>().ok())
        .unwrap_or(42);

    let map = MapDef::training_arena();
    let mut engine = match MatchEngine::new(map, SimConfig { seed, ..Default::default() }) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("failed to start match: {e}");
            std::process::exit(1);
        }
    };

    engine.queue_command(MatchCommand::StartMatch);

    let mut printed_events = 0;
    for _ in 0..MAX_TICKS {
        let snapshot = engine.tick();

        // Narrate the interesting events as they happen.
        let log = engine.event_log();
        for event in &log[printed_events..] {
            match event {
                MatchEvent::RoundStarted { round } => println!("--- round {round} ---"),
                MatchEvent::Kill {
                    killer,
                    victim,
                    weapon,
                    headshot,
                } => {
                    let tag = if *headshot { " (headshot)" } else { "" };
                    println!("  {killer:?} killed {victim:?} with {weapon:?}{tag}");
                }
                MatchEvent::BombPlanted { site } => println!("  bomb planted at site {site}"),
                MatchEvent::BombDefused { agent } => println!("  bomb defused by {agent:?}"),
                MatchEvent::BombDetonated { .. } => println!("  bomb detonated"),
                MatchEvent::RoundEnded { winner, reason, .. } => {
                    println!("  round to {winner:?} ({reason:?})");
                }
                MatchEvent::SidesSwapped => println!("=== sides swapped ==="),
                MatchEvent::OvertimeStarted { win_threshold } => {
                    println!("=== overtime, first to {win_threshold} ===");
                }
                _ => {}
            }
        }
        printed_events = log.len();

        if snapshot.phase == MatchPhase::MatchEnd {
            if json_out {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(json) => println!("{json}"),
                    Err(e) => eprintln!("snapshot serialization failed: {e}"),
                }
            }
            let teams = engine.teams();
            println!(
                "\nfinal: {:?} {} : {} {:?} (seed {seed})",
                teams[0].team, teams[0].score, teams[1].score, teams[1].team
            );
            return;
        }
    }

    eprintln!("match did not finish within {MAX_TICKS} ticks");
    std::process::exit(2);
}
