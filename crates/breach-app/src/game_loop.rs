//! Match loop thread — runs the engine at the fixed tick rate and
//! stores snapshots for polling.
//!
//! The engine is created inside the thread because it's cleaner for
//! ownership. Commands arrive via `mpsc`; the loop checks for Shutdown
//! between ticks, never mid-tick.

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use breach_core::constants::TICK_RATE;
use breach_core::map::MapDef;
use breach_core::state::MatchSnapshot;
use breach_sim::engine::{MatchEngine, SimConfig};

use crate::state::LoopCommand;

/// Nominal duration of one tick at 1x speed.
const TICK_DURATION: Duration = Duration::from_nanos(1_000_000_000 / TICK_RATE as u64);

/// Spawn the match loop in a new thread.
///
/// Returns the command sender, or the map/graph error that prevented
/// the engine from being built (fatal before any tick runs).
pub fn spawn_match_loop(
    map: MapDef,
    config: SimConfig,
    latest_snapshot: Arc<Mutex<Option<MatchSnapshot>>>,
) -> Result<mpsc::Sender<LoopCommand>, breach_core::map::MapError> {
    // Build eagerly so construction failures surface to the caller
    // instead of dying inside the thread.
    let engine = MatchEngine::new(map, config)?;

    let (cmd_tx, cmd_rx) = mpsc::channel::<LoopCommand>();

    std::thread::Builder::new()
        .name("breach-match-loop".into())
        .spawn(move || {
            run_match_loop(engine, cmd_rx, &latest_snapshot);
        })
        .expect("Failed to spawn match loop thread");

    Ok(cmd_tx)
}

/// The match loop. Runs until Shutdown or channel disconnect.
fn run_match_loop(
    mut engine: MatchEngine,
    cmd_rx: mpsc::Receiver<LoopCommand>,
    latest_snapshot: &Mutex<Option<MatchSnapshot>>,
) {
    log::info!("match loop running at {TICK_RATE}Hz");
    let mut next_tick_time = Instant::now();

    loop {
        // 1. Drain all pending commands
        loop {
            match cmd_rx.try_recv() {
                Ok(LoopCommand::Match(cmd)) => engine.queue_command(cmd),
                Ok(LoopCommand::Shutdown) => return,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => return,
            }
        }

        // 2. Advance one tick (the engine handles pause internally)
        let snapshot = engine.tick();

        // 3. Store the latest snapshot for synchronous polling
        if let Ok(mut lock) = latest_snapshot.lock() {
            *lock = Some(snapshot);
        }

        // 4. Sleep until the next tick, adjusting for the speed multiplier
        let time_scale = engine.time_scale();
        let effective_tick_duration = if time_scale > 0.001 {
            TICK_DURATION.div_f64(time_scale)
        } else {
            TICK_DURATION
        };

        next_tick_time += effective_tick_duration;
        let now = Instant::now();
        if next_tick_time > now {
            std::thread::sleep(next_tick_time - now);
        } else if now - next_tick_time > effective_tick_duration * 2 {
            // Too far behind — reset to avoid a catch-up spiral
            next_tick_time = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use breach_core::commands::MatchCommand;
    use breach_core::enums::MatchPhase;
    use breach_core::map::{MapDef, MapError};

    #[test]
    fn test_command_channel_round_trip() {
        let (tx, rx) = mpsc::channel::<LoopCommand>();

        tx.send(LoopCommand::Match(MatchCommand::StartMatch)).unwrap();
        tx.send(LoopCommand::Match(MatchCommand::Pause)).unwrap();
        tx.send(LoopCommand::Shutdown).unwrap();

        let mut commands = Vec::new();
        while let Ok(cmd) = rx.try_recv() {
            commands.push(cmd);
        }

        assert_eq!(commands.len(), 3);
        assert!(matches!(
            commands[0],
            LoopCommand::Match(MatchCommand::StartMatch)
        ));
        assert!(matches!(commands[1], LoopCommand::Match(MatchCommand::Pause)));
        assert!(matches!(commands[2], LoopCommand::Shutdown));
    }

    #[test]
    fn test_loop_produces_snapshots_and_stops() {
        let latest = Arc::new(Mutex::new(None));
        let tx = spawn_match_loop(
            MapDef::training_arena(),
            SimConfig {
                seed: 1,
                time_scale: 8.0,
                ..Default::default()
            },
            Arc::clone(&latest),
        )
        .unwrap();

        tx.send(LoopCommand::Match(MatchCommand::StartMatch)).unwrap();

        // Wait for the loop to publish a post-start snapshot.
        let mut saw_freeze = false;
        for _ in 0..200 {
            std::thread::sleep(Duration::from_millis(10));
            if let Some(snap) = latest.lock().unwrap().clone() {
                if snap.phase == MatchPhase::FreezeTime {
                    saw_freeze = true;
                    break;
                }
            }
        }
        assert!(saw_freeze, "loop should reach FreezeTime after StartMatch");

        tx.send(LoopCommand::Shutdown).unwrap();
    }

    #[test]
    fn test_bad_map_fails_before_any_tick() {
        let mut map = MapDef::training_arena();
        map.nodes[0].neighbors.push(9_999);

        let latest = Arc::new(Mutex::new(None));
        let result = spawn_match_loop(map, SimConfig::default(), latest);
        assert!(matches!(result, Err(MapError::DanglingNeighbor { .. })));
    }

    #[test]
    fn test_tick_duration_constant() {
        // 10Hz = 100ms per tick
        let expected_nanos = 1_000_000_000u64 / TICK_RATE as u64;
        assert_eq!(TICK_DURATION.as_nanos(), expected_nanos as u128);
    }
}
