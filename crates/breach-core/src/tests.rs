#[cfg(test)]
mod tests {
    use crate::commands::{MatchCommand, TeamStrategy};
    use crate::enums::*;
    use crate::events::MatchEvent;
    use crate::state::MatchSnapshot;
    use crate::types::{AgentId, Position, SimTime, Velocity};

    /// Verify phase and reason enums round-trip through serde_json.
    #[test]
    fn test_match_phase_serde() {
        let variants = vec![
            MatchPhase::Warmup,
            MatchPhase::FreezeTime,
            MatchPhase::TacticsPause,
            MatchPhase::Live,
            MatchPhase::RoundEnd,
            MatchPhase::MatchEnd,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: MatchPhase = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_win_reason_serde() {
        let variants = vec![
            WinReason::Detonation,
            WinReason::Defusal,
            WinReason::DefendersEliminated,
            WinReason::AttackersEliminated,
            WinReason::TimeExpired,
        ];
        for v in variants {
            let json = serde_json::to_string(&v).unwrap();
            let back: WinReason = serde_json::from_str(&json).unwrap();
            assert_eq!(v, back);
        }
    }

    #[test]
    fn test_bomb_state_serde() {
        let variants = vec![
            BombState::Carried {
                carrier: AgentId(3),
            },
            BombState::Dropped {
                position: Position::new(10.0, 20.0),
            },
            BombState::Planting {
                planter: AgentId(1),
                site: 0,
                progress_ticks: 12,
            },
            BombState::Planted {
                site: 1,
                position: Position::new(850.0, 850.0),
                ticks_remaining: 400,
                ticks_since_plant: 0,
            },
            BombState::Defused,
            BombState::Detonated,
        ];
        for v in &variants {
            let json = serde_json::to_string(v).unwrap();
            let back: BombState = serde_json::from_str(&json).unwrap();
            assert_eq!(*v, back);
        }
    }

    #[test]
    fn test_bomb_state_predicates() {
        let planted = BombState::Planted {
            site: 0,
            position: Position::default(),
            ticks_remaining: 100,
            ticks_since_plant: 300,
        };
        assert!(planted.is_planted());
        assert!(!planted.is_resolved());
        assert!(BombState::Detonated.is_resolved());
        assert!(!BombState::Carried {
            carrier: AgentId(0)
        }
        .is_planted());
    }

    /// Verify MatchCommand round-trips through serde (tagged union).
    #[test]
    fn test_match_command_serde() {
        let commands = vec![
            MatchCommand::StartMatch,
            MatchCommand::Pause,
            MatchCommand::Resume,
            MatchCommand::SetTimeScale { scale: 4.0 },
            MatchCommand::ForceNextRound,
            MatchCommand::ResetMatch,
            MatchCommand::ApplyStrategies {
                strategies: [
                    TeamStrategy {
                        team: TeamId::Alpha,
                        goals: vec![(AgentId(0), Position::new(150.0, 850.0))],
                        loadouts: Vec::new(),
                    },
                    TeamStrategy {
                        team: TeamId::Bravo,
                        goals: Vec::new(),
                        loadouts: Vec::new(),
                    },
                ],
            },
        ];
        for cmd in &commands {
            let json = serde_json::to_string(cmd).unwrap();
            let back: MatchCommand = serde_json::from_str(&json).unwrap();
            assert_eq!(json, serde_json::to_string(&back).unwrap());
        }
    }

    /// Verify MatchEvent round-trips through serde.
    #[test]
    fn test_match_event_serde() {
        let events = vec![
            MatchEvent::Kill {
                killer: AgentId(2),
                victim: AgentId(7),
                weapon: WeaponKind::Rifle,
                headshot: true,
            },
            MatchEvent::BombPlanted { site: 1 },
            MatchEvent::RoundEnded {
                winner: TeamId::Bravo,
                side: Side::Defense,
                reason: WinReason::Defusal,
                end_tick: 900,
            },
            MatchEvent::SidesSwapped,
        ];
        for event in &events {
            let json = serde_json::to_string(event).unwrap();
            let back: MatchEvent = serde_json::from_str(&json).unwrap();
            assert_eq!(*event, back);
        }
    }

    /// Verify MatchSnapshot can be serialized to JSON.
    #[test]
    fn test_snapshot_serde() {
        let snapshot = MatchSnapshot::default();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: MatchSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(snapshot.time.tick, back.time.tick);
        assert_eq!(snapshot.phase, back.phase);
        assert!(
            json.len() < 1024,
            "Empty snapshot should be <1KB, was {} bytes",
            json.len()
        );
    }

    /// Verify Position geometry calculations.
    #[test]
    fn test_position_distance() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-10);
        assert!((a.distance_sq_to(&b) - 25.0).abs() < 1e-10);
    }

    #[test]
    fn test_position_lerp() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(10.0, 20.0);
        let mid = a.lerp(&b, 0.5);
        assert!((mid.x - 5.0).abs() < 1e-10);
        assert!((mid.y - 10.0).abs() < 1e-10);
    }

    #[test]
    fn test_velocity_speed() {
        let v = Velocity::new(3.0, 4.0);
        assert!((v.speed() - 5.0).abs() < 1e-10);
        assert_eq!(Velocity::zero().speed(), 0.0);
    }

    /// Verify SimTime advancement.
    #[test]
    fn test_sim_time_advance() {
        let mut time = SimTime::default();
        assert_eq!(time.tick, 0);

        for _ in 0..10 {
            time.advance();
        }
        assert_eq!(time.tick, 10);
        // 10 ticks at 10Hz = 1 second
        assert!((time.elapsed_secs - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_side_and_team_opponents() {
        assert_eq!(Side::Attack.opponent(), Side::Defense);
        assert_eq!(Side::Defense.opponent(), Side::Attack);
        assert_eq!(TeamId::Alpha.opponent(), TeamId::Bravo);
    }
}
