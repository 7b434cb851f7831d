//! Round and team bookkeeping: scores, economy, win threshold, history.
//!
//! Stored on `MatchEngine`, not as ECS entities.

use breach_core::constants::*;
use breach_core::enums::{BombState, Side, TeamId, WinReason};
use breach_core::state::{RoundRecord, RoundResult};
use breach_core::types::AgentId;

/// Persistent per-team state across rounds within a match.
#[derive(Debug, Clone)]
pub struct TeamState {
    pub team: TeamId,
    pub side: Side,
    pub score: u8,
    pub money: u32,
    /// Consecutive-loss bonus level, 0..=LOSS_BONUS_MAX_LEVEL.
    pub loss_bonus: u8,
}

impl TeamState {
    pub fn new(team: TeamId, side: Side) -> Self {
        Self {
            team,
            side,
            score: 0,
            money: START_MONEY,
            loss_bonus: 0,
        }
    }

    /// Pay the round-win reward. The loss streak ends.
    pub fn apply_win(&mut self) -> u32 {
        self.loss_bonus = 0;
        self.credit(WIN_REWARD);
        WIN_REWARD
    }

    /// Pay the consolation income at the current level, then escalate
    /// the level, saturating at the maximum.
    pub fn apply_loss(&mut self) -> u32 {
        let bonus = LOSS_BONUS_TABLE[self.loss_bonus as usize];
        self.credit(bonus);
        self.loss_bonus = (self.loss_bonus + 1).min(LOSS_BONUS_MAX_LEVEL);
        bonus
    }

    pub fn credit(&mut self, amount: u32) {
        self.money = (self.money + amount).min(TEAM_MONEY_CAP);
    }

    /// Fresh economy for a new half or overtime segment. The
    /// pistol-round special case: no carried loss streak.
    pub fn reset_economy(&mut self, money: u32) {
        self.money = money;
        self.loss_bonus = 0;
    }
}

/// Mutable round-scoped state plus the match-scoped history that
/// survives round resets.
#[derive(Debug, Clone)]
pub struct RoundState {
    /// 1-based round number.
    pub number: u8,
    pub bomb: BombState,
    pub win_threshold: u8,
    /// Set exactly once per round, when the win check first fires.
    pub decided: Option<(Side, WinReason)>,
    /// Whether the attacking team completed a plant this round.
    pub planted_this_round: bool,
    /// Append-only log of completed rounds.
    pub history: Vec<RoundRecord>,
    /// Result of the most recently completed round, for the buy logic.
    pub last_result: Option<RoundResult>,
    /// Winner of the match, once the threshold is reached.
    pub match_winner: Option<TeamId>,
}

impl RoundState {
    pub fn new() -> Self {
        Self {
            number: 1,
            bomb: BombState::Carried {
                carrier: AgentId(0),
            },
            win_threshold: REGULATION_WIN_THRESHOLD,
            decided: None,
            planted_this_round: false,
            history: Vec::new(),
            last_result: None,
            match_winner: None,
        }
    }

    /// Reset the round-scoped fields for a new round. History, the win
    /// threshold, and the match winner persist.
    pub fn begin_round(&mut self, bomb_carrier: AgentId) {
        self.bomb = BombState::Carried {
            carrier: bomb_carrier,
        };
        self.decided = None;
        self.planted_this_round = false;
    }
}

impl Default for RoundState {
    fn default() -> Self {
        Self::new()
    }
}
