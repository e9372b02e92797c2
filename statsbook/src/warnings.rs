//! Cross-reader correlation state. One [`WarningData`] is created per run,
//! owned by the orchestrator, passed by reference to every reader, and
//! discarded after the substitution-warning pass consumes it.

use derby_json::{PeriodId, SkaterRef, TeamSide};

/// A skater sighted at a specific (period, jam). The team is carried by
/// the skater reference.
#[derive(Debug, Clone, PartialEq)]
pub struct SkaterAt {
    pub skater: SkaterRef,
    pub period: PeriodId,
    pub jam: u32,
}

impl SkaterAt {
    pub fn new(skater: SkaterRef, period: PeriodId, jam: u32) -> Self {
        SkaterAt { skater, period, jam }
    }

    pub fn team(&self) -> TeamSide {
        self.skater.team
    }
}

/// A team-level mark at a specific (period, jam).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TeamJam {
    pub team: TeamSide,
    pub period: PeriodId,
    pub jam: u32,
}

/// Transient lists connecting rules across readers. Never serialized,
/// never kept across runs.
#[derive(Debug, Default)]
pub struct WarningData {
    /// Jammers marked lost, for the lost-without-penalty check.
    pub lost: Vec<SkaterAt>,
    /// Between-jams box entries with no matching penalty.
    pub bad_starts: Vec<SkaterAt>,
    /// Continuation or exit codes with no matching entry or penalty.
    pub bad_continues: Vec<SkaterAt>,
    /// Penalties that never got a box entry.
    pub no_entries: Vec<SkaterAt>,
    /// Seated skaters who never got a recorded exit.
    pub no_exits: Vec<SkaterAt>,
    pub foulouts: Vec<SkaterAt>,
    pub expulsions: Vec<SkaterAt>,
    /// Jams whose score line carries the injury mark, one entry per team.
    pub jams_called_injury: Vec<TeamJam>,
    /// Skaters marked `3` on the lineup sheet.
    pub lineup_three: Vec<SkaterAt>,
}

impl WarningData {
    pub fn new() -> Self {
        WarningData::default()
    }

    /// Whether `skater` fouled out strictly before (period, jam).
    pub fn fouled_out_before(&self, skater: &SkaterRef, period: PeriodId, jam: u32) -> bool {
        self.foulouts.iter().any(|fo| {
            fo.skater == *skater
                && ((fo.period == period && fo.jam < jam) || fo.period < period)
        })
    }
}
