//! The box-occupancy state machine: per-team set of skaters currently
//! serving, plus the two glyph alphabets that drive it. The alphabet is
//! picked once per run and every glyph goes through [`BoxRules::apply`];
//! no other code interprets box codes.

use derby_json::{Event, PeriodId, SkaterRef, TeamSide};

use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::SchemaVersion;
use crate::warnings::{SkaterAt, WarningData};

/// Note attached to box entries recorded with a between-jams code.
pub const SAT_BETWEEN_JAMS: &str = "Sat between jams.";

/// Skaters currently seated in the penalty box, per team. Fresh per run;
/// carries across periods within a run. A skater is present only between
/// an unmatched enter transition and the exit or removal that clears it.
#[derive(Debug, Default)]
pub struct BoxOccupancy {
    home: Vec<SkaterRef>,
    away: Vec<SkaterRef>,
}

impl BoxOccupancy {
    pub fn new() -> Self {
        BoxOccupancy::default()
    }

    fn list(&self, team: TeamSide) -> &Vec<SkaterRef> {
        match team {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    fn list_mut(&mut self, team: TeamSide) -> &mut Vec<SkaterRef> {
        match team {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    pub fn contains(&self, skater: &SkaterRef) -> bool {
        self.list(skater.team).contains(skater)
    }

    pub fn seat(&mut self, skater: &SkaterRef) {
        if !self.contains(skater) {
            self.list_mut(skater.team).push(skater.clone());
        }
    }

    /// Remove the skater if seated; reports whether anything changed.
    pub fn unseat(&mut self, skater: &SkaterRef) -> bool {
        let list = self.list_mut(skater.team);
        match list.iter().position(|s| s == skater) {
            Some(idx) => {
                list.remove(idx);
                true
            }
            None => false,
        }
    }

    /// Seated skaters for one team, in seating order.
    pub fn seated(&self, team: TeamSide) -> &[SkaterRef] {
        self.list(team)
    }
}

/// Everything one glyph application may read or touch. Built by the
/// lineup reader per (skater, glyph); the penalty flags are precomputed
/// because the game record cannot be borrowed while events are queued.
pub(crate) struct GlyphCtx<'a> {
    pub skater: &'a SkaterRef,
    pub period: PeriodId,
    pub jam: u32,
    /// The skater has a penalty recorded in the current jam.
    pub penalty_here: bool,
    /// The skater has a penalty in the immediately preceding jam
    /// (period 2 jam 1 wraps back to period 1's last jam).
    pub penalty_prior: bool,
    pub fouled_out_before: bool,
    pub occupancy: &'a mut BoxOccupancy,
    /// Events queued for the current jam, appended after the line scan.
    pub events: &'a mut Vec<Event>,
    pub errors: &'a mut ErrorSummary,
    pub warnings: &'a mut WarningData,
}

impl GlyphCtx<'_> {
    fn diag(&self) -> Diagnostic {
        Diagnostic::for_skater(self.skater, self.period, self.jam)
    }

    fn enter(&mut self, sat_between: bool) {
        self.events.push(Event::EnterBox {
            skater: self.skater.clone(),
            note: sat_between.then(|| SAT_BETWEEN_JAMS.to_string()),
        });
    }

    fn exit(&mut self) {
        self.events.push(Event::ExitBox {
            skater: self.skater.clone(),
        });
    }

    fn error(&mut self, rule: RuleKey) {
        let diag = self.diag();
        self.errors.record(rule, diag);
    }

    fn sighting(&self) -> SkaterAt {
        SkaterAt::new(self.skater.clone(), self.period, self.jam)
    }

    fn queue_bad_start(&mut self) {
        let at = self.sighting();
        self.warnings.bad_starts.push(at);
    }

    fn queue_bad_continue(&mut self) {
        let at = self.sighting();
        self.warnings.bad_continues.push(at);
    }
}

/// Glyph alphabet for the detected schema version, chosen once per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxRules {
    /// 2017/2018 codes: `/ x s $ i | 3` plus the deprecated rune.
    Codes2018,
    /// 2019 codes: `- + s $ 3`.
    Codes2019,
}

impl BoxRules {
    pub fn for_version(version: SchemaVersion) -> BoxRules {
        match version {
            SchemaVersion::V2019 => BoxRules::Codes2019,
            SchemaVersion::V2017 | SchemaVersion::V2018 => BoxRules::Codes2018,
        }
    }

    pub(crate) fn apply(&self, glyph: &str, ctx: &mut GlyphCtx<'_>) {
        let lower = glyph.to_lowercase();
        match self {
            BoxRules::Codes2018 => apply_2018(&lower, glyph, ctx),
            BoxRules::Codes2019 => apply_2019(&lower, glyph, ctx),
        }
    }
}

fn apply_2018(lower: &str, raw: &str, ctx: &mut GlyphCtx<'_>) {
    match lower {
        "/" => {
            ctx.enter(false);
            ctx.occupancy.seat(ctx.skater);
            if !ctx.penalty_here {
                ctx.error(RuleKey::SlashNoPenalty);
            }
        }
        // The rune reads as an X but gets its own flag.
        "\u{16be}" => {
            ctx.error(RuleKey::RuneUsed);
            apply_x_2018(ctx);
        }
        "x" => apply_x_2018(ctx),
        "s" => {
            ctx.enter(true);
            if ctx.occupancy.contains(ctx.skater) {
                ctx.error(RuleKey::StartsWhileThere);
            } else {
                ctx.occupancy.seat(ctx.skater);
            }
            if !ctx.penalty_here && !ctx.penalty_prior {
                ctx.error(RuleKey::SNoPenalty);
                ctx.queue_bad_start();
            }
        }
        "$" => {
            ctx.enter(true);
            ctx.exit();
            if ctx.occupancy.contains(ctx.skater) {
                ctx.error(RuleKey::StartsWhileThere);
                ctx.occupancy.unseat(ctx.skater);
            }
            if !ctx.penalty_here && !ctx.penalty_prior {
                ctx.error(RuleKey::SSlashNoPenalty);
                ctx.queue_bad_start();
            }
        }
        "i" | "|" => {
            // Continuation only; no event either way.
            if !ctx.occupancy.contains(ctx.skater) {
                if ctx.fouled_out_before {
                    ctx.error(RuleKey::FoInBox);
                } else {
                    ctx.error(RuleKey::INotInBox);
                }
                ctx.queue_bad_continue();
            }
        }
        "3" => {
            let at = ctx.sighting();
            ctx.warnings.lineup_three.push(at);
        }
        _ => {
            let diag = ctx.diag().detail(format!("Code: {raw}"));
            ctx.errors.record(RuleKey::BadLineupCode, diag);
        }
    }
}

fn apply_x_2018(ctx: &mut GlyphCtx<'_>) {
    if !ctx.occupancy.contains(ctx.skater) {
        ctx.enter(false);
        if !ctx.penalty_here {
            ctx.error(RuleKey::XNoPenalty);
            ctx.queue_bad_continue();
        }
    }
    ctx.exit();
    ctx.occupancy.unseat(ctx.skater);
}

fn apply_2019(lower: &str, raw: &str, ctx: &mut GlyphCtx<'_>) {
    match lower {
        "-" => {
            ctx.enter(false);
            ctx.occupancy.seat(ctx.skater);
            if !ctx.penalty_here {
                ctx.error(RuleKey::DashNoPenalty);
            }
        }
        "+" => {
            ctx.enter(false);
            ctx.exit();
            if !ctx.penalty_here {
                ctx.error(RuleKey::PlusNoPenalty);
            }
        }
        "s" => {
            if ctx.fouled_out_before {
                ctx.error(RuleKey::FoInBox);
            }
            if !ctx.occupancy.contains(ctx.skater) {
                if !ctx.penalty_here && !ctx.penalty_prior {
                    ctx.error(RuleKey::SNoPenalty);
                    ctx.queue_bad_start();
                }
                ctx.enter(true);
                ctx.occupancy.seat(ctx.skater);
            }
        }
        "$" => {
            if ctx.fouled_out_before {
                ctx.error(RuleKey::FoInBox);
            }
            if ctx.occupancy.contains(ctx.skater) {
                ctx.exit();
                ctx.occupancy.unseat(ctx.skater);
            } else {
                if !ctx.penalty_here && !ctx.penalty_prior {
                    ctx.error(RuleKey::SSlashNoPenalty);
                    ctx.queue_bad_start();
                }
                ctx.enter(true);
                ctx.exit();
            }
        }
        "3" => {
            let at = ctx.sighting();
            ctx.warnings.lineup_three.push(at);
        }
        _ => {
            let diag = ctx.diag().detail(format!("Code: {raw}"));
            ctx.errors.record(RuleKey::BadLineupCode, diag);
        }
    }
}
