//! Lineup tab reader: lineup events, the box-occupancy machine, and the
//! cross-checks between lineup codes and the penalties already recorded
//! by the penalty reader. Runs last of the tab readers for that reason.

use derby_json::{Event, GameRecord, PeriodId, Position, SkaterRef, TeamSide};

use crate::error::ParseError;
use crate::grid::GridSource;
use crate::parsers::{parse_jam_token, JamToken};
use crate::readers::box_rules::{BoxOccupancy, BoxRules, GlyphCtx};
use crate::readers::{cell_present, cell_text};
use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::Template;
use crate::warnings::{SkaterAt, WarningData};

const POSITIONS: [Position; 5] = [
    Position::Jammer,
    Position::Pivot,
    Position::Blocker,
    Position::Blocker,
    Position::Blocker,
];

pub(crate) struct LineupReader<'a, G: GridSource> {
    pub grid: &'a G,
    pub template: &'a Template,
    pub game: &'a mut GameRecord,
    pub errors: &'a mut ErrorSummary,
    pub warnings: &'a mut WarningData,
    pub rules: BoxRules,
    occupancy: BoxOccupancy,
}

impl<'a, G: GridSource> LineupReader<'a, G> {
    pub fn new(
        grid: &'a G,
        template: &'a Template,
        game: &'a mut GameRecord,
        errors: &'a mut ErrorSummary,
        warnings: &'a mut WarningData,
        rules: BoxRules,
    ) -> Self {
        LineupReader {
            grid,
            template,
            game,
            errors,
            warnings,
            rules,
            // Fresh per run; never survives a document.
            occupancy: BoxOccupancy::new(),
        }
    }

    pub fn read(mut self) -> Result<(), ParseError> {
        for period in PeriodId::BOTH {
            for team in TeamSide::BOTH {
                self.read_block(period, team)?;
            }
        }
        Ok(())
    }

    fn read_block(&mut self, period: PeriodId, team: TeamSide) -> Result<(), ParseError> {
        let block = self.template.lineups.block(period, team).clone();
        let sheet = self.template.lineups.sheet_name.clone();
        let slot_width = self.template.lineups.box_codes + 1;
        let box_codes = self.template.lineups.box_codes;
        let rules = self.rules;
        log::debug!("lineup tab: period {period}, {team}");

        let mut jam: u32 = 0;
        // Skaters listed on the jam's base line; star-pass lines don't
        // contribute.
        let mut listed: Vec<SkaterRef> = Vec::new();

        for row in 0..self.template.lineups.max_jams {
            let jam_addr = block.first_jam_number.down(row);
            let Some(jam_text) = cell_text(self.grid, &sheet, jam_addr) else {
                // A blank jam cell skips the line but not the block.
                continue;
            };
            let token =
                parse_jam_token(&jam_text).ok_or_else(|| ParseError::InvalidJamNumber {
                    sheet: sheet.clone(),
                    cell: jam_addr.to_string(),
                    token: jam_text.clone(),
                })?;
            let no_pivot = cell_present(self.grid, &sheet, block.first_no_pivot.down(row));
            let star_pass = matches!(token, JamToken::StarPass { .. });

            match token {
                JamToken::StarPass { own } => {
                    if jam == 0 {
                        return Err(ParseError::StarPassOnFirstRow {
                            sheet,
                            cell: jam_addr.to_string(),
                        });
                    }
                    if !own {
                        // The opposing team's pass; nothing should be
                        // written here.
                        let any_skater = (0..POSITIONS.len() as u32).any(|slot| {
                            let addr = block.first_jammer.down(row).right(slot * slot_width);
                            cell_text(self.grid, &sheet, addr).is_some()
                        });
                        if any_skater {
                            self.errors
                                .record(RuleKey::SpStarSkater, Diagnostic::at(team, period, jam));
                        }
                        continue;
                    }
                    if !no_pivot {
                        self.errors.record(
                            RuleKey::StarPassNoPivot,
                            Diagnostic::at(team, period, jam),
                        );
                    }
                }
                JamToken::Number(n) => {
                    jam = n;
                    listed.clear();
                    // The score reader normally created this jam already;
                    // a lineup-only jam still gets a placeholder.
                    self.game.period_mut(period).ensure_jam(jam);
                }
            }

            let this_jam_penalties = self.team_penalties(period, jam, team);
            let prior_jam_penalties = self.prior_jam_penalties(period, jam, team);
            let mut row_events: Vec<Event> = Vec::new();

            for slot in 0..POSITIONS.len() as u32 {
                let skater_addr = block.first_jammer.down(row).right(slot * slot_width);
                let number = match cell_text(self.grid, &sheet, skater_addr) {
                    None => {
                        // Skating short is fine if somebody said why.
                        if !self.grid.has_comment(&sheet, skater_addr) {
                            self.errors.record(
                                RuleKey::EmptyLineupNoComment,
                                Diagnostic::at(team, period, jam)
                                    .detail(format!("Column: {}", slot + 1)),
                            );
                        }
                        continue;
                    }
                    Some(n) if n == "?" || n.eq_ignore_ascii_case("n/a") => continue,
                    Some(n) => n,
                };

                let skater = SkaterRef::new(team, number.clone());

                if !self.game.roster_has(team, &number) {
                    self.errors.record(
                        RuleKey::LineupsNotOnIgrf,
                        Diagnostic::at(team, period, jam).skater(&number),
                    );
                }
                if !star_pass {
                    if listed.contains(&skater) {
                        self.errors.record(
                            RuleKey::SamePlayerTwice,
                            Diagnostic::at(team, period, jam).skater(&number),
                        );
                    }
                    listed.push(skater.clone());

                    let position = if slot == 1 && no_pivot {
                        Position::Blocker
                    } else {
                        POSITIONS[slot as usize]
                    };
                    row_events.push(Event::Lineup {
                        skater: skater.clone(),
                        position,
                    });
                }

                let mut saw_code = false;
                for code in 1..=box_codes {
                    let Some(glyph) = cell_text(self.grid, &sheet, skater_addr.right(code))
                    else {
                        continue;
                    };
                    saw_code = true;
                    let fouled_out_before =
                        self.warnings.fouled_out_before(&skater, period, jam);
                    let mut ctx = GlyphCtx {
                        skater: &skater,
                        period,
                        jam,
                        penalty_here: this_jam_penalties.contains(&skater),
                        penalty_prior: prior_jam_penalties.contains(&skater),
                        fouled_out_before,
                        occupancy: &mut self.occupancy,
                        events: &mut row_events,
                        errors: &mut *self.errors,
                        warnings: &mut *self.warnings,
                    };
                    rules.apply(&glyph, &mut ctx);
                }

                // Seated according to the model, but no code on this line
                // at all: the exit went unrecorded. Drop the skater from
                // the model so the mistake is reported once.
                if !saw_code && self.occupancy.contains(&skater) {
                    self.errors.record(
                        RuleKey::SeatedNoCode,
                        Diagnostic::for_skater(&skater, period, jam),
                    );
                    self.warnings
                        .no_exits
                        .push(SkaterAt::new(skater.clone(), period, jam));
                    self.occupancy.unseat(&skater);
                }
            }

            // Foul-outs and expulsions recorded for this jam clear the
            // skater out of the box regardless of glyph history.
            let forced_out: Vec<SkaterRef> = self
                .warnings
                .foulouts
                .iter()
                .chain(self.warnings.expulsions.iter())
                .filter(|at| at.period == period && at.jam == jam && at.team() == team)
                .map(|at| at.skater.clone())
                .collect();
            for skater in forced_out {
                self.occupancy.unseat(&skater);
            }

            // Anyone still seated who never appeared in the five slots.
            let seated: Vec<SkaterRef> = self.occupancy.seated(team).to_vec();
            for skater in seated {
                if !listed.contains(&skater) {
                    self.errors.record(
                        RuleKey::SeatedNotLinedUp,
                        Diagnostic::for_skater(&skater, period, jam),
                    );
                    self.warnings
                        .no_exits
                        .push(SkaterAt::new(skater.clone(), period, jam));
                }
            }

            // Penalties in this jam for skaters missing from the lineup.
            for skater in &this_jam_penalties {
                if !listed.contains(skater) {
                    self.errors.record(
                        RuleKey::PenaltyNoLineup,
                        Diagnostic::for_skater(skater, period, jam),
                    );
                }
            }

            self.game
                .period_mut(period)
                .ensure_jam(jam)
                .events
                .extend(row_events);
        }

        Ok(())
    }

    fn team_penalties(&self, period: PeriodId, jam: u32, team: TeamSide) -> Vec<SkaterRef> {
        self.game
            .period(period)
            .jam(jam)
            .map(|j| {
                j.penalty_skaters()
                    .filter(|s| s.team == team)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Penalties in the immediately preceding jam; period 2 jam 1 wraps
    /// back to period 1's final jam.
    fn prior_jam_penalties(&self, period: PeriodId, jam: u32, team: TeamSide) -> Vec<SkaterRef> {
        if jam > 1 {
            self.team_penalties(period, jam - 1, team)
        } else if let Some(prior) = period.prior() {
            let last = self.game.period(prior).jam_count();
            self.team_penalties(prior, last, team)
        } else {
            Vec::new()
        }
    }
}
