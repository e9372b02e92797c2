//! Penalty tab reader: penalty and expulsion events, cumulative
//! per-skater penalty counts, and the foul-out bookkeeping the lineup
//! reader and aggregator consume.

use std::collections::{HashMap, HashSet};

use derby_json::{Event, GameRecord, Note, PeriodId, SkaterRef, TeamSide};

use crate::grid::GridSource;
use crate::readers::cell_text;
use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::{PenaltyBlock, Template};
use crate::warnings::{SkaterAt, WarningData};

pub(crate) struct PenaltyReader<'a, G: GridSource> {
    pub grid: &'a G,
    pub template: &'a Template,
    pub game: &'a mut GameRecord,
    pub errors: &'a mut ErrorSummary,
    pub warnings: &'a mut WarningData,
    /// Cumulative penalty counts, carried across periods.
    penalty_counts: HashMap<SkaterRef, u32>,
    foul_outs: HashSet<SkaterRef>,
}

impl<'a, G: GridSource> PenaltyReader<'a, G> {
    pub fn new(
        grid: &'a G,
        template: &'a Template,
        game: &'a mut GameRecord,
        errors: &'a mut ErrorSummary,
        warnings: &'a mut WarningData,
    ) -> Self {
        PenaltyReader {
            grid,
            template,
            game,
            errors,
            warnings,
            penalty_counts: HashMap::new(),
            foul_outs: HashSet::new(),
        }
    }

    pub fn read(mut self) {
        for period in PeriodId::BOTH {
            for team in TeamSide::BOTH {
                self.read_block(period, team);
            }
        }
    }

    fn read_block(&mut self, period: PeriodId, team: TeamSide) {
        let block = self.template.penalties.block(period, team).clone();
        let sheet = self.template.penalties.sheet_name.clone();
        let max_penalties = self.template.penalties.max_penalties;
        let max_num = self.template.teams.side(team).max_num;
        let jam_count = self.game.period(period).jam_count();
        log::debug!("penalty tab: period {period}, {team}");

        for index in 0..max_num {
            // Each skater occupies two grid rows: codes above, jams below.
            let row = index * 2;
            let Some(number) = cell_text(self.grid, &sheet, block.first_number.down(row)) else {
                continue;
            };

            if !self.game.roster_has(team, &number) {
                self.errors.record(
                    RuleKey::PenaltiesNotOnIgrf,
                    Diagnostic::new().team(team).period(period).skater(&number),
                );
            }

            let skater = SkaterRef::new(team, number.clone());
            self.penalty_counts.entry(skater.clone()).or_insert(0);

            for col in 0..max_penalties {
                let code = cell_text(self.grid, &sheet, block.first_penalty.down(row).right(col));
                let jam_text = cell_text(self.grid, &sheet, block.first_jam.down(row).right(col));

                let (code, jam_text) = match (code, jam_text) {
                    (None, None) => continue,
                    (Some(code), Some(jam_text)) => (code, jam_text),
                    _ => {
                        self.errors.record(
                            RuleKey::CodeNoJam,
                            Diagnostic::new().team(team).period(period).skater(&number),
                        );
                        continue;
                    }
                };

                let Some(jam) = parse_recorded_jam(&jam_text, jam_count) else {
                    self.errors.record(
                        RuleKey::PenaltyBadJam,
                        Diagnostic::new()
                            .team(team)
                            .period(period)
                            .skater(&number)
                            .detail(format!("Recorded Jam: {jam_text}")),
                    );
                    continue;
                };

                self.game
                    .period_mut(period)
                    .jam_mut(jam)
                    .expect("jam validated against jam count")
                    .events
                    .push(Event::Penalty {
                        skater: skater.clone(),
                        penalty: code,
                    });
                *self.penalty_counts.get_mut(&skater).expect("counter initialized") += 1;
            }

            self.foul_out_cells(&block, &sheet, row, period, team, &skater, jam_count);
        }

        self.bench_expulsions(&block, &sheet, period, jam_count);
    }

    #[allow(clippy::too_many_arguments)]
    fn foul_out_cells(
        &mut self,
        block: &PenaltyBlock,
        sheet: &str,
        row: u32,
        period: PeriodId,
        team: TeamSide,
        skater: &SkaterRef,
        jam_count: u32,
    ) {
        let code = cell_text(self.grid, sheet, block.first_fo.down(row));
        let jam_text = cell_text(self.grid, sheet, block.first_fo_jam.down(row));
        let count = self.penalty_counts[skater];

        let (code, jam_text) = match (code, jam_text) {
            (Some(code), Some(jam_text)) => (code, jam_text),
            (code, jam_text) => {
                if code.is_some() || jam_text.is_some() {
                    self.errors.record(
                        RuleKey::CodeNoJam,
                        Diagnostic::new()
                            .team(team)
                            .period(period)
                            .skater(&skater.number),
                    );
                }
                // A skater can also sit at seven-plus penalties with the
                // foul-out cells untouched; flag that once period 2 is in.
                if period == PeriodId::Two && !self.foul_outs.contains(skater) && count >= 7 {
                    self.errors.record(
                        RuleKey::SevenWithoutFo,
                        Diagnostic::new().team(team).skater(&skater.number),
                    );
                }
                return;
            }
        };

        let Some(jam) = parse_recorded_jam(&jam_text, jam_count) else {
            self.errors.record(
                RuleKey::FoBadJam,
                Diagnostic::new()
                    .team(team)
                    .period(period)
                    .skater(&skater.number)
                    .detail(format!("Recorded Jam: {jam_text}")),
            );
            return;
        };

        if code == "FO" {
            self.foul_outs.insert(skater.clone());
            self.warnings
                .foulouts
                .push(SkaterAt::new(skater.clone(), period, jam));

            if count < 7 {
                self.errors.record(
                    RuleKey::FoUnder7,
                    Diagnostic::new()
                        .team(team)
                        .period(period)
                        .skater(&skater.number),
                );
            }
        } else {
            // derbyJSON has no foul-out concept, so only expulsions make
            // it into the game record.
            let target = self
                .game
                .period_mut(period)
                .jam_mut(jam)
                .expect("jam validated against jam count");
            target.events.push(Event::Expulsion {
                skater: Some(skater.clone()),
                notes: vec![
                    Note::new(format!("Penalty: {code}")),
                    Note::new(format!("Jam: {jam}")),
                ],
            });
            let has_penalty = target.has_penalty_for(skater);
            self.warnings
                .expulsions
                .push(SkaterAt::new(skater.clone(), period, jam));

            if !has_penalty {
                self.errors.record(
                    RuleKey::ExpulsionNoPenalty,
                    Diagnostic::for_skater(skater, period, jam),
                );
            }
        }
    }

    /// Up to two team-level expulsion pairs per period; these carry no
    /// skater.
    fn bench_expulsions(
        &mut self,
        block: &PenaltyBlock,
        sheet: &str,
        period: PeriodId,
        jam_count: u32,
    ) {
        for col in 0..2 {
            let code = cell_text(self.grid, sheet, block.bench_exp_code.right(col));
            let jam_text = cell_text(self.grid, sheet, block.bench_exp_jam.right(col));
            let (Some(code), Some(jam_text)) = (code, jam_text) else { continue };

            let Some(jam) = parse_recorded_jam(&jam_text, jam_count) else {
                continue;
            };

            self.game
                .period_mut(period)
                .jam_mut(jam)
                .expect("jam validated against jam count")
                .events
                .push(Event::Expulsion {
                    skater: None,
                    notes: vec![
                        Note::new(format!("Bench Staff Expulsion: {code}")),
                        Note::new(format!("Jam: {jam}")),
                    ],
                });
        }
    }
}

/// A recorded jam number must be an integer within the period's jams.
fn parse_recorded_jam(text: &str, jam_count: u32) -> Option<u32> {
    let jam: u32 = text.parse().ok()?;
    (1..=jam_count).contains(&jam).then_some(jam)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_jams_must_exist() {
        assert_eq!(parse_recorded_jam("3", 10), Some(3));
        assert_eq!(parse_recorded_jam("10", 10), Some(10));
        assert_eq!(parse_recorded_jam("11", 10), None);
        assert_eq!(parse_recorded_jam("0", 10), None);
        assert_eq!(parse_recorded_jam("3.5", 10), None);
        assert_eq!(parse_recorded_jam("next", 10), None);
    }
}
