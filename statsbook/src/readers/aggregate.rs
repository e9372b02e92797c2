//! Post-pass checks over the assembled game record, plus the
//! substitution heuristic that consumes the warning lists the readers
//! queued up.

use derby_json::{GameRecord, PeriodId, SkaterRef};
use itertools::Itertools;

use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::warnings::{SkaterAt, WarningData};

pub(crate) struct Aggregator<'a> {
    pub game: &'a GameRecord,
    pub errors: &'a mut ErrorSummary,
    pub warnings: &'a mut WarningData,
}

impl Aggregator<'_> {
    pub fn run(mut self) {
        self.box_entry_checks();
        self.substitution_pass();
        self.lost_without_penalty();
        self.injury_without_three();
    }

    /// Every penalty needs a box entry in its own jam or the next one;
    /// the final jam of the game has no next jam and only warns.
    fn box_entry_checks(&mut self) {
        for period in PeriodId::BOTH {
            let jam_count = self.game.period(period).jam_count();
            for number in 1..=jam_count {
                let jam = self.game.period(period).jam(number).expect("jam exists");

                let next_jam = if number == jam_count {
                    period.next().and_then(|next| self.game.period(next).jam(1))
                } else {
                    self.game.period(period).jam(number + 1)
                };

                let penalized: Vec<SkaterRef> = jam.penalty_skaters().cloned().collect();
                for skater in &penalized {
                    let entered = jam.box_entries().any(|s| s == skater)
                        || next_jam
                            .map(|j| j.box_entries().any(|s| s == skater))
                            .unwrap_or(false);
                    if entered {
                        continue;
                    }

                    let diag = Diagnostic::for_skater(skater, period, number);
                    if period == PeriodId::Two && number == jam_count {
                        self.errors.record(RuleKey::LastJamNoEntry, diag);
                    } else {
                        self.errors.record(RuleKey::PenaltyNoEntry, diag);
                    }
                    self.warnings
                        .no_entries
                        .push(SkaterAt::new(skater.clone(), period, number));
                }

                if let Some(lead) = jam.first_lead() {
                    if jam.has_penalty_for(lead) && !jam.has_lost_for(lead) {
                        self.errors.record(
                            RuleKey::LeadPenaltyNotLost,
                            Diagnostic::for_skater(lead, period, number),
                        );
                    }
                }
            }
        }
    }

    /// Correlates entries-without-penalty against penalties-without-exit
    /// in adjacent jams to guess at unrecorded box substitutions.
    fn substitution_pass(&mut self) {
        let p1_len = self.game.periods.one.jam_count();
        let mut found: Vec<Diagnostic> = Vec::new();

        for bs in &self.warnings.bad_starts {
            let matched = self.warnings.no_entries.iter().any(|ne| {
                ne.team() == bs.team()
                    && ((ne.period == bs.period && ne.jam + 1 == bs.jam)
                        || (Some(ne.period) == bs.period.prior()
                            && bs.jam == 1
                            && ne.jam == p1_len))
            });
            if matched {
                found.push(possible_sub(bs, p1_len));
            }
        }

        for bc in &self.warnings.bad_continues {
            let same_jam_no_exit = self.warnings.no_exits.iter().any(|ne| {
                ne.team() == bc.team() && ne.period == bc.period && ne.jam == bc.jam
            });
            if same_jam_no_exit {
                found.push(possible_sub(bc, p1_len));
            }

            for removed in [&self.warnings.foulouts, &self.warnings.expulsions] {
                let prior_jam_removal = removed.iter().any(|at| {
                    at.team() == bc.team()
                        && ((at.period == bc.period && at.jam + 1 == bc.jam)
                            || (bc.period == PeriodId::Two
                                && bc.jam == 1
                                && at.period == PeriodId::One
                                && at.jam == p1_len))
                });
                if prior_jam_removal {
                    found.push(possible_sub(bc, p1_len));
                }
            }
        }

        for diag in found {
            self.errors.record(RuleKey::PossibleSub, diag);
        }
    }

    fn lost_without_penalty(&mut self) {
        for at in &self.warnings.lost {
            let penalized = self
                .game
                .period(at.period)
                .jam(at.jam)
                .map(|jam| jam.has_penalty_for(&at.skater))
                .unwrap_or(false);
            if !penalized {
                self.errors.record(
                    RuleKey::LostNoPenalty,
                    Diagnostic::for_skater(&at.skater, at.period, at.jam),
                );
            }
        }
    }

    /// Both teams queue the injury mark independently; de-duplicate to
    /// one report per (period, jam).
    fn injury_without_three(&mut self) {
        let missing: Vec<(PeriodId, u32)> = self
            .warnings
            .jams_called_injury
            .iter()
            .filter(|inj| {
                !self
                    .warnings
                    .lineup_three
                    .iter()
                    .any(|three| three.period == inj.period && three.jam == inj.jam)
            })
            .map(|inj| (inj.period, inj.jam))
            .unique()
            .collect();

        for (period, jam) in missing {
            self.errors.record(
                RuleKey::InjNoThree,
                Diagnostic::new().period(period).jam(jam),
            );
        }
    }
}

/// One combined warning per correlated pair. A pair straddling the
/// period break names both jams explicitly.
fn possible_sub(at: &SkaterAt, p1_len: u32) -> Diagnostic {
    if at.jam != 1 {
        Diagnostic::new()
            .team(at.team())
            .period(at.period)
            .detail(format!("Jams: {} & {}", at.jam - 1, at.jam))
    } else {
        Diagnostic::new().team(at.team()).detail(format!(
            "Period: 1, Jam: {p1_len} & Period: 2, Jam: {}",
            at.jam
        ))
    }
}
