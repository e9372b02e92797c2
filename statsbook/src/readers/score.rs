//! Score tab reader: pass/lead/lost/call/injury/star-pass events plus
//! jam-sequence validation. This reader owns the jam skeleton — every
//! later reader resolves jam numbers against what it wrote.

use derby_json::{Event, GameRecord, PeriodId, SkaterRef, TeamSide};

use crate::error::ParseError;
use crate::grid::GridSource;
use crate::parsers::{parse_jam_token, parse_trip_cell, JamToken, TripCell};
use crate::readers::{cell_present, cell_text};
use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::Template;
use crate::warnings::{SkaterAt, TeamJam, WarningData};

pub(crate) struct ScoreReader<'a, G: GridSource> {
    pub grid: &'a G,
    pub template: &'a Template,
    pub game: &'a mut GameRecord,
    pub errors: &'a mut ErrorSummary,
    pub warnings: &'a mut WarningData,
    star_passes: Vec<(PeriodId, u32)>,
}

impl<'a, G: GridSource> ScoreReader<'a, G> {
    pub fn new(
        grid: &'a G,
        template: &'a Template,
        game: &'a mut GameRecord,
        errors: &'a mut ErrorSummary,
        warnings: &'a mut WarningData,
    ) -> Self {
        ScoreReader {
            grid,
            template,
            game,
            errors,
            warnings,
            star_passes: Vec::new(),
        }
    }

    pub fn read(mut self) -> Result<(), ParseError> {
        for period in PeriodId::BOTH {
            for team in TeamSide::BOTH {
                self.read_block(period, team)?;
            }
            self.period_checks(period);
        }
        self.pair_star_passes();
        Ok(())
    }

    fn read_block(&mut self, period: PeriodId, team: TeamSide) -> Result<(), ParseError> {
        let block = self.template.score.block(period, team).clone();
        let sheet = self.template.score.sheet_name.clone();
        let max_trips = block.last_trip.col - block.first_trip.col;
        log::debug!("score tab: period {period}, {team}");

        // Jam is the 1-based number of the current jam; 0 means no jam
        // seen yet. The trip counter is 1-based and survives star passes.
        let mut jam: u32 = 0;
        let mut trip: u32 = 1;
        let mut skater = SkaterRef::new(team, "");

        for row in 0..self.template.score.max_jams {
            let jam_addr = block.first_jam_number.down(row);
            let Some(jam_text) = cell_text(self.grid, &sheet, jam_addr) else {
                // Out of jams for this block.
                break;
            };
            let token =
                parse_jam_token(&jam_text).ok_or_else(|| ParseError::InvalidJamNumber {
                    sheet: sheet.clone(),
                    cell: jam_addr.to_string(),
                    token: jam_text.clone(),
                })?;

            let jammer_number = cell_text(self.grid, &sheet, block.first_jammer_number.down(row))
                .unwrap_or_default();
            let lost = cell_present(self.grid, &sheet, block.first_lost.down(row));
            let lead = cell_present(self.grid, &sheet, block.first_lead.down(row));
            let call = cell_present(self.grid, &sheet, block.first_call.down(row));
            let inj = cell_present(self.grid, &sheet, block.first_inj.down(row));
            let initial_completed = !cell_present(self.grid, &sheet, block.first_np.down(row));

            let star_pass = matches!(token, JamToken::StarPass { .. });
            let mut row_events: Vec<Event> = Vec::new();

            match token {
                JamToken::StarPass { own } => {
                    if jam == 0 {
                        return Err(ParseError::StarPassOnFirstRow {
                            sheet,
                            cell: jam_addr.to_string(),
                        });
                    }
                    if own {
                        // The pass belongs to the jammer who had the star.
                        row_events.push(Event::StarPass {
                            skater: skater.clone(),
                        });
                    }
                    self.star_passes.push((period, jam));
                }
                JamToken::Number(n) => {
                    if n != jam + 1 {
                        self.errors
                            .record(RuleKey::BadJamNumber, Diagnostic::at(team, period, n));
                    }
                    jam = n;
                    trip = 1;
                    // Materialize the jam now; skipped numbers become
                    // empty placeholders.
                    self.game.period_mut(period).ensure_jam(jam);
                }
            }

            if !jammer_number.is_empty() && !self.game.roster_has(team, &jammer_number) {
                self.errors.record(
                    RuleKey::ScoresNotOnIgrf,
                    Diagnostic::at(team, period, jam).skater(&jammer_number),
                );
            }

            match token {
                JamToken::Number(_) => {
                    skater = SkaterRef::new(team, jammer_number.clone());
                    row_events.push(initial_pass(&skater, team, initial_completed));
                }
                JamToken::StarPass { own: true } => {
                    skater = SkaterRef::new(team, jammer_number.clone());
                    // Only the first trip of the jam gets a second
                    // initial-pass object for the new jammer.
                    if trip == 1 {
                        row_events.push(initial_pass(&skater, team, initial_completed));
                    }
                }
                JamToken::StarPass { own: false } => {
                    if !jammer_number.is_empty() {
                        self.errors.record(
                            RuleKey::SpStarWithJammer,
                            Diagnostic::at(team, period, jam),
                        );
                    }
                }
            }

            let mut blank_trip = false;
            for offset in 0..max_trips {
                let t = offset + 2;
                let trip_addr = block.first_trip.down(row).right(offset);
                let Some(trip_text) = cell_text(self.grid, &sheet, trip_addr) else {
                    if initial_completed && t == 2 && !star_pass {
                        // Distinguish a genuinely scoreless line from one
                        // whose points moved to a star-pass line below.
                        let next_token = cell_text(self.grid, &sheet, jam_addr.down(1))
                            .and_then(|text| parse_jam_token(&text));
                        let diag =
                            Diagnostic::at(team, period, jam).skater(&jammer_number);
                        if next_token == Some(JamToken::StarPass { own: true }) {
                            self.errors.record(RuleKey::SpNoPointsNoNi, diag);
                        } else {
                            self.errors.record(RuleKey::NoPointsNoNi, diag);
                        }
                    }
                    blank_trip = true;
                    continue;
                };

                if t <= trip {
                    self.errors.record(
                        RuleKey::SpPointsBothJammers,
                        Diagnostic::at(team, period, jam),
                    );
                }
                if blank_trip && !star_pass {
                    blank_trip = false;
                    self.errors
                        .record(RuleKey::BlankTrip, Diagnostic::at(team, period, jam));
                }

                match parse_trip_cell(&trip_text) {
                    Some(TripCell::PointsNoPass(points)) => {
                        // Retroactive score for the initial trip; never a
                        // new trip event.
                        if let Some(score) = row_events.iter_mut().find_map(|e| match e {
                            Event::Pass {
                                number: 1,
                                score,
                                skater: s,
                                ..
                            } if *s == skater => Some(score),
                            _ => None,
                        }) {
                            *score = points;
                        }
                    }
                    Some(TripCell::Points(points)) => {
                        if !star_pass {
                            trip += 1;
                        }
                        row_events.push(Event::Pass {
                            number: t,
                            score: points,
                            skater: skater.clone(),
                            team,
                            completed: None,
                        });
                        if !initial_completed {
                            self.errors.record(
                                RuleKey::NpPoints,
                                Diagnostic::at(team, period, jam).skater(&jammer_number),
                            );
                        }
                    }
                    // Not a score at all; leave the cell alone.
                    None => {}
                }
            }

            if lost {
                row_events.push(Event::Lost {
                    skater: skater.clone(),
                });
                self.warnings
                    .lost
                    .push(SkaterAt::new(skater.clone(), period, jam));
            }
            if lead {
                row_events.push(Event::Lead {
                    skater: skater.clone(),
                });
            }
            if call {
                row_events.push(Event::Call {
                    skater: skater.clone(),
                });
            }
            if inj {
                self.warnings
                    .jams_called_injury
                    .push(TeamJam { team, period, jam });
            }

            if matches!(token, JamToken::StarPass { own: true }) && lead && !lost {
                self.errors
                    .record(RuleKey::SpLeadNoLost, Diagnostic::at(team, period, jam));
            }

            self.game
                .period_mut(period)
                .ensure_jam(jam)
                .events
                .extend(row_events);
        }

        Ok(())
    }

    /// Cross-team checks for one period, evaluated once after both teams'
    /// blocks so nothing is reported twice.
    fn period_checks(&mut self, period: PeriodId) {
        let jam_count = self.game.period(period).jam_count();

        for number in 1..=jam_count {
            let (lead_count, call_count, loose_trips) = {
                let jam = self.game.period(period).jam(number).expect("jam exists");
                let lead_count = jam
                    .events
                    .iter()
                    .filter(|e| matches!(e, Event::Lead { .. }))
                    .count();
                let call_count = jam
                    .events
                    .iter()
                    .filter(|e| matches!(e, Event::Call { .. }))
                    .count();
                // Per team: a scoring trip without a lost mark.
                let loose_trips: Vec<TeamSide> = TeamSide::BOTH
                    .into_iter()
                    .filter(|&side| {
                        let scored = jam.events.iter().any(|e| {
                            matches!(e, Event::Pass { team, number, .. }
                                if *team == side && *number > 1)
                        });
                        let lost = jam.events.iter().any(|e| {
                            matches!(e, Event::Lost { skater } if skater.team == side)
                        });
                        scored && !lost
                    })
                    .collect();
                (lead_count, call_count, loose_trips)
            };

            let jam_diag = Diagnostic::new().period(period).jam(number);
            if lead_count >= 2 {
                self.errors.record(RuleKey::TooManyLead, jam_diag.clone());
            }
            if call_count >= 2 {
                self.errors.record(RuleKey::TooManyCall, jam_diag.clone());
            }

            let injury_marks = self
                .warnings
                .jams_called_injury
                .iter()
                .filter(|i| i.period == period && i.jam == number)
                .count();
            if injury_marks == 1 {
                self.errors
                    .record(RuleKey::InjuryOnlyOnce, jam_diag.clone());
            }
            if injury_marks >= 1 {
                // Both teams' marks collapse into a single injury event.
                self.game
                    .period_mut(period)
                    .jam_mut(number)
                    .expect("jam exists")
                    .events
                    .push(Event::Injury);
            }

            if lead_count == 0 {
                for side in loose_trips {
                    self.errors.record(
                        RuleKey::PointsNoLeadNoLost,
                        Diagnostic::at(side, period, number),
                    );
                }
            }
        }
    }

    /// A star pass shows up as SP on one block and SP* on the other;
    /// a (period, jam) seen exactly once is missing its counterpart.
    fn pair_star_passes(&mut self) {
        for &(period, jam) in &self.star_passes {
            let count = self
                .star_passes
                .iter()
                .filter(|&&(p, j)| p == period && j == jam)
                .count();
            if count == 1 {
                self.errors.record(
                    RuleKey::OnlyOneStarPass,
                    Diagnostic::new().period(period).jam(jam),
                );
            }
        }
    }
}

fn initial_pass(skater: &SkaterRef, team: TeamSide, completed: bool) -> Event {
    Event::Pass {
        number: 1,
        score: 0,
        skater: skater.clone(),
        team,
        completed: Some(completed),
    }
}
