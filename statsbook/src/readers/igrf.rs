//! IGRF reader: bout metadata, venue, the two rosters, and the
//! officials list. Runs first; every other reader checks numbers against
//! the rosters it builds.

use chrono::{Duration, NaiveDate, NaiveTime};
use derby_json::{Certification, GameRecord, Official, Person, Team, TeamSide};

use crate::grid::GridSource;
use crate::readers::cell_text;
use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::{TeamCfg, Template};

pub(crate) struct IgrfReader<'a, G: GridSource> {
    pub grid: &'a G,
    pub template: &'a Template,
    pub game: &'a mut GameRecord,
    pub errors: &'a mut ErrorSummary,
}

impl<G: GridSource> IgrfReader<'_, G> {
    pub fn read(&mut self) {
        self.game_details();
        for side in TeamSide::BOTH {
            self.team(side);
        }
        self.officials();
    }

    fn game_details(&mut self) {
        let venue = &self.template.venue;
        self.game.venue.name = self.expected(venue.name, "Venue Name");
        self.game.venue.city = self.expected(venue.city, "Venue City");
        self.game.venue.state = self.expected(venue.state, "Venue State");

        let date = self.expected(self.template.date, "Date");
        let time = self.expected(self.template.time, "Time");
        self.game.date = date.as_deref().and_then(date_from_serial);
        self.game.time = time.as_deref().and_then(time_from_serial);
    }

    fn team(&mut self, side: TeamSide) {
        let cfg: &TeamCfg = self.template.teams.side(side);
        let sheet = &self.template.main_sheet;

        let mut team = Team {
            league: cell_text(self.grid, sheet, cfg.league),
            name: cell_text(self.grid, sheet, cfg.name),
            color: cell_text(self.grid, sheet, cfg.color),
            persons: Vec::new(),
        };

        if team.color.is_none() {
            self.errors.record(
                RuleKey::MissingData,
                Diagnostic::new().detail(format!("Missing color for {} team.", side.label())),
            );
        }

        for row in 0..cfg.max_num {
            let number = cell_text(self.grid, sheet, cfg.first_number.down(row));
            let Some(number) = number else { continue };
            let name = cell_text(self.grid, sheet, cfg.first_name.down(row));
            team.persons.push(Person { name, number });
        }

        log::debug!("{} roster: {} skaters", side, team.persons.len());
        match side {
            TeamSide::Home => self.game.teams.home = Some(team),
            TeamSide::Away => self.game.teams.away = Some(team),
        }
    }

    fn officials(&mut self) {
        let cfg = &self.template.teams.officials;
        let sheet = &self.template.main_sheet;

        for row in 0..cfg.max_num {
            let name = cell_text(self.grid, sheet, cfg.first_name.down(row));
            let role = cell_text(self.grid, sheet, cfg.first_role.down(row));
            let (Some(name), Some(role)) = (name, role) else { continue };

            let league = cell_text(self.grid, sheet, cfg.first_league.down(row));
            let certifications = cell_text(self.grid, sheet, cfg.first_cert.down(row))
                .map(|level| vec![Certification { level }])
                .unwrap_or_default();

            self.game.teams.officials.persons.push(Official {
                name,
                roles: vec![role],
                league,
                certifications,
            });
        }
    }

    /// Value at an address, with a missing-data warning naming the field
    /// when it is blank.
    fn expected(&mut self, addr: crate::grid::CellAddr, long_name: &str) -> Option<String> {
        let value = cell_text(self.grid, &self.template.main_sheet, addr);
        if value.is_none() {
            self.errors
                .record(RuleKey::MissingData, Diagnostic::new().detail(long_name));
        }
        value
    }
}

/// Excel date serials count days from 1899-12-30.
fn date_from_serial(text: &str) -> Option<NaiveDate> {
    let serial: f64 = text.parse().ok()?;
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Excel time serials are a fraction of a day.
fn time_from_serial(text: &str) -> Option<NaiveTime> {
    let serial: f64 = text.parse().ok()?;
    let seconds = ((serial * 86400.0).round() as i64).rem_euclid(86400) as u32;
    NaiveTime::from_num_seconds_from_midnight_opt(seconds, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excel_date_serials() {
        // 2019-03-16 is serial 43540.
        assert_eq!(
            date_from_serial("43540"),
            NaiveDate::from_ymd_opt(2019, 3, 16)
        );
        assert_eq!(date_from_serial("not a date"), None);
    }

    #[test]
    fn excel_time_serials() {
        assert_eq!(
            time_from_serial("0.75"),
            NaiveTime::from_hms_opt(18, 0, 0)
        );
        assert_eq!(
            time_from_serial("0.5208333333333334"),
            NaiveTime::from_hms_opt(12, 30, 0)
        );
    }
}
