//! Workbook fixture builder. Cells are placed through the loaded
//! coordinate template, so fixtures stay valid if a template changes.

// Each test binary uses a different slice of the builder.
#![allow(dead_code)]

use derby_json::{PeriodId, TeamSide};
use statsbook::{
    parse_workbook, InMemoryGrid, ParseError, ParsedStatsbook, SchemaVersion, Template,
};

pub struct Workbook {
    pub grid: InMemoryGrid,
    pub template: Template,
}

#[derive(Default, Clone)]
pub struct ScoreLine {
    pub jam: String,
    pub jammer: String,
    pub lost: bool,
    pub lead: bool,
    pub call: bool,
    pub inj: bool,
    pub ni: bool,
    pub trips: Vec<String>,
}

impl ScoreLine {
    pub fn new(jam: &str, jammer: &str) -> Self {
        ScoreLine {
            jam: jam.to_string(),
            jammer: jammer.to_string(),
            ..ScoreLine::default()
        }
    }

    pub fn trips(mut self, trips: &[&str]) -> Self {
        self.trips = trips.iter().map(|t| t.to_string()).collect();
        self
    }

    pub fn lead(mut self) -> Self {
        self.lead = true;
        self
    }

    pub fn lost(mut self) -> Self {
        self.lost = true;
        self
    }

    pub fn call(mut self) -> Self {
        self.call = true;
        self
    }

    pub fn inj(mut self) -> Self {
        self.inj = true;
        self
    }

    /// Check the no-initial box.
    pub fn ni(mut self) -> Self {
        self.ni = true;
        self
    }
}

impl Workbook {
    pub fn new(version: SchemaVersion) -> Self {
        let template = Template::load(version).expect("embedded template resolves");
        let mut grid = InMemoryGrid::new();
        grid.set(
            "Read Me",
            "A3".parse().unwrap(),
            format!("Statsbook {}", version.year()),
        );
        Workbook { grid, template }
    }

    pub fn parse(&self, filename: &str) -> Result<ParsedStatsbook, ParseError> {
        parse_workbook(&self.grid, filename)
    }

    pub fn parse_ok(&self, filename: &str) -> ParsedStatsbook {
        self.parse(filename).expect("workbook parses")
    }

    /// Venue, date (2019-03-16) and time (18:00) as Excel serials.
    pub fn header(&mut self) -> &mut Self {
        let sheet = self.template.main_sheet.clone();
        self.grid.set(&sheet, self.template.venue.name, "The Hangar");
        self.grid.set(&sheet, self.template.venue.city, "Wheeling");
        self.grid.set(&sheet, self.template.venue.state, "IL");
        self.grid.set(&sheet, self.template.date, 43540u32);
        self.grid.set(&sheet, self.template.time, 0.75);
        self
    }

    pub fn roster(&mut self, team: TeamSide, skaters: &[(&str, &str)]) -> &mut Self {
        let sheet = self.template.main_sheet.clone();
        let cfg = self.template.teams.side(team).clone();
        self.grid.set(&sheet, cfg.league, "Test League");
        self.grid
            .set(&sheet, cfg.name, format!("{} Team", team.label()));
        self.grid.set(&sheet, cfg.color, "Black");
        for (row, (number, name)) in skaters.iter().enumerate() {
            self.grid
                .set(&sheet, cfg.first_number.down(row as u32), *number);
            self.grid.set(&sheet, cfg.first_name.down(row as u32), *name);
        }
        self
    }

    pub fn official(&mut self, row: u32, name: &str, role: &str) -> &mut Self {
        let sheet = self.template.main_sheet.clone();
        let cfg = self.template.teams.officials.clone();
        self.grid.set(&sheet, cfg.first_name.down(row), name);
        self.grid.set(&sheet, cfg.first_role.down(row), role);
        self
    }

    pub fn score_row(
        &mut self,
        period: PeriodId,
        team: TeamSide,
        row: u32,
        line: ScoreLine,
    ) -> &mut Self {
        let sheet = self.template.score.sheet_name.clone();
        let block = self.template.score.block(period, team).clone();

        self.grid
            .set(&sheet, block.first_jam_number.down(row), line.jam.as_str());
        if !line.jammer.is_empty() {
            self.grid
                .set(&sheet, block.first_jammer_number.down(row), line.jammer.as_str());
        }
        if line.lost {
            self.grid.set(&sheet, block.first_lost.down(row), "X");
        }
        if line.lead {
            self.grid.set(&sheet, block.first_lead.down(row), "X");
        }
        if line.call {
            self.grid.set(&sheet, block.first_call.down(row), "X");
        }
        if line.inj {
            self.grid.set(&sheet, block.first_inj.down(row), "X");
        }
        if line.ni {
            self.grid.set(&sheet, block.first_np.down(row), "X");
        }
        for (col, trip) in line.trips.iter().enumerate() {
            if !trip.is_empty() {
                self.grid
                    .set(&sheet, block.first_trip.down(row).right(col as u32), trip.as_str());
            }
        }
        self
    }

    /// One skater's penalty row: the code/jam pairs and optional
    /// trailing FO/EXP pair. `index` is the roster slot (two grid rows
    /// each).
    pub fn penalty_row(
        &mut self,
        period: PeriodId,
        team: TeamSide,
        index: u32,
        number: &str,
        pairs: &[(&str, u32)],
        fo: Option<(&str, u32)>,
    ) -> &mut Self {
        let sheet = self.template.penalties.sheet_name.clone();
        let block = self.template.penalties.block(period, team).clone();
        let row = index * 2;

        self.grid.set(&sheet, block.first_number.down(row), number);
        for (col, (code, jam)) in pairs.iter().enumerate() {
            let col = col as u32;
            if !code.is_empty() {
                self.grid
                    .set(&sheet, block.first_penalty.down(row).right(col), *code);
            }
            if *jam != 0 {
                self.grid.set(&sheet, block.first_jam.down(row).right(col), *jam);
            }
        }
        if let Some((code, jam)) = fo {
            if !code.is_empty() {
                self.grid.set(&sheet, block.first_fo.down(row), code);
            }
            if jam != 0 {
                self.grid.set(&sheet, block.first_fo_jam.down(row), jam);
            }
        }
        self
    }

    pub fn bench_expulsion(
        &mut self,
        period: PeriodId,
        team: TeamSide,
        slot: u32,
        code: &str,
        jam: u32,
    ) -> &mut Self {
        let sheet = self.template.penalties.sheet_name.clone();
        let block = self.template.penalties.block(period, team).clone();
        self.grid.set(&sheet, block.bench_exp_code.right(slot), code);
        self.grid.set(&sheet, block.bench_exp_jam.right(slot), jam);
        self
    }

    /// One lineup line: jam token, no-pivot mark, and up to five slots of
    /// (skater number, box glyphs). An empty skater number leaves the
    /// slot blank.
    pub fn lineup_row(
        &mut self,
        period: PeriodId,
        team: TeamSide,
        row: u32,
        jam: &str,
        no_pivot: bool,
        slots: &[(&str, &[&str])],
    ) -> &mut Self {
        let sheet = self.template.lineups.sheet_name.clone();
        let block = self.template.lineups.block(period, team).clone();
        let slot_width = self.template.lineups.box_codes + 1;

        self.grid.set(&sheet, block.first_jam_number.down(row), jam);
        if no_pivot {
            self.grid.set(&sheet, block.first_no_pivot.down(row), "X");
        }
        for (slot, (number, glyphs)) in slots.iter().enumerate() {
            let base = block.first_jammer.down(row).right(slot as u32 * slot_width);
            if !number.is_empty() {
                self.grid.set(&sheet, base, *number);
            }
            for (i, glyph) in glyphs.iter().enumerate() {
                if !glyph.is_empty() {
                    self.grid.set(&sheet, base.right(i as u32 + 1), *glyph);
                }
            }
        }
        self
    }
}

pub const HOME_ROSTER: [(&str, &str); 6] = [
    ("12", "Ada Wreckage"),
    ("21", "Grace Hopper"),
    ("34", "Mary Quite Contrary"),
    ("45", "Edith Smash"),
    ("56", "Radia Tor"),
    ("67", "Hedy Slamarr"),
];

pub const AWAY_ROSTER: [(&str, &str); 6] = [
    ("9", "Nine Lives"),
    ("18", "Crash Test"),
    ("27", "Jette Black"),
    ("36", "Slam Wow"),
    ("81", "Bruise Lee"),
    ("90", "Whip It Good"),
];

/// A small, mostly-clean three-jam bout in the 2018 layout. The penalty
/// for home:12 in jam 3 is served with a `/` on the matching lineup
/// line.
pub fn standard_2018() -> Workbook {
    let mut book = Workbook::new(SchemaVersion::V2018);
    book.header();
    book.roster(TeamSide::Home, &HOME_ROSTER);
    book.roster(TeamSide::Away, &AWAY_ROSTER);
    book.official(0, "Ref Eree", "Head Referee");
    book.official(1, "N. S. Oh", "Penalty Tracker");

    let p1 = PeriodId::One;
    let home = TeamSide::Home;
    let away = TeamSide::Away;

    book.score_row(p1, home, 0, ScoreLine::new("1", "12").trips(&["4"]).lead().call());
    book.score_row(p1, home, 1, ScoreLine::new("2", "21").ni());
    book.score_row(p1, home, 2, ScoreLine::new("3", "34").trips(&["3"]).lead().call());

    book.score_row(p1, away, 0, ScoreLine::new("1", "9").ni());
    book.score_row(p1, away, 1, ScoreLine::new("2", "18").trips(&["2"]).lead().call());
    book.score_row(p1, away, 2, ScoreLine::new("3", "27").ni());

    book.penalty_row(p1, home, 0, "12", &[("B", 3)], None);

    let home_slots: [(&str, &[&str]); 5] =
        [("12", &[]), ("21", &[]), ("34", &[]), ("45", &[]), ("56", &[])];
    let away_slots: [(&str, &[&str]); 5] =
        [("9", &[]), ("18", &[]), ("27", &[]), ("36", &[]), ("81", &[])];

    book.lineup_row(p1, home, 0, "1", false, &home_slots);
    book.lineup_row(p1, home, 1, "2", false, &home_slots);
    book.lineup_row(
        p1,
        home,
        2,
        "3",
        false,
        &[("12", &["/"]), ("21", &[]), ("34", &[]), ("45", &[]), ("56", &[])],
    );

    book.lineup_row(p1, away, 0, "1", false, &away_slots);
    book.lineup_row(p1, away, 1, "2", false, &away_slots);
    book.lineup_row(p1, away, 2, "3", false, &away_slots);

    book
}
