//! Parse-and-validate engine for grid-based roller derby statsbooks.
//!
//! One already-loaded document goes in through the [`GridSource`]
//! primitive; a derbyJSON [`derby_json::GameRecord`] plus a categorized
//! [`ErrorSummary`] come out. Three incompatible sheet layouts and two
//! box-code alphabets are reconciled behind the versioned
//! [`Template`] and [`BoxRules`] strategies, both chosen once per run.

mod error;
mod grid;
mod parsers;
mod readers;
mod rules;
mod template;
mod warnings;
mod workbook;

pub use error::ParseError;
pub use grid::{CellAddr, CellValue, GridSource, InMemoryGrid, InvalidCellAddr};
pub use readers::{BoxOccupancy, BoxRules, SAT_BETWEEN_JAMS};
pub use rules::{Category, Diagnostic, ErrorSummary, RuleEntry, RuleKey};
pub use template::{
    LineupBlock, LineupTab, OfficialsCfg, PenaltyBlock, PenaltyTab, PerPeriod, PerTeam,
    SchemaVersion, ScoreBlock, ScoreTab, TeamCfg, TeamsCfg, Template, VenueAddrs,
};
pub use workbook::{parse_workbook, ParsedStatsbook, RunSummary, PRODUCER};
