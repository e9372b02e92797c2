//! The orchestrator: detects the schema version, resolves the template
//! and box-code alphabet once, then runs the readers in their fixed
//! dependency order. One document in, one (game record, error summary)
//! pair out; a fatal error produces no output at all.

use derby_json::GameRecord;

use crate::error::ParseError;
use crate::grid::{CellAddr, GridSource};
use crate::parsers::four_digit_year;
use crate::readers::aggregate::Aggregator;
use crate::readers::box_rules::BoxRules;
use crate::readers::igrf::IgrfReader;
use crate::readers::lineup::LineupReader;
use crate::readers::penalty::PenaltyReader;
use crate::readers::score::ScoreReader;
use crate::rules::{Diagnostic, ErrorSummary, RuleKey};
use crate::template::{SchemaVersion, Template};
use crate::warnings::WarningData;

/// Producer string stamped into every game record.
pub const PRODUCER: &str = "statsbook-tool";

const README_SHEET: &str = "Read Me";
/// The version year lives in "Read Me" A3 in every supported layout.
const VERSION_CELL: CellAddr = CellAddr { row: 2, col: 0 };

/// Run metadata for one parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub filename: String,
    pub version: SchemaVersion,
}

/// Everything a run produces.
#[derive(Debug)]
pub struct ParsedStatsbook {
    pub game: GameRecord,
    pub errors: ErrorSummary,
    pub summary: RunSummary,
}

/// Transform one loaded statsbook into a game record and error summary.
///
/// Readers run strictly sequentially: roster first, then score and
/// penalties, then lineups (which cross-reference the penalties already
/// written), then the aggregator. All correlation state is scoped to
/// this call.
pub fn parse_workbook<G: GridSource>(
    grid: &G,
    filename: &str,
) -> Result<ParsedStatsbook, ParseError> {
    let version = detect_version(grid)?;
    log::info!("parsing {filename} as a {version} statsbook");

    let template = Template::load(version)?;
    let box_rules = BoxRules::for_version(version);

    let mut game = GameRecord::for_producer(PRODUCER);
    let mut errors = ErrorSummary::new();
    let mut warnings = WarningData::new();

    if version != SchemaVersion::CURRENT {
        errors.record(
            RuleKey::OldStatsbookVersion,
            Diagnostic::new().detail(format!(
                "This File: {version}  Current Version: {}",
                SchemaVersion::CURRENT
            )),
        );
    }

    IgrfReader {
        grid,
        template: &template,
        game: &mut game,
        errors: &mut errors,
    }
    .read();

    ScoreReader::new(grid, &template, &mut game, &mut errors, &mut warnings).read()?;
    PenaltyReader::new(grid, &template, &mut game, &mut errors, &mut warnings).read();
    LineupReader::new(grid, &template, &mut game, &mut errors, &mut warnings, box_rules).read()?;

    Aggregator {
        game: &game,
        errors: &mut errors,
        warnings: &mut warnings,
    }
    .run();

    log::info!("{filename}: {} diagnostics", errors.total());
    Ok(ParsedStatsbook {
        game,
        errors,
        summary: RunSummary {
            filename: filename.to_string(),
            version,
        },
    })
}

fn detect_version<G: GridSource>(grid: &G) -> Result<SchemaVersion, ParseError> {
    let Some(value) = grid.value(README_SHEET, VERSION_CELL) else {
        // Old exports sometimes drop the Read Me sheet entirely.
        return Ok(SchemaVersion::DEFAULT);
    };
    let text = value.as_text();
    let year = four_digit_year(&text).ok_or_else(|| ParseError::UnknownVersion {
        version: text.clone(),
    })?;
    SchemaVersion::from_year(year).ok_or_else(|| ParseError::UnknownVersion {
        version: year.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::InMemoryGrid;

    fn grid_with_version(text: &str) -> InMemoryGrid {
        let mut grid = InMemoryGrid::new();
        grid.set(README_SHEET, VERSION_CELL, text);
        grid
    }

    #[test]
    fn version_comes_from_the_readme_sheet() {
        let grid = grid_with_version("Statsbook 2019 release");
        assert_eq!(detect_version(&grid).unwrap(), SchemaVersion::V2019);
    }

    #[test]
    fn missing_readme_falls_back_to_default() {
        let grid = InMemoryGrid::new();
        assert_eq!(detect_version(&grid).unwrap(), SchemaVersion::DEFAULT);
    }

    #[test]
    fn unknown_years_are_fatal() {
        let grid = grid_with_version("Statsbook 2025");
        assert!(matches!(
            detect_version(&grid),
            Err(ParseError::UnknownVersion { .. })
        ));

        let grid = grid_with_version("no year here");
        assert!(matches!(
            detect_version(&grid),
            Err(ParseError::UnknownVersion { .. })
        ));
    }
}
