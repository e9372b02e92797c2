//! Versioned coordinate templates: per-version maps from semantic field
//! names to grid coordinates, deserialized once per run from embedded
//! JSON assets. All layout differences between statsbook versions live
//! here; the readers never see a raw coordinate literal.

use std::fmt::{Display, Formatter};

use derby_json::{PeriodId, TeamSide};
use serde::Deserialize;

use crate::error::ParseError;
use crate::grid::CellAddr;

const TEMPLATE_2017: &str = include_str!("../assets/2017statsbook.json");
const TEMPLATE_2018: &str = include_str!("../assets/2018statsbook.json");

/// A statsbook schema year. 2019 changed the box-code alphabet but kept
/// the 2018 sheet layout; 2017 has its own layout and the 2018 alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SchemaVersion {
    V2017,
    V2018,
    V2019,
}

impl SchemaVersion {
    pub const CURRENT: SchemaVersion = SchemaVersion::V2019;
    pub const DEFAULT: SchemaVersion = SchemaVersion::V2018;

    pub fn from_year(year: &str) -> Option<SchemaVersion> {
        match year {
            "2017" => Some(SchemaVersion::V2017),
            "2018" => Some(SchemaVersion::V2018),
            "2019" => Some(SchemaVersion::V2019),
            _ => None,
        }
    }

    pub fn year(&self) -> &'static str {
        match self {
            SchemaVersion::V2017 => "2017",
            SchemaVersion::V2018 => "2018",
            SchemaVersion::V2019 => "2019",
        }
    }

    fn template_source(&self) -> &'static str {
        match self {
            SchemaVersion::V2017 => TEMPLATE_2017,
            SchemaVersion::V2018 | SchemaVersion::V2019 => TEMPLATE_2018,
        }
    }
}

impl Display for SchemaVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.year())
    }
}

/// Two copies of a block, keyed by period number.
#[derive(Debug, Clone, Deserialize)]
pub struct PerPeriod<T> {
    #[serde(rename = "1")]
    pub one: T,
    #[serde(rename = "2")]
    pub two: T,
}

impl<T> PerPeriod<T> {
    pub fn get(&self, period: PeriodId) -> &T {
        match period {
            PeriodId::One => &self.one,
            PeriodId::Two => &self.two,
        }
    }
}

/// Two copies of a block, keyed by team side.
#[derive(Debug, Clone, Deserialize)]
pub struct PerTeam<T> {
    pub home: T,
    pub away: T,
}

impl<T> PerTeam<T> {
    pub fn get(&self, side: TeamSide) -> &T {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Template {
    pub version: String,
    #[serde(rename = "mainSheet")]
    pub main_sheet: String,
    pub venue: VenueAddrs,
    pub date: CellAddr,
    pub time: CellAddr,
    pub teams: TeamsCfg,
    pub score: ScoreTab,
    pub penalties: PenaltyTab,
    pub lineups: LineupTab,
}

impl Template {
    /// Resolve the template for a schema version. Any missing or
    /// malformed field is a fatal construction error; no reader runs
    /// against a partially-resolved template.
    pub fn load(version: SchemaVersion) -> Result<Template, ParseError> {
        serde_json::from_str(version.template_source())
            .map_err(|source| ParseError::Template { version, source })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VenueAddrs {
    pub name: CellAddr,
    pub city: CellAddr,
    pub state: CellAddr,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TeamsCfg {
    pub home: TeamCfg,
    pub away: TeamCfg,
    pub officials: OfficialsCfg,
}

impl TeamsCfg {
    pub fn side(&self, side: TeamSide) -> &TeamCfg {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamCfg {
    pub league: CellAddr,
    pub name: CellAddr,
    pub color: CellAddr,
    pub first_name: CellAddr,
    pub first_number: CellAddr,
    pub max_num: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfficialsCfg {
    pub first_name: CellAddr,
    pub first_role: CellAddr,
    pub first_league: CellAddr,
    pub first_cert: CellAddr,
    pub max_num: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreTab {
    pub sheet_name: String,
    pub max_jams: u32,
    #[serde(flatten)]
    pub blocks: PerPeriod<PerTeam<ScoreBlock>>,
}

impl ScoreTab {
    pub fn block(&self, period: PeriodId, team: TeamSide) -> &ScoreBlock {
        self.blocks.get(period).get(team)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBlock {
    pub first_jam_number: CellAddr,
    pub first_jammer_number: CellAddr,
    pub first_lost: CellAddr,
    pub first_lead: CellAddr,
    pub first_call: CellAddr,
    pub first_inj: CellAddr,
    pub first_np: CellAddr,
    pub first_trip: CellAddr,
    pub last_trip: CellAddr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyTab {
    pub sheet_name: String,
    pub max_penalties: u32,
    #[serde(flatten)]
    pub blocks: PerPeriod<PerTeam<PenaltyBlock>>,
}

impl PenaltyTab {
    pub fn block(&self, period: PeriodId, team: TeamSide) -> &PenaltyBlock {
        self.blocks.get(period).get(team)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PenaltyBlock {
    pub first_number: CellAddr,
    pub first_penalty: CellAddr,
    pub first_jam: CellAddr,
    #[serde(rename = "firstFO")]
    pub first_fo: CellAddr,
    #[serde(rename = "firstFOJam")]
    pub first_fo_jam: CellAddr,
    pub bench_exp_code: CellAddr,
    pub bench_exp_jam: CellAddr,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupTab {
    pub sheet_name: String,
    pub max_jams: u32,
    /// Box-code cells per lineup slot; a slot occupies the skater cell
    /// plus this many code cells.
    pub box_codes: u32,
    #[serde(flatten)]
    pub blocks: PerPeriod<PerTeam<LineupBlock>>,
}

impl LineupTab {
    pub fn block(&self, period: PeriodId, team: TeamSide) -> &LineupBlock {
        self.blocks.get(period).get(team)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineupBlock {
    pub first_jam_number: CellAddr,
    pub first_no_pivot: CellAddr,
    pub first_jammer: CellAddr,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_supported_version_resolves() {
        for version in [SchemaVersion::V2017, SchemaVersion::V2018, SchemaVersion::V2019] {
            let template = Template::load(version).unwrap();
            assert!(!template.score.sheet_name.is_empty());
            assert!(template.score.max_jams > 0);
            assert!(template.lineups.box_codes > 0);
        }
    }

    #[test]
    fn trip_span_is_nonempty() {
        let template = Template::load(SchemaVersion::V2018).unwrap();
        for period in PeriodId::BOTH {
            for team in TeamSide::BOTH {
                let block = template.score.block(period, team);
                assert!(block.last_trip.col > block.first_trip.col);
                assert_eq!(block.last_trip.row, block.first_trip.row);
            }
        }
    }

    #[test]
    fn version_years() {
        assert_eq!(SchemaVersion::from_year("2019"), Some(SchemaVersion::V2019));
        assert_eq!(SchemaVersion::from_year("2016"), None);
        assert_eq!(SchemaVersion::CURRENT.year(), "2019");
    }
}
