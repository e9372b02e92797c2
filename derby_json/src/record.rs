use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::event::{Event, SkaterRef, TeamSide};

/// derbyJSON format version this model targets.
pub const FORMAT_VERSION: &str = "v0.3";

/// The assembled game record. Created once per document, populated by the
/// readers in dependency order, then frozen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GameRecord {
    pub version: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub metadata: Metadata,
    /// Date the bout was played, from the document header.
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub venue: Venue,
    pub periods: Periods,
    pub teams: Teams,
}

impl GameRecord {
    /// A fresh, empty record stamped with the producing tool and the
    /// current run timestamp.
    pub fn for_producer(producer: impl Into<String>) -> Self {
        GameRecord {
            version: FORMAT_VERSION.to_string(),
            kind: "game".to_string(),
            metadata: Metadata {
                producer: producer.into(),
                date: Utc::now(),
            },
            date: None,
            time: None,
            venue: Venue::default(),
            periods: Periods::default(),
            teams: Teams::default(),
        }
    }

    pub fn period(&self, id: PeriodId) -> &Period {
        match id {
            PeriodId::One => &self.periods.one,
            PeriodId::Two => &self.periods.two,
        }
    }

    pub fn period_mut(&mut self, id: PeriodId) -> &mut Period {
        match id {
            PeriodId::One => &mut self.periods.one,
            PeriodId::Two => &mut self.periods.two,
        }
    }

    pub fn team(&self, side: TeamSide) -> Option<&Team> {
        match side {
            TeamSide::Home => self.teams.home.as_ref(),
            TeamSide::Away => self.teams.away.as_ref(),
        }
    }

    /// Whether the roster for `side` carries a skater with this number.
    pub fn roster_has(&self, side: TeamSide, number: &str) -> bool {
        self.team(side)
            .map(|team| team.persons.iter().any(|p| p.number == number))
            .unwrap_or(false)
    }
}

/// Run metadata embedded in the record. `date` is the run timestamp and is
/// the one field excluded from idempotence comparisons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Metadata {
    pub producer: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Venue {
    pub name: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
}

/// A bout always has exactly two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PeriodId {
    One,
    Two,
}

impl PeriodId {
    pub const BOTH: [PeriodId; 2] = [PeriodId::One, PeriodId::Two];

    pub fn number(&self) -> u8 {
        match self {
            PeriodId::One => 1,
            PeriodId::Two => 2,
        }
    }

    /// The period before this one, if any.
    pub fn prior(&self) -> Option<PeriodId> {
        match self {
            PeriodId::One => None,
            PeriodId::Two => Some(PeriodId::One),
        }
    }

    pub fn next(&self) -> Option<PeriodId> {
        match self {
            PeriodId::One => Some(PeriodId::Two),
            PeriodId::Two => None,
        }
    }
}

impl Display for PeriodId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Periods {
    #[serde(rename = "1")]
    pub one: Period,
    #[serde(rename = "2")]
    pub two: Period,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Period {
    pub jams: Vec<Jam>,
}

impl Period {
    pub fn jam_count(&self) -> u32 {
        self.jams.len() as u32
    }

    /// Jam by 1-based number.
    pub fn jam(&self, number: u32) -> Option<&Jam> {
        if number == 0 {
            return None;
        }
        self.jams.get(number as usize - 1)
    }

    pub fn jam_mut(&mut self, number: u32) -> Option<&mut Jam> {
        if number == 0 {
            return None;
        }
        self.jams.get_mut(number as usize - 1)
    }

    pub fn last_jam(&self) -> Option<&Jam> {
        self.jams.last()
    }

    /// Jam by 1-based number, creating it and any missing predecessors as
    /// empty placeholders. Keeps jam numbers contiguous from 1.
    pub fn ensure_jam(&mut self, number: u32) -> &mut Jam {
        debug_assert!(number >= 1);
        while self.jam_count() < number {
            let next = self.jam_count() + 1;
            self.jams.push(Jam::new(next));
        }
        &mut self.jams[number as usize - 1]
    }
}

/// One jam: a 1-based number and an ordered event list. Event order is
/// semantically meaningful; first-match lookups depend on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Jam {
    pub number: u32,
    pub events: Vec<Event>,
}

impl Jam {
    pub fn new(number: u32) -> Self {
        Jam {
            number,
            events: Vec::new(),
        }
    }

    pub fn penalty_skaters(&self) -> impl Iterator<Item = &SkaterRef> {
        self.events.iter().filter_map(|e| match e {
            Event::Penalty { skater, .. } => Some(skater),
            _ => None,
        })
    }

    pub fn has_penalty_for(&self, skater: &SkaterRef) -> bool {
        self.penalty_skaters().any(|s| s == skater)
    }

    pub fn has_penalty_for_team(&self, team: TeamSide) -> bool {
        self.penalty_skaters().any(|s| s.team == team)
    }

    pub fn box_entries(&self) -> impl Iterator<Item = &SkaterRef> {
        self.events.iter().filter_map(|e| match e {
            Event::EnterBox { skater, .. } => Some(skater),
            _ => None,
        })
    }

    /// The first skater marked lead this jam, if any.
    pub fn first_lead(&self) -> Option<&SkaterRef> {
        self.events.iter().find_map(|e| match e {
            Event::Lead { skater } => Some(skater),
            _ => None,
        })
    }

    pub fn has_lost_for(&self, skater: &SkaterRef) -> bool {
        self.events
            .iter()
            .any(|e| matches!(e, Event::Lost { skater: s } if s == skater))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Teams {
    pub home: Option<Team>,
    pub away: Option<Team>,
    pub officials: OfficialsTeam,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Team {
    pub league: Option<String>,
    pub name: Option<String>,
    pub color: Option<String>,
    pub persons: Vec<Person>,
}

/// One rostered skater. Numbers stay in their text form; leading zeros
/// are significant on a jersey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Person {
    pub name: Option<String>,
    pub number: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OfficialsTeam {
    pub persons: Vec<Official>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Official {
    pub name: String,
    pub roles: Vec<String>,
    pub league: Option<String>,
    pub certifications: Vec<Certification>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Certification {
    pub level: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::TeamSide;

    #[test]
    fn ensure_jam_backfills_placeholders() {
        let mut period = Period::default();
        let jam = period.ensure_jam(3);
        assert_eq!(jam.number, 3);
        assert_eq!(period.jam_count(), 3);
        assert_eq!(period.jam(2).unwrap().number, 2);
        assert!(period.jam(2).unwrap().events.is_empty());

        // Re-ensuring an existing jam does not grow the period.
        period.ensure_jam(1);
        assert_eq!(period.jam_count(), 3);
    }

    #[test]
    fn jam_lookups_are_one_based() {
        let mut period = Period::default();
        period.ensure_jam(2);
        assert!(period.jam(0).is_none());
        assert_eq!(period.jam(1).unwrap().number, 1);
        assert!(period.jam(3).is_none());
    }

    #[test]
    fn first_lead_takes_event_order() {
        let mut jam = Jam::new(1);
        let home = SkaterRef::new(TeamSide::Home, "12");
        let away = SkaterRef::new(TeamSide::Away, "9");
        jam.events.push(Event::Lead { skater: home.clone() });
        jam.events.push(Event::Lead { skater: away });
        assert_eq!(jam.first_lead(), Some(&home));
    }

    #[test]
    fn periods_serialize_with_numeric_keys() {
        let record = GameRecord::for_producer("test");
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["periods"].get("1").is_some());
        assert!(json["periods"].get("2").is_some());
        assert_eq!(json["type"], "game");
        assert_eq!(json["version"], FORMAT_VERSION);
    }
}
