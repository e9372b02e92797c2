use std::fmt::{Display, Formatter};
use std::str::FromStr;

use schemars::gen::SchemaGenerator;
use schemars::schema::Schema;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which side of the bout a skater or event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    /// Processing order everywhere in the engine: home first, then away.
    pub const BOTH: [TeamSide; 2] = [TeamSide::Home, TeamSide::Away];

    pub fn as_str(&self) -> &'static str {
        match self {
            TeamSide::Home => "home",
            TeamSide::Away => "away",
        }
    }

    /// Capitalized form used in diagnostic output.
    pub fn label(&self) -> &'static str {
        match self {
            TeamSide::Home => "Home",
            TeamSide::Away => "Away",
        }
    }
}

impl Display for TeamSide {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
#[error("invalid skater reference {0:?} (expected \"home:<number>\" or \"away:<number>\")")]
pub struct InvalidSkaterRef(pub String);

/// A reference to a rostered skater. Serialized as `"<team>:<number>"`;
/// the prefix up to and including the colon is always five characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SkaterRef {
    pub team: TeamSide,
    pub number: String,
}

impl SkaterRef {
    pub fn new(team: TeamSide, number: impl Into<String>) -> Self {
        SkaterRef {
            team,
            number: number.into(),
        }
    }
}

impl Display for SkaterRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.team, self.number)
    }
}

impl From<SkaterRef> for String {
    fn from(value: SkaterRef) -> Self {
        value.to_string()
    }
}

impl FromStr for SkaterRef {
    type Err = InvalidSkaterRef;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (team, number) = s.split_once(':').ok_or_else(|| InvalidSkaterRef(s.to_string()))?;
        let team = match team {
            "home" => TeamSide::Home,
            "away" => TeamSide::Away,
            _ => return Err(InvalidSkaterRef(s.to_string())),
        };
        Ok(SkaterRef::new(team, number))
    }
}

impl TryFrom<String> for SkaterRef {
    type Error = InvalidSkaterRef;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl JsonSchema for SkaterRef {
    fn schema_name() -> String {
        "SkaterRef".to_string()
    }

    fn json_schema(gen: &mut SchemaGenerator) -> Schema {
        String::json_schema(gen)
    }
}

/// Position a skater lined up in for a jam.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Jammer,
    Pivot,
    Blocker,
}

/// Free-form annotation attached to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Note {
    pub note: String,
}

impl Note {
    pub fn new(note: impl Into<String>) -> Self {
        Note { note: note.into() }
    }
}

/// One entry in a jam's ordered event list. The tag values match the
/// derbyJSON wire format, spaces included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "event")]
pub enum Event {
    /// One trip by a jammer, including incomplete initial trips. Trip
    /// number 1 is the initial pass and is the only one carrying
    /// `completed`.
    #[serde(rename = "pass")]
    Pass {
        number: u32,
        score: u32,
        skater: SkaterRef,
        team: TeamSide,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        completed: Option<bool>,
    },

    /// Lead jammer designation earned this jam.
    #[serde(rename = "lead")]
    Lead { skater: SkaterRef },

    /// Lead was lost.
    #[serde(rename = "lost")]
    Lost { skater: SkaterRef },

    /// The jam was called off by this jammer.
    #[serde(rename = "call")]
    Call { skater: SkaterRef },

    /// The jam was called for injury. At most one per jam, regardless of
    /// how many teams marked it.
    #[serde(rename = "injury")]
    Injury,

    #[serde(rename = "penalty")]
    Penalty { skater: SkaterRef, penalty: String },

    #[serde(rename = "enter box")]
    EnterBox {
        skater: SkaterRef,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        note: Option<String>,
    },

    #[serde(rename = "exit box")]
    ExitBox { skater: SkaterRef },

    /// Mid-jam transfer of the star to a teammate. `skater` is the jammer
    /// who passed the star.
    #[serde(rename = "star pass")]
    StarPass { skater: SkaterRef },

    /// Expulsion of a skater, or of bench staff when `skater` is absent.
    #[serde(rename = "expulsion")]
    Expulsion {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skater: Option<SkaterRef>,
        notes: Vec<Note>,
    },

    #[serde(rename = "lineup")]
    Lineup { skater: SkaterRef, position: Position },
}

impl Event {
    /// The skater the event refers to, when it refers to one.
    pub fn skater(&self) -> Option<&SkaterRef> {
        match self {
            Event::Pass { skater, .. }
            | Event::Lead { skater }
            | Event::Lost { skater }
            | Event::Call { skater }
            | Event::Penalty { skater, .. }
            | Event::EnterBox { skater, .. }
            | Event::ExitBox { skater }
            | Event::StarPass { skater }
            | Event::Lineup { skater, .. } => Some(skater),
            Event::Expulsion { skater, .. } => skater.as_ref(),
            Event::Injury => None,
        }
    }
}
