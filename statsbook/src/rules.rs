//! The closed rule alphabet, structured diagnostics, and the per-run
//! error summary. Diagnostics are typed records; the fixed string
//! grammar (`Team: <team>, Period: <n>, Jam: <n>[, Skater: <number>]`)
//! is produced only by the `Display` impl.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use derby_json::{PeriodId, SkaterRef, TeamSide};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

/// The four diagnostic categories of the error summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Scores,
    Penalties,
    Lineups,
    Warnings,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Scores,
        Category::Penalties,
        Category::Lineups,
        Category::Warnings,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Category::Scores => "scores",
            Category::Penalties => "penalties",
            Category::Lineups => "lineups",
            Category::Warnings => "warnings",
        }
    }

    /// Section heading used by presentation layers.
    pub fn heading(&self) -> &'static str {
        match self {
            Category::Scores => "Scores",
            Category::Penalties => "Penalties",
            Category::Lineups => "Lineups",
            Category::Warnings => "Warnings - these should be checked, but may be OK",
        }
    }
}

macro_rules! rule_keys {
    ($( $variant:ident => ($category:ident, $key:literal, $description:literal, $help:literal), )*) => {
        /// Every rule the engine can flag, across all schema versions.
        /// The wire key is the camelCase form used by the original tool.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum RuleKey {
            $($variant,)*
        }

        impl RuleKey {
            pub const ALL: &'static [RuleKey] = &[$(RuleKey::$variant,)*];

            pub fn category(&self) -> Category {
                match self {
                    $(RuleKey::$variant => Category::$category,)*
                }
            }

            pub fn key(&self) -> &'static str {
                match self {
                    $(RuleKey::$variant => $key,)*
                }
            }

            /// Short description shown as the section header of the
            /// diagnostic table.
            pub fn description(&self) -> &'static str {
                match self {
                    $(RuleKey::$variant => $description,)*
                }
            }

            /// Longer help text shown as a tooltip.
            pub fn help(&self) -> &'static str {
                match self {
                    $(RuleKey::$variant => $help,)*
                }
            }
        }
    };
}

rule_keys! {
    // Score tab
    BadJamNumber => (Scores, "badJamNumber",
        "Jam number out of sequence",
        "A jam number on the score sheet does not follow the jam before it. Missing jams are filled in as empty placeholders; check the sheet for skipped or duplicated lines."),
    ScoresNotOnIgrf => (Scores, "scoresNotOnIGRF",
        "Jammer number on the score sheet not on the IGRF",
        "A jammer number was entered on the score sheet that does not appear on that team's roster."),
    SpStarWithJammer => (Scores, "spStarWithJammer",
        "SP* line with a jammer number entered",
        "An SP* line belongs to the opposing team and should never carry a jammer number."),
    NoPointsNoNi => (Scores, "noPointsNoNI",
        "No points entered and NI not checked",
        "The initial trip column is blank but the no-initial box is not checked. One of the two must be recorded, even for a zero-point trip."),
    NpPoints => (Scores, "npPoints",
        "NI checked with points entered",
        "The no-initial box is checked, but points were entered for a scoring trip in the same line."),
    SpPointsBothJammers => (Scores, "spPointsBothJammers",
        "Points for both jammers in the same trip",
        "During a star pass, a trip column was scored by both the original and the new jammer."),
    BlankTrip => (Scores, "blankTrip",
        "Skipped column on the score sheet",
        "A trip column was left blank before a later column was scored in the same line."),
    SpLeadNoLost => (Scores, "spLeadNoLost",
        "SP for a lead jammer without a loss",
        "A jammer who was lead passed the star, but no lost-lead mark was recorded."),
    TooManyLead => (Scores, "tooManyLead",
        "Lead checked for both jammers",
        "Only one jammer can be lead in a jam."),
    TooManyCall => (Scores, "tooManyCall",
        "Call checked for both jammers",
        "Only one jammer can call off a jam."),
    InjuryOnlyOnce => (Scores, "injuryOnlyOnce",
        "Injury checked for only one team",
        "A jam called for injury should carry the injury mark on both teams' score sheets."),
    PointsNoLeadNoLost => (Scores, "pointsNoLeadNoLost",
        "Points scored with no lead and no loss",
        "A team recorded a scoring trip in a jam where no jammer was lead and that team's jammer was not marked lost."),
    OnlyOneStarPass => (Scores, "onlyOneStarPass",
        "Star pass marked for only one team",
        "A star pass line should appear on both teams' score sheets: SP for the passing team and SP* for the other."),

    // Penalty tab
    PenaltiesNotOnIgrf => (Penalties, "penaltiesNotOnIGRF",
        "Skater number on the penalty sheet not on the IGRF",
        "A skater number was entered on the penalty sheet that does not appear on that team's roster."),
    CodeNoJam => (Penalties, "codeNoJam",
        "Penalty code without a jam number, or vice versa",
        "Penalty entries need both a code and a jam number; one of the pair is missing."),
    PenaltyBadJam => (Penalties, "penaltyBadJam",
        "Penalty jam number not on the score sheet",
        "A penalty was recorded for a jam number that never happened in that period. The penalty was dropped from the game record."),
    FoBadJam => (Penalties, "foBadJam",
        "FO/EXP jam number not on the score sheet",
        "A foul-out or expulsion was recorded for a jam number that never happened in that period."),
    ExpulsionNoPenalty => (Penalties, "expulsionNoPenalty",
        "Expulsion without a penalty in that jam",
        "An expulsion code references a jam in which the skater has no recorded penalty."),
    FoUnder7 => (Penalties, "foUnder7",
        "FO entered with fewer than seven penalties",
        "A skater fouled out with fewer than seven recorded penalties. Check for penalties missing from the sheet."),
    SevenWithoutFo => (Penalties, "sevenWithoutFO",
        "Seven or more penalties without FO or expulsion",
        "A skater reached seven recorded penalties but the foul-out column is empty."),
    PenaltyNoEntry => (Penalties, "penaltyNoEntry",
        "Penalty without a box entry",
        "A recorded penalty has no matching box entry in the same jam or the one after it."),
    PenaltyNoLineup => (Penalties, "penaltyNoLineup",
        "Penalty for a skater not in the lineup",
        "A penalty was recorded in a jam whose lineup does not list the skater."),

    // Lineup tab
    LineupsNotOnIgrf => (Lineups, "lineupsNotOnIGRF",
        "Skater number on the lineup sheet not on the IGRF",
        "A skater number was entered on the lineup sheet that does not appear on that team's roster."),
    SamePlayerTwice => (Lineups, "samePlayerTwice",
        "Same skater listed twice in one jam",
        "A skater number appears in more than one lineup position for the same jam."),
    SpStarSkater => (Lineups, "spStarSkater",
        "Skaters listed on an SP* line",
        "An SP* line belongs to the opposing team and should have no skaters listed."),
    StarPassNoPivot => (Lineups, "starPassNoPivot",
        "Star pass without the No Pivot box checked",
        "An SP line must have the No Pivot box checked, since the pivot became the jammer."),
    SlashNoPenalty => (Lineups, "slashNoPenalty",
        "/ without a matching penalty",
        "A skater entered the box during a jam with no penalty recorded in that jam."),
    XNoPenalty => (Lineups, "xNoPenalty",
        "X without a matching penalty",
        "A skater served and left the box during a jam with no penalty recorded in that jam."),
    DashNoPenalty => (Lineups, "dashNoPenalty",
        "- without a matching penalty",
        "A skater entered the box during a jam with no penalty recorded in that jam."),
    PlusNoPenalty => (Lineups, "plusNoPenalty",
        "+ without a matching penalty",
        "A skater served and left the box during a jam with no penalty recorded in that jam."),
    SNoPenalty => (Lineups, "sNoPenalty",
        "S without a matching penalty",
        "A skater sat between jams with no penalty recorded in that jam or the one before it."),
    SSlashNoPenalty => (Lineups, "sSlashNoPenalty",
        "$ without a matching penalty",
        "A skater sat between jams and finished serving, with no penalty recorded in that jam or the one before it."),
    StartsWhileThere => (Lineups, "startsWhileThere",
        "S or $ for a skater already in the box",
        "A between-jams entry code was used for a skater the lineup sheet already has seated."),
    INotInBox => (Lineups, "iNotInBox",
        "I or | for a skater who never entered the box",
        "A continuation code was used for a skater with no recorded box entry."),
    FoInBox => (Lineups, "foInBox",
        "Fouled-out skater still in the box",
        "A box code was recorded for a skater who had already fouled out."),
    RuneUsed => (Lineups, "runeUsed",
        "\u{16be} used in place of X",
        "The rune \u{16be} was typed instead of the letter X. It was read as an X, but fix the sheet."),
    BadLineupCode => (Lineups, "badLineupCode",
        "Unrecognized lineup code",
        "A box-trip cell holds a character that is not part of this statsbook version's code alphabet."),
    SeatedNoCode => (Lineups, "seatedNoCode",
        "Seated skater with no code on the line",
        "A skater the box model still has seated appears in the lineup with no box code at all. The skater was removed from the box."),
    SeatedNotLinedUp => (Lineups, "seatedNotLinedUp",
        "Seated skater not listed in the lineup",
        "A skater the box model still has seated does not appear anywhere in this jam's lineup."),

    // Cross-cutting warnings
    OldStatsbookVersion => (Warnings, "oldStatsbookVersion",
        "Statsbook is not the current version",
        "This file uses an older statsbook layout. It was read with that layout's template, but consider upgrading."),
    MissingData => (Warnings, "missingData",
        "Missing game information on the IGRF",
        "A header field on the IGRF (venue, date, time, or a team color) was left blank."),
    EmptyLineupNoComment => (Warnings, "emptyLineupNoComment",
        "Empty lineup box without a comment",
        "A lineup position was left blank with no comment explaining why. Skating short should be annotated."),
    SpNoPointsNoNi => (Warnings, "SPNoPointsNoNI",
        "SP with no points and no NI checked",
        "The line before a star pass has a blank initial trip and no no-initial mark. This may be correct if the star passed before the initial was complete."),
    LastJamNoEntry => (Warnings, "lastJamNoEntry",
        "Penalty in the final jam without a box entry",
        "A penalty in the last jam of the game has no box entry, but there is no later jam to serve it in."),
    PossibleSub => (Warnings, "possibleSub",
        "Possible unrecorded substitution",
        "A box entry without a penalty lines up with another skater's penalty without a box exit in an adjacent jam. A substitution in the box may not have been recorded."),
    LostNoPenalty => (Warnings, "lostNoPenalty",
        "Lost lead without a penalty",
        "A jammer was marked lost in a jam with no recorded penalty. Lead can be lost without a penalty, but it is rare."),
    LeadPenaltyNotLost => (Warnings, "leadPenaltyNotLost",
        "Lead jammer with a penalty but no loss",
        "The lead jammer picked up a penalty in the jam but was not marked lost."),
    InjNoThree => (Warnings, "injNoThree",
        "Jam called for injury without a skater marked 3",
        "A jam was marked called for injury on the score sheet, but no skater on the lineup sheet carries a 3 for it."),
}

impl Display for RuleKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// One structured diagnostic. Field presence varies by rule; tests and
/// presentation layers read the fields, not the rendered string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Diagnostic {
    pub team: Option<TeamSide>,
    pub period: Option<PeriodId>,
    pub jam: Option<u32>,
    pub skater: Option<String>,
    /// Free-form tail, e.g. `Code: q` or `Recorded Jam: 33`. Rendered
    /// verbatim after the fixed fields.
    pub detail: Option<String>,
}

impl Diagnostic {
    pub fn new() -> Self {
        Diagnostic::default()
    }

    /// The common (team, period, jam) shape.
    pub fn at(team: TeamSide, period: PeriodId, jam: u32) -> Self {
        Diagnostic {
            team: Some(team),
            period: Some(period),
            jam: Some(jam),
            ..Diagnostic::default()
        }
    }

    /// Team, period, and jam taken from a skater reference.
    pub fn for_skater(skater: &SkaterRef, period: PeriodId, jam: u32) -> Self {
        Diagnostic::at(skater.team, period, jam).skater(&skater.number)
    }

    pub fn team(mut self, team: TeamSide) -> Self {
        self.team = Some(team);
        self
    }

    pub fn period(mut self, period: PeriodId) -> Self {
        self.period = Some(period);
        self
    }

    pub fn jam(mut self, jam: u32) -> Self {
        self.jam = Some(jam);
        self
    }

    pub fn skater(mut self, number: impl Into<String>) -> Self {
        self.skater = Some(number.into());
        self
    }

    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        if let Some(team) = self.team {
            parts.push(format!("Team: {}", team.label()));
        }
        if let Some(period) = self.period {
            parts.push(format!("Period: {period}"));
        }
        if let Some(jam) = self.jam {
            parts.push(format!("Jam: {jam}"));
        }
        if let Some(skater) = &self.skater {
            parts.push(format!("Skater: {skater}"));
        }
        if let Some(detail) = &self.detail {
            parts.push(detail.clone());
        }
        f.write_str(&parts.join(", "))
    }
}

/// Diagnostics recorded under one rule, in the order they were found.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleEntry {
    pub description: &'static str,
    pub help: &'static str,
    pub events: Vec<Diagnostic>,
}

/// The per-run diagnostic accumulator: a skeleton of every known rule,
/// cloned fresh per run and appended to by the readers.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSummary {
    entries: BTreeMap<RuleKey, RuleEntry>,
}

impl ErrorSummary {
    pub fn new() -> Self {
        let entries = RuleKey::ALL
            .iter()
            .map(|&key| {
                (
                    key,
                    RuleEntry {
                        description: key.description(),
                        help: key.help(),
                        events: Vec::new(),
                    },
                )
            })
            .collect();
        ErrorSummary { entries }
    }

    pub fn record(&mut self, key: RuleKey, diagnostic: Diagnostic) {
        log::debug!("{}: {}", key, diagnostic);
        self.entries
            .get_mut(&key)
            .expect("summary skeleton holds every rule key")
            .events
            .push(diagnostic);
    }

    pub fn rule(&self, key: RuleKey) -> &RuleEntry {
        &self.entries[&key]
    }

    pub fn diagnostics(&self, key: RuleKey) -> &[Diagnostic] {
        &self.entries[&key].events
    }

    /// Rules of one category, in declaration order.
    pub fn category(&self, category: Category) -> impl Iterator<Item = (RuleKey, &RuleEntry)> {
        self.entries
            .iter()
            .filter(move |(key, _)| key.category() == category)
            .map(|(&key, entry)| (key, entry))
    }

    pub fn total(&self) -> usize {
        self.entries.values().map(|entry| entry.events.len()).sum()
    }

    pub fn is_clean(&self) -> bool {
        self.total() == 0
    }
}

impl Default for ErrorSummary {
    fn default() -> Self {
        ErrorSummary::new()
    }
}

impl Serialize for ErrorSummary {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct EntryRepr {
            description: &'static str,
            #[serde(rename = "long")]
            help: &'static str,
            events: Vec<String>,
        }

        let mut map = serializer.serialize_map(Some(Category::ALL.len()))?;
        for category in Category::ALL {
            let rules: BTreeMap<&'static str, EntryRepr> = self
                .category(category)
                .map(|(key, entry)| {
                    (
                        key.key(),
                        EntryRepr {
                            description: entry.description,
                            help: entry.help,
                            events: entry.events.iter().map(|d| d.to_string()).collect(),
                        },
                    )
                })
                .collect();
            map.serialize_entry(category.key(), &rules)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_grammar() {
        let diag = Diagnostic::at(TeamSide::Home, PeriodId::One, 3).skater("12");
        assert_eq!(diag.to_string(), "Team: Home, Period: 1, Jam: 3, Skater: 12");

        let jam_only = Diagnostic::new().period(PeriodId::Two).jam(7);
        assert_eq!(jam_only.to_string(), "Period: 2, Jam: 7");

        let with_detail = Diagnostic::at(TeamSide::Away, PeriodId::One, 2)
            .skater("99")
            .detail("Code: q");
        assert_eq!(
            with_detail.to_string(),
            "Team: Away, Period: 1, Jam: 2, Skater: 99, Code: q"
        );
    }

    #[test]
    fn summary_records_in_order() {
        let mut summary = ErrorSummary::new();
        assert!(summary.is_clean());
        summary.record(RuleKey::BadJamNumber, Diagnostic::at(TeamSide::Home, PeriodId::One, 3));
        summary.record(RuleKey::BadJamNumber, Diagnostic::at(TeamSide::Home, PeriodId::One, 7));
        let events = summary.diagnostics(RuleKey::BadJamNumber);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].jam, Some(3));
        assert_eq!(events[1].jam, Some(7));
        assert_eq!(summary.total(), 2);
    }

    #[test]
    fn every_rule_has_metadata() {
        for &key in RuleKey::ALL {
            assert!(!key.key().is_empty());
            assert!(!key.description().is_empty());
            assert!(!key.help().is_empty());
        }
    }

    #[test]
    fn serialized_shape_has_four_categories() {
        let summary = ErrorSummary::new();
        let json = serde_json::to_value(&summary).unwrap();
        for category in Category::ALL {
            assert!(json.get(category.key()).is_some(), "{}", category.key());
        }
        assert!(json["scores"]["badJamNumber"]["events"].as_array().unwrap().is_empty());
    }
}
