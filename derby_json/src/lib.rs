//! derbyJSON game-record model: periods, jams, and their ordered event
//! lists, plus rosters and bout metadata. This crate is pure data; all
//! parsing and validation lives in the `statsbook` crate.

mod event;
mod record;

pub use event::{Event, InvalidSkaterRef, Note, Position, SkaterRef, TeamSide};
pub use record::{
    Certification, GameRecord, Jam, Metadata, Official, OfficialsTeam, Period, PeriodId, Periods,
    Person, Team, Teams, Venue, FORMAT_VERSION,
};
