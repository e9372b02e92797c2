//! The per-tab readers, run by the orchestrator in fixed dependency
//! order: IGRF → score → penalties → lineups → aggregate.

pub(crate) mod aggregate;
pub(crate) mod box_rules;
pub(crate) mod igrf;
pub(crate) mod lineup;
pub(crate) mod penalty;
pub(crate) mod score;

pub use box_rules::{BoxOccupancy, BoxRules, SAT_BETWEEN_JAMS};

use crate::grid::{CellAddr, CellValue, GridSource};

/// Non-blank trimmed text of a cell. Whitespace-only text reads as
/// absent; a numeric zero does not.
pub(crate) fn cell_text<G: GridSource>(grid: &G, sheet: &str, addr: CellAddr) -> Option<String> {
    grid.value(sheet, addr)
        .filter(|v| !v.is_blank())
        .map(CellValue::as_text)
}

/// Whether a cell holds anything at all. Marker cells (lead, lost, NI, …)
/// only care about presence, never content.
pub(crate) fn cell_present<G: GridSource>(grid: &G, sheet: &str, addr: CellAddr) -> bool {
    grid.value(sheet, addr).map(|v| !v.is_blank()).unwrap_or(false)
}
