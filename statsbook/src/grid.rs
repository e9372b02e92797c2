//! The grid-access primitive every reader is written against: a sheet id
//! plus a cell coordinate, yielding a raw value or nothing.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// A raw cell value. Spreadsheet cells are weakly typed; readers decide
/// what shape they require. A present `0` or `""` is still present —
/// absence and zero are different things.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Trimmed text form. Integral numbers render without a decimal
    /// point, so a numeric `12` and a text `"12"` compare equal.
    pub fn as_text(&self) -> String {
        match self {
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    n.to_string()
                }
            }
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Bool(_) => None,
        }
    }

    /// Whitespace-only text counts as blank; anything else does not.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.trim().is_empty())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value as f64)
    }
}

#[derive(Error, Debug)]
#[error("invalid cell address {0:?}")]
pub struct InvalidCellAddr(pub String);

/// A zero-based (row, column) grid coordinate with an A1-form codec and
/// pure offset arithmetic. Templates store the A1 form; readers derive
/// shifted coordinates from template bases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellAddr {
    pub row: u32,
    pub col: u32,
}

impl CellAddr {
    pub fn new(row: u32, col: u32) -> Self {
        CellAddr { row, col }
    }

    pub fn down(&self, rows: u32) -> CellAddr {
        CellAddr::new(self.row + rows, self.col)
    }

    pub fn right(&self, cols: u32) -> CellAddr {
        CellAddr::new(self.row, self.col + cols)
    }
}

impl Display for CellAddr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;

        let mut letters = Vec::new();
        let mut col = self.col;
        loop {
            letters.push((b'A' + (col % 26) as u8) as char);
            if col < 26 {
                break;
            }
            col = col / 26 - 1;
        }
        for letter in letters.into_iter().rev() {
            f.write_char(letter)?;
        }
        write!(f, "{}", self.row + 1)
    }
}

impl FromStr for CellAddr {
    type Err = InvalidCellAddr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let split = s.find(|c: char| c.is_ascii_digit()).ok_or_else(|| InvalidCellAddr(s.to_string()))?;
        let (letters, digits) = s.split_at(split);
        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(InvalidCellAddr(s.to_string()));
        }
        let mut col: u32 = 0;
        for c in letters.chars() {
            col = col * 26 + (c as u32 - 'A' as u32 + 1);
        }
        let row: u32 = digits.parse().map_err(|_| InvalidCellAddr(s.to_string()))?;
        if row == 0 {
            return Err(InvalidCellAddr(s.to_string()));
        }
        Ok(CellAddr::new(row - 1, col - 1))
    }
}

impl<'de> Deserialize<'de> for CellAddr {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for CellAddr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

/// The one access contract the engine needs from a loaded document.
pub trait GridSource {
    /// Raw value at (sheet, coordinate), or `None` when the cell is
    /// absent or valueless.
    fn value(&self, sheet: &str, addr: CellAddr) -> Option<&CellValue>;

    /// Whether the cell carries a reviewer comment. Used only by the
    /// empty-lineup check.
    fn has_comment(&self, sheet: &str, addr: CellAddr) -> bool;
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Cell {
    value: Option<CellValue>,
    comment: Option<String>,
}

/// An already-loaded workbook held in memory. Deserializes from
/// `{"Sheet": {"A1": value | {"v": value, "c": "comment"}}}`; the
/// desktop shell and the test fixtures both produce this shape.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGrid {
    sheets: HashMap<String, HashMap<CellAddr, Cell>>,
}

impl InMemoryGrid {
    pub fn new() -> Self {
        InMemoryGrid::default()
    }

    pub fn set(&mut self, sheet: &str, addr: CellAddr, value: impl Into<CellValue>) {
        self.cell_mut(sheet, addr).value = Some(value.into());
    }

    pub fn set_comment(&mut self, sheet: &str, addr: CellAddr, comment: impl Into<String>) {
        self.cell_mut(sheet, addr).comment = Some(comment.into());
    }

    pub fn has_sheet(&self, sheet: &str) -> bool {
        self.sheets.contains_key(sheet)
    }

    fn cell_mut(&mut self, sheet: &str, addr: CellAddr) -> &mut Cell {
        self.sheets
            .entry(sheet.to_string())
            .or_default()
            .entry(addr)
            .or_default()
    }
}

impl GridSource for InMemoryGrid {
    fn value(&self, sheet: &str, addr: CellAddr) -> Option<&CellValue> {
        self.sheets.get(sheet)?.get(&addr)?.value.as_ref()
    }

    fn has_comment(&self, sheet: &str, addr: CellAddr) -> bool {
        self.sheets
            .get(sheet)
            .and_then(|cells| cells.get(&addr))
            .map(|cell| cell.comment.is_some())
            .unwrap_or(false)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawCell {
    Scalar(CellValue),
    Rich {
        #[serde(default)]
        v: Option<CellValue>,
        #[serde(default)]
        c: Option<String>,
    },
}

impl<'de> Deserialize<'de> for InMemoryGrid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: HashMap<String, HashMap<String, RawCell>> = HashMap::deserialize(deserializer)?;
        let mut grid = InMemoryGrid::new();
        for (sheet, cells) in raw {
            // Materialize the sheet even if every cell is valueless.
            grid.sheets.entry(sheet.clone()).or_default();
            for (addr, cell) in cells {
                let addr: CellAddr = addr.parse().map_err(serde::de::Error::custom)?;
                match cell {
                    RawCell::Scalar(value) => grid.set(&sheet, addr, value),
                    RawCell::Rich { v, c } => {
                        if let Some(value) = v {
                            grid.set(&sheet, addr, value);
                        }
                        if let Some(comment) = c {
                            grid.set_comment(&sheet, addr, comment);
                        }
                    }
                }
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a1_codec_round_trips() {
        for text in ["A1", "B7", "Z99", "AA1", "AB12", "BA100"] {
            let addr: CellAddr = text.parse().unwrap();
            assert_eq!(addr.to_string(), text);
        }
        assert_eq!("A1".parse::<CellAddr>().unwrap(), CellAddr::new(0, 0));
        assert_eq!("AA3".parse::<CellAddr>().unwrap(), CellAddr::new(2, 26));
    }

    #[test]
    fn a1_codec_rejects_garbage() {
        assert!("".parse::<CellAddr>().is_err());
        assert!("12".parse::<CellAddr>().is_err());
        assert!("a4".parse::<CellAddr>().is_err());
        assert!("A0".parse::<CellAddr>().is_err());
    }

    #[test]
    fn offsets_are_pure_arithmetic() {
        let base: CellAddr = "K4".parse().unwrap();
        assert_eq!(base.down(3).to_string(), "K7");
        assert_eq!(base.right(9).to_string(), "T4");
    }

    #[test]
    fn integral_numbers_render_without_decimal() {
        assert_eq!(CellValue::Number(12.0).as_text(), "12");
        assert_eq!(CellValue::Number(1.5).as_text(), "1.5");
        assert_eq!(CellValue::Text("  SP ".into()).as_text(), "SP");
    }

    #[test]
    fn grid_json_shape() {
        let json = r#"{
            "Score": {
                "A4": 1,
                "B4": "123",
                "C4": {"v": "x", "c": "double-checked"},
                "D4": {"c": "left empty on purpose"}
            }
        }"#;
        let grid: InMemoryGrid = serde_json::from_str(json).unwrap();
        let a4: CellAddr = "A4".parse().unwrap();
        let d4: CellAddr = "D4".parse().unwrap();
        assert_eq!(grid.value("Score", a4), Some(&CellValue::Number(1.0)));
        assert!(grid.value("Score", d4).is_none());
        assert!(grid.has_comment("Score", d4));
        assert!(!grid.has_comment("Score", a4));
    }

    #[test]
    fn zero_is_present() {
        let mut grid = InMemoryGrid::new();
        let addr = CellAddr::new(0, 0);
        grid.set("Score", addr, 0u32);
        assert!(grid.value("Score", addr).is_some());
    }
}
