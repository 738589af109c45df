use crate::style::Style;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Value held by a single grid cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub enum CellValue {
    #[default]
    Empty,
    Text(String),
    Number(f64),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    /// Display string for the value. Integral numbers render without a
    /// fractional part, mirroring how grids show them.
    pub fn to_display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Text(text) => text.clone(),
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{n}")
                }
            }
        }
    }
}

impl From<&str> for CellValue {
    fn from(text: &str) -> Self {
        CellValue::Text(text.to_string())
    }
}

impl From<String> for CellValue {
    fn from(text: String) -> Self {
        CellValue::Text(text)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

/// One grid cell: a value plus an optional style.
///
/// A cell with `CellValue::Empty` and no style is "blank"; `Cell::new`
/// produces exactly that, and replacing a cell with a blank one is how the
/// editing layer clears it.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    pub value: CellValue,
    pub style: Option<Style>,
}

impl Cell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style: None,
        }
    }

    /// Clear the value, keeping the style slot.
    pub fn clear_value(&mut self) {
        self.value = CellValue::Empty;
    }
}
