use crate::sheet::Sheet;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An ordered collection of sheets.
///
/// A new workbook starts with one blank sheet, matching what grid editors
/// present on creation. Sheet indices are positional and shift when a sheet
/// is removed.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self {
            sheets: vec![Sheet::new("Sheet1")],
        }
    }

    pub fn sheet(&self, index: usize) -> Option<&Sheet> {
        self.sheets.get(index)
    }

    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Appends a sheet and returns its index.
    pub fn create_sheet(&mut self, name: impl Into<String>) -> usize {
        self.sheets.push(Sheet::new(name));
        self.sheets.len() - 1
    }

    pub fn remove_sheet(&mut self, index: usize) -> Option<Sheet> {
        if index < self.sheets.len() {
            Some(self.sheets.remove(index))
        } else {
            None
        }
    }
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}
