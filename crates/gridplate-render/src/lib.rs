//! Template-driven grid expansion over the gridplate document model.
//!
//! Report pipelines start from a spreadsheet template: header rows,
//! formatted placeholder cells, existing merged regions. This crate expands
//! such a grid to fit variable-length data without corrupting its layout.
//! [`Grid`] pairs a workbook with a [`RegionIndex`] and exposes two layers:
//! merge-aware structural edits (insert/remove rows and columns, copy row,
//! copy column, copy cell) and render policies that lay a tree of
//! [`RenderData`] values onto a starting cell, growing and re-merging the
//! grid as each item's spans dictate.

pub mod data;
pub mod error;
pub mod grid;
pub mod region;
pub mod render;

pub use data::{CellEntry, Direction, ListData, RenderData, RowData, TableData, TextData, ValueKind};
pub use error::RenderError;
pub use grid::Grid;
pub use region::RegionIndex;

// Re-export the document model for convenience.
pub use gridplate_model::{
    Cell, CellValue, DEFAULT_COLUMN_WIDTH, HorizontalAlign, MergedRegion, Row, Sheet, Style,
    VerticalAlign, Workbook,
};
