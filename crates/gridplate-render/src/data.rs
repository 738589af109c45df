//! The render-data tree: values waiting to be laid onto the grid.
//!
//! Trees are transient. A caller builds one per render call, hands it to a
//! [`Grid`](crate::Grid) entry point, and the grid mutates in place; the
//! tree itself is never stored.

use gridplate_model::Style;
use serde::{Deserialize, Serialize};

/// Write-type hint consumed when a text value is committed to a cell. It
/// never changes placement, only whether the committed string is parsed
/// into a numeric cell value.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum ValueKind {
    #[default]
    Text,
    Number,
}

/// A text value, optionally styled.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TextData {
    pub text: String,
    pub style: Option<Style>,
    pub kind: ValueKind,
}

impl TextData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style: None,
            kind: ValueKind::Text,
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style: Some(style),
            kind: ValueKind::Text,
        }
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    /// Commit the value as a number when it parses as one.
    pub fn as_number(mut self) -> Self {
        self.kind = ValueKind::Number;
        self
    }
}

impl From<&str> for TextData {
    fn from(text: &str) -> Self {
        TextData::new(text)
    }
}

impl From<String> for TextData {
    fn from(text: String) -> Self {
        TextData::new(text)
    }
}

/// Flow direction of a list.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub enum Direction {
    Horizontal,
    #[default]
    Vertical,
}

/// One item of a list or row: a payload plus the number of *additional*
/// rows and columns it occupies beyond its anchor cell.
///
/// An entry without a payload is skipped by the walkers without advancing
/// the cursor.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct CellEntry {
    pub data: Option<RenderData>,
    pub rowspan: u32,
    pub colspan: u32,
}

impl CellEntry {
    pub fn new(data: impl Into<RenderData>) -> Self {
        Self {
            data: Some(data.into()),
            rowspan: 0,
            colspan: 0,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::new(TextData::new(text))
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_rowspan(mut self, rowspan: u32) -> Self {
        self.rowspan = rowspan;
        self
    }

    pub fn with_colspan(mut self, colspan: u32) -> Self {
        self.colspan = colspan;
        self
    }
}

impl From<TextData> for CellEntry {
    fn from(data: TextData) -> Self {
        CellEntry::new(data)
    }
}

impl From<&str> for CellEntry {
    fn from(text: &str) -> Self {
        CellEntry::text(text)
    }
}

/// An ordered sequence of items flowing vertically or horizontally from the
/// target cell.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ListData {
    pub items: Vec<CellEntry>,
    pub direction: Direction,
    /// Whether the list may grow the grid to fit. When false the items are
    /// rendered into existing capacity.
    pub extension: bool,
    pub style: Option<Style>,
}

impl ListData {
    pub fn new(items: Vec<CellEntry>) -> Self {
        Self {
            items,
            direction: Direction::Vertical,
            extension: true,
            style: None,
        }
    }

    pub fn from_texts<I>(texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| CellEntry::text(t)).collect())
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_extension(mut self, extension: bool) -> Self {
        self.extension = extension;
        self
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl Default for ListData {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

/// One physical row of items, used by tables and horizontal lists.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct RowData {
    pub cells: Vec<CellEntry>,
    pub style: Option<Style>,
}

impl RowData {
    pub fn new(cells: Vec<CellEntry>) -> Self {
        Self { cells, style: None }
    }

    pub fn from_texts<I>(texts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self::new(texts.into_iter().map(|t| CellEntry::text(t)).collect())
    }

    pub fn with_style(mut self, style: Style) -> Self {
        self.style = Some(style);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Header and body rows with independent styles.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct TableData {
    pub header: Vec<RowData>,
    pub body: Vec<RowData>,
    pub header_style: Option<Style>,
    pub body_style: Option<Style>,
}

impl TableData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header_row(mut self, row: RowData) -> Self {
        self.header.push(row);
        self
    }

    pub fn with_body_row(mut self, row: RowData) -> Self {
        self.body.push(row);
        self
    }

    pub fn with_header_style(mut self, style: Style) -> Self {
        self.header_style = Some(style);
        self
    }

    pub fn with_body_style(mut self, style: Style) -> Self {
        self.body_style = Some(style);
        self
    }

    pub fn has_header(&self) -> bool {
        !self.header.is_empty()
    }

    pub fn has_body(&self) -> bool {
        !self.body.is_empty()
    }
}

/// Closed set of render-data variants, dispatched by the render entry
/// points.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum RenderData {
    Text(TextData),
    List(ListData),
    Row(RowData),
    Table(TableData),
}

impl From<TextData> for RenderData {
    fn from(data: TextData) -> Self {
        RenderData::Text(data)
    }
}

impl From<ListData> for RenderData {
    fn from(data: ListData) -> Self {
        RenderData::List(data)
    }
}

impl From<RowData> for RenderData {
    fn from(data: RowData) -> Self {
        RenderData::Row(data)
    }
}

impl From<TableData> for RenderData {
    fn from(data: TableData) -> Self {
        RenderData::Table(data)
    }
}
