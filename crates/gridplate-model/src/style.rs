//! Cell style facets.
//!
//! Styles are flat bundles of optional facets. Applying a style to a cell
//! means replacing the cell's style slot wholesale; there is no cascade or
//! inheritance between styles in the model.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum VerticalAlign {
    Top,
    Middle,
    Bottom,
}

/// Visual facets applied to a cell.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Style {
    pub font_name: Option<String>,
    pub font_size: Option<u16>,
    pub bold: bool,
    pub italic: bool,
    /// Hex color such as `"FF0000"`.
    pub font_color: Option<String>,
    pub fill_color: Option<String>,
    pub align: Option<HorizontalAlign>,
    pub valign: Option<VerticalAlign>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    pub fn italic(mut self) -> Self {
        self.italic = true;
        self
    }

    pub fn with_font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    pub fn with_font_size(mut self, size: u16) -> Self {
        self.font_size = Some(size);
        self
    }

    pub fn with_font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = Some(color.into());
        self
    }

    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn with_align(mut self, align: HorizontalAlign) -> Self {
        self.align = Some(align);
        self
    }

    pub fn with_valign(mut self, valign: VerticalAlign) -> Self {
        self.valign = Some(valign);
        self
    }
}
