//! Render policies: mapping render-data values onto grid coordinates.
//!
//! Each policy receives a target coordinate and mutates the grid in place:
//! it asks the structural layer for the rows or columns its data will
//! occupy, walks the data placing one item per free coordinate, and flows
//! around any coordinate that is already covered by a merged region it does
//! not anchor. Lists and tables recurse through the dispatcher, so nested
//! values expand the grid further from their own anchor cells.
//!
//! Placeholder substitution is explicit: entry points take the token as a
//! parameter and renders stay reentrant, with no ambient template state.

use gridplate_model::{CellValue, MergedRegion, Style};

use crate::data::{Direction, ListData, RenderData, RowData, TableData, TextData, ValueKind};
use crate::error::RenderError;
use crate::grid::Grid;

impl Grid {
    /// Renders any value at the target cell, dispatching on its variant.
    ///
    /// `placeholder` carries the substitution token: when the target cell's
    /// existing content contains it, the committed text replaces the token
    /// in place, letting one cell combine literal text with a substitution
    /// point. Without a token (or without a match) the value overwrites.
    pub fn render(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        data: &RenderData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        match data {
            RenderData::Text(text) => self.render_text(sheet, row, col, Some(text), placeholder),
            RenderData::List(list) => self.render_list(sheet, row, col, list, placeholder),
            RenderData::Row(row_data) => self.render_row(sheet, row, col, row_data, placeholder),
            RenderData::Table(table) => self.render_table(sheet, row, col, table, placeholder),
        }
    }

    /// Text policy. Absent data renders as empty text, which clears the
    /// cell value. The [`ValueKind`] hint only affects how the composed
    /// string is committed, never placement.
    pub fn render_text(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        data: Option<&TextData>,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        let fallback = TextData::default();
        let data = data.unwrap_or(&fallback);
        let existing = self
            .cell(sheet, row, col)
            .map(|cell| cell.value.to_display_string())
            .unwrap_or_default();
        let committed = match placeholder {
            Some(token) if !token.is_empty() && existing.contains(token) => {
                existing.replace(token, &data.text)
            }
            _ => data.text.clone(),
        };
        let value = if committed.is_empty() {
            CellValue::Empty
        } else if matches!(data.kind, ValueKind::Number) {
            committed
                .parse::<f64>()
                .map(CellValue::Number)
                .unwrap_or(CellValue::Text(committed))
        } else {
            CellValue::Text(committed)
        };
        let cell = self.get_or_create_cell(sheet, row, col)?;
        if let Some(style) = &data.style {
            cell.style = Some(style.clone());
        }
        cell.value = value;
        Ok(())
    }

    /// Writes a plain text value through the text policy, no substitution.
    pub fn set_cell_text(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        text: impl Into<String>,
    ) -> Result<(), RenderError> {
        self.render_text(sheet, row, col, Some(&TextData::new(text)), None)
    }

    pub fn set_cell_data(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        data: &TextData,
    ) -> Result<(), RenderError> {
        self.render_text(sheet, row, col, Some(data), None)
    }

    /// List policy, dispatching on direction.
    pub fn render_list(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        list: &ListData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        match list.direction {
            Direction::Horizontal => self.render_horizontal_list(sheet, row, col, list, placeholder),
            Direction::Vertical => self.render_vertical_list(sheet, row, col, list, placeholder),
        }
    }

    fn render_vertical_list(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        list: &ListData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        self.get_or_create_cell(sheet, row, col)?.clear_value();
        if list.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(sheet, row, col, "empty list, cell cleared");
            return Ok(());
        }
        if list.extension {
            let total: u32 = list.items.iter().map(|entry| entry.rowspan + 1).sum();
            self.expand_rows_at(sheet, row, total - 1)?;
        }
        let mut cursor = row;
        let mut index = 0;
        while index < list.items.len() {
            let entry = &list.items[index];
            let Some(data) = &entry.data else {
                index += 1;
                continue;
            };
            match self.regions.region_at(sheet, cursor, col) {
                None => {
                    if entry.rowspan > 0 || entry.colspan > 0 {
                        self.add_merged_region(
                            sheet,
                            cursor,
                            cursor + entry.rowspan,
                            col,
                            col + entry.colspan,
                            false,
                        )?;
                    }
                    self.apply_style(sheet, cursor, col, list.style.as_ref())?;
                    self.render(sheet, cursor, col, data, placeholder)?;
                    cursor += entry.rowspan + 1;
                    index += 1;
                }
                Some(region) => {
                    if region.is_start(cursor, col) {
                        self.apply_style(sheet, cursor, col, list.style.as_ref())?;
                        self.render(sheet, cursor, col, data, placeholder)?;
                        index += 1;
                    }
                    // Flow around the merged block either way; an item that
                    // hit its interior is retried past it.
                    cursor = region.last_row + 1;
                }
            }
        }
        self.regions.rebuild(&self.book);
        Ok(())
    }

    fn render_horizontal_list(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        list: &ListData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        self.get_or_create_cell(sheet, row, col)?.clear_value();
        if list.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(sheet, row, col, "empty list, cell cleared");
            return Ok(());
        }
        if list.extension {
            let total: u32 = list.items.iter().map(|entry| entry.colspan + 1).sum();
            self.expand_cols_at(sheet, col, total - 1)?;
        }
        let row_data = RowData {
            cells: list.items.clone(),
            style: None,
        };
        self.render_row_cells(sheet, row, col, &row_data, list.style.as_ref(), placeholder)
    }

    /// Renders one physical row of items starting at the target column.
    pub fn render_row(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        data: &RowData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        self.render_row_cells(sheet, row, col, data, None, placeholder)
    }

    /// Table policy: header rows immediately followed by body rows, one
    /// physical row each; span growth inside a row was already paid for by
    /// the row walker's merges.
    pub fn render_table(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        table: &TableData,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        self.get_or_create_cell(sheet, row, col)?.clear_value();
        if !table.has_header() && !table.has_body() {
            #[cfg(feature = "tracing")]
            tracing::debug!(sheet, row, col, "empty table, cell cleared");
            return Ok(());
        }
        let total = (table.header.len() + table.body.len()) as u32;
        self.expand_rows_at(sheet, row, total - 1)?;
        let mut cursor = row;
        for row_data in &table.header {
            self.render_row_cells(
                sheet,
                cursor,
                col,
                row_data,
                table.header_style.as_ref(),
                placeholder,
            )?;
            cursor += 1;
        }
        for row_data in &table.body {
            self.render_row_cells(
                sheet,
                cursor,
                col,
                row_data,
                table.body_style.as_ref(),
                placeholder,
            )?;
            cursor += 1;
        }
        Ok(())
    }

    /// Shared row walker: the same anchor/skip/advance loop as the
    /// vertical list, with the cursor moving along columns. Styles cascade
    /// outer, then row, then the item's own inside the text policy.
    fn render_row_cells(
        &mut self,
        sheet: usize,
        row: u32,
        start_col: u32,
        data: &RowData,
        outer: Option<&Style>,
        placeholder: Option<&str>,
    ) -> Result<(), RenderError> {
        let mut cursor = start_col;
        let mut index = 0;
        while index < data.cells.len() {
            let entry = &data.cells[index];
            let Some(item) = &entry.data else {
                index += 1;
                continue;
            };
            match self.regions.region_at(sheet, row, cursor) {
                None => {
                    if entry.rowspan > 0 || entry.colspan > 0 {
                        self.add_merged_region(
                            sheet,
                            row,
                            row + entry.rowspan,
                            cursor,
                            cursor + entry.colspan,
                            false,
                        )?;
                    }
                    self.apply_style(sheet, row, cursor, outer)?;
                    self.apply_style(sheet, row, cursor, data.style.as_ref())?;
                    self.render(sheet, row, cursor, item, placeholder)?;
                    cursor += entry.colspan + 1;
                    index += 1;
                }
                Some(region) => {
                    if region.is_start(row, cursor) {
                        self.apply_style(sheet, row, cursor, outer)?;
                        self.apply_style(sheet, row, cursor, data.style.as_ref())?;
                        self.render(sheet, row, cursor, item, placeholder)?;
                        index += 1;
                    }
                    cursor = region.last_col + 1;
                }
            }
        }
        self.regions.rebuild(&self.book);
        Ok(())
    }

    /// Row pre-insertion for lists and tables: grows the grid below the
    /// anchor row, seeds every inserted row with a copy of the anchor row
    /// (placeholder text included, so substitution happens per row), then
    /// settles the anchor row's merges over the insertion.
    fn expand_rows_at(&mut self, sheet_index: usize, row: u32, count: u32) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_rows_after(sheet_index, row, count)?;

        let template = self.sheet_ref(sheet_index)?.row(row).cloned();
        if let Some(template) = template {
            let sheet = self.sheet_mut_ref(sheet_index)?;
            for index in row + 1..=row + count {
                sheet.set_row(index, template.clone());
            }
        }

        let snapshot: Vec<MergedRegion> = self.sheet_ref(sheet_index)?.merged_regions().to_vec();

        // Merges contained in the anchor row repeat in every inserted row.
        for region in snapshot
            .iter()
            .filter(|r| r.first_row == row && r.last_row == row)
        {
            for index in row + 1..=row + count {
                self.add_merged_region(
                    sheet_index,
                    index,
                    index,
                    region.first_col,
                    region.last_col,
                    true,
                )?;
            }
        }
        // Multi-row merges ending at the anchor row stretch over the
        // insertion; ones cut by the boundary already grew.
        for region in snapshot
            .iter()
            .filter(|r| r.first_row < row && r.last_row == row)
        {
            self.remove_merged_region(sheet_index, region.first_row, region.first_col, true)?;
            self.add_merged_region(
                sheet_index,
                region.first_row,
                region.last_row + count,
                region.first_col,
                region.last_col,
                true,
            )?;
        }
        Ok(())
    }

    /// Column pre-insertion for horizontal lists: grows the grid right of
    /// the anchor column and repeats its unmerged cells into the inserted
    /// columns.
    fn expand_cols_at(&mut self, sheet_index: usize, col: u32, count: u32) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_columns_after(sheet_index, col, count)?;

        let row_indices = self.sheet_ref(sheet_index)?.row_indices();
        for row in row_indices {
            let Some(source) = self.cell(sheet_index, row, col).cloned() else {
                continue;
            };
            if self.regions.is_merged(sheet_index, row, col) {
                continue;
            }
            let sheet = self.sheet_mut_ref(sheet_index)?;
            let Some(row_data) = sheet.row_mut(row) else {
                continue;
            };
            for index in col + 1..=col + count {
                row_data.set_cell(index, source.clone());
            }
        }
        Ok(())
    }

    fn apply_style(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        style: Option<&Style>,
    ) -> Result<(), RenderError> {
        if let Some(style) = style {
            self.get_or_create_cell(sheet, row, col)?.style = Some(style.clone());
        }
        Ok(())
    }
}
