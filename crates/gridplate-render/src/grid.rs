//! Merge-aware workbook wrapper and the structural edit operations.
//!
//! Every operation here has to answer the same question twice: what happens
//! to the cells, and what happens to the merged regions laid over them. The
//! answers follow grid-editor conventions: merges grow when rows or columns
//! are inserted through them, shrink when one is removed through them, and
//! dissolve when their anchor is removed or overwritten.
//!
//! Consistency strategy is correctness-first: operations adjust the native
//! merge lists and then fully rebuild the [`RegionIndex`]. The only
//! incremental patch is the append-one-region fast path used by the render
//! walkers.

use gridplate_model::{Cell, DEFAULT_COLUMN_WIDTH, MergedRegion, Sheet, Workbook};

use crate::error::RenderError;
use crate::region::RegionIndex;

/// A workbook paired with the index of its merged regions.
///
/// Single-threaded by design: a render either completes or fails
/// synchronously, and callers serialize access to one `Grid`. There is no
/// rollback; after an error escapes, the workbook contents are undefined.
#[derive(Clone, Debug, Default)]
pub struct Grid {
    pub(crate) book: Workbook,
    pub(crate) regions: RegionIndex,
}

impl Grid {
    /// A blank workbook with one sheet and an empty index.
    pub fn new() -> Self {
        Self {
            book: Workbook::new(),
            regions: RegionIndex::new(),
        }
    }

    /// Wraps an existing workbook, building the index from its native
    /// merge lists.
    pub fn from_workbook(book: Workbook) -> Self {
        let regions = RegionIndex::from_workbook(&book);
        Self { book, regions }
    }

    pub fn book(&self) -> &Workbook {
        &self.book
    }

    /// Mutable access to the underlying workbook. Callers that touch a
    /// sheet's native merge list through this must call
    /// [`refresh_regions`](Self::refresh_regions) before the next query.
    pub fn book_mut(&mut self) -> &mut Workbook {
        &mut self.book
    }

    pub fn into_inner(self) -> Workbook {
        self.book
    }

    pub fn regions(&self) -> &RegionIndex {
        &self.regions
    }

    /// Rebuilds the region index from the document model.
    pub fn refresh_regions(&mut self) {
        self.regions.rebuild(&self.book);
    }

    pub fn region_at(&self, sheet: usize, row: u32, col: u32) -> Option<MergedRegion> {
        self.regions.region_at(sheet, row, col)
    }

    pub fn is_merged(&self, sheet: usize, row: u32, col: u32) -> bool {
        self.regions.is_merged(sheet, row, col)
    }

    pub fn is_region_start(&self, sheet: usize, row: u32, col: u32) -> bool {
        self.regions.is_region_start(sheet, row, col)
    }

    pub(crate) fn sheet_ref(&self, sheet: usize) -> Result<&Sheet, RenderError> {
        self.book.sheet(sheet).ok_or(RenderError::SheetNotFound { sheet })
    }

    pub(crate) fn sheet_mut_ref(&mut self, sheet: usize) -> Result<&mut Sheet, RenderError> {
        self.book
            .sheet_mut(sheet)
            .ok_or(RenderError::SheetNotFound { sheet })
    }

    pub fn cell(&self, sheet: usize, row: u32, col: u32) -> Option<&Cell> {
        self.book.sheet(sheet)?.row(row)?.cell(col)
    }

    /// Display string of a cell's value, if the cell exists.
    pub fn cell_text(&self, sheet: usize, row: u32, col: u32) -> Option<String> {
        self.cell(sheet, row, col)
            .map(|cell| cell.value.to_display_string())
    }

    /// Auto-vivifies the row and cell on access.
    pub fn get_or_create_cell(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
    ) -> Result<&mut Cell, RenderError> {
        let sheet = self.sheet_mut_ref(sheet)?;
        Ok(sheet.get_or_create_row(row).get_or_create_cell(col))
    }

    /// Merges a rectangle of cells.
    ///
    /// Malformed (`first > last`) and degenerate (single cell) rectangles
    /// are silent no-ops. Every non-anchor cell of the rectangle loses its
    /// value; the anchor keeps its own. With `rebuild_now` false the index
    /// is patched in place, which is only sound when no other region
    /// shifted in the same edit.
    pub fn add_merged_region(
        &mut self,
        sheet: usize,
        first_row: u32,
        last_row: u32,
        first_col: u32,
        last_col: u32,
        rebuild_now: bool,
    ) -> Result<(), RenderError> {
        if first_row > last_row || first_col > last_col {
            return Ok(());
        }
        if first_row == last_row && first_col == last_col {
            return Ok(());
        }
        let region = MergedRegion::new(first_row, last_row, first_col, last_col);
        let sheet_index = sheet;
        let sheet = self.sheet_mut_ref(sheet_index)?;
        for row in first_row..=last_row {
            let Some(row_data) = sheet.row_mut(row) else {
                continue;
            };
            for col in first_col..=last_col {
                if row == first_row && col == first_col {
                    continue;
                }
                if let Some(cell) = row_data.cell_mut(col) {
                    cell.clear_value();
                }
            }
        }
        let handle = sheet.add_merged_region(region);
        if rebuild_now {
            self.regions.rebuild(&self.book);
        } else {
            self.regions.insert(sheet_index, region, handle);
        }
        Ok(())
    }

    /// Splits the merge covering a coordinate. No merge there is a no-op.
    ///
    /// Removal shifts the handles of every later region in the native
    /// list, so with `rebuild_now` false the caller owns the rebuild
    /// before the next handle-based operation.
    pub fn remove_merged_region(
        &mut self,
        sheet: usize,
        row: u32,
        col: u32,
        rebuild_now: bool,
    ) -> Result<(), RenderError> {
        let Some(region) = self.regions.region_at(sheet, row, col) else {
            return Ok(());
        };
        let Some(handle) = self.regions.handle(sheet, region) else {
            return Ok(());
        };
        self.sheet_mut_ref(sheet)?.remove_merged_region(handle);
        if rebuild_now {
            self.regions.rebuild(&self.book);
        }
        Ok(())
    }

    /// Inserts `count` blank rows before row `at`. Rows at or after `at`
    /// shift down; merges straddling the boundary grow by `count`.
    pub fn insert_rows_before(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_rows_at(sheet, at, count, at + count)
    }

    /// Inserts `count` blank rows after row `at`.
    pub fn insert_rows_after(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_rows_at(sheet, at + 1, count, at)
    }

    /// Shared row insertion: `pivot` is the first shifted row index and
    /// `style_source` the row (valid after the shift) whose cells seed the
    /// inserted rows inside straddling regions.
    fn insert_rows_at(
        &mut self,
        sheet_index: usize,
        pivot: u32,
        count: u32,
        style_source: u32,
    ) -> Result<(), RenderError> {
        let sheet = self.sheet_mut_ref(sheet_index)?;

        // Shift rows at or after the boundary down, back to front.
        if let Some(last) = sheet.last_row_index() {
            if last >= pivot {
                for index in (pivot..=last).rev() {
                    match sheet.take_row(index) {
                        Some(row) => sheet.set_row(index + count, row),
                        None => sheet.remove_row_entry(index + count),
                    }
                }
            }
        }
        for index in pivot..pivot + count {
            sheet.create_row(index);
        }

        // Regions keep their shape, shift with their anchor, or grow when
        // the boundary cuts through them.
        let mut straddles = Vec::new();
        for handle in 0..sheet.merged_regions().len() {
            let region = sheet.merged_regions()[handle];
            if region.last_row < pivot {
                continue;
            }
            let adjusted = if region.first_row >= pivot {
                MergedRegion::new(
                    region.first_row + count,
                    region.last_row + count,
                    region.first_col,
                    region.last_col,
                )
            } else {
                straddles.push(region);
                MergedRegion::new(
                    region.first_row,
                    region.last_row + count,
                    region.first_col,
                    region.last_col,
                )
            };
            sheet.replace_merged_region(handle, adjusted);
        }

        // A straddled block must look uniform: the inserted rows take
        // their cells from the boundary row across the region's columns,
        // values cleared since they are interior.
        for region in &straddles {
            for index in pivot..pivot + count {
                for col in region.first_col..=region.last_col {
                    let Some(mut cell) = sheet
                        .row(style_source)
                        .and_then(|row| row.cell(col))
                        .cloned()
                    else {
                        continue;
                    };
                    cell.clear_value();
                    sheet.get_or_create_row(index).set_cell(col, cell);
                }
            }
        }

        self.regions.rebuild(&self.book);
        Ok(())
    }

    /// Removes one row. Merges anchored at it dissolve with their cells
    /// cleared; merges reaching past it shrink by one; merges entirely
    /// below shift up with their content. Missing sheet or out-of-range
    /// row is a no-op.
    pub fn remove_row(&mut self, sheet_index: usize, row: u32) {
        let Some(sheet) = self.book.sheet_mut(sheet_index) else {
            return;
        };
        let Some(last) = sheet.last_row_index() else {
            return;
        };
        if row > last {
            return;
        }

        let mut handle = 0;
        while handle < sheet.merged_regions().len() {
            let region = sheet.merged_regions()[handle];
            if region.first_row == row {
                sheet.remove_merged_region(handle);
                for r in region.first_row..=region.last_row {
                    let Some(row_data) = sheet.row_mut(r) else {
                        continue;
                    };
                    for c in region.first_col..=region.last_col {
                        row_data.create_cell(c);
                    }
                }
                continue;
            }
            let adjusted = if region.first_row < row && region.last_row >= row {
                MergedRegion::new(
                    region.first_row,
                    region.last_row - 1,
                    region.first_col,
                    region.last_col,
                )
            } else if region.first_row > row {
                MergedRegion::new(
                    region.first_row - 1,
                    region.last_row - 1,
                    region.first_col,
                    region.last_col,
                )
            } else {
                handle += 1;
                continue;
            };
            if adjusted.is_single_cell() {
                sheet.remove_merged_region(handle);
                continue;
            }
            sheet.replace_merged_region(handle, adjusted);
            handle += 1;
        }

        // Rows below move up one; the vacated last slot goes away.
        for index in row..last {
            match sheet.take_row(index + 1) {
                Some(moved) => sheet.set_row(index, moved),
                None => sheet.remove_row_entry(index),
            }
        }
        if row == last {
            sheet.remove_row_entry(last);
        }
        self.regions.rebuild(&self.book);
    }

    /// Inserts `count` blank columns before column `at`. Cells at or after
    /// `at` shift right; straddled merges grow and replicate the column
    /// just left of the boundary; widths shift with the content.
    pub fn insert_columns_before(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_columns_at(sheet, at, count)
    }

    /// Inserts `count` blank columns after column `at`.
    pub fn insert_columns_after(
        &mut self,
        sheet: usize,
        at: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        if count == 0 {
            return Ok(());
        }
        self.insert_columns_at(sheet, at + 1, count)
    }

    /// Shared column insertion: `pivot` is the first shifted column index.
    fn insert_columns_at(
        &mut self,
        sheet_index: usize,
        pivot: u32,
        count: u32,
    ) -> Result<(), RenderError> {
        let sheet = self.sheet_mut_ref(sheet_index)?;

        // Shift cells right, bottom to top and right to left, then blank
        // the vacated span in every existing row.
        let row_indices = sheet.row_indices();
        for &row_index in row_indices.iter().rev() {
            let Some(row) = sheet.row_mut(row_index) else {
                continue;
            };
            if let Some(last_cell) = row.last_cell_index() {
                if last_cell >= pivot {
                    for col in (pivot..=last_cell).rev() {
                        if let Some(cell) = row.take_cell(col) {
                            row.set_cell(col + count, cell);
                        }
                    }
                }
            }
            for col in pivot..pivot + count {
                row.create_cell(col);
            }
        }

        let mut straddles = Vec::new();
        for handle in 0..sheet.merged_regions().len() {
            let region = sheet.merged_regions()[handle];
            if region.last_col < pivot {
                continue;
            }
            let adjusted = if region.first_col >= pivot {
                MergedRegion::new(
                    region.first_row,
                    region.last_row,
                    region.first_col + count,
                    region.last_col + count,
                )
            } else {
                straddles.push(region);
                MergedRegion::new(
                    region.first_row,
                    region.last_row,
                    region.first_col,
                    region.last_col + count,
                )
            };
            sheet.replace_merged_region(handle, adjusted);
        }

        // Straddled blocks replicate the column just left of the boundary
        // into the inserted span, values cleared since they are interior.
        if let Some(source_col) = pivot.checked_sub(1) {
            for region in &straddles {
                for row_index in region.first_row..=region.last_row {
                    let Some(mut cell) = sheet
                        .row(row_index)
                        .and_then(|row| row.cell(source_col))
                        .cloned()
                    else {
                        continue;
                    };
                    cell.clear_value();
                    let Some(row) = sheet.row_mut(row_index) else {
                        continue;
                    };
                    for col in pivot..pivot + count {
                        row.set_cell(col, cell.clone());
                    }
                }
            }
        }

        // Widths move with their columns; the inserted span takes the
        // default width.
        let shifted: Vec<u32> = sheet
            .explicit_column_widths()
            .map(|(col, _)| col)
            .filter(|col| *col >= pivot)
            .collect();
        for &col in shifted.iter().rev() {
            if let Some(width) = sheet.take_column_width(col) {
                sheet.set_column_width(col + count, width);
            }
        }
        for col in pivot..pivot + count {
            sheet.set_column_width(col, DEFAULT_COLUMN_WIDTH);
        }

        self.regions.rebuild(&self.book);
        Ok(())
    }

    /// Removes one column, shifting everything right of it left by one.
    ///
    /// Implemented through a disposable scratch sheet used as a
    /// single-column buffer: each column travels main → scratch → main
    /// one position left, which re-anchors merges along the way. Merges
    /// anchored at the removed column dissolve with cleared cells; merges
    /// spanning across it shrink by one.
    pub fn remove_column(&mut self, sheet_index: usize, col: u32) -> Result<(), RenderError> {
        self.sheet_ref(sheet_index)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(sheet = sheet_index, col, "removing column through scratch sheet");
        let scratch = self.book.create_sheet("gridplate-scratch");
        let result = self.shift_columns_left(sheet_index, col, scratch);
        // The scratch sheet never survives the call, error or not.
        self.book.remove_sheet(scratch);
        self.regions.rebuild(&self.book);
        result
    }

    fn shift_columns_left(
        &mut self,
        sheet_index: usize,
        col: u32,
        scratch: usize,
    ) -> Result<(), RenderError> {
        let sheet = self.sheet_mut_ref(sheet_index)?;
        let mut handle = 0;
        while handle < sheet.merged_regions().len() {
            let region = sheet.merged_regions()[handle];
            if region.first_col == col {
                sheet.remove_merged_region(handle);
                for r in region.first_row..=region.last_row {
                    let Some(row) = sheet.row_mut(r) else {
                        continue;
                    };
                    for c in region.first_col..=region.last_col {
                        row.create_cell(c);
                    }
                }
                continue;
            }
            if region.first_col < col && region.last_col >= col {
                let adjusted = MergedRegion::new(
                    region.first_row,
                    region.last_row,
                    region.first_col,
                    region.last_col - 1,
                );
                if adjusted.is_single_cell() {
                    sheet.remove_merged_region(handle);
                    continue;
                }
                sheet.replace_merged_region(handle, adjusted);
            }
            handle += 1;
        }
        let max_col = sheet.max_cell_index();
        self.regions.rebuild(&self.book);
        let Some(max_col) = max_col else {
            return Ok(());
        };
        if col > max_col {
            return Ok(());
        }

        // Regions anchored right of the removed column travel with their
        // anchor cells: replicated onto the scratch sheet, dissolved on
        // the main sheet, then replicated back one column to the left.
        for index in col..=max_col {
            self.copy_column(scratch, 0, sheet_index, index + 1)?;
            let last_row = self.book.sheet(sheet_index).and_then(Sheet::last_row_index);
            if let Some(last_row) = last_row {
                for row in 0..=last_row {
                    if self.regions.is_region_start(sheet_index, row, index + 1) {
                        self.remove_merged_region(sheet_index, row, index + 1, true)?;
                    }
                }
            }
            self.copy_column(sheet_index, index, scratch, 0)?;
        }
        Ok(())
    }

    /// Replaces the target row with a copy of the source row. Merges
    /// anchored in the source row are duplicated at the target row with
    /// the same spans; the source merges stay untouched.
    pub fn copy_row(&mut self, sheet_index: usize, target: u32, source: u32) -> Result<(), RenderError> {
        let sheet = self.sheet_mut_ref(sheet_index)?;
        match sheet.row(source).cloned() {
            None => {
                sheet.create_row(target);
                return Ok(());
            }
            Some(row) => sheet.set_row(target, row),
        }

        let anchored: Vec<MergedRegion> = sheet
            .merged_regions()
            .iter()
            .copied()
            .filter(|region| region.first_row == source)
            .collect();
        for region in anchored {
            // Whatever merge the copy landed on dissolves first.
            self.remove_merged_region(sheet_index, target, region.first_col, true)?;
            self.add_merged_region(
                sheet_index,
                target,
                target + region.height() - 1,
                region.first_col,
                region.first_col + region.width() - 1,
                true,
            )?;
        }
        Ok(())
    }

    /// Row-by-row merge-aware cell copy between two columns, possibly on
    /// different sheets. Rows and cells come into existence on demand on
    /// both sides.
    pub fn copy_column(
        &mut self,
        target_sheet: usize,
        target_col: u32,
        source_sheet: usize,
        source_col: u32,
    ) -> Result<(), RenderError> {
        self.sheet_ref(target_sheet)?;
        let last_row = self.sheet_ref(source_sheet)?.last_row_index();
        let Some(last_row) = last_row else {
            return Ok(());
        };
        for row in 0..=last_row {
            let has_source = self.cell(source_sheet, row, source_col).is_some();
            let has_target = self.cell(target_sheet, row, target_col).is_some();
            if !has_source && !has_target {
                continue;
            }
            self.copy_cell(target_sheet, row, target_col, source_sheet, row, source_col)?;
        }
        Ok(())
    }

    /// Copies one cell, carrying merge structure along.
    ///
    /// A target that anchors a merge splits it first; a target inside a
    /// merge refuses the copy. A source that anchors a merge replicates
    /// its whole rectangle at the target origin and merges it there; a
    /// source inside a merge produces a blank hole cell.
    pub fn copy_cell(
        &mut self,
        target_sheet: usize,
        target_row: u32,
        target_col: u32,
        source_sheet: usize,
        source_row: u32,
        source_col: u32,
    ) -> Result<(), RenderError> {
        self.sheet_ref(target_sheet)?;
        self.sheet_ref(source_sheet)?;

        if self.regions.is_region_start(target_sheet, target_row, target_col) {
            self.remove_merged_region(target_sheet, target_row, target_col, true)?;
        } else if self.regions.is_merged(target_sheet, target_row, target_col) {
            return Ok(());
        }

        let source_cell = self
            .cell(source_sheet, source_row, source_col)
            .cloned()
            .unwrap_or_default();
        *self.get_or_create_cell(target_sheet, target_row, target_col)? = source_cell;

        if let Some(region) = self.regions.region_at(source_sheet, source_row, source_col) {
            if region.is_start(source_row, source_col) {
                for row in region.first_row..=region.last_row {
                    let row_offset = row - region.first_row;
                    for col in region.first_col..=region.last_col {
                        let Some(cell) = self.cell(source_sheet, row, col).cloned() else {
                            continue;
                        };
                        let col_offset = col - region.first_col;
                        *self.get_or_create_cell(
                            target_sheet,
                            target_row + row_offset,
                            target_col + col_offset,
                        )? = cell;
                    }
                }
                self.add_merged_region(
                    target_sheet,
                    target_row,
                    target_row + region.height() - 1,
                    target_col,
                    target_col + region.width() - 1,
                    true,
                )?;
            } else {
                *self.get_or_create_cell(target_sheet, target_row, target_col)? = Cell::new();
            }
        }
        Ok(())
    }
}
