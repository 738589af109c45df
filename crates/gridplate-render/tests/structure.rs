//! Structural edits and their effect on merged regions.

use gridplate_render::{Grid, MergedRegion, RenderError, Workbook};

/// Every registered region must be reachable from every coordinate it
/// covers, with no stray mappings and no drift from the native lists.
fn assert_regions_consistent(grid: &Grid) {
    let mut area = 0usize;
    for (sheet, region) in grid.regions().iter() {
        for row in region.first_row..=region.last_row {
            for col in region.first_col..=region.last_col {
                assert_eq!(
                    grid.region_at(sheet, row, col),
                    Some(region),
                    "coordinate ({sheet},{row},{col}) must map to its region"
                );
            }
        }
        area += (region.height() * region.width()) as usize;
    }
    assert_eq!(grid.regions().covered_cell_count(), area);
    let native: usize = grid
        .book()
        .sheets()
        .iter()
        .map(|sheet| sheet.merged_regions().len())
        .sum();
    assert_eq!(grid.regions().len(), native);
}

fn text(grid: &Grid, row: u32, col: u32) -> String {
    grid.cell_text(0, row, col).unwrap_or_default()
}

#[test]
fn merging_clears_every_cell_but_the_anchor() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "A").unwrap();
    grid.set_cell_text(0, 0, 1, "B").unwrap();
    grid.set_cell_text(0, 1, 0, "C").unwrap();
    grid.set_cell_text(0, 1, 1, "D").unwrap();

    grid.add_merged_region(0, 0, 1, 0, 1, true).unwrap();

    assert_eq!(text(&grid, 0, 0), "A");
    assert_eq!(text(&grid, 0, 1), "");
    assert_eq!(text(&grid, 1, 0), "");
    assert_eq!(text(&grid, 1, 1), "");
    assert_regions_consistent(&grid);
}

#[test]
fn insert_rows_before_grows_straddled_regions_only() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 2, 0, "head").unwrap();
    grid.set_cell_text(0, 5, 3, "below").unwrap();
    grid.set_cell_text(0, 0, 3, "above").unwrap();
    grid.add_merged_region(0, 2, 4, 0, 1, true).unwrap();
    grid.add_merged_region(0, 0, 1, 3, 4, true).unwrap();
    grid.add_merged_region(0, 5, 6, 3, 4, true).unwrap();

    grid.insert_rows_before(0, 3, 2).unwrap();

    // Straddled: grown by exactly the inserted count.
    assert_eq!(grid.region_at(0, 2, 0), Some(MergedRegion::new(2, 6, 0, 1)));
    // Entirely above: unchanged.
    assert_eq!(grid.region_at(0, 0, 3), Some(MergedRegion::new(0, 1, 3, 4)));
    // Entirely below: same shape, moved with its content.
    assert_eq!(grid.region_at(0, 7, 3), Some(MergedRegion::new(7, 8, 3, 4)));
    assert_eq!(text(&grid, 7, 3), "below");
    assert_eq!(text(&grid, 2, 0), "head");
    assert_regions_consistent(&grid);
}

#[test]
fn insert_rows_after_leaves_regions_ending_at_the_anchor() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "top").unwrap();
    grid.add_merged_region(0, 0, 2, 0, 0, true).unwrap();
    grid.add_merged_region(0, 2, 2, 2, 3, true).unwrap();

    grid.insert_rows_after(0, 2, 2).unwrap();

    // Ends at the boundary row: untouched by the structural insert.
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 2, 0, 0)));
    assert_eq!(grid.region_at(0, 2, 2), Some(MergedRegion::new(2, 2, 2, 3)));
    assert_regions_consistent(&grid);

    grid.insert_rows_after(0, 1, 1).unwrap();
    // Cut through the middle: grown.
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 3, 0, 0)));
    assert_regions_consistent(&grid);
}

#[test]
fn remove_row_at_anchor_clears_the_block() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "top").unwrap();
    grid.set_cell_text(0, 3, 0, "below").unwrap();
    grid.add_merged_region(0, 0, 2, 0, 1, true).unwrap();

    grid.remove_row(0, 0);

    assert!(grid.regions().is_empty());
    assert_eq!(text(&grid, 0, 0), "");
    assert_eq!(text(&grid, 1, 0), "");
    // Content below the block moved up one row.
    assert_eq!(text(&grid, 2, 0), "below");
    assert_regions_consistent(&grid);
}

#[test]
fn remove_row_through_the_middle_shrinks_the_block() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "top").unwrap();
    grid.set_cell_text(0, 3, 0, "below").unwrap();
    grid.add_merged_region(0, 0, 2, 0, 1, true).unwrap();

    grid.remove_row(0, 1);

    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 1, 0, 1)));
    assert_eq!(text(&grid, 0, 0), "top");
    assert_eq!(text(&grid, 2, 0), "below");
    assert_regions_consistent(&grid);
}

#[test]
fn remove_row_shifts_regions_below_with_their_content() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "gone").unwrap();
    grid.set_cell_text(0, 4, 2, "kept").unwrap();
    grid.add_merged_region(0, 4, 5, 2, 3, true).unwrap();

    grid.remove_row(0, 0);

    assert_eq!(grid.region_at(0, 3, 2), Some(MergedRegion::new(3, 4, 2, 3)));
    assert_eq!(text(&grid, 3, 2), "kept");
    assert_regions_consistent(&grid);
}

#[test]
fn remove_row_out_of_range_is_a_no_op() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 1, 0, "x").unwrap();
    grid.remove_row(0, 9);
    grid.remove_row(5, 0);
    assert_eq!(text(&grid, 1, 0), "x");
    assert_eq!(grid.book().sheet(0).unwrap().last_row_index(), Some(1));
}

#[test]
fn copy_row_duplicates_merges_and_leaves_the_source_alone() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 2, 1, "m").unwrap();
    grid.set_cell_text(0, 2, 0, "left").unwrap();
    grid.add_merged_region(0, 2, 2, 1, 3, true).unwrap();

    grid.copy_row(0, 5, 2).unwrap();

    assert_eq!(grid.region_at(0, 5, 1), Some(MergedRegion::new(5, 5, 1, 3)));
    assert_eq!(grid.region_at(0, 2, 1), Some(MergedRegion::new(2, 2, 1, 3)));
    assert_eq!(text(&grid, 5, 1), "m");
    assert_eq!(text(&grid, 5, 0), "left");
    assert_eq!(text(&grid, 2, 1), "m");
    assert_regions_consistent(&grid);
}

#[test]
fn copy_row_onto_a_merge_anchor_replaces_it() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 2, 1, "src").unwrap();
    grid.add_merged_region(0, 2, 2, 1, 2, true).unwrap();
    grid.set_cell_text(0, 6, 1, "old").unwrap();
    grid.add_merged_region(0, 6, 6, 1, 4, true).unwrap();

    grid.copy_row(0, 6, 2).unwrap();

    assert_eq!(grid.region_at(0, 6, 1), Some(MergedRegion::new(6, 6, 1, 2)));
    assert_eq!(text(&grid, 6, 1), "src");
    assert_regions_consistent(&grid);
}

#[test]
fn copy_row_from_missing_source_blanks_the_target() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 4, 0, "old").unwrap();
    grid.copy_row(0, 4, 9).unwrap();
    assert_eq!(text(&grid, 4, 0), "");
}

#[test]
fn insert_columns_before_shifts_cells_widths_and_regions() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "a").unwrap();
    grid.set_cell_text(0, 0, 1, "b").unwrap();
    grid.set_cell_text(0, 0, 3, "d").unwrap();
    grid.get_or_create_cell(0, 1, 1).unwrap();
    grid.get_or_create_cell(0, 1, 2).unwrap();
    grid.add_merged_region(0, 0, 1, 1, 2, true).unwrap();
    grid.book_mut().sheet_mut(0).unwrap().set_column_width(3, 999);

    grid.insert_columns_before(0, 2, 1).unwrap();

    assert_eq!(text(&grid, 0, 0), "a");
    assert_eq!(text(&grid, 0, 1), "b");
    assert_eq!(text(&grid, 0, 4), "d");
    assert_eq!(grid.region_at(0, 0, 1), Some(MergedRegion::new(0, 1, 1, 3)));
    let sheet = grid.book().sheet(0).unwrap();
    assert_eq!(sheet.column_width(4), 999);
    assert_eq!(sheet.column_width(2), gridplate_render::DEFAULT_COLUMN_WIDTH);
    assert_regions_consistent(&grid);
}

#[test]
fn insert_columns_after_respects_the_boundary() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.set_cell_text(0, 0, 5, "far").unwrap();
    grid.add_merged_region(0, 0, 0, 0, 2, true).unwrap();

    grid.insert_columns_after(0, 2, 2).unwrap();

    // Ends exactly at the boundary column: untouched.
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 0, 0, 2)));
    assert_eq!(text(&grid, 0, 7), "far");
    assert_regions_consistent(&grid);

    grid.insert_columns_after(0, 1, 1).unwrap();
    // Cut through the middle: grown.
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 0, 0, 3)));
    assert_regions_consistent(&grid);
}

#[test]
fn zero_counts_change_nothing() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "x").unwrap();
    grid.insert_rows_before(0, 0, 0).unwrap();
    grid.insert_rows_after(0, 0, 0).unwrap();
    grid.insert_columns_before(0, 0, 0).unwrap();
    grid.insert_columns_after(0, 0, 0).unwrap();
    assert_eq!(grid.book().sheet(0).unwrap().last_row_index(), Some(0));
    assert_eq!(text(&grid, 0, 0), "x");
}

#[test]
fn remove_column_shifts_content_left() {
    let mut grid = Grid::new();
    for (col, value) in ["a", "b", "c", "d"].iter().enumerate() {
        grid.set_cell_text(0, 0, col as u32, *value).unwrap();
    }

    grid.remove_column(0, 1).unwrap();

    assert_eq!(text(&grid, 0, 0), "a");
    assert_eq!(text(&grid, 0, 1), "c");
    assert_eq!(text(&grid, 0, 2), "d");
    assert_eq!(text(&grid, 0, 3), "");
    // The scratch sheet never survives the call.
    assert_eq!(grid.book().sheet_count(), 1);
}

#[test]
fn remove_column_moves_merges_anchored_to_its_right() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "a").unwrap();
    grid.set_cell_text(0, 0, 1, "b").unwrap();
    grid.set_cell_text(0, 0, 2, "m").unwrap();
    grid.set_cell_text(0, 0, 3, "x").unwrap();
    grid.add_merged_region(0, 0, 0, 2, 3, true).unwrap();

    grid.remove_column(0, 0).unwrap();

    assert_eq!(text(&grid, 0, 0), "b");
    assert_eq!(text(&grid, 0, 1), "m");
    assert_eq!(grid.region_at(0, 0, 1), Some(MergedRegion::new(0, 0, 1, 2)));
    assert_eq!(grid.book().sheet_count(), 1);
    assert_regions_consistent(&grid);
}

#[test]
fn remove_column_at_anchor_releases_the_merge() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 1, "m").unwrap();
    grid.set_cell_text(0, 0, 3, "r").unwrap();
    grid.add_merged_region(0, 0, 1, 1, 2, true).unwrap();

    grid.remove_column(0, 1).unwrap();

    assert!(grid.regions().is_empty());
    assert_eq!(text(&grid, 0, 0), "");
    // Content beyond the dissolved block shifted left by one.
    assert_eq!(text(&grid, 0, 2), "r");
    assert_regions_consistent(&grid);
}

#[test]
fn remove_column_through_a_spanning_merge_shrinks_it_once() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.set_cell_text(0, 0, 3, "r").unwrap();
    grid.get_or_create_cell(0, 2, 0).unwrap();
    grid.add_merged_region(0, 0, 2, 0, 2, true).unwrap();

    grid.remove_column(0, 1).unwrap();

    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 2, 0, 1)));
    assert_eq!(text(&grid, 0, 0), "m");
    assert_eq!(text(&grid, 0, 2), "r");
    assert_regions_consistent(&grid);
}

#[test]
fn copy_cell_replicates_a_source_block() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.get_or_create_cell(0, 1, 1).unwrap();
    grid.add_merged_region(0, 0, 1, 0, 1, true).unwrap();

    grid.copy_cell(0, 4, 4, 0, 0, 0).unwrap();

    assert_eq!(grid.region_at(0, 4, 4), Some(MergedRegion::new(4, 5, 4, 5)));
    assert_eq!(text(&grid, 4, 4), "m");
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 1, 0, 1)));
    assert_regions_consistent(&grid);
}

#[test]
fn copy_cell_refuses_a_merged_interior_target() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.set_cell_text(0, 4, 0, "src").unwrap();
    grid.add_merged_region(0, 0, 1, 0, 1, true).unwrap();

    grid.copy_cell(0, 1, 1, 0, 4, 0).unwrap();

    assert_eq!(text(&grid, 1, 1), "");
    assert_eq!(grid.region_at(0, 0, 0), Some(MergedRegion::new(0, 1, 0, 1)));
}

#[test]
fn copy_cell_onto_an_anchor_splits_the_merge_first() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.add_merged_region(0, 0, 1, 0, 1, true).unwrap();
    grid.set_cell_text(0, 5, 5, "p").unwrap();

    grid.copy_cell(0, 0, 0, 0, 5, 5).unwrap();

    assert!(grid.regions().is_empty());
    assert_eq!(text(&grid, 0, 0), "p");
    assert_regions_consistent(&grid);
}

#[test]
fn copy_cell_from_a_merged_interior_leaves_a_hole() {
    let mut grid = Grid::new();
    grid.set_cell_text(0, 0, 0, "m").unwrap();
    grid.get_or_create_cell(0, 1, 1).unwrap();
    grid.add_merged_region(0, 0, 1, 0, 1, true).unwrap();
    grid.set_cell_text(0, 4, 0, "old").unwrap();

    grid.copy_cell(0, 4, 0, 0, 1, 1).unwrap();

    assert_eq!(text(&grid, 4, 0), "");
    assert!(grid.cell(0, 4, 0).is_some());
}

#[test]
fn copy_column_crosses_sheets() {
    let mut book = Workbook::new();
    book.create_sheet("Sheet2");
    let mut grid = Grid::from_workbook(book);
    grid.set_cell_text(0, 0, 1, "x").unwrap();
    grid.set_cell_text(0, 2, 1, "y").unwrap();

    grid.copy_column(1, 0, 0, 1).unwrap();

    assert_eq!(grid.cell_text(1, 0, 0).as_deref(), Some("x"));
    assert_eq!(grid.cell_text(1, 2, 0).as_deref(), Some("y"));
}

#[test]
fn missing_sheets_are_reported() {
    let mut grid = Grid::new();
    assert_eq!(
        grid.copy_column(0, 0, 7, 0).unwrap_err(),
        RenderError::SheetNotFound { sheet: 7 }
    );
    assert_eq!(
        grid.remove_column(3, 0).unwrap_err(),
        RenderError::SheetNotFound { sheet: 3 }
    );
    assert_eq!(
        grid.copy_cell(2, 0, 0, 0, 0, 0).unwrap_err(),
        RenderError::SheetNotFound { sheet: 2 }
    );
}
