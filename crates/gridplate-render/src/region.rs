//! Lookup structures over every merged region registered with the document
//! model.
//!
//! The coordinate map trades O(region area) memory for O(1) point queries.
//! That trade is what makes rendering affordable: every cell a policy is
//! about to write gets checked against existing merges first.

use gridplate_model::{MergedRegion, Workbook};
use rustc_hash::FxHashMap;

/// Index over the merged regions of every sheet in a workbook.
///
/// Built once at load, then either fully rebuilt after an edit or patched
/// incrementally when a single region was appended and nothing else moved.
/// Handles mirror each region's position in its sheet's native merge list;
/// they go stale as soon as a region is removed, which is why removal paths
/// always end in a rebuild.
#[derive(Clone, Debug, Default)]
pub struct RegionIndex {
    regions: Vec<(usize, MergedRegion)>,
    by_coord: FxHashMap<(usize, u32, u32), MergedRegion>,
    handles: FxHashMap<(usize, MergedRegion), usize>,
}

impl RegionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workbook(book: &Workbook) -> Self {
        let mut index = Self::new();
        index.rebuild(book);
        index
    }

    /// Drops everything and rescans the native merge list of every sheet.
    pub fn rebuild(&mut self, book: &Workbook) {
        self.regions.clear();
        self.by_coord.clear();
        self.handles.clear();
        for (sheet_index, sheet) in book.sheets().iter().enumerate() {
            for (handle, region) in sheet.merged_regions().iter().enumerate() {
                self.insert(sheet_index, *region, handle);
            }
        }
    }

    /// Incremental patch for a region just appended to a sheet's native
    /// list. Only valid when no other region shifted.
    pub(crate) fn insert(&mut self, sheet: usize, region: MergedRegion, handle: usize) {
        self.regions.push((sheet, region));
        self.handles.insert((sheet, region), handle);
        for row in region.first_row..=region.last_row {
            for col in region.first_col..=region.last_col {
                self.by_coord.insert((sheet, row, col), region);
            }
        }
    }

    /// The region covering a coordinate, if any.
    pub fn region_at(&self, sheet: usize, row: u32, col: u32) -> Option<MergedRegion> {
        self.by_coord.get(&(sheet, row, col)).copied()
    }

    pub fn is_merged(&self, sheet: usize, row: u32, col: u32) -> bool {
        self.by_coord.contains_key(&(sheet, row, col))
    }

    /// True when the coordinate is the anchor of a region.
    pub fn is_region_start(&self, sheet: usize, row: u32, col: u32) -> bool {
        self.region_at(sheet, row, col)
            .is_some_and(|region| region.is_start(row, col))
    }

    pub(crate) fn handle(&self, sheet: usize, region: MergedRegion) -> Option<usize> {
        self.handles.get(&(sheet, region)).copied()
    }

    /// Every registered region, tagged with its sheet index.
    pub fn iter(&self) -> impl Iterator<Item = (usize, MergedRegion)> + '_ {
        self.regions.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Number of coordinates covered by any region. Equals the summed area
    /// of all regions as long as none overlap.
    pub fn covered_cell_count(&self) -> usize {
        self.by_coord.len()
    }
}
