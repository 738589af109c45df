use thiserror::Error;

/// Errors surfaced by structural edits and render policies.
///
/// Only configuration problems surface here. Boundary input that a render
/// policy could produce in normal operation (zero counts, degenerate
/// rectangles, out-of-range removal anchors, empty data) is a deliberate
/// no-op instead, so the policies stay free of special cases.
///
/// A failed call performs no rollback; callers must treat the workbook as
/// unusable after an error escapes a render entry point.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum RenderError {
    /// A referenced sheet index does not exist in the workbook.
    #[error("sheet {sheet} does not exist")]
    SheetNotFound { sheet: usize },
}
