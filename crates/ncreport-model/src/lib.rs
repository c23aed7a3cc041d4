//! `ncreport-model` defines the in-memory output model for grid reports.
//!
//! The crate is intentionally self-contained so it can be reused by:
//! - the aggregation/layout engine (`ncreport-engine`)
//! - serialization boundaries via `serde` (JSON-safe schema)
//!
//! A report is a [`GridDocument`]: an ordered list of named (A1-addressable),
//! styled, rectangular [`Region`]s on a fixed-width logical grid, plus per-row
//! height overrides for spacer rows. Documents live in a [`ReportBook`], which
//! replaces (never merges) a document on regeneration.

mod document;
mod grid;
mod style;

pub use document::{GridDocument, Region, ReportBook};
pub use grid::{A1ParseError, CellRef, Range, RangeParseError, MAX_GRID_COLS, MAX_GRID_ROWS};
pub use style::{
    Alignment, Color, Fill, Font, HorizontalAlignment, Style, StyleTable, VerticalAlignment,
};

/// Fixed logical column span of a report body.
pub const REPORT_COLS: u32 = 8;
