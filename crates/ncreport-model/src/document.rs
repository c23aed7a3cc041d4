use std::collections::BTreeMap;

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::{Range, Style, StyleTable};

/// One styled, rectangular unit of a [`GridDocument`].
///
/// A region spanning multiple rows/columns is a single addressable unit; its
/// A1 range is its name (see the `Display` impl).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// The cells the region occupies.
    pub range: Range,

    /// Text content. Reports are string-valued; numeric formatting is out of
    /// scope for this model.
    #[serde(default)]
    pub text: String,

    /// Index into the document style table.
    #[serde(default)]
    pub style_id: u32,
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.range)
    }
}

/// A single report document: an append-only list of regions on a fixed-width
/// logical grid.
///
/// Layout code guarantees regions never overlap by walking a monotonically
/// advancing row cursor; [`GridDocument::find_overlap`] exists so tests can
/// pin that invariant.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridDocument {
    /// Document name, unique within a [`ReportBook`].
    pub name: String,

    /// Logical column span of the document body.
    pub columns: u32,

    /// Emitted regions, in emission order.
    #[serde(default)]
    pub regions: Vec<Region>,

    /// Height overrides in pixels, keyed by 0-indexed row. Rows without an
    /// entry use the host's default height.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub row_heights: BTreeMap<u32, f32>,

    /// Document style table (deduplicated).
    #[serde(default)]
    pub styles: StyleTable,
}

impl GridDocument {
    /// Create a new empty document.
    pub fn new(name: impl Into<String>, columns: u32) -> Self {
        Self {
            name: name.into(),
            columns,
            regions: Vec::new(),
            row_heights: BTreeMap::new(),
            styles: StyleTable::new(),
        }
    }

    /// Append a region with an already-interned style.
    pub fn write(&mut self, range: Range, text: impl Into<String>, style_id: u32) {
        self.regions.push(Region {
            range,
            text: text.into(),
            style_id,
        });
    }

    /// Append a region, interning `style` into the document style table.
    pub fn write_styled(&mut self, range: Range, text: impl Into<String>, style: Style) {
        let style_id = self.styles.intern(style);
        self.write(range, text, style_id);
    }

    /// Intern (deduplicate) a style into the document's style table.
    pub fn intern_style(&mut self, style: Style) -> u32 {
        self.styles.intern(style)
    }

    /// Record a pixel height override for `row` (spacer/margin rows).
    pub fn set_row_height(&mut self, row: u32, pixels: f32) {
        self.row_heights.insert(row, pixels);
    }

    /// Number of rows the document occupies: one past the last row touched by
    /// any region or height override.
    pub fn used_rows(&self) -> u32 {
        let region_rows = self
            .regions
            .iter()
            .map(|r| r.range.end.row + 1)
            .max()
            .unwrap_or(0);
        let height_rows = self
            .row_heights
            .keys()
            .next_back()
            .map(|row| row + 1)
            .unwrap_or(0);
        region_rows.max(height_rows)
    }

    /// Find the first pair of overlapping regions, if any.
    ///
    /// Returns indices into [`GridDocument::regions`].
    pub fn find_overlap(&self) -> Option<(usize, usize)> {
        for (i, a) in self.regions.iter().enumerate() {
            for (j, b) in self.regions.iter().enumerate().skip(i + 1) {
                if a.range.intersects(&b.range) {
                    return Some((i, j));
                }
            }
        }
        None
    }
}

/// An ordered set of report documents.
///
/// Reports are fully regenerated on each run: [`ReportBook::replace`] destroys
/// any existing document with the same name rather than merging or appending.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportBook {
    #[serde(default)]
    pub documents: Vec<GridDocument>,
}

impl ReportBook {
    /// Create an empty book.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh document named `name`, dropping any existing document
    /// with the same name first.
    pub fn replace(&mut self, name: impl Into<String>, columns: u32) -> &mut GridDocument {
        let name = name.into();
        if let Some(idx) = self.documents.iter().position(|d| d.name == name) {
            self.documents.remove(idx);
        }
        self.documents.push(GridDocument::new(name, columns));
        self.documents
            .last_mut()
            .expect("document was just pushed")
    }

    /// Get a document by name.
    pub fn document(&self, name: &str) -> Option<&GridDocument> {
        self.documents.iter().find(|d| d.name == name)
    }
}
