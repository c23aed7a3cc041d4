use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The record sets a report snapshot may contain.
///
/// All child sets share the `Condition Number` foreign-key column; `Header` is
/// a condition-independent singleton.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordSetKind {
    Conditions,
    Parts,
    Dispositions,
    Comments,
    Links,
    DispositionApprovals,
    Header,
}

impl RecordSetKind {
    /// Every recognized kind, in aggregation order.
    pub const ALL: [RecordSetKind; 7] = [
        RecordSetKind::Conditions,
        RecordSetKind::Parts,
        RecordSetKind::Dispositions,
        RecordSetKind::Comments,
        RecordSetKind::Links,
        RecordSetKind::DispositionApprovals,
        RecordSetKind::Header,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RecordSetKind::Conditions => "Conditions",
            RecordSetKind::Parts => "Parts",
            RecordSetKind::Dispositions => "Dispositions",
            RecordSetKind::Comments => "Comments",
            RecordSetKind::Links => "Links",
            RecordSetKind::DispositionApprovals => "DispositionApprovals",
            RecordSetKind::Header => "Header",
        }
    }

    /// Look up a kind by record-set name (case-insensitive, like sheet names).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl core::fmt::Display for RecordSetKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One named column of a [`ColumnTable`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub values: Vec<String>,
}

/// A column-oriented table of strings: field name to one ordered value per row.
///
/// This is the shape the external loader hands the engine — every cell is
/// text, missing cells read as empty. Lookup is by exact header name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnTable {
    columns: Vec<Column>,
}

impl ColumnTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a header row plus data rows.
    ///
    /// Short rows are padded with empty cells; extra cells beyond the header
    /// are dropped.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<String>]) -> Self {
        let mut columns: Vec<Column> = headers
            .iter()
            .map(|h| Column {
                name: h.as_ref().to_string(),
                values: Vec::with_capacity(rows.len()),
            })
            .collect();
        for row in rows {
            for (i, column) in columns.iter_mut().enumerate() {
                column.values.push(row.get(i).cloned().unwrap_or_default());
            }
        }
        Self { columns }
    }

    /// Append a complete column.
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<String>) {
        self.columns.push(Column {
            name: name.into(),
            values,
        });
    }

    /// Header names in table order.
    pub fn header_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// The values of a column, by exact header name.
    pub fn column(&self, name: &str) -> Option<&[String]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Number of data rows (the longest column).
    pub fn row_count(&self) -> usize {
        self.columns.iter().map(|c| c.values.len()).max().unwrap_or(0)
    }

    /// Cell text at (`name`, `row`); missing columns and short rows read as
    /// empty.
    pub fn text(&self, name: &str, row: usize) -> &str {
        self.column(name)
            .and_then(|values| values.get(row))
            .map(String::as_str)
            .unwrap_or("")
    }
}

/// A snapshot of named record sets.
///
/// Absence of any set is tolerated — consumers treat a missing set as empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordSets {
    tables: HashMap<RecordSetKind, ColumnTable>,
}

impl RecordSets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the table for `kind`.
    pub fn insert(&mut self, kind: RecordSetKind, table: ColumnTable) {
        self.tables.insert(kind, table);
    }

    pub fn get(&self, kind: RecordSetKind) -> Option<&ColumnTable> {
        self.tables.get(&kind)
    }

    pub fn contains(&self, kind: RecordSetKind) -> bool {
        self.tables.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_lookup_is_case_insensitive() {
        assert_eq!(
            RecordSetKind::from_name("conditions"),
            Some(RecordSetKind::Conditions)
        );
        assert_eq!(
            RecordSetKind::from_name(" DispositionApprovals "),
            Some(RecordSetKind::DispositionApprovals)
        );
        assert_eq!(RecordSetKind::from_name("Sheet1"), None);
    }

    #[test]
    fn from_rows_pads_short_rows() {
        let table = ColumnTable::from_rows(
            &["A", "B"],
            &[
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string()],
            ],
        );
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.text("A", 1), "3");
        assert_eq!(table.text("B", 1), "");
        assert_eq!(table.text("C", 0), "");
    }
}
