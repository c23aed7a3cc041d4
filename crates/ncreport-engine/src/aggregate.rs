use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::condition::{
    Approval, Comment, Condition, ConditionRecord, Disposition, Link, Part,
};
use crate::records::{ColumnTable, RecordSetKind, RecordSets};

/// Non-fatal faults collected while building the aggregate.
///
/// Diagnostics are a first-class output: a fault in one condition's data never
/// blocks aggregation or rendering of its siblings. Row indices are 0-based
/// data rows within the source record set.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
pub enum Diagnostic {
    #[error("{set} row {row}: condition number {condition_number:?} matches no known condition")]
    MissingParent {
        set: RecordSetKind,
        row: usize,
        condition_number: String,
    },

    #[error(
        "DispositionApprovals row {row}: condition {condition_number:?} has no disposition {disposition_number:?}"
    )]
    UnjoinableApproval {
        row: usize,
        condition_number: String,
        disposition_number: String,
    },

    #[error("Conditions row {row}: duplicate condition number {condition_number:?}")]
    DuplicateCondition { row: usize, condition_number: String },

    #[error("{set}: unrecognized column {column:?}")]
    UnrecognizedColumn { set: RecordSetKind, column: String },
}

/// What to do when the `Conditions` set repeats a condition number.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DuplicatePolicy {
    /// Later rows overwrite earlier ones field-by-field (observed source
    /// behavior for re-exports).
    #[default]
    LastWriteWins,
    /// Keep the first row's values and ignore later ones.
    KeepFirst,
}

/// Aggregation knobs.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct AggregateOptions {
    pub duplicates: DuplicatePolicy,
}

/// The nested per-condition aggregate, in first-encounter order.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Aggregate {
    records: Vec<ConditionRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Aggregate {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, condition_number: &str) -> bool {
        self.index.contains_key(condition_number)
    }

    /// Look up a condition by its number.
    pub fn get(&self, condition_number: &str) -> Option<&ConditionRecord> {
        self.index
            .get(condition_number)
            .map(|&idx| &self.records[idx])
    }

    /// Conditions in the order they were first encountered.
    pub fn iter(&self) -> impl Iterator<Item = &ConditionRecord> {
        self.records.iter()
    }

    fn get_mut(&mut self, condition_number: &str) -> Option<&mut ConditionRecord> {
        self.index
            .get(condition_number)
            .map(|&idx| &mut self.records[idx])
    }

    /// Insert an empty record for `condition`. Callers check for duplicates
    /// first via [`Aggregate::get_mut`].
    fn insert(&mut self, condition: Condition) {
        let idx = self.records.len();
        self.index.insert(condition.number.clone(), idx);
        self.records.push(ConditionRecord::new(condition));
    }
}

impl<'a> IntoIterator for &'a Aggregate {
    type Item = &'a ConditionRecord;
    type IntoIter = std::slice::Iter<'a, ConditionRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Build the nested aggregate from flat record sets with default options.
///
/// Missing record sets are treated as empty; aggregation itself never fails —
/// data-integrity faults come back as [`Diagnostic`]s.
pub fn aggregate(sets: &RecordSets) -> (Aggregate, Vec<Diagnostic>) {
    aggregate_with(sets, &AggregateOptions::default())
}

/// [`aggregate`] with explicit [`AggregateOptions`].
pub fn aggregate_with(
    sets: &RecordSets,
    options: &AggregateOptions,
) -> (Aggregate, Vec<Diagnostic>) {
    let mut out = Aggregate::default();
    let mut diagnostics = Vec::new();

    if let Some(table) = sets.get(RecordSetKind::Conditions) {
        note_unrecognized(
            &mut diagnostics,
            RecordSetKind::Conditions,
            table,
            Condition::COLUMNS,
        );
        for row in 0..table.row_count() {
            let number = table.text("Condition Number", row);
            // Blank keys are export artifacts (trailing empty rows); they can
            // never be referenced by a child row, so they carry no record.
            if number.is_empty() {
                continue;
            }
            if !out.contains(number) {
                out.insert(Condition::from_row(table, row));
                continue;
            }
            diagnostics.push(Diagnostic::DuplicateCondition {
                row,
                condition_number: number.to_string(),
            });
            if options.duplicates == DuplicatePolicy::LastWriteWins {
                if let Some(record) = out.get_mut(number) {
                    record.condition = Condition::from_row(table, row);
                }
            }
        }
    }

    append_children(&mut out, &mut diagnostics, sets, RecordSetKind::Parts);
    append_children(&mut out, &mut diagnostics, sets, RecordSetKind::Dispositions);
    append_children(&mut out, &mut diagnostics, sets, RecordSetKind::Comments);
    append_children(&mut out, &mut diagnostics, sets, RecordSetKind::Links);

    join_approvals(&mut out, &mut diagnostics, sets);

    (out, diagnostics)
}

fn append_children(
    out: &mut Aggregate,
    diagnostics: &mut Vec<Diagnostic>,
    sets: &RecordSets,
    kind: RecordSetKind,
) {
    let Some(table) = sets.get(kind) else {
        return;
    };

    let allowed = match kind {
        RecordSetKind::Parts => Part::COLUMNS,
        RecordSetKind::Dispositions => Disposition::COLUMNS,
        RecordSetKind::Comments => Comment::COLUMNS,
        RecordSetKind::Links => Link::COLUMNS,
        _ => unreachable!("append_children only handles direct child sets"),
    };
    note_unrecognized(diagnostics, kind, table, allowed);

    for row in 0..table.row_count() {
        let number = table.text("Condition Number", row);
        let Some(record) = out.get_mut(number) else {
            diagnostics.push(Diagnostic::MissingParent {
                set: kind,
                row,
                condition_number: number.to_string(),
            });
            continue;
        };
        match kind {
            RecordSetKind::Parts => record.parts.push(Part::from_row(table, row)),
            RecordSetKind::Dispositions => {
                record.dispositions.push(Disposition::from_row(table, row));
            }
            RecordSetKind::Comments => record.comments.push(Comment::from_row(table, row)),
            RecordSetKind::Links => record.links.push(Link::from_row(table, row)),
            _ => unreachable!("append_children only handles direct child sets"),
        }
    }
}

/// The post-aggregation join: approvals are keyed by the composite
/// (Condition Number, Disposition Number) and attach to exactly one
/// disposition. The first append creates the approvals list, so a disposition
/// that was never joined keeps `approvals: None` (absent, not empty).
fn join_approvals(out: &mut Aggregate, diagnostics: &mut Vec<Diagnostic>, sets: &RecordSets) {
    let Some(table) = sets.get(RecordSetKind::DispositionApprovals) else {
        return;
    };
    note_unrecognized(
        diagnostics,
        RecordSetKind::DispositionApprovals,
        table,
        Approval::COLUMNS,
    );

    for row in 0..table.row_count() {
        let condition_number = table.text("Condition Number", row);
        let disposition_number = table.text("Disposition Number", row);

        let Some(record) = out.get_mut(condition_number) else {
            diagnostics.push(Diagnostic::MissingParent {
                set: RecordSetKind::DispositionApprovals,
                row,
                condition_number: condition_number.to_string(),
            });
            continue;
        };

        let Some(disposition) = record
            .dispositions
            .iter_mut()
            .find(|d| d.number == disposition_number)
        else {
            diagnostics.push(Diagnostic::UnjoinableApproval {
                row,
                condition_number: condition_number.to_string(),
                disposition_number: disposition_number.to_string(),
            });
            continue;
        };

        disposition
            .approvals
            .get_or_insert_with(Vec::new)
            .push(Approval::from_row(table, row));
    }
}

fn note_unrecognized(
    diagnostics: &mut Vec<Diagnostic>,
    set: RecordSetKind,
    table: &ColumnTable,
    allowed: &[&str],
) {
    for name in table.header_names() {
        if !allowed.contains(&name) {
            diagnostics.push(Diagnostic::UnrecognizedColumn {
                set,
                column: name.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditions_table(rows: &[(&str, &str)]) -> ColumnTable {
        let data: Vec<Vec<String>> = rows
            .iter()
            .map(|(number, status)| vec![number.to_string(), status.to_string()])
            .collect();
        ColumnTable::from_rows(&["Condition Number", "Status"], &data)
    }

    #[test]
    fn duplicate_conditions_last_write_wins_by_default() {
        let mut sets = RecordSets::new();
        sets.insert(
            RecordSetKind::Conditions,
            conditions_table(&[("C1", "New"), ("C1", "Closed")]),
        );

        let (agg, diags) = aggregate(&sets);
        assert_eq!(agg.len(), 1);
        assert_eq!(
            agg.get("C1").unwrap().condition.status.as_str(),
            "Closed"
        );
        assert!(matches!(
            diags.as_slice(),
            [Diagnostic::DuplicateCondition { row: 1, .. }]
        ));
    }

    #[test]
    fn duplicate_conditions_keep_first_when_configured() {
        let mut sets = RecordSets::new();
        sets.insert(
            RecordSetKind::Conditions,
            conditions_table(&[("C1", "New"), ("C1", "Closed")]),
        );

        let options = AggregateOptions {
            duplicates: DuplicatePolicy::KeepFirst,
        };
        let (agg, diags) = aggregate_with(&sets, &options);
        assert_eq!(agg.get("C1").unwrap().condition.status.as_str(), "New");
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn blank_condition_keys_are_skipped() {
        let mut sets = RecordSets::new();
        sets.insert(
            RecordSetKind::Conditions,
            conditions_table(&[("C1", "New"), ("", "")]),
        );
        let (agg, diags) = aggregate(&sets);
        assert_eq!(agg.len(), 1);
        assert!(diags.is_empty());
    }

    #[test]
    fn missing_record_sets_are_treated_as_empty() {
        let (agg, diags) = aggregate(&RecordSets::new());
        assert!(agg.is_empty());
        assert!(diags.is_empty());
    }
}
