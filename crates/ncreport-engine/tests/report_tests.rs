use pretty_assertions::assert_eq;

use ncreport_engine::{
    build_report, ColumnTable, RecordSetKind, RecordSets, REPORT_DOCUMENT_NAME,
};
use ncreport_model::ReportBook;

fn table(headers: &[&str], rows: &[&[&str]]) -> ColumnTable {
    let rows: Vec<Vec<String>> = rows
        .iter()
        .map(|row| row.iter().map(|s| s.to_string()).collect())
        .collect();
    ColumnTable::from_rows(headers, &rows)
}

fn snapshot() -> RecordSets {
    let mut sets = RecordSets::new();
    sets.insert(
        RecordSetKind::Header,
        table(
            &["NC Number", "Status", "NC Assignee", "Modified Date", "Modified By User"],
            &[&["NC-7", "In Progress", "qa.lead", "2024-03-04+00:00", "qa.lead"]],
        ),
    );
    sets.insert(
        RecordSetKind::Conditions,
        table(
            &["Condition Number", "Status"],
            &[&["C1", "Open"], &["C2", "Closed"]],
        ),
    );
    sets.insert(
        RecordSetKind::Comments,
        table(
            &["Condition Number", "Author", "Comment"],
            &[&["C2", "alice", "resolved at source"]],
        ),
    );
    sets
}

#[test]
fn pipeline_threads_the_cursor_across_conditions() {
    let mut book = ReportBook::new();
    let diagnostics = build_report(&mut book, &snapshot());
    assert!(diagnostics.is_empty());

    let doc = book.document(REPORT_DOCUMENT_NAME).unwrap();
    assert_eq!(doc.find_overlap(), None);

    // Conditions start at row 6; C1 has no children (31 rows), so C2's
    // opening banner sits at row 37 and its one comment adds 3 rows.
    let c1_banner = doc
        .regions
        .iter()
        .find(|r| r.text == "Condition C1")
        .expect("C1 banner");
    assert_eq!(c1_banner.range.start.row, 6);

    let c2_banner = doc
        .regions
        .iter()
        .find(|r| r.text == "Condition C2")
        .expect("C2 banner");
    assert_eq!(c2_banner.range.start.row, 37);

    // C2's block ends with its banner at row 66; the trailing gap rows after
    // the last condition carry no content.
    assert_eq!(doc.used_rows(), 67);
}

#[test]
fn count_line_reflects_the_aggregate() {
    let mut book = ReportBook::new();
    build_report(&mut book, &snapshot());
    let doc = book.document(REPORT_DOCUMENT_NAME).unwrap();

    let count = doc
        .regions
        .iter()
        .find(|r| r.text.starts_with("Conditions ("))
        .expect("count line");
    assert_eq!(count.text, "Conditions (2)");
    assert_eq!(count.range.start.row, 4);
}

#[test]
fn rebuilding_from_the_same_snapshot_is_identical() {
    let sets = snapshot();

    let mut book = ReportBook::new();
    build_report(&mut book, &sets);
    let first = book.document(REPORT_DOCUMENT_NAME).unwrap().clone();

    build_report(&mut book, &sets);
    let second = book.document(REPORT_DOCUMENT_NAME).unwrap();

    assert_eq!(second, &first);
    assert_eq!(book.documents.len(), 1);
}

#[test]
fn faults_in_one_condition_do_not_block_siblings() {
    let mut sets = snapshot();
    sets.insert(
        RecordSetKind::Parts,
        table(
            &["Condition Number", "Part Number"],
            &[&["C9", "P-ORPHAN"]],
        ),
    );

    let mut book = ReportBook::new();
    let diagnostics = build_report(&mut book, &sets);
    assert_eq!(diagnostics.len(), 1);

    let doc = book.document(REPORT_DOCUMENT_NAME).unwrap();
    assert!(doc.regions.iter().any(|r| r.text == "Condition C1"));
    assert!(doc.regions.iter().any(|r| r.text == "Condition C2"));
}
