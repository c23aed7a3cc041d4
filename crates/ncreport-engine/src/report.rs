use ncreport_model::{
    Alignment, Font, GridDocument, Range, ReportBook, Style, VerticalAlignment, REPORT_COLS,
};

use crate::aggregate::{aggregate_with, AggregateOptions, Diagnostic};
use crate::condition::HeaderInfo;
use crate::header::render_header;
use crate::layout::render_condition;
use crate::records::{RecordSetKind, RecordSets};

/// Name of the generated report document within the book.
pub const REPORT_DOCUMENT_NAME: &str = "Main";

/// Row of the `Conditions (N)` count line.
const COUNT_LINE_ROW: u32 = 4;

/// First row of the condition blocks.
const FIRST_CONDITION_ROW: u32 = 6;

/// Run the full pipeline with default options: aggregate the record sets and
/// regenerate the `Main` document inside `book`.
///
/// Any previous `Main` document is destroyed, never merged into. The returned
/// diagnostics are the aggregation-phase faults (plus unrecognized `Header`
/// columns); they are non-fatal — the report is always produced. Absence of
/// the `Conditions` set yields a report with the header block and a zero
/// count.
pub fn build_report(book: &mut ReportBook, sets: &RecordSets) -> Vec<Diagnostic> {
    build_report_with(book, sets, &AggregateOptions::default())
}

/// [`build_report`] with explicit [`AggregateOptions`].
pub fn build_report_with(
    book: &mut ReportBook,
    sets: &RecordSets,
    options: &AggregateOptions,
) -> Vec<Diagnostic> {
    let (conditions, mut diagnostics) = aggregate_with(sets, options);

    let header = match sets.get(RecordSetKind::Header) {
        Some(table) => {
            for name in table.header_names() {
                if !HeaderInfo::COLUMNS.contains(&name) {
                    diagnostics.push(Diagnostic::UnrecognizedColumn {
                        set: RecordSetKind::Header,
                        column: name.to_string(),
                    });
                }
            }
            HeaderInfo::from_table(table)
        }
        None => HeaderInfo::default(),
    };

    let doc = book.replace(REPORT_DOCUMENT_NAME, REPORT_COLS);
    render_header(doc, &header);
    write_count_line(doc, conditions.len());

    let mut row = FIRST_CONDITION_ROW;
    for record in conditions.iter() {
        row = render_condition(doc, record, row);
    }

    diagnostics
}

fn write_count_line(doc: &mut GridDocument, count: usize) {
    doc.write_styled(
        Range::row_span(COUNT_LINE_ROW, 0, 0),
        format!("Conditions ({count})"),
        Style {
            font: Some(Font {
                size_100pt: Some(1300),
                bold: true,
                color: None,
            }),
            alignment: Some(Alignment {
                horizontal: None,
                vertical: Some(VerticalAlignment::Center),
                wrap_text: false,
            }),
            ..Style::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use ncreport_model::ReportBook;

    use super::*;
    use crate::records::ColumnTable;

    #[test]
    fn missing_conditions_set_yields_header_and_zero_count() {
        let mut book = ReportBook::new();
        let diagnostics = build_report(&mut book, &RecordSets::new());
        assert!(diagnostics.is_empty());

        let doc = book.document(REPORT_DOCUMENT_NAME).unwrap();
        // Header block (4 regions) + count line.
        assert_eq!(doc.regions.len(), 5);
        assert_eq!(doc.regions[4].text, "Conditions (0)");
    }

    #[test]
    fn rebuilding_replaces_the_previous_report() {
        let mut book = ReportBook::new();
        build_report(&mut book, &RecordSets::new());
        let first = book.document(REPORT_DOCUMENT_NAME).unwrap().clone();

        build_report(&mut book, &RecordSets::new());
        assert_eq!(book.documents.len(), 1);
        assert_eq!(book.document(REPORT_DOCUMENT_NAME).unwrap(), &first);
    }

    #[test]
    fn unrecognized_header_columns_are_flagged() {
        let mut sets = RecordSets::new();
        let mut table = ColumnTable::new();
        table.push_column("NC Number", vec!["NC-1".to_string()]);
        table.push_column("Legacy Field", vec!["x".to_string()]);
        sets.insert(RecordSetKind::Header, table);

        let mut book = ReportBook::new();
        let diagnostics = build_report(&mut book, &sets);
        assert_eq!(
            diagnostics,
            vec![Diagnostic::UnrecognizedColumn {
                set: RecordSetKind::Header,
                column: "Legacy Field".to_string(),
            }]
        );
    }
}
