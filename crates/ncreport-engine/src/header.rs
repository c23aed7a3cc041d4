use ncreport_model::{
    Alignment, CellRef, Color, Fill, Font, GridDocument, HorizontalAlignment, Range, Style,
    VerticalAlignment,
};

use crate::condition::HeaderInfo;
use crate::layout::condition_status_fill;

/// Render the fixed 3-row, 8-column summary block at the document origin.
///
/// Shape and span are condition-independent: NC number, colored status badge,
/// assignee line, and the "last updated on/by" line resolved through the
/// modified-else-created fallback. Unrecognized statuses render with no fill.
pub fn render_header(doc: &mut GridDocument, header: &HeaderInfo) {
    doc.write_styled(
        Range::row_span(0, 0, 0),
        header.nc_number.as_str(),
        Style {
            font: Some(Font {
                size_100pt: Some(1600),
                bold: true,
                color: None,
            }),
            ..Style::default()
        },
    );

    doc.write_styled(
        Range::row_span(0, 1, 3),
        header.status.as_str(),
        Style {
            font: Some(Font {
                size_100pt: Some(1300),
                bold: true,
                color: Some(Color::white()),
            }),
            fill: condition_status_fill(&header.status).map(|background| Fill {
                background: Some(background),
            }),
            alignment: Some(Alignment {
                horizontal: Some(HorizontalAlignment::Center),
                vertical: Some(VerticalAlignment::Center),
                wrap_text: false,
            }),
        },
    );

    doc.write_styled(
        Range::row_span(0, 4, 7),
        format!("Assignee: {}", header.assignee),
        Style {
            alignment: Some(Alignment {
                horizontal: Some(HorizontalAlignment::Right),
                vertical: Some(VerticalAlignment::Center),
                wrap_text: false,
            }),
            ..Style::default()
        },
    );

    doc.write_styled(
        Range::new(CellRef::new(1, 4), CellRef::new(2, 7)),
        format!(
            "Last updated on {}\nby {}",
            header.update.date().local,
            header.update.user()
        ),
        Style {
            font: Some(Font {
                color: Some(Color::from_rgb(0x6B6B6B)),
                ..Font::default()
            }),
            alignment: Some(Alignment {
                horizontal: Some(HorizontalAlignment::Right),
                vertical: None,
                wrap_text: false,
            }),
            ..Style::default()
        },
    );
}

#[cfg(test)]
mod tests {
    use ncreport_model::{GridDocument, REPORT_COLS};

    use super::*;
    use crate::condition::{ConditionStatus, Stamp, UpdateInfo};

    fn sample_header() -> HeaderInfo {
        HeaderInfo {
            nc_number: "NC-1041".to_string(),
            status: ConditionStatus::InProgress,
            assignee: "r.vega".to_string(),
            update: UpdateInfo {
                created: Stamp::parse("2024-01-01+00:00"),
                created_by: "alice".to_string(),
                modified: Stamp::parse(""),
                modified_by: String::new(),
            },
        }
    }

    #[test]
    fn header_block_is_three_rows_and_four_regions() {
        let mut doc = GridDocument::new("Main", REPORT_COLS);
        render_header(&mut doc, &sample_header());
        assert_eq!(doc.regions.len(), 4);
        assert_eq!(doc.used_rows(), 3);
        assert_eq!(doc.find_overlap(), None);
    }

    #[test]
    fn updated_line_applies_created_fallback() {
        let mut doc = GridDocument::new("Main", REPORT_COLS);
        render_header(&mut doc, &sample_header());
        let updated = &doc.regions[3];
        assert_eq!(updated.text, "Last updated on 2024-01-01\nby alice");
    }

    #[test]
    fn unrecognized_status_renders_without_fill() {
        let mut doc = GridDocument::new("Main", REPORT_COLS);
        let header = HeaderInfo {
            status: ConditionStatus::parse("Escalated"),
            ..sample_header()
        };
        render_header(&mut doc, &header);
        let badge = &doc.regions[1];
        assert_eq!(badge.text, "Escalated");
        let style = doc.styles.get(badge.style_id).unwrap();
        assert!(style.fill.is_none());
    }
}
