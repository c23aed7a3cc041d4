//! The sequential grid layout engine.
//!
//! One call to [`render_condition`] emits every block for one condition in a
//! fixed order, on a canvas [`ncreport_model::REPORT_COLS`] columns wide. The
//! row cursor is an
//! explicit value: each emitter takes the first free row and returns the next
//! one, so block heights are data-dependent and computed only by walking the
//! same sequence used to render. There is no backtracking and no shared
//! mutable counter.

use ncreport_model::{
    Alignment, CellRef, Color, Fill, Font, GridDocument, HorizontalAlignment, Range, Style,
    VerticalAlignment,
};

use crate::condition::{
    Comment, Condition, ConditionRecord, ConditionStatus, Disposition, DispositionStatus,
    DispositionType, Link, Part,
};
use crate::sanitize::sanitize;

const TEXT_MUTED: Color = Color::from_rgb(0x6B6B6B);

const FILL_DARK_BLUE: Color = Color::from_rgb(0x1F3864);
const FILL_ORANGE: Color = Color::from_rgb(0xC65911);
const FILL_GREEN: Color = Color::from_rgb(0x71AF84);
const FILL_RED: Color = Color::from_rgb(0xAF1909);
const FILL_GRAY: Color = Color::from_rgb(0x969696);
const FILL_NEAR_BLACK: Color = Color::from_rgb(0x111111);

/// Pixel height of the thin spacer rows between blocks.
const SPACER_PX: f32 = 10.0;
const APPROVAL_HEADER_PX: f32 = 20.0;
const APPROVAL_MARGIN_PX: f32 = 12.0;
const FIELD_ROW_PX: f32 = 33.0;

/// Rows consumed by the end-of-condition banner plus the gap that follows it.
const END_BANNER_ROWS: u32 = 5;

/// Fill for a condition-level status badge. Unrecognized statuses get no fill.
pub fn condition_status_fill(status: &ConditionStatus) -> Option<Color> {
    match status {
        ConditionStatus::New | ConditionStatus::Open => Some(FILL_DARK_BLUE),
        ConditionStatus::InProgress => Some(FILL_ORANGE),
        ConditionStatus::Closed => Some(FILL_GREEN),
        ConditionStatus::PendingClosure => Some(FILL_RED),
        ConditionStatus::Other(_) => None,
    }
}

/// Fill for a disposition status badge. Anything but `Completed` is neutral.
pub fn disposition_status_fill(status: &DispositionStatus) -> Color {
    match status {
        DispositionStatus::Completed => FILL_GREEN,
        DispositionStatus::Other(_) => FILL_GRAY,
    }
}

fn full_row(row: u32) -> Range {
    Range::row_span(row, 0, 7)
}

fn bold(size_100pt: u16) -> Style {
    Style {
        font: Some(Font {
            size_100pt: Some(size_100pt),
            bold: true,
            color: None,
        }),
        ..Style::default()
    }
}

fn label() -> Style {
    Style {
        font: Some(Font {
            bold: true,
            ..Font::default()
        }),
        ..Style::default()
    }
}

fn section_header(size_100pt: u16) -> Style {
    Style {
        font: Some(Font {
            size_100pt: Some(size_100pt),
            bold: true,
            color: None,
        }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Center),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: false,
        }),
        ..Style::default()
    }
}

fn badge(size_100pt: u16, fill: Option<Color>) -> Style {
    Style {
        font: Some(Font {
            size_100pt: Some(size_100pt),
            bold: true,
            color: Some(Color::white()),
        }),
        fill: fill.map(|background| Fill {
            background: Some(background),
        }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Center),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: false,
        }),
    }
}

fn muted_right() -> Style {
    Style {
        font: Some(Font {
            color: Some(TEXT_MUTED),
            ..Font::default()
        }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Right),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: false,
        }),
        ..Style::default()
    }
}

fn muted() -> Style {
    Style {
        font: Some(Font {
            color: Some(TEXT_MUTED),
            ..Font::default()
        }),
        ..Style::default()
    }
}

fn wrapped() -> Style {
    Style {
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Left),
            vertical: Some(VerticalAlignment::Top),
            wrap_text: true,
        }),
        ..Style::default()
    }
}

fn wrapped_center() -> Style {
    Style {
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Left),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: true,
        }),
        ..Style::default()
    }
}

fn field() -> Style {
    Style {
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Left),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: false,
        }),
        ..Style::default()
    }
}

fn bold_field(wrap_text: bool) -> Style {
    Style {
        font: Some(Font {
            bold: true,
            ..Font::default()
        }),
        alignment: Some(Alignment {
            horizontal: None,
            vertical: Some(VerticalAlignment::Center),
            wrap_text,
        }),
        ..Style::default()
    }
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(v) => v,
        None => "N/A",
    }
}

/// Render one condition's region, starting at `start_row`.
///
/// Returns the row index immediately available for the next sibling
/// condition. Deterministic and idempotent for identical inputs; callers must
/// not assume any fixed block height.
pub fn render_condition(
    doc: &mut GridDocument,
    record: &ConditionRecord,
    start_row: u32,
) -> u32 {
    let condition = &record.condition;

    let mut row = emit_banner(doc, condition, start_row);
    row = emit_condition_updated(doc, condition, row);
    row = emit_attribute_pair(doc, "Where Found:", &condition.where_found, row);
    row = emit_attribute_pair(doc, "Problem Source:", &condition.problem_source, row);
    row = emit_attribute_pair(doc, "Cause Code:", &condition.cause_code, row);
    row = emit_attribute_pair(
        doc,
        "Program:",
        or_na(condition.program.as_deref()),
        row,
    );
    row = emit_parts(doc, &record.parts, row);
    row = emit_text_block(doc, "Is Condition:", &condition.is_condition, row);
    row = emit_text_block(doc, "Should Be:", &condition.should_be, row);
    row += 1;
    row = emit_dispositions(doc, &record.dispositions, row);
    row = emit_links(doc, &record.links, row);
    row = emit_comments(doc, &record.comments, row);
    emit_end_banner(doc, condition, row)
}

/// Opening banner: reject category/code, condition number, status badge.
/// Three 2-row-tall regions.
fn emit_banner(doc: &mut GridDocument, condition: &Condition, row: u32) -> u32 {
    let two_rows = |col_start: u32, col_end: u32| {
        Range::new(CellRef::new(row, col_start), CellRef::new(row + 1, col_end))
    };

    doc.write_styled(
        two_rows(0, 2),
        format!(
            "{} / {}",
            condition.reject_category, condition.reject_code
        ),
        bold(1100),
    );
    doc.write_styled(
        two_rows(3, 4),
        format!("Condition {}", condition.number),
        badge(1300, Some(FILL_NEAR_BLACK)),
    );
    doc.write_styled(
        two_rows(6, 7),
        condition.status.as_str(),
        badge(1300, condition_status_fill(&condition.status)),
    );

    row + 2
}

fn emit_condition_updated(doc: &mut GridDocument, condition: &Condition, row: u32) -> u32 {
    doc.write_styled(
        full_row(row),
        format!(
            "Condition updated on {} by {}",
            condition.updated.local, condition.updated_by
        ),
        muted_right(),
    );
    row + 1
}

/// A fixed label + wrapped value pair, 2 rows.
fn emit_attribute_pair(doc: &mut GridDocument, heading: &str, value: &str, row: u32) -> u32 {
    doc.write_styled(full_row(row), heading, label());
    doc.write_styled(full_row(row + 1), value, wrapped());
    row + 2
}

/// A label + sanitized wrapped value pair, 2 rows. For rich-text fields.
fn emit_text_block(doc: &mut GridDocument, heading: &str, raw: &str, row: u32) -> u32 {
    doc.write_styled(full_row(row), heading, label());
    doc.write_styled(full_row(row + 1), sanitize(raw), wrapped());
    row + 2
}

/// Parts header plus a 5-row sub-block and 2-row gap per part, then one
/// trailing gap row.
fn emit_parts(doc: &mut GridDocument, parts: &[Part], row: u32) -> u32 {
    doc.write_styled(
        full_row(row),
        format!("Defective Parts ({})", parts.len()),
        section_header(1300),
    );

    let mut current = row + 1;
    for part in parts {
        doc.write_styled(
            full_row(current),
            format!("{} / {}", part.number, part.revision),
            label(),
        );
        current += 1;
        doc.write_styled(full_row(current), part.description.as_str(), muted());
        current += 1;
        doc.write_styled(
            Range::row_span(current, 0, 3),
            format!("iTag: {}", part.itag),
            Style::default(),
        );
        doc.write_styled(
            Range::row_span(current, 4, 7),
            part.serial_lot.as_str(),
            Style::default(),
        );
        current += 1;
        doc.write_styled(
            Range::row_span(current, 0, 3),
            format!("Must Resolve By: {}", part.must_resolve_by),
            Style::default(),
        );
        current += 1;
        doc.write_styled(
            Range::row_span(current, 0, 3),
            format!("Location: {}", or_na(part.location.as_deref())),
            Style::default(),
        );
        current += 3;
    }

    current + 1
}

/// Dispositions header (1 row + 2-row gap), then each disposition's variable
/// block in order.
fn emit_dispositions(doc: &mut GridDocument, dispositions: &[Disposition], row: u32) -> u32 {
    doc.write_styled(
        full_row(row),
        format!("Dispositions ({})", dispositions.len()),
        section_header(1600),
    );

    let mut current = row + 3;
    for disposition in dispositions {
        current = emit_disposition(doc, disposition, current);
    }
    current
}

fn emit_disposition(doc: &mut GridDocument, disposition: &Disposition, row: u32) -> u32 {
    let mut row = row;

    doc.write_styled(
        full_row(row),
        format!(
            "Disposition Updated {} by {}",
            disposition.update.date().local,
            disposition.update.user()
        ),
        muted_right(),
    );
    row += 1;

    doc.write_styled(
        Range::row_span(row, 0, 1),
        format!("Disposition {}", disposition.number),
        label(),
    );
    doc.write_styled(
        Range::row_span(row, 2, 4),
        format!("Type: {}", disposition.kind.as_str()),
        field(),
    );
    doc.write_styled(
        Range::row_span(row, 5, 7),
        disposition.status.as_str(),
        badge(1200, Some(disposition_status_fill(&disposition.status))),
    );
    row += 1;

    doc.set_row_height(row, SPACER_PX);
    row += 1;

    doc.set_row_height(row, FIELD_ROW_PX);
    doc.write_styled(
        Range::row_span(row, 0, 0),
        format!(
            "Disposition Assignee:\n{}",
            or_na(disposition.assignee.as_deref())
        ),
        field(),
    );
    doc.write_styled(
        Range::row_span(row, 1, 3),
        format!(
            "Require Verification:\n{}",
            or_na(disposition.require_verification.as_deref())
        ),
        field(),
    );
    doc.write_styled(
        Range::row_span(row, 4, 6),
        format!(
            "Classification:\n{}",
            or_na(disposition.classification.as_deref())
        ),
        field(),
    );
    row += 1;

    doc.set_row_height(row, FIELD_ROW_PX);
    doc.write_styled(
        Range::row_span(row, 0, 2),
        format!(
            "Risk Assessment:\n{}",
            or_na(disposition.risk_assessment.as_deref())
        ),
        field(),
    );
    // The Repair sub-field exists only on return-to-vendor dispositions.
    if disposition.kind == DispositionType::ReturnToVendor {
        doc.write_styled(
            Range::row_span(row, 3, 5),
            format!("Repair:\n{}", or_na(disposition.repair.as_deref())),
            field(),
        );
    }
    row += 1;

    doc.set_row_height(row, FIELD_ROW_PX);
    doc.write_styled(
        full_row(row),
        format!("Rationale:\n{}", disposition.rationale),
        wrapped_center(),
    );
    row += 1;

    row = emit_approvals(doc, disposition, row);
    row += 1;

    row = emit_note_block(doc, "Disposition Instructions:", &disposition.instructions, row);
    row = emit_note_block(doc, "Execution Notes:", &disposition.execution_notes, row);
    row = emit_note_block(doc, "Verification Notes:", &disposition.verification_notes, row);

    row
}

/// Approvals sub-section: `2 + count` rows when the list exists, or a single
/// zero-count header row when it does not — absence renders explicitly.
fn emit_approvals(doc: &mut GridDocument, disposition: &Disposition, row: u32) -> u32 {
    let mut row = row;
    let count = disposition
        .approvals
        .as_ref()
        .map(Vec::len)
        .unwrap_or(0);

    doc.set_row_height(row, APPROVAL_HEADER_PX);
    doc.write_styled(
        full_row(row),
        format!("Disposition Approvals ({count})"),
        section_header(1200),
    );
    row += 1;

    let Some(approvals) = &disposition.approvals else {
        return row;
    };

    doc.set_row_height(row, APPROVAL_MARGIN_PX);
    row += 1;

    for approval in approvals {
        doc.write_styled(
            Range::row_span(row, 0, 0),
            format!("Qualification:\n{}", approval.qualification),
            bold_field(false),
        );
        doc.write_styled(
            Range::row_span(row, 1, 4),
            approval.approvers.as_str(),
            bold_field(true),
        );
        if let Some(signature) = &approval.signature {
            let text = match &signature.signed_at {
                Some(stamp) => format!(
                    "Approved:\nby {}\non {}",
                    signature.approver, stamp.local
                ),
                None => format!("Approved:\nby {}", signature.approver),
            };
            doc.write_styled(Range::row_span(row, 5, 7), text, bold_field(true));
        }
        row += 1;
    }

    row
}

/// Label row, sanitized wrapped value row, 10px spacer.
fn emit_note_block(doc: &mut GridDocument, heading: &str, raw: &str, row: u32) -> u32 {
    doc.write_styled(Range::row_span(row, 0, 0), heading, label());
    doc.write_styled(full_row(row + 1), sanitize(raw), wrapped());
    doc.set_row_height(row + 2, SPACER_PX);
    row + 3
}

fn emit_links(doc: &mut GridDocument, links: &[Link], row: u32) -> u32 {
    doc.write_styled(
        full_row(row),
        format!("Links ({})", links.len()),
        section_header(1300),
    );

    let mut current = row + 1;
    for link in links {
        doc.write_styled(Range::row_span(current, 0, 1), link.kind.as_str(), label());
        current += 1;
        doc.write_styled(full_row(current), link.reference.as_str(), wrapped());
        current += 1;
    }
    current
}

/// 10px spacer, comments header, then per comment an (author/date, text) pair
/// plus a blank row; two gap rows close the section.
fn emit_comments(doc: &mut GridDocument, comments: &[Comment], row: u32) -> u32 {
    let mut row = row;
    doc.set_row_height(row, SPACER_PX);
    row += 1;

    doc.write_styled(
        full_row(row),
        format!("Comments ({})", comments.len()),
        section_header(1300),
    );
    row += 1;

    for comment in comments {
        doc.write_styled(
            full_row(row),
            format!(
                "Comment created on {} by {}",
                comment.created_on.local, comment.author
            ),
            muted_right(),
        );
        row += 1;
        doc.write_styled(full_row(row), comment.text.as_str(), wrapped());
        row += 2;
    }

    row + 2
}

fn end_banner_style() -> Style {
    Style {
        font: Some(Font {
            color: Some(Color::white()),
            ..Font::default()
        }),
        fill: Some(Fill {
            background: Some(Color::black()),
        }),
        alignment: Some(Alignment {
            horizontal: Some(HorizontalAlignment::Center),
            vertical: Some(VerticalAlignment::Center),
            wrap_text: false,
        }),
    }
}

fn emit_end_banner(doc: &mut GridDocument, condition: &Condition, row: u32) -> u32 {
    doc.write_styled(
        full_row(row),
        format!("End of Condition {}", condition.number),
        end_banner_style(),
    );
    row + END_BANNER_ROWS
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use ncreport_model::{GridDocument, REPORT_COLS};

    use super::*;
    use crate::condition::{Approval, Comment, Link, Stamp, UpdateInfo};

    fn disposition(number: usize, approvals: Option<usize>, text: &str) -> Disposition {
        Disposition {
            number: format!("D{number}"),
            kind: DispositionType::Other("Rework".to_string()),
            status: DispositionStatus::Completed,
            update: UpdateInfo::default(),
            assignee: None,
            require_verification: None,
            classification: None,
            risk_assessment: None,
            repair: None,
            rationale: text.to_string(),
            instructions: text.to_string(),
            execution_notes: text.to_string(),
            verification_notes: text.to_string(),
            approvals: approvals.map(|n| {
                (0..n)
                    .map(|i| Approval {
                        qualification: format!("Q{i}"),
                        approvers: text.to_string(),
                        signature: None,
                    })
                    .collect()
            }),
        }
    }

    proptest! {
        /// The cursor advances by at least the fixed baseline, by exactly the
        /// documented amount per child, and never emits overlapping regions —
        /// for any field text the data source can throw at it.
        #[test]
        fn cursor_advances_without_overlap(
            parts in 0usize..3,
            dispositions in 0usize..3,
            approvals in prop::option::of(0usize..3),
            links in 0usize..3,
            comments in 0usize..3,
            text in ".{0,40}",
        ) {
            let mut record = ConditionRecord::new(Condition {
                number: "C1".to_string(),
                is_condition: text.clone(),
                should_be: text.clone(),
                ..Condition::default()
            });
            record.parts = (0..parts)
                .map(|i| Part {
                    number: format!("P{i}"),
                    ..Part::default()
                })
                .collect();
            record.dispositions = (0..dispositions)
                .map(|i| disposition(i, approvals, &text))
                .collect();
            record.links = (0..links)
                .map(|_| Link {
                    kind: "CAPA".to_string(),
                    reference: text.clone(),
                })
                .collect();
            record.comments = (0..comments)
                .map(|_| Comment {
                    created_on: Stamp::parse(&text),
                    author: "a".to_string(),
                    text: text.clone(),
                })
                .collect();

            let mut doc = GridDocument::new("Main", REPORT_COLS);
            let next = render_condition(&mut doc, &record, 3);

            let approval_rows = match approvals {
                Some(n) => 2 + n as u32,
                None => 1,
            };
            let expected = 3
                + 31
                + 7 * parts as u32
                + (16 + approval_rows) * dispositions as u32
                + 2 * links as u32
                + 3 * comments as u32;
            prop_assert_eq!(next, expected);
            prop_assert_eq!(doc.find_overlap(), None);
        }
    }
}
