//! `ncreport-engine` turns flat quality-management record sets into a nested
//! per-condition aggregate and renders that aggregate onto a fixed-width grid
//! document.
//!
//! The pipeline is a single synchronous pass:
//!
//! ```text
//! load (CSV) -> aggregate (join + diagnostics) -> render (header, conditions)
//! ```
//!
//! Aggregation-phase faults (orphan child rows, unjoinable approvals,
//! unrecognized columns) are *collected* as [`Diagnostic`] values rather than
//! raised; only load-time errors from an unreadable record-set source fail
//! fast. The layout cursor is an explicit value threaded through pure emitter
//! functions — rendering the same aggregate twice from the same starting row
//! produces an identical document.

mod aggregate;
mod condition;
mod header;
mod layout;
mod load;
mod records;
mod report;
mod sanitize;

pub use aggregate::{
    aggregate, aggregate_with, Aggregate, AggregateOptions, Diagnostic, DuplicatePolicy,
};
pub use condition::{
    Approval, Comment, Condition, ConditionRecord, ConditionStatus, Disposition,
    DispositionStatus, DispositionType, HeaderInfo, Link, Part, Signature, Stamp, UpdateInfo,
};
pub use header::render_header;
pub use layout::{condition_status_fill, disposition_status_fill, render_condition};
pub use load::{load_record_set, load_record_sets_from_dir, LoadError};
pub use records::{ColumnTable, RecordSetKind, RecordSets};
pub use report::{build_report, build_report_with, REPORT_DOCUMENT_NAME};
pub use sanitize::sanitize;
