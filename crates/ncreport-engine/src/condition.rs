use core::fmt;

use serde::{Deserialize, Serialize};

use crate::records::ColumnTable;

/// A timestamp as exported by the data source: local text plus an optional
/// trailing UTC offset joined by `+` (e.g. `2024-01-01T10:00+00:00`).
///
/// The engine never does calendar math on these values — it splits them once
/// at ingestion so render sites can show the local part without the offset.
/// Input without a `+` degrades to the whole string as the local part.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stamp {
    pub local: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<String>,
}

impl Stamp {
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('+') {
            Some((local, offset)) => Self {
                local: local.to_string(),
                offset: Some(offset.to_string()),
            },
            None => Self {
                local: raw.to_string(),
                offset: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.local.is_empty() && self.offset.is_none()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.local)
    }
}

/// A sign-off as a composite `"name,timestamp[+tz]"` string, parsed once.
///
/// A missing `,` degrades to a name-only signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub approver: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signed_at: Option<Stamp>,
}

impl Signature {
    /// Parse a raw signature cell; empty input means no signature at all.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        match raw.split_once(',') {
            Some((name, rest)) => Some(Self {
                approver: name.to_string(),
                signed_at: Some(Stamp::parse(rest)),
            }),
            None => Some(Self {
                approver: raw.to_string(),
                signed_at: None,
            }),
        }
    }
}

/// Created/modified provenance with the presence-based fallback rule.
///
/// "Updated" identity resolves to the modified pair when the modified date is
/// non-empty, else the created pair. This is an invariant of aggregation, not
/// a render-site convenience.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateInfo {
    pub created: Stamp,
    pub created_by: String,
    pub modified: Stamp,
    pub modified_by: String,
}

impl UpdateInfo {
    /// The effective update timestamp.
    pub fn date(&self) -> &Stamp {
        if self.modified.local.is_empty() {
            &self.created
        } else {
            &self.modified
        }
    }

    /// The effective updating user.
    pub fn user(&self) -> &str {
        if self.modified_by.is_empty() {
            &self.created_by
        } else {
            &self.modified_by
        }
    }
}

/// Condition lifecycle status. Open for extension by the data source:
/// unrecognized values are carried verbatim and render with neutral style.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConditionStatus {
    New,
    InProgress,
    Closed,
    PendingClosure,
    Open,
    Other(String),
}

impl ConditionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "New" => ConditionStatus::New,
            "In Progress" => ConditionStatus::InProgress,
            "Closed" => ConditionStatus::Closed,
            "Pending Closure" => ConditionStatus::PendingClosure,
            "Open" => ConditionStatus::Open,
            _ => ConditionStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ConditionStatus::New => "New",
            ConditionStatus::InProgress => "In Progress",
            ConditionStatus::Closed => "Closed",
            ConditionStatus::PendingClosure => "Pending Closure",
            ConditionStatus::Open => "Open",
            ConditionStatus::Other(raw) => raw,
        }
    }
}

impl Default for ConditionStatus {
    fn default() -> Self {
        ConditionStatus::Other(String::new())
    }
}

/// Disposition completion status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispositionStatus {
    Completed,
    Other(String),
}

impl DispositionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Completed" => DispositionStatus::Completed,
            _ => DispositionStatus::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DispositionStatus::Completed => "Completed",
            DispositionStatus::Other(raw) => raw,
        }
    }
}

/// Disposition resolution type. Only `Return to vendor` changes layout (it
/// gains the Repair sub-field).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DispositionType {
    ReturnToVendor,
    Other(String),
}

impl DispositionType {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Return to vendor" => DispositionType::ReturnToVendor,
            _ => DispositionType::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DispositionType::ReturnToVendor => "Return to vendor",
            DispositionType::Other(raw) => raw,
        }
    }
}

fn cell(table: &ColumnTable, name: &str, row: usize) -> String {
    table.text(name, row).to_string()
}

fn cell_opt(table: &ColumnTable, name: &str, row: usize) -> Option<String> {
    let value = table.text(name, row);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// One tracked nonconformance, keyed by its unique condition number.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub number: String,
    pub status: ConditionStatus,
    pub reject_category: String,
    pub reject_code: String,
    pub updated: Stamp,
    pub updated_by: String,
    pub where_found: String,
    pub problem_source: String,
    pub cause_code: String,
    /// Rich text; must pass through the sanitizer before rendering.
    pub is_condition: String,
    /// Rich text; must pass through the sanitizer before rendering.
    pub should_be: String,
    /// Program custom attribute; renders as `N/A` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
}

impl Condition {
    /// Recognized `Conditions` columns; anything else is flagged.
    pub const COLUMNS: &'static [&'static str] = &[
        "Condition Number",
        "Status",
        "Reject Category",
        "Reject Code",
        "Updated Date",
        "Updated By",
        "Where Found",
        "Problem Source",
        "Cause Code",
        "Is Condition",
        "Should Be",
        "Custom Attributes",
    ];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            number: cell(table, "Condition Number", row),
            status: ConditionStatus::parse(table.text("Status", row)),
            reject_category: cell(table, "Reject Category", row),
            reject_code: cell(table, "Reject Code", row),
            updated: Stamp::parse(table.text("Updated Date", row)),
            updated_by: cell(table, "Updated By", row),
            where_found: cell(table, "Where Found", row),
            problem_source: cell(table, "Problem Source", row),
            cause_code: cell(table, "Cause Code", row),
            is_condition: cell(table, "Is Condition", row),
            should_be: cell(table, "Should Be", row),
            program: cell_opt(table, "Custom Attributes", row),
        }
    }
}

/// A defective part attached to a condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub number: String,
    pub revision: String,
    pub description: String,
    pub itag: String,
    pub serial_lot: String,
    pub must_resolve_by: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl Part {
    pub const COLUMNS: &'static [&'static str] = &[
        "Condition Number",
        "Part Number",
        "Revision",
        "Part Description",
        "iTag",
        "Serial / Lot Number",
        "Must Resolve By",
        "Location",
    ];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            number: cell(table, "Part Number", row),
            revision: cell(table, "Revision", row),
            description: cell(table, "Part Description", row),
            itag: cell(table, "iTag", row),
            serial_lot: cell(table, "Serial / Lot Number", row),
            must_resolve_by: cell(table, "Must Resolve By", row),
            location: cell_opt(table, "Location", row),
        }
    }
}

/// A qualification-scoped sign-off joined to exactly one disposition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Approval {
    pub qualification: String,
    pub approvers: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<Signature>,
}

impl Approval {
    pub const COLUMNS: &'static [&'static str] = &[
        "Condition Number",
        "Disposition Number",
        "Qualification",
        "Approvers",
        "Signature",
    ];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            qualification: cell(table, "Qualification", row),
            approvers: cell(table, "Approvers", row),
            signature: Signature::parse(table.text("Signature", row)),
        }
    }
}

/// A decided resolution action for a condition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Disposition {
    pub number: String,
    pub kind: DispositionType,
    pub status: DispositionStatus,
    pub update: UpdateInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub require_verification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_assessment: Option<String>,
    /// Only meaningful when `kind` is `Return to vendor`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repair: Option<String>,
    pub rationale: String,
    /// Rich text; must pass through the sanitizer before rendering.
    pub instructions: String,
    /// Rich text; must pass through the sanitizer before rendering.
    pub execution_notes: String,
    /// Rich text; must pass through the sanitizer before rendering.
    pub verification_notes: String,
    /// `None` until the join pass attaches the first approval. Absence is
    /// distinct from an empty list: callers must check presence, not length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approvals: Option<Vec<Approval>>,
}

impl Disposition {
    pub const COLUMNS: &'static [&'static str] = &[
        "Condition Number",
        "Disposition Number",
        "Type",
        "Status",
        "Created Date",
        "Created By",
        "Modified Date",
        "Modified By",
        "Disposition Assignee",
        "Require Verification",
        "Classification",
        "Risk Assessment",
        "Repair",
        "Rationale",
        "Instructions",
        "Execution Notes",
        "Verification Notes",
    ];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            number: cell(table, "Disposition Number", row),
            kind: DispositionType::parse(table.text("Type", row)),
            status: DispositionStatus::parse(table.text("Status", row)),
            update: UpdateInfo {
                created: Stamp::parse(table.text("Created Date", row)),
                created_by: cell(table, "Created By", row),
                modified: Stamp::parse(table.text("Modified Date", row)),
                modified_by: cell(table, "Modified By", row),
            },
            assignee: cell_opt(table, "Disposition Assignee", row),
            require_verification: cell_opt(table, "Require Verification", row),
            classification: cell_opt(table, "Classification", row),
            risk_assessment: cell_opt(table, "Risk Assessment", row),
            repair: cell_opt(table, "Repair", row),
            rationale: cell(table, "Rationale", row),
            instructions: cell(table, "Instructions", row),
            execution_notes: cell(table, "Execution Notes", row),
            verification_notes: cell(table, "Verification Notes", row),
            approvals: None,
        }
    }
}

/// A free-text comment on a condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub created_on: Stamp,
    pub author: String,
    pub text: String,
}

impl Comment {
    pub const COLUMNS: &'static [&'static str] =
        &["Condition Number", "Created On", "Author", "Comment"];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            created_on: Stamp::parse(table.text("Created On", row)),
            author: cell(table, "Author", row),
            text: cell(table, "Comment", row),
        }
    }
}

/// A cross-reference attached to a condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub kind: String,
    pub reference: String,
}

impl Link {
    pub const COLUMNS: &'static [&'static str] = &["Condition Number", "Type", "Reference"];

    pub fn from_row(table: &ColumnTable, row: usize) -> Self {
        Self {
            kind: cell(table, "Type", row),
            reference: cell(table, "Reference", row),
        }
    }
}

/// The condition-independent report header singleton.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HeaderInfo {
    pub nc_number: String,
    pub status: ConditionStatus,
    pub assignee: String,
    pub update: UpdateInfo,
}

impl HeaderInfo {
    pub const COLUMNS: &'static [&'static str] = &[
        "NC Number",
        "Status",
        "NC Assignee",
        "Created Date",
        "Created By User",
        "Modified Date",
        "Modified By User",
    ];

    /// Build from the first row of the `Header` record set. An empty table
    /// yields a neutral header (empty fields, no fill).
    pub fn from_table(table: &ColumnTable) -> Self {
        Self {
            nc_number: cell(table, "NC Number", 0),
            status: ConditionStatus::parse(table.text("Status", 0)),
            assignee: cell(table, "NC Assignee", 0),
            update: UpdateInfo {
                created: Stamp::parse(table.text("Created Date", 0)),
                created_by: cell(table, "Created By User", 0),
                modified: Stamp::parse(table.text("Modified Date", 0)),
                modified_by: cell(table, "Modified By User", 0),
            },
        }
    }
}

/// The finished per-condition aggregate: the condition plus its ordered child
/// lists. Built by the aggregation engine, traversed read-only by layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionRecord {
    pub condition: Condition,
    pub parts: Vec<Part>,
    pub dispositions: Vec<Disposition>,
    pub comments: Vec<Comment>,
    pub links: Vec<Link>,
}

impl ConditionRecord {
    pub fn new(condition: Condition) -> Self {
        Self {
            condition,
            parts: Vec::new(),
            dispositions: Vec::new(),
            comments: Vec::new(),
            links: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_splits_on_first_plus() {
        let stamp = Stamp::parse("2024-01-01T10:00+00:00");
        assert_eq!(stamp.local, "2024-01-01T10:00");
        assert_eq!(stamp.offset.as_deref(), Some("00:00"));
    }

    #[test]
    fn stamp_without_offset_degrades_to_whole_string() {
        let stamp = Stamp::parse("2024-01-01");
        assert_eq!(stamp.local, "2024-01-01");
        assert_eq!(stamp.offset, None);
    }

    #[test]
    fn signature_parses_name_and_time() {
        let sig = Signature::parse("j.doe,2024-02-03T08:30+01:00").unwrap();
        assert_eq!(sig.approver, "j.doe");
        assert_eq!(sig.signed_at.unwrap().local, "2024-02-03T08:30");
    }

    #[test]
    fn signature_without_comma_is_name_only() {
        let sig = Signature::parse("j.doe").unwrap();
        assert_eq!(sig.approver, "j.doe");
        assert_eq!(sig.signed_at, None);
        assert_eq!(Signature::parse(""), None);
    }

    #[test]
    fn update_info_falls_back_to_created() {
        let info = UpdateInfo {
            created: Stamp::parse("2024-01-01+00:00"),
            created_by: "alice".to_string(),
            modified: Stamp::parse(""),
            modified_by: String::new(),
        };
        assert_eq!(info.date().local, "2024-01-01");
        assert_eq!(info.user(), "alice");
    }

    #[test]
    fn update_info_prefers_modified_when_present() {
        let info = UpdateInfo {
            created: Stamp::parse("2024-01-01"),
            created_by: "alice".to_string(),
            modified: Stamp::parse("2024-02-02"),
            modified_by: "bob".to_string(),
        };
        assert_eq!(info.date().local, "2024-02-02");
        assert_eq!(info.user(), "bob");
    }

    #[test]
    fn unknown_statuses_are_carried_verbatim() {
        let status = ConditionStatus::parse("Deferred");
        assert_eq!(status, ConditionStatus::Other("Deferred".to_string()));
        assert_eq!(status.as_str(), "Deferred");

        assert_eq!(
            DispositionType::parse("Use as is"),
            DispositionType::Other("Use as is".to_string())
        );
        assert_eq!(
            DispositionType::parse("Return to vendor"),
            DispositionType::ReturnToVendor
        );
    }
}
