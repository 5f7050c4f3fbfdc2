//! Warning channel for malformed records
//!
//! The aggregator tolerates bad cells silently; this pass reports them so the
//! caller can log or display them. Records are never modified or dropped.

use chrono::Datelike;
use serde::Serialize;
use std::fmt;

use crate::types::{InstallationRecord, Month};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// `fecha` is not a valid `YYYY-MM-DD` date
    UnparseableDate { value: String },
    /// `mes` is not one of the twelve month names
    UnknownMonth { value: String },
    /// `mes` names a different month than `fecha`
    MonthMismatch { month: Month, date_month: Month },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordIssue {
    pub id: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::UnparseableDate { value } => {
                write!(f, "record {}: unparseable fecha {:?}", self.id, value)
            }
            IssueKind::UnknownMonth { value } => {
                write!(f, "record {}: unknown mes {:?}", self.id, value)
            }
            IssueKind::MonthMismatch { month, date_month } => write!(
                f,
                "record {}: mes {} does not match fecha month {}",
                self.id, month, date_month
            ),
        }
    }
}

/// Check every record; issues are returned in input order.
pub fn validate(records: &[InstallationRecord]) -> Vec<RecordIssue> {
    let mut issues = Vec::new();

    for record in records {
        let date = record.parsed_date();
        let month = record.parsed_month();

        if date.is_none() {
            issues.push(RecordIssue {
                id: record.id.clone(),
                kind: IssueKind::UnparseableDate {
                    value: record.date.clone(),
                },
            });
        }
        if month.is_none() {
            issues.push(RecordIssue {
                id: record.id.clone(),
                kind: IssueKind::UnknownMonth {
                    value: record.month.clone(),
                },
            });
        }
        if let (Some(date), Some(month)) = (date, month) {
            if let Some(date_month) = Month::from_number(date.month()) {
                if date_month != month {
                    issues.push(RecordIssue {
                        id: record.id.clone(),
                        kind: IssueKind::MonthMismatch { month, date_month },
                    });
                }
            }
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, date: &str, month: &str) -> InstallationRecord {
        InstallationRecord {
            id: id.to_string(),
            date: date.to_string(),
            month: month.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_records_have_no_issues() {
        let records = vec![
            make_record("1", "2025-03-01", "MARZO"),
            make_record("2", "2025-09-30", "SETIEMBRE"),
        ];
        assert!(validate(&records).is_empty());
    }

    #[test]
    fn test_unparseable_date() {
        let issues = validate(&[make_record("7", "31/03/2025", "MARZO")]);
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].kind,
            IssueKind::UnparseableDate {
                value: "31/03/2025".into()
            }
        );
    }

    #[test]
    fn test_unknown_month() {
        let issues = validate(&[make_record("7", "2025-03-01", "MAR")]);
        assert_eq!(issues.len(), 1);
        assert!(matches!(issues[0].kind, IssueKind::UnknownMonth { .. }));
    }

    #[test]
    fn test_month_mismatch() {
        let issues = validate(&[make_record("9", "2025-04-02", "MARZO")]);
        assert_eq!(
            issues,
            vec![RecordIssue {
                id: "9".into(),
                kind: IssueKind::MonthMismatch {
                    month: Month::Marzo,
                    date_month: Month::Abril,
                },
            }]
        );
        assert_eq!(
            issues[0].to_string(),
            "record 9: mes MARZO does not match fecha month ABRIL"
        );
    }

    #[test]
    fn test_both_cells_broken() {
        let issues = validate(&[make_record("3", "", "")]);
        assert_eq!(issues.len(), 2);
    }

    #[test]
    fn test_issue_serializes_with_kind_tag() {
        let issues = validate(&[make_record("3", "2025-03-01", "X")]);
        let json = serde_json::to_value(&issues[0]).unwrap();
        assert_eq!(json["id"], "3");
        assert_eq!(json["kind"], "unknown_month");
        assert_eq!(json["value"], "X");
    }
}
