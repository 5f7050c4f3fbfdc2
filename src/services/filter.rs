//! Dashboard filter bar: narrows the working record set

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::services::normalizer::same_label;
use crate::types::{InstallationRecord, Month};

/// Criteria are ANDed; an unset criterion matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordFilter {
    pub advisor: Option<String>,
    pub zone: Option<String>,
    pub sector: Option<String>,
    pub status: Option<String>,
    pub plan: Option<String>,
    /// Matches either technician column
    pub technician: Option<String>,
    pub month: Option<Month>,
    /// Inclusive lower bound on `fecha`
    pub date_from: Option<NaiveDate>,
    /// Inclusive upper bound on `fecha`
    pub date_to: Option<NaiveDate>,
}

impl RecordFilter {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn matches(&self, record: &InstallationRecord) -> bool {
        text_matches(&self.advisor, &record.advisor)
            && text_matches(&self.zone, &record.zone)
            && text_matches(&self.sector, &record.sector)
            && text_matches(&self.status, &record.status)
            && text_matches(&self.plan, &record.plan)
            && self.technician_matches(record)
            && self.month.is_none_or(|m| record.parsed_month() == Some(m))
            && self.date_matches(record)
    }

    /// Matching records, input order preserved
    pub fn apply(&self, records: &[InstallationRecord]) -> Vec<InstallationRecord> {
        if self.is_empty() {
            return records.to_vec();
        }
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }

    fn technician_matches(&self, record: &InstallationRecord) -> bool {
        match &self.technician {
            None => true,
            Some(wanted) => record.technicians().any(|t| same_label(t, wanted)),
        }
    }

    /// Records with an unparseable `fecha` never satisfy a date bound
    fn date_matches(&self, record: &InstallationRecord) -> bool {
        if self.date_from.is_none() && self.date_to.is_none() {
            return true;
        }
        let Some(date) = record.parsed_date() else {
            return false;
        };
        self.date_from.is_none_or(|from| date >= from) && self.date_to.is_none_or(|to| date <= to)
    }
}

fn text_matches(criterion: &Option<String>, value: &str) -> bool {
    criterion.as_deref().is_none_or(|wanted| same_label(value, wanted))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_record(id: &str, date: &str, advisor: &str, zone: &str) -> InstallationRecord {
        InstallationRecord {
            id: id.to_string(),
            date: date.to_string(),
            month: "MARZO".to_string(),
            advisor: advisor.to_string(),
            zone: zone.to_string(),
            ..Default::default()
        }
    }

    fn ids(records: &[InstallationRecord]) -> Vec<&str> {
        records.iter().map(|r| r.id.as_str()).collect()
    }

    fn sample() -> Vec<InstallationRecord> {
        vec![
            make_record("1", "2025-03-01", "ANA", "NORTE"),
            make_record("2", "2025-03-05", "LUIS", "SUR"),
            make_record("3", "2025-03-10", "ana", "SUR"),
            make_record("4", "bad-date", "ANA", "NORTE"),
        ]
    }

    #[test]
    fn test_empty_filter_is_identity() {
        let records = sample();
        let filter = RecordFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&records), records);
    }

    #[test]
    fn test_advisor_case_insensitive() {
        let filter = RecordFilter {
            advisor: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec!["1", "3", "4"]);
    }

    #[test]
    fn test_criteria_are_anded() {
        let filter = RecordFilter {
            advisor: Some("ANA".into()),
            zone: Some("SUR".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec!["3"]);
    }

    #[test]
    fn test_date_range_inclusive() {
        let filter = RecordFilter {
            date_from: NaiveDate::from_ymd_opt(2025, 3, 1),
            date_to: NaiveDate::from_ymd_opt(2025, 3, 5),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&sample())), vec!["1", "2"]);
    }

    #[test]
    fn test_date_bound_excludes_malformed_dates() {
        let filter = RecordFilter {
            date_from: NaiveDate::from_ymd_opt(2000, 1, 1),
            ..Default::default()
        };
        assert!(!ids(&filter.apply(&sample())).contains(&"4"));
    }

    #[test]
    fn test_month_filter() {
        let mut records = sample();
        records[1].month = "abril".into();
        let filter = RecordFilter {
            month: Some(Month::Abril),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["2"]);
    }

    #[test]
    fn test_technician_filter_either_column() {
        let mut records = sample();
        records[0].technician_1 = Some("PEDRO".into());
        records[2].technician_2 = Some("pedro".into());
        let filter = RecordFilter {
            technician: Some("PEDRO".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&records)), vec!["1", "3"]);
    }
}
