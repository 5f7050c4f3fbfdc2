//! Derived dashboard metrics

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Month;

/// Label used for missing or empty categorical values
pub const NOT_AVAILABLE: &str = "N/A";

/// Categorical dimension a breakdown or leaderboard is computed over
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Month,
    Day,
    Status,
    Service,
    Plan,
    Zone,
    Advisor,
    Technician,
    Sector,
}

impl Dimension {
    pub const ALL: [Dimension; 9] = [
        Dimension::Month,
        Dimension::Day,
        Dimension::Status,
        Dimension::Service,
        Dimension::Plan,
        Dimension::Zone,
        Dimension::Advisor,
        Dimension::Technician,
        Dimension::Sector,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Month => "month",
            Dimension::Day => "day",
            Dimension::Status => "status",
            Dimension::Service => "service",
            Dimension::Plan => "plan",
            Dimension::Zone => "zone",
            Dimension::Advisor => "advisor",
            Dimension::Technician => "technician",
            Dimension::Sector => "sector",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How equal counts are ordered in breakdowns and leaderboards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// Keep the order in which labels were first encountered
    #[default]
    FirstSeen,
    /// Order equal counts by label
    Alphabetical,
}

/// One row of a breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Counters {
    pub total: u64,
    /// Records with the premium add-on (`power_go`)
    pub add_on_count: u64,
    pub router_count: u64,
    pub new_service_count: u64,
    /// Distinct valid dates present
    pub days_worked: u64,
}

/// Highest-frequency entry of a breakdown
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Leaderboard {
    pub label: String,
    pub count: u64,
}

impl Default for Leaderboard {
    fn default() -> Self {
        Self {
            label: NOT_AVAILABLE.to_string(),
            count: 0,
        }
    }
}

/// Month-over-month change in record count, measured on the baseline set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Trend {
    pub current_month: Option<Month>,
    pub previous_month: Option<Month>,
    pub current_count: u64,
    pub previous_count: u64,
    pub percentage_change: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Breakdowns {
    pub by_month: Vec<CategoryCount>,
    pub by_day: Vec<CategoryCount>,
    pub by_status: Vec<CategoryCount>,
    pub by_service: Vec<CategoryCount>,
    pub by_plan: Vec<CategoryCount>,
    pub by_zone: Vec<CategoryCount>,
    pub by_advisor: Vec<CategoryCount>,
    pub by_technician: Vec<CategoryCount>,
    pub by_sector: Vec<CategoryCount>,
}

impl Breakdowns {
    pub fn get(&self, dimension: Dimension) -> &[CategoryCount] {
        match dimension {
            Dimension::Month => &self.by_month,
            Dimension::Day => &self.by_day,
            Dimension::Status => &self.by_status,
            Dimension::Service => &self.by_service,
            Dimension::Plan => &self.by_plan,
            Dimension::Zone => &self.by_zone,
            Dimension::Advisor => &self.by_advisor,
            Dimension::Technician => &self.by_technician,
            Dimension::Sector => &self.by_sector,
        }
    }

    pub(crate) fn get_mut(&mut self, dimension: Dimension) -> &mut Vec<CategoryCount> {
        match dimension {
            Dimension::Month => &mut self.by_month,
            Dimension::Day => &mut self.by_day,
            Dimension::Status => &mut self.by_status,
            Dimension::Service => &mut self.by_service,
            Dimension::Plan => &mut self.by_plan,
            Dimension::Zone => &mut self.by_zone,
            Dimension::Advisor => &mut self.by_advisor,
            Dimension::Technician => &mut self.by_technician,
            Dimension::Sector => &mut self.by_sector,
        }
    }
}

/// Activity for one calendar day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyDetail {
    #[serde(rename = "fecha")]
    pub date: String,
    /// All records of the day
    #[serde(rename = "solicitudes")]
    pub requests: u64,
    /// Records of the day with the add-on flag
    #[serde(rename = "instalaciones")]
    pub installations: u64,
    #[serde(rename = "asesor_top")]
    pub top_advisor: String,
    #[serde(rename = "sector_top")]
    pub top_sector: String,
}

/// Everything the installations dashboard displays, derived from a record set
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct MetricSummary {
    pub counters: Counters,
    pub leaderboard: Leaderboard,
    pub trend: Trend,
    pub breakdowns: Breakdowns,
    pub daily: Vec<DailyDetail>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_summary_is_zero_valued() {
        let summary = MetricSummary::default();
        assert_eq!(summary.counters, Counters::default());
        assert_eq!(summary.leaderboard.label, NOT_AVAILABLE);
        assert_eq!(summary.leaderboard.count, 0);
        assert_eq!(summary.trend.percentage_change, 0);
        for dim in Dimension::ALL {
            assert!(summary.breakdowns.get(dim).is_empty());
        }
        assert!(summary.daily.is_empty());
    }

    #[test]
    fn test_daily_detail_serializes_dashboard_keys() {
        let row = DailyDetail {
            date: "2025-03-01".into(),
            requests: 4,
            installations: 2,
            top_advisor: "ANA".into(),
            top_sector: "S2".into(),
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["fecha"], "2025-03-01");
        assert_eq!(json["solicitudes"], 4);
        assert_eq!(json["instalaciones"], 2);
        assert_eq!(json["asesor_top"], "ANA");
        assert_eq!(json["sector_top"], "S2");
    }

    #[test]
    fn test_dimension_serde_snake_case() {
        let json = serde_json::to_string(&Dimension::Technician).unwrap();
        assert_eq!(json, "\"technician\"");
        let tb: TieBreak = serde_json::from_str("\"alphabetical\"").unwrap();
        assert_eq!(tb, TieBreak::Alphabetical);
    }
}
