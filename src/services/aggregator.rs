//! Aggregator service for computing installation dashboard metrics

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::services::normalizer::{label_or_na, month_label, same_label};
use crate::types::{
    Breakdowns, CategoryCount, Counters, DailyDetail, Dimension, InstallationRecord, Leaderboard,
    MetricSummary, Month, TieBreak, Trend, NOT_AVAILABLE,
};

/// Status value counted as a new service sale
pub const DEFAULT_NEW_SERVICE_STATUS: &str = "NUEVO SERVICIO";

/// Knobs for [`MetricsAggregator`], loaded once from configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AggregateOptions {
    /// Dimension the headline leaderboard ranks
    pub leaderboard_dimension: Dimension,
    /// Status counted by `Counters::new_service_count` (case-insensitive)
    pub new_service_status: String,
    pub tie_break: TieBreak,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            leaderboard_dimension: Dimension::Advisor,
            new_service_status: DEFAULT_NEW_SERVICE_STATUS.to_string(),
            tie_break: TieBreak::FirstSeen,
        }
    }
}

/// Frequency table that remembers first-seen order of its labels
#[derive(Debug, Default)]
struct Tally<'a> {
    index: HashMap<&'a str, usize>,
    rows: Vec<(&'a str, u64)>,
}

impl<'a> Tally<'a> {
    fn add(&mut self, label: &'a str) {
        match self.index.get(label) {
            Some(&i) => self.rows[i].1 += 1,
            None => {
                self.index.insert(label, self.rows.len());
                self.rows.push((label, 1));
            }
        }
    }

    /// Highest count; ties resolved by `tie_break`
    fn top(&self, tie_break: TieBreak) -> Leaderboard {
        let mut best: Option<(&str, u64)> = None;
        for &(label, count) in &self.rows {
            let better = match best {
                None => true,
                Some((best_label, best_count)) => {
                    count > best_count
                        || (count == best_count
                            && tie_break == TieBreak::Alphabetical
                            && label < best_label)
                }
            };
            if better {
                best = Some((label, count));
            }
        }
        best.map(|(label, count)| Leaderboard {
            label: label.to_string(),
            count,
        })
        .unwrap_or_default()
    }

    /// Rows by descending count
    fn into_ranked(self, tie_break: TieBreak) -> Vec<CategoryCount> {
        let mut rows = self.rows;
        match tie_break {
            // sort_by is stable: equal counts keep first-seen order
            TieBreak::FirstSeen => rows.sort_by(|a, b| b.1.cmp(&a.1)),
            TieBreak::Alphabetical => rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0))),
        }
        into_counts(rows)
    }

    /// Rows in calendar order; "N/A" last
    fn into_calendar(self) -> Vec<CategoryCount> {
        let mut rows = self.rows;
        rows.sort_by_key(|(label, _)| calendar_position(label));
        into_counts(rows)
    }
}

fn calendar_position(label: &str) -> usize {
    Month::from_label(label).map_or(Month::ALL.len(), Month::index)
}

fn into_counts(rows: Vec<(&str, u64)>) -> Vec<CategoryCount> {
    rows.into_iter()
        .map(|(label, count)| CategoryCount {
            label: label.to_string(),
            count,
        })
        .collect()
}

/// Feed every grouping label `record` has along `dimension` to `visit`.
///
/// Technicians are the only multi-valued dimension: each distinct technician
/// gets one visit, and a record without any technician counts as "N/A".
fn visit_labels<'a>(
    record: &'a InstallationRecord,
    dimension: Dimension,
    mut visit: impl FnMut(&'a str),
) {
    match dimension {
        Dimension::Month => visit(month_label(&record.month)),
        Dimension::Day => visit(label_or_na(&record.date)),
        Dimension::Status => visit(label_or_na(&record.status)),
        Dimension::Service => visit(label_or_na(&record.service)),
        Dimension::Plan => visit(label_or_na(&record.plan)),
        Dimension::Zone => visit(label_or_na(&record.zone)),
        Dimension::Advisor => visit(label_or_na(&record.advisor)),
        Dimension::Sector => visit(label_or_na(&record.sector)),
        Dimension::Technician => {
            let mut any = false;
            for name in record.technicians() {
                any = true;
                visit(name);
            }
            if !any {
                visit(NOT_AVAILABLE);
            }
        }
    }
}

/// Per-day running totals
#[derive(Debug, Default)]
struct DayAccumulator<'a> {
    requests: u64,
    installations: u64,
    advisors: Tally<'a>,
    sectors: Tally<'a>,
}

/// Computes [`MetricSummary`] views over installation records.
///
/// Every call is a pure function of its arguments, so one aggregator can be
/// shared freely across threads.
#[derive(Debug, Clone, Default)]
pub struct MetricsAggregator {
    options: AggregateOptions,
}

impl MetricsAggregator {
    pub fn new(options: AggregateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AggregateOptions {
        &self.options
    }

    /// Summarize `records`, using the same set as trend baseline
    pub fn aggregate(&self, records: &[InstallationRecord]) -> MetricSummary {
        self.aggregate_against(records, records)
    }

    /// Summarize the filtered working set `records`.
    ///
    /// `baseline` is the unfiltered set; it is only consulted for the trend so
    /// that narrowing the view (say, to one advisor) does not distort the
    /// month-over-month comparison.
    pub fn aggregate_against(
        &self,
        records: &[InstallationRecord],
        baseline: &[InstallationRecord],
    ) -> MetricSummary {
        if records.is_empty() {
            return MetricSummary::default();
        }

        let mut counters = Counters {
            total: records.len() as u64,
            ..Counters::default()
        };
        let mut dates: HashSet<NaiveDate> = HashSet::new();
        let mut tallies: Vec<Tally<'_>> = Dimension::ALL.iter().map(|_| Tally::default()).collect();

        for record in records {
            if record.has_add_on() {
                counters.add_on_count += 1;
            }
            if record.has_router() {
                counters.router_count += 1;
            }
            if same_label(&record.status, &self.options.new_service_status) {
                counters.new_service_count += 1;
            }
            if let Some(date) = record.parsed_date() {
                dates.insert(date);
            }

            for dimension in Dimension::ALL {
                let tally = &mut tallies[dimension as usize];
                visit_labels(record, dimension, |label| tally.add(label));
            }
        }
        counters.days_worked = dates.len() as u64;

        let leaderboard =
            tallies[self.options.leaderboard_dimension as usize].top(self.options.tie_break);

        let mut breakdowns = Breakdowns::default();
        for dimension in Dimension::ALL {
            let tally = std::mem::take(&mut tallies[dimension as usize]);
            *breakdowns.get_mut(dimension) = match dimension {
                Dimension::Month => tally.into_calendar(),
                _ => tally.into_ranked(self.options.tie_break),
            };
        }

        MetricSummary {
            counters,
            leaderboard,
            trend: Self::trend(records, baseline),
            breakdowns,
            daily: self.daily(records),
        }
    }

    /// Frequency table of one dimension, ordered as in [`MetricSummary::breakdowns`]
    pub fn breakdown(
        &self,
        records: &[InstallationRecord],
        dimension: Dimension,
    ) -> Vec<CategoryCount> {
        let mut tally = Tally::default();
        for record in records {
            visit_labels(record, dimension, |label| tally.add(label));
        }
        match dimension {
            Dimension::Month => tally.into_calendar(),
            _ => tally.into_ranked(self.options.tie_break),
        }
    }

    /// Most frequent label of one dimension ("N/A" with count 0 when empty)
    pub fn leaderboard(&self, records: &[InstallationRecord], dimension: Dimension) -> Leaderboard {
        let mut tally = Tally::default();
        for record in records {
            visit_labels(record, dimension, |label| tally.add(label));
        }
        tally.top(self.options.tie_break)
    }

    /// Month-over-month change of the latest month present in `records`.
    ///
    /// The months are picked from `records`, the counts from `baseline`.
    /// ENERO has no predecessor, so a view whose latest month is ENERO
    /// always reports 0%.
    pub fn trend(records: &[InstallationRecord], baseline: &[InstallationRecord]) -> Trend {
        let Some(current) = records
            .iter()
            .filter_map(InstallationRecord::parsed_month)
            .max()
        else {
            return Trend::default();
        };
        let previous = current.previous();

        let mut current_count: u64 = 0;
        let mut previous_count: u64 = 0;
        for month in baseline.iter().filter_map(InstallationRecord::parsed_month) {
            if month == current {
                current_count += 1;
            } else if Some(month) == previous {
                previous_count += 1;
            }
        }

        let percentage_change = match previous {
            None => 0,
            Some(_) if previous_count > 0 => percent_change(current_count, previous_count),
            Some(_) if current_count > 0 => 100,
            Some(_) => 0,
        };

        Trend {
            current_month: Some(current),
            previous_month: previous,
            current_count,
            previous_count,
            percentage_change,
        }
    }

    /// Per-day detail, ascending by date string
    pub fn daily(&self, records: &[InstallationRecord]) -> Vec<DailyDetail> {
        let mut days: BTreeMap<&str, DayAccumulator<'_>> = BTreeMap::new();

        for record in records {
            let day = days.entry(label_or_na(&record.date)).or_default();
            day.requests += 1;
            if record.has_add_on() {
                day.installations += 1;
            }
            day.advisors.add(label_or_na(&record.advisor));
            day.sectors.add(label_or_na(&record.sector));
        }

        days.into_iter()
            .map(|(date, day)| DailyDetail {
                date: date.to_string(),
                requests: day.requests,
                installations: day.installations,
                top_advisor: day.advisors.top(self.options.tie_break).label,
                top_sector: day.sectors.top(self.options.tie_break).label,
            })
            .collect()
    }

    /// One summary per label of `dimension` (e.g. one per zone), computed in
    /// parallel. Partitions come out in breakdown order.
    pub fn aggregate_by(
        &self,
        records: &[InstallationRecord],
        baseline: &[InstallationRecord],
        dimension: Dimension,
    ) -> Vec<(String, MetricSummary)> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut partitions: Vec<(&str, Vec<InstallationRecord>)> = Vec::new();

        for record in records {
            visit_labels(record, dimension, |label| {
                let i = *index.entry(label).or_insert_with(|| {
                    partitions.push((label, Vec::new()));
                    partitions.len() - 1
                });
                partitions[i].1.push(record.clone());
            });
        }

        match (dimension, self.options.tie_break) {
            (Dimension::Month, _) => partitions.sort_by_key(|(label, _)| calendar_position(label)),
            (_, TieBreak::FirstSeen) => partitions.sort_by(|a, b| b.1.len().cmp(&a.1.len())),
            (_, TieBreak::Alphabetical) => {
                partitions.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then_with(|| a.0.cmp(b.0)))
            }
        }

        partitions
            .into_par_iter()
            .map(|(label, subset)| (label.to_string(), self.aggregate_against(&subset, baseline)))
            .collect()
    }
}

/// Signed percentage, rounded half up like the dashboard always displayed it
fn percent_change(current: u64, previous: u64) -> i64 {
    let pct = (current as f64 - previous as f64) / previous as f64 * 100.0;
    (pct + 0.5).floor() as i64
}
