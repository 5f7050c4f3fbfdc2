mod report;

use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::level_filters::LevelFilter;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::services::{
    validate, CurrentUser, DashboardView, DataLoaderService, LoadResult, MetricsAggregator,
    Provenance, RecordFilter,
};
use crate::types::{Dimension, MetricSummary, Month};

/// Dashboard metrics for field installation records
#[derive(Parser)]
#[command(name = "fieldmetrics")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file (default: ~/.fieldmetrics/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read records from JSON files matching this glob instead of the configured source
    #[arg(long, global = true, value_name = "GLOB")]
    input: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Dashboard filter bar
#[derive(Args, Debug, Default, Clone, PartialEq)]
struct FilterArgs {
    #[arg(long)]
    advisor: Option<String>,

    #[arg(long)]
    zone: Option<String>,

    #[arg(long)]
    sector: Option<String>,

    #[arg(long)]
    status: Option<String>,

    #[arg(long)]
    plan: Option<String>,

    /// Matches either technician
    #[arg(long)]
    technician: Option<String>,

    /// Month name, e.g. MARZO
    #[arg(long)]
    month: Option<Month>,

    /// First day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    from: Option<NaiveDate>,

    /// Last day included (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    to: Option<NaiveDate>,
}

impl FilterArgs {
    fn to_filter(&self) -> RecordFilter {
        RecordFilter {
            advisor: self.advisor.clone(),
            zone: self.zone.clone(),
            sector: self.sector.clone(),
            status: self.status.clone(),
            plan: self.plan.clone(),
            technician: self.technician.clone(),
            month: self.month,
            date_from: self.from,
            date_to: self.to,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Show the full dashboard summary (default)
    Summary {
        #[command(flatten)]
        filters: FilterArgs,

        /// One summary per label of this dimension
        #[arg(long, value_enum, value_name = "DIMENSION")]
        by: Option<Dimension>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show per-day requests, installations and top performers
    Daily {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show record counts per label of one dimension
    Breakdown {
        #[arg(value_enum)]
        dimension: Dimension,

        #[command(flatten)]
        filters: FilterArgs,

        /// Show only the first N rows
        #[arg(long)]
        limit: Option<usize>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show month-over-month change
    Trend {
        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report malformed dates and months
    Validate {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the panels one user is allowed to see
    Dashboard {
        #[arg(long)]
        user: String,

        /// Role of the user (repeatable)
        #[arg(long = "role", required = true)]
        roles: Vec<String>,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Summary {
            filters: FilterArgs::default(),
            by: None,
            json: false,
        }
    }
}

/// JSON output wrapper carrying where the records came from
#[derive(Serialize)]
struct JsonOutput<'a, T: Serialize> {
    provenance: Provenance,
    source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'a str>,
    data: T,
}

#[derive(Serialize)]
struct Partition {
    label: String,
    summary: MetricSummary,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::ERROR
        } else if self.verbose {
            LevelFilter::DEBUG
        } else {
            LevelFilter::WARN
        }
    }

    /// Logs go to stderr; `RUST_LOG` overrides the flag-derived level
    pub fn init_logging(&self) {
        let filter = EnvFilter::builder()
            .with_default_directive(self.log_level().into())
            .from_env_lossy();

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init();
    }

    pub fn run(self) -> anyhow::Result<()> {
        let config = Config::load(self.config.as_deref()).context("Failed to load configuration")?;
        let loader = DataLoaderService::from_config(&config, self.input.as_deref())
            .context("Failed to set up record source")?;
        let loaded = loader.load();
        let aggregator = MetricsAggregator::new(config.aggregate.clone());
        let leaderboard_dimension = aggregator.options().leaderboard_dimension;

        let command = self.command.unwrap_or_default();
        if !matches!(command, Commands::Validate { .. }) {
            let issues = validate(&loaded.records);
            if !issues.is_empty() {
                warn!(
                    "{} malformed record cell(s); run `fieldmetrics validate` for details",
                    issues.len()
                );
            }
        }

        match command {
            Commands::Summary { filters, by, json } => {
                let records = filters.to_filter().apply(&loaded.records);
                match by {
                    Some(dimension) => {
                        let partitions: Vec<Partition> = aggregator
                            .aggregate_by(&records, &loaded.records, dimension)
                            .into_iter()
                            .map(|(label, summary)| Partition { label, summary })
                            .collect();
                        if json {
                            print_json(&loaded, &partitions)
                        } else {
                            let mut body = String::new();
                            for partition in &partitions {
                                body.push_str(&format!("== {}: {} ==\n", dimension, partition.label));
                                body.push_str(&report::render_summary(
                                    &partition.summary,
                                    leaderboard_dimension,
                                ));
                                body.push('\n');
                            }
                            print_text(&loaded, &body);
                            Ok(())
                        }
                    }
                    None => {
                        let summary = aggregator.aggregate_against(&records, &loaded.records);
                        if json {
                            print_json(&loaded, &summary)
                        } else {
                            print_text(
                                &loaded,
                                &report::render_summary(&summary, leaderboard_dimension),
                            );
                            Ok(())
                        }
                    }
                }
            }
            Commands::Daily { filters, json } => {
                let records = filters.to_filter().apply(&loaded.records);
                let daily = aggregator.daily(&records);
                if json {
                    print_json(&loaded, &daily)
                } else {
                    print_text(&loaded, &report::render_daily(&daily));
                    Ok(())
                }
            }
            Commands::Breakdown {
                dimension,
                filters,
                limit,
                json,
            } => {
                let records = filters.to_filter().apply(&loaded.records);
                let mut rows = aggregator.breakdown(&records, dimension);
                if json {
                    if let Some(n) = limit {
                        rows.truncate(n);
                    }
                    print_json(&loaded, &rows)
                } else {
                    print_text(&loaded, &report::render_breakdown(dimension, &rows, limit));
                    Ok(())
                }
            }
            Commands::Trend { filters, json } => {
                let records = filters.to_filter().apply(&loaded.records);
                let trend = MetricsAggregator::trend(&records, &loaded.records);
                if json {
                    print_json(&loaded, &trend)
                } else {
                    print_text(&loaded, &report::render_trend(&trend));
                    Ok(())
                }
            }
            Commands::Validate { json } => {
                let issues = validate(&loaded.records);
                if json {
                    print_json(&loaded, &issues)
                } else {
                    print_text(&loaded, &report::render_issues(&issues));
                    Ok(())
                }
            }
            Commands::Dashboard {
                user,
                roles,
                filters,
                json,
            } => {
                let records = filters.to_filter().apply(&loaded.records);
                let summary = aggregator.aggregate_against(&records, &loaded.records);
                let user = CurrentUser::new(user, roles);
                let view = DashboardView::build(&summary, &config.dashboard, &user);
                if json {
                    print_json(&loaded, &view)
                } else {
                    print_text(
                        &loaded,
                        &report::render_dashboard(&view, leaderboard_dimension),
                    );
                    Ok(())
                }
            }
        }
    }
}

fn print_json<T: Serialize>(loaded: &LoadResult, data: &T) -> anyhow::Result<()> {
    let output = JsonOutput {
        provenance: loaded.provenance,
        source: &loaded.source,
        warning: loaded.warning.as_deref(),
        data,
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn print_text(loaded: &LoadResult, body: &str) {
    print!("{}{}", report::provenance_note(loaded), body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    // ========== Parsing ==========

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::try_parse_from(["fieldmetrics"]).unwrap();
        assert!(cli.command.is_none());
        assert!(matches!(
            cli.command.unwrap_or_default(),
            Commands::Summary { by: None, json: false, .. }
        ));
    }

    #[test]
    fn test_cli_parse_daily_json() {
        let cli = Cli::try_parse_from(["fieldmetrics", "daily", "--json"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Daily { json: true, .. })));
    }

    #[test]
    fn test_cli_parse_breakdown() {
        let cli =
            Cli::try_parse_from(["fieldmetrics", "breakdown", "zone", "--limit", "5"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Breakdown {
                dimension: Dimension::Zone,
                limit: Some(5),
                json: false,
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_breakdown_rejects_unknown_dimension() {
        assert!(Cli::try_parse_from(["fieldmetrics", "breakdown", "color"]).is_err());
    }

    #[test]
    fn test_cli_parse_summary_by() {
        let cli = Cli::try_parse_from(["fieldmetrics", "summary", "--by", "advisor"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Summary {
                by: Some(Dimension::Advisor),
                ..
            })
        ));
    }

    #[test]
    fn test_cli_parse_filters() {
        let cli = Cli::try_parse_from([
            "fieldmetrics",
            "summary",
            "--zone",
            "NORTE",
            "--month",
            "marzo",
            "--from",
            "2025-03-01",
            "--to",
            "2025-03-31",
        ])
        .unwrap();
        let Some(Commands::Summary { filters, .. }) = cli.command else {
            panic!("expected summary");
        };
        let filter = filters.to_filter();
        assert_eq!(filter.zone.as_deref(), Some("NORTE"));
        assert_eq!(filter.month, Some(Month::Marzo));
        assert_eq!(filter.date_from, NaiveDate::from_ymd_opt(2025, 3, 1));
        assert_eq!(filter.date_to, NaiveDate::from_ymd_opt(2025, 3, 31));
        assert!(filter.advisor.is_none());
    }

    #[test]
    fn test_cli_parse_bad_month_or_date() {
        assert!(Cli::try_parse_from(["fieldmetrics", "trend", "--month", "MARCH"]).is_err());
        assert!(Cli::try_parse_from(["fieldmetrics", "trend", "--from", "03/01/2025"]).is_err());
    }

    #[test]
    fn test_cli_parse_dashboard_roles() {
        let cli = Cli::try_parse_from([
            "fieldmetrics",
            "dashboard",
            "--user",
            "ana",
            "--role",
            "asesor",
            "--role",
            "supervisor",
        ])
        .unwrap();
        let Some(Commands::Dashboard { user, roles, .. }) = cli.command else {
            panic!("expected dashboard");
        };
        assert_eq!(user, "ana");
        assert_eq!(roles, vec!["asesor", "supervisor"]);
    }

    #[test]
    fn test_cli_parse_dashboard_requires_role() {
        assert!(Cli::try_parse_from(["fieldmetrics", "dashboard", "--user", "ana"]).is_err());
    }

    #[test]
    fn test_cli_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "fieldmetrics",
            "validate",
            "--input",
            "data/*.json",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.input.as_deref(), Some("data/*.json"));
        assert!(cli.verbose);
    }

    // ========== Logging ==========

    #[test]
    fn test_log_level() {
        let cli = Cli::try_parse_from(["fieldmetrics"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::WARN);

        let cli = Cli::try_parse_from(["fieldmetrics", "-v"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::DEBUG);

        let cli = Cli::try_parse_from(["fieldmetrics", "-q"]).unwrap();
        assert_eq!(cli.log_level(), LevelFilter::ERROR);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        assert!(Cli::try_parse_from(["fieldmetrics", "-v", "-q"]).is_err());
    }

    // ========== Run ==========

    fn config_without_cache(temp: &TempDir) -> String {
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[cache]\nenabled = false\n").unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_run_commands_against_fixtures() {
        let temp = TempDir::new().unwrap();
        let config = config_without_cache(&temp);

        for args in [
            vec!["summary", "--json"],
            vec!["summary", "--by", "zone"],
            vec!["daily"],
            vec!["breakdown", "technician", "--limit", "2", "--json"],
            vec!["trend", "--zone", "NORTE"],
            vec!["validate", "--json"],
            vec!["dashboard", "--user", "ana", "--role", "admin"],
        ] {
            let mut argv = vec![
                "fieldmetrics",
                "--config",
                config.as_str(),
                "--input",
                "tests/fixtures/records/*.json",
            ];
            argv.extend(args.iter().copied());
            let cli = Cli::try_parse_from(argv).unwrap();
            assert!(cli.run().is_ok(), "command failed: {:?}", args);
        }
    }

    #[test]
    fn test_run_missing_config_file_fails() {
        let cli = Cli::try_parse_from([
            "fieldmetrics",
            "--config",
            "/nonexistent/fieldmetrics.toml",
            "summary",
        ])
        .unwrap();
        assert!(cli.run().is_err());
    }
}
