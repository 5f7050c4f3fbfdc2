//! Synthetic record set shown when no real data can be retrieved
//!
//! Same shape as live data so the dashboard renders identically; content is
//! deterministic so repeated fallbacks produce the same numbers.

use chrono::{Datelike, NaiveDate};

use crate::types::{InstallationRecord, Month};

const ADVISORS: &[&str] = &["MARIA TORRES", "JOSE QUISPE", "ROSA MENDOZA", "CARLOS RAMOS"];
const ZONES: &[&str] = &["NORTE", "SUR", "CENTRO"];
const SECTORS: &[&str] = &["SECTOR 1", "SECTOR 2", "SECTOR 3", "SECTOR 4", "SECTOR 5"];
const STATUSES: &[&str] = &["NUEVO SERVICIO", "NUEVO SERVICIO", "MIGRACION", "TRASLADO"];
const PLANS: &[&str] = &["200 MBPS", "400 MBPS", "600 MBPS", "1000 MBPS"];
const SERVICES: &[&str] = &["FIBRA", "FIBRA", "FIBRA + TV"];
const TECHNICIANS: &[&str] = &["LUIS HUAMAN", "PEDRO SALAS", "JUAN CCAMA", "ANDRES VEGA"];

/// First day covered by the placeholder set
const START: (i32, u32, u32) = (2025, 1, 6);
/// Records generated per month
const PER_MONTH: [usize; 3] = [10, 12, 15];

/// Build the placeholder record set (three consecutive months, growing volume).
pub fn placeholder_records() -> Vec<InstallationRecord> {
    let Some(start) = NaiveDate::from_ymd_opt(START.0, START.1, START.2) else {
        return Vec::new();
    };

    let mut records = Vec::new();
    let mut seq: usize = 0;

    for (month_offset, &count) in PER_MONTH.iter().enumerate() {
        for i in 0..count {
            // Days 6..=24 exist in every month, February included
            let day = START.2 + (i as u32 * 2) % 20;
            let date = start
                .with_month(start.month() + month_offset as u32)
                .and_then(|d| d.with_day(day))
                .unwrap_or(start);
            let month = Month::from_number(date.month()).unwrap_or(Month::Enero);

            records.push(InstallationRecord {
                id: format!("placeholder-{:03}", seq + 1),
                date: date.format("%Y-%m-%d").to_string(),
                month: month.name().to_string(),
                advisor: pick(ADVISORS, seq * 7 / 3),
                zone: pick(ZONES, seq),
                sector: pick(SECTORS, seq / 2),
                status: pick(STATUSES, seq),
                plan: pick(PLANS, seq / 3),
                service: pick(SERVICES, seq),
                technician_1: Some(pick(TECHNICIANS, seq)),
                technician_2: (seq % 3 == 0).then(|| pick(TECHNICIANS, seq + 1)),
                router: (seq % 4 != 1).then(|| "HG8145".to_string()),
                power_go: seq % 3 == 1,
            });
            seq += 1;
        }
    }

    records
}

fn pick(values: &[&str], n: usize) -> String {
    values[n % values.len()].to_string()
}
