//! Installation record as delivered by the record store

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use super::Month;

/// One installation/service event.
///
/// Field names on the wire follow the source table (`fecha`, `mes`, `asesor`, …).
/// Deserialization is permissive: numbers and booleans in text columns are
/// coerced to strings and `null` becomes empty, so a record never fails to load
/// because of a single odd cell.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InstallationRecord {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    /// Calendar date, `YYYY-MM-DD`
    #[serde(rename = "fecha", default, deserialize_with = "loose_string")]
    pub date: String,
    /// Uppercase month label (ENERO … DICIEMBRE)
    #[serde(rename = "mes", default, deserialize_with = "loose_string")]
    pub month: String,
    #[serde(rename = "asesor", default, deserialize_with = "loose_string")]
    pub advisor: String,
    #[serde(rename = "zona", default, deserialize_with = "loose_string")]
    pub zone: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub sector: String,
    #[serde(rename = "estado", default, deserialize_with = "loose_string")]
    pub status: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub plan: String,
    #[serde(
        rename = "servicio",
        alias = "tipo_servicio",
        default,
        deserialize_with = "loose_string"
    )]
    pub service: String,
    #[serde(
        rename = "tecnico_1",
        default,
        deserialize_with = "loose_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub technician_1: Option<String>,
    #[serde(
        rename = "tecnico_2",
        default,
        deserialize_with = "loose_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub technician_2: Option<String>,
    #[serde(
        default,
        deserialize_with = "loose_opt_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub router: Option<String>,
    /// Premium add-on purchased
    #[serde(default, deserialize_with = "loose_flag")]
    pub power_go: bool,
}

/// Router values that mean "no router" even though the cell is filled
const ROUTER_ABSENT: &[&str] = &["no", "0", "false", "n/a", "-", "ninguno"];

impl InstallationRecord {
    /// Parse `fecha` as an ISO calendar date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }

    /// Canonical month for `mes`, if it is one of the twelve month names
    pub fn parsed_month(&self) -> Option<Month> {
        Month::from_label(&self.month)
    }

    pub fn has_add_on(&self) -> bool {
        self.power_go
    }

    pub fn has_router(&self) -> bool {
        self.router.as_deref().is_some_and(|r| {
            let r = r.trim().to_lowercase();
            !r.is_empty() && !ROUTER_ABSENT.contains(&r.as_str())
        })
    }

    /// Distinct, non-empty technician names (at most two).
    pub fn technicians(&self) -> impl Iterator<Item = &str> {
        let first = non_empty(self.technician_1.as_deref());
        let second = non_empty(self.technician_2.as_deref()).filter(move |s| Some(*s) != first);
        first.into_iter().chain(second)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Any scalar JSON value a text or flag column may hold
#[derive(Deserialize)]
#[serde(untagged)]
enum LooseValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl LooseValue {
    fn into_text(self) -> String {
        match self {
            LooseValue::Bool(b) => b.to_string(),
            LooseValue::Int(i) => i.to_string(),
            LooseValue::Float(f) => f.to_string(),
            LooseValue::Text(s) => s,
        }
    }

    fn is_truthy(&self) -> bool {
        match self {
            LooseValue::Bool(b) => *b,
            LooseValue::Int(i) => *i != 0,
            LooseValue::Float(f) => *f != 0.0,
            LooseValue::Text(s) => is_affirmative(s),
        }
    }
}

/// Text spellings of "yes" seen in flag columns
pub fn is_affirmative(text: &str) -> bool {
    matches!(
        text.trim().to_lowercase().as_str(),
        "si" | "sí" | "s" | "true" | "1" | "yes" | "y" | "x"
    )
}

fn loose_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseValue> = Option::deserialize(deserializer)?;
    Ok(value.map(LooseValue::into_text).unwrap_or_default())
}

fn loose_opt_string<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseValue> = Option::deserialize(deserializer)?;
    Ok(value
        .map(LooseValue::into_text)
        .filter(|s| !s.trim().is_empty()))
}

fn loose_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<LooseValue> = Option::deserialize(deserializer)?;
    Ok(value.is_some_and(|v| v.is_truthy()))
}
