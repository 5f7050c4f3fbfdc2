//! Canonical calendar months as they appear in the `mes` column

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Calendar month, ordered chronologically (ENERO < FEBRERO < … < DICIEMBRE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Month {
    Enero,
    Febrero,
    Marzo,
    Abril,
    Mayo,
    Junio,
    Julio,
    Agosto,
    #[serde(alias = "SETIEMBRE")]
    Septiembre,
    Octubre,
    Noviembre,
    Diciembre,
}

impl Month {
    /// All months in calendar order
    pub const ALL: [Month; 12] = [
        Month::Enero,
        Month::Febrero,
        Month::Marzo,
        Month::Abril,
        Month::Mayo,
        Month::Junio,
        Month::Julio,
        Month::Agosto,
        Month::Septiembre,
        Month::Octubre,
        Month::Noviembre,
        Month::Diciembre,
    ];

    /// Uppercase label used by the source data
    pub fn name(self) -> &'static str {
        match self {
            Month::Enero => "ENERO",
            Month::Febrero => "FEBRERO",
            Month::Marzo => "MARZO",
            Month::Abril => "ABRIL",
            Month::Mayo => "MAYO",
            Month::Junio => "JUNIO",
            Month::Julio => "JULIO",
            Month::Agosto => "AGOSTO",
            Month::Septiembre => "SEPTIEMBRE",
            Month::Octubre => "OCTUBRE",
            Month::Noviembre => "NOVIEMBRE",
            Month::Diciembre => "DICIEMBRE",
        }
    }

    /// Zero-based calendar index (ENERO = 0)
    pub fn index(self) -> usize {
        self as usize
    }

    /// Month from a 1-based calendar number, as returned by `chrono::Datelike::month`
    pub fn from_number(number: u32) -> Option<Month> {
        let idx = usize::try_from(number).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    /// Parse a month label: trimmed, case-insensitive, `SETIEMBRE` accepted.
    pub fn from_label(label: &str) -> Option<Month> {
        let upper = label.trim().to_uppercase();
        if upper == "SETIEMBRE" {
            return Some(Month::Septiembre);
        }
        Self::ALL.iter().copied().find(|m| m.name() == upper)
    }

    /// Immediately preceding calendar month; `None` for ENERO.
    pub fn previous(self) -> Option<Month> {
        self.index().checked_sub(1).map(|i| Self::ALL[i])
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Month {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Month::from_label(s).ok_or_else(|| format!("unknown month: {}", s))
    }
}
