//! Generation inputs
//!
//! [`JournalConfig`] is the validated input to the layout engine. It is
//! usually built from [`JournalSettings`], a partially-filled set of values
//! coming from a TOML file and the command line, with defaults applied for
//! anything left out.
//!
//! ```toml
//! start_date = "2025-04-28"
//! initial_capital = 25000
//! weeks = 4
//! output_dir = "output"
//! open = false
//! ```

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::JournalError;

pub const DEFAULT_START_DATE: &str = "2025-04-28";
pub const DEFAULT_CAPITAL: i64 = 25_000;
pub const DEFAULT_WEEKS: u32 = 4;
pub const MIN_WEEKS: u32 = 1;
pub const MAX_WEEKS: u32 = 4;

/// Format accepted for start dates
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Validated generation inputs
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct JournalConfig {
    /// First calendar day considered; weekends roll forward to Monday
    pub start_date: NaiveDate,
    /// Starting account balance used by every balance formula
    pub initial_capital: Decimal,
    /// Number of week blocks (1..=4)
    pub weeks: u32,
}

impl JournalConfig {
    pub fn new(
        start_date: NaiveDate,
        initial_capital: Decimal,
        weeks: u32,
    ) -> Result<Self, JournalError> {
        if !(MIN_WEEKS..=MAX_WEEKS).contains(&weeks) {
            return Err(JournalError::WeeksOutOfRange(weeks));
        }
        if initial_capital <= Decimal::ZERO {
            return Err(JournalError::InvalidCapital(initial_capital.to_string()));
        }
        Ok(Self {
            start_date,
            initial_capital: initial_capital.normalize(),
            weeks,
        })
    }

    /// Build from raw textual inputs
    pub fn parse(
        start_date: &str,
        initial_capital: &str,
        weeks: u32,
    ) -> Result<Self, JournalError> {
        let date = parse_start_date(start_date)?;
        let capital = parse_capital(initial_capital)?;
        Self::new(date, capital, weeks)
    }

    /// Start date plus whole calendar weeks, used for the default file name
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::weeks(i64::from(self.weeks))
    }

    /// `trading_journal_<start>_to_<end>.xlsx`
    pub fn default_file_name(&self) -> String {
        format!(
            "trading_journal_{}_to_{}.xlsx",
            self.start_date.format(DATE_FORMAT),
            self.end_date().format(DATE_FORMAT)
        )
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            start_date: NaiveDate::from_ymd_opt(2025, 4, 28).unwrap_or_default(),
            initial_capital: Decimal::from(DEFAULT_CAPITAL),
            weeks: DEFAULT_WEEKS,
        }
    }
}

/// Parse an ISO `YYYY-MM-DD` date
pub fn parse_start_date(input: &str) -> Result<NaiveDate, JournalError> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| JournalError::InvalidStartDate(input.to_string()))
}

/// Parse a strictly positive decimal amount
pub fn parse_capital(input: &str) -> Result<Decimal, JournalError> {
    let value: Decimal = input
        .trim()
        .parse()
        .map_err(|_| JournalError::InvalidCapital(input.to_string()))?;
    if value <= Decimal::ZERO {
        return Err(JournalError::InvalidCapital(input.to_string()));
    }
    Ok(value)
}

/// Partially specified settings, merged from a config file and CLI flags
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JournalSettings {
    pub start_date: Option<String>,
    pub initial_capital: Option<Decimal>,
    pub weeks: Option<u32>,
    pub output_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub open: Option<bool>,
}

impl JournalSettings {
    pub fn from_toml_str(input: &str) -> Result<Self, JournalError> {
        toml::from_str(input).map_err(|e| JournalError::Config(e.to_string()))
    }

    /// Load settings from a TOML file
    pub fn load(path: &Path) -> Result<Self, JournalError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| JournalError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&content)
    }

    /// Values set in `other` win over values set in `self`
    pub fn overlay(self, other: JournalSettings) -> Self {
        Self {
            start_date: other.start_date.or(self.start_date),
            initial_capital: other.initial_capital.or(self.initial_capital),
            weeks: other.weeks.or(self.weeks),
            output_dir: other.output_dir.or(self.output_dir),
            file_name: other.file_name.or(self.file_name),
            open: other.open.or(self.open),
        }
    }

    /// Apply defaults and validate
    pub fn resolve(&self) -> Result<JournalConfig, JournalError> {
        let start = parse_start_date(self.start_date.as_deref().unwrap_or(DEFAULT_START_DATE))?;
        let capital = self
            .initial_capital
            .unwrap_or_else(|| Decimal::from(DEFAULT_CAPITAL));
        JournalConfig::new(start, capital, self.weeks.unwrap_or(DEFAULT_WEEKS))
    }
}
