use crate::calendar::normalize;
use crate::error::RecordError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Once,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Once => "once",
            Frequency::Monthly => "monthly",
            Frequency::Quarterly => "quarterly",
            Frequency::Annual => "annual",
        }
    }

}

/// Returned when a frequency string is not one of the known cycles.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown frequency '{0}'")]
pub struct ParseFrequencyError(pub String);

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "once" => Ok(Frequency::Once),
            "monthly" => Ok(Frequency::Monthly),
            "quarterly" => Ok(Frequency::Quarterly),
            "annual" | "annually" | "yearly" => Ok(Frequency::Annual),
            _ => Err(ParseFrequencyError(input.to_string())),
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed custom event whose dates are derived from `anchor_date`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringItem {
    pub title: String,
    pub anchor_date: NaiveDate,
    pub frequency: Frequency,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiry: Option<NaiveDate>,
}

impl RecurringItem {
    pub fn new(title: impl Into<String>, anchor_date: NaiveDate, frequency: Frequency) -> Self {
        Self {
            title: title.into(),
            anchor_date,
            frequency,
            expiry: None,
        }
    }

    /// Concrete dates this item is active on in `target_year`.
    pub fn occurrences(&self, target_year: i32) -> Vec<NaiveDate> {
        occurrences(self, target_year)
    }
}

/// Event as it is stored on disk. Keys this crate does not interpret are
/// kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete_on: Option<NaiveDate>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EventRecord {
    pub fn new(title: impl Into<String>, date: impl Into<String>, frequency: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            frequency: frequency.into(),
            delete_on: None,
            extra: Map::new(),
        }
    }

    pub fn from_item(item: &RecurringItem) -> Self {
        Self {
            title: item.title.clone(),
            date: item.anchor_date.format("%Y-%m-%d").to_string(),
            frequency: item.frequency.as_str().to_string(),
            delete_on: item.expiry,
            extra: Map::new(),
        }
    }

    pub fn to_item(&self) -> Result<RecurringItem, RecordError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(RecordError::MalformedRecord {
                title: String::new(),
                field: "title",
            });
        }
        if self.date.trim().is_empty() {
            return Err(RecordError::MalformedRecord {
                title: title.to_string(),
                field: "date",
            });
        }
        if self.frequency.trim().is_empty() {
            return Err(RecordError::MalformedRecord {
                title: title.to_string(),
                field: "frequency",
            });
        }
        let anchor_date = parse_anchor_date(&self.date).ok_or_else(|| {
            RecordError::InvalidAnchorDate {
                title: title.to_string(),
                value: self.date.clone(),
            }
        })?;
        let frequency = self
            .frequency
            .parse::<Frequency>()
            .map_err(|_| RecordError::UnknownFrequency {
                title: title.to_string(),
                value: self.frequency.clone(),
            })?;
        Ok(RecurringItem {
            title: title.to_string(),
            anchor_date,
            frequency,
            expiry: self.delete_on,
        })
    }
}

fn parse_anchor_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(input, fmt).ok())
}

/// First month of the quarterly cycle containing `anchor_month`.
pub fn quarter_phase(anchor_month: u32) -> u32 {
    match anchor_month % 3 {
        0 => 3,
        phase => phase,
    }
}

/// Expand `item` into the dates it is active on within `target_year`.
///
/// The result is ascending and free of duplicates. `Once` items keep their
/// anchor date as-is, whatever the target year.
pub fn occurrences(item: &RecurringItem, target_year: i32) -> Vec<NaiveDate> {
    let anchor = item.anchor_date;
    let day = anchor.day();

    let mut dates = match item.frequency {
        Frequency::Once => vec![anchor],
        Frequency::Annual => vec![normalize(target_year, anchor.month(), day)],
        Frequency::Monthly => (1..=12)
            .map(|month| normalize(target_year, month, day))
            .collect(),
        Frequency::Quarterly => {
            let first = quarter_phase(anchor.month());
            (0..4)
                .map(|step| normalize(target_year, first + 3 * step, day))
                .collect()
        }
    };

    dates.sort();
    dates.dedup();
    dates
}
