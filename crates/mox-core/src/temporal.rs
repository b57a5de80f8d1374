//! # Validity Intervals ("virkning")
//!
//! Every attribute, state and relation entry is stamped with a [`Virkning`]:
//! the business-time range during which the entry is effective. This is
//! distinct from the registration (system-time) envelope owned by the
//! persistence layer.
//!
//! Bounds arrive as strings in the forms the persistence layer accepts:
//! dates, RFC 3339 timestamps, PostgreSQL timestamps (`2014-05-19 12:02:32`,
//! optionally with an offset such as `+02`) and the open bounds
//! `infinity` and `-infinity`, which [`TimeBound`] models explicitly.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::MoxError;

/// Business-time validity interval attached to every versioned entry.
///
/// Field names on the wire follow the registry's payload vocabulary
/// (`aktoerref`, `aktoertypekode`, `notetekst`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Virkning {
    pub from: String,
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_included: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_included: Option<bool>,
    /// Actor who made the entry effective.
    #[serde(rename = "aktoerref", default, skip_serializing_if = "Option::is_none")]
    pub actor_reference: Option<Uuid>,
    #[serde(rename = "aktoertypekode", default, skip_serializing_if = "Option::is_none")]
    pub actor_type_code: Option<String>,
    #[serde(rename = "notetekst", default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Virkning {
    /// Interval with only the mandatory bounds set.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            from_included: None,
            to_included: None,
            actor_reference: None,
            actor_type_code: None,
            note: None,
        }
    }

    /// Parse both bounds and check that `from` does not come after `to`.
    pub fn bounds(&self) -> Result<(TimeBound, TimeBound), MoxError> {
        let from = TimeBound::parse(&self.from)?;
        let to = TimeBound::parse(&self.to)?;
        if from > to {
            return Err(MoxError::InvalidVirkning(format!(
                "from ({}) is after to ({})",
                self.from, self.to
            )));
        }
        Ok((from, to))
    }

    /// Reject intervals whose `from` comes after `to`.
    ///
    /// Bounds this crate cannot parse are left to the persistence layer;
    /// only two parsed bounds in the wrong order are an error.
    pub fn check_order(&self) -> Result<(), MoxError> {
        match (TimeBound::parse(&self.from), TimeBound::parse(&self.to)) {
            (Ok(from), Ok(to)) if from > to => Err(MoxError::InvalidVirkning(format!(
                "from ({}) is after to ({})",
                self.from, self.to
            ))),
            _ => Ok(()),
        }
    }

    /// True when the interval never ends.
    pub fn is_open_ended(&self) -> bool {
        matches!(TimeBound::parse(&self.to), Ok(TimeBound::Infinity))
    }
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One end of a validity interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBound {
    NegInfinity,
    At(DateTime<Utc>),
    Infinity,
}

impl TimeBound {
    /// Parse `infinity`, `-infinity`, a `YYYY-MM-DD` date (midnight UTC),
    /// an RFC 3339 timestamp or a PostgreSQL timestamp. Timestamps without
    /// an offset are taken as UTC; offsets may omit the minutes (`+02`).
    pub fn parse(value: &str) -> Result<Self, MoxError> {
        let trimmed = value.trim();
        match trimmed {
            "infinity" => return Ok(Self::Infinity),
            "-infinity" => return Ok(Self::NegInfinity),
            _ => {}
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
            return Ok(Self::At(dt.with_timezone(&Utc)));
        }
        for format in OFFSET_FORMATS {
            if let Ok(dt) = DateTime::parse_from_str(trimmed, format) {
                return Ok(Self::At(dt.with_timezone(&Utc)));
            }
        }
        for format in NAIVE_FORMATS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Ok(Self::At(naive.and_utc()));
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| Self::At(naive.and_utc()))
            .ok_or_else(|| {
                MoxError::InvalidVirkning(format!(
                    "expected a date, a timestamp or (-)infinity, got {value:?}"
                ))
            })
    }
}

impl PartialOrd for TimeBound {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TimeBound {
    fn cmp(&self, other: &Self) -> Ordering {
        use TimeBound::*;
        match (self, other) {
            (NegInfinity, NegInfinity) | (Infinity, Infinity) => Ordering::Equal,
            (NegInfinity, _) | (_, Infinity) => Ordering::Less,
            (_, NegInfinity) | (Infinity, _) => Ordering::Greater,
            (At(a), At(b)) => a.cmp(b),
        }
    }
}
