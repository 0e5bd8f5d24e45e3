//! Clinical entries attached to a patient.
//!
//! An entry is a closed, tagged union over three kinds of visit. On the wire every entry is a flat
//! JSON object whose `type` field selects the kind:
//!
//! ```json
//! { "id": "...", "type": "HealthCheck", "date": "2019-10-20", "specialist": "MD House",
//!   "description": "Yearly control visit.", "healthCheckRating": 0 }
//! ```
//!
//! In Rust the shared fields live in [`EntryDetails`] and the kind-specific fields in
//! [`EntryKind`]; both are flattened into the same JSON object. [`NewEntry`] is the same shape
//! without the server-assigned `id` and is the body of `POST /patients/:id/entries`.

use crate::constants::{MAX_HEALTH_CHECK_RATING, MIN_HEALTH_CHECK_RATING};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entry type tag
// ============================================================================

/// The discriminant of an entry, without any payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    HealthCheck,
    Hospital,
    OccupationalHealthcare,
}

impl EntryType {
    /// Options offered by the entry type selector, in display order.
    pub const OPTIONS: [EntryType; 3] = [
        EntryType::HealthCheck,
        EntryType::Hospital,
        EntryType::OccupationalHealthcare,
    ];

    /// Wire name of the type, as used in the `type` field.
    pub fn as_str(self) -> &'static str {
        match self {
            EntryType::HealthCheck => "HealthCheck",
            EntryType::Hospital => "Hospital",
            EntryType::OccupationalHealthcare => "OccupationalHealthcare",
        }
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntryType::OPTIONS
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!(
                    "unknown entry type '{s}' (expected HealthCheck, Hospital or OccupationalHealthcare)"
                )
            })
    }
}

// ============================================================================
// Kind-specific payloads
// ============================================================================

/// Outcome of a health check, from healthy to critical.
///
/// Serialised as its integer level (0-3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum HealthCheckRating {
    Healthy = 0,
    LowRisk = 1,
    HighRisk = 2,
    CriticalRisk = 3,
}

impl HealthCheckRating {
    /// Map a raw level onto a rating, if it is one of the four defined levels.
    pub fn from_level(level: i64) -> Option<Self> {
        match level {
            0 => Some(HealthCheckRating::Healthy),
            1 => Some(HealthCheckRating::LowRisk),
            2 => Some(HealthCheckRating::HighRisk),
            3 => Some(HealthCheckRating::CriticalRisk),
            _ => None,
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for HealthCheckRating {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        HealthCheckRating::from_level(i64::from(value)).ok_or_else(|| {
            format!(
                "healthCheckRating must be between {MIN_HEALTH_CHECK_RATING} and {MAX_HEALTH_CHECK_RATING}, got {value}"
            )
        })
    }
}

impl From<HealthCheckRating> for u8 {
    fn from(rating: HealthCheckRating) -> Self {
        rating.level()
    }
}

/// Discharge record of a hospital stay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Discharge {
    pub date: NaiveDate,
    pub criteria: String,
}

/// Kind-specific part of an entry, selected by the `type` tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntryKind {
    #[serde(rename_all = "camelCase")]
    HealthCheck {
        health_check_rating: HealthCheckRating,
    },
    Hospital {
        discharge: Discharge,
    },
    #[serde(rename_all = "camelCase")]
    OccupationalHealthcare {
        employer_name: String,
    },
}

impl EntryKind {
    pub fn entry_type(&self) -> EntryType {
        match self {
            EntryKind::HealthCheck { .. } => EntryType::HealthCheck,
            EntryKind::Hospital { .. } => EntryType::Hospital,
            EntryKind::OccupationalHealthcare { .. } => EntryType::OccupationalHealthcare,
        }
    }
}

// ============================================================================
// Entries
// ============================================================================

/// Everything an entry carries except its id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryDetails {
    pub description: String,
    pub date: NaiveDate,
    pub specialist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagnosis_codes: Option<Vec<String>>,
    #[serde(flatten)]
    pub kind: EntryKind,
}

impl EntryDetails {
    /// Diagnosis codes of the entry; empty when the entry carries none.
    pub fn diagnosis_codes(&self) -> &[String] {
        self.diagnosis_codes.as_deref().unwrap_or_default()
    }
}

/// Body of a create-entry request.
pub type NewEntry = EntryDetails;

/// A clinical entry with its server-assigned id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    #[serde(flatten)]
    pub details: EntryDetails,
}

impl Entry {
    pub fn entry_type(&self) -> EntryType {
        self.details.kind.entry_type()
    }
}
