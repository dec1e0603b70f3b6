//! Alert data models

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of visa an alert watches for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VisaType {
    /// Tourist visa
    Tourist,
    /// Business visa
    Business,
    /// Student visa
    Student,
}

impl VisaType {
    /// Every variant, in display order
    pub const ALL: [Self; 3] = [Self::Tourist, Self::Business, Self::Student];

    /// Wire and storage name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tourist => "Tourist",
            Self::Business => "Business",
            Self::Student => "Student",
        }
    }
}

/// Lifecycle status of an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum AlertStatus {
    /// Still watching for a slot
    #[default]
    Active,
    /// A slot was secured
    Booked,
    /// No longer relevant
    Expired,
}

impl AlertStatus {
    /// Every variant, in display order
    pub const ALL: [Self; 3] = [Self::Active, Self::Booked, Self::Expired];

    /// Wire and storage name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Booked => "Booked",
            Self::Expired => "Expired",
        }
    }
}

/// Returned when a string names no variant of a closed enum
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    /// Which enum was being parsed
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

impl FromStr for VisaType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "visa type",
                value: s.to_string(),
            })
    }
}

impl FromStr for AlertStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

impl fmt::Display for VisaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl fmt::Display for AlertStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A persisted request to watch for a visa appointment slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Unique identifier, assigned on creation
    pub id: Uuid,

    /// Destination country
    pub country: String,

    /// Consulate city
    pub city: String,

    /// Visa category being watched
    pub visa_type: VisaType,

    /// Current lifecycle status
    pub status: AlertStatus,

    /// When the alert was created
    pub created_at: DateTime<Utc>,

    /// When the alert was last modified
    pub updated_at: DateTime<Utc>,
}

/// Input for creating an alert.
///
/// On the server this only comes out of validation, so the store persists
/// it as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlert {
    /// Destination country, trimmed
    pub country: String,
    /// Consulate city, trimmed
    pub city: String,
    /// Visa category
    pub visa_type: VisaType,
}

impl NewAlert {
    /// Materialize a fresh `Active` alert stamped with `now`
    pub fn into_alert(self, now: DateTime<Utc>) -> Alert {
        Alert {
            id: Uuid::new_v4(),
            country: self.country,
            city: self.city,
            visa_type: self.visa_type,
            status: AlertStatus::default(),
            created_at: now,
            updated_at: now,
        }
    }
}
