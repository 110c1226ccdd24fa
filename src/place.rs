//! Place records and the day/category vocabulary.
//!
//! Wire shapes stay camelCase with aliases for the legacy dataset keys
//! (`"O.T"`, `"C.T"`, `"distance-time"`). Footfall hours are string keys in
//! JSON and integer keys in memory; the conversion happens entirely at the
//! serde boundary.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Day of week, lowercase English name on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Day {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Day {
    pub const ALL: [Day; 7] = [
        Day::Monday,
        Day::Tuesday,
        Day::Wednesday,
        Day::Thursday,
        Day::Friday,
        Day::Saturday,
        Day::Sunday,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Day::Monday => "monday",
            Day::Tuesday => "tuesday",
            Day::Wednesday => "wednesday",
            Day::Thursday => "thursday",
            Day::Friday => "friday",
            Day::Saturday => "saturday",
            Day::Sunday => "sunday",
        }
    }

    pub fn is_weekend(self) -> bool {
        matches!(self, Day::Saturday | Day::Sunday)
    }
}

impl fmt::Display for Day {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unrecognized day: {0}")]
pub struct ParseDayError(String);

impl FromStr for Day {
    type Err = ParseDayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monday" => Ok(Day::Monday),
            "tuesday" => Ok(Day::Tuesday),
            "wednesday" => Ok(Day::Wednesday),
            "thursday" => Ok(Day::Thursday),
            "friday" => Ok(Day::Friday),
            "saturday" => Ok(Day::Saturday),
            "sunday" => Ok(Day::Sunday),
            other => Err(ParseDayError(other.to_string())),
        }
    }
}

/// One row of a place's travel matrix: distance and driving time to a
/// named destination.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TravelLeg {
    #[serde(rename = "distance")]
    pub distance_km: f64,
    /// Travel time in minutes.
    #[serde(rename = "time")]
    pub minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

/// A candidate destination.
///
/// `name` must be unique within one planning run; the travel matrix need
/// not be symmetric or complete. `closing_time == 0` means open 24 hours;
/// hours absent entirely means the place is never filtered out by opening
/// hours.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub name: String,
    #[serde(default, alias = "O.T", skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<u8>,
    #[serde(default, alias = "C.T", skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub footfall: HashMap<Day, BTreeMap<u8, u8>>,
    #[serde(default, rename = "distanceTime", alias = "distance-time")]
    pub travel: HashMap<String, TravelLeg>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl Place {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn display_category(&self) -> &str {
        self.category.as_deref().unwrap_or("other")
    }

    /// Travel minutes to a named destination, if the matrix has the leg.
    pub fn travel_minutes_to(&self, name: &str) -> Option<f64> {
        self.travel.get(name).map(|leg| leg.minutes)
    }
}

/// Ordered name-matching rules for category inference. First match wins.
const CATEGORY_RULES: &[(&str, &str)] = &[
    ("mall", "mall"),
    ("shopping", "mall"),
    ("park", "garden"),
    ("garden", "garden"),
    ("palace", "palace"),
    ("fort", "palace"),
    ("stadium", "stadium"),
    ("sports", "stadium"),
    ("restaurant", "restaurant"),
    ("cafe", "restaurant"),
    ("food", "restaurant"),
    ("cinema", "entertainment"),
    ("theater", "entertainment"),
    ("entertainment", "entertainment"),
    ("hotel", "hotel"),
    ("resort", "hotel"),
    ("temple", "temple"),
    ("church", "temple"),
    ("mosque", "temple"),
    ("market", "market"),
    ("bazaar", "market"),
    ("museum", "museum"),
    ("gallery", "museum"),
];

/// Infer a category from a place name.
pub fn classify_name(name: &str) -> &'static str {
    let lowered = name.to_lowercase();
    for (needle, category) in CATEGORY_RULES {
        if lowered.contains(needle) {
            return category;
        }
    }
    "other"
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read places dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed places dataset: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a places dataset from a JSON file, inferring missing categories
/// from place names.
pub fn load_places(path: impl AsRef<Path>) -> Result<Vec<Place>, DatasetError> {
    let raw = fs::read_to_string(path)?;
    let mut places: Vec<Place> = serde_json::from_str(&raw)?;
    for place in &mut places {
        if place.category.is_none() {
            place.category = Some(classify_name(&place.name).to_string());
        }
    }
    Ok(places)
}
