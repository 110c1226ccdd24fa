//! Request validation and response assembly around the planner core.
//!
//! The core assumes validated input; this shell is where a wrapping layer
//! (HTTP endpoint, UI call) rejects malformed requests, merges search
//! results into the catalog, enriches them, and derives summary stats.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::enrich;
use crate::place::{classify_name, Day, Place};
use crate::planner::{self, PlanOptions, PlanResult, VisitRecord};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    #[error("unrecognized day: {0}")]
    InvalidDay(String),
    #[error("start hour must be between 0 and 23")]
    StartHourOutOfRange,
    #[error("stay duration must be positive")]
    NonPositiveStayDuration,
    #[error("no places found")]
    NoPlaces,
}

fn default_stay_duration() -> f64 {
    1.0
}

/// One planning request, as submitted by the interface layer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    pub day: String,
    pub start_hour: i32,
    #[serde(default = "default_stay_duration")]
    pub stay_duration: f64,
    /// When non-empty, restricts the run to these names.
    #[serde(default)]
    pub selected_places: Vec<String>,
    /// Externally sourced places to merge into the catalog; enriched with
    /// default hours, footfall, and travel estimates before planning.
    #[serde(default)]
    pub nominatim_places: Vec<Place>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResponse {
    pub itinerary: Vec<VisitRecord>,
    pub skipped_places: Vec<String>,
    pub summary: PlanSummary,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanSummary {
    pub total_places: usize,
    pub visited_places: usize,
    pub skipped_places: usize,
    /// Mean arrival-time footfall across scheduled stops, 2 decimals.
    pub average_footfall: f64,
    /// Summed inter-stop travel minutes, rounded.
    pub total_travel_time: f64,
    /// Visited/total ratio.
    pub efficiency: f64,
    pub day: Day,
    pub start_hour: u8,
    pub stay_duration: f64,
}

impl PlanRequest {
    pub fn new(day: impl Into<String>, start_hour: i32) -> Self {
        Self {
            day: day.into(),
            start_hour,
            stay_duration: default_stay_duration(),
            selected_places: Vec::new(),
            nominatim_places: Vec::new(),
        }
    }

    /// Validate the request, then plan over the catalog plus any merged
    /// external places.
    pub fn run(&self, catalog: &[Place]) -> Result<PlanResponse, PlanError> {
        let day: Day = self
            .day
            .parse()
            .map_err(|_| PlanError::InvalidDay(self.day.clone()))?;
        if !(0..=23).contains(&self.start_hour) {
            return Err(PlanError::StartHourOutOfRange);
        }
        if self.stay_duration <= 0.0 {
            return Err(PlanError::NonPositiveStayDuration);
        }
        let start_hour = self.start_hour as u8;

        let mut rng = rand::thread_rng();
        let mut extras = self.nominatim_places.clone();
        for place in &mut extras {
            if place.category.is_none() {
                place.category = Some(classify_name(&place.name).to_string());
            }
            enrich::ensure_schedule(place, &mut rng);
        }

        let mut places: Vec<Place> = catalog.to_vec();
        places.extend(extras);

        if !self.selected_places.is_empty() {
            places.retain(|place| self.selected_places.iter().any(|name| name == &place.name));
        }
        if places.is_empty() {
            warn!(selected = self.selected_places.len(), "no places matched the request");
            return Err(PlanError::NoPlaces);
        }

        enrich::estimate_travel(&mut places);

        let options = PlanOptions {
            stay_duration: self.stay_duration,
            ..PlanOptions::default()
        };
        let result = planner::plan(&places, day, start_hour, &options);
        let summary = PlanSummary::derive(&places, &result, day, start_hour, self.stay_duration);
        info!(
            day = %day,
            visited = summary.visited_places,
            travel_minutes = summary.total_travel_time,
            "itinerary generated"
        );

        Ok(PlanResponse {
            itinerary: result.visits,
            skipped_places: result.skipped_places,
            summary,
        })
    }
}

impl PlanSummary {
    pub fn derive(
        places: &[Place],
        result: &PlanResult,
        day: Day,
        start_hour: u8,
        stay_duration: f64,
    ) -> Self {
        let visited = result.visits.len();
        let average_footfall = if visited > 0 {
            let total: f64 = result
                .visits
                .iter()
                .map(|visit| f64::from(visit.footfall_at_arrival))
                .sum();
            (total / visited as f64 * 100.0).round() / 100.0
        } else {
            0.0
        };

        let total_travel_time: f64 = result
            .visits
            .windows(2)
            .map(|pair| {
                places
                    .iter()
                    .find(|place| place.name == pair[0].place)
                    .and_then(|from| from.travel_minutes_to(&pair[1].place))
                    .unwrap_or(0.0)
            })
            .sum();

        let efficiency = if places.is_empty() {
            0.0
        } else {
            visited as f64 / places.len() as f64
        };

        Self {
            total_places: places.len(),
            visited_places: visited,
            skipped_places: result.skipped_places.len(),
            average_footfall,
            total_travel_time: total_travel_time.round(),
            efficiency,
            day,
            start_hour,
            stay_duration,
        }
    }
}
