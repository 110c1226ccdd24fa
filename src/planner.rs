//! Greedy day-itinerary builder.
//!
//! A time-stepping loop over a simulated clock: pick the least crowded
//! place that is admissible right now, stay for the configured duration,
//! travel to the nearest remaining place, repeat. A recovery policy keeps
//! the loop moving when nothing is admissible, and a completion pass
//! guarantees every input place ends up on the itinerary.
//!
//! The builder is deliberately a locally-optimal heuristic; it does not
//! minimize total travel time or total crowd exposure.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::crowd;
use crate::place::{Day, Place};

#[derive(Debug, Clone)]
pub struct PlanOptions {
    /// Hours spent at every visited place.
    pub stay_duration: f64,
    /// A closed place opening within this many hours still counts as
    /// admissible, so the planner does not stall waiting for it.
    pub lookahead_hours: f64,
    /// Travel fallback when the matrix has no leg between two places.
    pub default_travel_minutes: f64,
    /// Hard cap on loop iterations; recovery steps can re-loop without
    /// scheduling anything.
    pub iteration_cap: usize,
}

impl Default for PlanOptions {
    fn default() -> Self {
        Self {
            stay_duration: 1.0,
            lookahead_hours: 2.0,
            default_travel_minutes: 30.0,
            iteration_cap: 1024,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LeaveReason {
    #[serde(rename = "Planned stay completed")]
    PlannedStayCompleted,
    #[serde(rename = "Closing time reached")]
    ClosingTimeReached,
    #[serde(rename = "Included to complete itinerary")]
    IncludedToCompleteItinerary,
}

impl std::fmt::Display for LeaveReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            LeaveReason::PlannedStayCompleted => "Planned stay completed",
            LeaveReason::ClosingTimeReached => "Closing time reached",
            LeaveReason::IncludedToCompleteItinerary => "Included to complete itinerary",
        })
    }
}

/// One scheduled stop.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub place: String,
    pub arrival_time: f64,
    pub footfall_at_arrival: u8,
    pub stay_duration: f64,
    pub leave_time: f64,
    pub reason_for_leaving: LeaveReason,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_time: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_time: Option<u8>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanResult {
    #[serde(rename = "itinerary")]
    pub visits: Vec<VisitRecord>,
    /// Always empty under the completion-pass policy; kept for callers
    /// that want the stricter contract.
    pub skipped_places: Vec<String>,
}

/// Per-run mutable state, owned by a single `plan` invocation.
struct PlanState {
    current_hour: f64,
    visited: HashSet<String>,
    visits: Vec<VisitRecord>,
    skipped: Vec<String>,
}

/// Round an hour value to one decimal, keeping repeated clock updates free
/// of floating-point drift.
fn round1(hour: f64) -> f64 {
    (hour * 10.0).round() / 10.0
}

/// Whether a place may be the next stop at `hour`.
///
/// Places without opening hours are never filtered out. Otherwise a place
/// qualifies when it is currently open (`closing_time == 0` meaning it
/// never closes) or opens within the lookahead window.
fn is_admissible(place: &Place, hour: f64, lookahead: f64, visited: &HashSet<String>) -> bool {
    if visited.contains(&place.name) {
        return false;
    }
    let (Some(opening), Some(closing)) = (place.opening_time, place.closing_time) else {
        return true;
    };

    let opening = f64::from(opening);
    let open_now = if closing == 0 {
        hour >= opening
    } else {
        opening <= hour && hour < f64::from(closing)
    };
    let opens_soon = opening > hour && opening <= hour + lookahead;

    open_now || opens_soon
}

/// Stable left fold: first place with the strictly lowest busyness wins.
fn least_busy<'a>(candidates: &[&'a Place], day: Day, hour: f64) -> Option<&'a Place> {
    let mut best: Option<(&Place, u8)> = None;
    for &place in candidates {
        let level = crowd::busyness(place, day, hour);
        match best {
            Some((_, lowest)) if level >= lowest => {}
            _ => best = Some((place, level)),
        }
    }
    best.map(|(place, _)| place)
}

/// Stable left fold: first candidate with the strictly shortest travel
/// time from `from` wins; missing legs count as `default_minutes`.
fn nearest<'a>(from: &Place, candidates: &[&'a Place], default_minutes: f64) -> Option<&'a Place> {
    let mut best: Option<(&Place, f64)> = None;
    for &place in candidates {
        let minutes = from.travel_minutes_to(&place.name).unwrap_or(default_minutes);
        match best {
            Some((_, shortest)) if minutes >= shortest => {}
            _ => best = Some((place, minutes)),
        }
    }
    best.map(|(place, _)| place)
}

/// Build a day itinerary over `places`.
///
/// Assumes validated input (see the request shell): unique place names,
/// `start_hour` in 0..=23, positive stay duration. The result covers every
/// input place; stops the loop could not fit are appended by the
/// completion pass with reason [`LeaveReason::IncludedToCompleteItinerary`].
pub fn plan(places: &[Place], day: Day, start_hour: u8, options: &PlanOptions) -> PlanResult {
    let mut state = PlanState {
        current_hour: f64::from(start_hour),
        visited: HashSet::new(),
        visits: Vec::new(),
        skipped: Vec::new(),
    };

    let mut iterations = 0usize;
    while state.visited.len() < places.len() {
        iterations += 1;
        if iterations > options.iteration_cap {
            debug!(iterations, "iteration cap reached, falling to completion pass");
            break;
        }

        let mut admissible: Vec<&Place> = places
            .iter()
            .filter(|place| {
                is_admissible(place, state.current_hour, options.lookahead_hours, &state.visited)
            })
            .collect();

        debug!(
            hour = state.current_hour,
            admissible = admissible.len(),
            visited = state.visited.len(),
            "planning step"
        );

        if admissible.is_empty() {
            let unvisited: Vec<&Place> = places
                .iter()
                .filter(|place| !state.visited.contains(&place.name))
                .collect();
            if unvisited.is_empty() {
                break;
            }

            // Unconstrained places are admissible by definition; seeing one
            // here means admissibility was mis-evaluated, so re-run the
            // filter instead of giving up.
            if unvisited
                .iter()
                .any(|place| place.opening_time.is_none() || place.closing_time.is_none())
            {
                continue;
            }

            // Fast-forward to the nearest opening still ahead of the clock.
            let next_opening = unvisited
                .iter()
                .filter_map(|place| place.opening_time)
                .map(f64::from)
                .filter(|&opening| opening > state.current_hour)
                .fold(f64::INFINITY, f64::min);
            if next_opening.is_finite() {
                debug!(from = state.current_hour, to = next_opening, "fast-forwarding clock");
                state.current_hour = next_opening;
                continue;
            }

            // Nothing opens later today. Force the first unvisited place in
            // rather than deadlocking.
            debug!(place = %unvisited[0].name, "force-admitting despite hour constraints");
            admissible.push(unvisited[0]);
        }

        let Some(next_place) = least_busy(&admissible, day, state.current_hour) else {
            break;
        };

        let footfall_at_arrival = crowd::busyness(next_place, day, state.current_hour);
        let leave_time = round1(state.current_hour + options.stay_duration);
        let reason = match next_place.closing_time {
            Some(closing) if closing != 0 && leave_time >= f64::from(closing) => {
                LeaveReason::ClosingTimeReached
            }
            _ => LeaveReason::PlannedStayCompleted,
        };

        debug!(
            place = %next_place.name,
            footfall = footfall_at_arrival,
            leave = leave_time,
            "scheduling stop"
        );

        state.visits.push(VisitRecord {
            place: next_place.name.clone(),
            arrival_time: round1(state.current_hour),
            footfall_at_arrival,
            stay_duration: options.stay_duration,
            leave_time,
            reason_for_leaving: reason,
            category: next_place.display_category().to_string(),
            opening_time: next_place.opening_time,
            closing_time: next_place.closing_time,
        });
        state.visited.insert(next_place.name.clone());

        if state.visited.len() == places.len() {
            break;
        }

        let remaining: Vec<&Place> = places
            .iter()
            .filter(|place| !state.visited.contains(&place.name))
            .collect();
        let Some(next_dest) = nearest(next_place, &remaining, options.default_travel_minutes)
        else {
            break;
        };
        let travel = next_place
            .travel_minutes_to(&next_dest.name)
            .unwrap_or(options.default_travel_minutes);
        state.current_hour = round1(leave_time + travel / 60.0);
        debug!(dest = %next_dest.name, minutes = travel, hour = state.current_hour, "travelling");
    }

    // Completion pass: whatever the loop could not place still goes on the
    // itinerary, spaced half an hour apart.
    let leftovers: Vec<&Place> = places
        .iter()
        .filter(|place| !state.visited.contains(&place.name))
        .collect();
    for (index, &place) in leftovers.iter().enumerate() {
        let arrival = round1(state.current_hour + index as f64 * 0.5);
        state.visits.push(VisitRecord {
            place: place.name.clone(),
            arrival_time: arrival,
            footfall_at_arrival: crowd::busyness(place, day, arrival),
            stay_duration: options.stay_duration,
            leave_time: round1(arrival + options.stay_duration),
            reason_for_leaving: LeaveReason::IncludedToCompleteItinerary,
            category: place.display_category().to_string(),
            opening_time: place.opening_time,
            closing_time: place.closing_time,
        });
    }

    PlanResult {
        visits: state.visits,
        skipped_places: state.skipped,
    }
}
