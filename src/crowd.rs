//! Footfall lookup.
//!
//! A footfall table maps day-of-week to hour-keyed busyness percentages
//! (0-100). Tables may be partial; everything missing resolves to
//! [`DEFAULT_BUSYNESS`] so the planner never errors on sparse data.

use crate::place::{Day, Place};

/// Busyness assumed when a place has no footfall data for the day.
pub const DEFAULT_BUSYNESS: u8 = 50;

/// Busyness percentage for a place at a given day and hour.
///
/// Picks the latest tabulated hour at or before `hour`; when every key is
/// later than `hour`, falls back to the earliest key.
pub fn busyness(place: &Place, day: Day, hour: f64) -> u8 {
    let Some(table) = place.footfall.get(&day) else {
        return DEFAULT_BUSYNESS;
    };

    let mut chosen = None;
    for (&key, &value) in table {
        if f64::from(key) <= hour {
            chosen = Some(value);
        } else {
            break;
        }
    }

    chosen
        .or_else(|| table.values().next().copied())
        .unwrap_or(DEFAULT_BUSYNESS)
}
