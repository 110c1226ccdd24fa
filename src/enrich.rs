//! Defaults for externally sourced places.
//!
//! Search results arrive without opening hours, footfall tables, or travel
//! legs, while the planner expects all three. This module fills the gaps
//! with category-based defaults and rough random estimates before the core
//! runs.

use std::collections::{BTreeMap, HashMap};

use rand::Rng;
use rayon::prelude::*;

use crate::place::{Day, Place, TravelLeg};

/// Default opening hour by category.
pub fn default_opening_hour(category: &str) -> u8 {
    match category {
        "restaurant" => 8,
        "cafe" => 7,
        "mall" => 10,
        "market" => 6,
        "garden" => 5,
        "stadium" => 6,
        "entertainment" => 10,
        "museum" => 9,
        "attraction" => 9,
        "temple" => 5,
        "hotel" => 0,
        _ => 9,
    }
}

/// Default closing hour by category.
///
/// Hotels never close and get the `0` sentinel, not a literal `24`: the
/// admissibility check reads `24` as an ordinary closing hour, which would
/// shut a round-the-clock place once the simulated clock passes midnight.
/// Dataset imports that use `24` for 24-hour places should normalize to
/// the sentinel as well.
pub fn default_closing_hour(category: &str) -> u8 {
    match category {
        "restaurant" => 23,
        "cafe" => 22,
        "mall" => 22,
        "market" => 20,
        "garden" => 19,
        "stadium" => 22,
        "entertainment" => 23,
        "museum" => 17,
        "attraction" => 18,
        "hotel" => 0,
        _ => 21,
    }
}

/// Hourly crowd shape for a category: peak hours plus a base level.
fn base_pattern(category: &str) -> (&'static [u8], u8) {
    match category {
        "restaurant" => (&[12, 13, 19, 20, 21], 30),
        "cafe" => (&[8, 9, 15, 16, 17], 25),
        "mall" | "market" => (&[14, 15, 16, 17, 18, 19, 20], 40),
        "garden" => (&[6, 7, 8, 17, 18, 19], 20),
        "stadium" => (&[18, 19, 20, 21], 15),
        "entertainment" => (&[14, 15, 16, 19, 20, 21, 22], 35),
        "museum" => (&[10, 11, 12, 14, 15, 16], 25),
        _ => (&[12, 13, 19, 20], 30),
    }
}

/// Generate a full 7-day, 24-hour footfall table for a category.
///
/// Base level plus a peak-hour boost, a weekend multiplier, and bounded
/// random jitter, clamped to 0-100.
pub fn synthetic_footfall(category: &str, rng: &mut impl Rng) -> HashMap<Day, BTreeMap<u8, u8>> {
    let (peaks, base) = base_pattern(category);

    Day::ALL
        .iter()
        .map(|&day| {
            let table = (0u8..24)
                .map(|hour| {
                    let mut level = f64::from(base);
                    if peaks.contains(&hour) {
                        level += 40.0;
                    }
                    if day.is_weekend() {
                        level *= 1.3;
                    }
                    level += rng.gen_range(-10.0..10.0);
                    (hour, level.clamp(0.0, 100.0).round() as u8)
                })
                .collect();
            (day, table)
        })
        .collect()
}

/// Fill in missing opening hours and footfall for one place.
pub fn ensure_schedule(place: &mut Place, rng: &mut impl Rng) {
    let category = place.display_category().to_string();
    if place.opening_time.is_none() {
        place.opening_time = Some(default_opening_hour(&category));
    }
    if place.closing_time.is_none() {
        place.closing_time = Some(default_closing_hour(&category));
    }
    if place.footfall.is_empty() {
        place.footfall = synthetic_footfall(&category, rng);
    }
}

/// Give every place with an empty travel matrix an estimated row against
/// all other places: 5-25 km, roughly 3 minutes per km plus jitter.
///
/// Places that already carry a matrix are left alone; individual missing
/// legs on those fall back to the planner's default travel time.
pub fn estimate_travel(places: &mut [Place]) {
    let names: Vec<String> = places.iter().map(|place| place.name.clone()).collect();

    places.par_iter_mut().for_each(|place| {
        if !place.travel.is_empty() {
            return;
        }
        let mut rng = rand::thread_rng();
        for name in &names {
            if *name == place.name {
                continue;
            }
            let distance_km: f64 = rng.gen_range(5.0..25.0);
            let minutes = (distance_km * 3.0 + rng.gen_range(0.0..10.0)).round();
            place.travel.insert(
                name.clone(),
                TravelLeg {
                    distance_km: (distance_km * 10.0).round() / 10.0,
                    minutes,
                },
            );
        }
    });
}
