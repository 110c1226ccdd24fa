//! itinerary-planner core
//!
//! Greedy day-itinerary construction over a set of places: repeatedly
//! visit the least crowded place that is open (or about to open), then
//! travel to the nearest remaining one. Collaborator modules enrich
//! externally sourced places and wrap the core in a validated
//! request/response shell.

pub mod place;
pub mod crowd;
pub mod planner;
pub mod enrich;
pub mod nominatim;
pub mod request;
