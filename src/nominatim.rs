//! Nominatim HTTP adapter for place discovery.
//!
//! Maps free-text queries to enriched [`Place`] records ready for the
//! planner. Results carry no opening hours or footfall, so the adapter
//! runs them through [`crate::enrich`] before handing them back.

use std::collections::HashSet;

use rand::Rng;
use serde::Deserialize;

use crate::enrich;
use crate::place::{Coordinates, Place};

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Appended to every query to scope the search.
    pub city: String,
    pub limit: usize,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            city: "Bangalore".to_string(),
            limit: 50,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        // Nominatim's usage policy requires an identifying User-Agent.
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent("itinerary-planner/0.2 (contact@example.com)")
            .build()?;

        Ok(Self { config, client })
    }

    /// Search for places matching `query` within the configured city.
    pub fn search(&self, query: &str) -> Result<Vec<Place>, reqwest::Error> {
        let params = [
            ("q", format!("{} {}", query, self.config.city)),
            ("format", "json".to_string()),
            ("limit", self.config.limit.to_string()),
            ("addressdetails", "1".to_string()),
            ("extratags", "1".to_string()),
        ];

        let rows: Vec<NominatimRow> = self
            .client
            .get(format!("{}/search", self.config.base_url))
            .query(&params)
            .send()?
            .error_for_status()?
            .json()?;

        let mut seen = HashSet::new();
        let mut rng = rand::thread_rng();
        let places = rows
            .into_iter()
            .filter(|row| seen.insert(row.place_id))
            .map(|row| row.into_place(&mut rng))
            .collect();

        Ok(places)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimRow {
    place_id: u64,
    display_name: String,
    lat: String,
    lon: String,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    class: Option<String>,
}

impl NominatimRow {
    fn into_place(self, rng: &mut impl Rng) -> Place {
        // Display names are full addresses; the leading segment is the name.
        let name = self
            .display_name
            .split(',')
            .next()
            .unwrap_or(&self.display_name)
            .trim()
            .to_string();
        let category = osm_category(self.kind.as_deref(), self.class.as_deref());
        let coordinates = match (self.lat.parse(), self.lon.parse()) {
            (Ok(lat), Ok(lng)) => Some(Coordinates { lat, lng }),
            _ => None,
        };

        let mut place = Place::new(name);
        place.category = Some(category.to_string());
        place.coordinates = coordinates;
        enrich::ensure_schedule(&mut place, rng);
        place
    }
}

/// Map OSM type/class tags onto this crate's category vocabulary. The type
/// tag wins over the class tag.
fn osm_category(kind: Option<&str>, class: Option<&str>) -> &'static str {
    kind.and_then(tag_category)
        .or_else(|| class.and_then(tag_category))
        .unwrap_or("other")
}

fn tag_category(tag: &str) -> Option<&'static str> {
    Some(match tag {
        "restaurant" | "fast_food" | "food" => "restaurant",
        "cafe" => "cafe",
        "mall" | "shopping" | "shop" => "mall",
        "market" => "market",
        "tourist_attraction" | "monument" => "attraction",
        "museum" => "museum",
        "palace" => "palace",
        "park" | "garden" => "garden",
        "stadium" => "stadium",
        "cinema" | "theater" | "theatre" => "entertainment",
        "hotel" => "hotel",
        "temple" | "place_of_worship" | "religious" => "temple",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(display_name: &str, kind: Option<&str>, class: Option<&str>) -> NominatimRow {
        NominatimRow {
            place_id: 1,
            display_name: display_name.to_string(),
            lat: "12.9716".to_string(),
            lon: "77.5946".to_string(),
            kind: kind.map(str::to_string),
            class: class.map(str::to_string),
        }
    }

    #[test]
    fn test_name_is_first_segment() {
        let mut rng = rand::thread_rng();
        let place = row("Cubbon Park, Bengaluru, Karnataka, India", Some("park"), None)
            .into_place(&mut rng);
        assert_eq!(place.name, "Cubbon Park");
        assert_eq!(place.display_category(), "garden");
    }

    #[test]
    fn test_type_wins_over_class() {
        assert_eq!(osm_category(Some("cinema"), Some("hotel")), "entertainment");
        assert_eq!(osm_category(None, Some("hotel")), "hotel");
        assert_eq!(osm_category(Some("unknown"), None), "other");
    }

    #[test]
    fn test_enriched_before_returning() {
        let mut rng = rand::thread_rng();
        let place = row("Some Temple, Bengaluru", Some("place_of_worship"), None)
            .into_place(&mut rng);
        assert_eq!(place.opening_time, Some(5));
        assert_eq!(place.closing_time, Some(21));
        assert!(!place.footfall.is_empty());
        assert_eq!(
            place.coordinates.map(|c| (c.lat, c.lng)),
            Some((12.9716, 77.5946))
        );
    }
}
