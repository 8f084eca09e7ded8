use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::warn;

pub const FIELD_UNAVAILABLE: &str = "unavailable";
pub const HOURS_UNAVAILABLE: &str = "Hours unavailable";

/// Display record assembled from the reviews table at read time. Never
/// written back; every field is derived from the rows keyed by `name`.
#[derive(Clone, Serialize, Deserialize, Debug)]
pub struct Restaurant {
    pub name: String,
    pub address: String,
    pub coordinates: Location,
    pub stars: Option<f64>,
    pub number_of_reviews: i64,
    pub top_reviews: Vec<String>,
    pub hours: Option<HashMap<String, String>>,
    pub average_nearby_rating: f64,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Location {
    pub longitude: f64,
    pub latitude: f64,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            longitude: 0.0,
            latitude: 0.0,
        }
    }
}

impl Restaurant {
    /// Open hours for the current weekday by system clock.
    pub fn hours_today(&self) -> String {
        let today = OffsetDateTime::now_utc().weekday().to_string();
        self.hours_for_day(&today)
    }

    pub fn hours_for_day(&self, day: &str) -> String {
        match &self.hours {
            Some(hours) => hours
                .get(day)
                .cloned()
                .unwrap_or_else(|| HOURS_UNAVAILABLE.to_string()),
            None => HOURS_UNAVAILABLE.to_string(),
        }
    }

    pub fn stars_display(&self) -> String {
        match self.stars {
            Some(stars) => stars.to_string(),
            None => FIELD_UNAVAILABLE.to_string(),
        }
    }
}

/// Parses the stored hours column, a Python-dict-style serialization like
/// `{'Monday': '9:0-22:0', ...}`. Single quotes are normalized to double
/// quotes before the JSON parse, which is good enough for the dataset's
/// day/time strings.
pub fn parse_hours(name: &str, raw: &str) -> Option<HashMap<String, String>> {
    let parsed = serde_json::from_str(raw)
        .or_else(|_| serde_json::from_str(&raw.replace('\'', "\"")));

    match parsed {
        Ok(hours) => Some(hours),
        Err(e) => {
            warn!("Failed to parse stored hours for {} due to: {}", name, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn restaurant_with_hours(hours: Option<HashMap<String, String>>) -> Restaurant {
        Restaurant {
            name: "Popular Pizza".to_string(),
            address: "123 Hurontario St".to_string(),
            coordinates: Location::default(),
            stars: Some(4.5),
            number_of_reviews: 12,
            top_reviews: vec![],
            hours,
            average_nearby_rating: 0.0,
        }
    }

    #[test]
    fn test_parse_hours_python_style() {
        let raw = "{'Monday': '11:0-22:0', 'Tuesday': '11:0-22:0'}";
        let hours = parse_hours("Popular Pizza", raw).unwrap();
        assert_eq!(hours.get("Monday").unwrap(), "11:0-22:0");
        assert_eq!(hours.len(), 2);
    }

    #[test]
    fn test_parse_hours_json_style() {
        let raw = "{\"Sunday\": \"10:0-21:0\"}";
        let hours = parse_hours("Popular Pizza", raw).unwrap();
        assert_eq!(hours.get("Sunday").unwrap(), "10:0-21:0");
    }

    #[test]
    fn test_parse_hours_malformed_is_none() {
        assert!(parse_hours("Popular Pizza", "not an hours mapping").is_none());
        assert!(parse_hours("Popular Pizza", "").is_none());
    }

    #[test]
    fn test_hours_for_missing_day() {
        let mut hours = HashMap::new();
        hours.insert("Monday".to_string(), "11:0-22:0".to_string());
        let restaurant = restaurant_with_hours(Some(hours));
        assert_eq!(restaurant.hours_for_day("Monday"), "11:0-22:0");
        assert_eq!(restaurant.hours_for_day("Saturday"), HOURS_UNAVAILABLE);
    }

    #[test]
    fn test_hours_absent_mapping() {
        let restaurant = restaurant_with_hours(None);
        assert_eq!(restaurant.hours_for_day("Monday"), HOURS_UNAVAILABLE);
        assert_eq!(restaurant.hours_today(), HOURS_UNAVAILABLE);
    }

    #[test]
    fn test_stars_display() {
        let mut restaurant = restaurant_with_hours(None);
        assert_eq!(restaurant.stars_display(), "4.5");
        restaurant.stars = None;
        assert_eq!(restaurant.stars_display(), FIELD_UNAVAILABLE);
    }
}
