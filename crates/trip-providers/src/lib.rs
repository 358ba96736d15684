//! Provider contracts for external travel data.
//!
//! Each trait covers one companion data service: round-trip flights, hotels,
//! dated events, free-text activity search, and forward geocoding. The
//! planning stages depend only on these traits; [`HttpProviderGateway`] is
//! the production adapter over the companion HTTP services, and [`fixtures`]
//! holds deterministic in-memory providers for tests.

mod error;
pub mod fixtures;
mod http;

pub use error::ProviderError;
pub use http::{HttpProviderGateway, ProviderEndpoints};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use itinera_trip_contracts::{Event, FlightOption, HotelOption, TripSpec};

/// The common query shape for date-bounded searches at a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelQuery {
    pub origin: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: u32,
}

impl TravelQuery {
    pub fn from_spec(spec: &TripSpec) -> Self {
        Self {
            origin: spec.origin.clone(),
            destination: spec.destination.clone(),
            start_date: spec.start_date,
            end_date: spec.end_date,
            travelers: spec.travelers,
        }
    }
}

/// A resolved coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Round-trip flight search.
///
/// Implementations return candidates ordered by ascending total price; the
/// refinement loop relies on that ordering to find "the next cheaper option".
#[async_trait]
pub trait FlightSearch: Send + Sync {
    async fn search_flights(&self, query: &TravelQuery)
        -> Result<Vec<FlightOption>, ProviderError>;
}

/// Hotel search for the whole stay, ordered by ascending total price.
#[async_trait]
pub trait HotelSearch: Send + Sync {
    async fn search_hotels(&self, query: &TravelQuery) -> Result<Vec<HotelOption>, ProviderError>;
}

/// Dated events (concerts, exhibitions, matches) during the stay.
#[async_trait]
pub trait EventSearch: Send + Sync {
    async fn search_events(&self, query: &TravelQuery) -> Result<Vec<Event>, ProviderError>;
}

/// Free-text web search for things to do at the destination.
///
/// Returns an unstructured text blob; the extraction oracle turns it into
/// concrete places.
#[async_trait]
pub trait PoiSearch: Send + Sync {
    async fn search_poi_text(
        &self,
        destination: &str,
        interests: &[String],
    ) -> Result<String, ProviderError>;
}

/// Forward geocoding of a place name to coordinates.
///
/// `Ok(None)` means the service answered but knows no such place; that is an
/// expected outcome, not an error.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_query_from_spec() {
        let spec = TripSpec {
            origin: "Berlin".to_string(),
            destination: "Rome".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 6, 10).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 6, 14).unwrap(),
            travelers: 2,
            budget: Some(2500.0),
            daily_spending_budget: Some(80.0),
            interests: vec!["history".to_string()],
        };
        let query = TravelQuery::from_spec(&spec);
        assert_eq!(query.destination, "Rome");
        assert_eq!(query.travelers, 2);

        let json = serde_json::to_string(&query).unwrap();
        assert!(json.contains("\"startDate\":\"2026-06-10\""));
    }
}
