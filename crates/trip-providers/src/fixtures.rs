//! Deterministic in-memory providers for tests and offline demos.
//!
//! [`FixtureProviders`] answers every search from editable in-memory data,
//! seeded with a small Rome trip dataset. [`UnreachableProviders`] fails
//! every call, for exercising degradation paths.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;

use itinera_trip_contracts::{Event, FlightLeg, FlightOption, HotelOption};

use crate::error::ProviderError;
use crate::{EventSearch, FlightSearch, GeoPoint, Geocoder, HotelSearch, PoiSearch, TravelQuery};

/// All five providers over editable in-memory data.
///
/// Fields are public so a test can clear a list to simulate an empty search
/// or add entries to steer a selection.
pub struct FixtureProviders {
    pub flights: Vec<FlightOption>,
    pub hotels: Vec<HotelOption>,
    pub events: Vec<Event>,
    pub poi_text: String,
    /// Lowercased place name to coordinates.
    pub coordinates: HashMap<String, GeoPoint>,
}

impl FixtureProviders {
    /// A small Rome dataset: flights and hotels in ascending price order.
    pub fn rome() -> Self {
        Self {
            flights: rome_flights(),
            hotels: rome_hotels(),
            events: rome_events(),
            poi_text: ROME_POI_TEXT.to_string(),
            coordinates: rome_coordinates(),
        }
    }

    /// A dataset where every search comes back empty.
    pub fn empty() -> Self {
        Self {
            flights: Vec::new(),
            hotels: Vec::new(),
            events: Vec::new(),
            poi_text: String::new(),
            coordinates: HashMap::new(),
        }
    }
}

#[async_trait]
impl FlightSearch for FixtureProviders {
    async fn search_flights(
        &self,
        _query: &TravelQuery,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        Ok(self.flights.clone())
    }
}

#[async_trait]
impl HotelSearch for FixtureProviders {
    async fn search_hotels(&self, _query: &TravelQuery) -> Result<Vec<HotelOption>, ProviderError> {
        Ok(self.hotels.clone())
    }
}

#[async_trait]
impl EventSearch for FixtureProviders {
    async fn search_events(&self, query: &TravelQuery) -> Result<Vec<Event>, ProviderError> {
        Ok(self
            .events
            .iter()
            .filter(|event| event.date >= query.start_date && event.date <= query.end_date)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl PoiSearch for FixtureProviders {
    async fn search_poi_text(
        &self,
        _destination: &str,
        _interests: &[String],
    ) -> Result<String, ProviderError> {
        Ok(self.poi_text.clone())
    }
}

#[async_trait]
impl Geocoder for FixtureProviders {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        Ok(self.coordinates.get(&query.to_lowercase()).copied())
    }
}

/// Providers whose every call fails at the transport level.
pub struct UnreachableProviders;

fn unreachable_error() -> ProviderError {
    ProviderError::Api {
        status: 503,
        body: "service unavailable".to_string(),
    }
}

#[async_trait]
impl FlightSearch for UnreachableProviders {
    async fn search_flights(
        &self,
        _query: &TravelQuery,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl HotelSearch for UnreachableProviders {
    async fn search_hotels(
        &self,
        _query: &TravelQuery,
    ) -> Result<Vec<HotelOption>, ProviderError> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl EventSearch for UnreachableProviders {
    async fn search_events(&self, _query: &TravelQuery) -> Result<Vec<Event>, ProviderError> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl PoiSearch for UnreachableProviders {
    async fn search_poi_text(
        &self,
        _destination: &str,
        _interests: &[String],
    ) -> Result<String, ProviderError> {
        Err(unreachable_error())
    }
}

#[async_trait]
impl Geocoder for UnreachableProviders {
    async fn geocode(&self, _query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        Err(unreachable_error())
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}

fn leg(
    airline: &str,
    flight_number: &str,
    from: &str,
    to: &str,
    duration_minutes: u32,
    layover: Option<(&str, u32)>,
) -> FlightLeg {
    FlightLeg {
        departure_time: "08:45 AM".to_string(),
        arrival_time: "11:05 AM".to_string(),
        departure_airport: from.to_string(),
        arrival_airport: to.to_string(),
        duration_minutes,
        airline: airline.to_string(),
        flight_number: flight_number.to_string(),
        aircraft_type: Some("Airbus A320".to_string()),
        is_layover: layover.is_some(),
        layover_airport: layover.map(|(airport, _)| airport.to_string()),
        layover_duration_minutes: layover.map(|(_, minutes)| minutes),
    }
}

fn rome_flights() -> Vec<FlightOption> {
    let ber = "Berlin Brandenburg (BER)";
    let fco = "Rome Fiumicino (FCO)";
    let muc = "Munich (MUC)";
    vec![
        FlightOption::from_legs(
            298.0,
            leg("Lufthansa", "LH1721", ber, fco, 255, Some((muc, 75))),
            leg("Lufthansa", "LH1840", fco, ber, 240, Some((muc, 60))),
        ),
        FlightOption::from_legs(
            412.0,
            leg("ITA Airways", "AZ437", ber, fco, 140, None),
            leg("ITA Airways", "AZ436", fco, ber, 145, None),
        ),
        FlightOption::from_legs(
            505.0,
            leg("easyJet", "U24703", ber, fco, 135, None),
            leg("easyJet", "U24704", fco, ber, 140, None),
        ),
    ]
}

fn rome_hotels() -> Vec<HotelOption> {
    vec![
        HotelOption {
            name: "Hotel Milo Rome".to_string(),
            price_per_night: 160.0,
            total_price: 640.0,
            rating: 8.1,
            review_count: 1240,
            rating_word: "Very Good".to_string(),
            photo_url: None,
            static_map_url: None,
        },
        HotelOption {
            name: "Hotel Artemide".to_string(),
            price_per_night: 245.0,
            total_price: 980.0,
            rating: 9.2,
            review_count: 3105,
            rating_word: "Wonderful".to_string(),
            photo_url: None,
            static_map_url: None,
        },
        HotelOption {
            name: "Palazzo Manfredi".to_string(),
            price_per_night: 550.0,
            total_price: 2200.0,
            rating: 9.6,
            review_count: 870,
            rating_word: "Exceptional".to_string(),
            photo_url: None,
            static_map_url: None,
        },
    ]
}

fn rome_events() -> Vec<Event> {
    vec![
        Event {
            name: "Opera at Caracalla".to_string(),
            date: date(2026, 6, 11),
            venue: "Baths of Caracalla".to_string(),
            url: "https://example.org/events/opera-caracalla".to_string(),
        },
        Event {
            name: "AS Roma vs Lazio".to_string(),
            date: date(2026, 6, 13),
            venue: "Stadio Olimpico".to_string(),
            url: "https://example.org/events/derby".to_string(),
        },
    ]
}

const ROME_POI_TEXT: &str = "Rome rewards walkers. The Colosseum dominates the \
ancient center, and the nearby Roman Forum can fill a morning. The Vatican \
Museums hold the Sistine Chapel; book ahead. For an evening stroll, the \
Trastevere Neighborhood has the best trattorias, and the Trevi Fountain is \
liveliest after dark. This summer the International Organ Festival returns to \
various churches across the city.";

fn rome_coordinates() -> HashMap<String, GeoPoint> {
    let entries = [
        ("colosseum", 41.8902, 12.4922),
        ("roman forum", 41.8925, 12.4853),
        ("vatican museums", 41.9065, 12.4536),
        ("trastevere neighborhood", 41.8867, 12.4692),
        ("trevi fountain", 41.9009, 12.4833),
    ];
    entries
        .into_iter()
        .map(|(name, latitude, longitude)| {
            (
                name.to_string(),
                GeoPoint {
                    latitude,
                    longitude,
                },
            )
        })
        .collect()
}
