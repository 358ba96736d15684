//! Candidate options returned by the external providers.
//!
//! Providers return these value objects ordered by ascending desirability
//! proxy (price for flights and hotels), so "the next option" during a
//! refinement round is always the next index in the original list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One leg of a round trip (outbound or return).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightLeg {
    /// Departure time, e.g. "08:45 AM".
    pub departure_time: String,
    /// Arrival time at the final airport of this leg.
    pub arrival_time: String,
    /// Full name and IATA code of the departure airport.
    pub departure_airport: String,
    /// Full name and IATA code of the arrival airport.
    pub arrival_airport: String,
    /// Door-to-door duration of this leg in minutes, layover included.
    pub duration_minutes: u32,
    /// Operating airline.
    pub airline: String,
    /// Flight number, e.g. "AZ437".
    pub flight_number: String,
    /// Aircraft type when the provider reports one.
    #[serde(default)]
    pub aircraft_type: Option<String>,
    /// True when this leg includes a stopover.
    #[serde(default)]
    pub is_layover: bool,
    /// Airport of the stopover, when present.
    #[serde(default)]
    pub layover_airport: Option<String>,
    /// Duration of the stopover in minutes, when present.
    #[serde(default)]
    pub layover_duration_minutes: Option<u32>,
}

/// A round-trip flight candidate priced for the whole party.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightOption {
    /// Total price for all travelers, both legs.
    pub price: f64,
    pub outbound: FlightLeg,
    pub inbound: FlightLeg,
    /// Sum of both leg durations in minutes.
    pub total_duration_minutes: u32,
}

impl FlightOption {
    /// Build an option from two legs, deriving the total duration.
    pub fn from_legs(price: f64, outbound: FlightLeg, inbound: FlightLeg) -> Self {
        let total_duration_minutes = outbound.duration_minutes + inbound.duration_minutes;
        Self {
            price,
            outbound,
            inbound,
            total_duration_minutes,
        }
    }
}

/// A hotel candidate priced for the whole stay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOption {
    pub name: String,
    /// Nightly rate.
    pub price_per_night: f64,
    /// Total for the entire stay and party.
    pub total_price: f64,
    /// Review score out of 10.
    pub rating: f64,
    pub review_count: u32,
    /// The score described as a word, e.g. "Exceptional".
    pub rating_word: String,
    #[serde(default)]
    pub photo_url: Option<String>,
    #[serde(default)]
    pub static_map_url: Option<String>,
}

/// A dated event (concert, exhibition, match) at the destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub name: String,
    /// The fixed date the event takes place on.
    pub date: NaiveDate,
    pub venue: String,
    /// Link to the event page for details and tickets.
    pub url: String,
}

/// A concrete, physical place extracted from unstructured search results.
///
/// Coordinates stay `None` until the geocoding stage resolves them; an
/// ungeocoded place is still schedulable, it just cannot be mapped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointOfInterest {
    pub name: String,
    pub description: String,
    /// Free-text location, typically the destination city.
    pub location: String,
    /// Suggested time of day, e.g. "Morning", "Afternoon", "Evening".
    pub time_of_day: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl PointOfInterest {
    /// The resolved coordinate pair, when geocoding succeeded.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
