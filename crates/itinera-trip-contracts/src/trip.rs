//! The parsed trip specification.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for a [`TripSpec`].
#[derive(Debug, Error, PartialEq)]
pub enum TripSpecError {
    /// The end date precedes the start date.
    #[error("trip end date {end} precedes start date {start}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    /// The party size is zero.
    #[error("trip must have at least one traveler")]
    NoTravelers,

    /// Origin or destination is blank.
    #[error("missing {0}")]
    MissingPlace(&'static str),
}

/// A structured trip request, immutable once parsed from the user's text.
///
/// Produced by the parse stage; every later stage only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSpec {
    /// Departure city.
    pub origin: String,
    /// Arrival city.
    pub destination: String,
    /// First day of the trip.
    pub start_date: NaiveDate,
    /// Last day of the trip (inclusive).
    pub end_date: NaiveDate,
    /// Number of people traveling.
    pub travelers: u32,
    /// Total budget for the whole trip, if the user stated one.
    #[serde(default)]
    pub budget: Option<f64>,
    /// Per-person daily spending budget for food, activities, etc.
    #[serde(default)]
    pub daily_spending_budget: Option<f64>,
    /// Interest tags such as "art", "history", "food".
    #[serde(default)]
    pub interests: Vec<String>,
}

impl TripSpec {
    /// Trip length in days, inclusive of both endpoints.
    ///
    /// A trip from 2025-06-01 to 2025-06-05 is 5 days.
    pub fn days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Number of hotel nights (one less than the day count, floored at 1).
    pub fn nights(&self) -> i64 {
        (self.end_date - self.start_date).num_days().max(1)
    }

    /// Check the structural invariants the rest of the pipeline relies on.
    pub fn validate(&self) -> Result<(), TripSpecError> {
        if self.origin.trim().is_empty() {
            return Err(TripSpecError::MissingPlace("origin"));
        }
        if self.destination.trim().is_empty() {
            return Err(TripSpecError::MissingPlace("destination"));
        }
        if self.end_date < self.start_date {
            return Err(TripSpecError::InvalidDateRange {
                start: self.start_date,
                end: self.end_date,
            });
        }
        if self.travelers == 0 {
            return Err(TripSpecError::NoTravelers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn spec() -> TripSpec {
        TripSpec {
            origin: "Berlin".to_string(),
            destination: "Rome".to_string(),
            start_date: date("2025-06-01"),
            end_date: date("2025-06-05"),
            travelers: 2,
            budget: Some(1500.0),
            daily_spending_budget: Some(50.0),
            interests: vec!["art".to_string(), "food".to_string()],
        }
    }

    #[test]
    fn test_days_is_inclusive() {
        assert_eq!(spec().days(), 5);

        let mut single = spec();
        single.end_date = single.start_date;
        assert_eq!(single.days(), 1);
    }

    #[test]
    fn test_nights() {
        assert_eq!(spec().nights(), 4);
    }

    #[test]
    fn test_validate_accepts_well_formed_spec() {
        assert!(spec().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_reversed_dates() {
        let mut bad = spec();
        bad.end_date = date("2025-05-30");
        assert!(matches!(
            bad.validate(),
            Err(TripSpecError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_party() {
        let mut bad = spec();
        bad.travelers = 0;
        assert_eq!(bad.validate(), Err(TripSpecError::NoTravelers));
    }

    #[test]
    fn test_serde_round_trip() {
        let json = serde_json::to_string(&spec()).unwrap();
        assert!(json.contains("\"startDate\":\"2025-06-01\""));
        let back: TripSpec = serde_json::from_str(&json).unwrap();
        assert_eq!(back, spec());
    }
}
