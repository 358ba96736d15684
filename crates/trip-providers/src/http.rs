//! HTTP adapter over the companion travel-data services.
//!
//! Every service speaks the same convention: POST a camelCase JSON body to
//! its search route and get a JSON payload back. Non-success statuses are
//! surfaced with the response body to keep provider failures diagnosable.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use itinera_trip_contracts::{Event, FlightOption, HotelOption};

use crate::error::ProviderError;
use crate::{EventSearch, FlightSearch, GeoPoint, Geocoder, HotelSearch, PoiSearch, TravelQuery};

/// Base URLs of the five companion services.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub flight_url: String,
    pub hotel_url: String,
    pub event_url: String,
    pub activity_url: String,
    pub geocode_url: String,
}

/// One gateway over all companion services, sharing a single HTTP client.
#[derive(Clone)]
pub struct HttpProviderGateway {
    client: reqwest::Client,
    endpoints: ProviderEndpoints,
}

impl HttpProviderGateway {
    pub fn new(endpoints: ProviderEndpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoints,
        }
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T, ProviderError>
    where
        B: Serialize,
        T: for<'de> Deserialize<'de>,
    {
        let response = self.client.post(url).json(body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PoiSearchBody<'a> {
    destination: &'a str,
    interests: &'a [String],
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PoiSearchResponse {
    results: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeBody<'a> {
    query: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeocodeResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
}

#[async_trait]
impl FlightSearch for HttpProviderGateway {
    async fn search_flights(
        &self,
        query: &TravelQuery,
    ) -> Result<Vec<FlightOption>, ProviderError> {
        let url = format!("{}/search", self.endpoints.flight_url);
        log::debug!("searching flights via {url}");
        self.post_json(&url, query).await
    }
}

#[async_trait]
impl HotelSearch for HttpProviderGateway {
    async fn search_hotels(&self, query: &TravelQuery) -> Result<Vec<HotelOption>, ProviderError> {
        let url = format!("{}/search", self.endpoints.hotel_url);
        log::debug!("searching hotels via {url}");
        self.post_json(&url, query).await
    }
}

#[async_trait]
impl EventSearch for HttpProviderGateway {
    async fn search_events(&self, query: &TravelQuery) -> Result<Vec<Event>, ProviderError> {
        let url = format!("{}/search_events", self.endpoints.event_url);
        log::debug!("searching events via {url}");
        self.post_json(&url, query).await
    }
}

#[async_trait]
impl PoiSearch for HttpProviderGateway {
    async fn search_poi_text(
        &self,
        destination: &str,
        interests: &[String],
    ) -> Result<String, ProviderError> {
        let url = format!("{}/search_activities", self.endpoints.activity_url);
        log::debug!("searching activities via {url}");
        let body = PoiSearchBody {
            destination,
            interests,
        };
        let response: PoiSearchResponse = self.post_json(&url, &body).await?;
        Ok(response.results)
    }
}

#[async_trait]
impl Geocoder for HttpProviderGateway {
    async fn geocode(&self, query: &str) -> Result<Option<GeoPoint>, ProviderError> {
        let url = format!("{}/geocode", self.endpoints.geocode_url);
        let response: GeocodeResponse = self.post_json(&url, &GeocodeBody { query }).await?;
        Ok(match (response.latitude, response.longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint {
                latitude,
                longitude,
            }),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocode_response_requires_both_components() {
        let hit: GeocodeResponse =
            serde_json::from_str(r#"{"latitude":41.9,"longitude":12.49}"#).unwrap();
        assert_eq!(hit.latitude, Some(41.9));

        let miss: GeocodeResponse =
            serde_json::from_str(r#"{"latitude":null,"longitude":null}"#).unwrap();
        assert!(miss.latitude.is_none());
    }

    #[test]
    fn test_poi_body_serializes_camel_case() {
        let interests = vec!["history".to_string(), "food".to_string()];
        let body = PoiSearchBody {
            destination: "Rome",
            interests: &interests,
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(
            json,
            r#"{"destination":"Rome","interests":["history","food"]}"#
        );
    }
}
