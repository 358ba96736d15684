//! Environment-based configuration for the server binary.

use std::env;

use planning_stages::MAX_REFINEMENTS;

/// Everything the server needs, read from `ITINERA_*` variables with
/// localhost defaults matching the companion services' dev ports.
#[derive(Debug, Clone)]
pub struct ItineraConfig {
    pub bind_addr: String,
    pub flight_url: String,
    pub hotel_url: String,
    pub event_url: String,
    pub activity_url: String,
    pub geocode_url: String,
    pub llm_base_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub max_refinements: u32,
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

impl ItineraConfig {
    pub fn from_env() -> Self {
        let max_refinements = env::var("ITINERA_MAX_REFINEMENTS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(MAX_REFINEMENTS);

        Self {
            bind_addr: var_or("ITINERA_BIND_ADDR", "127.0.0.1:8080"),
            flight_url: var_or("ITINERA_FLIGHT_URL", "http://127.0.0.1:8001"),
            hotel_url: var_or("ITINERA_HOTEL_URL", "http://127.0.0.1:8002"),
            event_url: var_or("ITINERA_EVENT_URL", "http://127.0.0.1:8003"),
            activity_url: var_or("ITINERA_ACTIVITY_URL", "http://127.0.0.1:8004"),
            geocode_url: var_or("ITINERA_GEOCODE_URL", "http://127.0.0.1:8005"),
            llm_base_url: var_or("ITINERA_LLM_BASE_URL", "https://api.groq.com/openai/v1"),
            llm_api_key: var_or("ITINERA_LLM_API_KEY", ""),
            llm_model: var_or("ITINERA_LLM_MODEL", "llama-3.3-70b-versatile"),
            max_refinements,
        }
    }
}
