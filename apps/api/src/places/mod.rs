//! Place autocomplete, scoped to a single country, returning formatted
//! address strings for the personal-details address field.

pub mod handlers;

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

const AUTOCOMPLETE_URL: &str = "https://maps.googleapis.com/maps/api/place/autocomplete/json";

#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Places API returned {status}: {message}")]
    Api { status: String, message: String },

    #[error("Place autocomplete is not configured")]
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlaceSuggestion {
    pub description: String,
    pub place_id: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    status: String,
    #[serde(default)]
    predictions: Vec<PlaceSuggestion>,
    error_message: Option<String>,
}

#[derive(Clone)]
pub struct PlacesClient {
    client: Client,
    api_key: String,
    country: String,
    endpoint: String,
}

impl PlacesClient {
    pub fn new(api_key: String, country: String, timeout: Duration) -> Result<Self, PlacesError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            country: country.to_lowercase(),
            endpoint: AUTOCOMPLETE_URL.to_string(),
        })
    }

    pub fn country(&self) -> &str {
        &self.country
    }

    pub async fn autocomplete(&self, input: &str) -> Result<Vec<PlaceSuggestion>, PlacesError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Vec::new());
        }

        let components = format!("country:{}", self.country);
        let response: AutocompleteResponse = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("input", input),
                ("key", self.api_key.as_str()),
                ("components", components.as_str()),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let suggestions = into_suggestions(response)?;
        debug!("Place autocomplete returned {} suggestions", suggestions.len());
        Ok(suggestions)
    }
}

fn into_suggestions(response: AutocompleteResponse) -> Result<Vec<PlaceSuggestion>, PlacesError> {
    match response.status.as_str() {
        "OK" => Ok(response.predictions),
        "ZERO_RESULTS" => Ok(Vec::new()),
        _ => {
            let message = response.error_message.unwrap_or_default();
            warn!("Places API status {}: {message}", response.status);
            Err(PlacesError::Api {
                status: response.status,
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> AutocompleteResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_ok_response_yields_descriptions() {
        let response = parse(json!({
            "status": "OK",
            "predictions": [
                {"description": "Koramangala, Bengaluru, Karnataka, India", "place_id": "p1", "types": ["sublocality"]}
            ]
        }));
        let suggestions = into_suggestions(response).unwrap();
        assert_eq!(suggestions[0].description, "Koramangala, Bengaluru, Karnataka, India");
    }

    #[test]
    fn test_zero_results_is_empty() {
        let response = parse(json!({"status": "ZERO_RESULTS", "predictions": []}));
        assert!(into_suggestions(response).unwrap().is_empty());
    }

    #[test]
    fn test_denied_request_is_an_error() {
        let response = parse(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }));
        assert!(matches!(
            into_suggestions(response),
            Err(PlacesError::Api { status, .. }) if status == "REQUEST_DENIED"
        ));
    }

    #[tokio::test]
    async fn test_blank_input_skips_the_request() {
        let client = PlacesClient::new("key".into(), "IN".into(), Duration::from_secs(1)).unwrap();
        assert_eq!(client.country(), "in");
        assert!(client.autocomplete("   ").await.unwrap().is_empty());
    }
}
