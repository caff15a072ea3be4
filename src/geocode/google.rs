use reqwest::blocking::Client;
use std::time::Duration;

use crate::geocode::adapter::GeocodingService;
use crate::geocode::{GeocodeError, GeocodeRequest, GeocodeResponse};

const GEOCODE_ENDPOINT: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Google Geocoding HTTP API.
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GoogleGeocoder {
    pub fn new(api_key: String, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            endpoint: GEOCODE_ENDPOINT.to_string(),
        })
    }

    fn query_params(&self, request: &GeocodeRequest) -> Vec<(&'static str, String)> {
        let mut params = match request {
            GeocodeRequest::Address(address) => vec![("address", address.clone())],
            GeocodeRequest::Location(c) => vec![("latlng", format!("{},{}", c.lat, c.lng))],
        };
        params.push(("region", "nl".to_string()));
        params.push(("key", self.api_key.clone()));
        params
    }
}

impl GeocodingService for GoogleGeocoder {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, GeocodeError> {
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&self.query_params(request))
            .send()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(GeocodeError::Network(format!("HTTP {status}: {text}")));
        }

        decode_response(&text)
    }
}

/// Parse a Geocoding API body. `OK` and `ZERO_RESULTS` are both successes;
/// every other status is reported as a service error.
pub(crate) fn decode_response(body: &str) -> Result<GeocodeResponse, GeocodeError> {
    let response: GeocodeResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Decode(e.to_string()))?;

    match response.status.as_deref() {
        None | Some("OK") | Some("ZERO_RESULTS") => Ok(response),
        Some(other) => Err(GeocodeError::Service {
            status: other.to_string(),
            message: response.error_message.clone().unwrap_or_default(),
        }),
    }
}

/// Stand-in used when no API key is configured.
pub struct DisabledGeocoder;

impl GeocodingService for DisabledGeocoder {
    fn geocode(&self, _request: &GeocodeRequest) -> Result<GeocodeResponse, GeocodeError> {
        Err(GeocodeError::Disabled)
    }
}
