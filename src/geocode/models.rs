use serde::Deserialize;

use crate::domain::Coordinate;

// response
//  ├── status
//  ├── error_message
//  └── results[]
//       ├── geometry
//       │    └── location
//       │         ├── lat
//       │         └── lng
//       └── address_components[]
//            ├── long_name
//            └── types[]

/// What gets sent to the geocoding service: an address to resolve, or a
/// location to describe.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeRequest {
    Address(String),
    Location(Coordinate),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeocodeResponse {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub geometry: Geometry,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Coordinate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

impl AddressComponent {
    pub fn has_type(&self, kind: &str) -> bool {
        self.types.iter().any(|t| t == kind)
    }
}

impl GeocodeResponse {
    pub fn from_results(results: Vec<GeocodeResult>) -> Self {
        Self {
            status: Some(if results.is_empty() { "ZERO_RESULTS" } else { "OK" }.to_string()),
            error_message: None,
            results,
        }
    }
}
