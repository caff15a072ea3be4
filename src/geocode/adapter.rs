use std::sync::Arc;

use crate::domain::{AddressFragment, Coordinate};
use crate::geocode::{GeocodeError, GeocodeRequest, GeocodeResponse};

/// Anything that answers geocoding requests in the Google response shape.
/// Other providers get wrapped to match it.
pub trait GeocodingService: Send + Sync {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, GeocodeError>;
}

/// Address <-> coordinate lookups for the market form.
///
/// `Ok(None)` means the service answered but found nothing; `Err` means the
/// lookup itself failed.
#[derive(Clone)]
pub struct GeocodingAdapter {
    service: Arc<dyn GeocodingService>,
}

impl GeocodingAdapter {
    pub fn new(service: Arc<dyn GeocodingService>) -> Self {
        Self { service }
    }

    pub fn forward_query(address: &str, postal_code: &str, city: &str) -> String {
        format!("{address}, {postal_code}, {city}, Netherlands")
    }

    pub fn forward_geocode(
        &self,
        address: &str,
        postal_code: &str,
        city: &str,
    ) -> Result<Option<Coordinate>, GeocodeError> {
        let query = Self::forward_query(address, postal_code, city);
        let response = self.service.geocode(&GeocodeRequest::Address(query))?;

        Ok(response.results.first().map(|r| r.geometry.location))
    }

    pub fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<AddressFragment>, GeocodeError> {
        let response = self.service.geocode(&GeocodeRequest::Location(coordinate))?;
        let Some(first) = response.results.first() else {
            return Ok(None);
        };

        let mut street_number = "";
        let mut route = "";
        let mut postal_code = "";
        let mut city = "";

        for component in &first.address_components {
            if component.has_type("street_number") {
                street_number = &component.long_name;
            }
            if component.has_type("route") {
                route = &component.long_name;
            }
            if component.has_type("postal_code") {
                postal_code = &component.long_name;
            }
            if component.has_type("locality") {
                city = &component.long_name;
            }
        }

        Ok(Some(AddressFragment {
            street: format!("{route} {street_number}").trim().to_string(),
            postal_code: postal_code.to_string(),
            city: city.to_string(),
        }))
    }
}
