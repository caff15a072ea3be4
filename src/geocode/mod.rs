mod adapter;
mod geocode_error;
mod google;
mod models;

pub use adapter::{GeocodingAdapter, GeocodingService};
pub use geocode_error::GeocodeError;
pub use google::{DisabledGeocoder, GoogleGeocoder};
pub use models::{AddressComponent, GeocodeRequest, GeocodeResponse, GeocodeResult, Geometry};
