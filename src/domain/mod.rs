pub mod market;
pub mod postal_code;
pub mod validation;

pub use market::{
    AddressFragment, Category, Coordinate, DraftListing, FinalizedListing, Weekday,
};
pub use validation::ValidationError;
