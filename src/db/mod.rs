pub mod connection;
pub mod markets;

pub use connection::{init_db, Database};
pub use markets::{ListingStore, SqliteListingStore, StoreError, StoredMarket};
