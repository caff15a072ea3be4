pub mod error;
pub mod map;
pub mod market_card;
pub mod market_form;

pub use error::error_page;
pub use map::{map_surface, MapMarker};
pub use market_card::market_card;
pub use market_form::{address_fields, category_buttons, day_buttons, error_banner, location_panel};
