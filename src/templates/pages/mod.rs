pub mod check_email;
pub mod home;
pub mod markets;
pub mod new_market;
pub mod sign_in;

pub use check_email::check_email_page;
pub use home::home_page;
pub use markets::{markets_page, MarketsVm};
pub use new_market::{new_market_page, NewMarketVm};
pub use sign_in::sign_in_page;
