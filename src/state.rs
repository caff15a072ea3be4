use std::sync::Arc;

use crate::db::{Database, ListingStore};
use crate::form::FormRegistry;
use crate::mailer::Mailer;

/// Everything a request handler needs. Built once in `main` and shared by
/// reference with every worker.
pub struct AppState {
    pub db: Database,
    pub store: Arc<dyn ListingStore>,
    pub forms: FormRegistry,
    /// Also enables the map surface; `None` renders a placeholder.
    pub maps_api_key: Option<String>,
    pub mailer: Arc<dyn Mailer>,
    /// Prefixed to sign-in links, e.g. "https://markets.example.nl".
    pub public_base_url: String,
}
