use crate::config::AppConfig;
use crate::db::{init_db, Database, SqliteListingStore};
use crate::form::{FormRegistry, DEFAULT_FORM_IDLE_TTL};
use crate::geocode::{DisabledGeocoder, GeocodingAdapter, GeocodingService, GoogleGeocoder};
use crate::mailer::{BrevoMailer, DisabledMailer, LogMailer, Mailer};
use crate::router::handle;
use crate::state::AppState;
use astra::Server;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod db;
mod debounce;
mod domain;
mod errors;
mod form;
mod geocode;
mod mailer;
mod responses;
mod router;
mod state;
mod templates;


fn geocoding_service(config: &AppConfig) -> Arc<dyn GeocodingService> {
    let Some(key) = config.google_maps_api_key.clone() else {
        tracing::warn!("GOOGLE_MAPS_API_KEY not set; geocoding and the map are disabled");
        return Arc::new(DisabledGeocoder);
    };

    match GoogleGeocoder::new(key, config.geocode_timeout) {
        Ok(google) => Arc::new(google),
        Err(e) => {
            tracing::error!("geocoding client could not be built, continuing without it: {e}");
            Arc::new(DisabledGeocoder)
        }
    }
}

fn sign_in_mailer(config: &AppConfig) -> Arc<dyn Mailer> {
    if let Some(key) = config.brevo_api_key.clone() {
        match BrevoMailer::new(
            key,
            config.mail_sender_email.clone(),
            config.mail_sender_name.clone(),
            config.geocode_timeout,
        ) {
            Ok(brevo) => return Arc::new(brevo),
            Err(e) => tracing::error!("mail client could not be built: {e}"),
        }
    }

    if config.log_sign_in_links {
        tracing::warn!("LOG_SIGN_IN_LINKS is on: sign-in links go to the log, not by email");
        Arc::new(LogMailer)
    } else {
        tracing::warn!("no mail delivery configured; sign-in is unavailable");
        Arc::new(DisabledMailer)
    }
}

fn main() {
    // .env is optional
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dutch_markets=info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("configuration error: {e}");
            std::process::exit(1);
        }
    };
    tracing::info!(?config, "configuration loaded");

    let db = Database::new(config.database_path.clone());
    if let Err(e) = init_db(&db, &config.schema_path) {
        tracing::error!("database initialization failed: {e}");
        std::process::exit(1);
    }

    let geocoder = GeocodingAdapter::new(geocoding_service(&config));
    let state = AppState {
        store: Arc::new(SqliteListingStore::new(db.clone())),
        db,
        forms: FormRegistry::new(geocoder, config.geocode_debounce, DEFAULT_FORM_IDLE_TTL),
        maps_api_key: config.google_maps_api_key.clone(),
        mailer: sign_in_mailer(&config),
        public_base_url: config.public_base_url.clone(),
    };

    tracing::info!("starting server at http://{}", config.bind_addr);

    let server = Server::bind(&config.bind_addr).max_workers(config.max_workers);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => responses::html_error_response(err),
    });

    if let Err(e) = result {
        tracing::error!("server ended with error: {e}");
    }

    tracing::info!("server shut down");
}
