use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use crate::auth::{IdentityProvider, SignInRequest};
use crate::db::connection::{init_db, Database};
use crate::db::markets::{ListingStore, SqliteListingStore, StoreError, StoredMarket};
use crate::domain::{Coordinate, FinalizedListing};
use crate::form::{FormRegistry, DEFAULT_FORM_IDLE_TTL};
use crate::geocode::{
    AddressComponent, GeocodeError, GeocodeRequest, GeocodeResponse, GeocodeResult,
    GeocodingAdapter, GeocodingService, Geometry,
};
use crate::mailer::{Mailer, MailerError};
use crate::state::AppState;

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh SQLite file per call, with the production schema applied.
pub fn init_test_db(tag: &str) -> Database {
    let path = std::env::temp_dir().join(format!(
        "dutch_markets_{tag}_{}_{}.sqlite",
        std::process::id(),
        DB_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db, "sql/schema.sql")
        .unwrap_or_else(|e| panic!("Database initialization failed: {e}"));
    db
}

pub fn test_state(tag: &str, geocoder: Arc<StubGeocoder>) -> AppState {
    let db = init_test_db(tag);
    AppState {
        store: Arc::new(SqliteListingStore::new(db.clone())),
        db,
        forms: FormRegistry::new(
            GeocodingAdapter::new(geocoder),
            Duration::from_millis(30),
            DEFAULT_FORM_IDLE_TTL,
        ),
        maps_api_key: None,
        mailer: Arc::new(RecordingMailer::default()),
        public_base_url: "http://markets.test".to_string(),
    }
}

pub fn test_state_with_mailer(
    tag: &str,
    geocoder: Arc<StubGeocoder>,
    mailer: Arc<dyn Mailer>,
) -> AppState {
    AppState {
        mailer,
        ..test_state(tag, geocoder)
    }
}

/// Keeps every (recipient, link) it was asked to send.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Path and query of the most recent link, ready to GET.
    pub fn last_link_path(&self) -> String {
        let (_, link) = self.sent().pop().expect("a link was sent");
        link.strip_prefix("http://markets.test")
            .expect("link uses the public base url")
            .to_string()
    }
}

impl Mailer for RecordingMailer {
    fn send_sign_in_link(&self, recipient_email: &str, link: &str) -> Result<(), MailerError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient_email.to_string(), link.to_string()));
        Ok(())
    }
}

/// Sign a user in through an issued-and-redeemed link and return
/// (uid, session token).
pub fn sign_in(state: &AppState, name: &str, email: &str) -> (String, String) {
    let now = Utc::now().timestamp();
    let signed_in = state
        .db
        .with_conn(|conn| {
            let issued = IdentityProvider::request_link(
                conn,
                &SignInRequest {
                    display_name: name,
                    email,
                    photo_url: None,
                },
                now,
            )?;
            IdentityProvider::redeem(conn, &issued.token, now)
        })
        .expect("sign in");
    (signed_in.user.id, signed_in.session_token)
}

#[derive(Default)]
struct StubAnswers {
    forward: Option<Result<Coordinate, GeocodeError>>,
    reverse: Option<Result<Vec<AddressComponent>, GeocodeError>>,
    address_queries: Vec<String>,
}

/// Canned geocoding answers. Unconfigured lookups return zero results.
#[derive(Default)]
pub struct StubGeocoder {
    answers: Mutex<StubAnswers>,
}

impl StubGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn forward_to(&self, coordinate: Coordinate) {
        self.answers.lock().unwrap().forward = Some(Ok(coordinate));
    }

    pub fn fail_forward(&self) {
        self.answers.lock().unwrap().forward =
            Some(Err(GeocodeError::Network("connection refused".into())));
    }

    /// `(long_name, type)` pairs for the first reverse result.
    pub fn reverse_to(&self, components: &[(&str, &str)]) {
        let components = components
            .iter()
            .map(|(name, kind)| AddressComponent {
                long_name: name.to_string(),
                types: vec![kind.to_string()],
            })
            .collect();
        self.answers.lock().unwrap().reverse = Some(Ok(components));
    }

    pub fn fail_reverse(&self) {
        self.answers.lock().unwrap().reverse = Some(Err(GeocodeError::Service {
            status: "REQUEST_DENIED".into(),
            message: "bad key".into(),
        }));
    }

    pub fn address_queries(&self) -> Vec<String> {
        self.answers.lock().unwrap().address_queries.clone()
    }
}

impl GeocodingService for StubGeocoder {
    fn geocode(&self, request: &GeocodeRequest) -> Result<GeocodeResponse, GeocodeError> {
        let mut answers = self.answers.lock().unwrap();
        match request {
            GeocodeRequest::Address(query) => {
                answers.address_queries.push(query.clone());
                match answers.forward.clone() {
                    Some(Ok(location)) => Ok(GeocodeResponse::from_results(vec![GeocodeResult {
                        geometry: Geometry { location },
                        address_components: Vec::new(),
                    }])),
                    Some(Err(e)) => Err(e),
                    None => Ok(GeocodeResponse::from_results(Vec::new())),
                }
            }
            GeocodeRequest::Location(location) => match answers.reverse.clone() {
                Some(Ok(address_components)) => {
                    Ok(GeocodeResponse::from_results(vec![GeocodeResult {
                        geometry: Geometry {
                            location: *location,
                        },
                        address_components,
                    }]))
                }
                Some(Err(e)) => Err(e),
                None => Ok(GeocodeResponse::from_results(Vec::new())),
            },
        }
    }
}

#[derive(Default)]
struct MemoryInner {
    markets: Vec<StoredMarket>,
    fail_next: Option<String>,
    create_calls: usize,
    next_id: u64,
}

/// In-memory listing store, newest first, with one-shot failure injection.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The next `create` fails with this message.
    pub fn fail_next(&self, message: &str) {
        self.inner.lock().unwrap().fail_next = Some(message.to_string());
    }

    pub fn create_calls(&self) -> usize {
        self.inner.lock().unwrap().create_calls
    }

    pub fn list_all(&self) -> Vec<StoredMarket> {
        self.inner.lock().unwrap().markets.clone()
    }
}

impl ListingStore for MemoryStore {
    fn create(&self, listing: &FinalizedListing) -> Result<String, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.create_calls += 1;
        if let Some(message) = inner.fail_next.take() {
            return Err(StoreError::Database(message));
        }
        inner.next_id += 1;
        let id = format!("mem-{}", inner.next_id);
        inner.markets.insert(
            0,
            StoredMarket {
                id: id.clone(),
                listing: listing.clone(),
            },
        );
        Ok(id)
    }

    fn list(&self) -> Result<Vec<StoredMarket>, StoreError> {
        Ok(self.list_all())
    }

    fn get(&self, id: &str) -> Result<Option<StoredMarket>, StoreError> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .markets
            .iter()
            .find(|m| m.id == id)
            .cloned())
    }

    fn delete_by_id(&self, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.markets.len();
        inner.markets.retain(|m| m.id != id);
        if inner.markets.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
