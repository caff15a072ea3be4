// src/form/state.rs

use chrono::{DateTime, NaiveTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use thiserror::Error;

use crate::db::markets::ListingStore;
use crate::debounce::Debouncer;
use crate::domain::market::parse_clock_time;
use crate::domain::validation::validate;
use crate::domain::{
    AddressFragment, Category, Coordinate, DraftListing, FinalizedListing, ValidationError,
    Weekday,
};
use crate::geocode::GeocodingAdapter;

pub const GENERIC_SUBMIT_FAILURE: &str = "Error adding market. Please try again.";

/// Lifecycle of one "Add Market" form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Editing,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// One typed edit to a scalar field of the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum FormField {
    Name(String),
    Description(String),
    Street(String),
    PostalCode(String),
    City(String),
    OpeningTime(NaiveTime),
    ClosingTime(NaiveTime),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown form field: {0}")]
    Unknown(String),
    #[error("{field} must be a time like 09:00, got {value:?}")]
    BadTime { field: String, value: String },
}

impl FormField {
    /// Build a field from its HTML input name.
    pub fn parse(name: &str, value: &str) -> Result<Self, FieldError> {
        let time = |field: &str| {
            parse_clock_time(value).ok_or_else(|| FieldError::BadTime {
                field: field.to_string(),
                value: value.to_string(),
            })
        };

        match name {
            "name" => Ok(FormField::Name(value.to_string())),
            "description" => Ok(FormField::Description(value.to_string())),
            "address" => Ok(FormField::Street(value.to_string())),
            "postalCode" => Ok(FormField::PostalCode(value.to_string())),
            "city" => Ok(FormField::City(value.to_string())),
            "startTime" => time(name).map(FormField::OpeningTime),
            "endTime" => time(name).map(FormField::ClosingTime),
            other => Err(FieldError::Unknown(other.to_string())),
        }
    }

    fn touches_address(&self) -> bool {
        matches!(
            self,
            FormField::Street(_) | FormField::PostalCode(_) | FormField::City(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("A submission is already in progress")]
    Busy,
    #[error("This market has already been added")]
    AlreadySubmitted,
    #[error("{0}")]
    Invalid(#[from] ValidationError),
    #[error("{0}")]
    Store(String),
}

struct FormCore {
    draft: DraftListing,
    state: FormState,
    busy: bool,
    error: Option<String>,
}

impl FormCore {
    fn touch(&mut self) {
        if self.state == FormState::Failed {
            self.state = FormState::Editing;
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        return false;
    }
    *slot = value;
    true
}

fn lock(core: &Mutex<FormCore>) -> MutexGuard<'_, FormCore> {
    core.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Server-side state machine behind the "Add Market" form.
///
/// Editing → Validating → Submitting → Succeeded | Failed, and back to
/// Editing after a failure. Address edits schedule a debounced forward
/// geocode; map clicks reverse geocode immediately. Geocode results that
/// arrive after the form is dropped are discarded.
pub struct MarketForm {
    core: Arc<Mutex<FormCore>>,
    geocoder: GeocodingAdapter,
    debouncer: Debouncer,
}

impl MarketForm {
    pub fn new(geocoder: GeocodingAdapter, quiet_interval: Duration) -> Self {
        Self {
            core: Arc::new(Mutex::new(FormCore {
                draft: DraftListing::default(),
                state: FormState::Editing,
                busy: false,
                error: None,
            })),
            geocoder,
            debouncer: Debouncer::new(quiet_interval),
        }
    }

    pub fn draft(&self) -> DraftListing {
        lock(&self.core).draft.clone()
    }

    pub fn state(&self) -> FormState {
        lock(&self.core).state
    }

    pub fn is_busy(&self) -> bool {
        lock(&self.core).busy
    }

    /// The one message currently shown above the form, if any.
    pub fn error(&self) -> Option<String> {
        lock(&self.core).error.clone()
    }

    /// Unchanged values are ignored so they do not restart the quiet period.
    pub fn set_field(&self, field: FormField) {
        let address = {
            let mut core = lock(&self.core);
            let touches_address = field.touches_address();
            let draft = &mut core.draft;
            let changed = match field {
                FormField::Name(v) => replace_if_changed(&mut draft.name, v),
                FormField::Description(v) => replace_if_changed(&mut draft.description, v),
                FormField::Street(v) => replace_if_changed(&mut draft.address.street, v),
                FormField::PostalCode(v) => replace_if_changed(&mut draft.address.postal_code, v),
                FormField::City(v) => replace_if_changed(&mut draft.address.city, v),
                FormField::OpeningTime(t) => replace_if_changed(&mut draft.opening_time, t),
                FormField::ClosingTime(t) => replace_if_changed(&mut draft.closing_time, t),
            };
            if !changed {
                return;
            }
            let address = touches_address.then(|| draft.address.clone());
            core.touch();
            address
        };

        if let Some(address) = address {
            self.schedule_forward_geocode(address);
        }
    }

    pub fn toggle_day(&self, day: Weekday) -> bool {
        let mut core = lock(&self.core);
        core.touch();
        core.draft.toggle_day(day)
    }

    pub fn toggle_category(&self, category: Category) -> bool {
        let mut core = lock(&self.core);
        core.touch();
        core.draft.toggle_category(category)
    }

    /// The clicked point becomes the location, and a found address
    /// overwrites whatever was typed.
    pub fn set_coordinate_from_map_click(&self, coordinate: Coordinate) {
        {
            let mut core = lock(&self.core);
            core.touch();
            core.draft.coordinate = Some(coordinate);
        }

        match self.geocoder.reverse_geocode(coordinate) {
            Ok(Some(fragment)) => lock(&self.core).draft.address = fragment,
            Ok(None) => tracing::debug!(?coordinate, "reverse geocode found no address"),
            Err(e) => tracing::warn!(?coordinate, "reverse geocode failed: {e}"),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate(&lock(&self.core).draft)
    }

    /// Validate, finalize and hand the listing to the store.
    ///
    /// The store call runs without holding the form lock; the busy flag
    /// keeps a second submit from reaching the store meanwhile.
    pub fn submit(
        &self,
        user_id: &str,
        store: &dyn ListingStore,
        now: DateTime<Utc>,
    ) -> Result<(String, FinalizedListing), SubmitError> {
        let listing = {
            let mut core = lock(&self.core);
            if core.busy {
                return Err(SubmitError::Busy);
            }
            if core.state == FormState::Succeeded {
                return Err(SubmitError::AlreadySubmitted);
            }

            core.state = FormState::Validating;
            match FinalizedListing::finalize(&core.draft, user_id, now) {
                Ok(listing) => {
                    core.busy = true;
                    core.state = FormState::Submitting;
                    core.error = None;
                    listing
                }
                Err(e) => {
                    core.state = FormState::Editing;
                    core.error = Some(e.to_string());
                    return Err(SubmitError::Invalid(e));
                }
            }
        };

        let result = store.create(&listing);

        let mut core = lock(&self.core);
        core.busy = false;
        match result {
            Ok(id) => {
                core.state = FormState::Succeeded;
                self.debouncer.cancel();
                Ok((id, listing))
            }
            Err(e) => {
                tracing::warn!("adding market failed: {e}");
                let message = e.to_string();
                let message = if message.trim().is_empty() {
                    GENERIC_SUBMIT_FAILURE.to_string()
                } else {
                    message
                };
                core.state = FormState::Failed;
                core.error = Some(message.clone());
                Err(SubmitError::Store(message))
            }
        }
    }

    fn schedule_forward_geocode(&self, address: AddressFragment) {
        let core = Arc::downgrade(&self.core);
        let geocoder = self.geocoder.clone();

        self.debouncer.schedule(move || {
            if !address.is_complete() {
                return;
            }

            match geocoder.forward_geocode(&address.street, &address.postal_code, &address.city) {
                Ok(Some(coordinate)) => match core.upgrade() {
                    Some(core) => lock(&core).draft.coordinate = Some(coordinate),
                    None => tracing::debug!("form closed before geocode result arrived"),
                },
                Ok(None) => tracing::debug!(street = %address.street, "address not found"),
                Err(e) => tracing::warn!("forward geocode failed: {e}"),
            }
        });
    }
}
