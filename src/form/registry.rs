// src/form/registry.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use crate::auth::token::new_id;
use crate::form::state::MarketForm;
use crate::geocode::GeocodingAdapter;

/// Forms idle longer than this are dropped.
pub const DEFAULT_FORM_IDLE_TTL: Duration = Duration::from_secs(30 * 60);
/// Open forms kept per user; opening another evicts their least recently used.
pub const MAX_FORMS_PER_OWNER: usize = 3;
/// Open forms kept in total.
pub const MAX_OPEN_FORMS: usize = 500;

struct OpenForm {
    owner: String,
    last_used: Instant,
    form: Arc<MarketForm>,
}

/// Open "Add Market" forms, keyed by a random form id.
///
/// Removing an entry drops the form, which discards its pending debounce
/// timer and any geocode result still in flight.
pub struct FormRegistry {
    forms: Mutex<HashMap<String, OpenForm>>,
    geocoder: GeocodingAdapter,
    quiet_interval: Duration,
    idle_ttl: Duration,
    per_owner: usize,
    max_total: usize,
}

impl FormRegistry {
    pub fn new(geocoder: GeocodingAdapter, quiet_interval: Duration, idle_ttl: Duration) -> Self {
        Self {
            forms: Mutex::new(HashMap::new()),
            geocoder,
            quiet_interval,
            idle_ttl,
            per_owner: MAX_FORMS_PER_OWNER,
            max_total: MAX_OPEN_FORMS,
        }
    }

    pub fn with_limits(mut self, per_owner: usize, max_total: usize) -> Self {
        self.per_owner = per_owner.max(1);
        self.max_total = max_total.max(1);
        self
    }

    fn forms(&self) -> MutexGuard<'_, HashMap<String, OpenForm>> {
        self.forms.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn open(&self, owner: &str) -> (String, Arc<MarketForm>) {
        self.sweep();

        let id = new_id();
        let form = Arc::new(MarketForm::new(self.geocoder.clone(), self.quiet_interval));

        let mut forms = self.forms();
        while forms.values().filter(|entry| entry.owner == owner).count() >= self.per_owner {
            if !evict_least_recent(&mut forms, Some(owner)) {
                break;
            }
        }
        while forms.len() >= self.max_total {
            if !evict_least_recent(&mut forms, None) {
                break;
            }
        }
        forms.insert(
            id.clone(),
            OpenForm {
                owner: owner.to_string(),
                last_used: Instant::now(),
                form: form.clone(),
            },
        );
        drop(forms);

        tracing::debug!(form_id = %id, owner, "market form opened");
        (id, form)
    }

    /// Only the user who opened the form gets it back. A hit counts as use
    /// and restarts the idle clock; an expired form is dropped instead.
    pub fn get(&self, id: &str, owner: &str) -> Option<Arc<MarketForm>> {
        let idle_ttl = self.idle_ttl;
        let mut forms = self.forms();
        let entry = forms.get_mut(id).filter(|entry| entry.owner == owner)?;

        if entry.last_used.elapsed() >= idle_ttl {
            forms.remove(id);
            return None;
        }
        entry.last_used = Instant::now();
        Some(entry.form.clone())
    }

    pub fn close(&self, id: &str) -> bool {
        self.forms().remove(id).is_some()
    }

    /// Drop forms idle past the TTL. Returns how many were dropped.
    pub fn sweep(&self) -> usize {
        let idle_ttl = self.idle_ttl;
        let mut forms = self.forms();
        let before = forms.len();
        forms.retain(|_, entry| entry.last_used.elapsed() < idle_ttl);
        let dropped = before - forms.len();
        if dropped > 0 {
            tracing::debug!(dropped, "idle market forms swept");
        }
        dropped
    }

    pub fn len(&self) -> usize {
        self.forms().len()
    }
}

/// Remove the least recently used form, optionally only among `owner`'s.
fn evict_least_recent(forms: &mut HashMap<String, OpenForm>, owner: Option<&str>) -> bool {
    let oldest = forms
        .iter()
        .filter(|(_, entry)| owner.map_or(true, |o| entry.owner == o))
        .min_by_key(|(_, entry)| entry.last_used)
        .map(|(id, _)| id.clone());

    match oldest {
        Some(id) => {
            forms.remove(&id);
            tracing::debug!(form_id = %id, "market form evicted");
            true
        }
        None => false,
    }
}
