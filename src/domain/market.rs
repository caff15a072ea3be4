// src/domain/market.rs

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::domain::validation::{validate, ValidationError};

/// Latitude/longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Street (name + number), postal code and city.
///
/// Serialized with the listing document's field names, so it can be
/// flattened straight into a stored market.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressFragment {
    #[serde(rename = "address")]
    pub street: String,
    pub postal_code: String,
    pub city: String,
}

impl AddressFragment {
    /// Every part filled in. Whitespace counts as filled; the geocoder
    /// decides what it makes of it.
    pub fn is_complete(&self) -> bool {
        !self.street.is_empty() && !self.postal_code.is_empty() && !self.city.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Weekday {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|day| day.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown weekday: {s}"))
    }
}

/// Fixed vocabulary of market categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Fresh Produce")]
    FreshProduce,
    #[serde(rename = "Street Food")]
    StreetFood,
    Flowers,
    Clothing,
    Antiques,
    Crafts,
    Fish,
    Cheese,
    Other,
}

impl Category {
    pub const ALL: [Category; 9] = [
        Category::FreshProduce,
        Category::StreetFood,
        Category::Flowers,
        Category::Clothing,
        Category::Antiques,
        Category::Crafts,
        Category::Fish,
        Category::Cheese,
        Category::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::FreshProduce => "Fresh Produce",
            Category::StreetFood => "Street Food",
            Category::Flowers => "Flowers",
            Category::Clothing => "Clothing",
            Category::Antiques => "Antiques",
            Category::Crafts => "Crafts",
            Category::Fish => "Fish",
            Category::Cheese => "Cheese",
            Category::Other => "Other",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown category: {s}"))
    }
}

pub fn default_opening_time() -> NaiveTime {
    NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default()
}

pub fn default_closing_time() -> NaiveTime {
    NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default()
}

/// Parse an `HH:MM` clock time as sent by `<input type="time">`.
pub fn parse_clock_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .ok()
}

/// `HH:MM` on the wire.
mod clock_time {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_clock_time(&raw).ok_or_else(|| D::Error::custom(format!("bad time: {raw}")))
    }
}

/// The in-progress listing being edited on the "Add Market" form.
#[derive(Debug, Clone, PartialEq)]
pub struct DraftListing {
    pub name: String,
    pub description: String,
    pub address: AddressFragment,
    pub operating_days: BTreeSet<Weekday>,
    pub opening_time: NaiveTime,
    pub closing_time: NaiveTime,
    pub categories: BTreeSet<Category>,
    pub coordinate: Option<Coordinate>,
}

impl Default for DraftListing {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            address: AddressFragment::default(),
            operating_days: BTreeSet::new(),
            opening_time: default_opening_time(),
            closing_time: default_closing_time(),
            categories: BTreeSet::new(),
            coordinate: None,
        }
    }
}

impl DraftListing {
    /// Returns whether the day is selected after the toggle.
    pub fn toggle_day(&mut self, day: Weekday) -> bool {
        toggle(&mut self.operating_days, day)
    }

    /// Returns whether the category is selected after the toggle.
    pub fn toggle_category(&mut self, category: Category) -> bool {
        toggle(&mut self.categories, category)
    }
}

fn toggle<T: Ord>(set: &mut BTreeSet<T>, value: T) -> bool {
    if set.remove(&value) {
        false
    } else {
        set.insert(value);
        true
    }
}

/// A validated listing, ready to be handed to the store.
///
/// Fields are private: the only way in is [`FinalizedListing::finalize`].
/// Deserialized documents are re-validated by the store before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizedListing {
    name: String,
    description: String,
    #[serde(flatten)]
    address: AddressFragment,
    operating_days: BTreeSet<Weekday>,
    #[serde(rename = "startTime", with = "clock_time")]
    opening_time: NaiveTime,
    #[serde(rename = "endTime", with = "clock_time")]
    closing_time: NaiveTime,
    categories: BTreeSet<Category>,
    location: Coordinate,
    created_by: String,
    created_at: DateTime<Utc>,
    verified: bool,
}

impl FinalizedListing {
    pub fn finalize(
        draft: &DraftListing,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        validate(draft)?;
        let location = draft.coordinate.ok_or(ValidationError::MissingLocation)?;

        Ok(Self {
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            address: draft.address.clone(),
            operating_days: draft.operating_days.clone(),
            opening_time: draft.opening_time,
            closing_time: draft.closing_time,
            categories: draft.categories.clone(),
            location,
            created_by: created_by.to_string(),
            created_at: now,
            verified: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn address(&self) -> &AddressFragment {
        &self.address
    }

    pub fn operating_days(&self) -> &BTreeSet<Weekday> {
        &self.operating_days
    }

    pub fn opening_time(&self) -> NaiveTime {
        self.opening_time
    }

    pub fn closing_time(&self) -> NaiveTime {
        self.closing_time
    }

    pub fn categories(&self) -> &BTreeSet<Category> {
        &self.categories
    }

    pub fn location(&self) -> Coordinate {
        self.location
    }

    pub fn created_by(&self) -> &str {
        &self.created_by
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn verified(&self) -> bool {
        self.verified
    }

    /// The listing as an editable draft, for re-running validation.
    pub fn to_draft(&self) -> DraftListing {
        DraftListing {
            name: self.name.clone(),
            description: self.description.clone(),
            address: self.address.clone(),
            operating_days: self.operating_days.clone(),
            opening_time: self.opening_time,
            closing_time: self.closing_time,
            categories: self.categories.clone(),
            coordinate: Some(self.location),
        }
    }
}
