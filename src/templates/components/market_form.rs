// templates/components/market_form.rs
//
// Partials of the "Add Market" form. Each one carries a stable id so the
// htmx endpoints can swap it back in after an edit.

use std::collections::BTreeSet;

use maud::{html, Markup};

use crate::domain::{AddressFragment, Category, Coordinate, Weekday};
use crate::templates::components::map::{markers_json, MapMarker};

pub fn form_base(form_id: &str) -> String {
    format!("/markets/new/{form_id}")
}

pub fn day_buttons(form_id: &str, selected: &BTreeSet<Weekday>) -> Markup {
    let url = format!("{}/toggle-day", form_base(form_id));
    html! {
        div id="day-buttons" class="chips" {
            @for day in Weekday::ALL {
                button type="button"
                    class=(chip_class(selected.contains(&day)))
                    hx-post=(url)
                    hx-vals=(format!(r#"{{"day":"{}"}}"#, day.label()))
                    hx-params="day"
                    hx-target="#day-buttons"
                    hx-swap="outerHTML" {
                    (day.label())
                }
            }
        }
    }
}

pub fn category_buttons(form_id: &str, selected: &BTreeSet<Category>) -> Markup {
    let url = format!("{}/toggle-category", form_base(form_id));
    html! {
        div id="category-buttons" class="chips" {
            @for category in Category::ALL {
                button type="button"
                    class=(chip_class(selected.contains(&category)))
                    hx-post=(url)
                    hx-vals=(format!(r#"{{"category":"{}"}}"#, category.label()))
                    hx-params="category"
                    hx-target="#category-buttons"
                    hx-swap="outerHTML" {
                    (category.label())
                }
            }
        }
    }
}

fn chip_class(selected: bool) -> &'static str {
    if selected {
        "chip selected"
    } else {
        "chip"
    }
}

/// A text input that reports every change to the form's field endpoint.
fn live_input(form_id: &str, name: &str, label: &str, value: &str, placeholder: &str) -> Markup {
    html! {
        div class="field" {
            label for=(name) { (label) }
            input type="text" id=(name) name=(name) value=(value) placeholder=(placeholder) required
                hx-post=(format!("{}/field", form_base(form_id)))
                hx-trigger="input changed"
                hx-params=(name)
                hx-swap="none";
        }
    }
}

pub fn address_fields(form_id: &str, address: &AddressFragment) -> Markup {
    html! {
        div id="address-fields" {
            (live_input(form_id, "address", "Street Address", &address.street, "Street name and number"))
            (live_input(form_id, "postalCode", "Postal Code", &address.postal_code, "1234 AB"))
            (live_input(form_id, "city", "City", &address.city, "Amsterdam"))
        }
    }
}

/// Shows the chosen coordinate and polls for updates from the debounced
/// forward geocode.
pub fn location_panel(form_id: &str, coordinate: Option<Coordinate>, oob: bool) -> Markup {
    let markers: Vec<MapMarker> = coordinate
        .map(|position| MapMarker {
            position,
            title: "Selected location".to_string(),
        })
        .into_iter()
        .collect();

    html! {
        div id="location-panel"
            hx-get=(format!("{}/location", form_base(form_id)))
            hx-trigger="every 2s"
            hx-swap="outerHTML"
            hx-swap-oob=[oob.then_some("true")]
            data-markers=(markers_json(&markers)) {
            @match coordinate {
                Some(c) => p { "Selected location: " (format!("{:.6}, {:.6}", c.lat, c.lng)) },
                None => p { "No location selected yet. Click the map or enter an address." },
            }
        }
    }
}

pub fn error_banner(message: Option<&str>) -> Markup {
    html! {
        div id="form-error" {
            @if let Some(message) = message {
                div class="alert" role="alert" { (message) }
            }
        }
    }
}
