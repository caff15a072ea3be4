use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use super::{body_string, get, header, htmx_post};
use crate::domain::Coordinate;
use crate::form::MAX_FORMS_PER_OWNER;
use crate::router::handle;
use crate::state::AppState;
use crate::tests::utils::{sign_in, test_state, StubGeocoder};

/// Open the form page and pull its id out of the submit URL.
fn open_form(state: &AppState, token: &str) -> String {
    let resp = handle(get("/markets/new", Some(token)), state).unwrap();
    assert_eq!(resp.status(), 200);
    let body = body_string(resp);

    let start = body.find("/markets/new/").expect("form url") + "/markets/new/".len();
    body[start..].split('/').next().unwrap().to_string()
}

#[test]
fn new_market_redirects_signed_out_users_home() {
    let state = test_state("form_anon", Arc::new(StubGeocoder::new()));

    let resp = handle(get("/markets/new", None), &state).unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), Some("/"));
    assert_eq!(state.forms.len(), 0);
}

#[test]
fn new_market_page_renders_empty_form() {
    let state = test_state("form_page", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");

    let body = body_string(handle(get("/markets/new", Some(&token)), &state).unwrap());

    assert!(body.contains("Add New Market"));
    assert!(body.contains("Operating Days"));
    assert!(body.contains("Fresh Produce"));
    assert!(body.contains(r#"value="09:00""#));
    assert!(body.contains(r#"value="17:00""#));
    assert!(body.contains("No location selected yet"));
    assert_eq!(state.forms.len(), 1);
}

#[test]
fn reloading_the_form_page_keeps_open_forms_capped() {
    let state = test_state("form_reload", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");

    let first = open_form(&state, &token);
    for _ in 0..MAX_FORMS_PER_OWNER + 4 {
        open_form(&state, &token);
    }
    assert_eq!(state.forms.len(), MAX_FORMS_PER_OWNER);

    let url = format!("/markets/new/{first}/toggle-day");
    let err = handle(htmx_post(&url, Some(&token), "day=Monday"), &state).unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn toggle_day_returns_updated_buttons() {
    let state = test_state("form_toggle", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");
    let form_id = open_form(&state, &token);
    let url = format!("/markets/new/{form_id}/toggle-day");

    let on = body_string(handle(htmx_post(&url, Some(&token), "day=Saturday"), &state).unwrap());
    assert_eq!(on.matches("chip selected").count(), 1);
    assert!(!on.contains("<html"));

    let off = body_string(handle(htmx_post(&url, Some(&token), "day=Saturday"), &state).unwrap());
    assert_eq!(off.matches("chip selected").count(), 0);
}

#[test]
fn unknown_day_is_bad_request() {
    let state = test_state("form_bad_day", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");
    let form_id = open_form(&state, &token);

    let err = handle(
        htmx_post(&format!("/markets/new/{form_id}/toggle-day"), Some(&token), "day=Funday"),
        &state,
    )
    .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[test]
fn another_users_form_is_not_found() {
    let state = test_state("form_other", Arc::new(StubGeocoder::new()));
    let (_, anna) = sign_in(&state, "Anna", "anna@example.com");
    let (_, piet) = sign_in(&state, "Piet", "piet@example.com");
    let form_id = open_form(&state, &anna);

    let err = handle(
        htmx_post(&format!("/markets/new/{form_id}/toggle-day"), Some(&piet), "day=Monday"),
        &state,
    )
    .unwrap_err();
    assert_eq!(err.status(), 404);
}

#[test]
fn typed_address_is_geocoded_after_quiet_period() {
    let geocoder = Arc::new(StubGeocoder::new());
    geocoder.forward_to(Coordinate::new(52.3731, 4.8926));
    let state = test_state("form_forward", geocoder.clone());
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");
    let form_id = open_form(&state, &token);
    let field_url = format!("/markets/new/{form_id}/field");

    for body in ["address=Dam+10", "postalCode=1012+JS", "city=Amsterdam"] {
        let resp = handle(htmx_post(&field_url, Some(&token), body), &state).unwrap();
        assert_eq!(resp.status(), 200);
    }
    sleep(Duration::from_millis(200));

    let panel = body_string(
        handle(get(&format!("/markets/new/{form_id}/location"), Some(&token)), &state).unwrap(),
    );
    assert!(panel.contains("52.373100, 4.892600"));
    assert_eq!(geocoder.address_queries().len(), 1);
}

#[test]
fn map_click_then_submit_adds_market() {
    let geocoder = Arc::new(StubGeocoder::new());
    geocoder.reverse_to(&[
        ("10", "street_number"),
        ("Dam", "route"),
        ("1012 JS", "postal_code"),
        ("Amsterdam", "locality"),
    ]);
    let state = test_state("form_submit", geocoder.clone());
    let (uid, token) = sign_in(&state, "Anna", "anna@example.com");
    let form_id = open_form(&state, &token);
    let base = format!("/markets/new/{form_id}");

    let clicked = body_string(
        handle(
            htmx_post(&format!("{base}/map-click"), Some(&token), "lat=52.3731&lng=4.8926"),
            &state,
        )
        .unwrap(),
    );
    assert!(clicked.contains(r#"value="Dam 10""#));
    assert!(clicked.contains(r#"value="1012 JS""#));
    assert!(clicked.contains(r#"hx-swap-oob="true""#));

    handle(htmx_post(&format!("{base}/toggle-day"), Some(&token), "day=Saturday"), &state).unwrap();
    handle(
        htmx_post(&format!("{base}/toggle-category"), Some(&token), "category=Fresh+Produce"),
        &state,
    )
    .unwrap();

    let resp = handle(
        htmx_post(
            &format!("{base}/submit"),
            Some(&token),
            "name=Dam+Markt&description=Saturday+market&address=Dam+10&postalCode=1012+JS\
             &city=Amsterdam&startTime=08%3A00&endTime=16%3A00",
        ),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(header(&resp, "HX-Redirect"), Some("/markets"));
    assert!(state.forms.get(&form_id, &uid).is_none());

    let markets = state.store.list().unwrap();
    assert_eq!(markets.len(), 1);
    let listing = &markets[0].listing;
    assert_eq!(listing.name(), "Dam Markt");
    assert_eq!(listing.created_by(), uid);
    assert_eq!(listing.location(), Coordinate::new(52.3731, 4.8926));
    assert!(!listing.verified());
    assert!(geocoder.address_queries().is_empty());
}

#[test]
fn submit_without_location_shows_one_message() {
    let state = test_state("form_invalid", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");
    let form_id = open_form(&state, &token);

    let resp = handle(
        htmx_post(
            &format!("/markets/new/{form_id}/submit"),
            Some(&token),
            "name=Markt&description=Market&postalCode=12",
        ),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "HX-Redirect").is_none());
    let body = body_string(resp);
    assert!(body.contains(r#"id="form-error""#));
    assert!(body.contains("Please select a location on the map"));
    assert!(!body.contains("postal code"));
    assert!(state.store.list().unwrap().is_empty());
}
