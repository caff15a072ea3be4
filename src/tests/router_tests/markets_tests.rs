use std::sync::Arc;

use chrono::Utc;

use super::{body_string, get, header, post};
use crate::domain::{Category, Coordinate, DraftListing, FinalizedListing, Weekday};
use crate::router::{handle, DELETE_FAILURE};
use crate::state::AppState;
use crate::tests::utils::{sign_in, test_state, StubGeocoder};

fn add_market(state: &AppState, name: &str, owner: &str) -> String {
    let mut draft = DraftListing {
        name: name.into(),
        description: "Weekly market".into(),
        coordinate: Some(Coordinate::new(52.0907, 5.1214)),
        ..DraftListing::default()
    };
    draft.address.street = "Vredenburg 1".into();
    draft.address.postal_code = "3511 BA".into();
    draft.address.city = "Utrecht".into();
    draft.toggle_day(Weekday::Wednesday);
    draft.toggle_category(Category::Flowers);

    let listing = FinalizedListing::finalize(&draft, owner, Utc::now()).unwrap();
    state.store.create(&listing).unwrap()
}

#[test]
fn markets_page_lists_markets_for_visitors() {
    let state = test_state("list_visitor", Arc::new(StubGeocoder::new()));
    add_market(&state, "Vredenburgmarkt", "uid-x");

    let resp = handle(get("/markets", None), &state).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Vredenburgmarkt"));
    assert!(body.contains("Wednesday"));
    assert!(!body.contains("Add New Market"));
    assert!(!body.contains("Delete Market"));
}

#[test]
fn creator_sees_delete_and_add_buttons() {
    let state = test_state("list_owner", Arc::new(StubGeocoder::new()));
    let (uid, token) = sign_in(&state, "Anna", "anna@example.com");
    add_market(&state, "Vredenburgmarkt", &uid);

    let body = body_string(handle(get("/markets", Some(&token)), &state).unwrap());

    assert!(body.contains("Add New Market"));
    assert!(body.contains("Delete Market"));
    assert!(body.contains("Are you sure you want to delete this market?"));
}

#[test]
fn owner_can_delete_market() {
    let state = test_state("delete_owner", Arc::new(StubGeocoder::new()));
    let (uid, token) = sign_in(&state, "Anna", "anna@example.com");
    let id = add_market(&state, "Vredenburgmarkt", &uid);

    let resp = handle(post(&format!("/markets/{id}/delete"), Some(&token), ""), &state).unwrap();

    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), Some("/markets"));
    assert!(state.store.get(&id).unwrap().is_none());
}

#[test]
fn non_owner_cannot_delete_market() {
    let state = test_state("delete_other", Arc::new(StubGeocoder::new()));
    let id = add_market(&state, "Vredenburgmarkt", "uid-owner");
    let (_, token) = sign_in(&state, "Piet", "piet@example.com");

    let err = handle(post(&format!("/markets/{id}/delete"), Some(&token), ""), &state).unwrap_err();

    assert_eq!(err.status(), 403);
    assert!(state.store.get(&id).unwrap().is_some());
}

#[test]
fn signed_out_delete_is_unauthorized() {
    let state = test_state("delete_anon", Arc::new(StubGeocoder::new()));
    let id = add_market(&state, "Vredenburgmarkt", "uid-owner");

    let err = handle(post(&format!("/markets/{id}/delete"), None, ""), &state).unwrap_err();

    assert_eq!(err.status(), 401);
    assert!(state.store.get(&id).unwrap().is_some());
}

#[test]
fn failed_delete_shows_alert_and_keeps_list() {
    let state = test_state("delete_fail", Arc::new(StubGeocoder::new()));
    let (uid, token) = sign_in(&state, "Anna", "anna@example.com");
    add_market(&state, "Vredenburgmarkt", &uid);

    let resp = handle(post("/markets/missing-id/delete", Some(&token), ""), &state).unwrap();

    assert_eq!(resp.status(), 500);
    let body = body_string(resp);
    assert!(body.contains(DELETE_FAILURE));
    assert!(body.contains("Vredenburgmarkt"));
}
