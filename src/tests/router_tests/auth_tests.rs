use std::sync::Arc;

use astra::Response;

use super::{body_string, get, header, post};
use crate::mailer::DisabledMailer;
use crate::router::{handle, LINK_REJECTED, MAIL_FAILURE};
use crate::tests::utils::{
    sign_in, test_state, test_state_with_mailer, RecordingMailer, StubGeocoder,
};

fn session_from(resp: &Response) -> String {
    let cookie = header(resp, "Set-Cookie").expect("session cookie");
    assert!(cookie.starts_with("session="));
    assert!(cookie.contains("HttpOnly"));
    cookie
        .trim_start_matches("session=")
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

#[test]
fn home_prompts_signed_out_visitors() {
    let state = test_state("home_out", Arc::new(StubGeocoder::new()));

    let resp = handle(get("/", None), &state).unwrap();

    assert_eq!(resp.status(), 200);
    let body = body_string(resp);
    assert!(body.contains("Dutch Markets"));
    assert!(body.contains(r#"href="/signin""#));
    assert!(!body.contains("Add a Market"));
}

#[test]
fn home_shows_cards_when_signed_in() {
    let state = test_state("home_in", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");

    let body = body_string(handle(get("/", Some(&token)), &state).unwrap());

    assert!(body.contains("Add a Market"));
    assert!(body.contains("Browse Markets"));
    assert!(body.contains("Anna"));
    assert!(body.contains("/default-avatar.png"));
}

#[test]
fn sign_in_emails_a_link_and_sets_no_cookie() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = test_state_with_mailer("sign_in_mail", Arc::new(StubGeocoder::new()), mailer.clone());

    let resp = handle(
        post(
            "/auth/sign-in",
            None,
            "display_name=Jan+Jansen&email=Jan%40Example.com",
        ),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Set-Cookie").is_none());
    assert!(body_string(resp).contains("jan@example.com"));

    let sent = mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "jan@example.com");
    assert!(sent[0].1.starts_with("http://markets.test/auth/magic?token="));
}

#[test]
fn emailed_link_signs_in_once() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = test_state_with_mailer("sign_in_link", Arc::new(StubGeocoder::new()), mailer.clone());

    handle(
        post("/auth/sign-in", None, "display_name=Jan+Jansen&email=jan%40example.com"),
        &state,
    )
    .unwrap();
    let link = mailer.last_link_path();

    let resp = handle(get(&link, None), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert_eq!(header(&resp, "Location"), Some("/markets"));
    let token = session_from(&resp);

    let body = body_string(handle(get("/", Some(&token)), &state).unwrap());
    assert!(body.contains("Jan Jansen"));

    let again = handle(get(&link, None), &state).unwrap();
    assert_eq!(again.status(), 401);
    assert!(header(&again, "Set-Cookie").is_none());
    assert!(body_string(again).contains(LINK_REJECTED));
}

#[test]
fn sign_in_with_a_known_email_does_not_hand_over_the_account() {
    let mailer = Arc::new(RecordingMailer::default());
    let state = test_state_with_mailer("sign_in_known", Arc::new(StubGeocoder::new()), mailer.clone());
    let (_, anna_token) = sign_in(&state, "Anna", "anna@example.com");

    let resp = handle(
        post(
            "/auth/sign-in",
            None,
            "display_name=Mallory&email=anna%40example.com&photo_url=https%3A%2F%2Fevil.example%2Fm.png",
        ),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 200);
    assert!(header(&resp, "Set-Cookie").is_none());
    // The link only goes to the mailbox owner.
    assert_eq!(mailer.sent()[0].0, "anna@example.com");

    let anonymous = body_string(handle(get("/", None), &state).unwrap());
    assert!(!anonymous.contains("Sign Out"));

    let anna = body_string(handle(get("/", Some(&anna_token)), &state).unwrap());
    assert!(anna.contains("Anna"));
    assert!(!anna.contains("Mallory"));
    assert!(!anna.contains("evil.example"));
}

#[test]
fn forged_or_missing_token_is_rejected() {
    let state = test_state("sign_in_forged", Arc::new(StubGeocoder::new()));

    for path in ["/auth/magic?token=made-up", "/auth/magic"] {
        let resp = handle(get(path, None), &state).unwrap();
        assert_eq!(resp.status(), 401);
        assert!(header(&resp, "Set-Cookie").is_none());
    }
}

#[test]
fn sign_in_without_mail_delivery_is_refused() {
    let state = test_state_with_mailer(
        "sign_in_no_mail",
        Arc::new(StubGeocoder::new()),
        Arc::new(DisabledMailer),
    );

    let resp = handle(
        post("/auth/sign-in", None, "display_name=Jan&email=jan%40example.com"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 500);
    assert!(header(&resp, "Set-Cookie").is_none());
    assert!(body_string(resp).contains(MAIL_FAILURE));
}

#[test]
fn sign_in_with_bad_email_shows_form_again() {
    let state = test_state("sign_in_bad", Arc::new(StubGeocoder::new()));

    let resp = handle(
        post("/auth/sign-in", None, "display_name=Jan&email=not-an-email"),
        &state,
    )
    .unwrap();

    assert_eq!(resp.status(), 400);
    assert!(header(&resp, "Set-Cookie").is_none());
    assert!(body_string(resp).contains("invalid email"));
}

#[test]
fn sign_out_revokes_session() {
    let state = test_state("sign_out", Arc::new(StubGeocoder::new()));
    let (_, token) = sign_in(&state, "Anna", "anna@example.com");

    let resp = handle(post("/auth/sign-out", Some(&token), ""), &state).unwrap();
    assert_eq!(resp.status(), 302);
    assert!(header(&resp, "Set-Cookie").unwrap().contains("Max-Age=0"));

    let body = body_string(handle(get("/", Some(&token)), &state).unwrap());
    assert!(!body.contains("Sign Out"));
}

#[test]
fn unknown_route_is_not_found() {
    let state = test_state("not_found", Arc::new(StubGeocoder::new()));
    let err = handle(get("/nope", None), &state).unwrap_err();
    assert_eq!(err.status(), 404);
}
