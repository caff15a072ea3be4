use std::io::Read;
use std::str::FromStr;

use astra::Request;
use chrono::{DateTime, Utc};
use maud::html;
use url::form_urlencoded;

use crate::auth::sessions::{cleared_session_cookie, session_cookie, token_from_cookie_header};
use crate::auth::{IdentityProvider, SignInRequest, User};
use crate::db::markets::delete_owned;
use crate::domain::{Category, Coordinate, Weekday};
use crate::errors::ServerError;
use crate::form::{FieldError, FormField, MarketForm, SubmitError};
use crate::responses::{html_response, html_response_with_status, redirect, ResultResp};
use crate::state::AppState;
use crate::templates::components::{
    address_fields, category_buttons, day_buttons, error_banner, location_panel,
};
use crate::templates::pages::{
    check_email_page, home_page, markets_page, new_market_page, sign_in_page, MarketsVm,
    NewMarketVm,
};

const MAX_BODY_BYTES: u64 = 64 * 1024;

pub const DELETE_FAILURE: &str = "Error deleting market. Please try again.";
pub const LINK_REJECTED: &str = "This sign-in link is invalid or has expired.";
pub const MAIL_FAILURE: &str = "We could not send the sign-in email. Please try again later.";

type Form = Vec<(String, String)>;

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();
    let query = req.uri().query().unwrap_or_default().to_string();
    let htmx = req.headers().contains_key("HX-Request");
    let token = req
        .headers()
        .get("Cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(token_from_cookie_header)
        .map(str::to_string);

    let now = Utc::now();
    let user = match token.as_deref() {
        Some(token) => state
            .db
            .with_conn(|conn| IdentityProvider::current_user(conn, token, now.timestamp()))?,
        None => None,
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    tracing::debug!(%method, %path, signed_in = user.is_some(), "request");

    match (method.as_str(), segments.as_slice()) {
        ("GET", []) => html_response(home_page(user.as_ref())),
        ("GET", ["signin"]) => html_response(sign_in_page(None)),
        ("POST", ["auth", "sign-in"]) => request_sign_in_link(read_form(req)?, state, now),
        ("GET", ["auth", "magic"]) => redeem_sign_in_link(&query, state, now),
        ("POST", ["auth", "sign-out"]) => {
            if let Some(token) = token.as_deref() {
                state
                    .db
                    .with_conn(|conn| IdentityProvider::sign_out(conn, token, now.timestamp()))?;
            }
            redirect("/", htmx, Some(&cleared_session_cookie()))
        }

        ("GET", ["markets"]) => markets(state, user.as_ref(), None),
        ("POST", ["markets", id, "delete"]) => delete_market(state, &require_user(user)?, id, htmx),

        ("GET", ["markets", "new"]) => match user {
            Some(user) => new_market(state, &user),
            None => redirect("/", htmx, None),
        },
        ("GET", ["markets", "new", form_id, "location"]) => {
            let form = open_form(state, form_id, user.as_ref())?;
            html_response(location_panel(form_id, form.draft().coordinate, false))
        }
        ("POST", ["markets", "new", form_id, action]) => {
            let user = require_user(user)?;
            let form = open_form(state, form_id, Some(&user))?;
            let body = read_form(req)?;
            match *action {
                "field" => apply_fields(&form, &body),
                "toggle-day" => toggle_day(&form, form_id, &body),
                "toggle-category" => toggle_category(&form, form_id, &body),
                "map-click" => map_click(&form, form_id, &body),
                "submit" => submit(state, &form, form_id, &user, &body, now, htmx),
                _ => Err(ServerError::NotFound),
            }
        }

        _ => Err(ServerError::NotFound),
    }
}

fn read_form(req: Request) -> Result<Form, ServerError> {
    let mut buf = Vec::new();
    req.into_body()
        .reader()
        .take(MAX_BODY_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|e| ServerError::BadRequest(format!("could not read body: {e}")))?;

    if buf.len() as u64 > MAX_BODY_BYTES {
        return Err(ServerError::BadRequest("request body too large".into()));
    }

    Ok(form_urlencoded::parse(&buf).into_owned().collect())
}

fn form_value<'a>(form: &'a Form, key: &str) -> Option<&'a str> {
    form.iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn required<'a>(form: &'a Form, key: &str) -> Result<&'a str, ServerError> {
    form_value(form, key).ok_or_else(|| ServerError::BadRequest(format!("missing {key}")))
}

fn require_user(user: Option<User>) -> Result<User, ServerError> {
    user.ok_or_else(|| ServerError::Unauthorized("please sign in".into()))
}

fn open_form(
    state: &AppState,
    form_id: &str,
    user: Option<&User>,
) -> Result<std::sync::Arc<MarketForm>, ServerError> {
    let user = user.ok_or_else(|| ServerError::Unauthorized("please sign in".into()))?;
    state.forms.get(form_id, &user.id).ok_or(ServerError::NotFound)
}

fn request_sign_in_link(form: Form, state: &AppState, now: DateTime<Utc>) -> ResultResp {
    let request = SignInRequest {
        display_name: form_value(&form, "display_name").unwrap_or_default(),
        email: form_value(&form, "email").unwrap_or_default(),
        photo_url: form_value(&form, "photo_url"),
    };

    let issued = match state
        .db
        .with_conn(|conn| IdentityProvider::request_link(conn, &request, now.timestamp()))
    {
        Ok(issued) => issued,
        Err(ServerError::BadRequest(msg)) => {
            return html_response_with_status(400, sign_in_page(Some(&msg)))
        }
        Err(e) => return Err(e),
    };

    let link = format!("{}{}", state.public_base_url, issued.link);
    if let Err(e) = state.mailer.send_sign_in_link(&issued.email, &link) {
        tracing::error!("sign-in link not sent: {e}");
        return html_response_with_status(500, sign_in_page(Some(MAIL_FAILURE)));
    }

    html_response(check_email_page(&issued.email))
}

fn redeem_sign_in_link(query: &str, state: &AppState, now: DateTime<Utc>) -> ResultResp {
    let token = form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "token")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    match state
        .db
        .with_conn(|conn| IdentityProvider::redeem(conn, &token, now.timestamp()))
    {
        Ok(signed_in) => {
            tracing::info!(user_id = %signed_in.user.id, "signed in");
            redirect("/markets", false, Some(&session_cookie(&signed_in.session_token)))
        }
        Err(ServerError::BadRequest(_) | ServerError::Unauthorized(_)) => {
            html_response_with_status(401, sign_in_page(Some(LINK_REJECTED)))
        }
        Err(e) => Err(e),
    }
}

fn markets(state: &AppState, user: Option<&User>, alert: Option<&str>) -> ResultResp {
    let markets = state.store.list()?;
    let page = markets_page(&MarketsVm {
        user,
        markets: &markets,
        maps_api_key: state.maps_api_key.as_deref(),
        alert,
    });

    match alert {
        Some(_) => html_response_with_status(500, page),
        None => html_response(page),
    }
}

fn delete_market(state: &AppState, user: &User, id: &str, htmx: bool) -> ResultResp {
    match delete_owned(state.store.as_ref(), id, &user.id) {
        Ok(()) => redirect("/markets", htmx, None),
        Err(e @ ServerError::Forbidden(_)) => Err(e),
        Err(e) => {
            tracing::warn!(market_id = %id, "delete failed: {e}");
            markets(state, Some(user), Some(DELETE_FAILURE))
        }
    }
}

fn new_market(state: &AppState, user: &User) -> ResultResp {
    let (form_id, form) = state.forms.open(&user.id);
    let draft = form.draft();
    let error = form.error();

    html_response(new_market_page(&NewMarketVm {
        user,
        form_id: &form_id,
        draft: &draft,
        error: error.as_deref(),
        maps_api_key: state.maps_api_key.as_deref(),
    }))
}

fn apply_fields(form: &MarketForm, body: &Form) -> ResultResp {
    for (name, value) in body {
        let field = FormField::parse(name, value)
            .map_err(|e| ServerError::BadRequest(e.to_string()))?;
        form.set_field(field);
    }
    html_response(html! {})
}

fn toggle_day(form: &MarketForm, form_id: &str, body: &Form) -> ResultResp {
    let day = Weekday::from_str(required(body, "day")?).map_err(ServerError::BadRequest)?;
    form.toggle_day(day);
    html_response(day_buttons(form_id, &form.draft().operating_days))
}

fn toggle_category(form: &MarketForm, form_id: &str, body: &Form) -> ResultResp {
    let category =
        Category::from_str(required(body, "category")?).map_err(ServerError::BadRequest)?;
    form.toggle_category(category);
    html_response(category_buttons(form_id, &form.draft().categories))
}

fn parse_degrees(body: &Form, key: &str, limit: f64) -> Result<f64, ServerError> {
    required(body, key)?
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && v.abs() <= limit)
        .ok_or_else(|| ServerError::BadRequest(format!("invalid {key}")))
}

fn map_click(form: &MarketForm, form_id: &str, body: &Form) -> ResultResp {
    let coordinate = Coordinate::new(parse_degrees(body, "lat", 90.0)?, parse_degrees(body, "lng", 180.0)?);
    form.set_coordinate_from_map_click(coordinate);

    let draft = form.draft();
    html_response(html! {
        (address_fields(form_id, &draft.address))
        (location_panel(form_id, draft.coordinate, true))
    })
}

fn submit(
    state: &AppState,
    form: &MarketForm,
    form_id: &str,
    user: &User,
    body: &Form,
    now: DateTime<Utc>,
    htmx: bool,
) -> ResultResp {
    for (name, value) in body {
        match FormField::parse(name, value) {
            Ok(field) => form.set_field(field),
            Err(FieldError::Unknown(name)) => tracing::debug!(%name, "ignoring unknown field"),
            Err(e) => return html_response(error_banner(Some(&e.to_string()))),
        }
    }

    match form.submit(&user.id, state.store.as_ref(), now) {
        Ok((market_id, _)) => {
            tracing::info!(%market_id, user_id = %user.id, "market added");
            state.forms.close(form_id);
            redirect("/markets", htmx, None)
        }
        Err(SubmitError::AlreadySubmitted) => redirect("/markets", htmx, None),
        Err(e) => html_response(error_banner(Some(&e.to_string()))),
    }
}
