use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};
use maud::Markup;

pub fn html_response(markup: Markup) -> ResultResp {
    html_response_with_status(200, markup)
}

pub fn html_response_with_status(status: u16, markup: Markup) -> ResultResp {
    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(markup.into_string()))
        .map_err(|e| {
            tracing::error!("building html response failed: {e}");
            ServerError::InternalError
        })
}

/// Redirect to `location`, optionally setting a cookie.
///
/// htmx requests get a 200 with `HX-Redirect` since htmx does not follow
/// a 302 as a page navigation.
pub fn redirect(location: &str, htmx: bool, set_cookie: Option<&str>) -> ResultResp {
    let mut builder = if htmx {
        ResponseBuilder::new()
            .status(200)
            .header("HX-Redirect", location)
    } else {
        ResponseBuilder::new().status(302).header("Location", location)
    };

    if let Some(cookie) = set_cookie {
        builder = builder.header("Set-Cookie", cookie);
    }

    builder.body(Body::empty()).map_err(|e| {
        tracing::error!("building redirect failed: {e}");
        ServerError::InternalError
    })
}
