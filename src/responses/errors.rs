use crate::errors::ServerError;
use crate::templates::error_page;
use astra::{Body, Response, ResponseBuilder};

pub type ResultResp = Result<Response, ServerError>;

/// Render a ServerError as an HTML page with the matching status.
pub fn html_error_response(err: ServerError) -> Response {
    let status = err.status();
    if status >= 500 {
        tracing::error!(status, "request failed: {err}");
    } else {
        tracing::debug!(status, "request rejected: {err}");
    }

    let message = match &err {
        // Keep driver details out of the page.
        ServerError::DbError(_) | ServerError::InternalError => {
            "Something went wrong. Please try again.".to_string()
        }
        other => other.to_string(),
    };
    let page = error_page(status, &message).into_string();

    ResponseBuilder::new()
        .status(status)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::from(page.clone()))
        .unwrap_or_else(|_| {
            let mut resp = Response::new(Body::from(page));
            if let Ok(code) = 500u16.try_into() {
                *resp.status_mut() = code;
            }
            resp
        })
}
