use astra::{Body, Request, Response};
use http::Method;
use std::io::Read;

mod auth_tests;
mod market_form_tests;
mod markets_tests;

fn request(method: Method, path: &str, session: Option<&str>, body: &str) -> Request {
    let mut builder = http::Request::builder()
        .method(method)
        .uri(path)
        .header("Content-Type", "application/x-www-form-urlencoded");
    if let Some(token) = session {
        builder = builder.header("Cookie", format!("theme=dark; session={token}"));
    }
    builder.body(Body::from(body.as_bytes().to_vec())).unwrap()
}

pub fn get(path: &str, session: Option<&str>) -> Request {
    request(Method::GET, path, session, "")
}

pub fn post(path: &str, session: Option<&str>, body: &str) -> Request {
    request(Method::POST, path, session, body)
}

pub fn htmx_post(path: &str, session: Option<&str>, body: &str) -> Request {
    let mut req = post(path, session, body);
    req.headers_mut()
        .insert("HX-Request", http::HeaderValue::from_static("true"));
    req
}

pub fn body_string(resp: Response) -> String {
    let mut body = String::new();
    resp.into_body().reader().read_to_string(&mut body).unwrap();
    body
}

pub fn header<'a>(resp: &'a Response, name: &str) -> Option<&'a str> {
    resp.headers().get(name).and_then(|v| v.to_str().ok())
}
