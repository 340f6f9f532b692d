use hyper::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use hyper::{Body, Method, Request, Response, StatusCode};
use log::{debug, warn};
use std::convert::Infallible;
use std::sync::Arc;

use crate::api::error_response;
use crate::auth::{self, AuthError};
use crate::config::Settings;

const DASHBOARD_TEMPLATE: &str = include_str!("../static/dashboard.html");
const DASHBOARD_JS: &str = include_str!("../static/dashboard.js");

const BASIC_REALM: &str = "Basic realm=\"dashboard\"";

/// The dashboard page is rendered once at startup; it only depends on configuration.
pub struct WebContext {
    username: String,
    password: String,
    page: String,
}

impl WebContext {
    pub fn new(settings: &Settings) -> Self {
        WebContext {
            username: settings.web_username.clone(),
            password: settings.web_password.clone(),
            page: render_dashboard(settings),
        }
    }
}

/// Fills the template placeholders. Every value lands in an html attribute
/// and is escaped for it.
pub fn render_dashboard(settings: &Settings) -> String {
    DASHBOARD_TEMPLATE
        .replace("{{API_TOKEN}}", &escape_html(&settings.api_token))
        .replace("{{API_URL}}", &escape_html(&settings.api_url))
        .replace("{{API_PORT}}", &settings.api_port.to_string())
        .replace("{{CAM_URL}}", &escape_html(&settings.cam_url))
}

fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    escaped
}

pub async fn req_handler(
    req: Request<Body>,
    ctx: Arc<WebContext>,
) -> Result<Response<Body>, Infallible> {
    let response = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => match authenticate(&req, &ctx) {
            Ok(()) => asset(&ctx.page, "text/html; charset=utf-8"),
            Err(err) => unauthorized(err),
        },
        (&Method::GET, "/static/dashboard.js") => match authenticate(&req, &ctx) {
            Ok(()) => asset(DASHBOARD_JS, "application/javascript; charset=utf-8"),
            Err(err) => unauthorized(err),
        },
        (_, _) => error_response(
            StatusCode::NOT_FOUND,
            "The requested resource was not found.",
        ),
    };

    debug!(
        "{} {} -> {}",
        req.method(),
        req.uri().path(),
        response.status().as_u16()
    );

    Ok(response)
}

fn authenticate(req: &Request<Body>, ctx: &WebContext) -> Result<(), AuthError> {
    let auth_header = match req.headers().get(AUTHORIZATION) {
        Some(h) => Some(h.to_str().map_err(|_| AuthError::Malformed)?),
        None => None,
    };

    auth::basic::validate_basic(auth_header, &ctx.username, &ctx.password)
}

fn asset(content: &str, content_type: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(content.to_owned()));
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn unauthorized(err: AuthError) -> Response<Body> {
    if err != AuthError::Missing {
        warn!("dashboard login rejected: {}", err);
    }

    let mut response = error_response(StatusCode::UNAUTHORIZED, "Unauthorized");
    response
        .headers_mut()
        .insert(WWW_AUTHENTICATE, HeaderValue::from_static(BASIC_REALM));
    response
}
