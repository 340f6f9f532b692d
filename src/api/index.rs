use hyper::{Body, Request, Response, StatusCode};
use serde::Serialize;

use super::{authenticate, json_response, ApiContext, ApiError};

#[derive(Serialize)]
struct ApiInfo<'a> {
    title: &'a str,
    version: &'a str,
    routes: &'a [&'a str],
}

pub fn index(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    let info = ApiInfo {
        title: &ctx.api_title,
        version: env!("CARGO_PKG_VERSION"),
        routes: super::ROUTES,
    };

    Ok(json_response(StatusCode::OK, &info))
}
