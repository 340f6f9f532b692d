use hyper::{Body, Request, Response, StatusCode};

use super::{authenticate, json_response, ApiContext, ApiError};

pub async fn health(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    let snapshot = ctx.health.collect().await?;

    Ok(json_response(StatusCode::OK, &snapshot))
}
