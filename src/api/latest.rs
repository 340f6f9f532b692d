use hyper::{Body, Request, Response, StatusCode};

use super::{authenticate, json_response, ApiContext, ApiError};

pub async fn latest(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    match ctx.queries.get_latest().await? {
        Some(reading) => Ok(json_response(StatusCode::OK, &reading)),
        None => Err(ApiError::NotFound("No data found".to_owned())),
    }
}
