use hyper::{Body, Request, Response, StatusCode};

use super::{authenticate, json_response, required_param, ApiContext, ApiError};

pub async fn summary(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    let start = required_param(req, "start")?;
    let end = required_param(req, "end")?;

    match ctx.queries.get_summary(&start, &end).await? {
        Some(summary) => Ok(json_response(StatusCode::OK, &summary)),
        None => Err(ApiError::NotFound(format!(
            "No readings between {} and {}",
            start, end
        ))),
    }
}
