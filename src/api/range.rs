use hyper::{Body, Request, Response, StatusCode};

use super::{authenticate, json_response, required_param, ApiContext, ApiError};

pub async fn range(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    let start = required_param(req, "start")?;
    let end = required_param(req, "end")?;

    let readings = ctx.queries.get_range(&start, &end).await?;

    Ok(json_response(StatusCode::OK, &readings))
}
