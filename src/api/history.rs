use hyper::{Body, Request, Response, StatusCode};

use crate::query::DEFAULT_HISTORY_LIMIT;

use super::{authenticate, json_response, query_param, ApiContext, ApiError};

/// Larger requests are served this many rows.
pub const MAX_HISTORY_LIMIT: u32 = 1000;

pub async fn history(req: &Request<()>, ctx: &ApiContext) -> Result<Response<Body>, ApiError> {
    authenticate(req, ctx)?;

    let limit = parse_limit(query_param(req, "limit").as_deref())?;

    let readings = ctx.queries.get_history(limit).await?;

    Ok(json_response(StatusCode::OK, &readings))
}

fn parse_limit(raw: Option<&str>) -> Result<u32, ApiError> {
    let raw = match raw {
        Some(raw) => raw.trim(),
        None => return Ok(DEFAULT_HISTORY_LIMIT),
    };

    match raw.parse::<u64>() {
        Ok(0) | Err(_) => Err(ApiError::Validation(format!(
            "limit must be a positive integer, got {:?}",
            raw
        ))),
        Ok(n) => Ok(n.min(u64::from(MAX_HISTORY_LIMIT)) as u32),
    }
}
