use super::ApiError;

pub fn _404() -> ApiError {
    ApiError::NotFound("The requested resource was not found.".to_owned())
}
