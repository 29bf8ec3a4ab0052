//! Error-to-response mapping for the HTTP surface.
//!
//! Service errors travel through warp as custom rejections and are rendered
//! as JSON `{"message": ...}` bodies. The message wordings for validation,
//! uniqueness and not-found failures are part of the API contract.

use std::convert::Infallible;

use serde::Serialize;
use tracing::error;
use warp::http::StatusCode;
use warp::Rejection;
use warp::Reply;

use crate::Error;

/// Wrapper carrying a service [`Error`] through warp's rejection machinery.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl warp::reject::Reject for ApiError {}

pub(crate) fn reject(err: Error) -> Rejection {
    warp::reject::custom(ApiError(err))
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Renders any rejection as a JSON error response.
pub async fn handle_rejection(err: Rejection) -> std::result::Result<impl Reply, Infallible> {
    let (status, message) = if err.is_not_found() {
        (StatusCode::NOT_FOUND, "Resource not found".to_string())
    } else if let Some(ApiError(e)) = err.find::<ApiError>() {
        match e {
            Error::Validation(_) | Error::DuplicateIsbn => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            Error::BookNotFound => (StatusCode::NOT_FOUND, e.to_string()),
            other => {
                error!("request failed: {}", other);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    } else if err
        .find::<warp::filters::body::BodyDeserializeError>()
        .is_some()
    {
        (StatusCode::BAD_REQUEST, "Invalid request body".to_string())
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        (StatusCode::BAD_REQUEST, "Invalid query string".to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            "Method not allowed".to_string(),
        )
    } else {
        error!("unhandled rejection: {:?}", err);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal server error".to_string(),
        )
    };

    Ok(warp::reply::with_status(
        warp::reply::json(&ErrorBody { message }),
        status,
    ))
}
