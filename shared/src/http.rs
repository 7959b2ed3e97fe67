//! HTTP helpers for Lambda functions.

use lambda_http::{Body, Response};
use serde::Serialize;

/// Error body shape returned to clients. Messages are generic on purpose;
/// detail stays in the server-side logs.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Create a JSON response with a wildcard CORS origin.
pub fn json_response<T: Serialize>(
    status: u16,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response_for_origin(status, "*", data)
}

/// Create a JSON response pinned to a specific CORS origin.
pub fn json_response_for_origin<T: Serialize>(
    status: u16,
    origin: &str,
    data: &T,
) -> Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", origin)
        .body(Body::from(serde_json::to_string(data)?))
        .expect("Failed to build response"))
}

/// Create an error response `{"error": message}` with a wildcard origin.
pub fn error_response(
    status: u16,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response(
        status,
        &ErrorBody {
            error: message.into(),
        },
    )
}

/// Create an error response pinned to a specific CORS origin.
pub fn error_response_for_origin(
    status: u16,
    origin: &str,
    message: impl Into<String>,
) -> Result<Response<Body>, lambda_http::Error> {
    json_response_for_origin(
        status,
        origin,
        &ErrorBody {
            error: message.into(),
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let response = error_response(400, "Missing prompt").unwrap();
        assert_eq!(response.status(), 400);
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        let body = std::str::from_utf8(response.body().as_ref()).unwrap();
        assert_eq!(body, r#"{"error":"Missing prompt"}"#);
    }

    #[test]
    fn test_pinned_origin() {
        let response =
            error_response_for_origin(500, "https://devopsia.co", "Portal session creation failed")
                .unwrap();
        assert_eq!(
            response.headers().get("Access-Control-Allow-Origin").unwrap(),
            "https://devopsia.co"
        );
    }
}
