//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use bulletin_core::Error as CoreError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Missing or wrong credentials.
  #[error("authentication required")]
  Unauthenticated,

  #[error("bad request: {0}")]
  BadRequest(String),

  /// A server-side fault outside the store, such as a hashing failure.
  #[error("internal error: {0}")]
  Internal(String),

  #[error(transparent)]
  Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthenticated => {
        let mut res = (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": self.to_string() })),
        )
          .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"bulletin\""),
        );
        return res;
      }
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Internal(message) => {
        tracing::error!(error = %message, "internal failure");
        StatusCode::INTERNAL_SERVER_ERROR
      }
      ApiError::Core(e) => match e {
        CoreError::Validation(_) => StatusCode::BAD_REQUEST,
        CoreError::Unauthorized { .. } => StatusCode::FORBIDDEN,
        CoreError::AccountNotFound(_) | CoreError::ContentNotFound(_) => StatusCode::NOT_FOUND,
        CoreError::InvalidState { .. } | CoreError::UsernameTaken(_) => StatusCode::CONFLICT,
        CoreError::Store(source) => {
          tracing::error!(error = %source, "store failure");
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    };
    (status, Json(json!({ "error": self.to_string() }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use bulletin_core::{
    account::{AccountId, Role},
    content::ContentId,
  };

  #[test]
  fn statuses_follow_error_kind() {
    let cases = [
      (ApiError::BadRequest("x".into()), StatusCode::BAD_REQUEST),
      (ApiError::Internal("hash failed".into()), StatusCode::INTERNAL_SERVER_ERROR),
      (CoreError::Validation("x".into()).into(), StatusCode::BAD_REQUEST),
      (
        CoreError::Unauthorized { actor: AccountId::new(), required: Role::Admin }.into(),
        StatusCode::FORBIDDEN,
      ),
      (CoreError::ContentNotFound(ContentId(1)).into(), StatusCode::NOT_FOUND),
      (CoreError::UsernameTaken("x".into()).into(), StatusCode::CONFLICT),
    ];
    for (err, expected) in cases {
      assert_eq!(err.into_response().status(), expected);
    }
  }

  #[test]
  fn unauthenticated_carries_basic_challenge() {
    let resp = ApiError::Unauthenticated.into_response();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      resp.headers().get(header::WWW_AUTHENTICATE).unwrap().to_str().unwrap(),
      "Basic realm=\"bulletin\""
    );
  }
}
