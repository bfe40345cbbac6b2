//! Handlers for `/content` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/content` | `?status=approved` (default, public) or `?status=pending,flagged` (admin) |
//! | `POST` | `/content` | Body: [`SubmitBody`]; returns 201 + stored item |
//! | `GET`  | `/content/mine` | The caller's own submissions |
//! | `GET`  | `/content/{id}/review` | Admin |
//! | `POST` | `/content/{id}/approve` | Admin |
//! | `POST` | `/content/{id}/delete` | Admin; soft delete |
//! | `POST` | `/content/{id}/flag` | Body: `{"reason":"..."}` |
//! | `GET`  | `/content/{id}/history` | Admin; audit trail oldest first |

use std::collections::HashSet;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use bulletin_core::content::{ContentId, ContentItem, ContentStatus, Transition};
use serde::Deserialize;

use crate::{
  Backend, SharedEngine,
  auth::{Actor, authenticate},
  error::ApiError,
};

fn log_change(item: &ContentItem, actor: &Actor) {
  tracing::info!(
    content_id = %item.content_id,
    actor = %actor.0.account_id,
    status = %item.status,
    "content status changed"
  );
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// Comma-separated statuses. Only `approved` and `pending,flagged` are
  /// served.
  pub status: Option<String>,
}

/// Which listing a `?status=` value selects.
#[derive(Debug, PartialEq, Eq)]
enum Listing {
  Approved,
  ReviewQueue,
}

fn parse_listing(raw: Option<&str>) -> Result<Listing, ApiError> {
  let Some(raw) = raw.filter(|s| !s.trim().is_empty()) else {
    return Ok(Listing::Approved);
  };

  let statuses = raw
    .split(',')
    .map(|s| {
      s.trim()
        .parse::<ContentStatus>()
        .map_err(|_| ApiError::BadRequest(format!("unknown status: {}", s.trim())))
    })
    .collect::<Result<HashSet<_>, _>>()?;

  let queue = HashSet::from([ContentStatus::Pending, ContentStatus::Flagged]);
  if statuses == queue {
    Ok(Listing::ReviewQueue)
  } else if statuses == HashSet::from([ContentStatus::Approved]) {
    Ok(Listing::Approved)
  } else {
    Err(ApiError::BadRequest(format!(
      "unsupported status filter: {raw}; use approved or pending,flagged"
    )))
  }
}

/// `GET /content[?status=...]`
pub async fn list<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  headers: HeaderMap,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
  let items = match parse_listing(params.status.as_deref())? {
    Listing::Approved => engine.list_approved().await?,
    Listing::ReviewQueue => {
      let actor = authenticate(&headers, &engine).await?;
      engine.list_pending_and_flagged(actor.account_id).await?
    }
  };
  Ok(Json(items))
}

/// `GET /content/mine`
pub async fn mine<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
) -> Result<Json<Vec<ContentItem>>, ApiError> {
  Ok(Json(engine.list_by_author(actor.0.account_id).await?))
}

// ─── Submit ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /content`. Missing fields are treated as empty
/// so the engine reports them as validation failures.
#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  #[serde(default)]
  pub title:  String,
  #[serde(default)]
  pub body:   String,
  pub source: Option<String>,
}

/// `POST /content`, returning 201 + the stored item.
pub async fn submit<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError> {
  let item = engine
    .submit(actor.0.account_id, body.title, body.body, body.source)
    .await?;
  log_change(&item, &actor);
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Moderation ───────────────────────────────────────────────────────────────

/// `GET /content/{id}/review`
pub async fn review<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Path(id): Path<ContentId>,
) -> Result<Json<ContentItem>, ApiError> {
  Ok(Json(engine.review(actor.0.account_id, id).await?))
}

/// `POST /content/{id}/approve`
pub async fn approve<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Path(id): Path<ContentId>,
) -> Result<Json<ContentItem>, ApiError> {
  let item = engine.approve(actor.0.account_id, id).await?;
  log_change(&item, &actor);
  Ok(Json(item))
}

/// `POST /content/{id}/delete`
pub async fn delete<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Path(id): Path<ContentId>,
) -> Result<Json<ContentItem>, ApiError> {
  let item = engine.delete(actor.0.account_id, id).await?;
  log_change(&item, &actor);
  Ok(Json(item))
}

#[derive(Debug, Deserialize)]
pub struct FlagBody {
  #[serde(default)]
  pub reason: String,
}

/// `POST /content/{id}/flag`
pub async fn flag<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Path(id): Path<ContentId>,
  Json(body): Json<FlagBody>,
) -> Result<Json<ContentItem>, ApiError> {
  let item = engine.flag(actor.0.account_id, id, body.reason).await?;
  log_change(&item, &actor);
  Ok(Json(item))
}

/// `GET /content/{id}/history`
pub async fn history<S: Backend>(
  State(engine): State<SharedEngine<S>>,
  actor: Actor,
  Path(id): Path<ContentId>,
) -> Result<Json<Vec<Transition>>, ApiError> {
  Ok(Json(engine.history(actor.0.account_id, id).await?))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_or_blank_status_lists_approved() {
    assert_eq!(parse_listing(None).unwrap(), Listing::Approved);
    assert_eq!(parse_listing(Some(" ")).unwrap(), Listing::Approved);
    assert_eq!(parse_listing(Some("approved")).unwrap(), Listing::Approved);
  }

  #[test]
  fn queue_filter_ignores_order_and_spacing() {
    assert_eq!(parse_listing(Some("pending,flagged")).unwrap(), Listing::ReviewQueue);
    assert_eq!(parse_listing(Some("flagged, pending")).unwrap(), Listing::ReviewQueue);
  }

  #[test]
  fn other_filters_are_rejected() {
    assert!(matches!(parse_listing(Some("deleted")), Err(ApiError::BadRequest(_))));
    assert!(matches!(parse_listing(Some("pending")), Err(ApiError::BadRequest(_))));
    assert!(matches!(parse_listing(Some("bogus")), Err(ApiError::BadRequest(_))));
  }
}
