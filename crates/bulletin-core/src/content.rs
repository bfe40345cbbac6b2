//! Content items and the moderation state machine.
//!
//! An item is created `pending`. Admins approve or soft-delete it; any account
//! may flag an approved item, which sends it back to the admin queue. Every
//! status change is recorded as an append-only [`Transition`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use uuid::Uuid;

use crate::{Error, Result, account::AccountId};

/// Provenance label used when the submitter gives none.
pub const DEFAULT_SOURCE: &str = "User Submission";

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned, monotonically increasing item identifier.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ContentId(pub u64);

impl fmt::Display for ContentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── State machine ───────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentStatus {
  Pending,
  Approved,
  /// Never produced by the engine; kept so records from older schemas load.
  Rejected,
  Flagged,
  /// Terminal.
  Deleted,
}

/// A requested move through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
  Approve,
  Delete,
  Flag,
}

impl ContentStatus {
  pub fn is_terminal(self) -> bool { matches!(self, Self::Deleted) }

  /// Statuses waiting on an admin decision.
  pub fn awaits_review(self) -> bool { matches!(self, Self::Pending | Self::Flagged) }

  /// The status reached by applying `action`, or `None` if the move is not
  /// legal from `self`.
  pub fn after(self, action: Action) -> Option<Self> {
    use ContentStatus::*;
    match (self, action) {
      (Pending | Flagged, Action::Approve) => Some(Approved),
      (Pending | Approved | Flagged | Rejected, Action::Delete) => Some(Deleted),
      (Approved, Action::Flag) => Some(Flagged),
      _ => None,
    }
  }
}

// ─── Items ───────────────────────────────────────────────────────────────────

/// A submitted news item subject to moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
  pub content_id:  ContentId,
  pub title:       String,
  pub body:        String,
  pub author:      AccountId,
  pub source:      String,
  pub status:      ContentStatus,
  /// Present if and only if `status` is `Flagged`.
  pub flag_reason: Option<String>,
  pub created_at:  DateTime<Utc>,
}

impl ContentItem {
  /// Build a freshly submitted item. Callers are stores assigning `id`.
  pub fn from_draft(id: ContentId, draft: Draft, created_at: DateTime<Utc>) -> Self {
    Self {
      content_id: id,
      title: draft.title,
      body: draft.body,
      author: draft.author,
      source: draft.source,
      status: ContentStatus::Pending,
      flag_reason: None,
      created_at,
    }
  }

  /// Apply `change` in place and return the audit record for it.
  ///
  /// Does not check legality; the engine has already done so and the store
  /// has compared the current status.
  pub fn apply(&mut self, change: &StatusChange, recorded_at: DateTime<Utc>) -> Transition {
    let from = self.status;
    self.status = change.to;
    self.flag_reason = change.flag_reason.clone();
    Transition {
      transition_id: Uuid::new_v4(),
      content_id: self.content_id,
      actor: change.actor,
      from,
      to: change.to,
      reason: change.flag_reason.clone(),
      recorded_at,
    }
  }
}

/// Validated input to [`crate::store::ContentStore::insert`].
/// The id, status, and `created_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct Draft {
  pub author: AccountId,
  pub title:  String,
  pub body:   String,
  pub source: String,
}

impl Draft {
  /// Check the submission and fill in the default source.
  pub fn new(
    author: AccountId,
    title: impl Into<String>,
    body: impl Into<String>,
    source: Option<String>,
  ) -> Result<Self> {
    let title = title.into();
    let body = body.into();
    if title.trim().is_empty() {
      return Err(Error::Validation("title is required".into()));
    }
    if body.trim().is_empty() {
      return Err(Error::Validation("body is required".into()));
    }
    let source = source
      .filter(|s| !s.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_SOURCE.to_owned());
    Ok(Self { author, title, body, source })
  }
}

// ─── Changes ─────────────────────────────────────────────────────────────────

/// A status change as handed to the store.
///
/// Only constructible through the per-action constructors, so the flag reason
/// is carried exactly when the target status is `Flagged`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange {
  to:          ContentStatus,
  flag_reason: Option<String>,
  actor:       AccountId,
}

impl StatusChange {
  pub fn approve(actor: AccountId) -> Self {
    Self { to: ContentStatus::Approved, flag_reason: None, actor }
  }

  pub fn delete(actor: AccountId) -> Self {
    Self { to: ContentStatus::Deleted, flag_reason: None, actor }
  }

  pub fn flag(actor: AccountId, reason: impl Into<String>) -> Self {
    Self {
      to: ContentStatus::Flagged,
      flag_reason: Some(reason.into()),
      actor,
    }
  }

  pub fn to(&self) -> ContentStatus { self.to }

  pub fn flag_reason(&self) -> Option<&str> { self.flag_reason.as_deref() }

  pub fn actor(&self) -> AccountId { self.actor }
}

/// One append-only audit record of a status change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
  pub transition_id: Uuid,
  pub content_id:    ContentId,
  pub actor:         AccountId,
  pub from:          ContentStatus,
  pub to:            ContentStatus,
  /// The flag reason, for transitions into `Flagged`.
  pub reason:        Option<String>,
  pub recorded_at:   DateTime<Utc>,
}
