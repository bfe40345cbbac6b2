//! Error type for `bulletin-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A column held a value no domain type accepts.
  #[error("cannot decode column {column}: {value:?}")]
  Decode { column: &'static str, value: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
