//! Core types, storage traits, and the moderation engine for Bulletin.
//!
//! No HTTP or database dependencies live here.
//! Backends implement [`store::ContentStore`] and [`store::AccountDirectory`];
//! the [`moderation::ModerationEngine`] is the only mutation path over them.

// Trait futures carry explicit `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod content;
pub mod error;
pub mod memory;
pub mod moderation;
pub mod store;

pub use error::{Error, Result};
pub use moderation::ModerationEngine;
