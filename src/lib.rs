//! Mandir
//!
//! State core of a temple community app: donation and event-registration
//! carts with Gift Aid totals, freshness tracking for cached content, and the
//! daily quote calendar.

pub mod cart;
pub mod config;
pub mod content;
pub mod money;
pub mod persistence;
pub mod prelude;
pub mod quotes;
