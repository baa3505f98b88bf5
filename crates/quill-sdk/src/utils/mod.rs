//! SDK Utilities
//!
//! Common utilities for the SDK.

mod text;
mod time;
mod validation;

pub use text::{truncate_chars, join_or};
pub use time::now_utc;
pub use validation::{require_text, require_unit_interval};
