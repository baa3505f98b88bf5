//! Command implementations for quill CLI.
//!
//! Each submodule implements the logic for a command group.

pub mod context;
pub mod generate;
pub mod persona;
pub mod post;
pub mod reference;

use anyhow::Result;
use serde::Serialize;

/// Print a value as pretty JSON
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
