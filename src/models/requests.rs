//! Request DTOs for the board API
//!
//! Defines query strings and bodies accepted by the HTTP handlers.

use serde::Deserialize;

/// Query string for paginated thread listings (`?page=N`).
///
/// Pages are numbered from 1.
#[derive(Debug, Clone, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Parses the page number.
    ///
    /// Returns an error message if the page is missing, not a number, or zero.
    pub fn page(&self) -> std::result::Result<u32, String> {
        let raw = self
            .page
            .as_deref()
            .ok_or_else(|| "Missing page parameter".to_string())?;
        match raw.parse::<u32>() {
            Ok(page) if page >= 1 => Ok(page),
            _ => Err(format!("Invalid page: {raw}")),
        }
    }
}
