//! # iaps_core
//!
//! Core domain logic for IAPS.

pub mod auth;
pub mod db;
pub mod mailer;
pub mod migrate;
pub mod models;
pub mod resources;
pub mod roster;
pub mod tokens;
pub mod uuid;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
