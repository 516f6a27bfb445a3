// veilmask-core/src/category.rs
//! The fixed vocabulary of placeholder categories.
//!
//! These six tags are the only valid category component of a placeholder
//! token. They are part of the wire format between masking and unmasking:
//! adding a variant is a contract change for every store ever persisted.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A placeholder category tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Person names, whether recognizer-supplied or from the proper-noun fallback.
    Client,
    /// Organization names, recognizer-supplied or matched by corporate suffix.
    Company,
    /// User-blacklisted literal terms. Highest detection priority.
    Entity,
    /// Email addresses.
    Email,
    /// Payment card numbers (13-16 digits, separator-tolerant).
    Card,
    /// Nine-digit government-ID shapes (3-2-4 grouping).
    #[serde(rename = "ID")]
    Id,
}

impl Category {
    /// Every category, in detection priority order (highest first).
    pub const ALL: [Category; 6] = [
        Category::Entity,
        Category::Client,
        Category::Company,
        Category::Email,
        Category::Card,
        Category::Id,
    ];

    /// The exact string form used inside placeholder tokens.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Client => "Client",
            Category::Company => "Company",
            Category::Entity => "Entity",
            Category::Email => "Email",
            Category::Card => "Card",
            Category::Id => "ID",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown category tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown placeholder category '{}'", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Client" => Ok(Category::Client),
            "Company" => Ok(Category::Company),
            "Entity" => Ok(Category::Entity),
            "Email" => Ok(Category::Email),
            "Card" => Ok(Category::Card),
            "ID" => Ok(Category::Id),
            other => Err(UnknownCategory(other.to_string())),
        }
    }
}
