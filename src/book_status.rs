use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

/// Lending status of a book in the catalog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub enum BookStatus {
    /// Book is on the shelf
    #[default]
    #[serde(alias = "В наличии")]
    Available,
    /// Book is lent out
    #[serde(alias = "Выдана")]
    CheckedOut,
}

impl BookStatus {
    /// Both recognized statuses, in menu order
    pub const ALL: [Self; 2] = [Self::Available, Self::CheckedOut];

    /// The canonical name written to the store
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Available => "Available",
            Self::CheckedOut => "CheckedOut",
        }
    }

    /// Get a human-readable description of the status
    #[must_use]
    pub fn get_description(self) -> &'static str {
        match self {
            Self::Available => "Book is available for checkout",
            Self::CheckedOut => "Book is checked out",
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("Available"),
            Self::CheckedOut => f.write_str("Checked out"),
        }
    }
}

impl FromStr for BookStatus {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        // Labels written by older versions of the catalog
        match trimmed {
            "В наличии" => return Ok(Self::Available),
            "Выдана" => return Ok(Self::CheckedOut),
            _ => {}
        }

        let normalized: String = trimmed
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "available" => Ok(Self::Available),
            "checkedout" => Ok(Self::CheckedOut),
            _ => Err(CatalogError::InvalidStatus(s.to_string())),
        }
    }
}
