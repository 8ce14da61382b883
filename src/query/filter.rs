//! Facet selections, free-text query and sort order.

use crate::suggest::Commit;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Current query and facet selections.
///
/// An empty string (or `None` rating) leaves that facet unconstrained.
/// Values outside the index's facet sets are allowed and match nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[serde(default, rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub min_rating: Option<f64>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the free-text query. Returns whether anything changed.
    pub fn set_query(&mut self, query: &str) -> bool {
        replace(&mut self.query, query)
    }

    pub fn set_category(&mut self, category: &str) -> bool {
        replace(&mut self.category, category)
    }

    pub fn set_location(&mut self, location: &str) -> bool {
        replace(&mut self.location, location)
    }

    pub fn set_entity_type(&mut self, entity_type: &str) -> bool {
        replace(&mut self.entity_type, entity_type)
    }

    pub fn set_min_rating(&mut self, min_rating: Option<f64>) -> bool {
        if self.min_rating == min_rating {
            return false;
        }
        self.min_rating = min_rating;
        true
    }

    /// Set the rating facet from raw control input (see [`parse_min_rating`])
    pub fn set_min_rating_input(&mut self, input: &str) -> bool {
        self.set_min_rating(parse_min_rating(input))
    }

    /// Clear every facet but keep the query
    pub fn clear_facets(&mut self) -> bool {
        let changed = self.has_facets();
        let query = std::mem::take(&mut self.query);
        *self = FilterState {
            query,
            ..Default::default()
        };
        changed
    }

    /// True when any facet (not the query) is set
    pub fn has_facets(&self) -> bool {
        !self.category.is_empty()
            || !self.location.is_empty()
            || !self.entity_type.is_empty()
            || self.min_rating.is_some()
    }

    /// True when no query and no facet constrains the result set
    pub fn is_unconstrained(&self) -> bool {
        self.query.is_empty() && !self.has_facets()
    }

    /// Apply a committed suggestion.
    ///
    /// Entity suggestions set the query to the entity name and leave facets
    /// alone. Category and location suggestions set that facet and clear the
    /// query.
    pub fn apply(&mut self, commit: &Commit) {
        match commit {
            Commit::Entity { name } => {
                self.query = name.clone();
            }
            Commit::Category(category) => {
                self.category = category.clone();
                self.query.clear();
            }
            Commit::Location(location) => {
                self.location = location.clone();
                self.query.clear();
            }
        }
    }
}

fn replace(slot: &mut String, value: &str) -> bool {
    if slot == value {
        return false;
    }
    slot.clear();
    slot.push_str(value);
    true
}

/// Parse the rating control's raw value.
///
/// Empty, unparsable and non-finite input all mean "no constraint" rather
/// than a comparison that can never succeed. Out-of-range numbers are kept.
pub fn parse_min_rating(input: &str) -> Option<f64> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        Ok(value) => {
            warn!("ignoring non-finite rating filter {}", value);
            None
        }
        Err(_) => {
            warn!("ignoring unparsable rating filter {:?}", trimmed);
            None
        }
    }
}

/// Result ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Case-folded lexicographic by name
    #[default]
    Name,
    /// Highest rating first, missing ratings as 0
    Rating,
    /// Lexicographic by location, missing locations as ""
    Location,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [SortKey::Name, SortKey::Rating, SortKey::Location];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Rating => "rating",
            SortKey::Location => "location",
        }
    }

    /// Next key in control order, wrapping around
    pub fn next(&self) -> SortKey {
        match self {
            SortKey::Name => SortKey::Rating,
            SortKey::Rating => SortKey::Location,
            SortKey::Location => SortKey::Name,
        }
    }

    /// Parse a sort control value, falling back to `name` for unknown input
    pub fn from_input(input: &str) -> SortKey {
        input.parse().unwrap_or_else(|_| {
            warn!("unknown sort key {:?}, sorting by name", input);
            SortKey::Name
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "name" => Ok(SortKey::Name),
            "rating" => Ok(SortKey::Rating),
            "location" => Ok(SortKey::Location),
            other => Err(format!("unknown sort key: {}", other)),
        }
    }
}
