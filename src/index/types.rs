use crate::error::LoadFailure;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// One directory listing as it appears in the search index.
///
/// Field names follow the wire format written by the index producer
/// (`type`, `price_range`, `search_terms`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entity_type: String,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Absent locations are written as `""` or `null` by the producer
    #[serde(default, deserialize_with = "empty_as_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub price_range: Option<String>,
    pub url: String,
    /// Lower-cased and deduplicated by the producer
    #[serde(default)]
    pub search_terms: Vec<String>,
}

impl Entity {
    /// Rating used for filtering and ordering (missing counts as 0)
    pub fn effective_rating(&self) -> f64 {
        self.rating.unwrap_or(0.0)
    }

    /// Location used for ordering (missing counts as the empty string)
    pub fn location_or_empty(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c == category)
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

/// The complete precomputed directory index, loaded once per session.
///
/// Facet value sets keep the order they have in the artifact; suggestion
/// scanning depends on it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    /// Canonical wire name is `entity_types`; `features` is a different set
    #[serde(default)]
    pub entity_types: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    /// Parent category -> child categories (for `Parent > Child` names)
    #[serde(default)]
    pub category_tree: BTreeMap<String, Vec<String>>,
    /// Region (state) -> `City, ST` locations
    #[serde(default)]
    pub location_tree: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub generated_at: Option<String>,
}

impl Index {
    /// Decode an index document from its JSON bytes
    pub fn from_json(bytes: &[u8]) -> Result<Self, LoadFailure> {
        serde_json::from_slice(bytes).map_err(|e| LoadFailure::Parse(e.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Child categories of a hierarchical parent category
    pub fn subcategories(&self, parent: &str) -> &[String] {
        self.category_tree
            .get(parent)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Locations grouped under a region
    pub fn locations_in(&self, region: &str) -> &[String] {
        self.location_tree
            .get(region)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> DirectoryStats {
        DirectoryStats {
            total_entities: self.entities.len(),
            total_categories: self.categories.len(),
            total_locations: self.locations.len(),
            total_types: self.entity_types.len(),
        }
    }
}

/// Summary counts for a loaded directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DirectoryStats {
    pub total_entities: usize,
    pub total_categories: usize,
    pub total_locations: usize,
    pub total_types: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "entities": [
            {
                "id": "joes-pizza-palace",
                "name": "Joe's Pizza Palace",
                "type": "business",
                "categories": ["Restaurants", "Pizza"],
                "location": "Springfield, IL",
                "rating": 4.5,
                "price_range": "$$",
                "url": "/directory/business/joes-pizza-palace/",
                "search_terms": ["joe's pizza palace", "restaurants", "pizza"]
            },
            {
                "id": "anon",
                "name": "Anon",
                "type": "member",
                "categories": [],
                "location": "",
                "rating": null,
                "price_range": null,
                "url": "/anon/",
                "search_terms": ["anon"]
            }
        ],
        "categories": ["Pizza", "Restaurants"],
        "locations": ["Springfield, IL"],
        "entity_types": ["business", "member"],
        "features": ["wifi"],
        "category_tree": {"Food": ["Food > Pizza"]},
        "location_tree": {"IL": ["Springfield, IL"]},
        "generated_at": "2024-05-01T10:00:00"
    }"#;

    #[test]
    fn test_decode_wire_names() {
        let index = Index::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(index.len(), 2);

        let joe = &index.entities[0];
        assert_eq!(joe.entity_type, "business");
        assert_eq!(joe.price_range.as_deref(), Some("$$"));
        assert_eq!(joe.search_terms.len(), 3);
        assert_eq!(index.entity_types, vec!["business", "member"]);
        assert_eq!(index.features, vec!["wifi"]);
    }

    #[test]
    fn test_empty_location_is_absent() {
        let index = Index::from_json(SAMPLE.as_bytes()).unwrap();
        let anon = &index.entities[1];
        assert_eq!(anon.location, None);
        assert_eq!(anon.location_or_empty(), "");
        assert_eq!(anon.effective_rating(), 0.0);
        assert_eq!(anon.price_range, None);
    }

    #[test]
    fn test_features_are_not_entity_types() {
        let json = r#"{"entities": [], "features": ["business"]}"#;
        let index = Index::from_json(json.as_bytes()).unwrap();
        assert!(index.entity_types.is_empty());
        assert_eq!(index.features, vec!["business"]);
    }

    #[test]
    fn test_trees_and_stats() {
        let index = Index::from_json(SAMPLE.as_bytes()).unwrap();
        assert_eq!(index.subcategories("Food"), ["Food > Pizza".to_string()]);
        assert!(index.subcategories("Nope").is_empty());
        assert_eq!(index.locations_in("IL"), ["Springfield, IL".to_string()]);

        let stats = index.stats();
        assert_eq!(stats.total_entities, 2);
        assert_eq!(stats.total_categories, 2);
        assert_eq!(stats.total_locations, 1);
        assert_eq!(stats.total_types, 2);
    }

    #[test]
    fn test_integer_rating_and_missing_optional_fields() {
        let json = r#"{"entities": [
            {"id": "a", "name": "A", "type": "t", "rating": 4, "url": "/a/"}
        ]}"#;
        let index = Index::from_json(json.as_bytes()).unwrap();
        let a = &index.entities[0];
        assert_eq!(a.rating, Some(4.0));
        assert!(a.categories.is_empty());
        assert!(a.search_terms.is_empty());
        assert!(index.generated_at.is_none());
    }

    #[test]
    fn test_parse_failure() {
        let err = Index::from_json(b"{not json").unwrap_err();
        assert!(matches!(err, LoadFailure::Parse(_)));

        // entities is required
        let err = Index::from_json(b"{}").unwrap_err();
        assert!(matches!(err, LoadFailure::Parse(_)));
    }
}
