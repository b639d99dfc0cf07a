use serde::{Deserialize, Serialize};
use std::fmt;

/// The three levels of the location hierarchy.
///
/// `Kind` is the closed set of tables the registry operates on; every table
/// and column lookup goes through it, so no user-supplied string ever reaches
/// a statement as an identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Kind {
    Region,
    City,
    Barangay,
}

impl Kind {
    /// The table holding rows of this kind.
    pub fn table(self) -> &'static str {
        match self {
            Kind::Region => "regions",
            Kind::City => "cities",
            Kind::Barangay => "barangays",
        }
    }

    /// The foreign-key column pointing at this kind's parent, if any.
    pub fn parent_column(self) -> Option<&'static str> {
        match self {
            Kind::Region => None,
            Kind::City => Some("region_id"),
            Kind::Barangay => Some("city_id"),
        }
    }

    /// The kind one level up, if any.
    pub fn parent(self) -> Option<Kind> {
        match self {
            Kind::Region => None,
            Kind::City => Some(Kind::Region),
            Kind::Barangay => Some(Kind::City),
        }
    }

    /// The kind one level down, if any. Barangays are leaves.
    pub fn child(self) -> Option<Kind> {
        match self {
            Kind::Region => Some(Kind::City),
            Kind::City => Some(Kind::Barangay),
            Kind::Barangay => None,
        }
    }

    /// Prefix letter used when deriving a `code` value.
    pub fn code_prefix(self) -> char {
        match self {
            Kind::Region => 'R',
            Kind::City => 'C',
            Kind::Barangay => 'B',
        }
    }

    /// Lowercase label for messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            Kind::Region => "region",
            Kind::City => "city",
            Kind::Barangay => "barangay",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the hierarchy, regardless of level.
///
/// Optional fields are `None` both when the stored value is NULL and when the
/// live schema lacks the column entirely; callers cannot tell the two apart
/// and should not need to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationNode {
    pub id: i64,
    pub name: String,
    pub code: Option<String>,
    pub description: Option<String>,
    /// `None` for regions; the owning region/city id otherwise.
    pub parent_id: Option<i64>,
    pub active: bool,
    pub modified_by: Option<String>,
    pub modified_at: Option<i64>,
}

/// A region with its active cities, each carrying its active barangays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionTree {
    pub region: LocationNode,
    pub cities: Vec<CityTree>,
}

/// A city with its active barangays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityTree {
    pub city: LocationNode,
    pub barangays: Vec<LocationNode>,
}

/// Active row counts per level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationCounts {
    pub regions: i64,
    pub cities: i64,
    pub barangays: i64,
    pub total: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_lookups() {
        assert_eq!(Kind::Region.table(), "regions");
        assert_eq!(Kind::City.parent_column(), Some("region_id"));
        assert_eq!(Kind::Barangay.parent(), Some(Kind::City));
        assert_eq!(Kind::Barangay.child(), None);
        assert_eq!(Kind::Region.child(), Some(Kind::City));
    }

    #[test]
    fn test_kind_serializes_as_pascal_case() {
        let json = serde_json::to_string(&Kind::Barangay).unwrap();
        assert_eq!(json, r#""Barangay""#);
    }

    #[test]
    fn test_node_serializes_camel_case() {
        let node = LocationNode {
            id: 1,
            name: "NCR".to_string(),
            code: None,
            description: None,
            parent_id: None,
            active: true,
            modified_by: Some("admin".to_string()),
            modified_at: Some(1234567890),
        };
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("parentId"));
        assert!(json.contains("modifiedBy"));
    }
}
