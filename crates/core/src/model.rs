use std::fmt;
use std::str::FromStr;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Timestamp written inside the emitted document.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Timestamp embedded in the output file name.
pub const FILENAME_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Which of the two tabular inputs a filter or column refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Source1,
    Source2,
}

impl Source {
    pub const BOTH: [Source; 2] = [Source::Source1, Source::Source2];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Source1 => "source1",
            Self::Source2 => "source2",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "source1" | "1" | "file1" => Ok(Self::Source1),
            "source2" | "2" | "file2" => Ok(Self::Source2),
            other => Err(format!("unknown source '{other}' (expected source1 or source2)")),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter operators
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Contains,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 5] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::GreaterThan,
        FilterOperator::LessThan,
        FilterOperator::Contains,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterOperator {
    type Err = String;

    /// Accepts the snake_case wire names as well as the spaced labels
    /// ("not equals", "greater than") shown in form selectors.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str() == normalized)
            .ok_or_else(|| {
                format!(
                    "unknown operator '{}' (expected one of: {})",
                    s.trim(),
                    Self::ALL.map(|op| op.as_str()).join(", ")
                )
            })
    }
}

// ---------------------------------------------------------------------------
// Column mapping + filter condition
// ---------------------------------------------------------------------------

/// Correspondence between a column in source 1 and a column in source 2.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    #[serde(default)]
    pub source1_column: String,
    #[serde(default)]
    pub source2_column: String,
    #[serde(default)]
    pub is_join_key: bool,
    #[serde(default)]
    pub is_recon_key: bool,
}

impl ColumnMapping {
    pub fn new(source1: impl Into<String>, source2: impl Into<String>) -> Self {
        Self {
            source1_column: source1.into(),
            source2_column: source2.into(),
            ..Self::default()
        }
    }

    pub fn join_key(mut self, on: bool) -> Self {
        self.is_join_key = on;
        self
    }

    pub fn recon_key(mut self, on: bool) -> Self {
        self.is_recon_key = on;
        self
    }

    /// Both column names are filled in.
    pub fn is_complete(&self) -> bool {
        !self.source1_column.is_empty() && !self.source2_column.is_empty()
    }

    pub fn column(&self, source: Source) -> &str {
        match source {
            Source::Source1 => &self.source1_column,
            Source::Source2 => &self.source2_column,
        }
    }
}

/// A filter row as edited in the form. Selector fields stay `None` until the
/// user picks a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterDraft {
    #[serde(default)]
    pub source: Option<Source>,
    #[serde(default)]
    pub column: String,
    #[serde(default)]
    pub operator: Option<FilterOperator>,
    #[serde(default)]
    pub value: String,
}

impl FilterDraft {
    /// The emitted condition, if every field is set.
    ///
    /// An empty `value` counts as unset, so an "is empty" check cannot be
    /// expressed; downstream consumers rely on this.
    pub fn complete(&self) -> Option<FilterCondition> {
        let source = self.source?;
        let operator = self.operator?;
        if self.column.is_empty() || self.value.is_empty() {
            return None;
        }
        Some(FilterCondition {
            source,
            column: self.column.clone(),
            operator,
            value: self.value.clone(),
        })
    }
}

impl From<FilterCondition> for FilterDraft {
    fn from(c: FilterCondition) -> Self {
        Self {
            source: Some(c.source),
            column: c.column,
            operator: Some(c.operator),
            value: c.value,
        }
    }
}

/// Predicate restricting which rows of one source take part in reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub source: Source,
    pub column: String,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCondition {
    pub fn new(
        source: Source,
        column: impl Into<String>,
        operator: FilterOperator,
        value: impl Into<String>,
    ) -> Self {
        Self {
            source,
            column: column.into(),
            operator,
            value: value.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Journey + categories
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<String>,
}

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subcategories: Vec::new(),
        }
    }
}

/// Categories in insertion order, unique by name.
///
/// Serialized as a JSON object keyed by category name; key order follows
/// insertion order. Registry operations live in `registry.rs`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    pub(crate) entries: Vec<Category>,
}

impl CategorySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Category> {
        self.entries.iter().find(|c| c.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Category> {
        self.entries.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|c| c.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a CategorySet {
    type Item = &'a Category;
    type IntoIter = std::slice::Iter<'a, Category>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl Serialize for CategorySet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for category in &self.entries {
            map.serialize_entry(&category.name, category)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CategorySet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CategoryMapVisitor;

        impl<'de> Visitor<'de> for CategoryMapVisitor {
            type Value = CategorySet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of category name to category")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut set = CategorySet::new();
                while let Some((key, mut category)) = access.next_entry::<String, Category>()? {
                    // The map key is the category's identity.
                    category.name = key;
                    if !set.contains(&category.name) {
                        set.entries.push(category);
                    }
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(CategoryMapVisitor)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JourneyConfig {
    #[serde(default)]
    pub journey_name: String,
    #[serde(default)]
    pub categories: CategorySet,
}

impl JourneyConfig {
    pub fn new(journey_name: impl Into<String>) -> Self {
        Self {
            journey_name: journey_name.into(),
            categories: CategorySet::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// File summary
// ---------------------------------------------------------------------------

/// Column list and row count read from an uploaded table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSummary {
    pub name: String,
    pub columns: Vec<String>,
    pub total_rows: usize,
}

impl FileSummary {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }
}

// ---------------------------------------------------------------------------
// Emitted artifact
// ---------------------------------------------------------------------------

/// The JSON document handed to the reconciliation engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub timestamp: String,
    pub journey_name: String,
    pub categories: CategorySet,
    pub mappings: Vec<ColumnMapping>,
    pub filters: Vec<FilterCondition>,
}
