use serde::{Deserialize, Serialize};

use crate::shared::text_format::camel_to_title;

pub const RESOURCE_FILTER_PREFIX: &str = "resource:";
pub const COLUMN_FILTER_PREFIX: &str = "column:";
pub const SEARCH_FILTER_PREFIX: &str = "search:";
pub const TAG_FILTER_PREFIX: &str = "tag:";

/// Column filters address fields of `Resource::data` as `Data.<Field>`.
pub const DATA_COLUMN_PREFIX: &str = "Data.";

/// Kind of a filter chip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    /// Drill-down into one resource type
    Resource,
    /// Allowed values of one table column
    Column,
    /// Free-text search across the table columns
    Search,
    /// Tag key/value on the resource records
    Tag,
}

impl FilterKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            FilterKind::Resource => RESOURCE_FILTER_PREFIX,
            FilterKind::Column => COLUMN_FILTER_PREFIX,
            FilterKind::Search => SEARCH_FILTER_PREFIX,
            FilterKind::Tag => TAG_FILTER_PREFIX,
        }
    }
}

/// A named, removable predicate narrowing the visible resources or rows.
///
/// Filters are built through the constructors below so that `id` and `title`
/// are always derived the same way; a filter decoded from a URL compares equal
/// to the one the user created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: FilterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(rename = "filterArr", default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

impl Filter {
    /// Resource drill-down filter, `id = "resource:<name>"`
    pub fn resource(resource_name: &str) -> Self {
        Self {
            id: format!("{}{}", RESOURCE_FILTER_PREFIX, resource_name),
            title: format!("Resource:{}", camel_to_title(resource_name)),
            kind: FilterKind::Resource,
            column: None,
            values: Vec::new(),
        }
    }

    /// Column filter; `column` may be given with or without the `Data.` prefix.
    pub fn column(column: &str, values: Vec<String>) -> Self {
        let field = column.strip_prefix(DATA_COLUMN_PREFIX).unwrap_or(column);
        let column = format!("{}{}", DATA_COLUMN_PREFIX, field);
        Self {
            id: format!("{}{}", COLUMN_FILTER_PREFIX, column),
            title: format!("{}: {}", camel_to_title(field), values.join(", ")),
            kind: FilterKind::Column,
            column: Some(column),
            values,
        }
    }

    pub fn search(text: &str) -> Self {
        Self {
            id: format!("{}{}", SEARCH_FILTER_PREFIX, text),
            title: format!("Search: {}", text),
            kind: FilterKind::Search,
            column: None,
            values: vec![text.to_string()],
        }
    }

    pub fn tag(key: &str, value: &str) -> Self {
        Self {
            id: format!("{}{}={}", TAG_FILTER_PREFIX, key, value),
            title: format!("Tag {}: {}", key, value),
            kind: FilterKind::Tag,
            column: Some(key.to_string()),
            values: vec![value.to_string()],
        }
    }

    /// True for every id in the `resource` family; "go home" clears them all.
    pub fn is_resource(&self) -> bool {
        self.id.starts_with("resource")
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.id.strip_prefix(RESOURCE_FILTER_PREFIX)
    }

    /// Record field addressed by a column filter, without the `Data.` prefix
    pub fn field(&self) -> Option<&str> {
        let column = self.column.as_deref()?;
        Some(column.strip_prefix(DATA_COLUMN_PREFIX).unwrap_or(column))
    }
}
