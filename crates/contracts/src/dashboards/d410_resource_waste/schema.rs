use serde::{Deserialize, Serialize};

/// How a table cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderKind {
    /// `$1,234.50`
    Currency2dp,
    /// `$0.125`
    Currency3dp,
    /// `2024-01-01 10:30`
    Date,
    /// Tag key/value list
    Tag,
    /// Status text with a tone
    Status,
    PlainText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDef {
    /// Field name in the record
    pub name: String,
    pub label: String,
    pub render_kind: RenderKind,
}

/// Ordered column definitions of the current resource table
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnSchema(pub Vec<ColumnDef>);

impl ColumnSchema {
    pub fn columns(&self) -> &[ColumnDef] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&ColumnDef> {
        self.0.iter().find(|c| c.name == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|c| c.name.clone()).collect()
    }

    /// Same columns in the same order, minus the unchecked ones
    pub fn without(&self, hidden: &[String]) -> ColumnSchema {
        ColumnSchema(
            self.0
                .iter()
                .filter(|c| !hidden.contains(&c.name))
                .cloned()
                .collect(),
        )
    }
}
