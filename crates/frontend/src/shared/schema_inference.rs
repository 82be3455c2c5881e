//! Column schema of a resource table, derived from one sample record.

use contracts::dashboards::d410_resource_waste::{ColumnDef, ColumnSchema, RenderKind};
use contracts::shared::text_format::camel_to_title;
use serde_json::Value;

/// Fields that never become a column
pub const EXCLUDED_FIELDS: [&str; 1] = ["TotalSpendPrice"];

/// Field name -> render kind; anything else is plain text
pub fn render_kind_for(field: &str) -> RenderKind {
    match field {
        "PricePerMonth" | "TotalSpendPrice" => RenderKind::Currency2dp,
        "PricePerHour" => RenderKind::Currency3dp,
        "LaunchTime" => RenderKind::Date,
        "Tag" => RenderKind::Tag,
        "Status" => RenderKind::Status,
        _ => RenderKind::PlainText,
    }
}

/// Columns in the record's key order; a non-object sample gives no columns.
pub fn infer(sample: &Value) -> ColumnSchema {
    let Some(record) = sample.as_object() else {
        return ColumnSchema::default();
    };

    let columns = record
        .keys()
        .filter(|key| !EXCLUDED_FIELDS.contains(&key.as_str()))
        .map(|key| ColumnDef {
            name: key.clone(),
            label: camel_to_title(key),
            render_kind: render_kind_for(key),
        })
        .collect();

    ColumnSchema(columns)
}

/// What makes two datasets "the same" for schema purposes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetIdentity {
    pub execution_id: Option<String>,
    pub resource_name: String,
    pub record_count: usize,
}

/// Keeps the schema of the current dataset so rows are never re-inspected
/// while the user pages, sorts or searches.
#[derive(Debug, Default)]
pub struct SchemaCache {
    identity: Option<DatasetIdentity>,
    schema: ColumnSchema,
    inferences: usize,
}

impl SchemaCache {
    pub fn get_or_infer(&mut self, identity: DatasetIdentity, data: &[Value]) -> &ColumnSchema {
        if self.identity.as_ref() != Some(&identity) {
            self.schema = data.first().map(infer).unwrap_or_default();
            self.identity = Some(identity);
            self.inferences += 1;
        }
        &self.schema
    }

    /// How many times a schema was actually inferred
    pub fn inferences(&self) -> usize {
        self.inferences
    }
}
