use serde::{Deserialize, Serialize};

use crate::shared::text_format::{camel_to_title, format_money};

/// Scan status of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "RawStatus", into = "String")]
pub enum ResourceStatus {
    #[default]
    Active,
    Stopped,
    Error,
    Scanning,
}

/// The collector reports status either by name or by its legacy numeric code
/// (`1` means the scan failed).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawStatus {
    Code(i64),
    Name(String),
}

impl From<RawStatus> for ResourceStatus {
    fn from(raw: RawStatus) -> Self {
        match raw {
            RawStatus::Code(1) => ResourceStatus::Error,
            RawStatus::Code(_) => ResourceStatus::Active,
            RawStatus::Name(name) => match name.to_ascii_lowercase().as_str() {
                "stopped" => ResourceStatus::Stopped,
                "error" => ResourceStatus::Error,
                "scanning" => ResourceStatus::Scanning,
                _ => ResourceStatus::Active,
            },
        }
    }
}

impl From<ResourceStatus> for String {
    fn from(status: ResourceStatus) -> Self {
        status.as_str().to_string()
    }
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceStatus::Active => "Active",
            ResourceStatus::Stopped => "Stopped",
            ResourceStatus::Error => "Error",
            ResourceStatus::Scanning => "Scanning",
        }
    }
}

/// One resource type of a waste report with its spend and raw records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Resource {
    pub resource_name: String,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Heterogeneous records; the shape is uniform within one resource type
    #[serde(default)]
    pub data: Vec<serde_json::Value>,
}

impl Resource {
    pub fn new(resource_name: impl Into<String>, total_spent: f64) -> Self {
        Self {
            resource_name: resource_name.into(),
            total_spent,
            status: ResourceStatus::Active,
            error_message: None,
            data: Vec::new(),
        }
    }

    pub fn with_data(mut self, data: Vec<serde_json::Value>) -> Self {
        self.data = data;
        self
    }

    /// Spend normalized to a finite, non-negative amount
    pub fn spend(&self) -> f64 {
        if self.total_spent.is_finite() && self.total_spent > 0.0 {
            self.total_spent
        } else {
            0.0
        }
    }

    /// "Ebs Volumes"
    pub fn display_title(&self) -> String {
        camel_to_title(&self.resource_name)
    }

    /// "Ebs Volumes ($1,234.00)"
    pub fn title(&self) -> String {
        format!("{} ({})", self.display_title(), format_money(self.spend()))
    }

    pub fn has_error(&self) -> bool {
        self.status == ResourceStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_feed_record() {
        let raw = json!({
            "ResourceName": "ebs_volumes",
            "TotalSpent": 1234.0,
            "Status": 0,
            "Data": [{ "ID": "vol-1" }]
        });
        let resource: Resource = serde_json::from_value(raw).unwrap();
        assert_eq!(resource.status, ResourceStatus::Active);
        assert_eq!(resource.data.len(), 1);
        assert_eq!(resource.title(), "Ebs Volumes ($1,234.00)");
    }

    #[test]
    fn test_status_accepts_code_and_name() {
        let failed: Resource = serde_json::from_value(json!({
            "ResourceName": "rds", "TotalSpent": 0, "Status": 1, "ErrorMessage": "AccessDenied"
        }))
        .unwrap();
        assert!(failed.has_error());

        let stopped: Resource =
            serde_json::from_value(json!({ "ResourceName": "ec2", "Status": "Stopped" })).unwrap();
        assert_eq!(stopped.status, ResourceStatus::Stopped);
        assert_eq!(serde_json::to_value(stopped.status).unwrap(), json!("Stopped"));
    }

    #[test]
    fn test_spend_is_never_negative() {
        assert_eq!(Resource::new("a", -3.0).spend(), 0.0);
        assert_eq!(Resource::new("a", f64::NAN).spend(), 0.0);
        assert_eq!(Resource::new("a", 7.5).spend(), 7.5);
    }
}
