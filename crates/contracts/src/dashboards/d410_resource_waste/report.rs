use serde::{Deserialize, Serialize};

use super::filter::Filter;

/// Body of `POST /api/v1/send-report`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendReportRequest {
    #[serde(rename = "toEmails")]
    pub to_emails: String,
    #[serde(rename = "executionID")]
    pub execution_id: Option<String>,
    #[serde(rename = "resourceType")]
    pub resource_type: Option<String>,
    pub filters: Vec<Filter>,
    pub search: String,
    pub columns: Vec<String>,
}

/// Answer of the report service.
///
/// `ok` is the success flag. Older services only echo `status: 200` in the
/// body, which is still accepted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SendReportResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SendReportResponse {
    pub fn is_success(&self) -> bool {
        match self.ok {
            Some(ok) => ok,
            None => self.status == Some(200),
        }
    }
}
