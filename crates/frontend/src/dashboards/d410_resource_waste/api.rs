use contracts::dashboards::d410_resource_waste::{Resource, SendReportRequest, SendReportResponse};
use gloo_net::http::Request;

use crate::shared::api_utils::api_url;
use crate::shared::config::ApiConfig;

/// Resources of one scan; the latest scan when `execution_id` is `None`
pub async fn fetch_resources(
    api: &ApiConfig,
    execution_id: Option<&str>,
) -> Result<Vec<Resource>, String> {
    let path = match execution_id {
        Some(id) => format!("{}/{}", api.resources_path, urlencoding::encode(id)),
        None => api.resources_path.clone(),
    };
    let url = api_url(&api.base_url, &path);

    let response = Request::get(&url)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let data: Vec<Resource> = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    Ok(data)
}

/// Asks the report service to email the current view
pub async fn send_report(
    api: &ApiConfig,
    request: &SendReportRequest,
) -> Result<SendReportResponse, String> {
    let url = api_url(&api.base_url, &api.send_report_path);

    let response = Request::post(&url)
        .json(request)
        .map_err(|e| format!("Failed to serialize request: {}", e))?
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    if !response.ok() {
        return Err(format!("HTTP error: {}", response.status()));
    }

    let data: SendReportResponse = response
        .json()
        .await
        .map_err(|e| format!("Failed to parse response: {}", e))?;

    Ok(data)
}
