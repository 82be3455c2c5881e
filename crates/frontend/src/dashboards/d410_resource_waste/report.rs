//! "Email report" flow: recipients, one request at a time, outcome toast.

use std::cell::RefCell;

use async_trait::async_trait;
use contracts::dashboards::d410_resource_waste::{ColumnSchema, SendReportRequest, SendReportResponse};
use thiserror::Error;

use crate::shared::config::{ApiConfig, NotificationConfig, ReportConfig};
use crate::shared::history::{CookieBackend, CookieJar};

use super::api;
use super::store::FilterState;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("enter at least one email address")]
    EmptyRecipients,
    #[error("a report is already being sent")]
    InFlight,
    #[error("{0}")]
    Transport(String),
    #[error("report service refused the request: {}", .0.as_deref().unwrap_or("no reason given"))]
    Rejected(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// Transient toast; the UI drops it after `ttl_ms`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub ttl_ms: u32,
}

/// The one toast on screen. Each `show` takes a new ticket, so an expiring
/// timer only clears the toast it was started for, even when a newer toast
/// carries the same text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToastSlot {
    generation: u64,
    current: Option<(u64, Notification)>,
}

impl ToastSlot {
    pub fn show(&mut self, note: Notification) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        self.current = Some((self.generation, note));
        self.generation
    }

    /// Clears the toast if `ticket` still owns it
    pub fn expire(&mut self, ticket: u64) -> bool {
        match &self.current {
            Some((owner, _)) if *owner == ticket => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref().map(|(_, note)| note)
    }
}

#[async_trait(?Send)]
pub trait ReportTransport {
    async fn send(&self, request: &SendReportRequest) -> Result<SendReportResponse, String>;
}

/// `POST {send_report_path}` through gloo-net
pub struct HttpReportTransport {
    api: ApiConfig,
}

impl HttpReportTransport {
    pub fn new(api: ApiConfig) -> Self {
        Self { api }
    }
}

#[async_trait(?Send)]
impl ReportTransport for HttpReportTransport {
    async fn send(&self, request: &SendReportRequest) -> Result<SendReportResponse, String> {
        api::send_report(&self.api, request).await
    }
}

pub struct ReportSubmitter {
    /// Recipients of the request being sent
    in_flight: Option<String>,
    emails: String,
    cookie_name: String,
    cookie_ttl_days: u32,
    notification_ttl_ms: u32,
}

impl ReportSubmitter {
    pub fn new(report: &ReportConfig, notifications: &NotificationConfig) -> Self {
        Self {
            in_flight: None,
            emails: String::new(),
            cookie_name: report.cookie_name.clone(),
            cookie_ttl_days: report.cookie_ttl_days,
            notification_ttl_ms: notifications.ttl_ms,
        }
    }

    /// Pre-fills the recipients saved by the last successful send
    pub fn prefill<C: CookieBackend>(&mut self, cookies: &CookieJar<C>) {
        if let Some(saved) = cookies.get_cookie(&self.cookie_name) {
            self.emails = saved;
        }
    }

    pub fn emails(&self) -> &str {
        &self.emails
    }

    pub fn set_emails(&mut self, emails: &str) {
        self.emails = emails.to_string();
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.can_submit_with(&self.emails)
    }

    /// Same check against recipients still being typed
    pub fn can_submit_with(&self, emails: &str) -> bool {
        self.in_flight.is_none() && !emails.trim().is_empty()
    }

    /// Builds the request for the current view and marks the submission in
    /// flight. Nothing is sent when this fails.
    pub fn prepare(
        &mut self,
        emails: &str,
        snapshot: &FilterState,
        columns: &ColumnSchema,
    ) -> Result<SendReportRequest, SubmitError> {
        if self.in_flight.is_some() {
            return Err(SubmitError::InFlight);
        }
        let emails = emails.trim();
        if emails.is_empty() {
            return Err(SubmitError::EmptyRecipients);
        }

        self.emails = emails.to_string();
        self.in_flight = Some(self.emails.clone());

        Ok(SendReportRequest {
            to_emails: self.emails.clone(),
            execution_id: snapshot.execution_id.clone(),
            resource_type: snapshot.current_resource.clone(),
            filters: snapshot.filters.clone(),
            search: snapshot.table.search_text.clone(),
            columns: columns.names(),
        })
    }

    /// Ends the in-flight submission. Recipients are remembered in a cookie
    /// and the field is cleared only when the service confirmed the send.
    pub fn complete<C: CookieBackend>(
        &mut self,
        outcome: Result<SendReportResponse, SubmitError>,
        cookies: &CookieJar<C>,
    ) -> Notification {
        let recipients = self.in_flight.take().unwrap_or_default();

        let outcome = outcome.and_then(|response| {
            if response.is_success() {
                Ok(response)
            } else {
                Err(SubmitError::Rejected(response.message))
            }
        });

        match outcome {
            Ok(_) => {
                cookies.set_cookie(&self.cookie_name, &recipients, self.cookie_ttl_days);
                self.emails.clear();
                log::info!("report: sent");
                self.notification(NotificationKind::Success, "Report sent successfully".to_string())
            }
            Err(e) => {
                log::error!("report: send failed: {}", e);
                self.notification(NotificationKind::Error, format!("Failed to send report: {}", e))
            }
        }
    }

    fn notification(&self, kind: NotificationKind, message: String) -> Notification {
        Notification {
            kind,
            message,
            ttl_ms: self.notification_ttl_ms,
        }
    }
}

/// Runs one submission end to end.
///
/// The `RefCell` is never borrowed across the network await, so the UI can
/// read `can_submit()` while the request is pending.
pub async fn submit<T, C>(
    submitter: &RefCell<ReportSubmitter>,
    transport: &T,
    emails: &str,
    snapshot: &FilterState,
    columns: &ColumnSchema,
    cookies: &CookieJar<C>,
) -> Result<Notification, SubmitError>
where
    T: ReportTransport + ?Sized,
    C: CookieBackend,
{
    let request = submitter.borrow_mut().prepare(emails, snapshot, columns)?;
    let outcome = transport
        .send(&request)
        .await
        .map_err(SubmitError::Transport);
    Ok(submitter.borrow_mut().complete(outcome, cookies))
}
