//! In-process notification channel backed by `tokio::sync::broadcast`.
//!
//! Portals subscribe to a [`NotificationBus`] to learn about submitted
//! requests and status changes as they happen.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tracing::trace;

use crate::domain::{RequestStatus, SubmittedRequest};
use crate::util::generate_id;

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 256;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationKind {
    RequestSubmitted { request_id: String, estimated_cost: u64 },
    SubmissionFailed { reason: String },
    StatusChanged { request_id: String, status: RequestStatus },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    #[serde(flatten)]
    pub kind: NotificationKind,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

impl Notification {
    pub fn new(
        level: NotificationLevel,
        title: impl Into<String>,
        message: impl Into<String>,
        kind: NotificationKind,
    ) -> Self {
        Self {
            id: generate_id("notice"),
            level,
            title: title.into(),
            message: message.into(),
            kind,
            timestamp: OffsetDateTime::now_utc(),
        }
    }

    pub fn submitted(record: &SubmittedRequest) -> Self {
        let route = format!(
            "{} → {}",
            record.request.pickup_location.trim(),
            record.request.drop_location.trim()
        );
        Self::new(
            NotificationLevel::Success,
            "Transport request submitted",
            format!("{route}, estimated cost {}", record.estimated_cost),
            NotificationKind::RequestSubmitted {
                request_id: record.id.clone(),
                estimated_cost: record.estimated_cost,
            },
        )
    }

    pub fn submission_failed(reason: impl Into<String>) -> Self {
        let reason = reason.into();
        Self::new(
            NotificationLevel::Error,
            "Submission failed",
            reason.clone(),
            NotificationKind::SubmissionFailed { reason },
        )
    }

    pub fn status_changed(request_id: impl Into<String>, status: RequestStatus) -> Self {
        let request_id = request_id.into();
        let level = match status {
            RequestStatus::Cancelled | RequestStatus::Rejected => NotificationLevel::Warning,
            RequestStatus::Delivered => NotificationLevel::Success,
            _ => NotificationLevel::Info,
        };
        Self::new(
            level,
            "Request status updated",
            format!("Request {request_id} is now {}", status.label()),
            NotificationKind::StatusChanged { request_id, status },
        )
    }
}

/// Fan-out bus: every subscriber receives every published notification.
///
/// When the buffer is full, slow receivers lose the oldest entries and
/// observe `RecvError::Lagged`.
#[derive(Clone)]
pub struct NotificationBus {
    sender: broadcast::Sender<Notification>,
}

impl NotificationBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishing with no subscribers drops the notification.
    pub fn publish(&self, notification: Notification) {
        trace!(id = %notification.id, title = %notification.title, "publishing notification");
        let _ = self.sender.send(notification);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
