//! Outbound integrations: the request backend and the notification channel.

pub mod api;
pub mod notifications;

pub use api::{ApiClientError, RequestGateway, TransportApiClient};
pub use notifications::{Notification, NotificationBus, NotificationKind, NotificationLevel};
