// catalog_kit/src/services/mod.rs

//! Services injected into the controller, the commands and the import session.

pub mod auth;
pub mod notify;

pub use auth::{AuthService, Credentials, CurrentUser, HttpAuthService, Role, StaticTokenAuth};
pub use notify::{MemoryNotificationSink, Notification, NotificationLevel, NotificationSink, TracingNotificationSink};
