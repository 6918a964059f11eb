/// Severity or category for user-visible notifications.
///
/// These are transient toasts (e.g. a config that could not be saved). Fetch
/// failures are not reported this way; they live in the alerts panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationType {
    /// Indicates a non-critical issue that the user should be aware of, but
    /// does not prevent normal operation.
    Warning,
    /// Indicates an error or failure that may affect functionality.
    Error,
}

/// A notification payload intended for the user interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    /// The type/severity of the notification, determining its visual style.
    pub notification_type: NotificationType,
    /// The text content to display to the user.
    pub message: String,
}
