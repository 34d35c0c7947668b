//! Desktop notifications for finished and failed downloads

use notify_rust::{Notification, Timeout};
use std::time::Duration;
use tracing::{debug, warn};

/// Application name shown by the notification daemon
pub const APP_NAME: &str = "vidfetch";

/// How long a notification stays on screen
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(10);

/// Fire-and-forget notification delivery
///
/// Implementations must never fail or panic into the caller.
pub trait Notifier: Send + Sync {
    fn notify(&self, title: &str, message: &str);
}

/// Sends notifications through the platform notification service
#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    app_name: String,
    timeout: Duration,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            timeout: NOTIFICATION_TIMEOUT,
        }
    }

    fn deliver(app_name: &str, timeout: Duration, title: &str, message: &str) {
        let millis = u32::try_from(timeout.as_millis()).unwrap_or(u32::MAX);
        if let Err(e) = Notification::new()
            .appname(app_name)
            .summary(title)
            .body(message)
            .timeout(Timeout::Milliseconds(millis))
            .show()
        {
            warn!("Failed to deliver notification '{}': {}", title, e);
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, title: &str, message: &str) {
        let app_name = self.app_name.clone();
        let timeout = self.timeout;
        let title = title.to_string();
        let message = message.to_string();

        // Delivery talks to the session bus and may block
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn_blocking(move || Self::deliver(&app_name, timeout, &title, &message));
            }
            Err(_) => Self::deliver(&app_name, timeout, &title, &message),
        }
    }
}

/// Drops notifications; used with `--no-notify`
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, title: &str, message: &str) {
        debug!("Notification suppressed: {} - {}", title, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_notifier_identity() {
        let notifier = DesktopNotifier::new();
        assert_eq!(notifier.app_name, "vidfetch");
        assert_eq!(notifier.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_silent_notifier_never_fails() {
        SilentNotifier.notify("Download Complete", "Successfully downloaded: x");
    }
}
