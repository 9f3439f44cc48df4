use std::path::PathBuf;

use crate::modules::utils::time::format_detection_time;
use crate::modules::watcher::FileEvent;

/// A single outgoing email, fully formatted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    // File the notification is about, kept for error context
    pub path: PathBuf,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

impl Notification {
    /// Build the notification sent when `event` reports a new file
    pub fn for_created_file(event: &FileEvent, from: &str, to: &str) -> Self {
        let path = event.path.display().to_string();
        let detected_at = format_detection_time(&event.detected_at);

        let body = format!(
            "A new file was created in a watched folder.\n\
            \n\
            Path: {}\n\
            Detected at: {}\n\
            \n\
            This message was sent automatically by folder-notify.",
            path, detected_at
        );

        Self {
            path: event.path.clone(),
            from: from.to_string(),
            to: to.to_string(),
            subject: format!("New file created: {}", path),
            body,
        }
    }
}
