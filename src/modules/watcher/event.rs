use std::path::PathBuf;

use chrono::{DateTime, Local};
use notify::event::CreateKind;
use notify::EventKind;

use crate::modules::utils::time;

/// A file that appeared under the watched tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEvent {
    /// Absolute path of the new file.
    pub path: PathBuf,

    /// When the watcher saw the event.
    pub detected_at: DateTime<Local>,
}

impl FileEvent {
    /// Create an event detected right now.
    pub fn now(path: impl Into<PathBuf>) -> Self {
        Self::at(path, time::now())
    }

    /// Create an event with an explicit detection time.
    pub fn at(path: impl Into<PathBuf>, detected_at: DateTime<Local>) -> Self {
        Self {
            path: path.into(),
            detected_at,
        }
    }
}

/// Extract file creations from a raw `notify` event.
///
/// Directory creations and every non-creation kind are dropped.
pub fn created_files(event: &notify::Event) -> Vec<FileEvent> {
    match event.kind {
        EventKind::Create(CreateKind::Folder) => Vec::new(),
        EventKind::Create(_) => {
            let detected_at = time::now();
            event
                .paths
                .iter()
                .map(|path| FileEvent::at(path.clone(), detected_at))
                .collect()
        }
        _ => Vec::new(),
    }
}
