//! Recording launcher.

use join_engine::errors::LaunchError;
use join_engine::services::MeetingLauncher;
use std::sync::Mutex;

/// One opened link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchEvent {
    Web(String),
    Native(String),
}

/// `MeetingLauncher` that records every link instead of opening it.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    fail_native: bool,
    events: Mutex<Vec<LaunchEvent>>,
}

impl RecordingLauncher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher whose native channel always fails.
    #[must_use]
    pub fn without_native_app() -> Self {
        Self {
            fail_native: true,
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<LaunchEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn web_urls(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LaunchEvent::Web(url) => Some(url),
                LaunchEvent::Native(_) => None,
            })
            .collect()
    }

    pub fn native_links(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                LaunchEvent::Native(link) => Some(link),
                LaunchEvent::Web(_) => None,
            })
            .collect()
    }
}

impl MeetingLauncher for RecordingLauncher {
    fn open_web(&self, url: &str) -> Result<(), LaunchError> {
        self.events
            .lock()
            .unwrap()
            .push(LaunchEvent::Web(url.to_string()));
        Ok(())
    }

    fn open_native(&self, deep_link: &str) -> Result<(), LaunchError> {
        if self.fail_native {
            return Err(LaunchError::Failed("native app not installed".to_string()));
        }
        self.events
            .lock()
            .unwrap()
            .push(LaunchEvent::Native(deep_link.to_string()));
        Ok(())
    }
}
