//! Opening a meeting on two channels.
//!
//! The web link always opens. When a numeric meeting number can be pulled
//! out of the link, a native-app deep link is attempted as well; if the
//! number cannot be found, or the native channel fails, that half is
//! skipped without surfacing anything to the user.

use crate::errors::LaunchError;
use regex::Regex;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Scheme and host of the native-app join link.
const NATIVE_JOIN_PREFIX: &str = "zoommtg://zoom.us/join?confno=";

/// Meeting number after `/j/`, `/s/`, `/w/`, `/wc/join/` or in a `confno=` query.
const MEETING_NUMBER_PATTERN: &str = r"(?:/(?:j|s|w|wc/join|wc)/|[?&]confno=)(\d{6,13})";

/// Meeting passcode query parameter.
const PASSCODE_PATTERN: &str = r"[?&]pwd=([^&#]+)";

/// Something that can open links for the user.
pub trait MeetingLauncher: Send + Sync {
    /// Open the web join link (a new browser tab in the dashboard).
    fn open_web(&self, url: &str) -> Result<(), LaunchError>;

    /// Open a native-app deep link.
    fn open_native(&self, deep_link: &str) -> Result<(), LaunchError>;
}

fn meeting_number_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MEETING_NUMBER_PATTERN).ok())
        .as_ref()
}

fn passcode_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PASSCODE_PATTERN).ok()).as_ref()
}

/// Numeric meeting number embedded in a join link.
pub fn extract_meeting_number(url: &str) -> Option<&str> {
    meeting_number_regex()?
        .captures(url)?
        .get(1)
        .map(|m| m.as_str())
}

/// Native-app deep link for a web join link, if a meeting number is present.
pub fn deep_link_for(url: &str) -> Option<String> {
    let number = extract_meeting_number(url)?;
    let passcode = passcode_regex()
        .and_then(|re| re.captures(url))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    Some(match passcode {
        Some(pwd) => format!("{NATIVE_JOIN_PREFIX}{number}&pwd={pwd}"),
        None => format!("{NATIVE_JOIN_PREFIX}{number}"),
    })
}

/// What `open_meeting` managed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LaunchReport {
    pub web_opened: bool,
    pub native_opened: bool,
}

/// Open `url` on the web channel and, best effort, on the native channel.
pub fn open_meeting(launcher: &dyn MeetingLauncher, url: &str) -> LaunchReport {
    let mut report = LaunchReport::default();

    match launcher.open_web(url) {
        Ok(()) => report.web_opened = true,
        Err(e) => {
            warn!(target: "join.launcher", error = %e, "Failed to open web link");
        }
    }

    match deep_link_for(url) {
        Some(deep_link) => match launcher.open_native(&deep_link) {
            Ok(()) => report.native_opened = true,
            Err(e) => {
                debug!(target: "join.launcher", error = %e, "Native app link not opened");
            }
        },
        None => {
            debug!(target: "join.launcher", "No meeting number in link, skipping native app");
        }
    }

    report
}

/// Launcher that only logs the links. Used by the command-line watcher.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingLauncher;

impl MeetingLauncher for LoggingLauncher {
    fn open_web(&self, url: &str) -> Result<(), LaunchError> {
        info!(target: "join.launcher", url = %url, "Open meeting in browser");
        Ok(())
    }

    fn open_native(&self, deep_link: &str) -> Result<(), LaunchError> {
        info!(target: "join.launcher", deep_link = %deep_link, "Open meeting in native app");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        fail_native: bool,
        opened: Mutex<Vec<String>>,
    }

    impl MeetingLauncher for Recorder {
        fn open_web(&self, url: &str) -> Result<(), LaunchError> {
            self.opened.lock().unwrap().push(format!("web:{url}"));
            Ok(())
        }

        fn open_native(&self, deep_link: &str) -> Result<(), LaunchError> {
            if self.fail_native {
                return Err(LaunchError::Failed("no handler".to_string()));
            }
            self.opened.lock().unwrap().push(format!("native:{deep_link}"));
            Ok(())
        }
    }

    #[test]
    fn test_extract_meeting_number() {
        assert_eq!(
            extract_meeting_number("https://us05web.zoom.us/j/83712345678?pwd=abc"),
            Some("83712345678")
        );
        assert_eq!(
            extract_meeting_number("https://zoom.us/s/9876543210"),
            Some("9876543210")
        );
        assert_eq!(
            extract_meeting_number("https://zoom.us/wc/join/123456789"),
            Some("123456789")
        );
        assert_eq!(
            extract_meeting_number("zoommtg://zoom.us/join?confno=123456789"),
            Some("123456789")
        );
        assert_eq!(extract_meeting_number("https://meet.example.com/room/abc"), None);
        assert_eq!(extract_meeting_number("https://zoom.us/j/12"), None);
    }

    #[test]
    fn test_deep_link_with_passcode() {
        assert_eq!(
            deep_link_for("https://us05web.zoom.us/j/83712345678?pwd=Xy12.1").as_deref(),
            Some("zoommtg://zoom.us/join?confno=83712345678&pwd=Xy12.1")
        );
        assert_eq!(
            deep_link_for("https://zoom.us/j/83712345678").as_deref(),
            Some("zoommtg://zoom.us/join?confno=83712345678")
        );
        assert_eq!(deep_link_for("https://meet.example.com/abc"), None);
    }

    #[test]
    fn test_open_meeting_uses_both_channels() {
        let launcher = Recorder::default();
        let report = open_meeting(&launcher, "https://zoom.us/j/123456789");

        assert_eq!(
            report,
            LaunchReport {
                web_opened: true,
                native_opened: true
            }
        );
        let opened = launcher.opened.lock().unwrap();
        assert_eq!(
            *opened,
            vec![
                "web:https://zoom.us/j/123456789".to_string(),
                "native:zoommtg://zoom.us/join?confno=123456789".to_string(),
            ]
        );
    }

    #[test]
    fn test_open_meeting_skips_native_without_number() {
        let launcher = Recorder::default();
        let report = open_meeting(&launcher, "https://meet.example.com/room/abc");

        assert!(report.web_opened);
        assert!(!report.native_opened);
        assert_eq!(launcher.opened.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_native_failure_is_swallowed() {
        let launcher = Recorder {
            fail_native: true,
            ..Recorder::default()
        };
        let report = open_meeting(&launcher, "https://zoom.us/j/123456789");

        assert!(report.web_opened);
        assert!(!report.native_opened);
    }
}
