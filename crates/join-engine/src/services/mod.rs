//! Service layer for the join engine.
//!
//! # Components
//!
//! - `backend` - `MeetingBackend` collaborator contract
//! - `http_backend` - dashboard REST implementation of `MeetingBackend`
//! - `launcher` - web + native-app link opening
//! - `orchestrator` - get-or-create flow with verify-after-create

pub mod backend;
pub mod http_backend;
pub mod launcher;
pub mod orchestrator;

pub use backend::MeetingBackend;
pub use http_backend::HttpMeetingBackend;
pub use launcher::{deep_link_for, LoggingLauncher, MeetingLauncher};
pub use orchestrator::{MeetingOrchestrator, SETTLE_DELAY};
