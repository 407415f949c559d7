//! Join Engine Library
//!
//! Decides, for one scheduled tutoring/counseling session, whether the
//! current user may join or create its video meeting right now, what the
//! join button should say, and performs the get-or-create-then-open flow
//! when the button is pressed.
//!
//! # Architecture
//!
//! ```text
//! JoinAvailabilityEngine (one per displayed session)
//! ├── window          time window -> AvailabilityState
//! ├── authorization   (state, role, has_meeting) -> allowed
//! ├── presentation    ButtonView (label, icon, disabled)
//! └── MeetingOrchestrator
//!     ├── MeetingBackend   create / fetch / update / delete / fallback patch
//!     └── MeetingLauncher  web link + native deep link
//! EngineTasks
//! ├── recompute       availability every 60s
//! └── status_watcher  meeting status changes (push or poll)
//! ```
//!
//! # Modules
//!
//! - [`engine`] - Per-session state, busy flag and view publishing
//! - [`services`] - Backend port, HTTP adapter, launcher and orchestration
//! - [`tasks`] - Background recompute and status feeds
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error taxonomy with user-facing messages

pub mod authorization;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod models;
pub mod observability;
pub mod presentation;
pub mod services;
pub mod tasks;
pub mod window;
