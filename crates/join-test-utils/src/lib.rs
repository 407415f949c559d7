//! # Join Test Utilities
//!
//! Mocks and fixtures for testing the join engine without a dashboard API.
//!
//! ## Modules
//!
//! - `mock_backend` - Scriptable `MeetingBackend` that records every call
//! - `mock_launcher` - `MeetingLauncher` that records opened links
//! - `clock` - Manually advanced clock
//! - `fixtures` - Session and meeting builders
//!
//! ## Usage
//!
//! ```rust,ignore
//! use join_test_utils::*;
//!
//! #[tokio::test(start_paused = true)]
//! async fn test_example() {
//!     let backend = Arc::new(MockMeetingBackend::new().with_created(test_meeting("m-1")));
//!     let launcher = Arc::new(RecordingLauncher::new());
//!     let orchestrator = MeetingOrchestrator::new(backend.clone(), launcher.clone());
//!
//!     // Run your test...
//!     assert_eq!(backend.create_calls(), 1);
//! }
//! ```

pub mod clock;
pub mod fixtures;
pub mod mock_backend;
pub mod mock_launcher;

pub use clock::*;
pub use fixtures::*;
pub use mock_backend::*;
pub use mock_launcher::*;
