//! Video meeting subsystem.

pub mod traits;
pub mod zoom;

pub use traits::{Meeting, MeetingProvider};

use crate::config::ZoomConfig;

/// Factory: create the configured meeting provider.
pub fn create_meeting_provider(config: &ZoomConfig) -> Box<dyn MeetingProvider> {
    Box::new(zoom::ZoomMeetings::new(config))
}
