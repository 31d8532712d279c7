//! Environment flags detected once at init.

use crate::config::OrchestratorConfig;
use crate::host::Host;

pub const REDUCED_MOTION_QUERY: &str = "(prefers-reduced-motion: reduce)";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Environment {
    /// The platform asks for minimized non-essential animation.
    pub reduced_motion: bool,
    /// Viewport at or below the narrow breakpoint.
    pub narrow_viewport: bool,
}

impl Environment {
    #[must_use]
    pub fn detect(host: &dyn Host, config: &OrchestratorConfig) -> Self {
        Self {
            reduced_motion: host.matches_media(REDUCED_MOTION_QUERY),
            narrow_viewport: host.matches_media(&config.narrow_query()),
        }
    }
}
