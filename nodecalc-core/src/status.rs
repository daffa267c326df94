//! Error Banner
//!
//! The presentation layer shows the message of the last failed operation
//! for a fixed number of frames, fading it out as it expires. Messages do
//! not stack: a new error replaces the current one and restarts the timer.

use crate::config::GraphConfig;
use crate::error::CoreError;

/// A transient error message with a frame countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorBanner {
    message: String,
    remaining: u32,
    total: u32,
}

impl ErrorBanner {
    /// Create an empty banner whose messages last `total` ticks.
    pub fn new(total: u32) -> Self {
        Self {
            message: String::new(),
            remaining: 0,
            total,
        }
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self::new(config.error_display_ticks)
    }

    /// Show the error's message, replacing whatever is displayed.
    pub fn report(&mut self, error: &CoreError) {
        self.show(error.to_string());
    }

    pub fn show(&mut self, message: impl Into<String>) {
        self.message = message.into();
        self.remaining = self.total;
    }

    /// Advance one frame.
    pub fn tick(&mut self) {
        self.remaining = self.remaining.saturating_sub(1);
    }

    /// The message, while it is still visible.
    pub fn message(&self) -> Option<&str> {
        (self.remaining > 0).then_some(self.message.as_str())
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Fraction of the display time left, from 1.0 down to 0.0.
    pub fn opacity(&self) -> f32 {
        if self.total == 0 {
            return 0.0;
        }
        self.remaining as f32 / self.total as f32
    }
}

impl Default for ErrorBanner {
    fn default() -> Self {
        Self::from_config(&GraphConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_banner_shows_nothing() {
        let banner = ErrorBanner::default();
        assert_eq!(banner.message(), None);
        assert_eq!(banner.opacity(), 0.0);
    }

    #[test]
    fn message_expires_after_total_ticks() {
        let mut banner = ErrorBanner::new(3);
        banner.report(&CoreError::UnknownFunction("log".to_string()));
        assert_eq!(banner.message(), Some("Unknown function: log"));
        assert_eq!(banner.opacity(), 1.0);

        banner.tick();
        banner.tick();
        assert!(banner.message().is_some());
        banner.tick();
        assert_eq!(banner.message(), None);

        // Ticking an expired banner is harmless
        banner.tick();
        assert_eq!(banner.remaining(), 0);
    }

    #[test]
    fn new_error_replaces_and_resets() {
        let mut banner = ErrorBanner::new(10);
        banner.show("first");
        for _ in 0..7 {
            banner.tick();
        }
        banner.report(&CoreError::Cycle { limit: 100 });
        assert_eq!(banner.remaining(), 10);
        assert!(banner.message().unwrap().starts_with("Cyclical referencing error"));
    }

    #[test]
    fn default_uses_configured_duration() {
        let mut banner = ErrorBanner::default();
        banner.show("x");
        assert_eq!(banner.remaining(), 300);
    }
}
