//! Configuration types

use std::time::Duration;

/// Configuration for the client data layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    /// Entries older than this are treated as stale and refetched on next
    /// access, even when never explicitly invalidated.
    pub stale_after: Duration,
    /// Default page size for list reads (posts, notifications).
    pub page_size: usize,
    /// Buffer capacity of the realtime change feed channel.
    pub feed_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(60),
            page_size: 20,
            feed_buffer: 256,
        }
    }
}

impl SyncConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the staleness threshold.
    pub fn with_stale_after(mut self, stale_after: Duration) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Set the default list page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the change feed buffer capacity.
    pub fn with_feed_buffer(mut self, feed_buffer: usize) -> Self {
        self.feed_buffer = feed_buffer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SyncConfig::new()
            .with_stale_after(Duration::from_secs(120))
            .with_page_size(50)
            .with_feed_buffer(64);

        assert_eq!(config.stale_after, Duration::from_secs(120));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.feed_buffer, 64);
    }

    #[test]
    fn test_config_defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.stale_after, Duration::from_secs(60));
        assert!(config.page_size > 0);
        assert!(config.feed_buffer > 0);
    }
}
