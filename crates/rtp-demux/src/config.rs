//! Demuxer configuration
//!
//! This module defines the configuration for an `RtpDemuxer` and a builder for it.

use serde::{Deserialize, Serialize};

use crate::error::{DemuxError, Result};

/// Default session identifier used in log output
pub const DEFAULT_SESSION_ID: &str = "rtp-session";

/// RTP demuxer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtpDemuxerConfig {
    /// Identifier of the RTP session, attached to every log line
    pub session_id: String,
    /// Log dropped packets at debug level instead of trace
    pub log_dropped_packets: bool,
}

impl Default for RtpDemuxerConfig {
    fn default() -> Self {
        Self {
            session_id: DEFAULT_SESSION_ID.to_string(),
            log_dropped_packets: false,
        }
    }
}

impl RtpDemuxerConfig {
    /// Check the configuration for obviously unusable values
    pub fn validate(&self) -> Result<()> {
        if self.session_id.trim().is_empty() {
            return Err(DemuxError::invalid_config("session id must not be empty"));
        }
        Ok(())
    }
}

/// Builder for RtpDemuxerConfig
#[derive(Debug, Clone, Default)]
pub struct RtpDemuxerConfigBuilder {
    /// Configuration being built
    config: RtpDemuxerConfig,
}

impl RtpDemuxerConfigBuilder {
    /// Create a new builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session identifier
    pub fn session_id(mut self, session_id: impl Into<String>) -> Self {
        self.config.session_id = session_id.into();
        self
    }

    /// Log dropped packets at debug level
    pub fn log_dropped_packets(mut self, enabled: bool) -> Self {
        self.config.log_dropped_packets = enabled;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<RtpDemuxerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = RtpDemuxerConfigBuilder::new().build().unwrap();
        assert_eq!(config, RtpDemuxerConfig::default());
        assert_eq!(config.session_id, DEFAULT_SESSION_ID);
        assert!(!config.log_dropped_packets);
    }

    #[test]
    fn test_builder_rejects_empty_session_id() {
        let err = RtpDemuxerConfigBuilder::new().session_id("  ").build().unwrap_err();
        assert!(matches!(err, DemuxError::InvalidConfig { .. }));
    }

    #[test]
    fn test_deserialize_partial() {
        let config: RtpDemuxerConfig =
            serde_json::from_str(r#"{"log_dropped_packets": true}"#).unwrap();
        assert_eq!(config.session_id, DEFAULT_SESSION_ID);
        assert!(config.log_dropped_packets);
    }
}
