//! Error types for the RTP demuxer
//!
//! Only validation failures are represented here. Routing outcomes (a conflict
//! on `add_sink`, a dropped packet) are plain `bool` results, and API misuse is
//! fatal, so a `DemuxError` never crosses the registration boundary as a
//! recoverable error.

use thiserror::Error;

/// Result type alias for demuxer validation
pub type Result<T> = std::result::Result<T, DemuxError>;

/// Validation errors for demuxer criteria and configuration
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DemuxError {
    /// Criteria specifies no MID, RSID, SSRC or payload type
    #[error("Demuxer criteria must specify at least one of MID, RSID, SSRC or payload type")]
    EmptyCriteria,

    /// MID is not a legal token
    #[error("Illegal MID value: {mid:?}")]
    IllegalMid { mid: String },

    /// RSID is not a legal token
    #[error("Illegal RSID value: {rsid:?}")]
    IllegalRsid { rsid: String },

    /// Payload type does not fit the 7-bit RTP header field
    #[error("Illegal payload type: {payload_type}")]
    IllegalPayloadType { payload_type: u8 },

    /// Invalid demuxer configuration
    #[error("Invalid demuxer configuration: {details}")]
    InvalidConfig { details: String },
}

impl DemuxError {
    /// Create a new illegal MID error
    pub fn illegal_mid(mid: impl Into<String>) -> Self {
        Self::IllegalMid { mid: mid.into() }
    }

    /// Create a new illegal RSID error
    pub fn illegal_rsid(rsid: impl Into<String>) -> Self {
        Self::IllegalRsid { rsid: rsid.into() }
    }

    /// Create a new illegal payload type error
    pub fn illegal_payload_type(payload_type: u8) -> Self {
        Self::IllegalPayloadType { payload_type }
    }

    /// Create a new invalid configuration error
    pub fn invalid_config(details: impl Into<String>) -> Self {
        Self::InvalidConfig {
            details: details.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DemuxError::illegal_rsid("a b").to_string(),
            "Illegal RSID value: \"a b\""
        );
        assert_eq!(
            DemuxError::invalid_config("session id is empty").to_string(),
            "Invalid demuxer configuration: session id is empty"
        );
        assert_eq!(
            DemuxError::illegal_payload_type(200).to_string(),
            "Illegal payload type: 200"
        );
        assert!(DemuxError::EmptyCriteria.to_string().contains("at least one"));
    }
}
