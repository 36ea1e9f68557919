//! Demuxer criteria
//!
//! Describes which packets belong to one sink, as produced by session
//! negotiation: a MID, RTP stream ids scoped by that MID, signaled SSRCs and
//! payload types.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DemuxError, Result};
use crate::extensions::SdesExtension;
use crate::{RtpPayloadType, RtpSsrc};

/// Largest payload type the RTP header can carry
const MAX_PAYLOAD_TYPE: RtpPayloadType = 0x7f;

/// Criteria used to match packets to a specific sink
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtpDemuxerCriteria {
    /// Media identifier, empty if not specified
    pub mid: String,

    /// RTP stream ids, scoped by `mid` (an empty `mid` is its own scope)
    pub rsids: BTreeSet<String>,

    /// Signaled SSRCs
    pub ssrcs: BTreeSet<RtpSsrc>,

    /// Payload types (7-bit), possibly shared with other sinks
    pub payload_types: BTreeSet<RtpPayloadType>,
}

impl RtpDemuxerCriteria {
    /// Create empty criteria
    pub fn new() -> Self {
        Self::default()
    }

    /// Criteria matching a single SSRC
    pub fn for_ssrc(ssrc: RtpSsrc) -> Self {
        Self::new().with_ssrc(ssrc)
    }

    /// Criteria matching a single RSID outside any MID scope
    pub fn for_rsid(rsid: impl Into<String>) -> Self {
        Self::new().with_rsid(rsid)
    }

    /// Criteria matching a single MID
    pub fn for_mid(mid: impl Into<String>) -> Self {
        Self::new().with_mid(mid)
    }

    /// Set the MID
    pub fn with_mid(mut self, mid: impl Into<String>) -> Self {
        self.mid = mid.into();
        self
    }

    /// Add an RSID
    pub fn with_rsid(mut self, rsid: impl Into<String>) -> Self {
        self.rsids.insert(rsid.into());
        self
    }

    /// Add an SSRC
    pub fn with_ssrc(mut self, ssrc: RtpSsrc) -> Self {
        self.ssrcs.insert(ssrc);
        self
    }

    /// Add a payload type
    pub fn with_payload_type(mut self, payload_type: RtpPayloadType) -> Self {
        self.payload_types.insert(payload_type);
        self
    }

    /// True if no attribute is specified
    pub fn is_empty(&self) -> bool {
        self.mid.is_empty()
            && self.rsids.is_empty()
            && self.ssrcs.is_empty()
            && self.payload_types.is_empty()
    }

    /// Check the criteria can be registered
    pub fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(DemuxError::EmptyCriteria);
        }
        if !self.mid.is_empty() && !SdesExtension::Mid.is_legal_value(&self.mid) {
            return Err(DemuxError::illegal_mid(self.mid.as_str()));
        }
        if let Some(rsid) = self
            .rsids
            .iter()
            .find(|rsid| !SdesExtension::RtpStreamId.is_legal_value(rsid))
        {
            return Err(DemuxError::illegal_rsid(rsid.as_str()));
        }
        if let Some(&payload_type) = self.payload_types.iter().find(|&&pt| pt > MAX_PAYLOAD_TYPE) {
            return Err(DemuxError::illegal_payload_type(payload_type));
        }
        Ok(())
    }
}

impl fmt::Display for RtpDemuxerCriteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn list<T: fmt::Display>(items: impl IntoIterator<Item = T>) -> String {
            items
                .into_iter()
                .map(|item| item.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }

        write!(
            f,
            "{{mid: {}, rsids: [{}], ssrcs: [{}], payload_types: [{}]}}",
            if self.mid.is_empty() { "<empty>" } else { self.mid.as_str() },
            list(&self.rsids),
            list(&self.ssrcs),
            list(&self.payload_types),
        )
    }
}
