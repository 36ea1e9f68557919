//! Received RTP packet view
//!
//! The demuxer does not parse wire data. `RtpPacketReceived` is the already parsed
//! form handed over by the transport: fixed header fields, payload, and the SDES
//! header extension values that matter for routing.

use bytes::Bytes;

use crate::extensions::SdesExtension;
use crate::{RtpPayloadType, RtpSequenceNumber, RtpSsrc, RtpTimestamp};

/// A parsed, received RTP packet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RtpPacketReceived {
    ssrc: RtpSsrc,
    payload_type: RtpPayloadType,
    sequence_number: RtpSequenceNumber,
    timestamp: RtpTimestamp,
    marker: bool,
    payload: Bytes,
    mid: Option<String>,
    rsid: Option<String>,
    repaired_rsid: Option<String>,
}

impl RtpPacketReceived {
    /// Create a packet with the given SSRC and no extensions
    pub fn new(ssrc: RtpSsrc) -> Self {
        Self {
            ssrc,
            ..Default::default()
        }
    }

    /// Set the payload type (only the low 7 bits are kept)
    pub fn with_payload_type(mut self, payload_type: RtpPayloadType) -> Self {
        self.payload_type = payload_type & 0x7f;
        self
    }

    /// Set the sequence number
    pub fn with_sequence_number(mut self, sequence_number: RtpSequenceNumber) -> Self {
        self.sequence_number = sequence_number;
        self
    }

    /// Set the RTP timestamp
    pub fn with_timestamp(mut self, timestamp: RtpTimestamp) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Set the marker bit
    pub fn with_marker(mut self, marker: bool) -> Self {
        self.marker = marker;
        self
    }

    /// Set the payload
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = payload.into();
        self
    }

    /// Attach an SDES header extension value
    ///
    /// A transport that resolved the negotiated extension URI with
    /// `SdesExtension::from_uri` hands the parsed value over here.
    pub fn with_extension(mut self, extension: SdesExtension, value: impl Into<String>) -> Self {
        *self.extension_slot(extension) = Some(value.into());
        self
    }

    /// Attach a MID header extension value
    pub fn with_mid(self, mid: impl Into<String>) -> Self {
        self.with_extension(SdesExtension::Mid, mid)
    }

    /// Attach an RtpStreamId header extension value
    pub fn with_rsid(self, rsid: impl Into<String>) -> Self {
        self.with_extension(SdesExtension::RtpStreamId, rsid)
    }

    /// Attach a RepairedRtpStreamId header extension value
    pub fn with_repaired_rsid(self, repaired_rsid: impl Into<String>) -> Self {
        self.with_extension(SdesExtension::RepairedRtpStreamId, repaired_rsid)
    }

    fn extension_slot(&mut self, extension: SdesExtension) -> &mut Option<String> {
        match extension {
            SdesExtension::Mid => &mut self.mid,
            SdesExtension::RtpStreamId => &mut self.rsid,
            SdesExtension::RepairedRtpStreamId => &mut self.repaired_rsid,
        }
    }

    /// Value of an SDES header extension, if present
    pub fn extension(&self, extension: SdesExtension) -> Option<&str> {
        match extension {
            SdesExtension::Mid => self.mid.as_deref(),
            SdesExtension::RtpStreamId => self.rsid.as_deref(),
            SdesExtension::RepairedRtpStreamId => self.repaired_rsid.as_deref(),
        }
    }

    pub fn ssrc(&self) -> RtpSsrc {
        self.ssrc
    }

    pub fn payload_type(&self) -> RtpPayloadType {
        self.payload_type
    }

    pub fn sequence_number(&self) -> RtpSequenceNumber {
        self.sequence_number
    }

    pub fn timestamp(&self) -> RtpTimestamp {
        self.timestamp
    }

    pub fn marker(&self) -> bool {
        self.marker
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// MID header extension value, if present
    pub fn mid(&self) -> Option<&str> {
        self.extension(SdesExtension::Mid)
    }

    /// RtpStreamId header extension value, if present
    pub fn rsid(&self) -> Option<&str> {
        self.extension(SdesExtension::RtpStreamId)
    }

    /// RepairedRtpStreamId header extension value, if present
    pub fn repaired_rsid(&self) -> Option<&str> {
        self.extension(SdesExtension::RepairedRtpStreamId)
    }

    /// The stream id used for demuxing
    ///
    /// A repair stream identifies its layer through the repaired stream id, so
    /// either extension names the same RSID. RtpStreamId wins if both are set.
    pub fn stream_id(&self) -> Option<&str> {
        self.rsid().or(self.repaired_rsid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packet_builder() {
        let packet = RtpPacketReceived::new(0x12345678)
            .with_payload_type(96)
            .with_sequence_number(7)
            .with_timestamp(90000)
            .with_marker(true)
            .with_payload(Bytes::from_static(b"\x01\x02"))
            .with_mid("v");

        assert_eq!(packet.ssrc(), 0x12345678);
        assert_eq!(packet.payload_type(), 96);
        assert_eq!(packet.sequence_number(), 7);
        assert_eq!(packet.timestamp(), 90000);
        assert!(packet.marker());
        assert_eq!(packet.payload().as_ref(), &[1, 2]);
        assert_eq!(packet.mid(), Some("v"));
        assert_eq!(packet.rsid(), None);
    }

    #[test]
    fn test_payload_type_masked_to_seven_bits() {
        let packet = RtpPacketReceived::new(1).with_payload_type(0x80 | 100);
        assert_eq!(packet.payload_type(), 100);
    }

    #[test]
    fn test_stream_id_prefers_rsid() {
        let packet = RtpPacketReceived::new(1).with_repaired_rsid("r");
        assert_eq!(packet.stream_id(), Some("r"));

        let packet = packet.with_rsid("s");
        assert_eq!(packet.stream_id(), Some("s"));

        assert_eq!(RtpPacketReceived::new(1).stream_id(), None);
    }

    #[test]
    fn test_extensions_resolved_from_negotiated_uris() {
        let negotiated = [
            ("urn:ietf:params:rtp-hdrext:sdes:mid", "audio"),
            ("urn:ietf:params:rtp-hdrext:toffset", "ignored"),
            ("urn:ietf:params:rtp-hdrext:sdes:repaired-rtp-stream-id", "lo"),
        ];

        let packet = negotiated
            .into_iter()
            .fold(RtpPacketReceived::new(3), |packet, (uri, value)| {
                match SdesExtension::from_uri(uri) {
                    Some(extension) => packet.with_extension(extension, value),
                    None => packet,
                }
            });

        assert_eq!(packet.mid(), Some("audio"));
        assert_eq!(packet.rsid(), None);
        assert_eq!(packet.extension(SdesExtension::RepairedRtpStreamId), Some("lo"));
        assert_eq!(packet.stream_id(), Some("lo"));
    }
}
