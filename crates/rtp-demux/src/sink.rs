//! Sink and observer interfaces
//!
//! Both are implemented by consumers outside the demuxer. The demuxer only
//! borrows them, so implementations use `&self` and keep any state behind
//! interior mutability.

use crate::packet::RtpPacketReceived;
use crate::{RtpPayloadType, RtpSsrc};

/// Receiver of demultiplexed RTP packets
pub trait RtpPacketSink {
    /// Called for every packet routed to this sink
    fn on_rtp_packet(&self, packet: &RtpPacketReceived);
}

/// Listener for SSRC bindings learned while demuxing
///
/// Observers are informational and cannot influence routing. `RtpDemuxer`
/// reports bindings resolved through an RSID; the remaining methods exist so one
/// observer can serve every binding source and default to doing nothing.
pub trait SsrcBindingObserver {
    /// An SSRC was bound to an RSID carried without a MID
    fn on_ssrc_bound_to_rsid(&self, rsid: &str, ssrc: RtpSsrc);

    /// An SSRC was bound to a MID
    fn on_ssrc_bound_to_mid(&self, _mid: &str, _ssrc: RtpSsrc) {}

    /// An SSRC was bound to an RSID scoped by a MID
    fn on_ssrc_bound_to_mid_rsid(&self, _mid: &str, _rsid: &str, _ssrc: RtpSsrc) {}

    /// An SSRC was bound to a payload type
    fn on_ssrc_bound_to_payload_type(&self, _payload_type: RtpPayloadType, _ssrc: RtpSsrc) {}
}

/// Address identity of two sinks
pub(crate) fn same_sink(a: &dyn RtpPacketSink, b: &dyn RtpPacketSink) -> bool {
    std::ptr::addr_eq(a, b)
}

/// Address identity of two observers
pub(crate) fn same_observer(a: &dyn SsrcBindingObserver, b: &dyn SsrcBindingObserver) -> bool {
    std::ptr::addr_eq(a, b)
}
