//! RTP demuxer
//!
//! Routes the RTP packets of a single RTP session (one SSRC space, RFC 7656) to
//! the sinks registered for them. The demuxer is not thread aware; every call
//! must be serialized by the owner, typically the session's network task.
//!
//! A packet is resolved by the first stage that matches:
//!
//! 1. MID header extension. An unknown MID drops the packet right away (BUNDLE
//!    rule); a MID registered by exactly one sink routes to it. A MID shared by
//!    several sinks is ambiguous and falls through.
//! 2. SSRC, either signaled through `add_sink` or learned from an earlier packet.
//! 3. Payload type, if exactly one sink registered it.
//! 4. RTP stream id (or repaired stream id), scoped by the packet's MID.
//!
//! Stages 1, 3 and 4 bind the packet's SSRC to the resolved sink, so later
//! packets of the same stream take the single lookup of stage 2. Bindings
//! learned through an RSID are reported to the registered
//! [`SsrcBindingObserver`]s.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, trace, warn};

use crate::config::RtpDemuxerConfig;
use crate::criteria::RtpDemuxerCriteria;
use crate::extensions::SdesExtension;
use crate::packet::RtpPacketReceived;
use crate::sink::{same_observer, same_sink, RtpPacketSink, SsrcBindingObserver};
use crate::{RtpPayloadType, RtpSsrc};

/// Outcome of the MID stage
enum MidMatch<'a> {
    /// No sink registered the MID, the packet must be dropped
    Unknown,
    /// Exactly one sink registered the MID
    Unique(&'a dyn RtpPacketSink),
    /// Several sinks registered the MID
    Ambiguous,
}

/// RTP packet demultiplexer for one RTP session
///
/// Sinks and observers are borrowed, never owned. The borrow keeps them alive
/// while registered; `remove_sink` drops every trace of a sink, including SSRC
/// bindings learned for it.
pub struct RtpDemuxer<'a> {
    config: RtpDemuxerConfig,

    /// MID -> every distinct sink registered with that MID
    sinks_by_mid: HashMap<String, Vec<&'a dyn RtpPacketSink>>,

    /// SSRC -> sink, signaled or learned
    sinks_by_ssrc: HashMap<RtpSsrc, &'a dyn RtpPacketSink>,

    /// Payload type -> every distinct sink registered with it
    sinks_by_payload_type: HashMap<RtpPayloadType, Vec<&'a dyn RtpPacketSink>>,

    /// MID (empty for none) -> RSID -> sink
    sinks_by_mid_rsid: HashMap<String, HashMap<String, &'a dyn RtpPacketSink>>,

    /// Notified in registration order
    ssrc_binding_observers: Vec<&'a dyn SsrcBindingObserver>,
}

impl<'a> RtpDemuxer<'a> {
    /// Create a demuxer with the default configuration
    pub fn new() -> Self {
        Self::with_config(RtpDemuxerConfig::default())
    }

    /// Create a demuxer with the given configuration
    ///
    /// # Panics
    ///
    /// If the configuration does not pass `RtpDemuxerConfig::validate`.
    pub fn with_config(config: RtpDemuxerConfig) -> Self {
        if let Err(e) = config.validate() {
            panic!("Cannot create RTP demuxer: {}", e);
        }
        Self {
            config,
            sinks_by_mid: HashMap::new(),
            sinks_by_ssrc: HashMap::new(),
            sinks_by_payload_type: HashMap::new(),
            sinks_by_mid_rsid: HashMap::new(),
            ssrc_binding_observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &RtpDemuxerConfig {
        &self.config
    }

    /// Register a sink for packets matching `criteria`
    ///
    /// Returns false, leaving the demuxer untouched, if any of the SSRCs is
    /// already bound (signaled or learned, to any sink) or any (MID, RSID) pair
    /// is already registered. Overlapping MIDs and payload types are accepted and
    /// only make those attributes ambiguous for routing.
    ///
    /// # Panics
    ///
    /// If the criteria is empty or holds an illegal MID or RSID.
    pub fn add_sink(&mut self, criteria: &RtpDemuxerCriteria, sink: &'a dyn RtpPacketSink) -> bool {
        if let Err(e) = criteria.validate() {
            panic!("Cannot add sink with criteria {}: {}", criteria, e);
        }

        if self.criteria_would_conflict(criteria) {
            debug!(
                session = %self.config.session_id,
                "Rejecting sink with criteria {}: conflicts with an existing sink",
                criteria
            );
            return false;
        }

        if !criteria.mid.is_empty() {
            push_distinct(self.sinks_by_mid.entry(criteria.mid.clone()).or_default(), sink);
        }

        for &ssrc in &criteria.ssrcs {
            self.sinks_by_ssrc.insert(ssrc, sink);
        }

        for &payload_type in &criteria.payload_types {
            push_distinct(self.sinks_by_payload_type.entry(payload_type).or_default(), sink);
        }

        if !criteria.rsids.is_empty() {
            let by_rsid = self.sinks_by_mid_rsid.entry(criteria.mid.clone()).or_default();
            for rsid in &criteria.rsids {
                by_rsid.insert(rsid.clone(), sink);
            }
        }

        debug!(session = %self.config.session_id, "Added sink with criteria {}", criteria);
        true
    }

    /// Register a sink for a single SSRC
    ///
    /// Returns false if the SSRC is already bound; the existing binding is kept.
    pub fn add_sink_for_ssrc(&mut self, ssrc: RtpSsrc, sink: &'a dyn RtpPacketSink) -> bool {
        self.add_sink(&RtpDemuxerCriteria::for_ssrc(ssrc), sink)
    }

    /// Register a sink for a single RSID outside any MID scope
    ///
    /// Unlike the other registration calls this one does not report whether the
    /// sink was added. A conflicting RSID leaves the earlier sink in place.
    ///
    /// # Panics
    ///
    /// If `rsid` is not a legal RSID.
    pub fn add_sink_for_rsid(&mut self, rsid: &str, sink: &'a dyn RtpPacketSink) {
        if !self.add_sink(&RtpDemuxerCriteria::for_rsid(rsid), sink) {
            debug!(session = %self.config.session_id, "RSID {} is already registered", rsid);
        }
    }

    /// Remove every registration and learned binding of `sink`
    ///
    /// Returns true if anything was removed.
    pub fn remove_sink(&mut self, sink: &dyn RtpPacketSink) -> bool {
        let mut removed = 0usize;

        removed += remove_from_multimap(&mut self.sinks_by_mid, sink);
        removed += remove_from_multimap(&mut self.sinks_by_payload_type, sink);

        let before = self.sinks_by_ssrc.len();
        self.sinks_by_ssrc.retain(|_, bound| !same_sink(*bound, sink));
        removed += before - self.sinks_by_ssrc.len();

        self.sinks_by_mid_rsid.retain(|_, by_rsid| {
            let before = by_rsid.len();
            by_rsid.retain(|_, bound| !same_sink(*bound, sink));
            removed += before - by_rsid.len();
            !by_rsid.is_empty()
        });

        if removed > 0 {
            debug!(session = %self.config.session_id, "Removed sink ({} entries)", removed);
        }
        removed > 0
    }

    /// Demux a received packet
    ///
    /// Returns true if a sink was found and handed the packet. False means the
    /// packet was dropped: no sink matched, the match was ambiguous, or the MID
    /// is unknown.
    pub fn on_rtp_packet(&mut self, packet: &RtpPacketReceived) -> bool {
        match self.resolve_sink(packet) {
            Some(sink) => {
                sink.on_rtp_packet(packet);
                true
            }
            None => {
                if self.config.log_dropped_packets {
                    debug!(session = %self.config.session_id, "Dropping packet: {}", describe_packet(packet));
                } else {
                    trace!(session = %self.config.session_id, "Dropping packet: {}", describe_packet(packet));
                }
                false
            }
        }
    }

    /// Start reporting learned SSRC bindings to `observer`
    ///
    /// # Panics
    ///
    /// If the observer is already registered.
    pub fn register_ssrc_binding_observer(&mut self, observer: &'a dyn SsrcBindingObserver) {
        assert!(
            !self.ssrc_binding_observers.iter().any(|o| same_observer(*o, observer)),
            "SSRC binding observer registered twice"
        );
        self.ssrc_binding_observers.push(observer);
    }

    /// Undo `register_ssrc_binding_observer`
    ///
    /// # Panics
    ///
    /// If the observer is not registered.
    pub fn deregister_ssrc_binding_observer(&mut self, observer: &dyn SsrcBindingObserver) {
        let position = self
            .ssrc_binding_observers
            .iter()
            .position(|o| same_observer(*o, observer));
        match position {
            Some(index) => {
                self.ssrc_binding_observers.remove(index);
            }
            None => panic!("Deregistering an SSRC binding observer that was never registered"),
        }
    }

    /// Sink currently bound to `ssrc`, signaled or learned
    pub fn sink_for_ssrc(&self, ssrc: RtpSsrc) -> Option<&'a dyn RtpPacketSink> {
        self.sinks_by_ssrc.get(&ssrc).copied()
    }

    /// Whether `sink` has any registration or binding left
    pub fn has_sink(&self, sink: &dyn RtpPacketSink) -> bool {
        self.sinks_by_ssrc.values().any(|s| same_sink(*s, sink))
            || self.sinks_by_mid.values().flatten().any(|s| same_sink(*s, sink))
            || self.sinks_by_payload_type.values().flatten().any(|s| same_sink(*s, sink))
            || self
                .sinks_by_mid_rsid
                .values()
                .flat_map(|by_rsid| by_rsid.values())
                .any(|s| same_sink(*s, sink))
    }

    /// Number of SSRCs bound to a sink
    pub fn ssrc_binding_count(&self) -> usize {
        self.sinks_by_ssrc.len()
    }

    pub fn observer_count(&self) -> usize {
        self.ssrc_binding_observers.len()
    }

    /// True if no sink is registered
    pub fn is_empty(&self) -> bool {
        self.sinks_by_mid.is_empty()
            && self.sinks_by_ssrc.is_empty()
            && self.sinks_by_payload_type.is_empty()
            && self.sinks_by_mid_rsid.is_empty()
    }

    fn criteria_would_conflict(&self, criteria: &RtpDemuxerCriteria) -> bool {
        if let Some(ssrc) = criteria.ssrcs.iter().find(|ssrc| self.sinks_by_ssrc.contains_key(*ssrc)) {
            debug!(session = %self.config.session_id, "SSRC {:08x} is already bound", ssrc);
            return true;
        }

        if let Some(by_rsid) = self.sinks_by_mid_rsid.get(&criteria.mid) {
            if let Some(rsid) = criteria.rsids.iter().find(|rsid| by_rsid.contains_key(*rsid)) {
                debug!(
                    session = %self.config.session_id,
                    "MID, RSID pair ({}, {}) is already registered",
                    criteria.mid,
                    rsid
                );
                return true;
            }
        }

        false
    }

    fn resolve_sink(&mut self, packet: &RtpPacketReceived) -> Option<&'a dyn RtpPacketSink> {
        let ssrc = packet.ssrc();

        if let Some(mid) = packet.mid() {
            match self.find_sink_by_mid(mid) {
                MidMatch::Unknown => {
                    trace!(session = %self.config.session_id, "Unknown MID {} on SSRC {:08x}", mid, ssrc);
                    return None;
                }
                MidMatch::Unique(sink) => {
                    if self.bind_ssrc(ssrc, sink) {
                        debug!(session = %self.config.session_id, "Resolving MID {} to SSRC {:08x}", mid, ssrc);
                    }
                    return Some(sink);
                }
                MidMatch::Ambiguous => {}
            }
        }

        if let Some(sink) = self.sink_for_ssrc(ssrc) {
            return Some(sink);
        }

        let payload_type = packet.payload_type();
        if let Some(sink) = self.find_sink_by_payload_type(payload_type) {
            self.bind_ssrc(ssrc, sink);
            debug!(
                session = %self.config.session_id,
                "Resolving payload type {} to SSRC {:08x}",
                payload_type,
                ssrc
            );
            return Some(sink);
        }

        if let Some(rsid) = packet.stream_id() {
            let mid = packet.mid().unwrap_or("");
            if let Some(sink) = self.find_sink_by_rsid(mid, rsid) {
                if self.bind_ssrc(ssrc, sink) {
                    debug!(
                        session = %self.config.session_id,
                        "Resolving MID, RSID pair ({}, {}) to SSRC {:08x}",
                        mid,
                        rsid,
                        ssrc
                    );
                    self.notify_rsid_binding(mid, rsid, ssrc);
                }
                return Some(sink);
            }
        }

        None
    }

    fn find_sink_by_mid(&self, mid: &str) -> MidMatch<'a> {
        match self.sinks_by_mid.get(mid).map(Vec::as_slice) {
            None | Some([]) => MidMatch::Unknown,
            Some([sink]) => MidMatch::Unique(*sink),
            Some(_) => MidMatch::Ambiguous,
        }
    }

    fn find_sink_by_payload_type(&self, payload_type: RtpPayloadType) -> Option<&'a dyn RtpPacketSink> {
        match self.sinks_by_payload_type.get(&payload_type).map(Vec::as_slice) {
            Some([sink]) => Some(*sink),
            _ => None,
        }
    }

    fn find_sink_by_rsid(&self, mid: &str, rsid: &str) -> Option<&'a dyn RtpPacketSink> {
        self.sinks_by_mid_rsid.get(mid)?.get(rsid).copied()
    }

    /// Bind `ssrc` to `sink`, replacing any earlier binding
    ///
    /// Returns true if the binding is new or changed.
    fn bind_ssrc(&mut self, ssrc: RtpSsrc, sink: &'a dyn RtpPacketSink) -> bool {
        match self.sinks_by_ssrc.insert(ssrc, sink) {
            Some(previous) => !same_sink(previous, sink),
            None => true,
        }
    }

    fn notify_rsid_binding(&self, mid: &str, rsid: &str, ssrc: RtpSsrc) {
        for observer in &self.ssrc_binding_observers {
            if mid.is_empty() {
                observer.on_ssrc_bound_to_rsid(rsid, ssrc);
            } else {
                observer.on_ssrc_bound_to_mid_rsid(mid, rsid, ssrc);
            }
        }
    }
}

impl Default for RtpDemuxer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RtpDemuxer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RtpDemuxer")
            .field("session_id", &self.config.session_id)
            .field("mids", &self.sinks_by_mid.len())
            .field("ssrcs", &self.sinks_by_ssrc.len())
            .field("payload_types", &self.sinks_by_payload_type.len())
            .field("mid_rsid_scopes", &self.sinks_by_mid_rsid.len())
            .field("observers", &self.ssrc_binding_observers.len())
            .finish()
    }
}

impl Drop for RtpDemuxer<'_> {
    fn drop(&mut self) {
        if !self.is_empty() {
            warn!(
                session = %self.config.session_id,
                "RTP demuxer dropped with sinks still registered"
            );
        }
    }
}

/// Human-readable summary of the fields used for demuxing
pub fn describe_packet(packet: &RtpPacketReceived) -> String {
    let mut description = format!("PT={} SSRC={:08x}", packet.payload_type(), packet.ssrc());
    for (extension, label) in [
        (SdesExtension::Mid, "MID"),
        (SdesExtension::RtpStreamId, "RSID"),
        (SdesExtension::RepairedRtpStreamId, "RRID"),
    ] {
        if let Some(value) = packet.extension(extension) {
            description.push_str(&format!(" {}={}", label, value));
        }
    }
    description
}

fn push_distinct<'a>(sinks: &mut Vec<&'a dyn RtpPacketSink>, sink: &'a dyn RtpPacketSink) {
    if !sinks.iter().any(|s| same_sink(*s, sink)) {
        sinks.push(sink);
    }
}

fn remove_from_multimap<K>(map: &mut HashMap<K, Vec<&dyn RtpPacketSink>>, sink: &dyn RtpPacketSink) -> usize {
    let mut removed = 0;
    map.retain(|_, sinks| {
        let before = sinks.len();
        sinks.retain(|s| !same_sink(*s, sink));
        removed += before - sinks.len();
        !sinks.is_empty()
    });
    removed
}
