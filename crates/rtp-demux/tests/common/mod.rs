//! Shared test sinks and observers

#![allow(dead_code)]

use std::sync::Mutex;

use rvoip_rtp_demux::{RtpPacketReceived, RtpPacketSink, RtpPayloadType, RtpSsrc, SsrcBindingObserver};
use tracing_subscriber::EnvFilter;

/// Install a test subscriber honoring RUST_LOG
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Sink that records (SSRC, sequence number) of every packet it receives
#[derive(Default)]
pub struct RecordingSink {
    packets: Mutex<Vec<(RtpSsrc, u16)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn received(&self) -> Vec<(RtpSsrc, u16)> {
        self.packets.lock().unwrap().clone()
    }

    pub fn received_ssrcs(&self) -> Vec<RtpSsrc> {
        self.received().into_iter().map(|(ssrc, _)| ssrc).collect()
    }

    pub fn count(&self) -> usize {
        self.packets.lock().unwrap().len()
    }
}

impl RtpPacketSink for RecordingSink {
    fn on_rtp_packet(&self, packet: &RtpPacketReceived) {
        self.packets
            .lock()
            .unwrap()
            .push((packet.ssrc(), packet.sequence_number()));
    }
}

/// Binding reported to an observer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    Rsid(String, RtpSsrc),
    Mid(String, RtpSsrc),
    MidRsid(String, String, RtpSsrc),
    PayloadType(RtpPayloadType, RtpSsrc),
}

/// Observer that records every notification, optionally into a shared journal
#[derive(Default)]
pub struct RecordingObserver {
    name: &'static str,
    bindings: Mutex<Vec<Binding>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            ..Default::default()
        }
    }

    pub fn bindings(&self) -> Vec<Binding> {
        self.bindings.lock().unwrap().clone()
    }

    fn record(&self, binding: Binding) {
        self.bindings.lock().unwrap().push(binding);
        JOURNAL.with_borrow_mut(|journal| journal.push(self.name));
    }
}

thread_local! {
    static JOURNAL: std::cell::RefCell<Vec<&'static str>> = const { std::cell::RefCell::new(Vec::new()) };
}

/// Names of observers in notification order on this thread
pub fn take_journal() -> Vec<&'static str> {
    JOURNAL.with_borrow_mut(std::mem::take)
}

impl SsrcBindingObserver for RecordingObserver {
    fn on_ssrc_bound_to_rsid(&self, rsid: &str, ssrc: RtpSsrc) {
        self.record(Binding::Rsid(rsid.to_string(), ssrc));
    }

    fn on_ssrc_bound_to_mid(&self, mid: &str, ssrc: RtpSsrc) {
        self.record(Binding::Mid(mid.to_string(), ssrc));
    }

    fn on_ssrc_bound_to_mid_rsid(&self, mid: &str, rsid: &str, ssrc: RtpSsrc) {
        self.record(Binding::MidRsid(mid.to_string(), rsid.to_string(), ssrc));
    }

    fn on_ssrc_bound_to_payload_type(&self, payload_type: RtpPayloadType, ssrc: RtpSsrc) {
        self.record(Binding::PayloadType(payload_type, ssrc));
    }
}

/// Address identity, as the demuxer compares sinks
pub fn same_sink(a: &dyn RtpPacketSink, b: &dyn RtpPacketSink) -> bool {
    std::ptr::addr_eq(a, b)
}
