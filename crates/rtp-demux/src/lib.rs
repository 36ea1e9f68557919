//! # RTP Demux
//!
//! RTP packet demultiplexing for a single RTP session in the rvoip stack.
//!
//! With BUNDLE and simulcast several media streams share one transport, and the
//! stream a packet belongs to is only known from a mix of signaled attributes
//! (MID, SSRCs, payload types, RTP stream ids) and bindings learned from earlier
//! packets. [`RtpDemuxer`] keeps those tables and hands each packet to the
//! [`RtpPacketSink`] it belongs to.
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Mutex;
//! use rvoip_rtp_demux::{RtpDemuxer, RtpDemuxerCriteria, RtpPacketReceived, RtpPacketSink};
//!
//! #[derive(Default)]
//! struct VideoSink {
//!     packets: Mutex<u32>,
//! }
//!
//! impl RtpPacketSink for VideoSink {
//!     fn on_rtp_packet(&self, _packet: &RtpPacketReceived) {
//!         *self.packets.lock().unwrap() += 1;
//!     }
//! }
//!
//! let sink = VideoSink::default();
//! let mut demuxer = RtpDemuxer::new();
//!
//! assert!(demuxer.add_sink(&RtpDemuxerCriteria::for_mid("video").with_rsid("hi"), &sink));
//!
//! // The MID binds SSRC 1234 to the sink, the second packet is routed by SSRC alone
//! assert!(demuxer.on_rtp_packet(&RtpPacketReceived::new(1234).with_mid("video")));
//! assert!(demuxer.on_rtp_packet(&RtpPacketReceived::new(1234)));
//! assert_eq!(*sink.packets.lock().unwrap(), 2);
//!
//! // Unknown MIDs are never routed
//! assert!(!demuxer.on_rtp_packet(&RtpPacketReceived::new(99).with_mid("audio")));
//!
//! demuxer.remove_sink(&sink);
//! ```

pub mod config;
pub mod criteria;
pub mod demuxer;
pub mod error;
pub mod extensions;
pub mod packet;
pub mod sink;

pub use config::{RtpDemuxerConfig, RtpDemuxerConfigBuilder};
pub use criteria::RtpDemuxerCriteria;
pub use demuxer::{describe_packet, RtpDemuxer};
pub use error::{DemuxError, Result};
pub use extensions::{is_legal_mid_name, is_legal_rsid_name, SdesExtension};
pub use packet::RtpPacketReceived;
pub use sink::{RtpPacketSink, SsrcBindingObserver};

/// RTP synchronization source identifier
pub type RtpSsrc = u32;

/// RTP payload type (7 bits)
pub type RtpPayloadType = u8;

/// RTP sequence number
pub type RtpSequenceNumber = u16;

/// RTP timestamp
pub type RtpTimestamp = u32;
