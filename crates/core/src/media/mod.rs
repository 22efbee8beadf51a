//! Media frames and RTP packetization.
//!
//! This module provides the [`Packetizer`] trait and the H.264
//! implementation that converts encoded access units into RTP packets.
//!
//! ## RTP overview (RFC 3550)
//!
//! Each access unit is split into one or more RTP packets. Every RTP
//! packet carries a 12-byte fixed header ([`rtp::RtpHeader`]) containing:
//!
//! - **Sequence number** (16-bit, wrapping): per stream, across frames.
//! - **Timestamp** (32-bit): the frame's presentation time on the 90 kHz
//!   media clock.
//! - **SSRC** (32-bit): randomly chosen to identify the sender.
//! - **Marker bit**: set on the last packet of an access unit.

pub mod frame;
pub mod h264;
pub mod rtp;

pub use frame::{FrameType, MediaFrame, NetworkPacket};

/// Default payload budget: bytes of RTP payload after the fixed header.
pub const DEFAULT_MTU: usize = 1400;

/// How coding units are delimited inside an access unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Packaging {
    /// Annex B: units separated by `00 00 01` or `00 00 00 01` start codes.
    #[default]
    AnnexB,
    /// Each unit preceded by a 4-byte big-endian length (AVCC style).
    LengthPrefixed,
}

/// Stream setup parameters, used once when the packetizer is created.
#[derive(Debug, Clone)]
pub struct StreamParams {
    /// RTP payload type. Dynamic types use 96–127.
    pub payload_type: u8,
    /// Maximum RTP payload bytes per packet, excluding the RTP header.
    pub mtu: usize,
    pub packaging: Packaging,
    /// Out-of-band sequence parameter set (raw NAL, no start code).
    pub sps: Option<Vec<u8>>,
    /// Out-of-band picture parameter set (raw NAL, no start code).
    pub pps: Option<Vec<u8>>,
}

impl Default for StreamParams {
    fn default() -> Self {
        Self {
            payload_type: 96,
            mtu: DEFAULT_MTU,
            packaging: Packaging::AnnexB,
            sps: None,
            pps: None,
        }
    }
}

/// Codec-specific RTP packetizer.
///
/// One instance per media stream; it owns the stream's sequence and
/// SSRC state, so every packet it produces continues that stream's
/// numbering.
pub trait Packetizer: Send {
    /// Packetize one access unit into an ordered list of RTP packets.
    ///
    /// Each returned packet is complete: 12-byte header (RFC 3550 §5.1)
    /// followed by the codec-specific payload. An empty frame yields no
    /// packets.
    fn packetize(&mut self, frame: &MediaFrame<'_>) -> Vec<NetworkPacket>;

    /// Largest packet a single [`packetize`](Self::packetize) call can
    /// produce, header included.
    fn max_packet_size(&self) -> usize;

    /// Codec name (e.g. `"H264"`).
    fn codec_name(&self) -> &'static str;

    /// RTP clock rate in Hz.
    fn clock_rate(&self) -> u32;

    /// RTP payload type number (RFC 3551).
    fn payload_type(&self) -> u8;

    /// Sequence number of the next packet.
    fn next_sequence(&self) -> u16;

    /// Timestamp of the most recent access unit.
    fn rtp_timestamp(&self) -> u32;
}
