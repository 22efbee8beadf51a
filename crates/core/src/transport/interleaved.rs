use crate::error::{LiveError, Result};

/// Leading byte of every interleaved frame.
pub const MAGIC: u8 = b'$';

/// Size of the interleaved frame header.
pub const OVERHEAD: usize = 4;

/// Largest payload the 16-bit length field can describe.
pub const MAX_FRAMED_PAYLOAD: usize = u16::MAX as usize;

/// Interleaved binary data framing (RFC 2326 §10.12).
///
/// ```text
/// +------+---------+-----------------+----------------+
/// | '$'  | channel | length (u16 BE) | payload ...    |
/// +------+---------+-----------------+----------------+
/// ```
///
/// Frames are written into a caller-owned scratch buffer so the per-packet
/// send path does not allocate.
pub struct InterleavedFrame;

impl InterleavedFrame {
    pub const fn overhead() -> usize {
        OVERHEAD
    }

    /// Write `payload` framed for `channel` into `out`, returning the
    /// number of bytes written.
    ///
    /// Fails when the payload exceeds the 16-bit length field or when
    /// `out` is shorter than the framed packet.
    pub fn format(channel: u8, payload: &[u8], out: &mut [u8]) -> Result<usize> {
        if payload.len() > MAX_FRAMED_PAYLOAD {
            return Err(LiveError::FrameTooLarge {
                size: payload.len(),
                max: MAX_FRAMED_PAYLOAD,
            });
        }
        let total = OVERHEAD + payload.len();
        if total > out.len() {
            return Err(LiveError::FrameTooLarge {
                size: total,
                max: out.len(),
            });
        }

        out[0] = MAGIC;
        out[1] = channel;
        out[2..4].copy_from_slice(&(payload.len() as u16).to_be_bytes());
        out[OVERHEAD..total].copy_from_slice(payload);
        Ok(total)
    }
}

/// Parsed header of an inbound interleaved frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterleavedHeader {
    pub channel: u8,
    pub length: u16,
}

impl InterleavedHeader {
    /// Parse the 4-byte header at the start of `data`.
    ///
    /// Returns `None` when `data` is shorter than the header or does not
    /// start with `$`.
    pub fn parse(data: &[u8]) -> Option<Self> {
        match data {
            [MAGIC, channel, hi, lo, ..] => Some(Self {
                channel: *channel,
                length: u16::from_be_bytes([*hi, *lo]),
            }),
            _ => None,
        }
    }

    /// Total frame size: header plus payload.
    pub fn frame_len(&self) -> usize {
        OVERHEAD + self.length as usize
    }
}
