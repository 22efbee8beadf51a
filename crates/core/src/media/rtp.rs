/// Size of the RTP fixed header with no CSRCs or extensions.
pub const RTP_HEADER_LEN: usize = 12;

/// Generic RTP fixed header builder (RFC 3550 §5.1).
///
/// ```text
///  0                   1                   2                   3
///  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |V=2|P|X|  CC   |M|     PT      |       Sequence Number         |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                           Timestamp                           |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// |                             SSRC                              |
/// +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
/// ```
///
/// Shared by codec packetizers. It manages:
/// - **Sequence number**: 16-bit, wrapping, incremented on every packet
///   and carried across frames.
/// - **Timestamp**: set once per access unit from the frame's
///   presentation time (see [`timestamp_from_ms`]).
/// - **SSRC**: randomly generated per RFC 3550 §8.1.
///
/// Version is always 2. Padding, extension, and CSRC count are always 0.
#[derive(Debug)]
pub struct RtpHeader {
    /// RTP payload type (7-bit, RFC 3551).
    pub pt: u8,
    /// Synchronization source identifier (RFC 3550 §8.1).
    pub ssrc: u32,
    sequence: u16,
    timestamp: u32,
}

impl RtpHeader {
    /// Create a new RTP header state with explicit SSRC.
    pub fn new(pt: u8, ssrc: u32) -> Self {
        tracing::debug!(
            pt,
            ssrc = format_args!("{:#010X}", ssrc),
            "RTP header state created"
        );
        Self {
            pt: pt & 0x7f,
            ssrc,
            sequence: 0,
            timestamp: 0,
        }
    }

    /// Sequence number the next [`write`](Self::write) will use.
    pub fn sequence(&self) -> u16 {
        self.sequence
    }

    /// Timestamp of the current access unit.
    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    /// Set the timestamp stamped on subsequent packets.
    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    /// Serialize a 12-byte RTP fixed header and advance the sequence number.
    ///
    /// The `marker` bit signals the last packet of an access unit
    /// (RFC 6184 §5.1).
    pub fn write(&mut self, marker: bool) -> [u8; RTP_HEADER_LEN] {
        let mut header = [0u8; RTP_HEADER_LEN];
        header[0] = 2 << 6;
        header[1] = ((marker as u8) << 7) | self.pt;
        header[2..4].copy_from_slice(&self.sequence.to_be_bytes());
        header[4..8].copy_from_slice(&self.timestamp.to_be_bytes());
        header[8..12].copy_from_slice(&self.ssrc.to_be_bytes());

        self.sequence = self.sequence.wrapping_add(1);
        header
    }
}

/// Convert a presentation time in milliseconds to RTP clock ticks.
///
/// The result wraps at the 32-bit field width.
pub fn timestamp_from_ms(ts_ms: u64, clock_rate: u32) -> u32 {
    (ts_ms.wrapping_mul(clock_rate as u64) / 1000) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_header() -> RtpHeader {
        RtpHeader::new(96, 0xAABBCCDD)
    }

    #[test]
    fn version_is_2() {
        let mut h = make_header();
        let buf = h.write(false);
        assert_eq!(buf[0] >> 6, 2);
    }

    #[test]
    fn marker_bit() {
        let mut h = make_header();
        let no_marker = h.write(false);
        assert_eq!(no_marker[1] & 0x80, 0);

        let with_marker = h.write(true);
        assert_eq!(with_marker[1] & 0x80, 0x80);
    }

    #[test]
    fn payload_type_masked_to_seven_bits() {
        let mut h = RtpHeader::new(0xE0, 1);
        let buf = h.write(false);
        assert_eq!(buf[1], 0x60);
    }

    #[test]
    fn sequence_wraps() {
        let mut h = make_header();
        h.sequence = u16::MAX;
        let buf = h.write(false);
        assert_eq!(u16::from_be_bytes([buf[2], buf[3]]), u16::MAX);
        assert_eq!(h.sequence(), 0);
    }

    #[test]
    fn timestamp_and_ssrc_written() {
        let mut h = make_header();
        h.set_timestamp(0x01020304);
        let buf = h.write(false);
        assert_eq!(&buf[4..8], &[1, 2, 3, 4]);
        assert_eq!(u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]), 0xAABBCCDD);
    }

    #[test]
    fn ms_to_90khz() {
        assert_eq!(timestamp_from_ms(0, 90000), 0);
        assert_eq!(timestamp_from_ms(1000, 90000), 90000);
        assert_eq!(timestamp_from_ms(33, 90000), 2970);
    }

    #[test]
    fn ms_to_ticks_wraps_at_32_bits() {
        // 2^32 / 90 ms is roughly 47721858 ms; one second past that wraps.
        let ts = timestamp_from_ms(47_721_858 + 1000, 90000);
        assert!(ts < 90000 + 90);
    }
}
