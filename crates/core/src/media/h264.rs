use super::frame::{FrameType, MediaFrame, NetworkPacket};
use super::rtp::{self, RTP_HEADER_LEN, RtpHeader};
use super::{Packaging, Packetizer, StreamParams};
use crate::error::{LiveError, Result};
use crate::transport::interleaved::MAX_FRAMED_PAYLOAD;

const CLOCK_RATE: u32 = 90000;

const NAL_TYPE_IDR: u8 = 5;
const NAL_TYPE_SPS: u8 = 7;
const NAL_TYPE_PPS: u8 = 8;
const NAL_TYPE_FU_A: u8 = 28;

/// FU indicator + FU header.
const FU_HEADER_LEN: usize = 2;

/// H.264 RTP packetizer (RFC 6184).
///
/// Converts H.264 access units into RTP packets using packetization
/// mode 1:
///
/// - **Single NAL Unit** (§5.6): NALs that fit within the payload budget
///   are sent as-is in a single RTP packet (12-byte header + NAL bytes).
///
/// - **FU-A Fragmentation** (§5.8): NALs exceeding the budget are split
///   across multiple RTP packets. Each fragment carries a 2-byte FU
///   header before the NAL payload:
///
///   ```text
///   FU indicator:  [F|NRI|Type=28]     (1 byte)
///   FU header:     [S|E|R|NAL_Type]    (1 byte)
///   Fragment data: [...]               (up to mtu - 2 bytes)
///   ```
///
/// ## Coding unit extraction
///
/// [`Packaging::AnnexB`] splits on 3- and 4-byte start codes
/// ([`extract_nal_units`](Self::extract_nal_units));
/// [`Packaging::LengthPrefixed`] reads 4-byte big-endian lengths
/// ([`split_length_prefixed`](Self::split_length_prefixed)).
///
/// ## Parameter sets
///
/// SPS/PPS supplied in [`StreamParams`] are pinned for the stream's
/// lifetime. A set not supplied is taken from the bitstream and replaced
/// whenever the encoder emits a new one (e.g. after a resolution
/// change). On every
/// random-access access unit that does not already carry both, they are
/// sent as their own NAL units ahead of the IDR slice so a viewer joining
/// at that point can decode.
///
/// ## Marker bit
///
/// Set only on the last RTP packet of the access unit (RFC 6184 §5.1).
#[derive(Debug)]
pub struct H264Packetizer {
    header: RtpHeader,
    mtu: usize,
    packaging: Packaging,
    sps: Option<Vec<u8>>,
    pps: Option<Vec<u8>>,
    /// Supplied out of band; never replaced from the bitstream.
    sps_pinned: bool,
    pps_pinned: bool,
}

impl H264Packetizer {
    /// Create with a random SSRC (RFC 3550 §8.1).
    ///
    /// Fails when the payload budget cannot carry an FU-A fragment, when
    /// the resulting packet would not fit an interleaved frame, or when
    /// the supplied parameter sets are malformed.
    pub fn new(params: StreamParams) -> Result<Self> {
        Self::with_ssrc(params, rand::random::<u32>())
    }

    /// Create with an explicit SSRC.
    pub fn with_ssrc(params: StreamParams, ssrc: u32) -> Result<Self> {
        validate(&params)?;

        tracing::debug!(
            pt = params.payload_type,
            mtu = params.mtu,
            packaging = ?params.packaging,
            out_of_band_params = params.sps.is_some() && params.pps.is_some(),
            "H.264 packetizer created"
        );

        Ok(Self {
            header: RtpHeader::new(params.payload_type, ssrc),
            mtu: params.mtu,
            packaging: params.packaging,
            sps_pinned: params.sps.is_some(),
            pps_pinned: params.pps.is_some(),
            sps: params.sps,
            pps: params.pps,
        })
    }

    pub fn ssrc(&self) -> u32 {
        self.header.ssrc
    }

    /// Extract NAL units from an H.264 Annex B bitstream.
    ///
    /// Scans for start codes (both 4-byte `00 00 00 01` and 3-byte
    /// `00 00 01`) and returns the NAL data between them, excluding
    /// the start codes themselves. Bytes before the first start code
    /// are ignored.
    pub fn extract_nal_units(data: &[u8]) -> Vec<&[u8]> {
        let mut nal_units = Vec::new();
        let mut i = 0usize;

        // (nal_data_start_index, start_code_length)
        let mut start_entries: Vec<(usize, usize)> = Vec::new();

        while i < data.len() {
            if i + 3 < data.len() && data[i..i + 4] == [0, 0, 0, 1] {
                start_entries.push((i + 4, 4));
                i += 4;
            } else if i + 2 < data.len() && data[i..i + 3] == [0, 0, 1] {
                start_entries.push((i + 3, 3));
                i += 3;
            } else {
                i += 1;
            }
        }

        for (idx, &(start, _)) in start_entries.iter().enumerate() {
            let end = match start_entries.get(idx + 1) {
                Some(&(next_start, next_sc_len)) => next_start - next_sc_len,
                None => data.len(),
            };

            if start < end {
                nal_units.push(&data[start..end]);
            }
        }

        nal_units
    }

    /// Split a buffer of 4-byte big-endian length-prefixed NAL units.
    ///
    /// A truncated trailing unit is dropped.
    pub fn split_length_prefixed(data: &[u8]) -> Vec<&[u8]> {
        let mut nal_units = Vec::new();
        let mut rest = data;

        while rest.len() >= 4 {
            let len = u32::from_be_bytes([rest[0], rest[1], rest[2], rest[3]]) as usize;
            rest = &rest[4..];
            if len > rest.len() {
                tracing::warn!(
                    declared = len,
                    available = rest.len(),
                    "truncated length-prefixed NAL unit dropped"
                );
                break;
            }
            if len > 0 {
                nal_units.push(&rest[..len]);
            }
            rest = &rest[len..];
        }

        nal_units
    }

    fn split_units<'a>(&self, data: &'a [u8]) -> Vec<&'a [u8]> {
        match self.packaging {
            Packaging::AnnexB => Self::extract_nal_units(data),
            Packaging::LengthPrefixed => Self::split_length_prefixed(data),
        }
    }

    /// Track the latest in-band SPS/PPS for every set not pinned out of band.
    fn capture_parameter_sets(&mut self, nal_units: &[&[u8]]) {
        if self.sps_pinned && self.pps_pinned {
            return;
        }
        for nal in nal_units {
            let (slot, name) = match nal_type(nal) {
                NAL_TYPE_SPS if !self.sps_pinned => (&mut self.sps, "SPS"),
                NAL_TYPE_PPS if !self.pps_pinned => (&mut self.pps, "PPS"),
                _ => continue,
            };
            if slot.as_deref() != Some(*nal) {
                tracing::debug!(
                    set = name,
                    bytes = nal.len(),
                    replaced = slot.is_some(),
                    "H.264 parameter set captured from bitstream"
                );
                *slot = Some(nal.to_vec());
            }
        }
    }
}

impl Packetizer for H264Packetizer {
    fn packetize(&mut self, frame: &MediaFrame<'_>) -> Vec<NetworkPacket> {
        let mut packets = Vec::new();
        if frame.is_empty() {
            return packets;
        }

        let nal_units = self.split_units(frame.data);
        if nal_units.is_empty() {
            tracing::warn!(frame_bytes = frame.len(), "no NAL units found in frame");
            return packets;
        }

        self.capture_parameter_sets(&nal_units);

        let keyframe = match frame.frame_type {
            FrameType::Key => true,
            FrameType::Delta => false,
            FrameType::Uncertain => nal_units.iter().any(|n| nal_type(n) == NAL_TYPE_IDR),
        };

        let Self {
            header,
            mtu,
            sps,
            pps,
            ..
        } = self;

        header.set_timestamp(rtp::timestamp_from_ms(frame.ts_ms, CLOCK_RATE));

        let carries_params = nal_units.iter().any(|n| nal_type(n) == NAL_TYPE_SPS)
            && nal_units.iter().any(|n| nal_type(n) == NAL_TYPE_PPS);

        let units: Vec<&[u8]> = match (sps.as_deref(), pps.as_deref()) {
            (Some(sps), Some(pps)) if keyframe && !carries_params => {
                let at = nal_units
                    .iter()
                    .position(|n| nal_type(n) == NAL_TYPE_IDR)
                    .unwrap_or(0);
                let mut units = Vec::with_capacity(nal_units.len() + 2);
                units.extend_from_slice(&nal_units[..at]);
                units.push(sps);
                units.push(pps);
                units.extend_from_slice(&nal_units[at..]);
                units
            }
            _ => nal_units,
        };

        for (i, nal) in units.iter().enumerate() {
            let is_last = i == units.len() - 1;
            packetize_nal(header, *mtu, nal, is_last, &mut packets);
        }

        for packet in &mut packets {
            packet.keyframe = keyframe;
        }
        if let Some(first) = packets.first_mut() {
            first.first = true;
        }

        tracing::trace!(
            nal_count = units.len(),
            rtp_packets = packets.len(),
            frame_bytes = frame.len(),
            keyframe,
            seq = header.sequence(),
            ts = header.timestamp(),
            "frame packetized"
        );

        packets
    }

    fn max_packet_size(&self) -> usize {
        RTP_HEADER_LEN + self.mtu
    }

    fn codec_name(&self) -> &'static str {
        "H264"
    }

    /// 90 kHz clock rate per RFC 6184 §8.1.
    fn clock_rate(&self) -> u32 {
        CLOCK_RATE
    }

    fn payload_type(&self) -> u8 {
        self.header.pt
    }

    fn next_sequence(&self) -> u16 {
        self.header.sequence()
    }

    fn rtp_timestamp(&self) -> u32 {
        self.header.timestamp()
    }
}

fn nal_type(nal: &[u8]) -> u8 {
    nal.first().map_or(0, |b| b & 0x1f)
}

fn validate(params: &StreamParams) -> Result<()> {
    if params.payload_type > 0x7f {
        return Err(LiveError::InvalidConfig(format!(
            "payload type {} does not fit 7 bits",
            params.payload_type
        )));
    }
    if params.mtu <= FU_HEADER_LEN {
        return Err(LiveError::FrameTooLarge {
            size: FU_HEADER_LEN + 1,
            max: params.mtu,
        });
    }
    if RTP_HEADER_LEN + params.mtu > MAX_FRAMED_PAYLOAD {
        return Err(LiveError::FrameTooLarge {
            size: RTP_HEADER_LEN + params.mtu,
            max: MAX_FRAMED_PAYLOAD,
        });
    }
    for (name, set, expected) in [
        ("SPS", &params.sps, NAL_TYPE_SPS),
        ("PPS", &params.pps, NAL_TYPE_PPS),
    ] {
        if let Some(nal) = set
            && nal_type(nal) != expected
        {
            return Err(LiveError::InvalidConfig(format!(
                "{name} has NAL type {}, expected {expected}",
                nal_type(nal)
            )));
        }
    }
    Ok(())
}

/// Packetize a single NAL unit into one or more RTP packets.
///
/// If the NAL fits within the budget, it is sent as a Single NAL Unit
/// packet (RFC 6184 §5.6). Otherwise, FU-A fragmentation is used
/// (RFC 6184 §5.8).
fn packetize_nal(
    header: &mut RtpHeader,
    mtu: usize,
    nal_unit: &[u8],
    is_last_nal: bool,
    packets: &mut Vec<NetworkPacket>,
) {
    if nal_unit.is_empty() {
        return;
    }

    if nal_unit.len() <= mtu {
        let hdr = header.write(is_last_nal);
        let mut data = Vec::with_capacity(RTP_HEADER_LEN + nal_unit.len());
        data.extend_from_slice(&hdr);
        data.extend_from_slice(nal_unit);

        let mut packet = NetworkPacket::new(data);
        packet.last = is_last_nal;
        packets.push(packet);
        return;
    }

    let nal_header = nal_unit[0];
    let nal_type = nal_header & 0x1f;
    let fu_indicator = (nal_header & 0xe0) | NAL_TYPE_FU_A;
    let payload = &nal_unit[1..];

    let max_fragment = mtu - FU_HEADER_LEN;
    let mut offset = 0usize;
    let mut fragments = 0usize;

    while offset < payload.len() {
        let remaining = payload.len() - offset;
        let last_fragment = remaining <= max_fragment;
        let chunk = &payload[offset..offset + remaining.min(max_fragment)];

        // FU header: S=start, E=end, R=0, Type=original NAL type
        let start_bit = if offset == 0 { 0x80 } else { 0x00 };
        let end_bit = if last_fragment { 0x40 } else { 0x00 };

        let marker = is_last_nal && last_fragment;
        let hdr = header.write(marker);

        let mut data = Vec::with_capacity(RTP_HEADER_LEN + FU_HEADER_LEN + chunk.len());
        data.extend_from_slice(&hdr);
        data.push(fu_indicator);
        data.push(start_bit | end_bit | nal_type);
        data.extend_from_slice(chunk);

        let mut packet = NetworkPacket::new(data);
        packet.last = marker;
        packets.push(packet);

        offset += chunk.len();
        fragments += 1;
    }

    tracing::trace!(
        nal_type,
        nal_size = nal_unit.len(),
        fragments,
        "FU-A fragmented NAL unit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    const SPS: [u8; 4] = [0x67, 0x42, 0x00, 0x1e];
    const PPS: [u8; 4] = [0x68, 0xce, 0x38, 0x80];

    fn make_packetizer(mtu: usize) -> H264Packetizer {
        let params = StreamParams {
            mtu,
            ..StreamParams::default()
        };
        H264Packetizer::with_ssrc(params, 0xAABBCCDD).unwrap()
    }

    fn annexb(units: &[&[u8]]) -> Vec<u8> {
        let mut out = Vec::new();
        for unit in units {
            out.extend_from_slice(&[0, 0, 0, 1]);
            out.extend_from_slice(unit);
        }
        out
    }

    fn seq(packet: &NetworkPacket) -> u16 {
        let b = packet.as_bytes();
        u16::from_be_bytes([b[2], b[3]])
    }

    fn marker(packet: &NetworkPacket) -> bool {
        packet.as_bytes()[1] & 0x80 != 0
    }

    // --- NAL extraction ---

    #[test]
    fn extract_single_nal_4byte_sc() {
        let data = [0, 0, 0, 1, 0x65, 0xAA, 0xBB];
        let nals = H264Packetizer::extract_nal_units(&data);
        assert_eq!(nals, vec![&[0x65, 0xAA, 0xBB][..]]);
    }

    #[test]
    fn extract_mixed_start_codes() {
        let mut data = vec![0, 0, 0, 1, 0x67, 0x42];
        data.extend_from_slice(&[0, 0, 1, 0x68, 0xCE]);
        let nals = H264Packetizer::extract_nal_units(&data);
        assert_eq!(nals, vec![&[0x67, 0x42][..], &[0x68, 0xCE][..]]);
    }

    #[test]
    fn extract_no_start_code() {
        assert!(H264Packetizer::extract_nal_units(&[0xFF, 0xFE]).is_empty());
        assert!(H264Packetizer::extract_nal_units(&[]).is_empty());
    }

    #[test]
    fn length_prefixed_split() {
        let data = [0, 0, 0, 2, 0x67, 0x42, 0, 0, 0, 1, 0x65];
        let nals = H264Packetizer::split_length_prefixed(&data);
        assert_eq!(nals, vec![&[0x67, 0x42][..], &[0x65][..]]);
    }

    #[test]
    fn length_prefixed_truncated_tail_dropped() {
        let data = [0, 0, 0, 1, 0x65, 0, 0, 0, 9, 0x41];
        let nals = H264Packetizer::split_length_prefixed(&data);
        assert_eq!(nals, vec![&[0x65][..]]);
    }

    // --- Setup validation ---

    #[test]
    fn budget_too_small_rejected() {
        let params = StreamParams {
            mtu: 2,
            ..StreamParams::default()
        };
        assert!(matches!(
            H264Packetizer::new(params),
            Err(LiveError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn budget_beyond_interleaved_length_rejected() {
        let params = StreamParams {
            mtu: u16::MAX as usize,
            ..StreamParams::default()
        };
        assert!(matches!(
            H264Packetizer::new(params),
            Err(LiveError::FrameTooLarge { .. })
        ));
    }

    #[test]
    fn mismatched_parameter_set_rejected() {
        let params = StreamParams {
            sps: Some(PPS.to_vec()),
            ..StreamParams::default()
        };
        assert!(matches!(
            H264Packetizer::new(params),
            Err(LiveError::InvalidConfig(_))
        ));
    }

    // --- Packetization ---

    #[test]
    fn empty_frame_no_packets() {
        let mut p = make_packetizer(1400);
        assert!(p.packetize(&MediaFrame::new(&[], 0)).is_empty());
    }

    #[test]
    fn small_nal_single_packet() {
        let mut p = make_packetizer(1400);
        let nal = [0x41, 0xAA, 0xBB, 0xCC];
        let data = annexb(&[&nal]);
        let packets = p.packetize(&MediaFrame::new(&data, 0));
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0].as_bytes()[12..], &nal);
        assert!(marker(&packets[0]));
        assert!(packets[0].last && packets[0].first);
        assert!(!packets[0].keyframe);
    }

    #[test]
    fn small_then_large_round_trip() {
        let mtu = 100;
        let mut p = make_packetizer(mtu);
        let a: Vec<u8> = std::iter::once(0x41).chain(0..50).collect();
        let b: Vec<u8> = std::iter::once(0x61).chain((0..350).map(|i| i as u8)).collect();
        let data = annexb(&[&a, &b]);

        let packets = p.packetize(&MediaFrame::new(&data, 40));
        assert_eq!(&packets[0].as_bytes()[12..], a.as_slice());
        assert!(!marker(&packets[0]));

        let fragments = &packets[1..];
        assert_eq!(fragments.len(), 350_usize.div_ceil(mtu - 2));

        let mut rebuilt = Vec::new();
        for (i, frag) in fragments.iter().enumerate() {
            let bytes = frag.as_bytes();
            assert!(bytes.len() <= p.max_packet_size());
            assert_eq!(bytes[12] & 0x1f, NAL_TYPE_FU_A);
            assert_eq!(bytes[13] & 0x80 != 0, i == 0);
            assert_eq!(bytes[13] & 0x40 != 0, i == fragments.len() - 1);
            assert_eq!(marker(frag), i == fragments.len() - 1);
            if i == 0 {
                rebuilt.push((bytes[12] & 0xe0) | (bytes[13] & 0x1f));
            }
            rebuilt.extend_from_slice(&bytes[14..]);
        }
        assert_eq!(rebuilt, b);

        let ts: Vec<&[u8]> = packets.iter().map(|pk| &pk.as_bytes()[4..8]).collect();
        assert!(ts.windows(2).all(|w| w[0] == w[1]));
        assert!(packets.windows(2).all(|w| seq(&w[1]) == seq(&w[0]).wrapping_add(1)));
    }

    #[test]
    fn sequence_continues_across_frames() {
        let mut p = make_packetizer(1400);
        let data = annexb(&[&[0x41, 1, 2]]);
        let first = p.packetize(&MediaFrame::new(&data, 0));
        let second = p.packetize(&MediaFrame::new(&data, 33));
        assert_eq!(seq(&second[0]), seq(&first[0]).wrapping_add(1));
        assert_eq!(p.next_sequence(), seq(&second[0]).wrapping_add(1));
    }

    #[test]
    fn timestamp_from_presentation_time() {
        let mut p = make_packetizer(1400);
        let data = annexb(&[&[0x41, 1, 2]]);
        let packets = p.packetize(&MediaFrame::new(&data, 1000));
        let b = packets[0].as_bytes();
        assert_eq!(u32::from_be_bytes([b[4], b[5], b[6], b[7]]), 90000);
        assert_eq!(p.rtp_timestamp(), 90000);
    }

    #[test]
    fn out_of_band_params_prepended_on_idr() {
        let params = StreamParams {
            sps: Some(SPS.to_vec()),
            pps: Some(PPS.to_vec()),
            ..StreamParams::default()
        };
        let mut p = H264Packetizer::with_ssrc(params, 1).unwrap();
        let aud = [0x09, 0xF0];
        let idr = [0x65, 0x88, 0x84];
        let data = annexb(&[&aud, &idr]);

        let packets = p.packetize(&MediaFrame::new(&data, 0));
        let payloads: Vec<&[u8]> = packets.iter().map(|pk| &pk.as_bytes()[12..]).collect();
        assert_eq!(payloads, vec![&aud[..], &SPS[..], &PPS[..], &idr[..]]);
        assert!(packets.iter().all(|pk| pk.keyframe));
        assert!(packets[0].is_sync_point());
        assert!(!packets[1].is_sync_point());
        assert!(marker(&packets[3]) && packets.iter().filter(|pk| marker(pk)).count() == 1);
    }

    #[test]
    fn params_not_duplicated_when_frame_carries_them() {
        let params = StreamParams {
            sps: Some(SPS.to_vec()),
            pps: Some(PPS.to_vec()),
            ..StreamParams::default()
        };
        let mut p = H264Packetizer::with_ssrc(params, 1).unwrap();
        let data = annexb(&[&SPS, &PPS, &[0x65, 0x88]]);
        assert_eq!(p.packetize(&MediaFrame::new(&data, 0)).len(), 3);
    }

    #[test]
    fn delta_frame_gets_no_params() {
        let params = StreamParams {
            sps: Some(SPS.to_vec()),
            pps: Some(PPS.to_vec()),
            ..StreamParams::default()
        };
        let mut p = H264Packetizer::with_ssrc(params, 1).unwrap();
        let data = annexb(&[&[0x41, 0x9A]]);
        let packets = p.packetize(&MediaFrame::new(&data, 0).with_type(FrameType::Delta));
        assert_eq!(packets.len(), 1);
        assert!(!packets[0].keyframe);
    }

    #[test]
    fn declared_keyframe_overrides_scan() {
        let mut p = make_packetizer(1400);
        let data = annexb(&[&[0x41, 0x9A]]);
        let packets = p.packetize(&MediaFrame::new(&data, 0).with_type(FrameType::Key));
        assert!(packets[0].is_sync_point());
    }

    #[test]
    fn auto_captured_params_reused_on_later_idr() {
        let mut p = make_packetizer(1400);
        let first = annexb(&[&SPS, &PPS, &[0x65, 0x01]]);
        p.packetize(&MediaFrame::new(&first, 0));

        let later = annexb(&[&[0x65, 0x02]]);
        let packets = p.packetize(&MediaFrame::new(&later, 33));
        let payloads: Vec<&[u8]> = packets.iter().map(|pk| &pk.as_bytes()[12..]).collect();
        assert_eq!(payloads, vec![&SPS[..], &PPS[..], &[0x65, 0x02][..]]);
    }

    #[test]
    fn new_in_band_params_replace_captured_ones() {
        let mut p = make_packetizer(1400);
        let first = annexb(&[&SPS, &PPS, &[0x65, 0x01]]);
        p.packetize(&MediaFrame::new(&first, 0));

        let sps2 = [0x67, 0x64, 0x00, 0x28];
        let pps2 = [0x68, 0xee, 0x3c, 0x80];
        let switched = annexb(&[&sps2, &pps2, &[0x65, 0x02]]);
        p.packetize(&MediaFrame::new(&switched, 33));

        let later = annexb(&[&[0x65, 0x03]]);
        let packets = p.packetize(&MediaFrame::new(&later, 66));
        let payloads: Vec<&[u8]> = packets.iter().map(|pk| &pk.as_bytes()[12..]).collect();
        assert_eq!(payloads, vec![&sps2[..], &pps2[..], &[0x65, 0x03][..]]);
    }

    #[test]
    fn out_of_band_params_not_replaced_by_bitstream() {
        let params = StreamParams {
            sps: Some(SPS.to_vec()),
            pps: Some(PPS.to_vec()),
            ..StreamParams::default()
        };
        let mut p = H264Packetizer::with_ssrc(params, 1).unwrap();
        let sps2 = [0x67, 0x64, 0x00, 0x28];
        let pps2 = [0x68, 0xee, 0x3c, 0x80];
        p.packetize(&MediaFrame::new(&annexb(&[&sps2, &pps2, &[0x65, 0x01]]), 0));

        let packets = p.packetize(&MediaFrame::new(&annexb(&[&[0x65, 0x02]]), 33));
        let payloads: Vec<&[u8]> = packets.iter().map(|pk| &pk.as_bytes()[12..]).collect();
        assert_eq!(payloads, vec![&SPS[..], &PPS[..], &[0x65, 0x02][..]]);
    }

    #[test]
    fn length_prefixed_packaging() {
        let params = StreamParams {
            packaging: Packaging::LengthPrefixed,
            ..StreamParams::default()
        };
        let mut p = H264Packetizer::with_ssrc(params, 1).unwrap();
        let data = [0, 0, 0, 3, 0x41, 0xAA, 0xBB];
        let packets = p.packetize(&MediaFrame::new(&data, 0));
        assert_eq!(packets.len(), 1);
        assert_eq!(&packets[0].as_bytes()[12..], &[0x41, 0xAA, 0xBB]);
    }

    #[test]
    fn codec_metadata() {
        let p = make_packetizer(1400);
        assert_eq!(p.codec_name(), "H264");
        assert_eq!(p.clock_rate(), 90000);
        assert_eq!(p.payload_type(), 96);
        assert_eq!(p.max_packet_size(), 1412);
        assert_eq!(p.ssrc(), 0xAABBCCDD);
    }
}
