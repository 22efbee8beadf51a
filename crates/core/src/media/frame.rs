/// Keyframe classification supplied by the producer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrameType {
    /// The producer does not know; the packetizer inspects the bitstream.
    #[default]
    Uncertain,
    /// Random-access point (IDR).
    Key,
    /// Non-random-access frame.
    Delta,
}

/// One encoded access unit handed to the core by the application.
///
/// Borrowed for the duration of packetization only.
#[derive(Debug, Clone, Copy)]
pub struct MediaFrame<'a> {
    pub data: &'a [u8],
    /// Presentation timestamp in milliseconds.
    pub ts_ms: u64,
    pub frame_type: FrameType,
}

impl<'a> MediaFrame<'a> {
    pub fn new(data: &'a [u8], ts_ms: u64) -> Self {
        Self {
            data,
            ts_ms,
            frame_type: FrameType::Uncertain,
        }
    }

    pub fn with_type(mut self, frame_type: FrameType) -> Self {
        self.frame_type = frame_type;
        self
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One complete RTP packet plus the metadata needed to route it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkPacket {
    data: Vec<u8>,
    /// Last packet of the access unit (RTP marker bit).
    pub last: bool,
    /// First packet of the access unit.
    pub first: bool,
    /// The access unit this packet belongs to is a random-access point.
    pub keyframe: bool,
}

impl NetworkPacket {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            last: false,
            first: false,
            keyframe: false,
        }
    }

    /// Raw wire bytes: RTP header followed by the payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Whether a viewer waiting for a random-access point may start here.
    pub fn is_sync_point(&self) -> bool {
        self.first && self.keyframe
    }
}
