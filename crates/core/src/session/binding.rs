use std::sync::Arc;

use crate::error::{LiveError, Result};
use crate::media::NetworkPacket;
use crate::transport::interleaved::{InterleavedFrame, OVERHEAD};
use crate::transport::{Transport, TransportHandle, TransportKind};

/// One media stream's delivery state inside a [`Session`](super::Session).
///
/// Dropping a binding detaches the transport observer and releases the
/// scratch buffer and the binding's hold on its transport; a shared
/// interleaved transport lives on while sibling bindings hold it.
#[derive(Debug)]
pub(crate) struct StreamBinding {
    pub(crate) stream_id: u32,
    pub(crate) active: bool,
    /// Set on creation and on every activation. While set (and the
    /// session waits for keyframes) only a packet that starts a
    /// random-access access unit may go out.
    pub(crate) needs_resync: bool,
    /// `[rtp, rtcp]` interleaved channel numbers.
    channels: Option<[u8; 2]>,
    /// Frame buffer reused for every interleaved send. Empty for
    /// datagram transports.
    scratch: Vec<u8>,
    transport: TransportHandle,
}

impl StreamBinding {
    pub(crate) fn unicast(
        stream_id: u32,
        transport: Box<dyn Transport>,
        max_packet_size: usize,
    ) -> Self {
        // A factory may hand back a stream transport; frame it on the
        // default channel pair.
        let (channels, scratch) = match transport.kind() {
            TransportKind::Datagram => (None, Vec::new()),
            TransportKind::StreamInterleaved => (Some([0, 1]), scratch_buffer(max_packet_size)),
        };
        Self {
            stream_id,
            active: false,
            needs_resync: true,
            channels,
            scratch,
            transport: TransportHandle::Exclusive(transport),
        }
    }

    pub(crate) fn interleaved(
        stream_id: u32,
        transport: Arc<dyn Transport>,
        channels: [u8; 2],
        max_packet_size: usize,
    ) -> Self {
        Self {
            stream_id,
            active: false,
            needs_resync: true,
            channels: Some(channels),
            scratch: scratch_buffer(max_packet_size),
            transport: TransportHandle::Shared(transport),
        }
    }

    pub(crate) fn channels(&self) -> Option<[u8; 2]> {
        self.channels
    }

    pub(crate) fn transport(&self) -> &TransportHandle {
        &self.transport
    }

    /// Send one packet, framing it when the transport is a byte stream.
    /// Returns the number of bytes handed to the transport.
    pub(crate) fn send(&mut self, packet: &NetworkPacket) -> Result<usize> {
        let wire: &[u8] = match self.transport.kind() {
            TransportKind::Datagram => packet.as_bytes(),
            TransportKind::StreamInterleaved => {
                let channel = self.channels.map_or(0, |c| c[0]);
                let len = InterleavedFrame::format(channel, packet.as_bytes(), &mut self.scratch)?;
                &self.scratch[..len]
            }
        };

        self.transport
            .send(wire)
            .map_err(|source| LiveError::SendFailed {
                stream_id: self.stream_id,
                source,
            })?;
        Ok(wire.len())
    }
}

impl Drop for StreamBinding {
    fn drop(&mut self) {
        self.active = false;
        self.transport.set_observer(None);
        tracing::trace!(
            stream_id = self.stream_id,
            shared = self.transport.is_shared(),
            "stream binding released"
        );
    }
}

fn scratch_buffer(max_packet_size: usize) -> Vec<u8> {
    vec![0u8; OVERHEAD + max_packet_size]
}
