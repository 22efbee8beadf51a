use std::io::{self, Write};
use std::net::{SocketAddr, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use super::interleaved::InterleavedHeader;
use super::{Transport, TransportKind, TransportObserver};
use crate::error::Result;

/// How long one send may block on a viewer that stopped reading.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// RTP-over-RTSP transport riding the control connection (RFC 2326 §10.12).
///
/// Built once per control connection by the RTSP layer and shared, as an
/// `Arc<dyn Transport>`, by every stream binding negotiated with
/// `Transport: RTP/AVP/TCP;interleaved=...`. Writes are serialised by an
/// internal lock so frames from sibling streams never interleave
/// mid-packet. Callers hand over already framed bytes.
///
/// Writes are bounded by a timeout. A write that fails may have left part
/// of a frame on the wire, so the first failure marks the transport
/// broken and every later send fails without touching the socket.
pub struct TcpInterleavedTransport {
    writer: Mutex<TcpStream>,
    peer_addr: SocketAddr,
    broken: AtomicBool,
    observer: Mutex<Option<Arc<dyn TransportObserver>>>,
}

impl TcpInterleavedTransport {
    /// Wrap the write half of a control connection.
    ///
    /// The RTSP layer typically passes a `try_clone` of the stream it
    /// reads requests from.
    pub fn new(stream: TcpStream) -> Result<Self> {
        Self::with_write_timeout(stream, DEFAULT_WRITE_TIMEOUT)
    }

    /// Like [`new`](Self::new) with an explicit per-send write timeout.
    pub fn with_write_timeout(stream: TcpStream, timeout: Duration) -> Result<Self> {
        let peer_addr = stream.peer_addr()?;
        stream.set_nodelay(true)?;
        stream.set_write_timeout(Some(timeout))?;
        tracing::debug!(%peer_addr, ?timeout, "interleaved transport created");
        Ok(Self {
            writer: Mutex::new(stream),
            peer_addr,
            broken: AtomicBool::new(false),
            observer: Mutex::new(None),
        })
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Whether a failed write has desynchronised the `$` framing.
    pub fn is_broken(&self) -> bool {
        self.broken.load(Ordering::Acquire)
    }

    /// Forward one inbound `$` frame (e.g. RTCP receiver reports) read by
    /// the control connection to the observer.
    ///
    /// Returns the number of bytes the frame occupies in `data`, or
    /// `None` when `data` does not yet hold a complete frame.
    pub fn dispatch_frame(&self, data: &[u8]) -> Option<usize> {
        let header = InterleavedHeader::parse(data)?;
        let frame_len = header.frame_len();
        if data.len() < frame_len {
            return None;
        }
        if let Some(observer) = self.observer.lock().clone() {
            observer.on_receive(Some(header.channel), &data[4..frame_len]);
        } else {
            tracing::trace!(
                peer = %self.peer_addr,
                channel = header.channel,
                bytes = header.length,
                "interleaved frame dropped, no observer"
            );
        }
        Some(frame_len)
    }
}

impl Transport for TcpInterleavedTransport {
    fn send(&self, data: &[u8]) -> io::Result<()> {
        if self.is_broken() {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "interleaved transport broken by an earlier failed write",
            ));
        }
        let mut writer = self.writer.lock();
        writer.write_all(data).inspect_err(|e| {
            self.broken.store(true, Ordering::Release);
            tracing::warn!(peer = %self.peer_addr, error = %e, "interleaved write failed, transport marked broken");
        })
    }

    fn kind(&self) -> TransportKind {
        TransportKind::StreamInterleaved
    }

    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>) {
        *self.observer.lock() = observer;
    }
}
