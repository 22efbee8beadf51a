//! Transports that carry RTP packets to a viewer.
//!
//! RTSP negotiates one of two delivery paths per stream:
//!
//! - **Datagram** ([`udp`]): RTP goes to the viewer's `client_port` over
//!   a unicast UDP socket. Each stream binding owns its own socket.
//!
//! - **Interleaved** ([`tcp`]): RTP rides the RTSP control connection,
//!   each packet wrapped in a `$` frame ([`interleaved`], RFC 2326
//!   §10.12). One connection is shared by every stream negotiated on it.
//!
//! Both sit behind the [`Transport`] trait so the session registry can
//! route packets without knowing which one it holds.

pub mod interleaved;
pub mod tcp;
pub mod udp;

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use crate::error::Result;

pub use interleaved::{InterleavedFrame, InterleavedHeader};
pub use tcp::TcpInterleavedTransport;
pub use udp::{UdpTransport, UdpTransportFactory};

/// Delivery mechanism behind a [`Transport`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportKind {
    /// Connectionless; packets are sent unframed.
    Datagram,
    /// Byte stream; packets must be wrapped in interleaved frames.
    StreamInterleaved,
}

/// Receives inbound data from a transport (RTCP, interleaved frames).
///
/// Used by control-plane code; the media path never registers one.
pub trait TransportObserver: Send + Sync {
    fn on_receive(&self, channel: Option<u8>, data: &[u8]);
}

/// Best-effort send capability shared by datagram and stream transports.
pub trait Transport: Send + Sync {
    /// Send one buffer. Datagram transports do not block; stream
    /// transports may block briefly under backpressure.
    fn send(&self, data: &[u8]) -> std::io::Result<()>;

    fn kind(&self) -> TransportKind;

    /// Install or clear (with `None`) the inbound observer.
    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>);
}

/// Creates unicast transports for [`Session::add_unicast_stream`](crate::Session::add_unicast_stream).
pub trait TransportFactory: Send + Sync {
    /// Bind to `local_host:local_port_hint` and target
    /// `remote_ip:remote_port`. A hint of `0` picks an ephemeral port.
    fn create_transport(
        &self,
        local_host: &str,
        local_port_hint: u16,
        remote_ip: &str,
        remote_port: u16,
    ) -> Result<Box<dyn Transport>>;
}

/// A binding's hold on its transport.
///
/// Unicast transports belong to exactly one binding; interleaved ones
/// are shared with every sibling binding on the same control connection
/// and are released when the last holder drops.
pub enum TransportHandle {
    Exclusive(Box<dyn Transport>),
    Shared(Arc<dyn Transport>),
}

impl TransportHandle {
    pub fn is_shared(&self) -> bool {
        matches!(self, Self::Shared(_))
    }
}

impl Deref for TransportHandle {
    type Target = dyn Transport;

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Exclusive(t) => t.as_ref(),
            Self::Shared(t) => t.as_ref(),
        }
    }
}

impl fmt::Debug for TransportHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ownership = if self.is_shared() { "Shared" } else { "Exclusive" };
        f.debug_tuple(ownership).field(&self.kind()).finish()
    }
}
