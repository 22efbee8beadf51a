use std::net::{IpAddr, SocketAddr, UdpSocket};
use std::sync::Arc;

use parking_lot::Mutex;

use super::{Transport, TransportFactory, TransportKind, TransportObserver};
use crate::error::{LiveError, Result};

/// Unicast UDP transport for one stream binding.
///
/// The socket is bound to the local port hint and connected to the
/// viewer's RTP port, so [`send`](Transport::send) never needs an address.
pub struct UdpTransport {
    socket: UdpSocket,
    observer: Mutex<Option<Arc<dyn TransportObserver>>>,
}

impl UdpTransport {
    /// Bind `local` and connect to `remote`.
    pub fn connect(local: SocketAddr, remote: SocketAddr) -> Result<Self> {
        let socket = UdpSocket::bind(local)?;
        socket.connect(remote)?;
        let local = socket.local_addr()?;
        tracing::debug!(%local, %remote, "UDP transport connected");
        Ok(Self {
            socket,
            observer: Mutex::new(None),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.local_addr()?)
    }

    pub fn peer_addr(&self) -> Result<SocketAddr> {
        Ok(self.socket.peer_addr()?)
    }

    /// Receive one datagram from the peer and hand it to the observer.
    ///
    /// Blocks according to the socket's read timeout. Returns the
    /// datagram size.
    pub fn receive_once(&self, buf: &mut [u8]) -> Result<usize> {
        let n = self.socket.recv(buf)?;
        if let Some(observer) = self.observer.lock().clone() {
            observer.on_receive(None, &buf[..n]);
        }
        Ok(n)
    }

    pub fn set_read_timeout(&self, timeout: Option<std::time::Duration>) -> Result<()> {
        Ok(self.socket.set_read_timeout(timeout)?)
    }
}

impl Transport for UdpTransport {
    fn send(&self, data: &[u8]) -> std::io::Result<()> {
        self.socket.send(data).map(|_| ())
    }

    fn kind(&self) -> TransportKind {
        TransportKind::Datagram
    }

    fn set_observer(&self, observer: Option<Arc<dyn TransportObserver>>) {
        *self.observer.lock() = observer;
    }
}

/// [`TransportFactory`] producing [`UdpTransport`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct UdpTransportFactory;

impl TransportFactory for UdpTransportFactory {
    fn create_transport(
        &self,
        local_host: &str,
        local_port_hint: u16,
        remote_ip: &str,
        remote_port: u16,
    ) -> Result<Box<dyn Transport>> {
        let local_ip: IpAddr = local_host.parse().map_err(|_| {
            LiveError::TransportUnavailable(format!("invalid local host: {local_host}"))
        })?;
        let remote_ip: IpAddr = remote_ip.parse().map_err(|_| {
            LiveError::TransportUnavailable(format!("invalid remote ip: {remote_ip}"))
        })?;

        let local = SocketAddr::new(local_ip, local_port_hint);
        let remote = SocketAddr::new(remote_ip, remote_port);

        let transport = UdpTransport::connect(local, remote).map_err(|e| {
            tracing::warn!(%local, %remote, error = %e, "UDP transport creation failed");
            LiveError::TransportUnavailable(format!("{local} -> {remote}: {e}"))
        })?;
        Ok(Box::new(transport))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Capture(Mutex<Vec<Vec<u8>>>);

    impl TransportObserver for Capture {
        fn on_receive(&self, channel: Option<u8>, data: &[u8]) {
            assert!(channel.is_none());
            self.0.lock().push(data.to_vec());
        }
    }

    #[test]
    fn sends_raw_datagram_to_peer() {
        let viewer = UdpSocket::bind("127.0.0.1:0").unwrap();
        viewer.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let port = viewer.local_addr().unwrap().port();

        let transport = UdpTransportFactory
            .create_transport("127.0.0.1", 0, "127.0.0.1", port)
            .unwrap();
        assert_eq!(transport.kind(), TransportKind::Datagram);
        transport.send(&[0x80, 0x60, 0x00, 0x01]).unwrap();

        let mut buf = [0u8; 16];
        let n = viewer.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], &[0x80, 0x60, 0x00, 0x01]);
    }

    #[test]
    fn invalid_remote_is_unavailable() {
        let err = UdpTransportFactory
            .create_transport("127.0.0.1", 0, "not-an-ip", 5000)
            .err()
            .unwrap();
        assert!(matches!(err, LiveError::TransportUnavailable(_)));
    }

    #[test]
    fn port_in_use_is_unavailable() {
        let taken = UdpSocket::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let result = UdpTransportFactory.create_transport("127.0.0.1", port, "127.0.0.1", 5000);
        assert!(matches!(result, Err(LiveError::TransportUnavailable(_))));
    }

    #[test]
    fn observer_receives_inbound() {
        let viewer = UdpSocket::bind("127.0.0.1:0").unwrap();
        let transport = UdpTransport::connect(
            "127.0.0.1:0".parse().unwrap(),
            viewer.local_addr().unwrap(),
        )
        .unwrap();
        transport
            .set_read_timeout(Some(Duration::from_secs(2)))
            .unwrap();

        let capture = Arc::new(Capture(Mutex::new(Vec::new())));
        transport.set_observer(Some(capture.clone() as Arc<dyn TransportObserver>));

        viewer
            .send_to(&[1, 2, 3], transport.local_addr().unwrap())
            .unwrap();
        let mut buf = [0u8; 16];
        assert_eq!(transport.receive_once(&mut buf).unwrap(), 3);
        assert_eq!(*capture.0.lock(), vec![vec![1u8, 2, 3]]);
    }
}
