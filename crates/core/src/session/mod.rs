//! Per-viewer stream registry (RFC 2326 §3, §12.37).
//!
//! A [`Session`] is created once a viewer's transport negotiation
//! completes and holds one binding per subscribed media stream:
//!
//! - A unique, unpredictable session token (returned in the `Session`
//!   header by the RTSP layer).
//! - The stream bindings, each with its activation state, resync flag,
//!   transport and (for interleaved delivery) channel pair.
//!
//! ## Binding lifecycle
//!
//! ```text
//! add_unicast_stream / add_interleaved_stream -> inactive, needs resync
//! activate_stream                             -> active, needs resync
//! deliver_packet (first sync point sent)      -> active, in sync
//! deactivate_stream                           -> inactive
//! remove_stream / session drop                -> released
//! ```
//!
//! Every operation takes the session's single lock and holds it across
//! the transport send, so a slow stream transport stalls other calls on
//! the same session until it returns.

mod binding;
pub mod stats;

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use base64::prelude::{BASE64_URL_SAFE_NO_PAD, Engine as _};
use parking_lot::Mutex;

use crate::error::{LiveError, Result};
use crate::media::rtp::RTP_HEADER_LEN;
use crate::media::{DEFAULT_MTU, NetworkPacket};
use crate::transport::{Transport, TransportFactory, TransportKind};
use binding::StreamBinding;
pub use stats::{SessionStats, StatsSnapshot};

static SESSION_COUNTER: AtomicU32 = AtomicU32::new(0);

/// What a newly activated binding does before its first keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResyncPolicy {
    /// Drop packets until the first packet of a random-access access unit.
    #[default]
    WaitForKeyframe,
    /// Forward everything as soon as the binding is active.
    Immediate,
}

/// Session-level configuration.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Local address unicast transports bind to.
    pub local_host: String,
    /// Largest RTP packet the session will carry; sizes interleaved
    /// scratch buffers. Match the packetizer's `max_packet_size()`.
    pub max_packet_size: usize,
    pub resync: ResyncPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            local_host: "0.0.0.0".to_string(),
            max_packet_size: RTP_HEADER_LEN + DEFAULT_MTU,
            resync: ResyncPolicy::default(),
        }
    }
}

/// Outcome of [`Session::deliver_packet`] when nothing failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the transport.
    Sent,
    /// No binding for the stream, or the binding is inactive.
    Skipped,
    /// Dropped by the resync gate.
    AwaitingKeyframe,
}

/// Server-side state for one connected viewer.
pub struct Session {
    id: String,
    config: SessionConfig,
    factory: Arc<dyn TransportFactory>,
    streams: Mutex<Vec<StreamBinding>>,
    stats: SessionStats,
}

impl Session {
    pub fn new(factory: Arc<dyn TransportFactory>) -> Self {
        Self::with_config(factory, SessionConfig::default())
    }

    pub fn with_config(factory: Arc<dyn TransportFactory>, config: SessionConfig) -> Self {
        let id = generate_session_id();
        tracing::info!(session_id = %id, resync = ?config.resync, "session created");
        Self {
            id,
            config,
            factory,
            streams: Mutex::new(Vec::new()),
            stats: SessionStats::default(),
        }
    }

    /// Opaque session token.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Format the `Session` response header value per RFC 2326 §12.37.
    pub fn session_header_value(&self, timeout_secs: u64) -> String {
        format!("{};timeout={}", self.id, timeout_secs)
    }

    /// Bind `stream_id` to a new unicast transport from the factory.
    ///
    /// The binding starts inactive. Fails with
    /// [`DuplicateStream`](LiveError::DuplicateStream) if the id is taken
    /// and with [`TransportUnavailable`](LiveError::TransportUnavailable)
    /// if the factory fails; neither leaves anything registered.
    pub fn add_unicast_stream(
        &self,
        stream_id: u32,
        local_port_hint: u16,
        remote_ip: &str,
        remote_port: u16,
    ) -> Result<()> {
        let mut streams = self.streams.lock();
        if streams.iter().any(|b| b.stream_id == stream_id) {
            return Err(LiveError::DuplicateStream(stream_id));
        }

        let transport = self
            .factory
            .create_transport(
                &self.config.local_host,
                local_port_hint,
                remote_ip,
                remote_port,
            )
            .map_err(|e| {
                tracing::warn!(
                    session_id = %self.id,
                    stream_id,
                    remote_ip,
                    remote_port,
                    error = %e,
                    "unicast transport creation failed"
                );
                match e {
                    LiveError::TransportUnavailable(_) => e,
                    other => LiveError::TransportUnavailable(other.to_string()),
                }
            })?;

        streams.push(StreamBinding::unicast(
            stream_id,
            transport,
            self.config.max_packet_size,
        ));
        tracing::debug!(
            session_id = %self.id,
            stream_id,
            remote_ip,
            remote_port,
            total_streams = streams.len(),
            "unicast stream added"
        );
        Ok(())
    }

    /// Bind `stream_id` to the control connection's shared interleaved
    /// transport, sending media on `channels[0]`.
    pub fn add_interleaved_stream(
        &self,
        stream_id: u32,
        transport: Option<Arc<dyn Transport>>,
        channels: [u8; 2],
    ) -> Result<()> {
        let mut streams = self.streams.lock();
        if streams.iter().any(|b| b.stream_id == stream_id) {
            return Err(LiveError::DuplicateStream(stream_id));
        }

        let transport = transport.ok_or_else(|| {
            LiveError::TransportUnavailable(format!(
                "no interleaved transport supplied for stream {stream_id}"
            ))
        })?;

        streams.push(StreamBinding::interleaved(
            stream_id,
            transport,
            channels,
            self.config.max_packet_size,
        ));
        tracing::debug!(
            session_id = %self.id,
            stream_id,
            rtp_channel = channels[0],
            rtcp_channel = channels[1],
            total_streams = streams.len(),
            "interleaved stream added"
        );
        Ok(())
    }

    /// Release the binding for `stream_id`. Returns whether one existed.
    pub fn remove_stream(&self, stream_id: u32) -> bool {
        let removed = {
            let mut streams = self.streams.lock();
            let pos = streams.iter().position(|b| b.stream_id == stream_id);
            pos.map(|pos| streams.remove(pos))
        };

        match removed {
            Some(binding) => {
                drop(binding);
                tracing::debug!(session_id = %self.id, stream_id, "stream removed");
                true
            }
            None => false,
        }
    }

    /// Allow `stream_id` to send. Re-arms the resync gate when the
    /// binding was inactive. Returns whether the binding exists.
    pub fn activate_stream(&self, stream_id: u32) -> bool {
        let mut streams = self.streams.lock();
        let Some(binding) = streams.iter_mut().find(|b| b.stream_id == stream_id) else {
            return false;
        };
        if !binding.active {
            binding.active = true;
            binding.needs_resync = true;
            tracing::debug!(session_id = %self.id, stream_id, "stream activated");
        }
        true
    }

    /// Stop `stream_id` from sending without releasing it (PAUSE).
    pub fn deactivate_stream(&self, stream_id: u32) -> bool {
        let mut streams = self.streams.lock();
        let Some(binding) = streams.iter_mut().find(|b| b.stream_id == stream_id) else {
            return false;
        };
        if binding.active {
            binding.active = false;
            tracing::debug!(session_id = %self.id, stream_id, "stream deactivated");
        }
        true
    }

    /// Route one packet to the binding for `stream_id`.
    ///
    /// Interleaved bindings frame the packet on their media channel into
    /// the binding's scratch buffer; datagram bindings send it as is.
    /// Absent and inactive bindings never touch their transport.
    ///
    /// A transport failure is counted and returned as
    /// [`SendFailed`](LiveError::SendFailed); it is not retried.
    pub fn deliver_packet(&self, stream_id: u32, packet: &NetworkPacket) -> Result<Delivery> {
        let mut streams = self.streams.lock();
        let Some(binding) = streams.iter_mut().find(|b| b.stream_id == stream_id) else {
            return Ok(Delivery::Skipped);
        };
        if !binding.active {
            return Ok(Delivery::Skipped);
        }

        if binding.needs_resync
            && self.config.resync == ResyncPolicy::WaitForKeyframe
            && !packet.is_sync_point()
        {
            self.stats.record_awaiting_keyframe();
            tracing::trace!(session_id = %self.id, stream_id, "packet dropped awaiting keyframe");
            return Ok(Delivery::AwaitingKeyframe);
        }

        match binding.send(packet) {
            Ok(bytes) => {
                binding.needs_resync = false;
                self.stats.record_sent(bytes);
                tracing::trace!(session_id = %self.id, stream_id, bytes, "packet sent");
                Ok(Delivery::Sent)
            }
            Err(e) => {
                self.stats.record_failure();
                tracing::warn!(session_id = %self.id, stream_id, error = %e, "packet send failed");
                Err(e)
            }
        }
    }

    /// Release every binding. Returns how many were removed.
    pub fn teardown(&self) -> usize {
        let streams = std::mem::take(&mut *self.streams.lock());
        let removed = streams.len();
        drop(streams);
        if removed > 0 {
            tracing::debug!(session_id = %self.id, removed, "session streams released");
        }
        removed
    }

    pub fn stream_count(&self) -> usize {
        self.streams.lock().len()
    }

    /// Stream ids in insertion order.
    pub fn stream_ids(&self) -> Vec<u32> {
        self.streams.lock().iter().map(|b| b.stream_id).collect()
    }

    pub fn contains_stream(&self, stream_id: u32) -> bool {
        self.streams.lock().iter().any(|b| b.stream_id == stream_id)
    }

    /// `None` if the stream is not bound.
    pub fn is_active(&self, stream_id: u32) -> Option<bool> {
        self.with_binding(stream_id, |b| b.active)
    }

    /// `None` if the stream is not bound.
    pub fn needs_resync(&self, stream_id: u32) -> Option<bool> {
        self.with_binding(stream_id, |b| b.needs_resync)
    }

    /// Interleaved `[rtp, rtcp]` channels, if the stream is framed.
    pub fn channels(&self, stream_id: u32) -> Option<[u8; 2]> {
        self.with_binding(stream_id, |b| b.channels()).flatten()
    }

    pub fn transport_kind(&self, stream_id: u32) -> Option<TransportKind> {
        self.with_binding(stream_id, |b| b.transport().kind())
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn with_binding<R>(&self, stream_id: u32, f: impl FnOnce(&StreamBinding) -> R) -> Option<R> {
        self.streams
            .lock()
            .iter()
            .find(|b| b.stream_id == stream_id)
            .map(f)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        let removed = self.teardown();
        tracing::info!(session_id = %self.id, removed, "session closed");
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("streams", &*self.streams.lock())
            .finish_non_exhaustive()
    }
}

/// 12 random bytes for unpredictability plus a 4-byte process-wide
/// counter so concurrently live sessions never collide.
fn generate_session_id() -> String {
    let mut raw = [0u8; 16];
    raw[..12].copy_from_slice(&rand::random::<[u8; 12]>());
    raw[12..].copy_from_slice(&SESSION_COUNTER.fetch_add(1, Ordering::SeqCst).to_be_bytes());
    BASE64_URL_SAFE_NO_PAD.encode(raw)
}
