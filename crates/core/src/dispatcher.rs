use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock};

use crate::error::{LiveError, Result};
use crate::media::h264::H264Packetizer;
use crate::media::{MediaFrame, Packetizer, StreamParams};
use crate::session::{Delivery, Session};

/// A live media stream fed by the application.
///
/// Owns the stream's packetizer and tracks which sessions subscribed to it.
pub struct MediaStream {
    id: u32,
    packetizer: Mutex<Box<dyn Packetizer>>,
    subscribers: RwLock<Vec<Arc<Session>>>,
}

impl MediaStream {
    fn new(id: u32, packetizer: Box<dyn Packetizer>) -> Self {
        Self {
            id,
            packetizer: Mutex::new(packetizer),
            subscribers: RwLock::new(Vec::new()),
        }
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    /// Largest RTP packet this stream produces.
    pub fn max_packet_size(&self) -> usize {
        self.packetizer.lock().max_packet_size()
    }

    pub fn payload_type(&self) -> u8 {
        self.packetizer.lock().payload_type()
    }

    pub fn clock_rate(&self) -> u32 {
        self.packetizer.lock().clock_rate()
    }

    /// Next RTP sequence number (for the `RTP-Info` header).
    pub fn next_sequence(&self) -> u16 {
        self.packetizer.lock().next_sequence()
    }

    /// Subscribe a session. Subscribing twice is a no-op.
    pub fn subscribe(&self, session: Arc<Session>) {
        let mut subs = self.subscribers.write();
        if !subs.iter().any(|s| s.id() == session.id()) {
            tracing::debug!(stream_id = self.id, session_id = %session.id(), "session subscribed");
            subs.push(session);
        }
    }

    pub fn unsubscribe(&self, session_id: &str) -> bool {
        let mut subs = self.subscribers.write();
        match subs.iter().position(|s| s.id() == session_id) {
            Some(pos) => {
                subs.swap_remove(pos);
                tracing::debug!(stream_id = self.id, session_id, "session unsubscribed");
                true
            }
            None => false,
        }
    }

    pub fn subscriber_ids(&self) -> Vec<String> {
        self.subscribers
            .read()
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }
}

/// Per-frame delivery tally from [`Dispatcher::push_frame`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    /// RTP packets produced for the frame.
    pub packets: usize,
    /// Packet sends that reached a transport.
    pub sent: usize,
    /// Deliveries skipped (inactive binding or awaiting keyframe).
    pub skipped: usize,
    /// Deliveries that failed.
    pub failed: usize,
}

/// Owns live media streams and viewer sessions, and fans each pushed
/// frame out to every session subscribed to its stream.
#[derive(Clone)]
pub struct Dispatcher {
    streams: Arc<RwLock<HashMap<u32, Arc<MediaStream>>>>,
    sessions: Arc<RwLock<HashMap<String, Arc<Session>>>>,
    next_stream_id: Arc<AtomicU32>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
            sessions: Arc::new(RwLock::new(HashMap::new())),
            next_stream_id: Arc::new(AtomicU32::new(1)),
        }
    }

    /// Register an H.264 stream. Fails if the parameters are unusable.
    pub fn add_stream(&self, params: StreamParams) -> Result<u32> {
        let packetizer = H264Packetizer::new(params)?;
        Ok(self.add_stream_with(Box::new(packetizer)))
    }

    /// Register a stream with a caller-built packetizer.
    pub fn add_stream_with(&self, packetizer: Box<dyn Packetizer>) -> u32 {
        let id = self.next_stream_id.fetch_add(1, Ordering::SeqCst);
        let codec = packetizer.codec_name();
        self.streams
            .write()
            .insert(id, Arc::new(MediaStream::new(id, packetizer)));
        tracing::info!(stream_id = id, codec, "media stream registered");
        id
    }

    pub fn stream(&self, stream_id: u32) -> Option<Arc<MediaStream>> {
        self.streams.read().get(&stream_id).cloned()
    }

    /// Unregister a stream and release its bindings in every subscribed
    /// session.
    pub fn remove_stream(&self, stream_id: u32) -> bool {
        let Some(stream) = self.streams.write().remove(&stream_id) else {
            return false;
        };
        let subs = std::mem::take(&mut *stream.subscribers.write());
        for session in &subs {
            session.remove_stream(stream_id);
        }
        tracing::info!(stream_id, released = subs.len(), "media stream removed");
        true
    }

    /// Register a viewer session.
    pub fn add_session(&self, session: Session) -> Arc<Session> {
        let session = Arc::new(session);
        let mut sessions = self.sessions.write();
        sessions.insert(session.id().to_string(), session.clone());
        tracing::debug!(session_id = %session.id(), total_sessions = sessions.len(), "session registered");
        session
    }

    pub fn session(&self, session_id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(session_id).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Route `stream_id`'s packets to `session_id`. The session must
    /// already hold a binding for the stream to actually receive them.
    ///
    /// Fails with [`FrameTooLarge`](LiveError::FrameTooLarge) when the
    /// session's packet limit, which sizes its interleaved scratch
    /// buffers, is smaller than the largest packet the stream produces.
    pub fn subscribe(&self, stream_id: u32, session_id: &str) -> Result<()> {
        let stream = self
            .stream(stream_id)
            .ok_or(LiveError::StreamNotFound(stream_id))?;
        let session = self
            .session(session_id)
            .ok_or_else(|| LiveError::SessionNotFound(session_id.to_string()))?;

        let needed = stream.max_packet_size();
        let limit = session.config().max_packet_size;
        if needed > limit {
            tracing::warn!(
                stream_id,
                session_id,
                max_packet_size = needed,
                session_limit = limit,
                "subscription rejected, stream packets exceed session limit"
            );
            return Err(LiveError::FrameTooLarge {
                size: needed,
                max: limit,
            });
        }
        stream.subscribe(session);
        Ok(())
    }

    /// Unregister a session and unsubscribe it from every stream.
    ///
    /// Its bindings are released once the returned handle (and any other
    /// clone) is dropped.
    pub fn remove_session(&self, session_id: &str) -> Option<Arc<Session>> {
        let removed = self.sessions.write().remove(session_id)?;
        for stream in self.streams.read().values() {
            stream.unsubscribe(session_id);
        }
        tracing::debug!(session_id, "session unregistered");
        Some(removed)
    }

    /// Packetize one frame and deliver every packet to every subscriber.
    pub fn push_frame(&self, stream_id: u32, frame: &MediaFrame<'_>) -> Result<PushReport> {
        let stream = self
            .stream(stream_id)
            .ok_or(LiveError::StreamNotFound(stream_id))?;

        let packets = stream.packetizer.lock().packetize(frame);
        let subscribers = stream.subscribers.read().clone();

        let mut report = PushReport {
            packets: packets.len(),
            ..PushReport::default()
        };

        for packet in &packets {
            for session in &subscribers {
                match session.deliver_packet(stream_id, packet) {
                    Ok(Delivery::Sent) => report.sent += 1,
                    Ok(Delivery::Skipped | Delivery::AwaitingKeyframe) => report.skipped += 1,
                    Err(_) => report.failed += 1,
                }
            }
        }

        tracing::trace!(
            stream_id,
            packets = report.packets,
            sent = report.sent,
            skipped = report.skipped,
            failed = report.failed,
            "frame dispatched"
        );
        Ok(report)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}
