//! Error types for the live streaming core.

/// Errors that can occur in the live streaming core.
///
/// Variants map to specific failure modes across the stack:
///
/// - **Registry**: [`DuplicateStream`](Self::DuplicateStream),
///   [`StreamNotFound`](Self::StreamNotFound),
///   [`SessionNotFound`](Self::SessionNotFound).
/// - **Transport**: [`TransportUnavailable`](Self::TransportUnavailable),
///   [`SendFailed`](Self::SendFailed), [`Io`](Self::Io).
/// - **Setup**: [`FrameTooLarge`](Self::FrameTooLarge),
///   [`InvalidConfig`](Self::InvalidConfig).
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// A binding with this stream id already exists in the session.
    #[error("stream {0} already added to session")]
    DuplicateStream(u32),

    /// The factory could not create a unicast transport, or no shared
    /// transport was supplied for an interleaved binding.
    #[error("transport unavailable: {0}")]
    TransportUnavailable(String),

    /// A packet (or the configured payload budget) does not fit the
    /// space available to carry it.
    #[error("frame too large: {size} bytes exceeds limit of {max}")]
    FrameTooLarge { size: usize, max: usize },

    /// Stream or session parameters are unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The transport reported a lower-layer failure while sending.
    #[error("send failed on stream {stream_id}: {source}")]
    SendFailed {
        stream_id: u32,
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O or socket error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// No media stream with the given id is registered.
    #[error("stream not found: {0}")]
    StreamNotFound(u32),

    /// No session with the given token is registered.
    #[error("session not found: {0}")]
    SessionNotFound(String),
}

/// Convenience alias for `Result<T, LiveError>`.
pub type Result<T> = std::result::Result<T, LiveError>;
