pub mod dispatcher;
pub mod error;
pub mod media;
pub mod session;
pub mod transport;

pub use dispatcher::{Dispatcher, MediaStream, PushReport};
pub use error::{LiveError, Result};
pub use media::{FrameType, MediaFrame, NetworkPacket, Packetizer, StreamParams};
pub use session::{Delivery, ResyncPolicy, Session, SessionConfig};
pub use transport::{Transport, TransportFactory, TransportKind};
