//! Client-side correlator for the BungeeCord plugin-messaging protocol.
//!
//! One duplex byte channel carries typed requests, typed responses, and
//! unsolicited forwarded messages, with no per-message identifier on the
//! wire. This crate handles the binary framing, the per-operation FIFO
//! matching of untagged replies to pending callers, and the routing of
//! forwarded subchannel messages to registered handlers.
//!

// Import all sub modules once...
mod client;
mod domain;
mod registry;
mod transport;

mod config;
mod protocol;

mod error;
mod macros;

pub(crate) use macros::{log_debug, log_error, log_warn};

// Re-export main types
pub use client::{BungeeClient, ReplyHandle, WeakClient};

pub use client::{ForwardHandler, ForwardScope};

pub use config::ClientConfig;
pub use error::{Error, Result};
pub use registry::ClientRegistry;

pub use transport::{create_memory_transport, MemoryRemote};

// --- public re-exports
pub use domain::{
    //
    Inbound,
    SubscriptionHandle,
    Transport,
    TransportPtr,
};

pub use protocol::{
    //
    ByteReader,
    ByteWriter,
    HostPort,
    Reply,
    Request,
    ENVELOPE_MARKER,
};
