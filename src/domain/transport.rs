// src/domain/transport.rs

//! Transport domain abstractions.
//!
//! This module defines the domain-level interface the correlator needs from
//! the host: send raw request frames on the outgoing plugin channel, and
//! receive raw inbound frames with the identity of the carrier that
//! delivered them. It intentionally avoids any reference to a concrete host
//! API or server platform.
//!
//! The transport layer is responsible only for byte delivery and for
//! carrier selection (which connection carries an outbound frame when
//! several are eligible). Reply correlation and forward routing are handled
//! by [`crate::BungeeClient`].
//!
//! Concrete implementations live under `src/transport/`.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::Result;

/// An inbound plugin message delivered by the host.
#[derive(Clone, Debug)]
pub struct Inbound {
    // ---
    /// Identity of the carrier (player connection) the frame arrived
    /// through. Opaque to the correlator; passed through to forward
    /// handlers.
    pub sender: Arc<str>,

    /// Raw frame bytes, starting with the envelope tag string.
    pub frame: Bytes,
}

/// Handle returned from a successful subscription.
///
/// The subscription remains active until either the handle is dropped
/// (receiver channel closes) or the transport is closed.
pub struct SubscriptionHandle {
    // ---
    /// Receiver channel for inbound frames.
    pub inbox: mpsc::Receiver<Inbound>,
}

/// Transport abstraction.
///
/// A `Transport` provides best-effort delivery of raw plugin-message frames
/// between this client and the proxy. It defines the minimal contract the
/// correlator requires without committing to any host platform.
///
/// Implementations must ensure that:
/// - Once `subscribe()` returns successfully, frames arriving *after* that
///   point are deliverable to the returned inbox.
/// - `send()` fails with [`Error::NoRoute`](crate::Error::NoRoute) when no
///   eligible carrier exists, without side effects.
/// - Frames from one carrier are delivered in arrival order. The protocol's
///   correlation discipline depends on this.
///
/// The in-memory transport serves as the reference implementation of these
/// semantics.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    // ---

    /// Send an encoded request frame on the outgoing plugin channel.
    ///
    /// The transport selects the carrier connection; which one is used is
    /// not observable to the correlator.
    async fn send(&self, frame: Bytes) -> Result<()>;

    /// Register for inbound frames and return a handle for receiving them.
    ///
    /// `capacity` bounds the inbox buffer.
    async fn subscribe(&self, capacity: usize) -> Result<SubscriptionHandle>;

    /// Close the transport and release any associated resources.
    async fn close(&self) -> Result<()>;
}

/// Shared transport pointer.
///
/// An `Arc<dyn Transport>`: `.clone()` is cheap, clones share the same
/// underlying connection, and concrete transport types stay hidden behind
/// the domain interface.
pub type TransportPtr = Arc<dyn Transport>;
