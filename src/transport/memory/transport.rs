// src/transport/memory/transport.rs

//! In-memory transport implementation.
//!
//! This file contains the concrete implementation of the domain-level
//! `Transport` trait using in-process data structures only.
//!
//! The memory transport is the **reference implementation** of transport
//! semantics. A host-backed transport is expected to approximate this
//! behavior as closely as its platform allows and to document any
//! unavoidable deviations.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};

use crate::{Error, Inbound, Result, SubscriptionHandle, Transport, TransportPtr};

/// In-memory transport.
///
/// Simulates the proxy end of the plugin-message pipe entirely within the
/// process, for testing and for validating higher-level behavior without
/// host, network, or timing variability.
///
/// ## Semantics
///
/// - Subscriptions are registered immediately; once `subscribe()` returns,
///   subsequent injected frames are deliverable.
/// - Delivery is deterministic and in injection order.
/// - `send()` fails with `NoRoute` while the simulated carrier is offline.
/// - Dropping a `SubscriptionHandle` implicitly unregisters it.
///
/// ## Non-Goals
///
/// - Emulating any specific host platform's channel registration rules
/// - Network behavior or failure simulation
struct MemoryTransport {
    // ---
    online: AtomicBool,
    outbound: mpsc::UnboundedSender<Bytes>,
    subscribers: RwLock<Vec<mpsc::Sender<Inbound>>>,
}

#[async_trait::async_trait]
impl Transport for MemoryTransport {
    // ---

    /// Hand the frame to the remote end.
    ///
    /// Fails with `NoRoute` while offline, modeling "no carrier connection
    /// available to piggyback the plugin message on".
    async fn send(&self, frame: Bytes) -> Result<()> {
        // ---
        if !self.online.load(Ordering::SeqCst) {
            return Err(Error::NoRoute);
        }

        self.outbound
            .send(frame)
            .map_err(|_| Error::Transport("remote end dropped".to_string()))
    }

    /// Register a subscription.
    async fn subscribe(&self, capacity: usize) -> Result<SubscriptionHandle> {
        // ---
        let (tx, rx) = mpsc::channel(capacity.max(1));

        let mut subs = self.subscribers.write().await;
        subs.push(tx);

        Ok(SubscriptionHandle { inbox: rx })
    }

    /// Close the transport.
    ///
    /// Clears all subscriptions; pending inboxes observe end-of-stream.
    async fn close(&self) -> Result<()> {
        // ---
        let mut subs = self.subscribers.write().await;
        subs.clear();
        Ok(())
    }
}

/// The simulated proxy end of the in-memory pipe.
///
/// Tests drive the protocol from here: read the frames the client sent,
/// inject reply or forwarded frames back, and toggle carrier availability.
pub struct MemoryRemote {
    // ---
    sent: mpsc::UnboundedReceiver<Bytes>,
    transport: Arc<MemoryTransport>,
}

impl MemoryRemote {
    // ---

    /// Next frame the client sent, in send order.
    pub async fn next_sent(&mut self) -> Option<Bytes> {
        self.sent.recv().await
    }

    /// Next sent frame if one is already queued, without waiting.
    pub fn sent_now(&mut self) -> Option<Bytes> {
        self.sent.try_recv().ok()
    }

    /// Inject an inbound frame to every subscriber.
    ///
    /// `frame` must start with the envelope tag string, as it would coming
    /// off the real pipe.
    pub async fn deliver(&self, sender: &str, frame: impl Into<Bytes>) {
        // ---
        let msg = Inbound {
            sender: Arc::from(sender),
            frame: frame.into(),
        };

        let subs = self.transport.subscribers.read().await;
        for sub in subs.iter() {
            // Ignore send failures; a closed channel indicates a dropped
            // SubscriptionHandle.
            let _ = sub.send(msg.clone()).await;
        }
    }

    /// Toggle carrier availability for `send()`.
    pub fn set_online(&self, online: bool) {
        self.transport.online.store(online, Ordering::SeqCst);
    }
}

/// Create a new in-memory transport and its remote end.
///
/// Always available; requires no external resources. The carrier starts
/// online.
pub async fn create_transport() -> Result<(TransportPtr, MemoryRemote)> {
    // ---
    let (out_tx, out_rx) = mpsc::unbounded_channel();

    let transport = Arc::new(MemoryTransport {
        // ---
        online: AtomicBool::new(true),
        outbound: out_tx,
        subscribers: RwLock::new(Vec::new()),
    });

    let remote = MemoryRemote {
        sent: out_rx,
        transport: transport.clone(),
    };

    Ok((transport, remote))
}
