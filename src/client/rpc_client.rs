// src/client/rpc_client.rs

//! Plugin-messaging client implementation.
//!
//! This module contains the core [`BungeeClient`] type which issues requests
//! to the proxy and correlates the untagged responses coming back over the
//! same pipe.
//!
//! # Architecture
//!
//! The client subscribes to inbound frames on the configured transport and
//! runs a background receive loop feeding [`BungeeClient::dispatch`]. The
//! wire format has no request identifier, so correlation is per-operation
//! FIFO: each `issue()` appends a oneshot waiter to the queue for its
//! operation name, and the next inbound reply of that operation resolves the
//! oldest waiter. An inbound frame whose operation has no queue is a
//! *forwarded* frame on a custom subchannel and is routed to the registered
//! forward handlers instead.
//!
//! # Concurrency
//!
//! Enqueue and send are serialized under an async gate so that local
//! issuance order always equals wire order — the only correlation key this
//! protocol has. The waiter queues and the forward route table sit behind
//! independent mutexes, and no lock is held while resolving a waiter or
//! running a forward handler: handler code may re-enter the client.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time;

use crate::protocol::{ByteReader, HostPort, Reply, Request};
use crate::{
    // ---
    log_debug,
    log_error,
    log_warn,
    ClientConfig,
    Error,
    ForwardHandler,
    ForwardScope,
    Result,
    TransportPtr,
};

use super::forward::ForwardRoutes;
use super::lock_ignore_poison;
use super::pending::PendingQueues;

/// Running plugin-messaging client instance.
///
/// Owns the pending-waiter queues and the forward route table for one
/// logical session. Cheap to clone (internally `Arc`-backed).
///
/// # Example
///
/// ```
/// use bungee_channel::{create_memory_transport, BungeeClient, ClientConfig};
///
/// # async fn example() -> bungee_channel::Result<()> {
/// let (transport, _remote) = create_memory_transport().await?;
/// let client = BungeeClient::with_transport(transport, ClientConfig::default()).await?;
///
/// // Fire-and-forget: move the carrier player to another server.
/// client.connect("lobby-1").await?;
///
/// // Correlated: resolves when the proxy's reply frame arrives.
/// let count = client.player_count("ALL");
/// # let _ = count;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BungeeClient {
    inner: Arc<Inner>,
}

/// Non-owning handle to a client, for owner-keyed registries.
#[derive(Clone)]
pub struct WeakClient {
    inner: Weak<Inner>,
}

impl WeakClient {
    /// Upgrade to a live client, if the session still exists.
    pub fn upgrade(&self) -> Option<BungeeClient> {
        self.inner.upgrade().map(|inner| BungeeClient { inner })
    }
}

struct Inner {
    // ---
    transport: TransportPtr,
    config: ClientConfig,
    pending: Mutex<PendingQueues>,
    routes: Mutex<ForwardRoutes>,

    /// Serializes enqueue+send so issuance order equals wire order.
    send_gate: tokio::sync::Mutex<()>,

    /// Best-effort receive loop handle.
    ///
    /// We keep it so the task isn't immediately dropped, and so it can be
    /// extended later (shutdown, join-on-close, etc.).
    _rx_task: JoinHandle<()>,
}

/// Handle to one outstanding request.
///
/// Resolves at most once, from a later inbound reply of the same operation.
/// The protocol has no timeout and no way to cancel a specific in-flight
/// request (the queue is strictly FIFO and the wire has no request ID), so
/// a reply that never comes leaves the handle pending until teardown.
pub struct ReplyHandle {
    // ---
    rx: oneshot::Receiver<Reply>,
    timeout: Option<Duration>,
}

impl ReplyHandle {
    /// Await the correlated reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Abandoned`] if `teardown()` dropped the waiter before a
    ///   reply arrived
    /// - [`Error::Timeout`] if the session configured a request timeout and
    ///   it elapsed
    pub async fn recv(self) -> Result<Reply> {
        // ---
        match self.timeout {
            Some(limit) => match time::timeout(limit, self.rx).await {
                Ok(Ok(reply)) => Ok(reply),
                Ok(Err(_)) => Err(Error::Abandoned),
                Err(_) => Err(Error::Timeout),
            },
            None => self.rx.await.map_err(|_| Error::Abandoned),
        }
    }
}

impl BungeeClient {
    // ---

    /// Create a client over an explicitly provided transport.
    ///
    /// Subscribes to inbound frames and spawns the receive loop. The loop
    /// holds only a weak back-reference; dropping the last client handle
    /// ends it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the inbound subscription cannot be
    /// established.
    pub async fn with_transport(transport: TransportPtr, config: ClientConfig) -> Result<Self> {
        // ---
        let mut handle = transport.subscribe(config.inbox_capacity).await?;

        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            // ---
            let weak = weak.clone();

            // Spawn receive loop.
            let rx_task = tokio::spawn(async move {
                // ---
                loop {
                    match handle.inbox.recv().await {
                        Some(msg) => {
                            if let Some(inner) = weak.upgrade() {
                                let client = BungeeClient { inner };
                                if let Err(_err) = client.dispatch(&msg.sender, &msg.frame) {
                                    log_error!("inbound frame dropped: {_err}");
                                }
                            } else {
                                // Inner was dropped, exit loop
                                break;
                            }
                        }
                        None => {
                            // Transport closed or subscription dropped.
                            log_debug!("transport closed or subscription dropped");
                            break;
                        }
                    }
                }
            });

            Inner {
                // ---
                transport,
                config,
                pending: Mutex::new(PendingQueues::new()),
                routes: Mutex::new(ForwardRoutes::default()),
                send_gate: tokio::sync::Mutex::new(()),
                _rx_task: rx_task,
            }
        });

        Ok(Self { inner })
    }

    /// Downgrade to a non-owning handle.
    pub fn downgrade(&self) -> WeakClient {
        WeakClient {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Issue a request and register a pending waiter for its reply.
    ///
    /// The waiter is appended to the FIFO queue for the request's operation
    /// name before the frame goes out, under a gate that keeps issuance
    /// order equal to wire order. The returned handle resolves at most
    /// once, only from a later [`dispatch`](Self::dispatch) of a matching
    /// reply.
    ///
    /// # Errors
    ///
    /// - [`Error::Oversized`] if a request field exceeds the wire format's
    ///   16-bit length prefix (no waiter is created)
    /// - [`Error::NoRoute`] if the transport has no eligible carrier; the
    ///   waiter is rolled back and the queues are left as they were
    pub async fn issue(&self, request: Request) -> Result<ReplyHandle> {
        // ---
        let frame = request.encode()?;
        let op = request.op();

        let _gate = self.inner.send_gate.lock().await;

        let (ticket, rx, created_queue) = {
            let mut pending = lock_ignore_poison(&self.inner.pending);
            let created_queue = !pending.has_queue(op);
            let (ticket, rx) = pending.push(op);
            (ticket, rx, created_queue)
        };

        if let Err(err) = self.inner.transport.send(frame).await {
            // Roll back so the failed issuance is not observable: a ghost
            // waiter would steal the reply of a later caller, and a ghost
            // queue entry would flip reply-vs-forward for this operation.
            let mut pending = lock_ignore_poison(&self.inner.pending);
            pending.abandon(op, ticket);
            if created_queue {
                pending.remove_if_empty(op);
            }
            return Err(err);
        }

        Ok(ReplyHandle {
            rx,
            timeout: self.inner.config.request_timeout,
        })
    }

    /// Send a fire-and-forget request (no waiter, no reply).
    ///
    /// Takes the same send gate as [`issue`](Self::issue) so the total wire
    /// order matches call order.
    ///
    /// # Errors
    ///
    /// [`Error::Oversized`] or [`Error::NoRoute`], as for `issue`.
    pub async fn send(&self, request: Request) -> Result<()> {
        // ---
        let frame = request.encode()?;

        let _gate = self.inner.send_gate.lock().await;
        self.inner.transport.send(frame).await
    }

    /// Consume one inbound frame: resolve a pending waiter or route a
    /// forwarded message.
    ///
    /// The frame's leading string is the envelope tag; a tag that does not
    /// match the configured channel (case-insensitively) means the frame
    /// belongs to some other protocol sharing the pipe and is ignored.
    /// Otherwise the inner operation name decides:
    ///
    /// - an operation with a pending queue is a reply: the oldest waiter is
    ///   popped and resolved (a reply to a drained queue is silently
    ///   dropped — the per-type FIFO has nothing to match it to)
    /// - anything else is a forwarded frame on a custom subchannel: the
    ///   global forward handler runs first, then the channel-specific one
    ///
    /// # Errors
    ///
    /// [`Error::TruncatedInput`] / [`Error::MalformedFrame`] if the frame
    /// cannot be decoded. The failure is local to this call: no waiter is
    /// consumed, no handler runs, and every queue is left exactly as it
    /// was.
    pub fn dispatch(&self, sender: &str, frame: &[u8]) -> Result<()> {
        // ---
        let mut r = ByteReader::new(frame);

        let tag = r.read_string()?;
        if !tag.eq_ignore_ascii_case(&self.inner.config.channel) {
            return Ok(());
        }

        let op = r.read_string()?;

        // Reply path. The reply fields are decoded before the pop so a
        // malformed frame leaves the queue untouched.
        let resolved = {
            let mut pending = lock_ignore_poison(&self.inner.pending);

            if pending.has_queue(&op) {
                let reply = Reply::decode(&op, &mut r)?;

                match pending.pop(&op) {
                    Some(tx) => Some((tx, reply)),
                    None => {
                        log_warn!("dropping surplus {op} reply: nothing pending to match it");
                        return Ok(());
                    }
                }
            } else {
                None
            }
        };

        if let Some((tx, reply)) = resolved {
            // Outside the queue lock. The caller may have dropped its
            // handle already; that is not an error.
            if tx.send(reply).is_err() {
                log_debug!("reply arrived after caller abandoned its {op} request");
            }
            return Ok(());
        }

        // Forwarded frame: the operation name is a custom subchannel.
        let data = r.read_blob()?;

        let (global, specific) = {
            let routes = lock_ignore_poison(&self.inner.routes);
            routes.lookup(&op)
        };

        // Handlers run outside all locks; they may re-enter the client.
        if let Some(handler) = global {
            handler(&op, sender, &data);
        }
        if let Some(handler) = specific {
            handler(&op, sender, &data);
        }

        Ok(())
    }

    /// Register (or replace) a forward handler.
    ///
    /// `ForwardScope::Global` handlers see every forwarded frame;
    /// `ForwardScope::Channel` handlers see only their subchannel. Last
    /// registration per scope wins. At dispatch time the global handler
    /// fires first, then the channel-specific one; either or both may be
    /// absent.
    pub fn register_forward(&self, scope: ForwardScope, handler: ForwardHandler) {
        // ---
        let mut routes = lock_ignore_poison(&self.inner.routes);
        routes.set(scope, handler);
    }

    /// Clear all pending waiters and forward registrations. Idempotent.
    ///
    /// Waiters are abandoned, never resolved with a value: a caller
    /// awaiting across teardown observes [`Error::Abandoned`]. A matching
    /// reply arriving afterwards finds no queue and routes as a forwarded
    /// frame, exactly as on a fresh session.
    pub fn teardown(&self) {
        // ---
        lock_ignore_poison(&self.inner.pending).clear();
        lock_ignore_poison(&self.inner.routes).clear();
    }

    // ------------------------------------------------------------------
    // Typed facade: one thin builder per protocol operation.
    // ------------------------------------------------------------------

    /// Player count of `target` (a server name, or `"ALL"` for the whole
    /// network).
    pub async fn player_count(&self, target: &str) -> Result<i32> {
        // ---
        let handle = self
            .issue(Request::PlayerCount {
                target: target.to_string(),
            })
            .await?;

        match handle.recv().await? {
            Reply::PlayerCount(count) => Ok(count),
            other => Err(unexpected_reply("PlayerCount", &other)),
        }
    }

    /// Names of players connected to `target` (a server name, or `"ALL"`).
    pub async fn player_list(&self, target: &str) -> Result<Vec<String>> {
        // ---
        let handle = self
            .issue(Request::PlayerList {
                target: target.to_string(),
            })
            .await?;

        match handle.recv().await? {
            Reply::PlayerList(names) => Ok(names),
            other => Err(unexpected_reply("PlayerList", &other)),
        }
    }

    /// Names of every server the proxy knows.
    pub async fn servers(&self) -> Result<Vec<String>> {
        // ---
        let handle = self.issue(Request::GetServers).await?;

        match handle.recv().await? {
            Reply::Servers(names) => Ok(names),
            other => Err(unexpected_reply("GetServers", &other)),
        }
    }

    /// Name of the server this client runs on, as the proxy configures it.
    pub async fn server_name(&self) -> Result<String> {
        // ---
        let handle = self.issue(Request::GetServer).await?;

        match handle.recv().await? {
            Reply::ServerName(name) => Ok(name),
            other => Err(unexpected_reply("GetServer", &other)),
        }
    }

    /// UUID of the carrier player.
    pub async fn uuid(&self) -> Result<String> {
        // ---
        let handle = self.issue(Request::Uuid).await?;

        match handle.recv().await? {
            Reply::Uuid(uuid) => Ok(uuid),
            other => Err(unexpected_reply("UUID", &other)),
        }
    }

    /// UUID of any player connected to the proxy.
    pub async fn uuid_of(&self, player: &str) -> Result<String> {
        // ---
        let handle = self
            .issue(Request::UuidOther {
                player: player.to_string(),
            })
            .await?;

        match handle.recv().await? {
            Reply::Uuid(uuid) => Ok(uuid),
            other => Err(unexpected_reply("UUIDOther", &other)),
        }
    }

    /// Real address of the carrier player.
    pub async fn ip(&self) -> Result<HostPort> {
        // ---
        let handle = self.issue(Request::Ip).await?;

        match handle.recv().await? {
            Reply::Ip(addr) => Ok(addr),
            other => Err(unexpected_reply("IP", &other)),
        }
    }

    /// Address of the named server.
    pub async fn server_ip(&self, server: &str) -> Result<HostPort> {
        // ---
        let handle = self
            .issue(Request::ServerIp {
                server: server.to_string(),
            })
            .await?;

        match handle.recv().await? {
            Reply::ServerIp(addr) => Ok(addr),
            other => Err(unexpected_reply("ServerIP", &other)),
        }
    }

    /// Move the carrier player to `server`.
    pub async fn connect(&self, server: &str) -> Result<()> {
        self.send(Request::Connect {
            server: server.to_string(),
        })
        .await
    }

    /// Move the named player to `server`.
    pub async fn connect_other(&self, player: &str, server: &str) -> Result<()> {
        self.send(Request::ConnectOther {
            player: player.to_string(),
            server: server.to_string(),
        })
        .await
    }

    /// Send a chat message to the named player, anywhere on the proxy.
    pub async fn send_message(&self, player: &str, text: &str) -> Result<()> {
        self.send(Request::Message {
            player: player.to_string(),
            text: text.to_string(),
        })
        .await
    }

    /// Kick the named player off the proxy.
    pub async fn kick_player(&self, player: &str, reason: &str) -> Result<()> {
        self.send(Request::KickPlayer {
            player: player.to_string(),
            reason: reason.to_string(),
        })
        .await
    }

    /// Relay an opaque payload to other servers on subchannel `channel`.
    ///
    /// `target` is a server name, `"ALL"`, or `"ONLINE"`. Receiving sides
    /// see it as a forwarded frame on `channel`.
    pub async fn forward(&self, target: &str, channel: &str, data: Vec<u8>) -> Result<()> {
        self.send(Request::Forward {
            target: target.to_string(),
            channel: channel.to_string(),
            data,
        })
        .await
    }

    /// Relay an opaque payload to the server the named player is on.
    pub async fn forward_to_player(&self, player: &str, channel: &str, data: Vec<u8>) -> Result<()> {
        self.send(Request::ForwardToPlayer {
            player: player.to_string(),
            channel: channel.to_string(),
            data,
        })
        .await
    }
}

/// A queue delivered a reply variant its operation cannot produce.
///
/// Queues are keyed by operation name and `Reply::decode` is layout-exact,
/// so hitting this means the session state was corrupted externally.
fn unexpected_reply(op: &str, reply: &Reply) -> Error {
    Error::MalformedFrame(format!("unexpected {reply:?} reply to {op}"))
}
