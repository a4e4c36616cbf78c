//! Explicit owner-keyed registry of client sessions.
//!
//! A host embedding several plugins typically wants one
//! [`BungeeClient`] per owning plugin, without each call site threading the
//! client through every layer. The registry maps an owner key to a
//! non-owning [`WeakClient`], so a registered entry never keeps a session
//! alive by itself: when the owner drops its last client handle, the entry
//! goes dead and is pruned on the next lookup.
//!
//! The registry is an ordinary value constructed by the host and passed to
//! the call sites that need it — deliberately not a process-global.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::client::lock_ignore_poison;
use crate::{BungeeClient, WeakClient};

/// Owner-keyed map of live client sessions.
#[derive(Default)]
pub struct ClientRegistry {
    // ---
    entries: Mutex<HashMap<String, WeakClient>>,
}

impl ClientRegistry {
    // ---

    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `client` for `owner`, replacing any previous entry.
    pub fn insert(&self, owner: impl Into<String>, client: &BungeeClient) {
        // ---
        let mut entries = lock_ignore_poison(&self.entries);
        entries.insert(owner.into(), client.downgrade());
    }

    /// Live client registered for `owner`, if any.
    ///
    /// A dead entry (owner dropped its session) is pruned and reported as
    /// absent.
    pub fn get(&self, owner: &str) -> Option<BungeeClient> {
        // ---
        let mut entries = lock_ignore_poison(&self.entries);

        match entries.get(owner).and_then(WeakClient::upgrade) {
            Some(client) => Some(client),
            None => {
                entries.remove(owner);
                None
            }
        }
    }

    /// Drop the entry for `owner`. Returns whether one existed.
    pub fn remove(&self, owner: &str) -> bool {
        // ---
        let mut entries = lock_ignore_poison(&self.entries);
        entries.remove(owner).is_some()
    }
}
