/// Plugin-messaging client: request issuance, FIFO reply correlation, and
/// forwarded-frame dispatch
mod forward;
mod pending;
mod rpc_client;

pub use forward::{ForwardHandler, ForwardScope};
pub use rpc_client::{BungeeClient, ReplyHandle, WeakClient};

use std::sync::{Mutex, MutexGuard};

/// Acquire a mutex guard, intentionally ignoring poisoning.
///
/// Mutex poisoning indicates that another task panicked while holding the
/// lock. The protected state here is a best-effort pending-waiter store or
/// forward route table.
///
/// Ignoring poisoning is acceptable because:
/// - There are no invariants spanning multiple fields.
/// - The worst outcome is a dropped or unmatched reply.
/// - Connection-level failures are handled by the transport receive loop.
///
/// This avoids propagating non-`Send` poison errors across async boundaries.
pub(crate) fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    // ---
    match m.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
