use std::collections::HashMap;
use std::sync::Arc;

/// Callback invoked for inbound forwarded frames.
///
/// Receives `(channel, sender, payload)`: the subchannel name the frame
/// arrived on, the identity of the carrier that delivered it, and the opaque
/// payload bytes.
pub type ForwardHandler = Arc<dyn Fn(&str, &str, &[u8]) + Send + Sync>;

/// Scope of a forward-handler registration.
///
/// Both scopes are independent: a dispatch of a forwarded frame invokes the
/// `Global` handler first (if registered) and then the matching `Channel`
/// handler (if registered). Either, both, or neither may be present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ForwardScope {
    /// Invoked for every forwarded frame regardless of subchannel.
    Global,
    /// Invoked only for frames on the named subchannel.
    Channel(String),
}

/// Scope-keyed forward route table. Last registration per scope wins.
#[derive(Default)]
pub(super) struct ForwardRoutes {
    // ---
    routes: HashMap<ForwardScope, ForwardHandler>,
}

impl ForwardRoutes {
    // ---

    /// Register (or replace) the handler for a scope.
    pub fn set(&mut self, scope: ForwardScope, handler: ForwardHandler) {
        self.routes.insert(scope, handler);
    }

    /// Handlers applicable to a frame on `channel`, in invocation order:
    /// global first, then channel-specific.
    pub fn lookup(&self, channel: &str) -> (Option<ForwardHandler>, Option<ForwardHandler>) {
        // ---
        let global = self.routes.get(&ForwardScope::Global).cloned();
        let specific = self
            .routes
            .get(&ForwardScope::Channel(channel.to_string()))
            .cloned();
        (global, specific)
    }

    /// Drop every registration.
    pub fn clear(&mut self) {
        self.routes.clear();
    }
}
