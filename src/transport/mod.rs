//! Transport implementations.
//!
//! This module provides concrete implementations of the domain-level
//! `Transport` trait, exposed only through constructor functions.
//!
//! Domain code must not depend on transport-specific types. The host
//! integration that bridges a real plugin-message channel implements
//! [`crate::Transport`] on its own side of the seam.

mod memory;

pub use memory::create_transport as create_memory_transport;
pub use memory::MemoryRemote;
