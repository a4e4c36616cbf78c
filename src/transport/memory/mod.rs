// src/transport/memory/mod.rs

//! In-memory transport implementation.
//!
//! This module provides a pure in-process implementation of the domain-level
//! `Transport` trait. It is intended primarily for testing, local execution,
//! and as a reference for transport semantics.
//!
//! ## Reference Semantics
//!
//! The in-memory transport defines the **reference behavior** for the
//! transport layer:
//!
//! - Once `subscribe()` returns successfully, frames injected *after* that
//!   point are deliverable.
//! - Frame delivery is deterministic and preserves injection order, which
//!   the protocol's FIFO correlation depends on.
//! - `send()` fails with `NoRoute` — and nothing else happens — while no
//!   carrier is available.
//! - No frames are dropped due to timing, scheduling, or background IO.

mod transport;

pub use transport::{create_transport, MemoryRemote};
