//! Wire format: binary codec plus the typed operation vocabulary.
//!
//! Pure and stateless — no channels, queues, or I/O. The correlation and
//! dispatch logic lives in [`crate::client`].

mod codec;
mod message;

pub use codec::{ByteReader, ByteWriter};
pub use message::{HostPort, Reply, Request, ENVELOPE_MARKER};
