// src/protocol/message.rs

//! Typed request/reply vocabulary of the proxy plugin-messaging protocol.
//!
//! Every outbound frame is `[operation:String][fields...]`; the operation
//! name selects the field layout on both directions. Operation names are
//! matched exactly (the outer envelope tag is the only case-insensitive
//! comparison in the protocol, and that happens in the dispatcher).

use bytes::Bytes;

use crate::protocol::{ByteReader, ByteWriter};
use crate::{Error, Result};

/// Default envelope tag identifying this protocol family.
///
/// Inbound frames are accepted when their leading tag matches the configured
/// channel case-insensitively; everything else on the pipe is ignored.
pub const ENVELOPE_MARKER: &str = "BungeeCord";

/// Host/port pair carried by the `IP` and `ServerIP` replies.
///
/// `port` is `i32` because the `IP` reply transmits it as a signed 32-bit
/// integer on the wire; `ServerIP` transmits an unsigned 16-bit value, which
/// widens losslessly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: i32,
}

/// An outbound request to the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    // ---
    /// Player count of one server, or `"ALL"` for the whole network.
    PlayerCount { target: String },

    /// Names of players connected to one server, or `"ALL"`.
    PlayerList { target: String },

    /// Names of every server the proxy knows.
    GetServers,

    /// Name of the server this client is running on.
    GetServer,

    /// UUID of the carrier player.
    Uuid,

    /// UUID of any player connected to the proxy.
    UuidOther { player: String },

    /// Real address of the carrier player.
    Ip,

    /// Address of a named server.
    ServerIp { server: String },

    /// Move the carrier player to another server. Fire-and-forget.
    Connect { server: String },

    /// Move a named player to another server. Fire-and-forget.
    ConnectOther { player: String, server: String },

    /// Send a chat message to a named player. Fire-and-forget.
    Message { player: String, text: String },

    /// Kick a named player off the proxy. Fire-and-forget.
    KickPlayer { player: String, reason: String },

    /// Relay an opaque payload to other servers on a named subchannel.
    ///
    /// `target` is a server name, `"ALL"`, or `"ONLINE"`. The payload comes
    /// back to the receiving side as a forwarded frame on `channel`.
    Forward {
        target: String,
        channel: String,
        data: Vec<u8>,
    },

    /// Relay an opaque payload to the server a named player is on.
    ForwardToPlayer {
        player: String,
        channel: String,
        data: Vec<u8>,
    },
}

impl Request {
    // ---

    /// Wire operation name.
    pub fn op(&self) -> &'static str {
        // ---
        match self {
            Request::PlayerCount { .. } => "PlayerCount",
            Request::PlayerList { .. } => "PlayerList",
            Request::GetServers => "GetServers",
            Request::GetServer => "GetServer",
            Request::Uuid => "UUID",
            Request::UuidOther { .. } => "UUIDOther",
            Request::Ip => "IP",
            Request::ServerIp { .. } => "ServerIP",
            Request::Connect { .. } => "Connect",
            Request::ConnectOther { .. } => "ConnectOther",
            Request::Message { .. } => "Message",
            Request::KickPlayer { .. } => "KickPlayer",
            Request::Forward { .. } => "Forward",
            Request::ForwardToPlayer { .. } => "ForwardToPlayer",
        }
    }

    /// Whether the proxy answers this operation with a correlated reply.
    pub fn expects_reply(&self) -> bool {
        // ---
        matches!(
            self,
            Request::PlayerCount { .. }
                | Request::PlayerList { .. }
                | Request::GetServers
                | Request::GetServer
                | Request::Uuid
                | Request::UuidOther { .. }
                | Request::Ip
                | Request::ServerIp { .. }
        )
    }

    /// Encode the request frame: `[op:String][fields...]`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Oversized`] if any field exceeds the 16-bit length
    /// prefix of the wire format.
    pub fn encode(&self) -> Result<Bytes> {
        // ---
        let mut w = ByteWriter::new();
        w.write_string(self.op())?;

        match self {
            Request::PlayerCount { target } | Request::PlayerList { target } => {
                w.write_string(target)?;
            }
            Request::GetServers | Request::GetServer | Request::Uuid | Request::Ip => {}
            Request::UuidOther { player } => {
                w.write_string(player)?;
            }
            Request::ServerIp { server } | Request::Connect { server } => {
                w.write_string(server)?;
            }
            Request::ConnectOther { player, server } => {
                w.write_string(player)?;
                w.write_string(server)?;
            }
            Request::Message { player, text } => {
                w.write_string(player)?;
                w.write_string(text)?;
            }
            Request::KickPlayer { player, reason } => {
                w.write_string(player)?;
                w.write_string(reason)?;
            }
            Request::Forward {
                target,
                channel,
                data,
            } => {
                w.write_string(target)?;
                w.write_string(channel)?;
                w.write_blob(data)?;
            }
            Request::ForwardToPlayer {
                player,
                channel,
                data,
            } => {
                w.write_string(player)?;
                w.write_string(channel)?;
                w.write_blob(data)?;
            }
        }

        Ok(w.into_bytes())
    }
}

/// A decoded reply from the proxy.
///
/// Several replies echo back the queried server/player name before the
/// useful fields; the echo is consumed and discarded during decode, matching
/// the proxy's layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    // ---
    PlayerCount(i32),
    PlayerList(Vec<String>),
    Servers(Vec<String>),
    ServerName(String),
    Uuid(String),
    Ip(HostPort),
    ServerIp(HostPort),
}

impl Reply {
    /// Decode the reply fields for `op` from the rest of the frame.
    ///
    /// # Errors
    ///
    /// - `TruncatedInput` / `MalformedFrame` on any codec failure
    /// - `MalformedFrame` if `op` has no reply layout (the dispatcher only
    ///   calls this for operations with a pending queue, which are exactly
    ///   the reply-bearing ones)
    pub fn decode(op: &str, r: &mut ByteReader<'_>) -> Result<Reply> {
        // ---
        match op {
            "PlayerCount" => {
                r.read_string()?; // echoed server name
                Ok(Reply::PlayerCount(r.read_i32()?))
            }
            "PlayerList" => {
                r.read_string()?; // echoed server name
                Ok(Reply::PlayerList(split_names(&r.read_string()?)))
            }
            "GetServers" => Ok(Reply::Servers(split_names(&r.read_string()?))),
            "GetServer" => Ok(Reply::ServerName(r.read_string()?)),
            "UUID" => Ok(Reply::Uuid(r.read_string()?)),
            "UUIDOther" => {
                r.read_string()?; // echoed player name
                Ok(Reply::Uuid(r.read_string()?))
            }
            "IP" => {
                let host = r.read_string()?;
                let port = r.read_i32()?;
                Ok(Reply::Ip(HostPort { host, port }))
            }
            "ServerIP" => {
                r.read_string()?; // echoed server name
                let host = r.read_string()?;
                let port = i32::from(r.read_u16()?);
                Ok(Reply::ServerIp(HostPort { host, port }))
            }
            other => Err(Error::MalformedFrame(format!(
                "operation {other:?} has no reply layout"
            ))),
        }
    }
}

/// Split a comma-space joined name list, as the proxy serializes them.
fn split_names(joined: &str) -> Vec<String> {
    joined.split(", ").map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn reader(frame: &Bytes) -> ByteReader<'_> {
        ByteReader::new(frame)
    }

    #[test]
    fn test_player_count_layout() {
        // ---
        let frame = Request::PlayerCount {
            target: "ALL".into(),
        }
        .encode()
        .unwrap();

        // [len=11]["PlayerCount"][len=3]["ALL"]
        let mut expected = vec![0x00, 0x0B];
        expected.extend_from_slice(b"PlayerCount");
        expected.extend_from_slice(&[0x00, 0x03]);
        expected.extend_from_slice(b"ALL");
        assert_eq!(&frame[..], &expected[..]);
    }

    #[test]
    fn test_forward_layout_has_short_length_prefix() {
        // ---
        let frame = Request::Forward {
            target: "ALL".into(),
            channel: "sync".into(),
            data: vec![1, 2, 3],
        }
        .encode()
        .unwrap();

        let mut r = reader(&frame);
        assert_eq!(r.read_string().unwrap(), "Forward");
        assert_eq!(r.read_string().unwrap(), "ALL");
        assert_eq!(r.read_string().unwrap(), "sync");
        assert_eq!(r.read_u16().unwrap(), 3);
        assert_eq!(r.remaining(), 3);
    }

    #[test]
    fn test_no_field_requests_encode_op_only() {
        // ---
        for req in [Request::GetServers, Request::GetServer, Request::Uuid, Request::Ip] {
            let frame = req.encode().unwrap();
            let mut r = reader(&frame);
            assert_eq!(r.read_string().unwrap(), req.op());
            assert_eq!(r.remaining(), 0);
        }
    }

    #[test]
    fn test_expects_reply_partition() {
        // ---
        assert!(Request::GetServer.expects_reply());
        assert!(Request::Ip.expects_reply());
        assert!(!Request::Connect {
            server: "lobby".into()
        }
        .expects_reply());
        assert!(!Request::KickPlayer {
            player: "Steve".into(),
            reason: "afk".into()
        }
        .expects_reply());
        assert!(!Request::Forward {
            target: "ALL".into(),
            channel: "sync".into(),
            data: vec![]
        }
        .expects_reply());
    }

    #[test]
    fn test_decode_player_count_skips_echo() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("lobby").unwrap();
        w.write_i32(42);
        let frame = w.into_bytes();

        let reply = Reply::decode("PlayerCount", &mut reader(&frame)).unwrap();
        assert_eq!(reply, Reply::PlayerCount(42));
    }

    #[test]
    fn test_decode_player_list_splits_names() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("ALL").unwrap();
        w.write_string("Alice, Bob, Carol").unwrap();
        let frame = w.into_bytes();

        let reply = Reply::decode("PlayerList", &mut reader(&frame)).unwrap();
        assert_eq!(
            reply,
            Reply::PlayerList(vec!["Alice".into(), "Bob".into(), "Carol".into()])
        );
    }

    #[test]
    fn test_decode_server_ip_widens_port() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("lobby").unwrap();
        w.write_string("10.0.0.7").unwrap();
        w.write_u16(25565);
        let frame = w.into_bytes();

        let reply = Reply::decode("ServerIP", &mut reader(&frame)).unwrap();
        assert_eq!(
            reply,
            Reply::ServerIp(HostPort {
                host: "10.0.0.7".into(),
                port: 25565
            })
        );
    }

    #[test]
    fn test_decode_ip_reads_int_port() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("203.0.113.9").unwrap();
        w.write_i32(54321);
        let frame = w.into_bytes();

        let reply = Reply::decode("IP", &mut reader(&frame)).unwrap();
        assert_eq!(
            reply,
            Reply::Ip(HostPort {
                host: "203.0.113.9".into(),
                port: 54321
            })
        );
    }

    #[test]
    fn test_decode_uuid_other_skips_echo() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("Steve").unwrap();
        w.write_string("af59ff5a-6523-4804-a10e-2ba3bb19b9e4").unwrap();
        let frame = w.into_bytes();

        let reply = Reply::decode("UUIDOther", &mut reader(&frame)).unwrap();
        assert_eq!(
            reply,
            Reply::Uuid("af59ff5a-6523-4804-a10e-2ba3bb19b9e4".into())
        );
    }

    #[test]
    fn test_decode_unknown_op_is_malformed() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("payload").unwrap();
        let frame = w.into_bytes();

        let err = Reply::decode("Connect", &mut reader(&frame)).unwrap_err();
        assert!(matches!(err, Error::MalformedFrame(_)));
    }

    #[test]
    fn test_decode_truncated_reply() {
        // ---
        let mut w = ByteWriter::new();
        w.write_string("lobby").unwrap();
        // i32 count missing entirely
        let frame = w.into_bytes();

        let err = Reply::decode("PlayerCount", &mut reader(&frame)).unwrap_err();
        assert!(err.is_malformed());
    }
}
