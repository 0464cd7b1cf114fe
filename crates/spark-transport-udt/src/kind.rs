use core::fmt;

use serde::Deserialize;

use crate::error::UdtError;

/// UDT 套接字的投递语义。
///
/// - `Stream`：有序可靠的字节流，编码与 `SOCK_STREAM` 一致（`1`）；
/// - `Datagram`：保留消息边界的报文投递，编码与 `SOCK_DGRAM` 一致（`2`）。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    Stream,
    Datagram,
}

impl SocketType {
    /// 全部套接字类型，按稳定顺序排列。
    pub const ALL: [SocketType; 2] = [SocketType::Stream, SocketType::Datagram];

    /// 原生传输使用的数值编码。
    pub const fn code(self) -> u8 {
        match self {
            SocketType::Stream => 1,
            SocketType::Datagram => 2,
        }
    }

    /// 稳定文本标签。
    pub const fn label(self) -> &'static str {
        match self {
            SocketType::Stream => "stream",
            SocketType::Datagram => "datagram",
        }
    }
}

impl TryFrom<u8> for SocketType {
    type Error = UdtError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(SocketType::Stream),
            2 => Ok(SocketType::Datagram),
            other => Err(UdtError::invalid_state(format!("wrong type={other}"))),
        }
    }
}

impl fmt::Display for SocketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 通道在建连过程中的角色。
///
/// - `Acceptor`：被动监听方；
/// - `Connector`：主动发起方；
/// - `Rendezvous`：双方同时发起的对称建连（NAT 打洞场景）。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionKind {
    Acceptor,
    Connector,
    Rendezvous,
}

impl ConnectionKind {
    /// 全部连接类型，按稳定顺序排列。
    pub const ALL: [ConnectionKind; 3] = [
        ConnectionKind::Acceptor,
        ConnectionKind::Connector,
        ConnectionKind::Rendezvous,
    ];

    /// 数值编码，与声明顺序一致。
    pub const fn code(self) -> u8 {
        match self {
            ConnectionKind::Acceptor => 0,
            ConnectionKind::Connector => 1,
            ConnectionKind::Rendezvous => 2,
        }
    }

    /// 稳定文本标签。
    pub const fn label(self) -> &'static str {
        match self {
            ConnectionKind::Acceptor => "acceptor",
            ConnectionKind::Connector => "connector",
            ConnectionKind::Rendezvous => "rendezvous",
        }
    }
}

impl TryFrom<u8> for ConnectionKind {
    type Error = UdtError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ConnectionKind::Acceptor),
            1 => Ok(ConnectionKind::Connector),
            2 => Ok(ConnectionKind::Rendezvous),
            other => Err(UdtError::invalid_state(format!("wrong kind={other}"))),
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_decode_back_to_the_same_value() {
        for socket_type in SocketType::ALL {
            assert_eq!(SocketType::try_from(socket_type.code()).ok(), Some(socket_type));
        }
        for kind in ConnectionKind::ALL {
            assert_eq!(ConnectionKind::try_from(kind.code()).ok(), Some(kind));
        }
    }

    #[test]
    fn out_of_range_codes_are_invalid_state() {
        let err = SocketType::try_from(0).expect_err("0 is not a socket type");
        assert!(matches!(err, UdtError::InvalidState { .. }));
        assert!(err.to_string().contains("wrong type=0"));

        let err = ConnectionKind::try_from(9).expect_err("9 is not a kind");
        assert!(err.to_string().contains("wrong kind=9"));
    }

    #[test]
    fn serde_uses_lowercase_labels() {
        #[derive(Deserialize)]
        struct Pair {
            kind: ConnectionKind,
            socket_type: SocketType,
        }

        let pair: Pair = toml::from_str("kind = \"rendezvous\"\nsocket_type = \"datagram\"")
            .expect("labels parse");
        assert_eq!(pair.kind, ConnectionKind::Rendezvous);
        assert_eq!(pair.socket_type, SocketType::Datagram);
    }
}
