use core::fmt;
use core::str::FromStr;

use crate::error::UdtError;
use crate::kind::{ConnectionKind, SocketType};

/// UDT 通道的六种具体形态：套接字类型 × 连接类型。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 以一个闭合枚举承载“这是哪一种 UDT 通道”的身份，让提供者分派与句柄探查
///   共享同一份事实来源，避免在两处各自维护六路判断。
///
/// ## 契约 (What)
/// - `from_parts` 对任意 `(kind, socket_type)` 组合都是全函数；
/// - `name` 返回稳定名称（如 `stream-acceptor`），[`FromStr`] 接受同一组名称，
///   并兼容 `byte-*`/`message-*` 旧称；
/// - [`ChannelVariant::ALL`] 的顺序即探查顺序：先字节流后报文，先监听后发起再对称。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ChannelVariant {
    StreamAcceptor,
    StreamConnector,
    StreamRendezvous,
    DatagramAcceptor,
    DatagramConnector,
    DatagramRendezvous,
}

impl ChannelVariant {
    pub const ALL: [ChannelVariant; 6] = [
        ChannelVariant::StreamAcceptor,
        ChannelVariant::StreamConnector,
        ChannelVariant::StreamRendezvous,
        ChannelVariant::DatagramAcceptor,
        ChannelVariant::DatagramConnector,
        ChannelVariant::DatagramRendezvous,
    ];

    /// 由连接类型与套接字类型组合出通道身份。
    pub const fn from_parts(kind: ConnectionKind, socket_type: SocketType) -> Self {
        match (socket_type, kind) {
            (SocketType::Stream, ConnectionKind::Acceptor) => ChannelVariant::StreamAcceptor,
            (SocketType::Stream, ConnectionKind::Connector) => ChannelVariant::StreamConnector,
            (SocketType::Stream, ConnectionKind::Rendezvous) => ChannelVariant::StreamRendezvous,
            (SocketType::Datagram, ConnectionKind::Acceptor) => ChannelVariant::DatagramAcceptor,
            (SocketType::Datagram, ConnectionKind::Connector) => {
                ChannelVariant::DatagramConnector
            }
            (SocketType::Datagram, ConnectionKind::Rendezvous) => {
                ChannelVariant::DatagramRendezvous
            }
        }
    }

    pub const fn kind(self) -> ConnectionKind {
        match self {
            ChannelVariant::StreamAcceptor | ChannelVariant::DatagramAcceptor => {
                ConnectionKind::Acceptor
            }
            ChannelVariant::StreamConnector | ChannelVariant::DatagramConnector => {
                ConnectionKind::Connector
            }
            ChannelVariant::StreamRendezvous | ChannelVariant::DatagramRendezvous => {
                ConnectionKind::Rendezvous
            }
        }
    }

    pub const fn socket_type(self) -> SocketType {
        match self {
            ChannelVariant::StreamAcceptor
            | ChannelVariant::StreamConnector
            | ChannelVariant::StreamRendezvous => SocketType::Stream,
            ChannelVariant::DatagramAcceptor
            | ChannelVariant::DatagramConnector
            | ChannelVariant::DatagramRendezvous => SocketType::Datagram,
        }
    }

    /// 稳定名称，`<socket_type>-<kind>`。
    pub const fn name(self) -> &'static str {
        match self {
            ChannelVariant::StreamAcceptor => "stream-acceptor",
            ChannelVariant::StreamConnector => "stream-connector",
            ChannelVariant::StreamRendezvous => "stream-rendezvous",
            ChannelVariant::DatagramAcceptor => "datagram-acceptor",
            ChannelVariant::DatagramConnector => "datagram-connector",
            ChannelVariant::DatagramRendezvous => "datagram-rendezvous",
        }
    }

    /// 在 `ALL` 中的下标，供静态注册表按身份直接寻址。
    pub(crate) const fn index(self) -> usize {
        match self {
            ChannelVariant::StreamAcceptor => 0,
            ChannelVariant::StreamConnector => 1,
            ChannelVariant::StreamRendezvous => 2,
            ChannelVariant::DatagramAcceptor => 3,
            ChannelVariant::DatagramConnector => 4,
            ChannelVariant::DatagramRendezvous => 5,
        }
    }
}

impl fmt::Display for ChannelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ChannelVariant {
    type Err = UdtError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let unknown = || UdtError::UnknownProvider(name.to_owned());
        let (socket_type, kind) = name.split_once('-').ok_or_else(unknown)?;
        let socket_type = match socket_type {
            "stream" | "byte" => SocketType::Stream,
            "datagram" | "message" => SocketType::Datagram,
            _ => return Err(unknown()),
        };
        let kind = match kind {
            "acceptor" => ConnectionKind::Acceptor,
            "connector" => ConnectionKind::Connector,
            "rendezvous" => ConnectionKind::Rendezvous,
            _ => return Err(unknown()),
        };
        Ok(ChannelVariant::from_parts(kind, socket_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parts_round_trip_through_identity() {
        for variant in ChannelVariant::ALL {
            assert_eq!(
                ChannelVariant::from_parts(variant.kind(), variant.socket_type()),
                variant
            );
            assert_eq!(ChannelVariant::ALL[variant.index()], variant);
        }
    }

    #[test]
    fn names_parse_including_legacy_aliases() {
        assert_eq!(
            "datagram-rendezvous".parse::<ChannelVariant>().ok(),
            Some(ChannelVariant::DatagramRendezvous)
        );
        assert_eq!(
            "byte-acceptor".parse::<ChannelVariant>().ok(),
            Some(ChannelVariant::StreamAcceptor)
        );
        assert_eq!(
            "message-connector".parse::<ChannelVariant>().ok(),
            Some(ChannelVariant::DatagramConnector)
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        for name in ["", "stream", "stream-listener", "tcp-acceptor", "stream-acceptor-x"] {
            let err = name.parse::<ChannelVariant>().expect_err(name);
            assert!(matches!(err, UdtError::UnknownProvider(ref n) if n == name));
        }
    }
}
