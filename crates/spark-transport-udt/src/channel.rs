use core::any::Any;
use core::fmt;

use crate::error::UdtError;
use crate::kind::{ConnectionKind, SocketType};
use crate::native::{NativeChannel, NativeTransport};
use crate::opener;
use crate::variant::ChannelVariant;

/// 通道句柄的开放能力集合。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 引导层与监控组件只持有 `&dyn Channel`，并不知道背后是 UDT 还是其他传输；
///   `as_any` 让 [`crate::introspect`] 能在不借助裸指针的前提下安全下转型。
///
/// ## 契约 (What)
/// - 实现者需满足 `Send + Sync + 'static`，句柄可跨线程共享；
/// - `as_any` 必须返回 `self`，否则探查会把句柄误判为外部通道；
/// - `channel_kind` 默认返回编译期类型名，仅用于日志。
pub trait Channel: Any + Send + Sync + fmt::Debug {
    fn as_any(&self) -> &dyn Any;

    fn channel_kind(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

macro_rules! udt_channel {
    ($(#[$meta:meta])* $name:ident, $kind:ident, $socket_type:ident, $open:ident) => {
        $(#[$meta])*
        #[derive(Debug)]
        pub struct $name {
            native: NativeChannel,
        }

        impl $name {
            pub const KIND: ConnectionKind = ConnectionKind::$kind;
            pub const SOCKET_TYPE: SocketType = SocketType::$socket_type;

            /// 在给定原生传输上打开新的通道。
            pub fn open(transport: &dyn NativeTransport) -> Result<Self, UdtError> {
                let native = opener::$open(transport, Self::SOCKET_TYPE)?;
                Ok(Self { native })
            }

            pub fn variant(&self) -> ChannelVariant {
                ChannelVariant::from_parts(Self::KIND, Self::SOCKET_TYPE)
            }

            /// 独占的原生通道。
            pub fn native(&self) -> &NativeChannel {
                &self.native
            }

            pub fn into_native(self) -> NativeChannel {
                self.native
            }
        }

        impl Channel for $name {
            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

udt_channel!(
    /// 字节流监听通道。
    ByteAcceptorChannel,
    Acceptor,
    Stream,
    open_acceptor
);
udt_channel!(
    /// 字节流发起通道。
    ByteConnectorChannel,
    Connector,
    Stream,
    open_connector
);
udt_channel!(
    /// 字节流对称建连通道。
    ByteRendezvousChannel,
    Rendezvous,
    Stream,
    open_rendezvous
);
udt_channel!(
    /// 报文监听通道。
    MessageAcceptorChannel,
    Acceptor,
    Datagram,
    open_acceptor
);
udt_channel!(
    /// 报文发起通道。
    MessageConnectorChannel,
    Connector,
    Datagram,
    open_connector
);
udt_channel!(
    /// 报文对称建连通道。
    MessageRendezvousChannel,
    Rendezvous,
    Datagram,
    open_rendezvous
);

/// 提供者产出的 UDT 通道句柄：六种具体通道的带标签联合。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 身份由枚举标签直接给出，识别只需一次模式匹配，不依赖判断顺序；
/// - 调用方仍可将其视为 `&dyn Channel` 交给与传输无关的组件。
///
/// ## 契约 (What)
/// - 每个分支独占一个原生通道，句柄被 Drop 时原生套接字随之关闭；
/// - `variant()` 与分支一一对应，不存在同时属于两种形态的句柄。
#[derive(Debug)]
pub enum UdtChannel {
    ByteAcceptor(ByteAcceptorChannel),
    ByteConnector(ByteConnectorChannel),
    ByteRendezvous(ByteRendezvousChannel),
    MessageAcceptor(MessageAcceptorChannel),
    MessageConnector(MessageConnectorChannel),
    MessageRendezvous(MessageRendezvousChannel),
}

impl UdtChannel {
    pub fn variant(&self) -> ChannelVariant {
        match self {
            UdtChannel::ByteAcceptor(_) => ChannelVariant::StreamAcceptor,
            UdtChannel::ByteConnector(_) => ChannelVariant::StreamConnector,
            UdtChannel::ByteRendezvous(_) => ChannelVariant::StreamRendezvous,
            UdtChannel::MessageAcceptor(_) => ChannelVariant::DatagramAcceptor,
            UdtChannel::MessageConnector(_) => ChannelVariant::DatagramConnector,
            UdtChannel::MessageRendezvous(_) => ChannelVariant::DatagramRendezvous,
        }
    }

    pub fn kind(&self) -> ConnectionKind {
        self.variant().kind()
    }

    pub fn socket_type(&self) -> SocketType {
        self.variant().socket_type()
    }

    pub fn native(&self) -> &NativeChannel {
        match self {
            UdtChannel::ByteAcceptor(channel) => channel.native(),
            UdtChannel::ByteConnector(channel) => channel.native(),
            UdtChannel::ByteRendezvous(channel) => channel.native(),
            UdtChannel::MessageAcceptor(channel) => channel.native(),
            UdtChannel::MessageConnector(channel) => channel.native(),
            UdtChannel::MessageRendezvous(channel) => channel.native(),
        }
    }

    pub fn into_native(self) -> NativeChannel {
        match self {
            UdtChannel::ByteAcceptor(channel) => channel.into_native(),
            UdtChannel::ByteConnector(channel) => channel.into_native(),
            UdtChannel::ByteRendezvous(channel) => channel.into_native(),
            UdtChannel::MessageAcceptor(channel) => channel.into_native(),
            UdtChannel::MessageConnector(channel) => channel.into_native(),
            UdtChannel::MessageRendezvous(channel) => channel.into_native(),
        }
    }
}

impl Channel for UdtChannel {
    fn as_any(&self) -> &dyn Any {
        self
    }
}
