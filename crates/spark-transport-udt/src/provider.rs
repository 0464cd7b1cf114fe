use core::fmt;
use std::sync::Arc;

use crate::channel::{
    ByteAcceptorChannel, ByteConnectorChannel, ByteRendezvousChannel, Channel,
    MessageAcceptorChannel, MessageConnectorChannel, MessageRendezvousChannel, UdtChannel,
};
use crate::error::UdtError;
use crate::kind::{ConnectionKind, SocketType};
use crate::native::{NativeTransport, SystemTransport};
use crate::variant::ChannelVariant;

/// 通道工厂契约，供引导层在不了解具体传输的情况下创建通道。
///
/// # 契约 (What)
/// - 每次调用都返回全新的通道，不缓存、不复用；
/// - 失败时返回 [`UdtError`]，且工厂自身状态不受影响，可再次调用。
pub trait ChannelFactory: Send + Sync {
    type Channel: Channel;

    fn new_channel(&self) -> Result<Self::Channel, UdtError>;
}

/// UDT 通道提供者：绑定一组 `(连接类型, 套接字类型)` 的不可变工厂值。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 把“选择哪一种 UDT 通道”收敛为一个可复制的常量值，引导层只需挑选
///   [`STREAM_ACCEPTOR`] 等单例即可；
/// - 值语义使 `produce` 可以在任意线程并发调用而无需同步。
///
/// ## 逻辑 (How)
/// - `produce` 先按连接类型、再按套接字类型分派到六个具体通道构造器之一；
///   两层匹配均为穷尽匹配，越界值在类型层面不可表达；
/// - 原始编码只能经 [`UdtProvider::from_codes`] 进入，越界时返回
///   [`UdtError::InvalidState`]。
///
/// ## 契约 (What)
/// - 构造后 `kind`/`socket_type` 不再变化；
/// - `produce` 每次分配一个新的原生资源，失败时不会返回半初始化的通道；
/// - 原生打开失败以 [`UdtError::ChannelOpenFailed`] 原样上抛，本层不重试。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct UdtProvider {
    kind: ConnectionKind,
    socket_type: SocketType,
}

/// 字节流监听通道提供者。
pub static STREAM_ACCEPTOR: UdtProvider =
    UdtProvider::new(SocketType::Stream, ConnectionKind::Acceptor);
/// 字节流发起通道提供者。
pub static STREAM_CONNECTOR: UdtProvider =
    UdtProvider::new(SocketType::Stream, ConnectionKind::Connector);
/// 字节流对称建连通道提供者。
pub static STREAM_RENDEZVOUS: UdtProvider =
    UdtProvider::new(SocketType::Stream, ConnectionKind::Rendezvous);
/// 报文监听通道提供者。
pub static DATAGRAM_ACCEPTOR: UdtProvider =
    UdtProvider::new(SocketType::Datagram, ConnectionKind::Acceptor);
/// 报文发起通道提供者。
pub static DATAGRAM_CONNECTOR: UdtProvider =
    UdtProvider::new(SocketType::Datagram, ConnectionKind::Connector);
/// 报文对称建连通道提供者。
pub static DATAGRAM_RENDEZVOUS: UdtProvider =
    UdtProvider::new(SocketType::Datagram, ConnectionKind::Rendezvous);

/// 只读注册表，顺序与 [`ChannelVariant::ALL`] 一致。
pub static PROVIDERS: [&UdtProvider; 6] = [
    &STREAM_ACCEPTOR,
    &STREAM_CONNECTOR,
    &STREAM_RENDEZVOUS,
    &DATAGRAM_ACCEPTOR,
    &DATAGRAM_CONNECTOR,
    &DATAGRAM_RENDEZVOUS,
];

impl UdtProvider {
    pub const fn new(socket_type: SocketType, kind: ConnectionKind) -> Self {
        Self { kind, socket_type }
    }

    /// 以原生数值编码构造提供者。
    ///
    /// 编码越界说明调用方持有损坏的数据，返回 [`UdtError::InvalidState`]。
    pub fn from_codes(kind: u8, socket_type: u8) -> Result<Self, UdtError> {
        let kind = ConnectionKind::try_from(kind)?;
        let socket_type = SocketType::try_from(socket_type)?;
        Ok(Self::new(socket_type, kind))
    }

    /// 返回某一通道形态对应的进程级单例。
    pub fn lookup(variant: ChannelVariant) -> &'static UdtProvider {
        PROVIDERS[variant.index()]
    }

    /// 按稳定名称（如 `datagram-rendezvous`）查找单例。
    pub fn by_name(name: &str) -> Result<&'static UdtProvider, UdtError> {
        let variant: ChannelVariant = name.parse()?;
        Ok(Self::lookup(variant))
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    pub fn variant(&self) -> ChannelVariant {
        ChannelVariant::from_parts(self.kind, self.socket_type)
    }

    pub fn name(&self) -> &'static str {
        self.variant().name()
    }

    /// 在进程级默认原生传输上产出新通道。
    pub fn produce(&self) -> Result<UdtChannel, UdtError> {
        self.produce_with(SystemTransport::global())
    }

    /// 在指定原生传输上产出新通道。
    pub fn produce_with(&self, transport: &dyn NativeTransport) -> Result<UdtChannel, UdtError> {
        let channel = match self.kind {
            ConnectionKind::Acceptor => match self.socket_type {
                SocketType::Datagram => {
                    UdtChannel::MessageAcceptor(MessageAcceptorChannel::open(transport)?)
                }
                SocketType::Stream => {
                    UdtChannel::ByteAcceptor(ByteAcceptorChannel::open(transport)?)
                }
            },
            ConnectionKind::Connector => match self.socket_type {
                SocketType::Datagram => {
                    UdtChannel::MessageConnector(MessageConnectorChannel::open(transport)?)
                }
                SocketType::Stream => {
                    UdtChannel::ByteConnector(ByteConnectorChannel::open(transport)?)
                }
            },
            ConnectionKind::Rendezvous => match self.socket_type {
                SocketType::Datagram => {
                    UdtChannel::MessageRendezvous(MessageRendezvousChannel::open(transport)?)
                }
                SocketType::Stream => {
                    UdtChannel::ByteRendezvous(ByteRendezvousChannel::open(transport)?)
                }
            },
        };
        tracing::debug!(
            provider = self.name(),
            socket = %channel.native().socket().id(),
            "produced udt channel"
        );
        Ok(channel)
    }
}

impl fmt::Display for UdtProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl ChannelFactory for UdtProvider {
    type Channel = UdtChannel;

    fn new_channel(&self) -> Result<UdtChannel, UdtError> {
        self.produce()
    }
}

/// 绑定到特定原生传输的提供者，通常由 [`crate::UdtTransportConfig`] 构造。
#[derive(Clone, Debug)]
pub struct ConfiguredProvider {
    provider: UdtProvider,
    transport: Arc<dyn NativeTransport>,
}

impl ConfiguredProvider {
    pub fn new(provider: UdtProvider, transport: Arc<dyn NativeTransport>) -> Self {
        Self {
            provider,
            transport,
        }
    }

    pub fn provider(&self) -> &UdtProvider {
        &self.provider
    }

    pub fn transport(&self) -> &Arc<dyn NativeTransport> {
        &self.transport
    }
}

impl ChannelFactory for ConfiguredProvider {
    type Channel = UdtChannel;

    fn new_channel(&self) -> Result<UdtChannel, UdtError> {
        self.provider.produce_with(self.transport.as_ref())
    }
}
