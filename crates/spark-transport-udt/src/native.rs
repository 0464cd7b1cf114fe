//! 原生 UDT 传输的协作契约与基于系统 UDP 套接字的默认实现。
//!
//! # 教案式说明
//! - **Why**：提供者只负责“选择并构造哪一种通道”，真正分配套接字的是原生传输；
//!   把这条边界建模为 trait，测试与宿主可以注入自己的实现（例如模拟资源耗尽）。
//! - **How**：[`NativeTransport::select`] 按套接字类型挑出 [`NativeProvider`]，
//!   后者再按连接类型打开 [`NativeChannel`]；默认实现 [`SystemTransport`] 通过
//!   `socket2` 创建 UDP 套接字（UDT 无论字节流还是报文语义都承载于 UDP 之上）。
//! - **What**：每次打开都返回独占一个 [`NativeSocket`] 的新通道，Drop 即关闭。

use core::fmt;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};

use socket2::{Domain, Protocol, Socket, Type};

use crate::config::{IpVersion, UdtSocketOptions};
use crate::kind::{ConnectionKind, SocketType};

static NEXT_SOCKET_ID: AtomicU64 = AtomicU64::new(1);

/// 原生套接字在进程内的唯一编号。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SocketId(u64);

impl SocketId {
    /// 分配下一个编号；只用于新打开的套接字。
    pub(crate) fn allocate() -> Self {
        SocketId(NEXT_SOCKET_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SocketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "udt#{}", self.0)
    }
}

/// 原生套接字句柄，供诊断与监控读取。
#[derive(Debug)]
pub struct NativeSocket {
    id: SocketId,
    socket_type: SocketType,
    inner: Socket,
}

impl NativeSocket {
    pub fn new(socket_type: SocketType, inner: Socket) -> Self {
        Self {
            id: SocketId::allocate(),
            socket_type,
            inner,
        }
    }

    pub fn id(&self) -> SocketId {
        self.id
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    /// 底层操作系统套接字，只读借用。
    pub fn as_socket(&self) -> &Socket {
        &self.inner
    }
}

/// 原生通道：独占一个 [`NativeSocket`]，并记录其建连角色。
#[derive(Debug)]
pub struct NativeChannel {
    kind: ConnectionKind,
    socket: NativeSocket,
}

impl NativeChannel {
    pub fn new(kind: ConnectionKind, socket: NativeSocket) -> Self {
        Self { kind, socket }
    }

    pub fn kind(&self) -> ConnectionKind {
        self.kind
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket.socket_type()
    }

    /// 取出背后的原生套接字句柄。
    pub fn socket(&self) -> &NativeSocket {
        &self.socket
    }

    pub fn into_socket(self) -> NativeSocket {
        self.socket
    }
}

/// 单一套接字类型的原生通道打开入口。
///
/// # 契约 (What)
/// - 三个打开方法分别对应被动监听、主动发起与对称建连；
/// - 成功返回的通道 `socket_type()` 必须等于 [`NativeProvider::socket_type`]；
/// - 失败时返回原始 `io::Error`，由调用方决定如何分类。
pub trait NativeProvider: Send + Sync + fmt::Debug {
    fn socket_type(&self) -> SocketType;

    fn open_acceptor(&self) -> io::Result<NativeChannel>;

    fn open_connector(&self) -> io::Result<NativeChannel>;

    fn open_rendezvous(&self) -> io::Result<NativeChannel>;
}

/// 原生传输：按套接字类型挑选提供者。
pub trait NativeTransport: Send + Sync + fmt::Debug {
    fn select(&self, socket_type: SocketType) -> &dyn NativeProvider;
}

/// 基于系统 UDP 套接字的原生提供者。
#[derive(Clone, Copy, Debug)]
pub struct SystemProvider {
    socket_type: SocketType,
    options: UdtSocketOptions,
}

/// 字节流通道的默认原生提供者。
pub static STREAM_PROVIDER: SystemProvider =
    SystemProvider::new(SocketType::Stream, UdtSocketOptions::new());

/// 报文通道的默认原生提供者。
pub static DATAGRAM_PROVIDER: SystemProvider =
    SystemProvider::new(SocketType::Datagram, UdtSocketOptions::new());

impl SystemProvider {
    pub const fn new(socket_type: SocketType, options: UdtSocketOptions) -> Self {
        Self {
            socket_type,
            options,
        }
    }

    /// 返回套接字类型对应的默认提供者。
    pub fn from_type(socket_type: SocketType) -> &'static SystemProvider {
        match socket_type {
            SocketType::Stream => &STREAM_PROVIDER,
            SocketType::Datagram => &DATAGRAM_PROVIDER,
        }
    }

    pub fn options(&self) -> &UdtSocketOptions {
        &self.options
    }

    fn open(&self, kind: ConnectionKind) -> io::Result<NativeChannel> {
        let domain = match self.options.ip_version() {
            IpVersion::V4 => Domain::IPV4,
            IpVersion::V6 => Domain::IPV6,
        };
        let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;
        self.options.apply(&socket, kind)?;
        let socket = NativeSocket::new(self.socket_type, socket);
        tracing::trace!(
            socket = %socket.id(),
            socket_type = %self.socket_type,
            kind = %kind,
            "opened native udt socket"
        );
        Ok(NativeChannel::new(kind, socket))
    }
}

impl NativeProvider for SystemProvider {
    fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    fn open_acceptor(&self) -> io::Result<NativeChannel> {
        self.open(ConnectionKind::Acceptor)
    }

    fn open_connector(&self) -> io::Result<NativeChannel> {
        self.open(ConnectionKind::Connector)
    }

    fn open_rendezvous(&self) -> io::Result<NativeChannel> {
        self.open(ConnectionKind::Rendezvous)
    }
}

/// 默认原生传输：字节流与报文各持有一个 [`SystemProvider`]。
#[derive(Clone, Copy, Debug)]
pub struct SystemTransport {
    stream: SystemProvider,
    datagram: SystemProvider,
}

static GLOBAL: SystemTransport = SystemTransport::new(UdtSocketOptions::new());

impl SystemTransport {
    /// 以同一组套接字选项构造两类提供者。
    pub const fn new(options: UdtSocketOptions) -> Self {
        Self {
            stream: SystemProvider::new(SocketType::Stream, options),
            datagram: SystemProvider::new(SocketType::Datagram, options),
        }
    }

    /// 进程级默认实例，使用默认套接字选项。
    pub fn global() -> &'static SystemTransport {
        &GLOBAL
    }
}

impl NativeTransport for SystemTransport {
    fn select(&self, socket_type: SocketType) -> &dyn NativeProvider {
        match socket_type {
            SocketType::Stream => &self.stream,
            SocketType::Datagram => &self.datagram,
        }
    }
}
