#![deny(unsafe_code)]
#![doc = r#"
# spark-transport-udt

## 设计动机（Why）
- **定位**：该 crate 是 Spark 接入 UDT（基于 UDP 的可靠传输）时的通道提供者注册表：
  给定套接字类型（字节流 / 报文）与连接类型（监听 / 发起 / 对称建连），
  选择并构造六种具体通道之一。
- **架构角色**：位于引导层与原生 UDT 传输之间，只决定“构造哪一种通道”，
  并为监控与调试提供从不透明句柄还原原生套接字的探查函数。
- **设计理念**：六个提供者均为静态初始化的不可变值；通道身份以带标签联合表达，
  探查只需模式匹配与安全下转型。

## 核心契约（What）
- [`UdtProvider`] 及其六个单例（[`STREAM_ACCEPTOR`] 等）：`produce` 每次返回全新的
  [`UdtChannel`]，原生打开失败时返回 [`UdtError::ChannelOpenFailed`] 并保留原因；
- [`introspect`]：`identify`/`channel_udt`/`socket_udt` 对任意 `&dyn Channel` 为全函数，
  外部或缺失的句柄得到 `None`；
- [`UdtTransportConfig`]：以 TOML 声明提供者名称与套接字选项，构造
  [`ConfiguredProvider`]。

## 实现策略（How）
- 原生传输以 [`NativeTransport`]/[`NativeProvider`] 建模，默认实现
  [`SystemTransport`] 通过 `socket2` 创建 UDP 套接字；
- 错误以 `thiserror` 定义，并附带稳定错误码与 [`ErrorCategory`]；
- 仅在 `debug`/`trace` 级别发出 `tracing` 事件，宿主未开启时保持静默。

## 风险与考量（Trade-offs）
- 本层不执行任何 IO，也不管理通道生命周期；通道交付后由调用方负责释放；
- 阻塞风险只存在于原生打开调用内部，本层不施加超时或取消。
"#]

mod channel;
mod config;
mod error;
pub mod introspect;
mod kind;
pub mod native;
mod opener;
mod provider;
mod variant;

pub use channel::{
    ByteAcceptorChannel, ByteConnectorChannel, ByteRendezvousChannel, Channel,
    MessageAcceptorChannel, MessageConnectorChannel, MessageRendezvousChannel, UdtChannel,
};
pub use config::{IpVersion, UdtSocketOptions, UdtTransportConfig};
pub use error::{ErrorCategory, RetryAdvice, UdtError};
pub use introspect::{channel_udt, identify, socket_udt};
pub use kind::{ConnectionKind, SocketType};
pub use native::{
    NativeChannel, NativeProvider, NativeSocket, NativeTransport, SocketId, SystemProvider,
    SystemTransport,
};
pub use provider::{
    ChannelFactory, ConfiguredProvider, DATAGRAM_ACCEPTOR, DATAGRAM_CONNECTOR,
    DATAGRAM_RENDEZVOUS, PROVIDERS, STREAM_ACCEPTOR, STREAM_CONNECTOR, STREAM_RENDEZVOUS,
    UdtProvider,
};
pub use variant::ChannelVariant;
