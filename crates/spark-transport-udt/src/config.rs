use std::io;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};
use socket2::Socket;

use crate::error::UdtError;
use crate::kind::ConnectionKind;
use crate::native::SystemTransport;
use crate::provider::{ConfiguredProvider, UdtProvider};

/// 原生套接字使用的 IP 协议族。
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IpVersion {
    #[default]
    V4,
    V6,
}

/// UDT 原生套接字的可选参数集合。
///
/// # 教案级注释
///
/// ## 意图（Why）
/// - 将协议族、阻塞模式、`SO_REUSEADDR` 与缓冲区大小显式建模，避免宿主层散布
///   平台相关常量；
/// - 允许通过 TOML 的 `[socket]` 表声明，与提供者名称一起构成完整的传输配置。
///
/// ## 契约（What）
/// - `nonblocking` 默认开启：产出的通道交由事件循环驱动；
/// - `reuse_address` 对 Rendezvous 通道始终生效，对称建连双方需要绑定同一端口；
/// - 缓冲区大小为 `None` 时沿用内核默认值；上限为 `i32::MAX` 字节（内核以 `int` 接收），
///   TOML 中越界的取值在解析阶段即被拒绝；
/// - `apply` 在套接字创建后、交付前执行，失败时整个打开过程失败。
#[derive(Clone, Copy, Debug, Eq, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UdtSocketOptions {
    ip_version: IpVersion,
    nonblocking: bool,
    reuse_address: bool,
    #[serde(deserialize_with = "buffer_size")]
    send_buffer_size: Option<u32>,
    #[serde(deserialize_with = "buffer_size")]
    recv_buffer_size: Option<u32>,
}

/// 内核以 `int` 接收 `SO_SNDBUF`/`SO_RCVBUF`。
const MAX_BUFFER_SIZE: u32 = i32::MAX as u32;

fn buffer_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(size) = Option::<u64>::deserialize(deserializer)? else {
        return Ok(None);
    };
    match u32::try_from(size) {
        Ok(size) if size <= MAX_BUFFER_SIZE => Ok(Some(size)),
        _ => Err(serde::de::Error::custom(format!(
            "buffer size {size} exceeds {MAX_BUFFER_SIZE} bytes"
        ))),
    }
}

impl Default for UdtSocketOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl UdtSocketOptions {
    /// 默认配置：IPv4、非阻塞、不强制地址复用、内核默认缓冲区。
    pub const fn new() -> Self {
        Self {
            ip_version: IpVersion::V4,
            nonblocking: true,
            reuse_address: false,
            send_buffer_size: None,
            recv_buffer_size: None,
        }
    }

    pub fn with_ip_version(mut self, ip_version: IpVersion) -> Self {
        self.ip_version = ip_version;
        self
    }

    pub fn with_nonblocking(mut self, enabled: bool) -> Self {
        self.nonblocking = enabled;
        self
    }

    pub fn with_reuse_address(mut self, enabled: bool) -> Self {
        self.reuse_address = enabled;
        self
    }

    pub fn with_send_buffer_size(mut self, size: Option<u32>) -> Self {
        self.send_buffer_size = size;
        self
    }

    pub fn with_recv_buffer_size(mut self, size: Option<u32>) -> Self {
        self.recv_buffer_size = size;
        self
    }

    pub fn ip_version(&self) -> IpVersion {
        self.ip_version
    }

    pub fn nonblocking(&self) -> bool {
        self.nonblocking
    }

    pub fn reuse_address(&self) -> bool {
        self.reuse_address
    }

    pub fn send_buffer_size(&self) -> Option<u32> {
        self.send_buffer_size
    }

    pub fn recv_buffer_size(&self) -> Option<u32> {
        self.recv_buffer_size
    }

    /// 将配置应用到新建的套接字。
    ///
    /// 经由 `with_*` 构造的超限缓冲区大小以 `InvalidInput` 拒绝，不会被截断后写入内核。
    pub(crate) fn apply(&self, socket: &Socket, kind: ConnectionKind) -> io::Result<()> {
        socket.set_nonblocking(self.nonblocking)?;
        if self.reuse_address || kind == ConnectionKind::Rendezvous {
            socket.set_reuse_address(true)?;
        }
        if let Some(size) = self.send_buffer_size {
            socket.set_send_buffer_size(checked_buffer_size(size)?)?;
        }
        if let Some(size) = self.recv_buffer_size {
            socket.set_recv_buffer_size(checked_buffer_size(size)?)?;
        }
        Ok(())
    }
}

fn checked_buffer_size(size: u32) -> io::Result<usize> {
    if size > MAX_BUFFER_SIZE {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("buffer size {size} exceeds {MAX_BUFFER_SIZE} bytes"),
        ));
    }
    usize::try_from(size).map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

/// 以 TOML 描述的 UDT 传输配置。
///
/// ```toml
/// provider = "datagram-rendezvous"
///
/// [socket]
/// ip_version = "v4"
/// reuse_address = true
/// recv_buffer_size = 262144
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UdtTransportConfig {
    provider: String,
    #[serde(default)]
    socket: UdtSocketOptions,
}

impl UdtTransportConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, UdtError> {
        Ok(toml::from_str(source)?)
    }

    pub fn provider_name(&self) -> &str {
        &self.provider
    }

    pub fn socket(&self) -> &UdtSocketOptions {
        &self.socket
    }

    /// 解析提供者名称并绑定按配置构造的系统传输。
    ///
    /// 名称未注册时返回 [`UdtError::UnknownProvider`]。
    pub fn into_factory(self) -> Result<ConfiguredProvider, UdtError> {
        let provider = UdtProvider::by_name(&self.provider)?;
        Ok(ConfiguredProvider::new(
            *provider,
            Arc::new(SystemTransport::new(self.socket)),
        ))
    }
}
