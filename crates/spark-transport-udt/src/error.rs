use std::io;
use std::time::Duration;

use thiserror::Error;

use crate::kind::{ConnectionKind, SocketType};

/// 描述一次提供者操作对应的稳定错误码与默认文案。
#[derive(Clone, Copy, Debug)]
pub(crate) struct OperationKind {
    pub code: &'static str,
    pub message: &'static str,
}

pub(crate) const OPEN_ACCEPTOR: OperationKind = OperationKind {
    code: "spark.transport.udt.open_acceptor_failed",
    message: "udt open acceptor",
};
pub(crate) const OPEN_CONNECTOR: OperationKind = OperationKind {
    code: "spark.transport.udt.open_connector_failed",
    message: "udt open connector",
};
pub(crate) const OPEN_RENDEZVOUS: OperationKind = OperationKind {
    code: "spark.transport.udt.open_rendezvous_failed",
    message: "udt open rendezvous",
};

const INVALID_STATE_CODE: &str = "spark.transport.udt.invalid_state";
const UNKNOWN_PROVIDER_CODE: &str = "spark.transport.udt.unknown_provider";
const CONFIG_CODE: &str = "spark.transport.udt.config_invalid";

/// 返回连接类型对应的打开操作描述。
pub(crate) fn open_operation(kind: ConnectionKind) -> OperationKind {
    match kind {
        ConnectionKind::Acceptor => OPEN_ACCEPTOR,
        ConnectionKind::Connector => OPEN_CONNECTOR,
        ConnectionKind::Rendezvous => OPEN_RENDEZVOUS,
    }
}

/// 重试建议：调用方在多久之后可以再次尝试。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RetryAdvice {
    wait: Duration,
}

impl RetryAdvice {
    /// 以等待时长构造重试建议。
    pub const fn after(wait: Duration) -> Self {
        Self { wait }
    }

    /// 建议的等待时长。
    pub fn wait(&self) -> Duration {
        self.wait
    }
}

/// 错误分类，供上层 Bootstrap 决定重试、降级或放弃。
///
/// # 教案式注释
///
/// ## 意图 (Why)
/// - 与 spark 其他传输实现保持同一套“可重试 / 不可重试”语义，
///   使调用方无需理解 UDT 原生错误即可做出策略决策。
///
/// ## 契约 (What)
/// - `Retryable`：资源暂时不可用，附带建议等待时长；
/// - `NonRetryable`：编程缺陷、权限不足或配置错误，重试不会改变结果。
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorCategory {
    Retryable(RetryAdvice),
    NonRetryable,
}

/// UDT 提供者统一错误类型。
#[derive(Debug, Error)]
pub enum UdtError {
    /// 连接类型或套接字类型越界，属于编程缺陷，禁止捕获后重试。
    #[error("UDT 提供者状态非法: {detail}")]
    InvalidState { detail: String },
    /// 原生传输无法打开请求的通道，保留底层 IO 错误。
    #[error("无法打开 UDT {socket_type} {kind} 原生通道: {source}")]
    ChannelOpenFailed {
        kind: ConnectionKind,
        socket_type: SocketType,
        #[source]
        source: io::Error,
    },
    /// 名称不对应任何已注册的提供者。
    #[error("未知的 UDT 提供者名称: {0}")]
    UnknownProvider(String),
    /// 传输配置解析失败。
    #[error("UDT 传输配置解析失败: {0}")]
    Config(#[from] toml::de::Error),
}

impl UdtError {
    pub(crate) fn invalid_state(detail: impl Into<String>) -> Self {
        UdtError::InvalidState {
            detail: detail.into(),
        }
    }

    /// 稳定错误码，用于日志检索与告警聚合。
    pub fn code(&self) -> &'static str {
        match self {
            UdtError::InvalidState { .. } => INVALID_STATE_CODE,
            UdtError::ChannelOpenFailed { kind, .. } => open_operation(*kind).code,
            UdtError::UnknownProvider(_) => UNKNOWN_PROVIDER_CODE,
            UdtError::Config(_) => CONFIG_CODE,
        }
    }

    /// 错误分类。
    ///
    /// `ChannelOpenFailed` 先按原始 errno、再按 `io::ErrorKind` 细分，其余变体一律不可重试。
    pub fn category(&self) -> ErrorCategory {
        match self {
            UdtError::ChannelOpenFailed { source, .. } => categorize_io_error(source),
            UdtError::InvalidState { .. }
            | UdtError::UnknownProvider(_)
            | UdtError::Config(_) => ErrorCategory::NonRetryable,
        }
    }
}

/// 描述符、内核缓冲或内存耗尽对应的原始 errno。
#[cfg(unix)]
const RESOURCE_EXHAUSTION_ERRNOS: &[i32] =
    &[libc::EMFILE, libc::ENFILE, libc::ENOBUFS, libc::ENOMEM];
/// `WSAEMFILE` 与 `WSAENOBUFS`。
#[cfg(windows)]
const RESOURCE_EXHAUSTION_ERRNOS: &[i32] = &[10024, 10055];
#[cfg(not(any(unix, windows)))]
const RESOURCE_EXHAUSTION_ERRNOS: &[i32] = &[];

const EXHAUSTION_BACKOFF: RetryAdvice = RetryAdvice::after(Duration::from_millis(50));

fn categorize_io_error(error: &io::Error) -> ErrorCategory {
    use io::ErrorKind;
    // EMFILE/ENFILE/ENOBUFS 在标准库中没有稳定的 ErrorKind，必须先看原始 errno。
    if error
        .raw_os_error()
        .is_some_and(|code| RESOURCE_EXHAUSTION_ERRNOS.contains(&code))
    {
        return ErrorCategory::Retryable(EXHAUSTION_BACKOFF);
    }
    match error.kind() {
        ErrorKind::WouldBlock | ErrorKind::Interrupted => {
            ErrorCategory::Retryable(RetryAdvice::after(Duration::from_millis(5)))
        }
        ErrorKind::OutOfMemory | ErrorKind::AddrInUse | ErrorKind::AddrNotAvailable => {
            ErrorCategory::Retryable(EXHAUSTION_BACKOFF)
        }
        _ => ErrorCategory::NonRetryable,
    }
}
