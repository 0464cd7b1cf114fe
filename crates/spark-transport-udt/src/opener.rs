use std::io;

use crate::error::{UdtError, open_operation};
use crate::kind::{ConnectionKind, SocketType};
use crate::native::{NativeChannel, NativeTransport};

/// 打开被动监听的原生通道。
pub(crate) fn open_acceptor(
    transport: &dyn NativeTransport,
    socket_type: SocketType,
) -> Result<NativeChannel, UdtError> {
    let provider = transport.select(socket_type);
    wrap(ConnectionKind::Acceptor, socket_type, provider.open_acceptor())
}

/// 打开主动发起的原生通道。
pub(crate) fn open_connector(
    transport: &dyn NativeTransport,
    socket_type: SocketType,
) -> Result<NativeChannel, UdtError> {
    let provider = transport.select(socket_type);
    wrap(ConnectionKind::Connector, socket_type, provider.open_connector())
}

/// 打开对称建连的原生通道。
pub(crate) fn open_rendezvous(
    transport: &dyn NativeTransport,
    socket_type: SocketType,
) -> Result<NativeChannel, UdtError> {
    let provider = transport.select(socket_type);
    wrap(
        ConnectionKind::Rendezvous,
        socket_type,
        provider.open_rendezvous(),
    )
}

fn wrap(
    kind: ConnectionKind,
    socket_type: SocketType,
    opened: io::Result<NativeChannel>,
) -> Result<NativeChannel, UdtError> {
    opened.map_err(|source| {
        let operation = open_operation(kind);
        tracing::debug!(
            code = operation.code,
            socket_type = %socket_type,
            error = %source,
            "{} failed",
            operation.message
        );
        UdtError::ChannelOpenFailed {
            kind,
            socket_type,
            source,
        }
    })
}
