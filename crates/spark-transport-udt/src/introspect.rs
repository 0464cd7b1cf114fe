//! 从不透明的通道句柄中探查 UDT 原生通道与套接字，供调试与监控使用。
//!
//! # 教案式说明
//! - **Why**：监控组件手里只有 `&dyn Channel`，需要在不知道具体类型的前提下取得
//!   原生套接字编号或读取套接字选项；对于非 UDT 句柄必须安静地返回 `None`。
//! - **How**：先尝试下转型为提供者产出的 [`UdtChannel`]（一次模式匹配即可定位
//!   分支），再按 [`ChannelVariant::ALL`] 的固定顺序尝试六种具体通道类型。
//!   各类型互斥，首个命中即返回。
//! - **What**：所有函数均为全函数：`None` 输入、外部句柄都得到 `None`，从不报错、
//!   从不修改句柄。

use crate::channel::{
    ByteAcceptorChannel, ByteConnectorChannel, ByteRendezvousChannel, Channel,
    MessageAcceptorChannel, MessageConnectorChannel, MessageRendezvousChannel, UdtChannel,
};
use crate::native::{NativeChannel, NativeSocket};
use crate::variant::ChannelVariant;

/// 识别句柄属于哪一种 UDT 通道形态，并取出其原生通道。
pub fn identify(channel: Option<&dyn Channel>) -> Option<(ChannelVariant, &NativeChannel)> {
    let any = channel?.as_any();
    if let Some(udt) = any.downcast_ref::<UdtChannel>() {
        return Some((udt.variant(), udt.native()));
    }
    ChannelVariant::ALL.into_iter().find_map(|variant| {
        let native = match variant {
            ChannelVariant::StreamAcceptor => any
                .downcast_ref::<ByteAcceptorChannel>()
                .map(ByteAcceptorChannel::native),
            ChannelVariant::StreamConnector => any
                .downcast_ref::<ByteConnectorChannel>()
                .map(ByteConnectorChannel::native),
            ChannelVariant::StreamRendezvous => any
                .downcast_ref::<ByteRendezvousChannel>()
                .map(ByteRendezvousChannel::native),
            ChannelVariant::DatagramAcceptor => any
                .downcast_ref::<MessageAcceptorChannel>()
                .map(MessageAcceptorChannel::native),
            ChannelVariant::DatagramConnector => any
                .downcast_ref::<MessageConnectorChannel>()
                .map(MessageConnectorChannel::native),
            ChannelVariant::DatagramRendezvous => any
                .downcast_ref::<MessageRendezvousChannel>()
                .map(MessageRendezvousChannel::native),
        };
        native.map(|native| (variant, native))
    })
}

/// 返回句柄背后的 UDT 原生通道；非 UDT 句柄返回 `None`。
pub fn channel_udt(channel: Option<&dyn Channel>) -> Option<&NativeChannel> {
    identify(channel).map(|(_, native)| native)
}

/// 返回句柄背后的 UDT 原生套接字；非 UDT 句柄返回 `None`。
pub fn socket_udt(channel: Option<&dyn Channel>) -> Option<&NativeSocket> {
    channel_udt(channel).map(NativeChannel::socket)
}
