//! spark-transport-udt 提供者与探查函数的契约测试。
//!
//! # 教案式说明
//! - **Why**：提供者分派与句柄探查共享六路身份，任何一侧回归都会让监控读到错误的套接字；
//!   该测试从公开 API 出发重放端到端场景。
//! - **How**：使用进程级系统传输产出真实 UDP 套接字，并以注入的故障传输模拟原生打开失败。
//! - **What**：每个测试失败时 panic，并附带出错的提供者名称。

use std::any::Any;
use std::collections::HashSet;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use socket2::{Domain, Protocol, Socket, Type};
use spark_transport_udt::{
    Channel, ChannelFactory, ChannelVariant, ConnectionKind, DATAGRAM_RENDEZVOUS, ErrorCategory,
    NativeChannel, NativeProvider, NativeTransport, PROVIDERS, STREAM_ACCEPTOR, STREAM_CONNECTOR,
    SocketType, UdtError, UdtProvider, channel_udt, identify, socket_udt,
};

/// 不属于 UDT 的 TCP 通道，模拟其他传输交来的句柄。
#[derive(Debug)]
struct ForeignTcpChannel {
    _socket: Socket,
}

impl ForeignTcpChannel {
    fn open() -> Self {
        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .expect("open tcp socket");
        Self { _socket: socket }
    }
}

impl Channel for ForeignTcpChannel {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Linux、macOS 与各 BSD 上 `EMFILE` 的取值。
const EMFILE: i32 = 24;

/// 前 `failures` 次打开返回资源耗尽，其后委托给系统传输。
#[derive(Debug)]
struct FlakyTransport {
    inner: FlakyProvider,
}

#[derive(Debug)]
struct FlakyProvider {
    remaining_failures: AtomicUsize,
    attempts: AtomicUsize,
}

impl FlakyTransport {
    fn new(failures: usize) -> Self {
        Self {
            inner: FlakyProvider {
                remaining_failures: AtomicUsize::new(failures),
                attempts: AtomicUsize::new(0),
            },
        }
    }

    fn attempts(&self) -> usize {
        self.inner.attempts.load(Ordering::SeqCst)
    }
}

impl FlakyProvider {
    fn open(&self, kind: ConnectionKind) -> io::Result<NativeChannel> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .remaining_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failed {
            return Err(io::Error::from_raw_os_error(EMFILE));
        }
        let provider = spark_transport_udt::SystemTransport::global().select(SocketType::Stream);
        match kind {
            ConnectionKind::Acceptor => provider.open_acceptor(),
            ConnectionKind::Connector => provider.open_connector(),
            ConnectionKind::Rendezvous => provider.open_rendezvous(),
        }
    }
}

impl NativeProvider for FlakyProvider {
    fn socket_type(&self) -> SocketType {
        SocketType::Stream
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

impl NativeTransport for FlakyTransport {
    fn select(&self, _socket_type: SocketType) -> &dyn NativeProvider {
        &self.inner
    }
}

#[test]
fn every_provider_produces_a_channel_of_its_own_variant() {
    for provider in PROVIDERS {
        let channel = provider
            .produce()
            .unwrap_or_else(|err| panic!("{provider} produce failed: {err}"));
        let (variant, native) = identify(Some(&channel)).expect("produced channel is udt");
        assert_eq!(variant, provider.variant(), "{provider}");
        assert_eq!(native.kind(), provider.kind(), "{provider}");
        assert_eq!(native.socket_type(), provider.socket_type(), "{provider}");
        assert!(channel_udt(Some(&channel)).is_some(), "{provider}");
    }
}

#[test]
fn stream_acceptor_is_identified_as_stream_acceptor() {
    let provider = UdtProvider::new(SocketType::Stream, ConnectionKind::Acceptor);
    let channel = provider.produce().expect("produce stream acceptor");
    let (variant, _) = identify(Some(&channel)).expect("udt channel");
    assert_eq!(variant, ChannelVariant::StreamAcceptor);
    assert_eq!(variant.name(), "stream-acceptor");
}

#[test]
fn datagram_rendezvous_exposes_its_native_socket() {
    let channel = DATAGRAM_RENDEZVOUS.produce().expect("produce datagram rendezvous");
    let socket = socket_udt(Some(&channel)).expect("native socket handle");
    assert_eq!(socket.socket_type(), SocketType::Datagram);
    assert_eq!(socket.id(), channel.native().socket().id());
}

#[test]
fn handles_from_other_transports_are_not_udt() {
    let foreign = ForeignTcpChannel::open();
    assert!(identify(Some(&foreign)).is_none());
    assert!(channel_udt(Some(&foreign)).is_none());
    assert!(socket_udt(Some(&foreign)).is_none());
}

#[test]
fn absent_handles_are_not_udt() {
    assert!(channel_udt(None).is_none());
    assert!(socket_udt(None).is_none());
}

#[test]
fn boxed_handles_are_introspected_through_the_trait_object() {
    let channels: Vec<Box<dyn Channel>> = vec![
        Box::new(STREAM_CONNECTOR.produce().expect("produce")),
        Box::new(ForeignTcpChannel::open()),
    ];
    let found: Vec<Option<ChannelVariant>> = channels
        .iter()
        .map(|channel| identify(Some(&**channel)).map(|(variant, _)| variant))
        .collect();
    assert_eq!(found, vec![Some(ChannelVariant::StreamConnector), None]);
}

#[test]
fn repeated_produce_returns_distinct_channels() {
    let first = STREAM_CONNECTOR.produce().expect("first");
    let second = STREAM_CONNECTOR.produce().expect("second");
    assert_ne!(first.native().socket().id(), second.native().socket().id());
    assert!(!std::ptr::eq(first.native(), second.native()));
}

#[test]
fn native_open_failure_surfaces_and_leaves_provider_reusable() {
    let transport = FlakyTransport::new(1);
    let provider = STREAM_CONNECTOR;

    let err = provider
        .produce_with(&transport)
        .expect_err("first open is refused");
    match &err {
        UdtError::ChannelOpenFailed {
            kind,
            socket_type,
            source,
        } => {
            assert_eq!(*kind, ConnectionKind::Connector);
            assert_eq!(*socket_type, SocketType::Stream);
            assert_eq!(source.raw_os_error(), Some(EMFILE));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(err.code(), "spark.transport.udt.open_connector_failed");
    #[cfg(unix)]
    assert!(matches!(err.category(), ErrorCategory::Retryable(_)));
    assert_eq!(transport.attempts(), 1);

    assert_eq!(provider.kind(), ConnectionKind::Connector);
    assert_eq!(provider.socket_type(), SocketType::Stream);
    let channel = provider.produce_with(&transport).expect("second open succeeds");
    assert_eq!(channel.variant(), ChannelVariant::StreamConnector);
    assert_eq!(transport.attempts(), 2);
}

#[test]
fn configured_factory_builds_from_toml() {
    let factory = spark_transport_udt::UdtTransportConfig::from_toml_str(
        r#"
        provider = "message-acceptor"

        [socket]
        reuse_address = true
        "#,
    )
    .and_then(|config| config.into_factory())
    .expect("valid config");
    let channel = factory.new_channel().expect("produce");
    assert_eq!(channel.variant(), ChannelVariant::DatagramAcceptor);
    assert!(
        channel
            .native()
            .socket()
            .as_socket()
            .reuse_address()
            .expect("query")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn concurrent_produce_on_one_singleton_yields_distinct_sockets() {
    let provider: &'static UdtProvider = &STREAM_ACCEPTOR;
    let tasks: Vec<_> = (0..100)
        .map(|_| tokio::task::spawn_blocking(move || provider.produce()))
        .collect();

    let mut channels = Vec::with_capacity(tasks.len());
    for task in tasks {
        let channel = task.await.expect("join").expect("produce");
        channels.push(channel);
    }

    let ids: HashSet<_> = channels
        .iter()
        .map(|channel| channel.native().socket().id())
        .collect();
    assert_eq!(ids.len(), 100);
    assert!(
        channels
            .iter()
            .all(|channel| channel.variant() == ChannelVariant::StreamAcceptor)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn shared_configured_factory_is_usable_across_tasks() {
    let factory = Arc::new(
        spark_transport_udt::UdtTransportConfig::from_toml_str("provider = \"stream-rendezvous\"")
            .and_then(|config| config.into_factory())
            .expect("valid config"),
    );
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let factory = Arc::clone(&factory);
            tokio::task::spawn_blocking(move || factory.new_channel())
        })
        .collect();
    for handle in handles {
        let channel = handle.await.expect("join").expect("produce");
        assert_eq!(channel.variant(), ChannelVariant::StreamRendezvous);
    }
}
