//! # Integration Tests
//!
//! Integration and end-to-end tests.
//!
//! Covers:
//! - Contract shape checks
//! - Config -> dispatcher -> real TCP/UDP collector round trips
//! - Reconnection after the collector drops the session

#[cfg(test)]
mod contract_tests {
    use contracts::{AttrValue, Event, MetricsError};

    #[test]
    fn test_event_defaults_from_minimal_json() {
        let event: Event = serde_json::from_str(r#"{"service":"api.requests"}"#).unwrap();
        assert_eq!(event.service, "api.requests");
        assert!(event.host.is_empty());
        assert_eq!(event.metric, 0);
        assert!(!event.transient);
        assert!(event.attributes.is_none());
    }

    #[test]
    fn test_event_attributes_accept_bool_and_string() {
        let event: Event = serde_json::from_str(
            r#"{"service":"s","attributes":{"canary":true,"route":"/users"}}"#,
        )
        .unwrap();
        assert_eq!(event.attr("canary"), Some(&AttrValue::Bool(true)));
        assert_eq!(
            event.attr("route"),
            Some(&AttrValue::String("/users".to_string()))
        );
    }

    #[test]
    fn test_publish_error_names_service() {
        let err = MetricsError::publish("shop.checkout", MetricsError::backend_not_found("x"));
        assert!(err.to_string().contains("shop.checkout"));
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::time::Duration;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{Event, MetricsConfig, MetricsError, WireEvent, WireFormat, PERSIST_ATTR};
    use dispatcher::build_dispatcher;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::{TcpListener, UdpSocket};

    fn tcp_config(addr: &str) -> MetricsConfig {
        let toml = format!(
            r#"
backend = "riemann"
prefix = "shop."
host = "web-1"

[network]
protocol = "tcp"
addr = "{addr}"

[network.attributes]
version = "1.4.2"
"#
        );
        ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap()
    }

    async fn read_lines(listener: &TcpListener, n: usize) -> Vec<WireEvent> {
        let (stream, _) = listener.accept().await.unwrap();
        let mut lines = BufReader::new(stream).lines();
        let mut events = Vec::new();
        while events.len() < n {
            let line = lines.next_line().await.unwrap().unwrap();
            events.push(serde_json::from_str(&line).unwrap());
        }
        events
    }

    /// Config file -> Dispatcher -> NetworkBackend -> TCP collector
    #[tokio::test]
    async fn test_e2e_tcp_publish() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move { read_lines(&listener, 2).await });

        let dispatcher = build_dispatcher(&tcp_config(&addr)).unwrap();
        let events = [
            Event::new("checkout").with_metric(7).with_tags(["http"]),
            Event::new("cart").with_host("worker-2").transient(true),
        ];
        dispatcher.publish(&events).await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received[0].service, "shop.checkout");
        assert_eq!(received[0].host, "web-1");
        assert_eq!(received[0].metric, 7);
        assert_eq!(received[0].tags, vec!["http"]);
        assert_eq!(received[0].attr(PERSIST_ATTR), Some("true"));
        assert_eq!(received[0].attr("version"), Some("1.4.2"));

        assert_eq!(received[1].service, "shop.cart");
        assert_eq!(received[1].host, "worker-2");
        assert_eq!(received[1].attr(PERSIST_ATTR), Some("false"));

        // Caller's events are untouched
        assert_eq!(events[0].service, "checkout");
        assert!(events[0].host.is_empty());
    }

    /// Collector drops the session; the failed publish reports the service and
    /// the next publish goes out over a fresh connection
    #[tokio::test]
    async fn test_e2e_reconnect_after_collector_restart() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            let first = read_lines(&listener, 1).await;
            // first session dropped here
            let second = read_lines(&listener, 1).await;
            (first, second)
        });

        let dispatcher = build_dispatcher(&tcp_config(&addr)).unwrap();
        dispatcher.publish(&[Event::new("first")]).await.unwrap();

        let mut failure = None;
        for _ in 0..50 {
            tokio::time::sleep(Duration::from_millis(10)).await;
            if let Err(e) = dispatcher.publish(&[Event::new("probe")]).await {
                failure = Some(e);
                break;
            }
        }

        let err = failure.expect("publish never observed the closed session");
        match &err {
            MetricsError::Publish { service, .. } => assert_eq!(service, "shop.probe"),
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.send_error().is_some());

        dispatcher.publish(&[Event::new("again")]).await.unwrap();

        let (first, second) = server.await.unwrap();
        assert_eq!(first[0].service, "shop.first");
        assert_eq!(second[0].service, "shop.again");
    }

    /// A publish cut off by the caller's deadline mid-write must not leave a
    /// partial frame in front of the next event
    #[tokio::test]
    async fn test_e2e_timed_out_publish_keeps_stream_intact() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move {
            // Never read: the client's write stalls once socket buffers fill
            let (stalled, _) = listener.accept().await.unwrap();
            let next = read_lines(&listener, 1).await;
            drop(stalled);
            next
        });

        let dispatcher = build_dispatcher(&tcp_config(&addr)).unwrap();

        let mut big = Event::new("big");
        big.set_attr("blob", "x".repeat(32 << 20));
        let timed_out = tokio::time::timeout(
            Duration::from_millis(300),
            dispatcher.publish(std::slice::from_ref(&big)),
        )
        .await
        .is_err();
        assert!(timed_out);

        dispatcher.publish(&[Event::new("small")]).await.unwrap();

        let received = server.await.unwrap();
        assert_eq!(received[0].service, "shop.small");
    }

    #[tokio::test]
    async fn test_e2e_http_access_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let server = tokio::spawn(async move { read_lines(&listener, 2).await });

        let dispatcher = build_dispatcher(&tcp_config(&addr)).unwrap();
        dispatcher
            .publish_http_access(Duration::from_millis(85), 500)
            .await
            .unwrap();

        let received = server.await.unwrap();
        assert_eq!(received[0].service, "shop.inbound.timings");
        assert_eq!(received[0].metric, 85);
        assert_eq!(received[0].state, "critical");
        assert_eq!(received[0].attr("status"), None);

        assert_eq!(received[1].service, "shop.outbound");
        assert_eq!(received[1].attr("status"), Some("500"));
        assert_eq!(received[1].attr(PERSIST_ATTR), Some("false"));
    }

    #[tokio::test]
    async fn test_e2e_udp_bincode() {
        let receiver = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = receiver.local_addr().unwrap().to_string();

        let mut config = MetricsConfig {
            backend: Some("riemann".to_string()),
            host: Some("web-9".to_string()),
            ..MetricsConfig::default()
        };
        config.network.protocol = contracts::Protocol::Udp;
        config.network.format = WireFormat::Bincode;
        config.network.addr = addr;

        let dispatcher = build_dispatcher(&config).unwrap();
        dispatcher
            .publish(&[Event::new("queue.depth").with_metric(12)])
            .await
            .unwrap();

        let mut buf = vec![0u8; 65536];
        let n = receiver.recv(&mut buf).await.unwrap();
        let len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
        assert_eq!(len, n - 4);

        let frame = dispatcher::transport::encode_frame(
            WireFormat::Bincode,
            &WireEvent {
                host: "web-9".to_string(),
                time: 0,
                state: String::new(),
                service: "queue.depth".to_string(),
                metric: 12,
                ttl: 0.0,
                tags: Vec::new(),
                attributes: [(PERSIST_ATTR.to_string(), "true".to_string())].into(),
            },
        )
        .unwrap();
        // Same length as a locally encoded equivalent; timestamps differ only in value
        assert_eq!(frame.len(), n);
    }

    #[tokio::test]
    async fn test_e2e_no_backend_is_noop() {
        let dispatcher = build_dispatcher(&MetricsConfig::default()).unwrap();
        dispatcher
            .publish(&[Event::new("dropped"), Event::new("also.dropped")])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_e2e_unreachable_collector() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        drop(listener);

        let dispatcher = build_dispatcher(&tcp_config(&addr)).unwrap();
        let err = dispatcher
            .publish(&[Event::new("a"), Event::new("b")])
            .await
            .unwrap_err();

        match err {
            MetricsError::Publish { service, source } => {
                assert_eq!(service, "shop.a");
                assert!(matches!(*source, MetricsError::Connection { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_select_missing_backend_keeps_active() {
        let config = MetricsConfig {
            backend: Some("stdout".to_string()),
            ..MetricsConfig::default()
        };
        let dispatcher = build_dispatcher(&config).unwrap();

        let err = dispatcher.registry().select_active("graphite").unwrap_err();
        assert!(matches!(err, MetricsError::BackendNotFound { .. }));
        assert_eq!(
            dispatcher.registry().active_name().as_deref(),
            Some("stdout")
        );
    }
}
