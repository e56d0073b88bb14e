//! Connection pool caps, saturation and eviction under real traffic.

mod common;

use std::sync::Arc;
use std::time::Duration;

use restbind::{CallArguments, Client, ClientConfig, ClientError, EndpointDescriptor};
use serde::Deserialize;

use common::{start_mock_backend, Reply};

#[derive(Debug, Default, Deserialize)]
struct Ack {
    ok: Option<bool>,
}

#[tokio::test]
async fn saturated_route_fails_extra_call_with_acquire_timeout() {
    let backend = start_mock_backend(|_| async {
        Reply::delayed(200, r#"{"ok":true}"#, Duration::from_millis(400))
    })
    .await;

    let mut config = ClientConfig::default();
    config.pool.max_per_route = 2;
    config.timeouts.acquire_ms = 100;
    config.timeouts.response_ms = 2_000;
    config.retries.max_retries = 0;

    let client = Arc::new(
        Client::builder(backend.base_url())
            .config(config)
            .build()
            .unwrap(),
    );

    let mut holders = Vec::new();
    for _ in 0..2 {
        let client = Arc::clone(&client);
        holders.push(tokio::spawn(async move {
            let ping = client.bind::<Ack>(EndpointDescriptor::get("/slow"));
            ping.call(CallArguments::new()).await
        }));
    }

    // Let both slots fill before the extra call arrives.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let ping = client.bind::<Ack>(EndpointDescriptor::get("/slow"));
    let err = ping.call(CallArguments::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::ConnectionAcquireTimeout(_)));

    for holder in holders {
        assert!(holder.await.unwrap().is_ok());
    }
    assert_eq!(client.pool_stats().in_flight(), 0);
}

#[tokio::test]
async fn caps_hold_under_concurrent_load() {
    let backend = start_mock_backend(|_| async {
        Reply::delayed(200, r#"{"ok":true}"#, Duration::from_millis(25))
    })
    .await;

    let mut config = ClientConfig::default();
    config.pool.max_total_connections = 10;
    config.pool.max_per_route = 10;
    config.timeouts.acquire_ms = 5_000;
    config.timeouts.response_ms = 5_000;
    config.retries.max_retries = 0;

    let client = Arc::new(
        Client::builder(backend.base_url())
            .config(config)
            .build()
            .unwrap(),
    );

    let mut calls = Vec::new();
    for _ in 0..50 {
        let client = Arc::clone(&client);
        calls.push(tokio::spawn(async move {
            let ping = client.bind::<Ack>(EndpointDescriptor::get("/ping"));
            ping.call(CallArguments::new()).await
        }));
    }

    for call in calls {
        assert!(call.await.unwrap().is_ok());
    }

    // The backend never saw more transport connections than the cap, and
    // everything returned to the idle set.
    assert!(
        backend.connection_count() <= 10,
        "backend accepted {} connections with a cap of 10",
        backend.connection_count()
    );
    assert_eq!(backend.request_count(), 50);
    let stats = client.pool_stats();
    assert_eq!(stats.in_flight(), 0);
    assert!(stats.live <= 10);
}

#[tokio::test]
async fn busy_count_returns_to_baseline_after_success_and_failure() {
    let backend = start_mock_backend(|request| async move {
        if request.target == "/boom" {
            Reply::status(500, "boom")
        } else {
            Reply::ok(r#"{"ok":true}"#)
        }
    })
    .await;

    let mut config = ClientConfig::default();
    config.retries.max_retries = 0;
    config.timeouts.response_ms = 1_000;

    let client = Client::builder(backend.base_url())
        .config(config)
        .build()
        .unwrap();

    let ping = client.bind::<Ack>(EndpointDescriptor::get("/ping"));
    ping.call(CallArguments::new()).await.unwrap();
    assert_eq!(client.pool_stats().in_flight(), 0);

    let boom = client.bind::<Ack>(EndpointDescriptor::get("/boom"));
    let err = boom.call(CallArguments::new()).await.unwrap_err();
    assert!(matches!(err, ClientError::Application { .. }));
    assert_eq!(client.pool_stats().in_flight(), 0);
}

#[tokio::test]
async fn sweeper_evicts_connections_idle_past_threshold() {
    let backend = start_mock_backend(|_| async { Reply::ok(r#"{"ok":true}"#) }).await;

    let mut config = ClientConfig::default();
    config.pool.max_idle_secs = 0;
    config.pool.sweep_interval_secs = 1;
    config.retries.max_retries = 0;

    let client = Client::builder(backend.base_url())
        .config(config)
        .build()
        .unwrap();

    let ping = client.bind::<Ack>(EndpointDescriptor::get("/ping"));
    ping.call(CallArguments::new()).await.unwrap();

    let stats = client.pool_stats();
    assert_eq!(stats.live, 1);
    assert_eq!(stats.idle, 1);

    tokio::time::sleep(Duration::from_millis(1_500)).await;

    let stats = client.pool_stats();
    assert_eq!(stats.live, 0);
    assert_eq!(stats.idle, 0);
}
