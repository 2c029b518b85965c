//! Discovery cycle behavior against scripted local endpoints: probes that
//! finish before the cycle deadline survive a stalled peer, and the loop
//! spaces its cycles instead of rescanning immediately at startup.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use wayfarer::config::DiscoveryConfig;
use wayfarer::discovery::DiscoveryProber;
use wayfarer::registry::AgentRegistry;

const FAST_CARD: &str = r#"{"agent_id":"fast-agent","name":"FastAgent","version":"1.0.0","capabilities":["flight_search"],"endpoints":{}}"#;

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    (listener, url)
}

/// Answers every request with the fast agent's card, counting connections.
fn serve_card(listener: TcpListener, hits: Arc<AtomicU32>) {
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            hits.fetch_add(1, Ordering::SeqCst);
            tokio::spawn(async move {
                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{FAST_CARD}",
                    FAST_CARD.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
}

/// Accepts connections and never answers them.
fn serve_stall(listener: TcpListener) {
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });
}

fn config(endpoints: Vec<String>) -> DiscoveryConfig {
    DiscoveryConfig {
        known_endpoints: endpoints,
        // Per-probe timeout far beyond the cycle deadline, so only the
        // cycle deadline can cut a stalled probe off.
        probe_timeout_secs: 30,
        cycle_timeout_secs: 1,
        ..DiscoveryConfig::default()
    }
}

#[tokio::test]
async fn completed_probe_survives_cycle_deadline() {
    let (fast, fast_url) = bind().await;
    let (stalled, stalled_url) = bind().await;
    serve_card(fast, Arc::new(AtomicU32::new(0)));
    serve_stall(stalled);

    let registry = Arc::new(AgentRegistry::new());
    let prober =
        DiscoveryProber::new(registry.clone(), config(vec![fast_url, stalled_url])).unwrap();

    let health = prober.run_once().await;

    // The stalled endpoint forfeits only its own slot.
    assert_eq!(health.discovered, 1);
    assert_eq!(health.expected, 2);

    let snapshot = registry.snapshot().await;
    let agent = snapshot
        .get("fast-agent")
        .expect("fast agent must be registered");
    assert!(agent.is_active());
    assert!(agent.response_time_ms.is_some());
}

#[tokio::test]
async fn discovery_loop_waits_a_full_interval_before_its_first_cycle() {
    let (fast, fast_url) = bind().await;
    let hits = Arc::new(AtomicU32::new(0));
    serve_card(fast, hits.clone());

    let mut cfg = config(vec![fast_url]);
    cfg.scan_interval_secs = 3_600;

    let registry = Arc::new(AgentRegistry::new());
    let prober = Arc::new(DiscoveryProber::new(registry, cfg).unwrap());

    let loop_prober = prober.clone();
    let task = tokio::spawn(async move { loop_prober.run_forever().await });
    tokio::time::sleep(Duration::from_millis(200)).await;
    task.abort();

    // The caller owns the initial cycle; the loop itself has not probed yet.
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}
