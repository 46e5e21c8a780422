//! Load test for the arena server.
//!
//! Spawns multiple bot WebSocket clients that:
//! - Connect and join the arena
//! - Send random input frames (thrust, turn, fire) at a fixed rate
//! - Count snapshots, shots and kills they receive
//!
//! Usage: cargo run --bin loadtest -- [OPTIONS]
//!
//! Options:
//!   --clients N      Number of clients to spawn (default: 50)
//!   --duration S     Test duration in seconds (default: 30)
//!   --input-rate R   Input frames per second per client (default: 30)
//!   --url URL        Server URL (default: ws://127.0.0.1:8080/ws)

use arena_shared::protocol::{ClientMsg, InputMsg, ServerMsg};
use futures_util::{SinkExt, StreamExt};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_tungstenite::{connect_async, tungstenite::Message};

// === Metrics ===

#[derive(Default)]
struct Metrics {
    connected: AtomicU64,
    messages_received: AtomicU64,
    snapshots_received: AtomicU64,
    shots_seen: AtomicU64,
    kills_seen: AtomicU64,
    inputs_sent: AtomicU64,
    errors: AtomicU64,
    latency_sum_ms: AtomicU64,
    latency_count: AtomicU64,
}

// === Client task ===

async fn run_client(
    client_id: u32,
    url: String,
    input_rate: f64,
    duration: Duration,
    metrics: Arc<Metrics>,
) {
    let connect_start = Instant::now();

    let (mut ws, _) = match connect_async(&url).await {
        Ok(conn) => conn,
        Err(e) => {
            if client_id < 5 {
                eprintln!("Client {} failed to connect: {}", client_id, e);
            }
            metrics.errors.fetch_add(1, Ordering::Relaxed);
            return;
        }
    };

    metrics
        .latency_sum_ms
        .fetch_add(connect_start.elapsed().as_millis() as u64, Ordering::Relaxed);
    metrics.latency_count.fetch_add(1, Ordering::Relaxed);
    metrics.connected.fetch_add(1, Ordering::Relaxed);

    let join = ClientMsg::Join {
        name: format!("bot-{}", client_id),
    };
    let sent = match serde_json::to_string(&join) {
        Ok(json) => ws.send(Message::Text(json.into())).await.is_ok(),
        Err(_) => false,
    };
    if !sent {
        metrics.errors.fetch_add(1, Ordering::Relaxed);
        metrics.connected.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    let input_interval = Duration::from_secs_f64(1.0 / input_rate.max(0.1));
    let mut input_timer = tokio::time::interval(input_interval);
    input_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let test_end = Instant::now() + duration;
    let mut rng = ChaCha8Rng::seed_from_u64(client_id as u64 * 12345 + 67890);
    let started = Instant::now();

    loop {
        if Instant::now() >= test_end {
            break;
        }

        tokio::select! {
            _ = input_timer.tick() => {
                let msg = ClientMsg::Input(InputMsg {
                    up: rng.gen_bool(0.6),
                    left: rng.gen_bool(0.2),
                    right: rng.gen_bool(0.2),
                    space: rng.gen_bool(0.1),
                    time: started.elapsed().as_secs_f64() * 1000.0,
                });
                let Ok(json) = serde_json::to_string(&msg) else {
                    continue;
                };
                if ws.send(Message::Text(json.into())).await.is_ok() {
                    metrics.inputs_sent.fetch_add(1, Ordering::Relaxed);
                } else {
                    metrics.errors.fetch_add(1, Ordering::Relaxed);
                    break;
                }
            }

            msg = ws.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        metrics.messages_received.fetch_add(1, Ordering::Relaxed);
                        match serde_json::from_str::<ServerMsg>(&text) {
                            Ok(ServerMsg::Snapshot(_)) => {
                                metrics.snapshots_received.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::Fired(_)) => {
                                metrics.shots_seen.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::PlayerKilled(_)) => {
                                metrics.kills_seen.fetch_add(1, Ordering::Relaxed);
                            }
                            Ok(ServerMsg::IdleDisconnect) => break,
                            Ok(_) => {}
                            Err(e) => {
                                if client_id < 3 {
                                    eprintln!("Client {} got unparsable message: {}", client_id, e);
                                }
                                metrics.errors.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        if client_id < 3 {
                            eprintln!("Client {} error: {}", client_id, e);
                        }
                        metrics.errors.fetch_add(1, Ordering::Relaxed);
                        break;
                    }
                    Some(_) => {}
                }
            }
        }
    }

    let _ = ws.close(None).await;
    metrics.connected.fetch_sub(1, Ordering::Relaxed);
}

// === Main ===

#[tokio::main]
async fn main() {
    let args: Vec<String> = std::env::args().collect();

    let mut num_clients: u32 = 50;
    let mut duration_secs: u64 = 30;
    let mut input_rate: f64 = 30.0;
    let mut url = "ws://127.0.0.1:8080/ws".to_string();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--clients" => {
                i += 1;
                num_clients = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(50);
            }
            "--duration" => {
                i += 1;
                duration_secs = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30);
            }
            "--input-rate" => {
                i += 1;
                input_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or(30.0);
            }
            "--url" => {
                i += 1;
                url = args.get(i).cloned().unwrap_or(url);
            }
            _ => {}
        }
        i += 1;
    }

    println!("=== Arena Server Load Test ===");
    println!("Clients: {}", num_clients);
    println!("Duration: {}s", duration_secs);
    println!("Input rate: {}/s per client", input_rate);
    println!("URL: {}", url);
    println!();

    let metrics = Arc::new(Metrics::default());
    let duration = Duration::from_secs(duration_secs);

    let mut handles = Vec::with_capacity(num_clients as usize);
    let spawn_start = Instant::now();

    for client_id in 0..num_clients {
        let url = url.clone();
        let metrics = Arc::clone(&metrics);

        handles.push(tokio::spawn(async move {
            run_client(client_id, url, input_rate, duration, metrics).await;
        }));

        // Stagger spawns slightly to avoid thundering herd
        if client_id % 50 == 49 {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    }

    println!("All clients spawned in {:?}", spawn_start.elapsed());

    let metrics_clone = Arc::clone(&metrics);
    let stats_handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(5));
        let start = Instant::now();
        loop {
            interval.tick().await;
            println!(
                "[{:3}s] connected={}, msgs={}, snapshots={}, shots={}, kills={}, inputs={}, errors={}",
                start.elapsed().as_secs(),
                metrics_clone.connected.load(Ordering::Relaxed),
                metrics_clone.messages_received.load(Ordering::Relaxed),
                metrics_clone.snapshots_received.load(Ordering::Relaxed),
                metrics_clone.shots_seen.load(Ordering::Relaxed),
                metrics_clone.kills_seen.load(Ordering::Relaxed),
                metrics_clone.inputs_sent.load(Ordering::Relaxed),
                metrics_clone.errors.load(Ordering::Relaxed),
            );
        }
    });

    for handle in handles {
        let _ = handle.await;
    }
    stats_handle.abort();

    println!();
    println!("=== Final Results ===");
    let msgs = metrics.messages_received.load(Ordering::Relaxed);
    let snapshots = metrics.snapshots_received.load(Ordering::Relaxed);
    let latency_sum = metrics.latency_sum_ms.load(Ordering::Relaxed);
    let latency_count = metrics.latency_count.load(Ordering::Relaxed);

    println!("Total messages received: {}", msgs);
    println!("Total snapshots: {}", snapshots);
    println!("Total shots seen: {}", metrics.shots_seen.load(Ordering::Relaxed));
    println!("Total kills seen: {}", metrics.kills_seen.load(Ordering::Relaxed));
    println!("Total inputs sent: {}", metrics.inputs_sent.load(Ordering::Relaxed));
    println!("Total errors: {}", metrics.errors.load(Ordering::Relaxed));
    if latency_count > 0 {
        println!("Average connect latency: {}ms", latency_sum / latency_count);
    }

    // One snapshot every 6 ticks of 16.6ms
    let expected_per_client = duration_secs as f64 * 1000.0 / (6.0 * 16.6);
    let per_client = snapshots as f64 / num_clients.max(1) as f64;
    println!("Snapshots per client: {:.1}", per_client);
    println!("Expected snapshots per client: {:.1}", expected_per_client);
    println!(
        "Delivery rate: {:.1}%",
        per_client / expected_per_client * 100.0
    );
}
