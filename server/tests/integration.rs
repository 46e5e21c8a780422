//! Integration tests for the arena server.
//!
//! These tests start a real server instance and connect via WebSocket
//! to verify end-to-end behavior.

use arena_shared::protocol::{ClientMsg, InputMsg, ServerMsg, PROTOCOL_VERSION};
use futures_util::{SinkExt, StreamExt};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};

type Ws = tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<TcpStream>>;

/// Start a test server on a random available port and return its address.
async fn start_test_server() -> String {
    use arena_server::config::ServerConfig;
    use arena_server::game_loop::{run_game_loop, GameCommand};
    use arena_server::ws::{router, AppState};

    // Find an available port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener); // Release the port so the server can bind to it

    let config = ServerConfig {
        listen_addr: addr.to_string(),
        rng_seed: 12345,
        index_path: PathBuf::from("does-not-exist.html"),
        ..Default::default()
    };

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);
    let app_state = AppState {
        game_tx,
        index_path: Arc::new(config.index_path.clone()),
    };

    // Start game loop
    let game_config = config.clone();
    tokio::spawn(async move {
        run_game_loop(game_rx, game_config).await;
    });

    // Start HTTP/WebSocket server
    let app = router(app_state);
    tokio::spawn(async move {
        let listener = TcpListener::bind(&config.listen_addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    // Give server time to start
    tokio::time::sleep(Duration::from_millis(50)).await;

    addr.to_string()
}

async fn connect(addr: &str) -> Ws {
    let (ws, _) = connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect");
    ws
}

async fn send(ws: &mut Ws, msg: &ClientMsg) {
    let json = serde_json::to_string(msg).unwrap();
    ws.send(Message::Text(json.into())).await.unwrap();
}

/// Read the next text message and parse as ServerMsg.
async fn recv_msg(ws: &mut Ws) -> ServerMsg {
    loop {
        match ws.next().await {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(&text).expect("Failed to parse server message");
            }
            Some(Ok(_)) => continue, // Skip ping/pong
            Some(Err(e)) => panic!("WebSocket error: {}", e),
            None => panic!("WebSocket closed unexpectedly"),
        }
    }
}

/// Skip messages until one matches, giving up after `timeout`.
async fn recv_until<T>(
    ws: &mut Ws,
    timeout: Duration,
    mut pick: impl FnMut(ServerMsg) -> Option<T>,
) -> Option<T> {
    tokio::time::timeout(timeout, async {
        loop {
            if let Some(found) = pick(recv_msg(ws).await) {
                return found;
            }
        }
    })
    .await
    .ok()
}

/// Connect, read the welcome and join under `name`. Returns the own id.
async fn join(addr: &str, name: &str) -> (Ws, u32) {
    let mut ws = connect(addr).await;
    let ServerMsg::Welcome(welcome) = recv_msg(&mut ws).await else {
        panic!("Expected welcome as first message");
    };
    send(
        &mut ws,
        &ClientMsg::Join {
            name: name.to_string(),
        },
    )
    .await;
    (ws, welcome.self_id)
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_connect_and_receive_welcome() {
    let addr = start_test_server().await;
    let mut ws = connect(&addr).await;

    match recv_msg(&mut ws).await {
        ServerMsg::Welcome(welcome) => {
            assert_eq!(welcome.protocol_version, PROTOCOL_VERSION);
            assert!(welcome.self_id > 0);
            assert_eq!(welcome.config.world_width, 1200.0);
            assert_eq!(welcome.config.obstacles.len(), 4);
        }
        other => panic!("Expected Welcome, got {:?}", other),
    }
}

#[tokio::test]
async fn test_multiple_clients_get_unique_ids() {
    let addr = start_test_server().await;

    let mut ids = Vec::new();
    let mut sockets = Vec::new();
    for _ in 0..3 {
        let mut ws = connect(&addr).await;
        if let ServerMsg::Welcome(welcome) = recv_msg(&mut ws).await {
            ids.push(welcome.self_id);
        }
        sockets.push(ws);
    }

    assert_eq!(ids.len(), 3);
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3, "Connection ids must be unique");
}

#[tokio::test]
async fn test_join_announces_new_player() {
    let addr = start_test_server().await;
    let (mut ws, my_id) = join(&addr, "alice").await;

    let joined = recv_until(&mut ws, Duration::from_secs(2), |msg| match msg {
        ServerMsg::PlayerJoined(p) if p.id == my_id => Some(p),
        _ => None,
    })
    .await
    .expect("Should see own playerJoined");

    assert_eq!(joined.name, "alice");
    assert_eq!(joined.score, 0);
    assert!(joined.color.starts_with('#'));
    assert!((350.0..=850.0).contains(&joined.x));
    assert!((350.0..=850.0).contains(&joined.y));
    assert!(joined.vx.is_none(), "Own announcement carries no velocity");
}

#[tokio::test]
async fn test_late_joiner_receives_existing_players() {
    let addr = start_test_server().await;
    let (_first, first_id) = join(&addr, "first").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (mut second, _) = join(&addr, "second").await;
    let existing = recv_until(&mut second, Duration::from_secs(2), |msg| match msg {
        ServerMsg::PlayerJoined(p) if p.id == first_id => Some(p),
        _ => None,
    })
    .await
    .expect("Late joiner should be told about the first player");

    assert_eq!(existing.name, "first");
    assert!(existing.vx.is_some());
    assert!(existing.vy.is_some());
}

#[tokio::test]
async fn test_snapshot_excludes_recipient() {
    let addr = start_test_server().await;
    let (mut a, a_id) = join(&addr, "a").await;
    let (_b, b_id) = join(&addr, "b").await;

    // Snapshots arrive every few ticks; wait for one listing the other player
    let snapshot = recv_until(&mut a, Duration::from_secs(2), |msg| match msg {
        ServerMsg::Snapshot(s) if !s.players.is_empty() => Some(s),
        _ => None,
    })
    .await
    .expect("Should receive a snapshot");

    assert!(snapshot.players.iter().all(|p| p.id != a_id));
    assert!(snapshot.players.iter().any(|p| p.id == b_id));
}

#[tokio::test]
async fn test_ping_is_echoed() {
    let addr = start_test_server().await;
    let mut ws = connect(&addr).await;
    recv_msg(&mut ws).await; // welcome

    send(&mut ws, &ClientMsg::Ping { ping: 1234.5 }).await;
    let echo = recv_until(&mut ws, Duration::from_secs(2), |msg| match msg {
        ServerMsg::Pong(p) => Some(p.echo),
        _ => None,
    })
    .await
    .expect("Should receive pong");

    assert_eq!(echo, 1234.5);
}

#[tokio::test]
async fn test_input_is_acknowledged() {
    let addr = start_test_server().await;
    let (mut ws, _) = join(&addr, "pilot").await;

    send(
        &mut ws,
        &ClientMsg::Input(InputMsg {
            right: true,
            time: 77.0,
            ..Default::default()
        }),
    )
    .await;

    let ack = recv_until(&mut ws, Duration::from_secs(2), |msg| match msg {
        ServerMsg::PositionAck(ack) => Some(ack),
        _ => None,
    })
    .await
    .expect("Input should be acknowledged");

    assert_eq!(ack.time, 77.0);
}

#[tokio::test]
async fn test_undecodable_frame_is_ignored() {
    let addr = start_test_server().await;
    let mut ws = connect(&addr).await;
    recv_msg(&mut ws).await; // welcome

    ws.send(Message::Text("not json".into())).await.unwrap();
    ws.send(Message::Text(r#"{"type":"warp","x":1}"#.into()))
        .await
        .unwrap();

    // Connection stays usable
    send(&mut ws, &ClientMsg::Ping { ping: 9.0 }).await;
    let echo = recv_until(&mut ws, Duration::from_secs(2), |msg| match msg {
        ServerMsg::Pong(p) => Some(p.echo),
        _ => None,
    })
    .await;
    assert_eq!(echo, Some(9.0));
}

#[tokio::test]
async fn test_stop_thrust_without_coordinates_still_stops() {
    let addr = start_test_server().await;
    let (mut observer, _) = join(&addr, "observer").await;
    let (mut pilot, pilot_id) = join(&addr, "pilot").await;

    send(
        &mut pilot,
        &ClientMsg::Input(InputMsg {
            up: true,
            time: 1.0,
            ..Default::default()
        }),
    )
    .await;
    recv_until(&mut observer, Duration::from_secs(2), |msg| match msg {
        ServerMsg::Snapshot(s) if s.players.iter().any(|p| p.id == pilot_id && p.thrusting) => {
            Some(())
        }
        _ => None,
    })
    .await
    .expect("Observer should see the pilot thrusting");

    pilot
        .send(Message::Text(r#"{"type":"stopThrust"}"#.into()))
        .await
        .unwrap();
    recv_until(&mut observer, Duration::from_secs(2), |msg| match msg {
        ServerMsg::Snapshot(s) if s.players.iter().any(|p| p.id == pilot_id && !p.thrusting) => {
            Some(())
        }
        _ => None,
    })
    .await
    .expect("Bare stopThrust should still end the thrust");
}

#[tokio::test]
async fn test_player_disconnect_is_announced() {
    let addr = start_test_server().await;
    let (mut a, _) = join(&addr, "stays").await;
    let (b, b_id) = join(&addr, "leaves").await;

    // Make sure b is in the world before it goes away
    recv_until(&mut a, Duration::from_secs(2), |msg| match msg {
        ServerMsg::PlayerJoined(p) if p.id == b_id => Some(()),
        _ => None,
    })
    .await
    .expect("Should see second player join");

    drop(b);

    let left = recv_until(&mut a, Duration::from_secs(2), |msg| match msg {
        ServerMsg::PlayerLeft(p) => Some(p.id),
        _ => None,
    })
    .await;
    assert_eq!(left, Some(b_id));
}

#[tokio::test]
async fn test_missing_index_page_returns_404() {
    let addr = start_test_server().await;

    let mut stream = TcpStream::connect(&addr).await.unwrap();
    stream
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();

    let mut response = String::new();
    tokio::time::timeout(Duration::from_secs(2), stream.read_to_string(&mut response))
        .await
        .expect("Response timed out")
        .unwrap();

    assert!(response.starts_with("HTTP/1.1 404"), "got: {}", response);
    assert!(response.ends_with("404"));
}
