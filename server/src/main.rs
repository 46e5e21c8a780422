use arena_server::config::ServerConfig;
use arena_server::game_loop::{run_game_loop, GameCommand};
use arena_server::ws::{router, AppState};
use std::sync::Arc;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Invalid server configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let index_path = Arc::new(config.index_path.clone());

    let (game_tx, game_rx) = mpsc::channel::<GameCommand>(256);

    // Spawn game loop
    tokio::spawn(async move {
        run_game_loop(game_rx, config).await;
    });

    let app = router(AppState {
        game_tx,
        index_path,
    });

    tracing::info!("Starting arena server on {}", listen_addr);
    println!("Arena server listening on {}", listen_addr);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    axum::serve(listener, app).await
}
