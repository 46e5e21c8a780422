use arena_shared::protocol::{ClientMsg, WelcomeMsg};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use crate::broadcast::{ClientOutbox, Connections};
use crate::config::ServerConfig;
use crate::state::World;

/// Commands from client connections to the game loop
pub enum GameCommand {
    Connect {
        outbox: ClientOutbox,
        response: oneshot::Sender<WelcomeMsg>,
    },
    Disconnect {
        id: u32,
    },
    Client {
        id: u32,
        msg: ClientMsg,
    },
}

/// Wall clock in milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Run the main game loop. Owns the world and the connection table; the
/// tick, the idle sweep and client commands are handled one at a time.
pub async fn run_game_loop(mut cmd_rx: mpsc::Receiver<GameCommand>, server_config: ServerConfig) {
    let mut world = World::new(server_config.world.clone(), server_config.rng_seed);
    let mut connections = Connections::new();

    let tick_duration = Duration::from_secs_f64(server_config.tick_interval_ms / 1000.0);
    let mut tick_interval = tokio::time::interval(tick_duration);
    tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let idle_period = Duration::from_secs(server_config.world.idle_check_secs);
    let mut idle_interval = tokio::time::interval_at(Instant::now() + idle_period, idle_period);

    loop {
        tokio::select! {
            _ = tick_interval.tick() => {
                let report = world.tick(now_ms());
                for death in &report.deaths {
                    tracing::debug!(
                        "Tick {}: player {} died ({:?})",
                        report.tick,
                        death.player_id,
                        death.cause
                    );
                }
            }

            _ = idle_interval.tick() => {
                let expired = world.idle_sweep();
                if !expired.is_empty() {
                    tracing::info!("Idle sweep disconnecting {:?}", expired);
                }
            }

            Some(cmd) = cmd_rx.recv() => {
                match cmd {
                    GameCommand::Connect { outbox, response } => {
                        let id = connections.register(outbox);
                        if response.send(world.welcome(id)).is_err() {
                            connections.remove(id);
                            continue;
                        }
                        tracing::info!("Connection {} opened ({} open)", id, connections.len());
                    }
                    GameCommand::Disconnect { id } => {
                        world.leave(id);
                        connections.remove(id);
                        tracing::info!("Connection {} closed", id);
                    }
                    GameCommand::Client { id, msg } => {
                        handle_client_msg(&mut world, id, msg, now_ms());
                    }
                }
            }

            else => break,
        }

        connections.deliver_all(world.drain_outgoing());
    }

    tracing::info!("Game loop ended");
}

/// Route one decoded client command to the world.
pub fn handle_client_msg(world: &mut World, id: u32, msg: ClientMsg, now: u64) {
    match msg {
        ClientMsg::Join { name } => world.join(id, name),
        ClientMsg::Input(input) => world.apply_input(id, &input, now),
        ClientMsg::StopThrust { x, y } => world.stop_thrust(id, x, y),
        ClientMsg::Chat { msg } => world.chat(id, msg),
        // Answered by the connection task directly
        ClientMsg::Ping { .. } => {}
    }
}
