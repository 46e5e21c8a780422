use arena_shared::collision::{circle_hits_rect, point_in_circle};
use arena_shared::config::{WorldConfig, PLAYER_RADIUS};
use arena_shared::protocol::{
    ChatMsg, FiredMsg, InputMsg, KillType, PlayerJoinedMsg, PlayerKilledMsg, PlayerLeftMsg,
    PlayerRevivedMsg, PositionAckMsg, ServerMsg, SnapshotMsg, SnapshotPlayer, WelcomeMsg,
    NO_KILLER, PROTOCOL_VERSION,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeMap;

use crate::laser::Laser;
use crate::player::{Player, RotateDirection};

/// Who an outgoing message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    /// Every open connection, joined or not
    All,
    Only(u32),
    AllExcept(u32),
}

#[derive(Debug, Clone)]
pub struct Outgoing {
    pub to: Recipient,
    pub msg: ServerMsg,
}

/// Why a player died during a tick. Obstacle and bounds deaths share the
/// `suicide` wire type but are kept apart here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Obstacle,
    OutOfBounds,
    Laser { laser_index: usize, shooter_id: u32 },
    Collision { other_id: u32 },
}

impl DeathCause {
    pub fn kill_type(&self) -> KillType {
        match self {
            DeathCause::Obstacle | DeathCause::OutOfBounds => KillType::Suicide,
            DeathCause::Laser { .. } => KillType::Kill,
            DeathCause::Collision { .. } => KillType::DoubleSuicide,
        }
    }

    fn killer_id(&self) -> u32 {
        match self {
            DeathCause::Obstacle | DeathCause::OutOfBounds => NO_KILLER,
            DeathCause::Laser { shooter_id, .. } => *shooter_id,
            DeathCause::Collision { other_id } => *other_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Death {
    pub player_id: u32,
    pub cause: DeathCause,
}

/// Summary of one simulation step
#[derive(Debug, Clone, Default)]
pub struct TickReport {
    pub tick: u64,
    pub snapshot_sent: bool,
    pub deaths: Vec<Death>,
    pub revived: Vec<u32>,
}

/// Authoritative world owned by the game loop task.
pub struct World {
    pub config: WorldConfig,
    /// Keyed by connection id; ids are handed out in increasing order so
    /// iteration follows join order.
    pub players: BTreeMap<u32, Player>,
    pub lasers: Vec<Laser>,
    pub rng: ChaCha8Rng,
    tick_count: u64,
    next_laser_id: u32,
    outgoing: Vec<Outgoing>,
}

impl World {
    pub fn new(config: WorldConfig, rng_seed: u64) -> Self {
        Self {
            config,
            players: BTreeMap::new(),
            lasers: Vec::new(),
            rng: ChaCha8Rng::seed_from_u64(rng_seed),
            tick_count: 0,
            next_laser_id: 0,
            outgoing: Vec::new(),
        }
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Take every message queued since the last drain, in emission order.
    pub fn drain_outgoing(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outgoing)
    }

    fn send(&mut self, to: Recipient, msg: ServerMsg) {
        self.outgoing.push(Outgoing { to, msg });
    }

    pub fn welcome(&self, conn_id: u32) -> WelcomeMsg {
        WelcomeMsg {
            protocol_version: PROTOCOL_VERSION,
            self_id: conn_id,
            config: self.config.clone(),
        }
    }

    // === Input gateway ===

    /// Create the player for a connection and announce it.
    pub fn join(&mut self, conn_id: u32, name: String) {
        if self.players.contains_key(&conn_id) {
            tracing::warn!("Connection {} tried to join twice", conn_id);
            return;
        }

        let pos = Player::spawn_point(&mut self.rng);
        let player = Player::new(conn_id, name, pos);

        self.send(
            Recipient::All,
            ServerMsg::PlayerJoined(joined_msg(&player, false)),
        );
        let existing: Vec<PlayerJoinedMsg> =
            self.players.values().map(|p| joined_msg(p, true)).collect();
        for msg in existing {
            self.send(Recipient::Only(conn_id), ServerMsg::PlayerJoined(msg));
        }

        tracing::info!(
            "Player {} ({}) joined at ({}, {})",
            conn_id,
            player.name,
            pos.x,
            pos.y
        );
        self.players.insert(conn_id, player);
    }

    /// Drop the player of a closed connection. Lasers already in flight stay.
    pub fn leave(&mut self, conn_id: u32) {
        if self.players.remove(&conn_id).is_none() {
            tracing::debug!("Connection {} left without joining", conn_id);
            return;
        }
        self.send(
            Recipient::AllExcept(conn_id),
            ServerMsg::PlayerLeft(PlayerLeftMsg { id: conn_id }),
        );
        tracing::info!("Player {} left", conn_id);
    }

    /// Apply one input frame and acknowledge the resulting position.
    pub fn apply_input(&mut self, conn_id: u32, input: &InputMsg, now: u64) {
        let Some(player) = self.players.get_mut(&conn_id) else {
            tracing::warn!("Input from unknown player {}", conn_id);
            return;
        };
        player.mark_active();

        let mut fired = None;
        if player.alive && input.up {
            player.thrust();
            player.update_position();
        }
        // Dead players may still aim while they wait to respawn.
        if input.left {
            player.rotate(RotateDirection::Left);
        }
        if input.right {
            player.rotate(RotateDirection::Right);
        }
        if player.alive && input.space {
            fired = player.fire(now);
        }

        let ack = PositionAckMsg {
            time: input.time,
            x: player.pos.x,
            y: player.pos.y,
            rot: player.rotation,
        };
        let (px, py) = (player.pos.x, player.pos.y);

        if let Some(mut laser) = fired {
            laser.id = self.next_laser_id;
            self.next_laser_id = self.next_laser_id.wrapping_add(1);
            let msg = FiredMsg {
                time: now,
                player_id: conn_id,
                laser_id: laser.id,
                x: px,
                y: py,
                rot: laser.rotation,
                vx: laser.velocity.x,
                vy: laser.velocity.y,
            };
            self.lasers.push(laser);
            self.send(Recipient::All, ServerMsg::Fired(msg));
        }

        self.send(Recipient::Only(conn_id), ServerMsg::PositionAck(ack));
    }

    /// Client reported where it stopped. Coordinates are trusted as sent;
    /// a missing one leaves that axis where it was.
    pub fn stop_thrust(&mut self, conn_id: u32, x: Option<f64>, y: Option<f64>) {
        let Some(player) = self.players.get_mut(&conn_id) else {
            tracing::warn!("Stop thrust from unknown player {}", conn_id);
            return;
        };
        if player.alive {
            player.stop_thrust(x, y);
        }
    }

    pub fn chat(&mut self, conn_id: u32, msg: String) {
        let Some(player) = self.players.get_mut(&conn_id) else {
            tracing::warn!("Chat from unknown player {}", conn_id);
            return;
        };
        player.mark_active();
        let name = player.name.clone();
        self.send(Recipient::All, ServerMsg::Chat(ChatMsg { msg, name }));
    }

    // === Simulation ===

    /// Advance the world by one tick.
    pub fn tick(&mut self, now: u64) -> TickReport {
        self.tick_count += 1;
        let mut report = TickReport {
            tick: self.tick_count,
            ..Default::default()
        };

        if self.tick_count % self.config.snapshot_every_ticks as u64 == 0 {
            self.queue_snapshots();
            report.snapshot_sent = true;
        }

        self.advance_lasers();

        let ids: Vec<u32> = self.players.keys().copied().collect();
        for id in ids {
            let Some(player) = self.players.get_mut(&id) else {
                continue;
            };

            if !player.alive {
                if player.check_respawn(now, &mut self.rng) {
                    let msg = PlayerRevivedMsg {
                        id,
                        x: player.pos.x,
                        y: player.pos.y,
                    };
                    self.send(Recipient::All, ServerMsg::PlayerRevived(msg));
                    report.revived.push(id);
                }
                continue;
            }

            let causes = match self.find_death_cause(id) {
                Some(cause) => vec![cause],
                None => self.overlapping_players(id),
            };
            for cause in causes {
                self.apply_death(id, cause, now);
                report.deaths.push(Death {
                    player_id: id,
                    cause,
                });
            }
        }

        report
    }

    fn advance_lasers(&mut self) {
        for laser in self.lasers.iter_mut().filter(|l| l.alive) {
            laser.step();
        }
        self.lasers.retain(|l| l.alive);
    }

    /// First matching death cause in priority order: obstacle, bounds,
    /// enemy laser. Player overlap is checked separately since one player
    /// can take several others down with it.
    fn find_death_cause(&self, id: u32) -> Option<DeathCause> {
        let player = self.players.get(&id)?;
        let pos = player.pos;

        if self
            .config
            .obstacles
            .iter()
            .any(|o| circle_hits_rect(pos, PLAYER_RADIUS, o))
        {
            return Some(DeathCause::Obstacle);
        }

        if !self.config.in_bounds(pos.x, pos.y) {
            return Some(DeathCause::OutOfBounds);
        }

        if let Some((laser_index, laser)) = self.lasers.iter().enumerate().find(|(_, l)| {
            l.alive && l.owner_id != id && point_in_circle(pos, PLAYER_RADIUS, l.pos)
        }) {
            return Some(DeathCause::Laser {
                laser_index,
                shooter_id: laser.owner_id,
            });
        }

        None
    }

    /// Every other alive player overlapping `id`, in join order. Each one
    /// is a separate double suicide.
    fn overlapping_players(&self, id: u32) -> Vec<DeathCause> {
        let Some(player) = self.players.get(&id) else {
            return Vec::new();
        };
        // Only the defender's radius is used here, same as for lasers.
        self.players
            .values()
            .filter(|other| {
                other.id != id
                    && other.alive
                    && point_in_circle(player.pos, PLAYER_RADIUS, other.pos)
            })
            .map(|other| DeathCause::Collision { other_id: other.id })
            .collect()
    }

    fn apply_death(&mut self, id: u32, cause: DeathCause, now: u64) {
        if let Some(player) = self.players.get_mut(&id) {
            player.kill(now);
        }

        match cause {
            DeathCause::Obstacle | DeathCause::OutOfBounds => {}
            DeathCause::Laser {
                laser_index,
                shooter_id,
            } => {
                if let Some(laser) = self.lasers.get_mut(laser_index) {
                    laser.alive = false;
                }
                match self.players.get_mut(&shooter_id) {
                    Some(shooter) => shooter.add_score(1),
                    None => tracing::debug!("Shooter {} already left, no score", shooter_id),
                }
            }
            DeathCause::Collision { other_id } => {
                if let Some(other) = self.players.get_mut(&other_id) {
                    other.kill(now);
                }
            }
        }

        tracing::debug!("Player {} died: {:?}", id, cause);
        self.send(
            Recipient::All,
            ServerMsg::PlayerKilled(PlayerKilledMsg {
                kill_type: cause.kill_type(),
                killed_id: id,
                killer_id: cause.killer_id(),
            }),
        );
    }

    /// Queue one snapshot per player listing everyone but the recipient.
    fn queue_snapshots(&mut self) {
        let ids: Vec<u32> = self.players.keys().copied().collect();
        for recipient in ids {
            let snapshot = self.snapshot_for(recipient);
            self.send(Recipient::Only(recipient), ServerMsg::Snapshot(snapshot));
        }
    }

    pub fn snapshot_for(&self, recipient: u32) -> SnapshotMsg {
        SnapshotMsg {
            players: self
                .players
                .values()
                .filter(|p| p.id != recipient)
                .map(|p| SnapshotPlayer {
                    id: p.id,
                    x: p.pos.x,
                    y: p.pos.y,
                    rot: p.rotation,
                    thrusting: p.thrusting,
                })
                .collect(),
        }
    }

    // === Idle monitor ===

    /// Runs every idle-check interval. Players over the limit are told to
    /// disconnect and returned; everyone else accrues one interval of idle time.
    pub fn idle_sweep(&mut self) -> Vec<u32> {
        let limit = self.config.idle_limit_secs;
        let step = self.config.idle_check_secs;
        let mut expired = Vec::new();
        for player in self.players.values_mut() {
            if player.idle_secs > limit {
                expired.push(player.id);
            } else {
                player.idle_secs += step;
            }
        }
        for &id in &expired {
            tracing::info!("Player {} idle for too long", id);
            self.send(Recipient::Only(id), ServerMsg::IdleDisconnect);
        }
        expired
    }
}

fn joined_msg(player: &Player, with_velocity: bool) -> PlayerJoinedMsg {
    PlayerJoinedMsg {
        id: player.id,
        name: player.name.clone(),
        x: player.pos.x,
        y: player.pos.y,
        color: player.color.clone(),
        rot: player.rotation,
        score: player.score,
        vx: with_velocity.then_some(player.velocity.x),
        vy: with_velocity.then_some(player.velocity.y),
    }
}
