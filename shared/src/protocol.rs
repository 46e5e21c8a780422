use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::config::WorldConfig;

/// Protocol version - increment when making breaking changes.
pub const PROTOCOL_VERSION: u32 = 1;

/// Killer id reported when a death has no killer.
pub const NO_KILLER: u32 = 0;

// === Server -> Client ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ServerMsg {
    Welcome(WelcomeMsg),
    PlayerJoined(PlayerJoinedMsg),
    PositionAck(PositionAckMsg),
    Fired(FiredMsg),
    PlayerKilled(PlayerKilledMsg),
    PlayerRevived(PlayerRevivedMsg),
    PlayerLeft(PlayerLeftMsg),
    Chat(ChatMsg),
    Snapshot(SnapshotMsg),
    Pong(PongMsg),
    IdleDisconnect,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(rename_all = "camelCase")]
pub struct WelcomeMsg {
    pub protocol_version: u32,
    pub self_id: u32,
    pub config: WorldConfig,
}

/// Announces a player. `vx`/`vy` are only present when a newly joined client
/// is told about players that were already in the arena.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerJoinedMsg {
    pub id: u32,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
    pub rot: f64,
    pub score: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vx: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vy: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct PositionAckMsg {
    /// Client timestamp echoed from the input command
    pub time: f64,
    pub x: f64,
    pub y: f64,
    pub rot: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(rename_all = "camelCase")]
pub struct FiredMsg {
    /// Server time of the shot (ms since epoch)
    pub time: u64,
    pub player_id: u32,
    pub laser_id: u32,
    pub x: f64,
    pub y: f64,
    pub rot: f64,
    pub vx: f64,
    pub vy: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub enum KillType {
    #[serde(rename = "suicide")]
    Suicide,
    #[serde(rename = "kill")]
    Kill,
    #[serde(rename = "double-suicide")]
    DoubleSuicide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(rename_all = "camelCase")]
pub struct PlayerKilledMsg {
    pub kill_type: KillType,
    pub killed_id: u32,
    /// [`NO_KILLER`] when nobody is to blame
    pub killer_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct PlayerRevivedMsg {
    pub id: u32,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct PlayerLeftMsg {
    pub id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct ChatMsg {
    pub msg: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct SnapshotMsg {
    pub players: Vec<SnapshotPlayer>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct SnapshotPlayer {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub rot: f64,
    pub thrusting: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct PongMsg {
    pub echo: f64,
}

// === Client -> Server ===

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMsg {
    Join {
        #[serde(default)]
        name: String,
    },
    Input(InputMsg),
    /// Missing coordinates decode as `None` and leave that axis unchanged.
    StopThrust {
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
    },
    Chat {
        #[serde(default)]
        msg: String,
    },
    Ping {
        #[serde(default)]
        ping: f64,
    },
}

/// One frame of client input. Missing keys count as released.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../client/generated/")]
pub struct InputMsg {
    #[serde(default)]
    pub up: bool,
    #[serde(default)]
    pub left: bool,
    #[serde(default)]
    pub right: bool,
    #[serde(default)]
    pub space: bool,
    /// Client timestamp, echoed back in the position ack
    #[serde(default)]
    pub time: f64,
}
