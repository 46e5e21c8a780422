//! Types and math shared between the arena server and its clients.

pub mod collision;
pub mod config;
pub mod protocol;
pub mod random;
pub mod vec2;
