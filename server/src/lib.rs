//! Arena shooter server library.
//!
//! This module exposes the server components for use in tests and binaries.

pub mod broadcast;
pub mod config;
pub mod game_loop;
pub mod laser;
pub mod page;
pub mod player;
pub mod state;
pub mod ws;
