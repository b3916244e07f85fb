// src/game/mod.rs
mod config;
mod handlers;
mod session;
mod types;

pub use config::*;
pub use session::*;
pub use types::*;
