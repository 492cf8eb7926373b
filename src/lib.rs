//! Place N queens on an N×N board so that no two attack each other.
//!
//! The library holds the game state, conflict detection and the best-times
//! leaderboard; `main.rs` puts an egui window on top.

pub mod board;
pub mod clock;
pub mod config;
pub mod cue;
pub mod error;
pub mod export;
pub mod game;
pub mod ranking;
pub mod record;
pub mod store;
pub mod worker;

pub use board::{BoardSize, CellData, Position};
pub use game::{GameCommand, GameController};
pub use ranking::BestTimes;
pub use record::GameRecord;
