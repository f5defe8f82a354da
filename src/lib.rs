pub mod config;
pub mod engine;
pub mod handlers;
pub mod player;
pub mod store;
pub mod table;

pub use config::Config;
pub use engine::Engine;
pub use player::{Notifier, Player, SongInfo};
pub use table::{PositionRecord, PositionTable};
