pub mod club;
pub mod common;
pub mod event;
pub mod player;
pub mod race;
pub mod results;
