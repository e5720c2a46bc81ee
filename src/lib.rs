pub mod error;
pub mod game;
pub mod input;
pub mod store;
