//! Randomized draw engine: list generators and the ladder game. Keep this
//! crate free of IO and platform concerns.

pub mod board;
pub mod config;
pub mod draw;
pub mod events;
pub mod fortune;
pub mod ladder;
pub mod outcomes;
pub mod permute;
pub mod rng;

pub use board::*;
pub use config::*;
pub use draw::*;
pub use events::*;
pub use fortune::*;
pub use ladder::*;
pub use outcomes::*;
pub use permute::*;
pub use rng::*;
