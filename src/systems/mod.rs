//! ECS systems.
//!
//! - `tileanimation` – resolve the visible tile of every `AnimatedTile`
//! - `time` – advance `WorldTime` from frame deltas
pub mod tileanimation;
pub mod time;
