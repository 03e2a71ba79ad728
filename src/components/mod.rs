//! ECS components.
//!
//! - `animatedtile` – a placed tile instance whose visible tile follows its clip
pub mod animatedtile;
