//! Headless frame driver for the Pixel Vengeance engine: a fixed-rate tokio
//! loop that feeds intents in, advances the session and broadcasts snapshots.

pub mod autopilot;
pub mod driver;
pub mod settings;
