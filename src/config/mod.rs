pub mod config;

pub use config::{BehaviorConfig, Config, DisplayConfig};
