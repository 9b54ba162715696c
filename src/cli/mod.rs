pub mod commands;
pub mod duration;

pub use commands::{Cli, Commands};
pub use duration::parse_interval;
