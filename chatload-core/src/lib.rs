mod config;
mod constants;
mod metrics;
mod recorder;
mod stats;

pub use config::*;
pub use constants::*;
pub use metrics::*;
pub use recorder::*;
pub use stats::*;
