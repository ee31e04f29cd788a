pub mod config;
pub mod draw;
pub mod engine;
pub mod error;
pub mod frequency;
pub mod report;
pub mod result;
pub mod weighting;

pub use config::{GameConfig, PoolConfig};
pub use engine::{CancellationToken, SimulationEngine, SimulationPlan};
pub use error::{ConfigError, SimulationError};
pub use frequency::FrequencyTable;
pub use result::SimulationResult;
