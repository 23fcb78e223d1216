pub mod calculator;
pub mod config;
pub mod rolling;
pub mod shared_math;


pub use calculator::MetricsCalculator;
pub use config::EngineConfig;
pub use rolling::WindowPolicy;
