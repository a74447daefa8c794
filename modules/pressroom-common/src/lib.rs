pub mod config;
pub mod error;
pub mod types;

pub use config::{Config, PipelineConfig};
pub use error::{PressroomError, Result};
pub use types::*;
