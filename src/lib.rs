pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{http::HttpHealthProbe, process::ProcessRunner, prompt::StdinConfirmation};
pub use crate::config::{toml_config::StackConfig, variables::Variables};
pub use crate::core::{
    engine::{EngineOptions, RunSummary, StackEngine},
    planner::Planner,
    targets::Target,
};
pub use crate::domain::model::{Invocation, Mode, Plan, Step};
pub use crate::utils::error::{Result, StackError};
