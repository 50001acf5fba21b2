#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;
pub mod variables;

#[cfg(feature = "cli")]
pub use cli::CliConfig;
