use super::toml_config::{StackConfig, DEFAULT_CONFIG_FILE};
use super::variables::{split_targets, Variables};
use crate::core::engine::EngineOptions;
use crate::core::targets::Target;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "stackctl")]
#[command(about = "Drive the docker compose stack in development or production mode")]
#[command(after_help = "Run `stackctl help` for the list of targets.")]
pub struct CliConfig {
    /// Targets to run in order, optionally mixed with MODE=.. SERVICE=.. ARGS=..
    #[arg(value_name = "TARGET")]
    pub targets: Vec<String>,

    /// Extra arguments appended to ARGS
    #[arg(last = true, value_name = "EXTRA")]
    pub extra: Vec<String>,

    /// Configuration file
    #[arg(short, long, env = "STACKCTL_CONFIG")]
    pub config: Option<String>,

    /// dev or prod
    #[arg(long, env = "MODE")]
    pub mode: Option<String>,

    /// Restrict the target to one compose service
    #[arg(short, long, env = "SERVICE")]
    pub service: Option<String>,

    /// Extra arguments for the wrapped command, split on whitespace
    #[arg(long, env = "ARGS", allow_hyphen_values = true)]
    pub args: Option<String>,

    /// Print the commands instead of running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// With --dry-run, print the plan as JSON
    #[arg(long, requires = "dry_run")]
    pub json: bool,

    /// Answer yes to confirmation prompts
    #[arg(short, long)]
    pub yes: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl CliConfig {
    pub fn config_path(&self) -> &str {
        self.config.as_deref().unwrap_or(DEFAULT_CONFIG_FILE)
    }

    pub fn load_stack_config(&self) -> Result<StackConfig> {
        StackConfig::load(self.config_path(), self.config.is_some())
    }

    /// 變數優先順序：設定檔 < 環境變數/旗標 < `NAME=value` < `--` 之後的參數
    pub fn resolve(&self, config: &StackConfig) -> Result<(Variables, Vec<Target>)> {
        let mut variables = Variables::from_config(config)?;
        if let Some(mode) = &self.mode {
            variables.set("MODE", mode)?;
        }
        if let Some(service) = &self.service {
            variables.set("SERVICE", service)?;
        }
        if let Some(args) = &self.args {
            variables.set("ARGS", args)?;
        }

        let targets = split_targets(&self.targets, &mut variables)?;
        variables.args.extend(self.extra.iter().cloned());

        Ok((variables, targets))
    }

    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            dry_run: self.dry_run,
            json: self.json,
            assume_yes: self.yes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Mode;

    fn parse(argv: &[&str]) -> CliConfig {
        CliConfig::try_parse_from(std::iter::once("stackctl").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_flags_then_assignments_then_extra() {
        let cli = parse(&[
            "--mode",
            "dev",
            "--args",
            "--no-cache",
            "build",
            "MODE=prod",
            "--",
            "--pull",
        ]);
        let (variables, targets) = cli.resolve(&StackConfig::default()).unwrap();
        assert_eq!(targets, vec![Target::Build]);
        assert_eq!(variables.mode, Mode::Prod);
        assert_eq!(variables.args, vec!["--no-cache", "--pull"]);
    }

    #[test]
    fn test_config_default_mode_is_overridden_by_flag() {
        let mut config = StackConfig::default();
        config.defaults.mode = "prod".to_string();

        let (variables, _) = parse(&["ps"]).resolve(&config).unwrap();
        assert_eq!(variables.mode, Mode::Prod);

        let (variables, _) = parse(&["--mode", "dev", "ps"]).resolve(&config).unwrap();
        assert_eq!(variables.mode, Mode::Dev);
    }

    #[test]
    fn test_blank_mode_falls_back_to_dev() {
        let mut config = StackConfig::default();
        config.defaults.mode = "prod".to_string();

        let (variables, targets) = parse(&["--mode", "", "up"]).resolve(&config).unwrap();
        assert_eq!(targets, vec![Target::Up]);
        assert_eq!(variables.mode, Mode::Dev);
    }

    #[test]
    fn test_environment_is_overridden_by_flag() {
        std::env::set_var("SERVICE", "gateway");
        let from_env = parse(&["logs"]);
        let from_flag = parse(&["--service", "backend", "logs"]);
        std::env::remove_var("SERVICE");

        let config = StackConfig::default();
        let (variables, _) = from_env.resolve(&config).unwrap();
        assert_eq!(variables.service.as_deref(), Some("gateway"));

        let (variables, _) = from_flag.resolve(&config).unwrap();
        assert_eq!(variables.service.as_deref(), Some("backend"));
    }

    #[test]
    fn test_json_requires_dry_run() {
        assert!(CliConfig::try_parse_from(["stackctl", "--json", "up"]).is_err());
        let cli = parse(&["-n", "--json", "up"]);
        assert!(cli.engine_options().json);
        assert!(cli.engine_options().dry_run);
    }

    #[test]
    fn test_config_path_default() {
        let cli = parse(&[]);
        if cli.config.is_none() {
            assert_eq!(cli.config_path(), DEFAULT_CONFIG_FILE);
        }
    }
}
