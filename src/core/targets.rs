use crate::config::variables::VARIABLE_NAMES;
use crate::domain::model::Mode;
use crate::utils::error::{Result, StackError};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Help,
    Up,
    Down,
    Build,
    Logs,
    Shell,
    Restart,
    Ps,
    Clean,
    CleanImages,
    CleanAll,
    Install,
    Test,
    Lint,
    DbReset,
    DbSeed,
    DbBackup,
    Health,
    DevUp,
    DevDown,
    DevBuild,
    DevLogs,
    ProdUp,
    ProdDown,
    ProdBuild,
    ProdLogs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetGroup {
    Stack,
    Cleanup,
    Backend,
    Database,
    Aliases,
}

impl TargetGroup {
    pub fn title(self) -> &'static str {
        match self {
            TargetGroup::Stack => "Stack",
            TargetGroup::Cleanup => "Cleanup",
            TargetGroup::Backend => "Backend",
            TargetGroup::Database => "Database",
            TargetGroup::Aliases => "Aliases",
        }
    }
}

impl Target {
    pub const ALL: [Target; 26] = [
        Target::Help,
        Target::Up,
        Target::Down,
        Target::Build,
        Target::Logs,
        Target::Shell,
        Target::Restart,
        Target::Ps,
        Target::Clean,
        Target::CleanImages,
        Target::CleanAll,
        Target::Install,
        Target::Test,
        Target::Lint,
        Target::DbReset,
        Target::DbSeed,
        Target::DbBackup,
        Target::Health,
        Target::DevUp,
        Target::DevDown,
        Target::DevBuild,
        Target::DevLogs,
        Target::ProdUp,
        Target::ProdDown,
        Target::ProdBuild,
        Target::ProdLogs,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Target::Help => "help",
            Target::Up => "up",
            Target::Down => "down",
            Target::Build => "build",
            Target::Logs => "logs",
            Target::Shell => "shell",
            Target::Restart => "restart",
            Target::Ps => "ps",
            Target::Clean => "clean",
            Target::CleanImages => "clean-images",
            Target::CleanAll => "clean-all",
            Target::Install => "install",
            Target::Test => "test",
            Target::Lint => "lint",
            Target::DbReset => "db-reset",
            Target::DbSeed => "db-seed",
            Target::DbBackup => "db-backup",
            Target::Health => "health",
            Target::DevUp => "dev-up",
            Target::DevDown => "dev-down",
            Target::DevBuild => "dev-build",
            Target::DevLogs => "dev-logs",
            Target::ProdUp => "prod-up",
            Target::ProdDown => "prod-down",
            Target::ProdBuild => "prod-build",
            Target::ProdLogs => "prod-logs",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Target::Help => "Show this help",
            Target::Up => "Start the stack in the background",
            Target::Down => "Stop and remove the containers",
            Target::Build => "Build the images",
            Target::Logs => "Follow the container logs",
            Target::Shell => "Open a shell in a service container",
            Target::Restart => "Restart the containers",
            Target::Ps => "List the containers",
            Target::Clean => "Remove containers, volumes and orphans",
            Target::CleanImages => "Prune dangling images",
            Target::CleanAll => "Tear down both stacks, their images and prune docker",
            Target::Install => "Install backend dependencies",
            Target::Test => "Run the backend test suite",
            Target::Lint => "Lint the backend",
            Target::DbReset => "Erase and re-initialise the database (asks first)",
            Target::DbSeed => "Load seed data into the database",
            Target::DbBackup => "Dump the database into the backup directory",
            Target::Health => "Check the service health endpoints",
            Target::DevUp => "up with MODE=dev",
            Target::DevDown => "down with MODE=dev",
            Target::DevBuild => "build with MODE=dev",
            Target::DevLogs => "logs with MODE=dev",
            Target::ProdUp => "up with MODE=prod",
            Target::ProdDown => "down with MODE=prod",
            Target::ProdBuild => "build with MODE=prod",
            Target::ProdLogs => "logs with MODE=prod",
        }
    }

    pub fn group(self) -> TargetGroup {
        match self {
            Target::Help
            | Target::Up
            | Target::Down
            | Target::Build
            | Target::Logs
            | Target::Shell
            | Target::Restart
            | Target::Ps
            | Target::Health => TargetGroup::Stack,
            Target::Clean | Target::CleanImages | Target::CleanAll => TargetGroup::Cleanup,
            Target::Install | Target::Test | Target::Lint => TargetGroup::Backend,
            Target::DbReset | Target::DbSeed | Target::DbBackup => TargetGroup::Database,
            _ => TargetGroup::Aliases,
        }
    }

    /// Aliases re-enter their base target with a fixed mode.
    pub fn alias_of(self) -> Option<(Target, Mode)> {
        match self {
            Target::DevUp => Some((Target::Up, Mode::Dev)),
            Target::DevDown => Some((Target::Down, Mode::Dev)),
            Target::DevBuild => Some((Target::Build, Mode::Dev)),
            Target::DevLogs => Some((Target::Logs, Mode::Dev)),
            Target::ProdUp => Some((Target::Up, Mode::Prod)),
            Target::ProdDown => Some((Target::Down, Mode::Prod)),
            Target::ProdBuild => Some((Target::Build, Mode::Prod)),
            Target::ProdLogs => Some((Target::Logs, Mode::Prod)),
            _ => None,
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        Target::ALL
            .iter()
            .copied()
            .find(|target| target.name() == s)
            .ok_or_else(|| StackError::UnknownTargetError {
                name: s.to_string(),
            })
    }
}

pub fn help_text() -> String {
    let width = Target::ALL
        .iter()
        .map(|target| target.name().len())
        .max()
        .unwrap_or(0);

    let mut out = String::from("Usage: stackctl [OPTIONS] [TARGET|NAME=VALUE]... [-- EXTRA...]\n");
    for group in [
        TargetGroup::Stack,
        TargetGroup::Cleanup,
        TargetGroup::Backend,
        TargetGroup::Database,
        TargetGroup::Aliases,
    ] {
        out.push_str(&format!("\n{}:\n", group.title()));
        for target in Target::ALL.iter().filter(|target| target.group() == group) {
            out.push_str(&format!(
                "  {:width$}  {}\n",
                target.name(),
                target.description(),
                width = width
            ));
        }
    }
    out.push_str(&format!(
        "\nVariables ({}):\n  MODE=dev|prod       compose file to use (default: dev)\n  SERVICE=<name>      limit up/build/logs/shell/restart to one service\n  ARGS=\"...\"          extra arguments for the wrapped command\n",
        VARIABLE_NAMES.join(", ")
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_names_round_trip_and_are_unique() {
        let names: HashSet<_> = Target::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), Target::ALL.len());
        for target in Target::ALL {
            assert_eq!(target.name().parse::<Target>().unwrap(), target);
        }
    }

    #[test]
    fn test_unknown_target() {
        let err = "deploy".parse::<Target>().unwrap_err();
        assert!(matches!(err, StackError::UnknownTargetError { name } if name == "deploy"));
    }

    #[test]
    fn test_aliases_point_at_base_targets() {
        for target in Target::ALL {
            match target.alias_of() {
                Some((base, _)) => {
                    assert_eq!(target.group(), TargetGroup::Aliases);
                    assert!(base.alias_of().is_none());
                }
                None => assert_ne!(target.group(), TargetGroup::Aliases),
            }
        }
        assert_eq!(Target::ProdLogs.alias_of(), Some((Target::Logs, Mode::Prod)));
    }

    #[test]
    fn test_help_lists_every_target() {
        let help = help_text();
        for target in Target::ALL {
            assert!(help.contains(target.name()), "{} missing from help", target);
        }
        assert!(help.contains("MODE=dev|prod"));
    }
}
