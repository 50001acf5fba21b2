use crate::config::toml_config::StackConfig;
use crate::config::variables::Variables;
use crate::core::targets::{help_text, Target};
use crate::domain::model::{Invocation, Mode, Plan, Step};
use crate::utils::error::{Result, StackError};
use std::path::Path;

pub const BACKUP_TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Expands targets into plans. Pure: nothing is run here.
pub struct Planner<'a> {
    config: &'a StackConfig,
    variables: &'a Variables,
    timestamp: String,
}

impl<'a> Planner<'a> {
    pub fn new(config: &'a StackConfig, variables: &'a Variables) -> Self {
        Self {
            config,
            variables,
            timestamp: chrono::Local::now()
                .format(BACKUP_TIMESTAMP_FORMAT)
                .to_string(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = timestamp.into();
        self
    }

    pub fn plan(&self, target: Target) -> Result<Plan> {
        let mode = target
            .alias_of()
            .map(|(_, mode)| mode)
            .unwrap_or(self.variables.mode);
        let steps = self.steps(target, mode)?;
        tracing::debug!("Planned {} ({}) with {} step(s)", target, mode, steps.len());

        Ok(Plan {
            target: target.name().to_string(),
            mode,
            steps,
        })
    }

    fn steps(&self, target: Target, mode: Mode) -> Result<Vec<Step>> {
        let steps = match target {
            Target::Help => vec![Step::Print {
                message: help_text(),
            }],
            Target::Up => vec![Step::Run(
                self.compose(mode)
                    .args(["up", "-d"])
                    .args(self.service())
                    .args(self.extra_args()),
            )],
            Target::Down => vec![Step::Run(
                self.compose(mode).arg("down").args(self.extra_args()),
            )],
            Target::Build => vec![Step::Run(
                self.compose(mode)
                    .arg("build")
                    .args(self.service())
                    .args(self.extra_args()),
            )],
            Target::Logs => vec![Step::Run(
                self.compose(mode)
                    .args(["logs", "-f"])
                    .args(self.service())
                    .args(self.extra_args()),
            )],
            Target::Shell => {
                let service = self
                    .variables
                    .service
                    .as_deref()
                    .unwrap_or(&self.config.services.shell_default);
                vec![Step::Run(self.compose(mode).args([
                    "exec",
                    service,
                    self.config.services.shell_command.as_str(),
                ]))]
            }
            Target::Restart => vec![Step::Run(
                self.compose(mode)
                    .arg("restart")
                    .args(self.service())
                    .args(self.extra_args()),
            )],
            Target::Ps => vec![Step::Run(
                self.compose(mode).arg("ps").args(self.extra_args()),
            )],
            Target::Clean => vec![Step::Run(
                self.compose(mode)
                    .args(["down", "-v", "--remove-orphans"])
                    .allow_failure(),
            )],
            Target::CleanImages => vec![Step::Run(
                Invocation::new(&self.config.compose.program)
                    .args(["image", "prune", "-f"])
                    .allow_failure(),
            )],
            Target::CleanAll => {
                let mut steps: Vec<Step> = Mode::ALL
                    .iter()
                    .map(|&mode| {
                        Step::Run(
                            self.compose(mode)
                                .args(["down", "-v", "--rmi", "local", "--remove-orphans"])
                                .allow_failure(),
                        )
                    })
                    .collect();
                steps.push(Step::Run(
                    Invocation::new(&self.config.compose.program)
                        .args(["system", "prune", "-f"])
                        .allow_failure(),
                ));
                steps
            }
            Target::Install => vec![Step::Run(self.npm(["install"]))],
            Target::Test => vec![Step::Run(self.npm(["run", "test"]))],
            Target::Lint => vec![Step::Run(self.npm(["run", "lint"]))],
            Target::DbReset => vec![
                Step::Confirm {
                    prompt: format!(
                        "This will erase all data in the {} database. Continue?",
                        mode
                    ),
                },
                Step::Run(self.backend_exec(mode, "db:reset")),
            ],
            Target::DbSeed => vec![Step::Run(self.backend_exec(mode, "db:seed"))],
            Target::DbBackup => self.backup_steps(mode),
            Target::Health => {
                if self.config.health.endpoints.is_empty() {
                    return Err(StackError::MissingConfigError {
                        field: "health.endpoints".to_string(),
                    });
                }
                vec![Step::CheckHealth {
                    endpoints: self.config.health.endpoints.clone(),
                }]
            }
            Target::DevUp
            | Target::DevDown
            | Target::DevBuild
            | Target::DevLogs
            | Target::ProdUp
            | Target::ProdDown
            | Target::ProdBuild
            | Target::ProdLogs => match target.alias_of() {
                Some((base, mode)) => self.steps(base, mode)?,
                None => Vec::new(),
            },
        };
        Ok(steps)
    }

    /// `docker compose -f <file> [-p <project>]`
    fn compose(&self, mode: Mode) -> Invocation {
        let invocation = Invocation::new(&self.config.compose.program).args([
            "compose",
            "-f",
            self.config.compose_file(mode),
        ]);
        match &self.config.project.name {
            Some(project) => invocation.args(["-p", project.as_str()]),
            None => invocation,
        }
    }

    fn npm<const N: usize>(&self, command: [&str; N]) -> Invocation {
        Invocation::new(&self.config.backend.npm)
            .args(command)
            .args(self.extra_args())
            .current_dir(&self.config.backend.directory)
    }

    fn backend_exec(&self, mode: Mode, script: &str) -> Invocation {
        self.compose(mode).args([
            "exec",
            "-T",
            self.config.services.backend.as_str(),
            self.config.backend.npm.as_str(),
            "run",
            script,
        ])
    }

    fn backup_steps(&self, mode: Mode) -> Vec<Step> {
        let backup_dir = Path::new(&self.config.database.backup_dir);
        let database = self.config.database.name.as_deref();
        let file_name = format!(
            "{}-{}-{}.archive.gz",
            database.unwrap_or("all"),
            mode,
            self.timestamp
        );

        let mut dump = self
            .compose(mode)
            .args([
                "exec",
                "-T",
                self.config.services.database.as_str(),
                "mongodump",
                "--archive",
                "--gzip",
            ]);
        if let Some(database) = database {
            dump = dump.args(["--db", database]);
        }

        vec![
            Step::EnsureDir {
                path: backup_dir.to_path_buf(),
            },
            Step::Run(dump.stdout_to(backup_dir.join(file_name))),
        ]
    }

    fn service(&self) -> Option<String> {
        self.variables.service.clone()
    }

    fn extra_args(&self) -> Vec<String> {
        self.variables.args.clone()
    }
}
