use crate::domain::model::{HealthEndpoint, HealthReport, Invocation, Plan, Step};
use crate::domain::ports::{CommandRunner, Confirmation, HealthProbe};
use crate::utils::error::{Result, StackError};

#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    pub dry_run: bool,
    pub json: bool,
    pub assume_yes: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub commands: usize,
    pub suppressed_failures: usize,
    pub health: Vec<HealthReport>,
}

/// Runs plans step by step; the first unsuppressed failure stops the plan.
pub struct StackEngine<R: CommandRunner, C: Confirmation, H: HealthProbe> {
    runner: R,
    confirmation: C,
    probe: H,
    options: EngineOptions,
}

impl<R: CommandRunner, C: Confirmation, H: HealthProbe> StackEngine<R, C, H> {
    pub fn new(runner: R, confirmation: C, probe: H) -> Self {
        Self {
            runner,
            confirmation,
            probe,
            options: EngineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub async fn run(&self, plan: &Plan) -> Result<RunSummary> {
        if self.options.dry_run {
            self.describe(plan)?;
            return Ok(RunSummary::default());
        }

        tracing::debug!("▶ {} (MODE={})", plan.target, plan.mode);

        let mut summary = RunSummary::default();
        for step in &plan.steps {
            match step {
                Step::Print { message } => println!("{}", message),
                Step::Confirm { prompt } => {
                    if self.options.assume_yes {
                        tracing::info!("Confirmation skipped (--yes): {}", prompt);
                    } else if !self.confirmation.confirm(prompt).await? {
                        return Err(StackError::AbortedError {
                            target: plan.target.clone(),
                        });
                    }
                }
                Step::EnsureDir { path } => {
                    tracing::debug!("Creating directory {}", path.display());
                    tokio::fs::create_dir_all(path).await?;
                }
                Step::Run(invocation) => self.execute(invocation, &mut summary).await?,
                Step::CheckHealth { endpoints } => {
                    summary.health = self.check_health(endpoints).await?;
                }
            }
        }

        if summary.suppressed_failures > 0 {
            tracing::warn!(
                "⚠️ {} finished with {} ignored failure(s)",
                plan.target,
                summary.suppressed_failures
            );
        }
        Ok(summary)
    }

    fn describe(&self, plan: &Plan) -> Result<()> {
        if self.options.json {
            println!("{}", plan.to_json_line()?);
        } else {
            println!("{}", plan.render_script());
        }
        Ok(())
    }

    async fn execute(&self, invocation: &Invocation, summary: &mut RunSummary) -> Result<()> {
        tracing::info!("$ {}", invocation);
        summary.commands += 1;

        let failure = match self.runner.run(invocation).await {
            Ok(outcome) if outcome.success => return Ok(()),
            Ok(outcome) => StackError::CommandFailedError {
                command: invocation.command_line(),
                code: outcome.code,
            },
            Err(e @ StackError::ToolNotFoundError { .. }) => e,
            Err(e) => return Err(e),
        };

        if invocation.allow_failure {
            tracing::warn!("Ignoring failure: {}", failure);
            summary.suppressed_failures += 1;
            Ok(())
        } else {
            Err(failure)
        }
    }

    async fn check_health(&self, endpoints: &[HealthEndpoint]) -> Result<Vec<HealthReport>> {
        let mut reports = Vec::with_capacity(endpoints.len());
        for endpoint in endpoints {
            let report = self.probe.check(endpoint).await;
            if report.healthy {
                println!(
                    "✅ {:<12} {} ({}ms)",
                    report.name, report.detail, report.elapsed_ms
                );
            } else {
                println!("❌ {:<12} {} [{}]", report.name, report.detail, report.url);
            }
            reports.push(report);
        }

        let failed: Vec<String> = reports
            .iter()
            .filter(|report| !report.healthy)
            .map(|report| report.name.clone())
            .collect();
        if failed.is_empty() {
            Ok(reports)
        } else {
            Err(StackError::UnhealthyError { failed })
        }
    }
}
