use crate::utils::error::{Result, StackError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Selects which compose file drives the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Dev,
    Prod,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::Dev, Mode::Prod];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Prod => "prod",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "dev" => Ok(Mode::Dev),
            "prod" => Ok(Mode::Prod),
            other => Err(StackError::InvalidConfigValueError {
                field: "MODE".to_string(),
                value: other.to_string(),
                reason: "Mode must be either 'dev' or 'prod'".to_string(),
            }),
        }
    }
}

/// A single external command, described but not yet run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stdout_file: Option<PathBuf>,
    /// Failure is logged and the plan continues (`|| true`).
    pub allow_failure: bool,
}

impl Invocation {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            stdout_file: None,
            allow_failure: false,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout_file = Some(path.into());
        self
    }

    pub fn allow_failure(mut self) -> Self {
        self.allow_failure = true;
        self
    }

    /// Program and arguments, quoted the way a POSIX shell would need them.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.working_dir {
            write!(f, "cd {} && ", shell_quote(&dir.to_string_lossy()))?;
        }
        f.write_str(&self.command_line())?;
        if let Some(file) = &self.stdout_file {
            write!(f, " > {}", shell_quote(&file.to_string_lossy()))?;
        }
        if self.allow_failure {
            f.write_str(" || true")?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> Cow<'_, str> {
    let needs_quotes = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || "'\"$`\\;&|<>*?()[]{}#~!".contains(c));
    if needs_quotes {
        Cow::Owned(format!("'{}'", arg.replace('\'', r"'\''")))
    } else {
        Cow::Borrowed(arg)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthEndpoint {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub name: String,
    pub url: String,
    pub healthy: bool,
    pub status: Option<u16>,
    pub detail: String,
    pub elapsed_ms: u128,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    pub code: Option<i32>,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn failure(code: Option<i32>) -> Self {
        Self {
            success: false,
            code,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum Step {
    Run(Invocation),
    Confirm { prompt: String },
    EnsureDir { path: PathBuf },
    CheckHealth { endpoints: Vec<HealthEndpoint> },
    Print { message: String },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Run(invocation) => write!(f, "{}", invocation),
            Step::Confirm { prompt } => write!(f, "# confirm: {} [y/N]", prompt),
            Step::EnsureDir { path } => {
                write!(f, "mkdir -p {}", shell_quote(&path.to_string_lossy()))
            }
            Step::CheckHealth { endpoints } => {
                let lines = endpoints
                    .iter()
                    .map(|endpoint| format!("# health: GET {} ({})", endpoint.url, endpoint.name))
                    .collect::<Vec<_>>();
                f.write_str(&lines.join("\n"))
            }
            Step::Print { message } => f.write_str(message),
        }
    }
}

/// What a target expands to for a given mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Plan {
    pub target: String,
    pub mode: Mode,
    pub steps: Vec<Step>,
}

impl Plan {
    pub fn invocations(&self) -> impl Iterator<Item = &Invocation> {
        self.steps.iter().filter_map(|step| match step {
            Step::Run(invocation) => Some(invocation),
            _ => None,
        })
    }

    /// 單行 JSON，多個 target 時每行一個計畫 (JSON Lines)
    pub fn to_json_line(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// 以類似 `make -n` 的方式輸出每個步驟
    pub fn render_script(&self) -> String {
        self.steps
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_parsing() {
        assert_eq!("dev".parse::<Mode>().unwrap(), Mode::Dev);
        assert_eq!(" prod ".parse::<Mode>().unwrap(), Mode::Prod);
        assert!("staging".parse::<Mode>().is_err());
        assert!("PROD".parse::<Mode>().is_err());
        assert_eq!(Mode::default(), Mode::Dev);
    }

    #[test]
    fn test_invocation_display() {
        let invocation = Invocation::new("docker")
            .args(["compose", "down", "-v"])
            .allow_failure();
        assert_eq!(invocation.to_string(), "docker compose down -v || true");

        let invocation = Invocation::new("npm")
            .args(["run", "test", "--", "--grep", "user api"])
            .current_dir("backend");
        assert_eq!(
            invocation.to_string(),
            "cd backend && npm run test -- --grep 'user api'"
        );

        let invocation = Invocation::new("docker")
            .args(["compose", "exec", "-T", "mongodb", "mongodump", "--archive"])
            .stdout_to("backups/all-dev.archive.gz");
        assert_eq!(
            invocation.to_string(),
            "docker compose exec -T mongodb mongodump --archive > backups/all-dev.archive.gz"
        );
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("plain"), "plain");
        assert_eq!(shell_quote(""), "''");
        assert_eq!(shell_quote("it's"), r"'it'\''s'");
    }

    #[test]
    fn test_render_script() {
        let plan = Plan {
            target: "db-reset".to_string(),
            mode: Mode::Dev,
            steps: vec![
                Step::Confirm {
                    prompt: "Erase the dev database?".to_string(),
                },
                Step::Run(Invocation::new("npm").args(["run", "db:reset"])),
            ],
        };
        assert_eq!(
            plan.render_script(),
            "# confirm: Erase the dev database? [y/N]\nnpm run db:reset"
        );
        assert_eq!(plan.invocations().count(), 1);
    }

    #[test]
    fn test_json_line_is_single_line() {
        let plan = Plan {
            target: "db-backup".to_string(),
            mode: Mode::Prod,
            steps: vec![
                Step::EnsureDir {
                    path: PathBuf::from("backups"),
                },
                Step::Print {
                    message: "line one\nline two".to_string(),
                },
            ],
        };
        let line = plan.to_json_line().unwrap();
        assert!(!line.contains('\n'));

        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(parsed["target"], "db-backup");
        assert_eq!(parsed["mode"], "prod");
        assert_eq!(parsed["steps"][1]["message"], "line one\nline two");
    }

    #[test]
    fn test_step_serializes_with_tag() {
        let step = Step::EnsureDir {
            path: PathBuf::from("backups"),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["step"], "ensure_dir");
        assert_eq!(json["path"], "backups");
    }
}
