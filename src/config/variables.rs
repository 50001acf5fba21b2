use crate::config::toml_config::StackConfig;
use crate::core::targets::Target;
use crate::domain::model::Mode;
use crate::utils::error::{Result, StackError};
use crate::utils::validation::{self, Validate};

/// The `MODE` / `SERVICE` / `ARGS` triple every target is parameterised by.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Variables {
    pub mode: Mode,
    pub service: Option<String>,
    pub args: Vec<String>,
}

pub const VARIABLE_NAMES: [&str; 3] = ["MODE", "SERVICE", "ARGS"];

impl Variables {
    /// 以設定檔的 `[defaults]` 作為起點
    pub fn from_config(config: &StackConfig) -> Result<Self> {
        let mut variables = Self::default();
        variables.set("MODE", &config.defaults.mode)?;
        if let Some(service) = &config.defaults.service {
            variables.set("SERVICE", service)?;
        }
        Ok(variables)
    }

    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            // 空白的 MODE 與未設定相同，回到預設的 dev
            "MODE" if value.trim().is_empty() => self.mode = Mode::default(),
            "MODE" => self.mode = value.parse()?,
            "SERVICE" => {
                let value = value.trim();
                self.service = (!value.is_empty()).then(|| value.to_string());
            }
            "ARGS" => self.args = split_args(value),
            other => {
                return Err(StackError::InvalidConfigValueError {
                    field: other.to_string(),
                    value: value.to_string(),
                    reason: format!(
                        "Unknown variable. Known variables: {}",
                        VARIABLE_NAMES.join(", ")
                    ),
                })
            }
        }
        Ok(())
    }

    pub fn with_mode(&self, mode: Mode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

impl Validate for Variables {
    fn validate(&self) -> Result<()> {
        if let Some(service) = &self.service {
            validation::validate_service_name("SERVICE", service)?;
        }
        Ok(())
    }
}

/// `ARGS` is word-split like an unquoted make variable.
pub fn split_args(value: &str) -> Vec<String> {
    value.split_whitespace().map(String::from).collect()
}

/// `MODE=prod` style tokens: an upper-case identifier, `=`, then any value.
pub fn parse_assignment(token: &str) -> Option<(&str, &str)> {
    let (name, value) = token.split_once('=')?;
    let is_variable = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
        && name.starts_with(|c: char| c.is_ascii_uppercase());
    is_variable.then_some((name, value))
}

/// Splits positional words into targets and make-style variable assignments,
/// applying the assignments to `variables`. No targets means `help`.
pub fn split_targets(words: &[String], variables: &mut Variables) -> Result<Vec<Target>> {
    let mut targets = Vec::new();
    for word in words {
        match parse_assignment(word) {
            Some((name, value)) => variables.set(name, value)?,
            None => targets.push(word.parse::<Target>()?),
        }
    }
    if targets.is_empty() {
        targets.push(Target::Help);
    }
    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_defaults_from_config() {
        let mut config = StackConfig::default();
        config.defaults.mode = "prod".to_string();
        config.defaults.service = Some("gateway".to_string());
        let variables = Variables::from_config(&config).unwrap();
        assert_eq!(variables.mode, Mode::Prod);
        assert_eq!(variables.service.as_deref(), Some("gateway"));
        assert!(variables.args.is_empty());
    }

    #[test]
    fn test_set_variables() {
        let mut variables = Variables::default();
        variables.set("ARGS", "  --no-cache   --pull ").unwrap();
        assert_eq!(variables.args, vec!["--no-cache", "--pull"]);

        variables.set("SERVICE", "backend").unwrap();
        variables.set("SERVICE", "").unwrap();
        assert_eq!(variables.service, None);

        assert!(variables.set("MODE", "test").is_err());

        variables.set("MODE", "prod").unwrap();
        variables.set("MODE", "").unwrap();
        assert_eq!(variables.mode, Mode::Dev);
        variables.set("MODE", "  ").unwrap();
        assert_eq!(variables.mode, Mode::Dev);
        assert!(variables.set("TAG", "latest").is_err());
    }

    #[test]
    fn test_parse_assignment() {
        assert_eq!(parse_assignment("MODE=prod"), Some(("MODE", "prod")));
        assert_eq!(parse_assignment("ARGS=--tail=20"), Some(("ARGS", "--tail=20")));
        assert_eq!(parse_assignment("SERVICE="), Some(("SERVICE", "")));
        assert_eq!(parse_assignment("up"), None);
        assert_eq!(parse_assignment("mode=prod"), None);
        assert_eq!(parse_assignment("=prod"), None);
    }

    #[test]
    fn test_split_targets() {
        let mut variables = Variables::default();
        let targets = split_targets(
            &words(&["build", "MODE=prod", "up", "SERVICE=gateway"]),
            &mut variables,
        )
        .unwrap();
        assert_eq!(targets, vec![Target::Build, Target::Up]);
        assert_eq!(variables.mode, Mode::Prod);
        assert_eq!(variables.service.as_deref(), Some("gateway"));

        let mut variables = Variables::default().with_mode(Mode::Prod);
        let targets = split_targets(&words(&["MODE=", "up"]), &mut variables).unwrap();
        assert_eq!(targets, vec![Target::Up]);
        assert_eq!(variables.mode, Mode::Dev);

        let targets = split_targets(&[], &mut Variables::default()).unwrap();
        assert_eq!(targets, vec![Target::Help]);

        let err = split_targets(&words(&["deploy"]), &mut Variables::default()).unwrap_err();
        assert!(matches!(err, StackError::UnknownTargetError { .. }));
    }
}
