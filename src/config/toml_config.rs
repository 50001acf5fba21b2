use crate::domain::model::{HealthEndpoint, Mode};
use crate::utils::error::{Result, StackError};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "stackctl.toml";

/// Settings read from `stackctl.toml`. Every section is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StackConfig {
    pub project: ProjectConfig,
    pub compose: ComposeConfig,
    pub services: ServicesConfig,
    pub backend: BackendConfig,
    pub database: DatabaseConfig,
    pub health: HealthConfig,
    pub defaults: DefaultsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProjectConfig {
    /// Passed to compose as `-p`
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposeConfig {
    pub program: String,
    pub dev_file: String,
    pub prod_file: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            program: "docker".to_string(),
            dev_file: "docker-compose.dev.yml".to_string(),
            prod_file: "docker-compose.prod.yml".to_string(),
        }
    }
}

impl ComposeConfig {
    pub fn file(&self, mode: Mode) -> &str {
        match mode {
            Mode::Dev => &self.dev_file,
            Mode::Prod => &self.prod_file,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServicesConfig {
    pub backend: String,
    pub database: String,
    pub shell_default: String,
    pub shell_command: String,
}

impl Default for ServicesConfig {
    fn default() -> Self {
        Self {
            backend: "backend".to_string(),
            database: "mongodb".to_string(),
            shell_default: "backend".to_string(),
            shell_command: "sh".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub directory: String,
    pub npm: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            directory: "backend".to_string(),
            npm: "npm".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Dump only this database; all databases when unset
    pub name: Option<String>,
    pub backup_dir: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            name: None,
            backup_dir: "backups".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthConfig {
    pub timeout_seconds: u64,
    pub endpoints: Vec<HealthEndpoint>,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 5,
            endpoints: vec![
                HealthEndpoint {
                    name: "backend".to_string(),
                    url: "http://localhost:3000/health".to_string(),
                },
                HealthEndpoint {
                    name: "gateway".to_string(),
                    url: "http://localhost:8080/health".to_string(),
                },
            ],
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    pub mode: String,
    pub service: Option<String>,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default().to_string(),
            service: None,
        }
    }
}

impl StackConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(StackError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 預設設定檔不存在時使用內建預設值；明確指定的檔案則必須存在
    pub fn load(path: &str, explicit: bool) -> Result<Self> {
        if !explicit && !Path::new(path).exists() {
            tracing::debug!("No {} found, using built-in defaults", path);
            return Ok(Self::default());
        }
        if !Path::new(path).is_file() {
            return Err(StackError::InvalidConfigValueError {
                field: "config".to_string(),
                value: path.to_string(),
                reason: "Configuration file does not exist".to_string(),
            });
        }
        tracing::debug!("Loading configuration from {}", path);
        Self::from_file(path)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| StackError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${COMPOSE_PROJECT})，未定義的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| StackError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn compose_file(&self, mode: Mode) -> &str {
        self.compose.file(mode)
    }
}

impl Validate for StackConfig {
    fn validate(&self) -> Result<()> {
        if let Some(name) = &self.project.name {
            validation::validate_non_empty_string("project.name", name)?;
        }

        validation::validate_non_empty_string("compose.program", &self.compose.program)?;
        validation::validate_path("compose.dev_file", &self.compose.dev_file)?;
        validation::validate_path("compose.prod_file", &self.compose.prod_file)?;

        validation::validate_service_name("services.backend", &self.services.backend)?;
        validation::validate_service_name("services.database", &self.services.database)?;
        validation::validate_service_name("services.shell_default", &self.services.shell_default)?;
        validation::validate_non_empty_string("services.shell_command", &self.services.shell_command)?;

        validation::validate_path("backend.directory", &self.backend.directory)?;
        validation::validate_non_empty_string("backend.npm", &self.backend.npm)?;

        if let Some(name) = &self.database.name {
            validation::validate_non_empty_string("database.name", name)?;
        }
        validation::validate_path("database.backup_dir", &self.database.backup_dir)?;

        validation::validate_range("health.timeout_seconds", self.health.timeout_seconds, 1, 300)?;
        for endpoint in &self.health.endpoints {
            validation::validate_non_empty_string("health.endpoints.name", &endpoint.name)?;
            validation::validate_url("health.endpoints.url", &endpoint.url)?;
        }

        self.defaults.mode.parse::<Mode>().map_err(|_| StackError::InvalidConfigValueError {
            field: "defaults.mode".to_string(),
            value: self.defaults.mode.clone(),
            reason: "Mode must be either 'dev' or 'prod'".to_string(),
        })?;
        if let Some(service) = &self.defaults.service {
            validation::validate_service_name("defaults.service", service)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = StackConfig::from_toml_str("").unwrap();
        assert_eq!(config, StackConfig::default());
        assert_eq!(config.compose_file(Mode::Dev), "docker-compose.dev.yml");
        assert_eq!(config.compose_file(Mode::Prod), "docker-compose.prod.yml");
        assert_eq!(config.health.endpoints.len(), 2);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = StackConfig::from_toml_str(
            r#"
[compose]
prod_file = "compose.yaml"

[database]
name = "shop"
"#,
        )
        .unwrap();
        assert_eq!(config.compose.dev_file, "docker-compose.dev.yml");
        assert_eq!(config.compose.prod_file, "compose.yaml");
        assert_eq!(config.compose.program, "docker");
        assert_eq!(config.database.name.as_deref(), Some("shop"));
        assert_eq!(config.database.backup_dir, "backups");
    }

    #[test]
    fn test_env_substitution() {
        std::env::set_var("STACKCTL_TEST_PROJECT", "shop");
        let config = StackConfig::from_toml_str(
            r#"
[project]
name = "${STACKCTL_TEST_PROJECT}"

[database]
name = "${STACKCTL_TEST_UNSET_VARIABLE}"
"#,
        )
        .unwrap();
        assert_eq!(config.project.name.as_deref(), Some("shop"));
        assert_eq!(
            config.database.name.as_deref(),
            Some("${STACKCTL_TEST_UNSET_VARIABLE}")
        );
    }

    #[test]
    fn test_invalid_toml() {
        let err = StackConfig::from_toml_str("[compose\ndev_file = 1").unwrap_err();
        assert!(matches!(err, StackError::ConfigValidationError { .. }));
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = StackConfig::default();
        config.defaults.mode = "staging".to_string();
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.health.timeout_seconds = 0;
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.health.endpoints[0].url = "localhost:3000".to_string();
        assert!(config.validate().is_err());

        let mut config = StackConfig::default();
        config.services.database = "mongo db".to_string();
        assert!(config.validate().is_err());
    }
}
