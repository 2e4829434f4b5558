use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::{FollowUpPolicy, RecommendationEntry, RecommendationRules};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub erp: ErpConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub recommendations: RecommendationRules,
    pub follow_up: FollowUpPolicy,
}

#[derive(Clone, Debug)]
pub struct ErpConfig {
    /// OData company root, e.g. `https://erp.example.com/ODataV4/Company('KENYA')`.
    pub base_url: String,
    pub username: String,
    pub password: SecretString,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[serde(rename = "openai")]
    OpenAi,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub erp_base_url: Option<String>,
    pub erp_username: Option<String>,
    pub erp_password: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub server_port: Option<u16>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            erp: ErpConfig {
                base_url: String::new(),
                username: String::new(),
                password: String::new().into(),
                timeout_secs: 30,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 8000,
                graceful_shutdown_secs: 15,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
            recommendations: RecommendationRules::default(),
            follow_up: FollowUpPolicy::default(),
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" | "open_ai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("salesdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(erp) = patch.erp {
            if let Some(base_url) = erp.base_url {
                self.erp.base_url = base_url;
            }
            if let Some(username) = erp.username {
                self.erp.username = username;
            }
            if let Some(erp_password_value) = erp.password {
                self.erp.password = secret_value(erp_password_value);
            }
            if let Some(timeout_secs) = erp.timeout_secs {
                self.erp.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        if let Some(recommendations) = patch.recommendations {
            let rules = &mut self.recommendations;
            if let Some(accessories) = recommendations.accessories {
                if let Some(trigger_category) = accessories.trigger_category {
                    rules.accessories.trigger_category = trigger_category;
                }
                if let Some(keyword) = accessories.keyword {
                    rules.accessories.keyword = keyword;
                }
                if let Some(reason) = accessories.reason {
                    rules.accessories.reason = reason;
                }
                if let Some(limit) = accessories.limit {
                    rules.accessories.limit = limit;
                }
            }
            if let Some(fallback) = recommendations.fallback {
                rules.fallback = fallback;
            }
            if let Some(industries) = recommendations.industries {
                rules.industries = industries
                    .into_iter()
                    .map(|(industry, entry)| (industry.trim().to_lowercase(), entry))
                    .collect();
            }
            if let Some(backfill) = recommendations.backfill {
                rules.backfill = backfill;
            }
        }

        if let Some(follow_up) = patch.follow_up {
            if let Some(days) = follow_up.unparsable_recency_days {
                self.follow_up.unparsable_recency_days = days;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("SALESDESK_ERP_BASE_URL") {
            self.erp.base_url = value;
        }
        if let Some(value) = read_env("SALESDESK_ERP_USERNAME") {
            self.erp.username = value;
        }
        if let Some(value) = read_env("SALESDESK_ERP_PASSWORD") {
            self.erp.password = secret_value(value);
        }
        if let Some(value) = read_env("SALESDESK_ERP_TIMEOUT_SECS") {
            self.erp.timeout_secs = parse_u64("SALESDESK_ERP_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SALESDESK_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("SALESDESK_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("SALESDESK_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("SALESDESK_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("SALESDESK_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("SALESDESK_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("SALESDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("SALESDESK_SERVER_PORT") {
            self.server.port = parse_u16("SALESDESK_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("SALESDESK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("SALESDESK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }

        let log_level =
            read_env("SALESDESK_LOGGING_LEVEL").or_else(|| read_env("SALESDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("SALESDESK_LOGGING_FORMAT").or_else(|| read_env("SALESDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        if let Some(value) = read_env("SALESDESK_FOLLOW_UP_UNPARSABLE_RECENCY_DAYS") {
            self.follow_up.unparsable_recency_days =
                parse_i64("SALESDESK_FOLLOW_UP_UNPARSABLE_RECENCY_DAYS", &value)?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(erp_base_url) = overrides.erp_base_url {
            self.erp.base_url = erp_base_url;
        }
        if let Some(erp_username) = overrides.erp_username {
            self.erp.username = erp_username;
        }
        if let Some(erp_password) = overrides.erp_password {
            self.erp.password = secret_value(erp_password);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(server_port) = overrides.server_port {
            self.server.port = server_port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_erp(&self.erp)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_logging(&self.logging)?;
        validate_recommendations(&self.recommendations)?;
        validate_follow_up(&self.follow_up)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("salesdesk.toml"), PathBuf::from("config/salesdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_erp(erp: &ErpConfig) -> Result<(), ConfigError> {
    let base_url = erp.base_url.trim();
    if base_url.is_empty() {
        return Err(ConfigError::Validation(
            "erp.base_url is required (the OData company root, e.g. https://erp.example.com/ODataV4/Company('KENYA'))"
                .to_string(),
        ));
    }
    if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "erp.base_url must start with http:// or https://".to_string(),
        ));
    }

    if erp.username.trim().is_empty() {
        return Err(ConfigError::Validation("erp.username is required".to_string()));
    }
    if erp.password.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "erp.password is required; set SALESDESK_ERP_PASSWORD rather than committing it"
                .to_string(),
        ));
    }

    if erp.timeout_secs == 0 || erp.timeout_secs > 300 {
        return Err(ConfigError::Validation("erp.timeout_secs must be in range 1..=300".to_string()));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for the openai provider".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn validate_recommendations(rules: &RecommendationRules) -> Result<(), ConfigError> {
    rules
        .validate()
        .map_err(|error| ConfigError::Validation(format!("recommendations: {error}")))
}

fn validate_follow_up(policy: &FollowUpPolicy) -> Result<(), ConfigError> {
    if policy.unparsable_recency_days < 0 {
        return Err(ConfigError::Validation(
            "follow_up.unparsable_recency_days must not be negative".to_string(),
        ));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_i64(key: &str, value: &str) -> Result<i64, ConfigError> {
    value.parse::<i64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    erp: Option<ErpPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    logging: Option<LoggingPatch>,
    recommendations: Option<RecommendationsPatch>,
    follow_up: Option<FollowUpPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ErpPatch {
    base_url: Option<String>,
    username: Option<String>,
    password: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationsPatch {
    accessories: Option<AccessoryPatch>,
    fallback: Option<RecommendationEntry>,
    industries: Option<BTreeMap<String, RecommendationEntry>>,
    backfill: Option<Vec<RecommendationEntry>>,
}

#[derive(Debug, Default, Deserialize)]
struct AccessoryPatch {
    trigger_category: Option<String>,
    keyword: Option<String>,
    reason: Option<String>,
    limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
struct FollowUpPatch {
    unparsable_recency_days: Option<i64>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    const ERP_VARS: [&str; 3] =
        ["SALESDESK_ERP_BASE_URL", "SALESDESK_ERP_USERNAME", "SALESDESK_ERP_PASSWORD"];

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn set_erp_env() {
        env::set_var("SALESDESK_ERP_BASE_URL", "https://erp.example.test/ODataV4/Company('KE')");
        env::set_var("SALESDESK_ERP_USERNAME", "webservice");
        env::set_var("SALESDESK_ERP_PASSWORD", "s3cret-erp-password");
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_ERP_PASSWORD", "from-env-password");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("salesdesk.toml");
            fs::write(
                &path,
                r#"
[erp]
base_url = "https://erp.example.test/ODataV4/Company('KE')"
username = "webservice"
password = "${TEST_ERP_PASSWORD}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.erp.password.expose_secret() == "from-env-password",
                "erp password should be interpolated from environment",
            )?;
            ensure(config.erp.username == "webservice", "erp username should come from file")?;
            Ok(())
        })();

        clear_vars(&["TEST_ERP_PASSWORD"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_erp_env();
        env::set_var("SALESDESK_LOG_LEVEL", "warn");
        env::set_var("SALESDESK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&ERP_VARS);
        clear_vars(&["SALESDESK_LOG_LEVEL", "SALESDESK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_erp_env();
        env::set_var("SALESDESK_ERP_USERNAME", "from-env-user");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("salesdesk.toml");
            fs::write(
                &path,
                r#"
[erp]
username = "from-file-user"
timeout_secs = 45

[server]
port = 9000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.erp.username == "from-env-user", "env should win over file")?;
            ensure(config.erp.timeout_secs == 45, "file value should win over default")?;
            ensure(config.server.port == 9000, "file port should be applied")?;
            Ok(())
        })();

        clear_vars(&ERP_VARS);
        result
    }

    #[test]
    fn recommendation_tables_load_from_file() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_erp_env();

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("salesdesk.toml");
            fs::write(
                &path,
                r#"
[recommendations.accessories]
keyword = "FITTING"

[recommendations.industries.Mining]
id = "BORE-01"
name = "Borehole Pump Kit"
reason = "Common on mine sites"

[[recommendations.backfill]]
id = "A"
name = "Pump A"
reason = "First"

[[recommendations.backfill]]
id = "B"
name = "Pump B"
reason = "Second"

[[recommendations.backfill]]
id = "C"
name = "Pump C"
reason = "Third"

[follow_up]
unparsable_recency_days = 14
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;
            let rules = &config.recommendations;

            ensure(rules.accessories.keyword == "FITTING", "accessory keyword from file")?;
            ensure(rules.accessories.trigger_category == "PUMPS", "unset fields keep defaults")?;
            ensure(rules.industry_rule("MINING").is_some(), "industry keys are lowercased")?;
            ensure(rules.industry_rule("agriculture").is_none(), "industry table is replaced")?;
            ensure(rules.backfill.len() == 3, "backfill pool from file")?;
            ensure(
                config.follow_up.unparsable_recency_days == 14,
                "follow-up placeholder from file",
            )?;
            Ok(())
        })();

        clear_vars(&ERP_VARS);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&ERP_VARS);

        let error = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => return Err("expected validation failure but config load succeeded".to_string()),
            Err(error) => error,
        };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("erp.base_url")
        );
        ensure(has_message, "validation failure should mention erp.base_url")
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_erp_env();
        env::set_var("SALESDESK_SERVER_PORT", "eighty");

        let result = match AppConfig::load(LoadOptions::default()) {
            Err(ConfigError::InvalidEnvOverride { key, .. }) if key == "SALESDESK_SERVER_PORT" => {
                Ok(())
            }
            Err(other) => Err(format!("unexpected error: {other}")),
            Ok(_) => Err("expected invalid override error".to_string()),
        };

        clear_vars(&ERP_VARS);
        clear_vars(&["SALESDESK_SERVER_PORT"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        set_erp_env();
        env::set_var("SALESDESK_LLM_API_KEY", "sk-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(!debug.contains("s3cret-erp-password"), "debug output should not contain erp password")?;
            ensure(!debug.contains("sk-secret-value"), "debug output should not contain llm key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&ERP_VARS);
        clear_vars(&["SALESDESK_LLM_API_KEY"]);
        result
    }
}
