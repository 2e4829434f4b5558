use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use salesdesk_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

pub fn run() -> String {
    match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            let path = detect_config_path();
            let doc = load_config_file_doc(path.as_deref());
            render(&config, doc.as_ref(), path.as_deref())
        }
        Err(error) => format!("config validation failed: {error}"),
    }
}

/// Renders every effective value with the layer it came from.
pub fn render(config: &AppConfig, doc: Option<&Value>, path: Option<&Path>) -> String {
    let erp_password = redact_secret(config.erp.password.expose_secret());
    let llm_api_key = if config.llm.api_key.is_some() { "<redacted>" } else { "<unset>" };
    let industries = config.recommendations.industries.keys().cloned().collect::<Vec<_>>();
    let backfill =
        config.recommendations.backfill.iter().map(|entry| entry.id.clone()).collect::<Vec<_>>();

    let fields: Vec<(&str, String, Option<&str>)> = vec![
        ("erp.base_url", config.erp.base_url.clone(), Some("SALESDESK_ERP_BASE_URL")),
        ("erp.username", config.erp.username.clone(), Some("SALESDESK_ERP_USERNAME")),
        ("erp.password", erp_password, Some("SALESDESK_ERP_PASSWORD")),
        ("erp.timeout_secs", config.erp.timeout_secs.to_string(), Some("SALESDESK_ERP_TIMEOUT_SECS")),
        ("llm.provider", format!("{:?}", config.llm.provider), Some("SALESDESK_LLM_PROVIDER")),
        ("llm.model", config.llm.model.clone(), Some("SALESDESK_LLM_MODEL")),
        (
            "llm.base_url",
            config.llm.base_url.clone().unwrap_or_else(|| "<unset>".to_string()),
            Some("SALESDESK_LLM_BASE_URL"),
        ),
        ("llm.api_key", llm_api_key.to_string(), Some("SALESDESK_LLM_API_KEY")),
        ("llm.timeout_secs", config.llm.timeout_secs.to_string(), Some("SALESDESK_LLM_TIMEOUT_SECS")),
        ("server.bind_address", config.server.bind_address.clone(), Some("SALESDESK_SERVER_BIND_ADDRESS")),
        ("server.port", config.server.port.to_string(), Some("SALESDESK_SERVER_PORT")),
        (
            "server.graceful_shutdown_secs",
            config.server.graceful_shutdown_secs.to_string(),
            Some("SALESDESK_SERVER_GRACEFUL_SHUTDOWN_SECS"),
        ),
        ("logging.level", config.logging.level.clone(), Some("SALESDESK_LOGGING_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("SALESDESK_LOGGING_FORMAT")),
        (
            "recommendations.accessories.keyword",
            config.recommendations.accessories.keyword.clone(),
            None,
        ),
        ("recommendations.fallback", config.recommendations.fallback.id.clone(), None),
        ("recommendations.industries", industries.join(", "), None),
        ("recommendations.backfill", backfill.join(", "), None),
        (
            "follow_up.unparsable_recency_days",
            config.follow_up.unparsable_recency_days.to_string(),
            Some("SALESDESK_FOLLOW_UP_UNPARSABLE_RECENCY_DAYS"),
        ),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in fields {
        lines.push(render_line(key, &value, field_source(key, env_key, doc, path)));
    }
    lines.join("\n")
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("salesdesk.toml"), PathBuf::from("config/salesdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_secret(secret: &str) -> String {
    if secret.trim().is_empty() {
        "<empty>".to_string()
    } else {
        "<redacted>".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use salesdesk_core::config::AppConfig;

    use super::{contains_path, render};

    #[test]
    fn render_attributes_file_values_and_redacts_password() {
        let mut config = AppConfig::default();
        config.erp.username = "webservice".to_string();
        config.erp.password = "pa55word".to_string().into();
        let doc: toml::Value = r#"
[erp]
username = "webservice"

[recommendations.industries.mining]
id = "BORE-01"
name = "Borehole Kit"
reason = "Mines"
"#
        .parse()
        .expect("toml");

        let output = render(&config, Some(&doc), Some(Path::new("salesdesk.toml")));

        assert!(!output.contains("pa55word"));
        assert!(output.contains("- erp.password = <redacted>"));
        assert!(output.contains("- erp.username = webservice (source: file (salesdesk.toml))"));
        assert!(output.contains("recommendations.industries = agriculture, construction, residential (source: file (salesdesk.toml))"));
        assert!(output.contains("- follow_up.unparsable_recency_days = 7 (source: default)"));
    }

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: toml::Value = "[a.b]\nc = 1".parse().expect("toml");

        assert!(contains_path(&doc, "a.b.c"));
        assert!(!contains_path(&doc, "a.x"));
    }
}
