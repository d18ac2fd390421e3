use crate::domain::error::{AppError, Result};
use crate::domain::llm_config::LLMConfig;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_PREFIX: &str = "CRM_";
pub const DEFAULT_CONFIG_FILE: &str = "crm.toml";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub log_level: String,
    pub openai: OpenAiSettings,
    pub stripe: StripeSettings,
    pub meta: MetaSettings,
    pub facebook: FacebookSettings,
    pub calendly: CalendlySettings,
    pub apify: ApifySettings,
    pub n8n: WorkflowSettings,
    pub resend: ResendSettings,
    pub cron: CronSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OpenAiSettings {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StripeSettings {
    pub secret_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetaSettings {
    pub access_token: Option<String>,
    pub ad_account_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacebookSettings {
    pub verify_token: Option<String>,
    pub graph_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendlySettings {
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApifySettings {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowSettings {
    pub no_answer_url: Option<String>,
    pub meeting_booked_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResendSettings {
    pub api_key: Option<String>,
    pub from: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CronSettings {
    pub secret: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 3001,
            },
            database: DatabaseSettings {
                url: "sqlite://agency_crm.db".to_string(),
                max_connections: 4,
            },
            log_level: "info".to_string(),
            openai: OpenAiSettings::default(),
            stripe: StripeSettings::default(),
            meta: MetaSettings::default(),
            facebook: FacebookSettings::default(),
            calendly: CalendlySettings::default(),
            apify: ApifySettings::default(),
            n8n: WorkflowSettings::default(),
            resend: ResendSettings::default(),
            cron: CronSettings::default(),
        }
    }
}

impl Settings {
    /// Defaults, then `crm.toml` (if present), then `CRM_*` environment
    /// variables. Nested keys use `__`, e.g. `CRM_STRIPE__SECRET_KEY`.
    pub fn load() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::figment(Path::new(DEFAULT_CONFIG_FILE))
            .extract()
            .map_err(|e| AppError::Internal(format!("Failed to load configuration: {}", e)))
    }

    pub fn figment(config_file: &Path) -> Figment {
        Figment::from(Serialized::defaults(Settings::default()))
            .merge(Toml::file(config_file))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.server.host.clone(), self.server.port)
    }

    pub fn llm_config(&self) -> LLMConfig {
        let defaults = LLMConfig::default();
        LLMConfig {
            base_url: self
                .openai
                .base_url
                .clone()
                .unwrap_or(defaults.base_url),
            model: self.openai.model.clone().unwrap_or(defaults.model),
            api_key: non_empty(&self.openai.api_key),
            ..defaults
        }
    }
}

/// Treats blank secrets the same as absent ones.
pub fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Returns the secret or a `NotConfigured` error naming the setting.
pub fn require(value: &Option<String>, setting: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| AppError::NotConfigured(format!("{} not configured", setting)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_local_port() {
        let settings: Settings = Settings::figment(Path::new("does-not-exist.toml"))
            .extract()
            .unwrap();
        assert_eq!(settings.server.port, 3001);
        assert_eq!(settings.log_level, "info");
        assert!(settings.stripe.secret_key.is_none());
    }

    #[test]
    fn toml_overrides_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file(
                "crm.toml",
                r#"
                log_level = "debug"
                [server]
                port = 8080
                [stripe]
                secret_key = "sk_test_123"
                "#,
            )?;
            let settings: Settings = Settings::figment(Path::new("crm.toml")).extract()?;
            assert_eq!(settings.server.port, 8080);
            assert_eq!(settings.log_level, "debug");
            assert_eq!(settings.stripe.secret_key.as_deref(), Some("sk_test_123"));
            Ok(())
        });
    }

    #[test]
    fn env_overrides_nested_keys() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("CRM_CALENDLY__API_TOKEN", "cal_abc");
            jail.set_env("CRM_SERVER__PORT", "9000");
            let settings: Settings = Settings::figment(Path::new("crm.toml")).extract()?;
            assert_eq!(settings.calendly.api_token.as_deref(), Some("cal_abc"));
            assert_eq!(settings.server.port, 9000);
            Ok(())
        });
    }

    #[test]
    fn blank_secret_is_not_configured() {
        let err = require(&Some("   ".to_string()), "APIFY_TOKEN").unwrap_err();
        assert!(matches!(err, AppError::NotConfigured(_)));
        assert_eq!(require(&Some("tok".to_string()), "APIFY_TOKEN").unwrap(), "tok");
    }
}
