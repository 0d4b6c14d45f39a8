use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::credentials::DEFAULT_TTL_SECONDS;
use crate::{Error, Result};

/// Client configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// API key from the purchase confirmation.
    pub api_key: String,
    /// Deployment address and transport.
    pub endpoint: EndpointSettings,
    /// Service-account settings.
    pub credentials: CredentialSettings,
}

/// Deployment address settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointSettings {
    /// Deployment hostname, e.g. `c-example.roguedb.dev`.
    pub host: String,
    /// Transport requests are assembled for.
    pub transport: Transport,
}

/// Wire surface used to reach the deployment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transport {
    /// Protobuf over gRPC on port 443.
    #[default]
    Grpc,
    /// JSON over HTTPS.
    Rest,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grpc => f.write_str("grpc"),
            Self::Rest => f.write_str("rest"),
        }
    }
}

/// Service-account settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    /// Path to `service_account.json`.
    pub service_account_path: PathBuf,
    /// Lifetime of issued tokens in seconds.
    pub token_ttl_seconds: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: EndpointSettings::default(),
            credentials: CredentialSettings::default(),
        }
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            transport: Transport::Grpc,
        }
    }
}

impl Default for CredentialSettings {
    fn default() -> Self {
        Self {
            service_account_path: PathBuf::from("service_account.json"),
            token_ttl_seconds: DEFAULT_TTL_SECONDS,
        }
    }
}

impl ClientConfig {
    /// Loads configuration from `.env` file, TOML file, and environment variables.
    ///
    /// Configuration priority (highest to lowest):
    /// 1. Environment variables with `ROGUEDB_` prefix, nested with `__`
    ///    (e.g., `ROGUEDB_ENDPOINT__HOST=c-example.roguedb.dev`)
    /// 2. TOML configuration file (if exists)
    /// 3. `.env` file (if exists)
    /// 4. Built-in defaults
    ///
    /// The TOML file path can be set via `ROGUEDB_CONFIG_PATH`. If not set,
    /// defaults to `./config/client.toml`. A missing file is skipped.
    ///
    /// # Environment Variable Examples
    /// ```bash
    /// ROGUEDB_API_KEY=...
    /// ROGUEDB_ENDPOINT__HOST=c-example.roguedb.dev
    /// ROGUEDB_ENDPOINT__TRANSPORT=rest
    /// ROGUEDB_CREDENTIALS__SERVICE_ACCOUNT_PATH=/etc/roguedb/service_account.json
    /// ROGUEDB_CREDENTIALS__TOKEN_TTL_SECONDS=1800
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::Config`] if a source is malformed.
    pub fn from_env() -> Result<Self> {
        // Attempt to load .env file (silently ignore if it doesn't exist)
        let _ = dotenvy::dotenv();

        let config_path = std::env::var("ROGUEDB_CONFIG_PATH")
            .unwrap_or_else(|_| "config/client.toml".to_string());

        Self::figment(&config_path)
            .extract()
            .map_err(|e| Error::Config(e.to_string()))
    }

    fn figment(config_path: &str) -> figment::Figment {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(config_path))
            .merge(
                Env::prefixed("ROGUEDB_")
                    .ignore(&["CONFIG_PATH"])
                    .split("__"),
            )
    }

    /// Validates the configuration before issuing requests.
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] naming the first invalid setting.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::InvalidArgument("api_key cannot be empty".to_string()));
        }

        if self.endpoint.host.is_empty() {
            return Err(Error::InvalidArgument("endpoint.host cannot be empty".to_string()));
        }

        if self.credentials.service_account_path.as_os_str().is_empty() {
            return Err(Error::InvalidArgument(
                "credentials.service_account_path cannot be empty".to_string(),
            ));
        }

        if self.credentials.token_ttl_seconds <= 0 {
            return Err(Error::InvalidArgument(
                "credentials.token_ttl_seconds must be positive".to_string(),
            ));
        }

        Ok(())
    }

    /// Base URL for REST requests.
    pub fn rest_base_url(&self) -> String {
        format!("https://{}", self.endpoint.host)
    }

    /// Endpoint URI for a gRPC channel.
    pub fn grpc_endpoint(&self) -> String {
        format!("https://{}:443", self.endpoint.host)
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    fn valid() -> ClientConfig {
        ClientConfig {
            api_key: "key".to_string(),
            ..ClientConfig::default()
        }
    }

    #[test]
    fn defaults_are_valid_once_key_is_set() {
        assert!(ClientConfig::default().validate().is_err());
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_settings() {
        let mut config = valid();
        config.credentials.token_ttl_seconds = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidArgument(_))));

        let mut config = valid();
        config.endpoint.host.clear();
        assert!(config.validate().is_err());

        let mut config = valid();
        config.credentials.service_account_path = PathBuf::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn urls_follow_host() {
        let mut config = valid();
        config.endpoint.host = "c-example.roguedb.dev".to_string();
        assert_eq!(config.rest_base_url(), "https://c-example.roguedb.dev");
        assert_eq!(config.grpc_endpoint(), "https://c-example.roguedb.dev:443");
    }

    #[test]
    fn env_overrides_toml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "client.toml",
                r#"
                api_key = "from-file"

                [endpoint]
                host = "c-file.roguedb.dev"
                transport = "rest"

                [credentials]
                token_ttl_seconds = 600
                "#,
            )?;
            jail.set_env("ROGUEDB_API_KEY", "from-env");
            jail.set_env("ROGUEDB_CREDENTIALS__TOKEN_TTL_SECONDS", "1200");

            let config: ClientConfig = ClientConfig::figment("client.toml").extract()?;
            assert_eq!(config.api_key, "from-env");
            assert_eq!(config.endpoint.host, "c-file.roguedb.dev");
            assert_eq!(config.endpoint.transport, Transport::Rest);
            assert_eq!(config.credentials.token_ttl_seconds, 1200);
            assert_eq!(
                config.credentials.service_account_path,
                PathBuf::from("service_account.json")
            );
            Ok(())
        });
    }
}
