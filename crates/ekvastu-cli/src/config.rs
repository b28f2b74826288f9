use anyhow::{Context, Result};
use ekvastu_client::ClientConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration: client settings at the top level plus a logging section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(flatten)]
    pub client: ClientConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log request and response bodies at debug level
    #[serde(default = "default_false")]
    pub log_bodies: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            log_bodies: false,
        }
    }
}

impl CliConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse TOML config {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("EKVASTU_AUTH_BASE_URL") {
            self.client.auth_base_url = val;
        }

        if let Ok(val) = std::env::var("EKVASTU_DOMAIN_BASE_URL") {
            self.client.domain_base_url = val;
        }

        if let Ok(val) = std::env::var("EKVASTU_TENANT") {
            self.client.tenant_name = val;
        }

        if let Ok(val) = std::env::var("EKVASTU_TOKEN_FILE") {
            self.client.token_file = Some(PathBuf::from(val));
        }

        if let Ok(val) = std::env::var("EKVASTU_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) => self.client.http.timeout_secs = secs,
                Err(_) => eprintln!("Warning: Invalid EKVASTU_TIMEOUT_SECS '{}', ignoring", val),
            }
        }

        if let Ok(val) = std::env::var("EKVASTU_LOG_LEVEL") {
            self.logging.level = val;
        }

        // Cloudinary credentials (no EKVASTU_ prefix for these)
        if let Ok(val) = std::env::var("CLOUDINARY_API_KEY") {
            self.client.cloudinary.api_key = val;
        }

        if let Ok(val) = std::env::var("CLOUDINARY_API_SECRET") {
            self.client.cloudinary.api_secret = val;
        }

        if let Ok(val) = std::env::var("CLOUDINARY_CLOUD_NAME") {
            self.client.cloudinary.cloud_name = val;
        }
    }

    /// Client settings with the CLI-level options applied
    pub fn client_config(&self) -> ClientConfig {
        let mut client = self.client.clone();
        client.log_bodies = client.log_bodies || self.logging.log_bodies;
        if client.token_file.is_none() {
            client.token_file = Some(PathBuf::from(default_token_file()));
        }
        client
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_false() -> bool {
    false
}

fn default_token_file() -> String {
    "~/.ekvastu/tokens.json".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_VARS: [&str; 9] = [
        "EKVASTU_AUTH_BASE_URL",
        "EKVASTU_DOMAIN_BASE_URL",
        "EKVASTU_TENANT",
        "EKVASTU_TOKEN_FILE",
        "EKVASTU_TIMEOUT_SECS",
        "EKVASTU_LOG_LEVEL",
        "CLOUDINARY_API_KEY",
        "CLOUDINARY_API_SECRET",
        "CLOUDINARY_CLOUD_NAME",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            unsafe {
                std::env::remove_var(var);
            }
        }
    }

    fn write_config(suffix: &str, contents: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_yaml_file() {
        let file = write_config(
            ".yaml",
            r#"
auth_base_url: "http://auth.local"
tenant_name: "othertenant"
http:
  timeout_secs: 5
cloudinary:
  cloud_name: "my-cloud"
logging:
  level: "debug"
  log_bodies: true
"#,
        );

        let config = CliConfig::from_file(file.path()).unwrap();
        assert_eq!(config.client.auth_base_url, "http://auth.local");
        assert_eq!(
            config.client.domain_base_url,
            "https://ekshakti-portal.onrender.com"
        );
        assert_eq!(config.client.tenant_name, "othertenant");
        assert_eq!(config.client.http.timeout_secs, 5);
        assert_eq!(config.client.cloudinary.cloud_name, "my-cloud");
        assert_eq!(config.client.cloudinary.upload_preset, "qjdp0fft");
        assert_eq!(config.logging.level, "debug");
        assert!(config.client_config().log_bodies);
    }

    #[test]
    fn test_toml_file() {
        let file = write_config(
            ".toml",
            r#"
domain_base_url = "http://domain.local"
auth_scheme = "Token"

[browser_headers]
origin = "https://app.example.com"
"#,
        );

        let config = CliConfig::from_file(file.path()).unwrap();
        assert_eq!(config.client.domain_base_url, "http://domain.local");
        assert_eq!(config.client.auth_scheme, "Token");
        assert_eq!(config.client.browser_headers.origin, "https://app.example.com");
        assert_eq!(config.client.browser_headers.sec_gpc, "1");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_file() {
        let file = write_config(".yaml", "http: [not, a, map");
        assert!(CliConfig::from_file(file.path()).is_err());
        assert!(CliConfig::from_file("/nonexistent/ekvastu.yaml").is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        let file = write_config(".yaml", "tenant_name: \"from-file\"\n");
        let mut config = CliConfig::from_file(file.path()).unwrap();

        unsafe {
            std::env::set_var("EKVASTU_TENANT", "from-env");
            std::env::set_var("EKVASTU_TIMEOUT_SECS", "12");
            std::env::set_var("EKVASTU_LOG_LEVEL", "warn");
            std::env::set_var("CLOUDINARY_API_KEY", "key-from-env");
            std::env::set_var("EKVASTU_TOKEN_FILE", "/tmp/ekvastu-tokens.json");
        }
        config.merge_env();
        clear_env();

        assert_eq!(config.client.tenant_name, "from-env");
        assert_eq!(config.client.http.timeout_secs, 12);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.client.cloudinary.api_key, "key-from-env");
        assert_eq!(
            config.client.token_file,
            Some(PathBuf::from("/tmp/ekvastu-tokens.json"))
        );
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_env_ignored() {
        clear_env();
        let mut config = CliConfig::default();

        unsafe {
            std::env::set_var("EKVASTU_TIMEOUT_SECS", "soon");
        }
        config.merge_env();
        clear_env();

        assert_eq!(config.client.http.timeout_secs, 30);
    }

    #[test]
    fn test_default_token_file() {
        let config = CliConfig::default();
        assert_eq!(
            config.client_config().token_file,
            Some(PathBuf::from("~/.ekvastu/tokens.json"))
        );
    }
}
