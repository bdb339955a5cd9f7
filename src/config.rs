use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub codes: CodeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expires_in: i64, // seconds
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CorsConfig {
    /// Empty list allows any origin (development only)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Manual code issuance settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_manual_code_length")]
    pub manual_code_length: usize,
    #[serde(default = "default_max_issue_attempts")]
    pub max_issue_attempts: u32,
}

fn default_manual_code_length() -> usize {
    8
}

fn default_max_issue_attempts() -> u32 {
    5
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            manual_code_length: default_manual_code_length(),
            max_issue_attempts: default_max_issue_attempts(),
        }
    }
}

impl CodeConfig {
    pub const MIN_LENGTH: usize = 6;
    pub const MAX_LENGTH: usize = 16;

    pub fn validate(&self) -> Result<(), String> {
        if !(Self::MIN_LENGTH..=Self::MAX_LENGTH).contains(&self.manual_code_length) {
            return Err(format!(
                "codes.manual_code_length must be between {} and {}",
                Self::MIN_LENGTH,
                Self::MAX_LENGTH
            ));
        }
        if self.max_issue_attempts == 0 {
            return Err("codes.max_issue_attempts must be at least 1".to_string());
        }
        Ok(())
    }
}

impl Config {
    pub fn from_toml() -> Result<Self, Box<dyn std::error::Error>> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 配置文件不存在时完全依赖环境变量
        let mut config: Config = match std::fs::read_to_string(&config_path) {
            Ok(config_str) => Self::parse(&config_str)?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env_defaults()?,
            Err(e) => {
                return Err(format!("Failed to read config file {config_path}: {e}").into());
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        config.apply_env_overrides();
        config.codes.validate()?;

        Ok(config)
    }

    pub fn parse(config_str: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let config: Config =
            toml::from_str(config_str).map_err(|e| format!("Failed to parse config file: {e}"))?;
        Ok(config)
    }

    fn from_env_defaults() -> Result<Self, Box<dyn std::error::Error>> {
        fn get_env(name: &str) -> Option<String> {
            env::var(name).ok()
        }
        fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse::<T>().ok())
                .unwrap_or(default)
        }

        let database_url = get_env("DATABASE_URL")
            .ok_or("DATABASE_URL is not set and no config.toml was found")?;

        Ok(Config {
            server: ServerConfig {
                host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: get_env_parse("SERVER_PORT", 8080u16),
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
            },
            jwt: JwtConfig {
                secret: get_env("JWT_SECRET")
                    .unwrap_or_else(|| "change-me-in-production".to_string()),
                access_token_expires_in: get_env_parse("JWT_ACCESS_EXPIRES_IN", 3600i64),
            },
            cors: CorsConfig::default(),
            codes: CodeConfig::default(),
        })
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = env::var("SERVER_HOST") {
            self.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            self.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            self.database.max_connections = mc;
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.jwt.secret = v;
        }
        if let Ok(v) = env::var("JWT_ACCESS_EXPIRES_IN")
            && let Ok(n) = v.parse()
        {
            self.jwt.access_token_expires_in = n;
        }
        if let Ok(v) = env::var("CORS_ALLOWED_ORIGINS") {
            self.cors.allowed_origins = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }
        if let Ok(v) = env::var("MANUAL_CODE_LENGTH")
            && let Ok(n) = v.parse()
        {
            self.codes.manual_code_length = n;
        }
        if let Ok(v) = env::var("MANUAL_CODE_MAX_ATTEMPTS")
            && let Ok(n) = v.parse()
        {
            self.codes.max_issue_attempts = n;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal_config_uses_defaults() {
        let config = Config::parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 9000

            [database]
            url = "sqlite::memory:"
            max_connections = 1

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 60
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert!(config.cors.allowed_origins.is_empty());
        assert_eq!(config.codes.manual_code_length, 8);
        assert_eq!(config.codes.max_issue_attempts, 5);
    }

    #[test]
    fn test_parse_code_section() {
        let config = Config::parse(
            r#"
            [server]
            host = "0.0.0.0"
            port = 8080

            [database]
            url = "postgres://localhost/passgate"
            max_connections = 10

            [jwt]
            secret = "s3cret"
            access_token_expires_in = 3600

            [cors]
            allowed_origins = ["http://localhost:5173"]

            [codes]
            manual_code_length = 10
            "#,
        )
        .unwrap();

        assert_eq!(config.cors.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.codes.manual_code_length, 10);
        assert_eq!(config.codes.max_issue_attempts, 5);
    }

    #[test]
    fn test_code_config_bounds() {
        assert!(CodeConfig::default().validate().is_ok());

        let too_short = CodeConfig {
            manual_code_length: 4,
            ..CodeConfig::default()
        };
        assert!(too_short.validate().is_err());

        let no_attempts = CodeConfig {
            max_issue_attempts: 0,
            ..CodeConfig::default()
        };
        assert!(no_attempts.validate().is_err());
    }
}
