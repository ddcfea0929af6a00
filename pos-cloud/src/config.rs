//! Server configuration

use chrono::FixedOffset;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// Connection pool size
    pub db_max_connections: u32,
    /// Session time zone set on every pooled connection
    pub db_timezone: String,
    /// Restaurant local offset in minutes (dashboard ranges, display times)
    pub utc_offset_minutes: i32,
    /// SES sender email address
    pub ses_from_email: String,
    /// Mail transport: `ses` or `memory` (keeps messages in process, logs them)
    pub mail_transport: String,
    /// Password reset code lifetime (seconds)
    pub otp_ttl_secs: i64,
    /// Allowed CORS origins (empty: any)
    pub cors_origins: Vec<String>,
    /// Emit JSON logs
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: env_parse("HTTP_PORT", 5000),
            environment,
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", 10),
            db_timezone: std::env::var("DB_TIMEZONE").unwrap_or_else(|_| "Asia/Kolkata".into()),
            utc_offset_minutes: env_parse("UTC_OFFSET_MINUTES", 330),
            ses_from_email: std::env::var("SES_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@localhost".into()),
            mail_transport: std::env::var("MAIL_TRANSPORT").unwrap_or_else(|_| "ses".into()),
            otp_ttl_secs: env_parse("OTP_TTL_SECS", 300),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| parse_list(&v))
                .unwrap_or_default(),
            log_json: std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json")),
        })
    }

    pub fn local_offset(&self) -> FixedOffset {
        shared::util::offset_from_minutes(self.utc_offset_minutes)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cors_list_parsing() {
        assert_eq!(
            parse_list(" https://a.example, ,https://b.example "),
            vec!["https://a.example", "https://b.example"]
        );
        assert!(parse_list("").is_empty());
    }
}
