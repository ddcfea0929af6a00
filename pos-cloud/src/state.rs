//! Application state

use chrono::{FixedOffset, NaiveDate, Utc};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;

use crate::auth::RateLimiter;
use crate::config::Config;
use crate::email::{Mailer, MemoryMailer, SesMailer};
use crate::live::LiveHub;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// Per-restaurant real-time rooms
    pub live: LiveHub,
    /// Outgoing mail transport
    pub mailer: Arc<dyn Mailer>,
    /// Rate limiter for login and reset-code routes
    pub rate_limiter: RateLimiter,
    /// Restaurant local offset (dashboard ranges, display times)
    pub local_offset: FixedOffset,
    /// Password reset code lifetime
    pub otp_ttl_secs: i64,
}

impl AppState {
    /// Connect, migrate and pick the mail transport.
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let timezone = config.db_timezone.clone();
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .after_connect(move |conn, _meta| {
                let timezone = timezone.clone();
                Box::pin(async move {
                    sqlx::query("SELECT set_config('TimeZone', $1, false)")
                        .bind(timezone)
                        .execute(conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(&config.database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("Database migrations applied");

        let mailer: Arc<dyn Mailer> = if config.mail_transport.eq_ignore_ascii_case("memory") {
            tracing::warn!("MAIL_TRANSPORT=memory: emails are logged, not delivered");
            Arc::new(MemoryMailer::new())
        } else {
            Arc::new(SesMailer::from_env(config.ses_from_email.clone()).await)
        };

        Ok(Self::with_parts(
            pool,
            mailer,
            config.local_offset(),
            config.otp_ttl_secs,
        ))
    }

    /// Assemble state from already-built parts
    pub fn with_parts(
        pool: PgPool,
        mailer: Arc<dyn Mailer>,
        local_offset: FixedOffset,
        otp_ttl_secs: i64,
    ) -> Self {
        Self {
            pool,
            live: LiveHub::new(),
            mailer,
            rate_limiter: RateLimiter::new(),
            local_offset,
            otp_ttl_secs,
        }
    }

    /// Today's date in the restaurant's time zone
    pub fn today(&self) -> NaiveDate {
        shared::util::local_date(Utc::now(), self.local_offset)
    }
}
