//! Application state for synco-server

use sqlx::PgPool;

use crate::config::Config;
use crate::email::Mailer;
use crate::payments::{CardGateway, RrnGateway};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    /// SMTP mailer
    pub mailer: Mailer,
    /// Bank-debit billing-request gateway
    pub rrn: RrnGateway,
    /// Card charge gateway
    pub card: CardGateway,
    /// JWT secret for admin authentication
    pub jwt_secret: String,
    /// Default password for auto-provisioned parent accounts
    pub parent_default_password: String,
}

impl AppState {
    /// Create a new AppState: connect the pool, run migrations, build clients
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let mailer = Mailer::new(
            &config.smtp_host,
            config.smtp_port,
            &config.smtp_username,
            &config.smtp_password,
            &config.smtp_from_email,
            &config.smtp_from_name,
        )?;

        let http = reqwest::Client::new();
        let rrn = RrnGateway::new(
            http.clone(),
            &config.rrn_api_base_url,
            &config.rrn_access_token,
            &config.payment_currency,
        );
        let card = CardGateway::new(
            http,
            &config.card_api_base_url,
            &config.card_inst_id,
            &config.card_api_username,
            &config.card_api_password,
            &config.payment_currency,
        );

        Ok(Self {
            pool,
            mailer,
            rrn,
            card,
            jwt_secret: config.jwt_secret.clone(),
            parent_default_password: config.parent_default_password.clone(),
        })
    }
}
