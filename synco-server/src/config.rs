//! Server configuration

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Server configuration, loaded once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    /// HTTP port
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for admin authentication
    pub jwt_secret: String,
    /// Default password assigned to auto-provisioned parent accounts
    pub parent_default_password: String,

    /// SMTP relay host
    pub smtp_host: String,
    /// SMTP relay port
    pub smtp_port: u16,
    /// SMTP username
    pub smtp_username: String,
    /// SMTP password
    pub smtp_password: String,
    /// Sender email address
    pub smtp_from_email: String,
    /// Sender display name
    pub smtp_from_name: String,

    /// Bank-debit (billing request) gateway base URL
    pub rrn_api_base_url: String,
    /// Bank-debit gateway bearer token
    pub rrn_access_token: String,
    /// Card gateway base URL
    pub card_api_base_url: String,
    /// Card gateway installation id (path segment of the charge endpoint)
    pub card_inst_id: String,
    /// Card gateway basic-auth username
    pub card_api_username: String,
    /// Card gateway basic-auth password
    pub card_api_password: String,
    /// ISO currency code used for every charge
    pub payment_currency: String,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            parent_default_password: Self::require_secret("PARENT_DEFAULT_PASSWORD", &environment)?,
            smtp_host: std::env::var("SMTP_HOST").unwrap_or_else(|_| "localhost".into()),
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(587),
            smtp_username: std::env::var("SMTP_USERNAME").unwrap_or_default(),
            smtp_password: Self::require_secret("SMTP_PASSWORD", &environment)?,
            smtp_from_email: std::env::var("SMTP_FROM_EMAIL")
                .unwrap_or_else(|_| "noreply@syncosports.app".into()),
            smtp_from_name: std::env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Synco Sports".into()),
            rrn_api_base_url: std::env::var("RRN_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.gocardless.com".into()),
            rrn_access_token: Self::require_secret("RRN_ACCESS_TOKEN", &environment)?,
            card_api_base_url: std::env::var("CARD_API_BASE_URL")
                .unwrap_or_else(|_| "https://api.pay360.com/acceptor/rest".into()),
            card_inst_id: std::env::var("CARD_INST_ID").unwrap_or_default(),
            card_api_username: std::env::var("CARD_API_USERNAME").unwrap_or_default(),
            card_api_password: Self::require_secret("CARD_API_PASSWORD", &environment)?,
            payment_currency: std::env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "GBP".into()),
            environment,
        })
    }
}
