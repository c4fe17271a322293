/// Server configuration
///
/// # Environment variables
///
/// Every setting can be overridden through the environment:
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | /var/lib/shop | Working directory (database, logs) |
/// | HTTP_PORT | 3000 | HTTP listen port |
/// | ENVIRONMENT | development | development \| staging \| production |
/// | FRONTEND_DOMAIN | http://localhost:5173 | Base URL for payment redirects |
/// | VAT_PERCENTAGE | 21 | VAT rate applied at checkout |
/// | CURRENCY | eur | ISO currency code sent to the payment provider |
/// | STRIPE_SECRET_KEY | (unset) | Payment provider secret key |
/// | STRIPE_API_BASE | https://api.stripe.com | Payment provider API base URL |
/// | EMAIL_API_KEY | (unset) | Transactional email provider key |
/// | EMAIL_API_BASE | https://api.sendgrid.com | Email provider API base URL |
/// | EMAIL_FROM | (unset) | Sender address for order emails |
/// | SHOP_NAME | Shop | Shop display name used in emails |
/// | PAYMENT_TIMEOUT_MINUTES | 10 | Minutes before unconfirmed payments expire |
/// | STATS_EPOCH | 2023-01-01 | First day covered by the statistics rebuild |
/// | HOT_PRODUCT_COUNT | 5 | How many top sellers get the hot flag |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/shop HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and log files
    pub work_dir: String,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    /// Frontend base URL, embedded in payment success/cancel redirects
    pub frontend_domain: String,
    /// VAT rate snapshotted onto every order at checkout
    pub vat_percentage: f64,
    /// ISO currency code for payment sessions
    pub currency: String,
    /// Payment provider secret key (checkout fails upstream without it)
    pub stripe_secret_key: String,
    /// Payment provider API base URL (overridden in tests)
    pub stripe_api_base: String,
    /// Transactional email provider key; empty disables notifications
    pub email_api_key: String,
    /// Email provider API base URL
    pub email_api_base: String,
    /// Sender address for order emails
    pub email_from: String,
    /// Shop display name used in notification emails
    pub shop_name: String,
    /// Minutes before an unconfirmed payment is swept to cancelled
    pub payment_timeout_minutes: i64,
    /// First day (YYYY-MM-DD) covered by statistics rebuilds
    pub stats_epoch: String,
    /// How many top sellers carry the hot flag
    pub hot_product_count: i64,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "/var/lib/shop".into()),
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            frontend_domain: std::env::var("FRONTEND_DOMAIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
            vat_percentage: std::env::var("VAT_PERCENTAGE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(21.0),
            currency: std::env::var("CURRENCY").unwrap_or_else(|_| "eur".into()),
            stripe_secret_key: std::env::var("STRIPE_SECRET_KEY").unwrap_or_default(),
            stripe_api_base: std::env::var("STRIPE_API_BASE")
                .unwrap_or_else(|_| "https://api.stripe.com".into()),
            email_api_key: std::env::var("EMAIL_API_KEY").unwrap_or_default(),
            email_api_base: std::env::var("EMAIL_API_BASE")
                .unwrap_or_else(|_| "https://api.sendgrid.com".into()),
            email_from: std::env::var("EMAIL_FROM").unwrap_or_default(),
            shop_name: std::env::var("SHOP_NAME").unwrap_or_else(|_| "Shop".into()),
            payment_timeout_minutes: std::env::var("PAYMENT_TIMEOUT_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            stats_epoch: std::env::var("STATS_EPOCH").unwrap_or_else(|_| "2023-01-01".into()),
            hot_product_count: std::env::var("HOT_PRODUCT_COUNT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(5),
        }
    }

    /// Override the work directory and port, keeping the rest from the
    /// environment. Mostly used by tests.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Redirect URL the payment provider sends the shopper to on success
    pub fn checkout_success_url(&self, order_id: &str) -> String {
        format!("{}/checkout-success/{}", self.frontend_domain, order_id)
    }

    /// Redirect URL for a failed or abandoned payment
    pub fn checkout_error_url(&self, order_id: &str) -> String {
        format!("{}/checkout-error/{}", self.frontend_domain, order_id)
    }

    pub fn payment_timeout_millis(&self) -> i64 {
        self.payment_timeout_minutes * 60 * 1000
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_urls_embed_order_id() {
        let mut config = Config::from_env();
        config.frontend_domain = "https://shop.example".to_string();
        assert_eq!(
            config.checkout_success_url("order:abc"),
            "https://shop.example/checkout-success/order:abc"
        );
        assert_eq!(
            config.checkout_error_url("order:abc"),
            "https://shop.example/checkout-error/order:abc"
        );
    }

    #[test]
    fn payment_timeout_in_millis() {
        let mut config = Config::from_env();
        config.payment_timeout_minutes = 10;
        assert_eq!(config.payment_timeout_millis(), 600_000);
    }
}
