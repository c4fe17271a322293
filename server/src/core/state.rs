//! Server state
//!
//! Shared handle passed to every request handler and background task.
//! Cloning is cheap: the database handle and the service trait objects
//! are all reference-counted.

use std::path::PathBuf;
use std::sync::Arc;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::core::Config;
use crate::db::DbService;
use crate::services::{EmailNotifier, NoopNotifier, Notifier, PaymentGateway, StripeGateway};

#[derive(Clone)]
pub struct ServerState {
    /// Server configuration (immutable after startup)
    pub config: Config,
    /// Embedded database handle
    pub db: Surreal<Db>,
    /// Payment provider, behind a trait for tests
    pub payment_gateway: Arc<dyn PaymentGateway>,
    /// Transactional email sender
    pub notifier: Arc<dyn Notifier>,
}

impl ServerState {
    /// Manual construction, mostly for tests injecting fakes
    pub fn with_parts(
        config: Config,
        db: Surreal<Db>,
        payment_gateway: Arc<dyn PaymentGateway>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config,
            db,
            payment_gateway,
            notifier,
        }
    }

    /// Initialize the full production state: open the database under
    /// `work_dir/database/shop.db` and wire the real outbound services.
    pub async fn initialize(config: &Config) -> Self {
        let db_dir = PathBuf::from(&config.work_dir).join("database");
        std::fs::create_dir_all(&db_dir).expect("Failed to create database directory");
        let db_path = db_dir.join("shop.db");

        let db_service = DbService::new(&db_path.to_string_lossy())
            .await
            .expect("Failed to initialize database");

        let payment_gateway: Arc<dyn PaymentGateway> = Arc::new(StripeGateway::new(
            config.stripe_secret_key.clone(),
            config.stripe_api_base.clone(),
        ));

        let notifier: Arc<dyn Notifier> = if config.email_api_key.is_empty() {
            tracing::warn!("EMAIL_API_KEY not set, order notifications disabled");
            Arc::new(NoopNotifier)
        } else {
            Arc::new(EmailNotifier::new(
                config.email_api_key.clone(),
                config.email_api_base.clone(),
                config.email_from.clone(),
                config.shop_name.clone(),
            ))
        };

        Self {
            config: config.clone(),
            db: db_service.db,
            payment_gateway,
            notifier,
        }
    }

    pub fn get_db(&self) -> Surreal<Db> {
        self.db.clone()
    }

    pub fn work_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.work_dir)
    }

    /// Statistics service over this state's database
    pub fn statistics(&self) -> crate::statistics::StatisticsAggregator {
        crate::statistics::StatisticsAggregator::new(
            self.db.clone(),
            self.config.stats_epoch.clone(),
        )
    }

    /// Order lifecycle service wired with statistics and notifications
    pub fn order_ledger(&self) -> crate::orders::OrderLedger {
        crate::orders::OrderLedger::new(
            self.db.clone(),
            self.statistics(),
            self.notifier.clone(),
            self.config.payment_timeout_millis(),
        )
    }

    /// Checkout service wired with the payment gateway
    pub fn checkout(&self) -> crate::checkout::CheckoutOrchestrator {
        crate::checkout::CheckoutOrchestrator::new(
            self.db.clone(),
            self.config.clone(),
            self.payment_gateway.clone(),
        )
    }
}
