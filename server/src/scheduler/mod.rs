//! Scheduled maintenance
//!
//! Two periodic tasks, both registered on [`BackgroundTasks`]:
//!
//! - a frequent sweep (every minute) that expires unconfirmed payments
//!   and refreshes the hot-product flags
//! - a nightly batch (UTC midnight) that rebuilds all derived statistics
//!   from the primary data
//!
//! Both tasks run their bodies through error logging rather than `?`: a
//! failed sweep is retried on the next tick, never crashes the process.

use std::time::Duration;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use tokio_util::sync::CancellationToken;

use crate::core::tasks::BackgroundTasks;
use crate::core::Config;
use crate::db::repository::ProductRepository;
use crate::orders::OrderLedger;
use crate::statistics::StatisticsAggregator;
use crate::utils::time;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Register both maintenance tasks
pub fn register(
    tasks: &mut BackgroundTasks,
    db: Surreal<Db>,
    config: &Config,
    ledger: OrderLedger,
    statistics: StatisticsAggregator,
) {
    let token = tasks.shutdown_token();
    let products = ProductRepository::new(db);
    let hot_count = config.hot_product_count;

    let sweep_token = token.clone();
    tasks.spawn("order_sweep", async move {
        run_sweep_loop(sweep_token, ledger, products, hot_count).await;
    });

    tasks.spawn("nightly_rebuild", async move {
        run_nightly_loop(token, statistics).await;
    });
}

async fn run_sweep_loop(
    token: CancellationToken,
    ledger: OrderLedger,
    products: ProductRepository,
    hot_count: i64,
) {
    let mut interval = tokio::time::interval(SWEEP_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Order sweep stopping");
                return;
            }
            _ = interval.tick() => {
                if let Err(e) = ledger.expire_stale_payments().await {
                    tracing::error!(error = %e, "Payment expiry sweep failed");
                }
                if let Err(e) = refresh_hot_products(&products, hot_count).await {
                    tracing::error!(error = %e, "Hot product refresh failed");
                }
            }
        }
    }
}

/// Flag the current top sellers, unflag everything else
async fn refresh_hot_products(
    products: &ProductRepository,
    hot_count: i64,
) -> crate::utils::AppResult<()> {
    let top = products.find_top_sellers(hot_count).await?;
    products.clear_hot_flags().await?;
    products
        .mark_hot(top.into_iter().filter_map(|p| p.id).collect())
        .await?;
    Ok(())
}

async fn run_nightly_loop(token: CancellationToken, statistics: StatisticsAggregator) {
    loop {
        let wait = time::until_next_utc_midnight();
        tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Nightly rebuild stopping");
                return;
            }
            _ = tokio::time::sleep(wait) => {
                let started = std::time::Instant::now();
                match statistics.rebuild_all().await {
                    Ok(()) => {
                        tracing::info!(elapsed_ms = started.elapsed().as_millis() as u64, "Nightly statistics rebuild finished");
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Nightly statistics rebuild failed");
                    }
                }
            }
        }
    }
}
