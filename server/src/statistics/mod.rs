//! Statistics aggregation
//!
//! Two write paths over the same bucket shapes:
//!
//! - **Incremental**: `record_sale` / `record_view` bump today's daily and
//!   monthly buckets as events happen, keeping dashboards roughly current.
//! - **Rebuild**: the nightly batch recomputes every document wholesale
//!   from paid orders and raw view events, starting at the configured
//!   epoch. Rebuild output always wins over incremental drift.

use std::collections::BTreeMap;

use surrealdb::RecordId;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use crate::db::models::{
    GeneralStatistic, Order, PeriodStat, ProductStatistic, ProductView, entry_for,
};
use crate::db::repository::{
    CategoryRepository, GeneralStatisticRepository, OrderRepository, ProductRepository,
    ProductStatisticRepository, ProductViewRepository, UserRepository,
};
use crate::utils::{AppResult, time};

#[derive(Clone)]
pub struct StatisticsAggregator {
    orders: OrderRepository,
    products: ProductRepository,
    users: UserRepository,
    categories: CategoryRepository,
    views: ProductViewRepository,
    product_stats: ProductStatisticRepository,
    general_stats: GeneralStatisticRepository,
    /// First day covered by rebuilds, YYYY-MM-DD
    epoch: String,
}

impl StatisticsAggregator {
    pub fn new(db: Surreal<Db>, epoch: String) -> Self {
        Self {
            orders: OrderRepository::new(db.clone()),
            products: ProductRepository::new(db.clone()),
            users: UserRepository::new(db.clone()),
            categories: CategoryRepository::new(db.clone()),
            views: ProductViewRepository::new(db.clone()),
            product_stats: ProductStatisticRepository::new(db.clone()),
            general_stats: GeneralStatisticRepository::new(db),
            epoch,
        }
    }

    // =========================================================================
    // Incremental path
    // =========================================================================

    /// Fold a freshly completed order into today's buckets.
    ///
    /// Called exactly once per order, from the payment-success transition.
    pub async fn record_sale(&self, order: &Order) -> AppResult<()> {
        let now = time::now_millis();
        let day = time::day_key(now);
        let month = time::month_key(now);

        for line in &order.products {
            let mut stat = match self.product_stats.find_by_product(&line.product_id).await? {
                Some(stat) => stat,
                None => ProductStatistic::empty(line.product_id.clone()),
            };
            {
                let daily = entry_for(&mut stat.daily_statistics, &day);
                daily.orders += 1;
                daily.sells += line.amount;
            }
            {
                let monthly = entry_for(&mut stat.monthly_statistics, &month);
                monthly.orders += 1;
                monthly.sells += line.amount;
            }
            self.product_stats.save(stat).await?;
            self.products.bump_sells(&line.product_id, line.amount).await?;
        }

        let mut general = self.general_stats.get().await?.unwrap_or_default();
        general.total_sells = crate::utils::money::round2(general.total_sells + order.total_price);
        general.total_orders += 1;
        {
            let daily = entry_for(&mut general.daily_statistics, &day);
            daily.orders += 1;
            daily.sells += order.total_price;
        }
        {
            let monthly = entry_for(&mut general.monthly_statistics, &month);
            monthly.orders += 1;
            monthly.sells += order.total_price;
        }
        self.general_stats.save(general).await?;

        self.users
            .bump_order_counters(&order.user_id, order.total_elements, order.total_price)
            .await?;

        Ok(())
    }

    /// Fold one product view into today's buckets and the raw event log
    pub async fn record_view(&self, product_id: &RecordId, user_id: Option<RecordId>) -> AppResult<()> {
        let now = time::now_millis();
        let day = time::day_key(now);
        let month = time::month_key(now);

        self.views
            .append(ProductView {
                id: None,
                product_id: product_id.clone(),
                user_id,
                created_at: now,
            })
            .await?;
        self.products.bump_views(product_id).await?;

        let mut stat = match self.product_stats.find_by_product(product_id).await? {
            Some(stat) => stat,
            None => ProductStatistic::empty(product_id.clone()),
        };
        entry_for(&mut stat.daily_statistics, &day).views += 1;
        entry_for(&mut stat.monthly_statistics, &month).views += 1;
        self.product_stats.save(stat).await?;

        let mut general = self.general_stats.get().await?.unwrap_or_default();
        general.total_views += 1;
        entry_for(&mut general.daily_statistics, &day).views += 1;
        entry_for(&mut general.monthly_statistics, &month).views += 1;
        self.general_stats.save(general).await?;

        Ok(())
    }

    // =========================================================================
    // Rebuild path
    // =========================================================================

    /// Expand sparse activity buckets into the full epoch-to-today
    /// sequences: one entry per day and one per month, zeros included
    fn dense_sequences(
        &self,
        mut daily: BTreeMap<String, PeriodStat>,
        mut monthly: BTreeMap<String, PeriodStat>,
    ) -> AppResult<(Vec<PeriodStat>, Vec<PeriodStat>)> {
        let epoch = time::parse_date(&self.epoch)?;
        let days = time::days_since(epoch)
            .into_iter()
            .map(|date| {
                let key = date.format("%Y-%m-%d").to_string();
                daily.remove(&key).unwrap_or_else(|| PeriodStat::empty(key))
            })
            .collect();
        let months = time::months_since(epoch)
            .into_iter()
            .map(|date| {
                let key = date.format("%Y-%m-%d").to_string();
                monthly.remove(&key).unwrap_or_else(|| PeriodStat::empty(key))
            })
            .collect();
        Ok((days, months))
    }

    /// Recompute every per-product statistic document from scratch
    pub async fn rebuild_product_statistics(&self) -> AppResult<()> {
        let products = self.products.find_all().await?;
        tracing::info!(products = products.len(), "Rebuilding product statistics");

        for product in products {
            let Some(product_id) = product.id.clone() else {
                continue;
            };
            let orders = self.orders.find_paid_for_product(&product_id).await?;
            let views = self.views.find_for_product(&product_id).await?;

            let mut daily: BTreeMap<String, PeriodStat> = BTreeMap::new();
            let mut monthly: BTreeMap<String, PeriodStat> = BTreeMap::new();
            let mut total_sells = 0.0;

            for order in &orders {
                let amount: f64 = order
                    .products
                    .iter()
                    .filter(|l| l.product_id == product_id)
                    .map(|l| l.amount)
                    .sum();
                let day = time::day_key(order.created_at);
                let month = time::month_key(order.created_at);
                if day.as_str() < self.epoch.as_str() {
                    continue;
                }
                let d = daily
                    .entry(day.clone())
                    .or_insert_with(|| PeriodStat::empty(day));
                d.orders += 1;
                d.sells += amount;
                let m = monthly
                    .entry(month.clone())
                    .or_insert_with(|| PeriodStat::empty(month));
                m.orders += 1;
                m.sells += amount;
                total_sells += amount;
            }

            for view in &views {
                let day = time::day_key(view.created_at);
                let month = time::month_key(view.created_at);
                if day.as_str() < self.epoch.as_str() {
                    continue;
                }
                daily
                    .entry(day.clone())
                    .or_insert_with(|| PeriodStat::empty(day))
                    .views += 1;
                monthly
                    .entry(month.clone())
                    .or_insert_with(|| PeriodStat::empty(month))
                    .views += 1;
            }

            let (daily_statistics, monthly_statistics) = self.dense_sequences(daily, monthly)?;
            let stat = ProductStatistic {
                id: None,
                product_id: product_id.clone(),
                daily_statistics,
                monthly_statistics,
            };
            self.product_stats.replace_for_product(stat).await?;
            self.products
                .set_sells_views(
                    &product_id,
                    crate::utils::money::round2(total_sells),
                    views.len() as i64,
                )
                .await?;
        }
        Ok(())
    }

    /// Recompute the store-wide snapshot from scratch
    pub async fn rebuild_general_statistics(&self) -> AppResult<()> {
        let orders = self.orders.find_paid().await?;
        let views = self.views.find_all().await?;

        let mut daily: BTreeMap<String, PeriodStat> = BTreeMap::new();
        let mut monthly: BTreeMap<String, PeriodStat> = BTreeMap::new();
        let mut total_sells = 0.0;

        for order in &orders {
            let day = time::day_key(order.created_at);
            let month = time::month_key(order.created_at);
            if day.as_str() < self.epoch.as_str() {
                continue;
            }
            let d = daily
                .entry(day.clone())
                .or_insert_with(|| PeriodStat::empty(day));
            d.orders += 1;
            d.sells += order.total_price;
            let m = monthly
                .entry(month.clone())
                .or_insert_with(|| PeriodStat::empty(month));
            m.orders += 1;
            m.sells += order.total_price;
            total_sells += order.total_price;
        }

        for view in &views {
            let day = time::day_key(view.created_at);
            let month = time::month_key(view.created_at);
            if day.as_str() < self.epoch.as_str() {
                continue;
            }
            daily
                .entry(day.clone())
                .or_insert_with(|| PeriodStat::empty(day))
                .views += 1;
            monthly
                .entry(month.clone())
                .or_insert_with(|| PeriodStat::empty(month))
                .views += 1;
        }

        let (daily_statistics, monthly_statistics) = self.dense_sequences(daily, monthly)?;
        let general = GeneralStatistic {
            id: None,
            total_sells: crate::utils::money::round2(total_sells),
            total_views: views.len() as i64,
            total_orders: orders.len() as i64,
            total_users: self.users.count_all().await?,
            total_products: self.products.count_all().await?,
            total_active_products: self.products.count_visible().await?,
            total_categories: self.categories.count_all().await?,
            daily_statistics,
            monthly_statistics,
        };
        self.general_stats.replace(general).await?;
        Ok(())
    }

    /// Recompute every user's lifetime order counters from their paid
    /// orders
    pub async fn rebuild_user_statistics(&self) -> AppResult<()> {
        let users = self.users.find_all().await?;
        for user in users {
            let Some(user_id) = user.id.clone() else {
                continue;
            };
            let orders = self.orders.find_paid_by_user(&user_id).await?;
            let items: i64 = orders.iter().map(|o| o.total_elements).sum();
            let spent: f64 = orders.iter().map(|o| o.total_price).sum();
            self.users
                .set_order_counters(
                    &user_id,
                    orders.len() as i64,
                    items,
                    crate::utils::money::round2(spent),
                )
                .await?;
        }
        Ok(())
    }

    /// Recompute per-category product counts and sell totals
    pub async fn rebuild_category_rollups(&self) -> AppResult<()> {
        let categories = self.categories.find_all().await?;
        for category in categories {
            let Some(category_id) = category.id.clone() else {
                continue;
            };
            let products = self.products.find_by_category(&category_id).await?;
            let product_count = products.iter().filter(|p| p.visible).count() as i64;
            let total_sells: f64 = products.iter().map(|p| p.sells).sum();
            self.categories
                .set_rollups(
                    &category_id,
                    product_count,
                    crate::utils::money::round2(total_sells),
                )
                .await?;
        }
        Ok(())
    }

    /// The full nightly rebuild, in dependency order: product counters
    /// first (category rollups read product.sells), then the store-wide
    /// snapshot and the user counters.
    pub async fn rebuild_all(&self) -> AppResult<()> {
        self.rebuild_product_statistics().await?;
        self.rebuild_category_rollups().await?;
        self.rebuild_general_statistics().await?;
        self.rebuild_user_statistics().await?;
        Ok(())
    }
}
