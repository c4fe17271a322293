//! End-to-end checkout lifecycle against an in-memory database:
//! cart pricing, payment callbacks, idempotency, the expiry sweep and
//! incremental-vs-rebuild agreement.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

use axum::Json;
use axum::extract::State;
use chrono::{NaiveDate, Utc};

use server::api::products::handler as products_api;
use server::checkout::{CheckoutLine, CheckoutOrchestrator, CheckoutPayload};
use server::core::{Config, ServerState};
use server::db::DbService;
use server::db::models::{
    Address, Cart, LocalizedText, Order, OrderStatus, PaymentMethod, PaymentStatus, Product,
    ProductCreate, ShippingMethod, ShippingStatus, User,
};
use server::db::repository::{
    GeneralStatisticRepository, OrderRepository, ProductRepository, ProductStatisticRepository,
    UserRepository,
};
use server::orders::OrderLedger;
use server::services::{CheckoutSession, NoopNotifier, PaymentGateway, SessionLineItem};
use server::statistics::StatisticsAggregator;
use server::utils::AppResult;

/// Gateway fake: always succeeds, counts sessions it created
struct FakeGateway {
    sessions: AtomicUsize,
}

impl FakeGateway {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_checkout_session(
        &self,
        _line_items: &[SessionLineItem],
        success_url: &str,
        _cancel_url: &str,
    ) -> AppResult<CheckoutSession> {
        let n = self.sessions.fetch_add(1, Ordering::SeqCst);
        Ok(CheckoutSession {
            id: format!("cs_test_{n}"),
            url: format!("https://pay.example/session/{n}?next={success_url}"),
        })
    }
}

struct TestEnv {
    db: Surreal<Db>,
    config: Config,
    gateway: Arc<FakeGateway>,
}

impl TestEnv {
    async fn new() -> Self {
        let service = DbService::new_in_memory().await.expect("in-memory db");
        let mut config = Config::from_env();
        config.vat_percentage = 21.0;
        config.currency = "eur".to_string();
        config.payment_timeout_minutes = 10;
        config.frontend_domain = "https://shop.example".to_string();
        config.stats_epoch = "2023-01-01".to_string();
        Self {
            db: service.db,
            config,
            gateway: FakeGateway::new(),
        }
    }

    fn checkout(&self) -> CheckoutOrchestrator {
        CheckoutOrchestrator::new(self.db.clone(), self.config.clone(), self.gateway.clone())
    }

    fn state(&self) -> ServerState {
        ServerState::with_parts(
            self.config.clone(),
            self.db.clone(),
            self.gateway.clone(),
            Arc::new(NoopNotifier),
        )
    }

    fn statistics(&self) -> StatisticsAggregator {
        StatisticsAggregator::new(self.db.clone(), self.config.stats_epoch.clone())
    }

    fn ledger(&self) -> OrderLedger {
        OrderLedger::new(
            self.db.clone(),
            self.statistics(),
            Arc::new(NoopNotifier),
            self.config.payment_timeout_millis(),
        )
    }

    async fn seed_product(&self, name: &str, price: f64) -> Product {
        let now = server::utils::time::now_millis();
        ProductRepository::new(self.db.clone())
            .create(Product {
                id: None,
                title: LocalizedText::new(name, name),
                short_description: LocalizedText::new("desc", "desc"),
                large_description: LocalizedText::new("", ""),
                price,
                categories: vec![],
                visible: true,
                stock: 100,
                sells: 0.0,
                views: 0,
                is_hot: false,
                sku: None,
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed product")
    }

    fn payload(&self, lines: Vec<CheckoutLine>) -> CheckoutPayload {
        CheckoutPayload {
            user_id: None,
            email: "shopper@example.com".to_string(),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
            phone: "600000000".to_string(),
            products: lines,
            shipping_address: Address {
                name: "Ada Lovelace".to_string(),
                address: "Calle Mayor 1".to_string(),
                address2: String::new(),
                city: "Madrid".to_string(),
                zip_code: "28001".to_string(),
                province: "Madrid".to_string(),
                country: "ES".to_string(),
            },
            billing_address: None,
            payment_method: PaymentMethod::CreditCard,
            shipping_method: ShippingMethod::Standard,
            shipping_cost: 0.0,
            subscribe_newsletter: false,
        }
    }

    /// Registered active account, profile mostly blank
    async fn seed_member(&self, email: &str, name: &str) -> User {
        let now = server::utils::time::now_millis();
        UserRepository::new(self.db.clone())
            .create(User {
                id: None,
                email: email.to_string(),
                password: "hash".to_string(),
                name: name.to_string(),
                surname: String::new(),
                phone: String::new(),
                mailing_addresses: vec![],
                active: true,
                is_placeholder: false,
                subscribe_newsletter: false,
                unsubscribe_newsletter_token: "token".to_string(),
                orders: 0,
                total_items_in_orders: 0,
                total_spent_in_orders: 0.0,
                cart: Cart::default(),
                created_at: now,
                updated_at: now,
            })
            .await
            .expect("seed member")
    }

    async fn place_order(&self, lines: Vec<CheckoutLine>) -> Order {
        let response = self
            .checkout()
            .checkout(self.payload(lines))
            .await
            .expect("checkout");
        OrderRepository::new(self.db.clone())
            .find_by_id(&response.order_id)
            .await
            .expect("lookup")
            .expect("order exists")
    }
}

fn line(product: &Product, quantity: i64) -> CheckoutLine {
    CheckoutLine {
        product_id: product.id.as_ref().expect("product id").to_string(),
        quantity,
    }
}

#[tokio::test]
async fn checkout_creates_pending_order_with_vat_split() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let gadget = env.seed_product("Gadget", 5.0).await;

    let order = env
        .place_order(vec![line(&widget, 2), line(&gadget, 1)])
        .await;

    assert_eq!(order.status, OrderStatus::Pending);
    assert_eq!(order.payment_status, PaymentStatus::AwaitingConfirmation);
    assert_eq!(order.shipping_status, ShippingStatus::Pending);
    assert_eq!(order.invoice_number, 1);
    assert_eq!(order.total_elements, 3);
    assert!((order.total_price - 25.0).abs() < 1e-9);
    assert!((order.total_price_without_vat - 20.66).abs() < 1e-9);
    assert!((order.price_vat - 4.34).abs() < 1e-9);
    assert!(order.totals_consistent());
    assert_eq!(env.gateway.sessions.load(Ordering::SeqCst), 1);

    // placeholder account owns the order
    let user = UserRepository::new(env.db.clone())
        .find_by_email("shopper@example.com")
        .await
        .unwrap()
        .expect("placeholder user");
    assert!(user.is_placeholder);
    assert!(!user.active);
    assert!(!user.wants_notifications());
}

#[tokio::test]
async fn invoice_numbers_are_sequential() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;

    let first = env.place_order(vec![line(&widget, 1)]).await;
    let second = env.place_order(vec![line(&widget, 1)]).await;
    assert_eq!(first.invoice_number, 1);
    assert_eq!(second.invoice_number, 2);
}

#[tokio::test]
async fn empty_cart_is_rejected_before_any_write() {
    let env = TestEnv::new().await;
    let result = env.checkout().checkout(env.payload(vec![])).await;
    assert!(result.is_err());

    // no user, no order, no payment session
    assert!(
        UserRepository::new(env.db.clone())
            .find_by_email("shopper@example.com")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(
        OrderRepository::new(env.db.clone()).count_all().await.unwrap(),
        0
    );
    assert_eq!(env.gateway.sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn guest_checkout_with_registered_email_is_a_conflict() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;

    // first guest checkout creates the placeholder, the second reuses it
    env.place_order(vec![line(&widget, 1)]).await;
    env.place_order(vec![line(&widget, 1)]).await;
    let users = UserRepository::new(env.db.clone());
    let guest = users
        .find_by_email("shopper@example.com")
        .await
        .unwrap()
        .expect("placeholder user");
    assert!(guest.is_placeholder);

    // a registered active account under that email blocks guest checkout
    env.seed_member("member@example.com", "Grace").await;
    let mut payload = env.payload(vec![line(&widget, 1)]);
    payload.email = "member@example.com".to_string();
    let result = env.checkout().checkout(payload).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn registered_customer_checks_out_with_their_user_id() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let member = env.seed_member("member@example.com", "Grace").await;
    let member_id = member.id.clone().expect("member id");

    let mut payload = env.payload(vec![line(&widget, 1)]);
    payload.user_id = Some(member_id.to_string());
    payload.email = "member@example.com".to_string();
    payload.phone = "611111111".to_string();
    let response = env
        .checkout()
        .checkout(payload)
        .await
        .expect("registered checkout");

    let order = OrderRepository::new(env.db.clone())
        .find_by_id(&response.order_id)
        .await
        .unwrap()
        .expect("order exists");
    assert_eq!(order.user_id, member_id);

    // blank fields were backfilled, existing ones left alone
    let member = UserRepository::new(env.db.clone())
        .find_by_id(&member_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(member.phone, "611111111");
    assert_eq!(member.surname, "Lovelace");
    assert_eq!(member.name, "Grace");
    assert_eq!(member.mailing_addresses.len(), 1);
}

#[tokio::test]
async fn zero_total_cart_is_rejected_before_any_write() {
    let env = TestEnv::new().await;
    let freebie = env.seed_product("Freebie", 0.0).await;

    let result = env
        .checkout()
        .checkout(env.payload(vec![line(&freebie, 3)]))
        .await;
    assert!(result.is_err());

    assert_eq!(
        OrderRepository::new(env.db.clone()).count_all().await.unwrap(),
        0
    );
    assert!(
        UserRepository::new(env.db.clone())
            .find_by_email("shopper@example.com")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(env.gateway.sessions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn client_prices_are_ignored() {
    // quantity comes from the client, price always from the table
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 19.99).await;
    let order = env.place_order(vec![line(&widget, 1)]).await;
    assert!((order.products[0].price - 19.99).abs() < 1e-9);
    assert!((order.total_price - 19.99).abs() < 1e-9);
}

#[tokio::test]
async fn payment_success_is_idempotent() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let order = env.place_order(vec![line(&widget, 2)]).await;
    let order_id = order.id.as_ref().unwrap().to_string();
    let ledger = env.ledger();

    let first = ledger.record_payment_success(&order_id).await.unwrap();
    assert_eq!(first.payment_status, PaymentStatus::Completed);

    // replayed redirect: no second sale recorded
    let replay = ledger.record_payment_success(&order_id).await.unwrap();
    assert_eq!(replay.payment_status, PaymentStatus::Completed);

    let general = GeneralStatisticRepository::new(env.db.clone())
        .get()
        .await
        .unwrap()
        .expect("general statistic");
    assert_eq!(general.total_orders, 1);
    assert!((general.total_sells - 20.0).abs() < 1e-9);

    let product = ProductRepository::new(env.db.clone())
        .find_by_id(&widget.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert!((product.sells - 20.0).abs() < 1e-9);

    let user = UserRepository::new(env.db.clone())
        .find_by_email("shopper@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.orders, 1);
    assert_eq!(user.total_items_in_orders, 2);
    assert!((user.total_spent_in_orders - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn failure_after_success_does_not_cancel() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let order = env.place_order(vec![line(&widget, 1)]).await;
    let order_id = order.id.as_ref().unwrap().to_string();
    let ledger = env.ledger();

    ledger.record_payment_success(&order_id).await.unwrap();
    let after_failure = ledger.record_payment_failure(&order_id).await.unwrap();
    assert_eq!(after_failure.payment_status, PaymentStatus::Completed);
    assert!(!after_failure.status.is_cancelled());
}

#[tokio::test]
async fn payment_failure_cancels_everything() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let order = env.place_order(vec![line(&widget, 1)]).await;
    let order_id = order.id.as_ref().unwrap().to_string();

    let cancelled = env
        .ledger()
        .record_payment_failure(&order_id)
        .await
        .unwrap();
    assert_eq!(cancelled.status, OrderStatus::CancelledByPaymentError);
    assert_eq!(cancelled.payment_status, PaymentStatus::Cancelled);
    assert_eq!(cancelled.shipping_status, ShippingStatus::Cancelled);

    // a late success callback cannot resurrect the order
    let late = env
        .ledger()
        .record_payment_success(&order_id)
        .await
        .unwrap();
    assert_eq!(late.status, OrderStatus::CancelledByPaymentError);
    assert_eq!(late.payment_status, PaymentStatus::Cancelled);
}

#[tokio::test]
async fn mark_shipped_is_idempotent_and_blocked_on_cancelled() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let ledger = env.ledger();

    let order = env.place_order(vec![line(&widget, 1)]).await;
    let order_id = order.id.as_ref().unwrap().to_string();
    ledger.record_payment_success(&order_id).await.unwrap();

    let shipped = ledger.mark_shipped(&order_id).await.unwrap();
    assert_eq!(shipped.shipping_status, ShippingStatus::Completed);
    let again = ledger.mark_shipped(&order_id).await.unwrap();
    assert_eq!(again.shipping_status, ShippingStatus::Completed);

    // cancelled orders cannot ship
    let doomed = env.place_order(vec![line(&widget, 1)]).await;
    let doomed_id = doomed.id.as_ref().unwrap().to_string();
    ledger.record_payment_failure(&doomed_id).await.unwrap();
    let still_cancelled = ledger.mark_shipped(&doomed_id).await.unwrap();
    assert_eq!(still_cancelled.shipping_status, ShippingStatus::Cancelled);
}

#[tokio::test]
async fn expiry_sweep_cancels_only_stale_unconfirmed_orders() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let orders = OrderRepository::new(env.db.clone());
    let ledger = env.ledger();

    let stale = env.place_order(vec![line(&widget, 1)]).await;
    let stale_id = stale.id.as_ref().unwrap().to_string();
    // push creation 11 minutes into the past
    let eleven_minutes_ago = server::utils::time::now_millis() - 11 * 60 * 1000;
    env.db
        .query("UPDATE $oid SET createdAt = $at")
        .bind(("oid", stale.id.clone().unwrap()))
        .bind(("at", eleven_minutes_ago))
        .await
        .unwrap();

    let fresh = env.place_order(vec![line(&widget, 1)]).await;
    let fresh_id = fresh.id.as_ref().unwrap().to_string();

    let expired = ledger.expire_stale_payments().await.unwrap();
    assert_eq!(expired, 1);

    let stale = orders.find_by_id(&stale_id).await.unwrap().unwrap();
    assert_eq!(stale.status, OrderStatus::CancelledByShop);
    assert_eq!(stale.payment_status, PaymentStatus::Cancelled);

    let fresh = orders.find_by_id(&fresh_id).await.unwrap().unwrap();
    assert_eq!(fresh.status, OrderStatus::Pending);
    assert_eq!(fresh.payment_status, PaymentStatus::AwaitingConfirmation);

    // already-paid orders are never swept, however old
    let paid = env.place_order(vec![line(&widget, 1)]).await;
    let paid_id = paid.id.as_ref().unwrap().to_string();
    ledger.record_payment_success(&paid_id).await.unwrap();
    env.db
        .query("UPDATE $oid SET createdAt = $at")
        .bind(("oid", paid.id.clone().unwrap()))
        .bind(("at", eleven_minutes_ago))
        .await
        .unwrap();
    assert_eq!(ledger.expire_stale_payments().await.unwrap(), 0);
}

#[tokio::test]
async fn rebuild_agrees_with_incremental_totals() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let gadget = env.seed_product("Gadget", 7.5).await;
    let ledger = env.ledger();
    let statistics = env.statistics();

    for lines in [
        vec![line(&widget, 2)],
        vec![line(&widget, 1), line(&gadget, 2)],
    ] {
        let order = env.place_order(lines).await;
        let order_id = order.id.as_ref().unwrap().to_string();
        ledger.record_payment_success(&order_id).await.unwrap();
    }
    statistics
        .record_view(widget.id.as_ref().unwrap(), None)
        .await
        .unwrap();

    let before = GeneralStatisticRepository::new(env.db.clone())
        .get()
        .await
        .unwrap()
        .unwrap();

    statistics.rebuild_all().await.unwrap();

    let after = GeneralStatisticRepository::new(env.db.clone())
        .get()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.total_orders, before.total_orders);
    assert!((after.total_sells - before.total_sells).abs() < 0.005);
    assert_eq!(after.total_views, before.total_views);
    assert_eq!(after.total_products, 2);

    // product counters survive the rebuild unchanged
    let rebuilt_widget = ProductRepository::new(env.db.clone())
        .find_by_id(&widget.id.as_ref().unwrap().to_string())
        .await
        .unwrap()
        .unwrap();
    assert!((rebuilt_widget.sells - 30.0).abs() < 0.005);
    assert_eq!(rebuilt_widget.views, 1);

    // and user lifetime counters are recomputed to the same values
    let user = UserRepository::new(env.db.clone())
        .find_by_email("shopper@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.orders, 2);
    assert_eq!(user.total_items_in_orders, 5);
    assert!((user.total_spent_in_orders - 45.0).abs() < 0.005);
}

#[tokio::test]
async fn api_created_product_accumulates_repeat_sales_and_views() {
    let env = TestEnv::new().await;

    // creation through the API brings the paired statistic document along
    let Json(widget) = products_api::create(
        State(env.state()),
        Json(ProductCreate {
            title: LocalizedText::new("Widget", "Widget"),
            short_description: LocalizedText::new("desc", "desc"),
            large_description: LocalizedText::default(),
            price: 10.0,
            categories: vec![],
            visible: Some(true),
            stock: 10,
            sku: None,
        }),
    )
    .await
    .expect("create product");
    let widget_id = widget.id.clone().expect("product id");

    let stats = ProductStatisticRepository::new(env.db.clone());
    assert!(stats.find_by_product(&widget_id).await.unwrap().is_some());

    let ledger = env.ledger();
    for _ in 0..2 {
        let order = env.place_order(vec![line(&widget, 1)]).await;
        ledger
            .record_payment_success(&order.id.as_ref().unwrap().to_string())
            .await
            .unwrap();
    }
    env.statistics().record_view(&widget_id, None).await.unwrap();

    let product = ProductRepository::new(env.db.clone())
        .find_by_id(&widget_id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert!((product.sells - 20.0).abs() < 1e-9);
    assert_eq!(product.views, 1);

    let stat = stats.find_by_product(&widget_id).await.unwrap().unwrap();
    let today = server::utils::time::day_key(server::utils::time::now_millis());
    let daily = stat
        .daily_statistics
        .iter()
        .find(|e| e.period_key == today)
        .expect("today's bucket");
    assert_eq!(daily.orders, 2);
    assert!((daily.sells - 20.0).abs() < 1e-9);
    assert_eq!(daily.views, 1);
}

#[tokio::test]
async fn rebuild_emits_one_entry_per_period_since_epoch() {
    let env = TestEnv::new().await;
    let widget = env.seed_product("Widget", 10.0).await;
    let order = env.place_order(vec![line(&widget, 1)]).await;
    env.ledger()
        .record_payment_success(&order.id.as_ref().unwrap().to_string())
        .await
        .unwrap();

    env.statistics().rebuild_all().await.unwrap();

    let epoch = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    let today = Utc::now().date_naive();
    let expected_days = (today - epoch).num_days() + 1;
    let now = server::utils::time::now_millis();

    let stat = ProductStatisticRepository::new(env.db.clone())
        .find_by_product(widget.id.as_ref().unwrap())
        .await
        .unwrap()
        .expect("product statistic");
    assert_eq!(stat.daily_statistics.len() as i64, expected_days);
    let last = stat.daily_statistics.last().unwrap();
    assert_eq!(last.period_key, server::utils::time::day_key(now));
    assert_eq!(last.orders, 1);
    // every earlier day is present as a zero entry
    assert!(
        stat.daily_statistics
            .iter()
            .rev()
            .skip(1)
            .all(|e| e.orders == 0 && e.views == 0 && e.sells == 0.0)
    );

    let general = GeneralStatisticRepository::new(env.db.clone())
        .get()
        .await
        .unwrap()
        .unwrap();
    assert_eq!(general.daily_statistics.len() as i64, expected_days);
    let months = &general.monthly_statistics;
    assert!(months.len() >= 2);
    assert_eq!(
        months.last().unwrap().period_key,
        server::utils::time::month_key(now)
    );
    assert_eq!(months.last().unwrap().orders, 1);
}
