//! External service integrations
//!
//! Outbound dependencies live behind traits so request handlers and
//! background tasks never talk to the network directly.

pub mod notifier;
pub mod payment;

pub use notifier::{EmailNotifier, NoopNotifier, Notifier};
pub use payment::{CheckoutSession, PaymentGateway, SessionLineItem, StripeGateway};
