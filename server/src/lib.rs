//! E-commerce backend
//!
//! Order/checkout lifecycle and statistics aggregation over an embedded
//! SurrealDB store.
//!
//! # Modules
//!
//! - [`core`] - configuration, state, HTTP server, background tasks
//! - [`db`] - models, repositories and startup seeding
//! - [`checkout`] - cart pricing, order creation and payment sessions
//! - [`orders`] - order lifecycle transitions and side effects
//! - [`statistics`] - incremental bumps and nightly rebuilds
//! - [`scheduler`] - periodic maintenance tasks
//! - [`services`] - payment gateway and email integrations
//! - [`api`] - HTTP routes

pub mod api;
pub mod checkout;
pub mod core;
pub mod db;
pub mod orders;
pub mod scheduler;
pub mod services;
pub mod statistics;
pub mod utils;

pub use core::{Config, Server, ServerState};
