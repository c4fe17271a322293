//! Utility module - shared helpers and types
//!
//! # Contents
//!
//! - [`AppError`] / [`AppResult`] - application error type and handler result
//! - [`money`] - 2-decimal rounding helpers for monetary amounts
//! - [`time`] - period-key and timestamp helpers for statistics

pub mod error;
pub mod logger;
pub mod money;
pub mod time;

pub use error::{AppError, AppResult, ErrorBody};
