//! Estimates exact-input swaps ("out given in") on a concentrated-liquidity
//! pool that cross one or more price ranges.
//!
//! [`swap::accumulate`] walks the ranges in order and returns the total token
//! out and the total fee growth per unit of liquidity. [`fixtures`] carries
//! reference cases and [`validation`] checks estimates against them.

pub mod config;
pub mod decimal;
pub mod errors;
pub mod fixtures;
pub mod models;
pub mod report;
pub mod swap;
pub mod utils;
pub mod validation;
