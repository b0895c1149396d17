//! # cs-infra
//!
//! Storage and configuration implementations of the `cs-core` ports.

pub mod config;
pub mod db;
pub mod fs;
pub mod time;

pub use db::repositories::DieselHistoryRepository;
pub use time::SystemClock;
