pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;
pub use crate::config::DashboardConfig;

pub use crate::adapters::storage::LocalStorage;
pub use crate::core::reconcile::{aggregate_by_region, aggregate_by_year, normalize};
pub use crate::core::{engine::DashboardEngine, loader::Loader, pipeline::DashboardPipeline};
pub use crate::utils::error::{DashboardError, DataUnavailable, Result};
