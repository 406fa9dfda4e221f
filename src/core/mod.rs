pub mod engine;
pub mod loader;
pub mod pipeline;
pub mod reconcile;
pub mod summary;

pub use crate::domain::model::{DashboardPage, DashboardReport, DataBundle};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Renderer, Storage};
pub use crate::utils::error::Result;
