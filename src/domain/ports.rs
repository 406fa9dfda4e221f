use crate::domain::model::{DashboardPage, DashboardReport, DataBundle};
use crate::utils::error::{DataUnavailable, Result};

pub trait Storage {
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
    /// Location of `path` as reported to the user.
    fn display_path(&self, path: &str) -> String;
}

pub trait ConfigProvider {
    fn regions_path(&self) -> &str;
    fn projects_path(&self) -> &str;
    fn region_name_fields(&self) -> &[String];
    fn output_path(&self) -> &str;
    fn output_formats(&self) -> &[String];
    fn archive(&self) -> bool;
}

/// One output artifact of a run (HTML page, CSV table, JSON summary).
pub trait Renderer {
    fn file_name(&self) -> &str;
    /// `None` when the artifact has nothing to show for this page.
    fn render(&self, page: &DashboardPage<'_>) -> Result<Option<Vec<u8>>>;
}

pub trait Pipeline {
    fn extract(&self) -> std::result::Result<DataBundle, DataUnavailable>;
    fn transform<'a>(&self, bundle: &'a DataBundle) -> DashboardReport<'a>;
    fn load(&self, page: &DashboardPage<'_>) -> Result<Vec<String>>;
}
