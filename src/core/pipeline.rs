use crate::adapters::archive::{self, ARCHIVE_NAME};
use crate::adapters::render::renderers_for;
use crate::core::loader::Loader;
use crate::core::reconcile::{aggregate_by_region, aggregate_by_year, unmatched_departments};
use crate::core::summary::{region_table, summarize};
use crate::domain::model::{DashboardPage, DashboardReport, DataBundle};
use crate::domain::ports::{ConfigProvider, Pipeline, Renderer, Storage};
use crate::utils::error::{DataUnavailable, Result};

pub struct DashboardPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    renderers: Vec<Box<dyn Renderer>>,
}

impl<S: Storage, C: ConfigProvider> DashboardPipeline<S, C> {
    pub fn new(storage: S, config: C, title: &str, generated_at: &str) -> Self {
        let renderers = renderers_for(config.output_formats(), title, generated_at);
        Self {
            storage,
            config,
            renderers,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for DashboardPipeline<S, C> {
    fn extract(&self) -> std::result::Result<DataBundle, DataUnavailable> {
        Loader::new(
            self.config.regions_path(),
            self.config.projects_path(),
            self.config.region_name_fields().to_vec(),
        )
        .load()
    }

    fn transform<'a>(&self, bundle: &'a DataBundle) -> DashboardReport<'a> {
        let regions = aggregate_by_region(&bundle.regions, &bundle.records);
        let years = aggregate_by_year(&bundle.records);
        let unmatched = unmatched_departments(&bundle.regions, &bundle.records);

        for u in &unmatched {
            tracing::warn!(
                "⚠️ Department '{}' ({} project(s)) matches no region",
                u.department,
                u.project_count
            );
        }

        let summary = summarize(&bundle.records, &regions, &years);
        tracing::debug!("Summary: {:?}", summary);

        DashboardReport {
            table: region_table(&regions),
            regions,
            years,
            summary,
            unmatched,
        }
    }

    fn load(&self, page: &DashboardPage<'_>) -> Result<Vec<String>> {
        let mut artifacts: Vec<(String, Vec<u8>)> = Vec::new();
        for renderer in &self.renderers {
            match renderer.render(page)? {
                Some(data) => artifacts.push((renderer.file_name().to_string(), data)),
                None => tracing::debug!("Skipping {} for this page", renderer.file_name()),
            }
        }

        let mut written = Vec::with_capacity(artifacts.len() + 1);
        for (name, data) in &artifacts {
            tracing::debug!("Writing {} ({} bytes)", name, data.len());
            self.storage.write_file(name, data)?;
            written.push(self.storage.display_path(name));
        }

        if self.config.archive() && !artifacts.is_empty() {
            let zip_data = archive::bundle(&artifacts)?;
            tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
            self.storage.write_file(ARCHIVE_NAME, &zip_data)?;
            written.push(self.storage.display_path(ARCHIVE_NAME));
        }

        Ok(written)
    }
}
