use crate::config::toml_config::DashboardConfig;
use crate::utils::error::Result;
use clap::Parser;

#[derive(Debug, Clone, Parser)]
#[command(name = "wind-dashboard")]
#[command(about = "Wind-energy projects per Colombian department: map, yearly series and summary")]
pub struct CliConfig {
    /// Optional TOML configuration file; flags below override its values
    #[arg(short, long)]
    pub config: Option<String>,

    /// GeoJSON FeatureCollection with the department boundaries
    #[arg(long)]
    pub regions: Option<String>,

    /// Project spreadsheet (.xlsx, or CSV) with a "Departamento" column
    #[arg(long)]
    pub projects: Option<String>,

    #[arg(long)]
    pub output_path: Option<String>,

    /// Output formats to write (html, csv, json)
    #[arg(long, value_delimiter = ',')]
    pub formats: Vec<String>,

    /// Also bundle every output into dashboard.zip
    #[arg(long)]
    pub archive: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per phase")]
    pub monitor: bool,
}

impl CliConfig {
    /// Builds the effective configuration: defaults, then the TOML file, then flags.
    pub fn resolve(&self) -> Result<DashboardConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("📁 Loading configuration from: {}", path);
                DashboardConfig::from_file(path)?
            }
            None => DashboardConfig::default(),
        };

        if let Some(regions) = &self.regions {
            config.sources.regions_path = regions.clone();
        }
        if let Some(projects) = &self.projects {
            config.sources.projects_path = projects.clone();
        }
        if let Some(output_path) = &self.output_path {
            config.output.output_path = output_path.clone();
        }
        if !self.formats.is_empty() {
            config.output.formats = self.formats.clone();
        }
        if self.archive {
            config.output.archive = true;
        }
        if self.monitor {
            config.monitoring.enabled = true;
        }

        Ok(config)
    }
}
