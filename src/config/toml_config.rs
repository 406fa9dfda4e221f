use crate::adapters::render::{DEFAULT_TITLE, SUPPORTED_FORMATS};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_REGIONS_PATH: &str = "datos/departamentos/Colombia.geo.json";
pub const DEFAULT_PROJECTS_PATH: &str = "datos/proyectos/proyecto_colombia.xlsx";
pub const DEFAULT_OUTPUT_PATH: &str = "./output";

/// Every section is optional; an empty file gives the built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    pub regions_path: String,
    pub projects_path: String,
    /// Feature properties tried in order for the department name.
    pub region_name_fields: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            regions_path: DEFAULT_REGIONS_PATH.to_string(),
            projects_path: DEFAULT_PROJECTS_PATH.to_string(),
            region_name_fields: vec!["NOMBRE_DPT".to_string(), "DPTO_CNMBR".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_path: String,
    pub formats: Vec<String>,
    pub archive: bool,
    pub title: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_path: DEFAULT_OUTPUT_PATH.to_string(),
            formats: SUPPORTED_FORMATS.iter().map(|f| f.to_string()).collect(),
            archive: false,
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitoringConfig {
    pub enabled: bool,
}

impl DashboardConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashboardError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| DashboardError::ConfigValidationError {
            field: "environment".to_string(),
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.enabled
    }

    pub fn title(&self) -> &str {
        &self.output.title
    }
}

impl ConfigProvider for DashboardConfig {
    fn regions_path(&self) -> &str {
        &self.sources.regions_path
    }

    fn projects_path(&self) -> &str {
        &self.sources.projects_path
    }

    fn region_name_fields(&self) -> &[String] {
        &self.sources.region_name_fields
    }

    fn output_path(&self) -> &str {
        &self.output.output_path
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn archive(&self) -> bool {
        self.output.archive
    }
}

impl Validate for DashboardConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("sources.regions_path", &self.sources.regions_path)?;
        validation::validate_file_extension(
            "sources.regions_path",
            &self.sources.regions_path,
            &["json", "geojson"],
        )?;
        validation::validate_path("sources.projects_path", &self.sources.projects_path)?;
        validation::validate_file_extension(
            "sources.projects_path",
            &self.sources.projects_path,
            &["xlsx", "xlsm", "xls", "ods", "csv"],
        )?;

        if self.sources.region_name_fields.is_empty() {
            return Err(DashboardError::ConfigValidationError {
                field: "sources.region_name_fields".to_string(),
                message: "at least one property name is required".to_string(),
            });
        }
        for field in &self.sources.region_name_fields {
            validation::validate_non_empty_string("sources.region_name_fields", field)?;
        }

        validation::validate_path("output.output_path", &self.output.output_path)?;
        validation::validate_allowed_values("output.formats", &self.output.formats, &SUPPORTED_FORMATS)?;
        if self.output.formats.is_empty() {
            return Err(DashboardError::ConfigValidationError {
                field: "output.formats".to_string(),
                message: "no output format selected".to_string(),
            });
        }

        Ok(())
    }
}
