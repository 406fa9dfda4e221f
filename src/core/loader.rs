use crate::adapters::{geojson, tabular};
use crate::domain::model::DataBundle;
use crate::utils::error::{DataUnavailable, DashboardError};
use std::path::{Path, PathBuf};

/// Reads the boundary collection and the project table once. Any failure is
/// reported as [`DataUnavailable`]; nothing lower-level escapes.
#[derive(Debug, Clone)]
pub struct Loader {
    regions_path: PathBuf,
    projects_path: PathBuf,
    region_name_fields: Vec<String>,
}

impl Loader {
    pub fn new(
        regions_path: impl Into<PathBuf>,
        projects_path: impl Into<PathBuf>,
        region_name_fields: Vec<String>,
    ) -> Self {
        Self {
            regions_path: regions_path.into(),
            projects_path: projects_path.into(),
            region_name_fields,
        }
    }

    pub fn regions_path(&self) -> &Path {
        &self.regions_path
    }

    pub fn projects_path(&self) -> &Path {
        &self.projects_path
    }

    pub fn load(&self) -> Result<DataBundle, DataUnavailable> {
        self.try_load().map_err(|e| {
            tracing::error!("❌ Error loading data: {}", e);
            DataUnavailable {
                message: e.to_string(),
                regions_path: self.regions_path.display().to_string(),
                projects_path: self.projects_path.display().to_string(),
            }
        })
    }

    fn try_load(&self) -> Result<DataBundle, DashboardError> {
        tracing::info!("🗺️ Loading boundaries from: {}", self.regions_path.display());
        let regions = geojson::read_regions(&self.regions_path, &self.region_name_fields)?;
        tracing::info!("✅ Boundaries loaded. Regions: {}", regions.len());

        tracing::info!("📄 Loading projects from: {}", self.projects_path.display());
        let records = tabular::read_projects(&self.projects_path)?;
        tracing::info!("✅ Projects loaded. Records: {}", records.len());

        Ok(DataBundle { regions, records })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    const GEOJSON: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "properties": {"NOMBRE_DPT": "LA GUAJIRA"},
             "geometry": {"type": "Polygon", "coordinates": [[[-73.0, 11.0], [-71.0, 11.0], [-71.0, 12.5], [-73.0, 11.0]]]}}
        ]
    }"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    fn default_fields() -> Vec<String> {
        vec!["NOMBRE_DPT".to_string(), "DPTO_CNMBR".to_string()]
    }

    #[test]
    fn test_load_success() {
        let dir = TempDir::new().unwrap();
        let regions = write(&dir, "deptos.geo.json", GEOJSON);
        let projects = write(
            &dir,
            "proyectos.csv",
            "Nombre,Departamento,Año de publicación\nJepírachi,La Guajira,2004\nBeta,La Guajira,\n",
        );

        let bundle = Loader::new(regions, projects, default_fields()).load().unwrap();

        assert_eq!(bundle.regions.len(), 1);
        assert_eq!(bundle.records.len(), 2);
        assert_eq!(bundle.records[0].publication_year, Some(2004));
        assert_eq!(bundle.records[1].publication_year, None);
    }

    #[test]
    fn test_missing_file_yields_unavailable() {
        let dir = TempDir::new().unwrap();
        let projects = write(&dir, "proyectos.csv", "Departamento\nCesar\n");
        let missing = dir.path().join("nope.geo.json");

        let err = Loader::new(&missing, &projects, default_fields())
            .load()
            .unwrap_err();

        assert_eq!(err.regions_path, missing.display().to_string());
        assert_eq!(err.projects_path, projects.display().to_string());
        assert!(!err.message.is_empty());
    }

    #[test]
    fn test_corrupt_boundaries_yield_unavailable() {
        let dir = TempDir::new().unwrap();
        let regions = write(&dir, "deptos.geo.json", "{ not json");
        let projects = write(&dir, "proyectos.csv", "Departamento\nCesar\n");

        assert!(Loader::new(regions, projects, default_fields()).load().is_err());
    }

    #[test]
    fn test_missing_department_column_yields_unavailable() {
        let dir = TempDir::new().unwrap();
        let regions = write(&dir, "deptos.geo.json", GEOJSON);
        let projects = write(&dir, "proyectos.csv", "Nombre,Año de publicación\nX,2020\n");

        let err = Loader::new(regions, projects, default_fields())
            .load()
            .unwrap_err();

        assert!(err.message.contains("Departamento"));
    }
}
