use serde::Serialize;

/// Longitude/latitude pair (WGS84 after loading).
pub type Position = [f64; 2];

/// A closed ring; the first ring of a polygon is the exterior, the rest are holes.
pub type Ring = Vec<Position>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    pub fn polygons(&self) -> &[Vec<Ring>] {
        match self {
            Geometry::Polygon(rings) => std::slice::from_ref(rings),
            Geometry::MultiPolygon(polygons) => polygons.as_slice(),
        }
    }

    pub fn positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.polygons()
            .iter()
            .flat_map(|rings| rings.iter())
            .flat_map(|ring| ring.iter())
    }

    pub fn map_positions(self, f: impl Fn(Position) -> Position) -> Self {
        let map_rings = |rings: Vec<Ring>| -> Vec<Ring> {
            rings
                .into_iter()
                .map(|ring| ring.into_iter().map(&f).collect())
                .collect()
        };
        match self {
            Geometry::Polygon(rings) => Geometry::Polygon(map_rings(rings)),
            Geometry::MultiPolygon(polygons) => {
                Geometry::MultiPolygon(polygons.into_iter().map(map_rings).collect())
            }
        }
    }
}

/// Administrative department with its boundary. Identity is the normalized name.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub name: String,
    pub geometry: Geometry,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectRecord {
    pub department: String,
    pub publication_year: Option<i32>,
}

impl ProjectRecord {
    pub fn new(department: impl Into<String>, publication_year: Option<i32>) -> Self {
        Self {
            department: department.into(),
            publication_year,
        }
    }
}

/// Result of the one-shot load; read-only for the rest of the run.
#[derive(Debug, Clone, Default)]
pub struct DataBundle {
    pub regions: Vec<Region>,
    pub records: Vec<ProjectRecord>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegionAggregate<'a> {
    pub region: &'a Region,
    pub project_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearAggregate {
    pub year: i32,
    pub project_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnmatchedDepartment {
    pub department: String,
    pub project_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopRegion {
    pub name: String,
    pub project_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub total_projects: usize,
    pub regions_with_projects: usize,
    pub year_range: Option<(i32, i32)>,
    pub top_region: Option<TopRegion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableRow {
    #[serde(rename = "Departamento")]
    pub department: String,
    #[serde(rename = "Cantidad_Proyectos")]
    pub project_count: usize,
}

/// Everything the render layer consumes for a successful run.
#[derive(Debug, Clone)]
pub struct DashboardReport<'a> {
    pub regions: Vec<RegionAggregate<'a>>,
    pub years: Vec<YearAggregate>,
    pub summary: SummaryMetrics,
    pub table: Vec<TableRow>,
    pub unmatched: Vec<UnmatchedDepartment>,
}

/// What gets rendered: the dashboard, or the diagnostic panel when loading failed.
#[derive(Debug, Clone)]
pub enum DashboardPage<'a> {
    Ready(DashboardReport<'a>),
    Unavailable(crate::utils::error::DataUnavailable),
}
