// Adapters layer: concrete readers and writers for files on disk and the rendered report.

pub mod archive;
pub mod geojson;
pub mod render;
pub mod storage;
pub mod tabular;
