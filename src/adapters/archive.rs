use crate::utils::error::Result;
use std::io::{Cursor, Write};
use zip::write::{SimpleFileOptions, ZipWriter};

pub const ARCHIVE_NAME: &str = "dashboard.zip";

/// Packs the rendered artifacts into one ZIP, in the given order.
pub fn bundle(files: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();

    for (name, data) in files {
        tracing::debug!("Adding {} ({} bytes) to archive", name, data.len());
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}
