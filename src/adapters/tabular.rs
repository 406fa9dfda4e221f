use crate::domain::model::ProjectRecord;
use crate::utils::error::{DashboardError, Result};
use calamine::{Data, Reader};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use std::io::Read;
use std::path::Path;

pub const DEPARTMENT_COLUMN: &str = "Departamento";
pub const YEAR_COLUMN: &str = "Año de publicación";

const WORKBOOK_EXTENSIONS: [&str; 4] = ["xlsx", "xlsm", "xls", "ods"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];

/// Spreadsheet files go through the workbook reader, anything else is read as CSV.
pub fn read_projects(path: &Path) -> Result<Vec<ProjectRecord>> {
    let source_path = path.display().to_string();
    let is_workbook = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| WORKBOOK_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false);

    if is_workbook {
        read_workbook(path, &source_path)
    } else {
        let file = std::fs::File::open(path)?;
        parse_projects(file, &source_path)
    }
}

/// First sheet of the workbook; its first non-empty row is the header.
pub fn read_workbook(path: &Path, source_path: &str) -> Result<Vec<ProjectRecord>> {
    let spreadsheet_error = |message: String| DashboardError::SpreadsheetError {
        source_path: source_path.to_string(),
        message,
    };

    let mut workbook =
        calamine::open_workbook_auto(path).map_err(|e| spreadsheet_error(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| spreadsheet_error("workbook has no sheets".to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>());
    let headers = rows.next().unwrap_or_default();

    collect_records(&headers, rows.map(Ok), source_path)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(text) => text.clone(),
        Data::Int(value) => value.to_string(),
        Data::Float(value) => value.to_string(),
        // 日期儲存格轉成文字後交給 parse_year
        Data::DateTime(value) => value
            .as_datetime()
            .map(|dt| dt.format(DATETIME_FORMATS[0]).to_string())
            .unwrap_or_else(|| value.as_f64().to_string()),
        other => other.to_string(),
    }
}

/// Reads a CSV project table (header row required). The delimiter is `,` or
/// `;`, whichever the header line uses more.
pub fn parse_projects<R: Read>(mut input: R, source_path: &str) -> Result<Vec<ProjectRecord>> {
    let mut content = Vec::new();
    input.read_to_end(&mut content)?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(&content))
        .flexible(true)
        .from_reader(content.as_slice());

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let rows = reader.records().map(|row| {
        row.map(|r| r.iter().map(str::to_string).collect::<Vec<_>>())
            .map_err(DashboardError::from)
    });

    collect_records(&headers, rows, source_path)
}

fn sniff_delimiter(content: &[u8]) -> u8 {
    let header = content.split(|b| *b == b'\n').next().unwrap_or_default();
    let count = |delimiter: u8| header.iter().filter(|b| **b == delimiter).count();
    if count(b';') > count(b',') {
        b';'
    } else {
        b','
    }
}

/// Keeps only the department and publication-year columns of each row.
fn collect_records<I>(headers: &[String], rows: I, source_path: &str) -> Result<Vec<ProjectRecord>>
where
    I: IntoIterator<Item = Result<Vec<String>>>,
{
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let department_idx =
        column(DEPARTMENT_COLUMN).ok_or_else(|| DashboardError::MissingColumnError {
            column: DEPARTMENT_COLUMN.to_string(),
            source_path: source_path.to_string(),
        })?;
    let year_idx = column(YEAR_COLUMN);
    if year_idx.is_none() {
        tracing::warn!(
            "⚠️ Column '{}' not found in {}; no publication years available",
            YEAR_COLUMN,
            source_path
        );
    }

    let mut records = Vec::new();
    for (line, row) in rows.into_iter().enumerate() {
        let row = row?;
        let department = row.get(department_idx).cloned().unwrap_or_default();

        let raw_year = year_idx
            .and_then(|idx| row.get(idx))
            .map(String::as_str)
            .unwrap_or_default();
        let publication_year = parse_year(raw_year);
        if publication_year.is_none() && !raw_year.trim().is_empty() {
            // 第 1 列是標題，資料從第 2 列開始
            tracing::warn!(
                "⚠️ Unreadable publication year '{}' on row {}, treated as missing",
                raw_year,
                line + 2
            );
        }

        records.push(ProjectRecord {
            department,
            publication_year,
        });
    }

    Ok(records)
}

/// Year from an integer, a spreadsheet float (`2020.0`) or a date cell.
pub fn parse_year(raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(year) = value.parse::<i32>() {
        return Some(year);
    }

    if let Ok(number) = value.parse::<f64>() {
        if number.is_finite()
            && number.fract() == 0.0
            && number >= f64::from(i32::MIN)
            && number <= f64::from(i32::MAX)
        {
            return Some(number as i32);
        }
        return None;
    }

    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(dt.year());
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .map(|d| d.year())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_year_variants() {
        assert_eq!(parse_year("2020"), Some(2020));
        assert_eq!(parse_year(" 2019 "), Some(2019));
        assert_eq!(parse_year("2021.0"), Some(2021));
        assert_eq!(parse_year("2018-07-15"), Some(2018));
        assert_eq!(parse_year("2018-07-15 00:00:00"), Some(2018));
        assert_eq!(parse_year("15/07/2017"), Some(2017));
        assert_eq!(parse_year(""), None);
        assert_eq!(parse_year("NaN"), None);
        assert_eq!(parse_year("2020.5"), None);
        assert_eq!(parse_year("pendiente"), None);
    }

    #[test]
    fn test_parse_projects_keeps_department_and_year() {
        let data = "Proyecto,Departamento,Capacidad (MW),Año de publicación\n\
                    Jepírachi, La Guajira ,19.5,2004\n\
                    Windpeshi,La Guajira,200,2021.0\n\
                    Beta,Atlántico,10,\n";

        let records = parse_projects(data.as_bytes(), "proyectos.csv").unwrap();

        assert_eq!(records.len(), 3);
        // 名稱不在載入時正規化
        assert_eq!(records[0].department, " La Guajira ");
        assert_eq!(records[0].publication_year, Some(2004));
        assert_eq!(records[1].publication_year, Some(2021));
        assert_eq!(records[2].department, "Atlántico");
        assert_eq!(records[2].publication_year, None);
    }

    #[test]
    fn test_parse_projects_without_year_column() {
        let data = "Departamento\nCesar\nChocó\n";

        let records = parse_projects(data.as_bytes(), "proyectos.csv").unwrap();

        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.publication_year.is_none()));
    }

    #[test]
    fn test_parse_projects_missing_department_column() {
        let data = "Proyecto,Año de publicación\nX,2020\n";

        let err = parse_projects(data.as_bytes(), "proyectos.csv").unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumnError { .. }));
    }

    #[test]
    fn test_parse_projects_short_rows() {
        let data = "Proyecto,Departamento,Año de publicación\nX,Cesar\nY\n";

        let records = parse_projects(data.as_bytes(), "proyectos.csv").unwrap();

        assert_eq!(records[0].department, "Cesar");
        assert_eq!(records[0].publication_year, None);
        assert_eq!(records[1].department, "");
    }

    #[test]
    fn test_parse_projects_semicolon_delimited() {
        let data = "Proyecto;Departamento;Capacidad (MW);Año de publicación\n\
                    Jepírachi;La Guajira;19,5;2004\n\
                    Beta;Atlántico;10;2021\n";

        let records = parse_projects(data.as_bytes(), "proyectos.csv").unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].department, "La Guajira");
        assert_eq!(records[0].publication_year, Some(2004));
        assert_eq!(records[1].publication_year, Some(2021));
    }

    #[test]
    fn test_sniff_delimiter() {
        assert_eq!(sniff_delimiter(b"a;b;c\n1,5;2;3\n"), b';');
        assert_eq!(sniff_delimiter(b"a,b,c\n1;2;3\n"), b',');
        assert_eq!(sniff_delimiter(b"Departamento\nCesar\n"), b',');
        assert_eq!(sniff_delimiter(b""), b',');
    }

    // 以最小的 OOXML 結構產生活頁簿：數字寫成數值儲存格，其餘寫成行內字串
    fn write_workbook(path: &Path, rows: &[&[&str]]) {
        use std::io::Write;
        use zip::write::{SimpleFileOptions, ZipWriter};

        let mut sheet = String::from(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
        );
        for (r, row) in rows.iter().enumerate() {
            sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                let cell = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                if value.is_empty() {
                    continue;
                }
                if value.parse::<f64>().is_ok() {
                    sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, cell, value));
                } else {
                    sheet.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        cell, value
                    ));
                }
            }
            sheet.push_str("</row>");
        }
        sheet.push_str("</sheetData></worksheet>");

        let parts = [
            (
                "[Content_Types].xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
            ),
            (
                "_rels/.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
            ),
            (
                "xl/workbook.xml",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Proyectos" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
            ),
            (
                "xl/_rels/workbook.xml.rels",
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
            ),
            ("xl/worksheets/sheet1.xml", sheet),
        ];

        let mut zip = ZipWriter::new(std::fs::File::create(path).unwrap());
        for (name, content) in parts {
            zip.start_file(name, SimpleFileOptions::default()).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    #[test]
    fn test_read_projects_from_workbook() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("proyecto_colombia.xlsx");
        write_workbook(
            &path,
            &[
                &["Proyecto", "Departamento", "Capacidad (MW)", "Año de publicación"],
                &["Jepírachi", "La Guajira", "19.5", "2004"],
                &["Windpeshi", "LA GUAJIRA", "205", "2021"],
                &["Beta", "Atlántico", "10", ""],
                &["Gamma", "Cesar", "8", "pendiente"],
            ],
        );

        let records = read_projects(&path).unwrap();

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].department, "La Guajira");
        assert_eq!(records[0].publication_year, Some(2004));
        assert_eq!(records[1].department, "LA GUAJIRA");
        assert_eq!(records[1].publication_year, Some(2021));
        assert_eq!(records[2].publication_year, None);
        assert_eq!(records[3].department, "Cesar");
        assert_eq!(records[3].publication_year, None);
    }

    #[test]
    fn test_workbook_without_department_column() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("proyectos.xlsx");
        write_workbook(&path, &[&["Proyecto", "Año de publicación"], &["X", "2020"]]);

        let err = read_projects(&path).unwrap_err();
        assert!(matches!(err, DashboardError::MissingColumnError { .. }));
    }

    #[test]
    fn test_unreadable_workbook_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("proyectos.xlsx");
        std::fs::write(&path, "Departamento\nCesar\n").unwrap();

        let err = read_projects(&path).unwrap_err();
        assert!(matches!(err, DashboardError::SpreadsheetError { .. }));
    }
}
