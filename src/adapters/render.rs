use crate::adapters::tabular::{DEPARTMENT_COLUMN, YEAR_COLUMN};
use crate::core::reconcile::normalize;
use crate::core::summary::format_year_range;
use crate::domain::model::{DashboardPage, DashboardReport};
use crate::domain::ports::Renderer;
use crate::utils::error::{DataUnavailable, DashboardError, Result};
use serde_json::{json, Value};

pub const DEFAULT_TITLE: &str = "Análisis de Proyectos Eólicos en Colombia";
pub const SUPPORTED_FORMATS: [&str; 3] = ["html", "csv", "json"];

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Renderers for the requested output formats, in a fixed order.
pub fn renderers_for(formats: &[String], title: &str, generated_at: &str) -> Vec<Box<dyn Renderer>> {
    let wants = |f: &str| formats.iter().any(|x| x == f);
    let mut renderers: Vec<Box<dyn Renderer>> = Vec::new();

    if wants("html") {
        renderers.push(Box::new(HtmlRenderer::new(title, generated_at)));
    }
    if wants("csv") {
        renderers.push(Box::new(RegionCsvRenderer));
        renderers.push(Box::new(YearCsvRenderer));
    }
    if wants("json") {
        renderers.push(Box::new(JsonSummaryRenderer));
    }
    renderers
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// 內嵌於 <script> 的 JSON，避免 "</script>" 提前結束區塊
fn script_json(value: &Value) -> Result<String> {
    Ok(serde_json::to_string(value)?.replace("</", "<\\/"))
}

pub struct HtmlRenderer {
    title: String,
    generated_at: String,
}

impl HtmlRenderer {
    pub fn new(title: &str, generated_at: &str) -> Self {
        Self {
            title: title.to_string(),
            generated_at: generated_at.to_string(),
        }
    }

    fn choropleth(report: &DashboardReport<'_>) -> Value {
        let features: Vec<Value> = report
            .regions
            .iter()
            .enumerate()
            .map(|(idx, a)| {
                json!({
                    "type": "Feature",
                    "id": idx.to_string(),
                    "properties": { "name": normalize(&a.region.name) },
                    "geometry": a.region.geometry,
                })
            })
            .collect();

        let locations: Vec<String> = (0..report.regions.len()).map(|i| i.to_string()).collect();
        let counts: Vec<usize> = report.regions.iter().map(|a| a.project_count).collect();
        let names: Vec<String> = report.regions.iter().map(|a| normalize(&a.region.name)).collect();

        json!({
            "data": [{
                "type": "choropleth",
                "geojson": { "type": "FeatureCollection", "features": features },
                "locations": locations,
                "z": counts,
                "text": names,
                "hovertemplate": "<b>%{text}</b><br>Número de Proyectos: %{z}<extra></extra>",
                "colorscale": "YlOrRd",
                "reversescale": true,
                "marker": { "line": { "width": 0.5, "color": "#555" } },
                "colorbar": { "title": { "text": "Número de Proyectos" } }
            }],
            "layout": {
                "title": { "text": "Distribución de Proyectos Eólicos por Departamento" },
                "geo": { "fitbounds": "locations", "visible": false },
                "height": 600,
                "margin": { "r": 0, "t": 40, "l": 0, "b": 0 }
            }
        })
    }

    fn year_series(report: &DashboardReport<'_>) -> Value {
        let years: Vec<i32> = report.years.iter().map(|y| y.year).collect();
        let counts: Vec<usize> = report.years.iter().map(|y| y.project_count).collect();

        json!({
            "data": [{
                "type": "scatter",
                "mode": "lines+markers",
                "name": "Proyectos",
                "x": years,
                "y": counts,
                "line": { "color": "#2E86AB", "width": 3 },
                "marker": { "size": 8, "color": "#A23B72" }
            }],
            "layout": {
                "title": { "text": "Evolución Temporal de Proyectos Eólicos" },
                "xaxis": { "title": { "text": "Año de Publicación" }, "dtick": 1 },
                "yaxis": { "title": { "text": "Número de Proyectos" } },
                "hovermode": "x unified",
                "height": 600,
                "showlegend": false
            }
        })
    }

    fn metric(label: &str, value: &str) -> String {
        format!(
            "<div class=\"metric\"><div class=\"metric-label\">{}</div><div class=\"metric-value\">{}</div></div>",
            escape_html(label),
            escape_html(value)
        )
    }

    fn render_report(&self, report: &DashboardReport<'_>) -> Result<String> {
        let summary = &report.summary;
        let top = summary
            .top_region
            .as_ref()
            .map(|t| t.name.clone())
            .unwrap_or_else(|| "N/A".to_string());

        let metrics = [
            Self::metric("Total de Proyectos", &summary.total_projects.to_string()),
            Self::metric(
                "Departamentos con Proyectos",
                &summary.regions_with_projects.to_string(),
            ),
            Self::metric("Rango de Años", &format_year_range(summary.year_range)),
            Self::metric("Departamento con Más Proyectos", &top),
        ]
        .join("\n");

        let rows: String = report
            .table
            .iter()
            .map(|row| {
                format!(
                    "<tr><td>{}</td><td data-value=\"{}\">{}</td></tr>\n",
                    escape_html(&row.department),
                    row.project_count,
                    row.project_count
                )
            })
            .collect();

        let unmatched = if report.unmatched.is_empty() {
            String::new()
        } else {
            let items: String = report
                .unmatched
                .iter()
                .map(|u| format!("<li>{} ({})</li>", escape_html(&u.department), u.project_count))
                .collect();
            format!(
                "<div class=\"notice\">Departamentos sin coincidencia en el mapa:<ul>{}</ul></div>",
                items
            )
        };

        let body = format!(
            r#"<div class="columns">
  <section>
    <h2>📍 Mapa de Proyectos por Departamento</h2>
    <div id="map"></div>
  </section>
  <section>
    <h2>📊 Proyectos por Año de Publicación</h2>
    <div id="years"></div>
  </section>
</div>
<hr>
<h2>📈 Estadísticas Generales</h2>
<div class="metrics">
{metrics}
</div>
<hr>
<h2>📋 Detalle de Proyectos por Departamento</h2>
<table id="regions" class="sortable">
<thead><tr><th data-type="text">Departamento</th><th data-type="number">Cantidad de Proyectos</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
{unmatched}
<script src="{cdn}"></script>
<script>
const MAP = {map};
const YEARS = {years};
const CONFIG = {{ displayModeBar: false, responsive: true }};
Plotly.newPlot("map", MAP.data, MAP.layout, CONFIG);
Plotly.newPlot("years", YEARS.data, YEARS.layout, CONFIG);
{sort_script}
</script>"#,
            metrics = metrics,
            rows = rows,
            unmatched = unmatched,
            cdn = PLOTLY_CDN,
            map = script_json(&Self::choropleth(report))?,
            years = script_json(&Self::year_series(report))?,
            sort_script = SORT_SCRIPT,
        );

        Ok(self.page(&body))
    }

    fn render_unavailable(&self, error: &DataUnavailable) -> String {
        let body = format!(
            r#"<div class="error">
  <p>⚠️ No se pudieron cargar los datos. Verifica que los archivos existan en las rutas especificadas:</p>
  <pre>{regions}</pre>
  <pre>{projects}</pre>
  <p>Detalle: <code>{message}</code></p>
</div>
<div class="notice">
  <p>📝 Asegúrate de que:</p>
  <ul>
    <li>El archivo de límites sea un GeoJSON (FeatureCollection) de polígonos con el nombre del departamento</li>
    <li>El archivo de proyectos tenga la columna '{department}' y '{year}'</li>
    <li>Las rutas de las carpetas sean exactamente como se especifican</li>
  </ul>
</div>"#,
            regions = escape_html(&error.regions_path),
            projects = escape_html(&error.projects_path),
            message = escape_html(&error.message),
            department = escape_html(DEPARTMENT_COLUMN),
            year = escape_html(YEAR_COLUMN),
        );

        self.page(&body)
    }

    fn page(&self, body: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>🌬️ {title}</h1>
<hr>
{body}
<hr>
<footer>Análisis de Proyectos Eólicos en Colombia | Generado {generated_at}</footer>
</body>
</html>
"#,
            title = escape_html(&self.title),
            style = STYLE,
            body = body,
            generated_at = escape_html(&self.generated_at),
        )
    }
}

impl Renderer for HtmlRenderer {
    fn file_name(&self) -> &str {
        "dashboard.html"
    }

    fn render(&self, page: &DashboardPage<'_>) -> Result<Option<Vec<u8>>> {
        let html = match page {
            DashboardPage::Ready(report) => self.render_report(report)?,
            DashboardPage::Unavailable(error) => self.render_unavailable(error),
        };
        Ok(Some(html.into_bytes()))
    }
}

/// Per-region table, most projects first.
pub struct RegionCsvRenderer;

impl Renderer for RegionCsvRenderer {
    fn file_name(&self) -> &str {
        "region_counts.csv"
    }

    fn render(&self, page: &DashboardPage<'_>) -> Result<Option<Vec<u8>>> {
        let DashboardPage::Ready(report) = page else {
            return Ok(None);
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &report.table {
            writer.serialize(row)?;
        }
        // 沒有資料列時仍輸出標題
        if report.table.is_empty() {
            writer.write_record([DEPARTMENT_COLUMN, "Cantidad_Proyectos"])?;
        }
        finish_csv(writer).map(Some)
    }
}

pub struct YearCsvRenderer;

impl Renderer for YearCsvRenderer {
    fn file_name(&self) -> &str {
        "year_counts.csv"
    }

    fn render(&self, page: &DashboardPage<'_>) -> Result<Option<Vec<u8>>> {
        let DashboardPage::Ready(report) = page else {
            return Ok(None);
        };

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record([YEAR_COLUMN, "Cantidad_Proyectos"])?;
        for year in &report.years {
            writer.write_record([year.year.to_string(), year.project_count.to_string()])?;
        }
        finish_csv(writer).map(Some)
    }
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer
        .into_inner()
        .map_err(|e| DashboardError::IoError(e.into_error()))
}

pub struct JsonSummaryRenderer;

impl JsonSummaryRenderer {
    pub fn to_value(page: &DashboardPage<'_>) -> Value {
        match page {
            DashboardPage::Ready(report) => {
                let regions: Vec<Value> = report
                    .regions
                    .iter()
                    .map(|a| json!({ "name": a.region.name, "project_count": a.project_count }))
                    .collect();
                json!({
                    "status": "ok",
                    "summary": report.summary,
                    "regions": regions,
                    "years": report.years,
                    "table": report.table,
                    "unmatched_departments": report.unmatched,
                })
            }
            DashboardPage::Unavailable(error) => json!({
                "status": "unavailable",
                "message": error.message,
                "regions_path": error.regions_path,
                "projects_path": error.projects_path,
                "required_columns": [DEPARTMENT_COLUMN, YEAR_COLUMN],
            }),
        }
    }
}

impl Renderer for JsonSummaryRenderer {
    fn file_name(&self) -> &str {
        "summary.json"
    }

    fn render(&self, page: &DashboardPage<'_>) -> Result<Option<Vec<u8>>> {
        let data = serde_json::to_vec_pretty(&Self::to_value(page))?;
        Ok(Some(data))
    }
}

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; margin: 1.5rem 2rem; color: #222; }
.columns { display: grid; grid-template-columns: 1fr 1fr; gap: 1.5rem; }
.metrics { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.metric-label { font-size: 0.9rem; color: #555; }
.metric-value { font-size: 1.8rem; font-weight: 600; }
table.sortable { border-collapse: collapse; width: 100%; }
table.sortable th { cursor: pointer; text-align: left; border-bottom: 2px solid #ccc; padding: 0.4rem; }
table.sortable td { border-bottom: 1px solid #eee; padding: 0.4rem; }
.error { background: #fdecea; border-left: 4px solid #d93025; padding: 0.5rem 1rem; }
.notice { background: #e8f0fe; border-left: 4px solid #1a73e8; padding: 0.5rem 1rem; margin-top: 1rem; }
footer { text-align: center; color: #666; }
"#;

const SORT_SCRIPT: &str = r#"document.querySelectorAll("table.sortable th").forEach((th, col) => {
  th.addEventListener("click", () => {
    const tbody = th.closest("table").querySelector("tbody");
    const numeric = th.dataset.type === "number";
    const asc = th.dataset.order !== "asc";
    th.dataset.order = asc ? "asc" : "desc";
    const key = (tr) => {
      const td = tr.children[col];
      return numeric ? Number(td.dataset.value) : td.textContent;
    };
    Array.from(tbody.rows)
      .sort((a, b) => {
        const x = key(a), y = key(b);
        const c = numeric ? x - y : x.localeCompare(y, "es");
        return asc ? c : -c;
      })
      .forEach((tr) => tbody.appendChild(tr));
  });
});"#;
