use crate::core::reconcile::normalize;
use crate::domain::model::{
    ProjectRecord, RegionAggregate, SummaryMetrics, TableRow, TopRegion, YearAggregate,
};

/// "VALLE DEL CAUCA" -> "Valle Del Cauca". Every run of letters starts upper-case.
pub fn title_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut at_word_start = true;
    for c in name.chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

/// Highest count wins; on ties the region met first in per-region order.
pub fn top_region(regions: &[RegionAggregate<'_>]) -> Option<TopRegion> {
    let mut best: Option<&RegionAggregate<'_>> = None;
    for aggregate in regions.iter().filter(|a| a.project_count > 0) {
        match best {
            Some(current) if current.project_count >= aggregate.project_count => {}
            _ => best = Some(aggregate),
        }
    }

    best.map(|a| TopRegion {
        name: title_case(&normalize(&a.region.name)),
        project_count: a.project_count,
    })
}

pub fn summarize(
    records: &[ProjectRecord],
    regions: &[RegionAggregate<'_>],
    years: &[YearAggregate],
) -> SummaryMetrics {
    // years 已依年份遞增排序
    let year_range = match (years.first(), years.last()) {
        (Some(first), Some(last)) => Some((first.year, last.year)),
        _ => None,
    };

    SummaryMetrics {
        total_projects: records.len(),
        regions_with_projects: regions.iter().filter(|a| a.project_count > 0).count(),
        year_range,
        top_region: top_region(regions),
    }
}

/// Per-region rows with readable names, most projects first. The sort is stable so
/// equal counts keep region order.
pub fn region_table(regions: &[RegionAggregate<'_>]) -> Vec<TableRow> {
    let mut rows: Vec<TableRow> = regions
        .iter()
        .map(|a| TableRow {
            department: title_case(&normalize(&a.region.name)),
            project_count: a.project_count,
        })
        .collect();
    rows.sort_by(|a, b| b.project_count.cmp(&a.project_count));
    rows
}

pub fn format_year_range(range: Option<(i32, i32)>) -> String {
    match range {
        Some((min, max)) => format!("{} - {}", min, max),
        None => "N/A".to_string(),
    }
}
