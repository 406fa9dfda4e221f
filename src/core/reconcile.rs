//! Joins project records onto regions by normalized department name and
//! buckets them by publication year.

use crate::domain::model::{
    ProjectRecord, Region, RegionAggregate, UnmatchedDepartment, YearAggregate,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Case-fold and trim. Must be applied to both sides of every name comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

fn count_by_department(records: &[ProjectRecord]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for record in records {
        *counts.entry(normalize(&record.department)).or_insert(0) += 1;
    }
    counts
}

/// One entry per region, in input order. Regions without projects get 0; departments
/// that match no region are left out of this view.
pub fn aggregate_by_region<'a>(
    regions: &'a [Region],
    records: &[ProjectRecord],
) -> Vec<RegionAggregate<'a>> {
    let counts = count_by_department(records);

    regions
        .iter()
        .map(|region| RegionAggregate {
            region,
            project_count: counts.get(&normalize(&region.name)).copied().unwrap_or(0),
        })
        .collect()
}

/// Year series ascending; records without a year are dropped.
pub fn aggregate_by_year(records: &[ProjectRecord]) -> Vec<YearAggregate> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for year in records.iter().filter_map(|r| r.publication_year) {
        *by_year.entry(year).or_insert(0) += 1;
    }

    by_year
        .into_iter()
        .map(|(year, project_count)| YearAggregate {
            year,
            project_count,
        })
        .collect()
}

/// Normalized departments with no matching region, in first-seen order.
pub fn unmatched_departments(
    regions: &[Region],
    records: &[ProjectRecord],
) -> Vec<UnmatchedDepartment> {
    let known: HashSet<String> = regions.iter().map(|r| normalize(&r.name)).collect();

    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records {
        let key = normalize(&record.department);
        // 空白的部門仍計入總數，但沒有名稱可列出
        if key.is_empty() || known.contains(&key) {
            continue;
        }
        let count = counts.entry(key.clone()).or_insert(0);
        if *count == 0 {
            order.push(key);
        }
        *count += 1;
    }

    order
        .into_iter()
        .map(|department| {
            let project_count = counts[&department];
            UnmatchedDepartment {
                department,
                project_count,
            }
        })
        .collect()
}
