// Contributor summaries.
// Groups enriched contributors by company and by location.

use std::collections::HashMap;

use serde::Serialize;

use crate::github::Contributor;

/// Label for contributors without a company or location.
pub const UNKNOWN: &str = "Unknown";

/// Number of groups kept in each summary.
pub const SUMMARY_LIMIT: usize = 10;

/// One group in a summary table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryItem {
    pub name: String,
    pub count: u64,
    /// Share of the total, 0 to 100.
    pub percentage: f64,
}

/// Top companies by contribution count.
pub fn company_summary(contributors: &[Contributor]) -> Vec<SummaryItem> {
    summarize(
        contributors
            .iter()
            .map(|c| (group_name(c.company.as_deref()), c.contributions)),
    )
}

/// Top locations by number of contributors.
pub fn location_summary(contributors: &[Contributor]) -> Vec<SummaryItem> {
    summarize(
        contributors
            .iter()
            .map(|c| (group_name(c.location.as_deref()), 1)),
    )
}

fn group_name(value: Option<&str>) -> &str {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => name,
        _ => UNKNOWN,
    }
}

/// Sum weights per group, then sort by weight descending. Ties keep first
/// appearance order.
fn summarize<'a>(weights: impl Iterator<Item = (&'a str, u64)>) -> Vec<SummaryItem> {
    let mut groups: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut total = 0u64;

    for (name, weight) in weights {
        total += weight;
        match index.get(name) {
            Some(&i) => groups[i].1 += weight,
            None => {
                index.insert(name, groups.len());
                groups.push((name, weight));
            }
        }
    }

    groups.sort_by(|a, b| b.1.cmp(&a.1));
    groups.truncate(SUMMARY_LIMIT);

    groups
        .into_iter()
        .map(|(name, count)| SummaryItem {
            name: name.to_string(),
            count,
            percentage: if total == 0 {
                0.0
            } else {
                count as f64 / total as f64 * 100.0
            },
        })
        .collect()
}
