// Text reports over typed results - race summaries, driver profiles, comparisons

use crate::entity::{Driver, RaceResult};
use crate::error::{RaceDataError, Result};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Summary of one driver's results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverProfile {
    pub name: String,
    pub starts: usize,
    /// Finishing positions in result order; `None` is a DNF
    pub finishes: Vec<Option<u32>>,
    pub podiums: usize,
    pub best_finish: Option<u32>,
}

/// Markdown-ish summary of a single race: classified finishers first, DNFs
/// last, at most `top_n` lines.
pub fn format_race_summary(race_id: &str, results: &[RaceResult], top_n: usize) -> String {
    let mut race_results: Vec<&RaceResult> =
        results.iter().filter(|r| r.race_id == race_id).collect();

    let Some(first) = race_results.first() else {
        return format!("# Race {race_id}\nNo results available.");
    };
    let header = format!("# {} ({})", first.circuit, first.day());

    race_results.sort_by_key(|r| (r.is_dnf(), r.position.unwrap_or(u32::MAX)));

    let mut lines = vec![header];
    for r in race_results.iter().take(top_n) {
        let tag = match r.position {
            Some(p) => format!("P{p}"),
            None => "DNF".to_string(),
        };
        lines.push(format!(
            "{tag} - {} ({}) - Points: {}",
            r.driver.name, r.team, r.points
        ));
    }
    lines.join("\n")
}

/// Starts, finishes, podiums and best finish for one driver.
pub fn generate_driver_profile(
    driver_id: &str,
    results: &[RaceResult],
    drivers: &HashMap<String, Arc<Driver>>,
) -> DriverProfile {
    let name = drivers
        .get(driver_id)
        .map(|d| d.name.clone())
        .unwrap_or_else(|| "Unknown Driver".to_string());

    let finishes: Vec<Option<u32>> = results
        .iter()
        .filter(|r| r.driver.driver_id == driver_id)
        .map(|r| r.position)
        .collect();
    let classified: Vec<u32> = finishes.iter().flatten().copied().collect();

    DriverProfile {
        name,
        starts: finishes.len(),
        podiums: classified.iter().filter(|p| **p <= 3).count(),
        best_finish: classified.iter().min().copied(),
        finishes,
    }
}

/// Side-by-side comparison of two profiles, one statistic per line.
pub fn format_comparison_output(a: &DriverProfile, b: &DriverProfile) -> String {
    [
        format!("{} vs {}", a.name, b.name),
        format!("Starts: {} vs {}", a.starts, b.starts),
        format!(
            "Finishes: {} vs {}",
            join_finishes(&a.finishes),
            join_finishes(&b.finishes)
        ),
        format!("Podiums: {} vs {}", a.podiums, b.podiums),
        format!(
            "Best Finish: {} vs {}",
            show_best(a.best_finish),
            show_best(b.best_finish)
        ),
    ]
    .join("\n")
}

fn join_finishes(finishes: &[Option<u32>]) -> String {
    if finishes.is_empty() {
        return "None".to_string();
    }
    finishes
        .iter()
        .map(|f| match f {
            Some(p) => format!("P{p}"),
            None => "DNF".to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn show_best(best: Option<u32>) -> String {
    best.map(|p| p.to_string()).unwrap_or_else(|| "–".to_string())
}

/// Write `text` to `out_dir/filename`, creating the directory if needed.
/// Refuses to replace an existing file unless `overwrite` is set.
pub fn save_analysis_report(
    text: &str,
    out_dir: &Path,
    filename: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;

    let target = out_dir.join(filename);
    if target.exists() && !overwrite {
        return Err(RaceDataError::DuplicateTarget { path: target });
    }

    std::fs::write(&target, text)?;
    log::debug!("Wrote report to {}", target.display());
    Ok(target)
}
