use anyhow::{Context, Result};

use mivzak::config::Config;
use mivzak::detection::{assign_images, list_portraits};

/// Link roster records to portrait files
///
/// Prints the assignment report; with `write` the roster file is rewritten
/// with the images filled in.
pub fn images(config: &Config, write: bool) -> Result<()> {
    let roster_path = &config.paths.roster;
    let images_dir = &config.paths.images_dir;

    let raw = std::fs::read_to_string(roster_path)
        .with_context(|| format!("Failed to read roster: {}", roster_path.display()))?;
    let portraits = list_portraits(images_dir)
        .with_context(|| format!("Failed to list portraits: {}", images_dir.display()))?;

    tracing::info!(portraits = portraits.len(), "Assigning portraits");

    let (json, report) = assign_images(&raw, &portraits)
        .with_context(|| format!("Failed to parse roster: {}", roster_path.display()))?;

    println!("Assigned {}/{} portraits", report.assigned, report.total);
    if !report.missing.is_empty() {
        println!("Missing:");
        for name in &report.missing {
            println!("  - {name}");
        }
    }

    if write {
        std::fs::write(roster_path, json + "\n")
            .with_context(|| format!("Failed to write roster: {}", roster_path.display()))?;
        println!("Roster updated: {}", roster_path.display());
    }

    Ok(())
}
