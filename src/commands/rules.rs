use anyhow::{Context, Result};
use std::path::Path;

use mivzak::config::Config;

/// Export the active rule set as TOML
///
/// Writes to `output` when given, otherwise to stdout. The exported file is
/// a starting point for a custom `paths.rules` table.
pub fn rules(config: &Config, output: Option<&Path>) -> Result<()> {
    let rules = config.load_rules()?;
    let toml = rules.to_toml_string()?;

    match output {
        Some(path) => {
            std::fs::write(path, &toml)
                .with_context(|| format!("Failed to write rules: {}", path.display()))?;
            tracing::info!(version = %rules.version, path = %path.display(), "Rules exported");
            println!("Rules {} written to {}", rules.version, path.display());
        }
        None => print!("{toml}"),
    }

    Ok(())
}
